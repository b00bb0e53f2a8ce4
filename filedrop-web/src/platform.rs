//! `web-sys` implementation of [`Platform`].

use std::time::Duration;

use filedrop::{
    Capabilities, EventKind, Extraction, Handler, ListenTarget, Notification, Payload, Platform,
    PickerAttributes,
};
use futures::future::LocalBoxFuture;
use gloo_timers::future::TimeoutFuture;
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::{
    CustomEvent, CustomEventInit, DataTransferItemList, Document, DragEvent, Element, Event,
    EventTarget, File, FileList, HtmlElement, HtmlInputElement, KeyboardEvent, Node, Window,
};

use crate::user_agent::needs_deferred_open;

/// Drop zone host backed by the page's `window` and `document`.
#[derive(Debug, Clone)]
pub struct WebPlatform {
    window: Window,
    document: Document,
    capabilities: Capabilities,
}

impl WebPlatform {
    /// `None` outside a document context, e.g. inside a worker.
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let deferred_dialog_open = window
            .navigator()
            .user_agent()
            .is_ok_and(|user_agent| needs_deferred_open(&user_agent));
        Some(Self {
            window,
            document,
            capabilities: Capabilities {
                browser: true,
                deferred_dialog_open,
            },
        })
    }
}

/// A live DOM listener; the closure is freed once it is removed.
pub struct WebListener {
    target: EventTarget,
    kind: EventKind,
    closure: Closure<dyn FnMut(Event)>,
}

impl Platform for WebPlatform {
    type Element = Element;
    type Event = Event;
    type File = File;
    type Listener = WebListener;

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn is_input(&self, element: &Element) -> bool {
        element.tag_name().eq_ignore_ascii_case("input")
    }

    fn is_file_input(&self, element: &Element) -> bool {
        self.is_input(element)
            && element
                .get_attribute("type")
                .is_some_and(|kind| kind.eq_ignore_ascii_case("file"))
    }

    fn file_inputs(&self, container: &Element) -> Vec<Element> {
        let Ok(nodes) = container.query_selector_all("input[type='file']") else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|index| nodes.item(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn create_file_input(&self) -> Element {
        let input = self.document.create_element("input").unwrap_throw();
        input.set_attribute("type", "file").unwrap_throw();
        input
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        if let Err(error) = parent.append_child(child) {
            log::warn!("filedrop could not append the picker: {error:?}");
        }
    }

    fn remove_element(&self, element: &Element) {
        element.remove();
    }

    fn contains(&self, container: &Element, node: &Element) -> bool {
        let node: &Node = node;
        container.contains(Some(node))
    }

    fn tab_index(&self, element: &Element) -> i32 {
        element
            .dyn_ref::<HtmlElement>()
            .map_or(-1, HtmlElement::tab_index)
    }

    fn set_tab_index(&self, element: &Element, index: i32) {
        if let Some(element) = element.dyn_ref::<HtmlElement>() {
            element.set_tab_index(index);
        }
    }

    fn hide(&self, element: &Element) {
        if let Some(element) = element.dyn_ref::<HtmlElement>() {
            if let Err(error) = element.style().set_property("display", "none") {
                log::warn!("filedrop could not hide the picker: {error:?}");
            }
        }
    }

    fn toggle_class(&self, element: &Element, class: &str, enabled: bool) {
        if let Err(error) = element.class_list().toggle_with_force(class, enabled) {
            log::warn!("filedrop could not toggle class {class}: {error:?}");
        }
    }

    fn set_picker_attributes(&self, picker: &Element, attributes: &PickerAttributes) {
        let Some(input) = picker.dyn_ref::<HtmlInputElement>() else {
            return;
        };
        input.set_multiple(attributes.multiple);
        if let Some(accept) = &attributes.accept {
            input.set_accept(accept);
        }
        input.set_autocomplete("off");
    }

    fn picker_file_count(&self, picker: &Element) -> usize {
        picker
            .dyn_ref::<HtmlInputElement>()
            .and_then(HtmlInputElement::files)
            .map_or(0, |files| files.length() as usize)
    }

    fn clear_picker(&self, picker: &Element) {
        if let Some(input) = picker.dyn_ref::<HtmlInputElement>() {
            input.set_value("");
        }
    }

    fn click(&self, element: &Element) {
        if let Some(element) = element.dyn_ref::<HtmlElement>() {
            element.click();
        }
    }

    fn has_files(&self, event: &Event) -> bool {
        event
            .dyn_ref::<DragEvent>()
            .and_then(DragEvent::data_transfer)
            .is_some_and(|transfer| {
                transfer
                    .types()
                    .iter()
                    .any(|kind| kind.as_string().as_deref() == Some("Files"))
            })
    }

    fn key(&self, event: &Event) -> Option<String> {
        event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key)
    }

    fn target(&self, event: &Event) -> Option<Element> {
        event.target()?.dyn_into::<Element>().ok()
    }

    fn prevent_default(&self, event: &Event) {
        event.prevent_default();
    }

    fn stop_propagation(&self, event: &Event) {
        event.stop_propagation();
    }

    fn listen(
        &self,
        target: ListenTarget<'_, Element>,
        kind: EventKind,
        handler: Handler<Event>,
    ) -> WebListener {
        let target: EventTarget = match target {
            ListenTarget::Element(element) => element.clone().into(),
            ListenTarget::Document => self.document.clone().into(),
            ListenTarget::Window => self.window.clone().into(),
        };
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| handler(event));
        if let Err(error) =
            target.add_event_listener_with_callback(kind.as_str(), closure.as_ref().unchecked_ref())
        {
            log::warn!("filedrop could not listen for {}: {error:?}", kind.as_str());
        }
        WebListener {
            target,
            kind,
            closure,
        }
    }

    fn unlisten(&self, listener: WebListener) {
        let WebListener {
            target,
            kind,
            closure,
        } = listener;
        if let Err(error) = target
            .remove_event_listener_with_callback(kind.as_str(), closure.as_ref().unchecked_ref())
        {
            log::warn!("filedrop could not stop listening for {}: {error:?}", kind.as_str());
        }
    }

    fn dispatch(&self, container: &Element, notification: Notification<Self>) {
        let name = notification.name();
        let result = detail(&notification).and_then(|detail| {
            let init = CustomEventInit::new();
            init.set_detail(&detail);
            let event = CustomEvent::new_with_event_init_dict(name, &init)?;
            container.dispatch_event(&event)
        });
        if let Err(error) = result {
            log::warn!("filedrop could not dispatch {name}: {error:?}");
        }
    }

    fn extract_files(
        &self,
        event: &Event,
        extraction: Extraction,
    ) -> LocalBoxFuture<'static, Vec<File>> {
        let files = read_files(event, extraction);
        Box::pin(async move { files })
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }

    async fn sleep(&self, duration: Duration) {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        TimeoutFuture::new(millis).await;
    }
}

/// The data transfer turns protected once dispatch ends, so this runs
/// inside the handler.
fn read_files(event: &Event, extraction: Extraction) -> Vec<File> {
    if let Some(drag) = event.dyn_ref::<DragEvent>() {
        let Some(transfer) = drag.data_transfer() else {
            return Vec::new();
        };
        return match extraction {
            Extraction::Full => transfer
                .files()
                .map(|files| collect_files(&files))
                .unwrap_or_default(),
            Extraction::Peek => peek_files(&transfer.items()),
        };
    }
    event
        .target()
        .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
        .and_then(|input| input.files())
        .map(|files| collect_files(&files))
        .unwrap_or_default()
}

fn collect_files(files: &FileList) -> Vec<File> {
    (0..files.length()).filter_map(|index| files.get(index)).collect()
}

/// Files visible while a drag is still in flight. Browsers in protected
/// mode hand out `null` here, which is skipped.
fn peek_files(items: &DataTransferItemList) -> Vec<File> {
    (0..items.length())
        .filter_map(|index| items.get(index))
        .filter(|item| item.kind() == "file")
        .filter_map(|item| item.get_as_file().ok().flatten())
        .collect()
}

/// `event.detail` for a notification.
fn detail(notification: &Notification<WebPlatform>) -> Result<Object, JsValue> {
    let detail = Object::new();
    let set = |key: &str, value: &JsValue| Reflect::set(&detail, &JsValue::from_str(key), value);

    let id = notification
        .id
        .as_deref()
        .map_or(JsValue::UNDEFINED, JsValue::from_str);
    set("id", &id)?;

    let options = serde_wasm_bindgen::to_value(&notification.options)?;
    if let Some(input) = &notification.options.input {
        Reflect::set(&options, &JsValue::from_str("input"), input)?;
    }
    set("options", &options)?;
    set(
        "isDraggingFiles",
        &JsValue::from_bool(notification.snapshot.is_dragging_files),
    )?;
    set(
        "isFileDialogOpen",
        &JsValue::from_bool(notification.snapshot.is_file_dialog_open),
    )?;

    if let Payload::Files { files, event, .. } = &notification.payload {
        if let Some(method) = notification.method() {
            set("method", &JsValue::from_str(method.as_str()))?;
        }
        set("files", &files.iter().collect::<Array>())?;
        let event = event
            .as_ref()
            .map_or(JsValue::UNDEFINED, |event| JsValue::from(event.clone()));
        set("event", &event)?;
    }
    Ok(detail)
}
