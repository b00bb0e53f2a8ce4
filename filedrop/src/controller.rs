//! Drop zone controller: binds the state machine to a container, its picker
//! and the document/window of a [`Platform`].
//!
//! Data flows: platform event → route handler → `DropState::react` →
//! reaction side effects → (optional file extraction) → notification on the
//! container.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use futures::future::{AbortHandle, abortable};

use crate::error::InvalidTarget;
use crate::event::{EventKind, Extraction, Route, Scope};
use crate::machine::{DialogPoll, DropState, Emit, Facts, PollStep};
use crate::notification::{DialogNotice, FileNotice, Notification, Payload};
use crate::options::Options;
use crate::picker::{self, Picker};
use crate::platform::{Handler, ListenTarget, Platform};

/// Class set on the container while the drop zone is disabled.
pub const DISABLED_CLASS: &str = "disabled";

/// Delay used when the platform cannot open the file dialog synchronously.
const DEFERRED_OPEN_DELAY: Duration = Duration::from_millis(1);

/// True when `target` is the container itself or one of its descendants.
pub fn targets_container<P: Platform>(
    platform: &P,
    container: &P::Element,
    target: Option<&P::Element>,
) -> bool {
    target.is_some_and(|target| platform.contains(container, target))
}

/// Handle to a bound drop zone.
///
/// Dropping the handle destroys the drop zone.
pub struct FileDrop<P: Platform> {
    inner: Rc<Inner<P>>,
}

struct Inner<P: Platform> {
    platform: P,
    container: P::Element,
    picker: Picker<P::Element>,
    state: RefCell<DropState<P::Event>>,
    options: RefCell<Options<P::Element>>,
    // One handler per route for the lifetime of the controller
    handlers: BTreeMap<Route, Handler<P::Event>>,
    listeners: RefCell<BTreeMap<Route, P::Listener>>,
    dialog_poll: RefCell<Option<AbortHandle>>,
    // Bumped by every teardown; extractions started in an older epoch are dropped
    epoch: Cell<u64>,
    // Synthesized picker currently detached by `destroy`
    released: Cell<bool>,
}

impl<P: Platform> FileDrop<P> {
    /// Attach drag-and-drop and click-to-browse behavior to `container`.
    ///
    /// The picker is resolved once here; later [`update`](Self::update)
    /// calls ignore the `input` option.
    pub fn bind(
        platform: P,
        container: P::Element,
        options: Options<P::Element>,
    ) -> Result<Self, InvalidTarget> {
        let picker = picker::resolve(&platform, &container, &options)?;

        let tab_index = picker::container_tab_index(
            platform.tab_index(&container),
            platform.tab_index(picker.element()),
        );
        platform.set_tab_index(&container, tab_index);
        platform.hide(picker.element());
        platform.set_tab_index(picker.element(), -1);

        let inner = Rc::new_cyclic(|weak: &Weak<Inner<P>>| Inner {
            handlers: Route::ALL
                .into_iter()
                .map(|route| (route, route_handler(weak.clone(), route)))
                .collect(),
            platform,
            container,
            picker,
            state: RefCell::new(DropState::default()),
            options: RefCell::new(Options::default()),
            listeners: RefCell::new(BTreeMap::new()),
            dialog_poll: RefCell::new(None),
            epoch: Cell::new(0),
            released: Cell::new(false),
        });
        log::debug!(
            "filedrop bound to {:?} with {:?}",
            inner.container,
            inner.picker
        );
        inner.init(options);

        Ok(Self { inner })
    }

    /// Re-resolve `options` and rebind.
    pub fn update(&self, options: Options<P::Element>) {
        self.inner.init(options);
    }

    /// Unregister every listener, clear the picker and cancel a running
    /// dialog poll. A synthesized picker is detached from the container.
    /// Calling it more than once is harmless.
    pub fn destroy(&self) {
        self.inner.teardown();
        if self.inner.picker.is_owned() && !self.inner.released.replace(true) {
            self.inner.platform.remove_element(self.inner.picker.element());
        }
    }

    pub fn is_dragging_files(&self) -> bool {
        self.inner.state.borrow().is_dragging_files()
    }

    pub fn is_file_dialog_open(&self) -> bool {
        self.inner.state.borrow().is_dialog_open()
    }

    pub fn trigger_event(&self) -> Option<P::Event> {
        self.inner.state.borrow().trigger().cloned()
    }

    /// Resolved options currently in effect.
    pub fn options(&self) -> Options<P::Element> {
        self.inner.options.borrow().clone()
    }

    pub fn is_bound(&self) -> bool {
        !self.inner.listeners.borrow().is_empty()
    }

    pub fn container(&self) -> &P::Element {
        &self.inner.container
    }

    pub fn picker(&self) -> &Picker<P::Element> {
        &self.inner.picker
    }

    pub fn platform(&self) -> &P {
        &self.inner.platform
    }
}

impl<P: Platform> Drop for FileDrop<P> {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn route_handler<P: Platform>(inner: Weak<Inner<P>>, route: Route) -> Handler<P::Event> {
    Rc::new(move |event: P::Event| {
        if let Some(inner) = inner.upgrade() {
            inner.handle(route, event);
        }
    })
}

impl<P: Platform> Inner<P> {
    fn init(&self, options: Options<P::Element>) {
        let options = options.resolve();
        let disabled = options.is_disabled();
        let click_to_upload = options.click_to_upload();
        let attributes = options.picker_attributes();
        *self.options.borrow_mut() = options;

        if disabled {
            self.platform.toggle_class(&self.container, DISABLED_CLASS, true);
            self.teardown();
            return;
        }

        if self.released.replace(false) {
            self.platform.append_child(&self.container, self.picker.element());
        }
        self.platform.toggle_class(&self.container, DISABLED_CLASS, false);
        self.platform
            .set_picker_attributes(self.picker.element(), &attributes);

        let browser = self.platform.capabilities().browser;
        for route in Route::ALL {
            let wanted = match route {
                Route::ContainerClick => click_to_upload,
                route if route.is_global() => browser,
                _ => true,
            };
            if wanted {
                self.listen(route);
            } else {
                self.unlisten(route);
            }
        }
        log::debug!(
            "filedrop enabled: {} listeners, multiple={}, accept={:?}",
            self.listeners.borrow().len(),
            attributes.multiple,
            attributes.accept
        );
    }

    fn listen(&self, route: Route) {
        if self.listeners.borrow().contains_key(&route) {
            return;
        }
        let target = match route.scope() {
            Scope::Container => ListenTarget::Element(&self.container),
            Scope::Picker => ListenTarget::Element(self.picker.element()),
            Scope::Document => ListenTarget::Document,
            Scope::Window => ListenTarget::Window,
        };
        let listener = self
            .platform
            .listen(target, route.kind(), self.handlers[&route].clone());
        self.listeners.borrow_mut().insert(route, listener);
    }

    fn unlisten(&self, route: Route) {
        let listener = self.listeners.borrow_mut().remove(&route);
        if let Some(listener) = listener {
            self.platform.unlisten(listener);
        }
    }

    fn teardown(&self) {
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        let count = listeners.len();
        for listener in listeners.into_values() {
            self.platform.unlisten(listener);
        }
        self.platform.clear_picker(self.picker.element());

        let poll = self.dialog_poll.borrow_mut().take();
        if let Some(poll) = poll {
            poll.abort();
        }
        self.epoch.set(self.epoch.get() + 1);
        self.state.borrow_mut().reset();
        log::debug!("filedrop torn down, {count} listeners removed");
    }

    fn handle(self: &Rc<Self>, route: Route, event: P::Event) {
        let facts = self.facts(route, &event);
        let reaction = self.state.borrow_mut().react(route, &event, facts);
        if reaction.is_noop() {
            log::trace!("filedrop ignored {:?}", route);
            return;
        }

        if reaction.prevent_default {
            self.platform.prevent_default(&event);
        }
        if reaction.stop_propagation {
            self.platform.stop_propagation(&event);
        }
        match reaction.emit {
            Some(Emit::Dialog(notice)) => self.notify(Payload::Dialog(notice)),
            Some(Emit::Files {
                notice,
                extraction,
                source,
                event,
            }) => self.notify_with_files(notice, extraction, source, event),
            None => {}
        }
        if reaction.open_dialog {
            self.open_dialog();
        }
        if reaction.start_dialog_poll {
            self.start_dialog_poll();
        }
    }

    fn facts(&self, route: Route, event: &P::Event) -> Facts {
        let kind = route.kind();
        let is_drag = matches!(
            kind,
            EventKind::DragEnter | EventKind::DragLeave | EventKind::DragOver | EventKind::Drop
        );
        Facts {
            has_files: is_drag && self.platform.has_files(event),
            activation_key: route == Route::ContainerKeyDown
                && matches!(self.platform.key(event).as_deref(), Some(" " | "Enter")),
            inside_container: route == Route::DocumentDrop
                && targets_container(
                    &self.platform,
                    &self.container,
                    self.platform.target(event).as_ref(),
                ),
            window_drop: self.options.borrow().window_drop(),
        }
    }

    /// Build with the flags as they are now and dispatch. No borrow is held
    /// while the host handles the notification.
    fn notify(&self, payload: Payload<P>) {
        let options = self.options.borrow().clone();
        let notification = Notification {
            id: options.id.clone(),
            options,
            snapshot: self.state.borrow().snapshot(),
            payload,
        };
        log::trace!("filedrop dispatching {}", notification.name());
        self.platform.dispatch(&self.container, notification);
    }

    fn notify_with_files(
        self: &Rc<Self>,
        notice: FileNotice,
        extraction: Extraction,
        source: P::Event,
        event: Option<P::Event>,
    ) {
        let extracting = self.platform.extract_files(&source, extraction);
        let inner = Rc::clone(self);
        let epoch = self.epoch.get();
        self.platform.spawn_local(Box::pin(async move {
            let files = extracting.await;
            if inner.epoch.get() != epoch {
                log::debug!("filedrop dropped {notice:?}: torn down during extraction");
                return;
            }
            inner.notify(Payload::Files {
                notice,
                files,
                event,
            });
        }));
    }

    fn open_dialog(self: &Rc<Self>) {
        if !self.platform.capabilities().deferred_dialog_open {
            self.platform.click(self.picker.element());
            return;
        }
        let inner = Rc::clone(self);
        let epoch = self.epoch.get();
        self.platform.spawn_local(Box::pin(async move {
            inner.platform.sleep(DEFERRED_OPEN_DELAY).await;
            if inner.epoch.get() == epoch {
                inner.platform.click(inner.picker.element());
            }
        }));
    }

    fn start_dialog_poll(self: &Rc<Self>) {
        let (poll, handle) = abortable(Rc::clone(self).poll_dialog());
        let previous = self.dialog_poll.borrow_mut().replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
        self.platform.spawn_local(Box::pin(async move {
            if poll.await.is_err() {
                log::debug!("filedrop dialog poll cancelled");
            }
        }));
    }

    async fn poll_dialog(self: Rc<Self>) {
        let mut poll = DialogPoll::default();
        loop {
            self.platform.sleep(poll.interval()).await;
            let file_count = self.platform.picker_file_count(self.picker.element());
            match poll.check(file_count) {
                PollStep::Retry => continue,
                PollStep::Selected => {
                    self.notify(Payload::Dialog(DialogNotice::Close));
                    break;
                }
                PollStep::Cancelled => {
                    self.notify(Payload::Dialog(DialogNotice::Cancel));
                    break;
                }
            }
        }
    }
}
