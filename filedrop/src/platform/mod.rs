//! Platform abstraction layer for filedrop
//!
//! The controller never touches a DOM directly. Everything it needs from the
//! host (element primitives, event inspection, listener registration,
//! notification dispatch, file extraction, timers and local tasks) goes
//! through [`Platform`], so the same state machine runs in a browser and
//! against the in-memory [`memory::MemoryPlatform`].

use std::fmt::Debug;
use std::rc::Rc;
use std::time::Duration;

use futures::future::LocalBoxFuture;

use crate::event::{EventKind, Extraction};
use crate::notification::Notification;
use crate::options::PickerAttributes;

pub mod memory;

/// Callback registered for one route; cloned handles keep the same identity.
pub type Handler<E> = Rc<dyn Fn(E)>;

/// What the host environment can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// A document and a window exist, so global drag tracking and focus
    /// based dialog detection are available.
    pub browser: bool,
    /// The file dialog must be opened from a deferred task instead of
    /// synchronously from the activating handler.
    pub deferred_dialog_open: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            browser: true,
            deferred_dialog_open: false,
        }
    }
}

/// Target of a listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenTarget<'a, E> {
    Element(&'a E),
    Document,
    Window,
}

/// Host primitives used by [`FileDrop`](crate::FileDrop).
///
/// All methods are called from a single thread. Implementations must not
/// hold interior borrows while invoking handlers: a handler may re-enter the
/// platform (a picker click issued from a container click handler is
/// dispatched synchronously).
#[allow(async_fn_in_trait)]
pub trait Platform: 'static {
    type Element: Clone + PartialEq + Debug + 'static;
    type Event: Clone + Debug + 'static;
    type File: Clone + Debug + 'static;
    type Listener: 'static;

    fn capabilities(&self) -> Capabilities;

    // ===== ELEMENTS =====

    /// True for any `<input>`, whatever its type.
    fn is_input(&self, element: &Self::Element) -> bool;
    fn is_file_input(&self, element: &Self::Element) -> bool;
    /// File inputs nested anywhere inside `container`, in document order.
    fn file_inputs(&self, container: &Self::Element) -> Vec<Self::Element>;
    fn create_file_input(&self) -> Self::Element;
    fn append_child(&self, parent: &Self::Element, child: &Self::Element);
    fn remove_element(&self, element: &Self::Element);
    /// Inclusive: an element contains itself.
    fn contains(&self, container: &Self::Element, node: &Self::Element) -> bool;
    fn tab_index(&self, element: &Self::Element) -> i32;
    fn set_tab_index(&self, element: &Self::Element, index: i32);
    fn hide(&self, element: &Self::Element);
    fn toggle_class(&self, element: &Self::Element, class: &str, enabled: bool);
    /// Writes `multiple`, `accept` (when set) and turns autocomplete off.
    fn set_picker_attributes(&self, picker: &Self::Element, attributes: &PickerAttributes);
    fn picker_file_count(&self, picker: &Self::Element) -> usize;
    fn clear_picker(&self, picker: &Self::Element);
    /// Synthetic activation; on a picker this asks the host to open the file dialog.
    fn click(&self, element: &Self::Element);

    // ===== EVENTS =====

    /// File-presence filter: does the drag payload carry files at all.
    fn has_files(&self, event: &Self::Event) -> bool;
    fn key(&self, event: &Self::Event) -> Option<String>;
    fn target(&self, event: &Self::Event) -> Option<Self::Element>;
    fn prevent_default(&self, event: &Self::Event);
    fn stop_propagation(&self, event: &Self::Event);

    fn listen(
        &self,
        target: ListenTarget<'_, Self::Element>,
        kind: EventKind,
        handler: Handler<Self::Event>,
    ) -> Self::Listener;
    fn unlisten(&self, listener: Self::Listener);

    /// Deliver a notification to the host application on `container`.
    fn dispatch(&self, container: &Self::Element, notification: Notification<Self>)
    where
        Self: Sized;

    /// Read the files carried by a drag, drop or picker change event.
    ///
    /// Called from inside the event handler. Anything the host only exposes
    /// during dispatch (a drop's data transfer) must be captured before
    /// returning; the future merely yields it.
    fn extract_files(
        &self,
        event: &Self::Event,
        extraction: Extraction,
    ) -> LocalBoxFuture<'static, Vec<Self::File>>;

    // ===== SCHEDULING =====

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);
    async fn sleep(&self, duration: Duration);
}
