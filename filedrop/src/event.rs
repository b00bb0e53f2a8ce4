//! Platform event names and the routes a drop zone listens on.

/// Platform events a drop zone subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    KeyDown,
    Click,
    Change,
    DragEnter,
    DragLeave,
    DragOver,
    Drop,
    Focus,
}

impl EventKind {
    /// DOM event type name.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::KeyDown => "keydown",
            EventKind::Click => "click",
            EventKind::Change => "change",
            EventKind::DragEnter => "dragenter",
            EventKind::DragLeave => "dragleave",
            EventKind::DragOver => "dragover",
            EventKind::Drop => "drop",
            EventKind::Focus => "focus",
        }
    }
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    Container,
    Picker,
    Document,
    Window,
}

/// A listener slot: one scope plus one event kind.
///
/// Each route gets exactly one handler for the lifetime of a controller, so
/// registering a route twice is always the same handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Route {
    ContainerKeyDown,
    ContainerClick,
    ContainerDragEnter,
    ContainerDragLeave,
    ContainerDragOver,
    ContainerDrop,
    PickerChange,
    PickerClick,
    DocumentDragEnter,
    DocumentDragLeave,
    DocumentDragOver,
    DocumentDrop,
    WindowFocus,
}

impl Route {
    pub const ALL: [Route; 13] = [
        Route::ContainerKeyDown,
        Route::ContainerClick,
        Route::ContainerDragEnter,
        Route::ContainerDragLeave,
        Route::ContainerDragOver,
        Route::ContainerDrop,
        Route::PickerChange,
        Route::PickerClick,
        Route::DocumentDragEnter,
        Route::DocumentDragLeave,
        Route::DocumentDragOver,
        Route::DocumentDrop,
        Route::WindowFocus,
    ];

    pub fn scope(self) -> Scope {
        match self {
            Route::ContainerKeyDown
            | Route::ContainerClick
            | Route::ContainerDragEnter
            | Route::ContainerDragLeave
            | Route::ContainerDragOver
            | Route::ContainerDrop => Scope::Container,
            Route::PickerChange | Route::PickerClick => Scope::Picker,
            Route::DocumentDragEnter
            | Route::DocumentDragLeave
            | Route::DocumentDragOver
            | Route::DocumentDrop => Scope::Document,
            Route::WindowFocus => Scope::Window,
        }
    }

    pub fn kind(self) -> EventKind {
        match self {
            Route::ContainerKeyDown => EventKind::KeyDown,
            Route::ContainerClick | Route::PickerClick => EventKind::Click,
            Route::PickerChange => EventKind::Change,
            Route::ContainerDragEnter | Route::DocumentDragEnter => EventKind::DragEnter,
            Route::ContainerDragLeave | Route::DocumentDragLeave => EventKind::DragLeave,
            Route::ContainerDragOver | Route::DocumentDragOver => EventKind::DragOver,
            Route::ContainerDrop | Route::DocumentDrop => EventKind::Drop,
            Route::WindowFocus => EventKind::Focus,
        }
    }

    /// Document and window routes need a browser environment to exist.
    pub fn is_global(self) -> bool {
        matches!(self.scope(), Scope::Document | Scope::Window)
    }
}

/// How much work file extraction should do.
///
/// `Peek` is used while a drag is in flight (enter, leave, over) and only
/// looks at what the platform exposes before the drop. `Full` reads the
/// complete payload of a drop or of a committed picker selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    Peek,
    Full,
}
