//! Drag-and-drop and click-to-browse file selection for a single container.
//!
//! [`FileDrop::bind`] attaches to a container element, finds or creates the
//! hidden file input ("picker") it drives, and turns the platform's raw
//! drag, drop, click, key, change and focus events into one notification per
//! user action:
//!
//! | name | extra fields |
//! |---|---|
//! | `filedrop` | method (`input` or `drop`), files, event |
//! | `filedialogopen`, `filedialogclose`, `filedialogcancel` | none |
//! | `filedragenter`, `filedragleave`, `filedragover` | files, event |
//! | `windowfiledragleave`, `windowfiledragover` | files, event |
//!
//! Every notification also carries the configured `id`, the resolved
//! options and the `isDraggingFiles` / `isFileDialogOpen` flags.
//!
//! The host environment is abstracted by [`Platform`]; the in-memory
//! implementation in [`platform::memory`] runs without a browser.

mod controller;
mod error;
pub mod event;
pub mod machine;
pub mod notification;
pub mod options;
pub mod picker;
pub mod platform;

#[cfg(test)]
mod testing;

pub use controller::{DISABLED_CLASS, FileDrop, targets_container};
pub use error::InvalidTarget;
pub use event::{EventKind, Extraction, Route, Scope};
pub use machine::{DialogPoll, DropState};
pub use notification::{DialogNotice, DropMethod, FileNotice, Notification, Payload, Snapshot};
pub use options::{Accept, Options, PickerAttributes};
pub use picker::Picker;
pub use platform::{Capabilities, Handler, ListenTarget, Platform};
