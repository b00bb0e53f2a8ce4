//! Notifications dispatched on the container.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::options::Options;
use crate::platform::Platform;

/// How the files of a `filedrop` notification arrived.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DropMethod {
    /// Committed through the picker's file dialog
    Input,
    /// Dropped onto the container or, with `windowDrop`, anywhere in the document
    Drop,
}

impl DropMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            DropMethod::Input => "input",
            DropMethod::Drop => "drop",
        }
    }
}

/// File-carrying notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileNotice {
    Drop(DropMethod),
    DragEnter,
    DragLeave,
    DragOver,
    WindowDragLeave,
    WindowDragOver,
}

/// Dialog lifecycle notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogNotice {
    Open,
    Close,
    Cancel,
}

/// Controller flags at the moment a notification was dispatched.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub is_dragging_files: bool,
    pub is_file_dialog_open: bool,
}

pub enum Payload<P: Platform> {
    Files {
        notice: FileNotice,
        files: Vec<P::File>,
        event: Option<P::Event>,
    },
    Dialog(DialogNotice),
}

pub struct Notification<P: Platform> {
    pub id: Option<String>,
    pub options: Options<P::Element>,
    pub snapshot: Snapshot,
    pub payload: Payload<P>,
}

impl<P: Platform> Notification<P> {
    /// Event name the notification is dispatched under.
    pub fn name(&self) -> &'static str {
        match &self.payload {
            Payload::Files { notice, .. } => match notice {
                FileNotice::Drop(_) => "filedrop",
                FileNotice::DragEnter => "filedragenter",
                FileNotice::DragLeave => "filedragleave",
                FileNotice::DragOver => "filedragover",
                FileNotice::WindowDragLeave => "windowfiledragleave",
                FileNotice::WindowDragOver => "windowfiledragover",
            },
            Payload::Dialog(DialogNotice::Open) => "filedialogopen",
            Payload::Dialog(DialogNotice::Close) => "filedialogclose",
            Payload::Dialog(DialogNotice::Cancel) => "filedialogcancel",
        }
    }

    /// Only `filedrop` carries a method.
    pub fn method(&self) -> Option<DropMethod> {
        match &self.payload {
            Payload::Files {
                notice: FileNotice::Drop(method),
                ..
            } => Some(*method),
            _ => None,
        }
    }

    pub fn files(&self) -> &[P::File] {
        match &self.payload {
            Payload::Files { files, .. } => files,
            Payload::Dialog(_) => &[],
        }
    }

    pub fn event(&self) -> Option<&P::Event> {
        match &self.payload {
            Payload::Files { event, .. } => event.as_ref(),
            Payload::Dialog(_) => None,
        }
    }

    pub fn is_dragging_files(&self) -> bool {
        self.snapshot.is_dragging_files
    }

    pub fn is_file_dialog_open(&self) -> bool {
        self.snapshot.is_file_dialog_open
    }
}

impl<P: Platform> fmt::Debug for Notification<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Notification");
        debug
            .field("name", &self.name())
            .field("id", &self.id)
            .field("snapshot", &self.snapshot);
        if let Payload::Files { files, event, .. } = &self.payload {
            debug
                .field("method", &self.method())
                .field("files", files)
                .field("event", event);
        }
        debug.field("options", &self.options).finish()
    }
}
