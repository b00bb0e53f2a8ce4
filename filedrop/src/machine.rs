//! Interaction state machine - decides what every platform event means.
//!
//! The machine is pure: it receives a route, the event and a few facts the
//! controller looked up through the platform, updates its two flags and
//! returns a [`Reaction`] describing the side effects. The controller carries
//! those out (default prevention, dialog opening, file extraction, dispatch).
//!
//! ## Flags
//!
//! `dragging_files` and `dialog_open` are independent; both can be true at
//! once (files dragged over the page while the dialog is up).
//!
//! ```text
//! container/document dragenter|dragover (files) -> dragging_files = true
//! document dragleave (files)                    -> dragging_files = false
//! drop (files)                                  -> dragging_files = false
//! picker click                                  -> dialog_open = true
//! window focus while dialog_open                -> dialog_open = false, poll
//! ```
//!
//! Drags without files never change a flag and never emit.

use std::time::Duration;

use crate::event::{Extraction, Route};
use crate::notification::{DialogNotice, DropMethod, FileNotice, Snapshot};

/// Facts about an event the machine cannot determine on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Facts {
    /// The drag payload carries files.
    pub has_files: bool,
    /// Space or Enter.
    pub activation_key: bool,
    /// The event target is the container or one of its descendants.
    pub inside_container: bool,
    /// Drops outside the container are reported.
    pub window_drop: bool,
}

/// Notification the controller should send for this event.
#[derive(Debug, Clone, PartialEq)]
pub enum Emit<E> {
    /// Dispatch right away.
    Dialog(DialogNotice),
    /// Extract files from `source`, then dispatch with `event` attached.
    Files {
        notice: FileNotice,
        extraction: Extraction,
        source: E,
        event: Option<E>,
    },
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction<E> {
    pub prevent_default: bool,
    pub stop_propagation: bool,
    pub open_dialog: bool,
    pub start_dialog_poll: bool,
    pub emit: Option<Emit<E>>,
}

impl<E> Default for Reaction<E> {
    fn default() -> Self {
        Self {
            prevent_default: false,
            stop_propagation: false,
            open_dialog: false,
            start_dialog_poll: false,
            emit: None,
        }
    }
}

impl<E> Reaction<E> {
    pub fn is_noop(&self) -> bool {
        !self.prevent_default
            && !self.stop_propagation
            && !self.open_dialog
            && !self.start_dialog_poll
            && self.emit.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct DropState<E> {
    dialog_open: bool,
    dragging_files: bool,
    trigger: Option<E>,
}

impl<E> Default for DropState<E> {
    fn default() -> Self {
        Self {
            dialog_open: false,
            dragging_files: false,
            trigger: None,
        }
    }
}

impl<E: Clone> DropState<E> {
    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    pub fn is_dragging_files(&self) -> bool {
        self.dragging_files
    }

    /// Event that last activated the picker or dropped files on the container.
    pub fn trigger(&self) -> Option<&E> {
        self.trigger.as_ref()
    }

    /// Forget any open dialog, live drag and trigger. Used on teardown:
    /// the events that would have resolved them are no longer observed.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            is_dragging_files: self.dragging_files,
            is_file_dialog_open: self.dialog_open,
        }
    }

    pub fn react(&mut self, route: Route, event: &E, facts: Facts) -> Reaction<E> {
        let mut reaction = Reaction::default();

        match route {
            Route::ContainerKeyDown => {
                self.trigger = Some(event.clone());
                if facts.activation_key {
                    reaction.prevent_default = true;
                    reaction.open_dialog = true;
                }
            }
            Route::ContainerClick => {
                self.trigger = Some(event.clone());
                reaction.open_dialog = true;
            }
            Route::PickerClick => {
                // Keeps the click from bubbling back into the container handler
                reaction.stop_propagation = true;
                self.dialog_open = true;
                reaction.emit = Some(Emit::Dialog(DialogNotice::Open));
            }
            Route::PickerChange => {
                reaction.prevent_default = true;
                reaction.emit = Some(Emit::Files {
                    notice: FileNotice::Drop(DropMethod::Input),
                    extraction: Extraction::Full,
                    source: event.clone(),
                    event: self.trigger.clone(),
                });
            }
            Route::WindowFocus => {
                if self.dialog_open {
                    self.dialog_open = false;
                    reaction.start_dialog_poll = true;
                }
            }
            drag_route => {
                if !facts.has_files {
                    return reaction;
                }
                self.react_to_file_drag(drag_route, event, facts, &mut reaction);
            }
        }

        reaction
    }

    fn react_to_file_drag(&mut self, route: Route, event: &E, facts: Facts, reaction: &mut Reaction<E>) {
        let peek = |notice| Emit::Files {
            notice,
            extraction: Extraction::Peek,
            source: event.clone(),
            event: Some(event.clone()),
        };

        match route {
            Route::ContainerDragEnter => {
                self.dragging_files = true;
                reaction.emit = Some(peek(FileNotice::DragEnter));
            }
            Route::ContainerDragLeave => {
                // Leaving the container does not end the drag; the document
                // handler decides that.
                self.dragging_files = true;
                reaction.emit = Some(peek(FileNotice::DragLeave));
            }
            Route::ContainerDragOver => {
                self.dragging_files = true;
                reaction.emit = Some(peek(FileNotice::DragOver));
            }
            Route::ContainerDrop => {
                reaction.prevent_default = true;
                self.trigger = Some(event.clone());
                self.dragging_files = false;
                reaction.emit = Some(Emit::Files {
                    notice: FileNotice::Drop(DropMethod::Drop),
                    extraction: Extraction::Full,
                    source: event.clone(),
                    event: Some(event.clone()),
                });
            }
            Route::DocumentDragEnter => {
                self.dragging_files = true;
            }
            Route::DocumentDragLeave => {
                self.dragging_files = false;
                reaction.emit = Some(peek(FileNotice::WindowDragLeave));
            }
            Route::DocumentDragOver => {
                reaction.prevent_default = true;
                self.dragging_files = true;
                reaction.emit = Some(peek(FileNotice::WindowDragOver));
            }
            Route::DocumentDrop => {
                if facts.inside_container {
                    // Handled by the container route on its way up
                    return;
                }
                reaction.prevent_default = true;
                self.dragging_files = false;
                if facts.window_drop {
                    reaction.emit = Some(Emit::Files {
                        notice: FileNotice::Drop(DropMethod::Drop),
                        extraction: Extraction::Full,
                        source: event.clone(),
                        event: Some(event.clone()),
                    });
                }
            }
            Route::ContainerKeyDown
            | Route::ContainerClick
            | Route::PickerClick
            | Route::PickerChange
            | Route::WindowFocus => {}
        }
    }
}

/// Outcome of one dialog poll attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    Retry,
    Selected,
    Cancelled,
}

/// Bounded poll that turns "the window got focus back" into a close or a
/// cancel of the file dialog.
///
/// Browsers report no event when the dialog is dismissed, and the picker's
/// file list may fill in a little after focus returns, so the picker is
/// checked every [`DialogPoll::INTERVAL`] until files show up or the attempts
/// run out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogPoll {
    interval: Duration,
    max_attempts: u32,
    attempts: u32,
}

impl Default for DialogPoll {
    fn default() -> Self {
        Self::new(Self::INTERVAL, Self::MAX_ATTEMPTS)
    }
}

impl DialogPoll {
    pub const INTERVAL: Duration = Duration::from_millis(35);
    pub const MAX_ATTEMPTS: u32 = 21;

    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
            attempts: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Longest time the poll can run before giving up.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }

    pub fn check(&mut self, file_count: usize) -> PollStep {
        self.attempts += 1;
        if file_count > 0 {
            PollStep::Selected
        } else if self.attempts >= self.max_attempts {
            PollStep::Cancelled
        } else {
            PollStep::Retry
        }
    }
}
