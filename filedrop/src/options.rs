//! Options accepted by a drop zone and the rules that derive `multiple` and
//! `disabled` from `fileLimit`.
//!
//! The same shape is used on the wire (camelCase, so a JS host can hand its
//! options object over unchanged) and inside notifications, where it reports
//! the resolved configuration that was active when the notification fired.

use serde::{Deserialize, Serialize};

/// Accepted MIME types or extensions for the picker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Accept {
    One(String),
    Many(Vec<String>),
}

impl Accept {
    /// Value for the picker's `accept` attribute, `None` when there is nothing to restrict.
    pub fn attribute(&self) -> Option<String> {
        match self {
            Accept::One(pattern) if !pattern.is_empty() => Some(pattern.clone()),
            Accept::Many(patterns) if !patterns.is_empty() => Some(patterns.join(",")),
            _ => None,
        }
    }
}

impl From<&str> for Accept {
    fn from(pattern: &str) -> Self {
        Accept::One(pattern.to_string())
    }
}

impl From<Vec<String>> for Accept {
    fn from(patterns: Vec<String>) -> Self {
        Accept::Many(patterns)
    }
}

/// Drop zone configuration.
///
/// Every field is optional; `None` means "not specified by the caller", which
/// matters for [`Options::resolve`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", bound(serialize = "", deserialize = ""))]
pub struct Options<E> {
    /// Picker element to use instead of looking one up inside the container.
    #[serde(skip)]
    pub input: Option<E>,
    pub multiple: Option<bool>,
    /// Signed so that negative values coming from JavaScript deserialize;
    /// the resolver rules simply never match them.
    pub file_limit: Option<i64>,
    pub accept: Option<Accept>,
    pub disabled: Option<bool>,
    pub window_drop: Option<bool>,
    pub click_to_upload: Option<bool>,
    pub id: Option<String>,
}

impl<E> Default for Options<E> {
    fn default() -> Self {
        Self {
            input: None,
            multiple: None,
            file_limit: None,
            accept: None,
            disabled: None,
            window_drop: None,
            click_to_upload: None,
            id: None,
        }
    }
}

impl<E> Options<E> {
    pub fn with_input(mut self, input: E) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = Some(multiple);
        self
    }

    pub fn with_file_limit(mut self, file_limit: i64) -> Self {
        self.file_limit = Some(file_limit);
        self
    }

    pub fn with_accept(mut self, accept: impl Into<Accept>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    pub fn with_window_drop(mut self, window_drop: bool) -> Self {
        self.window_drop = Some(window_drop);
        self
    }

    pub fn with_click_to_upload(mut self, click_to_upload: bool) -> Self {
        self.click_to_upload = Some(click_to_upload);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Derive `multiple` and `disabled` from `file_limit`.
    ///
    /// The rules run in a fixed order and later rules overwrite earlier ones:
    ///
    /// 1. `file_limit == 1` turns `multiple` off
    /// 2. `file_limit == 0` disables the drop zone
    /// 3. no `file_limit`, or a limit above one, turns `multiple` on
    /// 4. `multiple` left unspecified with a limit above one, or no limit at
    ///    all, turns `multiple` on
    ///
    /// Contradictions are not reported; e.g. `multiple: true` with
    /// `file_limit: 1` resolves to a single-file picker.
    pub fn resolve(mut self) -> Self {
        if self.file_limit == Some(1) {
            self.multiple = Some(false);
        }
        if self.file_limit == Some(0) {
            self.disabled = Some(true);
        }
        if self.file_limit.is_none_or(|limit| limit > 1) {
            self.multiple = Some(true);
        }
        let above_one = self.file_limit.is_some_and(|limit| limit > 1);
        if (self.multiple.is_none() && above_one) || self.file_limit.is_none() {
            self.multiple = Some(true);
        }
        self
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple.unwrap_or(false)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.unwrap_or(false)
    }

    /// Drops landing outside the container are reported unless turned off.
    pub fn window_drop(&self) -> bool {
        self.window_drop.unwrap_or(true)
    }

    pub fn click_to_upload(&self) -> bool {
        self.click_to_upload.unwrap_or(true)
    }

    pub fn picker_attributes(&self) -> PickerAttributes {
        PickerAttributes {
            multiple: self.is_multiple(),
            accept: self.accept.as_ref().and_then(Accept::attribute),
        }
    }
}

/// Attributes written to the picker on every bind.
///
/// `accept: None` leaves whatever the picker already carries untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PickerAttributes {
    pub multiple: bool,
    pub accept: Option<String>,
}
