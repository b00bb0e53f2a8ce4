//! JavaScript entry point.
//!
//! ```js
//! const handle = filedrop(node, { fileLimit: 1, accept: ".png" });
//! node.addEventListener("filedrop", (e) => upload(e.detail.files));
//! handle.update({ disabled: true });
//! handle.destroy();
//! ```

use filedrop::{FileDrop, InvalidTarget, Options};
use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::platform::WebPlatform;

/// Controller for one bound container.
#[wasm_bindgen]
pub struct FileDropHandle {
    inner: FileDrop<WebPlatform>,
}

#[wasm_bindgen]
impl FileDropHandle {
    /// Apply new options. The picker chosen at bind time is kept.
    pub fn update(&self, options: JsValue) -> Result<(), JsError> {
        self.inner.update(options_from_js(options)?);
        Ok(())
    }

    /// Remove every listener and any picker the binding created.
    pub fn destroy(&self) {
        self.inner.destroy();
    }

    #[wasm_bindgen(getter, js_name = isDraggingFiles)]
    pub fn is_dragging_files(&self) -> bool {
        self.inner.is_dragging_files()
    }

    #[wasm_bindgen(getter, js_name = isFileDialogOpen)]
    pub fn is_file_dialog_open(&self) -> bool {
        self.inner.is_file_dialog_open()
    }
}

/// Bind drag-and-drop and click-to-browse file selection to `node`.
#[wasm_bindgen]
pub fn filedrop(node: Element, options: JsValue) -> Result<FileDropHandle, JsError> {
    let platform =
        WebPlatform::new().ok_or_else(|| JsError::new("filedrop needs a window with a document"))?;
    let options = options_from_js(options)?;
    let inner = FileDrop::bind(platform, node, options)?;
    Ok(FileDropHandle { inner })
}

/// Plain fields go through serde; `input` is a live element and is read
/// separately.
fn options_from_js(value: JsValue) -> Result<Options<Element>, JsError> {
    if value.is_undefined() || value.is_null() {
        return Ok(Options::default());
    }
    let input = Reflect::get(&value, &JsValue::from_str("input"))
        .ok()
        .filter(|input| !input.is_undefined() && !input.is_null());
    let mut options: Options<Element> = serde_wasm_bindgen::from_value(value)?;
    options.input = input
        .map(|input| {
            input
                .dyn_into::<Element>()
                .map_err(|_| InvalidTarget::PickerNotFileInput)
        })
        .transpose()?;
    Ok(options)
}
