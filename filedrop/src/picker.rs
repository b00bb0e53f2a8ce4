//! Picker resolution: which file input a drop zone drives.

use crate::error::InvalidTarget;
use crate::options::Options;
use crate::platform::Platform;

/// The file input bound to a drop zone, resolved once at bind time.
#[derive(Debug, Clone, PartialEq)]
pub enum Picker<E> {
    /// Created by the controller and appended to the container; owned.
    Synthesized(E),
    /// Passed in through the `input` option; borrowed.
    Supplied(E),
    /// The single file input already inside the container; borrowed.
    Embedded(E),
}

impl<E> Picker<E> {
    pub fn element(&self) -> &E {
        match self {
            Picker::Synthesized(element) | Picker::Supplied(element) | Picker::Embedded(element) => {
                element
            }
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, Picker::Synthesized(_))
    }
}

/// Validate the container and find or create its picker.
///
/// An explicit `input` wins and must be a file input. Otherwise the
/// container (which must not be an input itself) may hold at most one file
/// input; with none, a hidden one is synthesized and appended.
pub fn resolve<P: Platform>(
    platform: &P,
    container: &P::Element,
    options: &Options<P::Element>,
) -> Result<Picker<P::Element>, InvalidTarget> {
    if let Some(input) = &options.input {
        if !platform.is_file_input(input) {
            return Err(InvalidTarget::PickerNotFileInput);
        }
        return Ok(Picker::Supplied(input.clone()));
    }
    if platform.is_input(container) {
        return Err(InvalidTarget::ContainerIsInput);
    }

    let mut inputs = platform.file_inputs(container);
    match inputs.len() {
        0 => {
            let input = platform.create_file_input();
            platform.hide(&input);
            platform.set_tab_index(&input, -1);
            platform.append_child(container, &input);
            Ok(Picker::Synthesized(input))
        }
        1 => Ok(Picker::Embedded(inputs.remove(0))),
        count => Err(InvalidTarget::AmbiguousPicker { count }),
    }
}

/// Tab index for the container: its own when focusable, else the picker's,
/// else 0.
pub fn container_tab_index(container: i32, picker: i32) -> i32 {
    if container > -1 {
        container
    } else if picker > -1 {
        picker
    } else {
        0
    }
}
