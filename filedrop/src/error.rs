use thiserror::Error;

/// Raised by [`FileDrop::bind`](crate::FileDrop::bind) when the container or
/// the supplied picker cannot host a file drop zone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTarget {
    #[error("input must be an input element with type file")]
    PickerNotFileInput,

    #[error("filedrop must be bound to a containing element, not the input itself")]
    ContainerIsInput,

    #[error(
        "container holds {count} file inputs; only a single file input is allowed unless `input` is specified in the options"
    )]
    AmbiguousPicker { count: usize },
}
