//! Browser binding for filedrop.
//!
//! [`WebPlatform`] implements [`filedrop::Platform`] over `web-sys`, and the
//! exported `filedrop(node, options)` function gives JavaScript callers a
//! handle with `update` and `destroy`. Notifications arrive as
//! `CustomEvent`s on the container with the payload in `event.detail`.
//!
//! Only the user agent sniffing compiles outside wasm32.

mod user_agent;

#[cfg(target_arch = "wasm32")]
mod bindings;
#[cfg(target_arch = "wasm32")]
mod platform;

#[cfg(target_arch = "wasm32")]
pub use bindings::{FileDropHandle, filedrop};
#[cfg(target_arch = "wasm32")]
pub use platform::{WebListener, WebPlatform};
pub use user_agent::needs_deferred_open;

pub use filedrop::{InvalidTarget, Options};
