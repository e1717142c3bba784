pub mod cli;
pub mod engine;
pub mod osbuild;
pub mod validation;

pub use engine::{gen_image_stages, Manifest};

/// Stagehand version as provided by the build environment.
pub const STAGEHAND_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns true if the value is equal to its default value.
pub(crate) fn is_default<T: Default + PartialEq>(t: &T) -> bool {
    t == &T::default()
}
