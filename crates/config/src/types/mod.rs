//! Configuration types.

mod settings;

pub use settings::{ClientSettings, URI_SEPARATOR};
