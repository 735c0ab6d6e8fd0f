#![doc = r"Interactive renderer for Ember: materializes node trees onto a live surface and keeps it in sync."]

pub mod error;
mod hydrate;
pub mod memory;
mod reconcile;
pub mod root;
pub mod surface;

pub use error::{DomError, DomResult};
pub use memory::MemorySurface;
pub use root::{MountOptions, Root};
pub use surface::{Surface, SurfaceError, SurfaceResult};
