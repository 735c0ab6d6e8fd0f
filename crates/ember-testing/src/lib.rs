//! Testing utilities and harness for Ember

pub mod loader;
pub mod testing;

pub use loader::{load_markup, MarkupLoadError};
pub use testing::*;

pub mod prelude {
    pub use crate::loader::load_markup;
    pub use crate::testing::*;
}
