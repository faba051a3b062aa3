//! View model domain - the accumulator content operations write into
//!
//! A `ViewModelBuilder` collects:
//! - Header fields (overwritable)
//! - Body and overlay components (append-only, fields overwritable by id)
//! - Extension data keyed by the contributing operation
//!
//! `ViewModelBuilder::snapshot` produces the immutable `ViewModel` handed to
//! the UI layer.

mod builder;
mod component;
mod error;
mod snapshot;

pub use builder::ViewModelBuilder;
pub use component::{Component, ComponentKind, Fields, fields};
pub use error::ViewModelError;
pub use snapshot::ViewModel;
