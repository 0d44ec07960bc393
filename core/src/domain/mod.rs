//! Domain layer: channels, issued codes, identity records and request/response values.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
