//! Subject domain values.

pub mod model;

pub use model::Subject;
