//! Role domain values.

pub mod name;

pub use name::RoleName;
