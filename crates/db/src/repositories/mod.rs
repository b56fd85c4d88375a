//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod territoire_repo;

pub use territoire_repo::TerritoireRepo;
