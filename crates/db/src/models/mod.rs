//! Database DTOs.

pub mod territoire;
