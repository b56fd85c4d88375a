//! Domain core for the PCRS project tracker.
//!
//! Hosts the schema-driven project validator and the territory registry
//! abstraction it resolves perimeters against. Nothing here touches the
//! database directly; persistence-backed registries live in `pcrs-db`.

pub mod error;
pub mod territory;
pub mod validation;
