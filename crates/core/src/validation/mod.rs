//! Schema-driven validation of PCRS project payloads.
//!
//! Rule engines (`field`, `cross_field`, `sequence`, `reference`) only produce
//! message keys. The [`orchestrator`] walks the schema, runs the engines in
//! layer order and turns keys into addressed, human-readable issues.

pub mod cross_field;
pub mod field;
pub mod messages;
pub mod orchestrator;
pub mod projet;
pub mod reference;
pub mod report;
pub mod schema;
pub mod sequence;

pub use messages::{MessageKey, MessageTable};
pub use orchestrator::{Validator, DEFAULT_LOOKUP_TIMEOUT};
pub use report::{IssueKind, ValidationIssue, ValidationReport};
pub use schema::{EntityKind, Mode, SchemaRegistry};
