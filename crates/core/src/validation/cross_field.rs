//! Cross-field rule engine: relationships between sibling fields.

use serde_json::{Map, Value};

use super::messages::MessageKey;

/// Two fields that must be both present or both absent.
///
/// A field counts as present when its key exists and its value is not null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedFields {
    pub first: &'static str,
    pub second: &'static str,
    pub key: MessageKey,
}

/// A violated cross-field rule, addressed at the field that is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityIssue {
    pub field: &'static str,
    pub key: MessageKey,
}

/// Check every paired-field rule against an already field-checked entity.
pub fn validate_entity(entity: &Map<String, Value>, rules: &[PairedFields]) -> Vec<EntityIssue> {
    rules
        .iter()
        .filter_map(|rule| {
            match (is_present(entity, rule.first), is_present(entity, rule.second)) {
                (true, false) => Some(EntityIssue {
                    field: rule.second,
                    key: rule.key,
                }),
                (false, true) => Some(EntityIssue {
                    field: rule.first,
                    key: rule.key,
                }),
                _ => None,
            }
        })
        .collect()
}

fn is_present(entity: &Map<String, Value>, field: &str) -> bool {
    entity.get(field).is_some_and(|v| !v.is_null())
}
