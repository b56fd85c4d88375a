//! Validation orchestrator: runs every rule layer for one payload.
//!
//! Layers run in order and stop at the first one that reports issues for an
//! entity:
//!
//! 1. closed-schema key check and field rules (nested entities recurse
//!    through the whole pipeline, their issues prefixed with the element path)
//! 2. cross-field rules
//! 3. collection rules on ordered arrays
//! 4. external references (root entity only, lookups run concurrently)

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use super::cross_field::validate_entity;
use super::field::{validate_field, FieldConstraint, FieldType, ItemType};
use super::messages::{MessageKey, MessageTable};
use super::reference::{parse_perimetre, resolve_all, resolve_reference, ReferenceError};
use super::report::{ValidationIssue, ValidationReport};
use super::schema::{EntityKind, EntitySchema, FieldSpec, Mode, SchemaRegistry};
use super::sequence::validate_sequence;
use crate::error::CoreError;
use crate::territory::{Perimetre, TerritoryRegistry};

/// Default bound on a single territory lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Schema-driven validator for PCRS payloads.
///
/// Stateless apart from its configuration; share it behind an `Arc` and call
/// it concurrently.
pub struct Validator {
    registry: SchemaRegistry,
    territories: Arc<dyn TerritoryRegistry>,
    messages: MessageTable,
    lookup_timeout: Duration,
}

/// A perimeter awaiting resolution, with where it came from.
struct PendingReference<'a> {
    path: String,
    field: &'a FieldSpec,
    raw: Value,
}

impl Validator {
    /// Validator over the built-in PCRS schemas with French messages.
    pub fn new(territories: Arc<dyn TerritoryRegistry>) -> Self {
        Self {
            registry: SchemaRegistry::builtin(),
            territories,
            messages: MessageTable::default(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_registry(mut self, registry: SchemaRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_messages(mut self, messages: MessageTable) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn territories(&self) -> &Arc<dyn TerritoryRegistry> {
        &self.territories
    }

    /// Validate a complete project submitted for creation.
    pub async fn validate_creation(&self, payload: &Value) -> Result<Map<String, Value>, CoreError> {
        self.validate(payload, EntityKind::Projet, Mode::Creation)
            .await
    }

    /// Validate a partial project update.
    pub async fn validate_changes(&self, payload: &Value) -> Result<Map<String, Value>, CoreError> {
        self.validate(payload, EntityKind::Projet, Mode::Update).await
    }

    /// Validate `payload` as an entity of `kind` in `mode`.
    ///
    /// Returns the normalised entity, [`CoreError::Invalid`] with every issue
    /// found, or an internal error (unknown schema, registry unavailable).
    pub async fn validate(
        &self,
        payload: &Value,
        kind: EntityKind,
        mode: Mode,
    ) -> Result<Map<String, Value>, CoreError> {
        let schema = self.registry.schema(kind, mode)?;
        let mut issues = Vec::new();

        let Some(normalized) = self.check_entity(kind, mode, payload, "", &mut issues)? else {
            return Err(self.reject(kind, mode, issues));
        };

        self.check_references(schema, &normalized, &mut issues)
            .await?;
        if !issues.is_empty() {
            return Err(self.reject(kind, mode, issues));
        }

        Ok(normalized)
    }

    /// Check a single perimeter string, as used by project forms.
    pub async fn check_perimetre(&self, value: &str) -> Result<Perimetre, CoreError> {
        match resolve_reference(self.territories.as_ref(), value, self.lookup_timeout).await {
            Ok(perimetre) => Ok(perimetre),
            Err(ReferenceError::Invalid(failure)) => {
                let issue = self.issue(
                    EntityKind::Projet,
                    Some("perimetres"),
                    "perimetre".to_string(),
                    failure.key(),
                    None,
                    Some(&Value::String(value.to_string())),
                );
                Err(CoreError::Invalid(ValidationReport::new(vec![issue])))
            }
            Err(ReferenceError::Unavailable(reason)) => Err(CoreError::TerritoryLookup(reason)),
        }
    }

    fn reject(&self, kind: EntityKind, mode: Mode, issues: Vec<ValidationIssue>) -> CoreError {
        tracing::debug!(%kind, %mode, issue_count = issues.len(), "Payload rejected");
        CoreError::Invalid(ValidationReport::new(issues))
    }

    /// Layers 1-3 for one entity. Returns `None` when any issue was recorded
    /// for this entity or its children.
    fn check_entity(
        &self,
        kind: EntityKind,
        mode: Mode,
        value: &Value,
        path: &str,
        issues: &mut Vec<ValidationIssue>,
    ) -> Result<Option<Map<String, Value>>, CoreError> {
        let schema = self.registry.schema(kind, mode)?;

        let Some(object) = value.as_object() else {
            issues.push(self.issue(
                kind,
                None,
                path.to_string(),
                MessageKey::ObjectBase,
                None,
                Some(value),
            ));
            return Ok(None);
        };

        let before = issues.len();

        // Closed schema.
        for (key, raw) in object {
            if !schema.is_declared(key) {
                issues.push(self.issue(
                    kind,
                    Some(key.as_str()),
                    join(path, key),
                    MessageKey::ObjectUnknown,
                    None,
                    Some(raw),
                ));
            }
        }

        // Field rules.
        let mut normalized = Map::new();
        for field in &schema.fields {
            let field_path = join(path, field.name);
            let raw = object.get(field.name);
            match validate_field(raw, &field.constraint, schema.is_required(field)) {
                Err(issue) => issues.push(self.issue(
                    kind,
                    Some(field.name),
                    field_path,
                    issue.key,
                    field.message_for(issue.key),
                    raw,
                )),
                Ok(None) => {}
                Ok(Some(Value::Array(items))) => {
                    let items = self.check_items(kind, mode, field, &items, &field_path, issues)?;
                    normalized.insert(field.name.to_string(), Value::Array(items));
                }
                Ok(Some(value)) => {
                    normalized.insert(field.name.to_string(), value);
                }
            }
        }
        if issues.len() > before {
            return Ok(None);
        }

        // Cross-field rules.
        let entity_issues = validate_entity(&normalized, &schema.paired);
        if !entity_issues.is_empty() {
            for issue in entity_issues {
                let declared = schema
                    .field(issue.field)
                    .and_then(|f| f.message_for(issue.key));
                issues.push(self.issue(
                    kind,
                    Some(issue.field),
                    join(path, issue.field),
                    issue.key,
                    declared,
                    None,
                ));
            }
            return Ok(None);
        }

        // Collection rules.
        for field in &schema.fields {
            let Some(rule) = field.array_rule().and_then(|r| r.ordering.as_ref()) else {
                continue;
            };
            let Some(Value::Array(items)) = normalized.get(field.name) else {
                continue;
            };
            if let Err(key) = validate_sequence(items, rule) {
                issues.push(self.issue(
                    kind,
                    Some(field.name),
                    join(path, field.name),
                    key,
                    field.message_for(key),
                    None,
                ));
            }
        }
        if issues.len() > before {
            return Ok(None);
        }

        Ok(Some(normalized))
    }

    /// Validate the elements of an array field, returning them normalised.
    fn check_items(
        &self,
        kind: EntityKind,
        mode: Mode,
        field: &FieldSpec,
        items: &[Value],
        path: &str,
        issues: &mut Vec<ValidationIssue>,
    ) -> Result<Vec<Value>, CoreError> {
        let Some(rule) = field.array_rule() else {
            return Ok(items.to_vec());
        };

        let perimetre = FieldConstraint::new(FieldType::Perimetre);
        let mut normalized = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let item_path = format!("{path}[{index}]");
            match rule.items {
                ItemType::Entity(child) => {
                    if let Some(entity) = self.check_entity(child, mode, item, &item_path, issues)? {
                        normalized.push(Value::Object(entity));
                    }
                }
                ItemType::Perimetre => match validate_field(Some(item), &perimetre, true) {
                    Ok(Some(value)) => normalized.push(value),
                    Ok(None) => {}
                    Err(issue) => issues.push(self.issue(
                        kind,
                        Some(field.name),
                        item_path,
                        issue.key,
                        field.message_for(issue.key),
                        Some(item),
                    )),
                },
            }
        }

        Ok(normalized)
    }

    /// Layer 4: resolve every perimeter of the root entity.
    async fn check_references(
        &self,
        schema: &EntitySchema,
        normalized: &Map<String, Value>,
        issues: &mut Vec<ValidationIssue>,
    ) -> Result<(), CoreError> {
        let mut pending = Vec::new();
        let mut perimetres = Vec::new();

        for field in &schema.fields {
            if !matches!(field.array_rule(), Some(rule) if rule.items == ItemType::Perimetre) {
                continue;
            }
            let Some(Value::Array(items)) = normalized.get(field.name) else {
                continue;
            };
            for (index, item) in items.iter().enumerate() {
                // Prefixes were checked in the field layer.
                let Some(Ok(perimetre)) = item.as_str().map(parse_perimetre) else {
                    continue;
                };
                pending.push(PendingReference {
                    path: format!("{}[{index}]", field.name),
                    field,
                    raw: item.clone(),
                });
                perimetres.push(perimetre);
            }
        }

        if perimetres.is_empty() {
            return Ok(());
        }

        let results = resolve_all(self.territories.as_ref(), &perimetres, self.lookup_timeout)
            .await
            .map_err(|err| match err {
                ReferenceError::Unavailable(reason) => CoreError::TerritoryLookup(reason),
                ReferenceError::Invalid(failure) => CoreError::TerritoryLookup(failure.to_string()),
            })?;
        for (reference, result) in pending.into_iter().zip(results) {
            if let Err(failure) = result {
                issues.push(self.issue(
                    schema.kind,
                    Some(reference.field.name),
                    reference.path,
                    failure.key(),
                    reference.field.message_for(failure.key()),
                    Some(&reference.raw),
                ));
            }
        }

        Ok(())
    }

    fn issue(
        &self,
        entity: EntityKind,
        field: Option<&str>,
        path: String,
        key: MessageKey,
        declared: Option<&str>,
        value: Option<&Value>,
    ) -> ValidationIssue {
        ValidationIssue {
            kind: key.kind(),
            path,
            key,
            message: self.messages.resolve(entity, field, key, declared),
            // Nested structures are not echoed back.
            value: value.filter(|v| !v.is_array() && !v.is_object()).cloned(),
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::territory::TerritoryIndex;
    use crate::validation::report::IssueKind;

    fn validator() -> Validator {
        Validator::new(Arc::new(TerritoryIndex::from_keys(["commune:75056"])))
    }

    fn report(result: Result<Map<String, Value>, CoreError>) -> ValidationReport {
        match result {
            Err(CoreError::Invalid(report)) => report,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn join_paths() {
        assert_eq!(join("", "nom"), "nom");
        assert_eq!(join("livrables[0]", "nom"), "livrables[0].nom");
    }

    #[tokio::test]
    async fn non_object_payload_is_rejected() {
        let report = report(validator().validate_changes(&json!([1, 2])).await);
        assert_eq!(report.len(), 1);
        assert_eq!(report.issues()[0].key, MessageKey::ObjectBase);
        assert_eq!(report.issues()[0].path, "");
    }

    #[tokio::test]
    async fn nested_issue_paths_are_prefixed() {
        let payload = json!({
            "livrables": [
                {"nom": "Ortho", "nature": "geotiff", "licence": "ouvert_lo"},
                {"nom": "PCRS", "nature": "shapefile", "licence": "ouvert_lo"}
            ]
        });
        let report = report(validator().validate_changes(&payload).await);
        let issue = report.at("livrables[1].nature").expect("issue on second livrable");
        assert_eq!(issue.key, MessageKey::AnyOnly);
        assert_eq!(issue.message, "Cette nature n’est pas valide");
        assert_eq!(issue.value, Some(json!("shapefile")));
    }

    #[tokio::test]
    async fn entity_layer_skipped_when_fields_fail() {
        // Bad `cout` plus an unpaired diffusion: only the field issue shows.
        let payload = json!({
            "livrables": [{"cout": "beaucoup", "diffusion_url": "http://x"}]
        });
        let report = report(validator().validate_changes(&payload).await);
        assert_eq!(report.len(), 1);
        assert_eq!(report.issues()[0].path, "livrables[0].cout");
        assert_eq!(report.count_kind(IssueKind::Entity), 0);
    }

    #[tokio::test]
    async fn custom_message_table_is_used() {
        let validator = validator().with_messages(
            MessageTable::new().with_key(MessageKey::ObjectUnknown, "Unknown key"),
        );
        let report = report(validator.validate_changes(&json!({"extra": 1})).await);
        assert_eq!(report.issues()[0].message, "Unknown key");
        assert_eq!(report.issues()[0].key, MessageKey::ObjectUnknown);
    }

    #[tokio::test]
    async fn empty_registry_is_internal_error() {
        let validator = validator().with_registry(SchemaRegistry::new());
        assert_matches!(
            validator.validate_changes(&json!({})).await,
            Err(CoreError::UnknownSchema { .. })
        );
    }

    #[tokio::test]
    async fn check_perimetre_reports_reference_issue() {
        let validator = validator();
        assert!(validator.check_perimetre("commune:75056").await.is_ok());

        let report = report(
            validator
                .check_perimetre("commune:00000")
                .await
                .map(|_| Map::new()),
        );
        assert_eq!(report.issues()[0].key, MessageKey::PerimetreNotFound);
        assert_eq!(report.issues()[0].kind, IssueKind::Reference);
    }
}
