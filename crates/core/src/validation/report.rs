//! Validation issue and report types.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::messages::MessageKey;

/// Category of a validation issue.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A single scalar constraint was violated.
    Field,
    /// A cross-field invariant was violated.
    Entity,
    /// A collection-level invariant was violated.
    Sequence,
    /// A perimeter is malformed or does not resolve to a territory.
    Reference,
    /// The payload carries an undeclared key.
    Schema,
}

/// A single user-facing validation failure.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    /// Dotted path to the offending value, e.g. `livrables[0].diffusion_url`.
    pub path: String,
    pub key: MessageKey,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Every issue found in one payload, in discovery order.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn first(&self) -> Option<&ValidationIssue> {
        self.issues.first()
    }

    /// Whether any issue carries `key`.
    pub fn has_key(&self, key: MessageKey) -> bool {
        self.issues.iter().any(|i| i.key == key)
    }

    /// Issue reported at exactly `path`, if any.
    pub fn at(&self, path: &str) -> Option<&ValidationIssue> {
        self.issues.iter().find(|i| i.path == path)
    }

    /// Number of issues of the given kind.
    pub fn count_kind(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issues.first() {
            None => write!(f, "no issues"),
            Some(first) if self.issues.len() == 1 => {
                write!(f, "{}: {}", first.path, first.message)
            }
            Some(first) => write!(
                f,
                "{}: {} (and {} more)",
                first.path,
                first.message,
                self.issues.len() - 1
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue(path: &str, key: MessageKey) -> ValidationIssue {
        ValidationIssue {
            kind: key.kind(),
            path: path.to_string(),
            key,
            message: key.default_message().to_string(),
            value: None,
        }
    }

    #[test]
    fn display_single_issue() {
        let report = ValidationReport::new(vec![issue("nom", MessageKey::AnyRequired)]);
        assert_eq!(report.to_string(), "nom: Ce champ est obligatoire");
    }

    #[test]
    fn display_counts_remaining_issues() {
        let report = ValidationReport::new(vec![
            issue("nom", MessageKey::StringMin),
            issue("livrables", MessageKey::ArrayMin),
            issue("acteurs", MessageKey::ArrayMin),
        ]);
        assert_eq!(
            report.to_string(),
            "nom: La valeur est trop courte (and 2 more)"
        );
    }

    #[test]
    fn serializes_as_array() {
        let report = ValidationReport::new(vec![issue("extra", MessageKey::ObjectUnknown)]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            json!([{
                "kind": "schema",
                "path": "extra",
                "key": "object.unknown",
                "message": "Une clé de l’objet est invalide",
            }])
        );
    }

    #[test]
    fn lookups() {
        let report = ValidationReport::new(vec![
            issue("etapes", MessageKey::EtapesOrder),
            issue("perimetres[0]", MessageKey::PerimetreType),
        ]);
        assert!(report.has_key(MessageKey::EtapesOrder));
        assert!(!report.has_key(MessageKey::AnyRequired));
        assert_eq!(
            report.at("perimetres[0]").map(|i| i.kind),
            Some(IssueKind::Reference)
        );
        assert_eq!(report.count_kind(IssueKind::Sequence), 1);
    }
}
