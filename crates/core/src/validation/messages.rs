//! Stable message keys and the French message catalogue.
//!
//! Every issue carries a [`MessageKey`] for programmatic handling plus a
//! human-readable message. Messages resolve in this order: caller field
//! override, caller key override, message declared on the schema field,
//! default catalogue entry.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

use super::report::IssueKind;
use super::schema::EntityKind;

/// Machine-checkable identifier of a violated constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    AnyRequired,
    AnyOnly,
    StringBase,
    StringEmpty,
    StringMin,
    StringPattern,
    StringEmail,
    StringUri,
    NumberBase,
    NumberInteger,
    NumberMin,
    BooleanBase,
    ObjectBase,
    ArrayBase,
    ArrayMin,
    DateBase,
    DateInvalid,
    ObjectUnknown,
    BothDiffusionRequired,
    EtapesOrder,
    PerimetreType,
    PerimetreNotFound,
    PerimetreTimeout,
}

impl MessageKey {
    pub const ALL: &'static [MessageKey] = &[
        Self::AnyRequired,
        Self::AnyOnly,
        Self::StringBase,
        Self::StringEmpty,
        Self::StringMin,
        Self::StringPattern,
        Self::StringEmail,
        Self::StringUri,
        Self::NumberBase,
        Self::NumberInteger,
        Self::NumberMin,
        Self::BooleanBase,
        Self::ObjectBase,
        Self::ArrayBase,
        Self::ArrayMin,
        Self::DateBase,
        Self::DateInvalid,
        Self::ObjectUnknown,
        Self::BothDiffusionRequired,
        Self::EtapesOrder,
        Self::PerimetreType,
        Self::PerimetreNotFound,
        Self::PerimetreTimeout,
    ];

    /// Wire representation of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnyRequired => "any.required",
            Self::AnyOnly => "any.only",
            Self::StringBase => "string.base",
            Self::StringEmpty => "string.empty",
            Self::StringMin => "string.min",
            Self::StringPattern => "string.pattern.base",
            Self::StringEmail => "string.email",
            Self::StringUri => "string.uri",
            Self::NumberBase => "number.base",
            Self::NumberInteger => "number.integer",
            Self::NumberMin => "number.min",
            Self::BooleanBase => "boolean.base",
            Self::ObjectBase => "object.base",
            Self::ArrayBase => "array.base",
            Self::ArrayMin => "array.min",
            Self::DateBase => "date.base",
            Self::DateInvalid => "date.invalid",
            Self::ObjectUnknown => "object.unknown",
            Self::BothDiffusionRequired => "both.diffusionRequired",
            Self::EtapesOrder => "etapes.order",
            Self::PerimetreType => "perimetre.type",
            Self::PerimetreNotFound => "perimetre.notFound",
            Self::PerimetreTimeout => "perimetre.timeout",
        }
    }

    /// Error category the key belongs to.
    pub fn kind(&self) -> IssueKind {
        match self {
            Self::ObjectUnknown => IssueKind::Schema,
            Self::BothDiffusionRequired => IssueKind::Entity,
            Self::EtapesOrder => IssueKind::Sequence,
            Self::PerimetreType | Self::PerimetreNotFound | Self::PerimetreTimeout => {
                IssueKind::Reference
            }
            _ => IssueKind::Field,
        }
    }

    /// Default French message for the key.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::AnyRequired => "Ce champ est obligatoire",
            Self::AnyOnly => "Cette valeur n’est pas autorisée",
            Self::StringBase => "La valeur doit être une chaine de caractères",
            Self::StringEmpty => "La valeur ne peut pas être vide",
            Self::StringMin => "La valeur est trop courte",
            Self::StringPattern => "La valeur n’a pas le format attendu",
            Self::StringEmail => "L’adresse courriel n’est pas valide",
            Self::StringUri => "L’URL n’est pas valide",
            Self::NumberBase => "La valeur doit être un nombre",
            Self::NumberInteger => "La valeur doit être un nombre entier",
            Self::NumberMin => "La valeur ne peut pas être négative",
            Self::BooleanBase => "La valeur doit être un booléen",
            Self::ObjectBase => "La valeur doit être un objet",
            Self::ArrayBase => "La valeur doit être un tableau",
            Self::ArrayMin => "Le tableau doit contenir au moins un élément",
            Self::DateBase | Self::DateInvalid => "Date invalide",
            Self::ObjectUnknown => "Une clé de l’objet est invalide",
            Self::BothDiffusionRequired => {
                "Les champs diffusion_url et diffusion_layer doivent être renseignés ensemble ou laissés vides"
            }
            Self::EtapesOrder => "L’ordre des étapes est incorrect",
            Self::PerimetreType => "Le type de territoire est invalide",
            Self::PerimetreNotFound => "Le territoire n’est pas valide",
            Self::PerimetreTimeout => "Le territoire n’a pas pu être vérifié",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MessageKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Caller-supplied message substitutions (e.g. another locale).
#[derive(Debug, Clone, Default)]
pub struct MessageTable {
    by_key: HashMap<MessageKey, String>,
    by_field: HashMap<(EntityKind, String, MessageKey), String>,
}

impl MessageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the message for `key` on every field.
    pub fn with_key(mut self, key: MessageKey, message: impl Into<String>) -> Self {
        self.by_key.insert(key, message.into());
        self
    }

    /// Replace the message for `key` on one field of one entity.
    pub fn with_field(
        mut self,
        entity: EntityKind,
        field: &str,
        key: MessageKey,
        message: impl Into<String>,
    ) -> Self {
        self.by_field
            .insert((entity, field.to_string(), key), message.into());
        self
    }

    /// Resolve the message for an issue.
    pub fn resolve(
        &self,
        entity: EntityKind,
        field: Option<&str>,
        key: MessageKey,
        declared: Option<&str>,
    ) -> String {
        if let Some(field) = field {
            if let Some(msg) = self.by_field.get(&(entity, field.to_string(), key)) {
                return msg.clone();
            }
        }
        if let Some(msg) = self.by_key.get(&key) {
            return msg.clone();
        }
        declared.unwrap_or_else(|| key.default_message()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn keys_are_unique() {
        let wire: HashSet<_> = MessageKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(wire.len(), MessageKey::ALL.len());
    }

    #[test]
    fn key_categories() {
        assert_eq!(MessageKey::ObjectUnknown.kind(), IssueKind::Schema);
        assert_eq!(MessageKey::BothDiffusionRequired.kind(), IssueKind::Entity);
        assert_eq!(MessageKey::EtapesOrder.kind(), IssueKind::Sequence);
        assert_eq!(MessageKey::PerimetreNotFound.kind(), IssueKind::Reference);
        assert_eq!(MessageKey::StringMin.kind(), IssueKind::Field);
    }

    #[test]
    fn serializes_as_wire_string() {
        let json = serde_json::to_value(MessageKey::StringPattern).unwrap();
        assert_eq!(json, "string.pattern.base");
    }

    #[test]
    fn declared_message_beats_default() {
        let table = MessageTable::new();
        let msg = table.resolve(
            EntityKind::Projet,
            Some("nom"),
            MessageKey::StringMin,
            Some("Le nom doit faire plus de trois caractères"),
        );
        assert_eq!(msg, "Le nom doit faire plus de trois caractères");
    }

    #[test]
    fn falls_back_to_default() {
        let table = MessageTable::new();
        let msg = table.resolve(EntityKind::Projet, None, MessageKey::DateInvalid, None);
        assert_eq!(msg, "Date invalide");
    }

    #[test]
    fn field_override_beats_key_override() {
        let table = MessageTable::new()
            .with_key(MessageKey::AnyRequired, "This field is required")
            .with_field(
                EntityKind::Projet,
                "nom",
                MessageKey::AnyRequired,
                "Project name is required",
            );
        assert_eq!(
            table.resolve(EntityKind::Projet, Some("nom"), MessageKey::AnyRequired, None),
            "Project name is required"
        );
        assert_eq!(
            table.resolve(
                EntityKind::Projet,
                Some("regime"),
                MessageKey::AnyRequired,
                Some("La clé \"regime\" est obligatoire"),
            ),
            "This field is required"
        );
    }
}
