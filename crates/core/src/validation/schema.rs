//! Entity schema registry.
//!
//! Each entity is declared once as an [`EntityDefinition`]: a list of field
//! specs (constraint plus the modes in which the field is required) and its
//! cross-field rules. The registry materialises one [`EntitySchema`] per
//! (entity kind, mode) pair.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::cross_field::PairedFields;
use super::field::{
    ArrayRule, FieldConstraint, FieldType, ItemType, NumberRule, StringFormat, StringRule,
};
use super::messages::MessageKey;
use super::sequence::SequenceRule;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Kinds and modes
// ---------------------------------------------------------------------------

/// Entities the validator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Projet,
    Acteur,
    Livrable,
    Subvention,
    Reutilisation,
    Etape,
}

impl EntityKind {
    pub const ALL: &'static [EntityKind] = &[
        Self::Projet,
        Self::Acteur,
        Self::Livrable,
        Self::Subvention,
        Self::Reutilisation,
        Self::Etape,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Projet => "projet",
            Self::Acteur => "acteur",
            Self::Livrable => "livrable",
            Self::Subvention => "subvention",
            Self::Reutilisation => "reutilisation",
            Self::Etape => "etape",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("Unknown entity kind '{s}'"))
    }
}

/// Creation payloads are complete; update payloads are partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Creation,
    Update,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Creation => "creation",
            Self::Update => "update",
        })
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "creation" => Ok(Self::Creation),
            "update" => Ok(Self::Update),
            _ => Err(format!("Unknown validation mode '{s}'")),
        }
    }
}

/// When a field must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Optional,
    /// Required at creation, optional in partial updates.
    Creation,
    /// Required whenever the enclosing object is supplied, in every mode.
    Always,
}

impl Presence {
    pub fn required_in(&self, mode: Mode) -> bool {
        match self {
            Self::Optional => false,
            Self::Creation => mode == Mode::Creation,
            Self::Always => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Field specs
// ---------------------------------------------------------------------------

/// One declared field: name, constraint, presence and custom messages.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub presence: Presence,
    pub constraint: FieldConstraint,
    messages: Vec<(MessageKey, &'static str)>,
    /// Overrides of `messages` that apply in update mode only.
    update_messages: Vec<(MessageKey, &'static str)>,
}

impl FieldSpec {
    fn with_type(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            presence: Presence::Optional,
            constraint: FieldConstraint::new(ty),
            messages: Vec::new(),
            update_messages: Vec::new(),
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::with_type(name, FieldType::String(StringRule::default()))
    }

    pub fn email(name: &'static str) -> Self {
        Self::with_type(
            name,
            FieldType::String(StringRule {
                format: Some(StringFormat::Email),
                ..StringRule::default()
            }),
        )
    }

    pub fn uri(name: &'static str) -> Self {
        Self::with_type(
            name,
            FieldType::String(StringRule {
                format: Some(StringFormat::Uri),
                ..StringRule::default()
            }),
        )
    }

    pub fn one_of(name: &'static str, values: &'static [&'static str]) -> Self {
        Self::with_type(name, FieldType::Enum(values))
    }

    pub fn number(name: &'static str) -> Self {
        Self::with_type(name, FieldType::Number(NumberRule::default()))
    }

    pub fn integer(name: &'static str) -> Self {
        Self::with_type(
            name,
            FieldType::Number(NumberRule {
                integer: true,
                min: None,
            }),
        )
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::with_type(name, FieldType::Boolean)
    }

    pub fn object(name: &'static str) -> Self {
        Self::with_type(name, FieldType::Object)
    }

    pub fn date(name: &'static str) -> Self {
        Self::with_type(name, FieldType::Date)
    }

    /// Array of nested entities.
    pub fn entities(name: &'static str, kind: EntityKind) -> Self {
        Self::with_type(
            name,
            FieldType::Array(ArrayRule {
                items: ItemType::Entity(kind),
                min_items: 0,
                ordering: None,
            }),
        )
    }

    /// Array of `type:code` perimeters.
    pub fn perimetres(name: &'static str) -> Self {
        Self::with_type(
            name,
            FieldType::Array(ArrayRule {
                items: ItemType::Perimetre,
                min_items: 0,
                ordering: None,
            }),
        )
    }

    pub fn required(mut self) -> Self {
        self.presence = Presence::Creation;
        self
    }

    pub fn always_required(mut self) -> Self {
        self.presence = Presence::Always;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.constraint.nullable = true;
        self
    }

    pub fn allow_empty(mut self) -> Self {
        if let FieldType::String(rule) = &mut self.constraint.ty {
            rule.allow_empty = true;
        }
        self
    }

    pub fn min_len(mut self, min: usize) -> Self {
        if let FieldType::String(rule) = &mut self.constraint.ty {
            rule.min_len = Some(min);
        }
        self
    }

    pub fn pattern(mut self, pattern: &'static LazyLock<Regex>) -> Self {
        if let FieldType::String(rule) = &mut self.constraint.ty {
            rule.pattern = Some(pattern);
        }
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        if let FieldType::Number(rule) = &mut self.constraint.ty {
            rule.min = Some(min);
        }
        self
    }

    pub fn min_items(mut self, min: usize) -> Self {
        if let FieldType::Array(rule) = &mut self.constraint.ty {
            rule.min_items = min;
        }
        self
    }

    pub fn ordered_by(mut self, rule: SequenceRule) -> Self {
        if let FieldType::Array(array) = &mut self.constraint.ty {
            array.ordering = Some(rule);
        }
        self
    }

    /// Attach a custom message for one constraint key.
    pub fn message(mut self, key: MessageKey, message: &'static str) -> Self {
        self.messages.push((key, message));
        self
    }

    /// Attach a message for one constraint key that replaces the default
    /// wording when validating changes.
    pub fn update_message(mut self, key: MessageKey, message: &'static str) -> Self {
        self.update_messages.push((key, message));
        self
    }

    /// This spec as it applies in `mode`.
    fn for_mode(&self, mode: Mode) -> Self {
        let mut spec = self.clone();
        if mode == Mode::Update && !spec.update_messages.is_empty() {
            let mut messages = std::mem::take(&mut spec.update_messages);
            messages.append(&mut spec.messages);
            spec.messages = messages;
        }
        spec
    }

    /// Custom message declared for `key`, if any.
    pub fn message_for(&self, key: MessageKey) -> Option<&'static str> {
        self.messages
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, m)| *m)
    }

    pub fn array_rule(&self) -> Option<&ArrayRule> {
        match &self.constraint.ty {
            FieldType::Array(rule) => Some(rule),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Definitions and schemas
// ---------------------------------------------------------------------------

/// Mode-independent declaration of an entity.
#[derive(Debug, Clone)]
pub struct EntityDefinition {
    pub kind: EntityKind,
    pub fields: Vec<FieldSpec>,
    pub paired: Vec<PairedFields>,
}

/// The rule set applied to one entity kind in one mode.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub mode: Mode,
    pub fields: Vec<FieldSpec>,
    pub paired: Vec<PairedFields>,
}

impl EntitySchema {
    fn materialise(definition: &EntityDefinition, mode: Mode) -> Self {
        Self {
            kind: definition.kind,
            mode,
            fields: definition.fields.iter().map(|f| f.for_mode(mode)).collect(),
            paired: definition.paired.clone(),
        }
    }

    pub fn is_required(&self, field: &FieldSpec) -> bool {
        field.presence.required_in(self.mode)
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of the fields required in this schema's mode.
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| self.is_required(f))
            .map(|f| f.name)
            .collect()
    }
}

/// Lookup table from (kind, mode) to schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<(EntityKind, Mode), EntitySchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every PCRS entity in both modes.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for definition in super::projet::definitions() {
            registry.register(&definition);
        }
        registry
    }

    /// Register `definition` for both modes, replacing earlier entries.
    pub fn register(&mut self, definition: &EntityDefinition) {
        for mode in [Mode::Creation, Mode::Update] {
            self.schemas.insert(
                (definition.kind, mode),
                EntitySchema::materialise(definition, mode),
            );
        }
    }

    pub fn schema(&self, kind: EntityKind, mode: Mode) -> Result<&EntitySchema, CoreError> {
        self.schemas
            .get(&(kind, mode))
            .ok_or(CoreError::UnknownSchema { kind, mode })
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
