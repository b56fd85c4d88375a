//! Field rule engine -- pure logic, one value at a time.
//!
//! A [`FieldConstraint`] describes what a single value may look like. The
//! engine reports the first violated constraint in a fixed precedence:
//! required, type, pattern/enum, semantic (date, URI, email), range.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Number, Value};
use validator::{ValidateEmail, ValidateUrl};

use super::messages::MessageKey;
use super::reference::parse_perimetre;
use super::schema::EntityKind;
use super::sequence::SequenceRule;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid regex"));

/// French landline/mobile numbers, with `0`, `+33` or `0033` prefix. ASCII digits only.
pub static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^((\+)33|0|0033)[1-9]([0-9]{2}){4}$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Constraint vocabulary
// ---------------------------------------------------------------------------

/// Semantic string formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Email,
    Uri,
}

#[derive(Debug, Clone, Default)]
pub struct StringRule {
    pub min_len: Option<usize>,
    pub allow_empty: bool,
    pub pattern: Option<&'static LazyLock<Regex>>,
    pub format: Option<StringFormat>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NumberRule {
    pub integer: bool,
    pub min: Option<f64>,
}

/// What the elements of an array field are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    /// Nested entities validated by their own schema.
    Entity(EntityKind),
    /// `type:code` perimeter strings.
    Perimetre,
}

#[derive(Debug, Clone)]
pub struct ArrayRule {
    pub items: ItemType,
    pub min_items: usize,
    pub ordering: Option<SequenceRule>,
}

#[derive(Debug, Clone)]
pub enum FieldType {
    String(StringRule),
    Enum(&'static [&'static str]),
    Number(NumberRule),
    Boolean,
    Object,
    /// `YYYY-MM-DD` denoting a real calendar date.
    Date,
    /// A `type:code` perimeter with a known territory type.
    Perimetre,
    Array(ArrayRule),
}

/// Declared constraint for one field.
#[derive(Debug, Clone)]
pub struct FieldConstraint {
    pub nullable: bool,
    pub ty: FieldType,
}

impl FieldConstraint {
    pub fn new(ty: FieldType) -> Self {
        Self {
            nullable: false,
            ty,
        }
    }

    /// Key reported when the value has the wrong JSON type.
    pub fn base_key(&self) -> MessageKey {
        match &self.ty {
            FieldType::String(_) | FieldType::Perimetre => MessageKey::StringBase,
            FieldType::Enum(_) => MessageKey::AnyOnly,
            FieldType::Number(_) => MessageKey::NumberBase,
            FieldType::Boolean => MessageKey::BooleanBase,
            FieldType::Object => MessageKey::ObjectBase,
            FieldType::Date => MessageKey::DateBase,
            FieldType::Array(_) => MessageKey::ArrayBase,
        }
    }
}

/// A violated field constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub key: MessageKey,
}

impl FieldIssue {
    fn new(key: MessageKey) -> Self {
        Self { key }
    }
}

impl From<MessageKey> for FieldIssue {
    fn from(key: MessageKey) -> Self {
        Self::new(key)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Validate one field value.
///
/// `value` is `None` when the key is absent from the payload. Returns the
/// normalised value (`None` when absent and optional). Arrays are only
/// checked for shape and length; their elements are the caller's concern.
pub fn validate_field(
    value: Option<&Value>,
    constraint: &FieldConstraint,
    required: bool,
) -> Result<Option<Value>, FieldIssue> {
    let value = match value {
        None if required => return Err(MessageKey::AnyRequired.into()),
        None => return Ok(None),
        Some(v) => v,
    };

    if value.is_null() {
        return if constraint.nullable {
            Ok(Some(Value::Null))
        } else {
            Err(constraint.base_key().into())
        };
    }

    check_value(value, &constraint.ty).map(Some)
}

fn check_value(value: &Value, ty: &FieldType) -> Result<Value, FieldIssue> {
    match ty {
        FieldType::String(rule) => check_string(value, rule),
        FieldType::Enum(allowed) => match value.as_str() {
            Some(s) if allowed.contains(&s) => Ok(value.clone()),
            _ => Err(MessageKey::AnyOnly.into()),
        },
        FieldType::Number(rule) => check_number(value, rule),
        FieldType::Boolean => check_boolean(value),
        FieldType::Object if value.is_object() => Ok(value.clone()),
        FieldType::Object => Err(MessageKey::ObjectBase.into()),
        FieldType::Date => check_date(value),
        FieldType::Perimetre => check_perimetre(value),
        FieldType::Array(rule) => match value.as_array() {
            None => Err(MessageKey::ArrayBase.into()),
            Some(items) if items.len() < rule.min_items => Err(MessageKey::ArrayMin.into()),
            Some(_) => Ok(value.clone()),
        },
    }
}

fn check_string(value: &Value, rule: &StringRule) -> Result<Value, FieldIssue> {
    let s = value.as_str().ok_or(FieldIssue::new(MessageKey::StringBase))?;

    if s.is_empty() {
        return if rule.allow_empty {
            Ok(value.clone())
        } else {
            Err(MessageKey::StringEmpty.into())
        };
    }

    if let Some(pattern) = rule.pattern {
        if !pattern.is_match(s) {
            return Err(MessageKey::StringPattern.into());
        }
    }

    match rule.format {
        Some(StringFormat::Email) if !s.validate_email() => {
            return Err(MessageKey::StringEmail.into())
        }
        Some(StringFormat::Uri) if !s.validate_url() => return Err(MessageKey::StringUri.into()),
        _ => {}
    }

    if let Some(min) = rule.min_len {
        if s.chars().count() < min {
            return Err(MessageKey::StringMin.into());
        }
    }

    Ok(value.clone())
}

/// Numbers may arrive as numeric strings; those are converted.
fn check_number(value: &Value, rule: &NumberRule) -> Result<Value, FieldIssue> {
    let number = match value {
        Value::Number(n) => n.clone(),
        Value::String(s) => parse_number(s).ok_or(FieldIssue::new(MessageKey::NumberBase))?,
        _ => return Err(MessageKey::NumberBase.into()),
    };

    let as_f64 = number
        .as_f64()
        .ok_or(FieldIssue::new(MessageKey::NumberBase))?;

    if rule.integer && !is_integral(&number, as_f64) {
        return Err(MessageKey::NumberInteger.into());
    }

    if let Some(min) = rule.min {
        if as_f64 < min {
            return Err(MessageKey::NumberMin.into());
        }
    }

    Ok(Value::Number(number))
}

fn is_integral(number: &Number, as_f64: f64) -> bool {
    number.is_i64() || number.is_u64() || as_f64.fract() == 0.0
}

fn parse_number(s: &str) -> Option<Number> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Number::from(i));
    }
    let f = trimmed.parse::<f64>().ok().filter(|f| f.is_finite())?;
    Number::from_f64(f)
}

fn check_boolean(value: &Value) -> Result<Value, FieldIssue> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
        _ => Err(MessageKey::BooleanBase.into()),
    }
}

fn check_date(value: &Value) -> Result<Value, FieldIssue> {
    let s = value
        .as_str()
        .filter(|s| DATE_RE.is_match(s))
        .ok_or(FieldIssue::new(MessageKey::DateBase))?;
    parse_date(s).ok_or(FieldIssue::new(MessageKey::DateInvalid))?;
    Ok(value.clone())
}

fn check_perimetre(value: &Value) -> Result<Value, FieldIssue> {
    let s = value.as_str().ok_or(FieldIssue::new(MessageKey::StringBase))?;
    if s.is_empty() {
        return Err(MessageKey::StringEmpty.into());
    }
    parse_perimetre(s).map_err(|failure| FieldIssue::new(failure.key()))?;
    Ok(value.clone())
}

/// Parse a `YYYY-MM-DD` date, rejecting impossible calendar dates.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if !DATE_RE.is_match(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn string() -> FieldConstraint {
        FieldConstraint::new(FieldType::String(StringRule::default()))
    }

    fn key_of(result: Result<Option<Value>, FieldIssue>) -> MessageKey {
        result.expect_err("expected a field issue").key
    }

    #[test]
    fn missing_required_field() {
        assert_eq!(key_of(validate_field(None, &string(), true)), MessageKey::AnyRequired);
    }

    #[test]
    fn missing_optional_field_is_absent() {
        assert_eq!(validate_field(None, &string(), false), Ok(None));
    }

    #[test]
    fn null_on_nullable_field_passes() {
        let mut c = string();
        c.nullable = true;
        assert_eq!(
            validate_field(Some(&Value::Null), &c, true),
            Ok(Some(Value::Null))
        );
    }

    #[test]
    fn null_on_non_nullable_field_is_type_error() {
        assert_eq!(
            key_of(validate_field(Some(&Value::Null), &string(), false)),
            MessageKey::StringBase
        );
    }

    #[test]
    fn string_rejects_number() {
        assert_eq!(
            key_of(validate_field(Some(&json!(42)), &string(), false)),
            MessageKey::StringBase
        );
    }

    #[test]
    fn string_rejects_empty_unless_allowed() {
        assert_eq!(
            key_of(validate_field(Some(&json!("")), &string(), false)),
            MessageKey::StringEmpty
        );
        let c = FieldConstraint::new(FieldType::String(StringRule {
            allow_empty: true,
            ..StringRule::default()
        }));
        assert!(validate_field(Some(&json!("")), &c, false).is_ok());
    }

    #[test]
    fn string_min_length_counts_chars() {
        let c = FieldConstraint::new(FieldType::String(StringRule {
            min_len: Some(3),
            ..StringRule::default()
        }));
        assert_eq!(
            key_of(validate_field(Some(&json!("AB")), &c, true)),
            MessageKey::StringMin
        );
        assert!(validate_field(Some(&json!("Île")), &c, true).is_ok());
    }

    #[test]
    fn phone_pattern() {
        let c = FieldConstraint::new(FieldType::String(StringRule {
            pattern: Some(&PHONE_RE),
            ..StringRule::default()
        }));
        assert!(validate_field(Some(&json!("0612345678")), &c, false).is_ok());
        assert!(validate_field(Some(&json!("+33612345678")), &c, false).is_ok());
        assert_eq!(
            key_of(validate_field(Some(&json!("12345")), &c, false)),
            MessageKey::StringPattern
        );
        // Arabic-Indic digits
        let arabic = json!("06\u{661}\u{662}\u{663}\u{664}\u{665}\u{666}\u{667}\u{668}");
        assert_eq!(
            key_of(validate_field(Some(&arabic), &c, false)),
            MessageKey::StringPattern
        );
    }

    #[test]
    fn date_rejects_non_ascii_digits() {
        assert_eq!(parse_date("2024-03-15"), NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(parse_date("\u{662}\u{660}\u{662}\u{664}-03-15"), None);
    }

    #[test]
    fn email_and_uri_formats() {
        let email = FieldConstraint::new(FieldType::String(StringRule {
            format: Some(StringFormat::Email),
            ..StringRule::default()
        }));
        assert!(validate_field(Some(&json!("contact@ign.fr")), &email, false).is_ok());
        assert_eq!(
            key_of(validate_field(Some(&json!("not-an-email")), &email, false)),
            MessageKey::StringEmail
        );

        let uri = FieldConstraint::new(FieldType::String(StringRule {
            format: Some(StringFormat::Uri),
            ..StringRule::default()
        }));
        assert!(validate_field(Some(&json!("https://data.geopf.fr/wms")), &uri, false).is_ok());
        assert_eq!(
            key_of(validate_field(Some(&json!("pas une url")), &uri, false)),
            MessageKey::StringUri
        );
    }

    #[test]
    fn pattern_reported_before_min_length() {
        let c = FieldConstraint::new(FieldType::String(StringRule {
            min_len: Some(20),
            pattern: Some(&PHONE_RE),
            ..StringRule::default()
        }));
        assert_eq!(
            key_of(validate_field(Some(&json!("abc")), &c, false)),
            MessageKey::StringPattern
        );
    }

    #[test]
    fn enum_membership() {
        let c = FieldConstraint::new(FieldType::Enum(&["wms", "wfs"]));
        assert!(validate_field(Some(&json!("wms")), &c, false).is_ok());
        assert_eq!(
            key_of(validate_field(Some(&json!("ftp")), &c, false)),
            MessageKey::AnyOnly
        );
        assert_eq!(
            key_of(validate_field(Some(&json!(1)), &c, false)),
            MessageKey::AnyOnly
        );
    }

    #[test]
    fn integer_and_minimum() {
        let c = FieldConstraint::new(FieldType::Number(NumberRule {
            integer: true,
            min: Some(0.0),
        }));
        assert_eq!(validate_field(Some(&json!(500)), &c, false), Ok(Some(json!(500))));
        assert_eq!(
            key_of(validate_field(Some(&json!(1.5)), &c, false)),
            MessageKey::NumberInteger
        );
        assert_eq!(
            key_of(validate_field(Some(&json!(-1)), &c, false)),
            MessageKey::NumberMin
        );
        assert_eq!(
            key_of(validate_field(Some(&json!(true)), &c, false)),
            MessageKey::NumberBase
        );
    }

    #[test]
    fn numeric_strings_are_converted() {
        let c = FieldConstraint::new(FieldType::Number(NumberRule::default()));
        assert_eq!(
            validate_field(Some(&json!("123456789")), &c, true),
            Ok(Some(json!(123456789)))
        );
        assert_eq!(
            validate_field(Some(&json!(" 12.5 ")), &c, true),
            Ok(Some(json!(12.5)))
        );
        assert_eq!(
            key_of(validate_field(Some(&json!("douze")), &c, true)),
            MessageKey::NumberBase
        );
    }

    #[test]
    fn float_with_zero_fraction_counts_as_integer() {
        let c = FieldConstraint::new(FieldType::Number(NumberRule {
            integer: true,
            min: None,
        }));
        assert!(validate_field(Some(&json!(35.0)), &c, false).is_ok());
    }

    #[test]
    fn boolean_accepts_literal_strings() {
        let c = FieldConstraint::new(FieldType::Boolean);
        assert_eq!(validate_field(Some(&json!("true")), &c, false), Ok(Some(json!(true))));
        assert_eq!(
            key_of(validate_field(Some(&json!("oui")), &c, false)),
            MessageKey::BooleanBase
        );
    }

    #[test]
    fn object_type() {
        let c = FieldConstraint::new(FieldType::Object);
        assert!(validate_field(Some(&json!({"host": "ftp.ign.fr"})), &c, false).is_ok());
        assert_eq!(
            key_of(validate_field(Some(&json!([1])), &c, false)),
            MessageKey::ObjectBase
        );
    }

    #[test]
    fn dates_must_be_real_calendar_days() {
        let c = FieldConstraint::new(FieldType::Date);
        assert!(validate_field(Some(&json!("2024-02-29")), &c, true).is_ok());
        assert_eq!(
            key_of(validate_field(Some(&json!("2024-02-30")), &c, true)),
            MessageKey::DateInvalid
        );
        assert_eq!(
            key_of(validate_field(Some(&json!("2023-13-01")), &c, true)),
            MessageKey::DateInvalid
        );
        assert_eq!(
            key_of(validate_field(Some(&json!("01/02/2024")), &c, true)),
            MessageKey::DateBase
        );
        assert_eq!(
            key_of(validate_field(Some(&json!(20240101)), &c, true)),
            MessageKey::DateBase
        );
    }

    #[test]
    fn perimetre_prefix_checked() {
        let c = FieldConstraint::new(FieldType::Perimetre);
        assert!(validate_field(Some(&json!("commune:75056")), &c, true).is_ok());
        assert_eq!(
            key_of(validate_field(Some(&json!("region:11")), &c, true)),
            MessageKey::PerimetreType
        );
        assert_eq!(
            key_of(validate_field(Some(&json!(75056)), &c, true)),
            MessageKey::StringBase
        );
    }

    #[test]
    fn array_shape_and_length() {
        let c = FieldConstraint::new(FieldType::Array(ArrayRule {
            items: ItemType::Perimetre,
            min_items: 1,
            ordering: None,
        }));
        assert_eq!(
            key_of(validate_field(Some(&json!("commune:75056")), &c, true)),
            MessageKey::ArrayBase
        );
        assert_eq!(
            key_of(validate_field(Some(&json!([])), &c, true)),
            MessageKey::ArrayMin
        );
        assert!(validate_field(Some(&json!(["commune:75056"])), &c, true).is_ok());
    }
}
