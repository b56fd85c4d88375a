//! Collection rule engine: invariants spanning the elements of an array.

use serde_json::Value;

use super::field::parse_date;
use super::messages::MessageKey;

/// Ordering constraint attached to an array field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceRule {
    /// The date held in `field` must never decrease from one element to the
    /// next. Elements with a null or missing date are not compared.
    NonDecreasingDates { field: &'static str, key: MessageKey },
}

/// Check `items` against `rule`.
///
/// A violated rule yields a single key for the whole array, however many
/// adjacent pairs are out of order.
pub fn validate_sequence(items: &[Value], rule: &SequenceRule) -> Result<(), MessageKey> {
    match rule {
        SequenceRule::NonDecreasingDates { field, key } => {
            let out_of_order = items.windows(2).any(|pair| {
                let previous = pair[0].get(*field).and_then(Value::as_str).and_then(parse_date);
                let current = pair[1].get(*field).and_then(Value::as_str).and_then(parse_date);
                matches!((previous, current), (Some(p), Some(c)) if p > c)
            });
            if out_of_order {
                Err(*key)
            } else {
                Ok(())
            }
        }
    }
}
