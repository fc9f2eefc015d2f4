//! Filter conversion to Qdrant `Filter`.
//!
//! Currently supports exact equality on scalar fields (`String`, `Number`, `Bool`).
//! All conditions go into `must`, so a filter is a conjunction.

use crate::record::RagFilter;
use qdrant_client::qdrant::{Condition, FieldCondition, Filter, Match, condition::ConditionOneOf};
use tracing::debug;

/// Payload key holding the logical namespace of a point.
pub const NAMESPACE_KEY: &str = "namespace";

/// Converts [`RagFilter`] plus the namespace partition to a Qdrant [`Filter`].
///
/// Currently only supports exact equality for:
/// - `String` → `Keyword`
/// - `Number` → `Integer`
/// - `Bool`   → `Boolean`
pub fn to_qdrant_filter(namespace: &str, f: &RagFilter) -> Filter {
    debug!("filters::to_qdrant_filter equals={}", f.equals.len());

    let mut must: Vec<Condition> = vec![keyword_condition(NAMESPACE_KEY, namespace)];

    for (field, val) in &f.equals {
        let m = match val {
            serde_json::Value::String(s) => Match {
                match_value: Some(qdrant_client::qdrant::r#match::MatchValue::Keyword(
                    s.clone(),
                )),
            },
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Match {
                        match_value: Some(qdrant_client::qdrant::r#match::MatchValue::Integer(i)),
                    }
                } else {
                    continue;
                }
            }
            serde_json::Value::Bool(b) => Match {
                match_value: Some(qdrant_client::qdrant::r#match::MatchValue::Boolean(*b)),
            },
            _ => continue, // skip unsupported types
        };

        must.push(field_condition(field, m));
    }

    Filter {
        must,
        ..Default::default()
    }
}

fn keyword_condition(field: &str, value: &str) -> Condition {
    field_condition(
        field,
        Match {
            match_value: Some(qdrant_client::qdrant::r#match::MatchValue::Keyword(
                value.to_string(),
            )),
        },
    )
}

fn field_condition(field: &str, m: Match) -> Condition {
    Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key: field.to_string(),
            r#match: Some(m),
            ..Default::default()
        })),
    }
}
