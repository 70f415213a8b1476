//! Untrusted decoding
//!
//! The model's `updated_cbn` is an arbitrary JSON document. It is decoded
//! field by field: unknown fields are dropped, optional fields default, and
//! only what the validator needs (node names and states, the three
//! containers) is rejected with a [`DecodeError`]. Edge endpoints, parents
//! and probability rows are content and pass through as written.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use super::{Cbn, Cpd, Edge, Node, PRIOR_KEY};

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("{0} is not a JSON object")]
    NotAnObject(String),
    #[error("{record} is missing required field '{field}'")]
    MissingField { record: String, field: &'static str },
    #[error("field '{field}' of {record} has the wrong type, expected {expected}")]
    WrongType {
        record: String,
        field: &'static str,
        expected: &'static str,
    },
}

impl Cbn {
    /// Decode a CBN from an untrusted JSON value.
    pub fn from_untrusted(value: &Value) -> Result<Self, DecodeError> {
        let obj = as_object(value, "updated_cbn")?;

        let nodes = required_array(obj, "updated_cbn", "nodes")?
            .iter()
            .enumerate()
            .map(|(i, v)| decode_node(v, i))
            .collect::<Result<Vec<_>, _>>()?;

        let edges = required_array(obj, "updated_cbn", "edges")?
            .iter()
            .enumerate()
            .map(|(i, v)| decode_edge(v, i))
            .collect::<Result<Vec<_>, _>>()?;

        let cpds = match obj.get("cpds") {
            None => {
                return Err(DecodeError::MissingField {
                    record: "updated_cbn".to_string(),
                    field: "cpds",
                })
            }
            Some(v) => as_object(v, "cpds")?
                .iter()
                .map(|(name, v)| decode_cpd(v, name).map(|cpd| (name.clone(), cpd)))
                .collect::<Result<IndexMap<_, _>, _>>()?,
        };

        Ok(Self { nodes, edges, cpds })
    }
}

fn decode_node(value: &Value, index: usize) -> Result<Node, DecodeError> {
    let record = format!("node #{}", index);
    let obj = as_object(value, &record)?;
    let name = required_str(obj, &record, "name")?.to_string();

    let record = format!("node '{}'", name);
    let states = string_array(required_array(obj, &record, "states")?, &record, "states")?;
    let observable = obj.get("observable").and_then(Value::as_bool).unwrap_or(false);

    Ok(Node { name, states, observable })
}

fn decode_edge(value: &Value, index: usize) -> Result<Edge, DecodeError> {
    let record = format!("edge #{}", index);
    let obj = as_object(value, &record)?;
    Ok(Edge {
        from: endpoint(obj, &record, "from"),
        to: endpoint(obj, &record, "to"),
    })
}

/// Endpoints are not checked against `nodes`, so a missing one is kept as "".
fn endpoint(obj: &Map<String, Value>, record: &str, field: &str) -> String {
    match obj.get(field) {
        Some(v) => as_text(v),
        None => {
            warn!("{} has no '{}' endpoint", record, field);
            String::new()
        }
    }
}

fn decode_cpd(value: &Value, node: &str) -> Result<Cpd, DecodeError> {
    let record = format!("cpd '{}'", node);
    let obj = as_object(value, &record)?;

    let parents = match obj.get("parents") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(as_text).collect(),
        Some(other) => vec![as_text(other)],
    };

    let probabilities = match obj.get("probabilities") {
        None | Some(Value::Null) => IndexMap::new(),
        Some(Value::Object(rows)) => rows.iter().map(|(key, row)| (key.clone(), row.clone())).collect(),
        // A bare row is read as the prior.
        Some(row @ Value::Array(_)) => IndexMap::from([(PRIOR_KEY.to_string(), row.clone())]),
        Some(other) => {
            warn!("{} has unusable probabilities {}, keeping none", record, other);
            IndexMap::new()
        }
    };

    Ok(Cpd { parents, probabilities })
}

fn as_object<'a>(value: &'a Value, record: &str) -> Result<&'a Map<String, Value>, DecodeError> {
    value
        .as_object()
        .ok_or_else(|| DecodeError::NotAnObject(record.to_string()))
}

fn required_array<'a>(
    obj: &'a Map<String, Value>,
    record: &str,
    field: &'static str,
) -> Result<&'a Vec<Value>, DecodeError> {
    match obj.get(field) {
        None => Err(DecodeError::MissingField { record: record.to_string(), field }),
        Some(v) => v.as_array().ok_or_else(|| wrong_type(record, field, "array")),
    }
}

fn required_str<'a>(obj: &'a Map<String, Value>, record: &str, field: &'static str) -> Result<&'a str, DecodeError> {
    match obj.get(field) {
        None => Err(DecodeError::MissingField { record: record.to_string(), field }),
        Some(v) => v.as_str().ok_or_else(|| wrong_type(record, field, "string")),
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn string_array(items: &[Value], record: &str, field: &'static str) -> Result<Vec<String>, DecodeError> {
    items
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(|| wrong_type(record, field, "array of strings")))
        .collect()
}

fn wrong_type(record: &str, field: &'static str, expected: &'static str) -> DecodeError {
    DecodeError::WrongType {
        record: record.to_string(),
        field,
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_minimal() {
        let value = json!({
            "nodes": [{"name": "Rain", "states": ["No", "Yes"], "observable": true, "colour": "blue"}],
            "edges": [],
            "cpds": {"Rain": {"parents": [], "probabilities": {"": [0.8, 0.2]}, "states": ["No", "Yes"]}}
        });
        let cbn = Cbn::from_untrusted(&value).unwrap();
        assert_eq!(cbn.nodes, vec![Node { name: "Rain".into(), states: vec!["No".into(), "Yes".into()], observable: true }]);
        assert_eq!(cbn.cpds["Rain"].row(""), Some(vec![0.8, 0.2]));
    }

    #[test]
    fn test_observable_defaults_false() {
        let value = json!({"nodes": [{"name": "A", "states": ["x"]}], "edges": [], "cpds": {}});
        let cbn = Cbn::from_untrusted(&value).unwrap();
        assert!(!cbn.nodes[0].observable);
    }

    #[test]
    fn test_node_without_states_is_rejected() {
        let value = json!({"nodes": [{"name": "Orphan"}], "edges": [], "cpds": {}});
        let err = Cbn::from_untrusted(&value).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MissingField { record: "node 'Orphan'".into(), field: "states" }
        );
    }

    #[test]
    fn test_missing_cpds_is_rejected() {
        let value = json!({"nodes": [], "edges": []});
        assert!(matches!(
            Cbn::from_untrusted(&value),
            Err(DecodeError::MissingField { field: "cpds", .. })
        ));
    }

    #[test]
    fn test_content_passes_through() {
        // Dangling edges, non-numeric entries and wrong-length rows are not this layer's concern.
        let value = json!({
            "nodes": [{"name": "A", "states": ["x", "y"]}],
            "edges": [{"from": "A", "to": "Ghost"}],
            "cpds": {"A": {"parents": [], "probabilities": {"": ["high", 0.1, 0.2]}}}
        });
        let cbn = Cbn::from_untrusted(&value).unwrap();
        assert_eq!(cbn.edges[0].to, "Ghost");
        assert_eq!(cbn.cpds["A"].probabilities[""], json!(["high", 0.1, 0.2]));
        assert!(cbn.cpds["A"].row("").is_none());
    }

    #[test]
    fn test_odd_cpd_shapes_pass_through() {
        let value = json!({
            "nodes": [{"name": "Investment", "states": ["Limited", "Adequate"]}],
            "edges": [{"from": "Support", "to": 7}, {"to": "Investment"}],
            "cpds": {
                "Investment": {
                    "parents": ["Support", 3],
                    "probabilities": {
                        "Weak": {"Limited": 0.8, "Adequate": 0.2},
                        "Strong": [0.3, 0.7]
                    }
                },
                "Support": {"parents": "none", "probabilities": [0.6, 0.4]},
                "Other": {"probabilities": 0.5}
            }
        });
        let cbn = Cbn::from_untrusted(&value).unwrap();

        assert_eq!(cbn.edges[0], Edge::new("Support", "7"));
        assert_eq!(cbn.edges[1], Edge::new("", "Investment"));

        let cpd = &cbn.cpds["Investment"];
        assert_eq!(cpd.parents, vec!["Support".to_string(), "3".to_string()]);
        assert_eq!(cpd.probabilities["Weak"], json!({"Limited": 0.8, "Adequate": 0.2}));
        assert!(cpd.row("Weak").is_none());
        assert_eq!(cpd.row("Strong"), Some(vec![0.3, 0.7]));

        assert_eq!(cbn.cpds["Support"].parents, vec!["none".to_string()]);
        assert_eq!(cbn.cpds["Support"].row(""), Some(vec![0.6, 0.4]));
        assert!(cbn.cpds["Other"].probabilities.is_empty());
    }

    #[test]
    fn test_model_order_is_kept() {
        let text = r#"{"nodes": [], "edges": [], "cpds": {
            "Zeta": {"parents": ["P"], "probabilities": {"b": [1.0], "a": [1.0]}},
            "Alpha": {}
        }}"#;
        let value: Value = serde_json::from_str(text).unwrap();
        let cbn = Cbn::from_untrusted(&value).unwrap();
        assert!(cbn.cpds.keys().eq(["Zeta", "Alpha"]));
        assert!(cbn.cpds["Zeta"].probabilities.keys().eq(["b", "a"]));
    }

    #[test]
    fn test_cpd_defaults() {
        let value = json!({"nodes": [], "edges": [], "cpds": {"A": {}}});
        let cbn = Cbn::from_untrusted(&value).unwrap();
        assert_eq!(cbn.cpds["A"], Cpd::default());
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(
            Cbn::from_untrusted(&json!([1, 2])).unwrap_err(),
            DecodeError::NotAnObject("updated_cbn".into())
        );
    }
}
