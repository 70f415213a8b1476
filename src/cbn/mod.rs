//! CBN Module
//!
//! Causal Bayesian Network description: nodes, directed edges and one
//! conditional probability distribution per node, in the JSON shape shared
//! with the model and the renderers.

mod decode;
mod key;
mod validate;

pub use decode::DecodeError;
pub use key::{decode_key, encode_key, KEY_SEPARATOR, PRIOR_KEY};
pub use validate::{ensure_cpds, RepairReport, ValidationError};

use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use serde_json::{json, Value};

/// A named variable and its ordered states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub states: Vec<String>,
    #[serde(default)]
    pub observable: bool,
}

impl Node {
    pub fn new<S: Into<String>>(name: impl Into<String>, states: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            states: states.into_iter().map(Into::into).collect(),
            observable: true,
        }
    }
}

/// Directed edge between two node names. Not checked against `nodes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self { from: from.into(), to: to.into() }
    }
}

/// Conditional probability distribution for one node.
///
/// `probabilities` is keyed by the flattened parent-state key (see
/// [`encode_key`]), in the order the rows were written. Each row is kept as
/// the raw JSON value the model produced, usually an array of numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Cpd {
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub probabilities: IndexMap<String, Value>,
}

impl Cpd {
    /// Unconditional distribution stored under the `""` key.
    pub fn prior(distribution: impl IntoIterator<Item = f64>) -> Self {
        let mut probabilities = IndexMap::new();
        probabilities.insert(PRIOR_KEY.to_string(), distribution.into_iter().collect());
        Self { parents: Vec::new(), probabilities }
    }

    /// Uniform prior over `k` states.
    pub fn uniform(k: usize) -> Self {
        Self::prior(std::iter::repeat(1.0 / k as f64).take(k))
    }

    pub fn conditional<P, K>(parents: impl IntoIterator<Item = P>, rows: impl IntoIterator<Item = (K, Vec<f64>)>) -> Self
    where
        P: Into<String>,
        K: Into<String>,
    {
        Self {
            parents: parents.into_iter().map(Into::into).collect(),
            probabilities: rows
                .into_iter()
                .map(|(k, row)| (k.into(), Value::from(row)))
                .collect(),
        }
    }

    pub fn is_prior(&self) -> bool {
        self.probabilities.contains_key(PRIOR_KEY)
    }

    /// Parent-state assignment encoded by `key`, paired with this CPD's parents.
    pub fn assignment<'a>(&'a self, key: &'a str) -> Option<Vec<(&'a str, &'a str)>> {
        decode_key(&self.parents, key)
    }

    /// A row as floats, if it is an array of numbers.
    pub fn row(&self, key: &str) -> Option<Vec<f64>> {
        self.probabilities.get(key)?.as_array()?.iter().map(Value::as_f64).collect()
    }
}

/// The network passed between turns. Never mutated once accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Cbn {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub cpds: IndexMap<String, Cpd>,
}

impl Cbn {
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Nodes with no entry in `cpds`.
    pub fn missing_cpds(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|n| !self.cpds.contains_key(&n.name))
    }

    /// Structure-only view handed to the interpretation request.
    pub fn structure(&self) -> Value {
        json!({ "nodes": self.nodes, "edges": self.edges })
    }

    /// Marine ecosystem restoration network used as the starting state.
    pub fn seagrass_restoration() -> Self {
        let nodes = vec![
            Node::new("Water Quality", ["Poor", "Good"]),
            Node::new("Seagrass Biomass", ["Low", "Medium", "High"]),
            Node::new("Carbon Sequestration", ["Low", "High"]),
            Node::new("Restoration Investment", ["Limited", "Adequate"]),
            Node::new("Local Support", ["Weak", "Strong"]),
        ];
        let edges = vec![
            Edge::new("Water Quality", "Seagrass Biomass"),
            Edge::new("Seagrass Biomass", "Carbon Sequestration"),
            Edge::new("Restoration Investment", "Water Quality"),
            Edge::new("Restoration Investment", "Seagrass Biomass"),
            Edge::new("Local Support", "Restoration Investment"),
        ];

        let mut cpds = IndexMap::new();
        cpds.insert("Local Support".to_string(), Cpd::prior([0.6, 0.4]));
        cpds.insert(
            "Restoration Investment".to_string(),
            Cpd::conditional(["Local Support"], [("Weak", vec![0.8, 0.2]), ("Strong", vec![0.3, 0.7])]),
        );
        cpds.insert(
            "Water Quality".to_string(),
            Cpd::conditional(
                ["Restoration Investment"],
                [("Limited", vec![0.7, 0.3]), ("Adequate", vec![0.3, 0.7])],
            ),
        );
        cpds.insert(
            "Seagrass Biomass".to_string(),
            Cpd::conditional(
                ["Water Quality", "Restoration Investment"],
                [
                    ("Poor_Limited", vec![0.7, 0.2, 0.1]),
                    ("Poor_Adequate", vec![0.5, 0.3, 0.2]),
                    ("Good_Limited", vec![0.3, 0.4, 0.3]),
                    ("Good_Adequate", vec![0.2, 0.3, 0.5]),
                ],
            ),
        );
        cpds.insert(
            "Carbon Sequestration".to_string(),
            Cpd::conditional(
                ["Seagrass Biomass"],
                [("Low", vec![0.9, 0.1]), ("Medium", vec![0.5, 0.5]), ("High", vec![0.2, 0.8])],
            ),
        );

        Self { nodes, edges, cpds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_complete() {
        let cbn = Cbn::seagrass_restoration();
        assert_eq!(cbn.nodes.len(), 5);
        assert_eq!(cbn.edges.len(), 5);
        assert_eq!(cbn.missing_cpds().count(), 0);
        assert_eq!(cbn.nodes[0].name, "Water Quality");
    }

    #[test]
    fn test_wire_shape() {
        let cbn = Cbn::seagrass_restoration();
        let value = serde_json::to_value(&cbn).unwrap();
        assert_eq!(value["edges"][0]["from"], "Water Quality");
        assert_eq!(value["edges"][0]["to"], "Seagrass Biomass");
        assert_eq!(value["nodes"][1]["states"][2], "High");
        assert_eq!(value["nodes"][1]["observable"], true);
        assert_eq!(value["cpds"]["Local Support"]["probabilities"][""][0], 0.6);
        assert_eq!(value["cpds"]["Local Support"]["parents"], json!([]));

        let back: Cbn = serde_json::from_value(value).unwrap();
        assert_eq!(back, cbn);
    }

    #[test]
    fn test_parent_state_assignment() {
        let cbn = Cbn::seagrass_restoration();
        let cpd = &cbn.cpds["Seagrass Biomass"];
        let assignment = cpd.assignment("Poor_Limited").unwrap();
        assert_eq!(
            assignment,
            vec![("Water Quality", "Poor"), ("Restoration Investment", "Limited")]
        );
        assert_eq!(cpd.row("Poor_Limited"), Some(vec![0.7, 0.2, 0.1]));
    }

    #[test]
    fn test_rows_and_cpds_keep_insertion_order() {
        let cbn = Cbn::seagrass_restoration();
        let keys: Vec<_> = cbn.cpds["Seagrass Biomass"].probabilities.keys().cloned().collect();
        assert_eq!(keys, vec!["Poor_Limited", "Poor_Adequate", "Good_Limited", "Good_Adequate"]);

        let names: Vec<_> = cbn.cpds.keys().map(String::as_str).collect();
        assert_eq!(names[0], "Local Support");

        let text = serde_json::to_string(&cbn).unwrap();
        assert!(text.find("Poor_Adequate").unwrap() < text.find("Good_Limited").unwrap());
        let back: Cbn = serde_json::from_str(&text).unwrap();
        assert!(back.cpds.keys().eq(cbn.cpds.keys()));
    }

    #[test]
    fn test_structure_excludes_cpds() {
        let structure = Cbn::seagrass_restoration().structure();
        assert!(structure.get("cpds").is_none());
        assert_eq!(structure["nodes"].as_array().unwrap().len(), 5);
    }
}
