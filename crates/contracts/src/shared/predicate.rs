use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// Comparison applied by a predicate leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateOp {
    Equals,
    Contains,
    GreaterThan,
    LessThan,
}

/// Structured boolean query handed to the export endpoint.
///
/// An empty `And` matches every document.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateTree {
    Leaf {
        field: String,
        op: PredicateOp,
        value: String,
    },
    And(Vec<PredicateTree>),
    Or(Vec<PredicateTree>),
}

impl PredicateTree {
    pub fn match_all() -> Self {
        PredicateTree::And(Vec::new())
    }

    pub fn leaf(field: impl Into<String>, op: PredicateOp, value: impl Into<String>) -> Self {
        PredicateTree::Leaf {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, PredicateTree::And(children) if children.is_empty())
    }

    /// Render into the document-query dialect the backend understands
    /// (`$and`, `$or`, `$like`, `$gt`, `$lt`, bare equality).
    pub fn to_query_document(&self) -> Value {
        match self {
            PredicateTree::Leaf { field, op, value } => {
                let condition = match op {
                    PredicateOp::Equals => Value::String(value.clone()),
                    PredicateOp::Contains => json!({ "$like": format!("%{}%", value) }),
                    PredicateOp::GreaterThan => json!({ "$gt": value }),
                    PredicateOp::LessThan => json!({ "$lt": value }),
                };
                let mut doc = Map::new();
                doc.insert(field.clone(), condition);
                Value::Object(doc)
            }
            PredicateTree::And(children) if children.is_empty() => Value::Object(Map::new()),
            PredicateTree::And(children) => json!({
                "$and": children.iter().map(Self::to_query_document).collect::<Vec<_>>()
            }),
            PredicateTree::Or(children) => json!({
                "$or": children.iter().map(Self::to_query_document).collect::<Vec<_>>()
            }),
        }
    }
}

impl Serialize for PredicateTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_query_document().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_all_renders_empty_document() {
        let tree = PredicateTree::match_all();
        assert!(tree.is_match_all());
        assert_eq!(serde_json::to_value(&tree).unwrap(), json!({}));
    }

    #[test]
    fn test_leaf_operators() {
        assert_eq!(
            PredicateTree::leaf("severity", PredicateOp::Equals, "high").to_query_document(),
            json!({"severity": "high"})
        );
        assert_eq!(
            PredicateTree::leaf("user", PredicateOp::Contains, "root").to_query_document(),
            json!({"user": {"$like": "%root%"}})
        );
        assert_eq!(
            PredicateTree::leaf("timestamp", PredicateOp::GreaterThan, "2024-01-01")
                .to_query_document(),
            json!({"timestamp": {"$gt": "2024-01-01"}})
        );
        assert_eq!(
            PredicateTree::leaf("timestamp", PredicateOp::LessThan, "2024-01-02")
                .to_query_document(),
            json!({"timestamp": {"$lt": "2024-01-02"}})
        );
    }

    #[test]
    fn test_nested_combinators() {
        let tree = PredicateTree::And(vec![
            PredicateTree::Or(vec![
                PredicateTree::leaf("user", PredicateOp::Contains, "x"),
                PredicateTree::leaf("process", PredicateOp::Contains, "x"),
            ]),
            PredicateTree::leaf("source", PredicateOp::Equals, "auth"),
        ]);
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({"$and": [
                {"$or": [{"user": {"$like": "%x%"}}, {"process": {"$like": "%x%"}}]},
                {"source": "auth"}
            ]})
        );
    }
}
