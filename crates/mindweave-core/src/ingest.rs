//! Validation and id assignment for externally produced trees.
//!
//! The exchange form is a JSON array holding the root node (generated study data carries the mind
//! map as `mindMap: [root]`). Generated nodes have no ids; persisted nodes do. Either way the whole
//! input is validated before a tree is built, so a malformed node never yields a partial tree.

use crate::ids::{IdGenerator, fresh_id};
use crate::model::{ConceptNode, NodeStyle};
use crate::tree::ConceptTree;
use crate::{Error, Result};
use rustc_hash::FxHashSet;
use serde_json::{Map, Value};

struct RawNode {
    id: Option<String>,
    concept: String,
    style: NodeStyle,
    x: Option<f64>,
    y: Option<f64>,
    children: Vec<RawNode>,
}

pub fn ingest_str(text: &str, ids: &mut dyn IdGenerator) -> Result<ConceptTree> {
    let value: Value = serde_json::from_str(text)?;
    ingest_value(&value, ids)
}

pub fn ingest_value(value: &Value, ids: &mut dyn IdGenerator) -> Result<ConceptTree> {
    let Some(roots) = value.as_array() else {
        return Err(Error::invalid("$", "expected an array holding the root node"));
    };
    match roots.len() {
        0 => {
            tracing::debug!("ingested empty mind map");
            return Ok(ConceptTree::empty());
        }
        1 => {}
        n => {
            return Err(Error::invalid(
                "$[1]",
                format!("there can be only one root, found {n} top-level nodes"),
            ));
        }
    }

    let mut seen: FxHashSet<String> = FxHashSet::default();
    let raw = parse_node(&roots[0], "$[0]".to_string(), &mut seen)?;

    let mut generated = 0usize;
    let root = assign_ids(raw, ids, &mut seen, &mut generated);
    let tree = ConceptTree::from_root(root)?;
    tracing::debug!(nodes = tree.len(), generated, "ingested mind map");
    Ok(tree)
}

fn parse_node(value: &Value, path: String, seen: &mut FxHashSet<String>) -> Result<RawNode> {
    let Some(obj) = value.as_object() else {
        return Err(Error::invalid(path, "expected a node object"));
    };

    let id = match obj.get("id") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => {
            if !seen.insert(s.clone()) {
                return Err(Error::invalid(
                    format!("{path}.id"),
                    format!("duplicate node id {s:?}"),
                ));
            }
            Some(s.clone())
        }
        Some(_) => return Err(Error::invalid(format!("{path}.id"), "id must be a string")),
    };

    let concept = match obj.get("concept") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::String(_)) => {
            return Err(Error::invalid(
                format!("{path}.concept"),
                "concept must not be empty",
            ));
        }
        Some(_) => {
            return Err(Error::invalid(
                format!("{path}.concept"),
                "concept must be a string",
            ));
        }
        None => return Err(Error::invalid(format!("{path}.concept"), "missing concept")),
    };

    let style = NodeStyle {
        color: opt_string(obj, "color", &path)?,
        text_color: opt_string(obj, "textColor", &path)?,
        is_bold: opt_bool(obj, "isBold", &path)?,
        is_italic: opt_bool(obj, "isItalic", &path)?,
    };
    let x = opt_f64(obj, "x", &path)?;
    let y = opt_f64(obj, "y", &path)?;

    let children = match obj.get("subConcepts") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(parse_node(item, format!("{path}.subConcepts[{i}]"), seen)?);
            }
            out
        }
        Some(_) => {
            return Err(Error::invalid(
                format!("{path}.subConcepts"),
                "subConcepts must be an array",
            ));
        }
    };

    Ok(RawNode {
        id,
        concept,
        style,
        x,
        y,
        children,
    })
}

fn opt_string(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Option<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(Error::invalid(
            format!("{path}.{key}"),
            "expected a string",
        )),
    }
}

fn opt_bool(obj: &Map<String, Value>, key: &str, path: &str) -> Result<bool> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(Error::invalid(
            format!("{path}.{key}"),
            "expected a boolean",
        )),
    }
}

fn opt_f64(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Option<f64>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => match v.as_f64() {
            Some(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(Error::invalid(
                format!("{path}.{key}"),
                "expected a finite number",
            )),
        },
    }
}

fn assign_ids(
    raw: RawNode,
    ids: &mut dyn IdGenerator,
    seen: &mut FxHashSet<String>,
    generated: &mut usize,
) -> ConceptNode {
    let id = match raw.id {
        Some(id) => id,
        None => {
            let id = fresh_id(ids, |candidate| seen.contains(candidate));
            seen.insert(id.clone());
            *generated += 1;
            id
        }
    };
    let mut sub_concepts = Vec::with_capacity(raw.children.len());
    for child in raw.children {
        sub_concepts.push(assign_ids(child, ids, seen, generated));
    }
    ConceptNode {
        id,
        concept: raw.concept,
        sub_concepts,
        style: raw.style,
        x: raw.x,
        y: raw.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdGenerator;
    use serde_json::json;

    #[test]
    fn generated_trees_get_ids_in_pre_order() {
        let mut ids = SequentialIdGenerator::new("n");
        let tree = ingest_value(
            &json!([{
                "concept": "Photosynthesis",
                "subConcepts": [
                    { "concept": "Light reactions", "subConcepts": [{ "concept": "ATP" }] },
                    { "concept": "Calvin cycle" }
                ]
            }]),
            &mut ids,
        )
        .unwrap();
        assert_eq!(tree.pre_order(), vec!["n-1", "n-2", "n-3", "n-4"]);
        assert_eq!(tree.get("n-3").unwrap().concept(), "ATP");
    }

    #[test]
    fn persisted_ids_are_kept_and_not_reissued() {
        let mut ids = SequentialIdGenerator::new("n");
        let tree = ingest_value(
            &json!([{
                "id": "n-2",
                "concept": "root",
                "subConcepts": [{ "concept": "fresh" }]
            }]),
            &mut ids,
        )
        .unwrap();
        assert_eq!(tree.root_id(), Some("n-2"));
        assert_eq!(tree.children_of("n-2"), ["n-1".to_string()]);

        let mut ids = SequentialIdGenerator::new("n");
        let tree = ingest_value(
            &json!([{ "concept": "root", "subConcepts": [{ "id": "n-1", "concept": "kept" }] }]),
            &mut ids,
        )
        .unwrap();
        assert_eq!(tree.root_id(), Some("n-2"));
    }

    #[test]
    fn malformed_input_is_rejected_whole() {
        let mut ids = SequentialIdGenerator::default();
        let cases = [
            (json!({ "concept": "root" }), "$"),
            (json!([{ "concept": "a" }, { "concept": "b" }]), "$[1]"),
            (json!([{ "subConcepts": [] }]), "$[0].concept"),
            (json!([{ "concept": "   " }]), "$[0].concept"),
            (
                json!([{ "concept": "r", "subConcepts": [{ "concept": 3 }] }]),
                "$[0].subConcepts[0].concept",
            ),
            (json!([{ "concept": "r", "subConcepts": {} }]), "$[0].subConcepts"),
            (
                json!([{ "id": "a", "concept": "r", "subConcepts": [{ "id": "a", "concept": "c" }] }]),
                "$[0].subConcepts[0].id",
            ),
            (json!([{ "concept": "r", "x": "left" }]), "$[0].x"),
        ];
        for (input, path) in cases {
            let err = ingest_value(&input, &mut ids).unwrap_err();
            match err {
                Error::InvalidTree { path: got, .. } => assert_eq!(got, path, "{input}"),
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn empty_array_is_an_empty_map() {
        let mut ids = SequentialIdGenerator::default();
        let tree = ingest_value(&json!([]), &mut ids).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn invalid_json_text_surfaces_json_error() {
        let mut ids = SequentialIdGenerator::default();
        assert!(matches!(
            ingest_str("[{", &mut ids),
            Err(Error::Json(_))
        ));
    }
}
