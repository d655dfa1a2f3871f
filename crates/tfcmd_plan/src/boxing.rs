//! Building boxed value trees from a plan's raw attribute structures.
//!
//! terraform describes an attribute object with up to three trees of the
//! same shape: the value itself, a boolean tree marking paths unknown until
//! apply, and a boolean tree marking sensitive paths. Either boolean tree may
//! be partial, shallower than the value, or missing entirely.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use crate::path::{leaf_paths, Path, PathSegment};
use crate::values::BoxedValue;

/// Box `object` using its `unknown` and `sensitive` shadow trees.
///
/// Missing shadow entries read as known and not sensitive. Where a path is
/// both unknown and present in `object`, unknown wins.
pub fn box_value(object: &Value, unknown: &Value, sensitive: &Value) -> BoxedValue {
    let sensitive_at = |path: &Path| path.is_true_in(sensitive);

    if unknown == &Value::Bool(true) {
        return BoxedValue::unknown(sensitive_at(&Path::root()));
    }

    let mut leaves: BTreeMap<Path, BoxedValue> = leaf_paths(object)
        .into_iter()
        .map(|(path, value)| {
            let flag = sensitive_at(&path);
            (path, known_leaf(value, flag))
        })
        .collect();

    let unknown_paths = leaf_paths(unknown)
        .into_iter()
        .filter(|(_, value)| **value == Value::Bool(true))
        .map(|(path, _)| path);

    for path in unknown_paths {
        leaves.retain(|existing, _| !existing.starts_with(&path) && !path.starts_with(existing));
        let flag = sensitive_at(&path);
        leaves.insert(path, BoxedValue::unknown(flag));
    }

    if let Some(root_leaf) = leaves.remove(&Path::root()) {
        return root_leaf;
    }

    let root_sensitive = sensitive_at(&Path::root());
    let mut root = match object {
        Value::Array(_) => BoxedValue::list(Vec::new(), root_sensitive),
        Value::Object(_) => BoxedValue::map(Vec::<(String, BoxedValue)>::new(), root_sensitive),
        _ => match leaves.keys().next().and_then(|p| p.segments().first()) {
            Some(PathSegment::Index(_)) => BoxedValue::list(Vec::new(), root_sensitive),
            _ => BoxedValue::map(Vec::<(String, BoxedValue)>::new(), root_sensitive),
        },
    };

    for (path, leaf) in leaves {
        insert(&mut root, &path, 0, leaf, &sensitive_at);
    }

    root
}

/// Box a leaf of the value tree. Empty containers stay containers.
fn known_leaf(value: &Value, sensitive: bool) -> BoxedValue {
    match value {
        Value::Array(items) if items.is_empty() => BoxedValue::list(Vec::new(), sensitive),
        Value::Object(map) if map.is_empty() => {
            BoxedValue::map(Vec::<(String, BoxedValue)>::new(), sensitive)
        }
        other => BoxedValue::known(other.clone(), sensitive),
    }
}

/// An empty container suited to hold `next`.
fn container_for(next: &PathSegment, sensitive: bool) -> BoxedValue {
    match next {
        PathSegment::Index(_) => BoxedValue::list(Vec::new(), sensitive),
        PathSegment::Key(_) => BoxedValue::map(Vec::<(String, BoxedValue)>::new(), sensitive),
    }
}

fn insert(
    node: &mut BoxedValue,
    path: &Path,
    depth: usize,
    leaf: BoxedValue,
    sensitive_at: &dyn Fn(&Path) -> bool,
) {
    let segments = path.segments();
    let segment = &segments[depth];
    let is_last = depth + 1 == segments.len();

    let slot = match child_slot(node, segment) {
        Some(slot) => slot,
        None => {
            warn!("Skipping {}: key does not fit a list at this position", path);
            return;
        }
    };

    if is_last {
        *slot = leaf;
        return;
    }

    let next = &segments[depth + 1];
    let fits = match (&*slot, next) {
        (BoxedValue::List { .. }, PathSegment::Index(_)) => true,
        (BoxedValue::Map { .. }, _) => true,
        _ => false,
    };
    if !fits {
        *slot = container_for(next, sensitive_at(&path.prefix(depth + 1)));
    }

    insert(slot, path, depth + 1, leaf, sensitive_at);
}

/// The child slot for `segment` in `node`, created if needed.
///
/// Lists grow densely: indices skipped over are filled with omitted values.
fn child_slot<'a>(node: &'a mut BoxedValue, segment: &PathSegment) -> Option<&'a mut BoxedValue> {
    match (node, segment) {
        (BoxedValue::List { items, .. }, PathSegment::Index(index)) => {
            while items.len() <= *index {
                items.push(BoxedValue::omitted(false));
            }
            items.get_mut(*index)
        }
        (BoxedValue::Map { entries, .. }, PathSegment::Key(key)) => {
            Some(entries.entry(key.clone()).or_insert_with(|| BoxedValue::omitted(false)))
        }
        (BoxedValue::Map { entries, .. }, PathSegment::Index(index)) => {
            Some(entries.entry(index.to_string()).or_insert_with(|| BoxedValue::omitted(false)))
        }
        _ => None,
    }
}
