use std::collections::HashMap;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::render::paths;

/// Selects how asset references in content are resolved: preview mode
/// points at the running service's asset routes, export mode at
/// relative paths inside the static bundle. This is the single seam
/// where the two rendering variants diverge.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RenderMode {
    Preview,
    Export,
}

/// A key carries an image value if it mentions "image" anywhere or
/// ends in the conventional `_src` / `_url` suffixes.
pub fn is_image_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    lower.contains("image") || lower.ends_with("_src") || lower.ends_with("_url")
}

/// Inserts `leaf` into `map` under a dot-notation key, creating the
/// intermediate objects. A non-object value sitting where an
/// intermediate is needed gets replaced rather than failing; context
/// building must never error.
pub fn insert_nested(map: &mut Map<String, Value>, dotted_key: &str, leaf: Value) {
    let parts: Vec<&str> = dotted_key.split('.').map(str::trim).collect();
    let mut current = map;
    for (i, part) in parts.iter().enumerate() {
        if i == parts.len() - 1 {
            current.insert((*part).to_string(), leaf);
            return;
        }
        let entry = current
            .entry((*part).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = entry.as_object_mut().expect("entry forced to object");
    }
}

fn resolve_image_value(
    value: &str,
    mode: RenderMode,
    project_id: Option<Uuid>,
    image_prefix: &str,
) -> String {
    match mode {
        RenderMode::Export => {
            format!("{}/{}", image_prefix.trim_matches('/'), value)
        }
        RenderMode::Preview => {
            let already_absolute = value.starts_with('/')
                || value.starts_with("http://")
                || value.starts_with("https://");
            match project_id {
                Some(pid) if !already_absolute => paths::preview_asset_url(pid, "images", value),
                _ => value.to_string(),
            }
        }
    }
}

/// Converts a flat dot-notation content map into the nested structure
/// the template engine renders against (`hero.title` becomes
/// `{hero: {title: ...}}`).
///
/// Image-key leaves are resolved per `mode`; every other leaf passes
/// through untouched, so the two modes agree on all non-image keys.
/// Pure and infallible: malformed keys and empty maps degrade to empty
/// structures.
pub fn build_context(
    flat: &HashMap<String, String>,
    mode: RenderMode,
    project_id: Option<Uuid>,
    image_prefix: &str,
) -> Map<String, Value> {
    let mut context = Map::new();

    for (key, value) in flat {
        let resolved = if is_image_key(key) && !value.is_empty() {
            resolve_image_value(value, mode, project_id, image_prefix)
        } else {
            value.clone()
        };
        insert_nested(&mut context, key, Value::String(resolved));
    }

    context
}
