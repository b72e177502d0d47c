use std::collections::BTreeMap;
use std::sync::Arc;

use orion_error::prelude::*;
use serde_json::{Map, Value};

use crate::accessor::FieldAccessor;
use crate::error::{CoreError, CoreReason, CoreResult};
use crate::object::{EventObjects, ObjectCollection, ObjectHandle};

// ---------------------------------------------------------------------------
// JSON event bridge
// ---------------------------------------------------------------------------

/// Register a dynamic field resolver for objects that are parsed JSON maps.
///
/// Dotted field paths descend into nested objects (`"mother.pt"`). Numbers
/// resolve to their f64 value, booleans to 1.0/0.0; anything else is
/// unresolvable and falls back to the sentinel convention.
pub fn register_json_resolver(accessor: &mut FieldAccessor, type_tag: &str) {
    accessor.register_dynamic(type_tag, |obj, field| {
        let map = obj.downcast_ref::<Map<String, Value>>()?;
        lookup_path(map, field)
    });
}

fn lookup_path(map: &Map<String, Value>, path: &str) -> Option<f64> {
    let mut current: &Value = map.get(path.split('.').next()?)?;
    for segment in path.split('.').skip(1) {
        current = current.as_object()?.get(segment)?;
    }
    match current {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Build one event's collections from a JSON object of the form
///
/// ```json
/// {"jets": [{"pt": 55.0}, ...], "triggers": ["HLT_A"]}
/// ```
///
/// Only declared collections are picked up (`collections` maps collection
/// name to its registered type tag); a declared collection absent from the
/// JSON is simply absent from the event, which the engine degrades per the
/// sentinel convention. The reserved `triggers` key carries the fired
/// trigger names.
pub fn event_from_json(
    json: &Value,
    collections: &BTreeMap<String, String>,
) -> CoreResult<EventObjects> {
    let top = json
        .as_object()
        .ok_or_else(|| data_error("event is not a JSON object"))?;

    let mut event = EventObjects::new();

    if let Some(triggers) = top.get("triggers") {
        let names = triggers
            .as_array()
            .ok_or_else(|| data_error("`triggers` is not an array"))?
            .iter()
            .map(|t| {
                t.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| data_error("trigger name is not a string"))
            })
            .collect::<CoreResult<Vec<String>>>()?;
        event.set_fired_triggers(names);
    }

    for (name, type_tag) in collections {
        let Some(value) = top.get(name) else {
            continue;
        };
        let objects = value
            .as_array()
            .ok_or_else(|| data_error(&format!("collection `{name}` is not an array")))?;
        let handles: Vec<ObjectHandle> = objects
            .iter()
            .map(|o| {
                o.as_object()
                    .cloned()
                    .map(|m| Arc::new(m) as ObjectHandle)
                    .ok_or_else(|| {
                        data_error(&format!("object in collection `{name}` is not a JSON object"))
                    })
            })
            .collect::<CoreResult<_>>()?;
        event.insert(name.clone(), ObjectCollection::new(type_tag.clone(), handles));
    }

    Ok(event)
}

fn data_error(detail: &str) -> CoreError {
    StructError::from(CoreReason::DataFormat).with_detail(detail.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::is_sentinel;

    fn declared() -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("jets".to_string(), "jet".to_string());
        map.insert("muons".to_string(), "muon".to_string());
        map
    }

    #[test]
    fn builds_collections_and_triggers() {
        let json: Value = serde_json::from_str(
            r#"{"jets": [{"pt": 55.0}, {"pt": 10.0}], "triggers": ["HLT_A"]}"#,
        )
        .unwrap();
        let event = event_from_json(&json, &declared()).unwrap();

        assert_eq!(event.get("jets").unwrap().len(), 2);
        assert!(event.get("muons").is_none());
        assert_eq!(event.fired_triggers(), &["HLT_A".to_string()]);
    }

    #[test]
    fn undeclared_keys_are_ignored() {
        let json: Value = serde_json::from_str(r#"{"tracks": [{"pt": 1.0}]}"#).unwrap();
        let event = event_from_json(&json, &declared()).unwrap();
        assert!(event.get("tracks").is_none());
    }

    #[test]
    fn non_array_collection_is_rejected() {
        let json: Value = serde_json::from_str(r#"{"jets": 3}"#).unwrap();
        assert!(event_from_json(&json, &declared()).is_err());
    }

    #[test]
    fn json_resolver_reads_fields() {
        let mut accessor = FieldAccessor::new();
        register_json_resolver(&mut accessor, "jet");

        let obj: Map<String, Value> = serde_json::from_str(
            r#"{"pt": 55.5, "tight": true, "mother": {"pt": 80.0}, "label": "b"}"#,
        )
        .unwrap();

        assert_eq!(accessor.get("jet", &obj, "pt"), 55.5);
        assert_eq!(accessor.get("jet", &obj, "tight"), 1.0);
        assert_eq!(accessor.get("jet", &obj, "mother.pt"), 80.0);
        // Strings are not numeric fields.
        assert!(is_sentinel(accessor.get("jet", &obj, "label")));
        assert!(is_sentinel(accessor.get("jet", &obj, "missing")));
    }
}
