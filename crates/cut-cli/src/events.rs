use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Result;

use cut_config::SelectionConfig;
use cut_core::bridge::{event_from_json, register_json_resolver};
use cut_core::{EventObjects, FieldAccessor};

/// Build the field accessor for a selection: one dynamic JSON resolver per
/// distinct declared object type.
pub fn build_accessor(config: &SelectionConfig) -> FieldAccessor {
    let mut accessor = FieldAccessor::new();
    let mut registered: HashSet<&str> = HashSet::new();
    for type_tag in config.collections.values() {
        if registered.insert(type_tag) {
            register_json_resolver(&mut accessor, type_tag);
        }
    }
    accessor
}

/// Stream a JSON-lines event file, handing each decoded event to `handle`
/// with its 1-based line number.
///
/// A malformed line is a per-event data problem: it is logged and skipped,
/// never aborting the run. Only I/O failure on the file itself is fatal.
pub fn process_events(
    path: &Path,
    config: &SelectionConfig,
    mut handle: impl FnMut(usize, EventObjects),
) -> Result<()> {
    let file = File::open(path)
        .map_err(|e| anyhow::anyhow!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let number = index + 1;
        let value: serde_json::Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(line = number, error = %e, "skipping malformed event");
                continue;
            }
        };
        match event_from_json(&value, &config.collections) {
            Ok(event) => handle(number, event),
            Err(e) => {
                tracing::warn!(line = number, error = %e, "skipping malformed event");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CONFIG: &str = r#"
[selection]
name = "test"

[collections]
jets = "jet"

[[cut]]
name             = "jetPt"
input_collection = "jets"
cut_string       = "jets.pt"
operator         = ">"
value            = 30.0
number_required  = 1
"#;

    fn write_events(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("cutflow-{}-{}", std::process::id(), name));
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn streams_events_and_skips_malformed_lines() {
        let config: SelectionConfig = CONFIG.parse().unwrap();
        let path = write_events(
            "mixed.jsonl",
            concat!(
                "{\"jets\": [{\"pt\": 55.0}]}\n",
                "\n",
                "not json at all\n",
                "{\"jets\": 3}\n",
                "{\"jets\": [{\"pt\": 10.0}, {\"pt\": 80.0}]}\n",
            ),
        );

        let mut seen = Vec::new();
        process_events(&path, &config, |number, event| {
            seen.push((number, event.get("jets").unwrap().len()));
        })
        .unwrap();
        std::fs::remove_file(&path).ok();

        // Lines 2-4 are blank or malformed; only 1 and 5 decode.
        assert_eq!(seen, vec![(1, 1), (5, 2)]);
    }

    #[test]
    fn accessor_covers_each_declared_type_once() {
        let config: SelectionConfig = CONFIG.parse().unwrap();
        let accessor = build_accessor(&config);
        let obj: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(r#"{"pt": 12.5}"#).unwrap();
        assert_eq!(accessor.get("jet", &obj, "pt"), 12.5);
    }

    #[test]
    fn missing_file_is_fatal() {
        let config: SelectionConfig = CONFIG.parse().unwrap();
        let path = std::env::temp_dir().join("cutflow-does-not-exist.jsonl");
        assert!(process_events(&path, &config, |_, _| {}).is_err());
    }
}
