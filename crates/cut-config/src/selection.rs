use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::cut::{CutSpec, Threshold};
use crate::logging::LoggingConfig;
use crate::validate;

// ---------------------------------------------------------------------------
// Raw TOML structure (intermediate representation)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SelectionConfigRaw {
    selection: SelectionMeta,
    /// Collection name -> registered object type tag.
    collections: BTreeMap<String, String>,
    #[serde(default)]
    triggers: TriggerConfig,
    #[serde(default, rename = "cut")]
    cuts: Vec<CutRaw>,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
struct SelectionMeta {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CutRaw {
    name: String,
    #[serde(default)]
    input_collection: String,
    cut_string: String,
    #[serde(default)]
    operator: Option<String>,
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    number_required: Option<i64>,
    #[serde(default)]
    is_veto: bool,
    #[serde(default)]
    depends_on: Vec<String>,
}

// ---------------------------------------------------------------------------
// TriggerConfig
// ---------------------------------------------------------------------------

/// Trigger requirements for the selection. The event passes only if at
/// least one `required` trigger fired (an empty list requires nothing) and
/// none of the `veto` triggers fired.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    pub required: Vec<String>,
    pub veto: Vec<String>,
}

impl TriggerConfig {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.veto.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SelectionConfig (resolved, validated)
// ---------------------------------------------------------------------------

/// A resolved, validated selection: declared collections, the ordered cut
/// list, trigger requirements, and logging settings. Expression strings are
/// carried verbatim — compilation belongs to the engine's startup phase.
#[derive(Debug)]
pub struct SelectionConfig {
    pub name: String,
    /// Collection name -> registered object type tag.
    pub collections: BTreeMap<String, String>,
    pub triggers: TriggerConfig,
    pub cuts: Vec<CutSpec>,
    pub logging: LoggingConfig,
}

impl SelectionConfig {
    /// Read and parse a selection TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.as_ref().display()))?;
        content.parse()
    }
}

impl FromStr for SelectionConfig {
    type Err = anyhow::Error;

    /// Parse a TOML string into a resolved, validated [`SelectionConfig`].
    fn from_str(toml_str: &str) -> anyhow::Result<Self> {
        let raw: SelectionConfigRaw = toml::from_str(toml_str)?;

        let mut cuts = Vec::with_capacity(raw.cuts.len());
        for cut in raw.cuts {
            cuts.push(resolve_cut(cut)?);
        }

        let config = SelectionConfig {
            name: raw.selection.name,
            collections: raw.collections,
            triggers: raw.triggers,
            cuts,
            logging: raw.logging,
        };

        validate::validate(&config)?;

        Ok(config)
    }
}

fn resolve_cut(raw: CutRaw) -> anyhow::Result<CutSpec> {
    let operator = match raw.operator.as_deref() {
        Some(s) => s
            .parse()
            .map_err(|e| anyhow::anyhow!("cut `{}`: {e}", raw.name))?,
        None => cut_lang::ast::CmpOp::Ge,
    };
    // Missing number_required defaults to "all objects" for object-scoped
    // cuts and event-wide for event-scoped ones.
    let number_required = raw
        .number_required
        .unwrap_or(if raw.input_collection.is_empty() { 0 } else { -1 });
    let threshold = Threshold::from_number_required(number_required)
        .map_err(|e| anyhow::anyhow!("cut `{}`: {e}", raw.name))?;

    Ok(CutSpec {
        name: raw.name,
        input_collection: raw.input_collection,
        cut_string: raw.cut_string,
        operator,
        value: raw.value.unwrap_or(0.0),
        threshold,
        is_veto: raw.is_veto,
        depends_on: raw.depends_on,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
