use std::collections::HashSet;

use crate::cut::Threshold;
use crate::selection::SelectionConfig;

/// Structural validation of a resolved [`SelectionConfig`].
///
/// Expression compilation and cross-talk cycle analysis belong to the
/// engine's startup phase; this pass only checks the configuration shape.
pub fn validate(config: &SelectionConfig) -> anyhow::Result<()> {
    if config.cuts.is_empty() && config.triggers.is_empty() {
        anyhow::bail!("selection `{}` declares no cuts and no triggers", config.name);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for (index, cut) in config.cuts.iter().enumerate() {
        if cut.name.is_empty() {
            anyhow::bail!("cut #{index} has an empty name");
        }
        if !seen.insert(&cut.name) {
            anyhow::bail!("duplicate cut name `{}`", cut.name);
        }
        if cut.cut_string.trim().is_empty() {
            anyhow::bail!("cut `{}` has an empty cut_string", cut.name);
        }

        // Every member of a (possibly hyphen-joined) input collection must
        // be declared, and correlation members must be distinct.
        let members = cut.input_members();
        let mut member_seen: HashSet<&str> = HashSet::new();
        for member in &members {
            if !config.collections.contains_key(*member) {
                anyhow::bail!(
                    "cut `{}` references undeclared collection `{}`",
                    cut.name,
                    member
                );
            }
            if !member_seen.insert(member) {
                anyhow::bail!(
                    "cut `{}` repeats collection `{}` in its input; correlation \
                     members must be distinct",
                    cut.name,
                    member
                );
            }
        }

        // Object-counting thresholds are only meaningful with an input
        // collection.
        if cut.is_event_scoped() && !matches!(cut.threshold, Threshold::EventWide) {
            anyhow::bail!(
                "cut `{}` has no input_collection but number_required counts objects",
                cut.name
            );
        }

        // Cross-talk dependencies must name earlier cuts.
        for dep in &cut.depends_on {
            let position = config.cuts.iter().position(|c| &c.name == dep);
            match position {
                None => anyhow::bail!(
                    "cut `{}` depends on unknown cut `{}`",
                    cut.name,
                    dep
                ),
                Some(p) if p >= index => anyhow::bail!(
                    "cut `{}` depends on `{}` which is not applied before it",
                    cut.name,
                    dep
                ),
                Some(_) => {}
            }
        }
    }

    Ok(())
}
