use std::collections::HashMap;

use cut_config::CutSpec;
use orion_error::prelude::*;

use crate::error::{CoreReason, CoreResult};
use crate::flags::FlagMap;

// ---------------------------------------------------------------------------
// CrossTalk
// ---------------------------------------------------------------------------

/// Resolved cross-talk dependencies: for each cut, the collections whose
/// cumulative object state must be injected into its evaluation (the input
/// members of the cuts it declares a dependency on).
///
/// The dependency graph is validated once at startup: every dependency must
/// name a known cut, the graph must be acyclic, and the topological order
/// must agree with the declared application order. Any violation is a fatal
/// configuration error — the run never starts with broken cross-talk.
#[derive(Debug, Clone)]
pub struct CrossTalk {
    masks: Vec<Vec<String>>,
}

impl CrossTalk {
    /// Resolve and validate the dependency graph for an ordered cut list.
    pub fn resolve(cuts: &[CutSpec]) -> CoreResult<Self> {
        let index_of: HashMap<&str, usize> = cuts
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.as_str(), i))
            .collect();

        // Adjacency: edges cut -> dependency.
        let mut deps: Vec<Vec<usize>> = vec![Vec::new(); cuts.len()];
        for (i, cut) in cuts.iter().enumerate() {
            for dep in &cut.depends_on {
                let Some(&j) = index_of.get(dep.as_str()) else {
                    return StructError::from(CoreReason::CrossTalk)
                        .with_detail(format!(
                            "cut `{}` depends on unknown cut `{dep}`",
                            cut.name
                        ))
                        .err();
                };
                deps[i].push(j);
            }
        }

        detect_cycle(cuts, &deps)?;

        // With the graph acyclic, the declared order must already be
        // topological: dependencies point strictly backwards.
        for (i, cut) in cuts.iter().enumerate() {
            for &j in &deps[i] {
                if j >= i {
                    return StructError::from(CoreReason::CrossTalk)
                        .with_detail(format!(
                            "cut `{}` depends on `{}` which is not applied before it",
                            cut.name, cuts[j].name
                        ))
                        .err();
                }
            }
        }

        // Mask collections: union of the dependency cuts' input members,
        // first-appearance order.
        let mut masks = Vec::with_capacity(cuts.len());
        for i in 0..cuts.len() {
            let mut mask: Vec<String> = Vec::new();
            for &j in &deps[i] {
                for member in cuts[j].input_members() {
                    if !mask.iter().any(|m| m == member) {
                        mask.push(member.to_string());
                    }
                }
            }
            masks.push(mask);
        }

        Ok(Self { masks })
    }

    /// Collections whose cumulative state cut `cut_index` depends on.
    pub fn masked_collections(&self, cut_index: usize) -> &[String] {
        &self.masks[cut_index]
    }

    /// The cumulative flag slice for `collection` as of (and including)
    /// `as_of_cut`, from an already-computed flag map.
    pub fn cumulative_for<'a>(
        &self,
        cumulative: &'a FlagMap,
        collection: &str,
        as_of_cut: usize,
    ) -> Option<&'a [bool]> {
        cumulative.row(collection, as_of_cut)
    }
}

/// Three-color depth-first cycle detection over the dependency edges.
fn detect_cycle(cuts: &[CutSpec], deps: &[Vec<usize>]) -> CoreResult<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        White,
        Gray,
        Black,
    }

    fn visit(
        node: usize,
        deps: &[Vec<usize>],
        marks: &mut [Mark],
        cuts: &[CutSpec],
    ) -> CoreResult<()> {
        marks[node] = Mark::Gray;
        for &next in &deps[node] {
            match marks[next] {
                Mark::Gray => {
                    return StructError::from(CoreReason::CrossTalk)
                        .with_detail(format!(
                            "cross-talk dependency cycle through cut `{}`",
                            cuts[next].name
                        ))
                        .err();
                }
                Mark::White => visit(next, deps, marks, cuts)?,
                Mark::Black => {}
            }
        }
        marks[node] = Mark::Black;
        Ok(())
    }

    let mut marks = vec![Mark::White; deps.len()];
    for node in 0..deps.len() {
        if marks[node] == Mark::White {
            visit(node, deps, &mut marks, cuts)?;
        }
    }
    Ok(())
}
