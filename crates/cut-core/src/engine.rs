use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use cut_config::{SelectionConfig, Threshold, TriggerConfig};
use orion_error::prelude::*;
use orion_error::ErrorOweBase;

use crate::accessor::FieldAccessor;
use crate::crosstalk::CrossTalk;
use crate::cut::CompiledCut;
use crate::decision::{DecisionPayload, EventDecision};
use crate::error::{CoreReason, CoreResult};
use crate::eval::EvalCx;
use crate::flags::{FlagMap, count_passing};
use crate::object::EventObjects;
use crate::trigger::evaluate_triggers;

#[cfg(test)]
mod tests;

// ---------------------------------------------------------------------------
// CutEngine
// ---------------------------------------------------------------------------

/// A flag-map key the engine maintains rows for: a single collection, or a
/// hyphen-joined correlation key whose "objects" are tuples.
#[derive(Debug, Clone)]
struct Tracked {
    key: String,
    members: Vec<String>,
}

/// The cut decision engine.
///
/// Two-phase lifecycle: [`compile`](Self::compile) once at startup — every
/// cut expression is compiled and the cross-talk dependency graph validated,
/// failing fast on any configuration error — then [`decide`](Self::decide)
/// once per event. `decide` is a pure function of the event's collection
/// contents; the engine carries no mutable per-event state, so one engine
/// can serve any number of events (or threads, behind a shared reference).
pub struct CutEngine {
    name: String,
    cuts: Vec<CompiledCut>,
    triggers: TriggerConfig,
    crosstalk: CrossTalk,
    tracked: Vec<Tracked>,
    warned_missing: Mutex<HashSet<String>>,
}

impl CutEngine {
    /// Compile a selection into a ready-to-run engine.
    ///
    /// Any uncompilable cut or invalid cross-talk declaration aborts here,
    /// before the first event is processed.
    pub fn compile(config: &SelectionConfig) -> CoreResult<Self> {
        let mut cuts = Vec::with_capacity(config.cuts.len());
        for spec in &config.cuts {
            let members: Vec<String> =
                spec.input_members().iter().map(|s| s.to_string()).collect();
            let declared: Vec<&str> = members.iter().map(|s| s.as_str()).collect();
            let tree = cut_lang::compile(&spec.cut_string, &declared)
                .owe(CoreReason::CutCompile)
                .position(format!("cut `{}`: `{}`", spec.name, spec.cut_string))?;
            cuts.push(CompiledCut {
                spec: spec.clone(),
                tree,
                members,
            });
        }

        let crosstalk = CrossTalk::resolve(&config.cuts)?;
        let tracked = build_tracked(&cuts);

        Ok(Self {
            name: config.name.clone(),
            cuts,
            triggers: config.triggers.clone(),
            crosstalk,
            tracked,
            warned_missing: Mutex::new(HashSet::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cut names in application order — the cut-flow row labels.
    pub fn cut_names(&self) -> Vec<&str> {
        self.cuts.iter().map(|c| c.spec.name.as_str()).collect()
    }

    pub fn crosstalk(&self) -> &CrossTalk {
        &self.crosstalk
    }

    /// Decide one event: apply every cut in order to every relevant object,
    /// fold the results into the event verdict, and return the full audit
    /// trail. No short-circuiting — flags are computed and recorded for
    /// every cut even after the event decision is already false, because
    /// downstream consumers need the complete history.
    pub fn decide(&self, event: &EventObjects, accessor: &FieldAccessor) -> DecisionPayload {
        // Cumulative survivor state per tracked key, seeded all-true at the
        // event's collection sizes. A key with a missing member collection
        // starts (and stays) empty.
        let mut cum: HashMap<String, Vec<bool>> = HashMap::new();
        for t in &self.tracked {
            let size = key_size(t, event).unwrap_or(0);
            cum.insert(t.key.clone(), vec![true; size]);
        }

        let triggers = evaluate_triggers(&self.triggers, event.fired_triggers());
        let mut passed = triggers.passed();

        let mut object_flags = FlagMap::new();
        let mut cumulative_flags = FlagMap::new();
        let mut cut_results = Vec::with_capacity(self.cuts.len());

        for (index, cut) in self.cuts.iter().enumerate() {
            let outcome = if cut.spec.is_event_scoped() {
                let cx = EvalCx {
                    tree: &cut.tree,
                    event,
                    accessor,
                };
                CutOutcome {
                    sub: cut.leaf_flag(cx.eval(&[])),
                    raw: None,
                }
            } else {
                self.apply_object_cut(index, cut, event, accessor, &mut cum)
            };

            // Record this cut's row for every tracked key: the computed
            // flags for the cut's own key, all-true filler elsewhere (the
            // raw map records independent decisions only).
            for t in &self.tracked {
                let current = &cum[&t.key];
                match &outcome.raw {
                    Some((key, row)) if *key == t.key => {
                        object_flags.push_row(&t.key, row.clone());
                    }
                    _ => {
                        object_flags.push_row(&t.key, vec![true; current.len()]);
                    }
                }
                cumulative_flags.push_row(&t.key, current.clone());
            }

            passed = passed && outcome.sub;
            cut_results.push(outcome.sub);
        }

        DecisionPayload {
            object_flags,
            cumulative_flags,
            decision: EventDecision {
                passed,
                cut_results,
                triggers,
            },
        }
    }

    /// Apply one object-scoped cut, updating the cumulative state map.
    fn apply_object_cut(
        &self,
        index: usize,
        cut: &CompiledCut,
        event: &EventObjects,
        accessor: &FieldAccessor,
        cum: &mut HashMap<String, Vec<bool>>,
    ) -> CutOutcome {
        let key = &cut.spec.input_collection;
        let members = &cut.members;

        let mut missing = false;
        for member in members {
            if event.get(member).is_none() {
                self.warn_missing(member);
                missing = true;
            }
        }
        if missing {
            // Degrade: no objects pass this cut for this event.
            let sub = matches!(cut.spec.threshold, Threshold::EventWide);
            return CutOutcome {
                sub,
                raw: Some((key.clone(), Vec::new())),
            };
        }

        let sizes: Vec<usize> = members
            .iter()
            .map(|m| event.get(m).expect("member present").len())
            .collect();
        let total: usize = sizes.iter().product();

        // Cross-talk: snapshot the cumulative state (as of the previous
        // cut) of every dependency collection so masked-out objects fail
        // their combinations outright.
        let mask_names = self.crosstalk.masked_collections(index);
        let masks: Vec<Option<Vec<bool>>> = members
            .iter()
            .map(|m| {
                if mask_names.iter().any(|n| n == m) {
                    cum.get(m).cloned()
                } else {
                    None
                }
            })
            .collect();

        // Map tree-referenced collections onto input member positions.
        let tree_cols = cut.tree.collections();
        let tree_member: Vec<usize> = tree_cols
            .iter()
            .map(|c| {
                members
                    .iter()
                    .position(|m| m == c)
                    .expect("tree collection is an input member")
            })
            .collect();

        let cx = EvalCx {
            tree: &cut.tree,
            event,
            accessor,
        };
        let mut raw_row = Vec::with_capacity(total);
        let mut member_idx = vec![0usize; members.len()];
        let mut tree_idx = vec![0usize; tree_cols.len()];
        for combo in 0..total {
            unrank(combo, &sizes, &mut member_idx);
            let masked_out = masks.iter().enumerate().any(|(j, mask)| {
                mask.as_ref()
                    .is_some_and(|m| !m.get(member_idx[j]).copied().unwrap_or(false))
            });
            let flag = if masked_out {
                false
            } else {
                for (k, &j) in tree_member.iter().enumerate() {
                    tree_idx[k] = member_idx[j];
                }
                cut.leaf_flag(cx.eval(&tree_idx))
            };
            raw_row.push(flag);
        }

        // Fold into the cumulative state for this key.
        let cum_row = cum.get_mut(key).expect("tracked key");
        for (combo, flag) in raw_row.iter().enumerate() {
            cum_row[combo] = cum_row[combo] && *flag;
        }
        let passing = count_passing(cum_row);
        let sub = match cut.spec.threshold {
            Threshold::AtLeast(n) => passing >= n,
            Threshold::All => passing == total,
            Threshold::EventWide => true,
        };

        // Correlation cuts: project surviving tuples back onto each member
        // collection — an object survives if some surviving tuple contains
        // it.
        if members.len() > 1 {
            let tuple_cum = cum[key].clone();
            for (j, member) in members.iter().enumerate() {
                let mut projected = vec![false; sizes[j]];
                for (combo, alive) in tuple_cum.iter().enumerate() {
                    if *alive {
                        unrank(combo, &sizes, &mut member_idx);
                        projected[member_idx[j]] = true;
                    }
                }
                if let Some(row) = cum.get_mut(member.as_str()) {
                    for (i, keep) in projected.iter().enumerate() {
                        row[i] = row[i] && *keep;
                    }
                }
            }
        }

        CutOutcome {
            sub,
            raw: Some((key.clone(), raw_row)),
        }
    }

    fn warn_missing(&self, collection: &str) {
        let mut warned = self.warned_missing.lock().expect("warn set poisoned");
        if warned.insert(collection.to_string()) {
            log::warn!(
                "collection `{collection}` not available for this event; \
                 no objects pass its cuts (reported once per run)"
            );
        }
    }
}

struct CutOutcome {
    sub: bool,
    raw: Option<(String, Vec<bool>)>,
}

/// Decode a cross-product position into per-member indices (row-major, the
/// first member varies slowest).
fn unrank(combo: usize, sizes: &[usize], indices: &mut [usize]) {
    let mut rem = combo;
    for j in (0..sizes.len()).rev() {
        indices[j] = rem % sizes[j];
        rem /= sizes[j];
    }
}

/// Number of objects (or tuples) a tracked key has for this event; `None`
/// when any member collection is missing.
fn key_size(tracked: &Tracked, event: &EventObjects) -> Option<usize> {
    let mut size = 1usize;
    for member in &tracked.members {
        size *= event.get(member)?.len();
    }
    Some(size)
}

/// Every distinct single collection and correlation key named by the cut
/// list, singles before the tuple keys that contain them so projections
/// always have somewhere to land.
fn build_tracked(cuts: &[CompiledCut]) -> Vec<Tracked> {
    fn add(tracked: &mut Vec<Tracked>, key: &str, members: Vec<String>) {
        if !tracked.iter().any(|t| t.key == key) {
            tracked.push(Tracked {
                key: key.to_string(),
                members,
            });
        }
    }

    let mut tracked: Vec<Tracked> = Vec::new();
    for cut in cuts {
        for member in &cut.members {
            add(&mut tracked, member, vec![member.clone()]);
        }
        if cut.members.len() > 1 {
            add(
                &mut tracked,
                &cut.spec.input_collection,
                cut.members.clone(),
            );
        }
    }
    tracked
}
