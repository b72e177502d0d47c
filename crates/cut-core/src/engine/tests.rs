use cut_config::SelectionConfig;

use super::*;
use crate::accessor::FieldAccessor;
use crate::object::EventObjects;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Particle {
    pt: f64,
    eta: f64,
}

fn accessor() -> FieldAccessor {
    let mut a = FieldAccessor::new();
    a.register("particle", "pt", |p: &Particle| p.pt);
    a.register("particle", "eta", |p: &Particle| p.eta);
    a
}

fn particles(values: &[(f64, f64)]) -> Vec<Particle> {
    values
        .iter()
        .map(|&(pt, eta)| Particle { pt, eta })
        .collect()
}

fn jets_event(pts: &[f64]) -> EventObjects {
    let mut e = EventObjects::new();
    e.insert_objects(
        "jets",
        "particle",
        particles(&pts.iter().map(|&pt| (pt, 0.0)).collect::<Vec<_>>()),
    );
    e
}

fn engine(toml: &str) -> CutEngine {
    let config: SelectionConfig = toml.parse().unwrap();
    CutEngine::compile(&config).unwrap()
}

const JET_PT_TOML: &str = r#"
[selection]
name = "test"

[collections]
jets = "particle"

[[cut]]
name             = "jetPt"
input_collection = "jets"
cut_string       = "jets.pt"
operator         = ">="
value            = 50.0
number_required  = 1
"#;

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[test]
fn jet_pt_at_least_one() {
    // jets pt = [10, 55, 120], cut ">= 50", at least 1 required:
    // per-object flags [false, true, true], 2 passing >= 1 -> event true.
    let engine = engine(JET_PT_TOML);
    let payload = engine.decide(&jets_event(&[10.0, 55.0, 120.0]), &accessor());

    assert_eq!(
        payload.object_flags.row("jets", 0).unwrap(),
        &[false, true, true]
    );
    assert_eq!(payload.decision.cut_results, vec![true]);
    assert!(payload.decision.passed);
}

#[test]
fn jet_pt_require_all_fails() {
    // Same event, number_required = -1: object 0 fails, so the event-level
    // sub-result is false even though 2 of 3 individually pass.
    let toml = JET_PT_TOML.replace("number_required  = 1", "number_required  = -1");
    let engine = engine(&toml);
    let payload = engine.decide(&jets_event(&[10.0, 55.0, 120.0]), &accessor());

    assert_eq!(
        payload.object_flags.row("jets", 0).unwrap(),
        &[false, true, true]
    );
    assert_eq!(payload.decision.cut_results, vec![false]);
    assert!(!payload.decision.passed);
}

#[test]
fn required_trigger_not_fired_fails_event() {
    let toml = format!(
        "{JET_PT_TOML}\n[triggers]\nrequired = [\"HLT_A\", \"HLT_B\"]\n"
    );
    let engine = engine(&toml);
    let mut event = jets_event(&[100.0]);
    event.set_fired_triggers(vec!["HLT_C".to_string()]);
    let payload = engine.decide(&event, &accessor());

    assert!(!payload.decision.triggers.accepted);
    assert!(!payload.decision.passed);
    // The jet cut itself still passed and was recorded.
    assert_eq!(payload.decision.cut_results, vec![true]);
}

#[test]
fn veto_trigger_forces_event_false() {
    let toml = format!("{JET_PT_TOML}\n[triggers]\nveto = [\"HLT_C\"]\n");
    let engine = engine(&toml);
    let mut event = jets_event(&[100.0]);
    event.set_fired_triggers(vec!["HLT_C".to_string()]);
    let payload = engine.decide(&event, &accessor());

    assert!(payload.decision.triggers.vetoed);
    assert!(!payload.decision.passed);
    assert_eq!(payload.decision.cut_results, vec![true]);
}

// ---------------------------------------------------------------------------
// Veto cuts
// ---------------------------------------------------------------------------

#[test]
fn veto_cut_inverts_object_flags() {
    let toml = JET_PT_TOML.replace("number_required  = 1", "number_required  = 1\nis_veto          = true");
    let engine = engine(&toml);
    let payload = engine.decide(&jets_event(&[10.0, 55.0, 120.0]), &accessor());

    // Raw comparison pt >= 50 is [false, true, true]; veto keeps the
    // objects failing it.
    assert_eq!(
        payload.object_flags.row("jets", 0).unwrap(),
        &[true, false, false]
    );
    assert_eq!(payload.decision.cut_results, vec![true]);
}

#[test]
fn event_wide_cut_flags_objects_without_gating() {
    // number_required = 0: object flags recorded, event not gated.
    let toml = r#"
[selection]
name = "test"

[collections]
jets = "particle"

[[cut]]
name             = "softJetVeto"
input_collection = "jets"
cut_string       = "jets.pt"
operator         = "<"
value            = 20.0
number_required  = 0
is_veto          = true
"#;
    let engine = engine(toml);
    let payload = engine.decide(&jets_event(&[10.0, 55.0, 120.0]), &accessor());

    assert_eq!(
        payload.object_flags.row("jets", 0).unwrap(),
        &[false, true, true]
    );
    assert_eq!(payload.decision.cut_results, vec![true]);
    assert!(payload.decision.passed);
    assert!(!payload.passes_all("jets", 0));
    assert!(payload.passes_all("jets", 1));
}

// ---------------------------------------------------------------------------
// Cumulative flags
// ---------------------------------------------------------------------------

const TWO_CUT_TOML: &str = r#"
[selection]
name = "test"

[collections]
jets = "particle"

[[cut]]
name             = "jetPt"
input_collection = "jets"
cut_string       = "jets.pt"
operator         = ">="
value            = 50.0
number_required  = 1

[[cut]]
name             = "jetEta"
input_collection = "jets"
cut_string       = "abs(jets.eta) < 1.0"
number_required  = 1
"#;

#[test]
fn cumulative_flags_and_monotonicity() {
    let engine = engine(TWO_CUT_TOML);
    let mut event = EventObjects::new();
    event.insert_objects(
        "jets",
        "particle",
        particles(&[(10.0, 0.0), (55.0, 2.0), (120.0, 0.5)]),
    );
    let payload = engine.decide(&event, &accessor());

    // Raw flags record each cut independently.
    assert_eq!(
        payload.object_flags.row("jets", 0).unwrap(),
        &[false, true, true]
    );
    assert_eq!(
        payload.object_flags.row("jets", 1).unwrap(),
        &[true, false, true]
    );

    // Cumulative flags AND down the cut axis.
    assert_eq!(
        payload.cumulative_flags.row("jets", 0).unwrap(),
        &[false, true, true]
    );
    assert_eq!(
        payload.cumulative_flags.row("jets", 1).unwrap(),
        &[false, false, true]
    );

    // Once excluded, always excluded.
    let rows = payload.cumulative_flags.rows("jets").unwrap();
    for object in 0..3 {
        let mut alive = true;
        for row in rows {
            assert!(alive || !row[object], "object {object} came back to life");
            alive = row[object];
        }
    }

    assert_eq!(payload.decision.cut_results, vec![true, true]);
    assert!(payload.decision.passed);
    assert!(payload.passes_all("jets", 2));
    assert!(!payload.passes_all("jets", 0));
}

#[test]
fn no_short_circuit_after_event_fails() {
    // First cut fails the event; the second cut's flags are still computed
    // and recorded for the audit trail.
    let toml = TWO_CUT_TOML.replace("number_required  = 1\n\n", "number_required  = 3\n\n");
    let engine = engine(&toml);
    let mut event = EventObjects::new();
    event.insert_objects(
        "jets",
        "particle",
        particles(&[(10.0, 0.0), (55.0, 2.0), (120.0, 0.5)]),
    );
    let payload = engine.decide(&event, &accessor());

    assert_eq!(payload.decision.cut_results[0], false);
    assert!(!payload.decision.passed);
    assert_eq!(
        payload.object_flags.row("jets", 1).unwrap(),
        &[true, false, true]
    );
}

#[test]
fn decide_is_deterministic() {
    let engine = engine(TWO_CUT_TOML);
    let mut event = EventObjects::new();
    event.insert_objects(
        "jets",
        "particle",
        particles(&[(10.0, 0.0), (55.0, 2.0), (120.0, 0.5)]),
    );
    let acc = accessor();
    let first = engine.decide(&event, &acc);
    let second = engine.decide(&event, &acc);
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Missing collections
// ---------------------------------------------------------------------------

#[test]
fn missing_collection_degrades_to_no_objects_pass() {
    let engine = engine(JET_PT_TOML);
    // Event carries no jets collection at all.
    let payload = engine.decide(&EventObjects::new(), &accessor());

    assert_eq!(payload.object_flags.row("jets", 0).unwrap(), &[] as &[bool]);
    assert_eq!(payload.decision.cut_results, vec![false]);
    assert!(!payload.decision.passed);
}

#[test]
fn empty_collection_satisfies_require_all_vacuously() {
    let toml = JET_PT_TOML.replace("number_required  = 1", "number_required  = -1");
    let engine = engine(&toml);
    let payload = engine.decide(&jets_event(&[]), &accessor());
    assert_eq!(payload.decision.cut_results, vec![true]);
}

// ---------------------------------------------------------------------------
// Event-scoped cuts
// ---------------------------------------------------------------------------

#[test]
fn event_scoped_cut_single_boolean() {
    let toml = r#"
[selection]
name = "test"

[collections]
jets = "particle"

[[cut]]
name       = "alwaysOn"
cut_string = "1 > 0"

[[cut]]
name       = "alwaysOff"
cut_string = "1 < 0"
"#;
    let engine = engine(toml);
    let payload = engine.decide(&EventObjects::new(), &accessor());
    assert_eq!(payload.decision.cut_results, vec![true, false]);
    assert!(!payload.decision.passed);
}

// ---------------------------------------------------------------------------
// Correlation cuts & cross-talk
// ---------------------------------------------------------------------------

const CORRELATION_TOML: &str = r#"
[selection]
name = "test"

[collections]
muons = "particle"
jets = "particle"

[[cut]]
name             = "muonPt"
input_collection = "muons"
cut_string       = "muons.pt"
operator         = ">="
value            = 20.0
number_required  = 1

[[cut]]
name             = "muJetSum"
input_collection = "muons-jets"
cut_string       = "muons.pt + jets.pt > 125"
number_required  = 1
depends_on       = ["muonPt"]
"#;

fn correlation_event() -> EventObjects {
    let mut event = EventObjects::new();
    event.insert_objects(
        "muons",
        "particle",
        particles(&[(30.0, 0.0), (5.0, 0.0)]),
    );
    event.insert_objects(
        "jets",
        "particle",
        particles(&[(100.0, 0.0), (40.0, 0.0)]),
    );
    event
}

#[test]
fn correlation_cut_counts_tuples() {
    let engine = engine(CORRELATION_TOML);
    let payload = engine.decide(&correlation_event(), &accessor());

    // Tuple order: (m0,j0), (m0,j1), (m1,j0), (m1,j1). Sums: 130, 70,
    // 105, 45. Only (m0,j0) clears 125 — and cross-talk masks m1's tuples
    // anyway because m1 failed muonPt.
    assert_eq!(
        payload.object_flags.row("muons-jets", 1).unwrap(),
        &[true, false, false, false]
    );
    assert_eq!(payload.decision.cut_results, vec![true, true]);
    assert!(payload.decision.passed);
}

#[test]
fn cross_talk_masks_objects_cut_earlier() {
    // Without the dependency, tuple (m1,j0) would score 105 and a looser
    // threshold would accept it; with the mask it must stay false.
    let toml = CORRELATION_TOML.replace("> 125", "> 100");
    let engine = engine(&toml);
    let payload = engine.decide(&correlation_event(), &accessor());

    // (m0,j0)=130 passes, (m1,j0)=105 would pass the sum but m1 is masked.
    assert_eq!(
        payload.object_flags.row("muons-jets", 1).unwrap(),
        &[true, false, false, false]
    );
}

#[test]
fn correlation_projects_onto_member_collections() {
    let engine = engine(CORRELATION_TOML);
    let payload = engine.decide(&correlation_event(), &accessor());

    // Only the (m0,j0) tuple survives, so j1 dies in the projection.
    assert_eq!(
        payload.cumulative_flags.row("muons", 1).unwrap(),
        &[true, false]
    );
    assert_eq!(
        payload.cumulative_flags.row("jets", 1).unwrap(),
        &[true, false]
    );
    assert!(payload.passes_all("jets", 0));
    assert!(!payload.passes_all("jets", 1));
}

#[test]
fn cumulative_for_exposes_intermediate_state() {
    let engine = engine(CORRELATION_TOML);
    let payload = engine.decide(&correlation_event(), &accessor());
    let slice = engine
        .crosstalk()
        .cumulative_for(&payload.cumulative_flags, "muons", 0)
        .unwrap();
    assert_eq!(slice, &[true, false]);
}

// ---------------------------------------------------------------------------
// Startup failures
// ---------------------------------------------------------------------------

#[test]
fn uncompilable_cut_fails_at_startup() {
    let toml = JET_PT_TOML.replace("jets.pt", "jets.pt >");
    let config: SelectionConfig = toml.parse().unwrap();
    assert!(CutEngine::compile(&config).is_err());
}

#[test]
fn unknown_collection_in_expression_fails_at_startup() {
    let toml = CORRELATION_TOML.replace("muons.pt + jets.pt > 125", "taus.pt > 5");
    let config: SelectionConfig = toml.parse().unwrap();
    assert!(CutEngine::compile(&config).is_err());
}

#[test]
fn cut_names_in_order() {
    let engine = engine(CORRELATION_TOML);
    assert_eq!(engine.cut_names(), vec!["muonPt", "muJetSum"]);
}
