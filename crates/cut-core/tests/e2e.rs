//! End-to-end: TOML selection -> compiled engine -> JSON events -> decisions.

use cut_config::SelectionConfig;
use cut_core::bridge::{event_from_json, register_json_resolver};
use cut_core::{CutEngine, FieldAccessor};

const SELECTION: &str = r#"
[selection]
name = "dimuon-plus-jet"

[collections]
muons = "muon"
jets = "jet"

[triggers]
required = ["HLT_IsoMu24"]
veto = ["HLT_Noise"]

[[cut]]
name             = "muonPt"
input_collection = "muons"
cut_string       = "muons.pt"
operator         = ">="
value            = 25.0
number_required  = 2

[[cut]]
name             = "muonEta"
input_collection = "muons"
cut_string       = "abs(muons.eta) < 2.4"
number_required  = 2

[[cut]]
name             = "jetPt"
input_collection = "jets"
cut_string       = "jets.pt > 30"
number_required  = 1

[[cut]]
name             = "muJetSeparation"
input_collection = "muons-jets"
cut_string       = "deltaR(muons.eta, muons.phi, jets.eta, jets.phi) > 0.4"
number_required  = 1
depends_on       = ["muonPt", "jetPt"]
"#;

fn setup() -> (CutEngine, SelectionConfig, FieldAccessor) {
    let config: SelectionConfig = SELECTION.parse().expect("valid selection");
    let engine = CutEngine::compile(&config).expect("selection compiles");
    let mut accessor = FieldAccessor::new();
    for type_tag in ["muon", "jet"] {
        register_json_resolver(&mut accessor, type_tag);
    }
    (engine, config, accessor)
}

fn decide(json: &str) -> cut_core::DecisionPayload {
    let (engine, config, accessor) = setup();
    let value: serde_json::Value = serde_json::from_str(json).unwrap();
    let event = event_from_json(&value, &config.collections).unwrap();
    engine.decide(&event, &accessor)
}

#[test]
fn good_event_passes_all_cuts() {
    let payload = decide(
        r#"{
            "muons": [
                {"pt": 40.0, "eta": 0.5, "phi": 0.0},
                {"pt": 30.0, "eta": -1.0, "phi": 2.0}
            ],
            "jets": [
                {"pt": 80.0, "eta": 2.0, "phi": -2.0},
                {"pt": 10.0, "eta": 0.0, "phi": 1.0}
            ],
            "triggers": ["HLT_IsoMu24"]
        }"#,
    );

    assert_eq!(payload.decision.cut_results, vec![true, true, true, true]);
    assert!(payload.decision.passed);
    assert!(payload.passes_all("muons", 0));
    assert!(payload.passes_all("muons", 1));
    assert!(payload.passes_all("jets", 0));
    // The soft jet failed jetPt, so no surviving tuple contains it.
    assert!(!payload.passes_all("jets", 1));
}

#[test]
fn single_soft_muon_fails_threshold() {
    let payload = decide(
        r#"{
            "muons": [
                {"pt": 40.0, "eta": 0.5, "phi": 0.0},
                {"pt": 10.0, "eta": -1.0, "phi": 2.0}
            ],
            "jets": [{"pt": 80.0, "eta": 2.0, "phi": -2.0}],
            "triggers": ["HLT_IsoMu24"]
        }"#,
    );

    // Only one muon clears 25 GeV but two are required.
    assert!(!payload.decision.cut_results[0]);
    assert!(!payload.decision.passed);
    assert_eq!(
        payload.object_flags.row("muons", 0).unwrap(),
        &[true, false]
    );
}

#[test]
fn veto_trigger_overrides_good_cuts() {
    let payload = decide(
        r#"{
            "muons": [
                {"pt": 40.0, "eta": 0.5, "phi": 0.0},
                {"pt": 30.0, "eta": -1.0, "phi": 2.0}
            ],
            "jets": [{"pt": 80.0, "eta": 2.0, "phi": -2.0}],
            "triggers": ["HLT_IsoMu24", "HLT_Noise"]
        }"#,
    );

    assert!(payload.decision.cut_results.iter().all(|&r| r));
    assert!(payload.decision.triggers.vetoed);
    assert!(!payload.decision.passed);
}

#[test]
fn missing_jets_degrades_without_aborting() {
    let payload = decide(
        r#"{
            "muons": [
                {"pt": 40.0, "eta": 0.5, "phi": 0.0},
                {"pt": 30.0, "eta": -1.0, "phi": 2.0}
            ],
            "triggers": ["HLT_IsoMu24"]
        }"#,
    );

    // Muon cuts still pass; both jet-dependent cuts degrade to false.
    assert_eq!(
        payload.decision.cut_results,
        vec![true, true, false, false]
    );
    assert!(!payload.decision.passed);
}

#[test]
fn unknown_json_fields_fall_back_to_sentinel_failure() {
    // The muons carry no eta at all: muonEta's leaves are sentinels, so the
    // cut fails its objects without any error escaping.
    let payload = decide(
        r#"{
            "muons": [{"pt": 40.0, "phi": 0.0}, {"pt": 30.0, "phi": 2.0}],
            "jets": [{"pt": 80.0, "eta": 2.0, "phi": -2.0}],
            "triggers": ["HLT_IsoMu24"]
        }"#,
    );

    assert!(payload.decision.cut_results[0]);
    assert!(!payload.decision.cut_results[1]);
    assert_eq!(
        payload.object_flags.row("muons", 1).unwrap(),
        &[false, false]
    );
    assert!(!payload.decision.passed);
}
