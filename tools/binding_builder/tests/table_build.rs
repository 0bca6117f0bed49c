use binding_builder::build_from_str;
use binding_format::{ActionBehavior, PageField, Predicate, StateField, StateValue};
use config_validator::Severity;

const PROFILE: &str = include_str!("../../../profiles/qc_mini6.yaml");

#[test]
fn shipped_profile_compiles_cleanly() {
    let output = build_from_str(PROFILE).expect("build");
    assert!(
        output
            .diagnostics
            .iter()
            .all(|d| d.severity != Severity::Error && d.severity != Severity::Warning),
        "unexpected diagnostics: {:?}",
        output.diagnostics
    );

    let table = &output.table;
    assert_eq!(table.switches.len(), 6);
    assert_eq!(table.midi.outputs, vec!["MIDICaptain", "DIN"]);
    assert_eq!(table.timing.tick_ms, 10);
    assert!(table.probes.battery.is_some());

    let key0 = &table.switches[table.switch_index("key0").expect("key0")];
    assert_eq!(key0.hold_ms, 600);
    assert_eq!(key0.double_click_ms, None);
    let short_ids: Vec<_> = key0
        .short
        .iter()
        .map(|idx| table.actions[*idx].id.as_str())
        .collect();
    assert_eq!(short_ids, vec!["slot_a_chain", "slot_a_gig"]);

    let key2 = &table.switches[table.switch_index("key2").expect("key2")];
    assert_eq!(key2.double_click_ms, Some(700));
    assert_eq!(table.actions[key2.double[0]].id, "style");

    let power = table.action_index("power").expect("power");
    assert_eq!(table.pollers, vec![power]);
}

#[test]
fn gated_slots_carry_gig_view_predicates() {
    let output = build_from_str(PROFILE).expect("build");
    let table = &output.table;
    let chain = &table.actions[table.action_index("slot_a_chain").expect("chain")];
    assert_eq!(
        chain.enabled_when,
        Predicate::Equals {
            field: StateField::GigView,
            value: StateValue::Flag(false),
        }
    );
    match &chain.behavior {
        ActionBehavior::PageSlot {
            slot,
            opposite,
            page_source,
            ..
        } => {
            assert_eq!(*slot, 0);
            assert!(!opposite);
            assert_eq!(*page_source, PageField::MidiPage);
        }
        other => panic!("unexpected behavior: {other:?}"),
    }

    let gig = &table.actions[table.action_index("gig").expect("gig")];
    assert_eq!(gig.enabled_when, Predicate::Always);
}
