use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use binding_format::{
    ActionBehavior, ActionEntry, BINDINGS_VERSION, BindingTable, MidiSettings, Predicate,
    ProbeSettings, SwitchEntry, TableHeader, Timing,
};
use config_validator::schema::{Action, ActionKind, Config, PredicateDef, Switch};
use config_validator::{ConfigError, ValidationIssue, parse_config_str, validate_config};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

#[derive(Debug)]
pub struct BuildOutput {
    pub table: BindingTable,
    pub diagnostics: Vec<ValidationIssue>,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ConfigError),
    #[error("Validation errors encountered")]
    Validation(Vec<ValidationIssue>),
    #[error("Serialization error: {0}")]
    Serialize(#[from] bincode::Error),
    #[error("Unsupported binding table version {0}")]
    Version(u32),
}

pub fn build_from_path(path: impl AsRef<Path>) -> Result<(BuildOutput, Vec<u8>), BuildError> {
    let path_ref = path.as_ref();
    let content = fs::read_to_string(path_ref)?;
    let output = build_from_str(&content)?;
    let bytes = bincode::serialize(&output.table)?;
    Ok((output, bytes))
}

pub fn build_from_str(content: &str) -> Result<BuildOutput, BuildError> {
    let config = parse_config_str(content)?;
    build_from_config(&config, content)
}

/// Decodes a compiled table written by [`build_from_path`].
pub fn load_table(bytes: &[u8]) -> Result<BindingTable, BuildError> {
    let table: BindingTable = bincode::deserialize(bytes)?;
    if table.header.version != BINDINGS_VERSION {
        return Err(BuildError::Version(table.header.version));
    }
    Ok(table)
}

fn build_from_config(config: &Config, source: &str) -> Result<BuildOutput, BuildError> {
    let diagnostics = validate_config(config, source);
    if diagnostics
        .iter()
        .any(|issue| matches!(issue.severity, config_validator::Severity::Error))
    {
        return Err(BuildError::Validation(diagnostics));
    }

    let table = assemble_table(config, source);
    Ok(BuildOutput { table, diagnostics })
}

fn assemble_table(config: &Config, source: &str) -> BindingTable {
    let source_hash = xxh3_64(source.as_bytes());
    let generated_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    // `actions` is a BTreeMap, so arena indices follow id order.
    let ids: Vec<&String> = config.actions.keys().collect();
    let actions = config
        .actions
        .iter()
        .map(|(id, action)| convert_action(id, action, config.midi.channel))
        .collect();

    let switches = config
        .switches
        .iter()
        .map(|switch| convert_switch(switch, config, &ids))
        .collect();

    let pollers = resolve_refs(&config.pollers, &ids);

    let probes = config
        .probes
        .as_ref()
        .map(|probes| ProbeSettings {
            battery: probes.battery.clone(),
            dc: probes.dc.clone(),
            voltage: probes.voltage.clone(),
        })
        .unwrap_or_default();

    BindingTable {
        header: TableHeader {
            version: BINDINGS_VERSION,
            source_hash,
            generated_at,
        },
        midi: MidiSettings {
            channel: config.midi.channel,
            outputs: config.midi.outputs.clone(),
            input: config.midi.input.clone(),
        },
        timing: Timing {
            tick_ms: config.timing.tick_ms,
        },
        probes,
        actions,
        switches,
        pollers,
    }
}

fn resolve_refs(refs: &[String], ids: &[&String]) -> Vec<usize> {
    // validation has already rejected undefined references
    refs.iter()
        .filter_map(|action_ref| ids.iter().position(|id| *id == action_ref))
        .collect()
}

fn convert_switch(switch: &Switch, config: &Config, ids: &[&String]) -> SwitchEntry {
    let double = resolve_refs(&switch.double, ids);
    let double_click_ms = if double.is_empty() {
        None
    } else {
        Some(
            switch
                .double_click_ms
                .unwrap_or(config.timing.double_click_ms),
        )
    };
    SwitchEntry {
        id: switch.id.clone(),
        note: switch.note,
        hold_ms: switch.hold_ms.unwrap_or(config.timing.hold_ms),
        double_click_ms,
        short: resolve_refs(&switch.short, ids),
        hold: resolve_refs(&switch.hold, ids),
        double,
    }
}

fn convert_action(id: &str, action: &Action, default_channel: u8) -> ActionEntry {
    ActionEntry {
        id: id.to_string(),
        channel: action.channel.unwrap_or(default_channel),
        use_leds: action.use_leds,
        enabled_when: action
            .enabled_when
            .as_ref()
            .map(convert_predicate)
            .unwrap_or_default(),
        behavior: convert_kind(&action.kind),
    }
}

fn convert_kind(kind: &ActionKind) -> ActionBehavior {
    match kind {
        ActionKind::ToggleCc {
            field,
            cc,
            text,
            color_on,
            color_off,
            brightness,
        } => ActionBehavior::ToggleCc {
            field: *field,
            cc: *cc,
            text: text.clone(),
            color_on: color_on.resolve(),
            color_off: color_off.resolve(),
            brightness: *brightness,
        },
        ActionKind::PageSwap {
            field,
            send_swap,
            label_prefix,
            split_led,
            brightness,
        } => ActionBehavior::PageSwap {
            field: *field,
            send_swap: *send_swap,
            label_prefix: label_prefix.clone(),
            split_led: *split_led,
            brightness: *brightness,
        },
        ActionKind::PageSlot {
            slot,
            opposite,
            page_source,
            brightness,
        } => ActionBehavior::PageSlot {
            slot: *slot,
            opposite: *opposite,
            page_source: *page_source,
            brightness: *brightness,
        },
        ActionKind::ModeCycle { cc, named } => ActionBehavior::ModeCycle {
            cc: *cc,
            named: *named,
        },
        ActionKind::StyleToggle => ActionBehavior::StyleToggle,
        ActionKind::SceneStep {
            step,
            modulus,
            cc,
            color,
            brightness,
        } => ActionBehavior::SceneStep {
            step: *step,
            modulus: *modulus,
            cc: *cc,
            color: color.resolve(),
            brightness: *brightness,
        },
        ActionKind::FixedCc {
            cc,
            value,
            text,
            color,
            brightness,
        } => ActionBehavior::FixedCc {
            cc: *cc,
            value: *value,
            text: text.clone(),
            color: color.resolve(),
            brightness: *brightness,
        },
        ActionKind::PowerSense { poll_ms } => ActionBehavior::PowerSense { poll_ms: *poll_ms },
    }
}

fn convert_predicate(def: &PredicateDef) -> Predicate {
    match def {
        PredicateDef::Equals { field, equals } => match equals.resolve(*field) {
            Ok(value) => Predicate::Equals {
                field: *field,
                value,
            },
            // unreachable after validation; an unmatched predicate keeps the action disabled
            Err(_) => Predicate::Any(Vec::new()),
        },
        PredicateDef::Not { not } => Predicate::Not(Box::new(convert_predicate(not))),
        PredicateDef::All { all } => Predicate::All(all.iter().map(convert_predicate).collect()),
        PredicateDef::Any { any } => Predicate::Any(any.iter().map(convert_predicate).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binding_format::{Color, FlagField, StateField, StateValue};

    #[test]
    fn builds_action_arena_and_resolves_refs() {
        let yaml = r#"version: 1
midi:
  channel: 1
  outputs: ["MIDICaptain"]
timing:
  hold_ms: 650
actions:
  tuner:
    type: toggle_cc
    field: tuner
    cc: 45
    text: TUN
    color_on: red
    color_off: [10, 20, 30]
    enabled_when:
      field: gig_view
      equals: false
  gig:
    type: toggle_cc
    field: gig_view
    cc: 46
    text: GIG
    channel: 3
switches:
  - id: key5
    note: 65
    hold: [gig, tuner]
"#;
        let output = build_from_str(yaml).expect("build");
        let table = &output.table;
        assert_eq!(table.actions.len(), 2);
        // arena is ordered by id
        assert_eq!(table.actions[0].id, "gig");
        assert_eq!(table.actions[1].id, "tuner");
        assert_eq!(table.actions[0].channel, 3);
        assert_eq!(table.actions[1].channel, 1);
        assert_eq!(table.actions[0].enabled_when, Predicate::Always);
        assert_eq!(
            table.actions[1].enabled_when,
            Predicate::Equals {
                field: StateField::GigView,
                value: StateValue::Flag(false),
            }
        );
        match &table.actions[1].behavior {
            ActionBehavior::ToggleCc {
                field,
                cc,
                color_on,
                color_off,
                ..
            } => {
                assert_eq!(*field, FlagField::Tuner);
                assert_eq!(*cc, 45);
                assert_eq!(*color_on, Color::RED);
                assert_eq!(*color_off, Color::rgb(10, 20, 30));
            }
            other => panic!("unexpected behavior: {other:?}"),
        }

        let switch = &table.switches[0];
        assert_eq!(switch.hold, vec![0, 1]);
        assert_eq!(switch.hold_ms, 650);
        assert_eq!(switch.double_click_ms, None);
        assert_eq!(switch.note, Some(65));
    }

    #[test]
    fn double_list_enables_window() {
        let yaml = r#"version: 1
midi:
  outputs: ["MIDICaptain"]
actions:
  mode:
    type: mode_cycle
    named: true
  style:
    type: style_toggle
switches:
  - id: key2
    short: [mode]
    double: [style]
"#;
        let output = build_from_str(yaml).expect("build");
        let switch = &output.table.switches[0];
        assert_eq!(switch.double_click_ms, Some(700));
        assert_eq!(switch.double, vec![1]);
    }

    #[test]
    fn validation_errors_block_build() {
        let yaml = r#"version: 1
actions: {}
switches:
  - id: key0
    short: [nope]
"#;
        match build_from_str(yaml) {
            Err(BuildError::Validation(diags)) => {
                assert!(diags.iter().any(|d| d.path == "switches[0].short[0]"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn compiled_bytes_decode_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("profile.yaml");
        fs::write(
            &path,
            "version: 1\nmidi:\n  outputs: [\"x\"]\nactions:\n  tap:\n    type: fixed_cc\n    cc: 44\n    text: TAP\nswitches:\n  - id: key5\n    short: [tap]\n",
        )
        .expect("write profile");
        let (output, bytes) = build_from_path(&path).expect("build");
        let decoded = load_table(&bytes).expect("decode");
        assert_eq!(decoded, output.table);
    }
}
