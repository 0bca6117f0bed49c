use std::collections::{BTreeSet, HashMap, HashSet};

use crate::schema::{Action, ActionKind, Config, PredicateDef};

#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
    pub location: Option<Location>,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl ValidationIssue {
    pub fn new(path: String, message: String, severity: Severity) -> Self {
        Self {
            path,
            message,
            location: None,
            severity,
        }
    }
}

/// Longest label a gesture switch can show.
pub const LABEL_BUDGET: usize = 5;

pub fn validate_config(config: &Config, source: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if config.version != 1 {
        issues.push(ValidationIssue::new(
            "version".into(),
            format!("Unsupported schema version {} (expected 1)", config.version),
            Severity::Error,
        ));
    }

    validate_midi(config, &mut issues);
    validate_timing(config, &mut issues);

    for (action_id, action) in &config.actions {
        validate_action(&format!("actions.{action_id}"), action, &mut issues);
    }

    let mut referenced: HashSet<&str> = HashSet::new();
    let mut switch_ids = HashSet::new();
    let mut note_map: HashMap<u8, &str> = HashMap::new();

    for (index, switch) in config.switches.iter().enumerate() {
        let path = format!("switches[{index}]");

        if !switch_ids.insert(switch.id.as_str()) {
            issues.push(ValidationIssue::new(
                format!("{path}.id"),
                format!("Duplicate switch id `{}`", switch.id),
                Severity::Error,
            ));
        }

        if let Some(note) = switch.note {
            if note > 127 {
                issues.push(ValidationIssue::new(
                    format!("{path}.note"),
                    "Note number must be between 0 and 127".into(),
                    Severity::Error,
                ));
            } else if let Some(existing) = note_map.insert(note, switch.id.as_str()) {
                issues.push(ValidationIssue::new(
                    format!("{path}.note"),
                    format!("Note {note} already assigned to switch `{existing}`"),
                    Severity::Warning,
                ));
            }
        }

        if switch.hold_ms == Some(0) {
            issues.push(ValidationIssue::new(
                format!("{path}.hold_ms"),
                "Hold threshold must be greater than zero".into(),
                Severity::Error,
            ));
        }

        match switch.double_click_ms {
            Some(0) => issues.push(ValidationIssue::new(
                format!("{path}.double_click_ms"),
                "Double-click window must be greater than zero".into(),
                Severity::Error,
            )),
            Some(_) if switch.double.is_empty() => issues.push(ValidationIssue::new(
                format!("{path}.double_click_ms"),
                "Double-click window is ignored because the switch has no `double` actions"
                    .into(),
                Severity::Warning,
            )),
            _ => {}
        }

        if switch.short.is_empty() && switch.hold.is_empty() && switch.double.is_empty() {
            issues.push(ValidationIssue::new(
                path.clone(),
                format!("Switch `{}` has no bound actions", switch.id),
                Severity::Warning,
            ));
        }

        for (gesture, candidates) in switch.gesture_lists() {
            for (position, action_ref) in candidates.iter().enumerate() {
                let ref_path = format!("{path}.{gesture}[{position}]");
                referenced.insert(action_ref.as_str());
                let Some(action) = config.actions.get(action_ref) else {
                    issues.push(ValidationIssue::new(
                        ref_path,
                        format!("References undefined action `{action_ref}`"),
                        Severity::Error,
                    ));
                    continue;
                };
                if action.kind.is_poller() {
                    issues.push(ValidationIssue::new(
                        ref_path.clone(),
                        format!(
                            "Polling action `{action_ref}` cannot be bound to a gesture; list it under `pollers`"
                        ),
                        Severity::Error,
                    ));
                }
                if action.enabled_when.is_none() && position + 1 < candidates.len() {
                    issues.push(ValidationIssue::new(
                        ref_path,
                        format!(
                            "Action `{action_ref}` is always enabled and shadows the {} candidate(s) after it",
                            candidates.len() - position - 1
                        ),
                        Severity::Warning,
                    ));
                }
            }
        }
    }

    for (index, poller) in config.pollers.iter().enumerate() {
        let path = format!("pollers[{index}]");
        referenced.insert(poller.as_str());
        match config.actions.get(poller) {
            None => issues.push(ValidationIssue::new(
                path,
                format!("References undefined action `{poller}`"),
                Severity::Error,
            )),
            Some(action) if !action.kind.is_poller() => issues.push(ValidationIssue::new(
                path,
                format!("Action `{poller}` has no per-tick behaviour and never updates"),
                Severity::Warning,
            )),
            Some(_) => {}
        }
    }

    let unused: BTreeSet<&str> = config
        .actions
        .keys()
        .map(String::as_str)
        .filter(|id| !referenced.contains(id))
        .collect();
    for id in unused {
        issues.push(ValidationIssue::new(
            format!("actions.{id}"),
            format!("Action `{id}` is not bound to any switch or poller"),
            Severity::Info,
        ));
    }

    attach_locations(source, issues)
}

fn validate_midi(config: &Config, issues: &mut Vec<ValidationIssue>) {
    if config.midi.channel > 15 {
        issues.push(ValidationIssue::new(
            "midi.channel".into(),
            "MIDI channel is zero-based and must be between 0 and 15".into(),
            Severity::Error,
        ));
    }
    if config.midi.outputs.is_empty() {
        issues.push(ValidationIssue::new(
            "midi.outputs".into(),
            "No MIDI outputs configured; control changes will only be logged".into(),
            Severity::Warning,
        ));
    }
    if config
        .midi
        .outputs
        .iter()
        .any(|name| name.trim().is_empty())
    {
        issues.push(ValidationIssue::new(
            "midi.outputs".into(),
            "Output port names must not be empty".into(),
            Severity::Error,
        ));
    }
}

fn validate_timing(config: &Config, issues: &mut Vec<ValidationIssue>) {
    let timing = &config.timing;
    for (key, value) in [
        ("hold_ms", timing.hold_ms),
        ("double_click_ms", timing.double_click_ms),
        ("tick_ms", timing.tick_ms),
    ] {
        if value == 0 {
            issues.push(ValidationIssue::new(
                format!("timing.{key}"),
                format!("`{key}` must be greater than zero"),
                Severity::Error,
            ));
        }
    }
    if timing.tick_ms > timing.double_click_ms {
        issues.push(ValidationIssue::new(
            "timing.tick_ms".into(),
            format!(
                "Tick period {}ms is longer than the double-click window {}ms",
                timing.tick_ms, timing.double_click_ms
            ),
            Severity::Warning,
        ));
    }
}

fn validate_action(path: &str, action: &Action, issues: &mut Vec<ValidationIssue>) {
    if let Some(channel) = action.channel {
        if channel > 15 {
            issues.push(ValidationIssue::new(
                format!("{path}.channel"),
                "MIDI channel is zero-based and must be between 0 and 15".into(),
                Severity::Error,
            ));
        }
    }

    let mut brightness = None;
    let mut label: Option<(&str, usize)> = None;

    match &action.kind {
        ActionKind::ToggleCc {
            cc,
            text,
            brightness: level,
            ..
        } => {
            check_data_byte(path, "cc", *cc, issues);
            brightness = Some(*level);
            // one character is reserved for the +/- suffix
            label = Some(("text", text.chars().count() + 1));
        }
        ActionKind::PageSwap {
            label_prefix,
            brightness: level,
            ..
        } => {
            brightness = Some(*level);
            label = Some(("label_prefix", label_prefix.chars().count() + 1));
        }
        ActionKind::PageSlot {
            slot,
            brightness: level,
            ..
        } => {
            brightness = Some(*level);
            if *slot > 3 {
                issues.push(ValidationIssue::new(
                    format!("{path}.slot"),
                    "Slot index must be between 0 and 3".into(),
                    Severity::Error,
                ));
            }
        }
        ActionKind::ModeCycle { cc, .. } => check_data_byte(path, "cc", *cc, issues),
        ActionKind::StyleToggle => {}
        ActionKind::SceneStep {
            step,
            modulus,
            cc,
            brightness: level,
            ..
        } => {
            check_data_byte(path, "cc", *cc, issues);
            brightness = Some(*level);
            if *modulus == 0 || *modulus > 128 {
                issues.push(ValidationIssue::new(
                    format!("{path}.modulus"),
                    "Scene modulus must be between 1 and 128".into(),
                    Severity::Error,
                ));
            }
            if *step == 0 {
                issues.push(ValidationIssue::new(
                    format!("{path}.step"),
                    "Scene step of zero never changes the scene".into(),
                    Severity::Warning,
                ));
            }
        }
        ActionKind::FixedCc {
            cc,
            value,
            text,
            brightness: level,
            ..
        } => {
            check_data_byte(path, "cc", *cc, issues);
            check_data_byte(path, "value", *value, issues);
            brightness = Some(*level);
            label = Some(("text", text.chars().count()));
        }
        ActionKind::PowerSense { poll_ms } => {
            if *poll_ms == 0 {
                issues.push(ValidationIssue::new(
                    format!("{path}.poll_ms"),
                    "Poll interval must be greater than zero".into(),
                    Severity::Error,
                ));
            }
        }
    }

    if let Some(level) = brightness {
        if !(0.0..=1.0).contains(&level) {
            issues.push(ValidationIssue::new(
                format!("{path}.brightness"),
                "Brightness must be between 0.0 and 1.0".into(),
                Severity::Error,
            ));
        }
    }

    if let Some((key, rendered)) = label {
        if rendered > LABEL_BUDGET {
            issues.push(ValidationIssue::new(
                format!("{path}.{key}"),
                format!(
                    "Rendered label is {rendered} characters but switch labels fit {LABEL_BUDGET}"
                ),
                Severity::Warning,
            ));
        }
    }

    if let Some(predicate) = &action.enabled_when {
        validate_predicate(&format!("{path}.enabled_when"), predicate, issues);
    }
}

fn check_data_byte(path: &str, key: &str, value: u8, issues: &mut Vec<ValidationIssue>) {
    if value > 127 {
        issues.push(ValidationIssue::new(
            format!("{path}.{key}"),
            format!("`{key}` must be between 0 and 127"),
            Severity::Error,
        ));
    }
}

fn validate_predicate(path: &str, predicate: &PredicateDef, issues: &mut Vec<ValidationIssue>) {
    match predicate {
        PredicateDef::Equals { field, equals } => {
            if let Err(message) = equals.resolve(*field) {
                issues.push(ValidationIssue::new(
                    format!("{path}.equals"),
                    message,
                    Severity::Error,
                ));
            }
        }
        PredicateDef::Not { not } => validate_predicate(&format!("{path}.not"), not, issues),
        PredicateDef::All { all } => {
            for (idx, inner) in all.iter().enumerate() {
                validate_predicate(&format!("{path}.all[{idx}]"), inner, issues);
            }
        }
        PredicateDef::Any { any } => {
            if any.is_empty() {
                issues.push(ValidationIssue::new(
                    format!("{path}.any"),
                    "An empty `any` list is never satisfied".into(),
                    Severity::Warning,
                ));
            }
            for (idx, inner) in any.iter().enumerate() {
                validate_predicate(&format!("{path}.any[{idx}]"), inner, issues);
            }
        }
    }
}

fn attach_locations(source: &str, mut issues: Vec<ValidationIssue>) -> Vec<ValidationIssue> {
    for issue in &mut issues {
        issue.location = find_location(source, &issue.path);
    }
    issues
}

fn find_location(source: &str, path: &str) -> Option<Location> {
    let segment = path.split('.').next_back()?;
    let needle = segment.split('[').next()?;
    if needle.is_empty() {
        return None;
    }
    for (idx, line) in source.lines().enumerate() {
        if let Some(column) = line.find(needle) {
            return Some(Location {
                line: idx + 1,
                column: column + 1,
            });
        }
    }
    None
}
