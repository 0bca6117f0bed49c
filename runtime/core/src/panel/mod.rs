//! Shadow feedback panel: keeps the last written label per display and logs what changed.

use tracing::info;

use crate::feedback::{FeedbackSurface, FeedbackTarget, LabelState, SwitchColor};

#[derive(Debug, Clone, PartialEq)]
pub struct PanelChange {
    pub display: String,
    pub label: LabelState,
}

#[derive(Debug, Default)]
pub struct Panel {
    switch_ids: Vec<String>,
    switches: Vec<LabelState>,
    status: LabelState,
    main: LabelState,
    overflow: LabelState,
    published: Option<Vec<LabelState>>,
}

impl Panel {
    pub fn new<I, S>(switch_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let switch_ids: Vec<String> = switch_ids.into_iter().map(Into::into).collect();
        Self {
            switches: vec![LabelState::default(); switch_ids.len()],
            switch_ids,
            ..Self::default()
        }
    }

    pub fn switch_label(&self, switch: usize) -> Option<&LabelState> {
        self.switches.get(switch)
    }

    pub fn switch_label_by_id(&self, id: &str) -> Option<&LabelState> {
        self.switch_ids
            .iter()
            .position(|candidate| candidate == id)
            .and_then(|index| self.switches.get(index))
    }

    pub fn status(&self) -> &LabelState {
        &self.status
    }

    pub fn main(&self) -> &LabelState {
        &self.main
    }

    fn snapshot(&self) -> Vec<LabelState> {
        let mut labels = self.switches.clone();
        labels.push(self.status.clone());
        labels.push(self.main.clone());
        labels
    }

    fn display_name(&self, index: usize) -> String {
        match index.checked_sub(self.switches.len()) {
            None => self.switch_ids[index].clone(),
            Some(0) => "status".into(),
            Some(_) => "main".into(),
        }
    }

    /// Labels that differ from the previous call. The first call reports every display.
    pub fn take_changes(&mut self) -> Vec<PanelChange> {
        let current = self.snapshot();
        let changes = current
            .iter()
            .enumerate()
            .filter(|(index, label)| {
                self.published
                    .as_ref()
                    .and_then(|previous| previous.get(*index))
                    != Some(*label)
            })
            .map(|(index, label)| PanelChange {
                display: self.display_name(index),
                label: label.clone(),
            })
            .collect();
        self.published = Some(current);
        changes
    }

    pub fn log_changes(&mut self) {
        for change in self.take_changes() {
            let label = &change.label;
            info!(
                display = %change.display,
                text = %label.text.replace('\n', " | "),
                background = ?label.background,
                leds = %describe_leds(label.switch_color.as_ref()),
                brightness = label.brightness.unwrap_or_default(),
                "panel updated"
            );
        }
    }
}

fn describe_leds(color: Option<&SwitchColor>) -> String {
    match color {
        None => "-".into(),
        Some(SwitchColor::Single(color)) => format!("{},{},{}", color.r, color.g, color.b),
        Some(SwitchColor::Segments(colors)) => colors
            .iter()
            .map(|c| format!("{},{},{}", c.r, c.g, c.b))
            .collect::<Vec<_>>()
            .join(" / "),
    }
}

impl FeedbackSurface for Panel {
    fn switch_target(&mut self, switch: usize) -> &mut dyn FeedbackTarget {
        match self.switches.get_mut(switch) {
            Some(label) => label,
            None => &mut self.overflow,
        }
    }

    fn status_target(&mut self) -> &mut dyn FeedbackTarget {
        &mut self.status
    }

    fn main_target(&mut self) -> &mut dyn FeedbackTarget {
        &mut self.main
    }
}
