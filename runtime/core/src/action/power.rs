use std::time::{Duration, Instant};

use tracing::debug;

use super::Action;
use crate::probe::{PowerProbes, ProbeProvider};
use crate::state::StateStore;

/// Samples power probes on its own cadence and publishes the summary text.
pub struct PowerSense {
    probes: PowerProbes,
    poll_interval: Duration,
    next_poll: Option<Instant>,
    last_text: Option<String>,
}

impl PowerSense {
    pub fn open(poll_ms: u64, provider: &mut dyn ProbeProvider) -> Self {
        Self::new(PowerProbes::open(provider), Duration::from_millis(poll_ms))
    }

    pub fn new(probes: PowerProbes, poll_interval: Duration) -> Self {
        Self {
            probes,
            poll_interval,
            next_poll: None,
            last_text: None,
        }
    }
}

impl Action for PowerSense {
    fn update(&mut self, state: &mut StateStore, now: Instant) -> bool {
        if self.next_poll.is_some_and(|next| now < next) {
            return false;
        }
        self.next_poll = Some(now + self.poll_interval);

        let reading = self.probes.read();
        let text = reading.summary();
        if self.last_text.as_deref() == Some(text.as_str()) {
            return false;
        }
        debug!(summary = %text, "power reading changed");
        state.power_source = reading.source;
        state.power_summary = text.clone();
        self.last_text = Some(text);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{AnalogProbe, DigitalProbe, NoProbes, ProbeError, ProbeRole};
    use binding_format::PowerSource;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct SharedPin(Arc<AtomicBool>);

    impl DigitalProbe for SharedPin {
        fn read(&mut self) -> Option<bool> {
            Some(self.0.load(Ordering::SeqCst))
        }
    }

    struct BatteryOnly(Arc<AtomicBool>);

    impl ProbeProvider for BatteryOnly {
        fn open_digital(&mut self, role: ProbeRole) -> Result<Box<dyn DigitalProbe>, ProbeError> {
            match role {
                ProbeRole::Battery => Ok(Box::new(SharedPin(self.0.clone()))),
                other => Err(ProbeError::NotConfigured(other)),
            }
        }

        fn open_analog(&mut self, role: ProbeRole) -> Result<Box<dyn AnalogProbe>, ProbeError> {
            Err(ProbeError::NotConfigured(role))
        }
    }

    #[test]
    fn first_sample_is_immediate_then_rate_limited() {
        let pin = Arc::new(AtomicBool::new(true));
        let mut action = PowerSense::open(5000, &mut BatteryOnly(pin.clone()));
        let mut state = StateStore::new();
        let base = Instant::now();

        assert!(action.update(&mut state, base));
        assert_eq!(state.power_source, PowerSource::Battery);
        assert_eq!(state.power_summary, "BAT > ?V > ?V");

        pin.store(false, Ordering::SeqCst);
        assert!(!action.update(&mut state, base + Duration::from_millis(4999)));
        assert_eq!(state.power_source, PowerSource::Battery);

        assert!(action.update(&mut state, base + Duration::from_millis(5000)));
        assert_eq!(state.power_source, PowerSource::UsbOrDc);
        assert_eq!(state.power_summary, "USB/DC > ?V > ?V");
    }

    #[test]
    fn unchanged_text_does_not_mutate() {
        let mut action = PowerSense::open(10, &mut NoProbes);
        let mut state = StateStore::new();
        let base = Instant::now();
        assert!(action.update(&mut state, base));
        assert_eq!(state.power_summary, "? > ?V > ?V");
        assert!(!action.update(&mut state, base + Duration::from_millis(20)));
    }
}
