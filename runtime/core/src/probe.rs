//! Power-sense probes. A probe that cannot be opened stays absent for the session.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use binding_format::{PowerSource, ProbeSettings};
use thiserror::Error;
use tracing::{debug, warn};

/// ADC reference voltage.
pub const ADC_REFERENCE_VOLTS: f32 = 3.3;
/// Ratio of the supply divider feeding the voltage probe.
pub const SUPPLY_DIVIDER: f32 = 3.0;

pub trait DigitalProbe: Send {
    /// `None` when the sample could not be taken.
    fn read(&mut self) -> Option<bool>;
}

pub trait AnalogProbe: Send {
    /// Raw 16-bit reading.
    fn read_raw(&mut self) -> Option<u16>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeRole {
    Battery,
    Dc,
    Voltage,
}

impl fmt::Display for ProbeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeRole::Battery => "battery",
            ProbeRole::Dc => "dc",
            ProbeRole::Voltage => "voltage",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("`{0}` probe is not configured")]
    NotConfigured(ProbeRole),
    #[error("`{role}` probe at {path:?} is unreadable: {source}")]
    Io {
        role: ProbeRole,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait ProbeProvider {
    fn open_digital(&mut self, role: ProbeRole) -> Result<Box<dyn DigitalProbe>, ProbeError>;
    fn open_analog(&mut self, role: ProbeRole) -> Result<Box<dyn AnalogProbe>, ProbeError>;
}

/// Provider with no probes attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProbes;

impl ProbeProvider for NoProbes {
    fn open_digital(&mut self, role: ProbeRole) -> Result<Box<dyn DigitalProbe>, ProbeError> {
        Err(ProbeError::NotConfigured(role))
    }

    fn open_analog(&mut self, role: ProbeRole) -> Result<Box<dyn AnalogProbe>, ProbeError> {
        Err(ProbeError::NotConfigured(role))
    }
}

/// Reads probe values from sysfs-style text files.
#[derive(Debug, Clone, Default)]
pub struct FileProbes {
    settings: ProbeSettings,
}

impl FileProbes {
    pub fn new(settings: ProbeSettings) -> Self {
        Self { settings }
    }

    fn path_for(&self, role: ProbeRole) -> Result<PathBuf, ProbeError> {
        let path = match role {
            ProbeRole::Battery => self.settings.battery.as_ref(),
            ProbeRole::Dc => self.settings.dc.as_ref(),
            ProbeRole::Voltage => self.settings.voltage.as_ref(),
        };
        let path = PathBuf::from(path.ok_or(ProbeError::NotConfigured(role))?);
        fs::metadata(&path).map_err(|source| ProbeError::Io {
            role,
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

impl ProbeProvider for FileProbes {
    fn open_digital(&mut self, role: ProbeRole) -> Result<Box<dyn DigitalProbe>, ProbeError> {
        Ok(Box::new(FileDigitalProbe {
            path: self.path_for(role)?,
        }))
    }

    fn open_analog(&mut self, role: ProbeRole) -> Result<Box<dyn AnalogProbe>, ProbeError> {
        Ok(Box::new(FileAnalogProbe {
            path: self.path_for(role)?,
        }))
    }
}

#[derive(Debug)]
struct FileDigitalProbe {
    path: PathBuf,
}

impl DigitalProbe for FileDigitalProbe {
    fn read(&mut self) -> Option<bool> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match raw.trim() {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct FileAnalogProbe {
    path: PathBuf,
}

impl AnalogProbe for FileAnalogProbe {
    fn read_raw(&mut self) -> Option<u16> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let value: u32 = raw.trim().parse().ok()?;
        Some(value.min(u32::from(u16::MAX)) as u16)
    }
}

/// One power sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerReading {
    pub source: PowerSource,
    pub volts: Option<f32>,
}

impl PowerReading {
    /// `"{source} > {v}V > {sys}V"`, with `?` for a missing voltage probe.
    pub fn summary(&self) -> String {
        let source = self.source.label();
        match self.volts {
            Some(volts) => format!(
                "{source} > {volts:.2}V > {:.2}V",
                volts * SUPPLY_DIVIDER
            ),
            None => format!("{source} > ?V > ?V"),
        }
    }
}

/// Battery and DC pins take priority in that order.
pub fn classify_source(battery: Option<bool>, dc: Option<bool>) -> PowerSource {
    match (battery, dc) {
        (Some(true), _) => PowerSource::Battery,
        (_, Some(true)) => PowerSource::Dc,
        (None, None) => PowerSource::Unknown,
        _ => PowerSource::UsbOrDc,
    }
}

pub fn raw_to_volts(raw: u16) -> f32 {
    f32::from(raw) * ADC_REFERENCE_VOLTS / f32::from(u16::MAX)
}

#[derive(Default)]
pub struct PowerProbes {
    battery: Option<Box<dyn DigitalProbe>>,
    dc: Option<Box<dyn DigitalProbe>>,
    voltage: Option<Box<dyn AnalogProbe>>,
}

impl PowerProbes {
    pub fn open(provider: &mut dyn ProbeProvider) -> Self {
        Self {
            battery: settle(ProbeRole::Battery, provider.open_digital(ProbeRole::Battery)),
            dc: settle(ProbeRole::Dc, provider.open_digital(ProbeRole::Dc)),
            voltage: settle(ProbeRole::Voltage, provider.open_analog(ProbeRole::Voltage)),
        }
    }

    pub fn read(&mut self) -> PowerReading {
        let battery = self.battery.as_mut().and_then(|probe| probe.read());
        let dc = self.dc.as_mut().and_then(|probe| probe.read());
        let volts = self
            .voltage
            .as_mut()
            .and_then(|probe| probe.read_raw())
            .map(raw_to_volts);
        PowerReading {
            source: classify_source(battery, dc),
            volts,
        }
    }
}

fn settle<T>(role: ProbeRole, result: Result<T, ProbeError>) -> Option<T> {
    match result {
        Ok(probe) => Some(probe),
        Err(ProbeError::NotConfigured(_)) => {
            debug!(%role, "power probe not configured");
            None
        }
        Err(err) => {
            warn!(%role, "power probe unavailable: {err}");
            None
        }
    }
}
