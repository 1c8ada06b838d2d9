// config.rs

use crate::cli::Args;
use crate::divider::{valid_divisor, PPQN};
use crate::engine::Indicator;
use crate::error::{Result, SyncError};
use crate::pins::PinId;
use crate::pulse::{Polarity, SyncOutputDriver};
use crate::transport::TransportOptions;
use ::config::{Config, ConfigError, Environment, File};
use log::{debug, info};
use std::path::Path;

/// Environment variable prefix, e.g. `ANALOGSYNC_VTRIG__HOLD_MS=20`.
pub const ENV_PREFIX: &str = "ANALOGSYNC";

pub const DEFAULT_PULSE_CHECK_PERIOD_MS: u32 = 5;
pub const DEFAULT_DECODE_TIMEOUT_MS: u32 = 1;
pub const DEFAULT_HOLD_MS: u32 = 15;
pub const DEFAULT_DIAGNOSTIC_HOLD_MS: u32 = 250;
pub const DEFAULT_ACCENT_HOLD_MS: u32 = 60;
pub const DEFAULT_IDLE_PERIOD_MS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub enabled: bool,
    pub pin: u8,
    pub hold_ms: u32,
    pub divisor: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorConfig {
    pub enabled: bool,
    pub pin: u8,
    pub hold_ms: u32,
    pub divisor: u32,
    pub diagnostic_hold_ms: u32,
    /// Blink length on the downbeat
    pub accent_hold_ms: u32,
    /// Slow blink period while stopped, 0 turns it off
    pub idle_period_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// MIDI input port name (substring match)
    pub device: Option<String>,
    pub ignore_stop: bool,
    pub ignore_system_reset: bool,
    /// Strap pin sampled at boot; pulled low means ignore Stop
    pub ignore_stop_pin: Option<u8>,
    /// Strap pin sampled at boot; pulled low means ignore System Reset
    pub ignore_reset_pin: Option<u8>,
    pub pulse_check_period_ms: u32,
    pub decode_timeout_ms: u32,
    pub vtrig: OutputConfig,
    pub strig: OutputConfig,
    pub indicator: IndicatorConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            device: None,
            ignore_stop: false,
            ignore_system_reset: true,
            ignore_stop_pin: None,
            ignore_reset_pin: None,
            pulse_check_period_ms: DEFAULT_PULSE_CHECK_PERIOD_MS,
            decode_timeout_ms: DEFAULT_DECODE_TIMEOUT_MS,
            vtrig: OutputConfig {
                enabled: true,
                pin: 0,
                hold_ms: DEFAULT_HOLD_MS,
                divisor: 2,
            },
            strig: OutputConfig {
                enabled: true,
                pin: 2,
                hold_ms: DEFAULT_HOLD_MS,
                divisor: 1,
            },
            indicator: IndicatorConfig {
                enabled: true,
                pin: 13,
                hold_ms: DEFAULT_HOLD_MS,
                divisor: 2,
                diagnostic_hold_ms: DEFAULT_DIAGNOSTIC_HOLD_MS,
                accent_hold_ms: DEFAULT_ACCENT_HOLD_MS,
                idle_period_ms: DEFAULT_IDLE_PERIOD_MS,
            },
        }
    }
}

impl SyncConfig {
    /// Layers defaults, an optional file and `ANALOGSYNC_*` environment
    /// variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = SyncConfig::default();
        let mut builder = Config::builder()
            .set_default("ignore_stop", defaults.ignore_stop)?
            .set_default("ignore_system_reset", defaults.ignore_system_reset)?
            .set_default(
                "pulse_check_period_ms",
                i64::from(defaults.pulse_check_period_ms),
            )?
            .set_default("decode_timeout_ms", i64::from(defaults.decode_timeout_ms))?;
        builder = set_output_defaults(builder, "vtrig", &defaults.vtrig)?;
        builder = set_output_defaults(builder, "strig", &defaults.strig)?;
        builder = builder
            .set_default("indicator.enabled", defaults.indicator.enabled)?
            .set_default("indicator.pin", i64::from(defaults.indicator.pin))?
            .set_default("indicator.hold_ms", i64::from(defaults.indicator.hold_ms))?
            .set_default("indicator.divisor", i64::from(defaults.indicator.divisor))?
            .set_default(
                "indicator.diagnostic_hold_ms",
                i64::from(defaults.indicator.diagnostic_hold_ms),
            )?
            .set_default(
                "indicator.accent_hold_ms",
                i64::from(defaults.indicator.accent_hold_ms),
            )?
            .set_default(
                "indicator.idle_period_ms",
                i64::from(defaults.indicator.idle_period_ms),
            )?;

        if let Some(path) = path {
            info!("Loading config file {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Self::from_settings(&settings)
    }

    /// Reads a fully layered settings tree.
    pub fn from_settings(settings: &Config) -> Result<Self> {
        let config = SyncConfig {
            device: optional(settings.get_string("device"))?,
            ignore_stop: settings.get_bool("ignore_stop")?,
            ignore_system_reset: settings.get_bool("ignore_system_reset")?,
            ignore_stop_pin: optional(settings.get_int("ignore_stop_pin"))?
                .map(|v| narrow("ignore_stop_pin", v))
                .transpose()?,
            ignore_reset_pin: optional(settings.get_int("ignore_reset_pin"))?
                .map(|v| narrow("ignore_reset_pin", v))
                .transpose()?,
            pulse_check_period_ms: get_u32(settings, "pulse_check_period_ms")?,
            decode_timeout_ms: get_u32(settings, "decode_timeout_ms")?,
            vtrig: read_output(settings, "vtrig")?,
            strig: read_output(settings, "strig")?,
            indicator: IndicatorConfig {
                enabled: settings.get_bool("indicator.enabled")?,
                pin: get_u8(settings, "indicator.pin")?,
                hold_ms: get_u32(settings, "indicator.hold_ms")?,
                divisor: get_u32(settings, "indicator.divisor")?,
                diagnostic_hold_ms: get_u32(settings, "indicator.diagnostic_hold_ms")?,
                accent_hold_ms: get_u32(settings, "indicator.accent_hold_ms")?,
                idle_period_ms: get_u32(settings, "indicator.idle_period_ms")?,
            },
        };
        debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    /// Command line flags win over every other source.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(device) = &args.bind_to_device {
            self.device = Some(device.clone());
        }
        if args.ignore_stop {
            info!("Stop handling disabled via --ignore-stop");
            self.ignore_stop = true;
        }
        if args.honour_system_reset {
            info!("System reset handling enabled via --honour-system-reset");
            self.ignore_system_reset = false;
        }
        if let Some(period) = args.pulse_check_ms {
            self.pulse_check_period_ms = period;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut outputs: Vec<(&str, u8, u32, u32)> = Vec::new();
        if self.vtrig.enabled {
            outputs.push(("vtrig", self.vtrig.pin, self.vtrig.hold_ms, self.vtrig.divisor));
        }
        if self.strig.enabled {
            outputs.push(("strig", self.strig.pin, self.strig.hold_ms, self.strig.divisor));
        }
        if outputs.is_empty() {
            return Err(invalid("at least one of vtrig/strig must be enabled"));
        }
        if self.indicator.enabled {
            outputs.push((
                "indicator",
                self.indicator.pin,
                self.indicator.hold_ms,
                self.indicator.divisor,
            ));
            if self.indicator.diagnostic_hold_ms == 0 {
                return Err(invalid("indicator.diagnostic_hold_ms must be positive"));
            }
            if self.indicator.accent_hold_ms == 0 {
                return Err(invalid("indicator.accent_hold_ms must be positive"));
            }
        }

        for (name, _, hold_ms, divisor) in &outputs {
            if !valid_divisor(*divisor) {
                return Err(invalid(&format!(
                    "{}.divisor {} does not divide {} PPQN",
                    name, divisor, PPQN
                )));
            }
            if *hold_ms == 0 {
                return Err(invalid(&format!("{}.hold_ms must be positive", name)));
            }
        }

        let min_hold = outputs.iter().map(|o| o.2).min().unwrap_or(u32::MAX);
        if self.pulse_check_period_ms == 0 || self.pulse_check_period_ms >= min_hold {
            return Err(invalid(&format!(
                "pulse_check_period_ms {} must be between 1 and the shortest hold ({} ms)",
                self.pulse_check_period_ms, min_hold
            )));
        }

        let mut pins: Vec<(&str, u8)> = outputs.iter().map(|o| (o.0, o.1)).collect();
        if let Some(pin) = self.ignore_stop_pin {
            pins.push(("ignore_stop_pin", pin));
        }
        if let Some(pin) = self.ignore_reset_pin {
            pins.push(("ignore_reset_pin", pin));
        }
        for (i, (name, pin)) in pins.iter().enumerate() {
            if let Some((other, _)) = pins[i + 1..].iter().find(|(_, p)| p == pin) {
                return Err(invalid(&format!(
                    "{} and {} both use pin {}",
                    name, other, pin
                )));
            }
        }
        Ok(())
    }

    /// Runtime flags before any boot-time strap sampling.
    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            ignore_stop: self.ignore_stop,
            ignore_system_reset: self.ignore_system_reset,
        }
    }

    /// Enabled sync outputs.
    pub fn sync_drivers(&self) -> Result<Vec<SyncOutputDriver>> {
        let mut drivers = Vec::new();
        if self.vtrig.enabled {
            drivers.push(SyncOutputDriver::new(
                "v-trig",
                PinId(self.vtrig.pin),
                Polarity::VTrig,
                self.vtrig.hold_ms,
                self.vtrig.divisor,
            )?);
        }
        if self.strig.enabled {
            drivers.push(SyncOutputDriver::new(
                "s-trig",
                PinId(self.strig.pin),
                Polarity::STrig,
                self.strig.hold_ms,
                self.strig.divisor,
            )?);
        }
        Ok(drivers)
    }

    pub fn indicator(&self) -> Result<Option<Indicator>> {
        if !self.indicator.enabled {
            return Ok(None);
        }
        let driver = SyncOutputDriver::new(
            "indicator",
            PinId(self.indicator.pin),
            Polarity::VTrig,
            self.indicator.hold_ms,
            self.indicator.divisor,
        )?;
        Ok(Some(
            Indicator::new(driver, self.indicator.diagnostic_hold_ms)
                .with_accent(self.indicator.accent_hold_ms)
                .with_idle_period(self.indicator.idle_period_ms),
        ))
    }
}

type Builder = ::config::builder::ConfigBuilder<::config::builder::DefaultState>;

fn set_output_defaults(builder: Builder, prefix: &str, output: &OutputConfig) -> Result<Builder> {
    Ok(builder
        .set_default(format!("{}.enabled", prefix), output.enabled)?
        .set_default(format!("{}.pin", prefix), i64::from(output.pin))?
        .set_default(format!("{}.hold_ms", prefix), i64::from(output.hold_ms))?
        .set_default(format!("{}.divisor", prefix), i64::from(output.divisor))?)
}

fn read_output(settings: &Config, prefix: &str) -> Result<OutputConfig> {
    Ok(OutputConfig {
        enabled: settings.get_bool(&format!("{}.enabled", prefix))?,
        pin: get_u8(settings, &format!("{}.pin", prefix))?,
        hold_ms: get_u32(settings, &format!("{}.hold_ms", prefix))?,
        divisor: get_u32(settings, &format!("{}.divisor", prefix))?,
    })
}

fn optional<T>(value: std::result::Result<T, ConfigError>) -> Result<Option<T>> {
    match value {
        Ok(v) => Ok(Some(v)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn narrow<T: TryFrom<i64>>(key: &str, value: i64) -> Result<T> {
    T::try_from(value).map_err(|_| invalid(&format!("{} is out of range: {}", key, value)))
}

fn get_u8(settings: &Config, key: &str) -> Result<u8> {
    narrow(key, settings.get_int(key)?)
}

fn get_u32(settings: &Config, key: &str) -> Result<u32> {
    narrow(key, settings.get_int(key)?)
}

fn invalid(msg: &str) -> SyncError {
    SyncError::InvalidConfig(msg.to_string())
}
