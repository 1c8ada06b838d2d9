use analogsyncrs::boot;
use analogsyncrs::config::SyncConfig;
use analogsyncrs::pins::{Level, PinId, PinMode, SimulatedPins};
use analogsyncrs::{Args, SyncError};
use clap::Parser;
use std::fs;

#[test]
fn test_defaults_are_valid() {
    let config = SyncConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.pulse_check_period_ms, 5);
    assert_eq!(config.vtrig.divisor, 2);
    assert_eq!(config.strig.divisor, 1);
    assert!(!config.ignore_stop);
    assert!(config.ignore_system_reset);
}

#[test]
fn test_load_without_file_matches_defaults() {
    let config = SyncConfig::load(None).expect("defaults load");
    assert_eq!(config, SyncConfig::default());
}

#[test]
fn test_load_from_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sync.toml");
    fs::write(
        &path,
        r#"
device = "Pocket"
ignore_stop = true
pulse_check_period_ms = 4
ignore_stop_pin = 7

[indicator]
idle_period_ms = 0

[vtrig]
hold_ms = 20

[strig]
enabled = false
"#,
    )
    .unwrap();

    let config = SyncConfig::load(Some(path.as_path())).expect("file loads");
    assert_eq!(config.device.as_deref(), Some("Pocket"));
    assert!(config.ignore_stop);
    assert_eq!(config.pulse_check_period_ms, 4);
    assert_eq!(config.ignore_stop_pin, Some(7));
    assert_eq!(config.ignore_reset_pin, None);
    assert_eq!(config.vtrig.hold_ms, 20);
    assert_eq!(config.vtrig.pin, 0);
    assert!(!config.strig.enabled);
    assert_eq!(config.indicator.idle_period_ms, 0);
    assert_eq!(config.indicator.accent_hold_ms, 60);
    assert!(config.validate().is_ok());
    assert_eq!(config.sync_drivers().expect("valid outputs").len(), 1);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = SyncConfig::load(Some(dir.path().join("absent.toml").as_path()));
    assert!(matches!(result, Err(SyncError::Config(_))));
}

#[test]
fn test_out_of_range_pin_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sync.toml");
    fs::write(&path, "[vtrig]\npin = 300\n").unwrap();
    let result = SyncConfig::load(Some(path.as_path()));
    assert!(matches!(result, Err(SyncError::InvalidConfig(_))));
}

#[test]
fn test_invalid_divisor_rejected() {
    let mut config = SyncConfig::default();
    config.vtrig.divisor = 5;
    assert!(matches!(
        config.validate(),
        Err(SyncError::InvalidConfig(_))
    ));
}

#[test]
fn test_zero_accent_hold_rejected() {
    let mut config = SyncConfig::default();
    config.indicator.accent_hold_ms = 0;
    assert!(config.validate().is_err());

    config.indicator.enabled = false;
    assert!(config.validate().is_ok());
}

#[test]
fn test_check_period_must_be_below_shortest_hold() {
    let mut config = SyncConfig::default();
    config.pulse_check_period_ms = 15;
    assert!(config.validate().is_err());

    config.pulse_check_period_ms = 14;
    assert!(config.validate().is_ok());

    config.strig.hold_ms = 10;
    assert!(config.validate().is_err());

    config.pulse_check_period_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_hold_rejected() {
    let mut config = SyncConfig::default();
    config.strig.hold_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_duplicate_pins_rejected() {
    let mut config = SyncConfig::default();
    config.strig.pin = config.vtrig.pin;
    assert!(config.validate().is_err());

    let mut config = SyncConfig::default();
    config.ignore_reset_pin = Some(config.indicator.pin);
    assert!(config.validate().is_err());
}

#[test]
fn test_some_sync_output_required() {
    let mut config = SyncConfig::default();
    config.vtrig.enabled = false;
    config.strig.enabled = false;
    assert!(config.validate().is_err());
}

#[test]
fn test_cli_flags_override_config() {
    let args = Args::parse_from([
        "test",
        "--bind-to-device",
        "Mock Device 2",
        "--ignore-stop",
        "--honour-system-reset",
        "--pulse-check-ms",
        "3",
    ]);
    let mut config = SyncConfig::default();
    config.apply_args(&args);

    assert_eq!(config.device.as_deref(), Some("Mock Device 2"));
    assert!(config.ignore_stop);
    assert!(!config.ignore_system_reset);
    assert_eq!(config.pulse_check_period_ms, 3);
}

#[test]
fn test_no_flags_keep_config() {
    let args = Args::parse_from(["test"]);
    let mut config = SyncConfig::default();
    config.ignore_stop = true;
    config.apply_args(&args);
    assert!(config.ignore_stop);
    assert!(config.ignore_system_reset);
    assert_eq!(config.device, None);
}

#[test]
fn test_strap_low_enables_ignore_flag() {
    let mut config = SyncConfig::default();
    config.ignore_stop_pin = Some(4);
    config.ignore_reset_pin = Some(5);
    config.ignore_system_reset = false;

    let mut pins = SimulatedPins::new()
        .with_strap(PinId(4), Level::Low)
        .with_strap(PinId(5), Level::High);
    let options = boot::sample_options(&mut pins, &config);

    assert!(options.ignore_stop);
    assert!(!options.ignore_system_reset);
    assert_eq!(pins.mode(PinId(4)), Some(PinMode::InputPullUp));
    assert_eq!(pins.mode(PinId(5)), Some(PinMode::InputPullUp));
}

#[test]
fn test_open_strap_keeps_configured_flag() {
    let mut config = SyncConfig::default();
    config.ignore_stop = true;
    config.ignore_stop_pin = Some(4);
    config.ignore_reset_pin = Some(5);

    let mut pins = SimulatedPins::new();
    let options = boot::sample_options(&mut pins, &config);
    assert!(options.ignore_stop);
    assert!(options.ignore_system_reset);
}

#[test]
fn test_open_strap_does_not_override_cli_flag() {
    let args = Args::parse_from(["test", "--ignore-stop"]);
    let mut config = SyncConfig::default();
    config.ignore_stop_pin = Some(4);
    config.apply_args(&args);

    let mut pins = SimulatedPins::new();
    let options = boot::sample_options(&mut pins, &config);
    assert!(options.ignore_stop);
}

#[test]
fn test_open_strap_leaves_default_flags() {
    let mut config = SyncConfig::default();
    config.ignore_stop_pin = Some(4);

    let mut pins = SimulatedPins::new();
    let options = boot::sample_options(&mut pins, &config);
    assert!(!options.ignore_stop);
}

#[test]
fn test_without_strap_pins_config_wins() {
    let mut config = SyncConfig::default();
    config.ignore_stop = true;
    let mut pins = SimulatedPins::new();
    let options = boot::sample_options(&mut pins, &config);
    assert!(options.ignore_stop);
    assert!(options.ignore_system_reset);
    assert!(pins.writes().is_empty());
}
