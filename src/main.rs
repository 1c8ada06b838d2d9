use analogsyncrs::{
    boot,
    cli::{validate_device, Args},
    clock::SystemClock,
    config::SyncConfig,
    event_loop::{EventLoop, PollThrottle},
    handle_device_list,
    logging::{self, LogTarget},
    midi::MidirSource,
    pins::SimulatedPins,
    TranslationEngine,
};
use clap::Parser;
use std::time::Duration;

fn main() {
    let args = parse_command_line_arguments();
    initialize_logging(&args);
    let devices = get_available_devices();

    if args.device_list {
        list_available_devices(&devices);
        return;
    }

    let config = load_configuration(&args);

    let device_name = match &config.device {
        Some(name) => name.clone(),
        None => exit_with_error(
            "No MIDI input selected, use --bind-to-device or ANALOGSYNC_DEVICE".to_string(),
        ),
    };
    if let Err(error_msg) = validate_device(&device_name, &devices) {
        exit_with_error(error_msg);
    }

    let source = connect_midi_source(&device_name, &config);

    let mut pins = SimulatedPins::without_history();
    let options = boot::sample_options(&mut pins, &config);
    let engine = match TranslationEngine::from_config(&config, options, pins) {
        Ok(engine) => engine,
        Err(e) => exit_with_error(format!("Error building sync outputs: {}", e)),
    };

    run_application_loop(engine, source, &config);
}

fn parse_command_line_arguments() -> Args {
    Args::parse()
}

fn initialize_logging(args: &Args) {
    let target = if args.log_stderr {
        LogTarget::Stderr
    } else {
        LogTarget::File
    };
    if let Err(e) = logging::init_logger(target) {
        eprintln!("Logger initialization failed: {}", e);
    }
    log::info!(
        "Application starting at {}",
        chrono::Local::now().to_rfc3339()
    );
}

fn get_available_devices() -> Vec<String> {
    handle_device_list()
}

fn list_available_devices(devices: &[String]) {
    println!("Available MIDI devices:");
    for device in devices {
        println!("  - {}", device);
    }
}

fn load_configuration(args: &Args) -> SyncConfig {
    let mut config = match SyncConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with_error(format!("Error loading configuration: {}", e)),
    };
    config.apply_args(args);
    if let Err(e) = config.validate() {
        exit_with_error(e.to_string());
    }
    config
}

fn connect_midi_source(device_name: &str, config: &SyncConfig) -> MidirSource {
    let timeout = Duration::from_millis(u64::from(config.decode_timeout_ms));
    match MidirSource::connect(device_name, timeout) {
        Ok(source) => {
            log::info!("Successfully connected to MIDI device: {}", source.port_name());
            println!("Successfully connected to MIDI device: {}", source.port_name());
            source
        }
        Err(e) => exit_with_error(format!("Error connecting to MIDI device: {}", e)),
    }
}

fn run_application_loop(
    engine: TranslationEngine<SimulatedPins>,
    source: MidirSource,
    config: &SyncConfig,
) -> ! {
    let throttle = PollThrottle::new(config.pulse_check_period_ms);
    let mut event_loop = EventLoop::new(engine, source, SystemClock::new(), throttle);
    println!("\nPress Ctrl+C to exit...");
    event_loop.run()
}

fn exit_with_error(error_msg: String) -> ! {
    log::error!("{}", error_msg);
    eprintln!("{}", error_msg);
    std::process::exit(1);
}
