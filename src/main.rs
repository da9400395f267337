//! Guardian Keyboard CLI
//!
//! On-device lexical risk monitor for keyboard input.

use clap::{Parser, Subcommand};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use guardian_keyboard::{
    alert::{AlertDelivery, ChannelAlertSink, ChannelSurface, GateRequest, BLOCKING_MESSAGE},
    config::Config,
    core::{explain, Lexicon},
    input::{KeyMode, SourceConfig, TextSource},
    monitor::Monitor,
    transparency::create_shared_log_with_persistence,
    PRIVACY_DECLARATION, VERSION,
};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "guardian")]
#[command(author = "Guardian")]
#[command(version = VERSION)]
#[command(about = "On-device lexical risk monitor for keyboard input", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by GUARDIAN_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor typed text from stdin or a file
    Monitor {
        /// Read input from this file instead of stdin
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Lexicon file (defaults to the configured or bundled lexicon)
        #[arg(long)]
        lexicon: Option<PathBuf>,

        /// Treat each line as a bulk commit instead of individual keys
        #[arg(long)]
        commit: bool,
    },

    /// Dismiss the blocking warning and reset the running score
    Dismiss {
        /// Unlock PIN, if one is configured
        #[arg(long)]
        pin: Option<String>,
    },

    /// Score a single word against the lexicon
    Score {
        word: String,

        /// Lexicon file (defaults to the configured or bundled lexicon)
        #[arg(long)]
        lexicon: Option<PathBuf>,
    },

    /// Update and save configuration
    Configure {
        /// Alert threshold (at least 1)
        #[arg(long, allow_negative_numbers = true)]
        threshold: Option<i64>,

        /// Alert destination; pass an empty string to clear
        #[arg(long)]
        guardian: Option<String>,

        /// Unlock PIN; pass an empty string to clear
        #[arg(long)]
        pin: Option<String>,
    },

    /// Show current status and activity counts
    Status,

    /// Display privacy declaration
    Privacy,

    /// Show configuration
    Config,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Monitor {
            input,
            lexicon,
            commit,
        } => {
            cmd_monitor(input, lexicon, commit);
        }
        Commands::Dismiss { pin } => {
            cmd_dismiss(pin);
        }
        Commands::Score { word, lexicon } => {
            cmd_score(&word, lexicon);
        }
        Commands::Configure {
            threshold,
            guardian,
            pin,
        } => {
            cmd_configure(threshold, guardian, pin);
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::Privacy => {
            cmd_privacy();
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("GUARDIAN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration, falling back to defaults so monitoring stays live.
fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: Could not load configuration ({e}), using defaults");
        Config::default()
    })
}

fn load_lexicon(override_path: Option<PathBuf>, config: &Config) -> Lexicon {
    let path = override_path.or_else(|| config.lexicon_path.clone());
    Lexicon::load_path(path.as_deref())
}

fn cmd_monitor(input: Option<PathBuf>, lexicon_path: Option<PathBuf>, commit: bool) {
    println!("Guardian Keyboard v{VERSION}");
    println!();

    let config = load_config();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    let lexicon = load_lexicon(lexicon_path, &config);
    if lexicon.is_empty() {
        eprintln!("Warning: Lexicon is empty; no word will be scored");
    }

    println!("Starting monitor...");
    println!("  Threshold: {}", config.threshold);
    println!(
        "  Alert destination: {}",
        config.alert_destination.as_deref().unwrap_or("not configured")
    );
    println!(
        "  Unlock PIN: {}",
        if config.unlock_secret.is_some() {
            "set"
        } else {
            "not set"
        }
    );
    println!("  Lexicon categories: {}", lexicon.categories().join(", "));
    println!(
        "  Input: {}",
        input
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdin".to_string())
    );
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let reader: Box<dyn BufRead + Send> = match &input {
        Some(path) => match std::fs::File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                eprintln!("Error opening {path:?}: {e}");
                std::process::exit(1);
            }
        },
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    let transparency_log = create_shared_log_with_persistence(config.transparency_path());
    let (alert_tx, alert_rx) = bounded::<AlertDelivery>(64);
    let (gate_tx, gate_rx) = bounded::<GateRequest>(16);

    let mut monitor = Monitor::new(config.clone(), lexicon)
        .with_reset_signal(Arc::new(config.reset_flag()))
        .with_alert_sink(ChannelAlertSink::new(alert_tx))
        .with_surface(ChannelSurface::new(gate_tx))
        .with_transparency_log(transparency_log.clone());
    monitor.start_session();

    let mut source = TextSource::new(SourceConfig {
        mode: if commit {
            KeyMode::Commit
        } else {
            KeyMode::Keys
        },
        ..SourceConfig::default()
    });
    if let Err(e) = source.start(reader) {
        eprintln!("Error starting input source: {e}");
        std::process::exit(1);
    }

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    let receiver = source.receiver().clone();
    let mut last_config_check = Instant::now();

    while running.load(Ordering::SeqCst) {
        // Periodically reload config so `guardian configure` can adjust a running monitor.
        if last_config_check.elapsed() >= Duration::from_secs(1) {
            if let Ok(cfg) = Config::load() {
                if &cfg != monitor.config() {
                    println!("[Config] Reloaded (threshold: {})", cfg.threshold);
                    monitor.reload_config(cfg);
                }
            }
            last_config_check = Instant::now();
        }

        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                monitor.handle(&event);
                if event.is_end_of_session() {
                    println!("[Session] Input ended");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if monitor.poll_reset() {
                    println!("[Session] Warning dismissed, score reset");
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }

        report_alerts(&alert_rx, &gate_rx);
    }

    source.stop();
    // Apply what was already read before shutting down.
    while let Some(event) = source.try_recv() {
        monitor.handle(&event);
    }
    report_alerts(&alert_rx, &gate_rx);

    if let Err(e) = transparency_log.save() {
        eprintln!("Warning: Could not save transparency log: {e}");
    }

    println!();
    println!("Final score: {} / {}", monitor.score(), monitor.session().threshold());
    println!();
    println!("{}", transparency_log.summary());
}

/// Print alerts and gate requests the monitor produced.
///
/// Delivery to the guardian is the job of the host's dispatcher; this CLI
/// only reports what would be sent.
fn report_alerts(alerts: &Receiver<AlertDelivery>, gates: &Receiver<GateRequest>) {
    for delivery in alerts.try_iter() {
        println!(
            "[Alert] {} -> {}: {}",
            delivery.alert.timestamp.format("%H:%M:%S"),
            delivery.destination,
            delivery.alert.message()
        );
    }

    for request in gates.try_iter() {
        println!();
        println!("!! {BLOCKING_MESSAGE} (score: {})", request.alert.score);
        if request.gate.auto_dismisses() {
            println!("!! Run `guardian dismiss` to continue.");
        } else {
            println!("!! Run `guardian dismiss --pin <PIN>` to continue.");
        }
        println!();
    }
}

fn cmd_dismiss(pin: Option<String>) {
    let config = load_config();
    let gate = config.unlock_gate();
    let flag = config.reset_flag();

    match gate.try_dismiss(pin.as_deref().unwrap_or(""), &flag) {
        Ok(true) => println!("Warning dismissed. The running score will reset."),
        Ok(false) => {
            eprintln!("Incorrect PIN");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_score(word: &str, lexicon_path: Option<PathBuf>) {
    let config = load_config();
    let lexicon = load_lexicon(lexicon_path, &config);
    let breakdown = explain(word, &lexicon);

    println!("Word: {word}");
    println!("Score: {}", breakdown.total);
    if breakdown.matched.is_empty() {
        println!("No category matched.");
        return;
    }
    println!();
    println!("Matched categories:");
    for m in &breakdown.matched {
        println!("  {:<16} +{:<4} (term: {})", m.category, m.weight, m.term);
    }
}

fn cmd_configure(threshold: Option<i64>, guardian: Option<String>, pin: Option<String>) {
    let mut config = load_config();

    if let Some(threshold) = threshold {
        config.threshold = match u32::try_from(threshold) {
            Ok(t) if t >= 1 => t,
            _ => {
                eprintln!("Error: Threshold must be at least 1");
                std::process::exit(1);
            }
        };
    }
    if let Some(guardian) = guardian {
        let guardian = guardian.trim().to_string();
        config.alert_destination = (!guardian.is_empty()).then_some(guardian);
    }
    if let Some(pin) = pin {
        config.unlock_secret = (!pin.is_empty()).then_some(pin);
    }

    if let Err(e) = config.save() {
        eprintln!("Error saving config: {e}");
        std::process::exit(1);
    }
    println!(
        "Configuration saved. Guardian: {}, Threshold: {}",
        config.alert_destination.as_deref().unwrap_or("none"),
        config.threshold
    );
}

fn cmd_status() {
    let config = load_config();

    println!("Guardian Keyboard Status");
    println!("========================");
    println!();

    println!("Configuration:");
    println!("  Threshold: {}", config.threshold);
    println!(
        "  Alert destination: {}",
        config.alert_destination.as_deref().unwrap_or("not configured")
    );
    println!(
        "  Unlock PIN: {}",
        if config.unlock_secret.is_some() {
            "set"
        } else {
            "not set"
        }
    );
    println!(
        "  Lexicon: {}",
        config
            .lexicon_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "bundled".to_string())
    );
    println!(
        "  Reset pending: {}",
        if config.reset_flag().is_pending() {
            "yes"
        } else {
            "no"
        }
    );
    println!();

    print_cumulative_stats(&config.transparency_path());
}

fn print_cumulative_stats(stats_path: &Path) {
    if !stats_path.exists() {
        println!("No previous session data found.");
        return;
    }

    if let Ok(content) = std::fs::read_to_string(stats_path) {
        if let Ok(stats) = serde_json::from_str::<serde_json::Value>(&content) {
            println!("Cumulative Statistics:");
            for (key, label) in [
                ("events_processed", "Input events"),
                ("words_completed", "Words scored"),
                ("words_flagged", "Words flagged"),
                ("alerts_raised", "Alerts raised"),
                ("dispatch_failures", "Dispatch failures"),
                ("resets_consumed", "Resets applied"),
            ] {
                if let Some(value) = stats.get(key) {
                    println!("  {label}: {value}");
                }
            }
        }
    }
}

fn cmd_privacy() {
    println!("{PRIVACY_DECLARATION}");
}

fn cmd_config() {
    let mut config = load_config();
    if config.unlock_secret.is_some() {
        config.unlock_secret = Some("****".to_string());
    }

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
