use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use sleeprs::config::AppConfig;
use sleeprs::export::{self, ExportFormat};
use sleeprs::logging::init_logging;
use sleeprs::pacing::PacedScheduler;
use sleeprs::schedule::{ScheduleRequest, ScheduleResult, ScheduleSession};
use sleeprs::{
    AgeBand, Chronotype, DeficitAssessment, Direction, ErrorSeverity, SleepCalcError,
    SleepDeficitLevel, TimeOfDay,
};

/// sleeprs - Sleep Cycle Calculator CLI
///
/// Plans bedtimes and wake-up times around 90-minute sleep cycles and lays
/// out the day that follows: deep-work blocks, energy dips and naps.
#[derive(Parser)]
#[command(name = "sleeprs")]
#[command(author = "sleeprs Contributors")]
#[command(version)]
#[command(about = "Sleep cycle calculator", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Chronotype (early, intermediate, late, unknown)
    #[arg(long, global = true)]
    chronotype: Option<Chronotype>,

    /// Age range (teen, adult, older-adult)
    #[arg(short, long, global = true)]
    age_band: Option<AgeBand>,

    /// Output format (table, json, text, csv)
    #[arg(short = 'f', long, global = true)]
    format: Option<ExportFormat>,

    /// Show results immediately
    #[arg(long, global = true)]
    no_delay: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bedtimes for a desired wake-up time
    Bedtimes {
        /// Wake-up time, e.g. "7:00 AM"
        wake: String,

        /// Re-plan the day around candidate N (1-based)
        #[arg(short, long)]
        select: Option<usize>,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Wake-up times for a bedtime (defaults to now)
    WakeTimes {
        /// Bedtime, e.g. "11:00 PM"; omit to go to sleep now
        bedtime: Option<String>,

        /// Re-plan the day around candidate N (1-based)
        #[arg(short, long)]
        select: Option<usize>,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Read times from stdin and recompute as they change
    Watch {
        /// What the typed time means (wake-to-bed, bed-to-wake)
        #[arg(short, long, default_value = "wake-to-bed")]
        direction: Direction,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value, e.g. `profile.chronotype late`
    Set { key: String, value: String },
    /// Print the configuration file path
    Path,
}

/// Settings after merging config file and flags
struct Settings {
    chronotype: Chronotype,
    age_band: AgeBand,
    format: ExportFormat,
    delay: Duration,
}

impl Settings {
    fn resolve(cli: &Cli, config: &AppConfig) -> Self {
        Settings {
            chronotype: cli.chronotype.unwrap_or(config.profile.chronotype),
            age_band: cli.age_band.unwrap_or(config.profile.age_band),
            format: cli.format.unwrap_or(config.display.format),
            delay: if cli.no_delay {
                Duration::ZERO
            } else {
                config.pacing.delay()
            },
        }
    }

    fn request(&self, anchor: Option<TimeOfDay>, direction: Direction) -> ScheduleRequest {
        ScheduleRequest::new(anchor, direction, self.chronotype, self.age_band)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);
    let (config, config_error) = match AppConfig::load_if_present(&config_path) {
        Ok(loaded) => (loaded.unwrap_or_default(), None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_logging(&config.logging.clone().with_verbosity(cli.verbose))
        .context("Failed to initialize logging")?;

    if let Some(e) = config_error {
        warn!(
            path = %config_path.display(),
            error = %format!("{:#}", e),
            "Ignoring unreadable config file, using defaults"
        );
    }

    if cli.no_color || !config.display.color {
        colored::control::set_override(false);
    }

    let settings = Settings::resolve(&cli, &config);

    match &cli.command {
        Commands::Bedtimes { wake, select, output } => {
            let anchor = parse_anchor(wake)?;
            run_once(&settings, anchor, Direction::WakeToBed, *select, output.as_deref()).await?;
        }
        Commands::WakeTimes {
            bedtime,
            select,
            output,
        } => {
            let anchor = match bedtime {
                Some(text) => parse_anchor(text)?,
                None => {
                    let now = TimeOfDay::now_local();
                    println!("{}", format!("Going to sleep now ({})", now).dimmed());
                    now
                }
            };
            run_once(&settings, anchor, Direction::BedToWake, *select, output.as_deref()).await?;
        }
        Commands::Watch { direction } => {
            watch(&settings, *direction).await?;
        }
        Commands::Config { action } => {
            manage_config(action, config, &config_path)?;
        }
    }

    Ok(())
}

/// Show an error inline, colored by how serious it is
fn show_error(e: &SleepCalcError) {
    debug!(error = %e, "Showing error to user");
    let message = e.user_message();
    match e.severity() {
        ErrorSeverity::Warning => eprintln!("{}", message.yellow()),
        ErrorSeverity::Error => eprintln!("{}", message.red().bold()),
    }
}

/// Parse an anchor, showing the validation message before failing
fn parse_anchor(text: &str) -> Result<TimeOfDay> {
    TimeOfDay::parse_12h(text).map_err(|e| {
        show_error(&e);
        anyhow::Error::new(e)
    })
}

/// Compute one schedule through the pacing delay, with a spinner meanwhile
async fn paced_compute(settings: &Settings, request: ScheduleRequest) -> Option<ScheduleResult> {
    let (mut scheduler, mut results) = PacedScheduler::new(settings.delay);
    if !scheduler.submit(request) {
        return None;
    }

    let spinner = (!settings.delay.is_zero()).then(|| {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Calculating sleep cycles...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    });

    let result = results.recv().await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    result
}

async fn run_once(
    settings: &Settings,
    anchor: TimeOfDay,
    direction: Direction,
    select: Option<usize>,
    output: Option<&Path>,
) -> Result<()> {
    let result = paced_compute(settings, settings.request(Some(anchor), direction))
        .await
        .context("Schedule computation was cancelled")?;

    let format = output
        .and_then(ExportFormat::from_path)
        .filter(|_| settings.format == ExportFormat::Table)
        .unwrap_or(settings.format);

    let mut session = ScheduleSession::new();
    session.show(result);

    if let Some(position) = select {
        let index = position.checked_sub(1).context("Candidates are numbered from 1")?;
        let label = session
            .displayed()
            .and_then(|result| result.candidates.get(index))
            .map(|candidate| candidate.time.to_string())
            .with_context(|| format!("There is no candidate {}", position))?;

        let derived = session
            .select(&label, index)?
            .context("Selected candidate is not displayed")?;

        match output {
            Some(path) => {
                let file = std::fs::File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                export::export_selection(derived, format, io::BufWriter::new(file))?;
                println!("{}", format!("✓ Wrote {}", path.display()).green());
            }
            None => {
                print_deficit_banner(&derived.deficit);
                export::export_selection(derived, format, io::stdout().lock())?;
            }
        }
        return Ok(());
    }

    let Some(result) = session.displayed() else {
        return Ok(());
    };

    match output {
        Some(path) => {
            export::export_schedule_to_file(result, format, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{}", format!("✓ Wrote {}", path.display()).green());
        }
        None => print_schedule(result, format)?,
    }

    info!(anchor = %anchor, direction = %direction, "Schedule shown");
    Ok(())
}

fn print_schedule(result: &ScheduleResult, format: ExportFormat) -> Result<()> {
    if format == ExportFormat::Table {
        let title = match result.direction {
            Direction::WakeToBed => format!("Bedtimes for waking at {}", result.anchor),
            Direction::BedToWake => format!("Wake-up times for a {} bedtime", result.anchor),
        };
        println!("{}", title.blue().bold());
        print_deficit_banner(&result.deficit);
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    export::export_schedule(result, format, &mut handle)?;
    handle.flush()?;
    Ok(())
}

fn print_deficit_banner(deficit: &DeficitAssessment) {
    let label = format!("Sleep deficit: {}", deficit.level);
    let colored = match deficit.level {
        SleepDeficitLevel::None => label.green(),
        SleepDeficitLevel::Mild => label.yellow(),
        SleepDeficitLevel::Moderate => label.truecolor(255, 140, 0),
        SleepDeficitLevel::Severe => label.red().bold(),
    };
    println!("{}", colored);
}

/// Interactive loop: each stdin line is a new anchor, `select N` picks one
async fn watch(settings: &Settings, direction: Direction) -> Result<()> {
    let (mut scheduler, mut results) = PacedScheduler::new(settings.delay);
    let mut session = ScheduleSession::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut chronotype = settings.chronotype;
    let mut age_band = settings.age_band;
    let mut last_anchor: Option<TimeOfDay> = None;

    println!(
        "{}",
        format!(
            "Enter a {} (e.g. 7:00 AM), `select N`, `chronotype X`, `age X` or `quit`",
            match direction {
                Direction::WakeToBed => "wake-up time",
                Direction::BedToWake => "bedtime",
            }
        )
        .cyan()
        .bold()
    );

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                let line = line.trim();
                let mut words = line.split_whitespace();

                match (words.next(), words.next()) {
                    (Some("quit" | "exit"), _) => break,
                    (Some("select"), Some(number)) => {
                        handle_select(&mut session, number, settings.format)?;
                    }
                    (Some("chronotype"), Some(tag)) => match tag.parse::<Chronotype>() {
                        Ok(parsed) => {
                            chronotype = parsed;
                            scheduler.submit(ScheduleRequest::new(last_anchor, direction, chronotype, age_band));
                        }
                        Err(e) => show_error(&e),
                    },
                    (Some("age"), Some(tag)) => match tag.parse::<AgeBand>() {
                        Ok(parsed) => {
                            age_band = parsed;
                            scheduler.submit(ScheduleRequest::new(last_anchor, direction, chronotype, age_band));
                        }
                        Err(e) => show_error(&e),
                    },
                    _ => match ScheduleRequest::from_input(Some(line), direction, chronotype, age_band) {
                        Ok(request) => {
                            last_anchor = request.anchor;
                            if !scheduler.submit(request) {
                                session.clear();
                            }
                        }
                        Err(e) => {
                            scheduler.cancel();
                            show_error(&e);
                        }
                    },
                }
            }
            Some(result) = results.recv() => {
                session.show(result);
                if let Some(result) = session.displayed() {
                    print_schedule(result, settings.format)?;
                }
            }
        }
    }

    scheduler.cancel();
    Ok(())
}

fn handle_select(session: &mut ScheduleSession, number: &str, format: ExportFormat) -> Result<()> {
    let Some(index) = number.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
        eprintln!("{}", "Use `select N` with N starting at 1".yellow());
        return Ok(());
    };

    let label = session
        .displayed()
        .and_then(|result| result.candidates.get(index))
        .map(|candidate| candidate.time.to_string());
    let Some(label) = label else {
        eprintln!("{}", "No such candidate on screen".yellow());
        return Ok(());
    };

    match session.select(&label, index) {
        Ok(Some(derived)) => {
            print_deficit_banner(&derived.deficit);
            export::export_selection(derived, format, io::stdout().lock())?;
        }
        Ok(None) => eprintln!("{}", "Selection ignored".yellow()),
        Err(e) => show_error(&e),
    }
    Ok(())
}

fn manage_config(action: &ConfigAction, mut config: AppConfig, path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let content = toml::to_string_pretty(&config)
                .context("Failed to serialize configuration")?;
            println!("{}", format!("# {}", path.display()).dimmed());
            println!("{}", content);
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                println!(
                    "{}",
                    format!("Config already exists at {} (use --force to overwrite)", path.display())
                        .yellow()
                );
                return Ok(());
            }
            let mut fresh = AppConfig::default();
            fresh.save_to_file(path)?;
            println!("{}", format!("✓ Wrote {}", path.display()).green());
        }
        ConfigAction::Set { key, value } => {
            config.set_value(key, value).map_err(|e: SleepCalcError| {
                show_error(&e);
                anyhow::Error::new(e)
            })?;
            config.save_to_file(path)?;
            println!("{}", format!("✓ {} = {}", key, value).green());
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(())
}
