//! Thermo CLI - Command-line interface for Thermo Schedule
//!
//! Commands:
//! - normalize: Print the canonical form of a day string or weekly schedule
//! - validate: Report invariant violations per day
//! - range: Show the axis range and marker positions for a day
//! - replay: Drive an editing session from recorded input events (NDJSON)
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};
use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use thermo_schedule::codec::{parse_day, parse_weekly, serialize_day, serialize_weekly};
use thermo_schedule::coords::{compute_range, CoordinateMapper, Plane};
use thermo_schedule::gesture::InputEvent;
use thermo_schedule::{
    DayKey, EditorConfig, ScheduleEditor, ScheduleError, ValidationReport, Validator,
    WeeklyTransport, THERMO_VERSION,
};

/// Thermo - Heating schedule codec and editing engine
#[derive(Parser)]
#[command(name = "thermo")]
#[command(version = THERMO_VERSION)]
#[command(about = "Parse, normalize, validate and edit heating schedules", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical form of a schedule
    Normalize {
        #[command(flatten)]
        source: ScheduleSource,
    },

    /// Report invariant violations per day
    Validate {
        #[command(flatten)]
        source: ScheduleSource,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the temperature axis range and marker positions for a day
    Range {
        /// Day transport string, e.g. "00:00/20 06:30/21.5"
        day: String,

        /// Editor configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Feed recorded input events into an editing session
    Replay {
        /// NDJSON input events (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Weekly transport JSON to start from (defaults to an all-default week)
        #[arg(short, long)]
        schedule: Option<PathBuf>,

        /// Day to edit
        #[arg(long, default_value = "monday")]
        day: DayKey,

        /// Editor configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Editor configuration (TOML) to check
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct ScheduleSource {
    /// Single day transport string
    #[arg(long)]
    day: Option<String>,

    /// Weekly transport JSON file (use - for stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(default)
        .parse_default_env()
        .format_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), ThermoCliError> {
    match cli.command {
        Commands::Normalize { source } => cmd_normalize(&source),
        Commands::Validate { source, json } => cmd_validate(&source, json),
        Commands::Range { day, config } => cmd_range(&day, config.as_deref()),
        Commands::Replay {
            input,
            schedule,
            day,
            config,
        } => cmd_replay(&input, schedule.as_deref(), day, config.as_deref()),
        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_normalize(source: &ScheduleSource) -> Result<(), ThermoCliError> {
    if let Some(day) = &source.day {
        println!("{}", serialize_day(&parse_day(day)));
        return Ok(());
    }

    let transport = read_transport(source.input.as_deref())?;
    let normalized = serialize_weekly(&parse_weekly(&transport));
    println!("{}", serde_json::to_string_pretty(&normalized)?);
    Ok(())
}

fn cmd_validate(source: &ScheduleSource, json: bool) -> Result<(), ThermoCliError> {
    let reports: Vec<DayReport> = match &source.day {
        Some(day) => vec![DayReport::new(None, Validator::validate_text(day))],
        None => read_transport(source.input.as_deref())?
            .iter()
            .map(|(key, text)| DayReport::new(Some(*key), Validator::validate_text(text)))
            .collect(),
    };

    let invalid: usize = reports.iter().map(|r| r.report.violations.len()).sum();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("Validation Report");
        println!("=================");
        for r in &reports {
            let label = r.day.map(|d| d.to_string()).unwrap_or_else(|| "day".to_string());
            let status = if r.report.valid { "[OK]" } else { "[ERR]" };
            println!("  {} {}", status, label);
            for message in r.report.messages() {
                println!("      - {}", message);
            }
        }
    }

    if invalid > 0 {
        Err(ThermoCliError::ValidationFailed(invalid))
    } else {
        Ok(())
    }
}

fn cmd_range(day: &str, config: Option<&Path>) -> Result<(), ThermoCliError> {
    let config = load_config(config)?;
    let schedule = parse_day(day);
    let range = compute_range(&config.axis, &schedule);
    let mapper = CoordinateMapper::new(Plane::from(&config.plane), range);

    println!("Axis: {:.1} .. {:.1} °C (span {:.1})", range.min, range.max, range.span());
    for t in schedule.transitions() {
        let p = mapper.project(t);
        println!("  {} {:>5} °C  -> ({:.1}, {:.1})", t.time, t.temperature, p.x, p.y);
    }
    Ok(())
}

fn cmd_replay(
    input: &Path,
    schedule: Option<&Path>,
    day: DayKey,
    config: Option<&Path>,
) -> Result<(), ThermoCliError> {
    let config = load_config(config)?;
    let transport = match schedule {
        Some(path) => read_transport(Some(path))?,
        None => WeeklyTransport::new(),
    };

    let mut editor = ScheduleEditor::from_transport(&transport, config);
    let mut stdout = io::stdout();
    emit(&mut stdout, &editor.select_day(day))?;

    let reader: Box<dyn BufRead> = if input.to_string_lossy() == "-" {
        Box::new(io::stdin().lock())
    } else {
        Box::new(BufReader::new(fs::File::open(input)?))
    };

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let event: InputEvent = serde_json::from_str(trimmed).map_err(|e| {
            ThermoCliError::ParseError(format!("Line {}: {}", line_no + 1, e))
        })?;
        debug!("Replaying {:?}", event);
        emit(&mut stdout, &editor.handle_input(event))?;
    }

    // A recording that ends mid-gesture behaves like a lost window.
    emit(&mut stdout, &editor.cancel_gesture())?;
    stdout.flush()?;
    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), ThermoCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "thermo_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Thermo version {}", THERMO_VERSION),
    });

    if let Some(path) = config {
        let check = if !path.exists() {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist; defaults apply".to_string(),
            }
        } else {
            match EditorConfig::from_file(path) {
                Ok(c) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Config valid (plane {}x{}, snap {} min)",
                        c.plane.width, c.plane.height, c.gesture.snap_minutes
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Invalid config: {}", e),
                },
            }
        };
        checks.push(check);
    }

    checks.push(stdin_check(atty::is(atty::Stream::Stdin)));

    let report = DoctorReport {
        version: THERMO_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Thermo Doctor Report");
        println!("====================");
        println!("Version: {}", report.version);
        println!("\nChecks:");
        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(ThermoCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

/// `replay -i -` reads recorded events from stdin; on a terminal it would
/// sit waiting for typed input.
fn stdin_check(is_tty: bool) -> DoctorCheck {
    if is_tty {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Warning,
            message: "stdin is a TTY; 'replay -i -' needs events piped in".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (replay ready)".to_string(),
        }
    }
}

fn read_input(path: &Path) -> Result<String, ThermoCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn read_transport(path: Option<&Path>) -> Result<WeeklyTransport, ThermoCliError> {
    let data = read_input(path.unwrap_or(Path::new("-")))?;
    Ok(serde_json::from_str(&data)?)
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig, ThermoCliError> {
    match path {
        Some(path) => Ok(EditorConfig::from_file(path)?),
        None => Ok(EditorConfig::default()),
    }
}

fn emit<W: Write, T: serde::Serialize>(out: &mut W, events: &[T]) -> Result<(), ThermoCliError> {
    for event in events {
        writeln!(out, "{}", serde_json::to_string(event)?)?;
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum ThermoCliError {
    Io(io::Error),
    Schedule(ScheduleError),
    Json(serde_json::Error),
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for ThermoCliError {
    fn from(e: io::Error) -> Self {
        ThermoCliError::Io(e)
    }
}

impl From<ScheduleError> for ThermoCliError {
    fn from(e: ScheduleError) -> Self {
        ThermoCliError::Schedule(e)
    }
}

impl From<serde_json::Error> for ThermoCliError {
    fn from(e: serde_json::Error) -> Self {
        ThermoCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ThermoCliError> for CliError {
    fn from(e: ThermoCliError) -> Self {
        match e {
            ThermoCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ThermoCliError::Schedule(e) => CliError {
                code: "SCHEDULE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the config file and day keys".to_string()),
            },
            ThermoCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Expected an object of day key to transport string".to_string()),
            },
            ThermoCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} violations found", count),
                hint: Some("Run 'thermo normalize' to auto-fix".to_string()),
            },
            ThermoCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            ThermoCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Each line must be one JSON input event".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DayReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    day: Option<DayKey>,
    #[serde(flatten)]
    report: ValidationReport,
}

impl DayReport {
    fn new(day: Option<DayKey>, report: ValidationReport) -> Self {
        Self { day, report }
    }
}

#[derive(serde::Serialize)]
struct DoctorReport {
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Debug, PartialEq, serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdin_check_warns_on_terminal() {
        assert_eq!(stdin_check(true).status, CheckStatus::Warning);
        assert_eq!(stdin_check(false).status, CheckStatus::Ok);
    }
}
