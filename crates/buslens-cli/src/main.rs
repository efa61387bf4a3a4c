use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use buslens_core::transport::{DeviceDriver, TransportConfig, TransportError, TransportSession};
use buslens_core::{Chip, DecodeReport, DecoderConfig, JsonCaptureSource, decode_source};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glob::glob;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("BUSLENS_BUILD_COMMIT"),
    ", ",
    env!("BUSLENS_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "buslens")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Protocol decoder for captured UART/SPI/I2C traffic and instrument query tool.",
    long_about = None,
    after_help = "Examples:\n  buslens decode capture.json -o report.json\n  buslens decode capture.json --uart iso7816 --lines\n  buslens device query /dev/ttyUSB0 '*IDN?'"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a JSON capture file into a report.
    Decode(DecodeArgs),
    /// Talk to a measurement instrument.
    Device {
        #[command(subcommand)]
        command: DeviceCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DeviceCommands {
    /// Send one command and print the reply.
    Query(QueryArgs),
}

/// Chip selection for one bus kind.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ChipArg {
    None,
    Iso14230,
    Iso7816,
    Pn532,
}

impl ChipArg {
    fn chip(self) -> Option<Chip> {
        match self {
            ChipArg::None => None,
            ChipArg::Iso14230 => Some(Chip::Iso14230),
            ChipArg::Iso7816 => Some(Chip::Iso7816),
            ChipArg::Pn532 => Some(Chip::Pn532),
        }
    }
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Path to a .json capture file
    input: PathBuf,

    /// Decoder for UART packets (overrides the capture file)
    #[arg(long, value_enum)]
    uart: Option<ChipArg>,

    /// Decoder for SPI packets (overrides the capture file)
    #[arg(long, value_enum)]
    spi: Option<ChipArg>,

    /// Decoder for I2C packets (overrides the capture file)
    #[arg(long, value_enum)]
    i2c: Option<ChipArg>,

    /// ISO 7816 reset channel name
    #[arg(long, value_name = "NAME")]
    reset_channel: Option<String>,

    /// ISO 7816 pinpad channel name
    #[arg(long, value_name = "NAME")]
    pinpad_channel: Option<String>,

    /// ISO 7816 smartcard channel name
    #[arg(long, value_name = "NAME")]
    card_channel: Option<String>,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present_any = ["stdout", "lines"])]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with_all = ["report", "lines"])]
    stdout: bool,

    /// Print decoded lines as text instead of a JSON report
    #[arg(long, conflicts_with = "report")]
    lines: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Suppress the status message on stderr
    #[arg(long)]
    quiet: bool,
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Serial port or device path (e.g. /dev/ttyUSB0, COM3)
    port: String,

    /// Command to send; a trailing newline is added when missing
    command: String,

    /// Serial baud rate
    #[arg(long)]
    baud: Option<u32>,

    /// Timeout for each of send and receive, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Maximum reply size in bytes
    #[arg(long)]
    read_len: Option<usize>,

    /// Send only; do not wait for a reply
    #[arg(long)]
    no_read: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Decode(args) => cmd_decode(args),
        Commands::Device { command } => match command {
            DeviceCommands::Query(args) => cmd_device_query(args),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

impl From<TransportError> for CliError {
    fn from(err: TransportError) -> Self {
        let hint = match &err {
            TransportError::DeviceNotFound { .. } => {
                Some("check the port name (e.g. /dev/ttyUSB0 or COM3)".to_string())
            }
            TransportError::Timeout { .. } => Some(
                "the instrument did not answer in time; check the command or raise --timeout-ms"
                    .to_string(),
            ),
            TransportError::DeviceFault { .. } => {
                Some("unplug and reconnect the instrument, then retry".to_string())
            }
            _ => None,
        };
        CliError::new(err.to_string(), hint)
    }
}

fn cmd_decode(args: DecodeArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&args.input)?;
    validate_input_file(&resolved_input)?;
    if let Some(report_path) = args.report.as_ref() {
        ensure_distinct_output(&resolved_input, report_path)?;
    }

    let source = JsonCaptureSource::open(&resolved_input)
        .with_context(|| format!("Failed to load capture: {}", resolved_input.display()))?;
    let config = effective_config(source.decoders().cloned().unwrap_or_default(), &args);
    log::debug!(
        "decoding {} with uart={:?} spi={:?} i2c={:?}",
        resolved_input.display(),
        config.uart,
        config.spi,
        config.i2c
    );
    config.validate().map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("iso14230 and iso7816 decode UART; pn532 decodes SPI and I2C".to_string()),
        )
    })?;

    let rep = decode_source(&resolved_input, source, config).context("Capture decoding failed")?;

    if args.lines {
        print_lines(&rep);
        return Ok(());
    }

    let json = serialize_report(&rep, args.pretty)?;
    let Some(report) = args.report else {
        print!("{}", json);
        return Ok(());
    };

    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(&report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;

    if !args.quiet {
        eprintln!(
            "OK: {} packets, {} lines -> {}",
            rep.summary.packets_total,
            rep.lines.len(),
            report.display()
        );
    }
    Ok(())
}

/// Capture selection with command-line overrides applied. `none` clears a
/// selection stored in the capture.
fn effective_config(mut config: DecoderConfig, args: &DecodeArgs) -> DecoderConfig {
    if let Some(arg) = args.uart {
        config.uart = arg.chip();
    }
    if let Some(arg) = args.spi {
        config.spi = arg.chip();
    }
    if let Some(arg) = args.i2c {
        config.i2c = arg.chip();
    }
    if let Some(name) = &args.reset_channel {
        config.iso7816.reset = name.clone();
    }
    if let Some(name) = &args.pinpad_channel {
        config.iso7816.pinpad = name.clone();
    }
    if let Some(name) = &args.card_channel {
        config.iso7816.smartcard = name.clone();
    }
    config
}

fn print_lines(rep: &DecodeReport) {
    for line in &rep.lines {
        println!("[{}] {}", line.color, line.text);
    }
}

fn serialize_report(rep: &DecodeReport, pretty: bool) -> Result<String, CliError> {
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn ensure_distinct_output(input: &Path, report_path: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let parent = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A missing output directory cannot contain the input.
    let Ok(report_dir) = fs::canonicalize(parent) else {
        return Ok(());
    };
    let Some(file_name) = report_path.file_name() else {
        return Err(CliError::new(
            format!("invalid report path: {}", report_path.display()),
            Some("pass a file name, e.g. -o report.json".to_string()),
        ));
    };
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a .json capture file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a .json capture file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "json" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .json capture file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let more = if count > 3 { ", ..." } else { "" };
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}{}",
                    pattern, count, listed, more
                ),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}

fn cmd_device_query(args: QueryArgs) -> Result<(), CliError> {
    let defaults = TransportConfig::default();
    let config = TransportConfig {
        baud_rate: args.baud.unwrap_or(defaults.baud_rate),
        timeout_ms: args.timeout_ms.unwrap_or(defaults.timeout_ms),
        read_len: args.read_len.unwrap_or(defaults.read_len),
    };
    if config.read_len == 0 {
        return Err(CliError::new(
            "--read-len must be at least 1",
            Some("use --no-read to skip the reply".to_string()),
        ));
    }

    log::debug!(
        "querying {} at {} baud, timeout {} ms",
        args.port,
        config.baud_rate,
        config.timeout_ms
    );
    let mut command = args.command.into_bytes();
    if command.last() != Some(&b'\n') {
        command.push(b'\n');
    }

    #[cfg(windows)]
    {
        if is_device_interface_path(&args.port) {
            let mut session = TransportSession::open_device(&args.port)?;
            return run_query(&mut session, &command, &config, args.no_read);
        }
    }

    let mut session = TransportSession::open_serial(&args.port, &config)?;
    run_query(&mut session, &command, &config, args.no_read)
}

/// USB TMC instruments are opened through their device interface path.
#[cfg(windows)]
fn is_device_interface_path(port: &str) -> bool {
    port.starts_with(r"\\?\")
}

fn run_query<D: DeviceDriver>(
    session: &mut TransportSession<D>,
    command: &[u8],
    config: &TransportConfig,
    no_read: bool,
) -> Result<(), CliError> {
    if no_read {
        session.send(command, config.timeout())?;
    } else {
        let reply = session.query(command, config)?;
        log::info!("{}: {} reply bytes", session.name(), reply.len());
        println!("{}", String::from_utf8_lossy(&reply).trim_end());
    }
    session.close()?;
    Ok(())
}
