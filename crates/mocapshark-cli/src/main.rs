use std::fs;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use mocapshark_core::{
    DatagramSource, DecodeSession, DecodedPacket, MULTICAST_GROUP, PORT_DATA, ProtocolVersion,
    Report, UdpDataSource, analyze_dump_files,
};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("MOCAPSHARK_BUILD_COMMIT"),
    " ",
    env!("MOCAPSHARK_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "mocapshark")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder for motion-capture telemetry streams (dumped datagrams / live multicast).",
    long_about = None,
    after_help = "Examples:\n  mocapshark dump decode frame-000.bin -o report.json\n  mocapshark dump decode 'captures/*.bin' --stdout --pretty\n  mocapshark live listen --count 10\n  mocapshark live capture -o captures --count 100"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on dumped datagram files (offline-first).
    Dump {
        #[command(subcommand)]
        command: DumpCommands,
    },
    /// Operations on a live multicast stream.
    Live {
        #[command(subcommand)]
        command: LiveCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DumpCommands {
    /// Decode dumped datagrams into a versioned JSON report.
    #[command(
        after_help = "Examples:\n  mocapshark dump decode frame-000.bin -o report.json\n  mocapshark dump decode 'captures/*.bin' --stdout --pretty"
    )]
    Decode {
        /// Path to a .bin datagram dump, or a glob matching several
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if any datagram fails to decode
        #[arg(long)]
        strict: bool,

        /// Initial protocol version hint (e.g. 2.5 or 2.5.0.0), updated from
        /// sender announcements within the series
        #[arg(long, value_name = "VERSION", default_value_t = ProtocolVersion::DEFAULT)]
        natnet_version: ProtocolVersion,
    },
}

#[derive(Subcommand, Debug)]
enum LiveCommands {
    /// Join the data multicast group and print one JSON object per packet.
    Listen {
        /// Stop after this many datagrams (run forever by default)
        #[arg(long)]
        count: Option<u64>,

        /// Initial protocol version hint, updated from sender announcements
        #[arg(long, value_name = "VERSION", default_value_t = ProtocolVersion::DEFAULT)]
        natnet_version: ProtocolVersion,

        /// Multicast group to join
        #[arg(long, default_value_t = MULTICAST_GROUP)]
        multicast: Ipv4Addr,

        /// Data port to bind
        #[arg(long, default_value_t = PORT_DATA)]
        port: u16,

        /// Interface address to join on (any interface by default)
        #[arg(long, default_value_t = Ipv4Addr::UNSPECIFIED)]
        iface: Ipv4Addr,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Suppress warnings about undecodable datagrams
        #[arg(long)]
        quiet: bool,
    },
    /// Capture raw datagrams to numbered dump files for offline decoding.
    Capture {
        /// Number of datagrams to capture
        #[arg(long, default_value_t = 100)]
        count: u64,

        /// Output directory for dump files
        #[arg(short = 'o', long, default_value = ".")]
        out_dir: PathBuf,

        /// Dump file name prefix
        #[arg(long, default_value = "frame")]
        prefix: String,

        /// Multicast group to join
        #[arg(long, default_value_t = MULTICAST_GROUP)]
        multicast: Ipv4Addr,

        /// Data port to bind
        #[arg(long, default_value_t = PORT_DATA)]
        port: u16,

        /// Interface address to join on (any interface by default)
        #[arg(long, default_value_t = Ipv4Addr::UNSPECIFIED)]
        iface: Ipv4Addr,

        /// Suppress per-file progress output
        #[arg(long)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Dump { command } => match command {
            DumpCommands::Decode {
                input,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                strict,
                natnet_version,
            } => cmd_dump_decode(
                input,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                strict,
                natnet_version,
            ),
        },
        Commands::Live { command } => match command {
            LiveCommands::Listen {
                count,
                natnet_version,
                multicast,
                port,
                iface,
                pretty,
                quiet,
            } => cmd_live_listen(count, natnet_version, multicast, port, iface, pretty, quiet),
            LiveCommands::Capture {
                count,
                out_dir,
                prefix,
                multicast,
                port,
                iface,
                quiet,
            } => cmd_live_capture(count, out_dir, prefix, multicast, port, iface, quiet),
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
        CliError::new(err.to_string(), None)
    }
}

fn cmd_dump_decode(
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
    natnet_version: ProtocolVersion,
) -> Result<(), CliError> {
    let inputs = resolve_inputs(&input)?;
    for path in &inputs {
        validate_input_file(path)?;
    }

    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    if let Some(report_path) = report.as_ref() {
        for path in &inputs {
            let input_abs = fs::canonicalize(path)
                .with_context(|| format!("Failed to resolve input path: {}", path.display()))?;
            if report_target(report_path)? == Some(input_abs) {
                return Err(CliError::new(
                    format!(
                        "report path must differ from input: {}",
                        report_path.display()
                    ),
                    Some("choose a different output path".to_string()),
                ));
            }
        }
    }

    let rep = analyze_dump_files(&inputs, natnet_version);
    let json = serialize_report(&rep, pretty, compact)?;

    if let Some(report) = report {
        if let Some(parent) = report.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
        }
        fs::write(&report, json)
            .with_context(|| format!("Failed to write report: {}", report.display()))?;
        if !quiet {
            eprintln!("OK: report written -> {}", report.display());
        }
    } else {
        print!("{}", json);
    }

    if strict && rep.has_failures() {
        return Err(CliError::new(
            "decode failures detected",
            Some("inspect the report's error entries".to_string()),
        ));
    }
    Ok(())
}

/// Absolute path the report would be written to, when its directory already
/// exists.
fn report_target(report_path: &PathBuf) -> Result<Option<PathBuf>, CliError> {
    let parent = match report_path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None => return Ok(None),
    };
    let parent = match fs::canonicalize(&parent) {
        Ok(parent) => parent,
        Err(_) => return Ok(None),
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| CliError::new("invalid report path", None))?;
    Ok(Some(parent.join(file_name)))
}

fn serialize_report(rep: &Report, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
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

#[derive(Debug, serde::Serialize)]
struct LiveRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    received_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    packet: DecodedPacket,
}

fn cmd_live_listen(
    count: Option<u64>,
    natnet_version: ProtocolVersion,
    multicast: Ipv4Addr,
    port: u16,
    iface: Ipv4Addr,
    pretty: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let mut source = UdpDataSource::open(iface, multicast, port)
        .with_context(|| format!("Failed to join {multicast}:{port}"))?;
    let mut session = DecodeSession::new(natnet_version);

    let mut seen = 0u64;
    while count.is_none_or(|max| seen < max) {
        let event = match source.next_datagram().context("Datagram receive failed")? {
            Some(event) => event,
            None => break,
        };
        seen += 1;
        match session.decode(&event.data) {
            Ok(packet) => {
                let record = LiveRecord {
                    received_at: ts_to_rfc3339(event.ts),
                    source: event.source.map(|addr| addr.to_string()),
                    packet,
                };
                let json = if pretty {
                    serde_json::to_string_pretty(&record)
                } else {
                    serde_json::to_string(&record)
                };
                println!("{}", json.context("JSON serialization failed")?);
            }
            Err(err) => {
                if !quiet {
                    eprintln!("warning: undecodable datagram: {}", err);
                }
            }
        }
    }
    Ok(())
}

fn cmd_live_capture(
    count: u64,
    out_dir: PathBuf,
    prefix: String,
    multicast: Ipv4Addr,
    port: u16,
    iface: Ipv4Addr,
    quiet: bool,
) -> Result<(), CliError> {
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;
    let mut source = UdpDataSource::open(iface, multicast, port)
        .with_context(|| format!("Failed to join {multicast}:{port}"))?;

    for index in 0..count {
        let event = match source.next_datagram().context("Datagram receive failed")? {
            Some(event) => event,
            None => break,
        };
        let path = out_dir.join(format!("{prefix}-{index:03}.bin"));
        fs::write(&path, &event.data)
            .with_context(|| format!("Failed to write dump: {}", path.display()))?;
        if !quiet {
            eprintln!("dumped {}", path.display());
        }
    }
    Ok(())
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .bin datagram dump".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .bin datagram dump".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "bin" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .bin datagram dump".to_string()),
        ));
    }
    Ok(())
}

fn resolve_inputs(input: &PathBuf) -> Result<Vec<PathBuf>, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(vec![input.clone()]);
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
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

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .bin dumps".to_string()),
        ));
    }

    // dump series are numbered; decode them in name order
    matches.sort();
    Ok(matches)
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
