//! procenv - Collect environment variables of running processes
//!
//! This tool scans the process root for processes matching a pid pattern
//! and reports the environment variables whose names match a name pattern.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use procenv_core::{
    Error as CoreError, ItemSink, NamePattern, Operation, PidPattern, Probe, ProbeConfig,
    ResultItem,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

/// Collect environment variables of running processes
#[derive(Parser, Debug)]
#[command(name = "procenv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Pid to compare processes against.
    ///
    /// 0 stands for this process with every operation, so use
    /// `--pid 1 --pid-operation greater-than-or-equal` to select all processes.
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    pid: i64,

    /// Operation applied to the pid: equals, not-equal, greater-than,
    /// less-than, greater-than-or-equal, less-than-or-equal
    #[arg(long, value_parser = str::parse::<Operation>, default_value = "equals")]
    pid_operation: Operation,

    /// Variable name to compare against
    #[arg(short, long)]
    name: String,

    /// Operation applied to the variable name: equals, not-equal,
    /// case-insensitive-equals, case-insensitive-not-equal, pattern-match
    #[arg(long, value_parser = str::parse::<Operation>, default_value = "equals")]
    name_operation: Operation,

    /// Root of the process hierarchy
    #[arg(
        long,
        env = "PROCENV_PROC_ROOT",
        default_value = procenv_core::procfs::DEFAULT_PROC_ROOT
    )]
    proc_root: PathBuf,

    /// Growth step of the per-process read buffer, in bytes
    #[arg(
        long,
        env = "PROCENV_READ_INCREMENT",
        default_value_t = procenv_core::splitter::DEFAULT_READ_INCREMENT
    )]
    read_increment: usize,

    /// Maximum number of matching processes to read (0 = unlimited)
    #[arg(long, default_value = "0")]
    max_processes: usize,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Output format for result items
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One tab-separated line per item
    Text,
    /// A single JSON array
    Json,
    /// One JSON object per line
    JsonLines,
}

/// Writes each item as a tab-separated line
struct TextSink<W> {
    out: W,
}

impl<W: Write> ItemSink for TextSink<W> {
    fn collect(&mut self, item: ResultItem) -> procenv_core::Result<()> {
        let line = match (&item.name, &item.value) {
            (Some(name), Some(value)) => format!("{}\t{}\t{}", item.pid, name, value),
            _ => format!(
                "{}\t{}\t{}",
                item.pid,
                item.status,
                item.message.as_deref().unwrap_or_default()
            ),
        };
        writeln!(self.out, "{}", line).map_err(CoreError::SinkWrite)
    }
}

/// Writes each item as one JSON object per line
struct JsonLinesSink<W> {
    out: W,
}

impl<W: Write> ItemSink for JsonLinesSink<W> {
    fn collect(&mut self, item: ResultItem) -> procenv_core::Result<()> {
        serde_json::to_writer(&mut self.out, &item).map_err(|e| CoreError::SinkWrite(e.into()))?;
        writeln!(self.out).map_err(CoreError::SinkWrite)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    run(&cli, io::stdout().lock())
}

/// Build the entities, run one scan pass and write items to `out`
fn run<W: Write>(cli: &Cli, mut out: W) -> Result<()> {
    let pid_pattern = PidPattern::new(cli.pid_operation, cli.pid)
        .context("Invalid pid pattern")?;
    let name_pattern = NamePattern::new(cli.name_operation, cli.name.as_str())
        .context("Invalid name pattern")?;

    debug!(
        "pid {} '{}', name {} '{}'",
        pid_pattern.operation(),
        pid_pattern.value(),
        name_pattern.operation(),
        name_pattern.value()
    );

    let config = ProbeConfig::new()
        .proc_root(&cli.proc_root)
        .read_increment(cli.read_increment)
        .max_processes(cli.max_processes);
    let probe = Probe::new(config);

    let summary = match cli.format {
        OutputFormat::Text => {
            let mut sink = TextSink { out: &mut out };
            probe.scan(pid_pattern, &name_pattern, &mut sink)
        }
        OutputFormat::JsonLines => {
            let mut sink = JsonLinesSink { out: &mut out };
            probe.scan(pid_pattern, &name_pattern, &mut sink)
        }
        OutputFormat::Json => {
            let mut items: Vec<ResultItem> = Vec::new();
            let summary = probe.scan(pid_pattern, &name_pattern, &mut items);
            if summary.is_ok() {
                serde_json::to_writer_pretty(&mut out, &items)
                    .context("Failed to write JSON output")?;
                writeln!(out).context("Failed to write JSON output")?;
            }
            summary
        }
    }
    .with_context(|| format!("Scan of {} failed", cli.proc_root.display()))?;

    out.flush().context("Failed to flush output")?;

    info!(
        "Summary: {} processes listed, {} matched, {} collected, {} not collected, \
         {} malformed records",
        summary.processes_listed,
        summary.processes_matched,
        summary.items_collected,
        summary.diagnostics,
        summary.malformed_records
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use procenv_core::EnvironRecord;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("procenv").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_text_sink() {
        let mut out = Vec::new();
        let mut sink = TextSink { out: &mut out };
        sink.collect(ResultItem::collected(12, EnvironRecord::new("HOME", "/root")))
            .unwrap();
        sink.collect(ResultItem::not_collected(13, "can't open '/proc/13/environ'"))
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "12\tHOME\t/root\n13\tnot collected\tcan't open '/proc/13/environ'\n"
        );
    }

    #[test]
    fn test_json_lines_sink() {
        let mut out = Vec::new();
        let mut sink = JsonLinesSink { out: &mut out };
        sink.collect(ResultItem::collected(12, EnvironRecord::new("HOME", "/root")))
            .unwrap();
        sink.collect(ResultItem::not_collected(13, "gone")).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            concat!(
                r#"{"pid":12,"name":"HOME","value":"/root","status":"collected"}"#,
                "\n",
                r#"{"pid":13,"status":"not collected","message":"gone"}"#,
                "\n"
            )
        );
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--name", "HOME"]);
        assert_eq!(cli.pid, 0);
        assert_eq!(cli.pid_operation, Operation::Equals);
        assert_eq!(cli.name_operation, Operation::Equals);
        assert!(matches!(cli.format, OutputFormat::Text));
        assert_eq!(cli.read_increment, procenv_core::splitter::DEFAULT_READ_INCREMENT);
    }

    #[test]
    fn test_operation_args() {
        let cli = parse(&[
            "--name",
            "^LC_",
            "--name-operation",
            "pattern-match",
            "--pid-operation",
            "greater-than-or-equal",
            "--pid",
            "1",
        ]);
        assert_eq!(cli.name_operation, Operation::PatternMatch);
        assert_eq!(cli.pid_operation, Operation::GreaterThanOrEqual);
    }

    #[test]
    fn test_unknown_operation_rejected() {
        let result = Cli::try_parse_from(["procenv", "--name", "HOME", "--name-operation", "xor"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_pid_rejected() {
        let cli = parse(&["--name", "HOME", "--pid", "-1"]);
        let err = run(&cli, Vec::new()).unwrap_err();
        assert!(err.to_string().contains("Invalid pid pattern"));
    }

    #[test]
    fn test_missing_root_fails() {
        let cli = parse(&["--name", "HOME", "--proc-root", "/nonexistent/procenv/root"]);
        let err = run(&cli, Vec::new()).unwrap_err();
        assert!(err.to_string().contains("Scan of /nonexistent/procenv/root failed"));
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
