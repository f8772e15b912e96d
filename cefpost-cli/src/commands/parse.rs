//! `cefpost parse` command handler
//!
//! Reads CEF lines from a file or stdin, writes one record per successfully
//! parsed line to stdout and a summary to stderr.

use std::io::Write;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use cefpost_core::config::CefpostConfig;
use cefpost_core::error::CefpostError;
use cefpost_core::pipeline::FieldWarning;
use cefpost_core::types::{CefRecord, SeverityLevel};
use cefpost_parser::CefParser;

use crate::cli::ParseArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Source label used when reading standard input.
pub const STDIN_SOURCE: &str = "(stdin)";

/// Upper bound on failures kept in the summary; the count is always exact.
pub const MAX_REPORTED_FAILURES: usize = 100;

/// Execute the `parse` command.
///
/// # Errors
///
/// * `CliError::Core` if the parser cannot be built from the configuration
/// * `CliError::Io` if the input cannot be read
/// * `CliError::ParseFailures` if any line was rejected
pub async fn execute(
    args: ParseArgs,
    config: &CefpostConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let parser = CefParser::new(&config.parser).map_err(CefpostError::from)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let summary = match args.file {
        Some(ref path) => {
            info!(path = %path.display(), timezone = %parser.timezone(), "parsing file");
            let file = tokio::fs::File::open(path).await?;
            let reader = BufReader::new(file);
            parse_stream(reader, &parser, args.fail_fast, writer, &mut out)
                .await?
                .with_source(path.display().to_string())
        }
        None => {
            info!(timezone = %parser.timezone(), "parsing stdin");
            let reader = BufReader::new(tokio::io::stdin());
            parse_stream(reader, &parser, args.fail_fast, writer, &mut out)
                .await?
                .with_source(STDIN_SOURCE.to_owned())
        }
    };
    out.flush()?;

    info!(
        parsed = summary.parsed,
        failed = summary.failed,
        dropped_fields = summary.dropped_fields,
        "parse finished"
    );

    let stderr = std::io::stderr();
    let mut err_handle = stderr.lock();
    writer.render_to(&summary, &mut err_handle)?;

    if summary.failed > 0 {
        return Err(CliError::ParseFailures {
            failed: summary.failed,
            total: summary.total(),
        });
    }

    Ok(())
}

/// Parse every line of `reader`, emitting records to `out`.
///
/// Blank lines are skipped and a trailing `\r` is stripped. Invalid UTF-8 is
/// replaced rather than aborting the stream. With `fail_fast`, reading stops
/// at the first rejected line.
pub async fn parse_stream<R>(
    mut reader: R,
    parser: &CefParser,
    fail_fast: bool,
    writer: &OutputWriter,
    out: &mut dyn Write,
) -> Result<ParseSummary, CliError>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = ParseSummary::default();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        line_no += 1;

        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end_matches('\n').trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        match parser.parse_with_warnings(line) {
            Ok(outcome) => {
                summary.parsed += 1;
                summary.dropped_fields += outcome.warnings.len();
                let item = RecordOutput {
                    line: line_no,
                    record: &outcome.record,
                    warnings: &outcome.warnings,
                };
                writer.emit_to(&item, out)?;
            }
            Err(e) => {
                let category = e.category().as_label();
                warn!(line = line_no, category, error = %e, "line rejected");
                summary.failed += 1;
                if summary.failures.len() < MAX_REPORTED_FAILURES {
                    summary.failures.push(LineFailure {
                        line: line_no,
                        category: category.to_owned(),
                        error: e.to_string(),
                    });
                }
                if fail_fast {
                    summary.stopped_early = true;
                    break;
                }
            }
        }
    }

    Ok(summary)
}

/// One parsed record as written to stdout.
#[derive(Serialize)]
pub struct RecordOutput<'a> {
    /// 1-based input line number
    pub line: usize,
    #[serde(flatten)]
    pub record: &'a CefRecord,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub warnings: &'a [FieldWarning],
}

impl Render for RecordOutput<'_> {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let level = self.record.human_readable_severity();
        let label = format!("[{}]", level);
        let label = match level {
            SeverityLevel::VeryHigh => label.red().bold(),
            SeverityLevel::High => label.red(),
            SeverityLevel::Medium => label.yellow(),
            SeverityLevel::Low => label.green(),
            SeverityLevel::Unknown => label.dimmed(),
        };

        writeln!(
            w,
            "#{} {} {} {}|{}|{} {}: {}",
            self.line,
            self.record.timestamp().to_rfc3339(),
            label,
            self.record.device_vendor(),
            self.record.device_product(),
            self.record.device_version(),
            self.record.device_event_class_id(),
            self.record.name().bold(),
        )?;

        if let Some(message) = self.record.message() {
            writeln!(w, "    message: {}", message)?;
        }
        for (key, value) in self.record.fields() {
            writeln!(w, "    {} = {}", key, value)?;
        }
        for warning in self.warnings {
            writeln!(w, "    {}", warning.to_string().yellow())?;
        }

        Ok(())
    }
}

/// A rejected input line.
#[derive(Debug, Clone, Serialize)]
pub struct LineFailure {
    pub line: usize,
    /// Failure category (`malformed_header`, `empty_payload`, ...)
    pub category: String,
    pub error: String,
}

/// Totals for one `parse` run, rendered to stderr.
#[derive(Debug, Default, Serialize)]
pub struct ParseSummary {
    pub source: String,
    pub parsed: usize,
    pub failed: usize,
    /// Extension fields dropped with a warning across all parsed lines
    pub dropped_fields: usize,
    /// True when `--fail-fast` stopped reading before the end of input
    pub stopped_early: bool,
    pub failures: Vec<LineFailure>,
}

impl ParseSummary {
    fn with_source(mut self, source: String) -> Self {
        self.source = source;
        self
    }

    /// Non-blank lines handed to the parser.
    pub fn total(&self) -> usize {
        self.parsed + self.failed
    }
}

impl Render for ParseSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Parse Summary: {}", self.source.bold())?;
        writeln!(w, "  Parsed: {}", self.parsed.to_string().green())?;
        if self.failed > 0 {
            writeln!(w, "  Failed: {}", self.failed.to_string().red().bold())?;
        } else {
            writeln!(w, "  Failed: 0")?;
        }
        writeln!(w, "  Dropped fields: {}", self.dropped_fields)?;
        if self.stopped_early {
            writeln!(w, "  {}", "Stopped at first failure (--fail-fast)".yellow())?;
        }
        for failure in &self.failures {
            writeln!(
                w,
                "  line {} [{}]: {}",
                failure.line,
                failure.category,
                failure.error.red()
            )?;
        }
        if self.failed > self.failures.len() {
            writeln!(
                w,
                "  ... {} more failures not shown",
                self.failed - self.failures.len()
            )?;
        }

        Ok(())
    }
}
