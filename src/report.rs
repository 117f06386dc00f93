//! Rendering of a finished run.

use crate::runner::RunSummary;
use colored::Colorize;
use std::fmt::Write as _;
use std::time::Duration;

/// Report format selected on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with checkmarks
    #[default]
    Human,
    /// Machine-readable JSON output
    Json,
    /// JUnit XML output for CI systems
    Junit,
}

/// Render `summary` in the requested format.
pub fn render(summary: &RunSummary, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Human => Ok(format_human(summary)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(summary)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Junit => Ok(format_junit_xml(summary)),
    }
}

/// One line per test, failure details indented under it, then a summary line.
pub fn format_human(summary: &RunSummary) -> String {
    let mut out = String::new();

    for test in &summary.results {
        let mark = if test.passed {
            "✓".green()
        } else {
            "✗".red()
        };
        let _ = writeln!(
            out,
            "{mark} {}: {} ({:.2?})",
            test.name, test.command, test.duration
        );
        for failure in &test.failures {
            for line in failure.lines() {
                let _ = writeln!(out, "    {line}");
            }
        }
    }

    out.push('\n');
    out.push_str(&summary_line(summary));
    out.push('\n');
    out
}

/// The closing line of a human report.
pub fn summary_line(summary: &RunSummary) -> String {
    if summary.failed > 0 {
        format!(
            "Number of failed tests: {}/{}",
            summary.failed, summary.total
        )
    } else {
        "All tests have been performed. No error!".to_string()
    }
}

/// Format test results as JUnit XML.
pub fn format_junit_xml(summary: &RunSummary) -> String {
    let total_time: Duration = summary.results.iter().map(|t| t.duration).sum();

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        xml,
        "<testsuites tests=\"{}\" failures=\"{}\" time=\"{:.3}\">",
        summary.total,
        summary.failed,
        total_time.as_secs_f64()
    );
    let _ = writeln!(
        xml,
        "  <testsuite name=\"dirtest\" tests=\"{}\" failures=\"{}\" time=\"{:.3}\">",
        summary.total,
        summary.failed,
        total_time.as_secs_f64()
    );

    for test in &summary.results {
        let _ = writeln!(
            xml,
            "    <testcase name=\"{}\" classname=\"{}\" time=\"{:.3}\">",
            escape_xml(&test.name),
            escape_xml(&test.command),
            test.duration.as_secs_f64()
        );

        if !test.passed {
            let message = test
                .failures
                .first()
                .and_then(|s| s.lines().next())
                .unwrap_or("Test failed");
            let _ = writeln!(xml, "      <failure message=\"{}\">", escape_xml(message));
            for failure in &test.failures {
                let _ = writeln!(xml, "{}", escape_xml(failure));
            }
            xml.push_str("      </failure>\n");
        }

        xml.push_str("    </testcase>\n");
    }

    xml.push_str("  </testsuite>\n");
    xml.push_str("</testsuites>\n");
    xml
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
