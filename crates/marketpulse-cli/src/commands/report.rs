use std::fs;
use std::path::Path;

use marketpulse_core::{render, MarketPulse, ReportFormat};
use serde::Serialize;

use crate::cli::{OutputFormat, ReportArgs};
use crate::error::CliError;

use super::CommandOutcome;

#[derive(Debug, Serialize)]
struct WrittenReport {
    report_id: String,
    path: String,
    format: ReportFormat,
    content_type: &'static str,
    bytes: usize,
}

/// Renders the report; prints it directly or writes it to `--output`.
pub async fn run(
    args: &ReportArgs,
    format: OutputFormat,
    pipeline: &MarketPulse,
) -> Result<CommandOutcome, CliError> {
    let envelope = pipeline.report().await?;
    let report_format = format.report_format();
    let rendered = render(&envelope.data, report_format)?;

    match &args.output {
        Some(path) => {
            write_report(path, &rendered)?;
            let written = WrittenReport {
                report_id: envelope.data.meta.report_id.clone(),
                path: path.display().to_string(),
                format: report_format,
                content_type: report_format.content_type(),
                bytes: rendered.len(),
            };
            CommandOutcome::envelope(envelope.map(|_| written))
        }
        None => Ok(CommandOutcome::envelope(envelope)?.with_rendered(rendered)),
    }
}

fn write_report(path: &Path, rendered: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, rendered)?;
    Ok(())
}
