// Probe flow: one upload, reported as plain lines on the given writer.
// Every failure lands in a single `Failed:` line; the HTTP status is
// printed as-is and never judged.

use crate::api::{open_sample, Submission, SubmitClient};
use crate::config::ProbeConfig;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{info, warn};

/// Run the submission probe once, writing the announcement and outcome to
/// `out`. Only a failure to write to `out` is returned.
pub fn submit_job<W: Write>(config: &ProbeConfig, out: &mut W) -> io::Result<()> {
    let outcome = match prepare(config) {
        Ok((client, file, len)) => {
            writeln!(out, "Submitting job to {}...", client.url())?;
            out.flush()?;
            send(&client, file, len, &config.upload_file_name())
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(submission) => {
            info!(status = submission.status.as_u16(), "submission answered");
            if let Some(receipt) = submission.receipt() {
                info!(
                    job_id = %receipt.job_id,
                    status = %receipt.status,
                    yara_severity = ?receipt.yara_severity,
                    "job receipt: {}",
                    receipt.message
                );
            }
            writeln!(out, "Status: {}", submission.status.as_u16())?;
            writeln!(out, "Response: {}", submission.body)?;
        }
        Err(e) => {
            let description = describe(&e);
            warn!("submission failed: {description}");
            writeln!(out, "Failed: {description}")?;
        }
    }
    Ok(())
}

fn prepare(config: &ProbeConfig) -> Result<(SubmitClient, File, u64)> {
    let client = SubmitClient::from_config(config)?;
    let (file, len) = open_sample(&config.file)?;
    Ok((client, file, len))
}

fn send(client: &SubmitClient, file: File, len: u64, file_name: &str) -> Result<Submission> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Uploading...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = client.upload(file, len, file_name);
    spinner.finish_and_clear();
    result
}

/// Join the error chain with `: `, skipping a cause whose text the
/// previous message already ends with. reqwest and hyper errors print
/// their source in their own `Display`.
fn describe(err: &anyhow::Error) -> String {
    let mut text = String::new();
    for cause in err.chain() {
        let msg = cause.to_string();
        if text.ends_with(&msg) {
            continue;
        }
        if !text.is_empty() {
            text.push_str(": ");
        }
        text.push_str(&msg);
    }
    text
}
