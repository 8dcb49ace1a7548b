// API client module: a small blocking HTTP client that posts one file to
// the orchestrator's submit endpoint as multipart/form-data.

use anyhow::{bail, Context, Result};
use reqwest::blocking::{multipart, Client};
use reqwest::StatusCode;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use crate::config::ProbeConfig;

/// Holds a reqwest blocking client together with the upload settings
/// taken from a `ProbeConfig`.
pub struct SubmitClient {
    client: Client,
    url: String,
    field: String,
    mime: String,
}

/// Raw outcome of one upload. Any status the server answers with ends up
/// here; only transport failures are reported as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub status: StatusCode,
    pub body: String,
}

/// Reply the orchestrator sends after accepting a sample. Parsed
/// best-effort, purely for logging.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JobReceipt {
    pub job_id: String,
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub yara_matches: Option<Vec<String>>,
    #[serde(default)]
    pub yara_severity: Option<String>,
}

/// Open the sample for reading and return it with its length. Anything
/// other than a regular file is rejected here, before a request exists.
pub fn open_sample(path: &Path) -> Result<(File, u64)> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let meta = file
        .metadata()
        .with_context(|| format!("Failed to read metadata of {}", path.display()))?;
    if !meta.is_file() {
        bail!("Failed to open {}: not a regular file", path.display());
    }
    Ok((file, meta.len()))
}

impl SubmitClient {
    /// Build the blocking client from `config`. The timeout is applied only
    /// when set; otherwise reqwest's default stays in place.
    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(SubmitClient {
            client,
            url: config.url.clone(),
            field: config.field.clone(),
            mime: config.mime.clone(),
        })
    }

    /// Endpoint every upload is posted to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stream `file` (`len` bytes) as the single part of a multipart POST.
    /// The file is consumed and closed by the time this returns.
    pub fn upload(&self, file: File, len: u64, file_name: &str) -> Result<Submission> {
        debug!(field = %self.field, file_name, mime = %self.mime, len, "building multipart upload");

        let part = multipart::Part::reader_with_length(file, len)
            .file_name(file_name.to_string())
            .mime_str(&self.mime)
            .with_context(|| format!("Invalid content type `{}`", self.mime))?;
        let form = multipart::Form::new().part(self.field.clone(), part);

        let res = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .context("Failed to send submit request")?;
        let status = res.status();
        let body = res.text().context("Failed to read submit response body")?;
        Ok(Submission { status, body })
    }
}

impl Submission {
    /// The orchestrator's JSON reply, when the body is one. Plain-text
    /// bodies yield `None`.
    pub fn receipt(&self) -> Option<JobReceipt> {
        serde_json::from_str(&self.body).ok()
    }
}
