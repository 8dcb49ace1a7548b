// Probe settings. With no flags and no environment overrides the probe
// targets the local orchestrator and uploads `sample.bin` from the
// working directory.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_URL: &str = "http://localhost:5001/submit";
pub const DEFAULT_FILE: &str = "sample.bin";
pub const DEFAULT_FIELD: &str = "file";
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Everything the probe needs to perform one upload. Each flag can also
/// be provided through the matching `SUBMIT_*` environment variable.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "submit-probe", version, about = "Upload a sample file to the orchestrator and print the reply")]
pub struct ProbeConfig {
    /// Endpoint receiving the multipart upload.
    #[arg(long, env = "SUBMIT_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// File sent as the upload body.
    #[arg(long, env = "SUBMIT_FILE", default_value = DEFAULT_FILE)]
    pub file: PathBuf,

    /// Multipart field name carrying the file.
    #[arg(long, env = "SUBMIT_FIELD", default_value = DEFAULT_FIELD)]
    pub field: String,

    /// Content type declared for the file part.
    #[arg(long, env = "SUBMIT_MIME", default_value = DEFAULT_MIME)]
    pub mime: String,

    /// Request timeout in seconds. Unset keeps the HTTP client's default.
    #[arg(long, env = "SUBMIT_TIMEOUT", value_parser = parse_timeout)]
    pub timeout: Option<Duration>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            url: DEFAULT_URL.into(),
            file: PathBuf::from(DEFAULT_FILE),
            field: DEFAULT_FIELD.into(),
            mime: DEFAULT_MIME.into(),
            timeout: None,
        }
    }
}

impl ProbeConfig {
    /// Filename announced in the multipart part: the last component of
    /// `file`, or `sample.bin` when the path has none.
    pub fn upload_file_name(&self) -> String {
        file_name_of(&self.file).unwrap_or(DEFAULT_FILE).to_string()
    }
}

fn file_name_of(path: &Path) -> Option<&str> {
    path.file_name().and_then(|s| s.to_str())
}

fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}
