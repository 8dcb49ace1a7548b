// Entrypoint for the submission probe.
// - Logs go to stderr so stdout only carries the probe's own lines.
// - The probe swallows its failures; the process exits 0 unless stdout
//   itself cannot be written.

use clap::Parser;
use submit_probe::{config::ProbeConfig, probe::submit_job};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "submit_probe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ProbeConfig::parse();

    let stdout = std::io::stdout();
    submit_job(&config, &mut stdout.lock())?;
    Ok(())
}
