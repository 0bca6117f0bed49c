use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use footswitch_core::midi::output::list_output_ports;
use footswitch_core::runtime::CLIENT_NAME;
use footswitch_core::RuntimeManager;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Footswitch controller runtime")]
struct Args {
    /// YAML profile or compiled `.bindings` table
    #[arg(default_value = "profiles/qc_mini6.yaml")]
    profile: PathBuf,
    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
    /// Print visible MIDI output ports and exit
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if args.list_ports {
        for name in list_output_ports(CLIENT_NAME)? {
            println!("{name}");
        }
        return Ok(());
    }

    let mut manager = RuntimeManager::initialize(args.profile.clone())
        .with_context(|| format!("failed to start with {}", args.profile.display()))?;
    manager
        .run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!("ctrl-c handler failed: {err}");
            }
        })
        .await;
    manager.shutdown();
    info!("shut down");
    Ok(())
}
