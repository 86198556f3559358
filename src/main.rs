use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use zombiedisk::app::{self, RunOptions};
use zombiedisk::azure::DiskPager;
use zombiedisk::config::{Config, OutputFormat};
use zombiedisk::exit_codes::codes;
use zombiedisk::Result;

#[derive(Parser)]
#[command(name = "zombiedisk")]
#[command(
    about = "Find unattached Azure Managed Disks (zombies)",
    long_about = "zombiedisk lists every managed disk in a subscription, keeps the ones that are not attached to any VM, and estimates their monthly cost from size and a per-GB rate.\n\nAuthentication uses the default credential chain:\n  - AZURE_TENANT_ID / AZURE_CLIENT_ID / AZURE_CLIENT_SECRET\n  - Managed Identity\n  - Azure CLI login (az login)"
)]
#[command(version)]
struct Cli {
    /// Azure subscription ID to scan (GUID)
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
    subscription_id: String,

    /// Estimated $ per GB per month [default: 1.50, or report.rate_per_gb_month from config]
    #[arg(long)]
    rate: Option<f64>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format [default: text, or report.output from config]
    #[arg(long, value_enum)]
    output: Option<OutputFormat>,
}

fn init_logging(verbose: bool) {
    // RUST_LOG wins; otherwise only warnings and errors unless --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    // stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve settings and wire the Azure client; no network traffic yet
fn prepare(cli: &Cli) -> Result<(DiskPager, RunOptions)> {
    let config = Config::load(cli.config.as_deref())?;
    let options = RunOptions::resolve(cli.rate, cli.output, &config)?;
    let pager = app::open_listing(&cli.subscription_id, &config)?;
    Ok((pager, options))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (mut pager, options) = match prepare(&cli) {
        Ok(prepared) => prepared,
        Err(e) => {
            app::report_failure(&e, &mut std::io::stderr());
            return ExitCode::from(codes::FAILURE as u8);
        }
    };

    let code = app::execute(
        &mut pager,
        &options,
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .await;
    ExitCode::from(code as u8)
}
