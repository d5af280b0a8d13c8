use std::{env, sync::Arc};

use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use url::Url;

use breakeven_core::{
    AllowList, ExportGate, ExportQuotaTracker, FileStore, GlobalOpts, KeyStore,
    LicenseValidator, messages::EXPORT_LIMIT_CTA, share,
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[clap(flatten)]
    global_opts: GlobalOpts,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage the Pro license key
    License(LicenseCommand),

    /// Inspect or record export quota usage
    Export(ExportCommand),

    /// Build a shareable calculator link
    Share(ShareCommand),
}

#[derive(Debug, Args)]
struct LicenseCommand {
    #[command(subcommand)]
    subcommand: LicenseCommands,
}

#[derive(Debug, Subcommand)]
enum LicenseCommands {
    /// Store and validate a license key
    Activate { key: String },

    /// Show the stored key and its validity
    Status,

    /// Remove the stored key
    Clear,
}

#[derive(Debug, Args)]
struct ExportCommand {
    #[command(subcommand)]
    subcommand: ExportCommands,
}

#[derive(Debug, Subcommand)]
enum ExportCommands {
    /// Show export quota usage for the current month
    Status,

    /// Run one export attempt through the quota gate
    Record,
}

#[derive(Debug, Args)]
struct ShareCommand {
    /// Base calculator URL
    base: Url,

    /// Query parameters as key=value pairs
    #[arg(value_name = "KEY=VALUE")]
    params: Vec<String>,
}

fn setup_logging() {
    use std::io::IsTerminal;
    use tracing_subscriber::{
        filter::{EnvFilter, LevelFilter},
        fmt,
    };

    let color = std::io::stdout().is_terminal()
        && (match env::var("COLORTERM") {
            Ok(value) => value == "truecolor" || value == "24bit",
            _ => false,
        } || match env::var("TERM") {
            Ok(value) => value == "direct" || value == "truecolor",
            _ => false,
        });

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    fmt()
        .with_env_filter(env_filter)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(color)
        .init();
}

fn build_core(opts: &GlobalOpts) -> anyhow::Result<(Arc<LicenseValidator>, ExportQuotaTracker)> {
    let storage = Arc::new(FileStore::open(opts.store_path()?));
    let allow_list = Arc::new(AllowList::new(opts.allowlist_endpoint.clone()));

    let validator = Arc::new(
        LicenseValidator::new(KeyStore::new(storage.clone()), allow_list)
            .with_force_pro(opts.pro_enabled),
    );
    let quota = ExportQuotaTracker::new(storage);

    Ok((validator, quota))
}

async fn handle_license_command(
    command: LicenseCommands,
    validator: &LicenseValidator,
) -> anyhow::Result<()> {
    match command {
        LicenseCommands::Activate { key } => {
            let normalized = LicenseValidator::normalize(&key);

            if !LicenseValidator::matches_format(&normalized) {
                bail!("Invalid license key format; expected BE-XXXX-XXXX");
            }

            validator.set_key(&key);

            if validator.is_valid(Some(&key)).await {
                println!("License activated: Pro features unlocked");
            } else {
                println!("License key not recognized");
            }
        }
        LicenseCommands::Status => {
            println!("Pro (cached): {}", validator.is_valid_cached());
            println!("Pro (checked): {}", validator.is_pro().await);
        }
        LicenseCommands::Clear => {
            validator.clear_key().await;
            println!("License key cleared");
        }
    }

    Ok(())
}

async fn handle_export_command(
    command: ExportCommands,
    validator: Arc<LicenseValidator>,
    quota: ExportQuotaTracker,
) -> anyhow::Result<()> {
    match command {
        ExportCommands::Status => {
            if validator.is_pro().await {
                println!("Pro: unlimited exports");
            } else {
                println!(
                    "Exports used this month: {} ({} remaining)",
                    quota.count(),
                    quota.remaining()
                );
            }
        }
        ExportCommands::Record => {
            let gate = ExportGate::new(validator, quota);
            let outcome = gate.begin_export();

            if outcome.blocked {
                println!("{EXPORT_LIMIT_CTA}");
                bail!("Export blocked: monthly limit reached");
            }

            println!("Export recorded ({} remaining this month)", gate.remaining());
        }
    }

    Ok(())
}

fn handle_share_command(command: ShareCommand) -> anyhow::Result<()> {
    let mut params = Vec::with_capacity(command.params.len());

    for pair in &command.params {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid parameter {pair:?}; expected KEY=VALUE");
        };

        params.push((key, value));
    }

    println!("{}", share::shareable_url(&command.base, params));

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Cli::parse();

    setup_logging();

    match opts.command {
        Commands::License(license_command) => {
            let (validator, _) = build_core(&opts.global_opts)?;
            handle_license_command(license_command.subcommand, &validator).await?;
        }
        Commands::Export(export_command) => {
            let (validator, quota) = build_core(&opts.global_opts)?;
            handle_export_command(export_command.subcommand, validator, quota).await?;
        }
        Commands::Share(share_command) => {
            handle_share_command(share_command)?;
        }
    }

    Ok(())
}
