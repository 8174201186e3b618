/// Cadence Demo - scripted playback sessions on a simulated platform
use cadence_demo::{session, DemoConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence-demo")]
#[command(about = "Drive the Cadence player control core through a scripted session", long_about = None)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, env = "CADENCE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one source through focus changes and host backgrounding
    Play {
        /// Override the configured media URI
        #[arg(short, long)]
        uri: Option<String>,

        /// Override the configured playback rate
        #[arg(short, long)]
        rate: Option<f64>,
    },
    /// Fire several overlapping sounds through the sound registry
    Sounds {
        /// Number of sounds
        #[arg(short = 'n', long, default_value_t = 3)]
        count: usize,
    },
    /// Print the effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence_playback=debug,cadence_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = DemoConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Play { uri, rate } => {
            if let Some(uri) = uri {
                config.session.uri = uri;
            }
            if let Some(rate) = rate {
                config.session.rate = rate;
            }
            config.validate()?;

            let summary = session::run_player_session(&config).await?;
            if !summary.errors.is_empty() {
                anyhow::bail!("player reported errors: {}", summary.errors.join("; "));
            }
        }
        Commands::Sounds { count } => {
            config.validate()?;
            let finished = session::run_sounds_session(&config, count).await?;
            tracing::info!("{} of {} sound(s) finished", finished, count);
        }
        Commands::ShowConfig => {
            config.validate()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
