/// Pulse Player Simulator - scripted playback and reel-scroll sessions
use clap::{Parser, Subcommand, ValueEnum};
use pulse_player_sim::{run_play, run_reels, PlayOptions, ReelOptions, SimConfig};
use pulse_playback::RepeatMode;
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pulse-player-sim")]
#[command(about = "Drive the Pulse media controller against a simulated browser", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./pulse-sim.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the whole report as one JSON document instead of event lines
    #[arg(long, global = true)]
    report: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the audio catalog as a queue until it runs out
    Play {
        /// Queue index to start from
        #[arg(short, long, default_value_t = 0)]
        start: usize,
        /// Repeat mode (overrides the configuration)
        #[arg(short, long, value_enum)]
        repeat: Option<RepeatArg>,
        /// Like every track once it starts
        #[arg(long)]
        like: bool,
    },
    /// Scroll through the reel feed
    Reels {
        /// Scroll offset per step, in reel heights
        #[arg(long)]
        step: Option<f64>,
        /// Open comments when this reel (0-based) becomes active
        #[arg(long)]
        comments_at: Option<usize>,
        /// Reels kept rendered on each side of the viewport
        #[arg(long, default_value_t = 2)]
        window: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RepeatArg {
    Off,
    All,
    One,
}

impl From<RepeatArg> for RepeatMode {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Off => RepeatMode::Off,
            RepeatArg::All => RepeatMode::All,
            RepeatArg::One => RepeatMode::One,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse_playback=info,pulse_player_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = SimConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Play {
            start,
            repeat,
            like,
        } => {
            let options = PlayOptions {
                start,
                repeat: repeat.map(RepeatMode::from),
                like_all: like,
            };
            let report = run_play(&config, &options)?;
            print_output(cli.report, &report, &report.events)?;
        }
        Commands::Reels {
            step,
            comments_at,
            window,
        } => {
            let options = ReelOptions {
                step,
                comments_at,
                window,
            };
            let report = run_reels(&config, &options)?;
            print_output(cli.report, &report, &report.events)?;
        }
    }

    Ok(())
}

/// Events go to stdout one JSON object per line; logs stay on stderr
fn print_output<R: Serialize, E: Serialize>(
    whole: bool,
    report: &R,
    events: &[E],
) -> anyhow::Result<()> {
    if whole {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        for event in events {
            println!("{}", serde_json::to_string(event)?);
        }
    }
    Ok(())
}
