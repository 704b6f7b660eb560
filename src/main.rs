//! Command-line front end for the workout advisor
//!
//! Every subcommand prints its result as JSON on stdout; logs go to stderr.
//!
//! ```bash
//! workout-advisor seed
//! workout-advisor suggest --user alice
//! workout-advisor status --user alice
//! workout-advisor generate --parts quads hamstrings --training-type legs --max 4
//! workout-advisor validate "Leg Extension" "Leg Curl"
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use workout_advisor::commands::{advice, plans, seed_catalog};
use workout_advisor::models::MusclePart;
use workout_advisor::{init_tracing, AdvisorConfig, AppState};

#[derive(Parser)]
#[command(
  name = "workout-advisor",
  about = "Recovery-aware strength workout recommendations",
  version
)]
struct Cli {
  #[command(subcommand)]
  command: Command,

  /// Database URL override
  #[arg(long, global = true)]
  database_url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
  /// Load the built-in exercise catalog (skips exercises already present)
  Seed,

  /// Recommend the next workout for a user
  Suggest {
    #[arg(long)]
    user: String,
  },

  /// Show per-group recovery status for a user
  Status {
    #[arg(long)]
    user: String,
  },

  /// Build a plan for specific muscle parts (e.g. quads, middleChest)
  Generate {
    #[arg(long, num_args = 1.., required = true)]
    parts: Vec<MusclePart>,

    /// Label carried into the result
    #[arg(long, default_value = "custom")]
    training_type: String,

    /// Maximum number of exercises (defaults to ADVISOR_MAX_EXERCISES)
    #[arg(long)]
    max: Option<usize>,
  },

  /// Check a list of exercises for volume and antagonist balance
  Validate {
    #[arg(required = true)]
    exercises: Vec<String>,
  },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  dotenvy::dotenv().ok();

  let cli = Cli::parse();
  let mut config = AdvisorConfig::from_env().context("Invalid configuration")?;
  if let Some(url) = cli.database_url {
    config.database_url = url;
  }

  init_tracing(&config.log_filter);
  info!("Starting workout-advisor v{}", env!("CARGO_PKG_VERSION"));

  let state = AppState::connect(config)
    .await
    .context("Failed to open database")?;

  match cli.command {
    Command::Seed => print_json(&seed_catalog(&state).await)?,
    Command::Suggest { user } => print_json(&advice::suggest(&state, &user).await)?,
    Command::Status { user } => print_json(&advice::muscle_status(&state, &user).await)?,
    Command::Generate {
      parts,
      training_type,
      max,
    } => print_json(&plans::generate(&state, &parts, &training_type, max).await)?,
    Command::Validate { exercises } => print_json(&plans::validate(&state, &exercises).await)?,
  }

  state.store.pool().close().await;
  Ok(())
}
