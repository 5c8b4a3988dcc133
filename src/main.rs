use std::error::Error;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use swimsmart_lib::commands::{self, MIN_SESSION_SECONDS};
use swimsmart_lib::models::SwimSegment;
use swimsmart_lib::simulator::SimulationBreakdown;
use swimsmart_lib::{initialize_db, logging, AppConfig, AppState, GeminiClient, RngSource, SimulatedSessionMetrics};

#[derive(Debug, Parser)]
#[command(name = "swimsmart", version, about = "Simulated swim metrics with AI coaching reports")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Simulate session metrics and print them as JSON
  Simulate {
    /// Segment as <stroke>:<seconds>, e.g. freestyle:600. Repeat for more segments.
    #[arg(short, long = "segment", required = true)]
    segments: Vec<SwimSegment>,

    /// Seed for reproducible metrics
    #[arg(long)]
    seed: Option<u64>,

    /// Include per-segment estimates and the average pace
    #[arg(long)]
    breakdown: bool,
  },

  /// Simulate a session, ask the coach for a report and store it
  Analyze {
    #[arg(short, long = "segment", required = true)]
    segments: Vec<SwimSegment>,

    /// Free-form notes about how the swim felt
    #[arg(short, long)]
    notes: Option<String>,

    #[arg(long)]
    seed: Option<u64>,
  },

  /// List stored reports, newest first
  History {
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    limit: u32,
  },

  /// Print a stored report as JSON
  Show { id: Uuid },

  /// Remove a stored report
  Delete { id: Uuid },
}

fn seeded_or_random(seed: Option<u64>) -> RngSource<rand::rngs::StdRng> {
  seed.map_or_else(RngSource::from_entropy, RngSource::seeded)
}

async fn open_state(config: AppConfig) -> Result<AppState, Box<dyn Error>> {
  let db = initialize_db(&config.db_path).await?;
  Ok(AppState { db, config })
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), Box<dyn Error>> {
  match cli.command {
    Command::Simulate { segments, seed, breakdown } => {
      let mut source = seeded_or_random(seed);
      if breakdown {
        let output = SimulationBreakdown::simulate(&segments, &mut source);
        println!("{}", serde_json::to_string_pretty(&output)?);
      } else {
        let metrics = SimulatedSessionMetrics::simulate(&segments, &mut source);
        println!("{}", serde_json::to_string_pretty(&metrics)?);
      }
    }

    Command::Analyze { segments, notes, seed } => {
      let client = GeminiClient::from_env()?;
      let state = open_state(config).await?;
      let mut source = seeded_or_random(seed);

      match commands::finish_session_with_source(&state, &client, segments, notes, &mut source).await? {
        Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
        None => println!("Session too short to analyze (minimum {MIN_SESSION_SECONDS} seconds)"),
      }
    }

    Command::History { limit } => {
      let state = open_state(config).await?;
      let entries = commands::get_history(&state, i64::from(limit)).await?;
      if entries.is_empty() {
        println!("No sessions recorded yet");
      }
      for entry in entries {
        println!("{}", entry.display_line());
      }
    }

    Command::Show { id } => {
      let state = open_state(config).await?;
      match commands::get_session_report(&state, id).await? {
        Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
        None => return Err(format!("No report found for session {id}").into()),
      }
    }

    Command::Delete { id } => {
      let state = open_state(config).await?;
      if commands::delete_session_report(&state, id).await? {
        println!("Deleted report {id}");
      } else {
        return Err(format!("No report found for session {id}").into());
      }
    }
  }

  Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let cli = Cli::parse();

  let config = match AppConfig::from_env() {
    Ok(config) => config,
    Err(e) => {
      eprintln!("Configuration error: {e}");
      return ExitCode::FAILURE;
    }
  };

  if let Err(e) = logging::init_logging(&config.log_level) {
    eprintln!("Failed to initialize logging: {e}");
  }

  match run(cli, config).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("Error: {e}");
      ExitCode::FAILURE
    }
  }
}
