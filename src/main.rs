use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use navigator_rs::navigator::career::state::CareerFeatures;
use navigator_rs::navigator::server;
use navigator_rs::navigator::university::state::StudentProfile;
use navigator_rs::navigator::{route, Navigator, NavigatorConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show which pipeline a free-text request would go to
    Route {
        /// The request text
        text: String,
    },
    /// Start the university recommendation pipeline
    University {
        /// YAML file with the student profile
        #[arg(short, long)]
        profile: PathBuf,

        /// Session id (generated when omitted)
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Start the career recommendation pipeline
    Career {
        /// YAML file with the seven career features
        #[arg(short, long)]
        profile: PathBuf,

        /// Session id (generated when omitted)
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Answer the question a session is waiting on
    Resume {
        #[arg(short, long)]
        session: String,

        /// The answer; only "yes" counts as approval
        #[arg(short, long)]
        answer: String,
    },
    /// Show one pending session, or list all of them
    Status {
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Drop a session's pending checkpoint
    Abandon {
        #[arg(short, long)]
        session: String,
    },
    /// Run the HTTP API
    Serve {
        /// Port to listen on (defaults to NAVIGATOR_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

async fn read_yaml<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;
    let value = serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid YAML in {:?}", path))?;
    Ok(value)
}

fn session_or_new(session: Option<String>) -> String {
    session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    if let Commands::Route { text } = &args.command {
        match route(text) {
            Some(kind) => println!("{}", kind),
            None => println!("unrouted"),
        }
        return Ok(());
    }

    let config = NavigatorConfig::from_env()?;
    let navigator = Navigator::from_config(&config).await?;

    match args.command {
        Commands::Route { .. } => {}
        Commands::University { profile, session } => {
            let profile: StudentProfile = read_yaml(&profile).await?;
            let session = session_or_new(session);
            println!("Session: {}", session);
            let outcome = navigator.start_university(&session, profile).await?;
            print_json(&outcome)?;
        }
        Commands::Career { profile, session } => {
            let features: CareerFeatures = read_yaml(&profile).await?;
            let session = session_or_new(session);
            println!("Session: {}", session);
            let outcome = navigator.start_career(&session, features).await?;
            print_json(&outcome)?;
        }
        Commands::Resume { session, answer } => {
            let outcome = navigator.resume(&session, &answer).await?;
            print_json(&outcome)?;
        }
        Commands::Status { session: Some(session) } => match navigator.pending(&session).await? {
            Some(checkpoint) => print_json(&checkpoint)?,
            None => println!("No pending interrupt for session '{}'", session),
        },
        Commands::Status { session: None } => {
            for session in navigator.sessions().await? {
                println!("{}", session);
            }
        }
        Commands::Abandon { session } => {
            if navigator.abandon(&session).await? {
                println!("Abandoned session '{}'", session);
            } else {
                println!("No pending interrupt for session '{}'", session);
            }
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.port);
            server::serve(Arc::new(navigator), port).await?;
        }
    }

    Ok(())
}
