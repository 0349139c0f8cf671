//! Classroom - coordinated classroom sessions
//!
//! One binary, three roles: the coordination server, door agents reporting
//! arriving students, and teacher agents voting to start or end the class.
//!
//! # Usage
//!
//! ```bash
//! classroom server --bind 127.0.0.1:5000
//! classroom door --server 127.0.0.1:5000
//! classroom teacher --server 127.0.0.1:5000 --name Alice
//! classroom status --server 127.0.0.1:5000
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use classroom_core::ClassroomCoordinator;
use classroom_net::{ClassroomClient, Server};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod door;
mod teacher;

use config::ClassroomConfig;
use door::DoorAgent;
use teacher::TeacherAgent;

/// Classroom coordination server and agents
#[derive(Parser, Debug)]
#[command(name = "classroom")]
#[command(version)]
struct Cli {
    /// Path to classroom.toml (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the coordination server
    Server {
        /// Address to bind to
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        /// Pending students required before voting can start
        #[arg(long)]
        start_threshold: Option<i64>,
    },

    /// Run a door agent
    Door {
        /// Server address
        #[arg(short, long)]
        server: Option<SocketAddr>,

        #[arg(long)]
        door_id: Option<i64>,
    },

    /// Run a teacher agent
    Teacher {
        /// Server address
        #[arg(short, long)]
        server: Option<SocketAddr>,

        /// Teacher name (random from config if omitted)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Print a snapshot of the classroom state
    Status {
        /// Server address
        #[arg(short, long)]
        server: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = ClassroomConfig::load(cli.config.as_deref())?;

    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let retry_pause = Duration::from_millis(config.retry_pause_ms);

    match cli.command {
        Command::Server {
            bind,
            start_threshold,
        } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(threshold) = start_threshold {
                config.server.start_threshold = threshold;
            }
            config.validate()?;
            run_server(&config).await?;
        }
        Command::Door { server, door_id } => {
            if let Some(server) = server {
                config.door.server = server;
            }
            if let Some(door_id) = door_id {
                config.door.door_id = door_id;
            }
            let agent = DoorAgent::new(config.door, StdRng::from_entropy());
            tokio::select! {
                _ = agent.run(retry_pause) => {}
                _ = tokio::signal::ctrl_c() => tracing::info!("Door shutting down"),
            }
        }
        Command::Teacher { server, name } => {
            if let Some(server) = server {
                config.teacher.server = server;
            }
            let agent = TeacherAgent::new(config.teacher, name, StdRng::from_entropy());
            tokio::select! {
                _ = agent.run(retry_pause) => {}
                _ = tokio::signal::ctrl_c() => tracing::info!("Teacher shutting down"),
            }
        }
        Command::Status { server } => {
            let addr = server.unwrap_or(config.server.bind);
            let mut client = ClassroomClient::connect(addr).await?;
            let snapshot = client.status().await?;
            tracing::info!(
                session_active = snapshot.session_active,
                student_count = snapshot.student_count,
                pending_students = snapshot.pending_students,
                start_threshold = snapshot.start_threshold,
                issued_ids = snapshot.issued_ids,
                start_votes = snapshot.start_votes,
                end_votes = snapshot.end_votes,
                last_transition = ?snapshot.last_transition,
                "Classroom status"
            );
        }
    }

    Ok(())
}

/// Serve until Ctrl-C
async fn run_server(config: &ClassroomConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        start_threshold = config.server.start_threshold,
        "Classroom server is about to start"
    );

    let coordinator = Arc::new(ClassroomCoordinator::new(config.server.start_threshold));
    let server = Server::start(config.server.bind, coordinator).await?;

    tracing::info!("Server listening on {}", server.addr());

    tokio::signal::ctrl_c().await?;
    server.shutdown();

    Ok(())
}
