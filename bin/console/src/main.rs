//! credit-office - operator console for the back-office session.
//!
//! Logs in, reports, and ends the session the back-office client keeps on
//! disk. Navigation requests are written to the log.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use credit_office_api::HttpClient;
use credit_office_auth::{AuthSessionManager, ExpiryStatus};
use credit_office_core::Result;
use credit_office_session::{
    AuthState, FileStore, LogNavigator, Role, SessionHandle, SessionStatus,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod config;
mod error;

use config::ConsoleConfig;
use error::ConsoleError;

/// credit-office - back-office session console
#[derive(Parser, Debug)]
#[command(name = "credit-office")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in to a workspace
    Login {
        /// Workspace to log in to (admin or institution)
        #[arg(long)]
        role: Role,

        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long, env = "CREDIT_OFFICE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Validate the stored session and show it
    Status,

    /// End the stored session
    Logout,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            let error = report.current_context();
            tracing::debug!(error = %error, "command failed");
            eprintln!("error: {}", error.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ConsoleError> {
    let config = ConsoleConfig::from_env().map_err(|e| ConsoleError::Configuration {
        details: e.to_string(),
    })?;
    let manager = open_manager(&config)?;

    let outcome = match cli.command {
        Commands::Login {
            role,
            email,
            password,
        } => login(&manager, role, &email, &password).await,
        Commands::Status => {
            let state = manager.bootstrap().await;
            println!("{}", describe(&state, manager.check_expiry()));
            Ok(())
        }
        Commands::Logout => {
            manager.logout();
            println!("Logged out.");
            Ok(())
        }
    };

    manager.unmount();
    outcome
}

fn open_manager(config: &ConsoleConfig) -> Result<AuthSessionManager, ConsoleError> {
    let store = FileStore::open(&config.store_path).map_err(|e| ConsoleError::Storage {
        path: config.store_path.clone(),
        details: e.to_string(),
    })?;
    let session = SessionHandle::new(Arc::new(store), Arc::new(LogNavigator));
    let client = HttpClient::from_config(&config.api, session)
        .map_err(|report| ConsoleError::Client(report.current_context().clone()))?;

    Ok(AuthSessionManager::new(client, config.session.clone()))
}

async fn login(
    manager: &AuthSessionManager,
    role: Role,
    email: &str,
    password: &str,
) -> Result<(), ConsoleError> {
    let user = manager
        .login(email, password, role)
        .await
        .map_err(|report| ConsoleError::Auth(report.current_context().clone()))?;

    println!("Logged in as {} <{}> ({role})", user.name(), user.email());
    if let Some(institution) = user.institution_name() {
        println!("Institution: {institution}");
    }
    Ok(())
}

/// Renders the session for the operator.
fn describe(state: &AuthState, expiry: ExpiryStatus) -> String {
    let session = match (state.status(), state.user.as_ref()) {
        (SessionStatus::Authenticated(role), Some(user)) => {
            format!("Signed in as {} <{}> ({role})", user.name(), user.email())
        }
        (SessionStatus::Validating, _) => "Session is being validated".to_string(),
        _ => "Not signed in".to_string(),
    };

    match expiry {
        ExpiryStatus::Valid { remaining } => {
            format!("{session}; expires in {} minutes", remaining.num_minutes())
        }
        ExpiryStatus::ExpiringSoon { remaining } => format!(
            "{session}; expires soon ({} seconds left)",
            remaining.num_seconds()
        ),
        ExpiryStatus::Expired => format!("{session}; session expired"),
        ExpiryStatus::NoSession => session,
    }
}
