// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wardrobe CLI
//!
//! Drives the wardrobe backend from the command line using the same session
//! store and services as the app: the token survives between invocations.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wardrobe_client::{
    config::Config,
    error::ApiError,
    models::{MeasuresUpdate, RegisterRequest},
    AppState,
};

#[derive(Parser, Debug)]
#[command(name = "wardrobe", about = "Wardrobe backend client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current session
    Status,
    /// Log in and persist the session token
    Login {
        email: String,
        #[arg(long, env = "WARDROBE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the session token
    Logout,
    /// Create an account and log in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "WARDROBE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        sex: String,
        #[command(flatten)]
        measures: MeasuresArgs,
        #[arg(long)]
        try_on_photo_url: Option<String>,
    },
    /// Inventory operations
    Inventory {
        #[command(subcommand)]
        command: InventoryCommand,
    },
    /// Profile operations
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
}

#[derive(Subcommand, Debug)]
enum InventoryCommand {
    /// List inventory entries
    List,
    /// Remove a product from the inventory
    Remove { product_id: u64 },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Change the display name
    Username { name: String },
    /// Replace body measures (centimeters)
    Measures {
        #[command(flatten)]
        measures: MeasuresArgs,
    },
    /// Show the profile photo URL, or set it when a URL is given
    Photo { url: Option<String> },
}

#[derive(clap::Args, Debug)]
struct MeasuresArgs {
    #[arg(long)]
    height: f64,
    #[arg(long)]
    chest: f64,
    #[arg(long)]
    waist: f64,
    #[arg(long)]
    hips: f64,
}

impl From<MeasuresArgs> for MeasuresUpdate {
    fn from(m: MeasuresArgs) -> Self {
        MeasuresUpdate {
            height: m.height,
            chest: m.chest,
            waist: m.waist,
            hips: m.hips,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    tracing::debug!(api_url = %config.api_url, "Starting wardrobe client");

    let state = AppState::with_file_store(config)?;
    state.session.initialize().await;

    match run(&state, cli.command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            if e.is_auth_failure() {
                eprintln!("Session expired, please log in again");
            }
            eprintln!("Error: {}", e.user_message());
            std::process::exit(1);
        }
    }
}

async fn run(state: &AppState, command: Command) -> Result<serde_json::Value, ApiError> {
    match command {
        Command::Status => Ok(json!({
            "status": format!("{:?}", state.session.status()),
            "user": state.session.user(),
        })),
        Command::Login { email, password } => {
            state.auth.login(&email, &password).await?;
            Ok(json!({ "status": "authenticated", "user": state.session.user() }))
        }
        Command::Logout => {
            state.auth.logout().await;
            Ok(json!({ "status": "anonymous" }))
        }
        Command::Register {
            name,
            email,
            password,
            sex,
            measures,
            try_on_photo_url,
        } => {
            let request = RegisterRequest {
                name,
                email,
                password,
                sex,
                height: measures.height,
                chest: measures.chest,
                waist: measures.waist,
                hips: measures.hips,
                try_on_photo_url,
            };
            state.auth.register_and_login(&request).await?;
            Ok(json!({ "status": "authenticated", "user": state.session.user() }))
        }
        Command::Inventory { command } => match command {
            InventoryCommand::List => Ok(json!(state.inventory.list().await?)),
            InventoryCommand::Remove { product_id } => {
                state.inventory.remove(product_id).await?;
                Ok(json!({ "removed": product_id }))
            }
        },
        Command::Profile { command } => match command {
            ProfileCommand::Username { name } => {
                let saved = state.account.update_username(&name).await?;
                Ok(json!({ "name": saved }))
            }
            ProfileCommand::Measures { measures } => {
                state.account.update_measures(measures.into()).await?;
                Ok(json!({ "user": state.session.user() }))
            }
            ProfileCommand::Photo { url: Some(url) } => {
                state.account.update_profile_photo(&url).await?;
                Ok(json!({ "profilePhotoUrl": url }))
            }
            ProfileCommand::Photo { url: None } => {
                let url = state.account.profile_photo().await?;
                Ok(json!({ "profilePhotoUrl": url }))
            }
        },
    }
}

/// Initialize structured JSON logging on stderr.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wardrobe_client=info,warn"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
