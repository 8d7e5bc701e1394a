//! moviedb - command-line client for the movie catalog API
//!
//! Usage: moviedb <command>
//!
//! Reads `MOVIEDB_*` environment variables for the API location and keeps
//! the signed-in session under `MOVIEDB_SESSION_DIR`.

use std::sync::Arc;

use anyhow::{Context, Result};
use auth::AuthEndpoints;
use catalog::{SortField, SortOrder};
use clap::{Parser, Subcommand};
use common::{ApiClient, ClientConfig, FileStorage};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

use crate::commands::{App, MovieFields};

#[derive(Parser)]
#[command(name = "moviedb")]
#[command(about = "Browse and manage the movie catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the catalog one page at a time
    List {
        #[arg(long, default_value = "1")]
        page: u32,
        /// Movies per page (defaults to MOVIEDB_PAGE_SIZE)
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Search movies by title
    Search {
        query: String,
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// List movies sorted by a field
    Sort {
        /// title, year, rating or duration
        #[arg(long, default_value = "rating")]
        by: SortField,
        /// asc or desc
        #[arg(long, default_value = "desc")]
        order: SortOrder,
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Show one movie
    Show { id: String },

    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Add a movie (admin)
    Add {
        #[command(flatten)]
        fields: MovieFields,
    },

    /// Edit a movie, changing only the given fields (admin)
    Edit {
        id: String,
        #[command(flatten)]
        fields: MovieFields,
    },

    /// Delete a movie (admin)
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::from_env().context("Failed to load MOVIEDB_* configuration")?;
    debug!("Using API at {}", config.api_url);

    let client = ApiClient::new(&config)?;
    let storage = Arc::new(FileStorage::new(config.session_dir()));
    let app = App::new(
        client,
        storage,
        AuthEndpoints::from_config(&config),
        config.page_size,
    );
    info!("Session: {}", app.whoami());

    let output = match cli.command {
        Command::List { page, limit } => app.list(page, limit).await?,
        Command::Search { query, page } => app.search(&query, page).await?,
        Command::Sort { by, order, page } => app.sort(by, order, page).await?,
        Command::Show { id } => app.show(&id).await?,
        Command::Login { email, password } => app.login(&email, &password).await?,
        Command::Register {
            name,
            email,
            password,
        } => app.register(&name, &email, &password).await?,
        Command::Logout => app.logout(),
        Command::Whoami => app.whoami(),
        Command::Add { fields } => app.add(fields).await?,
        Command::Edit { id, fields } => app.edit(&id, fields).await?,
        Command::Delete { id } => app.delete(&id).await?,
    };

    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }

    Ok(())
}
