//! Subcommand handlers
//!
//! Each handler runs one store operation and returns the text to print.

use std::sync::Arc;

use anyhow::{Result, bail};
use auth::{AuthEndpoints, GuardDecision, SessionStore};
use catalog::{CatalogStore, MovieForm, SortField, SortOrder};
use clap::Args;
use common::{ApiClient, Storage};
use tracing::{info, warn};

use crate::render;

/// Listing re-fetched after an admin mutation
const ADMIN_REFRESH_LIMIT: u32 = 100;

/// Movie fields accepted by `add` and `edit`
#[derive(Args, Debug, Clone, Default)]
pub struct MovieFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub year: Option<String>,
    #[arg(long)]
    pub rating: Option<String>,
    /// Minutes
    #[arg(long)]
    pub duration: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub director: Option<String>,
    #[arg(long)]
    pub poster: Option<String>,
    /// Comma-separated
    #[arg(long)]
    pub genres: Option<String>,
    /// Comma-separated
    #[arg(long)]
    pub cast: Option<String>,
}

impl MovieFields {
    /// Overwrite the form fields that were given
    pub fn apply_to(self, mut form: MovieForm) -> MovieForm {
        let pairs = [
            (self.title, &mut form.title),
            (self.year, &mut form.year),
            (self.rating, &mut form.rating),
            (self.duration, &mut form.duration),
            (self.description, &mut form.description),
            (self.director, &mut form.director),
            (self.poster, &mut form.poster),
            (self.genres, &mut form.genres),
            (self.cast, &mut form.cast),
        ];
        for (value, field) in pairs {
            if let Some(value) = value {
                *field = value;
            }
        }
        form
    }
}

/// Session and catalog stores shared by every subcommand
pub struct App {
    session: Arc<SessionStore>,
    catalog: CatalogStore,
}

impl App {
    pub fn new(
        client: ApiClient,
        storage: Arc<dyn Storage>,
        endpoints: AuthEndpoints,
        page_size: u32,
    ) -> Self {
        let session = Arc::new(SessionStore::new(client.clone(), storage, endpoints));
        let catalog = CatalogStore::new(client, session.clone(), page_size);
        Self { session, catalog }
    }

    pub async fn list(&self, page: u32, limit: Option<u32>) -> Result<String> {
        let limit = limit.unwrap_or(self.catalog.page_size());
        self.catalog.fetch_page(page, limit).await?;
        Ok(render::catalog_page(&self.catalog.snapshot()))
    }

    pub async fn search(&self, query: &str, page: u32) -> Result<String> {
        self.catalog.search(query, page).await?;
        Ok(render::catalog_page(&self.catalog.snapshot()))
    }

    pub async fn sort(&self, field: SortField, order: SortOrder, page: u32) -> Result<String> {
        self.catalog.sort(field, order, page).await?;
        Ok(render::catalog_page(&self.catalog.snapshot()))
    }

    pub async fn show(&self, id: &str) -> Result<String> {
        let movie = self.catalog.get(id).await?;
        Ok(render::movie_detail(&movie))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        self.session.login(email, password).await?;
        Ok(format!("Signed in. {}", render::whoami(&self.session.snapshot())))
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<String> {
        self.session.register(name, email, password).await?;
        Ok(format!(
            "Account created. {}",
            render::whoami(&self.session.snapshot())
        ))
    }

    pub fn logout(&self) -> String {
        self.session.logout();
        "Signed out".to_string()
    }

    pub fn whoami(&self) -> String {
        render::whoami(&self.session.snapshot())
    }

    pub async fn add(&self, fields: MovieFields) -> Result<String> {
        self.require_admin()?;
        let input = fields.apply_to(MovieForm::default()).parse()?;
        self.catalog.create(&input).await?;
        self.refresh().await;
        Ok(format!("Added \"{}\"", input.title))
    }

    pub async fn edit(&self, id: &str, fields: MovieFields) -> Result<String> {
        self.require_admin()?;
        let current = self.catalog.get(id).await?;
        let input = fields.apply_to(MovieForm::from_movie(&current)).parse()?;
        self.catalog.update(id, &input).await?;
        self.refresh().await;
        Ok(format!("Updated \"{}\"", input.title))
    }

    pub async fn delete(&self, id: &str) -> Result<String> {
        self.require_admin()?;
        self.catalog.delete(id).await?;
        self.refresh().await;
        Ok(format!("Deleted {id}"))
    }

    fn require_admin(&self) -> Result<()> {
        match self.session.guard(true) {
            GuardDecision::Render => Ok(()),
            GuardDecision::Pending => bail!("Session is still loading"),
            GuardDecision::RedirectToLogin => bail!("Sign in first (moviedb login)"),
            GuardDecision::RedirectToHome => bail!("Admin access required"),
        }
    }

    /// Mutations never patch the local page, so pull the listing again
    async fn refresh(&self) {
        match self.catalog.fetch_page(1, ADMIN_REFRESH_LIMIT).await {
            Ok(()) => info!(
                "Catalog refreshed: {} movies",
                self.catalog.snapshot().pagination.total_items
            ),
            Err(e) => warn!("Catalog refresh failed: {}", e),
        }
    }
}
