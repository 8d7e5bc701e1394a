//! Catalog store: the current page of movies and the operations that change it
//!
//! Listings replace the page wholesale. Mutations go straight to the server
//! and never patch local items; callers re-fetch to observe them. Concurrent
//! listings on one store are not sequenced: whichever response arrives last
//! overwrites the page, regardless of the order the calls were made in.

use std::sync::Arc;

use common::{ApiClient, ApiRequest, CredentialSource, Method};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{
    error::{CatalogError, CatalogResult},
    models::{Movie, MovieInput, MovieListResponse, Pagination, SortField, SortOrder},
};

const MOVIES_PATH: &str = "/movies";

/// Loading status of the catalog page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Error,
}

/// Snapshot of the catalog page published to subscribers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub items: Vec<Movie>,
    pub status: LoadStatus,
    pub pagination: Pagination,
    /// Message of the most recent failed listing
    pub last_error: Option<String>,
}

impl CatalogState {
    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }
}

/// Store for the catalog listing and movie mutations
pub struct CatalogStore {
    client: ApiClient,
    credentials: Arc<dyn CredentialSource>,
    page_size: u32,
    state: watch::Sender<CatalogState>,
}

impl CatalogStore {
    /// Create a new catalog store
    ///
    /// `credentials` supplies the bearer token for mutations and is told when
    /// the server rejects it.
    pub fn new(client: ApiClient, credentials: Arc<dyn CredentialSource>, page_size: u32) -> Self {
        let (state, _) = watch::channel(CatalogState::default());
        Self {
            client,
            credentials,
            page_size: page_size.max(1),
            state,
        }
    }

    /// Subscribe to catalog changes
    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    /// Current state
    pub fn snapshot(&self) -> CatalogState {
        self.state.borrow().clone()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// List the whole catalog, `limit` movies per page
    pub async fn fetch_page(&self, page: u32, limit: u32) -> CatalogResult<()> {
        let request = ApiRequest::get(MOVIES_PATH)
            .query("page", page)
            .query("limit", limit);
        self.load(request, Some(limit), "Failed to fetch movies")
            .await
    }

    /// List the catalog with the configured page size
    pub async fn fetch_default(&self, page: u32) -> CatalogResult<()> {
        self.fetch_page(page, self.page_size).await
    }

    /// Filtered listing. The query is passed through as given.
    pub async fn search(&self, query: &str, page: u32) -> CatalogResult<()> {
        let request = ApiRequest::get(format!("{MOVIES_PATH}/search"))
            .query("query", query)
            .query("page", page);
        self.load(request, None, "Failed to search movies").await
    }

    /// Server-side sorted listing
    pub async fn sort(&self, field: SortField, order: SortOrder, page: u32) -> CatalogResult<()> {
        let request = ApiRequest::get(format!("{MOVIES_PATH}/sorted"))
            .query("sortBy", field)
            .query("order", order)
            .query("page", page);
        self.load(request, None, "Failed to sort movies").await
    }

    /// Fetch one movie. The page state is not touched.
    pub async fn get(&self, id: &str) -> CatalogResult<Movie> {
        self.client
            .fetch(movie_request(Method::GET, id))
            .await
            .map_err(|e| {
                error!("Error fetching movie {}: {}", id, e);
                CatalogError::new(e, "Failed to load movie")
            })
    }

    /// Create a movie. Re-fetch to see it in the listing.
    pub async fn create(&self, movie: &MovieInput) -> CatalogResult<()> {
        let request = ApiRequest::post(MOVIES_PATH)
            .json(movie)
            .map_err(|e| CatalogError::new(e, "Failed to add movie"))?;
        self.mutate(request, "Failed to add movie").await?;
        info!("Added movie {}", movie.title);
        Ok(())
    }

    /// Replace a movie. Local items are not patched.
    pub async fn update(&self, id: &str, movie: &MovieInput) -> CatalogResult<()> {
        let request = movie_request(Method::PUT, id)
            .json(movie)
            .map_err(|e| CatalogError::new(e, "Failed to update movie"))?;
        self.mutate(request, "Failed to update movie").await?;
        info!("Updated movie {}", id);
        Ok(())
    }

    /// Delete a movie. Local items are not pruned.
    pub async fn delete(&self, id: &str) -> CatalogResult<()> {
        self.mutate(movie_request(Method::DELETE, id), "Failed to delete movie")
            .await?;
        info!("Deleted movie {}", id);
        Ok(())
    }

    async fn load(
        &self,
        request: ApiRequest,
        limit: Option<u32>,
        fallback: &str,
    ) -> CatalogResult<()> {
        self.state.send_modify(|state| state.status = LoadStatus::Loading);
        debug!("Loading catalog page: {:?}", request);

        let guard = LoadingGuard::new(&self.state);
        let result = self.client.fetch::<MovieListResponse>(request).await;
        guard.disarm();

        match result {
            Ok(response) => {
                let pagination = Pagination::from_response(&response);
                let mut items = response.movies;
                if let Some(limit) = limit {
                    let limit = limit as usize;
                    if items.len() > limit {
                        warn!(
                            "Server returned {} movies for a page of {}; truncating",
                            items.len(),
                            limit
                        );
                        items.truncate(limit);
                    }
                }

                self.state.send_modify(|state| {
                    state.items = items;
                    state.pagination = pagination;
                    state.status = LoadStatus::Idle;
                    state.last_error = None;
                });
                Ok(())
            }
            Err(e) => {
                error!("Error loading movies: {}", e);
                let err = CatalogError::new(e, fallback);
                let message = err.message().to_string();
                self.state.send_modify(|state| {
                    state.status = LoadStatus::Error;
                    state.last_error = Some(message);
                });
                Err(err)
            }
        }
    }

    async fn mutate(&self, request: ApiRequest, fallback: &str) -> CatalogResult<()> {
        let token = self.credentials.bearer_token();
        let authenticated = token.is_some();

        match self.client.request(request.bearer(token)).await {
            Ok(_) => Ok(()),
            Err(e) => {
                if authenticated && e.is_unauthorized() {
                    self.credentials.invalidate();
                }
                error!("{}: {}", fallback, e);
                Err(CatalogError::new(e, fallback))
            }
        }
    }
}

/// Request for one movie; the id is encoded as a single path segment
fn movie_request(method: Method, id: &str) -> ApiRequest {
    ApiRequest::new(method, MOVIES_PATH).segment(id)
}

/// Clears `Loading` when a listing's future is dropped before the response
/// arrives, e.g. under a caller's timeout
struct LoadingGuard<'a> {
    state: &'a watch::Sender<CatalogState>,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(state: &'a watch::Sender<CatalogState>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let reset = self.state.send_if_modified(|state| {
            let loading = state.is_loading();
            if loading {
                state.status = LoadStatus::Idle;
            }
            loading
        });
        if reset {
            warn!("Catalog listing cancelled before completion");
        }
    }
}
