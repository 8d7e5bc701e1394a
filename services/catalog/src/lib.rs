//! Catalog store for the MovieDB client
//!
//! Holds the current page of movies with its loading status and pagination,
//! and forwards create/update/delete to the API with the session's token.

pub mod error;
pub mod form;
pub mod models;
pub mod store;

pub use error::{CatalogError, CatalogResult, FormError};
pub use form::MovieForm;
pub use models::{Movie, MovieInput, MovieListResponse, Pagination, SortField, SortOrder};
pub use store::{CatalogState, CatalogStore, LoadStatus};
