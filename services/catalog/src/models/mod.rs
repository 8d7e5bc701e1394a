//! Catalog models for request and response payloads

pub mod movie;

pub use movie::{Movie, MovieInput, MovieListResponse, Pagination, SortField, SortOrder};
