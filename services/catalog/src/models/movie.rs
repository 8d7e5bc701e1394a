//! Movie models for the catalog store

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Movie record as served by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub year: i32,
    /// 0 to 10
    pub rating: f64,
    /// Minutes
    pub duration: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub cast: Vec<String>,
}

/// Payload for creating or replacing a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieInput {
    pub title: String,
    pub year: i32,
    pub rating: f64,
    pub duration: u32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    pub genres: Vec<String>,
    pub cast: Vec<String>,
}

impl From<&Movie> for MovieInput {
    fn from(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            year: movie.year,
            rating: movie.rating,
            duration: movie.duration,
            description: movie.description.clone(),
            director: movie.director.clone(),
            poster: movie.poster.clone(),
            genres: movie.genres.clone(),
            cast: movie.cast.clone(),
        }
    }
}

/// Response for movie listings with pagination
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieListResponse {
    pub movies: Vec<Movie>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_movies: u64,
}

/// Pagination metadata of the current catalog page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_items: 0,
        }
    }
}

impl Pagination {
    /// Normalise server metadata: at least one page, current page within range
    pub fn from_response(response: &MovieListResponse) -> Self {
        let total_pages = response.total_pages.max(1);
        Self {
            current_page: response.current_page.clamp(1, total_pages),
            total_pages,
            total_items: response.total_movies,
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

/// Field the server sorts by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Title,
    Year,
    #[default]
    Rating,
    Duration,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Year => "year",
            SortField::Rating => "rating",
            SortField::Duration => "duration",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "year" => Ok(SortField::Year),
            "rating" => Ok(SortField::Rating),
            "duration" => Ok(SortField::Duration),
            other => Err(format!(
                "unknown sort field {other}; expected title, year, rating or duration"
            )),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order {other}; expected asc or desc")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_movie_accepts_server_shape() {
        let movie: Movie = serde_json::from_value(json!({
            "_id": "m1",
            "title": "Dune",
            "year": 2021,
            "rating": 8.0,
            "duration": 155,
            "description": "Spice.",
            "genres": ["Sci-Fi", "Adventure"],
            "cast": ["Timothée Chalamet"],
            "__v": 0
        }))
        .expect("valid movie");

        assert_eq!(movie.id, "m1");
        assert_eq!(movie.director, None);
        assert_eq!(movie.genres, vec!["Sci-Fi", "Adventure"]);
    }

    #[test]
    fn test_input_omits_absent_optionals() {
        let input = MovieInput {
            title: "Dune".to_string(),
            year: 2021,
            rating: 8.0,
            duration: 155,
            description: "Spice.".to_string(),
            director: None,
            poster: Some("https://img.example.com/dune.jpg".to_string()),
            genres: vec![],
            cast: vec![],
        };
        let value = serde_json::to_value(&input).expect("serializable");
        assert!(value.get("director").is_none());
        assert_eq!(value["poster"], "https://img.example.com/dune.jpg");
    }

    #[test]
    fn test_pagination_is_normalised() {
        let response = MovieListResponse {
            movies: vec![],
            current_page: 1,
            total_pages: 0,
            total_movies: 0,
        };
        assert_eq!(Pagination::from_response(&response), Pagination::default());

        let response = MovieListResponse {
            movies: vec![],
            current_page: 9,
            total_pages: 4,
            total_movies: 40,
        };
        let pagination = Pagination::from_response(&response);
        assert_eq!(pagination.current_page, 4);
        assert!(!pagination.has_next());
        assert!(pagination.has_previous());
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("Rating".parse::<SortField>(), Ok(SortField::Rating));
        assert!("budget".parse::<SortField>().is_err());
        assert_eq!("ASC".parse::<SortOrder>(), Ok(SortOrder::Asc));
        assert_eq!(SortOrder::default(), SortOrder::Desc);
    }
}
