//! Movie form parsing
//!
//! Admin pages collect movie fields as raw text. [`MovieForm::parse`] is the
//! only way from that text to a [`MovieInput`]: numbers are parsed and range
//! checked, list fields are split on commas.

use crate::error::FormError;
use crate::models::{Movie, MovieInput};

/// Raw text of the add/edit movie form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieForm {
    pub title: String,
    pub year: String,
    pub rating: String,
    pub duration: String,
    pub description: String,
    pub director: String,
    pub poster: String,
    /// Comma-separated
    pub genres: String,
    /// Comma-separated
    pub cast: String,
}

impl MovieForm {
    /// Pre-fill the form from an existing movie
    pub fn from_movie(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            year: movie.year.to_string(),
            rating: movie.rating.to_string(),
            duration: movie.duration.to_string(),
            description: movie.description.clone(),
            director: movie.director.clone().unwrap_or_default(),
            poster: movie.poster.clone().unwrap_or_default(),
            genres: movie.genres.join(", "),
            cast: movie.cast.join(", "),
        }
    }

    /// Validate the form and build the write payload
    pub fn parse(&self) -> Result<MovieInput, FormError> {
        let title = required("title", &self.title)?;
        let year: i32 = number("year", &self.year)?;
        let rating: f64 = number("rating", &self.rating)?;
        let duration: u32 = number("duration", &self.duration)?;
        let description = required("description", &self.description)?;

        if year < 1 {
            return Err(FormError::OutOfRange {
                field: "year",
                expected: "a positive year",
            });
        }
        // "NaN" and "inf" parse as f64
        if !rating.is_finite() || !(0.0..=10.0).contains(&rating) {
            return Err(FormError::OutOfRange {
                field: "rating",
                expected: "between 0 and 10",
            });
        }
        if duration == 0 {
            return Err(FormError::OutOfRange {
                field: "duration",
                expected: "at least 1 minute",
            });
        }

        Ok(MovieInput {
            title,
            year,
            rating,
            duration,
            description,
            director: optional(&self.director),
            poster: optional(&self.poster),
            genres: split_list(&self.genres),
            cast: split_list(&self.cast),
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::Missing(field));
    }
    Ok(value.to_string())
}

fn number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FormError::Missing(field));
    }
    trimmed.parse().map_err(|_| FormError::NotANumber {
        field,
        value: trimmed.to_string(),
    })
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Split a comma-separated field, dropping blanks
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
