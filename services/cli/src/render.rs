//! Plain-text rendering of catalog and session state

use auth::SessionState;
use catalog::{CatalogState, LoadStatus, Movie};

/// One line per movie, then a pagination footer
pub fn catalog_page(state: &CatalogState) -> String {
    let mut out = String::new();

    if state.items.is_empty() {
        out.push_str("No movies found.\n");
    }
    for movie in &state.items {
        out.push_str(&movie_row(movie));
        out.push('\n');
    }

    let pagination = &state.pagination;
    out.push_str(&format!(
        "Page {} of {} ({} movies)",
        pagination.current_page, pagination.total_pages, pagination.total_items
    ));
    if pagination.has_next() {
        out.push_str(&format!(", next: --page {}", pagination.current_page + 1));
    }
    out.push('\n');

    if state.status == LoadStatus::Error {
        if let Some(message) = &state.last_error {
            out.push_str(&format!("Error: {message}\n"));
        }
    }
    out
}

pub fn movie_row(movie: &Movie) -> String {
    format!(
        "{:<26} {:<40} {:>4}  {:>4.1}  {:>3} min",
        movie.id,
        truncate(&movie.title, 40),
        movie.year,
        movie.rating,
        movie.duration
    )
}

/// Full details of one movie
pub fn movie_detail(movie: &Movie) -> String {
    let mut out = format!(
        "{} ({})\nRating: {:.1}/10  Duration: {} min\n",
        movie.title, movie.year, movie.rating, movie.duration
    );
    if let Some(director) = &movie.director {
        out.push_str(&format!("Director: {director}\n"));
    }
    if !movie.genres.is_empty() {
        out.push_str(&format!("Genres: {}\n", movie.genres.join(", ")));
    }
    if !movie.cast.is_empty() {
        out.push_str(&format!("Cast: {}\n", movie.cast.join(", ")));
    }
    if let Some(poster) = &movie.poster {
        out.push_str(&format!("Poster: {poster}\n"));
    }
    out.push('\n');
    out.push_str(&movie.description);
    out.push('\n');
    out
}

pub fn whoami(state: &SessionState) -> String {
    match state.user() {
        Some(user) => format!(
            "{} <{}> role: {}{}",
            user.name,
            user.email,
            user.role,
            if user.is_admin() { " (admin)" } else { "" }
        ),
        None => "Not signed in".to_string(),
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
