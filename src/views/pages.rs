//! Page handlers.

use std::collections::{BTreeMap, BTreeSet};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use minijinja::context;
use serde::{Deserialize, Serialize};

use crate::books::BookRecord;
use crate::http::response::ApiError;
use crate::http::server::AppState;

const UNKNOWN_YEAR: &str = "Unknown";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/books", get(books))
        .route("/authors", get(authors))
        .route("/years", get(years))
        .route("/search", get(search))
        .route("/create", get(create))
}

fn render<C: Serialize>(state: &AppState, name: &str, context: C) -> Result<Html<String>, ApiError> {
    state.views.render(name, context).map(Html).map_err(|err| {
        tracing::error!(template = name, error = %err, "Failed to render view");
        ApiError::render_failed()
    })
}

/// Query string of `/books`; `q` comes from the search page.
#[derive(Debug, Default, Deserialize)]
struct BookSearch {
    #[serde(default)]
    q: String,
}

/// Case-insensitive substring match on title, author or year. A blank query
/// matches everything.
fn matches_query(book: &BookRecord, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    [&book.title, &book.author, &book.year]
        .iter()
        .any(|value| value.to_lowercase().contains(&query))
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct YearGroup {
    year: String,
    titles: Vec<String>,
}

fn distinct_authors(books: &[BookRecord]) -> Vec<String> {
    books
        .iter()
        .map(|b| b.author.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn group_by_year(books: &[BookRecord]) -> Vec<YearGroup> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for book in books {
        let year = if book.year.is_empty() {
            UNKNOWN_YEAR.to_string()
        } else {
            book.year.clone()
        };
        groups.entry(year).or_default().push(book.title.clone());
    }
    groups
        .into_iter()
        .map(|(year, mut titles)| {
            titles.sort();
            YearGroup { year, titles }
        })
        .collect()
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    render(&state, "index.html", context! {})
}

async fn books(
    State(state): State<AppState>,
    Query(search): Query<BookSearch>,
) -> Result<Html<String>, ApiError> {
    let mut books = state.books.read_all().await?;
    books.retain(|book| matches_query(book, &search.q));
    render(
        &state,
        "book-table.html",
        context! { books => books, query => search.q.trim() },
    )
}

async fn authors(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let books = state.books.read_all().await?;
    render(&state, "authors.html", context! { authors => distinct_authors(&books) })
}

async fn years(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let books = state.books.read_all().await?;
    render(&state, "years.html", context! { years => group_by_year(&books) })
}

async fn search(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    render(&state, "search-bar.html", context! {})
}

async fn create() -> StatusCode {
    StatusCode::NO_CONTENT
}
