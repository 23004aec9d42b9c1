//! Server-rendered pages.
//!
//! # Data Flow
//! ```text
//! GET /books, /authors, ...
//!     → pages.rs (fetch through BookService, shape the context)
//!     → Views::render (minijinja, templates embedded at build time)
//!     → text/html response
//! ```
//!
//! Templates auto-escape because their names end in `.html`.

pub mod pages;

use minijinja::Environment;
use serde::Serialize;

pub use pages::routes;

const TEMPLATES: [(&str, &str); 6] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("book-table.html", include_str!("../../templates/book-table.html")),
    ("authors.html", include_str!("../../templates/authors.html")),
    ("years.html", include_str!("../../templates/years.html")),
    ("search-bar.html", include_str!("../../templates/search-bar.html")),
];

/// Compiled template set.
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render<C: Serialize>(&self, name: &str, context: C) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(context)
    }
}
