//! Sample records loaded at startup.

use crate::books::{BookError, BookFields, BookResult, BookService};

const EXAMPLES: [[(&str, &str); 6]; 3] = [
    [
        ("id", "example1"),
        ("title", "The Vortex"),
        ("author", "José Eustasio Rivera"),
        ("edition", "958-30-0804-4"),
        ("pages", "292"),
        ("year", "1924"),
    ],
    [
        ("id", "example2"),
        ("title", "Frankenstein"),
        ("author", "Mary Shelley"),
        ("edition", "978-3-649-64609-9"),
        ("pages", "280"),
        ("year", "1818"),
    ],
    [
        ("id", "example3"),
        ("title", "The Black Cat"),
        ("author", "Edgar Allan Poe"),
        ("edition", "978-3-99168-238-7"),
        ("pages", "280"),
        ("year", "1843"),
    ],
];

/// Create the sample books that are not present yet. Returns how many were
/// inserted.
pub async fn seed_examples(books: &BookService) -> BookResult<usize> {
    let mut inserted = 0;
    for example in EXAMPLES {
        let fields: BookFields = example
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        match books.create(&fields).await {
            Ok(record) => {
                tracing::debug!(id = %record.id, "Seeded example book");
                inserted += 1;
            }
            Err(BookError::Conflict { id }) => {
                tracing::debug!(id = %id, "Example book already present");
            }
            Err(err) => return Err(err),
        }
    }
    tracing::info!(inserted, "Example books seeded");
    Ok(inserted)
}
