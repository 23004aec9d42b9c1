//! Book records and the inputs that create or change them.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::books::error::BookError;

/// Flat string-valued request body, as sent by API clients.
pub type BookFields = HashMap<String, String>;

const REQUIRED_FIELDS: [&str; 3] = ["id", "title", "author"];

/// Store-assigned record handle. Never serialized to clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InternalHandle(String);

impl InternalHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InternalHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A book as stored in the inventory.
///
/// Serializes to the API shape `{id,title,author,pages,edition,year}`; the
/// handle is skipped. Optional attributes use the empty string for "unset".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookRecord {
    #[serde(skip)]
    pub handle: Option<InternalHandle>,
    pub id: String,
    pub title: String,
    pub author: String,
    pub pages: String,
    pub edition: String,
    pub year: String,
}

/// A validated creation request: required fields are present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub id: String,
    pub title: String,
    pub author: String,
    pub pages: String,
    pub edition: String,
    pub year: String,
}

impl NewBook {
    /// Validate raw request fields. Optional fields are taken verbatim and
    /// default to the empty string when absent.
    pub fn from_fields(fields: &BookFields) -> Result<Self, BookError> {
        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|key| fields.get(*key).map_or(true, |v| v.is_empty()))
            .collect();
        if !missing.is_empty() {
            return Err(BookError::Validation { missing: missing.join(", ") });
        }

        let take = |key: &str| fields.get(key).cloned().unwrap_or_default();
        Ok(Self {
            id: take("id"),
            title: take("title"),
            author: take("author"),
            pages: take("pages"),
            edition: take("edition"),
            year: take("year"),
        })
    }

    /// The record to hand to the store, before it has been assigned a handle.
    pub fn into_record(self) -> BookRecord {
        BookRecord {
            handle: None,
            id: self.id,
            title: self.title,
            author: self.author,
            pages: self.pages,
            edition: self.edition,
            year: self.year,
        }
    }
}

/// Sparse set of attribute overrides for an update.
///
/// Only keys that are present and non-empty become overrides, so a patch can
/// never blank an attribute. The external ID is not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub edition: Option<String>,
    pub pages: Option<String>,
    pub year: Option<String>,
}

impl BookPatch {
    pub fn from_fields(fields: &BookFields) -> Self {
        let pick = |key: &str| fields.get(key).filter(|v| !v.is_empty()).cloned();
        Self {
            title: pick("title"),
            author: pick("author"),
            edition: pick("edition"),
            pages: pick("pages"),
            year: pick("year"),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Produce a new snapshot with the overrides applied. `current` is left
    /// untouched.
    pub fn apply(&self, current: &BookRecord) -> BookRecord {
        let merge = |patch: &Option<String>, existing: &String| {
            patch.clone().unwrap_or_else(|| existing.clone())
        };
        BookRecord {
            handle: current.handle.clone(),
            id: current.id.clone(),
            title: merge(&self.title, &current.title),
            author: merge(&self.author, &current.author),
            pages: merge(&self.pages, &current.pages),
            edition: merge(&self.edition, &current.edition),
            year: merge(&self.year, &current.year),
        }
    }
}
