//! JSON-backed list columns shared by several tables.
//!
//! SQLite has no array type, so tag sets and id references are stored as JSON
//! arrays and decoded through `FromJsonQueryResult`.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// A list of free-form lowercase tags (seasons, occasions, colours, styles).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct TagList(pub Vec<String>);

impl TagList {
    /// Builds a tag list from user input, trimming, lowercasing and dropping
    /// empties and duplicates while keeping first-seen order.
    pub fn normalized<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.as_ref().trim().to_lowercase();
            if !tag.is_empty() && !out.contains(&tag) {
                out.push(tag);
            }
        }
        Self(out)
    }

    /// Parses a comma-separated list (`"summer, spring"`).
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self::normalized(input.split(','))
    }

    /// Case-insensitive membership test.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Whether the list holds no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the tags.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// An ordered list of row ids (e.g. the clothing items of an outfit).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct IdList(pub Vec<i64>);

impl IdList {
    /// Number of referenced ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no ids are referenced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
