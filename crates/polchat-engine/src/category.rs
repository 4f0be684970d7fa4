//! Categories and the tab selector.
//!
//! A category is an opaque display label identified by its position in a
//! fixed, caller-supplied sequence. The [`TabSelector`] tracks which one is
//! active and notifies the caller when a tab is picked.

use serde::{Deserialize, Serialize};

/// Default policy categories offered by the client.
pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "Definitions & Concepts",
    "Policies & Compliance",
    "Data Access & Security",
    "Roles & Responsibilities",
    "Data Quality & Usage",
    "Classification & Tagging",
    "Security & Compliance",
    "Contextual Examples",
];

/// A non-empty, ordered list of category labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Categories(Vec<String>);

impl Categories {
    /// Build a category list. Fails if `labels` is empty.
    pub fn new<I, S>(labels: I) -> Result<Self, CategoryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(CategoryError::Empty);
        }
        Ok(Self(labels))
    }

    /// Number of categories (always at least one).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Label at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Iterate over labels in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Find a category by index (`"3"`) or by label (case-insensitive).
    pub fn resolve(&self, key: &str) -> Result<usize, CategoryError> {
        let key = key.trim();
        if let Ok(index) = key.parse::<usize>() {
            return if index < self.len() {
                Ok(index)
            } else {
                Err(CategoryError::OutOfRange {
                    index,
                    len: self.len(),
                })
            };
        }
        self.0
            .iter()
            .position(|label| label.eq_ignore_ascii_case(key))
            .ok_or_else(|| CategoryError::Unknown(key.to_string()))
    }
}

impl Default for Categories {
    fn default() -> Self {
        Self(DEFAULT_CATEGORIES.iter().map(|s| (*s).to_string()).collect())
    }
}

impl TryFrom<Vec<String>> for Categories {
    type Error = CategoryError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(labels)
    }
}

impl From<Categories> for Vec<String> {
    fn from(categories: Categories) -> Self {
        categories.0
    }
}

/// Selection state over a [`Categories`] list.
///
/// Exactly one category is active at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSelector {
    categories: Categories,
    active: usize,
}

impl TabSelector {
    /// Create a selector with the first category active.
    pub fn new(categories: Categories) -> Self {
        Self {
            categories,
            active: 0,
        }
    }

    /// All categories.
    pub fn categories(&self) -> &Categories {
        &self.categories
    }

    /// Index of the active category.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Label of the active category.
    pub fn active_label(&self) -> &str {
        // `active` is kept in range by every mutator.
        self.categories.get(self.active).unwrap_or_default()
    }

    /// Activate the tab at `index`.
    pub fn select(&mut self, index: usize) -> Result<(), CategoryError> {
        self.select_with(index, |_| {})
    }

    /// Activate the tab at `index` and invoke `on_change` with it.
    ///
    /// The callback fires even when the tab was already active.
    pub fn select_with<F>(&mut self, index: usize, on_change: F) -> Result<(), CategoryError>
    where
        F: FnOnce(usize),
    {
        if index >= self.categories.len() {
            return Err(CategoryError::OutOfRange {
                index,
                len: self.categories.len(),
            });
        }
        self.active = index;
        on_change(index);
        Ok(())
    }

    /// Index of the tab after the active one, wrapping around.
    pub fn next_index(&self) -> usize {
        (self.active + 1) % self.categories.len()
    }

    /// Index of the tab before the active one, wrapping around.
    pub fn prev_index(&self) -> usize {
        (self.active + self.categories.len() - 1) % self.categories.len()
    }
}

impl Default for TabSelector {
    fn default() -> Self {
        Self::new(Categories::default())
    }
}

/// Errors from category construction and selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryError {
    /// No categories were supplied.
    #[error("at least one category is required")]
    Empty,

    /// Index past the end of the list.
    #[error("category index {index} out of range (have {len})")]
    OutOfRange { index: usize, len: usize },

    /// No category with this label.
    #[error("unknown category: {0}")]
    Unknown(String),
}
