//! Domain model shared by the catalog core and the TUI. The intent is that the
//! type stays a light-weight data holder so the other layers can focus on
//! ordering and persistence logic. Keeping the commentary here means later
//! refactors can reconstruct the assumptions even if other context is lost.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One book record as it lives in the catalog and in the backing store. The
/// `id` provides the sort and search key; the text fields are free-form.
pub struct Book {
    /// Integer identifier used to order and address records. Uniqueness is a
    /// domain convention, not an enforced constraint: the tree accepts
    /// duplicates and routes equal keys to the right.
    pub id: i64,
    /// Title shown in lists and search results. May hold any character except
    /// a line terminator, which the flat-file encoding cannot represent.
    pub title: String,
    /// Author field, same constraint as the title.
    pub author: String,
}

impl Book {
    pub fn new(id: i64, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
        }
    }

    /// Compose a `Title by Author` string that gracefully omits the "by" when
    /// the author is blank. The list view and the find-result footer both rely
    /// on this ready-to-use formatting.
    pub fn display_line(&self) -> String {
        if self.author.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} by {}", self.title, self.author)
        }
    }
}

impl fmt::Display for Book {
    /// Write the identifier and title to any formatter. Display is implemented
    /// so the type plays nicely with Ratatui widgets that consume strings
    /// implicitly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.display_line())
    }
}
