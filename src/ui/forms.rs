use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Book;

/// Internal representation of the "add book" form fields.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

/// Enumerates the fields within the book form to drive focus management.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum BookField {
    #[default]
    Id,
    Title,
    Author,
}

impl BookForm {
    /// Cycle focus across the three fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            BookField::Id => BookField::Title,
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Id,
        };
    }

    /// Append a character to the active field, validating allowed input. The
    /// identifier field accepts digits (and a leading minus); the text fields
    /// take anything that is not a control character, since a line terminator
    /// would break the flat-file encoding.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            BookField::Id => {
                if ch.is_ascii_digit() || (ch == '-' && self.id.is_empty()) {
                    self.id.push(ch);
                    true
                } else {
                    false
                }
            }
            BookField::Title => {
                if !ch.is_control() {
                    self.title.push(ch);
                    true
                } else {
                    false
                }
            }
            BookField::Author => {
                if !ch.is_control() {
                    self.author.push(ch);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Id => {
                self.id.pop();
            }
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
        }
    }

    /// Validate the inputs and return a record ready for insertion.
    pub(crate) fn parse_inputs(&self) -> Result<Book> {
        let id_raw = self.id.trim();
        if id_raw.is_empty() {
            return Err(anyhow!("Book id is required."));
        }
        let id = id_raw
            .parse::<i64>()
            .context("Book id must be an integer.")?;
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Book title is required."));
        }
        Ok(Book::new(id, title, self.author.trim()))
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        let (value, is_active) = match field {
            BookField::Id => (&self.id, self.active == BookField::Id),
            BookField::Title => (&self.title, self.active == BookField::Title),
            BookField::Author => (&self.author, self.active == BookField::Author),
        };

        let placeholder = match field {
            BookField::Author => "<optional>",
            _ => "<required>",
        };

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Return the character count for the requested field.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        match field {
            BookField::Id => self.id.chars().count(),
            BookField::Title => self.title.chars().count(),
            BookField::Author => self.author.chars().count(),
        }
    }
}

/// State for confirming the deletion of the selected book.
#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) book: Book,
}

impl ConfirmBookDelete {
    pub(crate) fn from(book: Book) -> Self {
        Self { book }
    }
}

/// State for an active find-by-identifier prompt.
#[derive(Default, Clone)]
pub(crate) struct FindPrompt {
    pub(crate) query: String,
}

impl FindPrompt {
    /// Append a character, accepting only digit input (plus a leading minus).
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_ascii_digit() || (ch == '-' && self.query.is_empty()) {
            self.query.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.query.pop();
    }

    /// Parse the typed identifier.
    pub(crate) fn parse_id(&self) -> Result<i64> {
        let raw = self.query.trim();
        if raw.is_empty() {
            return Err(anyhow!("Type an id to search for."));
        }
        raw.parse::<i64>().context("Book id must be an integer.")
    }
}
