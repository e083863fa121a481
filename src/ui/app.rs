use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::catalog::Catalog;
use crate::models::Book;

use super::forms::{BookField, BookForm, ConfirmBookDelete, FindPrompt};
use super::helpers::{centered_rect, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// Fine-grained input modes layered over the catalog list. Keeping this
/// explicit makes it easy to reason about which rendering path runs and what
/// keyboard shortcuts should do.
enum Mode {
    Normal,
    AddingBook(BookForm),
    ConfirmDelete(ConfirmBookDelete),
    Finding(FindPrompt),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. The catalog owns every
/// record; `books` is a cached in-order snapshot refreshed after each
/// mutation so drawing never re-walks the tree per frame.
pub struct App {
    catalog: Catalog,
    books: Vec<Book>,
    selected: usize,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Wrap a freshly loaded catalog. A startup notice (for example a missing
    /// or partially readable store) lands in the footer so the degraded start
    /// is visible without being fatal.
    pub fn new(catalog: Catalog, startup_notice: Option<String>) -> Self {
        let books = catalog.iter().cloned().collect();
        let status = startup_notice.map(|text| StatusMessage {
            text,
            kind: StatusKind::Error,
        });
        Self {
            catalog,
            books,
            selected: 0,
            mode: Mode::Normal,
            status,
        }
    }

    /// The catalog, for the shutdown save in `main`.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::Finding(prompt) => self.handle_find(code, prompt)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-5),
            KeyCode::PageDown => self.move_selection(5),
            KeyCode::Home => self.select_first(),
            KeyCode::End => self.select_last(),
            KeyCode::Char('a') | KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::AddingBook(BookForm::default()));
            }
            KeyCode::Char('d') | KeyCode::Char('-') => {
                if let Some(book) = self.current_book().cloned() {
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(ConfirmBookDelete::from(book)));
                } else {
                    self.set_status("No book selected to delete.", StatusKind::Error);
                }
            }
            KeyCode::Char('f') | KeyCode::Char('/') => {
                self.clear_status();
                return Ok(Mode::Finding(FindPrompt::default()));
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_book(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingBook(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm) {
                    Ok(_) => Ok(Mode::Normal),
                    Err(err) => {
                        let message = surface_error(&err);
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::ConfirmDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn handle_find(&mut self, code: KeyCode, mut prompt: FindPrompt) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.clear_status();
                keep_open = false;
            }
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Enter => match prompt.parse_id() {
                Ok(id) => {
                    self.report_lookup(id);
                    keep_open = false;
                }
                Err(err) => {
                    self.set_status(surface_error(&err), StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                prompt.push_char(ch);
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::Finding(prompt))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn save_new_book(&mut self, form: &BookForm) -> Result<()> {
        let book = form.parse_inputs()?;
        let id = book.id;
        self.catalog.insert(book);
        self.refresh_books();
        self.select_id(id);
        self.set_status(format!("Added book {id}."), StatusKind::Info);
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmBookDelete) -> Result<()> {
        let id = confirm.book.id;
        self.catalog.remove(id)?;
        self.refresh_books();
        self.set_status(format!("Deleted book {id}."), StatusKind::Info);
        Ok(())
    }

    fn report_lookup(&mut self, id: i64) {
        match self.catalog.find(id) {
            Some(book) => {
                let message = format!("Found {book}");
                self.select_id(id);
                self.set_status(message, StatusKind::Info);
            }
            None => {
                self.set_status(format!("No book with id {id}."), StatusKind::Error);
            }
        }
    }

    /// Rebuild the cached in-order snapshot after a mutation and keep the
    /// selection inside bounds.
    fn refresh_books(&mut self) {
        self.books = self.catalog.iter().cloned().collect();
        if self.selected >= self.books.len() {
            self.selected = self.books.len().saturating_sub(1);
        }
    }

    fn current_book(&self) -> Option<&Book> {
        self.books.get(self.selected)
    }

    fn move_selection(&mut self, offset: isize) {
        if self.books.is_empty() {
            return;
        }
        let last = self.books.len() as isize - 1;
        let new_index = (self.selected as isize + offset).clamp(0, last);
        self.selected = new_index as usize;
    }

    fn select_first(&mut self) {
        self.selected = 0;
    }

    fn select_last(&mut self) {
        self.selected = self.books.len().saturating_sub(1);
    }

    /// Move the selection to the first listed book carrying `id`, which is
    /// also the one lookup reaches when duplicates exist.
    fn select_id(&mut self, id: i64) {
        if let Some(index) = self.books.iter().position(|book| book.id == id) {
            self.selected = index;
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_book_list(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Finding(prompt) => self.draw_find_bar(frame, area, prompt),
            Mode::Normal => {}
        }
    }

    fn draw_book_list(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Catalog ({} books)", self.books.len()));

        if self.books.is_empty() {
            let message = Paragraph::new("No books yet. Press 'a' to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .books
            .iter()
            .map(|book| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:>6}  ", book.id),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(book.display_line()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match &self.mode {
            Mode::AddingBook(_) => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Switch Field   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Save   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::ConfirmDelete(_) => Line::from(vec![
                Span::styled("[Y]", key_style),
                Span::raw(" Confirm   "),
                Span::styled("[N/Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::Finding(_) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Search   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::Normal => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[a]", key_style),
                Span::raw(" Add   "),
                Span::styled("[d]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[f]", key_style),
                Span::raw(" Find   "),
                Span::styled("[q]", key_style),
                Span::raw(" Save & Quit"),
            ]),
        }
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Id", BookField::Id),
            form.build_line("Title", BookField::Title),
            form.build_line("Author", BookField::Author),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save - Tab to switch - Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (prefix, row) = match form.active {
            BookField::Id => ("Id: ".len() as u16, 0),
            BookField::Title => ("Title: ".len() as u16, 1),
            BookField::Author => ("Author: ".len() as u16, 2),
        };
        let cursor_x = inner.x + prefix + form.value_len(form.active) as u16;
        let cursor_y = inner.y + row;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete book {} ({})?",
                confirm.book.id,
                confirm.book.display_line()
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_find_bar(&self, frame: &mut Frame, area: Rect, prompt: &FindPrompt) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Find Book");
        let paragraph = Paragraph::new(Span::raw(format!("Id: {}", prompt.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Id: ".len() as u16 + prompt.query.chars().count() as u16;
        let cursor_y = inner.y;
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_app() -> App {
        let mut catalog = Catalog::new();
        catalog.insert(Book::new(3, "A", "x"));
        catalog.insert(Book::new(1, "B", "y"));
        catalog.insert(Book::new(2, "C", "z"));
        App::new(catalog, None)
    }

    #[test]
    fn snapshot_is_in_ascending_id_order() {
        let app = seeded_app();
        let ids: Vec<_> = app.books.iter().map(|book| book.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn delete_flow_removes_the_selected_book() {
        let mut app = seeded_app();
        app.select_last();
        let confirm = ConfirmBookDelete::from(app.current_book().cloned().unwrap());
        app.perform_delete(&confirm).unwrap();

        assert_eq!(app.catalog().len(), 2);
        assert!(app.catalog().find(3).is_none());
        // Selection was clamped back into the shorter list.
        assert!(app.selected < app.books.len());
    }

    #[test]
    fn add_flow_inserts_and_selects_the_new_book() {
        let mut app = seeded_app();
        let form = BookForm {
            id: "0".to_string(),
            title: "Zero".to_string(),
            author: "Nobody".to_string(),
            ..BookForm::default()
        };
        app.save_new_book(&form).unwrap();

        assert_eq!(app.catalog().len(), 4);
        assert_eq!(app.selected, 0);
        assert_eq!(app.current_book().map(|book| book.id), Some(0));
    }

    #[test]
    fn lookup_misses_leave_selection_alone() {
        let mut app = seeded_app();
        app.report_lookup(99);
        assert_eq!(app.selected, 0);
        assert!(matches!(
            app.status,
            Some(StatusMessage {
                kind: StatusKind::Error,
                ..
            })
        ));
    }
}
