use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::style::{Color, Style};
use ratatui::Frame;

use crate::db::Store;
use crate::models::{Record, SearchCriteria};

use super::forms::RecordForm;
use super::helpers::surface_error;
use super::screens;

/// Holds the footer message text plus its severity.
pub(crate) struct StatusMessage {
    pub(crate) text: String,
    pub(crate) kind: StatusKind,
}

/// Severity levels shown in the footer.
pub(crate) enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    pub(crate) fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state: the store, the visible record list, the entry
/// form, and one selection slot. Every action is a discrete key press; each
/// mutation goes straight to the store and the list is reloaded afterwards.
pub struct App {
    pub(crate) store: Store,
    pub(crate) title: String,
    pub(crate) form: RecordForm,
    pub(crate) records: Vec<Record>,
    pub(crate) cursor: Option<usize>,
    pub(crate) selection: Option<i64>,
    pub(crate) status: Option<StatusMessage>,
}

impl App {
    /// Hydrate the controller from an open store: cache the schema shape in
    /// the form and load the initial record list.
    pub fn new(store: Store, title: String) -> Result<Self> {
        let form = RecordForm::new(store.schema());
        let records = store.get_all().context("failed to load records")?;
        Ok(Self {
            store,
            title,
            form,
            records,
            cursor: None,
            selection: None,
            status: None,
        })
    }

    /// Release the database connection. Dropping the app closes it too; this
    /// just surfaces close failures instead of swallowing them.
    pub fn close(self) -> Result<()> {
        self.store.close().context("failed to close the database")?;
        Ok(())
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        screens::draw(frame, self);
    }

    /// Dispatch a Ctrl-modified key. Returns `true` when the app should exit.
    pub(crate) fn handle_ctrl(&mut self, ch: char) -> Result<bool> {
        match ch {
            'q' => return Ok(true),
            'l' => self.view_all(),
            'f' => self.search(),
            'n' => self.add_record(),
            'u' => self.update_record(),
            'd' => self.delete_record(),
            _ => {}
        }
        Ok(false)
    }

    /// Dispatch an unmodified key: field editing, focus cycling, and list
    /// navigation.
    pub(crate) fn handle_key(&mut self, code: KeyCode) -> Result<()> {
        match code {
            KeyCode::Tab => self.form.next_field(),
            KeyCode::BackTab => self.form.prev_field(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Char(ch) => {
                self.form.push_char(ch);
            }
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-10),
            KeyCode::PageDown => self.move_cursor(10),
            KeyCode::Home => self.jump_cursor(0),
            KeyCode::End => self.jump_cursor(self.records.len().saturating_sub(1)),
            KeyCode::Esc => self.clear_selection(),
            _ => {}
        }
        Ok(())
    }

    /// Repopulate the list with every record. Always succeeds in the sense
    /// that an empty table just shows an empty list.
    fn view_all(&mut self) {
        if self.reload() {
            self.set_status(format!("{} records.", self.records.len()), StatusKind::Info);
        }
    }

    /// Repopulate the list with records matching the current field inputs.
    /// Blank fields are not part of the criteria; all-blank fields list
    /// everything.
    fn search(&mut self) {
        let criteria = SearchCriteria::from_inputs(self.store.schema(), self.form.values());
        match self.store.find(&criteria) {
            Ok(records) => {
                self.records = records;
                self.cursor = None;
                self.selection = None;
                self.set_status(format!("{} matching records.", self.records.len()), StatusKind::Info);
            }
            Err(err) => self.report(err),
        }
    }

    /// Insert the current field inputs as a new record. A partially filled
    /// form is silently refused; the user corrects the input and retries.
    fn add_record(&mut self) {
        if !self.form.is_complete() {
            return;
        }
        match self.store.insert(self.form.values()) {
            Ok(id) => {
                self.reload();
                self.set_status(format!("Added record {id}."), StatusKind::Info);
            }
            Err(err) => self.report(err),
        }
    }

    /// Replace every field of the selected record with the current inputs.
    fn update_record(&mut self) {
        let Some(id) = self.selection else {
            self.set_status("No record selected to update.", StatusKind::Error);
            return;
        };
        if !self.form.is_complete() {
            return;
        }
        match self.store.update(id, self.form.values()) {
            Ok(()) => {
                self.reload();
                self.set_status(format!("Updated record {id}."), StatusKind::Info);
            }
            Err(err) => self.report(err),
        }
    }

    /// Delete the selected record and clear the selection.
    fn delete_record(&mut self) {
        let Some(id) = self.selection else {
            self.set_status("No record selected to delete.", StatusKind::Error);
            return;
        };
        match self.store.delete(id) {
            Ok(()) => {
                self.reload();
                self.set_status(format!("Deleted record {id}."), StatusKind::Info);
            }
            Err(err) => self.report(err),
        }
    }

    /// Reload the full record list. A freshly populated list has no cursor
    /// and therefore no selection. Returns whether the reload succeeded.
    fn reload(&mut self) -> bool {
        match self.store.get_all() {
            Ok(records) => {
                self.records = records;
                self.cursor = None;
                self.selection = None;
                true
            }
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    /// Move the list cursor by `offset`, clamped to the list bounds, and
    /// select the record it lands on.
    fn move_cursor(&mut self, offset: isize) {
        if self.records.is_empty() {
            return;
        }
        let len = self.records.len() as isize;
        let current = self.cursor.map(|idx| idx as isize).unwrap_or(-1);
        let next = (current + offset).clamp(0, len - 1);
        self.select_index(next as usize);
    }

    fn jump_cursor(&mut self, index: usize) {
        if !self.records.is_empty() {
            self.select_index(index.min(self.records.len() - 1));
        }
    }

    /// Make the record at `index` the active selection, copying its values
    /// into every field input.
    fn select_index(&mut self, index: usize) {
        self.cursor = Some(index);
        let record = &self.records[index];
        self.selection = Some(record.id);
        self.form.set_from(record);
        self.status = None;
    }

    /// Drop the selection and blank the form, leaving the list as-is.
    fn clear_selection(&mut self) {
        self.cursor = None;
        self.selection = None;
        self.form.clear();
        self.status = None;
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn report(&mut self, err: crate::db::StoreError) {
        let err = anyhow::Error::new(err);
        self.set_status(surface_error(&err), StatusKind::Error);
    }
}
