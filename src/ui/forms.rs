use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{ColumnType, Record, Schema};

/// Input state for the label/entry pairs: one text buffer per schema column
/// plus the index of the field that currently has focus. Character input is
/// filtered per column type so numeric columns only ever hold parseable text.
#[derive(Clone)]
pub(crate) struct RecordForm {
    labels: Vec<String>,
    types: Vec<ColumnType>,
    values: Vec<String>,
    active: usize,
}

impl RecordForm {
    /// Build an empty form shaped like the schema, focus on the first field.
    pub(crate) fn new(schema: &Schema) -> Self {
        Self {
            labels: schema.names(),
            types: schema.types(),
            values: vec![String::new(); schema.len()],
            active: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn label(&self, index: usize) -> &str {
        &self.labels[index]
    }

    pub(crate) fn active(&self) -> usize {
        self.active
    }

    /// Raw field inputs, positionally aligned to the schema.
    pub(crate) fn values(&self) -> &[String] {
        &self.values
    }

    /// Whether every field holds a non-blank value.
    pub(crate) fn is_complete(&self) -> bool {
        !self.values.is_empty() && self.values.iter().all(|v| !v.trim().is_empty())
    }

    /// Move focus to the next field, wrapping at the end.
    pub(crate) fn next_field(&mut self) {
        if !self.values.is_empty() {
            self.active = (self.active + 1) % self.values.len();
        }
    }

    /// Move focus to the previous field, wrapping at the start.
    pub(crate) fn prev_field(&mut self) {
        if !self.values.is_empty() {
            self.active = (self.active + self.values.len() - 1) % self.values.len();
        }
    }

    /// Append a character to the active field, validating allowed input for
    /// the column's type.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let Some(value) = self.values.get_mut(self.active) else {
            return false;
        };
        let accepted = match self.types[self.active] {
            ColumnType::Integer => ch.is_ascii_digit() || (ch == '-' && value.is_empty()),
            ColumnType::Real => {
                ch.is_ascii_digit()
                    || (ch == '-' && value.is_empty())
                    || (ch == '.' && !value.contains('.'))
            }
            ColumnType::Text => !ch.is_control(),
        };
        if accepted {
            value.push(ch);
        }
        accepted
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        if let Some(value) = self.values.get_mut(self.active) {
            value.pop();
        }
    }

    /// Blank every field and reset focus.
    pub(crate) fn clear(&mut self) {
        for value in &mut self.values {
            value.clear();
        }
        self.active = 0;
    }

    /// Copy a record's values into the entry buffers, as happens when a list
    /// entry is selected.
    pub(crate) fn set_from(&mut self, record: &Record) {
        for (value, field) in record.values.iter().zip(&mut self.values) {
            *field = value.to_string();
        }
    }

    /// Render the entry content for one field: placeholder text when empty,
    /// yellow when focused, dimmed when empty and unfocused.
    pub(crate) fn value_line(&self, index: usize) -> Line<'static> {
        let value = &self.values[index];
        let is_active = index == self.active;

        let display = if value.is_empty() {
            "<empty>".to_string()
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

        Line::from(vec![Span::styled(display, style)])
    }
}
