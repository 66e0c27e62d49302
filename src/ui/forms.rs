use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{parse_bulk_labels, Category, Entry, EntryDraft};

/// State of the bulk "Add Names" form.
#[derive(Default, Clone)]
pub(crate) struct AddNamesForm {
    pub(crate) text: String,
    /// Index into the category list; starts at the first category.
    pub(crate) category: usize,
    pub(crate) active: AddNamesField,
    pub(crate) error: Option<String>,
}

/// Fields available within the add form.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub(crate) enum AddNamesField {
    #[default]
    Names,
    Category,
}

impl AddNamesForm {
    /// Swap focus between the text area and the category chooser.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            AddNamesField::Names => AddNamesField::Category,
            AddNamesField::Category => AddNamesField::Names,
        };
    }

    /// Append a character to the text area. Ignored while the category
    /// chooser has focus.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if self.active != AddNamesField::Names || (ch.is_control() && ch != '\n') {
            return false;
        }
        self.text.push(ch);
        true
    }

    /// Insert pasted text as-is, normalising line endings.
    pub(crate) fn push_str(&mut self, pasted: &str) {
        self.text.push_str(&pasted.replace("\r\n", "\n").replace('\r', "\n"));
    }

    pub(crate) fn newline(&mut self) {
        if self.active == AddNamesField::Names {
            self.text.push('\n');
        }
    }

    pub(crate) fn backspace(&mut self) {
        if self.active == AddNamesField::Names {
            self.text.pop();
        }
    }

    /// Step through the categories, wrapping at both ends.
    pub(crate) fn cycle_category(&mut self, offset: isize, count: usize) {
        if count == 0 {
            self.category = 0;
            return;
        }
        let current = self.category.min(count - 1) as isize;
        self.category = (current + offset).rem_euclid(count as isize) as usize;
    }

    /// Validate the form and build one draft per pasted line. Nothing touches
    /// the store until this succeeds.
    pub(crate) fn parse_inputs(&self, categories: &[Category]) -> Result<Vec<EntryDraft>> {
        let category = categories
            .get(self.category)
            .ok_or_else(|| anyhow!("Select a category first."))?;
        let labels = parse_bulk_labels(&self.text);
        if labels.is_empty() {
            return Err(anyhow!("Enter at least one name."));
        }
        Ok(labels
            .into_iter()
            .map(|label| EntryDraft::new(label, category.id.clone()))
            .collect())
    }

    /// Lines of the text area, with a placeholder when empty.
    pub(crate) fn text_lines(&self) -> Vec<Line<'static>> {
        let style = if self.active == AddNamesField::Names {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        if self.text.is_empty() {
            return vec![Line::from(Span::styled(
                "Amore / Passion / Desire ... (one per line)",
                Style::default().fg(Color::DarkGray),
            ))];
        }
        self.text
            .split('\n')
            .map(|line| Line::from(Span::styled(line.to_string(), style)))
            .collect()
    }

    /// Render the category chooser line.
    pub(crate) fn category_line(&self, categories: &[Category]) -> Line<'static> {
        let is_active = self.active == AddNamesField::Category;
        let name = categories
            .get(self.category)
            .map(|category| category.name.clone())
            .unwrap_or_else(|| "<no categories>".to_string());
        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::raw("Category: "),
            Span::styled(format!("< {name} >"), style),
        ])
    }

    /// Cursor position within the text area as `(column, row)`.
    pub(crate) fn cursor_offset(&self) -> (usize, usize) {
        let row = self.text.matches('\n').count();
        let column = self
            .text
            .rsplit('\n')
            .next()
            .map(|line| line.chars().count())
            .unwrap_or(0);
        (column, row)
    }
}

/// Pending deletion awaiting a yes/no answer.
#[derive(Clone)]
pub(crate) struct ConfirmEntryDelete {
    pub(crate) id: String,
    pub(crate) label: String,
}

impl ConfirmEntryDelete {
    pub(crate) fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id.clone(),
            label: entry.label.clone(),
        }
    }
}
