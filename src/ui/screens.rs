use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::ListItem;

use crate::models::{group_by_category, Category, Entry};

use super::helpers::{category_color, format_used_at, name_count};

/// Which entries a grouped list shows.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum ListKind {
    /// Every entry, used or not.
    All,
    /// Only entries that have been picked.
    Used,
}

/// Selection state for one of the grouped entry lists. The selection indexes
/// the entries in display order (category order, then newest first).
pub(crate) struct GroupedListScreen {
    pub(crate) kind: ListKind,
    pub(crate) selected: usize,
}

/// Rendered rows plus the row index of the selected entry.
pub(crate) struct GroupedRows {
    pub(crate) items: Vec<ListItem<'static>>,
    pub(crate) selected_row: Option<usize>,
}

impl GroupedListScreen {
    pub(crate) fn new(kind: ListKind) -> Self {
        Self { kind, selected: 0 }
    }

    fn includes(&self, entry: &Entry) -> bool {
        match self.kind {
            ListKind::All => true,
            ListKind::Used => entry.is_used(),
        }
    }

    /// Entries in display order. Entries pointing at a missing category are
    /// not shown, matching the grouped rendering.
    pub(crate) fn visible<'a>(
        &self,
        categories: &'a [Category],
        entries: &'a [Entry],
    ) -> Vec<(&'a Category, Vec<&'a Entry>)> {
        let shown: Vec<&Entry> = entries.iter().filter(|entry| self.includes(entry)).collect();
        group_by_category(categories, &shown)
    }

    pub(crate) fn current<'a>(
        &self,
        categories: &'a [Category],
        entries: &'a [Entry],
    ) -> Option<&'a Entry> {
        self.visible(categories, entries)
            .into_iter()
            .flat_map(|(_, members)| members)
            .nth(self.selected)
    }

    pub(crate) fn visible_len(&self, categories: &[Category], entries: &[Entry]) -> usize {
        self.visible(categories, entries)
            .iter()
            .map(|(_, members)| members.len())
            .sum()
    }

    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let last = len as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    /// Build list rows: a header per category followed by its entries.
    pub(crate) fn rows(&self, categories: &[Category], entries: &[Entry]) -> GroupedRows {
        let mut items = Vec::new();
        let mut selected_row = None;
        let mut index = 0;

        for (category, members) in self.visible(categories, entries) {
            let color = category_color(category);
            items.push(ListItem::new(Line::from(vec![
                Span::styled("● ", Style::default().fg(color)),
                Span::styled(
                    category.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  ({})", name_count(members.len())),
                    Style::default().fg(Color::Gray),
                ),
            ])));

            for entry in members {
                if index == self.selected {
                    selected_row = Some(items.len());
                }
                items.push(self.entry_row(entry, color, index == self.selected));
                index += 1;
            }
        }

        GroupedRows {
            items,
            selected_row,
        }
    }

    fn entry_row(&self, entry: &Entry, color: Color, selected: bool) -> ListItem<'static> {
        let marker = if selected { "▶ " } else { "  " };
        let mut label_style = Style::default();
        if self.kind == ListKind::Used {
            label_style = label_style
                .fg(Color::Gray)
                .add_modifier(Modifier::CROSSED_OUT);
        }
        if selected {
            label_style = label_style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
        }

        let mut spans = vec![
            Span::raw(marker),
            Span::styled("▌", Style::default().fg(color)),
            Span::styled(format!(" {}", entry.label), label_style),
        ];
        match (self.kind, entry.used_at) {
            (ListKind::Used, Some(at)) => spans.push(Span::styled(
                format!("   Used: {}", format_used_at(at)),
                Style::default().fg(Color::DarkGray),
            )),
            (ListKind::All, Some(_)) => spans.push(Span::styled(
                "   (used)",
                Style::default().fg(Color::DarkGray),
            )),
            _ => {}
        }
        ListItem::new(Line::from(spans))
    }
}
