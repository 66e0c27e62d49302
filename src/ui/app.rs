use std::collections::HashSet;
use std::mem;
use std::time::Instant;

use anyhow::Result;
use crossterm::event::KeyCode;
use rand::rngs::ThreadRng;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use tracing::{debug, error};

use crate::db::{add_entries, EntryStore};
use crate::models::{Category, Entry};
use crate::picker::{available_candidates, restore, CategoryFilter, Picker, PickerPhase};

use super::forms::{AddNamesField, AddNamesForm, ConfirmEntryDelete};
use super::helpers::{category_color, centered_rect, name_count, surface_error};
use super::screens::{GroupedListScreen, ListKind};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Title, counters and tab bar.
const HEADER_HEIGHT: u16 = 4;

/// The three top-level tabs.
#[derive(Copy, Clone, PartialEq, Eq)]
enum Tab {
    Browse,
    Random,
    Used,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Browse, Tab::Random, Tab::Used];

    fn index(self) -> usize {
        match self {
            Tab::Browse => 0,
            Tab::Random => 1,
            Tab::Used => 2,
        }
    }

    fn next(self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    fn previous(self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Modal overlays on top of the current tab.
enum Mode {
    Normal,
    AddingNames(AddNamesForm),
    ConfirmDelete(ConfirmEntryDelete),
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

/// Central application state shared across the TUI.
pub struct App {
    store: Box<dyn EntryStore>,
    entries: Vec<Entry>,
    categories: Vec<Category>,
    tab: Tab,
    browse: GroupedListScreen,
    used: GroupedListScreen,
    picker: Picker,
    rng: ThreadRng,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Take ownership of the store handle and load the initial snapshot.
    pub fn new(store: Box<dyn EntryStore>) -> Self {
        let mut app = Self {
            store,
            entries: Vec::new(),
            categories: Vec::new(),
            tab: Tab::Browse,
            browse: GroupedListScreen::new(ListKind::All),
            used: GroupedListScreen::new(ListKind::Used),
            picker: Picker::new(),
            rng: rand::thread_rng(),
            mode: Mode::Normal,
            status: None,
        };
        app.reload();
        app
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingNames(form) => self.handle_add_names(code, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    /// Submit the add form from anywhere inside it.
    pub(crate) fn handle_ctrl_s(&mut self) -> Result<()> {
        let previous = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match previous {
            Mode::AddingNames(form) => self.submit_names(form),
            other => other,
        };
        Ok(())
    }

    /// Bracketed paste goes straight into the add form's text area.
    pub(crate) fn handle_paste(&mut self, text: &str) {
        if let Mode::AddingNames(form) = &mut self.mode {
            if form.active == AddNamesField::Names {
                form.push_str(text);
                form.error = None;
            }
        }
    }

    /// Advance the pick animation. Called on every loop iteration.
    pub(crate) fn tick(&mut self, now: Instant) {
        match self.picker.advance(now, &mut self.rng, self.store.as_ref()) {
            Ok(Some(picked)) => {
                self.set_status(format!("Picked \"{}\".", picked.label), StatusKind::Info);
                self.reload();
            }
            Ok(None) => {}
            Err(err) => {
                error!(error = %err, "failed to mark name as used");
                self.set_status(
                    format!("Failed to mark name as used: {err}"),
                    StatusKind::Error,
                );
            }
        }
    }

    /// When the event loop must wake up again to keep the animation going.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.picker.next_deadline()
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.picker.cancel();
                *exit = true;
                return Ok(Mode::Normal);
            }
            KeyCode::Tab => {
                self.switch_tab(self.tab.next());
                return Ok(Mode::Normal);
            }
            KeyCode::BackTab => {
                self.switch_tab(self.tab.previous());
                return Ok(Mode::Normal);
            }
            KeyCode::Char('1') => {
                self.switch_tab(Tab::Browse);
                return Ok(Mode::Normal);
            }
            KeyCode::Char('2') => {
                self.switch_tab(Tab::Random);
                return Ok(Mode::Normal);
            }
            KeyCode::Char('3') => {
                self.switch_tab(Tab::Used);
                return Ok(Mode::Normal);
            }
            _ => {}
        }

        match self.tab {
            Tab::Browse => self.handle_browse_key(code),
            Tab::Random => {
                self.handle_random_key(code);
                Ok(Mode::Normal)
            }
            Tab::Used => {
                self.handle_used_key(code);
                Ok(Mode::Normal)
            }
        }
    }

    fn handle_browse_key(&mut self, code: KeyCode) -> Result<Mode> {
        let len = self.browse.visible_len(&self.categories, &self.entries);
        match code {
            KeyCode::Up => self.browse.move_selection(-1, len),
            KeyCode::Down => self.browse.move_selection(1, len),
            KeyCode::PageUp => self.browse.move_selection(-10, len),
            KeyCode::PageDown => self.browse.move_selection(10, len),
            KeyCode::Home => self.browse.select_first(),
            KeyCode::End => self.browse.select_last(len),
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('+') => {
                self.clear_status();
                return Ok(Mode::AddingNames(AddNamesForm::default()));
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char('-') | KeyCode::Delete => {
                match self.browse.current(&self.categories, &self.entries) {
                    Some(entry) => {
                        let confirm = ConfirmEntryDelete::from(entry);
                        self.clear_status();
                        return Ok(Mode::ConfirmDelete(confirm));
                    }
                    None => self.set_status("No name selected to delete.", StatusKind::Error),
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.reload();
                self.set_status("Reloaded.", StatusKind::Info);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_random_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left => self.cycle_filter(-1),
            KeyCode::Right => self.cycle_filter(1),
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => {
                self.start_pick()
            }
            _ => {}
        }
    }

    fn handle_used_key(&mut self, code: KeyCode) {
        let len = self.used.visible_len(&self.categories, &self.entries);
        match code {
            KeyCode::Up => self.used.move_selection(-1, len),
            KeyCode::Down => self.used.move_selection(1, len),
            KeyCode::PageUp => self.used.move_selection(-10, len),
            KeyCode::PageDown => self.used.move_selection(10, len),
            KeyCode::Home => self.used.select_first(),
            KeyCode::End => self.used.select_last(len),
            KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Enter => self.restore_selected(),
            _ => {}
        }
    }

    fn handle_add_names(&mut self, code: KeyCode, mut form: AddNamesForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Add names cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.active {
                AddNamesField::Names => form.newline(),
                AddNamesField::Category => return Ok(self.submit_names(form)),
            },
            KeyCode::Left if form.active == AddNamesField::Category => {
                form.cycle_category(-1, self.categories.len())
            }
            KeyCode::Right if form.active == AddNamesField::Category => {
                form.cycle_category(1, self.categories.len())
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::AddingNames(form))
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmEntryDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.perform_delete(&confirm);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    /// Validate, then create every name independently and reload once.
    fn submit_names(&mut self, mut form: AddNamesForm) -> Mode {
        let drafts = match form.parse_inputs(&self.categories) {
            Ok(drafts) => drafts,
            Err(err) => {
                let message = surface_error(&err);
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                return Mode::AddingNames(form);
            }
        };

        let report = add_entries(self.store.as_ref(), &drafts);
        self.reload();

        if report.is_complete() {
            self.set_status(
                format!("Added {}.", name_count(report.created.len())),
                StatusKind::Info,
            );
        } else {
            self.set_status(
                format!(
                    "Failed to add {} of {}. Please try again.",
                    report.failures.len(),
                    name_count(drafts.len())
                ),
                StatusKind::Error,
            );
        }
        Mode::Normal
    }

    fn perform_delete(&mut self, confirm: &ConfirmEntryDelete) {
        match self.store.delete_entry(&confirm.id) {
            Ok(()) => {
                self.reload();
                self.set_status(format!("Deleted \"{}\".", confirm.label), StatusKind::Info);
            }
            Err(err) => {
                error!(id = %confirm.id, error = %err, "failed to delete name");
                self.set_status(format!("Failed to delete name: {err}"), StatusKind::Error);
            }
        }
    }

    fn restore_selected(&mut self) {
        let Some(entry) = self.used.current(&self.categories, &self.entries).cloned() else {
            self.set_status("No used name selected.", StatusKind::Error);
            return;
        };

        match restore(self.store.as_ref(), &entry.id) {
            Ok(()) => {
                self.reload();
                self.set_status(format!("Restored \"{}\".", entry.label), StatusKind::Info);
            }
            Err(err) => {
                error!(id = %entry.id, error = %err, "failed to restore name");
                self.set_status(format!("Failed to restore name: {err}"), StatusKind::Error);
            }
        }
    }

    fn start_pick(&mut self) {
        if self.picker.is_spinning() {
            return;
        }
        let candidates = self.candidates();
        if candidates.is_empty() {
            self.set_status("No names available in this category.", StatusKind::Error);
            return;
        }
        self.clear_status();
        self.picker.start(candidates, Instant::now());
    }

    fn candidates(&self) -> Vec<Entry> {
        available_candidates(&self.entries, self.picker.filter())
    }

    /// Step through "All Categories" followed by each category.
    fn cycle_filter(&mut self, offset: isize) {
        if self.picker.is_spinning() {
            return;
        }
        let options = self.categories.len() as isize + 1;
        let current = match self.picker.filter() {
            CategoryFilter::All => 0,
            CategoryFilter::Only(id) => self
                .categories
                .iter()
                .position(|category| &category.id == id)
                .map(|idx| idx as isize + 1)
                .unwrap_or(0),
        };
        let next = (current + offset).rem_euclid(options);
        let filter = if next == 0 {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(self.categories[next as usize - 1].id.clone())
        };
        self.picker.set_filter(filter);
    }

    fn switch_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            debug!(tab = tab.index(), "switching tab");
            self.clear_status();
        }
        self.tab = tab;
    }

    /// Re-fetch the whole snapshot. Reads never fail; a broken backend shows
    /// up as an empty list and an error in the log.
    fn reload(&mut self) {
        self.entries = self.store.list_entries();
        self.categories = self.store.list_categories();
        if self.picker.is_spinning() {
            let live: HashSet<&str> = self
                .entries
                .iter()
                .filter(|entry| !entry.is_used())
                .map(|entry| entry.id.as_str())
                .collect();
            if !self
                .picker
                .retain_candidates(|entry| live.contains(entry.id.as_str()))
            {
                debug!("pick abandoned, its candidates are gone");
            }
        }
        let browse_len = self.browse.visible_len(&self.categories, &self.entries);
        self.browse.ensure_in_bounds(browse_len);
        let used_len = self.used.visible_len(&self.categories, &self.entries);
        self.used.ensure_in_bounds(used_len);
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

    fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT.min(area.height)),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        match self.tab {
            Tab::Browse => self.draw_grouped(frame, chunks[1], &self.browse),
            Tab::Random => self.draw_picker(frame, chunks[1]),
            Tab::Used => self.draw_grouped(frame, chunks[1], &self.used),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingNames(form) => self.draw_add_form(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let used = self.entries.iter().filter(|entry| entry.is_used()).count();
        let available = self.entries.len() - used;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(area);

        let counts = Line::from(vec![
            Span::raw("Total: "),
            Span::styled(self.entries.len().to_string(), Style::default().fg(Color::Magenta)),
            Span::raw("   Available: "),
            Span::styled(available.to_string(), Style::default().fg(Color::Green)),
            Span::raw("   Used: "),
            Span::styled(used.to_string(), Style::default().fg(Color::LightRed)),
        ]);
        let title = Line::from(Span::styled(
            "Beat Names Collection",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(
            Paragraph::new(vec![title, counts]).alignment(Alignment::Center),
            chunks[0],
        );

        let used_title = if used > 0 {
            format!("Used Names ({used})")
        } else {
            "Used Names".to_string()
        };
        let tabs = Tabs::new(vec![
            "Browse & Add".to_string(),
            "Random Picker".to_string(),
            used_title,
        ])
        .select(self.tab.index())
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(tabs, chunks[1]);
    }

    fn draw_grouped(&self, frame: &mut Frame, area: Rect, screen: &GroupedListScreen) {
        let rows = screen.rows(&self.categories, &self.entries);
        if rows.items.is_empty() {
            let text = match screen.kind {
                ListKind::All => "No names yet. Press 'a' to add some beautiful beat names!",
                ListKind::Used => "No names have been used yet. Use the Random Picker to select a name!",
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }

        let title = match screen.kind {
            ListKind::All => format!(" {} ", name_count(self.entries.len())),
            ListKind::Used => format!(
                " {} used ",
                name_count(screen.visible_len(&self.categories, &self.entries))
            ),
        };
        let list = List::new(rows.items).block(Block::default().borders(Borders::ALL).title(title));
        let mut state = ListState::default();
        state.select(rows.selected_row);
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_picker(&self, frame: &mut Frame, area: Rect) {
        let available = self.candidates().len();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(area);

        let filter_name = match self.picker.filter() {
            CategoryFilter::All => "All Categories".to_string(),
            CategoryFilter::Only(id) => self
                .category(id)
                .map(|category| category.name.clone())
                .unwrap_or_else(|| id.clone()),
        };
        let filter = Paragraph::new(Line::from(vec![
            Span::raw("Filter by Category: "),
            Span::styled(
                format!("< {filter_name} >"),
                Style::default().fg(Color::Cyan),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(filter, chunks[0]);

        let display_lines = match self.picker.display() {
            Some(entry) => {
                let label_style = if self.picker.phase() == PickerPhase::Spinning {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::Green)
                };
                let mut lines = vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        entry.label.clone(),
                        label_style.add_modifier(Modifier::BOLD),
                    )),
                ];
                if let Some(category) = self.category(&entry.category_id) {
                    lines.push(Line::from(vec![
                        Span::styled("● ", Style::default().fg(category_color(category))),
                        Span::raw(category.name.clone()),
                    ]));
                }
                lines
            }
            None => {
                let hint = if available == 0 {
                    "No names available in this category"
                } else {
                    "Press Enter to pick a random name"
                };
                vec![
                    Line::from(""),
                    Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
                ]
            }
        };
        let display = Paragraph::new(display_lines)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Random Beat Name Picker "),
            );
        frame.render_widget(display, chunks[1]);

        let (button_text, button_style) = if self.picker.is_spinning() {
            ("Picking...".to_string(), Style::default().fg(Color::DarkGray))
        } else if available == 0 {
            (
                "Pick Random Name (0 available)".to_string(),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            (
                format!("Pick Random Name ({available} available)"),
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            )
        };
        let button = Paragraph::new(Span::styled(button_text, button_style))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(button, chunks[2]);
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
        let mut spans = match (&self.mode, self.tab) {
            (Mode::AddingNames(_), _) => vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Switch field   "),
                Span::styled("[←→]", key_style),
                Span::raw(" Category   "),
                Span::styled("[Ctrl+S]", key_style),
                Span::raw(" Add   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ],
            (Mode::ConfirmDelete(_), _) => vec![
                Span::styled("[Y]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[N/Esc]", key_style),
                Span::raw(" Keep"),
            ],
            (Mode::Normal, Tab::Browse) => vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[A]", key_style),
                Span::raw(" Add Names   "),
                Span::styled("[D]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[R]", key_style),
                Span::raw(" Reload   "),
            ],
            (Mode::Normal, Tab::Random) => vec![
                Span::styled("[←→]", key_style),
                Span::raw(" Filter   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Pick   "),
            ],
            (Mode::Normal, Tab::Used) => vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[R]", key_style),
                Span::raw(" Restore   "),
            ],
        };
        if matches!(self.mode, Mode::Normal) {
            spans.extend([
                Span::styled("[Tab]", key_style),
                Span::raw(" Next tab   "),
                Span::styled("[Q]", key_style),
                Span::raw(" Quit"),
            ]);
        }
        Line::from(spans)
    }

    fn draw_add_form(&self, frame: &mut Frame, area: Rect, form: &AddNamesForm) {
        let popup_area = centered_rect(60, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Names").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(2),
            ])
            .split(inner);

        let names_block = Block::default()
            .borders(Borders::ALL)
            .title("Paste Names (one per line)");
        let names_inner = names_block.inner(chunks[0]);
        let (column, row) = form.cursor_offset();
        let scroll = (row as u16).saturating_sub(names_inner.height.saturating_sub(1));
        let names = Paragraph::new(form.text_lines())
            .block(names_block)
            .scroll((scroll, 0));
        frame.render_widget(names, chunks[0]);

        frame.render_widget(
            Paragraph::new(form.category_line(&self.categories)),
            chunks[1],
        );

        let hint = if let Some(error) = &form.error {
            Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red)))
        } else {
            Line::from(Span::styled(
                "Enter adds a line • Ctrl+S (or Enter on Category) saves • Esc cancels",
                Style::default().fg(Color::Gray),
            ))
        };
        frame.render_widget(Paragraph::new(hint).wrap(Wrap { trim: true }), chunks[2]);

        if form.active == AddNamesField::Names {
            let cursor_x = names_inner.x + (column as u16).min(names_inner.width.saturating_sub(1));
            let cursor_y = names_inner.y + (row as u16).saturating_sub(scroll);
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmEntryDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Are you sure you want to delete \"{}\"?", confirm.label)),
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
}
