//! Domain models shared by the persistence backends, the picker and the TUI.
//! They stay plain data holders; the store decides how they are laid out on
//! disk and the UI decides how they look.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

/// Leading list numbering such as `12. ` that users often paste along with
/// their names.
static NUMBERING_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\s*").expect("numbering prefix pattern is valid")
});

/// The ten categories seeded into an empty store: `(id, name, color)`.
pub const DEFAULT_CATEGORIES: [(&str, &str, &str); 10] = [
    ("1", "Love & Emotion", "#FF6B9D"),
    ("2", "Healing & Remedies", "#4ECDC4"),
    ("3", "Dreams & Mystery", "#9D84B7"),
    ("4", "Time & Memory", "#FFB347"),
    ("5", "Beauty & Grace", "#FFD700"),
    ("6", "Nature & Elements", "#90EE90"),
    ("7", "Feelings & States", "#87CEEB"),
    ("8", "Journey & Discovery", "#DDA0DD"),
    ("9", "Light & Hope", "#F0E68C"),
    ("10", "Simple & Powerful", "#CD5C5C"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single user-submitted label. Everything except the used marker is fixed
/// once the entry has been created.
pub struct Entry {
    /// Opaque identifier assigned by the store.
    pub id: String,
    pub label: String,
    /// Advisory reference to a [`Category`]. A dangling id only hides the
    /// entry from grouped views.
    pub category_id: String,
    pub created_at: DateTime<Utc>,
    /// Set when the entry was picked. `None` means the entry is available, so
    /// "used" and "used at" can never disagree.
    pub used_at: Option<DateTime<Utc>>,
}

impl Entry {
    /// Whether the entry has already been picked.
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Build a stored entry from a draft and the id the backend assigned.
    pub fn from_draft(id: impl Into<String>, draft: &EntryDraft) -> Self {
        Self {
            id: id.into(),
            label: draft.label.clone(),
            category_id: draft.category_id.clone(),
            created_at: draft.created_at,
            used_at: None,
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An entry that has not been persisted yet.
pub struct EntryDraft {
    pub label: String,
    pub category_id: String,
    pub created_at: DateTime<Utc>,
}

impl EntryDraft {
    pub fn new(label: impl Into<String>, category_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            category_id: category_id.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Named, colored bucket for entries. Name and color are display metadata.
pub struct Category {
    pub id: String,
    pub name: String,
    /// Hex color such as `#FF6B9D`.
    pub color: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }

    /// Parse the hex color into RGB components, if it is well formed.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.color.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some((r, g, b))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The categories every fresh store starts with.
pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(id, name, color)| Category::new(*id, *name, *color))
        .collect()
}

/// Split pasted text into labels: one per line, blank lines skipped and any
/// leading `N. ` numbering removed.
pub fn parse_bulk_labels(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| NUMBERING_PREFIX.replace(line, "").trim().to_string())
        .filter(|label| !label.is_empty())
        .collect()
}

/// Entries grouped under their category, in category order. Categories with
/// no matching entries are left out, and so are entries whose category no
/// longer exists.
pub fn group_by_category<'a>(
    categories: &'a [Category],
    entries: &[&'a Entry],
) -> Vec<(&'a Category, Vec<&'a Entry>)> {
    categories
        .iter()
        .map(|category| {
            let members: Vec<&Entry> = entries
                .iter()
                .copied()
                .filter(|entry| entry.category_id == category.id)
                .collect();
            (category, members)
        })
        .filter(|(_, members)| !members.is_empty())
        .collect()
}
