use super::errors::{NoteError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::SqlitePool;
use std::{cmp::Ordering, collections::HashSet};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: SqlitePool,
}

/// The fixed palette a note can be tagged with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[default]
    Yellow,
    Green,
    Blue,
    Pink,
    Purple,
    Gray,
}

impl Color {
    pub const PALETTE: [Color; 6] = [
        Color::Yellow,
        Color::Green,
        Color::Blue,
        Color::Pink,
        Color::Purple,
        Color::Gray,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Pink => "pink",
            Self::Purple => "purple",
            Self::Gray => "gray",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "yellow" => Some(Self::Yellow),
            "green" => Some(Self::Green),
            "blue" => Some(Self::Blue),
            "pink" => Some(Self::Pink),
            "purple" => Some(Self::Purple),
            "gray" => Some(Self::Gray),
            _ => None,
        }
    }

    /// Unknown or empty names fall back to the default color rather than
    /// failing; color is never a reason to reject a request.
    pub fn parse_lenient(s: &str) -> Self {
        Self::from_name(s.trim()).unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Color::parse_lenient).unwrap_or_default())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub checked: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            checked: false,
        }
    }

    /// Build a checklist from a block of text, one item per non-blank line.
    /// Lines are matched to `existing` items by position, so editing the
    /// text of an item keeps its id and checked state.
    pub fn from_lines(text: &str, existing: &[ChecklistItem]) -> Vec<Self> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(i, line)| match existing.get(i) {
                Some(prev) => ChecklistItem {
                    id: prev.id.clone(),
                    text: line.to_string(),
                    checked: prev.checked,
                },
                None => ChecklistItem::new(line),
            })
            .collect()
    }

    pub fn to_lines(items: &[ChecklistItem]) -> String {
        items
            .iter()
            .map(|i| i.text.as_str())
            .collect::<Vec<&str>>()
            .join("\n")
    }
}

/// What a note holds. Storage keeps both shapes in one row; everything past
/// `db_ops` sees exactly one of them. A checklist may still carry a line of
/// free text alongside its items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoteBody {
    Text {
        content: Option<String>,
    },
    Checklist {
        items: Vec<ChecklistItem>,
        content: Option<String>,
    },
}

impl Default for NoteBody {
    fn default() -> Self {
        NoteBody::Text { content: None }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "NoteJson", from = "NoteJson")]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub color: Color,
    pub pinned: bool,
    pub archived: bool,
    pub body: NoteBody,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn is_checklist(&self) -> bool {
        matches!(self.body, NoteBody::Checklist { .. })
    }

    pub fn content(&self) -> Option<&str> {
        match &self.body {
            NoteBody::Text { content } | NoteBody::Checklist { content, .. } => {
                content.as_deref()
            }
        }
    }

    pub fn checklist_items(&self) -> Option<&[ChecklistItem]> {
        match &self.body {
            NoteBody::Checklist { items, .. } => Some(items),
            NoteBody::Text { .. } => None,
        }
    }

    /// Case-insensitive substring match over the title and content. Checklist
    /// items are not searched. A blank query matches everything.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self
                .content()
                .map_or(false, |c| c.to_lowercase().contains(&needle))
    }

    /// The checklist with one item's checked state flipped, or `None` if
    /// this is not a checklist note or the item does not exist.
    pub fn toggled_item(&self, item_id: &str) -> Option<Vec<ChecklistItem>> {
        let items = self.checklist_items()?;
        if !items.iter().any(|i| i.id == item_id) {
            return None;
        }
        Some(
            items
                .iter()
                .cloned()
                .map(|mut i| {
                    if i.id == item_id {
                        i.checked = !i.checked;
                    }
                    i
                })
                .collect(),
        )
    }
}

/// Order of the active view: pinned notes first, then newest first. Ties on
/// the creation instant fall back to the newer id. `db_ops` spells the same
/// ordering in SQL; keep the two in step.
pub fn display_order(a: &Note, b: &Note) -> Ordering {
    b.pinned
        .cmp(&a.pinned)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

/// Wire representation; the flat shape API callers exchange.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteJson {
    id: i64,
    title: String,
    content: Option<String>,
    color: Color,
    pinned: bool,
    archived: bool,
    is_checklist: bool,
    checklist_items: Option<Vec<ChecklistItem>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Note> for NoteJson {
    fn from(note: Note) -> Self {
        let (is_checklist, content, checklist_items) = match note.body {
            NoteBody::Text { content } => (false, content, None),
            NoteBody::Checklist { items, content } => (true, content, Some(items)),
        };
        NoteJson {
            id: note.id,
            title: note.title,
            content,
            color: note.color,
            pinned: note.pinned,
            archived: note.archived,
            is_checklist,
            checklist_items,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

impl From<NoteJson> for Note {
    fn from(json: NoteJson) -> Self {
        let body = if json.is_checklist {
            NoteBody::Checklist {
                items: json.checklist_items.unwrap_or_default(),
                content: json.content,
            }
        } else {
            NoteBody::Text {
                content: json.content,
            }
        };
        Note {
            id: json.id,
            title: json.title,
            color: json.color,
            pinned: json.pinned,
            archived: json.archived,
            body,
            created_at: json.created_at,
            updated_at: json.updated_at,
        }
    }
}

/// Body of a create request. Everything but the title is optional and gets
/// defaulted in `validate`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_checklist: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist_items: Option<Vec<ChecklistItem>>,
}

impl CreateNote {
    pub fn text(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn checklist(title: impl Into<String>, items: Vec<ChecklistItem>) -> Self {
        Self {
            title: Some(title.into()),
            is_checklist: Some(true),
            checklist_items: Some(items),
            ..Default::default()
        }
    }

    pub fn validate(self) -> Result<NewNote> {
        let title = validate_title(self.title.as_deref().unwrap_or(""))?;
        let content = self.content.filter(|c| !c.is_empty());
        let body = if self.is_checklist.unwrap_or(false) {
            let items = self.checklist_items.unwrap_or_default();
            check_item_ids(&items)?;
            NoteBody::Checklist { items, content }
        } else {
            NoteBody::Text { content }
        };

        Ok(NewNote {
            title,
            color: self.color.unwrap_or_default(),
            pinned: self.pinned.unwrap_or(false),
            archived: self.archived.unwrap_or(false),
            body,
        })
    }
}

/// A create request that passed validation, with defaults applied.
#[derive(Clone, Debug, PartialEq)]
pub struct NewNote {
    pub title: String,
    pub color: Color,
    pub pinned: bool,
    pub archived: bool,
    pub body: NoteBody,
}

/// Body of a partial update. A field that is absent is left alone;
/// `content: null` clears the content.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist_items: Option<Vec<ChecklistItem>>,
}

impl UpdateNote {
    pub fn pinned(pinned: bool) -> Self {
        Self {
            pinned: Some(pinned),
            ..Default::default()
        }
    }

    pub fn archived(archived: bool) -> Self {
        Self {
            archived: Some(archived),
            ..Default::default()
        }
    }

    pub fn checklist_items(items: Vec<ChecklistItem>) -> Self {
        Self {
            checklist_items: Some(items),
            ..Default::default()
        }
    }

    /// Trims the title if one was supplied, and rejects updates that would
    /// leave a note untitled or with clashing checklist ids.
    pub fn validate(mut self) -> Result<Self> {
        if let Some(title) = &self.title {
            self.title = Some(validate_title(title)?);
        }
        if let Some(items) = &self.checklist_items {
            check_item_ids(items)?;
        }
        Ok(self)
    }
}

fn double_option<'de, T, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(NoteError::Validation("Title is required".into()));
    }
    Ok(trimmed.to_string())
}

fn check_item_ids(items: &[ChecklistItem]) -> Result<()> {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.id.as_str()) {
            return Err(NoteError::Validation(format!(
                "Duplicate checklist item id: {}",
                item.id
            )));
        }
    }
    Ok(())
}
