use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Kanban status of a news item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Inbox,
    Reviewed,
    Done,
    Trash,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 4] = [Self::Inbox, Self::Reviewed, Self::Done, Self::Trash];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Reviewed => "reviewed",
            Self::Done => "done",
            Self::Trash => "trash",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Inbox => "Inbox",
            Self::Reviewed => "Reviewed",
            Self::Done => "Done",
            Self::Trash => "Trash",
        }
    }

    /// Done and trash items are hidden from the working lanes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Trash)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbox" => Ok(Self::Inbox),
            "reviewed" => Ok(Self::Reviewed),
            "done" => Ok(Self::Done),
            "trash" => Ok(Self::Trash),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

// Rows written by the scrapers may carry a null or unrecognised status.
impl<'de> Deserialize<'de> for ItemStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .and_then(|s| s.parse::<ItemStatus>().ok())
            .unwrap_or_default())
    }
}

/// Where an item came from. Unknown platform strings round-trip through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourcePlatform {
    Youtube,
    Reddit,
    Github,
    Note,
    Prompt,
    ManualLink,
    Manual,
    Other(String),
}

impl SourcePlatform {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Youtube => "youtube",
            Self::Reddit => "reddit",
            Self::Github => "github",
            Self::Note => "note",
            Self::Prompt => "prompt",
            Self::ManualLink => "manual_link",
            Self::Manual => "manual",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for SourcePlatform {
    fn from(s: String) -> Self {
        match s.as_str() {
            "youtube" => Self::Youtube,
            "reddit" => Self::Reddit,
            "github" => Self::Github,
            "note" => Self::Note,
            "prompt" => Self::Prompt,
            "manual_link" => Self::ManualLink,
            "manual" => Self::Manual,
            _ => Self::Other(s),
        }
    }
}

impl From<SourcePlatform> for String {
    fn from(p: SourcePlatform) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for SourcePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SourcePlatform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SourcePlatform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(SourcePlatform::from).unwrap_or(Self::Manual))
    }
}

/// A kanban card, one row of `news_items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default = "default_platform")]
    pub source_platform: SourcePlatform,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        serialize_with = "none_as_empty"
    )]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary_points: Vec<String>,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default = "Utc::now", deserialize_with = "null_as_now")]
    pub published_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author_or_channel: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_platform() -> SourcePlatform {
    SourcePlatform::Manual
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_now<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    Ok(Option::<DateTime<Utc>>::deserialize(deserializer)?.unwrap_or_else(Utc::now))
}

/// Store ids arrive as text or as bigint keys.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "invalid id: expected a string or number, got {other}"
        ))),
    }
}

fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()))
}

fn none_as_empty<S: Serializer>(url: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(url.as_deref().unwrap_or(""))
}

impl Item {
    /// True when the query is empty or matches the title or any summary point.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query)
            || self
                .summary_points
                .iter()
                .any(|p| p.to_lowercase().contains(&query))
    }

    /// Category contains "hot" (case-insensitive).
    pub fn is_hot(&self) -> bool {
        self.category.to_lowercase().contains("hot")
    }
}

/// Manual entry kinds offered by the quick-add form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewItemKind {
    Link,
    Note,
    Prompt,
}

impl NewItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Note => "note",
            Self::Prompt => "prompt",
        }
    }

    fn default_title(&self) -> &'static str {
        match self {
            Self::Link => "New Link",
            Self::Note => "New Note",
            Self::Prompt => "New Prompt",
        }
    }

    fn platform(&self) -> SourcePlatform {
        match self {
            Self::Link => SourcePlatform::ManualLink,
            Self::Note => SourcePlatform::Note,
            Self::Prompt => SourcePlatform::Prompt,
        }
    }
}

impl FromStr for NewItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "link" => Ok(Self::Link),
            "note" => Ok(Self::Note),
            "prompt" => Ok(Self::Prompt),
            _ => Err(format!("Invalid item kind: {} (expected link, note or prompt)", s)),
        }
    }
}

/// A record about to be added to the board. The id is assigned on add.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub source_platform: SourcePlatform,
    pub title: String,
    pub url: Option<String>,
    pub summary_points: Vec<String>,
    pub status: ItemStatus,
    pub published_at: DateTime<Utc>,
    pub author_or_channel: String,
    pub category: String,
    pub notes: Option<String>,
}

impl NewItem {
    /// Quick-add entry: links keep the content as URL, notes and prompts as
    /// the single summary point.
    pub fn manual(kind: NewItemKind, content: &str, title: Option<&str>) -> Self {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(kind.default_title())
            .to_string();
        let content = content.trim().to_string();
        let (url, summary_points) = match kind {
            NewItemKind::Link => (Some(content).filter(|c| !c.is_empty()), Vec::new()),
            NewItemKind::Note | NewItemKind::Prompt => (None, vec![content]),
        };
        Self {
            source_platform: kind.platform(),
            title,
            url,
            summary_points,
            status: ItemStatus::Inbox,
            published_at: Utc::now(),
            author_or_channel: "User".to_string(),
            category: "Manual".to_string(),
            notes: None,
        }
    }

    pub fn into_item(self, id: String) -> Item {
        Item {
            id,
            source_platform: self.source_platform,
            title: self.title,
            url: self.url,
            summary_points: self.summary_points,
            status: self.status,
            published_at: self.published_at,
            author_or_channel: self.author_or_channel,
            category: self.category,
            notes: self.notes,
        }
    }
}

/// Partial field update for an item. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub summary_points: Option<Vec<String>>,
    pub notes: Option<String>,
    pub category: Option<String>,
    pub url: Option<String>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.summary_points.is_none()
            && self.notes.is_none()
            && self.category.is_none()
            && self.url.is_none()
    }

    pub fn apply(&self, item: &mut Item) {
        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(points) = &self.summary_points {
            item.summary_points = points.clone();
        }
        if let Some(notes) = &self.notes {
            item.notes = Some(notes.clone());
        }
        if let Some(category) = &self.category {
            item.category = category.clone();
        }
        if let Some(url) = &self.url {
            item.url = Some(url.clone()).filter(|u| !u.is_empty());
        }
    }

    /// The changed columns as a remote update body.
    pub fn to_row(&self) -> Value {
        let mut row = Map::new();
        if let Some(title) = &self.title {
            row.insert("title".into(), Value::from(title.as_str()));
        }
        if let Some(points) = &self.summary_points {
            row.insert("summary_points".into(), Value::from(points.clone()));
        }
        if let Some(notes) = &self.notes {
            row.insert("notes".into(), Value::from(notes.as_str()));
        }
        if let Some(category) = &self.category {
            row.insert("category".into(), Value::from(category.as_str()));
        }
        if let Some(url) = &self.url {
            row.insert("url".into(), Value::from(url.as_str()));
        }
        Value::Object(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_status_as_str_and_from_str() {
        for status in ItemStatus::ALL {
            assert_eq!(status.as_str().parse::<ItemStatus>().unwrap(), status);
        }
        assert!("Done".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn test_item_from_scraper_row_with_nulls() {
        let row = json!({
            "id": "n1",
            "source_platform": "youtube",
            "title": "GPT-5 rumours",
            "url": "https://youtube.com/watch?v=abc",
            "summary_points": null,
            "status": null,
            "published_at": "2026-03-01T10:00:00Z",
            "author_or_channel": null,
            "category": "Hot"
        });
        let item: Item = serde_json::from_value(row).unwrap();
        assert_eq!(item.status, ItemStatus::Inbox);
        assert!(item.summary_points.is_empty());
        assert_eq!(item.author_or_channel, "");
        assert_eq!(item.source_platform, SourcePlatform::Youtube);
        assert!(item.is_hot());
    }

    #[test]
    fn test_null_timestamp_and_numeric_id() {
        let before = Utc::now();
        let item: Item = serde_json::from_value(json!({
            "id": 42,
            "title": "Bigint key",
            "published_at": null
        }))
        .unwrap();
        assert_eq!(item.id, "42");
        assert!(item.published_at >= before);

        let err = serde_json::from_value::<Item>(json!({"id": null})).unwrap_err();
        assert!(err.to_string().contains("invalid id"));
    }

    #[test]
    fn test_unknown_status_reads_as_inbox() {
        let item: Item = serde_json::from_value(json!({
            "id": "n2",
            "status": "archived",
            "published_at": "2026-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(item.status, ItemStatus::Inbox);
    }

    #[test]
    fn test_unknown_platform_is_preserved() {
        let item: Item = serde_json::from_value(json!({
            "id": "n3",
            "source_platform": "hackernews",
            "published_at": "2026-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(
            item.source_platform,
            SourcePlatform::Other("hackernews".to_string())
        );
        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["source_platform"], "hackernews");
    }

    #[test]
    fn test_empty_url_is_absent_and_written_back_as_empty() {
        let item: Item = serde_json::from_value(json!({
            "id": "n4",
            "url": "",
            "published_at": "2026-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(item.url, None);
        assert_eq!(serde_json::to_value(&item).unwrap()["url"], "");
    }

    #[test]
    fn test_manual_link_entry() {
        let new = NewItem::manual(NewItemKind::Link, " https://example.com ", None);
        assert_eq!(new.title, "New Link");
        assert_eq!(new.url.as_deref(), Some("https://example.com"));
        assert!(new.summary_points.is_empty());
        assert_eq!(new.source_platform, SourcePlatform::ManualLink);
        assert_eq!(new.status, ItemStatus::Inbox);
        assert_eq!(new.author_or_channel, "User");
        assert_eq!(new.category, "Manual");
    }

    #[test]
    fn test_manual_note_and_prompt_entries() {
        let note = NewItem::manual(NewItemKind::Note, "remember this", Some("Idea"));
        assert_eq!(note.title, "Idea");
        assert_eq!(note.url, None);
        assert_eq!(note.summary_points, vec!["remember this"]);
        assert_eq!(note.source_platform, SourcePlatform::Note);

        let prompt = NewItem::manual(NewItemKind::Prompt, "act as a reviewer", Some("  "));
        assert_eq!(prompt.title, "New Prompt");
        assert_eq!(prompt.source_platform, SourcePlatform::Prompt);
    }

    #[test]
    fn test_matches_query_title_or_summary() {
        let mut item = NewItem::manual(NewItemKind::Note, "Vector databases compared", Some("Weekly"))
            .into_item("n5".into());
        assert!(item.matches_query(""));
        assert!(item.matches_query("weekly"));
        assert!(item.matches_query("VECTOR"));
        assert!(!item.matches_query("kubernetes"));
        item.summary_points.clear();
        assert!(!item.matches_query("vector"));
    }

    #[test]
    fn test_patch_apply_and_row() {
        let mut item = NewItem::manual(NewItemKind::Note, "a", None).into_item("n6".into());
        let patch = ItemPatch {
            title: Some("Renamed".into()),
            summary_points: Some(vec!["x".into(), "y".into()]),
            ..Default::default()
        };
        patch.apply(&mut item);
        assert_eq!(item.title, "Renamed");
        assert_eq!(item.summary_points, vec!["x", "y"]);
        assert_eq!(
            patch.to_row(),
            json!({"title": "Renamed", "summary_points": ["x", "y"]})
        );
        assert!(!patch.is_empty());
        assert!(ItemPatch::default().is_empty());
    }
}
