use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::collection::Record;

/// Generates `as_str`, `Display` and `FromStr` for a unit-variant enum from one
/// label table.
macro_rules! labeled_enum {
    ($name:ident, $what:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", $what, s)),
                }
            }
        }
    };
}

// ── Assist workspace ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeCategory {
    Youtube,
    Reddit,
    Github,
    Articles,
    Tools,
    Research,
    Ideas,
    Learning,
    #[default]
    Uncategorized,
}

labeled_enum!(KnowledgeCategory, "category" {
    Youtube => "youtube",
    Reddit => "reddit",
    Github => "github",
    Articles => "articles",
    Tools => "tools",
    Research => "research",
    Ideas => "ideas",
    Learning => "learning",
    Uncategorized => "uncategorized",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeSource {
    Youtube,
    Reddit,
    Github,
    #[default]
    Custom,
}

labeled_enum!(KnowledgeSource, "knowledge source" {
    Youtube => "youtube",
    Reddit => "reddit",
    Github => "github",
    Custom => "custom",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: KnowledgeCategory,
    pub source: KnowledgeSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub added_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl KnowledgeItem {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        category: KnowledgeCategory,
        source: KnowledgeSource,
    ) -> Self {
        Self {
            id: String::new(),
            url: url.into(),
            title: title.into(),
            description: None,
            category,
            source,
            thumbnail: None,
            added_at: Utc::now(),
            summary: None,
            tags: Vec::new(),
            is_favorite: false,
            notes: None,
        }
    }
}

impl Record for KnowledgeItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn on_insert(&mut self, now: DateTime<Utc>) {
        self.added_at = now;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Youtube,
    Reddit,
    Github,
    Rss,
    #[default]
    Custom,
}

labeled_enum!(SourceKind, "source type" {
    Youtube => "youtube",
    Reddit => "reddit",
    Github => "github",
    Rss => "rss",
    Custom => "custom",
});

/// A feed the scrapers watch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub name: String,
    pub url: String,
    pub kind: SourceKind,
    pub is_active: bool,
}

impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            url: url.into(),
            kind,
            is_active: true,
        }
    }
}

impl Record for Source {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeaCategory {
    #[default]
    Product,
    Strategy,
    Tech,
    Research,
    Inspiration,
}

labeled_enum!(IdeaCategory, "idea category" {
    Product => "product",
    Strategy => "strategy",
    Tech => "tech",
    Research => "research",
    Inspiration => "inspiration",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaNote {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: IdeaCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ids of knowledge items this idea refers to
    #[serde(default)]
    pub linked_items: Vec<String>,
}

impl IdeaNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>, category: IdeaCategory) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            title: title.into(),
            content: content.into(),
            category,
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
            linked_items: Vec::new(),
        }
    }
}

impl Record for IdeaNote {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn on_insert(&mut self, now: DateTime<Utc>) {
        self.created_at = now;
        self.updated_at = now;
    }

    fn on_update(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

labeled_enum!(ChatRole, "chat role" {
    User => "user",
    Assistant => "assistant",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

impl Record for ChatMessage {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn on_insert(&mut self, now: DateTime<Utc>) {
        self.timestamp = now;
    }
}

// ── Radar workspace ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanySize {
    Startup,
    Small,
    Medium,
    Enterprise,
}

labeled_enum!(CompanySize, "company size" {
    Startup => "startup",
    Small => "small",
    Medium => "medium",
    Enterprise => "enterprise",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    Detected,
    Qualified,
    Researched,
    OutreachReady,
    Contacted,
    Archived,
}

labeled_enum!(LeadStatus, "lead status" {
    Detected => "detected",
    Qualified => "qualified",
    Researched => "researched",
    OutreachReady => "outreach_ready",
    Contacted => "contacted",
    Archived => "archived",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Hot,
    #[default]
    Warm,
    Cold,
    NotReady,
}

labeled_enum!(Readiness, "readiness" {
    Hot => "hot",
    Warm => "warm",
    Cold => "cold",
    NotReady => "not_ready",
});

impl Readiness {
    /// Readiness implied by a signal's relevance score.
    pub fn from_relevance(relevance: u8) -> Self {
        if relevance > 80 { Self::Hot } else { Self::Warm }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    YoutubeComments,
    RedditPost,
    Linkedin,
    Twitter,
    FacebookGroup,
    Facebook,
    Instagram,
    Tiktok,
    #[default]
    Custom,
}

labeled_enum!(SignalSource, "signal source" {
    YoutubeComments => "youtube_comments",
    RedditPost => "reddit_post",
    Linkedin => "linkedin",
    Twitter => "twitter",
    FacebookGroup => "facebook_group",
    Facebook => "facebook",
    Instagram => "instagram",
    Tiktok => "tiktok",
    Custom => "custom",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Negative,
    #[default]
    Neutral,
    Positive,
}

labeled_enum!(Sentiment, "sentiment" {
    Negative => "negative",
    Neutral => "neutral",
    Positive => "positive",
});

/// A public post or comment that hints at an automation need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
    pub source: SignalSource,
    #[serde(default)]
    pub source_url: String,
    pub content: String,
    #[serde(default)]
    pub pain_points: Vec<String>,
    pub sentiment: Sentiment,
    #[serde(default)]
    pub automation_opportunity: String,
    pub detected_at: DateTime<Utc>,
    /// 0–100
    pub relevance_score: u8,
}

impl Signal {
    pub fn new(source: SignalSource, content: impl Into<String>, relevance_score: u8) -> Self {
        Self {
            id: String::new(),
            lead_id: None,
            source,
            source_url: String::new(),
            content: content.into(),
            pain_points: Vec::new(),
            sentiment: Sentiment::Neutral,
            automation_opportunity: String::new(),
            detected_at: Utc::now(),
            relevance_score: relevance_score.min(100),
        }
    }
}

impl Record for Signal {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn on_insert(&mut self, now: DateTime<Utc>) {
        self.detected_at = now;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<CompanySize>,
    pub status: LeadStatus,
    pub automation_readiness: Readiness,
    /// 0–100
    pub score: u8,
    pub detected_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub signals: Vec<Signal>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Lead {
    pub fn new(company_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            company_name: company_name.into(),
            website: None,
            industry: None,
            size: None,
            status: LeadStatus::Detected,
            automation_readiness: Readiness::Warm,
            score: 0,
            detected_at: now,
            last_updated: now,
            signals: Vec::new(),
            notes: String::new(),
            tags: Vec::new(),
        }
    }
}

impl Record for Lead {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn on_insert(&mut self, now: DateTime<Utc>) {
        self.detected_at = now;
        self.last_updated = now;
    }

    fn on_update(&mut self, now: DateTime<Utc>) {
        self.last_updated = now;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelPlatform {
    Youtube,
    Reddit,
    Linkedin,
    Twitter,
    Facebook,
}

labeled_enum!(ChannelPlatform, "channel platform" {
    Youtube => "youtube",
    Reddit => "reddit",
    Linkedin => "linkedin",
    Twitter => "twitter",
    Facebook => "facebook",
});

/// A community the signal scanner watches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedChannel {
    pub id: String,
    pub name: String,
    pub platform: ChannelPlatform,
    pub url: String,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scanned: Option<DateTime<Utc>>,
    pub signals_found: u32,
}

impl TrackedChannel {
    pub fn new(name: impl Into<String>, platform: ChannelPlatform, url: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            platform,
            url: url.into(),
            is_active: true,
            last_scanned: None,
            signals_found: 0,
        }
    }
}

impl Record for TrackedChannel {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn on_insert(&mut self, _now: DateTime<Utc>) {
        self.signals_found = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutreachTemplate {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub usage_count: u32,
}

impl Record for OutreachTemplate {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_tables_round_trip() {
        for status in [
            LeadStatus::Detected,
            LeadStatus::Qualified,
            LeadStatus::Researched,
            LeadStatus::OutreachReady,
            LeadStatus::Contacted,
            LeadStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<LeadStatus>().unwrap(), status);
        }
        assert_eq!(SignalSource::FacebookGroup.as_str(), "facebook_group");
        assert_eq!("not_ready".parse::<Readiness>().unwrap(), Readiness::NotReady);
        assert!("lukewarm".parse::<Readiness>().is_err());
    }

    #[test]
    fn test_serde_labels_match_as_str() {
        let json = serde_json::to_value(LeadStatus::OutreachReady).unwrap();
        assert_eq!(json, LeadStatus::OutreachReady.as_str());
        let json = serde_json::to_value(SignalSource::YoutubeComments).unwrap();
        assert_eq!(json, SignalSource::YoutubeComments.as_str());
    }

    #[test]
    fn test_readiness_from_relevance() {
        assert_eq!(Readiness::from_relevance(95), Readiness::Hot);
        assert_eq!(Readiness::from_relevance(81), Readiness::Hot);
        assert_eq!(Readiness::from_relevance(80), Readiness::Warm);
        assert_eq!(Readiness::from_relevance(0), Readiness::Warm);
    }

    #[test]
    fn test_signal_relevance_is_clamped() {
        assert_eq!(Signal::new(SignalSource::Custom, "x", 250).relevance_score, 100);
    }
}
