//! Pull side collections from the remote row store.
//!
//! Rows come back snake_case and loosely typed; everything here maps them onto
//! the local records with the same defaults the dashboard has always applied.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::collection::generate_id;
use super::models::{
    CompanySize, KnowledgeCategory, KnowledgeItem, KnowledgeSource, Lead, LeadStatus, Readiness,
    Sentiment, Signal, SignalSource, Source, SourceKind,
};
use super::state::AppState;
use crate::board::{Item, ItemStatus, SourcePlatform};
use crate::errors::StoreError;
use crate::store::{RowStore, Table, row_id};

const MISSING_COMMENT: &str = "No comment text";
const DEFAULT_OPPORTUNITY: &str = "Potential customer-service automation";
const SYNTHETIC_CONTENT: &str =
    "High business relevance detected from profile and post content.";
const SYNTHETIC_OPPORTUNITY: &str =
    "Activity patterns suggest potential for process automation.";

/// Leads with at least this score get a synthetic signal when the row has none.
pub const SYNTHETIC_SIGNAL_MIN_SCORE: u8 = 10;

/// Leads plus the signals flattened out of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadSync {
    pub leads: Vec<Lead>,
    pub signals: Vec<Signal>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LeadRow {
    company_name: Option<String>,
    website: Option<String>,
    industry: Option<String>,
    size: Option<String>,
    status: Option<String>,
    automation_readiness: Option<String>,
    score: Option<f64>,
    detected_at: Option<DateTime<Utc>>,
    last_updated: Option<DateTime<Utc>>,
    notes: Option<String>,
    tags: Option<Vec<String>>,
    signals: Option<Vec<Value>>,
    contact_info: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SourceRow {
    name: Option<String>,
    identifier: Option<String>,
    platform: Option<String>,
}

fn decode<T: for<'de> Deserialize<'de>>(table: Table, row: Value) -> Result<T, StoreError> {
    serde_json::from_value(row).map_err(|source| StoreError::Decode {
        table: table.as_str().to_string(),
        source,
    })
}

fn clamp_score(score: Option<f64>) -> u8 {
    score.unwrap_or(0.0).clamp(0.0, 100.0).round() as u8
}

/// Map one `leads` row and the signals it carries.
pub fn lead_from_row(row: Value) -> Result<(Lead, Vec<Signal>), StoreError> {
    let id = row_id(&row).unwrap_or_else(generate_id);
    let raw: LeadRow = decode(Table::Leads, row)?;
    let now = Utc::now();

    let detected_at = raw.detected_at.unwrap_or(now);
    let mut lead = Lead {
        id: id.clone(),
        website: raw.website.filter(|w| !w.is_empty()),
        industry: raw.industry,
        size: Some(
            raw.size
                .and_then(|s| s.parse().ok())
                .unwrap_or(CompanySize::Small),
        ),
        status: raw
            .status
            .and_then(|s| s.parse().ok())
            .unwrap_or(LeadStatus::Detected),
        automation_readiness: raw
            .automation_readiness
            .and_then(|s| s.parse().ok())
            .unwrap_or(Readiness::Warm),
        score: clamp_score(raw.score),
        detected_at,
        last_updated: raw.last_updated.unwrap_or(detected_at),
        notes: raw.notes.unwrap_or_default(),
        tags: raw.tags.unwrap_or_default(),
        ..Lead::new(raw.company_name.unwrap_or_default())
    };

    let source = if lead.tags.iter().any(|t| t == "instagram") {
        SignalSource::Instagram
    } else {
        SignalSource::Custom
    };
    let source_url = raw
        .contact_info
        .as_ref()
        .and_then(|c| c.get("url"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| lead.website.clone())
        .unwrap_or_default();

    let raw_signals = raw.signals.unwrap_or_default();
    let signals = if !raw_signals.is_empty() {
        let signals: Vec<Signal> = raw_signals
            .iter()
            .map(|s| Signal {
                id: s
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(generate_id),
                lead_id: Some(id.clone()),
                source,
                source_url: source_url.clone(),
                content: signal_text(s),
                pain_points: vec![
                    s.get("category")
                        .and_then(Value::as_str)
                        .filter(|c| !c.is_empty())
                        .unwrap_or("General")
                        .to_string(),
                ],
                sentiment: Sentiment::Negative,
                automation_opportunity: if lead.notes.is_empty() {
                    DEFAULT_OPPORTUNITY.to_string()
                } else {
                    lead.notes.clone()
                },
                detected_at,
                relevance_score: lead.score,
            })
            .collect();
        lead.signals = signals.clone();
        signals
    } else if lead.score >= SYNTHETIC_SIGNAL_MIN_SCORE {
        vec![Signal {
            id: format!("syn-{}", id),
            lead_id: Some(id.clone()),
            source,
            source_url,
            content: if lead.notes.is_empty() {
                SYNTHETIC_CONTENT.to_string()
            } else {
                lead.notes.clone()
            },
            pain_points: if lead.tags.is_empty() {
                vec!["general".to_string()]
            } else {
                lead.tags.clone()
            },
            sentiment: Sentiment::Neutral,
            automation_opportunity: SYNTHETIC_OPPORTUNITY.to_string(),
            detected_at,
            relevance_score: lead.score,
        }]
    } else {
        Vec::new()
    };

    Ok((lead, signals))
}

/// A signal entry is either a bare string or an object with `text`/`content`.
fn signal_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other
            .get("text")
            .or_else(|| other.get("content"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(MISSING_COMMENT)
            .to_string(),
    }
}

/// Read `leads` ordered by score, highest first.
pub async fn fetch_leads(store: &dyn RowStore) -> Result<LeadSync, StoreError> {
    let rows = store.select_ordered(Table::Leads, "score", true).await?;
    let mut sync = LeadSync::default();
    for row in rows {
        let (lead, signals) = lead_from_row(row)?;
        sync.leads.push(lead);
        sync.signals.extend(signals);
    }
    info!(
        leads = sync.leads.len(),
        signals = sync.signals.len(),
        "leads fetched"
    );
    Ok(sync)
}

/// Map one `sources` row.
pub fn source_from_row(row: Value) -> Result<Source, StoreError> {
    let id = row_id(&row).unwrap_or_else(generate_id);
    let raw: SourceRow = decode(Table::Sources, row)?;
    Ok(Source {
        id,
        ..Source::new(
            raw.name.unwrap_or_default(),
            raw.identifier.unwrap_or_default(),
            raw.platform
                .and_then(|p| p.parse().ok())
                .unwrap_or(SourceKind::Custom),
        )
    })
}

/// The row written to `sources` for a new feed.
pub fn source_row(source: &Source) -> Value {
    json!({
        "id": source.id,
        "name": source.name,
        "identifier": source.url,
        "platform": source.kind.as_str(),
        "created_at": Utc::now(),
    })
}

/// Read `sources`, newest first.
pub async fn fetch_sources(store: &dyn RowStore) -> Result<Vec<Source>, StoreError> {
    let rows = store.select_ordered(Table::Sources, "created_at", true).await?;
    let sources = rows
        .into_iter()
        .map(source_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    info!(count = sources.len(), "sources fetched");
    Ok(sources)
}

/// Remove a source from `sources`.
pub async fn delete_source(store: &dyn RowStore, id: &str) -> Result<(), StoreError> {
    store.delete(Table::Sources, id).await?;
    info!(id, "source deleted");
    Ok(())
}

/// Show a news row in the knowledge library.
pub fn knowledge_from_news(item: &Item) -> KnowledgeItem {
    let category = match item.source_platform {
        SourcePlatform::Youtube => KnowledgeCategory::Youtube,
        SourcePlatform::Reddit => KnowledgeCategory::Reddit,
        SourcePlatform::Github => KnowledgeCategory::Github,
        SourcePlatform::Note => KnowledgeCategory::Ideas,
        SourcePlatform::Prompt => KnowledgeCategory::Tools,
        _ => KnowledgeCategory::Uncategorized,
    };
    let source = match item.source_platform {
        SourcePlatform::Youtube => KnowledgeSource::Youtube,
        SourcePlatform::Reddit => KnowledgeSource::Reddit,
        SourcePlatform::Github => KnowledgeSource::Github,
        _ => KnowledgeSource::Custom,
    };
    let description = item.summary_points.join(" ");

    KnowledgeItem {
        id: item.id.clone(),
        description: Some(description),
        added_at: item.published_at,
        is_favorite: item.status == ItemStatus::Done,
        notes: item.notes.clone(),
        ..KnowledgeItem::new(
            item.url.clone().unwrap_or_default(),
            item.title.clone(),
            category,
            source,
        )
    }
}

/// Read `news_items` and map them into knowledge items, newest first.
pub async fn fetch_knowledge(store: &dyn RowStore) -> Result<Vec<KnowledgeItem>, StoreError> {
    let rows = store
        .select_ordered(Table::NewsItems, "published_at", true)
        .await?;
    let items = rows
        .into_iter()
        .map(|row| decode::<Item>(Table::NewsItems, row))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items.iter().map(knowledge_from_news).collect())
}

impl AppState {
    /// Replace leads. Signals are replaced only when the sync derived any.
    pub fn apply_lead_sync(&mut self, sync: LeadSync) {
        self.radar.leads.replace_all(sync.leads);
        if sync.signals.is_empty() {
            warn!("lead sync produced no signals; keeping the current signal list");
        } else {
            self.radar.signals.replace_all(sync.signals);
        }
    }
}
