use serde::{Deserialize, Serialize};
use tracing::info;

use super::collection::{Collection, generate_id};
use super::models::{
    ChannelPlatform, ChatMessage, ChatRole, IdeaNote, KnowledgeCategory, KnowledgeItem, Lead,
    OutreachTemplate, Readiness, Signal, Source, SourceKind, TrackedChannel,
};

pub const CONVERTED_LEAD_NAME: &str = "New company from signal";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workspace {
    #[default]
    Assist,
    Radar,
}

impl Workspace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assist => "assist",
            Self::Radar => "radar",
        }
    }
}

/// Panel state. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub assist_tab: String,
    pub radar_tab: String,
    pub sidebar_open: bool,
    pub sidebar_collapsed: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            assist_tab: "dashboard".to_string(),
            radar_tab: "dashboard".to_string(),
            sidebar_open: true,
            sidebar_collapsed: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistSpace {
    pub knowledge_items: Collection<KnowledgeItem>,
    pub sources: Collection<Source>,
    pub ideas: Collection<IdeaNote>,
    pub chat_messages: Collection<ChatMessage>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadarSpace {
    pub leads: Collection<Lead>,
    pub signals: Collection<Signal>,
    pub channels: Collection<TrackedChannel>,
    pub templates: Collection<OutreachTemplate>,
}

/// Every side collection of the dashboard, owned in one place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub workspace: Workspace,
    pub ui: UiState,
    pub assist: AssistSpace,
    pub radar: RadarSpace,
}

impl AppState {
    /// Fresh state with the default sources and tracked channels.
    pub fn seeded() -> Self {
        let mut state = Self::default();
        state.assist.sources = Collection::from_records(default_sources());
        state.radar.channels = Collection::from_records(default_channels());
        state
    }

    pub fn set_workspace(&mut self, workspace: Workspace) {
        self.workspace = workspace;
    }

    pub fn move_to_category(&mut self, id: &str, category: KnowledgeCategory) -> bool {
        self.assist
            .knowledge_items
            .update(id, |item| item.category = category)
    }

    pub fn add_chat_message(&mut self, role: ChatRole, content: impl Into<String>) -> ChatMessage {
        self.assist
            .chat_messages
            .add(ChatMessage::new(role, content))
            .clone()
    }

    pub fn clear_chat(&mut self) {
        self.assist.chat_messages.clear();
    }

    /// Turn a signal into a new lead and link the signal to it.
    ///
    /// Both collections change together or not at all. Returns the new
    /// lead's id, or `None` if the signal doesn't exist.
    pub fn convert_signal_to_lead(&mut self, signal_id: &str) -> Option<String> {
        let mut signal = self.radar.signals.get(signal_id)?.clone();
        let lead_id = generate_id();
        signal.lead_id = Some(lead_id.clone());

        let lead = Lead {
            id: lead_id.clone(),
            automation_readiness: Readiness::from_relevance(signal.relevance_score),
            score: signal.relevance_score,
            notes: signal.automation_opportunity.clone(),
            tags: signal.pain_points.clone(),
            signals: vec![signal],
            ..Lead::new(CONVERTED_LEAD_NAME)
        };

        self.radar.leads.push(lead);
        self.radar
            .signals
            .update(signal_id, |s| s.lead_id = Some(lead_id.clone()));

        info!(signal_id, lead_id = %lead_id, "signal converted to lead");
        Some(lead_id)
    }
}

fn default_sources() -> Vec<Source> {
    [
        ("1", "AI Explained", "https://youtube.com/@aiexplained-official", SourceKind::Youtube),
        ("2", "r/MachineLearning", "https://reddit.com/r/MachineLearning", SourceKind::Reddit),
        ("3", "r/LocalLLaMA", "https://reddit.com/r/LocalLLaMA", SourceKind::Reddit),
        ("4", "Hugging Face", "https://github.com/huggingface", SourceKind::Github),
    ]
    .into_iter()
    .map(|(id, name, url, kind)| Source {
        id: id.to_string(),
        ..Source::new(name, url, kind)
    })
    .collect()
}

fn default_channels() -> Vec<TrackedChannel> {
    [
        ("ch1", "r/smallbusiness", ChannelPlatform::Reddit, "https://reddit.com/r/smallbusiness", true, 24),
        ("ch2", "r/Entrepreneur", ChannelPlatform::Reddit, "https://reddit.com/r/Entrepreneur", true, 18),
        ("ch3", "Polish Startups", ChannelPlatform::Facebook, "https://facebook.com/groups/polishstartups", true, 12),
        (
            "ch4",
            "Automation & AI for Business",
            ChannelPlatform::Youtube,
            "https://youtube.com/@automationforbusiness",
            false,
            8,
        ),
    ]
    .into_iter()
    .map(|(id, name, platform, url, is_active, signals_found)| TrackedChannel {
        id: id.to_string(),
        is_active,
        signals_found,
        ..TrackedChannel::new(name, platform, url)
    })
    .collect()
}
