//! Display lanes and board statistics, derived on demand from the item list.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use super::models::{Item, ItemStatus, SourcePlatform};
use super::zones::{
    AUTHOR_LANE_PREFIX, DONE_ZONE, INBOX_ZONE, REDDIT_ZONE, SUBREDDIT_LANE_PREFIX, TRASH_ZONE,
    YOUTUBE_ZONE,
};

static SUBREDDIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"reddit\.com/r/([^/?#]+)").unwrap_or_else(|e| panic!("invalid subreddit regex: {e}"))
});

/// Which sources the board is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceFilter {
    #[default]
    All,
    Youtube,
    Reddit,
}

impl SourceFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Youtube => "youtube",
            Self::Reddit => "reddit",
        }
    }

    fn admits(&self, item: &Item) -> bool {
        match self {
            Self::All => true,
            Self::Youtube => item.source_platform == SourcePlatform::Youtube,
            Self::Reddit => item.source_platform == SourcePlatform::Reddit,
        }
    }
}

impl fmt::Display for SourceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "youtube" => Ok(Self::Youtube),
            "reddit" => Ok(Self::Reddit),
            _ => Err(format!("Invalid filter: {}", s)),
        }
    }
}

/// One column of the board. The id doubles as the drop-zone id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lane {
    pub id: String,
    pub title: String,
    pub items: Vec<Item>,
}

impl Lane {
    fn new(id: impl Into<String>, title: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            items,
        }
    }
}

/// `r/<name>` from a Reddit URL, if it has a `/r/` segment.
///
/// The segment is taken after the `reddit.com/r/` host path, never from an
/// earlier `/r/`, and stops at `/`, `?` or `#`.
pub fn subreddit_from_url(url: &str) -> Option<String> {
    SUBREDDIT_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| format!("r/{}", m.as_str()))
}

fn subreddit_of(item: &Item) -> String {
    item.url
        .as_deref()
        .and_then(subreddit_from_url)
        .unwrap_or_else(|| item.author_or_channel.clone())
}

/// Group items into lanes for the given filter and search query.
///
/// Items come in the board's order (newest first) and keep that order
/// within each lane.
pub fn build_lanes(items: &[Item], filter: SourceFilter, query: &str) -> Vec<Lane> {
    let visible: Vec<&Item> = items
        .iter()
        .filter(|i| filter.admits(i) && i.matches_query(query))
        .collect();
    let working = || visible.iter().filter(|i| !i.status.is_terminal());

    let mut lanes = match filter {
        SourceFilter::All => vec![
            Lane::new(
                YOUTUBE_ZONE,
                "YouTube",
                working()
                    .filter(|i| i.source_platform == SourcePlatform::Youtube)
                    .map(|i| (*i).clone())
                    .collect(),
            ),
            Lane::new(
                REDDIT_ZONE,
                "Reddit",
                working()
                    .filter(|i| i.source_platform == SourcePlatform::Reddit)
                    .map(|i| (*i).clone())
                    .collect(),
            ),
            Lane::new(
                INBOX_ZONE,
                "Inbox",
                working()
                    .filter(|i| {
                        !matches!(
                            i.source_platform,
                            SourcePlatform::Youtube | SourcePlatform::Reddit
                        )
                    })
                    .map(|i| (*i).clone())
                    .collect(),
            ),
        ],
        SourceFilter::Youtube => {
            grouped(working(), AUTHOR_LANE_PREFIX, |i| i.author_or_channel.clone())
        }
        SourceFilter::Reddit => grouped(working(), SUBREDDIT_LANE_PREFIX, subreddit_of),
    };

    for status in [ItemStatus::Done, ItemStatus::Trash] {
        let id = if status == ItemStatus::Done {
            DONE_ZONE
        } else {
            TRASH_ZONE
        };
        let items = visible
            .iter()
            .filter(|i| i.status == status)
            .map(|i| (*i).clone())
            .collect();
        lanes.push(Lane::new(id, status.label(), items));
    }
    lanes
}

fn grouped<'a>(
    items: impl Iterator<Item = &'a &'a Item>,
    prefix: &str,
    key: impl Fn(&Item) -> String,
) -> Vec<Lane> {
    let mut groups: BTreeMap<String, Vec<Item>> = BTreeMap::new();
    for item in items {
        groups.entry(key(item)).or_default().push((*item).clone());
    }
    groups
        .into_iter()
        .map(|(name, items)| Lane::new(format!("{prefix}{name}"), name, items))
        .collect()
}

/// Header counters for the board.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardStats {
    pub inbox: usize,
    pub done: usize,
    pub hot: usize,
    pub most_recent: Option<DateTime<Utc>>,
}

pub fn board_stats(items: &[Item]) -> BoardStats {
    BoardStats {
        inbox: items.iter().filter(|i| i.status == ItemStatus::Inbox).count(),
        done: items.iter().filter(|i| i.status == ItemStatus::Done).count(),
        hot: items.iter().filter(|i| i.is_hot()).count(),
        most_recent: items.iter().map(|i| i.published_at).max(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(id: &str, platform: SourcePlatform, author: &str, url: &str, status: ItemStatus) -> Item {
        Item {
            id: id.to_string(),
            source_platform: platform,
            title: format!("Title {id}"),
            url: Some(url.to_string()).filter(|u| !u.is_empty()),
            summary_points: vec![],
            status,
            published_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            author_or_channel: author.to_string(),
            category: String::new(),
            notes: None,
        }
    }

    fn sample() -> Vec<Item> {
        vec![
            item("y1", SourcePlatform::Youtube, "Fireship", "", ItemStatus::Inbox),
            item("y2", SourcePlatform::Youtube, "AI Explained", "", ItemStatus::Inbox),
            item("y3", SourcePlatform::Youtube, "Fireship", "", ItemStatus::Done),
            item(
                "r1",
                SourcePlatform::Reddit,
                "u/someone",
                "https://www.reddit.com/r/LocalLLaMA/comments/abc/title/",
                ItemStatus::Inbox,
            ),
            item("r2", SourcePlatform::Reddit, "r/rust", "https://example.com/post", ItemStatus::Trash),
            item("m1", SourcePlatform::Note, "User", "", ItemStatus::Reviewed),
        ]
    }

    fn ids(lane: &Lane) -> Vec<&str> {
        lane.items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_all_filter_fixed_lanes() {
        let lanes = build_lanes(&sample(), SourceFilter::All, "");
        let lane_ids: Vec<&str> = lanes.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(lane_ids, vec!["youtube_col", "reddit_col", "inbox", "done", "trash"]);
        assert_eq!(ids(&lanes[0]), vec!["y1", "y2"]);
        assert_eq!(ids(&lanes[1]), vec!["r1"]);
        assert_eq!(ids(&lanes[2]), vec!["m1"]);
        assert_eq!(ids(&lanes[3]), vec!["y3"]);
        assert_eq!(ids(&lanes[4]), vec!["r2"]);
    }

    #[test]
    fn test_youtube_filter_groups_by_author_sorted() {
        let lanes = build_lanes(&sample(), SourceFilter::Youtube, "");
        assert_eq!(lanes[0].id, "yt_AI Explained");
        assert_eq!(lanes[0].title, "AI Explained");
        assert_eq!(lanes[1].id, "yt_Fireship");
        assert_eq!(ids(&lanes[1]), vec!["y1"]);
        assert_eq!(lanes[2].id, "done");
        assert_eq!(ids(&lanes[2]), vec!["y3"]);
    }

    #[test]
    fn test_reddit_filter_parses_subreddit_and_falls_back_to_author() {
        let mut items = sample();
        items.push(item("r3", SourcePlatform::Reddit, "r/rust", "", ItemStatus::Inbox));
        let lanes = build_lanes(&items, SourceFilter::Reddit, "");
        let lane_ids: Vec<&str> = lanes.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(lane_ids, vec!["rd_r/LocalLLaMA", "rd_r/rust", "done", "trash"]);
        assert_eq!(ids(&lanes[1]), vec!["r3"]);
    }

    #[test]
    fn test_subreddit_from_url() {
        assert_eq!(
            subreddit_from_url("https://reddit.com/r/MachineLearning/comments/1"),
            Some("r/MachineLearning".to_string())
        );
        assert_eq!(
            subreddit_from_url("https://www.reddit.com/r/rust"),
            Some("r/rust".to_string())
        );
        assert_eq!(subreddit_from_url("https://reddit.com/R/rust"), None);
        assert_eq!(subreddit_from_url("https://example.com/r/rust"), None);
    }

    #[test]
    fn test_subreddit_ignores_query_and_earlier_segments() {
        assert_eq!(
            subreddit_from_url("https://reddit.com/r/rust?sort=new#top"),
            Some("r/rust".to_string())
        );
        assert_eq!(
            subreddit_from_url("https://mirror.example/r/spam/https://old.reddit.com/r/rust/"),
            Some("r/rust".to_string())
        );
        assert_eq!(subreddit_from_url("https://reddit.com/r/"), None);
    }

    #[test]
    fn test_search_applies_before_grouping() {
        let lanes = build_lanes(&sample(), SourceFilter::All, "title y2");
        assert_eq!(ids(&lanes[0]), vec!["y2"]);
        assert!(lanes[1..].iter().all(|l| l.items.is_empty()));
    }

    #[test]
    fn test_board_stats() {
        let mut items = sample();
        items[0].category = "HOT take".into();
        items[1].published_at = Utc.with_ymd_and_hms(2026, 4, 1, 8, 0, 0).unwrap();
        let stats = board_stats(&items);
        assert_eq!(stats.inbox, 3);
        assert_eq!(stats.done, 1);
        assert_eq!(stats.hot, 1);
        assert_eq!(stats.most_recent, Some(items[1].published_at));
        assert_eq!(board_stats(&[]), BoardStats::default());
    }
}
