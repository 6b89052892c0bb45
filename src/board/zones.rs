//! Drop-zone resolution.
//!
//! | zone id                              | resulting status |
//! |--------------------------------------|------------------|
//! | `done`                               | `done`           |
//! | `trash`                              | `trash`          |
//! | `inbox`, `youtube_col`, `reddit_col` | `inbox`          |
//! | `yt_<author>`, `rd_<sub>`            | `inbox`          |
//! | anything else                        | ignored          |

use super::models::ItemStatus;

pub const DONE_ZONE: &str = "done";
pub const TRASH_ZONE: &str = "trash";
pub const INBOX_ZONE: &str = "inbox";
pub const YOUTUBE_ZONE: &str = "youtube_col";
pub const REDDIT_ZONE: &str = "reddit_col";

pub const AUTHOR_LANE_PREFIX: &str = "yt_";
pub const SUBREDDIT_LANE_PREFIX: &str = "rd_";

/// Map a drop target to the status it assigns. `None` means the drop is ignored.
pub fn resolve_zone(zone: &str) -> Option<ItemStatus> {
    match zone {
        DONE_ZONE => Some(ItemStatus::Done),
        TRASH_ZONE => Some(ItemStatus::Trash),
        INBOX_ZONE | YOUTUBE_ZONE | REDDIT_ZONE => Some(ItemStatus::Inbox),
        z if z.starts_with(AUTHOR_LANE_PREFIX) || z.starts_with(SUBREDDIT_LANE_PREFIX) => {
            Some(ItemStatus::Inbox)
        }
        _ => None,
    }
}
