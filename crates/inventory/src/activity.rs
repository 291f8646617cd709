//! Human-readable activity history (observational only).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quartermaster_core::{ActivityId, Entity, ItemId, UserId};

/// Entries kept after each write.
pub const DEFAULT_ACTIVITY_CAP: usize = 100;
/// Entries returned by a recent-activity read.
pub const DEFAULT_RECENT_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: ActivityId,
    pub user_id: Option<UserId>,
    pub user_name: String,
    pub action: String,
    pub item_name: String,
    pub item_id: Option<ItemId>,
    pub created_at: DateTime<Utc>,
}

impl ActivityLogEntry {
    pub fn from_new(id: ActivityId, new: NewActivity, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: new.user_id,
            user_name: new.user_name,
            action: new.action,
            item_name: new.item_name,
            item_id: new.item_id,
            created_at: now,
        }
    }
}

impl Entity for ActivityLogEntry {
    type Id = ActivityId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivity {
    pub user_id: Option<UserId>,
    pub user_name: String,
    pub action: String,
    pub item_name: String,
    pub item_id: Option<ItemId>,
}

impl NewActivity {
    pub fn new(
        user_id: Option<UserId>,
        user_name: impl Into<String>,
        action: impl Into<String>,
        item_name: impl Into<String>,
        item_id: Option<ItemId>,
    ) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            action: action.into(),
            item_name: item_name.into(),
            item_id,
        }
    }
}

/// Prepend `entry` to a newest-first log and drop everything past `cap`.
pub fn push_capped(log: &mut Vec<ActivityLogEntry>, entry: ActivityLogEntry, cap: usize) {
    log.insert(0, entry);
    log.truncate(cap);
}

/// First `limit` entries of a newest-first log.
pub fn recent(log: &[ActivityLogEntry], limit: usize) -> Vec<ActivityLogEntry> {
    log.iter().take(limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> ActivityLogEntry {
        ActivityLogEntry::from_new(
            ActivityId::new(),
            NewActivity::new(None, "Administrator", format!("Action {n}"), "Thing", None),
            Utc::now(),
        )
    }

    #[test]
    fn keeps_at_most_cap_entries_dropping_oldest() {
        let mut log = Vec::new();
        for n in 0..130 {
            push_capped(&mut log, entry(n), DEFAULT_ACTIVITY_CAP);
        }
        assert_eq!(log.len(), DEFAULT_ACTIVITY_CAP);
        assert_eq!(log[0].action, "Action 129");
        assert_eq!(log[99].action, "Action 30");
    }

    #[test]
    fn recent_is_newest_first_and_limited() {
        let mut log = Vec::new();
        for n in 0..70 {
            push_capped(&mut log, entry(n), DEFAULT_ACTIVITY_CAP);
        }
        let r = recent(&log, DEFAULT_RECENT_LIMIT);
        assert_eq!(r.len(), 50);
        assert_eq!(r[0].action, "Action 69");
        assert_eq!(recent(&log[..3], 50).len(), 3);
    }
}
