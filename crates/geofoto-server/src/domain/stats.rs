use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const TOP_CONTRIBUTOR_LIMIT: usize = 5;
pub const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contributor {
    pub nama_penginput: String,
    pub total_entries: u64,
}

#[derive(Debug, Serialize)]
pub struct Stats {
    pub total_entries: i64,
    pub recent_entries_7days: i64,
    pub top_contributors: Vec<Contributor>,
    pub last_updated: DateTime<Utc>,
}

/// Ranks submitters by how many rows they own. The sort is stable, so submitters
/// with equal counts stay in the order they were first seen in `names`.
pub fn top_contributors(names: &[String], limit: usize) -> Vec<Contributor> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut tally: Vec<Contributor> = Vec::new();

    for name in names {
        match index.get(name.as_str()) {
            Some(&i) => tally[i].total_entries += 1,
            None => {
                index.insert(name.as_str(), tally.len());
                tally.push(Contributor {
                    nama_penginput: name.clone(),
                    total_entries: 1,
                });
            }
        }
    }

    tally.sort_by(|a, b| b.total_entries.cmp(&a.total_entries));
    tally.truncate(limit);
    tally
}
