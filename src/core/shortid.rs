//! Short references like `@1`, `@2` for the cans of the last listing
//!
//! The index is rewritten by every `paint list` and stored in
//! `.botes/shortids.json`, so `@N` always means "row N of what you last saw".

use std::collections::{BTreeMap, HashMap};
use std::fs;

use crate::core::identity::RecordId;
use crate::core::project::Project;

/// Index file name inside `.botes/`
const INDEX_FILE: &str = "shortids.json";

/// A mapping of short numbers to record ids
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ShortIdIndex {
    entries: BTreeMap<u32, RecordId>,
    #[serde(skip)]
    reverse: HashMap<RecordId, u32>,
    next_id: u32,
}

impl ShortIdIndex {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            reverse: HashMap::new(),
            next_id: 1,
        }
    }

    /// Load the index from a project, or start empty if missing or unreadable
    pub fn load(project: &Project) -> Self {
        let path = project.botes_dir().join(INDEX_FILE);
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::new();
        };
        match serde_json::from_str::<ShortIdIndex>(&content) {
            Ok(mut index) => {
                index.reverse = index.entries.iter().map(|(k, v)| (*v, *k)).collect();
                index
            }
            Err(e) => {
                tracing::debug!(error = %e, "discarding unreadable short id index");
                Self::new()
            }
        }
    }

    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let path = project.botes_dir().join(INDEX_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
    }

    /// Clear and renumber from 1 in the given order
    pub fn rebuild(&mut self, ids: impl IntoIterator<Item = RecordId>) {
        self.entries.clear();
        self.reverse.clear();
        self.next_id = 1;

        for id in ids {
            self.add(id);
        }
    }

    /// Add an id and return its short number
    pub fn add(&mut self, id: RecordId) -> u32 {
        if let Some(&short_id) = self.reverse.get(&id) {
            return short_id;
        }

        let short_id = self.next_id;
        self.next_id += 1;
        self.entries.insert(short_id, id);
        self.reverse.insert(id, short_id);
        short_id
    }

    /// Look up `@N` or a bare `N`; anything else is not a short reference
    pub fn resolve(&self, reference: &str) -> Option<RecordId> {
        if !is_short_reference(reference) {
            return None;
        }
        reference
            .trim_start_matches('@')
            .parse::<u32>()
            .ok()
            .and_then(|n| self.entries.get(&n).copied())
    }

    pub fn get_short_id(&self, id: &RecordId) -> Option<u32> {
        self.reverse.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// True if the reference uses the `@N` or `N` form
pub fn is_short_reference(reference: &str) -> bool {
    let number = reference.strip_prefix('@').unwrap_or(reference);
    !number.is_empty() && number.chars().all(|c| c.is_ascii_digit())
}
