//! TTL-bounded store of the execution-command templates needed to build
//! recovery commands. Staleness is evaluated lazily on read, the same
//! watermark idiom used for cursor staleness elsewhere in this codebase.

use serde_json::Value;
use std::collections::HashMap;

/// Entries older than this are treated as absent and lazily purged.
pub const COMMAND_REFRESH_DELAY_SEC: i64 = 600;

#[derive(Debug, Clone)]
struct Entry {
    template: Value,
    inserted_at: i64,
}

#[derive(Debug, Default)]
pub struct CommandCache {
    entries: HashMap<String, Entry>,
}

impl CommandCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a deep copy of `template`, detaching it from whatever
    /// buffer the caller read it out of. Overwrites any prior entry.
    pub fn put(&mut self, name: &str, template: &Value, now: i64) {
        self.entries.insert(
            name.to_string(),
            Entry {
                template: template.clone(),
                inserted_at: now,
            },
        );
    }

    /// Returns a deep copy of the cached template if present and not
    /// expired, purging the entry in place if it has gone stale.
    pub fn get(&mut self, name: &str, now: i64) -> Option<Value> {
        let expired = match self.entries.get(name) {
            Some(entry) => now - entry.inserted_at > COMMAND_REFRESH_DELAY_SEC,
            None => return None,
        };
        if expired {
            self.entries.remove(name);
            return None;
        }
        self.entries.get(name).map(|e| e.template.clone())
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.remove(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}
