//! Per-thread conversation history.
//!
//! One process-wide store maps opaque thread keys to bounded turn logs.
//! Eviction is oldest-first once a thread exceeds the configured cap. The
//! cap bounds turns per thread only; thread keys themselves are never
//! reaped, so long-lived deployments accumulate them for the process
//! lifetime.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    User,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "User"),
            Speaker::Assistant => write!(f, "Assistant"),
        }
    }
}

/// One recorded utterance within a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

/// Keyed conversation history.
///
/// A trait so the in-memory map can later be swapped for a backing with
/// TTL eviction or persistence without touching callers.
pub trait ConversationStore: Send + Sync {
    /// Resolves `thread_id`, synthesizing a fresh unique key when absent or
    /// empty. New keys start with an empty turn sequence.
    fn get_or_create(&self, thread_id: Option<&str>) -> String;

    /// Resets the thread to empty. Creates it empty if it never existed.
    fn clear(&self, thread_id: &str);

    /// Appends one turn, then evicts oldest-first while over the cap.
    fn append(&self, thread_id: &str, speaker: Speaker, text: String);

    /// Non-mutating lookup. `None` if the thread was never created.
    fn read(&self, thread_id: &str) -> Option<Vec<Turn>>;

    /// Joins the thread's turns into a newline-delimited context block in
    /// insertion order. Empty string if the thread has no turns.
    fn render_context(&self, thread_id: &str) -> String;
}

/// In-memory store behind a single global lock. Contention is low enough
/// that per-key sharding is not worth it. The lock is never held across an
/// await point.
pub struct MemoryStore {
    threads: Mutex<HashMap<String, Vec<Turn>>>,
    cap: usize,
}

impl MemoryStore {
    pub fn new(cap: usize) -> Self {
        Self {
            threads: Mutex::new(HashMap::new()),
            cap,
        }
    }
}

impl ConversationStore for MemoryStore {
    fn get_or_create(&self, thread_id: Option<&str>) -> String {
        let mut threads = self.threads.lock().unwrap();

        let id = match thread_id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                // Millisecond keys can collide under load; bump until free.
                let mut millis = Utc::now().timestamp_millis();
                while threads.contains_key(&format!("thread_{millis}")) {
                    millis += 1;
                }
                format!("thread_{millis}")
            }
        };

        threads.entry(id.clone()).or_default();
        id
    }

    fn clear(&self, thread_id: &str) {
        let mut threads = self.threads.lock().unwrap();
        threads.insert(thread_id.to_string(), Vec::new());
    }

    fn append(&self, thread_id: &str, speaker: Speaker, text: String) {
        let mut threads = self.threads.lock().unwrap();
        let turns = threads.entry(thread_id.to_string()).or_default();
        turns.push(Turn { speaker, text });
        while turns.len() > self.cap {
            turns.remove(0);
        }
    }

    fn read(&self, thread_id: &str) -> Option<Vec<Turn>> {
        let threads = self.threads.lock().unwrap();
        threads.get(thread_id).cloned()
    }

    fn render_context(&self, thread_id: &str) -> String {
        let threads = self.threads.lock().unwrap();
        threads
            .get(thread_id)
            .map(|turns| {
                turns
                    .iter()
                    .map(|t| format!("{}: {}", t.speaker, t.text))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_cap(cap: usize) -> MemoryStore {
        MemoryStore::new(cap)
    }

    #[test]
    fn test_get_or_create_synthesizes_prefixed_key() {
        let store = store_with_cap(20);
        let id = store.get_or_create(None);
        assert!(id.starts_with("thread_"), "synthesized key was {id}");
        assert_eq!(store.read(&id).unwrap().len(), 0);
    }

    #[test]
    fn test_get_or_create_treats_empty_string_as_absent() {
        let store = store_with_cap(20);
        let id = store.get_or_create(Some(""));
        assert!(id.starts_with("thread_"));
    }

    #[test]
    fn test_get_or_create_keeps_caller_key() {
        let store = store_with_cap(20);
        let id = store.get_or_create(Some("my-thread"));
        assert_eq!(id, "my-thread");
        assert!(store.read("my-thread").is_some());
    }

    #[test]
    fn test_synthesized_keys_are_unique() {
        let store = store_with_cap(20);
        let a = store.get_or_create(None);
        let b = store.get_or_create(None);
        assert_ne!(a, b, "two synthesized keys must never collide");
    }

    #[test]
    fn test_append_caps_length_and_keeps_most_recent() {
        let store = store_with_cap(3);
        for i in 0..5 {
            store.append("t", Speaker::User, format!("m{i}"));
        }
        let turns = store.read("t").unwrap();
        assert_eq!(turns.len(), 3);
        let texts: Vec<&str> = turns.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["m2", "m3", "m4"]);
    }

    #[test]
    fn test_twenty_first_append_evicts_oldest_on_cap_20() {
        let store = store_with_cap(20);
        for i in 0..21 {
            store.append("t", Speaker::User, format!("m{i}"));
        }
        let turns = store.read("t").unwrap();
        assert_eq!(turns.len(), 20);
        assert_eq!(turns[0].text, "m1", "turn #2 becomes the new oldest");
        assert_eq!(turns[19].text, "m20");
    }

    #[test]
    fn test_append_under_cap_keeps_everything_in_order() {
        let store = store_with_cap(100);
        store.append("t", Speaker::User, "hello".to_string());
        store.append("t", Speaker::Assistant, "hi there".to_string());
        let turns = store.read("t").unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker, Speaker::User);
        assert_eq!(turns[1].speaker, Speaker::Assistant);
    }

    #[test]
    fn test_clear_then_read_is_empty_not_missing() {
        let store = store_with_cap(20);
        store.append("t", Speaker::User, "hello".to_string());
        store.clear("t");
        let turns = store.read("t");
        assert_eq!(turns.unwrap().len(), 0);
    }

    #[test]
    fn test_clear_on_unknown_thread_creates_it_empty() {
        let store = store_with_cap(20);
        store.clear("never-seen");
        assert_eq!(store.read("never-seen").unwrap().len(), 0);
    }

    #[test]
    fn test_read_unknown_thread_is_none() {
        let store = store_with_cap(20);
        assert!(store.read("nope").is_none());
    }

    #[test]
    fn test_render_context_joins_speaker_tagged_lines() {
        let store = store_with_cap(20);
        store.append("t", Speaker::User, "write my CV".to_string());
        store.append("t", Speaker::Assistant, "certainly".to_string());
        assert_eq!(
            store.render_context("t"),
            "User: write my CV\nAssistant: certainly"
        );
    }

    #[test]
    fn test_render_context_empty_for_unknown_thread() {
        let store = store_with_cap(20);
        assert_eq!(store.render_context("nope"), "");
    }
}
