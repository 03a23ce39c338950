use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::debug;

use crate::http::transport::RawResponse;

struct Entry {
    response: RawResponse,
    tags: Vec<String>,
    stored_at: Instant,
}

#[derive(Default)]
struct State {
    entries: HashMap<String, Entry>,
    /// Bumped on every invalidation of the tag.
    generations: HashMap<String, u64>,
    /// Bumped on `clear`.
    epoch: u64,
}

impl State {
    fn stamp<S: AsRef<str>>(&self, tags: &[S]) -> u64 {
        tags.iter().fold(self.epoch, |acc, tag| {
            acc + self.generations.get(tag.as_ref()).copied().unwrap_or(0)
        })
    }
}

/// Read cache keyed by request, invalidated by tag after mutations.
///
/// A read takes a `stamp` before going to the network and hands it back to
/// `put`; if any of its tags was invalidated in between, the response is
/// dropped instead of stored.
pub struct TagCache {
    ttl: Duration,
    state: Mutex<State>,
}

impl TagCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(State::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<RawResponse> {
        let mut state = self.lock();
        let fresh = state
            .entries
            .get(key)
            .map(|entry| entry.stored_at.elapsed() < self.ttl)?;
        if !fresh {
            state.entries.remove(key);
            return None;
        }
        state.entries.get(key).map(|entry| entry.response.clone())
    }

    pub fn stamp<S: AsRef<str>>(&self, tags: &[S]) -> u64 {
        self.lock().stamp(tags)
    }

    /// Stores `response` unless one of `tags` was invalidated after `stamp`
    /// was taken. Expired entries are swept on the way.
    pub fn put<S: AsRef<str>>(&self, key: String, tags: &[S], stamp: u64, response: RawResponse) {
        if self.ttl.is_zero() {
            return;
        }
        let mut state = self.lock();
        let ttl = self.ttl;
        state.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);

        if state.stamp(tags) != stamp {
            debug!("cache: dropping {key}, invalidated while in flight");
            return;
        }
        let tags = tags.iter().map(|t| t.as_ref().to_string()).collect();
        state.entries.insert(
            key,
            Entry {
                response,
                tags,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drops every entry carrying `tag`; returns how many went.
    pub fn invalidate(&self, tag: &str) -> usize {
        let mut state = self.lock();
        *state.generations.entry(tag.to_string()).or_default() += 1;
        let before = state.entries.len();
        state
            .entries
            .retain(|_, entry| !entry.tags.iter().any(|t| t == tag));
        let removed = before - state.entries.len();
        if removed > 0 {
            debug!("cache: invalidated {removed} entries tagged {tag}");
        }
        removed
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.epoch += 1;
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
