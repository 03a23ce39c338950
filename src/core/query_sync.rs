//! Filter fields bound to the URL query string.
//!
//! Edits are debounced: every change restarts a timer and only the last
//! state is written to the URL, replacing the current history entry.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, warn};
use tokio::task::JoinHandle;
use url::Url;

use crate::core::resource::Resource;

pub trait Navigator: Send + Sync {
    fn current(&self) -> Url;

    /// Overwrites the current history entry.
    fn replace(&self, url: Url);
}

/// In-memory navigation history.
pub struct History {
    entries: Mutex<Vec<Url>>,
    replacements: AtomicUsize,
}

impl History {
    pub fn new(start: Url) -> Self {
        Self {
            entries: Mutex::new(vec![start]),
            replacements: AtomicUsize::new(0),
        }
    }

    /// Adds a new entry; later `replace` calls only touch this one.
    pub fn push(&self, url: Url) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url);
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn replacements(&self) -> usize {
        self.replacements.load(Ordering::SeqCst)
    }
}

impl Navigator for History {
    fn current(&self) -> Url {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries[entries.len() - 1].clone()
    }

    fn replace(&self, url: Url) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let last = entries.len() - 1;
        entries[last] = url;
        self.replacements.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct QueryStateSync {
    fields: Vec<String>,
    values: BTreeMap<String, String>,
    navigator: Arc<dyn Navigator>,
    debounce: Duration,
    reset_page: bool,
    pending: Option<JoinHandle<()>>,
}

impl QueryStateSync {
    /// Reads the initial field values from the navigator's current URL.
    pub fn mount(navigator: Arc<dyn Navigator>, fields: &[&str], debounce: Duration) -> Self {
        let current = navigator.current();
        let values = fields
            .iter()
            .map(|field| {
                let value = current
                    .query_pairs()
                    .find(|(k, _)| k == field)
                    .map(|(_, v)| v.into_owned())
                    .unwrap_or_default();
                (field.to_string(), value)
            })
            .collect();

        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            values,
            navigator,
            debounce,
            reset_page: true,
            pending: None,
        }
    }

    pub fn for_resource<R: Resource>(navigator: Arc<dyn Navigator>, debounce: Duration) -> Self {
        let keys: Vec<&str> = R::filters().iter().map(|f| f.key).collect();
        Self::mount(navigator, &keys, debounce)
    }

    /// Whether a filter change drops the `page` parameter. On by default.
    pub fn reset_page(mut self, reset: bool) -> Self {
        self.reset_page = reset;
        self
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Must run inside a Tokio runtime.
    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        if !self.fields.iter().any(|f| f == field) {
            warn!("ignoring untracked filter field {field}");
            return;
        }
        self.values.insert(field.to_string(), value.into());
        self.schedule();
    }

    /// Empties every tracked field and updates the URL right away.
    pub fn clear(&mut self) {
        self.cancel_pending();
        for value in self.values.values_mut() {
            value.clear();
        }
        navigate(
            self.navigator.as_ref(),
            &self.fields,
            &self.values,
            self.reset_page,
        );
    }

    pub fn dispose(&mut self) {
        self.cancel_pending();
    }

    fn schedule(&mut self) {
        self.cancel_pending();
        let navigator = Arc::clone(&self.navigator);
        let fields = self.fields.clone();
        let values = self.values.clone();
        let debounce = self.debounce;
        let reset_page = self.reset_page;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            navigate(navigator.as_ref(), &fields, &values, reset_page);
        }));
    }

    fn cancel_pending(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Drop for QueryStateSync {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn navigate(
    navigator: &dyn Navigator,
    fields: &[String],
    values: &BTreeMap<String, String>,
    reset_page: bool,
) {
    let current = navigator.current();
    let next = sync_query(&current, fields, values, reset_page);
    if next != current {
        debug!("filters -> {}", next.query().unwrap_or(""));
        navigator.replace(next);
    }
}

/// Query string for `values`: empty fields are removed, changed fields move
/// to the end, unchanged and untracked parameters stay where they are.
/// `page` is dropped only when a filter value actually changed.
pub fn sync_query(
    current: &Url,
    fields: &[String],
    values: &BTreeMap<String, String>,
    reset_page: bool,
) -> Url {
    let mut pairs: Vec<(String, String)> = current.query_pairs().into_owned().collect();
    let mut rewritten = false;
    let mut changed = false;

    for field in fields {
        let wanted = values.get(field).map(String::as_str).unwrap_or("");
        let existing: Vec<&str> = pairs
            .iter()
            .filter(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
            .collect();

        if !wanted.is_empty() && existing == [wanted] {
            continue;
        }
        if wanted.is_empty() && existing.is_empty() {
            continue;
        }

        // Dropping a leftover `field=` only tidies the URL.
        if !(wanted.is_empty() && existing.iter().all(|v| v.is_empty())) {
            changed = true;
        }
        rewritten = true;
        pairs.retain(|(k, _)| k != field);
        if !wanted.is_empty() {
            pairs.push((field.clone(), wanted.to_string()));
        }
    }

    if !rewritten {
        return current.clone();
    }
    if changed && reset_page {
        pairs.retain(|(k, _)| k != "page");
    }

    let mut next = current.clone();
    if pairs.is_empty() {
        next.set_query(None);
    } else {
        next.query_pairs_mut().clear().extend_pairs(pairs);
    }
    next
}
