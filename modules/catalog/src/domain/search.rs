use std::collections::BTreeSet;

use dashmap::DashMap;
use uuid::Uuid;

/// Term → product ids. Terms are lowercase title words.
#[derive(Default)]
pub struct SearchIndex {
    terms: DashMap<String, BTreeSet<Uuid>>,
    docs: DashMap<Uuid, Vec<String>>,
}

fn tokenize(title: &str) -> Vec<String> {
    let mut terms: Vec<String> = title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();
    terms.sort();
    terms.dedup();
    terms
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self, id: Uuid, title: &str) {
        self.remove(id);
        let terms = tokenize(title);
        for t in &terms {
            self.terms.entry(t.clone()).or_default().insert(id);
        }
        self.docs.insert(id, terms);
    }

    /// Returns false when `id` was not indexed.
    pub fn remove(&self, id: Uuid) -> bool {
        let Some((_, terms)) = self.docs.remove(&id) else {
            return false;
        };
        for t in terms {
            if let Some(mut ids) = self.terms.get_mut(&t) {
                ids.remove(&id);
            }
            self.terms.remove_if(&t, |_, ids| ids.is_empty());
        }
        true
    }

    /// Products whose title contains the (single) term.
    pub fn search(&self, term: &str) -> Vec<Uuid> {
        self.terms
            .get(&term.trim().to_lowercase())
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
