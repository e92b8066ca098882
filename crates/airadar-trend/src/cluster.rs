//! Topic clustering over title-token similarity.
//!
//! Every unordered pair of items is compared, so a cycle costs O(N²)
//! similarity checks. Callers bound N through [`crate::TrendConfig::max_items`];
//! raising that cap grows clustering time quadratically.

use std::collections::{BTreeSet, HashMap};

use airadar_core::Item;

use crate::tokenize::{jaccard_similarity, significant_tokens};
use crate::types::TopicCluster;

/// Minimum Jaccard similarity for two titles to be linked.
pub const SIMILARITY_THRESHOLD: f64 = 0.3;

/// Flat-array union-find with path compression.
///
/// `union` attaches the root of the first element under the root of the
/// second; there is no rank balancing.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    /// Root of `x`'s set. Compresses the path it walks.
    ///
    /// # Panics
    ///
    /// Panics if `x` is out of bounds.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merge the sets containing `x` and `y`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x != root_y {
            self.parent[root_x] = root_y;
        }
    }
}

/// Partition `items` into clusters linked by title similarity at or above
/// [`SIMILARITY_THRESHOLD`], directly or transitively.
///
/// Clusters come back in order of their first member's position in `items`,
/// and members keep their input order.
#[must_use]
pub fn cluster_items(items: &[Item]) -> Vec<TopicCluster> {
    let tokens: Vec<_> = items
        .iter()
        .map(|item| significant_tokens(&item.title))
        .collect();

    let mut sets = DisjointSet::new(items.len());
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            if jaccard_similarity(&tokens[i], &tokens[j]) >= SIMILARITY_THRESHOLD {
                sets.union(i, j);
            }
        }
    }

    let mut slot_by_root: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Vec<&Item>> = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let root = sets.find(index);
        let slot = *slot_by_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(item);
    }

    groups.into_iter().map(build_cluster).collect()
}

fn build_cluster(members: Vec<&Item>) -> TopicCluster {
    let mut sources = BTreeSet::new();
    let mut total_score = 0_i64;
    let mut best: Option<&Item> = None;

    for item in &members {
        sources.insert(item.source);
        total_score = total_score.saturating_add(item.score);
        if best.is_none_or(|b| item.score > b.score) {
            best = Some(item);
        }
    }

    TopicCluster {
        topic: best.map(|item| item.title.clone()).unwrap_or_default(),
        items: members.into_iter().cloned().collect(),
        sources,
        total_score,
    }
}
