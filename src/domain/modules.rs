//! Module identification over a completed dendrogram.
//!
//! Every cluster of the tree (root, internal nodes, leaves) is a candidate, discovered in
//! pre-order. A candidate's internal coupling is the mean inter-cluster coupling over all
//! unordered pairs of the clusters in its own pre-order subtree; candidates with a single
//! cluster score 0. Candidates strictly below the threshold are discarded, and if more than
//! `classes / 2` remain, only the best-scoring `classes / 2` are kept (stable on ties).

use crate::domain::cluster::{Cluster, ClusterId, Dendrogram, Linkage};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A dendrogram subtree that passed the coupling threshold.
#[derive(Debug, Clone)]
pub struct Module {
    pub cluster: Arc<Cluster>,
    /// Member class names, each exactly once, in cluster member order.
    pub classes: Vec<String>,
    pub internal_coupling: f64,
}

pub struct ModuleIdentifier {
    threshold: f64,
}

impl ModuleIdentifier {
    /// `threshold` must already be validated to lie in `[0, 1]`.
    pub fn new(threshold: f64) -> Self {
        debug_assert!(
            (0.0..=1.0).contains(&threshold),
            "threshold {threshold} outside [0, 1]"
        );
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn identify(&self, dendrogram: &Dendrogram) -> Vec<Module> {
        let Some(root) = dendrogram.root() else {
            return Vec::new();
        };

        let mut scorer = InternalCoupling::new(dendrogram.linkage());
        let candidates = root.subtree();
        let candidate_count = candidates.len();

        let mut modules: Vec<Module> = candidates
            .into_iter()
            .map(|cluster| {
                let internal_coupling = scorer.score(&cluster);
                Module {
                    classes: dendrogram.class_names(&cluster),
                    cluster,
                    internal_coupling,
                }
            })
            .filter(|m| m.internal_coupling >= self.threshold)
            .collect();

        let cap = dendrogram.class_count() / 2;
        let passed = modules.len();
        if modules.len() > cap {
            modules.sort_by(|a, b| b.internal_coupling.total_cmp(&a.internal_coupling));
            modules.truncate(cap);
        }

        debug!(
            candidates = candidate_count,
            passed,
            kept = modules.len(),
            threshold = self.threshold,
            "modules identified"
        );

        modules
    }
}

/// Internal coupling of a single candidate, without the threshold or cap.
pub fn internal_coupling(dendrogram: &Dendrogram, cluster: &Arc<Cluster>) -> f64 {
    InternalCoupling::new(dendrogram.linkage()).score(cluster)
}

/// Flat class-name lists, one per module, for reporting.
pub fn modules_as_class_names(modules: &[Module]) -> Vec<Vec<String>> {
    modules.iter().map(|m| m.classes.clone()).collect()
}

/// Scores candidates, caching pair couplings: the same cluster pairs recur in every
/// ancestor's subtree.
struct InternalCoupling<'a> {
    linkage: &'a Linkage,
    pairs: HashMap<(ClusterId, ClusterId), f64>,
}

impl<'a> InternalCoupling<'a> {
    fn new(linkage: &'a Linkage) -> Self {
        Self {
            linkage,
            pairs: HashMap::new(),
        }
    }

    fn score(&mut self, cluster: &Arc<Cluster>) -> f64 {
        let members = cluster.subtree();
        let n = members.len();
        if n <= 1 {
            return 0.0;
        }

        let mut total = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                total += self.pair(&members[i], &members[j]);
            }
        }

        let pair_count = n * (n - 1) / 2;
        total / pair_count as f64
    }

    fn pair(&mut self, a: &Cluster, b: &Cluster) -> f64 {
        let linkage = self.linkage;
        *self
            .pairs
            .entry((a.id(), b.id()))
            .or_insert_with(|| linkage.between(a, b))
    }
}
