//! Agglomerative clustering of classes on coupling strength.
//!
//! Similarity between two clusters is the sum of the pairwise class couplings divided by the
//! product of the cluster sizes. Each step merges the pair with the strictly greatest
//! similarity; on ties the first pair in `(i, j)` nested order wins. The merged cluster is
//! appended at the end of the next level, after the untouched clusters in their previous order.
//!
//! Clusters are immutable and shared between levels through `Arc`, so every level of the
//! [`Dendrogram`] stays independently inspectable.

use crate::domain::coupling::CouplingAnalyzer;
use std::sync::Arc;
use tracing::{debug, info};

/// Creation order of a cluster: leaves are `0..n` in class order, merges follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClusterId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum ClusterKind {
    Leaf,
    Merge {
        left: Arc<Cluster>,
        right: Arc<Cluster>,
        /// Inter-cluster coupling of `left` and `right` when they were merged.
        coupling: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    id: ClusterId,
    /// Class positions (into the dendrogram's class list), left members first.
    members: Vec<usize>,
    kind: ClusterKind,
}

impl Cluster {
    fn leaf(id: ClusterId, class: usize) -> Self {
        Self {
            id,
            members: vec![class],
            kind: ClusterKind::Leaf,
        }
    }

    fn merge(id: ClusterId, left: Arc<Cluster>, right: Arc<Cluster>, coupling: f64) -> Self {
        let mut members = Vec::with_capacity(left.members.len() + right.members.len());
        members.extend_from_slice(&left.members);
        members.extend_from_slice(&right.members);
        Self {
            id,
            members,
            kind: ClusterKind::Merge {
                left,
                right,
                coupling,
            },
        }
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, ClusterKind::Leaf)
    }

    pub fn kind(&self) -> &ClusterKind {
        &self.kind
    }

    pub fn children(&self) -> Option<(&Arc<Cluster>, &Arc<Cluster>)> {
        match &self.kind {
            ClusterKind::Leaf => None,
            ClusterKind::Merge { left, right, .. } => Some((left, right)),
        }
    }

    pub fn merge_coupling(&self) -> Option<f64> {
        match &self.kind {
            ClusterKind::Leaf => None,
            ClusterKind::Merge { coupling, .. } => Some(*coupling),
        }
    }

    /// This cluster and all its descendants, pre-order (node, left subtree, right subtree).
    pub fn subtree(self: &Arc<Self>) -> Vec<Arc<Cluster>> {
        let mut out = Vec::with_capacity(2 * self.members.len() - 1);
        let mut stack = vec![Arc::clone(self)];
        while let Some(cluster) = stack.pop() {
            if let Some((left, right)) = cluster.children() {
                stack.push(Arc::clone(right));
                stack.push(Arc::clone(left));
            }
            out.push(cluster);
        }
        out
    }
}

/// Class-to-class coupling table plus the size-normalized cluster similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct Linkage {
    table: Vec<Vec<f64>>,
}

impl Linkage {
    pub fn new(table: Vec<Vec<f64>>) -> Self {
        Self { table }
    }

    pub fn class_coupling(&self, a: usize, b: usize) -> f64 {
        self.table[a][b]
    }

    /// Sum of member couplings over `|a| * |b|`.
    pub fn between(&self, a: &Cluster, b: &Cluster) -> f64 {
        let size = a.len() * b.len();
        if size == 0 {
            return 0.0;
        }
        let mut total = 0.0;
        for &x in &a.members {
            for &y in &b.members {
                total += self.table[x][y];
            }
        }
        total / size as f64
    }
}

/// One merge step of the clustering.
#[derive(Debug, Clone)]
pub struct Merge {
    /// Level produced by this merge (1-based).
    pub level: usize,
    pub left: Arc<Cluster>,
    pub right: Arc<Cluster>,
    pub merged: Arc<Cluster>,
    pub coupling: f64,
}

/// Append-only sequence of partitions, from all singletons (level 0) to one root.
#[derive(Debug, Clone, PartialEq)]
pub struct Dendrogram {
    classes: Vec<String>,
    levels: Vec<Vec<Arc<Cluster>>>,
    linkage: Linkage,
}

impl Dendrogram {
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn levels(&self) -> &[Vec<Arc<Cluster>>] {
        &self.levels
    }

    pub fn level(&self, k: usize) -> Option<&[Arc<Cluster>]> {
        self.levels.get(k).map(Vec::as_slice)
    }

    /// Sole cluster of the final level; `None` when there are no classes.
    pub fn root(&self) -> Option<&Arc<Cluster>> {
        let last = self.levels.last()?;
        assert_eq!(last.len(), 1, "final dendrogram level must hold one cluster");
        last.first()
    }

    pub fn linkage(&self) -> &Linkage {
        &self.linkage
    }

    /// Class names of a cluster, in member order.
    pub fn class_names(&self, cluster: &Cluster) -> Vec<String> {
        cluster
            .members
            .iter()
            .map(|&i| self.classes[i].clone())
            .collect()
    }

    /// Merge steps in order; the merged cluster is the last entry of each level after 0.
    pub fn merges(&self) -> Vec<Merge> {
        let mut out = Vec::with_capacity(self.levels.len().saturating_sub(1));
        for (level, clusters) in self.levels.iter().enumerate().skip(1) {
            let Some(merged) = clusters.last() else {
                continue;
            };
            let ClusterKind::Merge {
                left,
                right,
                coupling,
            } = &merged.kind
            else {
                panic!("level {level} does not end with a merged cluster");
            };
            out.push(Merge {
                level,
                left: Arc::clone(left),
                right: Arc::clone(right),
                merged: Arc::clone(merged),
                coupling: *coupling,
            });
        }
        out
    }
}

/// Average-coupling agglomerative clustering.
pub struct ClusteringEngine {
    classes: Vec<String>,
    linkage: Linkage,
}

impl ClusteringEngine {
    /// `classes` fixes the order of the leaves and therefore the tie-break order.
    pub fn new(classes: &[String], coupling: &CouplingAnalyzer) -> Self {
        Self {
            classes: classes.to_vec(),
            linkage: Linkage::new(coupling.dense(classes)),
        }
    }

    pub fn run(&self) -> Dendrogram {
        let n = self.classes.len();
        let mut levels: Vec<Vec<Arc<Cluster>>> = Vec::with_capacity(n);

        if n > 0 {
            let leaves = (0..n)
                .map(|i| Arc::new(Cluster::leaf(ClusterId(i), i)))
                .collect();
            levels.push(leaves);
        }

        let mut next_id = n;
        while let Some(current) = levels.last().filter(|l| l.len() > 1) {
            let (i, j, coupling) = self.best_pair(current);
            let merged = Arc::new(Cluster::merge(
                ClusterId(next_id),
                Arc::clone(&current[i]),
                Arc::clone(&current[j]),
                coupling,
            ));
            next_id += 1;

            debug!(
                level = levels.len(),
                left = current[i].id.0,
                right = current[j].id.0,
                coupling,
                "merged clusters"
            );

            let next: Vec<Arc<Cluster>> = current
                .iter()
                .enumerate()
                .filter(|&(k, _)| k != i && k != j)
                .map(|(_, c)| Arc::clone(c))
                .chain(std::iter::once(merged))
                .collect();
            levels.push(next);
        }

        info!(classes = n, levels = levels.len(), "clustering finished");

        Dendrogram {
            classes: self.classes.clone(),
            levels,
            linkage: self.linkage.clone(),
        }
    }

    /// Strictly greatest similarity wins; the first pair in nested order breaks ties.
    fn best_pair(&self, clusters: &[Arc<Cluster>]) -> (usize, usize, f64) {
        assert!(clusters.len() > 1, "need two clusters to merge");
        let mut best = (0, 1, self.linkage.between(&clusters[0], &clusters[1]));
        for i in 0..clusters.len() {
            for j in (i + 1)..clusters.len() {
                let coupling = self.linkage.between(&clusters[i], &clusters[j]);
                if coupling > best.2 {
                    best = (i, j, coupling);
                }
            }
        }
        best
    }
}
