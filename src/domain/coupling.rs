//! Class-level coupling derived from resolved call signatures.
//!
//! Every resolved invocation adds one to the counter of each (caller class, owner class) pair,
//! for every owning class other than the caller's own. Counts are then normalized by the grand
//! total, so the normalized values sum to 1 whenever any inter-class call exists. With no
//! inter-class calls the normalized map is empty and every lookup answers 0.

use crate::domain::model::ClassModel;
use crate::domain::resolver::ResolvedCalls;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Unordered class pair, stored with the lexicographically smaller name first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassPair {
    first: String,
    second: String,
}

impl ClassPair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn is_reflexive(&self) -> bool {
        self.first == self.second
    }
}

impl fmt::Display for ClassPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.second)
    }
}

/// Square coupling matrix over sorted class names; the diagonal is 0.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingMatrix {
    pub classes: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Immutable pairwise coupling, computed once at construction.
#[derive(Debug, Clone, Default)]
pub struct CouplingAnalyzer {
    raw: BTreeMap<ClassPair, u64>,
    normalized: BTreeMap<ClassPair, f64>,
    total: u64,
}

impl CouplingAnalyzer {
    pub fn new(model: &ClassModel, resolved: &ResolvedCalls) -> Self {
        let mut raw: BTreeMap<ClassPair, u64> = BTreeMap::new();

        for m in &resolved.matches {
            let caller = model.name(m.caller.class);
            for &owner in &m.owners {
                if owner == m.caller.class {
                    continue;
                }
                *raw.entry(ClassPair::new(caller, model.name(owner)))
                    .or_insert(0) += 1;
            }
        }

        Self::from_raw_counts(raw)
    }

    /// Builds from pair counts gathered elsewhere. Reflexive pairs and zero counts are ignored;
    /// repeated pairs accumulate.
    pub fn from_raw_counts(counts: impl IntoIterator<Item = (ClassPair, u64)>) -> Self {
        let mut raw: BTreeMap<ClassPair, u64> = BTreeMap::new();
        for (pair, count) in counts {
            if pair.is_reflexive() || count == 0 {
                continue;
            }
            *raw.entry(pair).or_insert(0) += count;
        }

        let total: u64 = raw.values().sum();
        let mut normalized = BTreeMap::new();
        if total > 0 {
            for (pair, &count) in &raw {
                normalized.insert(pair.clone(), count as f64 / total as f64);
            }
        }

        debug!(pairs = raw.len(), total, "coupling computed");

        Self {
            raw,
            normalized,
            total,
        }
    }

    /// Read-only view of every coupled pair and its normalized score.
    pub fn normalized(&self) -> &BTreeMap<ClassPair, f64> {
        &self.normalized
    }

    /// Normalized coupling between two classes, order-insensitive; 0.0 when absent.
    pub fn coupling(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 0.0;
        }
        self.normalized
            .get(&ClassPair::new(a, b))
            .copied()
            .unwrap_or(0.0)
    }

    /// Raw inter-class call count between two classes; 0 when absent.
    pub fn raw_coupling(&self, a: &str, b: &str) -> u64 {
        if a == b {
            return 0;
        }
        self.raw.get(&ClassPair::new(a, b)).copied().unwrap_or(0)
    }

    /// Total number of inter-class call matches.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Coupled pairs by descending score; ties keep pair order.
    pub fn ranked(&self) -> Vec<(&ClassPair, u64, f64)> {
        let mut out: Vec<(&ClassPair, u64, f64)> = self
            .normalized
            .iter()
            .map(|(pair, &score)| (pair, self.raw.get(pair).copied().unwrap_or(0), score))
            .collect();
        out.sort_by(|a, b| b.2.total_cmp(&a.2));
        out
    }

    /// Dense symmetric lookup table indexed like `names`.
    pub fn dense(&self, names: &[String]) -> Vec<Vec<f64>> {
        names
            .iter()
            .map(|a| names.iter().map(|b| self.coupling(a, b)).collect())
            .collect()
    }

    /// Matrix over the distinct names, sorted.
    pub fn matrix(&self, names: &[String]) -> CouplingMatrix {
        let mut classes: Vec<String> = names.to_vec();
        classes.sort();
        classes.dedup();
        let values = self.dense(&classes);
        CouplingMatrix { classes, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ClassUnit, MethodUnit};
    use crate::domain::resolver::CallResolver;

    fn analyze(classes: Vec<ClassUnit>) -> CouplingAnalyzer {
        let model = ClassModel::new(classes);
        let resolved = CallResolver::new().resolve(&model);
        CouplingAnalyzer::new(&model, &resolved)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_pair_key_is_canonical() {
        let pair = ClassPair::new("Zeta", "Alpha");
        assert_eq!(pair.first(), "Alpha");
        assert_eq!(pair.second(), "Zeta");
        assert_eq!(pair, ClassPair::new("Alpha", "Zeta"));
        assert_eq!(pair.to_string(), "Alpha-Zeta");
    }

    #[test]
    fn test_three_class_scenario() {
        let c = CouplingAnalyzer::from_raw_counts([
            (ClassPair::new("A", "B"), 6),
            (ClassPair::new("A", "C"), 2),
            (ClassPair::new("B", "C"), 2),
        ]);
        assert_eq!(c.total(), 10);
        assert_close(c.coupling("A", "B"), 0.6);
        assert_close(c.coupling("C", "A"), 0.2);
        assert_close(c.coupling("B", "C"), 0.2);
        assert_eq!(c.raw_coupling("B", "A"), 6);
    }

    #[test]
    fn test_counts_from_resolved_calls() {
        let c = analyze(vec![
            ClassUnit::new("A").with_method(
                MethodUnit::new("run", 0)
                    .with_call("save", 1)
                    .with_call("load", 0)
                    .with_call("run", 0),
            ),
            ClassUnit::new("B")
                .with_method(MethodUnit::new("save", 1).with_call("run", 0))
                .with_method(MethodUnit::new("load", 0)),
        ]);
        // A->B twice (save, load), B->A once (run), A->A ignored
        assert_eq!(c.raw_coupling("A", "B"), 3);
        assert_eq!(c.total(), 3);
        assert_close(c.coupling("A", "B"), 1.0);
    }

    #[test]
    fn test_ambiguous_signature_increments_each_owner_pair() {
        let c = analyze(vec![
            ClassUnit::new("A").with_method(MethodUnit::new("run", 0).with_call("save", 1)),
            ClassUnit::new("B").with_method(MethodUnit::new("save", 1)),
            ClassUnit::new("C").with_method(MethodUnit::new("save", 1)),
            ClassUnit::new("D").with_method(MethodUnit::new("save", 1)),
        ]);
        assert_eq!(c.total(), 3);
        assert_eq!(c.raw_coupling("A", "B"), 1);
        assert_eq!(c.raw_coupling("A", "C"), 1);
        assert_eq!(c.raw_coupling("A", "D"), 1);
        assert_eq!(c.raw_coupling("B", "C"), 0);
    }

    #[test]
    fn test_caller_owning_the_signature_still_couples_to_others() {
        let c = analyze(vec![
            ClassUnit::new("A")
                .with_method(MethodUnit::new("run", 0).with_call("save", 1))
                .with_method(MethodUnit::new("save", 1)),
            ClassUnit::new("B").with_method(MethodUnit::new("save", 1)),
        ]);
        assert_eq!(c.raw_coupling("A", "B"), 1);
        assert_eq!(c.total(), 1);
    }

    #[test]
    fn test_normalized_sum_is_one() {
        let c = CouplingAnalyzer::from_raw_counts([
            (ClassPair::new("A", "B"), 7),
            (ClassPair::new("A", "C"), 3),
            (ClassPair::new("B", "D"), 11),
            (ClassPair::new("C", "D"), 1),
        ]);
        let sum: f64 = c.normalized().values().sum();
        assert_close(sum, 1.0);
        assert!(c.normalized().values().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_symmetry() {
        let c = CouplingAnalyzer::from_raw_counts([
            (ClassPair::new("A", "B"), 1),
            (ClassPair::new("C", "B"), 4),
        ]);
        for a in ["A", "B", "C", "X"] {
            for b in ["A", "B", "C", "X"] {
                assert_eq!(c.coupling(a, b), c.coupling(b, a));
                assert_eq!(c.raw_coupling(a, b), c.raw_coupling(b, a));
            }
        }
    }

    #[test]
    fn test_no_inter_class_calls_gives_empty_map() {
        let c = analyze(vec![
            ClassUnit::new("A").with_method(MethodUnit::new("run", 0).with_call("run", 0)),
            ClassUnit::new("B"),
        ]);
        assert!(c.is_empty());
        assert_eq!(c.total(), 0);
        assert_eq!(c.coupling("A", "B"), 0.0);
    }

    #[test]
    fn test_reflexive_and_zero_counts_are_ignored() {
        let c = CouplingAnalyzer::from_raw_counts([
            (ClassPair::new("A", "A"), 5),
            (ClassPair::new("A", "B"), 0),
        ]);
        assert!(c.is_empty());
        assert_eq!(c.total(), 0);
    }

    #[test]
    fn test_ranked_orders_by_score() {
        let c = CouplingAnalyzer::from_raw_counts([
            (ClassPair::new("A", "B"), 1),
            (ClassPair::new("A", "C"), 5),
            (ClassPair::new("B", "C"), 1),
        ]);
        let ranked: Vec<String> = c.ranked().iter().map(|(p, _, _)| p.to_string()).collect();
        assert_eq!(ranked, vec!["A-C", "A-B", "B-C"]);
    }

    #[test]
    fn test_matrix_is_sorted_with_zero_diagonal() {
        let c = CouplingAnalyzer::from_raw_counts([(ClassPair::new("A", "B"), 1)]);
        let m = c.matrix(&["B".to_string(), "A".to_string()]);
        assert_eq!(m.classes, vec!["A", "B"]);
        assert_eq!(m.values, vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
    }
}
