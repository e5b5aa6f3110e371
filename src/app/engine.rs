use crate::adapters::json::JsonModelSource;
use crate::adapters::test_detector::UniversalTestDetector;
use crate::app::dto::*;
use crate::domain::cluster::{ClusteringEngine, Dendrogram};
use crate::domain::coupling::CouplingAnalyzer;
use crate::domain::model::ClassModel;
use crate::domain::modules::ModuleIdentifier;
use crate::domain::ports::ClassModelSource;
use crate::domain::resolver::{CallResolver, ResolvedCalls};
use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock};
use tracing::info;

#[derive(Clone)]
pub struct AnalysisEngine {
    inner: Arc<RwLock<EngineData>>,
}

struct EngineData {
    model_path: Option<PathBuf>,
    exclude_tests: bool,
    excluded_tests: usize,
    analysis: Arc<Analysis>,
}

/// Pipeline results for one loaded model. Resolution and coupling are computed eagerly;
/// the dendrogram only when first asked for.
struct Analysis {
    model: ClassModel,
    resolved: ResolvedCalls,
    coupling: CouplingAnalyzer,
    dendrogram: OnceLock<Dendrogram>,
}

impl Analysis {
    fn build(model: ClassModel) -> Self {
        let resolved = CallResolver::new().resolve(&model);
        let coupling = CouplingAnalyzer::new(&model, &resolved);
        info!(
            classes = model.len(),
            methods = model.method_count(),
            matches = resolved.matches.len(),
            coupled_pairs = coupling.normalized().len(),
            "analysis ready"
        );
        Self {
            model,
            resolved,
            coupling,
            dendrogram: OnceLock::new(),
        }
    }

    fn dendrogram(&self) -> &Dendrogram {
        self.dendrogram
            .get_or_init(|| ClusteringEngine::new(self.model.names(), &self.coupling).run())
    }
}

impl AnalysisEngine {
    /// Construct an engine from an in-memory model.
    ///
    /// Used for testing or when the model comes from a provider linked into the process.
    /// Such an engine cannot be reloaded.
    pub fn from_model(model: ClassModel, exclude_tests: bool) -> Self {
        Self::with_model(None, model, exclude_tests)
    }

    pub fn load_from_json(json_path: &Path, exclude_tests: bool) -> Result<Self> {
        let model = JsonModelSource::new(json_path).load()?;
        Ok(Self::with_model(
            Some(json_path.to_path_buf()),
            model,
            exclude_tests,
        ))
    }

    fn with_model(model_path: Option<PathBuf>, model: ClassModel, exclude_tests: bool) -> Self {
        let (model, excluded_tests) = filter_tests(model, exclude_tests);
        Self {
            inner: Arc::new(RwLock::new(EngineData {
                model_path,
                exclude_tests,
                excluded_tests,
                analysis: Arc::new(Analysis::build(model)),
            })),
        }
    }

    /// Re-read the backing file and swap in fresh results.
    pub fn reload(&self) -> Result<HealthResponse> {
        let (path, exclude_tests) = {
            let data = self.inner.read().unwrap();
            let path = data
                .model_path
                .clone()
                .ok_or_else(|| anyhow!("Engine has no backing model file to reload"))?;
            (path, data.exclude_tests)
        };

        let model = JsonModelSource::new(&path).load()?;
        let (model, excluded_tests) = filter_tests(model, exclude_tests);
        let analysis = Arc::new(Analysis::build(model));

        {
            let mut data = self.inner.write().unwrap();
            data.excluded_tests = excluded_tests;
            data.analysis = analysis;
        }
        Ok(self.health())
    }

    pub fn health(&self) -> HealthResponse {
        let data = self.inner.read().unwrap();
        let a = &data.analysis;
        HealthResponse {
            model_path: data
                .model_path
                .as_ref()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default(),
            exclude_tests: data.exclude_tests,
            class_count: a.model.len(),
            excluded_test_classes: data.excluded_tests,
            method_count: a.model.method_count(),
            call_edges: a.resolved.graph.edge_count(),
            resolved_calls: a.resolved.matches.len(),
            unresolved_calls: a.resolved.unresolved,
            coupled_pairs: a.coupling.normalized().len(),
        }
    }

    pub fn call_graph(&self) -> CallGraphResponse {
        let a = self.analysis();
        let graph = &a.resolved.graph;

        let methods = a
            .model
            .method_ids()
            .map(|id| MethodCalls {
                method: a.model.method_label(id),
                calls: graph
                    .callees(id)
                    .into_iter()
                    .map(|callee| a.model.method_label(callee))
                    .collect(),
            })
            .collect();

        CallGraphResponse {
            method_count: graph.method_count(),
            edge_count: graph.edge_count(),
            methods,
        }
    }

    pub fn coupling(&self, limit: Option<usize>) -> CouplingResponse {
        let a = self.analysis();
        let ranked = a.coupling.ranked();
        let pair_count = ranked.len();

        let pairs = ranked
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|(pair, raw, score)| PairCouplingResponse {
                first: pair.first().to_string(),
                second: pair.second().to_string(),
                raw,
                score,
            })
            .collect();

        CouplingResponse {
            total: a.coupling.total(),
            pair_count,
            pairs,
        }
    }

    /// Coupling between two named classes; both must be in the analyzed set.
    pub fn pair_coupling(&self, a: &str, b: &str) -> Result<PairCouplingResponse> {
        let analysis = self.analysis();
        for name in [a, b] {
            if analysis.model.class_id(name).is_none() {
                return Err(anyhow!("Class not found: {}", name));
            }
        }

        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Ok(PairCouplingResponse {
            first: first.to_string(),
            second: second.to_string(),
            raw: analysis.coupling.raw_coupling(a, b),
            score: analysis.coupling.coupling(a, b),
        })
    }

    pub fn coupling_matrix(&self) -> CouplingMatrixResponse {
        let a = self.analysis();
        let matrix = a.coupling.matrix(a.model.names());
        CouplingMatrixResponse {
            classes: matrix.classes,
            values: matrix.values,
        }
    }

    pub fn dendrogram(&self) -> DendrogramResponse {
        let a = self.analysis();
        let d = a.dendrogram();

        DendrogramResponse {
            class_count: d.class_count(),
            levels: d
                .levels()
                .iter()
                .map(|level| level.iter().map(|c| d.class_names(c)).collect())
                .collect(),
            merges: d
                .merges()
                .into_iter()
                .map(|m| MergeStep {
                    level: m.level,
                    left: d.class_names(&m.left),
                    right: d.class_names(&m.right),
                    coupling: m.coupling,
                })
                .collect(),
        }
    }

    pub fn modules(&self, req: ModulesRequest) -> Result<ModulesResponse> {
        validate_threshold(req.threshold)?;

        let a = self.analysis();
        let d = a.dendrogram();
        let modules = ModuleIdentifier::new(req.threshold).identify(d);

        info!(
            threshold = req.threshold,
            modules = modules.len(),
            "module identification finished"
        );

        Ok(ModulesResponse {
            threshold: req.threshold,
            class_count: d.class_count(),
            modules: modules
                .into_iter()
                .map(|m| ModuleDto {
                    classes: m.classes,
                    internal_coupling: m.internal_coupling,
                })
                .collect(),
        })
    }

    /// Snapshot of the current results; the lock is not held while computing.
    fn analysis(&self) -> Arc<Analysis> {
        Arc::clone(&self.inner.read().unwrap().analysis)
    }
}

/// Reject thresholds that are not finite or fall outside [0, 1].
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(anyhow!(
            "Invalid threshold {}: expected a value within [0, 1]",
            threshold
        ));
    }
    Ok(())
}

fn filter_tests(model: ClassModel, exclude_tests: bool) -> (ClassModel, usize) {
    if !exclude_tests {
        return (model, 0);
    }
    let detector = UniversalTestDetector::new();
    let before = model.len();
    let kept = model.retain(|class| !detector.is_test_class(class));
    let excluded = before - kept.len();
    if excluded > 0 {
        info!(excluded, "test classes excluded");
    }
    (kept, excluded)
}
