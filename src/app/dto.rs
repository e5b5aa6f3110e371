use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default module threshold, inside the recommended 0.01-0.05 range.
pub const DEFAULT_THRESHOLD: f64 = 0.02;

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    /// Backing model file; empty for in-memory models.
    pub model_path: String,
    pub exclude_tests: bool,
    pub class_count: usize,
    /// Classes dropped by test detection.
    pub excluded_test_classes: usize,
    pub method_count: usize,
    pub call_edges: usize,
    pub resolved_calls: usize,
    pub unresolved_calls: usize,
    pub coupled_pairs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CallGraphResponse {
    pub method_count: usize,
    pub edge_count: usize,
    pub methods: Vec<MethodCalls>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MethodCalls {
    /// `Class.method:arity`
    pub method: String,
    /// Resolved callees, same label form.
    pub calls: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CouplingRequest {
    /// Maximum number of pairs to return; all when omitted.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CouplingResponse {
    /// Number of inter-class call matches the scores are normalized by.
    pub total: u64,
    /// Coupled pairs before `limit` is applied.
    pub pair_count: usize,
    /// Descending by score, ties by pair name.
    pub pairs: Vec<PairCouplingResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PairCouplingRequest {
    pub a: String,
    pub b: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PairCouplingResponse {
    pub first: String,
    pub second: String,
    pub raw: u64,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CouplingMatrixResponse {
    /// Sorted class names; row and column order of `values`.
    pub classes: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DendrogramResponse {
    pub class_count: usize,
    /// Level k holds N-k clusters, each listed by its class names.
    pub levels: Vec<Vec<Vec<String>>>,
    pub merges: Vec<MergeStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MergeStep {
    /// Level produced by this merge (1-based).
    pub level: usize,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub coupling: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModulesRequest {
    /// Minimum internal coupling, within [0, 1].
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for ModulesRequest {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModulesResponse {
    pub threshold: f64,
    pub class_count: usize,
    /// At most `class_count / 2` modules, discovery order unless the cap applied.
    pub modules: Vec<ModuleDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModuleDto {
    pub classes: Vec<String>,
    pub internal_coupling: f64,
}
