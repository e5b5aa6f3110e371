//! Call resolution by name + arity.
//!
//! Two views are produced from the same lookup and kept separate:
//! - the call graph links each invocation to the *first* method (class order, then declaration
//!   order) carrying the signature, one edge per invocation site;
//! - the signature matches keep *every* class owning the signature, which is what coupling
//!   counts. Ambiguous calls therefore over-count coupling rather than under-count it.
//!
//! Invocations with no owner in the model (library calls, code outside the analyzed set) are
//! dropped from both views.

use crate::domain::graph::CallGraph;
use crate::domain::model::{CallSignature, ClassId, ClassModel, MethodId};
use std::collections::HashMap;
use tracing::debug;

/// One resolved invocation: the caller method and every class owning the called signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureMatch {
    pub caller: MethodId,
    pub signature: CallSignature,
    /// Distinct owning classes, first-seen order. Never empty.
    pub owners: Vec<ClassId>,
}

/// Output of [`CallResolver::resolve`].
#[derive(Debug, Clone, Default)]
pub struct ResolvedCalls {
    pub graph: CallGraph,
    pub matches: Vec<SignatureMatch>,
    /// Invocations that matched no method in the model.
    pub unresolved: usize,
}

/// Matches recorded call signatures against the methods of the model.
pub struct CallResolver;

impl Default for CallResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CallResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, model: &ClassModel) -> ResolvedCalls {
        let index = build_signature_index(model);

        let mut graph = CallGraph::new();
        for id in model.method_ids() {
            graph.add_method(id);
        }

        let mut matches = Vec::new();
        let mut unresolved = 0;

        for caller in model.method_ids() {
            for signature in &model.method(caller).call_signatures {
                let Some(targets) = index.get(signature) else {
                    unresolved += 1;
                    continue;
                };
                let Some(&first) = targets.first() else {
                    unresolved += 1;
                    continue;
                };

                graph.add_call(caller, first);

                let mut owners: Vec<ClassId> = Vec::new();
                for target in targets {
                    if !owners.contains(&target.class) {
                        owners.push(target.class);
                    }
                }

                matches.push(SignatureMatch {
                    caller,
                    signature: signature.clone(),
                    owners,
                });
            }
        }

        debug!(
            methods = graph.method_count(),
            edges = graph.edge_count(),
            matches = matches.len(),
            unresolved,
            "call resolution finished"
        );

        ResolvedCalls {
            graph,
            matches,
            unresolved,
        }
    }
}

/// Signature -> methods carrying it, in class order then declaration order.
fn build_signature_index(model: &ClassModel) -> HashMap<CallSignature, Vec<MethodId>> {
    let mut index: HashMap<CallSignature, Vec<MethodId>> = HashMap::new();
    for id in model.method_ids() {
        index.entry(model.method(id).signature()).or_default().push(id);
    }
    index
}
