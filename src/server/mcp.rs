use crate::app::dto::*;
use crate::app::engine::AnalysisEngine;
use rmcp::{
    Json, ServerHandler, ServiceExt, handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters, model::*, tool, tool_handler, tool_router,
    transport::stdio,
};
use tokio::task::spawn_blocking;

#[derive(Clone)]
pub struct ModuleFinderMcpServer {
    engine: AnalysisEngine,
    tool_router: ToolRouter<Self>,
}

impl ModuleFinderMcpServer {
    pub fn new(engine: AnalysisEngine) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }

    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        let service = self.serve(stdio()).await?;
        service.waiting().await?;
        Ok(())
    }
}

#[tool_router]
impl ModuleFinderMcpServer {
    #[tool(description = "Method-level call graph resolved by method name and parameter count.")]
    async fn call_graph(&self) -> Result<Json<CallGraphResponse>, String> {
        let engine = self.engine.clone();
        spawn_blocking(move || engine.call_graph())
            .await
            .map(Json)
            .map_err(|e| format!("task join error: {e}"))
    }

    #[tool(description = "Normalized class-pair coupling, strongest pairs first.")]
    async fn coupling(
        &self,
        params: Parameters<CouplingRequest>,
    ) -> Result<Json<CouplingResponse>, String> {
        let engine = self.engine.clone();
        let limit = params.0.limit;
        spawn_blocking(move || engine.coupling(limit))
            .await
            .map(Json)
            .map_err(|e| format!("task join error: {e}"))
    }

    #[tool(description = "Coupling between two classes, by qualified name.")]
    async fn pair_coupling(
        &self,
        params: Parameters<PairCouplingRequest>,
    ) -> Result<Json<PairCouplingResponse>, String> {
        let engine = self.engine.clone();
        let req = params.0;
        spawn_blocking(move || engine.pair_coupling(&req.a, &req.b))
            .await
            .map_err(|e| format!("task join error: {e}"))?
            .map(Json)
            .map_err(|e| e.to_string())
    }

    #[tool(description = "Agglomerative clustering levels and merge steps over all classes.")]
    async fn dendrogram(&self) -> Result<Json<DendrogramResponse>, String> {
        let engine = self.engine.clone();
        spawn_blocking(move || engine.dendrogram())
            .await
            .map(Json)
            .map_err(|e| format!("task join error: {e}"))
    }

    #[tool(
        description = "Identify candidate modules: dendrogram subtrees whose internal coupling reaches the threshold (default 0.02)."
    )]
    async fn identify_modules(
        &self,
        params: Parameters<ModulesRequest>,
    ) -> Result<Json<ModulesResponse>, String> {
        let engine = self.engine.clone();
        let req = params.0;
        spawn_blocking(move || engine.modules(req))
            .await
            .map_err(|e| format!("task join error: {e}"))?
            .map(Json)
            .map_err(|e| e.to_string())
    }
}

#[tool_handler]
impl ServerHandler for ModuleFinderMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Recover candidate modules from a class model by call coupling and hierarchical clustering."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
