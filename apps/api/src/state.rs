use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::analysis::JdAnalyzer;
use crate::config::Config;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Compile queue producer (and consumer when the worker runs in-process).
    pub redis: RedisClient,
    pub s3: S3Client,
    pub llm: LlmClient,
    pub config: Config,
    /// JD analysis. Default: HeuristicJdAnalyzer with the LLM span fallback
    /// when ENABLE_LLM_SPAN_FALLBACK is set.
    pub analyzer: Arc<dyn JdAnalyzer>,
}
