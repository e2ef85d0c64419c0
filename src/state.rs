use std::sync::Arc;

use crate::config::Config;
use crate::retrieval::RetrievalService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub retrieval: Arc<RetrievalService>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let retrieval = RetrievalService::open(
            &config.data_dir,
            config.llm.embedding_dim,
            config.chunk_size,
            config.chunk_overlap,
        )?;

        Ok(Self {
            config,
            retrieval: Arc::new(retrieval),
            http_client: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
        })
    }
}
