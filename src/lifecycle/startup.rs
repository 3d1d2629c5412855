//! Startup orchestration.
//!
//! Builds every subsystem from a validated configuration, in dependency
//! order. Nothing here touches the network.

use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

use crate::config::RelayConfig;
use crate::health::DirectoryProbe;
use crate::http::HttpServer;
use crate::ledger::legacy::LegacyNetwork;
use crate::ledger::{CosmosClient, LedgerError, LegacyClient};
use crate::load_balancer::NodeSelector;
use crate::relay::{PipelineSettings, RelayPipeline};
use crate::store::{DocumentStore, MemoryStore, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),

    #[error("HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid URL '{url}': {reason}")]
    Url { url: String, reason: String },
}

/// Every long-lived component of a running relay.
pub struct Application {
    pub store: Arc<MemoryStore>,
    pub legacy: Arc<LegacyClient>,
    pub cosmos: Arc<CosmosClient>,
    pub pipeline: Arc<RelayPipeline>,
    pub server: HttpServer,
}

/// Outbound HTTP client shared by every ledger component. Transport
/// defaults apply; a broadcast is never cut short by a client timeout.
pub fn build_client() -> Result<Client, StartupError> {
    let client = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Legacy client with its directory probe and node selector.
pub fn build_legacy_client(
    config: &RelayConfig,
    client: Client,
) -> Result<LegacyClient, StartupError> {
    let directory = Url::parse(&config.legacy.directory_url).map_err(|e| StartupError::Url {
        url: config.legacy.directory_url.clone(),
        reason: e.to_string(),
    })?;
    let network = Arc::new(LegacyNetwork::from_config(&config.legacy)?);
    let probe = Arc::new(DirectoryProbe::new(
        client.clone(),
        directory,
        config.legacy.node_port,
    ));
    let selector = Arc::new(NodeSelector::new(probe, client, network.clone()));
    Ok(LegacyClient::new(selector, network))
}

pub fn build_store(config: &RelayConfig) -> Result<MemoryStore, StartupError> {
    match &config.store.seed_path {
        Some(path) => Ok(MemoryStore::load_from_file(Path::new(path))?),
        None => {
            tracing::warn!("No store seed configured, every lookup will miss");
            Ok(MemoryStore::new())
        }
    }
}

/// Wire the application together, seeding the store from the config.
pub fn build_application(config: RelayConfig) -> Result<Application, StartupError> {
    let store = build_store(&config)?;
    build_application_with_store(config, store)
}

/// Wire the application together around an existing store.
pub fn build_application_with_store(
    config: RelayConfig,
    store: MemoryStore,
) -> Result<Application, StartupError> {
    let client = build_client()?;
    let store = Arc::new(store);

    let legacy = Arc::new(build_legacy_client(&config, client.clone())?);
    let cosmos = Arc::new(CosmosClient::new(client, &config.cosmos)?);

    let settings = PipelineSettings::from_config(&config.store, &config.cosmos);
    let pipeline = Arc::new(RelayPipeline::new(
        store.clone(),
        legacy.clone(),
        cosmos.clone(),
        settings,
    ));

    let server = HttpServer::new(
        config,
        pipeline.clone(),
        store.clone() as Arc<dyn DocumentStore>,
    );

    Ok(Application {
        store,
        legacy,
        cosmos,
        pipeline,
        server,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_build_with_defaults() {
        let app = build_application(RelayConfig::default()).unwrap();
        assert!(app.store.is_empty());
        assert!(app.legacy.selector().current_node().is_none());
    }

    #[test]
    fn test_build_with_seeded_store() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "configs": {{ "auth": {{ "whitelist": [], "codes": [] }} }} }}"#
        )
        .unwrap();

        let mut config = RelayConfig::default();
        config.store.seed_path = Some(file.path().to_string_lossy().into_owned());
        let app = build_application(config).unwrap();
        assert_eq!(app.store.len(), 1);
    }

    #[test]
    fn test_missing_seed_file_fails() {
        let mut config = RelayConfig::default();
        config.store.seed_path = Some("/nonexistent/seed.json".to_string());
        assert!(matches!(
            build_application(config),
            Err(StartupError::Store(_))
        ));
    }
}
