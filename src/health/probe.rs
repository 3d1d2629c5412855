//! Directory-backed node health probe.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Errors raised while querying the directory service.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The directory could not be reached or answered with an error.
    #[error("directory request failed: {0}")]
    Transport(String),

    /// The directory answered with an unexpected body.
    #[error("unexpected directory response: {0}")]
    Decode(String),
}

/// Source of healthy node endpoints.
#[async_trait]
pub trait NodeHealthProbe: Send + Sync {
    /// Endpoints of nodes reporting healthy API and storage, in directory order.
    async fn healthy_nodes(&self) -> Result<Vec<Url>, ProbeError>;
}

#[derive(Debug, Deserialize)]
struct NodeListResponse {
    data: Vec<HostDescriptor>,
}

#[derive(Debug, Deserialize)]
struct HostDescriptor {
    host: String,
}

/// Queries `GET {directory}/network/nodes?health.apiNode=up&health.db=up`.
#[derive(Debug, Clone)]
pub struct DirectoryProbe {
    client: Client,
    directory_url: Url,
    node_port: u16,
}

impl DirectoryProbe {
    pub fn new(client: Client, mut directory_url: Url, node_port: u16) -> Self {
        // Relative joins replace the last segment unless the path ends in '/'
        if !directory_url.path().ends_with('/') {
            let path = format!("{}/", directory_url.path());
            directory_url.set_path(&path);
        }
        Self {
            client,
            directory_url,
            node_port,
        }
    }

    fn query_url(&self) -> Result<Url, ProbeError> {
        let mut url = self
            .directory_url
            .join("network/nodes")
            .map_err(|e| ProbeError::Transport(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("health.apiNode", "up")
            .append_pair("health.db", "up");
        Ok(url)
    }

    fn node_url(&self, host: &str) -> Option<Url> {
        Url::parse(&format!("http://{}:{}/", host, self.node_port)).ok()
    }
}

#[async_trait]
impl NodeHealthProbe for DirectoryProbe {
    async fn healthy_nodes(&self) -> Result<Vec<Url>, ProbeError> {
        let response = self
            .client
            .get(self.query_url()?)
            .send()
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Transport(format!(
                "directory returned {}",
                status
            )));
        }

        let body: NodeListResponse = response
            .json()
            .await
            .map_err(|e| ProbeError::Decode(e.to_string()))?;

        let nodes: Vec<Url> = body
            .data
            .iter()
            .filter_map(|d| {
                let url = self.node_url(&d.host);
                if url.is_none() {
                    tracing::warn!(host = %d.host, "Ignoring unparsable node host");
                }
                url
            })
            .collect();

        tracing::debug!(count = nodes.len(), "Directory reported healthy nodes");
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe() -> DirectoryProbe {
        DirectoryProbe::new(
            Client::new(),
            Url::parse("http://peers.example:7903").unwrap(),
            3000,
        )
    }

    #[test]
    fn test_query_url() {
        let url = probe().query_url().unwrap();
        assert_eq!(
            url.as_str(),
            "http://peers.example:7903/network/nodes?health.apiNode=up&health.db=up"
        );
    }

    #[test]
    fn test_query_url_keeps_directory_path() {
        for base in ["http://peers.example/api", "http://peers.example/api/"] {
            let probe = DirectoryProbe::new(Client::new(), Url::parse(base).unwrap(), 3000);
            assert_eq!(
                probe.query_url().unwrap().as_str(),
                "http://peers.example/api/network/nodes?health.apiNode=up&health.db=up"
            );
        }
    }

    #[test]
    fn test_node_url_uses_rest_port() {
        let url = probe().node_url("dual-01.dhealth.cloud").unwrap();
        assert_eq!(url.as_str(), "http://dual-01.dhealth.cloud:3000/");
    }

    #[tokio::test]
    async fn test_unreachable_directory_propagates() {
        let probe = DirectoryProbe::new(
            Client::new(),
            Url::parse("http://127.0.0.1:1").unwrap(),
            3000,
        );
        let result = probe.healthy_nodes().await;
        assert!(matches!(result, Err(ProbeError::Transport(_))));
    }
}
