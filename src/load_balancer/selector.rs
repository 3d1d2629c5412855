//! First-healthy node selection with last-known fallback.

use arc_swap::ArcSwapOption;
use reqwest::Client;
use std::sync::Arc;
use url::Url;

use crate::health::probe::NodeHealthProbe;
use crate::ledger::legacy::network::LegacyNetwork;
use crate::ledger::types::{LedgerError, LedgerResult};
use crate::load_balancer::node::NodeCandidate;
use crate::observability::metrics;

/// Where a selected node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    /// First entry of the directory's healthy list.
    Healthy,
    /// Directory list was empty; last selected node reused.
    Fallback,
}

impl SelectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionSource::Healthy => "healthy",
            SelectionSource::Fallback => "fallback",
        }
    }
}

/// Produces connected node handles for the legacy ledger.
pub struct NodeSelector {
    probe: Arc<dyn NodeHealthProbe>,
    client: Client,
    network: Arc<LegacyNetwork>,
    /// Last selected node. Read and written without coordination.
    current_node: ArcSwapOption<Url>,
}

impl NodeSelector {
    pub fn new(probe: Arc<dyn NodeHealthProbe>, client: Client, network: Arc<LegacyNetwork>) -> Self {
        Self {
            probe,
            client,
            network,
            current_node: ArcSwapOption::empty(),
        }
    }

    /// Select a node and remember it as the current node.
    ///
    /// Directory errors propagate. An empty healthy list falls back to the
    /// last selected node; with no such node the selection fails with
    /// [`LedgerError::NoUsableNode`].
    pub async fn select_node(&self) -> LedgerResult<NodeCandidate> {
        let healthy = self
            .probe
            .healthy_nodes()
            .await
            .map_err(|e| LedgerError::Discovery(e.to_string()))?;

        let (url, source) = match healthy.into_iter().next() {
            Some(url) => (url, SelectionSource::Healthy),
            None => match self.current_node.load_full() {
                Some(last) => {
                    tracing::warn!(node = %last, "No healthy nodes reported, reusing last node");
                    ((*last).clone(), SelectionSource::Fallback)
                }
                None => {
                    metrics::record_node_selection("none");
                    tracing::error!("No healthy nodes reported and no node selected before");
                    return Err(LedgerError::NoUsableNode);
                }
            },
        };

        let candidate = NodeCandidate::connect(self.client.clone(), url.clone(), self.network.clone());
        self.current_node.store(Some(Arc::new(url)));

        metrics::record_node_selection(source.as_str());
        tracing::debug!(node = %candidate.url(), source = source.as_str(), "Current node");
        Ok(candidate)
    }

    /// The last selected node, if any.
    pub fn current_node(&self) -> Option<Url> {
        self.current_node.load_full().map(|u| (*u).clone())
    }
}

impl std::fmt::Debug for NodeSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeSelector")
            .field("current_node", &self.current_node())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LegacyNetworkConfig;
    use crate::health::probe::ProbeError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Probe returning scripted answers, one per call.
    struct ScriptedProbe {
        answers: Mutex<Vec<Result<Vec<Url>, ProbeError>>>,
    }

    impl ScriptedProbe {
        fn new(answers: Vec<Result<Vec<Url>, ProbeError>>) -> Arc<Self> {
            let mut answers = answers;
            answers.reverse();
            Arc::new(Self {
                answers: Mutex::new(answers),
            })
        }
    }

    #[async_trait]
    impl NodeHealthProbe for ScriptedProbe {
        async fn healthy_nodes(&self) -> Result<Vec<Url>, ProbeError> {
            self.answers.lock().unwrap().pop().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn selector(probe: Arc<ScriptedProbe>) -> NodeSelector {
        let network = LegacyNetwork::from_config(&LegacyNetworkConfig::default()).unwrap();
        NodeSelector::new(probe, Client::new(), Arc::new(network))
    }

    #[tokio::test]
    async fn test_picks_first_healthy() {
        let nodes = vec![url("http://n1:3000/"), url("http://n2:3000/"), url("http://n3:3000/")];
        let selector = selector(ScriptedProbe::new(vec![
            Ok(nodes.clone()),
            Ok(nodes.clone()),
            Ok(nodes),
        ]));

        for _ in 0..3 {
            let node = selector.select_node().await.unwrap();
            assert_eq!(node.url().as_str(), "http://n1:3000/");
        }
        assert_eq!(selector.current_node(), Some(url("http://n1:3000/")));
    }

    #[tokio::test]
    async fn test_falls_back_to_last_node() {
        let selector = selector(ScriptedProbe::new(vec![
            Ok(vec![url("http://last:3000/")]),
            Ok(Vec::new()),
        ]));

        selector.select_node().await.unwrap();
        let node = selector.select_node().await.unwrap();
        assert_eq!(node.url().as_str(), "http://last:3000/");
    }

    #[tokio::test]
    async fn test_no_node_ever_selected() {
        let selector = selector(ScriptedProbe::new(vec![Ok(Vec::new())]));
        let result = selector.select_node().await;
        assert!(matches!(result, Err(LedgerError::NoUsableNode)));
        assert!(selector.current_node().is_none());
    }

    #[tokio::test]
    async fn test_directory_error_propagates() {
        let selector = selector(ScriptedProbe::new(vec![
            Ok(vec![url("http://n1:3000/")]),
            Err(ProbeError::Transport("timeout".to_string())),
        ]));

        selector.select_node().await.unwrap();
        let result = selector.select_node().await;
        // No fallback on transport errors
        assert!(matches!(result, Err(LedgerError::Discovery(_))));
    }

    #[tokio::test]
    async fn test_candidate_carries_fixed_network_identity() {
        let selector = selector(ScriptedProbe::new(vec![Ok(vec![url("http://n1:3000/")])]));
        let node = selector.select_node().await.unwrap();
        assert_eq!(node.network().epoch_adjustment, 1616978397);
        assert_eq!(node.network().network_type.0, 104);
    }
}
