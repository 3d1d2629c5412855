//! Node candidate abstraction.
//!
//! # Responsibilities
//! - Represent one reachable legacy node for one relay attempt
//! - Carry the network identity the node is expected to serve
//! - Hand out the node's REST repositories

use reqwest::Client;
use std::sync::Arc;
use url::Url;

use crate::ledger::legacy::network::LegacyNetwork;
use crate::ledger::legacy::repository::{
    AccountRepository, BlockRepository, ChainRepository, NodeRepository, RepositoryFactory,
    TransactionRepository,
};

/// A connected node handle.
#[derive(Debug, Clone)]
pub struct NodeCandidate {
    url: Url,
    network: Arc<LegacyNetwork>,
    factory: RepositoryFactory,
}

impl NodeCandidate {
    /// Connect a candidate to `url`. No request is made until a
    /// repository is used.
    pub fn connect(client: Client, url: Url, network: Arc<LegacyNetwork>) -> Self {
        let factory = RepositoryFactory::new(client, url.clone());
        Self {
            url,
            network,
            factory,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn network(&self) -> &LegacyNetwork {
        &self.network
    }

    pub fn transactions(&self) -> TransactionRepository {
        self.factory.create_transaction_repository()
    }

    pub fn accounts(&self) -> AccountRepository {
        self.factory.create_account_repository()
    }

    pub fn blocks(&self) -> BlockRepository {
        self.factory.create_block_repository()
    }

    pub fn chain(&self) -> ChainRepository {
        self.factory.create_chain_repository()
    }

    pub fn node(&self) -> NodeRepository {
        self.factory.create_node_repository()
    }
}
