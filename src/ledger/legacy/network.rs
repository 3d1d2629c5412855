//! Fixed identity of the legacy network.

use crate::config::{CurrencyConfig, LegacyNetworkConfig};
use crate::ledger::legacy::account::NetworkType;
use crate::ledger::legacy::transaction::{Deadline, GenerationHash};
use crate::ledger::types::LedgerResult;

/// Network identity parameters. These are constants of the target ledger,
/// never derived from whichever node is selected.
#[derive(Debug, Clone)]
pub struct LegacyNetwork {
    pub network_type: NetworkType,
    pub generation_hash: GenerationHash,
    pub epoch_adjustment: u64,
    pub deadline_hours: u64,
    pub currency: CurrencyConfig,
}

impl LegacyNetwork {
    pub fn from_config(config: &LegacyNetworkConfig) -> LedgerResult<Self> {
        Ok(Self {
            network_type: NetworkType(config.network_type),
            generation_hash: config.generation_hash.parse()?,
            epoch_adjustment: config.epoch_adjustment,
            deadline_hours: config.deadline_hours,
            currency: config.currency.clone(),
        })
    }

    /// A fresh deadline for a transaction built now.
    pub fn deadline(&self) -> Deadline {
        Deadline::create(self.epoch_adjustment, self.deadline_hours)
    }
}
