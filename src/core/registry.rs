use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::chain::ChainData;
use super::config::Config;
use super::error::VerifactuError;
use super::record::{Record, RecordKind};

/// Whether registrations and cancellations of one issuer share a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainMode {
    /// One chain per issuer, covering both record kinds.
    #[default]
    Shared,
    /// One chain per issuer and record kind.
    PerRecordKind,
}

impl ChainMode {
    /// Registry key of the chain a record of `kind` from `issuer` belongs to.
    pub fn slot(&self, issuer: &str, kind: RecordKind) -> String {
        match self {
            Self::Shared => issuer.to_string(),
            Self::PerRecordKind => format!("{issuer}/{}", kind.as_str()),
        }
    }
}

/// In-memory map from chain slot to the last sealed record's chain data.
///
/// Holds no locks: the caller serializes registration per issuer and
/// persists the registry (it is JSON-serializable) between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRegistry {
    mode: ChainMode,
    last: BTreeMap<String, ChainData>,
}

impl ChainRegistry {
    pub fn new(mode: ChainMode) -> Self {
        Self {
            mode,
            last: BTreeMap::new(),
        }
    }

    /// Empty registry keyed by the chain mode of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.chain_mode)
    }

    pub fn mode(&self) -> ChainMode {
        self.mode
    }

    /// Predecessor for the next record of `kind` from `issuer`.
    pub fn previous(&self, issuer: &str, kind: RecordKind) -> Option<&ChainData> {
        self.last.get(&self.mode.slot(issuer, kind))
    }

    /// Record a sealed record as the new head of its chain.
    pub fn advance(&mut self, record: &Record) -> Result<(), VerifactuError> {
        let data = record.chain_data().ok_or_else(|| {
            VerifactuError::Validation(format!("record {} is not sealed", record.id()))
        })?;
        let slot = self.mode.slot(&data.issuer, record.kind());
        self.last.insert(slot, data);
        Ok(())
    }

    /// Number of chains tracked.
    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}
