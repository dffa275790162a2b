use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::chain::{ChainData, ChainEngine};
use super::config::Config;
use super::error::VerifactuError;
use super::qr::verification_url;
use super::record::Record;
use super::record_builder::RecordBuilder;
use super::registry::ChainRegistry;
use super::timestamp::{Clock, SystemClock, Timestamper};
use super::types::Invoice;
use super::validation::validate_invoice;

/// A sealed record ready for submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub record: Record,
    /// Predecessor for the next record of the same chain. Persist it.
    pub chain_data: ChainData,
    /// Verification link for the invoice QR code. Registrations only.
    pub verification_url: Option<String>,
}

/// Validates, builds and seals records.
///
/// Holds no mutable state. The caller must serialize calls per issuer so
/// that two records never chain onto the same predecessor.
#[derive(Clone)]
pub struct Client {
    config: Config,
    timestamper: Timestamper,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("timestamper", &self.timestamper)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(config: Config) -> Self {
        Self {
            timestamper: Timestamper::new(config.timezone),
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock, e.g. with a [`FixedClock`](super::FixedClock).
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Empty chain registry keyed by the configured [`ChainMode`](super::ChainMode).
    pub fn registry(&self) -> ChainRegistry {
        ChainRegistry::from_config(&self.config)
    }

    /// Build and seal a registration for `invoice`, chained after `prev`.
    pub fn register(
        &self,
        invoice: &Invoice,
        prev: Option<&ChainData>,
    ) -> Result<Submission, VerifactuError> {
        let mut record = self.build_registration(invoice)?;
        ChainEngine::seal(&mut record, prev)?;
        self.finish_registration(record)
    }

    /// Build and seal a cancellation for `invoice`, chained after `prev`.
    pub fn cancel(
        &self,
        invoice: &Invoice,
        prev: Option<&ChainData>,
    ) -> Result<Submission, VerifactuError> {
        let mut record = self.build_cancellation(invoice)?;
        ChainEngine::seal(&mut record, prev)?;
        self.finish(record, None)
    }

    /// Register `invoice` after the head of its chain in `registry`, then
    /// advance the registry.
    pub fn register_in(
        &self,
        registry: &mut ChainRegistry,
        invoice: &Invoice,
    ) -> Result<Submission, VerifactuError> {
        let mut record = self.build_registration(invoice)?;
        seal_from(registry, &mut record)?;
        let submission = self.finish_registration(record)?;
        registry.advance(&submission.record)?;
        Ok(submission)
    }

    /// Cancel `invoice` after the head of its chain in `registry`, then
    /// advance the registry.
    pub fn cancel_in(
        &self,
        registry: &mut ChainRegistry,
        invoice: &Invoice,
    ) -> Result<Submission, VerifactuError> {
        let mut record = self.build_cancellation(invoice)?;
        seal_from(registry, &mut record)?;
        let submission = self.finish(record, None)?;
        registry.advance(&submission.record)?;
        Ok(submission)
    }

    fn build_registration(&self, invoice: &Invoice) -> Result<Record, VerifactuError> {
        self.prevalidate(invoice)?;
        let timestamp = self.timestamper.now(self.clock.as_ref());
        self.record_builder().registration(invoice, &timestamp)
    }

    fn build_cancellation(&self, invoice: &Invoice) -> Result<Record, VerifactuError> {
        self.prevalidate(invoice)?;
        let timestamp = self.timestamper.now(self.clock.as_ref());
        self.record_builder().cancellation(invoice, &timestamp)
    }

    fn finish_registration(&self, record: Record) -> Result<Submission, VerifactuError> {
        let verification_url = record
            .as_registration()
            .map(|reg| verification_url(self.config.environment, &reg.id, reg.grand_total));
        self.finish(record, verification_url)
    }

    fn record_builder(&self) -> RecordBuilder<'_> {
        RecordBuilder::new(&self.config.software, self.config.issuer_role)
            .description_policy(self.config.description_policy)
    }

    fn prevalidate(&self, invoice: &Invoice) -> Result<(), VerifactuError> {
        let errors = validate_invoice(invoice);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }

    fn finish(
        &self,
        record: Record,
        verification_url: Option<String>,
    ) -> Result<Submission, VerifactuError> {
        let chain_data = record.chain_data().ok_or_else(|| {
            VerifactuError::Validation(format!("record {} was not sealed", record.id()))
        })?;
        Ok(Submission {
            record,
            chain_data,
            verification_url,
        })
    }
}

fn seal_from(registry: &ChainRegistry, record: &mut Record) -> Result<String, VerifactuError> {
    let prev = registry.previous(&record.id().issuer, record.kind()).cloned();
    ChainEngine::seal(record, prev.as_ref())
}
