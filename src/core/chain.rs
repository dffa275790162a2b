//! Fingerprint chaining (`Huella` and `Encadenamiento`).
//!
//! Each record's fingerprint is the uppercase hex SHA-256 of a `key=value`
//! list joined with `&`. The previous record's fingerprint enters the list
//! as `Huella`, which links every record to its predecessor.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::error::VerifactuError;
use super::record::{ChainLink, Record, RecordId, format_amount};

/// Minimal state needed to continue a chain: the identity and fingerprint of
/// the last sealed record. Persisted by the caller between invocations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainData {
    /// Supplier NIF.
    pub issuer: String,
    /// "SERIES-CODE" of the last record.
    pub num_series: String,
    /// Issue date of the last record, DD-MM-YYYY.
    pub issue_date: String,
    /// Fingerprint of the last record.
    pub fingerprint: String,
}

impl ChainData {
    pub fn record_id(&self) -> RecordId {
        RecordId::new(&self.issuer, &self.num_series, &self.issue_date)
    }
}

/// Render one fingerprint field. Values are trimmed and never URL-encoded.
pub fn format_field(key: &str, value: &str) -> String {
    format!("{key}={}", value.trim())
}

/// Fingerprint input string for an ordered field list.
pub fn fingerprint_input(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format_field(k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// SHA-256 of the joined field list, as uppercase hex.
pub fn fingerprint(fields: &[(&str, &str)]) -> String {
    let digest = Sha256::digest(fingerprint_input(fields).as_bytes());
    hex::encode_upper(digest)
}

/// Fingerprint input of `record` when linked through `link`.
pub fn record_fingerprint_input(record: &Record, link: &ChainLink) -> String {
    let id = record.id();
    debug_assert!(
        !id.issuer.is_empty() && !id.num_series.is_empty() && !id.issue_date.is_empty(),
        "record identity must be complete before fingerprinting"
    );

    match record {
        Record::Registration(reg) => {
            let tax_total = format_amount(reg.tax_total);
            let grand_total = format_amount(reg.grand_total);
            fingerprint_input(&[
                ("IDEmisorFactura", &id.issuer),
                ("NumSerieFactura", &id.num_series),
                ("FechaExpedicionFactura", &id.issue_date),
                ("TipoFactura", reg.invoice_type.code()),
                ("CuotaTotal", &tax_total),
                ("ImporteTotal", &grand_total),
                ("Huella", link.huella()),
                ("FechaHoraHusoGenRegistro", &reg.timestamp),
            ])
        }
        Record::Cancellation(can) => fingerprint_input(&[
            ("IDEmisorFacturaAnulada", &id.issuer),
            ("NumSerieFacturaAnulada", &id.num_series),
            ("FechaExpedicionFacturaAnulada", &id.issue_date),
            ("Huella", link.huella()),
            ("FechaHoraHusoGenRegistro", &can.timestamp),
        ]),
    }
}

fn compute(record: &Record, link: &ChainLink) -> String {
    let input = record_fingerprint_input(record, link);
    hex::encode_upper(Sha256::digest(input.as_bytes()))
}

/// Seals records into a chain and checks sealed records.
pub struct ChainEngine;

impl ChainEngine {
    /// Fill the chaining block and fingerprint of `record`.
    ///
    /// `prev` is the chain data of the last record for this issuer, or `None`
    /// for the first record of the chain. Returns the new fingerprint.
    pub fn seal(record: &mut Record, prev: Option<&ChainData>) -> Result<String, VerifactuError> {
        if record.fingerprint().is_some() {
            return Err(VerifactuError::Validation(format!(
                "record {} already processed",
                record.id()
            )));
        }

        let link = ChainLink::from_previous(prev);
        let fingerprint = compute(record, &link);

        tracing::debug!(
            id = %record.id(),
            kind = record.kind().as_str(),
            first = link.is_first(),
            fingerprint = %fingerprint,
            "record sealed"
        );

        record.set_seal(link, fingerprint.clone());
        Ok(fingerprint)
    }

    /// Check that a sealed record links to `prev` and that its fingerprint
    /// matches its contents.
    pub fn verify(record: &Record, prev: Option<&ChainData>) -> bool {
        let (Some(link), Some(stored)) = (record.chain(), record.fingerprint()) else {
            return false;
        };
        *link == ChainLink::from_previous(prev) && compute(record, link) == stored
    }
}

/// Why a chain check failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreakReason {
    /// The record has no chaining block or fingerprint.
    #[error("record is not sealed")]
    Unsealed,
    /// The stored fingerprint does not match the record contents.
    #[error("fingerprint mismatch (expected {expected}, found {found})")]
    FingerprintMismatch { expected: String, found: String },
    /// The record does not link to the record before it.
    #[error("link does not match the previous record")]
    LinkMismatch,
}

/// First break found by [`verify_chain`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("chain broken at record {index} ({id}): {reason}")]
pub struct ChainBreak {
    /// Position in the checked slice.
    pub index: usize,
    pub id: RecordId,
    pub reason: BreakReason,
}

/// Walk a sequence of sealed records and report the first break.
///
/// The first record may link to anything (the slice can be a window of a
/// longer chain); every later record must link to the one before it.
pub fn verify_chain(records: &[Record]) -> Result<(), ChainBreak> {
    let mut prev: Option<(&RecordId, &str)> = None;

    for (index, record) in records.iter().enumerate() {
        let fail = |reason: BreakReason| {
            tracing::warn!(index, id = %record.id(), %reason, "chain verification failed");
            ChainBreak {
                index,
                id: record.id().clone(),
                reason,
            }
        };

        let (Some(link), Some(stored)) = (record.chain(), record.fingerprint()) else {
            return Err(fail(BreakReason::Unsealed));
        };

        let expected = compute(record, link);
        if expected != stored {
            return Err(fail(BreakReason::FingerprintMismatch {
                expected,
                found: stored.to_string(),
            }));
        }

        if let Some((prev_id, prev_fingerprint)) = prev {
            let linked = matches!(
                link,
                ChainLink::Previous { id, fingerprint }
                    if id == prev_id && fingerprint == prev_fingerprint
            );
            if !linked {
                return Err(fail(BreakReason::LinkMismatch));
            }
        }

        prev = Some((record.id(), stored));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_render_as_bare_key() {
        assert_eq!(format_field("Huella", ""), "Huella=");
        assert_eq!(format_field("Huella", "   "), "Huella=");
        assert_eq!(format_field("NIF", " B123 "), "NIF=B123");
    }

    #[test]
    fn values_are_not_url_encoded() {
        assert_eq!(
            fingerprint_input(&[("A", "x&y"), ("B", "2024-11-20T19:00:55+01:00")]),
            "A=x&y&B=2024-11-20T19:00:55+01:00"
        );
    }

    // Integer amounts, as some producers render them. Records sealed by
    // `ChainEngine` always carry two decimals.
    #[test]
    fn integer_amount_field_list() {
        let hash = fingerprint(&[
            ("IDEmisorFactura", "A28083806"),
            ("NumSerieFactura", "SAMPLE-001"),
            ("FechaExpedicionFactura", "11-11-2024"),
            ("TipoFactura", "F1"),
            ("CuotaTotal", "378"),
            ("ImporteTotal", "2178"),
            (
                "Huella",
                "4B0A5C1D3F28E6A79B8C2D1E0F3A4B5C6D7E8F9A0B1C2D3E4F5A6B7C8D9E0F1",
            ),
            ("FechaHoraHusoGenRegistro", "2024-11-20T19:00:55+01:00"),
        ]);
        assert_eq!(
            hash,
            "9F848AF7AECAA4C841654B37FD7119F4530B19141A2C3FF9968B5A229DEE21C2"
        );
    }

    // Cancellation identity without the `Anulada` suffix. Records sealed by
    // `ChainEngine` use the suffixed keys.
    #[test]
    fn unsuffixed_cancellation_field_list() {
        let hash = fingerprint(&[
            ("IDEmisorFactura", "A28083806"),
            ("NumSerieFactura", "SAMPLE-001"),
            ("FechaExpedicionFactura", "11-11-2024"),
            ("Huella", ""),
            ("FechaHoraHusoGenRegistro", "2024-11-21T10:00:55+01:00"),
        ]);
        assert_eq!(
            hash,
            "CBA051CBF59488B6978FA66E95ED4D0A84A97F5C0700EA952B923BD6E7C3FD7A"
        );
    }

    #[test]
    fn break_reason_messages() {
        assert_eq!(BreakReason::Unsealed.to_string(), "record is not sealed");
        assert_eq!(
            BreakReason::FingerprintMismatch {
                expected: "AA".into(),
                found: "BB".into(),
            }
            .to_string(),
            "fingerprint mismatch (expected AA, found BB)"
        );
    }

    #[test]
    fn chain_data_json_tags() {
        let data = ChainData {
            issuer: "A28083806".into(),
            num_series: "SAMPLE-001".into(),
            issue_date: "11-11-2024".into(),
            fingerprint: "ABC".into(),
        };
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(
            json,
            r#"{"issuer":"A28083806","num_series":"SAMPLE-001","issue_date":"11-11-2024","fingerprint":"ABC"}"#
        );
        let back: ChainData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }
}
