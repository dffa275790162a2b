//! Construction of `RegistroAlta` and `RegistroAnulacion` from invoices.
//!
//! Credit notes are reported with negative amounts. Corrective and
//! substitute invoices list the documents they replace.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::breakdown::classify;
use super::codes::{CorrectionType, InvoiceType, IssuerRole};
use super::description::{DescriptionPolicy, resolve_description};
use super::error::VerifactuError;
use super::party::resolve_party;
use super::record::{
    Cancellation, Record, RecordId, RecordParty, RectificationAmounts, Registration, Software,
    format_date,
};
use super::types::{CategoryTotal, DocumentReference, Invoice, InvoiceKind, TaxCategory, Totals};

/// Totals above this amount set `Macrodato`.
pub const HIGH_VALUE_THRESHOLD: Decimal = dec!(100000000);

/// Builds unsealed registration and cancellation records from invoices.
///
/// Construction either returns a complete record or an error; nothing is
/// fingerprinted here (see [`ChainEngine`](super::ChainEngine)).
#[derive(Debug, Clone)]
pub struct RecordBuilder<'a> {
    software: &'a Software,
    role: IssuerRole,
    description_policy: DescriptionPolicy,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(software: &'a Software, role: IssuerRole) -> Self {
        Self {
            software,
            role,
            description_policy: DescriptionPolicy::default(),
        }
    }

    pub fn description_policy(mut self, policy: DescriptionPolicy) -> Self {
        self.description_policy = policy;
        self
    }

    /// Build a `RegistroAlta`. `timestamp` is the formatted generation time.
    pub fn registration(&self, invoice: &Invoice, timestamp: &str) -> Result<Record, VerifactuError> {
        let issuer = supplier_nif(invoice)?;
        let invoice_type = invoice.tax.invoice_type.ok_or_else(|| {
            VerifactuError::Validation("tax.invoice_type: required".into())
        })?;
        let description = resolve_description(invoice, self.description_policy)?;

        // The registry expects credited amounts as negative values.
        let credit_note = invoice.kind == InvoiceKind::CreditNote;
        let totals = if credit_note {
            invoice.totals.negated()
        } else {
            invoice.totals.clone()
        };

        let breakdown = classify(invoice, &totals)?;
        let tax_total = tax_total(&totals);
        let mut untaxed_charges: Decimal = invoice
            .charges
            .iter()
            .filter(|c| c.taxes.is_empty())
            .map(|c| c.amount)
            .sum();
        if credit_note {
            untaxed_charges = -untaxed_charges;
        }
        let grand_total = totals.net_total + tax_total - untaxed_charges;

        let recipient = match &invoice.customer {
            Some(customer) => match resolve_party(customer, invoice.issue_date) {
                Some(party) => Some(party),
                None if invoice_type.allows_unidentified_recipient() => None,
                None => {
                    return Err(VerifactuError::Validation(
                        "customer: tax ID or other identity is required".into(),
                    ));
                }
            },
            None => None,
        };
        let no_recipient = invoice_type
            .allows_unidentified_recipient()
            .then_some(recipient.is_none());

        let mut correction_type = None;
        let mut rectified = Vec::new();
        let mut rectification = None;
        if invoice_type.is_corrective() {
            let mode = invoice.tax.correction_type.ok_or_else(|| {
                VerifactuError::Validation("tax.correction_type: required".into())
            })?;
            rectified = reference_ids(&issuer, &invoice.preceding);
            if mode == CorrectionType::Substitution {
                let amounts = rectification_amounts(&invoice.preceding);
                rectification = Some(if credit_note { amounts.negated() } else { amounts });
            }
            correction_type = Some(mode);
        }

        let substituted = if invoice_type == InvoiceType::F3 {
            reference_ids(&issuer, &invoice.preceding)
        } else {
            Vec::new()
        };

        let (issued_by, third_party) = match self.role {
            IssuerRole::Supplier => (None, None),
            IssuerRole::Customer => (Some(IssuerRole::Customer), None),
            IssuerRole::ThirdParty => (
                Some(IssuerRole::ThirdParty),
                Some(supplier_party(invoice)?),
            ),
        };

        let operation_date = invoice
            .operation_date
            .filter(|d| *d != invoice.issue_date)
            .map(format_date);

        let id = RecordId::from_parts(
            &issuer,
            invoice.series.as_deref(),
            &invoice.code,
            invoice.issue_date,
        );

        tracing::debug!(
            %id,
            invoice_type = invoice_type.code(),
            entries = breakdown.len(),
            "registration built"
        );

        Ok(Record::Registration(Box::new(Registration {
            id,
            issuer_name: invoice.supplier.name.clone(),
            invoice_type,
            correction_type,
            rectified,
            substituted,
            rectification,
            operation_date,
            description,
            simplified_art_7273: invoice.tax.simplified_art_7273,
            no_recipient,
            high_value: grand_total > HIGH_VALUE_THRESHOLD,
            issued_by,
            third_party,
            recipient,
            breakdown,
            tax_total,
            grand_total,
            software: self.software.clone(),
            timestamp: timestamp.to_string(),
            chain: None,
            fingerprint: None,
        })))
    }

    /// Build a `RegistroAnulacion` for a previously registered invoice.
    pub fn cancellation(&self, invoice: &Invoice, timestamp: &str) -> Result<Record, VerifactuError> {
        let issuer = supplier_nif(invoice)?;

        let generator = match self.role {
            IssuerRole::Supplier | IssuerRole::ThirdParty => supplier_party(invoice)?,
            IssuerRole::Customer => invoice
                .customer
                .as_ref()
                .and_then(|c| resolve_party(c, invoice.issue_date))
                .ok_or_else(|| {
                    VerifactuError::Validation(
                        "customer: identity is required when the customer cancels".into(),
                    )
                })?,
        };

        let id = RecordId::from_parts(
            &issuer,
            invoice.series.as_deref(),
            &invoice.code,
            invoice.issue_date,
        );
        tracing::debug!(%id, "cancellation built");

        Ok(Record::Cancellation(Cancellation {
            id,
            generated_by: Some(self.role),
            generator: Some(generator),
            software: self.software.clone(),
            timestamp: timestamp.to_string(),
            chain: None,
            fingerprint: None,
        }))
    }
}

fn supplier_nif(invoice: &Invoice) -> Result<String, VerifactuError> {
    invoice
        .supplier
        .tax_id
        .as_ref()
        .filter(|t| t.is_spanish())
        .map(|t| t.code.trim().to_string())
        .ok_or_else(|| {
            VerifactuError::Validation("supplier.tax_id: Spanish tax ID is required".into())
        })
}

fn supplier_party(invoice: &Invoice) -> Result<RecordParty, VerifactuError> {
    resolve_party(&invoice.supplier, invoice.issue_date).ok_or_else(|| {
        VerifactuError::Validation("supplier: tax ID or other identity is required".into())
    })
}

/// `CuotaTotal`: charged taxes and equivalence surcharges of non-retained categories.
fn tax_total(totals: &Totals) -> Decimal {
    totals
        .taxes
        .iter()
        .filter(|c| !c.retained)
        .map(|c| c.amount + c.surcharge.unwrap_or(Decimal::ZERO))
        .sum()
}

fn reference_ids(issuer: &str, refs: &[DocumentReference]) -> Vec<RecordId> {
    refs.iter()
        .map(|r| RecordId::from_parts(issuer, r.series.as_deref(), &r.code, r.issue_date))
        .collect()
}

/// `ImporteRectificacion` from the VAT totals of the corrected documents.
fn rectification_amounts(refs: &[DocumentReference]) -> RectificationAmounts {
    let vat: Vec<&CategoryTotal> = refs
        .iter()
        .flat_map(|r| r.taxes.iter())
        .filter(|c| c.category == TaxCategory::Vat)
        .collect();

    RectificationAmounts {
        base: vat.iter().flat_map(|c| c.rates.iter()).map(|r| r.base).sum(),
        quota: vat.iter().map(|c| c.amount).sum(),
        surcharge: vat.iter().filter_map(|c| c.surcharge).sum(),
    }
}
