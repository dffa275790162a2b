//! Tax breakdown (`Desglose`) classification.
//!
//! Maps the invoice's per-rate tax totals onto AEAT's tax type, regime and
//! operation classification codes. Validation rules follow the published
//! VeriFactu error catalogue: exempt operations carry an E1–E6 cause and no
//! rate, subject operations carry S1/S2, not-subject ones N1/N2.

use rust_decimal::Decimal;

use super::codes::{OperationClass, RegimeKey, TaxType, is_exemption_code};
use super::error::VerifactuError;
use super::record::BreakdownEntry;
use super::types::{CategoryTotal, Invoice, InvoiceTag, RateTotal, TaxCategory, Totals};

/// Build one breakdown entry per (category, rate) of the non-retained taxes in
/// `totals`, keeping their order.
///
/// `totals` is passed separately from `invoice` so that sign-inverted totals
/// can be classified for credit notes.
pub fn classify(invoice: &Invoice, totals: &Totals) -> Result<Vec<BreakdownEntry>, VerifactuError> {
    let mut entries = Vec::new();
    for category in totals.taxes.iter().filter(|c| !c.retained) {
        for rate in &category.rates {
            entries.push(classify_rate(invoice, category, rate)?);
        }
    }
    Ok(entries)
}

/// `Impuesto` code for a tax category.
pub fn tax_type(category: &TaxCategory) -> TaxType {
    match category {
        TaxCategory::Vat => TaxType::Vat,
        TaxCategory::Igic => TaxType::Igic,
        TaxCategory::Ipsi => TaxType::Ipsi,
        TaxCategory::Other(_) => TaxType::Other,
    }
}

fn classify_rate(
    invoice: &Invoice,
    category: &CategoryTotal,
    rate: &RateTotal,
) -> Result<BreakdownEntry, VerifactuError> {
    let tax_type = tax_type(&category.category);
    let rate_label = rate.key.as_deref().unwrap_or("(unnamed)");

    let regime = match tax_type {
        TaxType::Vat | TaxType::Igic => Some(rate.ext.regime.unwrap_or_else(|| {
            derive_regime(invoice, tax_type, rate)
        })),
        _ => None,
    };

    let mut entry = BreakdownEntry {
        tax_type,
        regime,
        operation_class: None,
        exemption: None,
        tax_rate: None,
        base: rate.base,
        cost_base: None,
        charged_amount: None,
        surcharge_rate: None,
        surcharge_amount: None,
    };

    match (&rate.percent, &rate.ext.exemption) {
        (None, Some(code)) => {
            if !is_exemption_code(code) {
                return Err(VerifactuError::Validation(format!(
                    "invalid exemption code {code} for rate {rate_label}: must be E1-E6"
                )));
            }
            entry.exemption = Some(code.clone());
        }
        _ => {
            let class = rate.ext.operation_class.ok_or_else(|| {
                VerifactuError::Validation(format!(
                    "missing operation classification for rate {rate_label}"
                ))
            })?;
            entry.operation_class = Some(class);
            match class {
                OperationClass::S1 => {
                    entry.tax_rate = rate.percent;
                    entry.charged_amount = Some(rate.amount);
                }
                // Reverse charge: zero rate and zero quota on the issuer side.
                OperationClass::S2 => {
                    entry.tax_rate = Some(Decimal::ZERO);
                    entry.charged_amount = Some(Decimal::ZERO);
                }
                OperationClass::N1 | OperationClass::N2 => {}
            }
        }
    }

    if matches!(tax_type, TaxType::Ipsi | TaxType::Other)
        || regime.is_some_and(|r| r.is_cost_basis())
    {
        entry.cost_base = Some(rate.base);
    }

    // Surcharges only apply to regular domestic operations.
    if entry.operation_class != Some(OperationClass::S1) {
        return Ok(entry);
    }
    match (rate.equivalence, rate.surcharge) {
        (_, Some(surcharge)) => {
            entry.surcharge_rate = Some(surcharge.percent);
            entry.surcharge_amount = Some(surcharge.amount);
        }
        (true, None) => {
            return Err(VerifactuError::Validation(format!(
                "missing equivalence surcharge for rate {rate_label}"
            )));
        }
        (false, None) => {}
    }

    Ok(entry)
}

/// Regime for a VAT or IGIC rate without an explicit `ClaveRegimen`.
fn derive_regime(invoice: &Invoice, tax_type: TaxType, rate: &RateTotal) -> RegimeKey {
    if has_foreign_customer(invoice) {
        return RegimeKey::Export;
    }
    if invoice.has_tag(InvoiceTag::SecondHandGoods)
        || invoice.has_tag(InvoiceTag::Antiques)
        || invoice.has_tag(InvoiceTag::Art)
    {
        return RegimeKey::SpecialGoods;
    }
    if invoice.has_tag(InvoiceTag::TravelAgency) {
        return RegimeKey::TravelAgency;
    }
    if tax_type == TaxType::Vat {
        if rate.equivalence {
            return RegimeKey::EquivalenceSurcharge;
        }
        if invoice.has_tag(InvoiceTag::SimplifiedScheme) {
            return RegimeKey::Simplified;
        }
    }
    RegimeKey::General
}

/// A customer whose tax ID belongs to another country. Customers without a
/// tax ID count as domestic.
fn has_foreign_customer(invoice: &Invoice) -> bool {
    invoice
        .customer
        .as_ref()
        .and_then(|c| c.tax_id.as_ref())
        .is_some_and(|t| !t.country.eq_ignore_ascii_case("ES"))
}
