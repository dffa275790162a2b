use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::ValidationError;
use super::types::*;

/// Maximum length of `NumSerieFactura`.
const MAX_SERIES_CODE_LEN: usize = 60;
/// Maximum length of `NombreRazon`.
const MAX_NAME_LEN: usize = 120;

/// Pre-validate an invoice before any record is built.
/// Returns all validation errors found (not just the first).
pub fn validate_invoice(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if invoice.code.trim().is_empty() {
        errors.push(ValidationError::new(
            "code",
            "invoice code must not be empty",
        ));
    }

    let series_code = match &invoice.series {
        Some(series) if !series.is_empty() => format!("{series}-{}", invoice.code),
        _ => invoice.code.clone(),
    };
    if series_code.chars().count() > MAX_SERIES_CODE_LEN {
        errors.push(ValidationError::new(
            "code",
            format!("series and code must not exceed {MAX_SERIES_CODE_LEN} characters"),
        ));
    }

    validate_supplier(&invoice.supplier, &mut errors);

    if let Some(customer) = &invoice.customer {
        if customer.name.chars().count() > MAX_NAME_LEN {
            errors.push(ValidationError::new(
                "customer.name",
                format!("name must not exceed {MAX_NAME_LEN} characters"),
            ));
        }
    }

    errors
}

fn validate_supplier(supplier: &Party, errors: &mut Vec<ValidationError>) {
    if supplier.name.trim().is_empty() {
        errors.push(ValidationError::new(
            "supplier.name",
            "name must not be empty",
        ));
    } else if supplier.name.chars().count() > MAX_NAME_LEN {
        errors.push(ValidationError::new(
            "supplier.name",
            format!("name must not exceed {MAX_NAME_LEN} characters"),
        ));
    }

    match &supplier.tax_id {
        None => errors.push(ValidationError::new(
            "supplier.tax_id",
            "supplier must have a tax ID",
        )),
        Some(tax_id) if !tax_id.country.eq_ignore_ascii_case("ES") => {
            errors.push(ValidationError::new(
                "supplier.tax_id",
                format!(
                    "only Spanish suppliers can issue VeriFactu records, got country {}",
                    tax_id.country
                ),
            ));
        }
        Some(tax_id) => validate_nif_format(&tax_id.code, "supplier.tax_id.code", errors),
    }
}

/// A Spanish NIF is 9 ASCII alphanumeric characters.
fn validate_nif_format(nif: &str, field: &str, errors: &mut Vec<ValidationError>) {
    if nif.len() != 9 || !nif.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push(ValidationError::new(
            field,
            format!("NIF '{nif}' must be 9 alphanumeric characters"),
        ));
    }
}

/// Calculate invoice totals from lines and charges.
///
/// Taxes are grouped by category, then by rate, in order of first appearance.
/// Amounts are rounded half-up to two decimals per rate.
pub fn calculate_totals(lines: &[LineItem], charges: &[Charge]) -> Totals {
    let mut groups: Vec<CategoryGroup> = Vec::new();

    for line in lines {
        let amount = line.net_amount();
        for combo in &line.taxes {
            add_to_group(&mut groups, combo, amount);
        }
    }
    for charge in charges {
        for combo in &charge.taxes {
            add_to_group(&mut groups, combo, charge.amount);
        }
    }

    let line_total: Decimal = lines.iter().map(LineItem::net_amount).sum();
    let charge_total: Decimal = charges.iter().map(|c| c.amount).sum();

    Totals {
        net_total: round_half_up(line_total + charge_total, 2),
        taxes: groups.into_iter().map(CategoryGroup::into_total).collect(),
    }
}

struct CategoryGroup {
    category: TaxCategory,
    retained: bool,
    rates: Vec<(TaxCombo, Decimal)>,
}

impl CategoryGroup {
    fn into_total(self) -> CategoryTotal {
        let rates: Vec<RateTotal> = self
            .rates
            .into_iter()
            .map(|(combo, base)| rate_total(combo, base))
            .collect();
        let amount = rates.iter().map(|r| r.amount).sum();
        let surcharges: Vec<Decimal> = rates
            .iter()
            .filter_map(|r| r.surcharge.map(|s| s.amount))
            .collect();
        let surcharge = if surcharges.is_empty() {
            None
        } else {
            Some(surcharges.into_iter().sum())
        };

        CategoryTotal {
            category: self.category,
            retained: self.retained,
            rates,
            amount,
            surcharge,
        }
    }
}

fn add_to_group(groups: &mut Vec<CategoryGroup>, combo: &TaxCombo, amount: Decimal) {
    let idx = match groups
        .iter()
        .position(|g| g.category == combo.category && g.retained == combo.retained)
    {
        Some(idx) => idx,
        None => {
            groups.push(CategoryGroup {
                category: combo.category.clone(),
                retained: combo.retained,
                rates: Vec::new(),
            });
            groups.len() - 1
        }
    };

    let group = &mut groups[idx];
    match group.rates.iter_mut().find(|(c, _)| c == combo) {
        Some((_, base)) => *base += amount,
        None => group.rates.push((combo.clone(), amount)),
    }
}

fn rate_total(combo: TaxCombo, base: Decimal) -> RateTotal {
    let base = round_half_up(base, 2);
    let amount = match combo.percent {
        Some(percent) => round_half_up(base * percent / dec!(100), 2),
        None => Decimal::ZERO,
    };
    let surcharge = match (combo.equivalence, combo.surcharge_percent) {
        (true, Some(percent)) => Some(Surcharge {
            percent,
            amount: round_half_up(base * percent / dec!(100), 2),
        }),
        _ => None,
    };

    RateTotal {
        key: combo.rate,
        percent: combo.percent,
        base,
        amount,
        equivalence: combo.equivalence,
        surcharge,
        ext: combo.ext,
    }
}

/// Round a Decimal to `dp` decimal places using half-up (commercial rounding).
pub(crate) fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}
