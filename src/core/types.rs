use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::codes::{CorrectionType, IdType, InvoiceType, OperationClass, RegimeKey};

/// Source invoice as produced by the upstream invoicing system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Optional numbering series (e.g. "SAMPLE").
    pub series: Option<String>,
    /// Invoice code within the series (e.g. "001").
    pub code: String,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Date the operation took place, when different from the issue date.
    pub operation_date: Option<NaiveDate>,
    /// Standard, corrective or credit note.
    pub kind: InvoiceKind,
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// Issuing party. Must carry a Spanish tax ID.
    pub supplier: Party,
    /// Receiving party, absent for simplified invoices.
    pub customer: Option<Party>,
    /// Invoice lines.
    pub lines: Vec<LineItem>,
    /// Document-level charges.
    pub charges: Vec<Charge>,
    /// Free-text notes.
    pub notes: Vec<Note>,
    /// Preceding documents this invoice corrects or replaces.
    pub preceding: Vec<DocumentReference>,
    /// Classification tags used to derive special regimes.
    pub tags: Vec<InvoiceTag>,
    /// Invoice-level regulatory extensions.
    pub tax: InvoiceTax,
    /// Tax totals grouped by category and rate.
    pub totals: Totals,
}

impl Invoice {
    /// Check whether the invoice carries `tag`.
    pub fn has_tag(&self, tag: InvoiceTag) -> bool {
        self.tags.contains(&tag)
    }
}

/// Document kind of the source invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InvoiceKind {
    #[default]
    Standard,
    Corrective,
    /// Amounts are stated positive and must be inverted for the registry.
    CreditNote,
}

/// Tags that select special VAT regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceTag {
    Antiques,
    Art,
    SecondHandGoods,
    TravelAgency,
    SimplifiedScheme,
}

/// Invoice-level regulatory extensions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceTax {
    /// `TipoFactura`. Mandatory for registration.
    pub invoice_type: Option<InvoiceType>,
    /// `TipoRectificativa`. Mandatory for corrective invoice types.
    pub correction_type: Option<CorrectionType>,
    /// `FacturaSimplificadaArt7273`: simplified invoice issued under art. 7.2/7.3.
    pub simplified_art_7273: bool,
}

/// Supplier or customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    /// Legal name.
    pub name: String,
    /// Tax identity (country + code).
    pub tax_id: Option<TaxId>,
    /// Alternate identity documents (passport, residence card, ...).
    pub identities: Vec<AltIdentity>,
}

/// Tax identity of a party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxId {
    /// Tax country prefix (ISO 3166-1 alpha-2, "EL" for Greece).
    pub country: String,
    /// Code without country prefix.
    pub code: String,
}

impl TaxId {
    pub fn new(country: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            code: code.into(),
        }
    }

    /// Whether this identity is a Spanish NIF.
    pub fn is_spanish(&self) -> bool {
        self.country.eq_ignore_ascii_case("ES") && !self.code.trim().is_empty()
    }

    /// Full VAT number with country prefix (e.g. "DE111111125").
    pub fn prefixed(&self) -> String {
        format!("{}{}", self.country.to_uppercase(), self.code)
    }
}

/// Generic identity document keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityKey {
    Passport,
    Foreign,
    Resident,
    Other,
}

impl IdentityKey {
    /// Default `IDType` for documents carrying this key.
    pub fn id_type(&self) -> IdType {
        match self {
            Self::Passport => IdType::Passport,
            Self::Foreign => IdType::Foreign,
            Self::Resident => IdType::Resident,
            Self::Other => IdType::Other,
        }
    }
}

/// Alternate identity document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AltIdentity {
    /// Generic key, used when no explicit `IDType` extension is present.
    pub key: Option<IdentityKey>,
    /// Explicit `IDType` extension.
    pub id_type: Option<IdType>,
    /// Issuing country.
    pub country: Option<String>,
    /// Document number.
    pub code: String,
}

/// Invoice line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Item name, used to synthesize the operation description.
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Line discount amount.
    pub discount: Option<Decimal>,
    /// Taxes applied to the line.
    pub taxes: Vec<TaxCombo>,
}

impl LineItem {
    /// Net line amount: quantity × price − discount.
    pub fn net_amount(&self) -> Decimal {
        self.quantity * self.unit_price - self.discount.unwrap_or(Decimal::ZERO)
    }
}

/// Document-level charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    pub amount: Decimal,
    pub reason: Option<String>,
    /// Charges without taxes are payment adjustments and stay out of `ImporteTotal`.
    pub taxes: Vec<TaxCombo>,
}

/// Tax category of a combo or total.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxCategory {
    Vat,
    Igic,
    Ipsi,
    /// Any other category (e.g. "IRPF").
    Other(String),
}

/// Regulatory extensions attached to a tax rate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateExtensions {
    /// `ClaveRegimen`.
    pub regime: Option<RegimeKey>,
    /// `OperacionExenta` (E1–E6), applies only to rates without a percent.
    pub exemption: Option<String>,
    /// `CalificacionOperacion`.
    pub operation_class: Option<OperationClass>,
}

/// One tax applied to a line or charge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxCombo {
    pub category: TaxCategory,
    /// Rate key for diagnostics (e.g. "standard", "reduced", "exempt").
    pub rate: Option<String>,
    /// Percent (21 for 21%). Absent for exempt / not-subject operations.
    pub percent: Option<Decimal>,
    /// Whether the equivalence surcharge applies to this rate.
    pub equivalence: bool,
    /// Equivalence surcharge percent.
    pub surcharge_percent: Option<Decimal>,
    /// Retained taxes (withholdings) are excluded from the breakdown.
    pub retained: bool,
    pub ext: RateExtensions,
}

/// Totals of an invoice or preceding document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line net amounts plus charges, before taxes.
    pub net_total: Decimal,
    /// Taxes grouped by category, in enumeration order.
    pub taxes: Vec<CategoryTotal>,
}

/// Totals for one tax category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: TaxCategory,
    pub retained: bool,
    pub rates: Vec<RateTotal>,
    /// Sum of rate amounts.
    pub amount: Decimal,
    /// Sum of equivalence surcharge amounts, if any.
    pub surcharge: Option<Decimal>,
}

/// Totals for one rate inside a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTotal {
    /// Rate key for diagnostics.
    pub key: Option<String>,
    pub percent: Option<Decimal>,
    pub base: Decimal,
    pub amount: Decimal,
    /// Set when the rate is flagged for the equivalence surcharge.
    pub equivalence: bool,
    pub surcharge: Option<Surcharge>,
    pub ext: RateExtensions,
}

/// Equivalence surcharge applied to a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surcharge {
    pub percent: Decimal,
    pub amount: Decimal,
}

/// Reference to a preceding document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReference {
    pub series: Option<String>,
    pub code: String,
    pub issue_date: NaiveDate,
    /// Taxes of the referenced document, needed for substitution corrections.
    pub taxes: Vec<CategoryTotal>,
}

/// Note attached to an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub key: NoteKey,
    pub text: String,
}

/// Note classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteKey {
    /// General purpose note, used as the operation description.
    General,
    Legal,
    Payment,
    Other,
}

impl Totals {
    /// Invert the sign of every amount, for credit notes.
    pub fn negated(&self) -> Self {
        Self {
            net_total: -self.net_total,
            taxes: self.taxes.iter().map(CategoryTotal::negated).collect(),
        }
    }
}

impl CategoryTotal {
    pub fn negated(&self) -> Self {
        Self {
            category: self.category.clone(),
            retained: self.retained,
            rates: self.rates.iter().map(RateTotal::negated).collect(),
            amount: -self.amount,
            surcharge: self.surcharge.map(|s| -s),
        }
    }
}

impl RateTotal {
    pub fn negated(&self) -> Self {
        Self {
            base: -self.base,
            amount: -self.amount,
            surcharge: self.surcharge.map(|s| Surcharge {
                percent: s.percent,
                amount: -s.amount,
            }),
            ..self.clone()
        }
    }
}
