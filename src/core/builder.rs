use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::codes::{CorrectionType, IdType, InvoiceType, OperationClass, RegimeKey};
use super::error::VerifactuError;
use super::types::*;
use super::validation;

/// Builder for source invoices.
///
/// ```
/// use verifactu::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = InvoiceBuilder::new("001", NaiveDate::from_ymd_opt(2024, 11, 11).unwrap())
///     .series("SAMPLE")
///     .invoice_type(InvoiceType::F1)
///     .supplier(PartyBuilder::new("Provide One S.L.").tax_id("ES", "B98602642").build())
///     .customer(PartyBuilder::new("Sample Consumer").tax_id("ES", "B63272603").build())
///     .add_line(LineItemBuilder::new("Development services", dec!(20), dec!(90))
///         .tax(TaxCombo::vat(dec!(21)).operation_class(OperationClass::S1))
///         .build())
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.totals.net_total, dec!(1800.00));
/// assert_eq!(invoice.totals.taxes[0].amount, dec!(378.00));
/// ```
pub struct InvoiceBuilder {
    series: Option<String>,
    code: String,
    issue_date: NaiveDate,
    operation_date: Option<NaiveDate>,
    kind: InvoiceKind,
    currency_code: String,
    supplier: Option<Party>,
    customer: Option<Party>,
    lines: Vec<LineItem>,
    charges: Vec<Charge>,
    notes: Vec<Note>,
    preceding: Vec<DocumentReference>,
    tags: Vec<InvoiceTag>,
    tax: InvoiceTax,
    totals: Option<Totals>,
}

impl InvoiceBuilder {
    pub fn new(code: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            series: None,
            code: code.into(),
            issue_date,
            operation_date: None,
            kind: InvoiceKind::Standard,
            currency_code: "EUR".to_string(),
            supplier: None,
            customer: None,
            lines: Vec::new(),
            charges: Vec::new(),
            notes: Vec::new(),
            preceding: Vec::new(),
            tags: Vec::new(),
            tax: InvoiceTax::default(),
            totals: None,
        }
    }

    pub fn series(mut self, series: impl Into<String>) -> Self {
        self.series = Some(series.into());
        self
    }

    pub fn operation_date(mut self, date: NaiveDate) -> Self {
        self.operation_date = Some(date);
        self
    }

    pub fn kind(mut self, kind: InvoiceKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency_code = code.into();
        self
    }

    pub fn supplier(mut self, party: Party) -> Self {
        self.supplier = Some(party);
        self
    }

    pub fn customer(mut self, party: Party) -> Self {
        self.customer = Some(party);
        self
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    pub fn add_charge(mut self, charge: Charge) -> Self {
        self.charges.push(charge);
        self
    }

    pub fn note(mut self, key: NoteKey, text: impl Into<String>) -> Self {
        self.notes.push(Note {
            key,
            text: text.into(),
        });
        self
    }

    /// Shorthand for a general note, used as the operation description.
    pub fn general_note(self, text: impl Into<String>) -> Self {
        self.note(NoteKey::General, text)
    }

    pub fn preceding(mut self, reference: DocumentReference) -> Self {
        self.preceding.push(reference);
        self
    }

    pub fn tag(mut self, tag: InvoiceTag) -> Self {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn invoice_type(mut self, invoice_type: InvoiceType) -> Self {
        self.tax.invoice_type = Some(invoice_type);
        self
    }

    pub fn correction_type(mut self, correction_type: CorrectionType) -> Self {
        self.tax.correction_type = Some(correction_type);
        self
    }

    pub fn simplified_art_7273(mut self, flag: bool) -> Self {
        self.tax.simplified_art_7273 = flag;
        self
    }

    /// Use precomputed totals instead of calculating them from lines and charges.
    pub fn totals(mut self, totals: Totals) -> Self {
        self.totals = Some(totals);
        self
    }

    /// Build the invoice, calculating totals and running pre-validation.
    /// Returns all validation errors (not just the first).
    pub fn build(self) -> Result<Invoice, VerifactuError> {
        let invoice = self.build_unchecked()?;

        let errors = validation::validate_invoice(&invoice);
        if !errors.is_empty() {
            return Err(errors.into());
        }

        Ok(invoice)
    }

    /// Build without pre-validation, useful for importing external data.
    pub fn build_unchecked(self) -> Result<Invoice, VerifactuError> {
        let supplier = self
            .supplier
            .ok_or_else(|| VerifactuError::Validation("supplier is required".into()))?;

        if self.lines.len() > 10_000 {
            return Err(VerifactuError::Validation(
                "invoice cannot have more than 10,000 line items".into(),
            ));
        }

        let totals = match self.totals {
            Some(totals) => totals,
            None => validation::calculate_totals(&self.lines, &self.charges),
        };

        Ok(Invoice {
            series: self.series,
            code: self.code,
            issue_date: self.issue_date,
            operation_date: self.operation_date,
            kind: self.kind,
            currency_code: self.currency_code,
            supplier,
            customer: self.customer,
            lines: self.lines,
            charges: self.charges,
            notes: self.notes,
            preceding: self.preceding,
            tags: self.tags,
            tax: self.tax,
            totals,
        })
    }
}

/// Builder for Party (supplier/customer).
pub struct PartyBuilder {
    name: String,
    tax_id: Option<TaxId>,
    identities: Vec<AltIdentity>,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tax_id: None,
            identities: Vec::new(),
        }
    }

    pub fn tax_id(mut self, country: impl Into<String>, code: impl Into<String>) -> Self {
        self.tax_id = Some(TaxId::new(country, code));
        self
    }

    /// Add an identity document identified by a generic key.
    pub fn identity(mut self, key: IdentityKey, code: impl Into<String>) -> Self {
        self.identities.push(AltIdentity {
            key: Some(key),
            id_type: None,
            country: None,
            code: code.into(),
        });
        self
    }

    /// Add an identity document with an explicit `IDType` and issuing country.
    pub fn typed_identity(
        mut self,
        id_type: IdType,
        country: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        self.identities.push(AltIdentity {
            key: None,
            id_type: Some(id_type),
            country: Some(country.into()),
            code: code.into(),
        });
        self
    }

    pub fn add_identity(mut self, identity: AltIdentity) -> Self {
        self.identities.push(identity);
        self
    }

    pub fn build(self) -> Party {
        Party {
            name: self.name,
            tax_id: self.tax_id,
            identities: self.identities,
        }
    }
}

/// Builder for LineItem.
pub struct LineItemBuilder {
    name: String,
    quantity: Decimal,
    unit_price: Decimal,
    discount: Option<Decimal>,
    taxes: Vec<TaxCombo>,
}

impl LineItemBuilder {
    pub fn new(name: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
            discount: None,
            taxes: Vec::new(),
        }
    }

    pub fn discount(mut self, amount: Decimal) -> Self {
        self.discount = Some(amount);
        self
    }

    pub fn tax(mut self, combo: TaxCombo) -> Self {
        self.taxes.push(combo);
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            name: self.name,
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount: self.discount,
            taxes: self.taxes,
        }
    }
}

impl Charge {
    /// A charge subject to the given taxes.
    pub fn taxed(amount: Decimal, taxes: Vec<TaxCombo>) -> Self {
        Self {
            amount,
            reason: None,
            taxes,
        }
    }

    /// A charge without taxes (payment adjustment).
    pub fn untaxed(amount: Decimal, reason: impl Into<String>) -> Self {
        Self {
            amount,
            reason: Some(reason.into()),
            taxes: Vec::new(),
        }
    }
}

impl DocumentReference {
    pub fn new(series: Option<&str>, code: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            series: series.map(str::to_string),
            code: code.into(),
            issue_date,
            taxes: Vec::new(),
        }
    }

    /// Attach the tax totals of the referenced document.
    pub fn with_taxes(mut self, taxes: Vec<CategoryTotal>) -> Self {
        self.taxes = taxes;
        self
    }
}

impl TaxCombo {
    pub fn new(category: TaxCategory) -> Self {
        Self {
            category,
            rate: None,
            percent: None,
            equivalence: false,
            surcharge_percent: None,
            retained: false,
            ext: RateExtensions::default(),
        }
    }

    /// VAT at `percent`.
    pub fn vat(percent: Decimal) -> Self {
        Self::new(TaxCategory::Vat).percent(percent)
    }

    /// VAT without a percent, for exempt or not-subject operations.
    pub fn vat_exempt(code: impl Into<String>) -> Self {
        Self::new(TaxCategory::Vat).rate("exempt").exemption(code)
    }

    pub fn rate(mut self, key: impl Into<String>) -> Self {
        self.rate = Some(key.into());
        self
    }

    pub fn percent(mut self, percent: Decimal) -> Self {
        self.percent = Some(percent);
        self
    }

    /// Flag the rate for the equivalence surcharge at `percent`.
    pub fn equivalence(mut self, percent: Decimal) -> Self {
        self.equivalence = true;
        self.surcharge_percent = Some(percent);
        self
    }

    /// Mark the tax as retained (withheld by the customer).
    pub fn retained(mut self) -> Self {
        self.retained = true;
        self
    }

    pub fn regime(mut self, key: RegimeKey) -> Self {
        self.ext.regime = Some(key);
        self
    }

    pub fn exemption(mut self, code: impl Into<String>) -> Self {
        self.ext.exemption = Some(code.into());
        self
    }

    pub fn operation_class(mut self, class: OperationClass) -> Self {
        self.ext.operation_class = Some(class);
        self
    }
}
