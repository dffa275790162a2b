//! VeriFactu records: `RegistroAlta` and `RegistroAnulacion`.
//!
//! A record is built once per invoicing event without chain data, then sealed
//! by [`ChainEngine`](super::ChainEngine), which fills the chaining block and
//! the fingerprint. Sealed records are never modified again.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::chain::ChainData;
use super::codes::{
    CorrectionType, IdType, InvoiceType, IssuerRole, OperationClass, RegimeKey, TaxType,
};
use super::validation::round_half_up;

/// `IDFactura`: identifies one invoicing event for chaining purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId {
    /// `IDEmisorFactura`: supplier NIF.
    pub issuer: String,
    /// `NumSerieFactura`: "SERIES-CODE" or the bare code.
    pub num_series: String,
    /// `FechaExpedicionFactura`: issue date as DD-MM-YYYY.
    pub issue_date: String,
}

impl RecordId {
    pub fn new(
        issuer: impl Into<String>,
        num_series: impl Into<String>,
        issue_date: impl Into<String>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            num_series: num_series.into(),
            issue_date: issue_date.into(),
        }
    }

    /// Build an identity from its source parts.
    pub fn from_parts(issuer: &str, series: Option<&str>, code: &str, issue_date: NaiveDate) -> Self {
        Self::new(issuer, invoice_number(series, code), format_date(issue_date))
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.issuer, self.num_series, self.issue_date)
    }
}

/// Compose `NumSerieFactura` from series and code.
pub fn invoice_number(series: Option<&str>, code: &str) -> String {
    match series {
        Some(series) if !series.is_empty() => format!("{series}-{code}"),
        _ => code.to_string(),
    }
}

/// Format a date the way AEAT expects it (DD-MM-YYYY).
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Format an amount as a fixed two-decimal string.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", round_half_up(amount, 2))
}

/// `Encadenamiento`: link to the previous record of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainLink {
    /// `PrimerRegistro = S`.
    First,
    /// `RegistroAnterior`.
    Previous { id: RecordId, fingerprint: String },
}

impl ChainLink {
    pub fn from_previous(prev: Option<&ChainData>) -> Self {
        match prev {
            None => Self::First,
            Some(data) => Self::Previous {
                id: data.record_id(),
                fingerprint: data.fingerprint.clone(),
            },
        }
    }

    /// Value of the `Huella` field in the fingerprint input.
    pub fn huella(&self) -> &str {
        match self {
            Self::First => "",
            Self::Previous { fingerprint, .. } => fingerprint,
        }
    }

    pub fn is_first(&self) -> bool {
        matches!(self, Self::First)
    }
}

/// `SistemaInformatico`: the invoicing software producing the records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Software {
    /// `NombreRazon` of the software vendor.
    pub legal_name: String,
    /// `NIF` of the software vendor.
    pub tax_code: String,
    /// `NombreSistemaInformatico`.
    pub system_name: String,
    /// `IdSistemaInformatico` (2 characters).
    pub system_id: String,
    /// `Version`.
    pub version: String,
    /// `NumeroInstalacion`.
    pub installation_number: String,
    /// `TipoUsoPosibleSoloVerifactu`.
    #[serde(default)]
    pub only_verifactu: bool,
    /// `TipoUsoPosibleMultiOT`.
    #[serde(default)]
    pub multi_taxpayer: bool,
    /// `IndicadorMultiplesOT`.
    #[serde(default)]
    pub multiple_taxpayers: bool,
}

/// A party as it appears in a record (`Destinatario`, `Tercero`, `Generador`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordParty {
    /// `NombreRazon`.
    pub name: String,
    pub id: PartyId,
}

/// How a record party is identified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyId {
    /// Spanish NIF.
    Nif(String),
    /// `IDOtro` block.
    Other(OtherId),
}

/// `IDOtro`: identity of a party without a Spanish NIF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherId {
    /// `CodigoPais` (ISO 3166-1).
    pub country: Option<String>,
    /// `IDType`.
    pub id_type: IdType,
    /// `ID`.
    pub id: String,
}

/// `DetalleDesglose`: one line of the tax breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    /// `Impuesto`.
    pub tax_type: TaxType,
    /// `ClaveRegimen`, only for VAT and IGIC.
    pub regime: Option<RegimeKey>,
    /// `CalificacionOperacion`. Mutually exclusive with `exemption`.
    pub operation_class: Option<OperationClass>,
    /// `OperacionExenta` (E1–E6).
    pub exemption: Option<String>,
    /// `TipoImpositivo`.
    pub tax_rate: Option<Decimal>,
    /// `BaseImponibleOimporteNoSujeto`.
    pub base: Decimal,
    /// `BaseImponibleACoste`.
    pub cost_base: Option<Decimal>,
    /// `CuotaRepercutida`.
    pub charged_amount: Option<Decimal>,
    /// `TipoRecargoEquivalencia`.
    pub surcharge_rate: Option<Decimal>,
    /// `CuotaRecargoEquivalencia`.
    pub surcharge_amount: Option<Decimal>,
}

/// `ImporteRectificacion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectificationAmounts {
    /// `BaseRectificada`.
    pub base: Decimal,
    /// `CuotaRectificada`.
    pub quota: Decimal,
    /// `CuotaRecargoRectificado`.
    pub surcharge: Decimal,
}

impl RectificationAmounts {
    pub fn negated(&self) -> Self {
        Self {
            base: -self.base,
            quota: -self.quota,
            surcharge: -self.surcharge,
        }
    }
}

/// `RegistroAlta`: registration of an issued invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RecordId,
    /// `NombreRazonEmisor`.
    pub issuer_name: String,
    /// `TipoFactura`.
    pub invoice_type: InvoiceType,
    /// `TipoRectificativa`, for corrective types.
    pub correction_type: Option<CorrectionType>,
    /// `FacturasRectificadas`.
    pub rectified: Vec<RecordId>,
    /// `FacturasSustituidas`, for F3.
    pub substituted: Vec<RecordId>,
    /// `ImporteRectificacion`, for corrections by substitution.
    pub rectification: Option<RectificationAmounts>,
    /// `FechaOperacion` (DD-MM-YYYY), when it differs from the issue date.
    pub operation_date: Option<String>,
    /// `DescripcionOperacion`.
    pub description: String,
    /// `FacturaSimplificadaArt7273`.
    pub simplified_art_7273: bool,
    /// `FacturaSinIdentifDestinatarioArt61d`. Only set for classes that may omit the recipient.
    pub no_recipient: Option<bool>,
    /// `Macrodato`.
    pub high_value: bool,
    /// `EmitidaPorTerceroODestinatario`. `None` when issued by the supplier.
    pub issued_by: Option<IssuerRole>,
    /// `Tercero`.
    pub third_party: Option<RecordParty>,
    /// `Destinatarios`.
    pub recipient: Option<RecordParty>,
    /// `Desglose`.
    pub breakdown: Vec<BreakdownEntry>,
    /// `CuotaTotal`.
    pub tax_total: Decimal,
    /// `ImporteTotal`.
    pub grand_total: Decimal,
    /// `SistemaInformatico`.
    pub software: Software,
    /// `FechaHoraHusoGenRegistro`.
    pub timestamp: String,
    /// `Encadenamiento`, set when sealed.
    pub chain: Option<ChainLink>,
    /// `Huella`, set when sealed.
    pub fingerprint: Option<String>,
}

/// `RegistroAnulacion`: cancellation of a previously registered invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cancellation {
    pub id: RecordId,
    /// `GeneradoPor`.
    pub generated_by: Option<IssuerRole>,
    /// `Generador`.
    pub generator: Option<RecordParty>,
    pub software: Software,
    pub timestamp: String,
    pub chain: Option<ChainLink>,
    pub fingerprint: Option<String>,
}

/// Discriminant of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Registration,
    Cancellation,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Cancellation => "cancellation",
        }
    }
}

/// A VeriFactu record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    Registration(Box<Registration>),
    Cancellation(Cancellation),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Registration(_) => RecordKind::Registration,
            Self::Cancellation(_) => RecordKind::Cancellation,
        }
    }

    pub fn id(&self) -> &RecordId {
        match self {
            Self::Registration(r) => &r.id,
            Self::Cancellation(c) => &c.id,
        }
    }

    pub fn timestamp(&self) -> &str {
        match self {
            Self::Registration(r) => &r.timestamp,
            Self::Cancellation(c) => &c.timestamp,
        }
    }

    pub fn software(&self) -> &Software {
        match self {
            Self::Registration(r) => &r.software,
            Self::Cancellation(c) => &c.software,
        }
    }

    pub fn chain(&self) -> Option<&ChainLink> {
        match self {
            Self::Registration(r) => r.chain.as_ref(),
            Self::Cancellation(c) => c.chain.as_ref(),
        }
    }

    pub fn fingerprint(&self) -> Option<&str> {
        match self {
            Self::Registration(r) => r.fingerprint.as_deref(),
            Self::Cancellation(c) => c.fingerprint.as_deref(),
        }
    }

    /// Whether the record carries its chaining block and fingerprint.
    pub fn is_sealed(&self) -> bool {
        self.chain().is_some() && self.fingerprint().is_some()
    }

    pub fn as_registration(&self) -> Option<&Registration> {
        match self {
            Self::Registration(r) => Some(r),
            Self::Cancellation(_) => None,
        }
    }

    pub fn as_cancellation(&self) -> Option<&Cancellation> {
        match self {
            Self::Registration(_) => None,
            Self::Cancellation(c) => Some(c),
        }
    }

    /// Chain data to persist and feed as predecessor of the next record.
    /// `None` until the record is sealed.
    pub fn chain_data(&self) -> Option<ChainData> {
        let fingerprint = self.fingerprint()?;
        let id = self.id();
        Some(ChainData {
            issuer: id.issuer.clone(),
            num_series: id.num_series.clone(),
            issue_date: id.issue_date.clone(),
            fingerprint: fingerprint.to_string(),
        })
    }

    pub(crate) fn set_seal(&mut self, link: ChainLink, fingerprint: String) {
        match self {
            Self::Registration(r) => {
                r.chain = Some(link);
                r.fingerprint = Some(fingerprint);
            }
            Self::Cancellation(c) => {
                c.chain = Some(link);
                c.fingerprint = Some(fingerprint);
            }
        }
    }
}
