//! AEAT code lists (L1–L12) used in VeriFactu records.
//!
//! Every list is a closed enum with `code()` / `from_code()` so that a record
//! can only ever carry values from the official vocabulary.

use serde::{Deserialize, Serialize};

/// L2: `TipoFactura`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceType {
    /// F1: Full invoice (art. 6, 7.2 and 7.3 RD 1619/2012).
    F1,
    /// F2: Simplified invoice, or invoice without identified recipient (art. 6.1.d).
    F2,
    /// F3: Invoice issued in substitution of simplified invoices.
    F3,
    /// R1: Corrective invoice (art. 80.1, 80.2 and 80.6 LIVA, legal error).
    R1,
    /// R2: Corrective invoice (art. 80.3, insolvency).
    R2,
    /// R3: Corrective invoice (art. 80.4, bad debts).
    R3,
    /// R4: Corrective invoice (other causes).
    R4,
    /// R5: Corrective simplified invoice.
    R5,
}

impl InvoiceType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::F1 => "F1",
            Self::F2 => "F2",
            Self::F3 => "F3",
            Self::R1 => "R1",
            Self::R2 => "R2",
            Self::R3 => "R3",
            Self::R4 => "R4",
            Self::R5 => "R5",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "F1" => Some(Self::F1),
            "F2" => Some(Self::F2),
            "F3" => Some(Self::F3),
            "R1" => Some(Self::R1),
            "R2" => Some(Self::R2),
            "R3" => Some(Self::R3),
            "R4" => Some(Self::R4),
            "R5" => Some(Self::R5),
            _ => None,
        }
    }

    /// Corrective classes (R1–R5) require a correction type and rectified invoices.
    pub fn is_corrective(&self) -> bool {
        matches!(self, Self::R1 | Self::R2 | Self::R3 | Self::R4 | Self::R5)
    }

    /// Classes that may omit the recipient and must then say so explicitly.
    pub fn allows_unidentified_recipient(&self) -> bool {
        matches!(self, Self::F2 | Self::R5)
    }
}

/// L3: `TipoRectificativa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorrectionType {
    /// S: By substitution.
    Substitution,
    /// I: By differences.
    Differences,
}

impl CorrectionType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Substitution => "S",
            Self::Differences => "I",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S" => Some(Self::Substitution),
            "I" => Some(Self::Differences),
            _ => None,
        }
    }
}

/// L1: `Impuesto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxType {
    /// 01: Impuesto sobre el Valor Añadido.
    Vat,
    /// 02: Impuesto sobre la Producción, los Servicios y la Importación (Ceuta y Melilla).
    Ipsi,
    /// 03: Impuesto General Indirecto Canario.
    Igic,
    /// 05: Other.
    Other,
}

impl TaxType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Vat => "01",
            Self::Ipsi => "02",
            Self::Igic => "03",
            Self::Other => "05",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(Self::Vat),
            "02" => Some(Self::Ipsi),
            "03" => Some(Self::Igic),
            "05" => Some(Self::Other),
            _ => None,
        }
    }
}

/// L8A / L8B: `ClaveRegimen` for VAT and IGIC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegimeKey {
    /// 01: General regime.
    General,
    /// 02: Export, or supplies under the OSS/IOSS schemes.
    Export,
    /// 03: Second-hand goods, art, antiques and collectors' items.
    SpecialGoods,
    /// 04: Investment gold.
    InvestmentGold,
    /// 05: Travel agencies.
    TravelAgency,
    /// 06: Groups of entities, advanced level (cost basis).
    EntityGroup,
    /// 07: Cash accounting.
    CashBasis,
    /// 08: Operations subject to IPSI / IGIC (or VAT for IGIC).
    OtherIndirectTax,
    /// 09: Travel agency services as intermediaries.
    TravelAgencyIntermediary,
    /// 10: Third-party collections.
    ThirdPartyCollection,
    /// 11: Business premises lease.
    PremisesLease,
    /// 14: VAT pending accrual on public works certifications.
    PublicWorksPending,
    /// 15: VAT pending accrual on successive-tract operations.
    SuccessiveTractPending,
    /// 17: OSS and IOSS regimes.
    Oss,
    /// 18: Equivalence surcharge.
    EquivalenceSurcharge,
    /// 19: Agriculture, livestock and fisheries special regime.
    Agriculture,
    /// 20: Simplified regime.
    Simplified,
}

impl RegimeKey {
    pub fn code(&self) -> &'static str {
        match self {
            Self::General => "01",
            Self::Export => "02",
            Self::SpecialGoods => "03",
            Self::InvestmentGold => "04",
            Self::TravelAgency => "05",
            Self::EntityGroup => "06",
            Self::CashBasis => "07",
            Self::OtherIndirectTax => "08",
            Self::TravelAgencyIntermediary => "09",
            Self::ThirdPartyCollection => "10",
            Self::PremisesLease => "11",
            Self::PublicWorksPending => "14",
            Self::SuccessiveTractPending => "15",
            Self::Oss => "17",
            Self::EquivalenceSurcharge => "18",
            Self::Agriculture => "19",
            Self::Simplified => "20",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(Self::General),
            "02" => Some(Self::Export),
            "03" => Some(Self::SpecialGoods),
            "04" => Some(Self::InvestmentGold),
            "05" => Some(Self::TravelAgency),
            "06" => Some(Self::EntityGroup),
            "07" => Some(Self::CashBasis),
            "08" => Some(Self::OtherIndirectTax),
            "09" => Some(Self::TravelAgencyIntermediary),
            "10" => Some(Self::ThirdPartyCollection),
            "11" => Some(Self::PremisesLease),
            "14" => Some(Self::PublicWorksPending),
            "15" => Some(Self::SuccessiveTractPending),
            "17" => Some(Self::Oss),
            "18" => Some(Self::EquivalenceSurcharge),
            "19" => Some(Self::Agriculture),
            "20" => Some(Self::Simplified),
            _ => None,
        }
    }

    /// Regimes whose breakdown must also report the cost-based taxable amount.
    pub fn is_cost_basis(&self) -> bool {
        matches!(self, Self::EntityGroup)
    }
}

/// L9: `CalificacionOperacion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationClass {
    /// S1: Subject and not exempt, no reverse charge.
    S1,
    /// S2: Subject and not exempt, reverse charge.
    S2,
    /// N1: Not subject (art. 7, 14 and others).
    N1,
    /// N2: Not subject by location rules.
    N2,
}

impl OperationClass {
    pub fn code(&self) -> &'static str {
        match self {
            Self::S1 => "S1",
            Self::S2 => "S2",
            Self::N1 => "N1",
            Self::N2 => "N2",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "S1" => Some(Self::S1),
            "S2" => Some(Self::S2),
            "N1" => Some(Self::N1),
            "N2" => Some(Self::N2),
            _ => None,
        }
    }
}

/// L10: `OperacionExenta`: E1 to E6.
const EXEMPTION_CODES: &[&str] = &["E1", "E2", "E3", "E4", "E5", "E6"];

/// Check whether `code` is a valid exemption cause (E1–E6).
pub fn is_exemption_code(code: &str) -> bool {
    EXEMPTION_CODES.contains(&code)
}

/// L7: `IDType` for parties identified without a Spanish NIF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdType {
    /// 02: NIF-IVA (EU VAT number).
    EuVat,
    /// 03: Passport.
    Passport,
    /// 04: Official ID document issued by the country of residence.
    Foreign,
    /// 05: Residence certificate.
    Resident,
    /// 06: Other supporting document.
    Other,
    /// 07: Not registered in the census.
    NotRegistered,
}

impl IdType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EuVat => "02",
            Self::Passport => "03",
            Self::Foreign => "04",
            Self::Resident => "05",
            Self::Other => "06",
            Self::NotRegistered => "07",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "02" => Some(Self::EuVat),
            "03" => Some(Self::Passport),
            "04" => Some(Self::Foreign),
            "05" => Some(Self::Resident),
            "06" => Some(Self::Other),
            "07" => Some(Self::NotRegistered),
            _ => None,
        }
    }
}

/// L6: `EmitidaPorTerceroODestinatario`, plus the default supplier role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuerRole {
    /// E: Issued by the supplier itself.
    #[default]
    Supplier,
    /// D: Issued by the recipient.
    Customer,
    /// T: Issued by a third party.
    ThirdParty,
}

impl IssuerRole {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Supplier => "E",
            Self::Customer => "D",
            Self::ThirdParty => "T",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "E" => Some(Self::Supplier),
            "D" => Some(Self::Customer),
            "T" => Some(Self::ThirdParty),
            _ => None,
        }
    }
}

/// L12: `TipoHuella`. Only SHA-256 is defined.
pub const FINGERPRINT_TYPE_SHA256: &str = "01";

/// Record schema version (`IDVersion`).
pub const RECORD_VERSION: &str = "1.0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_type_round_trip() {
        for t in [
            InvoiceType::F1,
            InvoiceType::F2,
            InvoiceType::F3,
            InvoiceType::R1,
            InvoiceType::R2,
            InvoiceType::R3,
            InvoiceType::R4,
            InvoiceType::R5,
        ] {
            assert_eq!(InvoiceType::from_code(t.code()), Some(t));
        }
        assert_eq!(InvoiceType::from_code("F4"), None);
    }

    #[test]
    fn corrective_classes() {
        assert!(InvoiceType::R1.is_corrective());
        assert!(InvoiceType::R5.is_corrective());
        assert!(!InvoiceType::F1.is_corrective());
        assert!(!InvoiceType::F3.is_corrective());
    }

    #[test]
    fn tax_type_codes_follow_l1() {
        assert_eq!(TaxType::Vat.code(), "01");
        assert_eq!(TaxType::Ipsi.code(), "02");
        assert_eq!(TaxType::Igic.code(), "03");
        assert_eq!(TaxType::Other.code(), "05");
        assert_eq!(TaxType::from_code("04"), None);
    }

    #[test]
    fn regime_keys() {
        assert_eq!(RegimeKey::from_code("18"), Some(RegimeKey::EquivalenceSurcharge));
        assert_eq!(RegimeKey::from_code("12"), None);
        assert!(RegimeKey::EntityGroup.is_cost_basis());
        assert!(!RegimeKey::General.is_cost_basis());
    }

    #[test]
    fn exemption_codes() {
        assert!(is_exemption_code("E1"));
        assert!(is_exemption_code("E6"));
        assert!(!is_exemption_code("E7"));
        assert!(!is_exemption_code("S1"));
        assert!(!is_exemption_code(""));
    }

    #[test]
    fn issuer_role_default_is_supplier() {
        assert_eq!(IssuerRole::default(), IssuerRole::Supplier);
        assert_eq!(IssuerRole::from_code("T"), Some(IssuerRole::ThirdParty));
    }
}
