use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::form_urlencoded::byte_serialize;

use super::record::{RecordId, format_amount};

/// AEAT environment. Selects the verification URL base and the gateway endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Production,
    #[default]
    Sandbox,
}

impl Environment {
    /// Base of the public verification link (`ValidarQR`).
    pub fn verification_base(&self) -> &'static str {
        match self {
            Self::Production => "https://www2.agenciatributaria.gob.es/wlpl/TIKE-CONT/ValidarQR",
            Self::Sandbox => "https://prewww2.aeat.es/wlpl/TIKE-CONT/ValidarQR",
        }
    }

    /// SOAP endpoint for record submission.
    pub fn gateway_endpoint(&self) -> &'static str {
        match self {
            Self::Production => {
                "https://www1.agenciatributaria.gob.es/wlpl/TIKE-CONT/ws/SistemaFacturacion/VerifactuSOAP"
            }
            Self::Sandbox => {
                "https://prewww1.aeat.es/wlpl/TIKE-CONT/ws/SistemaFacturacion/VerifactuSOAP"
            }
        }
    }
}

fn escape(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// Public verification link for a registration, encoded in the invoice QR code.
pub fn verification_url(env: Environment, id: &RecordId, grand_total: Decimal) -> String {
    format!(
        "{}?nif={}&numserie={}&fecha={}&importe={}",
        env.verification_base(),
        escape(&id.issuer),
        escape(&id.num_series),
        escape(&id.issue_date),
        escape(&format_amount(grand_total)),
    )
}
