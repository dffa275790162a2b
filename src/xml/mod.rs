//! AEAT XML documents: request rendering and response parsing.
//!
//! - [`to_request_xml`] renders a `RegFactuSistemaFacturacion` for sealed records
//! - [`envelop`] wraps it in a SOAP envelope ready for the gateway
//! - [`from_response_xml`] parses `RespuestaRegFactuSistemaFacturacion` and SOAP faults
//!
//! # Example
//!
//! ```no_run
//! use verifactu::*;
//! use verifactu::xml;
//!
//! # fn run(client: &Client, invoice: &Invoice) -> Result<(), VerifactuError> {
//! let submission = client.register(invoice, None)?;
//! let issuer = Taxpayer::new("Provide One S.L.", "B98602642");
//! let body = xml::to_envelope_xml(client.config(), &issuer, &[submission.record])?;
//! # Ok(())
//! # }
//! ```

mod request;
mod response;
pub(crate) mod xml_utils;

pub use request::{MAX_RECORDS_PER_REQUEST, envelop, to_envelope_xml, to_request_xml};
pub use response::from_response_xml;

/// Namespace URIs of the AEAT web service.
pub mod ns {
    /// `SuministroLR.xsd`, prefix `sum`.
    pub const SUM: &str = "https://www2.agenciatributaria.gob.es/static_files/common/internet/dep/aplicaciones/es/aeat/tike/cont/ws/SuministroLR.xsd";
    /// `SuministroInformacion.xsd`, prefix `sum1`.
    pub const SUM1: &str = "https://www2.agenciatributaria.gob.es/static_files/common/internet/dep/aplicaciones/es/aeat/tike/cont/ws/SuministroInformacion.xsd";
    /// SOAP 1.1 envelope, prefix `soapenv`.
    pub const SOAP_ENV: &str = "http://schemas.xmlsoap.org/soap/envelope/";
}
