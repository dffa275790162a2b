//! Interpretation of gateway responses (`RespuestaRegFactuSistemaFacturacion`).

use serde::{Deserialize, Serialize};

use super::error::VerifactuError;
use super::record::RecordId;

/// Error code AEAT uses for an already registered record.
pub const DUPLICATE_ERROR_CODE: &str = "3000";

/// `EstadoEnvio`: status of the whole submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    /// Correcto.
    Correct,
    /// ParcialmenteCorrecto.
    PartiallyCorrect,
    /// Incorrecto.
    Incorrect,
}

impl SubmissionStatus {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Correcto" => Some(Self::Correct),
            "ParcialmenteCorrecto" => Some(Self::PartiallyCorrect),
            "Incorrecto" => Some(Self::Incorrect),
            _ => None,
        }
    }
}

/// `EstadoRegistro`: status of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStatus {
    /// Correcto.
    Correct,
    /// AceptadoConErrores.
    AcceptedWithWarnings,
    /// Anulada.
    Cancelled,
    /// Incorrecto.
    Incorrect,
    /// The record was already registered.
    Duplicate,
}

impl LineStatus {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Correcto" => Some(Self::Correct),
            "AceptadoConErrores" => Some(Self::AcceptedWithWarnings),
            "Anulada" => Some(Self::Cancelled),
            "Incorrecto" => Some(Self::Incorrect),
            _ => None,
        }
    }
}

/// `RegistroDuplicado`: details of the record already held by AEAT.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateInfo {
    /// `IdPeticionRegistroDuplicado`.
    pub request_id: Option<String>,
    /// `EstadoRegistroDuplicado`.
    pub status: Option<String>,
    /// `CodigoErrorRegistro`.
    pub code: Option<String>,
    /// `DescripcionErrorRegistro`.
    pub description: Option<String>,
}

/// `RespuestaLinea`: result for one submitted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseLine {
    pub id: RecordId,
    /// `TipoOperacion` (Alta / Anulacion).
    pub operation: Option<String>,
    pub status: LineStatus,
    /// `CodigoErrorRegistro`.
    pub code: Option<String>,
    /// `DescripcionErrorRegistro`.
    pub description: Option<String>,
    pub duplicate: Option<DuplicateInfo>,
}

impl ResponseLine {
    /// Map the line to the caller's view.
    ///
    /// Accepted lines return `Ok(None)`, accepted lines with anomalies return
    /// the warning, rejected lines return `Duplicate` or `Validation`.
    pub fn outcome(&self) -> Result<Option<VerifactuError>, VerifactuError> {
        match self.status {
            LineStatus::Correct | LineStatus::Cancelled => Ok(None),
            LineStatus::AcceptedWithWarnings => {
                tracing::warn!(
                    id = %self.id,
                    code = self.code.as_deref().unwrap_or_default(),
                    "record accepted with warnings"
                );
                Ok(Some(VerifactuError::Warning {
                    code: self.code.clone(),
                    message: self.message(),
                }))
            }
            LineStatus::Duplicate => Err(VerifactuError::Duplicate {
                code: self.code.clone(),
                message: self.message(),
            }),
            LineStatus::Incorrect => Err(VerifactuError::Validation(match &self.code {
                Some(code) => format!("{}: {code}: {}", self.id, self.message()),
                None => format!("{}: {}", self.id, self.message()),
            })),
        }
    }

    fn message(&self) -> String {
        match (&self.description, &self.code) {
            (Some(desc), _) if !desc.is_empty() => desc.clone(),
            (_, Some(code)) => describe_error_code(code).unwrap_or("").to_string(),
            _ => String::new(),
        }
    }
}

/// Parsed gateway response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    /// `CSV`: secure verification code of the submission, when accepted.
    pub csv: Option<String>,
    pub status: SubmissionStatus,
    /// `TiempoEsperaEnvio`: seconds to wait before the next submission.
    pub wait_seconds: Option<u32>,
    pub lines: Vec<ResponseLine>,
}

impl SubmissionResponse {
    /// Response line for the record with identity `id`.
    pub fn line_for(&self, id: &RecordId) -> Option<&ResponseLine> {
        self.lines.iter().find(|l| l.id == *id)
    }

    /// Error for a submission AEAT refused as a whole, detected by a
    /// submission-level code on one of its lines.
    pub fn rejection(&self) -> Option<VerifactuError> {
        if self.status != SubmissionStatus::Incorrect {
            return None;
        }
        self.lines.iter().find_map(|line| {
            let code = line.code.as_deref().filter(|c| rejects_submission(c))?;
            Some(VerifactuError::Validation(format!(
                "submission rejected: {code}: {}",
                line.message()
            )))
        })
    }
}

/// Description of an AEAT submission error code.
pub fn describe_error_code(code: &str) -> Option<&'static str> {
    ERROR_CODES
        .binary_search_by(|(c, _)| (*c).cmp(code))
        .ok()
        .map(|idx| ERROR_CODES[idx].1)
}

/// Codes that reject the whole submission rather than a single record.
pub fn rejects_submission(code: &str) -> bool {
    code.starts_with('4') || matches!(code, "3500" | "3501" | "3502" | "3503")
}

/// AEAT error catalogue (sorted for binary search).
static ERROR_CODES: &[(&str, &str)] = &[
    ("1100", "Valor o tipo incorrecto del campo."),
    ("1101", "El valor del campo CodigoPais es incorrecto."),
    ("1102", "El valor del campo IDType es incorrecto."),
    ("1103", "El valor del campo ID es incorrecto."),
    ("1104", "El valor del campo NumSerieFactura es incorrecto."),
    ("1105", "El valor del campo FechaExpedicionFactura es incorrecto."),
    ("1106", "El valor del campo TipoFactura no está incluido en la lista de valores permitidos."),
    ("1107", "El valor del campo TipoRectificativa es incorrecto."),
    ("1108", "El NIF del IDEmisorFactura debe ser el mismo que el NIF del ObligadoEmision."),
    ("1109", "El NIF no está identificado en el censo de la AEAT."),
    ("1110", "El NIF no está identificado en el censo de la AEAT."),
    ("1111", "El campo CodigoPais es obligatorio cuando IDType es distinto de 02."),
    ("3000", "Registro de facturación duplicado."),
    ("3500", "Error técnico de base de datos: error en la integridad de la información."),
    ("3501", "Error técnico de base de datos."),
    ("3502", "La factura consultada para el suministro de pagos/cobros/inmuebles no existe."),
    ("3503", "La factura especificada no pertenece al titular registrado en el sistema."),
    ("4102", "El XML no cumple el esquema. Falta informar campo obligatorio."),
    ("4103", "Se ha producido un error inesperado al parsear el XML."),
    ("4104", "Error en la cabecera: el valor del campo NIF del bloque ObligadoEmision no está identificado."),
    ("4105", "Error en la cabecera: el valor del campo NIF del bloque Representante no está identificado."),
    ("4106", "El formato de fecha es incorrecto."),
    ("4107", "El NIF no está identificado en el censo de la AEAT."),
    ("4108", "Error técnico al obtener el certificado."),
    ("4109", "El formato del NIF es incorrecto."),
    ("4110", "Error técnico al comprobar los apoderamientos."),
    ("4111", "Error técnico al crear el trámite."),
    ("4112", "El titular del certificado debe ser Obligado Emisión, Colaborador Social, Apoderado o Sucesor."),
    ("4113", "El XML no cumple con el esquema: se ha superado el límite permitido de registros para el bloque."),
    ("4114", "El XML no cumple con el esquema: se ha superado el límite máximo permitido de facturas a registrar."),
    ("4115", "El valor del campo NIF del bloque ObligadoEmision es incorrecto."),
    ("4116", "Error en la cabecera: el campo NIF del bloque ObligadoEmision tiene un formato incorrecto."),
    ("4117", "Error en la cabecera: el campo NIF del bloque Representante tiene un formato incorrecto."),
    ("4118", "Error técnico: la dirección no se corresponde con el fichero de entrada."),
    ("4119", "Error al informar caracteres cuya codificación no es UTF-8."),
    ("4120", "Error en la cabecera: el valor del campo FechaFinVeriFactu es incorrecto."),
    ("4121", "Error en la cabecera: el valor del campo Incidencia es incorrecto."),
    ("4122", "Error en la cabecera: el valor del campo RefRequerimiento es incorrecto."),
    ("4123", "Error en la cabecera: el NIF del bloque Representante no está identificado en el censo de la AEAT."),
    ("4124", "Error en la cabecera: el Nombre del bloque Representante no está identificado en el censo de la AEAT."),
    ("4125", "Error en la cabecera: el campo RefRequerimiento es obligatorio."),
    ("4126", "Error en la cabecera: el campo RefRequerimiento solo debe informarse en sistemas No VERIFACTU."),
    ("4127", "Error en la cabecera: la remisión voluntaria solo debe informarse en sistemas VERIFACTU."),
    ("4128", "Error técnico en la recuperación del valor del Gestor de Tablas."),
    ("4129", "Error en la cabecera: el campo FinRequerimiento es obligatorio."),
    ("4130", "Error en la cabecera: el campo FinRequerimiento solo debe informarse en sistemas No VERIFACTU."),
    ("4131", "Error en la cabecera: el valor del campo FinRequerimiento es incorrecto."),
    ("4132", "El titular del certificado debe ser el destinatario que realiza la consulta, un Apoderado o Sucesor."),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn line(status: LineStatus, code: Option<&str>, desc: Option<&str>) -> ResponseLine {
        ResponseLine {
            id: RecordId::new("B85905495", "SAMPLE-001", "11-11-2024"),
            operation: Some("Alta".into()),
            status,
            code: code.map(String::from),
            description: desc.map(String::from),
            duplicate: None,
        }
    }

    #[test]
    fn status_codes() {
        assert_eq!(LineStatus::from_code("AceptadoConErrores"), Some(LineStatus::AcceptedWithWarnings));
        assert_eq!(LineStatus::from_code("Anulada"), Some(LineStatus::Cancelled));
        assert_eq!(LineStatus::from_code("Unknown"), None);
        assert_eq!(SubmissionStatus::from_code("ParcialmenteCorrecto"), Some(SubmissionStatus::PartiallyCorrect));
    }

    #[test]
    fn correct_line_is_ok() {
        assert!(line(LineStatus::Correct, None, None).outcome().unwrap().is_none());
        assert!(line(LineStatus::Cancelled, None, None).outcome().unwrap().is_none());
    }

    #[test]
    fn warning_line() {
        let warning = line(LineStatus::AcceptedWithWarnings, Some("2000"), Some("Aviso"))
            .outcome()
            .unwrap()
            .unwrap();
        assert_eq!(warning.to_string(), "warning: 2000: Aviso");
    }

    #[test]
    fn duplicate_line() {
        let err = line(LineStatus::Duplicate, Some("3000"), None).outcome().unwrap_err();
        assert_eq!(err.to_string(), "duplicate: 3000: Registro de facturación duplicado.");
    }

    #[test]
    fn incorrect_line() {
        let err = line(LineStatus::Incorrect, Some("1104"), None).outcome().unwrap_err();
        assert!(matches!(err, VerifactuError::Validation(_)));
        assert!(err.to_string().contains("NumSerieFactura"));
    }

    #[test]
    fn error_catalogue() {
        assert!(describe_error_code("4102").is_some());
        assert!(describe_error_code("9999").is_none());
        assert!(rejects_submission("4109"));
        assert!(rejects_submission("3501"));
        assert!(!rejects_submission("1104"));
    }

    #[test]
    fn catalogue_is_sorted() {
        for window in ERROR_CODES.windows(2) {
            assert!(
                window[0].0 < window[1].0,
                "error codes not sorted: {} >= {}",
                window[0].0,
                window[1].0
            );
        }
    }
}
