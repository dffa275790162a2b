use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::*;

/// Parse a gateway answer, bare or wrapped in a SOAP envelope.
///
/// SOAP faults become errors: `Server` for server-side faults, `Validation`
/// for anything the gateway blames on the request.
pub fn from_response_xml(xml: &str) -> Result<SubmissionResponse, VerifactuError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = ParsedResponse::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = std::str::from_utf8(e.local_name().as_ref())
                    .unwrap_or("")
                    .to_string();
                parsed.open(&name);
                path.push(name);
            }
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"RegistroDuplicado" {
                    if let Some(line) = parsed.current_line.as_mut() {
                        line.duplicate.get_or_insert_default();
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| VerifactuError::Xml(format!("parse error: {err}")))?;
                if !text.is_empty() {
                    parsed.handle_text(&path, &text);
                }
            }
            Ok(Event::End(_)) => {
                let ended = path.pop().unwrap_or_default();
                if ended == "RespuestaLinea" {
                    if let Some(line) = parsed.current_line.take() {
                        parsed.lines.push(line);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(VerifactuError::Xml(format!("parse error: {e}")));
            }
            _ => {}
        }
    }

    parsed.into_response()
}

/// Whether a SOAP fault code names a server-side failure.
fn is_server_fault(code: &str) -> bool {
    code.rsplit(':').next() == Some("Server")
}

#[derive(Default)]
struct ParsedResponse {
    fault_code: Option<String>,
    fault_string: Option<String>,
    found_response: bool,
    csv: Option<String>,
    status: Option<String>,
    wait_seconds: Option<String>,
    lines: Vec<ParsedLine>,
    current_line: Option<ParsedLine>,
}

#[derive(Default)]
struct ParsedLine {
    issuer: String,
    num_series: String,
    issue_date: String,
    operation: Option<String>,
    status: Option<String>,
    code: Option<String>,
    description: Option<String>,
    duplicate: Option<DuplicateInfo>,
}

impl ParsedResponse {
    fn open(&mut self, name: &str) {
        match name {
            "RespuestaRegFactuSistemaFacturacion" => self.found_response = true,
            "RespuestaLinea" => self.current_line = Some(ParsedLine::default()),
            "RegistroDuplicado" => {
                if let Some(line) = self.current_line.as_mut() {
                    line.duplicate.get_or_insert_default();
                }
            }
            _ => {}
        }
    }

    fn handle_text(&mut self, path: &[String], text: &str) {
        let Some(leaf) = path.last().map(String::as_str) else {
            return;
        };
        let parent = path
            .len()
            .checked_sub(2)
            .map(|i| path[i].as_str())
            .unwrap_or("");

        if path.iter().any(|p| p == "Fault") {
            match leaf {
                "faultcode" => self.fault_code = Some(text.to_string()),
                "faultstring" => self.fault_string = Some(text.to_string()),
                _ => {}
            }
            return;
        }

        if let Some(line) = self.current_line.as_mut() {
            line.handle_text(parent, leaf, text);
            return;
        }

        if parent == "RespuestaRegFactuSistemaFacturacion" {
            match leaf {
                "CSV" => self.csv = Some(text.to_string()),
                "EstadoEnvio" => self.status = Some(text.to_string()),
                "TiempoEsperaEnvio" => self.wait_seconds = Some(text.to_string()),
                _ => {}
            }
        }
    }

    fn into_response(self) -> Result<SubmissionResponse, VerifactuError> {
        if let Some(code) = self.fault_code {
            let message = format!("{code}: {}", self.fault_string.unwrap_or_default());
            return Err(if is_server_fault(&code) {
                VerifactuError::Server(message)
            } else {
                VerifactuError::Validation(message)
            });
        }
        if !self.found_response {
            return Err(VerifactuError::Xml(
                "missing RespuestaRegFactuSistemaFacturacion".into(),
            ));
        }

        let status_code = self
            .status
            .ok_or_else(|| VerifactuError::Xml("missing EstadoEnvio".into()))?;
        let status = SubmissionStatus::from_code(&status_code).ok_or_else(|| {
            VerifactuError::Xml(format!("unknown EstadoEnvio: {status_code}"))
        })?;
        let wait_seconds = self
            .wait_seconds
            .map(|s| {
                s.parse::<u32>()
                    .map_err(|_| VerifactuError::Xml(format!("invalid TiempoEsperaEnvio: {s}")))
            })
            .transpose()?;

        let lines = self
            .lines
            .into_iter()
            .map(ParsedLine::into_line)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SubmissionResponse {
            csv: self.csv,
            status,
            wait_seconds,
            lines,
        })
    }
}

impl ParsedLine {
    fn handle_text(&mut self, parent: &str, leaf: &str, text: &str) {
        match parent {
            // Cancellation lines may echo the `...Anulada` field names.
            "IDFactura" => match leaf.trim_end_matches("Anulada") {
                "IDEmisorFactura" => self.issuer = text.to_string(),
                "NumSerieFactura" => self.num_series = text.to_string(),
                "FechaExpedicionFactura" => self.issue_date = text.to_string(),
                _ => {}
            },
            "Operacion" if leaf == "TipoOperacion" => self.operation = Some(text.to_string()),
            "RespuestaLinea" => match leaf {
                "EstadoRegistro" => self.status = Some(text.to_string()),
                "CodigoErrorRegistro" => self.code = Some(text.to_string()),
                "DescripcionErrorRegistro" => self.description = Some(text.to_string()),
                _ => {}
            },
            "RegistroDuplicado" => {
                let dup = self.duplicate.get_or_insert_default();
                match leaf {
                    "IdPeticionRegistroDuplicado" => dup.request_id = Some(text.to_string()),
                    "EstadoRegistroDuplicado" => dup.status = Some(text.to_string()),
                    "CodigoErrorRegistro" => dup.code = Some(text.to_string()),
                    "DescripcionErrorRegistro" => dup.description = Some(text.to_string()),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn into_line(self) -> Result<ResponseLine, VerifactuError> {
        let id = RecordId::new(self.issuer, self.num_series, self.issue_date);
        let duplicate_code = self.code.as_deref() == Some(DUPLICATE_ERROR_CODE);
        let status = if self.duplicate.is_some() || duplicate_code {
            LineStatus::Duplicate
        } else {
            let code = self.status.as_deref().ok_or_else(|| {
                VerifactuError::Xml(format!("{id}: missing EstadoRegistro"))
            })?;
            LineStatus::from_code(code)
                .ok_or_else(|| VerifactuError::Xml(format!("{id}: unknown EstadoRegistro: {code}")))?
        };

        Ok(ResponseLine {
            id,
            operation: self.operation,
            status,
            code: self.code,
            description: self.description,
            duplicate: self.duplicate,
        })
    }
}
