use super::ns;
use super::xml_utils::{XmlResult, XmlWriter};
use crate::core::*;

/// Records AEAT accepts in a single `RegFactuSistemaFacturacion`.
pub const MAX_RECORDS_PER_REQUEST: usize = 1000;

/// Render a `RegFactuSistemaFacturacion` request for sealed records.
///
/// `issuer` fills `ObligadoEmision`; the configured representative, if any,
/// fills `Representante`.
pub fn to_request_xml(config: &Config, issuer: &Taxpayer, records: &[Record]) -> XmlResult {
    if records.is_empty() {
        return Err(VerifactuError::Validation(
            "request: at least one record is required".into(),
        ));
    }
    if records.len() > MAX_RECORDS_PER_REQUEST {
        return Err(VerifactuError::Validation(format!(
            "request: {} records exceed the limit of {MAX_RECORDS_PER_REQUEST}",
            records.len()
        )));
    }

    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs(
        "sum:RegFactuSistemaFacturacion",
        &[("xmlns:sum", ns::SUM), ("xmlns:sum1", ns::SUM1)],
    )?;

    w.start_element("sum:Cabecera")?;
    write_taxpayer(&mut w, "sum1:ObligadoEmision", issuer)?;
    if let Some(rep) = &config.representative {
        write_taxpayer(&mut w, "sum1:Representante", rep)?;
    }
    w.end_element("sum:Cabecera")?;

    for record in records {
        let (chain, fingerprint) = match (record.chain(), record.fingerprint()) {
            (Some(chain), Some(fp)) => (chain, fp),
            _ => {
                return Err(VerifactuError::Validation(format!(
                    "record {} is not sealed",
                    record.id()
                )));
            }
        };

        w.start_element("sum:RegistroFactura")?;
        match record {
            Record::Registration(reg) => write_registration(&mut w, reg, chain, fingerprint)?,
            Record::Cancellation(can) => write_cancellation(&mut w, can, chain, fingerprint)?,
        }
        w.end_element("sum:RegistroFactura")?;
    }

    w.end_element("sum:RegFactuSistemaFacturacion")?;

    tracing::debug!(
        issuer = %issuer.nif,
        records = records.len(),
        "request document rendered"
    );
    w.into_string()
}

/// Wrap a rendered request in a SOAP 1.1 envelope.
pub fn envelop(request: &str) -> XmlResult {
    let body = strip_declaration(request);

    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs(
        "soapenv:Envelope",
        &[
            ("xmlns:soapenv", ns::SOAP_ENV),
            ("xmlns:sum", ns::SUM),
            ("xmlns:sum1", ns::SUM1),
        ],
    )?;
    w.start_element("soapenv:Body")?;
    w.raw(body)?;
    w.end_element("soapenv:Body")?;
    w.end_element("soapenv:Envelope")?;
    w.into_string()
}

/// Render a request and wrap it in a SOAP envelope in one step.
pub fn to_envelope_xml(config: &Config, issuer: &Taxpayer, records: &[Record]) -> XmlResult {
    envelop(&to_request_xml(config, issuer, records)?)
}

fn strip_declaration(xml: &str) -> &str {
    let xml = xml.trim_start();
    if xml.starts_with("<?xml") {
        match xml.find("?>") {
            Some(end) => xml[end + 2..].trim(),
            None => xml,
        }
    } else {
        xml.trim_end()
    }
}

fn write_taxpayer(w: &mut XmlWriter, tag: &str, taxpayer: &Taxpayer) -> Result<(), VerifactuError> {
    w.start_element(tag)?;
    w.text_element("sum1:NombreRazon", &taxpayer.name)?;
    w.text_element("sum1:NIF", &taxpayer.nif)?;
    w.end_element(tag)?;
    Ok(())
}

fn write_registration(
    w: &mut XmlWriter,
    reg: &Registration,
    chain: &ChainLink,
    fingerprint: &str,
) -> Result<(), VerifactuError> {
    w.start_element("sum1:RegistroAlta")?;
    w.text_element("sum1:IDVersion", RECORD_VERSION)?;
    write_id(w, "sum1:IDFactura", &reg.id, "")?;
    w.text_element("sum1:NombreRazonEmisor", &reg.issuer_name)?;
    w.text_element("sum1:TipoFactura", reg.invoice_type.code())?;
    w.opt_text_element(
        "sum1:TipoRectificativa",
        reg.correction_type.as_ref().map(|c| c.code()),
    )?;

    if !reg.rectified.is_empty() {
        w.start_element("sum1:FacturasRectificadas")?;
        for id in &reg.rectified {
            write_id(w, "sum1:IDFacturaRectificada", id, "")?;
        }
        w.end_element("sum1:FacturasRectificadas")?;
    }
    if !reg.substituted.is_empty() {
        w.start_element("sum1:FacturasSustituidas")?;
        for id in &reg.substituted {
            write_id(w, "sum1:IDFacturaSustituida", id, "")?;
        }
        w.end_element("sum1:FacturasSustituidas")?;
    }
    if let Some(amounts) = &reg.rectification {
        w.start_element("sum1:ImporteRectificacion")?;
        w.amount_element("sum1:BaseRectificada", amounts.base)?;
        w.amount_element("sum1:CuotaRectificada", amounts.quota)?;
        w.amount_element("sum1:CuotaRecargoRectificado", amounts.surcharge)?;
        w.end_element("sum1:ImporteRectificacion")?;
    }

    w.opt_text_element("sum1:FechaOperacion", reg.operation_date.as_deref())?;
    w.text_element("sum1:DescripcionOperacion", &reg.description)?;
    if reg.simplified_art_7273 {
        w.flag_element("sum1:FacturaSimplificadaArt7273", true)?;
    }
    if let Some(no_recipient) = reg.no_recipient {
        w.flag_element("sum1:FacturaSinIdentifDestinatarioArt61d", no_recipient)?;
    }
    if reg.high_value {
        w.flag_element("sum1:Macrodato", true)?;
    }
    w.opt_text_element(
        "sum1:EmitidaPorTerceroODestinatario",
        reg.issued_by.as_ref().map(|r| r.code()),
    )?;
    if let Some(third) = &reg.third_party {
        write_party(w, "sum1:Tercero", third)?;
    }
    if let Some(recipient) = &reg.recipient {
        w.start_element("sum1:Destinatarios")?;
        write_party(w, "sum1:IDDestinatario", recipient)?;
        w.end_element("sum1:Destinatarios")?;
    }

    w.start_element("sum1:Desglose")?;
    for entry in &reg.breakdown {
        write_breakdown_entry(w, entry)?;
    }
    w.end_element("sum1:Desglose")?;

    w.amount_element("sum1:CuotaTotal", reg.tax_total)?;
    w.amount_element("sum1:ImporteTotal", reg.grand_total)?;
    write_chain(w, chain)?;
    write_software(w, &reg.software)?;
    w.text_element("sum1:FechaHoraHusoGenRegistro", &reg.timestamp)?;
    w.text_element("sum1:TipoHuella", FINGERPRINT_TYPE_SHA256)?;
    w.text_element("sum1:Huella", fingerprint)?;
    w.end_element("sum1:RegistroAlta")?;
    Ok(())
}

fn write_cancellation(
    w: &mut XmlWriter,
    can: &Cancellation,
    chain: &ChainLink,
    fingerprint: &str,
) -> Result<(), VerifactuError> {
    w.start_element("sum1:RegistroAnulacion")?;
    w.text_element("sum1:IDVersion", RECORD_VERSION)?;
    write_id(w, "sum1:IDFactura", &can.id, "Anulada")?;
    w.opt_text_element("sum1:GeneradoPor", can.generated_by.as_ref().map(|r| r.code()))?;
    if let Some(generator) = &can.generator {
        write_party(w, "sum1:Generador", generator)?;
    }
    write_chain(w, chain)?;
    write_software(w, &can.software)?;
    w.text_element("sum1:FechaHoraHusoGenRegistro", &can.timestamp)?;
    w.text_element("sum1:TipoHuella", FINGERPRINT_TYPE_SHA256)?;
    w.text_element("sum1:Huella", fingerprint)?;
    w.end_element("sum1:RegistroAnulacion")?;
    Ok(())
}

/// Identity block; cancellations suffix every field name with `Anulada`.
fn write_id(w: &mut XmlWriter, tag: &str, id: &RecordId, suffix: &str) -> Result<(), VerifactuError> {
    w.start_element(tag)?;
    w.text_element(&format!("sum1:IDEmisorFactura{suffix}"), &id.issuer)?;
    w.text_element(&format!("sum1:NumSerieFactura{suffix}"), &id.num_series)?;
    w.text_element(&format!("sum1:FechaExpedicionFactura{suffix}"), &id.issue_date)?;
    w.end_element(tag)?;
    Ok(())
}

fn write_party(w: &mut XmlWriter, tag: &str, party: &RecordParty) -> Result<(), VerifactuError> {
    w.start_element(tag)?;
    w.text_element("sum1:NombreRazon", &party.name)?;
    match &party.id {
        PartyId::Nif(nif) => {
            w.text_element("sum1:NIF", nif)?;
        }
        PartyId::Other(other) => {
            w.start_element("sum1:IDOtro")?;
            w.opt_text_element("sum1:CodigoPais", other.country.as_deref())?;
            w.text_element("sum1:IDType", other.id_type.code())?;
            w.text_element("sum1:ID", &other.id)?;
            w.end_element("sum1:IDOtro")?;
        }
    }
    w.end_element(tag)?;
    Ok(())
}

fn write_breakdown_entry(w: &mut XmlWriter, entry: &BreakdownEntry) -> Result<(), VerifactuError> {
    w.start_element("sum1:DetalleDesglose")?;
    w.text_element("sum1:Impuesto", entry.tax_type.code())?;
    w.opt_text_element("sum1:ClaveRegimen", entry.regime.as_ref().map(|r| r.code()))?;
    match (&entry.operation_class, &entry.exemption) {
        (Some(class), _) => {
            w.text_element("sum1:CalificacionOperacion", class.code())?;
        }
        (None, Some(exemption)) => {
            w.text_element("sum1:OperacionExenta", exemption)?;
        }
        (None, None) => {}
    }
    if let Some(rate) = entry.tax_rate {
        w.amount_element("sum1:TipoImpositivo", rate)?;
    }
    w.amount_element("sum1:BaseImponibleOimporteNoSujeto", entry.base)?;
    if let Some(cost) = entry.cost_base {
        w.amount_element("sum1:BaseImponibleACoste", cost)?;
    }
    if let Some(charged) = entry.charged_amount {
        w.amount_element("sum1:CuotaRepercutida", charged)?;
    }
    if let Some(rate) = entry.surcharge_rate {
        w.amount_element("sum1:TipoRecargoEquivalencia", rate)?;
    }
    if let Some(amount) = entry.surcharge_amount {
        w.amount_element("sum1:CuotaRecargoEquivalencia", amount)?;
    }
    w.end_element("sum1:DetalleDesglose")?;
    Ok(())
}

fn write_chain(w: &mut XmlWriter, chain: &ChainLink) -> Result<(), VerifactuError> {
    w.start_element("sum1:Encadenamiento")?;
    match chain {
        ChainLink::First => {
            w.flag_element("sum1:PrimerRegistro", true)?;
        }
        ChainLink::Previous { id, fingerprint } => {
            w.start_element("sum1:RegistroAnterior")?;
            w.text_element("sum1:IDEmisorFactura", &id.issuer)?;
            w.text_element("sum1:NumSerieFactura", &id.num_series)?;
            w.text_element("sum1:FechaExpedicionFactura", &id.issue_date)?;
            w.text_element("sum1:Huella", fingerprint)?;
            w.end_element("sum1:RegistroAnterior")?;
        }
    }
    w.end_element("sum1:Encadenamiento")?;
    Ok(())
}

fn write_software(w: &mut XmlWriter, sw: &Software) -> Result<(), VerifactuError> {
    w.start_element("sum1:SistemaInformatico")?;
    w.text_element("sum1:NombreRazon", &sw.legal_name)?;
    w.text_element("sum1:NIF", &sw.tax_code)?;
    w.text_element("sum1:NombreSistemaInformatico", &sw.system_name)?;
    w.text_element("sum1:IdSistemaInformatico", &sw.system_id)?;
    w.text_element("sum1:Version", &sw.version)?;
    w.text_element("sum1:NumeroInstalacion", &sw.installation_number)?;
    w.flag_element("sum1:TipoUsoPosibleSoloVerifactu", sw.only_verifactu)?;
    w.flag_element("sum1:TipoUsoPosibleMultiOT", sw.multi_taxpayer)?;
    w.flag_element("sum1:IndicadorMultiplesOT", sw.multiple_taxpayers)?;
    w.end_element("sum1:SistemaInformatico")?;
    Ok(())
}
