use chrono::NaiveDate;
use rust_decimal_macros::dec;
use verifactu::core::*;
use verifactu::xml;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let software = Software {
        legal_name: "Invopop S.L.".into(),
        tax_code: "B85905495".into(),
        system_name: "Invopop".into(),
        system_id: "IP".into(),
        version: "1.0".into(),
        installation_number: "001".into(),
        only_verifactu: true,
        multi_taxpayer: true,
        multiple_taxpayers: true,
    };
    let config = Config::builder(software)
        .build()
        .expect("config should be valid");
    let client = Client::new(config.clone());
    let issuer = Taxpayer::new("Provide One S.L.", "B98602642");

    let invoice = InvoiceBuilder::new("001", NaiveDate::from_ymd_opt(2024, 11, 11).unwrap())
        .series("SAMPLE")
        .invoice_type(InvoiceType::F1)
        .supplier(PartyBuilder::new("Provide One S.L.").tax_id("ES", "B98602642").build())
        .customer(PartyBuilder::new("Client SARL").tax_id("FR", "44732829320").build())
        .add_line(
            LineItemBuilder::new("Consulting", dec!(10), dec!(120))
                .tax(TaxCombo::vat_exempt("E5"))
                .build(),
        )
        .build()
        .expect("invoice should be valid");

    let submission = client
        .register(&invoice, None)
        .expect("registration should succeed");

    match xml::to_envelope_xml(&config, &issuer, &[submission.record]) {
        Ok(envelope) => println!("{envelope}"),
        Err(e) => eprintln!("Rendering failed: {e}"),
    }

    // A response as returned by the AEAT
    let response = r#"<env:Envelope xmlns:env="http://schemas.xmlsoap.org/soap/envelope/">
  <env:Body>
    <tikR:RespuestaRegFactuSistemaFacturacion xmlns:tikR="https://www2.agenciatributaria.gob.es/static_files/common/internet/dep/aplicaciones/es/aeat/tike/cont/ws/RespuestaSuministro.xsd" xmlns:tik="https://www2.agenciatributaria.gob.es/static_files/common/internet/dep/aplicaciones/es/aeat/tike/cont/ws/SuministroInformacion.xsd">
      <tikR:CSV>A-YDSW8NLFLANWPM</tikR:CSV>
      <tikR:EstadoEnvio>Correcto</tikR:EstadoEnvio>
      <tikR:RespuestaLinea>
        <tikR:IDFactura>
          <tik:IDEmisorFactura>B98602642</tik:IDEmisorFactura>
          <tik:NumSerieFactura>SAMPLE-001</tik:NumSerieFactura>
          <tik:FechaExpedicionFactura>11-11-2024</tik:FechaExpedicionFactura>
        </tikR:IDFactura>
        <tikR:EstadoRegistro>Correcto</tikR:EstadoRegistro>
      </tikR:RespuestaLinea>
    </tikR:RespuestaRegFactuSistemaFacturacion>
  </env:Body>
</env:Envelope>"#;

    match xml::from_response_xml(response) {
        Ok(parsed) => {
            println!("\nStatus: {:?}", parsed.status);
            for line in &parsed.lines {
                println!("  {} -> {:?}", line.id.num_series, line.status);
            }
        }
        Err(e) => eprintln!("Parsing failed: {e}"),
    }
}
