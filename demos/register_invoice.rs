use chrono::NaiveDate;
use rust_decimal_macros::dec;
use verifactu::core::*;

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
        .environment(Environment::Sandbox)
        .build()
        .expect("config should be valid");
    let client = Client::new(config);

    // A standard domestic invoice with two VAT rates
    let invoice = InvoiceBuilder::new("001", NaiveDate::from_ymd_opt(2024, 11, 11).unwrap())
        .series("SAMPLE")
        .invoice_type(InvoiceType::F1)
        .supplier(PartyBuilder::new("Provide One S.L.").tax_id("ES", "B98602642").build())
        .customer(PartyBuilder::new("Sample Consumer").tax_id("ES", "B63272603").build())
        .general_note("Desarrollo de software a medida")
        .add_line(
            LineItemBuilder::new("Development services", dec!(20), dec!(90))
                .tax(TaxCombo::vat(dec!(21)).operation_class(OperationClass::S1))
                .build(),
        )
        .add_line(
            LineItemBuilder::new("Technical books", dec!(2), dec!(45))
                .tax(TaxCombo::vat(dec!(4)).operation_class(OperationClass::S1))
                .build(),
        )
        .build()
        .expect("invoice should be valid");

    let submission = client
        .register(&invoice, None)
        .expect("registration should succeed");
    let reg = submission.record.as_registration().unwrap();

    println!("=== Registration ===");
    println!("Issuer:      {}", reg.id.issuer);
    println!("Number:      {}", reg.id.num_series);
    println!("Issue date:  {}", reg.id.issue_date);
    println!("Description: {}", reg.description);
    for entry in &reg.breakdown {
        println!(
            "  {:?} {:?}: base {} quota {}",
            entry.tax_type,
            entry.tax_rate,
            format_amount(entry.base),
            entry.charged_amount.map(format_amount).unwrap_or_default(),
        );
    }
    println!("Tax total:   {}", format_amount(reg.tax_total));
    println!("Grand total: {}", format_amount(reg.grand_total));
    println!("Timestamp:   {}", submission.record.timestamp());
    println!("Fingerprint: {}", submission.chain_data.fingerprint);
    if let Some(url) = &submission.verification_url {
        println!("QR link:     {url}");
    }

    // Store this and hand it to the next call
    println!(
        "\nChain data: {}",
        serde_json::to_string_pretty(&submission.chain_data).unwrap()
    );
}
