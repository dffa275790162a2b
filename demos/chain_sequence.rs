use chrono::NaiveDate;
use rust_decimal_macros::dec;
use verifactu::core::*;

fn software() -> Software {
    Software {
        legal_name: "Invopop S.L.".into(),
        tax_code: "B85905495".into(),
        system_name: "Invopop".into(),
        system_id: "IP".into(),
        version: "1.0".into(),
        installation_number: "001".into(),
        only_verifactu: true,
        multi_taxpayer: true,
        multiple_taxpayers: true,
    }
}

fn invoice(code: &str, day: u32, price: rust_decimal::Decimal) -> Invoice {
    InvoiceBuilder::new(code, NaiveDate::from_ymd_opt(2024, 11, day).unwrap())
        .series("SAMPLE")
        .invoice_type(InvoiceType::F1)
        .supplier(PartyBuilder::new("Provide One S.L.").tax_id("ES", "B98602642").build())
        .customer(PartyBuilder::new("Sample Consumer").tax_id("ES", "B63272603").build())
        .add_line(
            LineItemBuilder::new("Consulting", dec!(1), price)
                .tax(TaxCombo::vat(dec!(21)).operation_class(OperationClass::S1))
                .build(),
        )
        .build()
        .expect("invoice should be valid")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::builder(software())
        .chain_mode(ChainMode::Shared)
        .build()
        .expect("config should be valid");
    let client = Client::new(config);
    let mut registry = client.registry();

    let invoices = [
        invoice("001", 11, dec!(1500)),
        invoice("002", 12, dec!(320)),
        invoice("003", 13, dec!(75.50)),
    ];

    let mut records = Vec::new();
    for inv in &invoices {
        let submission = client
            .register_in(&mut registry, inv)
            .expect("registration should succeed");
        records.push(submission.record);
    }

    // Cancel the second invoice; the cancellation joins the same chain
    let cancellation = client
        .cancel_in(&mut registry, &invoices[1])
        .expect("cancellation should succeed");
    records.push(cancellation.record);

    println!("=== Chain ===");
    for record in &records {
        println!(
            "{:<13} {:<12} {}",
            record.kind().as_str(),
            record.id().num_series,
            record.fingerprint().unwrap_or("-"),
        );
    }

    match verify_chain(&records) {
        Ok(()) => println!("\nChain intact ({} records)", records.len()),
        Err(brk) => println!("\nChain broken: {brk}"),
    }

    // Tampering with an amount breaks the chain at that record
    if let Some(Record::Registration(reg)) = records.get_mut(1) {
        reg.grand_total += dec!(0.01);
    }
    match verify_chain(&records) {
        Ok(()) => println!("Tampered chain unexpectedly intact"),
        Err(brk) => println!("After tampering: {brk}"),
    }
}
