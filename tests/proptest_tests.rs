//! Property-based tests for record building and chaining.
//!
//! Run with: `cargo test --test proptest_tests`

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use verifactu::*;

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

fn invoice(code: &str, day: u32, lines: &[(i64, u32)]) -> Invoice {
    let mut builder = InvoiceBuilder::new(code, NaiveDate::from_ymd_opt(2024, 11, day).unwrap())
        .series("P")
        .invoice_type(InvoiceType::F1)
        .supplier(PartyBuilder::new("Provide One S.L.").tax_id("ES", "B98602642").build())
        .customer(PartyBuilder::new("Sample Consumer").tax_id("ES", "B63272603").build());
    for (cents, percent) in lines {
        builder = builder.add_line(
            LineItemBuilder::new("Item", dec!(1), Decimal::new(*cents, 2))
                .tax(TaxCombo::vat(Decimal::from(*percent)).operation_class(OperationClass::S1))
                .build(),
        );
    }
    builder.build().unwrap()
}

fn registration(inv: &Invoice, timestamp: &str) -> Record {
    let sw = software();
    RecordBuilder::new(&sw, IssuerRole::Supplier)
        .registration(inv, timestamp)
        .unwrap()
}

fn code_strategy() -> impl Strategy<Value = String> {
    "[A-Z0-9]{1,12}"
}

fn lines_strategy() -> impl Strategy<Value = Vec<(i64, u32)>> {
    prop::collection::vec((1i64..10_000_000, prop::sample::select(vec![4u32, 10, 21])), 1..8)
}

fn fingerprint_strategy() -> impl Strategy<Value = String> {
    "[0-9A-F]{64}"
}

proptest! {
    #[test]
    fn sealing_is_deterministic(
        code in code_strategy(),
        day in 1u32..=28,
        lines in lines_strategy(),
        prev in prop::option::of(fingerprint_strategy()),
    ) {
        let inv = invoice(&code, day, &lines);
        let prev = prev.map(|fingerprint| ChainData {
            issuer: "B98602642".into(),
            num_series: "P-0".into(),
            issue_date: "01-11-2024".into(),
            fingerprint,
        });

        let mut a = registration(&inv, "2024-11-20T19:00:55+01:00");
        let mut b = a.clone();
        let fa = ChainEngine::seal(&mut a, prev.as_ref()).unwrap();
        let fb = ChainEngine::seal(&mut b, prev.as_ref()).unwrap();

        prop_assert_eq!(&fa, &fb);
        prop_assert_eq!(fa.len(), 64);
        prop_assert!(fa.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        prop_assert!(ChainEngine::verify(&a, prev.as_ref()));
    }

    #[test]
    fn predecessor_changes_fingerprint(
        lines in lines_strategy(),
        p1 in fingerprint_strategy(),
        p2 in fingerprint_strategy(),
    ) {
        prop_assume!(p1 != p2);
        let inv = invoice("001", 11, &lines);
        let data = |fingerprint: String| ChainData {
            issuer: "B98602642".into(),
            num_series: "P-0".into(),
            issue_date: "01-11-2024".into(),
            fingerprint,
        };

        let mut a = registration(&inv, "2024-11-20T19:00:55+01:00");
        let mut b = a.clone();
        let fa = ChainEngine::seal(&mut a, Some(&data(p1))).unwrap();
        let fb = ChainEngine::seal(&mut b, Some(&data(p2))).unwrap();
        prop_assert_ne!(fa, fb);
    }

    #[test]
    fn timestamp_changes_fingerprint(lines in lines_strategy(), secs in 0u32..59) {
        let inv = invoice("001", 11, &lines);
        let mut a = registration(&inv, "2024-11-20T19:00:59+01:00");
        let mut b = registration(&inv, &format!("2024-11-20T19:00:{secs:02}+01:00"));
        let fa = ChainEngine::seal(&mut a, None).unwrap();
        let fb = ChainEngine::seal(&mut b, None).unwrap();
        prop_assert_ne!(fa, fb);
    }

    #[test]
    fn totals_are_consistent(lines in lines_strategy()) {
        let inv = invoice("001", 11, &lines);
        let rec = registration(&inv, "2024-11-20T19:00:55+01:00");
        let reg = rec.as_registration().unwrap();

        let base: Decimal = reg.breakdown.iter().map(|e| e.base).sum();
        let charged: Decimal = reg.breakdown.iter().filter_map(|e| e.charged_amount).sum();

        prop_assert_eq!(reg.tax_total, charged);
        prop_assert_eq!(reg.grand_total, base + charged);
        prop_assert!(reg.breakdown.len() <= 3);
        prop_assert!(reg.tax_total >= Decimal::ZERO);
    }

    #[test]
    fn amounts_have_two_decimals(cents in -100_000_000i64..100_000_000, scale in 0u32..5) {
        let formatted = format_amount(Decimal::new(cents, scale));
        let (_, decimals) = formatted.split_once('.').unwrap();
        prop_assert_eq!(decimals.len(), 2);
    }

    #[test]
    fn tampering_is_detected(lines in lines_strategy(), extra in 1i64..1_000) {
        let inv = invoice("001", 11, &lines);
        let mut rec = registration(&inv, "2024-11-20T19:00:55+01:00");
        ChainEngine::seal(&mut rec, None).unwrap();
        if let Record::Registration(reg) = &mut rec {
            reg.tax_total += Decimal::new(extra, 2);
        }
        prop_assert!(!ChainEngine::verify(&rec, None));
    }
}
