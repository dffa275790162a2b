use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use verifactu::*;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 11).unwrap()
}

fn builder() -> InvoiceBuilder {
    InvoiceBuilder::new("001", date())
        .series("SAMPLE")
        .invoice_type(InvoiceType::F1)
        .supplier(PartyBuilder::new("Provide One S.L.").tax_id("ES", "B98602642").build())
        .customer(PartyBuilder::new("Sample Consumer").tax_id("ES", "B63272603").build())
}

fn line(price: Decimal, combo: TaxCombo) -> LineItem {
    LineItemBuilder::new("Item", dec!(1), price).tax(combo).build()
}

fn entries(inv: &Invoice) -> Vec<BreakdownEntry> {
    classify(inv, &inv.totals).unwrap()
}

fn s1(percent: Decimal) -> TaxCombo {
    TaxCombo::vat(percent).operation_class(OperationClass::S1)
}

#[test]
fn one_entry_per_rate_in_order() {
    let inv = builder()
        .add_line(line(dec!(100), s1(dec!(21))))
        .add_line(line(dec!(50), s1(dec!(10))))
        .add_line(line(dec!(200), s1(dec!(21))))
        .build()
        .unwrap();
    let e = entries(&inv);
    assert_eq!(e.len(), 2);
    assert_eq!(e[0].tax_rate, Some(dec!(21)));
    assert_eq!(e[0].base, dec!(300.00));
    assert_eq!(e[0].charged_amount, Some(dec!(63.00)));
    assert_eq!(e[1].tax_rate, Some(dec!(10)));
    assert_eq!(e[1].base, dec!(50.00));
    assert_eq!(e[1].charged_amount, Some(dec!(5.00)));
}

#[test]
fn taxed_charges_join_their_rate() {
    let inv = builder()
        .add_line(line(dec!(100), s1(dec!(21))))
        .add_charge(Charge::taxed(dec!(10), vec![s1(dec!(21))]))
        .build()
        .unwrap();
    let e = entries(&inv);
    assert_eq!(e.len(), 1);
    assert_eq!(e[0].base, dec!(110.00));
    assert_eq!(e[0].charged_amount, Some(dec!(23.10)));
}

#[test]
fn reverse_charge_has_zero_quota() {
    let inv = builder()
        .add_line(line(dec!(100), TaxCombo::vat(dec!(21)).operation_class(OperationClass::S2)))
        .build()
        .unwrap();
    let e = &entries(&inv)[0];
    assert_eq!(e.operation_class, Some(OperationClass::S2));
    assert_eq!(e.tax_rate, Some(Decimal::ZERO));
    assert_eq!(e.charged_amount, Some(Decimal::ZERO));
    assert_eq!(e.base, dec!(100.00));
}

#[test]
fn not_subject_has_no_rate() {
    let combo = TaxCombo::new(TaxCategory::Vat)
        .rate("outside-scope")
        .operation_class(OperationClass::N2);
    let inv = builder().add_line(line(dec!(80), combo)).build().unwrap();
    let e = &entries(&inv)[0];
    assert_eq!(e.operation_class, Some(OperationClass::N2));
    assert_eq!(e.tax_rate, None);
    assert_eq!(e.charged_amount, None);
    assert_eq!(e.exemption, None);
}

#[test]
fn exempt_operation() {
    let inv = builder()
        .add_line(line(dec!(1800), TaxCombo::vat_exempt("E1")))
        .build()
        .unwrap();
    let e = &entries(&inv)[0];
    assert_eq!(e.exemption.as_deref(), Some("E1"));
    assert_eq!(e.operation_class, None);
    assert_eq!(e.tax_rate, None);
    assert_eq!(e.charged_amount, None);
}

#[test]
fn invalid_exemption_code() {
    let inv = builder()
        .add_line(line(dec!(100), TaxCombo::vat_exempt("E9")))
        .build()
        .unwrap();
    let err = classify(&inv, &inv.totals).unwrap_err();
    assert!(err.to_string().contains("E1-E6"));
}

#[test]
fn missing_operation_class() {
    let inv = builder()
        .add_line(line(dec!(100), TaxCombo::vat(dec!(21))))
        .build()
        .unwrap();
    let err = classify(&inv, &inv.totals).unwrap_err();
    assert!(err.to_string().contains("operation classification"));
}

#[test]
fn equivalence_surcharge() {
    let inv = builder()
        .add_line(line(dec!(100), s1(dec!(21)).equivalence(dec!(5.2))))
        .build()
        .unwrap();
    let e = &entries(&inv)[0];
    assert_eq!(e.regime, Some(RegimeKey::EquivalenceSurcharge));
    assert_eq!(e.surcharge_rate, Some(dec!(5.2)));
    assert_eq!(e.surcharge_amount, Some(dec!(5.20)));
}

#[test]
fn equivalence_without_surcharge_total_fails() {
    let mut inv = builder()
        .add_line(line(dec!(100), s1(dec!(21)).equivalence(dec!(5.2))))
        .build()
        .unwrap();
    inv.totals.taxes[0].rates[0].surcharge = None;
    let err = classify(&inv, &inv.totals).unwrap_err();
    assert!(err.to_string().contains("equivalence surcharge"));
}

#[test]
fn surcharge_only_for_domestic_subject_operations() {
    let combo = TaxCombo::vat(dec!(21))
        .operation_class(OperationClass::S2)
        .equivalence(dec!(5.2));
    let inv = builder().add_line(line(dec!(100), combo)).build().unwrap();
    let e = &entries(&inv)[0];
    assert_eq!(e.operation_class, Some(OperationClass::S2));
    assert_eq!(e.surcharge_rate, None);
    assert_eq!(e.surcharge_amount, None);

    let mut inv = inv;
    inv.totals.taxes[0].rates[0].surcharge = None;
    assert!(classify(&inv, &inv.totals).is_ok());
}

#[test]
fn retained_taxes_are_skipped() {
    let irpf = TaxCombo::new(TaxCategory::Other("IRPF".into()))
        .percent(dec!(15))
        .retained();
    let inv = builder()
        .add_line(
            LineItemBuilder::new("Consulting", dec!(1), dec!(1000))
                .tax(s1(dec!(21)))
                .tax(irpf)
                .build(),
        )
        .build()
        .unwrap();
    let e = entries(&inv);
    assert_eq!(e.len(), 1);
    assert_eq!(e[0].tax_type, TaxType::Vat);
}

#[test]
fn foreign_customer_is_export() {
    let inv = builder()
        .customer(PartyBuilder::new("Client SARL").tax_id("FR", "44732829320").build())
        .add_line(line(dec!(100), TaxCombo::vat_exempt("E5")))
        .build()
        .unwrap();
    assert_eq!(entries(&inv)[0].regime, Some(RegimeKey::Export));
}

#[test]
fn tags_select_special_regimes() {
    let cases = [
        (InvoiceTag::Art, RegimeKey::SpecialGoods),
        (InvoiceTag::Antiques, RegimeKey::SpecialGoods),
        (InvoiceTag::SecondHandGoods, RegimeKey::SpecialGoods),
        (InvoiceTag::TravelAgency, RegimeKey::TravelAgency),
        (InvoiceTag::SimplifiedScheme, RegimeKey::Simplified),
    ];
    for (tag, expected) in cases {
        let inv = builder()
            .tag(tag)
            .add_line(line(dec!(100), s1(dec!(21))))
            .build()
            .unwrap();
        assert_eq!(entries(&inv)[0].regime, Some(expected), "tag {tag:?}");
    }
}

#[test]
fn explicit_regime_wins() {
    let inv = builder()
        .tag(InvoiceTag::Art)
        .add_line(line(dec!(100), s1(dec!(21)).regime(RegimeKey::CashBasis)))
        .build()
        .unwrap();
    assert_eq!(entries(&inv)[0].regime, Some(RegimeKey::CashBasis));
}

#[test]
fn entity_group_reports_cost_base() {
    let inv = builder()
        .add_line(line(dec!(100), s1(dec!(21)).regime(RegimeKey::EntityGroup)))
        .build()
        .unwrap();
    assert_eq!(entries(&inv)[0].cost_base, Some(dec!(100.00)));
}

#[test]
fn igic_keeps_a_regime() {
    let combo = TaxCombo::new(TaxCategory::Igic)
        .percent(dec!(7))
        .operation_class(OperationClass::S1);
    let inv = builder().add_line(line(dec!(100), combo)).build().unwrap();
    let e = &entries(&inv)[0];
    assert_eq!(e.tax_type, TaxType::Igic);
    assert_eq!(e.regime, Some(RegimeKey::General));
    assert_eq!(e.charged_amount, Some(dec!(7.00)));
    assert_eq!(e.cost_base, None);
}

#[test]
fn ipsi_has_no_regime_and_cost_base() {
    let combo = TaxCombo::new(TaxCategory::Ipsi)
        .percent(dec!(4))
        .operation_class(OperationClass::S1);
    let inv = builder().add_line(line(dec!(100), combo)).build().unwrap();
    let e = &entries(&inv)[0];
    assert_eq!(e.tax_type, TaxType::Ipsi);
    assert_eq!(e.regime, None);
    assert_eq!(e.cost_base, Some(dec!(100.00)));
}

#[test]
fn precomputed_totals_are_used_as_is() {
    let mut computed = calculate_totals(&[line(dec!(100), s1(dec!(21)))], &[]);
    computed.taxes[0].rates[0].amount = dec!(20.99);
    computed.taxes[0].amount = dec!(20.99);
    let inv = builder()
        .add_line(line(dec!(100), s1(dec!(21))))
        .totals(computed)
        .build()
        .unwrap();
    assert_eq!(entries(&inv)[0].charged_amount, Some(dec!(20.99)));
}

#[test]
fn tax_type_codes() {
    assert_eq!(tax_type(&TaxCategory::Vat).code(), "01");
    assert_eq!(tax_type(&TaxCategory::Ipsi).code(), "02");
    assert_eq!(tax_type(&TaxCategory::Igic).code(), "03");
    assert_eq!(tax_type(&TaxCategory::Other("IRPF".into())).code(), "05");
}
