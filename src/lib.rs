//! # verifactu
//!
//! Spanish VeriFactu invoice records: converts a source invoice into the
//! tamper-evident `RegistroAlta` / `RegistroAnulacion` records required by
//! the AEAT, chains them with SHA-256 fingerprints, and submits them.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use rust_decimal_macros::dec;
//! use verifactu::*;
//!
//! let software = Software {
//!     legal_name: "Invopop S.L.".into(),
//!     tax_code: "B85905495".into(),
//!     system_name: "Invopop".into(),
//!     system_id: "IP".into(),
//!     version: "1.0".into(),
//!     installation_number: "001".into(),
//!     only_verifactu: true,
//!     multi_taxpayer: true,
//!     multiple_taxpayers: true,
//! };
//! let client = Client::new(Config::builder(software).build().unwrap())
//!     .with_clock(FixedClock(Utc.with_ymd_and_hms(2024, 11, 20, 18, 0, 55).unwrap()));
//!
//! let invoice = InvoiceBuilder::new("001", NaiveDate::from_ymd_opt(2024, 11, 11).unwrap())
//!     .series("SAMPLE")
//!     .invoice_type(InvoiceType::F1)
//!     .supplier(PartyBuilder::new("Provide One S.L.").tax_id("ES", "B98602642").build())
//!     .customer(PartyBuilder::new("Sample Consumer").tax_id("ES", "B63272603").build())
//!     .add_line(LineItemBuilder::new("Development services", dec!(20), dec!(90))
//!         .tax(TaxCombo::vat(dec!(21)).operation_class(OperationClass::S1))
//!         .build())
//!     .build()
//!     .unwrap();
//!
//! let first = client.register(&invoice, None).unwrap();
//! assert_eq!(first.record.timestamp(), "2024-11-20T19:00:55+01:00");
//! assert!(first.record.chain().unwrap().is_first());
//!
//! // Persist `chain_data` and pass it as predecessor of the next record.
//! let json = serde_json::to_string(&first.chain_data).unwrap();
//! let prev: ChainData = serde_json::from_str(&json).unwrap();
//! let next = client.cancel(&invoice, Some(&prev)).unwrap();
//! assert!(!next.record.chain().unwrap().is_first());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Input model, breakdown, record building, chaining, configuration |
//! | `xml` | Request rendering and response parsing |
//! | `gateway` | HTTPS submission to the AEAT SOAP endpoint |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "gateway")]
pub mod gateway;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
