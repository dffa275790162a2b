//! Core VeriFactu types: input model, record building and chaining.
//!
//! This module turns a source invoice into a sealed `RegistroAlta` or
//! `RegistroAnulacion`, with its tax breakdown, its SHA-256 fingerprint and
//! its link to the previous record of the issuer.

mod breakdown;
mod builder;
mod chain;
mod client;
pub mod codes;
mod config;
pub mod countries;
mod description;
mod error;
mod party;
mod qr;
mod record;
mod record_builder;
mod registry;
mod response;
mod timestamp;
mod types;
mod validation;

pub use breakdown::*;
pub use builder::*;
pub use chain::*;
pub use client::*;
pub use codes::*;
pub use config::*;
pub use description::*;
pub use error::*;
pub use party::*;
pub use qr::*;
pub use record::*;
pub use record_builder::*;
pub use registry::*;
pub use response::*;
pub use timestamp::*;
pub use types::*;
pub use validation::*;
