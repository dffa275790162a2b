//! Party identification for records.
//!
//! Spanish tax IDs become a plain `NIF`. Everything else goes into `IDOtro`,
//! with EU VAT numbers typed by the membership of their country on the
//! invoice date.

use chrono::NaiveDate;

use super::codes::IdType;
use super::countries::{in_eu_vat_area, iso_country};
use super::record::{OtherId, PartyId, RecordParty};
use super::types::Party;

/// Resolve a party into its record form.
///
/// A Spanish tax ID yields a NIF. A foreign tax ID yields an `IDOtro` typed as
/// EU VAT number when the country was in the EU VAT area on `date`, or as a
/// foreign document otherwise. Without a tax ID, the first identity document
/// with a known type is used. Returns `None` when nothing identifies the party.
pub fn resolve_party(party: &Party, date: NaiveDate) -> Option<RecordParty> {
    let id = resolve_id(party, date)?;
    Some(RecordParty {
        name: party.name.clone(),
        id,
    })
}

fn resolve_id(party: &Party, date: NaiveDate) -> Option<PartyId> {
    if let Some(tax_id) = &party.tax_id {
        let code = tax_id.code.trim();
        if tax_id.is_spanish() {
            return Some(PartyId::Nif(code.to_string()));
        }
        if !code.is_empty() {
            let other = if in_eu_vat_area(&tax_id.country, date) {
                OtherId {
                    country: Some(iso_country(&tax_id.country)),
                    id_type: IdType::EuVat,
                    id: format!("{}{code}", tax_id.country.to_uppercase()),
                }
            } else {
                OtherId {
                    country: non_empty(&tax_id.country).map(iso_country),
                    id_type: IdType::Foreign,
                    id: code.to_string(),
                }
            };
            return Some(PartyId::Other(other));
        }
    }

    party.identities.iter().find_map(|identity| {
        let id_type = identity
            .id_type
            .or_else(|| identity.key.map(|k| k.id_type()))?;
        Some(PartyId::Other(OtherId {
            country: identity.country.as_deref().and_then(non_empty).map(iso_country),
            id_type,
            id: identity.code.clone(),
        }))
    })
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s) }
}
