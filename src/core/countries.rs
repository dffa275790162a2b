//! EU VAT area membership by date.
//!
//! Tax country prefixes follow the VAT convention, so Greece is "EL" while
//! the AEAT census expects the ISO code "GR".

use chrono::NaiveDate;

struct Membership {
    prefix: &'static str,
    joined: (i32, u32, u32),
    left: Option<(i32, u32, u32)>,
}

const fn member(prefix: &'static str, joined: (i32, u32, u32)) -> Membership {
    Membership {
        prefix,
        joined,
        left: None,
    }
}

/// Member states since the VAT area started in 1993, plus later accessions.
/// Sorted by prefix.
static EU_VAT_AREA: &[Membership] = &[
    member("AT", (1995, 1, 1)),
    member("BE", (1993, 1, 1)),
    member("BG", (2007, 1, 1)),
    member("CY", (2004, 5, 1)),
    member("CZ", (2004, 5, 1)),
    member("DE", (1993, 1, 1)),
    member("DK", (1993, 1, 1)),
    member("EE", (2004, 5, 1)),
    member("EL", (1993, 1, 1)),
    member("ES", (1993, 1, 1)),
    member("FI", (1995, 1, 1)),
    member("FR", (1993, 1, 1)),
    Membership {
        prefix: "GB",
        joined: (1993, 1, 1),
        left: Some((2020, 12, 31)),
    },
    member("HR", (2013, 7, 1)),
    member("HU", (2004, 5, 1)),
    member("IE", (1993, 1, 1)),
    member("IT", (1993, 1, 1)),
    member("LT", (2004, 5, 1)),
    member("LU", (1993, 1, 1)),
    member("LV", (2004, 5, 1)),
    member("MT", (2004, 5, 1)),
    member("NL", (1993, 1, 1)),
    member("PL", (2004, 5, 1)),
    member("PT", (1993, 1, 1)),
    member("RO", (2007, 1, 1)),
    member("SE", (1995, 1, 1)),
    member("SI", (2004, 5, 1)),
    member("SK", (2004, 5, 1)),
];

fn ymd((y, m, d): (i32, u32, u32)) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Check whether the tax country `prefix` belonged to the EU VAT area on `date`.
///
/// Accepts both "EL" and "GR" for Greece.
pub fn in_eu_vat_area(prefix: &str, date: NaiveDate) -> bool {
    let prefix = prefix.to_ascii_uppercase();
    let prefix = if prefix == "GR" { "EL" } else { prefix.as_str() };

    let Ok(idx) = EU_VAT_AREA.binary_search_by(|m| m.prefix.cmp(prefix)) else {
        return false;
    };
    let membership = &EU_VAT_AREA[idx];

    let joined = ymd(membership.joined).is_some_and(|j| date >= j);
    let still_member = match membership.left.and_then(ymd) {
        Some(left) => date <= left,
        None => true,
    };
    joined && still_member
}

/// ISO 3166-1 country code for a tax country prefix (`EL` becomes `GR`).
pub fn iso_country(prefix: &str) -> String {
    let upper = prefix.to_ascii_uppercase();
    if upper == "EL" { "GR".to_string() } else { upper }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn current_members() {
        let today = date(2024, 11, 11);
        assert!(in_eu_vat_area("DE", today));
        assert!(in_eu_vat_area("FR", today));
        assert!(in_eu_vat_area("ES", today));
        assert!(in_eu_vat_area("EL", today));
        assert!(in_eu_vat_area("GR", today));
        assert!(in_eu_vat_area("pt", today));
    }

    #[test]
    fn non_members() {
        let today = date(2024, 11, 11);
        assert!(!in_eu_vat_area("US", today));
        assert!(!in_eu_vat_area("CH", today));
        assert!(!in_eu_vat_area("NO", today));
        assert!(!in_eu_vat_area("", today));
    }

    #[test]
    fn united_kingdom_left_after_2020() {
        assert!(in_eu_vat_area("GB", date(2020, 12, 31)));
        assert!(!in_eu_vat_area("GB", date(2021, 1, 1)));
    }

    #[test]
    fn croatia_joined_in_2013() {
        assert!(!in_eu_vat_area("HR", date(2013, 6, 30)));
        assert!(in_eu_vat_area("HR", date(2013, 7, 1)));
    }

    #[test]
    fn greece_maps_to_iso() {
        assert_eq!(iso_country("EL"), "GR");
        assert_eq!(iso_country("de"), "DE");
    }

    #[test]
    fn list_is_sorted() {
        for window in EU_VAT_AREA.windows(2) {
            assert!(
                window[0].prefix < window[1].prefix,
                "prefixes not sorted: {} >= {}",
                window[0].prefix,
                window[1].prefix
            );
        }
    }
}
