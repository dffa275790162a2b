//! `DescripcionOperacion` for registrations.

use serde::{Deserialize, Serialize};

use super::error::VerifactuError;
use super::types::{Invoice, NoteKey};

/// Maximum length of `DescripcionOperacion`.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Used when neither notes nor line names give any text.
pub const PLACEHOLDER_DESCRIPTION: &str = "Sin descripción";

/// How to obtain the operation description when no general note exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionPolicy {
    /// Join line item names, falling back to a placeholder.
    #[default]
    Synthesize,
    /// Fail with a validation error.
    RequireNote,
}

/// Resolve `DescripcionOperacion` for an invoice.
///
/// The first non-empty general note wins. Otherwise, under
/// [`DescriptionPolicy::Synthesize`], line names are joined with ", " and
/// closed with "." while they fit in [`MAX_DESCRIPTION_LEN`]; a name that would
/// overflow ends the list with "...".
pub fn resolve_description(
    invoice: &Invoice,
    policy: DescriptionPolicy,
) -> Result<String, VerifactuError> {
    let note = invoice
        .notes
        .iter()
        .filter(|n| n.key == NoteKey::General)
        .map(|n| n.text.trim())
        .find(|t| !t.is_empty());
    if let Some(text) = note {
        return Ok(truncate(text, MAX_DESCRIPTION_LEN));
    }

    match policy {
        DescriptionPolicy::RequireNote => Err(VerifactuError::Validation(
            "notes: missing note with key 'general'".into(),
        )),
        DescriptionPolicy::Synthesize => Ok(synthesize(
            invoice.lines.iter().map(|l| l.name.as_str()),
        )),
    }
}

fn synthesize<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    let mut truncated = false;

    for name in names.map(str::trim).filter(|n| !n.is_empty()) {
        let sep = if out.is_empty() { 0 } else { 2 };
        // Keep room for the closing "." or "...".
        if out.chars().count() + sep + name.chars().count() + 3 > MAX_DESCRIPTION_LEN {
            truncated = true;
            break;
        }
        if !out.is_empty() {
            out.push_str(", ");
        }
        out.push_str(name);
    }

    if out.is_empty() {
        if truncated {
            // A single name longer than the limit.
            return String::from("...");
        }
        return PLACEHOLDER_DESCRIPTION.to_string();
    }

    out.push_str(if truncated { "..." } else { "." });
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}
