use thiserror::Error;

/// Errors that can occur while building, chaining or submitting VeriFactu records.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VerifactuError {
    /// Missing or invalid regulatory data. Fatal, never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Transport failure talking to the gateway.
    #[error("connection error: {0}")]
    Connection(String),

    /// The gateway answered with a server-side fault.
    #[error("server error: {0}")]
    Server(String),

    /// The gateway already holds this record.
    #[error("duplicate: {}", join_code(.code, .message))]
    Duplicate {
        code: Option<String>,
        message: String,
    },

    /// The gateway accepted the record but flagged anomalies.
    #[error("warning: {}", join_code(.code, .message))]
    Warning {
        code: Option<String>,
        message: String,
    },

    /// XML generation or parsing error.
    #[error("XML error: {0}")]
    Xml(String),
}

fn join_code(code: &Option<String>, message: &str) -> String {
    match code {
        Some(c) if !c.is_empty() => format!("{c}: {message}"),
        _ => message.to_string(),
    }
}

impl VerifactuError {
    /// Short machine-readable key for the error kind.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Connection(_) => "connection",
            Self::Server(_) => "server-error",
            Self::Duplicate { .. } => "duplicate",
            Self::Warning { .. } => "warning",
            Self::Xml(_) => "xml",
        }
    }

    /// Whether the caller may retry the operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Server(_))
    }
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "supplier.tax_id").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// AEAT validation rule or error code if applicable (e.g. "1109").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule ID.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error tied to an AEAT rule or error code.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}

impl From<Vec<ValidationError>> for VerifactuError {
    fn from(errors: Vec<ValidationError>) -> Self {
        let msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        VerifactuError::Validation(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_display_includes_code() {
        let err = VerifactuError::Duplicate {
            code: Some("3000".into()),
            message: "Registro de facturación duplicado".into(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate: 3000: Registro de facturación duplicado"
        );
        assert_eq!(err.key(), "duplicate");
        assert!(!err.is_retryable());
    }

    #[test]
    fn warning_display_without_code() {
        let err = VerifactuError::Warning {
            code: None,
            message: "AceptadoConErrores".into(),
        };
        assert_eq!(err.to_string(), "warning: AceptadoConErrores");
    }

    #[test]
    fn only_transport_errors_are_retryable() {
        assert!(VerifactuError::Connection("timeout".into()).is_retryable());
        assert!(VerifactuError::Server("fault".into()).is_retryable());
        assert!(!VerifactuError::Validation("x".into()).is_retryable());
        assert!(!VerifactuError::Xml("x".into()).is_retryable());
    }

    #[test]
    fn validation_errors_are_joined() {
        let err: VerifactuError = vec![
            ValidationError::new("code", "invoice code must not be empty"),
            ValidationError::with_rule("supplier.tax_id", "not spanish", "1109"),
        ]
        .into();
        assert_eq!(
            err.to_string(),
            "validation failed: code: invoice code must not be empty; [1109] supplier.tax_id: not spanish"
        );
    }
}
