use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::codes::IssuerRole;
use super::description::DescriptionPolicy;
use super::error::{ValidationError, VerifactuError};
use super::qr::Environment;
use super::record::Software;
use super::registry::ChainMode;
use super::timestamp::DEFAULT_TIMEZONE;

/// A taxpayer named in the request header (`ObligadoEmision`, `Representante`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxpayer {
    /// `NombreRazon`.
    pub name: String,
    /// `NIF`.
    pub nif: String,
}

impl Taxpayer {
    pub fn new(name: impl Into<String>, nif: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nif: nif.into(),
        }
    }
}

/// Client configuration.
///
/// Deserializes from JSON; every field but `software` has a default:
///
/// ```
/// let config = verifactu::Config::from_json(r#"{
///     "software": {
///         "legal_name": "Invopop S.L.",
///         "tax_code": "B85905495",
///         "system_name": "Invopop",
///         "system_id": "IP",
///         "version": "1.0",
///         "installation_number": "001"
///     },
///     "environment": "production",
///     "timezone": "Atlantic/Canary"
/// }"#).unwrap();
/// assert_eq!(config.environment, verifactu::Environment::Production);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// `SistemaInformatico` stamped on every record.
    pub software: Software,
    #[serde(default)]
    pub issuer_role: IssuerRole,
    #[serde(default)]
    pub environment: Environment,
    /// `Representante` for submissions made on behalf of the issuer.
    #[serde(default)]
    pub representative: Option<Taxpayer>,
    #[serde(default)]
    pub chain_mode: ChainMode,
    #[serde(default)]
    pub description_policy: DescriptionPolicy,
    /// Civil timezone of record timestamps.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
}

fn default_timezone() -> Tz {
    DEFAULT_TIMEZONE
}

impl Config {
    pub fn builder(software: Software) -> ConfigBuilder {
        ConfigBuilder::new(software)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, VerifactuError> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| VerifactuError::Validation(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the software descriptor.
    pub fn validate(&self) -> Result<(), VerifactuError> {
        let errors = validate_software(&self.software);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }
}

fn validate_software(software: &Software) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let required = [
        ("software.legal_name", &software.legal_name),
        ("software.tax_code", &software.tax_code),
        ("software.system_name", &software.system_name),
        ("software.system_id", &software.system_id),
        ("software.version", &software.version),
        ("software.installation_number", &software.installation_number),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }
    if software.system_id.chars().count() > 2 {
        errors.push(ValidationError::new(
            "software.system_id",
            "must be at most 2 characters",
        ));
    }
    errors
}

/// Builder for [`Config`].
pub struct ConfigBuilder {
    software: Software,
    issuer_role: IssuerRole,
    environment: Environment,
    representative: Option<Taxpayer>,
    chain_mode: ChainMode,
    description_policy: DescriptionPolicy,
    timezone: Tz,
}

impl ConfigBuilder {
    pub fn new(software: Software) -> Self {
        Self {
            software,
            issuer_role: IssuerRole::default(),
            environment: Environment::default(),
            representative: None,
            chain_mode: ChainMode::default(),
            description_policy: DescriptionPolicy::default(),
            timezone: DEFAULT_TIMEZONE,
        }
    }

    pub fn issuer_role(mut self, role: IssuerRole) -> Self {
        self.issuer_role = role;
        self
    }

    pub fn environment(mut self, env: Environment) -> Self {
        self.environment = env;
        self
    }

    pub fn representative(mut self, representative: Taxpayer) -> Self {
        self.representative = Some(representative);
        self
    }

    pub fn chain_mode(mut self, mode: ChainMode) -> Self {
        self.chain_mode = mode;
        self
    }

    pub fn description_policy(mut self, policy: DescriptionPolicy) -> Self {
        self.description_policy = policy;
        self
    }

    pub fn timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    pub fn build(self) -> Result<Config, VerifactuError> {
        let config = Config {
            software: self.software,
            issuer_role: self.issuer_role,
            environment: self.environment,
            representative: self.representative,
            chain_mode: self.chain_mode,
            description_policy: self.description_policy,
            timezone: self.timezone,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn builder_defaults() {
        let config = Config::builder(software()).build().unwrap();
        assert_eq!(config.issuer_role, IssuerRole::Supplier);
        assert_eq!(config.environment, Environment::Sandbox);
        assert_eq!(config.chain_mode, ChainMode::Shared);
        assert_eq!(config.description_policy, DescriptionPolicy::Synthesize);
        assert_eq!(config.timezone, chrono_tz::Europe::Madrid);
        assert!(config.representative.is_none());
    }

    #[test]
    fn builder_rejects_incomplete_software() {
        let mut sw = software();
        sw.system_id = "IPX".into();
        sw.version = String::new();
        let err = Config::builder(sw).build().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("software.system_id"));
        assert!(msg.contains("software.version"));
    }

    #[test]
    fn json_defaults_and_overrides() {
        let json = serde_json::json!({
            "software": software(),
            "issuer_role": "third_party",
            "chain_mode": "per_record_kind",
            "description_policy": "require_note",
            "representative": { "name": "Gestoría S.L.", "nif": "B12345678" }
        })
        .to_string();
        let config = Config::from_json(&json).unwrap();
        assert_eq!(config.issuer_role, IssuerRole::ThirdParty);
        assert_eq!(config.chain_mode, ChainMode::PerRecordKind);
        assert_eq!(config.description_policy, DescriptionPolicy::RequireNote);
        assert_eq!(config.environment, Environment::Sandbox);
        assert_eq!(config.timezone, chrono_tz::Europe::Madrid);
        assert_eq!(config.representative.unwrap().nif, "B12345678");
    }

    #[test]
    fn json_errors_are_validation_errors() {
        let err = Config::from_json("{}").unwrap_err();
        assert!(matches!(err, VerifactuError::Validation(_)));
    }
}
