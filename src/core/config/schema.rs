//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing: reserved namespace names and
//! primitive prefixes must be non-empty, and no primitive prefix may also be
//! listed as a reserved namespace. Primitive prefixes are reserved in the
//! registry, so a declared namespace can never claim one.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Namespace names reserved by the EDM itself.
pub const DEFAULT_RESERVED_NAMESPACES: [&str; 3] = ["Edm", "System", "Transient"];

/// Registry policy.
///
/// # Example
///
/// ```toml
/// [registry]
/// reserved_namespaces = ["Edm", "System", "Transient"]
/// allow_alias_shadowing = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Names that may not be declared as a namespace name or alias
    pub reserved_namespaces: Option<Vec<String>>,

    /// Allow an alias to equal another namespace's full name
    pub allow_alias_shadowing: Option<bool>,
}

impl RegistryConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(reserved) = &self.reserved_namespaces {
            if reserved.iter().any(|r| r.is_empty()) {
                return Err(ConfigError::InvalidValue(
                    "reserved namespace names cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Resolver policy.
///
/// # Example
///
/// ```toml
/// [resolver]
/// primitive_namespace_aliases = ["edm"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Extra prefixes that resolve like the `Edm` primitive namespace
    pub primitive_namespace_aliases: Option<Vec<String>>,
}

impl ResolverConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(aliases) = &self.primitive_namespace_aliases {
            for alias in aliases {
                if alias.is_empty() {
                    return Err(ConfigError::InvalidValue(
                        "primitive namespace alias cannot be empty".to_string(),
                    ));
                }
                if alias.contains('.') {
                    return Err(ConfigError::InvalidValue(format!(
                        "primitive namespace alias '{alias}' cannot contain '.'"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Top-level configuration file.
///
/// # Example
///
/// ```toml
/// [registry]
/// allow_alias_shadowing = false
///
/// [resolver]
/// primitive_namespace_aliases = ["edm"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EdmConfig {
    /// Registry settings
    pub registry: Option<RegistryConfig>,

    /// Resolver settings
    pub resolver: Option<ResolverConfig>,
}

impl EdmConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(registry) = &self.registry {
            registry.validate()?;
        }
        if let Some(resolver) = &self.resolver {
            resolver.validate()?;
        }

        let reserved = self
            .registry
            .as_ref()
            .and_then(|r| r.reserved_namespaces.as_ref());
        let aliases = self
            .resolver
            .as_ref()
            .and_then(|r| r.primitive_namespace_aliases.as_deref())
            .unwrap_or(&[]);
        for alias in aliases {
            let overlaps = match reserved {
                Some(names) => names.contains(alias),
                None => DEFAULT_RESERVED_NAMESPACES.contains(&alias.as_str()),
            };
            if overlaps {
                return Err(ConfigError::InvalidValue(format!(
                    "'{alias}' is both a reserved namespace and a primitive namespace alias"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [registry]
            reserved_namespaces = ["Edm"]
            allow_alias_shadowing = true

            [resolver]
            primitive_namespace_aliases = ["edm"]
        "#;

        let config: EdmConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());

        let registry = config.registry.unwrap();
        assert_eq!(registry.reserved_namespaces, Some(vec!["Edm".to_string()]));
        assert_eq!(registry.allow_alias_shadowing, Some(true));
    }

    #[test]
    fn empty_config_is_default() {
        let config: EdmConfig = toml::from_str("").unwrap();
        assert_eq!(config, EdmConfig::default());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<EdmConfig, _> = toml::from_str("[templates]\nengine = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn empty_reserved_name_invalid() {
        let config = EdmConfig {
            registry: Some(RegistryConfig {
                reserved_namespaces: Some(vec![String::new()]),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn dotted_primitive_alias_invalid() {
        let config = ResolverConfig {
            primitive_namespace_aliases: Some(vec!["Edm.X".to_string()]),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn primitive_alias_overlapping_reserved_invalid() {
        let config = EdmConfig {
            resolver: Some(ResolverConfig {
                primitive_namespace_aliases: Some(vec!["System".to_string()]),
            }),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        let config = EdmConfig {
            registry: Some(RegistryConfig {
                reserved_namespaces: Some(vec!["Edm".to_string(), "edm".to_string()]),
                ..Default::default()
            }),
            resolver: Some(ResolverConfig {
                primitive_namespace_aliases: Some(vec!["edm".to_string()]),
            }),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn primitive_alias_outside_custom_reserved_valid() {
        let config = EdmConfig {
            registry: Some(RegistryConfig {
                reserved_namespaces: Some(vec!["Internal".to_string()]),
                ..Default::default()
            }),
            resolver: Some(ResolverConfig {
                primitive_namespace_aliases: Some(vec!["System".to_string()]),
            }),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn serialize_roundtrip() {
        let config = EdmConfig {
            registry: Some(RegistryConfig {
                allow_alias_shadowing: Some(false),
                ..Default::default()
            }),
            resolver: None,
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: EdmConfig = toml::from_str(&text).unwrap();
        assert_eq!(config, parsed);
    }
}
