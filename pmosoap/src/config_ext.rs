//! Extension pour intégrer la configuration SOAP dans pmoconfig
//!
//! Ce module fournit le trait `SoapConfigExt` qui ajoute à
//! `pmoconfig::Config` les réglages du décodeur : version SOAP, namespace
//! par défaut et alias de préfixes.

use crate::constants::NAMESPACE_PDS;
use crate::{NamespaceContext, SoapVersion};
use anyhow::{Result, anyhow};
use pmoconfig::Config;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Trait d'extension pour ajouter la configuration SOAP à pmoconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use pmoconfig::get_config;
/// use pmosoap::SoapConfigExt;
///
/// let config = get_config();
/// let ctx = config.get_soap_namespace_context()?;
/// let version = config.get_soap_version()?;
/// ```
pub trait SoapConfigExt {
    /// Version SOAP utilisée pour les requêtes (défaut: 1.1)
    fn get_soap_version(&self) -> Result<SoapVersion>;

    /// Définit la version SOAP
    fn set_soap_version(&self, version: SoapVersion) -> Result<()>;

    /// Namespace appliqué aux éléments sans préfixe ni `xmlns`
    fn get_soap_default_namespace(&self) -> Result<String>;

    /// Définit le namespace par défaut
    fn set_soap_default_namespace(&self, namespace: String) -> Result<()>;

    /// Table préfixe → namespace pour les préfixes non déclarés
    fn get_soap_aliases(&self) -> Result<BTreeMap<String, String>>;

    /// Ajoute ou remplace un alias
    fn set_soap_alias(&self, prefix: &str, namespace: String) -> Result<()>;

    /// Contexte de décodage construit à partir de la configuration
    fn get_soap_namespace_context(&self) -> Result<NamespaceContext>;
}

impl SoapConfigExt for Config {
    fn get_soap_version(&self) -> Result<SoapVersion> {
        match self.get_value(&["soap", "version"]) {
            Ok(Value::String(s)) => Ok(s.parse()?),
            // `version: 1.2` sans guillemets est lu comme un nombre
            Ok(Value::Number(n)) => Ok(n.to_string().parse()?),
            _ => Ok(SoapVersion::default()),
        }
    }

    fn set_soap_version(&self, version: SoapVersion) -> Result<()> {
        self.set_value(
            &["soap", "version"],
            Value::String(version.as_str().to_string()),
        )
    }

    fn get_soap_default_namespace(&self) -> Result<String> {
        match self.get_value(&["soap", "default_namespace"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => Ok(NAMESPACE_PDS.to_string()),
        }
    }

    fn set_soap_default_namespace(&self, namespace: String) -> Result<()> {
        self.set_value(&["soap", "default_namespace"], Value::String(namespace))
    }

    fn get_soap_aliases(&self) -> Result<BTreeMap<String, String>> {
        let aliases = match self.get_value(&["soap", "aliases"]) {
            Ok(Value::Mapping(map)) => map,
            Ok(Value::Null) | Err(_) => Mapping::new(),
            Ok(other) => return Err(anyhow!("soap.aliases must be a mapping, got {other:?}")),
        };

        aliases
            .into_iter()
            .map(|(prefix, namespace)| match (prefix, namespace) {
                (Value::String(prefix), Value::String(namespace)) => Ok((prefix, namespace)),
                (prefix, _) => Err(anyhow!("Invalid namespace alias {prefix:?}")),
            })
            .collect()
    }

    fn set_soap_alias(&self, prefix: &str, namespace: String) -> Result<()> {
        self.set_value(&["soap", "aliases", prefix], Value::String(namespace))
    }

    fn get_soap_namespace_context(&self) -> Result<NamespaceContext> {
        let ctx = self
            .get_soap_aliases()?
            .into_iter()
            .fold(
                NamespaceContext::new().with_default_namespace(self.get_soap_default_namespace()?),
                |ctx, (prefix, namespace)| ctx.with_alias(prefix, namespace),
            );
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NAMESPACE_SOAP11;

    #[test]
    fn test_defaults_match_promostandards_context() {
        let config = Config::from_yaml_str("").unwrap();
        assert_eq!(config.get_soap_version().unwrap(), SoapVersion::V11);
        assert_eq!(
            config.get_soap_namespace_context().unwrap(),
            NamespaceContext::promostandards()
        );
    }

    #[test]
    fn test_unquoted_version() {
        let config = Config::from_yaml_str("soap:\n  version: 1.2\n").unwrap();
        assert_eq!(config.get_soap_version().unwrap(), SoapVersion::V12);
    }

    #[test]
    fn test_invalid_version() {
        let config = Config::from_yaml_str("soap:\n  version: \"3\"\n").unwrap();
        assert!(config.get_soap_version().is_err());
    }

    #[test]
    fn test_vendor_alias() {
        let config = Config::from_yaml_str("").unwrap();
        config
            .set_soap_alias("ns2", "urn:vendor".to_string())
            .unwrap();
        config.set_soap_version(SoapVersion::V12).unwrap();

        let ctx = config.get_soap_namespace_context().unwrap();
        assert_eq!(ctx.alias("ns2"), Some("urn:vendor"));
        assert_eq!(ctx.alias("soap"), Some(NAMESPACE_SOAP11));
        assert_eq!(config.get_soap_version().unwrap(), SoapVersion::V12);
    }

    #[test]
    fn test_aliases_must_be_a_mapping() {
        let config = Config::from_yaml_str("soap:\n  aliases: [a, b]\n").unwrap();
        assert!(config.get_soap_aliases().is_err());
    }
}
