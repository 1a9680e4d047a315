//! Versions SOAP, namespaces et content-types

use crate::SoapError;
use std::fmt;
use std::str::FromStr;

pub const SOAP_VERSION_11: &str = "1.1";
pub const SOAP_VERSION_12: &str = "1.2";

/// Content-Type HTTP pour SOAP 1.1
pub const SOAP_CONTENT_TYPE_11: &str = r#"text/xml; charset="utf-8""#;
/// Content-Type HTTP pour SOAP 1.2
pub const SOAP_CONTENT_TYPE_12: &str = r#"application/soap+xml; charset="utf-8""#;

pub const NAMESPACE_SOAP11: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const NAMESPACE_SOAP12: &str = "http://www.w3.org/2003/05/soap-envelope";

/// PromoStandards Product Data Service 1.0.0
pub const NAMESPACE_PDS: &str = "http://www.promostandards.org/WSDL/ProductDataService/1.0.0/";
/// PromoStandards Product Data Service 1.0.0, objets partagés
pub const NAMESPACE_SHARED_OBJECTS: &str =
    "http://www.promostandards.org/WSDL/ProductDataService/1.0.0/SharedObjects/";

/// Version du protocole SOAP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SoapVersion {
    #[default]
    V11,
    V12,
}

impl SoapVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoapVersion::V11 => SOAP_VERSION_11,
            SoapVersion::V12 => SOAP_VERSION_12,
        }
    }

    /// Content-Type à utiliser par le transport
    pub fn content_type(&self) -> &'static str {
        match self {
            SoapVersion::V11 => SOAP_CONTENT_TYPE_11,
            SoapVersion::V12 => SOAP_CONTENT_TYPE_12,
        }
    }

    /// Namespace de l'enveloppe
    pub fn namespace(&self) -> &'static str {
        match self {
            SoapVersion::V11 => NAMESPACE_SOAP11,
            SoapVersion::V12 => NAMESPACE_SOAP12,
        }
    }

    /// Retrouve la version à partir du namespace de l'enveloppe
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            NAMESPACE_SOAP11 => Some(SoapVersion::V11),
            NAMESPACE_SOAP12 => Some(SoapVersion::V12),
            _ => None,
        }
    }
}

impl fmt::Display for SoapVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoapVersion {
    type Err = SoapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            SOAP_VERSION_11 => Ok(SoapVersion::V11),
            SOAP_VERSION_12 => Ok(SoapVersion::V12),
            other => Err(SoapError::UnknownVersion(other.to_string())),
        }
    }
}
