//! SOAP Faults

use crate::SoapVersion;
use std::fmt;
use xmltree::{Element, XMLNode};

/// Erreur SOAP (Fault)
///
/// Les champs suivent la forme SOAP 1.1 (`faultcode`, `faultstring`,
/// `faultactor`, `detail`). Un Fault SOAP 1.2 est ramené à cette forme :
/// `Code/Value`, `Reason/Text`, `Role` et `Detail`.
///
/// Un champ absent du message vaut la chaîne vide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fault {
    /// Code d'erreur (ex: "soap:Server")
    pub code: String,

    /// Message lisible, utilisé comme texte de l'erreur
    pub string: String,

    /// Acteur à l'origine du fault
    pub actor: String,

    /// Détails, texte concaténé du contenu de `detail`
    pub detail: String,
}

impl Fault {
    pub fn new(code: impl Into<String>, string: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            string: string.into(),
            ..Default::default()
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Code sans son préfixe (ex: "soap:Server" → "Server")
    pub fn local_code(&self) -> &str {
        self.code
            .rsplit_once(':')
            .map_or(self.code.as_str(), |(_, local)| local)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string)
    }
}

impl std::error::Error for Fault {}

fn text_element(name: &str, text: &str) -> Element {
    let mut elem = Element::new(name);
    elem.children.push(XMLNode::Text(text.to_string()));
    elem
}

/// Construit l'élément `Fault` sous le préfixe `prefix`
///
/// Les champs vides ne sont pas émis.
pub(crate) fn fault_element(fault: &Fault, version: SoapVersion, prefix: &str) -> Element {
    let mut elem = Element::new(&format!("{prefix}:Fault"));

    match version {
        SoapVersion::V11 => {
            let fields = [
                ("faultcode", &fault.code),
                ("faultstring", &fault.string),
                ("faultactor", &fault.actor),
                ("detail", &fault.detail),
            ];
            for (name, value) in fields {
                if !value.is_empty() {
                    elem.children.push(XMLNode::Element(text_element(name, value)));
                }
            }
        }
        SoapVersion::V12 => {
            if !fault.code.is_empty() {
                let mut code = Element::new(&format!("{prefix}:Code"));
                code.children.push(XMLNode::Element(text_element(
                    &format!("{prefix}:Value"),
                    &fault.code,
                )));
                elem.children.push(XMLNode::Element(code));
            }
            if !fault.string.is_empty() {
                let mut reason = Element::new(&format!("{prefix}:Reason"));
                let mut text = text_element(&format!("{prefix}:Text"), &fault.string);
                text.attributes
                    .insert("xml:lang".to_string(), "en".to_string());
                reason.children.push(XMLNode::Element(text));
                elem.children.push(XMLNode::Element(reason));
            }
            if !fault.actor.is_empty() {
                elem.children.push(XMLNode::Element(text_element(
                    &format!("{prefix}:Role"),
                    &fault.actor,
                )));
            }
            if !fault.detail.is_empty() {
                elem.children.push(XMLNode::Element(text_element(
                    &format!("{prefix}:Detail"),
                    &fault.detail,
                )));
            }
        }
    }

    elem
}

/// Construit une enveloppe SOAP complète contenant un Fault
///
/// # Arguments
///
/// * `fault` - Le fault à sérialiser
/// * `version` - Version SOAP de l'enveloppe
///
/// # Returns
///
/// XML SOAP Fault formaté
pub fn build_soap_fault(fault: &Fault, version: SoapVersion) -> Result<String, crate::SoapError> {
    let prefix = "soap";

    let mut body = Element::new(&format!("{prefix}:Body"));
    body.children
        .push(XMLNode::Element(fault_element(fault, version, prefix)));

    let mut envelope = Element::new(&format!("{prefix}:Envelope"));
    envelope
        .attributes
        .insert(format!("xmlns:{prefix}"), version.namespace().to_string());
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(true)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8(buf)?)
}

/// Codes de fault SOAP standards
pub mod fault_codes {
    /// SOAP 1.1 : namespace de l'enveloppe invalide
    pub const VERSION_MISMATCH: &str = "VersionMismatch";

    /// SOAP 1.1 : en-tête `mustUnderstand` non compris
    pub const MUST_UNDERSTAND: &str = "MustUnderstand";

    /// SOAP 1.1 : message mal formé ou incomplet
    pub const CLIENT: &str = "Client";

    /// SOAP 1.1 : erreur de traitement côté serveur
    pub const SERVER: &str = "Server";

    /// SOAP 1.2 : équivalent de `Client`
    pub const SENDER: &str = "Sender";

    /// SOAP 1.2 : équivalent de `Server`
    pub const RECEIVER: &str = "Receiver";

    /// SOAP 1.2 : encodage des données non supporté
    pub const DATA_ENCODING_UNKNOWN: &str = "DataEncodingUnknown";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_fault_error_text_is_string_field() {
        let fault = Fault::new("soap:Server", "Internal error").with_actor("urn:pds");
        assert_eq!(fault.to_string(), "Internal error");

        let err: Box<dyn Error> = Box::new(fault);
        assert_eq!(err.to_string(), "Internal error");
    }

    #[test]
    fn test_local_code() {
        assert_eq!(Fault::new("soap:Server", "").local_code(), fault_codes::SERVER);
        assert_eq!(Fault::new("Client", "").local_code(), fault_codes::CLIENT);
    }

    #[test]
    fn test_build_simple_fault() {
        let xml = build_soap_fault(&Fault::new("Server", "Internal error"), SoapVersion::V11)
            .unwrap();

        assert!(xml.contains("<soap:Fault>"));
        assert!(xml.contains("<faultcode>Server</faultcode>"));
        assert!(xml.contains("<faultstring>Internal error</faultstring>"));
        assert!(!xml.contains("faultactor"));
        assert!(!xml.contains("<detail"));
        assert!(xml.contains(r#"xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/""#));
    }

    #[test]
    fn test_build_soap12_fault() {
        let fault = Fault::new("soap:Receiver", "Boom").with_detail("stack");
        let xml = build_soap_fault(&fault, SoapVersion::V12).unwrap();

        assert!(xml.contains("<soap:Value>soap:Receiver</soap:Value>"));
        assert!(xml.contains("Boom</soap:Text>"));
        assert!(xml.contains("<soap:Detail>stack</soap:Detail>"));
        assert!(xml.contains(r#"xmlns:soap="http://www.w3.org/2003/05/soap-envelope""#));
    }
}
