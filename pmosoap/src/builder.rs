//! Construction d'enveloppes SOAP sortantes

use crate::constants::{NAMESPACE_PDS, NAMESPACE_SHARED_OBJECTS};
use crate::{RequestEnvelope, SoapError, SoapVersion};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use serde::Serialize;
use std::io::Write;

const PREFIX: &str = "soap";

/// Sérialise une enveloppe de requête
///
/// Le payload est sérialisé avec quick-xml sous le nom de son type (ou de
/// son `#[serde(rename)]`) et devient l'unique enfant du Body. Les champs
/// de l'en-tête deviennent les enfants de `Header`.
///
/// L'enveloppe déclare `soap` (namespace de `version`), `ns`
/// (SharedObjects) et le namespace par défaut ProductDataService.
///
/// # Arguments
///
/// * `envelope` - Enveloppe à sérialiser
/// * `version` - Version SOAP de l'enveloppe
///
/// # Returns
///
/// Le document XML complet
pub fn build_request_envelope<H, T>(
    envelope: &RequestEnvelope<H, T>,
    version: SoapVersion,
) -> Result<String, SoapError>
where
    H: Serialize,
    T: Serialize,
{
    let mut writer = Writer::new(Vec::new());

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let envelope_name = format!("{PREFIX}:Envelope");
    let mut root = BytesStart::new(envelope_name.as_str());
    root.push_attribute((format!("xmlns:{PREFIX}").as_str(), version.namespace()));
    root.push_attribute(("xmlns:ns", NAMESPACE_SHARED_OBJECTS));
    root.push_attribute(("xmlns", NAMESPACE_PDS));
    writer.write_event(Event::Start(root))?;

    if let Some(header) = &envelope.header {
        let header_xml = quick_xml::se::to_string_with_root(&format!("{PREFIX}:Header"), header)?;
        writer.get_mut().write_all(header_xml.as_bytes())?;
    }

    let body_name = format!("{PREFIX}:Body");
    writer.write_event(Event::Start(BytesStart::new(body_name.as_str())))?;
    let payload = quick_xml::se::to_string(&envelope.body)?;
    writer.get_mut().write_all(payload.as_bytes())?;
    writer.write_event(Event::End(BytesEnd::new(body_name.as_str())))?;

    writer.write_event(Event::End(BytesEnd::new(envelope_name.as_str())))?;

    Ok(String::from_utf8(writer.into_inner())?)
}
