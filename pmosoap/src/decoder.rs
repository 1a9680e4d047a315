//! Décodage en flux du Body SOAP
//!
//! Le Body doit contenir exactement un élément (profil WS-I
//! document/literal wrapped). Cet élément est soit un `Fault` de
//! l'enveloppe SOAP, soit la réponse de l'opération, décodée dans la
//! destination fournie par l'appelant.

use crate::constants::{NAMESPACE_SOAP11, NAMESPACE_SOAP12};
use crate::{Body, Fault, NamespaceContext, SoapError, SoapVersion};
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesEnd, BytesRef, BytesStart, BytesText, Event};
use quick_xml::{NsReader, Writer};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

/// État du Body pendant le décodage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    /// Aucun élément lu pour l'instant
    AwaitingElement,

    /// Le Body s'est fermé sans contenir d'élément
    Empty,

    /// L'unique élément du Body a été décodé
    Consumed,
}

impl BodyState {
    /// Transition sur un élément ouvrant
    fn on_element(self) -> Result<Self, SoapError> {
        match self {
            BodyState::AwaitingElement => Ok(BodyState::Consumed),
            BodyState::Consumed | BodyState::Empty => Err(SoapError::MultipleBodyElements),
        }
    }

    /// Transition sur la fin du Body (ou du flux)
    fn finish(self) -> Self {
        match self {
            BodyState::AwaitingElement => BodyState::Empty,
            other => other,
        }
    }
}

impl<'c, C: DeserializeOwned> Body<'c, C> {
    /// Décode le contenu d'un élément `Body`
    ///
    /// Le lecteur doit être positionné juste après la balise ouvrante du
    /// Body. En cas de succès il est positionné après la balise fermante.
    ///
    /// La destination doit avoir été fixée avec [`Body::new`] : sinon
    /// l'appel échoue avec [`SoapError::InvalidDestination`] sans rien lire.
    ///
    /// La destination est remplacée en entier par la valeur décodée : un
    /// champ prérempli par l'appelant et absent du message reprend sa
    /// valeur serde par défaut. Un Fault laisse la destination intacte.
    ///
    /// En cas d'erreur, le Body est dans un état indéterminé et toute
    /// l'enveloppe doit être abandonnée.
    pub fn decode(
        &mut self,
        reader: &mut NsReader<&[u8]>,
        ctx: &NamespaceContext,
    ) -> Result<BodyState, SoapError> {
        if self.content.is_none() {
            return Err(SoapError::InvalidDestination);
        }

        let mut state = BodyState::AwaitingElement;

        loop {
            let (start, empty) = match reader.read_event()? {
                Event::Start(e) => (e, false),
                Event::Empty(e) => (e, true),
                Event::End(_) | Event::Eof => break,
                _ => continue,
            };

            state = state.on_element()?;

            let (namespace, local) = ctx.resolve_element(reader, start.name());
            let fault_version = match (namespace.as_deref(), local.as_str()) {
                (Some(NAMESPACE_SOAP11), "Fault") => Some(SoapVersion::V11),
                (Some(NAMESPACE_SOAP12), "Fault") => Some(SoapVersion::V12),
                _ => None,
            };

            match fault_version {
                Some(version) => {
                    debug!(soap_version=%version, "Decoding SOAP Fault");
                    self.content = None;
                    let fault = if empty {
                        Fault::default()
                    } else {
                        read_fault(reader, version)?
                    };
                    self.fault = Some(fault);
                }
                None => {
                    debug!(element=%local, namespace=?namespace, "Decoding SOAP body content");
                    self.content_type = Some(local);
                    let xml = capture_element(reader, &start, empty)?;
                    trace!(xml=%xml, "Normalized body element");
                    if let Some(content) = self.content.as_deref_mut() {
                        *content = quick_xml::de::from_str(&xml)?;
                    }
                }
            }
        }

        Ok(state.finish())
    }
}

/// Nom local d'un élément, sans préfixe
fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

/// Copie d'une balise ouvrante sous son nom local, sans déclarations `xmlns`
fn normalize_start(start: &BytesStart<'_>) -> Result<BytesStart<'static>, SoapError> {
    let mut normalized = BytesStart::new(local_name(start));
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::InvalidAttr)?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        normalized.push_attribute(attr);
    }
    Ok(normalized.into_owned())
}

/// Réécrit le sous-arbre d'un élément en retirant les préfixes
///
/// Le lecteur est positionné après la balise ouvrante `start` ; au retour
/// il est positionné après la balise fermante correspondante. Les
/// types de réponse se déclarent ainsi avec des noms simples quel que
/// soit le préfixe choisi par le serveur.
pub(crate) fn capture_element(
    reader: &mut NsReader<&[u8]>,
    start: &BytesStart<'_>,
    empty: bool,
) -> Result<String, SoapError> {
    let mut writer = Writer::new(Vec::new());

    if empty {
        writer.write_event(Event::Empty(normalize_start(start)?))?;
        return Ok(String::from_utf8(writer.into_inner())?);
    }

    writer.write_event(Event::Start(normalize_start(start)?))?;

    let mut depth = 1usize;
    let mut after_ref = false;
    // blancs en attente : indentation si un élément suit, texte si une référence suit
    let mut pending: Option<BytesText<'static>> = None;

    while depth > 0 {
        let event = reader.read_event()?;
        let is_ref = matches!(event, Event::GeneralRef(_));

        match event {
            Event::Start(e) => {
                pending = None;
                depth += 1;
                writer.write_event(Event::Start(normalize_start(&e)?))?;
            }
            Event::Empty(e) => {
                pending = None;
                writer.write_event(Event::Empty(normalize_start(&e)?))?;
            }
            Event::End(e) => {
                pending = None;
                depth -= 1;
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                writer.write_event(Event::End(BytesEnd::new(name)))?;
            }
            Event::Text(e) => {
                if after_ref || !e.iter().all(u8::is_ascii_whitespace) {
                    writer.write_event(Event::Text(e))?;
                } else {
                    pending = Some(e.into_owned());
                }
            }
            Event::CData(e) => writer.write_event(Event::CData(e))?,
            Event::GeneralRef(e) => {
                if let Some(text) = pending.take() {
                    writer.write_event(Event::Text(text))?;
                }
                writer.write_event(Event::GeneralRef(e))?;
            }
            Event::Eof => return Err(SoapError::UnexpectedEof(local_name(start))),
            Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {}
        }

        after_ref = is_ref;
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

/// Résout une référence d'entité (`&amp;`, `&#233;`, ...)
fn resolve_reference(reference: &BytesRef<'_>) -> Result<String, SoapError> {
    if let Some(ch) = reference.resolve_char_ref()? {
        return Ok(ch.to_string());
    }
    let name = reference.decode().map_err(quick_xml::Error::Encoding)?;
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| SoapError::UnknownEntity(name.into_owned()))
}

/// Lit le texte d'un élément jusqu'à sa balise fermante
///
/// Sans `only`, tout le texte des descendants est concaténé. Avec
/// `only`, seul le texte du premier descendant portant ce nom local est
/// retenu. Le résultat est débarrassé des espaces en bordure.
fn read_text(
    reader: &mut NsReader<&[u8]>,
    element: &str,
    only: Option<&str>,
) -> Result<String, SoapError> {
    let mut text = String::new();
    let mut depth = 0usize;
    // profondeur de l'élément `only` en cours de lecture
    let mut capturing: Option<usize> = None;
    let mut captured = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                if let Some(name) = only {
                    if !captured && capturing.is_none() && e.local_name().as_ref() == name.as_bytes() {
                        capturing = Some(depth);
                    }
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                if capturing == Some(depth) {
                    capturing = None;
                    captured = true;
                }
                depth -= 1;
            }
            Event::Text(e) => {
                if only.is_none() || capturing.is_some() {
                    text.push_str(&e.decode().map_err(quick_xml::Error::Encoding)?);
                }
            }
            Event::CData(e) => {
                if only.is_none() || capturing.is_some() {
                    text.push_str(&e.decode().map_err(quick_xml::Error::Encoding)?);
                }
            }
            Event::GeneralRef(e) => {
                if only.is_none() || capturing.is_some() {
                    text.push_str(&resolve_reference(&e)?);
                }
            }
            Event::Eof => return Err(SoapError::UnexpectedEof(element.to_string())),
            _ => {}
        }
    }

    Ok(text.trim().to_string())
}

/// Décode le contenu d'un élément `Fault`
///
/// Le lecteur est positionné après `<Fault>` ; au retour il est
/// positionné après `</Fault>`.
fn read_fault(reader: &mut NsReader<&[u8]>, version: SoapVersion) -> Result<Fault, SoapError> {
    let mut fault = Fault::default();

    loop {
        let (start, empty) = match reader.read_event()? {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(_) => break,
            Event::Eof => return Err(SoapError::UnexpectedEof("Fault".to_string())),
            _ => continue,
        };

        let name = local_name(&start);
        if empty {
            continue;
        }

        match (version, name.as_str()) {
            (SoapVersion::V11, "faultcode") => fault.code = read_text(reader, &name, None)?,
            (SoapVersion::V11, "faultstring") => fault.string = read_text(reader, &name, None)?,
            (SoapVersion::V11, "faultactor") => fault.actor = read_text(reader, &name, None)?,
            (SoapVersion::V11, "detail") => fault.detail = read_text(reader, &name, None)?,
            (SoapVersion::V12, "Code") => fault.code = read_text(reader, &name, Some("Value"))?,
            (SoapVersion::V12, "Reason") => fault.string = read_text(reader, &name, Some("Text"))?,
            (SoapVersion::V12, "Role") => fault.actor = read_text(reader, &name, None)?,
            (SoapVersion::V12, "Node") => {
                let node = read_text(reader, &name, None)?;
                if fault.actor.is_empty() {
                    fault.actor = node;
                }
            }
            (SoapVersion::V12, "Detail") => fault.detail = read_text(reader, &name, None)?,
            _ => {
                trace!(element=%name, "Skipping unknown Fault child");
                reader.read_to_end(start.name())?;
            }
        }
    }

    Ok(fault)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Ping {
        #[serde(default)]
        value: String,
    }

    /// Positionne le lecteur après `<Body>`
    fn reader_at_body(xml: &str) -> NsReader<&[u8]> {
        let mut reader = NsReader::from_str(xml);
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) if e.local_name().as_ref() == b"Body" => return reader,
                Event::Eof => panic!("no Body in {xml}"),
                _ => {}
            }
        }
    }

    #[test]
    fn test_state_machine() {
        assert_eq!(BodyState::AwaitingElement.finish(), BodyState::Empty);
        assert_eq!(
            BodyState::AwaitingElement.on_element().unwrap(),
            BodyState::Consumed
        );
        assert!(matches!(
            BodyState::Consumed.on_element(),
            Err(SoapError::MultipleBodyElements)
        ));
        assert_eq!(BodyState::Consumed.finish(), BodyState::Consumed);
    }

    #[test]
    fn test_capture_strips_prefixes_and_namespace_declarations() {
        let xml = r#"<soap:Body><tns:Ping xmlns:tns="urn:x" xmlns:ns="urn:y" id="1"><ns:value>a &amp; b</ns:value><ns:empty/></tns:Ping></soap:Body>"#;
        let mut reader = reader_at_body(xml);
        let start = match reader.read_event().unwrap() {
            Event::Start(e) => e,
            other => panic!("unexpected {other:?}"),
        };

        let captured = capture_element(&mut reader, &start, false).unwrap();
        assert_eq!(
            captured,
            r#"<Ping id="1"><value>a &amp; b</value><empty/></Ping>"#
        );

        // Le lecteur est juste après </tns:Ping>
        assert!(matches!(reader.read_event().unwrap(), Event::End(_)));
    }

    #[test]
    fn test_capture_keeps_spaces_around_references() {
        let xml = "<Body><Ping>\n  <value> &amp;</value>\n  <other>&amp; </other>\n</Ping></Body>";
        let mut reader = reader_at_body(xml);
        let start = match reader.read_event().unwrap() {
            Event::Start(e) => e,
            other => panic!("unexpected {other:?}"),
        };

        let captured = capture_element(&mut reader, &start, false).unwrap();
        assert_eq!(
            captured,
            "<Ping><value> &amp;</value><other>&amp; </other></Ping>"
        );
    }

    #[test]
    fn test_capture_reports_truncated_input() {
        let mut reader = reader_at_body("<Body><Ping><value>x</value>");
        let start = match reader.read_event().unwrap() {
            Event::Start(e) => e,
            other => panic!("unexpected {other:?}"),
        };

        let err = capture_element(&mut reader, &start, false).unwrap_err();
        assert!(err.is_stream_error());
    }

    #[test]
    fn test_decode_leaves_reader_after_body() {
        let xml = "<Envelope><Body><Ping><value>1</value></Ping></Body><After/></Envelope>";
        let mut reader = reader_at_body(xml);
        let mut ping = Ping::default();
        let mut body = Body::new(&mut ping);

        let state = body
            .decode(&mut reader, &NamespaceContext::promostandards())
            .unwrap();
        assert_eq!(state, BodyState::Consumed);

        match reader.read_event().unwrap() {
            Event::Empty(e) => assert_eq!(e.local_name().as_ref(), b"After"),
            other => panic!("unexpected {other:?}"),
        }
        drop(body);
        assert_eq!(ping.value, "1");
    }

    #[test]
    fn test_fault_entities_and_nested_detail() {
        let xml = r#"<soap:Body xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Fault><faultcode>soap:Client</faultcode><faultstring>Bad &lt;id&gt; &#233;</faultstring><detail><err><code>110</code></err></detail><extra><x/></extra></soap:Fault></soap:Body>"#;
        let mut reader = reader_at_body(xml);
        let mut ping = Ping::default();
        let mut body = Body::new(&mut ping);

        body.decode(&mut reader, &NamespaceContext::promostandards())
            .unwrap();

        let fault = body.fault.clone().unwrap();
        assert_eq!(fault.code, "soap:Client");
        assert_eq!(fault.string, "Bad <id> é");
        assert_eq!(fault.detail, "110");
        assert!(body.content.is_none());
        assert!(body.content_type.is_none());
    }

    #[test]
    fn test_soap12_fault() {
        let xml = r#"<env:Body xmlns:env="http://www.w3.org/2003/05/soap-envelope"><env:Fault><env:Code><env:Value>env:Sender</env:Value><env:Subcode><env:Value>m:Bad</env:Value></env:Subcode></env:Code><env:Reason><env:Text xml:lang="en">Invalid request</env:Text></env:Reason><env:Node>urn:node</env:Node></env:Fault></env:Body>"#;
        let mut reader = reader_at_body(xml);
        let mut ping = Ping::default();
        let mut body = Body::new(&mut ping);

        body.decode(&mut reader, &NamespaceContext::promostandards())
            .unwrap();

        let fault = body.fault.clone().unwrap();
        assert_eq!(fault.code, "env:Sender");
        assert_eq!(fault.string, "Invalid request");
        assert_eq!(fault.actor, "urn:node");
    }
}
