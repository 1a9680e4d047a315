//! Décodage des enveloppes SOAP reçues

use crate::decoder::capture_element;
use crate::{Body, BodyOutcome, Envelope, NamespaceContext, SoapError, SoapVersion};
use quick_xml::NsReader;
use quick_xml::events::Event;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, trace};

/// Décode une enveloppe SOAP dans la destination `content`
///
/// Utilise le contexte de namespaces PromoStandards.
///
/// # Example
///
/// ```
/// use pmosoap::decode_envelope;
/// use serde::de::IgnoredAny;
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, Deserialize)]
/// struct PingResponse {
///     status: String,
/// }
///
/// let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
///   <soap:Body><PingResponse><status>ok</status></PingResponse></soap:Body>
/// </soap:Envelope>"#;
///
/// let mut response = PingResponse::default();
/// let envelope = decode_envelope::<IgnoredAny, _>(xml.as_bytes(), &mut response)?;
/// assert_eq!(envelope.body.content_type.as_deref(), Some("PingResponse"));
/// drop(envelope);
/// assert_eq!(response.status, "ok");
/// # Ok::<(), pmosoap::SoapError>(())
/// ```
pub fn decode_envelope<'c, H, C>(xml: &[u8], content: &'c mut C) -> Result<Envelope<'c, H, C>, SoapError>
where
    H: DeserializeOwned,
    C: DeserializeOwned,
{
    decode_envelope_with(xml, Body::new(content), &NamespaceContext::promostandards())
}

/// Décode une enveloppe SOAP avec un Body et un contexte explicites
///
/// Un `body` sans destination échoue avec
/// [`SoapError::InvalidDestination`] avant toute lecture.
pub fn decode_envelope_with<'c, H, C>(
    xml: &[u8],
    mut body: Body<'c, C>,
    ctx: &NamespaceContext,
) -> Result<Envelope<'c, H, C>, SoapError>
where
    H: DeserializeOwned,
    C: DeserializeOwned,
{
    if body.content.is_none() {
        return Err(SoapError::InvalidDestination);
    }

    let mut reader = NsReader::from_reader(xml);

    let version = loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let (namespace, local) = ctx.resolve_element(&reader, e.name());
                match namespace.as_deref().and_then(SoapVersion::from_namespace) {
                    Some(version) if local == "Envelope" => break version,
                    _ => return Err(SoapError::MissingEnvelope),
                }
            }
            Event::Empty(_) | Event::End(_) | Event::Eof => return Err(SoapError::MissingEnvelope),
            _ => {}
        }
    };
    debug!(soap_version=%version, "Decoding SOAP envelope");

    let mut header = None;
    let mut body_seen = false;

    loop {
        let (start, empty) = match reader.read_event()? {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(_) => break,
            Event::Eof => return Err(SoapError::UnexpectedEof("Envelope".to_string())),
            _ => continue,
        };

        let (namespace, local) = ctx.resolve_element(&reader, start.name());
        let is_soap = namespace
            .as_deref()
            .and_then(SoapVersion::from_namespace)
            .is_some();

        match (is_soap, local.as_str()) {
            (true, "Header") => {
                if !empty {
                    let xml = capture_element(&mut reader, &start, false)?;
                    header = Some(quick_xml::de::from_str(&xml)?);
                }
            }
            (true, "Body") => {
                if body_seen {
                    return Err(SoapError::MultipleBodyElements);
                }
                body_seen = true;
                if !empty {
                    body.decode(&mut reader, ctx)?;
                }
            }
            _ => {
                trace!(element=%local, "Skipping unknown envelope child");
                if !empty {
                    reader.read_to_end(start.name())?;
                }
            }
        }
    }

    if !body_seen {
        return Err(SoapError::MissingBody);
    }

    Ok(Envelope {
        version,
        header,
        body,
    })
}

/// Décode une réponse dans une destination neuve de type `C`
///
/// L'en-tête est ignoré.
pub fn decode_response<C>(xml: &[u8]) -> Result<BodyOutcome<C>, SoapError>
where
    C: DeserializeOwned + Default,
{
    decode_response_with(xml, &NamespaceContext::promostandards())
}

/// Variante de [`decode_response`] avec un contexte explicite
pub fn decode_response_with<C>(xml: &[u8], ctx: &NamespaceContext) -> Result<BodyOutcome<C>, SoapError>
where
    C: DeserializeOwned + Default,
{
    let mut content = C::default();

    let (fault, element) = {
        let envelope: Envelope<'_, IgnoredAny, C> =
            decode_envelope_with(xml, Body::new(&mut content), ctx)?;
        (envelope.body.fault, envelope.body.content_type)
    };

    Ok(match (fault, element) {
        (Some(fault), _) => BodyOutcome::Fault(fault),
        (None, Some(element)) => BodyOutcome::Payload { element, content },
        (None, None) => BodyOutcome::Empty,
    })
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

    #[test]
    fn test_missing_envelope() {
        let err = decode_response::<Ping>(b"<Body><Ping/></Body>").unwrap_err();
        assert!(matches!(err, SoapError::MissingEnvelope));

        let err = decode_response::<Ping>(b"").unwrap_err();
        assert!(matches!(err, SoapError::MissingEnvelope));
    }

    #[test]
    fn test_missing_body() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Header/></s:Envelope>"#;
        let err = decode_response::<Ping>(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, SoapError::MissingBody));
    }

    #[test]
    fn test_self_closing_body_is_empty() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body/></s:Envelope>"#;
        let outcome = decode_response::<Ping>(xml.as_bytes()).unwrap();
        assert_eq!(outcome, BodyOutcome::Empty);
    }

    #[test]
    fn test_soap12_envelope_version() {
        let xml = r#"<e:Envelope xmlns:e="http://www.w3.org/2003/05/soap-envelope"><e:Body><Ping><value>v</value></Ping></e:Body></e:Envelope>"#;
        let mut ping = Ping::default();
        let envelope: Envelope<'_, IgnoredAny, Ping> =
            decode_envelope(xml.as_bytes(), &mut ping).unwrap();
        assert_eq!(envelope.version, SoapVersion::V12);
        drop(envelope);
        assert_eq!(ping.value, "v");
    }

    #[test]
    fn test_truncated_envelope() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body></s:Body>"#;
        let err = decode_response::<Ping>(xml.as_bytes()).unwrap_err();
        assert!(err.is_stream_error());
    }
}
