//! Erreurs de décodage et de construction SOAP

/// Erreur SOAP
///
/// Un SOAP Fault reçu du serveur n'est pas une `SoapError` : c'est un
/// résultat de décodage valide, exposé via [`crate::Fault`].
#[derive(Debug, thiserror::Error)]
pub enum SoapError {
    #[error("Content must be set to a destination before decoding the SOAP body")]
    InvalidDestination,

    #[error(
        "Found multiple elements inside SOAP body; not wrapped-document/literal WS-I compliant"
    )]
    MultipleBodyElements,

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("Missing SOAP Body")]
    MissingBody,

    #[error("Unexpected SOAP body element: expected {expected}, found {found}")]
    UnexpectedElement { expected: String, found: String },

    #[error("Unexpected end of document inside <{0}>")]
    UnexpectedEof(String),

    #[error("Unknown entity reference &{0};")]
    UnknownEntity(String),

    #[error("Unknown SOAP version: {0}")]
    UnknownVersion(String),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML deserialization error: {0}")]
    Deserialize(#[from] quick_xml::DeError),

    #[error("XML serialization error: {0}")]
    Serialize(#[from] quick_xml::SeError),

    #[error("XML emitter error: {0}")]
    Emit(#[from] xmltree::Error),

    #[error("Generated XML is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl SoapError {
    /// Erreur de lecture du flux XML ou de décodage d'un sous-élément
    pub fn is_stream_error(&self) -> bool {
        matches!(
            self,
            SoapError::Xml(_)
                | SoapError::Io(_)
                | SoapError::Deserialize(_)
                | SoapError::UnexpectedEof(_)
                | SoapError::UnknownEntity(_)
        )
    }
}
