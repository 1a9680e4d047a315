//! Structures de l'enveloppe SOAP

use crate::{Fault, SoapError, SoapVersion};

/// Enveloppe SOAP reçue
///
/// `H` est le type d'en-tête attendu par l'appelant, `C` le type de la
/// réponse de l'opération. La destination `C` est empruntée à l'appelant
/// le temps du décodage.
#[derive(Debug)]
pub struct Envelope<'c, H, C> {
    /// Version déduite du namespace de l'enveloppe
    pub version: SoapVersion,

    /// En-tête SOAP optionnel
    pub header: Option<H>,

    /// Corps SOAP
    pub body: Body<'c, C>,
}

/// Corps SOAP
///
/// Après décodage, au plus un des deux emplacements est rempli :
/// - `fault` si le Body contenait un `Fault`,
/// - la destination `content`, et alors `content_type` contient le nom
///   local de l'élément décodé.
#[derive(Debug)]
pub struct Body<'c, C> {
    /// Fault SOAP décodé
    pub fault: Option<Fault>,

    /// Destination fournie par l'appelant
    pub content: Option<&'c mut C>,

    /// Nom local de l'élément décodé dans `content`
    pub content_type: Option<String>,
}

impl<'c, C> Body<'c, C> {
    /// Body prêt à décoder dans `content`
    pub fn new(content: &'c mut C) -> Self {
        Self {
            fault: None,
            content: Some(content),
            content_type: None,
        }
    }

    /// Body sans destination : son décodage échoue
    pub fn unset() -> Self {
        Self {
            fault: None,
            content: None,
            content_type: None,
        }
    }

    pub fn has_content(&self) -> bool {
        self.content.is_some() && self.content_type.is_some()
    }

    pub fn is_fault(&self) -> bool {
        self.fault.is_some()
    }

    /// Ni Fault ni contenu
    pub fn is_empty(&self) -> bool {
        !self.is_fault() && !self.has_content()
    }

    /// Vérifie que l'élément décodé est bien la réponse attendue
    ///
    /// Un Body vide ou contenant un Fault passe la vérification : seul un
    /// élément de contenu portant un autre nom est refusé.
    pub fn expect_content_type(&self, expected: &str) -> Result<(), SoapError> {
        match &self.content_type {
            Some(found) if found != expected => Err(SoapError::UnexpectedElement {
                expected: expected.to_string(),
                found: found.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Le Fault éventuel, sous forme d'erreur
    pub fn fault_result(&self) -> Result<(), &Fault> {
        match &self.fault {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

impl<C> Default for Body<'_, C> {
    fn default() -> Self {
        Self::unset()
    }
}

/// Enveloppe SOAP sortante
///
/// Le Body est directement le payload sérialisable de la requête. Voir
/// [`crate::build_request_envelope`].
#[derive(Debug, Clone)]
pub struct RequestEnvelope<H, T> {
    /// En-tête optionnel ; ses champs deviennent les enfants de `Header`
    pub header: Option<H>,

    /// Payload de la requête, unique enfant du `Body`
    pub body: T,
}

impl<T> RequestEnvelope<(), T> {
    /// Crée une enveloppe sans en-tête
    pub fn new(body: T) -> Self {
        Self { header: None, body }
    }
}

impl<H, T> RequestEnvelope<H, T> {
    /// Crée une enveloppe avec en-tête
    pub fn with_header(header: H, body: T) -> Self {
        Self {
            header: Some(header),
            body,
        }
    }
}

/// Résultat du décodage d'une réponse, indépendant de l'emprunt
#[derive(Debug, Clone, PartialEq)]
pub enum BodyOutcome<C> {
    /// Réponse de l'opération
    Payload { element: String, content: C },

    /// Fault SOAP
    Fault(Fault),

    /// Body vide
    Empty,
}

impl<C> BodyOutcome<C> {
    pub fn is_fault(&self) -> bool {
        matches!(self, BodyOutcome::Fault(_))
    }

    /// Transforme un Fault en erreur
    pub fn into_result(self) -> Result<Option<C>, Fault> {
        match self {
            BodyOutcome::Payload { content, .. } => Ok(Some(content)),
            BodyOutcome::Fault(fault) => Err(fault),
            BodyOutcome::Empty => Ok(None),
        }
    }
}
