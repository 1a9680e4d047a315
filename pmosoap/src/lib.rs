//! # pmosoap - Décodage d'enveloppes SOAP PromoStandards
//!
//! Ce crate décode les réponses SOAP 1.1/1.2 des web services
//! PromoStandards : le Body contient soit un `Fault`, soit l'unique
//! élément de réponse de l'opération, décodé dans une destination typée
//! fournie par l'appelant.
//!
//! ## Fonctionnalités
//!
//! - ✅ Décodage en flux du Body avec contrôle WS-I (un seul élément)
//! - ✅ Détection des SOAP Faults (1.1 et 1.2)
//! - ✅ Résolution des préfixes non déclarés (`soap`, `ns`, `tns`)
//! - ✅ Construction d'enveloppes de requête et de Faults
//! - ✅ Configuration via pmoconfig
//!
//! ## Architecture
//!
//! - [`Envelope`] / [`Body`] : enveloppe reçue, destination empruntée
//! - [`Fault`] : erreur SOAP, implémente `std::error::Error`
//! - [`NamespaceContext`] : namespace par défaut et alias
//! - [`decode_envelope`] / [`decode_response`] : points d'entrée
//! - [`RequestEnvelope`] / [`build_request_envelope`] : requêtes
//!
//! ## Example
//!
//! ```
//! use pmosoap::{decode_response, BodyOutcome};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct GetProductSellableResponse {
//!     #[serde(rename = "ProductSellableArray", default)]
//!     products: Option<ProductSellableArray>,
//! }
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct ProductSellableArray {
//!     #[serde(rename = "ProductSellable", default)]
//!     items: Vec<ProductSellable>,
//! }
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct ProductSellable {
//!     #[serde(rename = "productId")]
//!     product_id: String,
//! }
//!
//! let xml = r#"<?xml version="1.0"?>
//! <soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
//!   <soap:Body>
//!     <GetProductSellableResponse>
//!       <ProductSellableArray>
//!         <ns:ProductSellable><ns:productId>A-1</ns:productId></ns:ProductSellable>
//!       </ProductSellableArray>
//!     </GetProductSellableResponse>
//!   </soap:Body>
//! </soap:Envelope>"#;
//!
//! match decode_response::<GetProductSellableResponse>(xml.as_bytes())? {
//!     BodyOutcome::Payload { element, content } => {
//!         assert_eq!(element, "GetProductSellableResponse");
//!         assert_eq!(content.products.unwrap().items[0].product_id, "A-1");
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! # Ok::<(), pmosoap::SoapError>(())
//! ```

mod builder;
mod config_ext;
mod constants;
mod decoder;
mod envelope;
mod error;
mod fault;
mod logging;
mod namespace;
mod parser;

pub use builder::build_request_envelope;
pub use config_ext::SoapConfigExt;
pub use constants::{
    NAMESPACE_PDS, NAMESPACE_SHARED_OBJECTS, NAMESPACE_SOAP11, NAMESPACE_SOAP12,
    SOAP_CONTENT_TYPE_11, SOAP_CONTENT_TYPE_12, SOAP_VERSION_11, SOAP_VERSION_12, SoapVersion,
};
pub use decoder::BodyState;
pub use envelope::{Body, BodyOutcome, Envelope, RequestEnvelope};
pub use error::SoapError;
pub use fault::{Fault, build_soap_fault, fault_codes};
pub use logging::init_tracing;
pub use namespace::NamespaceContext;
pub use parser::{decode_envelope, decode_envelope_with, decode_response, decode_response_with};
