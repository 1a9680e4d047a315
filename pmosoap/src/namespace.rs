//! Contexte de résolution des namespaces pour le décodage du Body
//!
//! Les serveurs PromoStandards n'annoncent pas toujours les namespaces
//! qu'ils utilisent : certains envoient des éléments sans préfixe ni
//! `xmlns`, d'autres des préfixes (`ns:`, `tns:`) jamais déclarés. Le
//! contexte fournit un namespace par défaut et une table d'alias utilisés
//! uniquement quand le document lui-même ne lie pas le nom.

use crate::constants::{NAMESPACE_PDS, NAMESPACE_SHARED_OBJECTS, NAMESPACE_SOAP11};
use quick_xml::NsReader;
use quick_xml::name::{QName, ResolveResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceContext {
    default_namespace: Option<String>,
    aliases: BTreeMap<String, String>,
}

impl NamespaceContext {
    /// Contexte vide : seules les déclarations du document comptent
    pub fn new() -> Self {
        Self {
            default_namespace: None,
            aliases: BTreeMap::new(),
        }
    }

    /// Contexte PromoStandards Product Data Service
    ///
    /// - namespace par défaut : ProductDataService 1.0.0
    /// - `soap` → enveloppe SOAP 1.1
    /// - `ns` → SharedObjects
    /// - `tns` → ProductDataService 1.0.0
    pub fn promostandards() -> Self {
        Self::new()
            .with_default_namespace(NAMESPACE_PDS)
            .with_alias("soap", NAMESPACE_SOAP11)
            .with_alias("ns", NAMESPACE_SHARED_OBJECTS)
            .with_alias("tns", NAMESPACE_PDS)
    }

    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = Some(namespace.into());
        self
    }

    pub fn with_alias(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.aliases.insert(prefix.into(), namespace.into());
        self
    }

    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    pub fn alias(&self, prefix: &str) -> Option<&str> {
        self.aliases.get(prefix).map(String::as_str)
    }

    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    /// Résout le résultat de quick-xml en URI de namespace
    ///
    /// - `Bound` : le namespace déclaré dans le document
    /// - `Unbound` : le namespace par défaut du contexte
    /// - `Unknown(prefix)` : l'alias du contexte pour ce préfixe
    pub fn resolve(&self, result: &ResolveResult<'_>) -> Option<String> {
        match result {
            ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
            ResolveResult::Unbound => self.default_namespace.clone(),
            ResolveResult::Unknown(prefix) => {
                self.alias(&String::from_utf8_lossy(prefix)).map(str::to_string)
            }
        }
    }

    /// Résout le nom d'un élément : `(namespace, nom local)`
    pub fn resolve_element<R>(&self, reader: &NsReader<R>, name: QName<'_>) -> (Option<String>, String) {
        let (result, local) = reader.resolve_element(name);
        let namespace = self.resolve(&result);
        (namespace, String::from_utf8_lossy(local.as_ref()).into_owned())
    }
}

impl Default for NamespaceContext {
    fn default() -> Self {
        Self::promostandards()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;

    /// Résout le premier élément ouvrant du document
    fn resolve_first(ctx: &NamespaceContext, xml: &str) -> (Option<String>, String) {
        let mut reader = NsReader::from_str(xml);
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) | Event::Empty(e) => return ctx.resolve_element(&reader, e.name()),
                Event::Eof => panic!("no element in {xml}"),
                _ => {}
            }
        }
    }

    #[test]
    fn test_declared_namespace_wins_over_alias() {
        let ctx = NamespaceContext::promostandards();
        let (ns, local) = resolve_first(&ctx, r#"<ns:Product xmlns:ns="urn:vendor"/>"#);
        assert_eq!(ns.as_deref(), Some("urn:vendor"));
        assert_eq!(local, "Product");
    }

    #[test]
    fn test_undeclared_prefix_uses_alias() {
        let ctx = NamespaceContext::promostandards();
        let (ns, local) = resolve_first(&ctx, "<ns:Product/>");
        assert_eq!(ns.as_deref(), Some(NAMESPACE_SHARED_OBJECTS));
        assert_eq!(local, "Product");

        let (ns, _) = resolve_first(&ctx, "<soap:Fault/>");
        assert_eq!(ns.as_deref(), Some(NAMESPACE_SOAP11));
    }

    #[test]
    fn test_unprefixed_uses_default_namespace() {
        let ctx = NamespaceContext::promostandards();
        let (ns, _) = resolve_first(&ctx, "<GetProductSellableResponse/>");
        assert_eq!(ns.as_deref(), Some(NAMESPACE_PDS));

        let (ns, _) = resolve_first(&NamespaceContext::new(), "<GetProductSellableResponse/>");
        assert_eq!(ns, None);
    }

    #[test]
    fn test_unknown_prefix_without_alias() {
        let ctx = NamespaceContext::promostandards();
        let (ns, local) = resolve_first(&ctx, "<ns9:Thing/>");
        assert_eq!(ns, None);
        assert_eq!(local, "Thing");
    }
}
