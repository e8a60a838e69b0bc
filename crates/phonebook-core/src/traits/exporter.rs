// # Exporter Trait
//
// One implementation per phone vendor. The exporter engine
// ([`crate::exporter::render`]) filters entries, applies the active prefix
// and picks dial targets; an exporter only lays the prepared contacts out in
// its vendor's XML schema.

use crate::exporter::Contact;

/// Trait for vendor-specific phonebook renderers
pub trait Exporter: Send + Sync {
    /// Registry key, e.g. `"yealink"`
    fn vendor(&self) -> &'static str;

    /// Render prepared contacts, in order, into an XML document
    ///
    /// Output must be byte-for-byte identical for identical input.
    fn render(&self, contacts: &[Contact<'_>]) -> Result<Vec<u8>, crate::Error>;
}
