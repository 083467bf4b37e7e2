use crate::reference::Reference;

/// An encryption collaborator consumed by the writer.
///
/// Given an indirect object's reference and a byte buffer (string or
/// stream content), returns the encrypted bytes. Each indirect object is
/// expected to get a fresh crypto context keyed by its reference; the
/// algorithm itself is out of scope for this crate (§1 Non-goals).
pub trait PdfEncrypt {
    /// Encrypt `bytes` under the context for `reference`.
    fn encrypt(&self, reference: Reference, bytes: &[u8]) -> Vec<u8>;
}
