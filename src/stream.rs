use crate::error::Result;

/// An external stream source: filter-chain application (decoding on read,
/// encoding on write) is the implementer's responsibility, not the core's
/// (§6 collaborator contracts). The core only ever handles already-encoded
/// bytes, via [`Stream`].
pub trait PdfStream {
    /// Read the current encoded content.
    fn read(&mut self) -> Result<Vec<u8>>;

    /// Replace the encoded content.
    fn write(&mut self, data: &[u8]) -> Result<()>;
}

/// The already-filter-encoded byte payload owned by an
/// [`IndirectObject`](crate::IndirectObject).
///
/// This is a lazy byte payload: it can be built directly from a byte
/// buffer, or pulled on demand from a [`PdfStream`] collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stream {
    encoded: Vec<u8>,
    dirty: bool,
}

impl Stream {
    /// Wrap already-encoded bytes.
    pub fn new(encoded: impl Into<Vec<u8>>) -> Self {
        Self { encoded: encoded.into(), dirty: false }
    }

    /// Pull the current encoded bytes from an external stream source.
    pub fn from_source(source: &mut dyn PdfStream) -> Result<Self> {
        Ok(Self::new(source.read()?))
    }

    /// The raw-encoded bytes, as written between `stream` and `endstream`.
    pub fn encoded_bytes(&self) -> &[u8] {
        &self.encoded
    }

    /// The byte count the writer emits as the dictionary's `/Length`.
    pub fn len(&self) -> usize {
        self.encoded.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.encoded.is_empty()
    }

    /// Replace the encoded bytes, marking this stream dirty.
    pub fn set_encoded_bytes(&mut self, encoded: impl Into<Vec<u8>>) {
        self.encoded = encoded.into();
        self.dirty = true;
    }

    /// Push the current encoded bytes to an external stream source.
    pub fn flush_to(&self, sink: &mut dyn PdfStream) -> Result<()> {
        sink.write(&self.encoded)
    }

    /// Whether this stream's content was set since the last
    /// `set_dirty(false)`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Set the dirty bit directly.
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }
}
