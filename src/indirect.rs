use crate::encrypt::PdfEncrypt;
use crate::error::{PdfError, Result};
use crate::reference::Reference;
use crate::stream::Stream;
use crate::variant::Variant;
use crate::writer::WriteMode;

/// A [`Variant`] with identity: its own [`Reference`] and, optionally, a
/// content stream. Only indirect objects are addressable across the file
/// (§3).
#[derive(Debug)]
pub struct IndirectObject {
    reference: Reference,
    value: Variant,
    stream: Option<Stream>,
}

impl IndirectObject {
    /// Wrap `value` under `reference`, with no stream.
    pub fn new(reference: Reference, value: Variant) -> Self {
        Self { reference, value, stream: None }
    }

    /// This object's identity.
    pub fn reference(&self) -> Reference {
        self.reference
    }

    /// Borrow the wrapped value.
    pub fn value(&self) -> &Variant {
        &self.value
    }

    /// Mutably borrow the wrapped value.
    pub fn value_mut(&mut self) -> &mut Variant {
        &mut self.value
    }

    /// Borrow the stream, if any.
    pub fn stream(&self) -> Option<&Stream> {
        self.stream.as_ref()
    }

    /// Attach (or replace) this object's stream.
    pub fn set_stream(&mut self, stream: Stream) {
        self.stream = Some(stream);
    }

    /// Detach and return the stream, if any.
    pub fn take_stream(&mut self) -> Option<Stream> {
        self.stream.take()
    }

    /// Whether the value or stream changed since the last
    /// `set_dirty(false)`.
    pub fn is_dirty(&self) -> bool {
        self.value.is_dirty() || self.stream.as_ref().is_some_and(Stream::is_dirty)
    }

    /// Clear the dirty bit on the value (recursively) and the stream.
    pub fn set_dirty(&mut self, dirty: bool) {
        self.value.set_dirty(dirty);
        if let Some(stream) = &mut self.stream {
            stream.set_dirty(dirty);
        }
    }

    pub(crate) fn write(&self, buf: &mut Vec<u8>, mode: WriteMode, encrypt: Option<&dyn PdfEncrypt>) -> Result<()> {
        crate::primitive::BufExt::push_int(buf, self.reference.object());
        buf.push(b' ');
        crate::primitive::BufExt::push_int(buf, self.reference.generation());
        buf.extend_from_slice(b" obj\n");

        if let Some(stream) = &self.stream {
            // `/Length` is injected automatically (mirrors the teacher's
            // `PdfWriter::stream` convention) into a scratch clone so we
            // never need to mutate the caller's dictionary to serialize it.
            let dict = self.value.as_dictionary().map_err(|_| PdfError::InternalLogic)?;
            let mut dict = dict.clone();
            dict.set_immutable(false);
            dict.add_or_replace("Length", Variant::integer(stream.len() as i64))
                .map_err(|_| PdfError::InternalLogic)?;
            dict.write(buf, mode, self.reference, encrypt, None);
            buf.extend_from_slice(b"\nstream\n");
            buf.extend_from_slice(stream.encoded_bytes());
            buf.extend_from_slice(b"\nendstream");
        } else {
            self.value.write(buf, mode, self.reference, encrypt);
        }

        buf.extend_from_slice(b"\nendobj\n");
        Ok(())
    }
}
