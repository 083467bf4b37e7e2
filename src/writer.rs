use crate::collection::ObjectCollection;
use crate::encrypt::PdfEncrypt;
use crate::error::Result;
use crate::indirect::IndirectObject;
use crate::primitive::BufExt;
use crate::reference::Reference;
use crate::variant::Variant;

/// How whitespace is inserted between tokens.
///
/// `Compact` omits optional whitespace (inserting only what is needed to
/// keep adjacent tokens from concatenating); `Clean` pretty-prints with
/// newlines after dictionary entries and spaces between keys and values
/// (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Minimal whitespace; this is what production PDF output uses.
    Compact,
    /// Human-readable output, for debugging.
    Clean,
}

impl WriteMode {
    pub(crate) fn is_clean(self) -> bool {
        matches!(self, WriteMode::Clean)
    }
}

/// Serializes [`Variant`]s and [`IndirectObject`]s to a byte sink.
///
/// Stateless across objects: compact-mode pre-spacing decisions depend
/// only on the value's kind, never on what was written before (§4.6).
pub struct Writer {
    buf: Vec<u8>,
    mode: WriteMode,
    offsets: Vec<(Reference, usize)>,
    encrypt: Option<Box<dyn PdfEncrypt>>,
}

impl Writer {
    /// Create a writer with the default buffer capacity.
    pub fn new(mode: WriteMode) -> Self {
        Self::with_capacity(8 * 1024, mode)
    }

    /// Create a writer with a pre-allocated buffer capacity.
    pub fn with_capacity(capacity: usize, mode: WriteMode) -> Self {
        Self { buf: Vec::with_capacity(capacity), mode, offsets: Vec::new(), encrypt: None }
    }

    /// Supply an encryption collaborator; subsequent string and stream
    /// content is passed through it before escaping.
    pub fn set_encrypt(&mut self, encrypt: Box<dyn PdfEncrypt>) {
        self.encrypt = Some(encrypt);
    }

    /// Write the `%PDF-major.minor` header followed by a blank line.
    pub fn write_header(&mut self, major: i32, minor: i32) {
        self.buf.extend_from_slice(b"%PDF-");
        self.buf.push_int(major);
        self.buf.push(b'.');
        self.buf.push_int(minor);
        self.buf.extend_from_slice(b"\n\n");
    }

    /// Write a standalone `Variant`, not as part of an indirect object.
    /// `reference` supplies the encryption context for string content.
    pub fn write_variant(&mut self, variant: &Variant, reference: Reference) {
        variant.write(&mut self.buf, self.mode, reference, self.encrypt.as_deref());
    }

    /// Write one indirect object, recording its byte offset for the
    /// cross-reference table.
    pub fn write_object(&mut self, object: &IndirectObject) -> Result<()> {
        #[cfg(feature = "log")]
        log::trace!("writing object {:?}", object.reference());
        self.offsets.push((object.reference(), self.buf.len()));
        object.write(&mut self.buf, self.mode, self.encrypt.as_deref())?;
        self.buf.push(b'\n');
        Ok(())
    }

    /// Write every object in `collection`, in its iteration order.
    pub fn write_collection(&mut self, collection: &ObjectCollection) -> Result<()> {
        for object in collection.iter() {
            self.write_object(object)?;
        }
        Ok(())
    }

    /// Write the cross-reference table and trailer, then return the
    /// finished byte buffer. `root` is the catalog's reference.
    pub fn finish(mut self, root: Reference) -> Vec<u8> {
        let (xref_len, xref_offset) = self.write_xref_table();
        self.write_trailer(root, xref_len, xref_offset);
        self.buf
    }

    fn write_xref_table(&mut self) -> (u32, usize) {
        let mut offsets = std::mem::take(&mut self.offsets);
        offsets.sort_by_key(|(reference, _)| reference.object());

        let xref_len = 1 + offsets.last().map(|(r, _)| r.object()).unwrap_or(0);
        let xref_offset = self.buf.len();

        self.buf.extend_from_slice(b"xref\n0 ");
        self.buf.push_int(xref_len);
        self.buf.extend_from_slice(b"\n0000000000 65535 f\r\n");

        let mut next = 1;
        for (reference, offset) in offsets {
            let object = reference.object();
            while next < object {
                self.buf.extend_from_slice(b"0000000000 65535 f\r\n");
                next += 1;
            }
            self.buf.push_int_aligned(offset, 10);
            self.buf.extend_from_slice(b" 00000 n\r\n");
            next = object + 1;
        }

        (xref_len, xref_offset)
    }

    fn write_trailer(&mut self, root: Reference, xref_len: u32, xref_offset: usize) {
        self.buf.extend_from_slice(b"trailer\n<<");
        self.buf.extend_from_slice(b"/Size ");
        self.buf.push_int(xref_len);
        self.buf.extend_from_slice(b"/Root ");
        root.write(&mut self.buf);
        self.buf.extend_from_slice(b">>\nstartxref\n");
        self.buf.push_int(xref_offset);
        self.buf.extend_from_slice(b"\n%%EOF");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::Array;
    use crate::dict::Dictionary;
    use crate::name::Name;

    fn written(variant: &Variant, mode: WriteMode) -> Vec<u8> {
        let mut writer = Writer::new(mode);
        writer.write_variant(variant, Reference::new(1, 0));
        writer.buf
    }

    #[test]
    fn empty_dictionary_compact() {
        let variant = Variant::dictionary(Dictionary::new());
        assert_eq!(written(&variant, WriteMode::Compact), b"<<>>");
    }

    #[test]
    fn type_first_ordering() {
        let mut dict = Dictionary::new();
        dict.add_or_replace("Parent", Variant::reference(Reference::new(1, 0))).unwrap();
        dict.add_or_replace("Type", Variant::name(Name::from_str("Page"))).unwrap();
        let mut kids = Array::new();
        kids.append(Variant::reference(Reference::new(2, 0))).unwrap();
        kids.append(Variant::reference(Reference::new(3, 0))).unwrap();
        dict.add_or_replace("Kids", Variant::array(kids)).unwrap();

        let variant = Variant::dictionary(dict);
        assert_eq!(
            written(&variant, WriteMode::Compact),
            b"<</Type/Page/Kids[2 0 R 3 0 R]/Parent 1 0 R>>".to_vec()
        );
    }

    #[test]
    fn real_formatting() {
        assert_eq!(written(&Variant::real(1.5), WriteMode::Compact), b"1.5");
        assert_eq!(written(&Variant::real(1.0), WriteMode::Compact), b"1");
        assert_eq!(written(&Variant::real(0.0), WriteMode::Compact), b"0");
    }

    #[test]
    fn name_escaping() {
        let variant = Variant::name(Name::from_bytes(b" /".to_vec()));
        assert_eq!(written(&variant, WriteMode::Compact), b"/#20#2F");
    }
}
