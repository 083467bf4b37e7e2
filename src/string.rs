use crate::encrypt::PdfEncrypt;
use crate::primitive::BufExt;
use crate::reference::Reference;

/// A PDF literal or hex string.
///
/// The hex flag is part of the type: a literal string and a hex string with
/// identical content bytes are unequal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PdfString {
    bytes: Vec<u8>,
    hex: bool,
}

impl PdfString {
    /// Create a literal (parenthesized) string.
    pub fn literal(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into(), hex: false }
    }

    /// Create a hex (`<...>`) string.
    pub fn hex(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into(), hex: true }
    }

    /// Whether this string serializes in hex form.
    pub fn is_hex(&self) -> bool {
        self.hex
    }

    /// The raw content bytes (before any encryption).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Write this string, applying the encryptor (if any) to the content
    /// bytes before escaping.
    pub(crate) fn write(&self, buf: &mut Vec<u8>, reference: Reference, encrypt: Option<&dyn PdfEncrypt>) {
        let owned;
        let bytes: &[u8] = match encrypt {
            Some(enc) => {
                owned = enc.encrypt(reference, &self.bytes);
                &owned
            }
            None => &self.bytes,
        };

        if self.hex {
            buf.push(b'<');
            for &byte in bytes {
                buf.push_hex(byte);
            }
            buf.push(b'>');
        } else {
            buf.push(b'(');
            for &byte in bytes {
                match byte {
                    b'\n' => buf.extend_from_slice(b"\\n"),
                    b'\r' => buf.extend_from_slice(b"\\r"),
                    b'\t' => buf.extend_from_slice(b"\\t"),
                    0x08 => buf.extend_from_slice(b"\\b"),
                    0x0C => buf.extend_from_slice(b"\\f"),
                    b'\\' => buf.extend_from_slice(b"\\\\"),
                    b'(' => buf.extend_from_slice(b"\\("),
                    b')' => buf.extend_from_slice(b"\\)"),
                    other => buf.push(other),
                }
            }
            buf.push(b')');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(s: &PdfString) -> Vec<u8> {
        let mut buf = Vec::new();
        s.write(&mut buf, Reference::new(1, 0), None);
        buf
    }

    #[test]
    fn literal_escapes_parens_and_control_chars() {
        let s = PdfString::literal(b"a(b)\nc\\".to_vec());
        assert_eq!(written(&s), b"(a\\(b\\)\\nc\\\\)");
    }

    #[test]
    fn hex_string_round_trips_content() {
        let s = PdfString::hex(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(written(&s), b"<DEADBEEF>");
    }

    #[test]
    fn literal_and_hex_of_same_bytes_are_unequal() {
        let literal = PdfString::literal(b"ab".to_vec());
        let hex = PdfString::hex(b"ab".to_vec());
        assert_ne!(literal, hex);
    }
}
