use bitflags::bitflags;

use crate::error::{PdfError, Result};
use crate::font::reader::Reader;

bitflags! {
    /// Component flags inside a compound glyph record (§4.7).
    #[derive(Clone, Copy, PartialEq, Eq)]
    struct ComponentFlags: u16 {
        const ARG_1_AND_2_ARE_WORDS = 0x0001;
        const WE_HAVE_A_SCALE = 0x0008;
        const MORE_COMPONENTS = 0x0020;
        const WE_HAVE_AN_X_AND_Y_SCALE = 0x0040;
        const WE_HAVE_A_TWO_BY_TWO = 0x0080;
        const WE_HAVE_INSTRUCTIONS = 0x0100;
    }
}

/// A single component reference inside a compound glyph: the byte offset
/// (relative to the glyph's start) of its `componentGid` field, and the
/// GID it currently points at.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ComponentRef {
    pub(crate) fixup_offset: u32,
    pub(crate) gid: u16,
}

/// One glyph's location inside the original `glyf` table, plus its
/// compound-component list if it has one.
#[derive(Debug, Clone)]
pub(crate) struct GlyphRecord {
    pub(crate) source_offset: u32,
    pub(crate) length: u32,
    pub(crate) is_compound: bool,
    pub(crate) components: Vec<ComponentRef>,
}

/// Read the glyph at `(offset, length)` within `glyf` and, if compound,
/// enumerate its component GIDs and their fixup offsets.
///
/// Grounded on §4.7's fixed flag layout: `flags: u16` at `header+0`,
/// `componentGid: u16` at `header+2`, with the next component's header
/// offset depending on which argument/scale flags are set. Iteration
/// stops when `MORE_COMPONENTS` is clear.
pub(crate) fn read_glyph_record(glyf: &[u8], offset: u32, length: u32) -> Result<GlyphRecord> {
    if length == 0 {
        return Ok(GlyphRecord {
            source_offset: offset,
            length: 0,
            is_compound: false,
            components: Vec::new(),
        });
    }

    let start = offset as usize;
    let end = start.checked_add(length as usize).ok_or(PdfError::UnexpectedEOF)?;
    let bytes = glyf.get(start..end).ok_or(PdfError::UnexpectedEOF)?;

    let mut reader = Reader::new(bytes);
    let num_contours = reader.i16()?;

    if num_contours >= 0 {
        return Ok(GlyphRecord { source_offset: offset, length, is_compound: false, components: Vec::new() });
    }

    // Skip xMin/yMin/xMax/yMax.
    reader.seek(10)?;

    let mut components = Vec::new();
    loop {
        let header_offset = reader.position();
        let flags_bits = reader.u16()?;
        let flags = ComponentFlags::from_bits_truncate(flags_bits);
        let gid = reader.u16()?;

        components.push(ComponentRef { fixup_offset: header_offset as u32 + 2, gid });

        let mut advance = if flags.contains(ComponentFlags::ARG_1_AND_2_ARE_WORDS) { 4 } else { 3 };
        if flags.contains(ComponentFlags::WE_HAVE_A_SCALE) {
            advance += 1;
        } else if flags.contains(ComponentFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            advance += 2;
        } else if flags.contains(ComponentFlags::WE_HAVE_A_TWO_BY_TWO) {
            advance += 4;
        }

        // `advance` counts u16 words from `header_offset`; we've already
        // consumed the first two (flags, gid), so skip the remainder.
        let remaining_words = advance - 2;
        reader.seek(header_offset + 4 + remaining_words * 2)?;

        if !flags.contains(ComponentFlags::MORE_COMPONENTS) {
            break;
        }
    }

    Ok(GlyphRecord { source_offset: offset, length, is_compound: true, components })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_glyph() -> Vec<u8> {
        let mut bytes = vec![0u8; 20];
        bytes[0..2].copy_from_slice(&1i16.to_be_bytes());
        bytes
    }

    #[test]
    fn simple_glyph_is_not_compound() {
        let glyf = simple_glyph();
        let record = read_glyph_record(&glyf, 0, glyf.len() as u32).unwrap();
        assert!(!record.is_compound);
        assert!(record.components.is_empty());
    }

    #[test]
    fn compound_glyph_with_two_components() {
        let mut glyf = Vec::new();
        glyf.extend_from_slice(&(-1i16).to_be_bytes());
        glyf.extend_from_slice(&[0u8; 8]);

        // First component: words args, more components follow.
        let flags1 = (ComponentFlags::ARG_1_AND_2_ARE_WORDS | ComponentFlags::MORE_COMPONENTS).bits();
        glyf.extend_from_slice(&flags1.to_be_bytes());
        glyf.extend_from_slice(&7u16.to_be_bytes());
        glyf.extend_from_slice(&[0u8; 4]); // two word args

        // Second component: byte args, no more components.
        let flags2 = 0u16;
        glyf.extend_from_slice(&flags2.to_be_bytes());
        glyf.extend_from_slice(&9u16.to_be_bytes());
        glyf.extend_from_slice(&[0u8; 2]); // two byte args

        let record = read_glyph_record(&glyf, 0, glyf.len() as u32).unwrap();
        assert!(record.is_compound);
        assert_eq!(record.components.len(), 2);
        assert_eq!(record.components[0].gid, 7);
        assert_eq!(record.components[1].gid, 9);
    }
}
