use crate::error::{PdfError, Result};
use crate::font::reader::Reader;

/// An entry in a font program's table directory.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TableRecord {
    pub(crate) tag: [u8; 4],
    pub(crate) checksum: u32,
    pub(crate) offset: u32,
    pub(crate) length: u32,
}

/// The parsed font directory: scaler type plus every table record, in the
/// order they appeared in the input (§4.7 output layout preserves this
/// order).
pub(crate) struct FontDirectory {
    pub(crate) scaler_type: u32,
    pub(crate) records: Vec<TableRecord>,
}

impl FontDirectory {
    pub(crate) fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let scaler_type = reader.u32()?;
        let num_tables = reader.u16()?;
        let _search_range = reader.u16()?;
        let _entry_selector = reader.u16()?;
        let _range_shift = reader.u16()?;

        let mut records = Vec::with_capacity(num_tables as usize);
        for _ in 0..num_tables {
            let tag = reader.tag()?;
            let checksum = reader.u32()?;
            let offset = reader.u32()?;
            let length = reader.u32()?;
            records.push(TableRecord { tag, checksum, offset, length });
        }

        Ok(Self { scaler_type, records })
    }

    pub(crate) fn find(&self, tag: &[u8; 4]) -> Option<&TableRecord> {
        self.records.iter().find(|record| &record.tag == tag)
    }

    pub(crate) fn table<'a>(&self, bytes: &'a [u8], tag: &[u8; 4]) -> Result<&'a [u8]> {
        let record = self.find(tag).ok_or(PdfError::UnsupportedFontFormat)?;
        let start = record.offset as usize;
        let end = start.checked_add(record.length as usize).ok_or(PdfError::UnexpectedEOF)?;
        bytes.get(start..end).ok_or(PdfError::UnexpectedEOF)
    }
}

pub(crate) const TAG_HEAD: [u8; 4] = *b"head";
pub(crate) const TAG_HHEA: [u8; 4] = *b"hhea";
pub(crate) const TAG_LOCA: [u8; 4] = *b"loca";
pub(crate) const TAG_MAXP: [u8; 4] = *b"maxp";
pub(crate) const TAG_GLYF: [u8; 4] = *b"glyf";
pub(crate) const TAG_HMTX: [u8; 4] = *b"hmtx";
pub(crate) const TAG_CVT: [u8; 4] = *b"cvt ";
pub(crate) const TAG_FPGM: [u8; 4] = *b"fpgm";
pub(crate) const TAG_PREP: [u8; 4] = *b"prep";
pub(crate) const TAG_POST: [u8; 4] = *b"post";

/// Tables required by §4.7; absence of any of these is a format error.
pub(crate) const REQUIRED_TABLES: [[u8; 4]; 6] =
    [TAG_HEAD, TAG_HHEA, TAG_LOCA, TAG_MAXP, TAG_GLYF, TAG_HMTX];

/// Tables copied verbatim if present.
pub(crate) const PASSTHROUGH_TABLES: [[u8; 4]; 3] = [TAG_CVT, TAG_FPGM, TAG_PREP];

/// Big-endian checksum over `bytes`, treated as 32-bit words padded with
/// zeros to a 4-byte boundary (§4.7 Checksum).
pub(crate) fn checksum(bytes: &[u8]) -> u32 {
    let mut sum: u32 = 0;
    let mut chunks = bytes.chunks(4);
    for chunk in &mut chunks {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum = sum.wrapping_add(u32::from_be_bytes(word));
    }
    sum
}

/// Read `head.indexToLocFormat` at byte offset 50: `0` for short (16-bit,
/// value×2) `loca`, nonzero for long (32-bit).
pub(crate) fn index_to_loc_format(head: &[u8]) -> Result<i16> {
    head.get(50..52)
        .map(|b| i16::from_be_bytes([b[0], b[1]]))
        .ok_or(PdfError::UnexpectedEOF)
}

/// Parse `loca` into a `(offset, length)` pair for each glyph in the
/// original font, using `format` as returned by [`index_to_loc_format`].
pub(crate) fn parse_loca(loca: &[u8], format: i16) -> Result<Vec<(u32, u32)>> {
    let offsets: Vec<u32> = if format == 0 {
        let mut reader = Reader::new(loca);
        let count = loca.len() / 2;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(u32::from(reader.u16()?) * 2);
        }
        out
    } else {
        let mut reader = Reader::new(loca);
        let count = loca.len() / 4;
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(reader.u32()?);
        }
        out
    };

    if offsets.len() < 2 {
        return Err(PdfError::UnsupportedFontFormat);
    }

    Ok(offsets.windows(2).map(|w| (w[0], w[1] - w[0])).collect())
}

/// `longHorMetric` pairs read from `hmtx`: `(advance_width, lsb)`.
pub(crate) fn parse_hmtx(hmtx: &[u8], num_metrics: u16) -> Result<Vec<(u16, i16)>> {
    let mut reader = Reader::new(hmtx);
    let mut out = Vec::with_capacity(num_metrics as usize);
    for _ in 0..num_metrics {
        let advance = reader.u16()?;
        let lsb = reader.i16()?;
        out.push((advance, lsb));
    }
    Ok(out)
}

