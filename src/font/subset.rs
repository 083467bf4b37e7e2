use std::collections::HashMap;

use crate::error::{PdfError, Result};
use crate::font::glyf::{self, GlyphRecord};
use crate::font::tables::{
    self, FontDirectory, TableRecord, PASSTHROUGH_TABLES, REQUIRED_TABLES, TAG_GLYF, TAG_HEAD,
    TAG_HHEA, TAG_HMTX, TAG_LOCA, TAG_MAXP, TAG_POST,
};

/// The glyph identifiers a caller needs retained in a subset font. Glyph 0
/// (`.notdef`) is always included even if not listed explicitly.
#[derive(Debug, Clone, Default)]
pub struct GidList {
    gids: Vec<u16>,
}

impl GidList {
    pub fn new(gids: impl IntoIterator<Item = u16>) -> Self {
        Self { gids: gids.into_iter().collect() }
    }
}

/// Subsets TrueType/OpenType (TrueType-flavoured) font programs down to a
/// caller-supplied glyph set, following the table-rewrite rules in §4.7.
#[derive(Debug, Default)]
pub struct TrueTypeSubsetter;

impl TrueTypeSubsetter {
    pub fn new() -> Self {
        Self
    }

    /// Produce a subset font program containing only the transitive glyph
    /// closure of `gids` (plus glyph 0), with every table rewritten per
    /// the output-layout rules.
    pub fn subset(&self, font: &[u8], gids: &GidList) -> Result<Vec<u8>> {
        let directory = FontDirectory::parse(font)?;

        for tag in REQUIRED_TABLES {
            if directory.find(&tag).is_none() {
                #[cfg(feature = "log")]
                log::debug!("font subset: missing required table {:?}", std::str::from_utf8(&tag));
                return Err(PdfError::UnsupportedFontFormat);
            }
        }

        #[cfg(feature = "log")]
        log::debug!(
            "font subset: found tables {:?}",
            directory.records.iter().map(|r| std::str::from_utf8(&r.tag).unwrap_or("?")).collect::<Vec<_>>()
        );

        let head = directory.table(font, &TAG_HEAD)?;
        let hhea = directory.table(font, &TAG_HHEA)?;
        let maxp = directory.table(font, &TAG_MAXP)?;
        let loca = directory.table(font, &TAG_LOCA)?;
        let glyf_table = directory.table(font, &TAG_GLYF)?;
        let hmtx = directory.table(font, &TAG_HMTX)?;

        let loc_format = tables::index_to_loc_format(head)?;
        let glyph_locations = tables::parse_loca(loca, loc_format)?;
        let num_glyphs_original = glyph_locations.len();

        let num_h_metrics = hhea
            .get(34..36)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .ok_or(PdfError::UnexpectedEOF)?;
        let metrics = tables::parse_hmtx(hmtx, num_h_metrics)?;

        let (ordered_gids, records) =
            close_and_renumber(glyf_table, &glyph_locations, &gids.gids, num_glyphs_original)?;

        #[cfg(feature = "log")]
        log::debug!("font subset: closure has {} glyphs", ordered_gids.len());

        let new_glyf = write_glyf(glyf_table, &records, &ordered_gids)?;
        let new_loca = write_loca(&records, loc_format);
        let new_hmtx = write_hmtx(&metrics, &ordered_gids)?;
        let new_head = rewrite_head(head);
        let new_maxp = rewrite_maxp(maxp, ordered_gids.len() as u16)?;
        let new_hhea = rewrite_hhea(hhea, ordered_gids.len() as u16)?;

        let mut output_tables: Vec<([u8; 4], Vec<u8>)> = Vec::new();
        for record in &directory.records {
            let tag = record.tag;
            let bytes = match tag {
                TAG_HEAD => new_head.clone(),
                TAG_HHEA => new_hhea.clone(),
                TAG_LOCA => new_loca.clone(),
                TAG_MAXP => new_maxp.clone(),
                TAG_GLYF => new_glyf.clone(),
                TAG_HMTX => new_hmtx.clone(),
                TAG_POST => {
                    let post = directory.table(font, &tag)?;
                    match rewrite_post(post) {
                        Some(bytes) => bytes,
                        None => continue,
                    }
                }
                tag if PASSTHROUGH_TABLES.contains(&tag) => directory.table(font, &tag)?.to_vec(),
                _ => continue,
            };
            output_tables.push((tag, bytes));
        }

        Ok(assemble(directory.scaler_type, &output_tables))
    }
}

/// Build the renumbering order (glyph 0, then caller GIDs, then compound
/// descendants in discovery order) and the per-new-GID glyph record.
fn close_and_renumber(
    glyf_table: &[u8],
    glyph_locations: &[(u32, u32)],
    requested: &[u16],
    num_glyphs: usize,
) -> Result<(Vec<u16>, Vec<GlyphRecord>)> {
    let mut ordered_gids = Vec::new();
    let mut seen = HashMap::new();

    let mut enqueue = |gid: u16, ordered: &mut Vec<u16>, seen: &mut HashMap<u16, ()>| -> Result<()> {
        if gid as usize >= num_glyphs {
            return Err(PdfError::InternalLogic);
        }
        if seen.insert(gid, ()).is_none() {
            ordered.push(gid);
        }
        Ok(())
    };

    enqueue(0, &mut ordered_gids, &mut seen)?;
    for &gid in requested {
        enqueue(gid, &mut ordered_gids, &mut seen)?;
    }

    let mut records = Vec::new();
    let mut cursor = 0;
    while cursor < ordered_gids.len() {
        let gid = ordered_gids[cursor];
        let (offset, length) = glyph_locations[gid as usize];
        let record = glyf::read_glyph_record(glyf_table, offset, length)?;
        for component in &record.components {
            enqueue(component.gid, &mut ordered_gids, &mut seen)?;
        }
        records.push(record);
        cursor += 1;
    }

    // `records` was appended in closure-discovery order, which matches
    // `ordered_gids` because every glyph visited pushes exactly one record
    // before the loop considers later entries appended to `ordered_gids`.
    Ok((ordered_gids, records))
}

/// Copy each glyph's bytes into the output `glyf` table, overwriting
/// compound-component GID fields in place with their renumbered value.
fn write_glyf(glyf_table: &[u8], records: &[GlyphRecord], ordered_gids: &[u16]) -> Result<Vec<u8>> {
    let mut new_gid_of_old: HashMap<u16, u16> = HashMap::new();
    for (new_gid, &old_gid) in ordered_gids.iter().enumerate() {
        new_gid_of_old.insert(old_gid, new_gid as u16);
    }

    let mut out = Vec::new();
    for record in records {
        if record.length == 0 {
            continue;
        }
        let start = record.source_offset as usize;
        let end = start + record.length as usize;
        let bytes = glyf_table.get(start..end).ok_or(PdfError::UnexpectedEOF)?;
        let glyph_start = out.len();
        out.extend_from_slice(bytes);

        for component in &record.components {
            let new_gid = *new_gid_of_old.get(&component.gid).ok_or(PdfError::InternalLogic)?;
            let fixup = glyph_start + component.fixup_offset as usize;
            out.get_mut(fixup..fixup + 2)
                .ok_or(PdfError::InternalLogic)?
                .copy_from_slice(&new_gid.to_be_bytes());
        }
    }
    Ok(out)
}

/// Write `loca`: monotonic running offsets into the new `glyf`, plus a
/// trailing sentinel, in the format indicated by `loc_format`.
fn write_loca(records: &[GlyphRecord], loc_format: i16) -> Vec<u8> {
    let mut offsets = Vec::with_capacity(records.len() + 1);
    let mut running = 0u32;
    for record in records {
        offsets.push(running);
        running += record.length;
    }
    offsets.push(running);

    let mut out = Vec::new();
    if loc_format == 0 {
        for offset in offsets {
            out.extend_from_slice(&((offset >> 1) as u16).to_be_bytes());
        }
    } else {
        for offset in offsets {
            out.extend_from_slice(&offset.to_be_bytes());
        }
    }
    out
}

fn write_hmtx(metrics: &[(u16, i16)], ordered_gids: &[u16]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(ordered_gids.len() * 4);
    for &gid in ordered_gids {
        let &(advance, lsb) = metrics
            .get(gid as usize)
            .or_else(|| metrics.last())
            .ok_or(PdfError::InternalLogic)?;
        out.extend_from_slice(&advance.to_be_bytes());
        out.extend_from_slice(&lsb.to_be_bytes());
    }
    Ok(out)
}

fn rewrite_head(head: &[u8]) -> Vec<u8> {
    let mut out = head.to_vec();
    out[4..8].copy_from_slice(&0u32.to_be_bytes());
    out
}

fn rewrite_maxp(maxp: &[u8], num_glyphs: u16) -> Result<Vec<u8>> {
    let mut out = maxp.to_vec();
    out.get_mut(4..6).ok_or(PdfError::UnexpectedEOF)?.copy_from_slice(&num_glyphs.to_be_bytes());
    Ok(out)
}

fn rewrite_hhea(hhea: &[u8], num_h_metrics: u16) -> Result<Vec<u8>> {
    let mut out = hhea.to_vec();
    out.get_mut(34..36).ok_or(PdfError::UnexpectedEOF)?.copy_from_slice(&num_h_metrics.to_be_bytes());
    Ok(out)
}

/// Drop `post` entirely if shorter than 32 bytes, else keep its first 32
/// bytes, force version 3.0, and zero the 16-byte type-1 suffix.
fn rewrite_post(post: &[u8]) -> Option<Vec<u8>> {
    if post.len() < 32 {
        return None;
    }
    let mut out = post[..32].to_vec();
    out[0..4].copy_from_slice(&0x0003_0000u32.to_be_bytes());
    out[16..32].fill(0);
    Some(out)
}

fn pad_to_4(buf: &mut Vec<u8>) {
    while buf.len() % 4 != 0 {
        buf.push(0);
    }
}

fn assemble(scaler_type: u32, output_tables: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
    let num_tables = output_tables.len() as u16;
    let mut search_range_pow2 = 1u16;
    let mut entry_selector = 0u16;
    while search_range_pow2 * 2 <= num_tables {
        search_range_pow2 *= 2;
        entry_selector += 1;
    }
    let search_range = search_range_pow2 * 16;
    let range_shift = num_tables * 16 - search_range;

    let mut out = Vec::new();
    out.extend_from_slice(&scaler_type.to_be_bytes());
    out.extend_from_slice(&num_tables.to_be_bytes());
    out.extend_from_slice(&search_range.to_be_bytes());
    out.extend_from_slice(&entry_selector.to_be_bytes());
    out.extend_from_slice(&range_shift.to_be_bytes());

    let directory_start = out.len();
    out.resize(directory_start + output_tables.len() * 16, 0);

    let mut records: Vec<TableRecord> = Vec::with_capacity(output_tables.len());
    for (tag, bytes) in output_tables {
        let offset = out.len() as u32;
        let unpadded_length = bytes.len() as u32;
        let mut padded = bytes.clone();
        pad_to_4(&mut padded);
        out.extend_from_slice(&padded);
        // §4.7: checksum is taken over the padded bytes, but the directory
        // records the table's real (unpadded) length.
        records.push(TableRecord {
            tag: *tag,
            checksum: tables::checksum(&padded),
            offset,
            length: unpadded_length,
        });
    }

    for (i, record) in records.iter().enumerate() {
        let slot = directory_start + i * 16;
        out[slot..slot + 4].copy_from_slice(&record.tag);
        out[slot + 4..slot + 8].copy_from_slice(&record.checksum.to_be_bytes());
        out[slot + 8..slot + 12].copy_from_slice(&record.offset.to_be_bytes());
        out[slot + 12..slot + 16].copy_from_slice(&record.length.to_be_bytes());
    }

    let file_checksum = tables::checksum(&out);
    let adjustment = 0xB1B0_AFBAu32.wrapping_sub(file_checksum);

    if let Some(head_record) = records.iter().find(|r| r.tag == TAG_HEAD) {
        let at = head_record.offset as usize + 4;
        out[at..at + 4].copy_from_slice(&adjustment.to_be_bytes());
    }

    out
}
