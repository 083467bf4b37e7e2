use pdf_core::{GidList, TrueTypeSubsetter};

// A self-contained, minimal TrueType font builder/reader used only by this
// test file — it does not reach into the crate's internal table-parsing
// code, to keep this an end-to-end test of the public `subset` API.

fn u16_be(v: u16) -> [u8; 2] {
    v.to_be_bytes()
}
fn u32_be(v: u32) -> [u8; 4] {
    v.to_be_bytes()
}

fn simple_glyph(contours: i16, extra_bytes: usize) -> Vec<u8> {
    let mut g = vec![0u8; 10 + extra_bytes];
    g[0..2].copy_from_slice(&contours.to_be_bytes());
    g
}

/// A compound glyph referencing `components`, each a plain (non-scaled) GID
/// reference with word-sized args, terminated per the `MORE_COMPONENTS`
/// flag convention described in the subsetter's own table-layout notes.
fn compound_glyph(components: &[u16]) -> Vec<u8> {
    const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
    const MORE_COMPONENTS: u16 = 0x0020;

    let mut g = Vec::new();
    g.extend_from_slice(&(-1i16).to_be_bytes());
    g.extend_from_slice(&[0u8; 8]);

    for (i, &gid) in components.iter().enumerate() {
        let more = i + 1 < components.len();
        let flags = ARG_1_AND_2_ARE_WORDS | if more { MORE_COMPONENTS } else { 0 };
        g.extend_from_slice(&u16_be(flags));
        g.extend_from_slice(&u16_be(gid));
        g.extend_from_slice(&[0u8; 4]);
    }
    g
}

fn build_font(glyphs: &[Vec<u8>]) -> Vec<u8> {
    let mut glyf = Vec::new();
    let mut loca_offsets = vec![0u32];
    for g in glyphs {
        glyf.extend_from_slice(g);
        loca_offsets.push(glyf.len() as u32);
    }

    let mut loca = Vec::new();
    for o in &loca_offsets {
        loca.extend_from_slice(&u32_be(*o));
    }

    let num_glyphs = glyphs.len() as u16;

    let mut head = vec![0u8; 54];
    head[50..52].copy_from_slice(&u16_be(1));

    let mut hhea = vec![0u8; 36];
    hhea[34..36].copy_from_slice(&u16_be(num_glyphs));

    let mut maxp = vec![0u8; 32];
    maxp[4..6].copy_from_slice(&u16_be(num_glyphs));

    let mut hmtx = Vec::new();
    for _ in 0..num_glyphs {
        hmtx.extend_from_slice(&u16_be(600));
        hmtx.extend_from_slice(&u16_be(10));
    }

    let tables: Vec<([u8; 4], Vec<u8>)> = vec![
        (*b"head", head),
        (*b"hhea", hhea),
        (*b"loca", loca),
        (*b"maxp", maxp),
        (*b"glyf", glyf),
        (*b"hmtx", hmtx),
    ];

    let num_tables = tables.len() as u16;
    let mut out = Vec::new();
    out.extend_from_slice(&u32_be(0x0001_0000));
    out.extend_from_slice(&u16_be(num_tables));
    out.extend_from_slice(&u16_be(0));
    out.extend_from_slice(&u16_be(0));
    out.extend_from_slice(&u16_be(0));

    let dir_start = out.len();
    out.resize(dir_start + tables.len() * 16, 0);
    for (i, (tag, bytes)) in tables.iter().enumerate() {
        let offset = out.len() as u32;
        out.extend_from_slice(bytes);
        let slot = dir_start + i * 16;
        out[slot..slot + 4].copy_from_slice(tag);
        out[slot + 4..slot + 8].copy_from_slice(&u32_be(checksum(bytes)));
        out[slot + 8..slot + 12].copy_from_slice(&u32_be(offset));
        out[slot + 12..slot + 16].copy_from_slice(&u32_be(bytes.len() as u32));
    }
    out
}

fn checksum(bytes: &[u8]) -> u32 {
    let mut sum = 0u32;
    for chunk in bytes.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum = sum.wrapping_add(u32::from_be_bytes(word));
    }
    sum
}

/// Parse just enough of a font program to find a table's bytes, without
/// using any of the crate's own (private) table-parsing code.
fn find_table<'a>(font: &'a [u8], tag: &[u8; 4]) -> &'a [u8] {
    let num_tables = u16::from_be_bytes([font[4], font[5]]);
    for i in 0..num_tables {
        let slot = 12 + i as usize * 16;
        if &font[slot..slot + 4] == tag {
            let offset = u32::from_be_bytes([font[slot + 8], font[slot + 9], font[slot + 10], font[slot + 11]]) as usize;
            let length = u32::from_be_bytes([font[slot + 12], font[slot + 13], font[slot + 14], font[slot + 15]]) as usize;
            return &font[offset..offset + length];
        }
    }
    panic!("table {:?} not found", std::str::from_utf8(tag));
}

#[test]
fn missing_required_table_is_rejected() {
    let broken = vec![0u8; 4];
    let result = TrueTypeSubsetter::new().subset(&broken, &GidList::new([0]));
    assert!(result.is_err());
}

#[test]
fn compound_glyph_closure_matches_discovery_order() {
    // Glyph 10 is compound over {5, 7}; glyph 7 is compound over {3}.
    let mut glyphs: Vec<Vec<u8>> = (0..11).map(|_| simple_glyph(0, 4)).collect();
    glyphs[7] = compound_glyph(&[3]);
    glyphs[10] = compound_glyph(&[5, 7]);

    let font = build_font(&glyphs);
    let subset = TrueTypeSubsetter::new().subset(&font, &GidList::new([10])).unwrap();

    let maxp = find_table(&subset, b"maxp");
    let num_glyphs = u16::from_be_bytes([maxp[4], maxp[5]]);
    // ordered_gids = [0, 10, 5, 7, 3] -> 5 glyphs survive.
    assert_eq!(num_glyphs, 5);

    let glyf = find_table(&subset, b"glyf");
    let loca = find_table(&subset, b"loca");
    let num_contours_of = |new_gid: usize| -> i16 {
        let start = u32::from_be_bytes([loca[new_gid * 4], loca[new_gid * 4 + 1], loca[new_gid * 4 + 2], loca[new_gid * 4 + 3]]) as usize;
        i16::from_be_bytes([glyf[start], glyf[start + 1]])
    };
    // new GID 1 (old 10) and new GID 3 (old 7) are still compound (-1).
    assert_eq!(num_contours_of(1), -1);
    assert_eq!(num_contours_of(3), -1);
    assert_eq!(num_contours_of(2), 0); // new GID 2 (old 5) is simple
}

#[test]
fn output_tables_are_four_byte_aligned_and_checksum_adjustment_is_correct() {
    let glyphs: Vec<Vec<u8>> = (0..4).map(|_| simple_glyph(1, 3)).collect();
    let font = build_font(&glyphs);
    let subset = TrueTypeSubsetter::new().subset(&font, &GidList::new([1, 2])).unwrap();

    let num_tables = u16::from_be_bytes([subset[4], subset[5]]);
    for i in 0..num_tables {
        let slot = 12 + i as usize * 16;
        let offset = u32::from_be_bytes([subset[slot + 8], subset[slot + 9], subset[slot + 10], subset[slot + 11]]);
        assert_eq!(offset % 4, 0, "table {} not 4-byte aligned", i);
    }

    let head = find_table(&subset, b"head");
    let head_offset = {
        let slot = (0..num_tables)
            .map(|i| 12 + i as usize * 16)
            .find(|&slot| &subset[slot..slot + 4] == b"head")
            .unwrap();
        u32::from_be_bytes([subset[slot + 8], subset[slot + 9], subset[slot + 10], subset[slot + 11]]) as usize
    };
    assert_eq!(head.len(), 54); // directory records the unpadded table length
    let adjustment = u32::from_be_bytes([
        subset[head_offset + 4],
        subset[head_offset + 5],
        subset[head_offset + 6],
        subset[head_offset + 7],
    ]);

    let mut with_zeroed_adjustment = subset.clone();
    with_zeroed_adjustment[head_offset + 4..head_offset + 8].copy_from_slice(&[0, 0, 0, 0]);
    let recomputed = checksum(&with_zeroed_adjustment);
    assert_eq!(recomputed.wrapping_add(adjustment), 0xB1B0_AFBA);
}

#[test]
fn out_of_range_gid_fails() {
    let glyphs: Vec<Vec<u8>> = vec![simple_glyph(0, 0)];
    let font = build_font(&glyphs);
    let result = TrueTypeSubsetter::new().subset(&font, &GidList::new([50]));
    assert!(result.is_err());
}
