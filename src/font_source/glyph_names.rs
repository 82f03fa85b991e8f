//! Glyph naming
//!
//! Maps code points to production glyph names (Adobe Glyph List For New
//! Fonts where a name exists, `uniXXXX` otherwise) and back again.

/// Named code points, sorted by code point for binary search.
const NAMED_CODEPOINTS: &[(u32, &str)] = &[
    (0x0020, "space"),
    (0x0021, "exclam"),
    (0x0022, "quotedbl"),
    (0x0023, "numbersign"),
    (0x0024, "dollar"),
    (0x0025, "percent"),
    (0x0026, "ampersand"),
    (0x0027, "quotesingle"),
    (0x0028, "parenleft"),
    (0x0029, "parenright"),
    (0x002A, "asterisk"),
    (0x002B, "plus"),
    (0x002C, "comma"),
    (0x002D, "hyphen"),
    (0x002E, "period"),
    (0x002F, "slash"),
    (0x0030, "zero"),
    (0x0031, "one"),
    (0x0032, "two"),
    (0x0033, "three"),
    (0x0034, "four"),
    (0x0035, "five"),
    (0x0036, "six"),
    (0x0037, "seven"),
    (0x0038, "eight"),
    (0x0039, "nine"),
    (0x003A, "colon"),
    (0x003B, "semicolon"),
    (0x003C, "less"),
    (0x003D, "equal"),
    (0x003E, "greater"),
    (0x003F, "question"),
    (0x0040, "at"),
    (0x005B, "bracketleft"),
    (0x005C, "backslash"),
    (0x005D, "bracketright"),
    (0x005E, "asciicircum"),
    (0x005F, "underscore"),
    (0x0060, "grave"),
    (0x007B, "braceleft"),
    (0x007C, "bar"),
    (0x007D, "braceright"),
    (0x007E, "asciitilde"),
    (0x00A1, "exclamdown"),
    (0x00A2, "cent"),
    (0x00A3, "sterling"),
    (0x00A4, "currency"),
    (0x00A5, "yen"),
    (0x00A6, "brokenbar"),
    (0x00A7, "section"),
    (0x00A8, "dieresis"),
    (0x00A9, "copyright"),
    (0x00AA, "ordfeminine"),
    (0x00AB, "guillemotleft"),
    (0x00AC, "logicalnot"),
    (0x00AE, "registered"),
    (0x00AF, "macron"),
    (0x00B0, "degree"),
    (0x00B1, "plusminus"),
    (0x00B4, "acute"),
    (0x00B6, "paragraph"),
    (0x00B7, "periodcentered"),
    (0x00B8, "cedilla"),
    (0x00BA, "ordmasculine"),
    (0x00BB, "guillemotright"),
    (0x00BC, "onequarter"),
    (0x00BD, "onehalf"),
    (0x00BE, "threequarters"),
    (0x00BF, "questiondown"),
    (0x00C0, "Agrave"),
    (0x00C1, "Aacute"),
    (0x00C2, "Acircumflex"),
    (0x00C3, "Atilde"),
    (0x00C4, "Adieresis"),
    (0x00C5, "Aring"),
    (0x00C6, "AE"),
    (0x00C7, "Ccedilla"),
    (0x00C8, "Egrave"),
    (0x00C9, "Eacute"),
    (0x00CA, "Ecircumflex"),
    (0x00CB, "Edieresis"),
    (0x00CC, "Igrave"),
    (0x00CD, "Iacute"),
    (0x00CE, "Icircumflex"),
    (0x00CF, "Idieresis"),
    (0x00D0, "Eth"),
    (0x00D1, "Ntilde"),
    (0x00D2, "Ograve"),
    (0x00D3, "Oacute"),
    (0x00D4, "Ocircumflex"),
    (0x00D5, "Otilde"),
    (0x00D6, "Odieresis"),
    (0x00D7, "multiply"),
    (0x00D8, "Oslash"),
    (0x00D9, "Ugrave"),
    (0x00DA, "Uacute"),
    (0x00DB, "Ucircumflex"),
    (0x00DC, "Udieresis"),
    (0x00DD, "Yacute"),
    (0x00DE, "Thorn"),
    (0x00DF, "germandbls"),
    (0x00E0, "agrave"),
    (0x00E1, "aacute"),
    (0x00E2, "acircumflex"),
    (0x00E3, "atilde"),
    (0x00E4, "adieresis"),
    (0x00E5, "aring"),
    (0x00E6, "ae"),
    (0x00E7, "ccedilla"),
    (0x00E8, "egrave"),
    (0x00E9, "eacute"),
    (0x00EA, "ecircumflex"),
    (0x00EB, "edieresis"),
    (0x00EC, "igrave"),
    (0x00ED, "iacute"),
    (0x00EE, "icircumflex"),
    (0x00EF, "idieresis"),
    (0x00F0, "eth"),
    (0x00F1, "ntilde"),
    (0x00F2, "ograve"),
    (0x00F3, "oacute"),
    (0x00F4, "ocircumflex"),
    (0x00F5, "otilde"),
    (0x00F6, "odieresis"),
    (0x00F7, "divide"),
    (0x00F8, "oslash"),
    (0x00F9, "ugrave"),
    (0x00FA, "uacute"),
    (0x00FB, "ucircumflex"),
    (0x00FC, "udieresis"),
    (0x00FD, "yacute"),
    (0x00FE, "thorn"),
    (0x00FF, "ydieresis"),
    (0x0100, "Amacron"),
    (0x0101, "amacron"),
    (0x0102, "Abreve"),
    (0x0103, "abreve"),
    (0x0104, "Aogonek"),
    (0x0105, "aogonek"),
    (0x0106, "Cacute"),
    (0x0107, "cacute"),
    (0x0108, "Ccircumflex"),
    (0x0109, "ccircumflex"),
    (0x010A, "Cdotaccent"),
    (0x010B, "cdotaccent"),
    (0x010C, "Ccaron"),
    (0x010D, "ccaron"),
    (0x010E, "Dcaron"),
    (0x010F, "dcaron"),
    (0x0110, "Dcroat"),
    (0x0111, "dcroat"),
    (0x0112, "Emacron"),
    (0x0113, "emacron"),
    (0x0114, "Ebreve"),
    (0x0115, "ebreve"),
    (0x0116, "Edotaccent"),
    (0x0117, "edotaccent"),
    (0x0118, "Eogonek"),
    (0x0119, "eogonek"),
    (0x011A, "Ecaron"),
    (0x011B, "ecaron"),
    (0x011C, "Gcircumflex"),
    (0x011D, "gcircumflex"),
    (0x011E, "Gbreve"),
    (0x011F, "gbreve"),
    (0x0120, "Gdotaccent"),
    (0x0121, "gdotaccent"),
    (0x0122, "Gcommaaccent"),
    (0x0123, "gcommaaccent"),
    (0x0124, "Hcircumflex"),
    (0x0125, "hcircumflex"),
    (0x0126, "Hbar"),
    (0x0127, "hbar"),
    (0x0128, "Itilde"),
    (0x0129, "itilde"),
    (0x012A, "Imacron"),
    (0x012B, "imacron"),
    (0x012C, "Ibreve"),
    (0x012D, "ibreve"),
    (0x012E, "Iogonek"),
    (0x012F, "iogonek"),
    (0x0130, "Idotaccent"),
    (0x0131, "dotlessi"),
    (0x0132, "IJ"),
    (0x0133, "ij"),
    (0x0134, "Jcircumflex"),
    (0x0135, "jcircumflex"),
    (0x0136, "Kcommaaccent"),
    (0x0137, "kcommaaccent"),
    (0x0138, "kgreenlandic"),
    (0x0139, "Lacute"),
    (0x013A, "lacute"),
    (0x013B, "Lcommaaccent"),
    (0x013C, "lcommaaccent"),
    (0x013D, "Lcaron"),
    (0x013E, "lcaron"),
    (0x013F, "Ldot"),
    (0x0140, "ldot"),
    (0x0141, "Lslash"),
    (0x0142, "lslash"),
    (0x0143, "Nacute"),
    (0x0144, "nacute"),
    (0x0145, "Ncommaaccent"),
    (0x0146, "ncommaaccent"),
    (0x0147, "Ncaron"),
    (0x0148, "ncaron"),
    (0x0149, "napostrophe"),
    (0x014A, "Eng"),
    (0x014B, "eng"),
    (0x014C, "Omacron"),
    (0x014D, "omacron"),
    (0x014E, "Obreve"),
    (0x014F, "obreve"),
    (0x0150, "Ohungarumlaut"),
    (0x0151, "ohungarumlaut"),
    (0x0152, "OE"),
    (0x0153, "oe"),
    (0x0154, "Racute"),
    (0x0155, "racute"),
    (0x0156, "Rcommaaccent"),
    (0x0157, "rcommaaccent"),
    (0x0158, "Rcaron"),
    (0x0159, "rcaron"),
    (0x015A, "Sacute"),
    (0x015B, "sacute"),
    (0x015C, "Scircumflex"),
    (0x015D, "scircumflex"),
    (0x015E, "Scedilla"),
    (0x015F, "scedilla"),
    (0x0160, "Scaron"),
    (0x0161, "scaron"),
    (0x0162, "Tcommaaccent"),
    (0x0163, "tcommaaccent"),
    (0x0164, "Tcaron"),
    (0x0165, "tcaron"),
    (0x0166, "Tbar"),
    (0x0167, "tbar"),
    (0x0168, "Utilde"),
    (0x0169, "utilde"),
    (0x016A, "Umacron"),
    (0x016B, "umacron"),
    (0x016C, "Ubreve"),
    (0x016D, "ubreve"),
    (0x016E, "Uring"),
    (0x016F, "uring"),
    (0x0170, "Uhungarumlaut"),
    (0x0171, "uhungarumlaut"),
    (0x0172, "Uogonek"),
    (0x0173, "uogonek"),
    (0x0174, "Wcircumflex"),
    (0x0175, "wcircumflex"),
    (0x0176, "Ycircumflex"),
    (0x0177, "ycircumflex"),
    (0x0178, "Ydieresis"),
    (0x0179, "Zacute"),
    (0x017A, "zacute"),
    (0x017B, "Zdotaccent"),
    (0x017C, "zdotaccent"),
    (0x017D, "Zcaron"),
    (0x017E, "zcaron"),
    (0x017F, "longs"),
    (0x0192, "florin"),
    (0x01A0, "Ohorn"),
    (0x01A1, "ohorn"),
    (0x01AF, "Uhorn"),
    (0x01B0, "uhorn"),
    (0x01E6, "Gcaron"),
    (0x01E7, "gcaron"),
    (0x01FA, "Aringacute"),
    (0x01FB, "aringacute"),
    (0x01FC, "AEacute"),
    (0x01FD, "aeacute"),
    (0x01FE, "Oslashacute"),
    (0x01FF, "oslashacute"),
    (0x02C6, "circumflex"),
    (0x02C7, "caron"),
    (0x02D8, "breve"),
    (0x02D9, "dotaccent"),
    (0x02DA, "ring"),
    (0x02DB, "ogonek"),
    (0x02DC, "tilde"),
    (0x02DD, "hungarumlaut"),
    (0x0300, "gravecomb"),
    (0x0301, "acutecomb"),
    (0x0303, "tildecomb"),
    (0x0309, "hookabovecomb"),
    (0x0323, "dotbelowcomb"),
    (0x2013, "endash"),
    (0x2014, "emdash"),
    (0x2018, "quoteleft"),
    (0x2019, "quoteright"),
    (0x201A, "quotesinglbase"),
    (0x201C, "quotedblleft"),
    (0x201D, "quotedblright"),
    (0x201E, "quotedblbase"),
    (0x2020, "dagger"),
    (0x2021, "daggerdbl"),
    (0x2022, "bullet"),
    (0x2026, "ellipsis"),
    (0x2030, "perthousand"),
    (0x2032, "minute"),
    (0x2033, "second"),
    (0x2039, "guilsinglleft"),
    (0x203A, "guilsinglright"),
    (0x2044, "fraction"),
    (0x20AC, "Euro"),
    (0x2122, "trademark"),
    (0x2212, "minus"),
];

/// Production name for a single code point.
pub fn glyph_name(codepoint: char) -> String {
    let cp = codepoint as u32;
    if codepoint.is_ascii_alphabetic() {
        return codepoint.to_string();
    }
    match NAMED_CODEPOINTS.binary_search_by_key(&cp, |(c, _)| *c) {
        Ok(index) => NAMED_CODEPOINTS[index].1.to_string(),
        Err(_) if cp <= 0xFFFF => format!("uni{cp:04X}"),
        Err(_) => format!("u{cp:05X}"),
    }
}

/// Reverse of [`glyph_name`] for encoded glyphs. Unencoded names (ligatures,
/// variants) return `None`.
pub fn codepoint_for_name(name: &str) -> Option<char> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphabetic() {
            return Some(c);
        }
    }
    if let Some((cp, _)) = NAMED_CODEPOINTS.iter().find(|(_, n)| *n == name) {
        return char::from_u32(*cp);
    }
    let hex = name
        .strip_prefix("uni")
        .filter(|h| h.len() == 4)
        .or_else(|| name.strip_prefix('u').filter(|h| h.len() == 5 || h.len() == 6))?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

/// Name for a ligature glyph built from the given code points.
pub fn ligature_name(codepoints: &[char]) -> String {
    codepoints
        .iter()
        .map(|c| glyph_name(*c))
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted() {
        assert!(
            NAMED_CODEPOINTS.windows(2).all(|w| w[0].0 < w[1].0),
            "name table must stay sorted for binary search"
        );
    }

    #[test]
    fn names_round_trip_through_codepoints() {
        for c in ['A', 'z', ',', 'Æ', 'ı', '\u{0300}', '\u{0308}', '‽', '\u{1F600}'] {
            let name = glyph_name(c);
            assert_eq!(codepoint_for_name(&name), Some(c), "round trip for {name}");
        }
        assert_eq!(glyph_name('\u{0308}'), "uni0308");
        assert_eq!(glyph_name('\u{1F600}'), "u1F600");
    }

    #[test]
    fn ligature_names_join_constituents() {
        assert_eq!(ligature_name(&['T', 'T']), "T_T");
        assert_eq!(ligature_name(&['r', ',']), "r_comma");
        assert_eq!(codepoint_for_name("T_T"), None);
        assert_eq!(codepoint_for_name("U.ss01"), None);
    }
}
