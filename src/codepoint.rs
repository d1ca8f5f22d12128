// WHY: every view of player text iterates by Unicode scalar value, never by
// UTF-16 unit or raw byte, so a surrogate-pair glyph is one code point each

use anyhow::{bail, Result};

/// Decompose text into its Unicode scalar values.
pub fn decompose(text: &str) -> Vec<u32> {
    text.chars().map(|ch| ch as u32).collect()
}

/// Render a code point as lowercase hexadecimal, no zero padding.
pub fn encode_hex(code_point: u32) -> String {
    format!("{code_point:x}")
}

/// Reconstruct the character for a lowercase-hex code point.
///
/// Inverse of [`encode_hex`]. Only internally generated values reach this
/// path; an invalid string or a value outside the scalar range is an error.
pub fn decode_hex(hex: &str) -> Result<char> {
    let value = match u32::from_str_radix(hex, 16) {
        Ok(value) => value,
        Err(e) => bail!("invalid hex code point {hex:?}: {e}"),
    };
    match char::from_u32(value) {
        Some(ch) => Ok(ch),
        None => bail!("{value:#x} is not a Unicode scalar value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_ascii() {
        assert_eq!(decompose("abc"), vec![0x61, 0x62, 0x63]);
        assert_eq!(decompose(""), Vec::<u32>::new());
    }

    #[test]
    fn test_surrogate_pair_is_one_code_point() {
        // U+1F980 is stored as a surrogate pair in UTF-16; it must still
        // decompose to exactly one code point
        let points = decompose("🦀");
        assert_eq!(points, vec![0x1F980]);

        let points = decompose("a🦀b");
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], 0x1F980);
    }

    #[test]
    fn test_hex_round_trip() {
        for ch in ['a', ' ', 'é', '世', '🦀', '\0'] {
            let hex = encode_hex(ch as u32);
            assert_eq!(decode_hex(&hex).unwrap(), ch);
        }
    }

    #[test]
    fn test_encode_hex_no_padding() {
        assert_eq!(encode_hex(0x9), "9");
        assert_eq!(encode_hex(0x61), "61");
        assert_eq!(encode_hex(0x1F980), "1f980");
    }

    #[test]
    fn test_decode_hex_rejects_garbage() {
        assert!(decode_hex("not-hex").is_err());
        assert!(decode_hex("").is_err());
        // Surrogate range is not a scalar value
        assert!(decode_hex("d800").is_err());
    }
}
