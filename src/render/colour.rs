//! Colour-code lookup

/// Colour used when a colour name is not in the table
pub const DEFAULT_COLOUR: &str = "#333333";

const COLOUR_TABLE: [(&str, &str); 9] = [
    ("yellow", "#FCD34D"),
    ("green", "#4ADE80"),
    ("blue", "#60A5FA"),
    ("red", "#F87171"),
    ("orange", "#FB923C"),
    ("purple", "#C084FC"),
    ("white", "#F1F5F9"),
    ("black", "#334155"),
    ("pink", "#F472B6"),
];

/// Hex display colour for a colour name, ignoring case
pub fn colour_hex(name: &str) -> &'static str {
    COLOUR_TABLE
        .iter()
        .find(|(colour, _)| colour.eq_ignore_ascii_case(name))
        .map(|(_, hex)| *hex)
        .unwrap_or(DEFAULT_COLOUR)
}

/// Split a `#RRGGBB` string into its components
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(colour_hex("yellow"), "#FCD34D");
        assert_eq!(colour_hex("Yellow"), "#FCD34D");
        assert_eq!(colour_hex("BLUE"), "#60A5FA");
        assert_eq!(colour_hex("pInK"), "#F472B6");
    }

    #[test]
    fn test_lookup_is_total() {
        assert_eq!(colour_hex("teal"), DEFAULT_COLOUR);
        assert_eq!(colour_hex(""), DEFAULT_COLOUR);
        for (name, hex) in COLOUR_TABLE {
            assert_eq!(colour_hex(name), hex);
            assert!(hex_to_rgb(hex).is_some());
        }
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#FCD34D"), Some((0xFC, 0xD3, 0x4D)));
        assert_eq!(hex_to_rgb(DEFAULT_COLOUR), Some((0x33, 0x33, 0x33)));
        assert_eq!(hex_to_rgb("FCD34D"), None);
        assert_eq!(hex_to_rgb("#FFF"), None);
    }
}
