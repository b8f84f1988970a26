//! Minimal text helpers for string-valued elements.
//!
//! Full DICOM Specific Character Set (0008,0005) decoding - ISO-2022
//! escape sequences, multi-byte Asian charsets - is treated as an external
//! concern; this module covers the default (ASCII/Latin-1) repertoire used
//! by every other element in the data set.

/// Trim a decoded string value of its trailing NUL/space padding.
pub fn trim_padding(s: &str) -> &str {
    s.trim_end_matches(['\0', ' '])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_both_pad_kinds() {
        assert_eq!(trim_padding("ABC \0"), "ABC");
        assert_eq!(trim_padding("ABC"), "ABC");
    }
}
