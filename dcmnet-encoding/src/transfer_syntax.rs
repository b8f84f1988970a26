//! Transfer syntax descriptors.
use dcmnet_core::Endian;

/// Identifies a pluggable pixel-data codec by the UID it applies to. The
/// codec implementation itself is external (see `dcmnet-registry`); this is
/// just a marker of whether one is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// No pixel-data transcoding involved (native syntaxes).
    None,
    /// Requires a registered encode/decode pair to cross.
    Pluggable,
}

/// A recognized DICOM transfer syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSyntax {
    pub uid: &'static str,
    pub name: &'static str,
    pub explicit_vr: bool,
    pub big_endian: bool,
    pub encapsulated: bool,
    pub codec: Codec,
}

impl TransferSyntax {
    pub fn endian(&self) -> Endian {
        if self.big_endian {
            Endian::Big
        } else {
            Endian::Little
        }
    }
}

macro_rules! ts {
    ($uid:expr, $name:expr, $explicit:expr, $big_endian:expr, $encapsulated:expr, $codec:expr) => {
        TransferSyntax {
            uid: $uid,
            name: $name,
            explicit_vr: $explicit,
            big_endian: $big_endian,
            encapsulated: $encapsulated,
            codec: $codec,
        }
    };
}

pub const IMPLICIT_VR_LITTLE_ENDIAN: TransferSyntax =
    ts!("1.2.840.10008.1.2", "Implicit VR Little Endian", false, false, false, Codec::None);

pub const EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax =
    ts!("1.2.840.10008.1.2.1", "Explicit VR Little Endian", true, false, false, Codec::None);

pub const EXPLICIT_VR_BIG_ENDIAN: TransferSyntax =
    ts!("1.2.840.10008.1.2.2", "Explicit VR Big Endian", true, true, false, Codec::None);

pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: TransferSyntax = ts!(
    "1.2.840.10008.1.2.1.99",
    "Deflated Explicit VR Little Endian",
    true,
    false,
    false,
    Codec::Pluggable
);

pub const JPEG_BASELINE_8BIT: TransferSyntax = ts!(
    "1.2.840.10008.1.2.4.50",
    "JPEG Baseline (Process 1)",
    true,
    false,
    true,
    Codec::Pluggable
);

pub const JPEG_EXTENDED_12BIT: TransferSyntax = ts!(
    "1.2.840.10008.1.2.4.51",
    "JPEG Extended (Process 2 & 4)",
    true,
    false,
    true,
    Codec::Pluggable
);

pub const JPEG_LOSSLESS_SV1: TransferSyntax = ts!(
    "1.2.840.10008.1.2.4.70",
    "JPEG Lossless, Non-Hierarchical, First-Order Prediction (Process 14 SV1)",
    true,
    false,
    true,
    Codec::Pluggable
);

pub const JPEG_LS_LOSSLESS: TransferSyntax = ts!(
    "1.2.840.10008.1.2.4.80",
    "JPEG-LS Lossless Image Compression",
    true,
    false,
    true,
    Codec::Pluggable
);

pub const JPEG_2000_LOSSLESS: TransferSyntax = ts!(
    "1.2.840.10008.1.2.4.90",
    "JPEG 2000 Image Compression (Lossless Only)",
    true,
    false,
    true,
    Codec::Pluggable
);

pub const JPEG_2000: TransferSyntax = ts!(
    "1.2.840.10008.1.2.4.91",
    "JPEG 2000 Image Compression",
    true,
    false,
    true,
    Codec::Pluggable
);

pub const RLE_LOSSLESS: TransferSyntax = ts!(
    "1.2.840.10008.1.2.5",
    "RLE Lossless",
    true,
    false,
    true,
    Codec::Pluggable
);

/// Every transfer syntax this stack recognizes by UID, per spec §3.
pub const ALL: &[TransferSyntax] = &[
    IMPLICIT_VR_LITTLE_ENDIAN,
    EXPLICIT_VR_LITTLE_ENDIAN,
    EXPLICIT_VR_BIG_ENDIAN,
    DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
    JPEG_BASELINE_8BIT,
    JPEG_EXTENDED_12BIT,
    JPEG_LOSSLESS_SV1,
    JPEG_LS_LOSSLESS,
    JPEG_2000_LOSSLESS,
    JPEG_2000,
    RLE_LOSSLESS,
];

/// Look up a transfer syntax by UID.
///
/// Some producers are known to emit one trailing byte beyond the UID
/// proper; if the exact UID is not found, the lookup retries with the last
/// code point stripped before giving up (spec §9 open question).
pub fn by_uid(uid: &str) -> Option<&'static TransferSyntax> {
    let trimmed = uid.trim_end_matches('\0');
    if let Some(ts) = ALL.iter().find(|ts| ts.uid == trimmed) {
        return Some(ts);
    }
    let mut chars = trimmed.chars();
    chars.next_back();
    let shortened = chars.as_str();
    ALL.iter().find(|ts| ts.uid == shortened)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_known_uid() {
        assert_eq!(by_uid("1.2.840.10008.1.2").unwrap().uid, IMPLICIT_VR_LITTLE_ENDIAN.uid);
    }

    #[test]
    fn tolerates_trailing_byte() {
        let with_trailing = format!("{}\0", EXPLICIT_VR_LITTLE_ENDIAN.uid);
        assert!(by_uid(&with_trailing).is_some());
        let with_garbage = format!("{}X", EXPLICIT_VR_LITTLE_ENDIAN.uid);
        assert!(by_uid(&with_garbage).is_some());
    }

    #[test]
    fn unknown_uid_fails() {
        assert!(by_uid("9.9.9.9").is_none());
    }
}
