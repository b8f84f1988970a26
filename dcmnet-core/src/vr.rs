//! Value Representation codes.
use std::fmt;

/// The two-letter DICOM Value Representation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum VR {
    AE,
    AS,
    AT,
    CS,
    DA,
    DS,
    DT,
    FL,
    FD,
    IS,
    LO,
    LT,
    OB,
    OD,
    OF,
    OL,
    OV,
    OW,
    PN,
    SH,
    SL,
    SQ,
    SS,
    ST,
    SV,
    TM,
    UC,
    UI,
    UL,
    UN,
    UR,
    US,
    UT,
    UV,
}

impl VR {
    /// Parse a VR from its two-byte wire code.
    pub fn from_bytes(bytes: [u8; 2]) -> Option<VR> {
        use VR::*;
        Some(match &bytes {
            b"AE" => AE,
            b"AS" => AS,
            b"AT" => AT,
            b"CS" => CS,
            b"DA" => DA,
            b"DS" => DS,
            b"DT" => DT,
            b"FL" => FL,
            b"FD" => FD,
            b"IS" => IS,
            b"LO" => LO,
            b"LT" => LT,
            b"OB" => OB,
            b"OD" => OD,
            b"OF" => OF,
            b"OL" => OL,
            b"OV" => OV,
            b"OW" => OW,
            b"PN" => PN,
            b"SH" => SH,
            b"SL" => SL,
            b"SQ" => SQ,
            b"SS" => SS,
            b"ST" => ST,
            b"SV" => SV,
            b"TM" => TM,
            b"UC" => UC,
            b"UI" => UI,
            b"UL" => UL,
            b"UN" => UN,
            b"UR" => UR,
            b"US" => US,
            b"UT" => UT,
            b"UV" => UV,
            _ => return None,
        })
    }

    /// The two-byte wire code for this VR.
    pub fn to_bytes(self) -> [u8; 2] {
        let s: &str = self.as_str();
        [s.as_bytes()[0], s.as_bytes()[1]]
    }

    pub fn as_str(self) -> &'static str {
        use VR::*;
        match self {
            AE => "AE",
            AS => "AS",
            AT => "AT",
            CS => "CS",
            DA => "DA",
            DS => "DS",
            DT => "DT",
            FL => "FL",
            FD => "FD",
            IS => "IS",
            LO => "LO",
            LT => "LT",
            OB => "OB",
            OD => "OD",
            OF => "OF",
            OL => "OL",
            OV => "OV",
            OW => "OW",
            PN => "PN",
            SH => "SH",
            SL => "SL",
            SQ => "SQ",
            SS => "SS",
            ST => "ST",
            SV => "SV",
            TM => "TM",
            UC => "UC",
            UI => "UI",
            UL => "UL",
            UN => "UN",
            UR => "UR",
            US => "US",
            UT => "UT",
            UV => "UV",
        }
    }

    /// Whether this VR uses the "extended" explicit-VR length encoding: a
    /// 2-byte reserved field followed by a 4-byte length, rather than a
    /// plain 2-byte length.
    pub fn has_explicit_extended_length(self) -> bool {
        matches!(self, VR::OB | VR::OW | VR::OF | VR::OD | VR::OL | VR::OV | VR::SQ | VR::UC | VR::UR | VR::UT | VR::UN | VR::SV | VR::UV)
    }

    /// Whether values of this VR are padded with NUL (`UI`) rather than
    /// space when their length is odd.
    pub fn pads_with_nul(self) -> bool {
        matches!(self, VR::UI)
    }

    /// Whether this is a string-like VR (its value is textual).
    pub fn is_stringy(self) -> bool {
        use VR::*;
        matches!(
            self,
            AE | AS | CS | DA | DS | DT | IS | LO | LT | PN | SH | ST | TM | UC | UI | UR | UT
        )
    }
}

impl fmt::Display for VR {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_bytes() {
        for vr in [VR::SQ, VR::OB, VR::UI, VR::CS, VR::US] {
            assert_eq!(VR::from_bytes(vr.to_bytes()), Some(vr));
        }
    }

    #[test]
    fn extended_length_set() {
        assert!(VR::OB.has_explicit_extended_length());
        assert!(VR::SQ.has_explicit_extended_length());
        assert!(!VR::CS.has_explicit_extended_length());
        assert!(!VR::US.has_explicit_extended_length());
    }
}
