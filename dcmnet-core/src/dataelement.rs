//! A single DICOM data element and its typed value accessors.
use crate::bytestream::Endian;
use crate::length::Length;
use crate::tag::Tag;
use crate::value::Value;
use crate::vr::VR;

/// A decoded DICOM data element.
///
/// `name`/`description` are denormalized fields populated from an external
/// data dictionary after decode; they are optional and never consulted for
/// correctness, only for human-readable dumps.
#[derive(Debug, Clone, PartialEq)]
pub struct DataElement {
    tag: Tag,
    vr: VR,
    value: Value,
    /// the endianness the raw primitive bytes were decoded with (or will be
    /// encoded with); irrelevant for sequences and fragments.
    endian: Endian,
    pub name: Option<String>,
}

impl DataElement {
    pub fn new(tag: Tag, vr: VR, value: Value, endian: Endian) -> Self {
        DataElement {
            tag,
            vr,
            value,
            endian,
            name: None,
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn vr(&self) -> VR {
        self.vr
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// The length this element's value occupies, `Length::UNDEFINED` for a
    /// still-undefined-length sequence or encapsulated pixel data.
    pub fn length(&self) -> Length {
        match &self.value {
            Value::Primitive(b) => Length(b.len() as u32),
            Value::Sequence(_) | Value::Fragments(_) => Length::UNDEFINED,
        }
    }

    /// Interpret the value as a trimmed ASCII string, stripping a single
    /// trailing NUL or space pad byte. Returns an empty string on failure
    /// rather than raising, per the accessor contract.
    pub fn as_string(&self) -> String {
        let Some(bytes) = self.value.as_primitive() else {
            return String::new();
        };
        let s = String::from_utf8_lossy(bytes);
        s.trim_end_matches(['\0', ' ']).to_string()
    }

    /// Multi-valued string attributes (VM > 1) are `\`-separated.
    pub fn as_strings(&self) -> Vec<String> {
        let s = self.as_string();
        if s.is_empty() {
            Vec::new()
        } else {
            s.split('\\').map(str::to_string).collect()
        }
    }

    pub fn as_ushort(&self) -> u16 {
        let Some(bytes) = self.value.as_primitive() else {
            return 0;
        };
        if bytes.len() < 2 {
            return 0;
        }
        let arr = [bytes[0], bytes[1]];
        match self.endian {
            Endian::Little => u16::from_le_bytes(arr),
            Endian::Big => u16::from_be_bytes(arr),
        }
    }

    pub fn as_uint(&self) -> u32 {
        let Some(bytes) = self.value.as_primitive() else {
            return 0;
        };
        if bytes.len() < 4 {
            return 0;
        }
        let arr = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match self.endian {
            Endian::Little => u32::from_le_bytes(arr),
            Endian::Big => u32::from_be_bytes(arr),
        }
    }

    /// Parse a `DA`-style `YYYYMMDD` value. Returns `None` on any failure.
    pub fn as_date(&self) -> Option<chrono::NaiveDate> {
        let s = self.as_string();
        let s = s.get(0..8)?;
        let year = s.get(0..4)?.parse().ok()?;
        let month = s.get(4..6)?.parse().ok()?;
        let day = s.get(6..8)?.parse().ok()?;
        chrono::NaiveDate::from_ymd_opt(year, month, day)
    }

    /// Parse a `TM`-style `HHMMSS` (fractional seconds ignored) value.
    pub fn as_time(&self) -> Option<chrono::NaiveTime> {
        let s = self.as_string();
        if s.len() < 2 {
            return None;
        }
        let hour = s.get(0..2)?.parse().ok()?;
        let minute = s.get(2..4).unwrap_or("00").parse().ok().unwrap_or(0);
        let second = s.get(4..6).unwrap_or("00").parse().ok().unwrap_or(0);
        chrono::NaiveTime::from_hms_opt(hour, minute, second)
    }

    /// Build the odd-length padded form of a primitive byte payload,
    /// following the VR-specific pad byte rule.
    pub fn pad_value(vr: VR, mut bytes: Vec<u8>) -> Vec<u8> {
        if bytes.len() % 2 != 0 {
            bytes.push(if vr.pads_with_nul() { 0x00 } else { 0x20 });
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elem(vr: VR, bytes: &[u8], endian: Endian) -> DataElement {
        DataElement::new(Tag(0x0010, 0x0010), vr, Value::Primitive(bytes.to_vec()), endian)
    }

    #[test]
    fn string_trims_pad() {
        let e = elem(VR::PN, b"Doe^John \0", Endian::Little);
        assert_eq!(e.as_string(), "Doe^John");
    }

    #[test]
    fn ushort_respects_endian() {
        let le = elem(VR::US, &[0x34, 0x12], Endian::Little);
        assert_eq!(le.as_ushort(), 0x1234);
        let be = elem(VR::US, &[0x12, 0x34], Endian::Big);
        assert_eq!(be.as_ushort(), 0x1234);
    }

    #[test]
    fn date_parses_basic_form() {
        let e = elem(VR::DA, b"20050323", Endian::Little);
        assert_eq!(e.as_date(), chrono::NaiveDate::from_ymd_opt(2005, 3, 23));
    }

    #[test]
    fn date_failure_returns_none_not_panic() {
        let e = elem(VR::DA, b"bad", Endian::Little);
        assert_eq!(e.as_date(), None);
    }

    #[test]
    fn padding_rules() {
        assert_eq!(DataElement::pad_value(VR::UI, b"1.2.3".to_vec()), b"1.2.3\0");
        assert_eq!(DataElement::pad_value(VR::SH, b"ABC".to_vec()), b"ABC ");
        assert_eq!(DataElement::pad_value(VR::UI, b"1.2.30".to_vec()), b"1.2.30");
    }
}
