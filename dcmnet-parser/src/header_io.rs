//! Low-level element header read/write: tag, VR, and length, per the VR
//! dispatch rules of spec §4.B.
use dcmnet_core::bytestream::Endian;
use dcmnet_core::error::{OddLengthSnafu, Result};
use dcmnet_core::{ByteStream, Length, Tag, VR};
use dcmnet_dictionary::DataDictionary;

/// A decoded element header: tag, VR, and declared length (which may be
/// `Length::UNDEFINED` for sequences and encapsulated pixel data).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementHeader {
    pub tag: Tag,
    pub vr: VR,
    pub length: Length,
}

/// Read one element header (tag + VR + length) from `stream`.
///
/// Item/Item-Delimiter/Sequence-Delimiter tags (group `FFFE`) never carry a
/// VR on the wire in either mode - only a 4-byte length follows the tag.
/// Otherwise: under implicit VR, the VR is always looked up from `dict`;
/// under explicit VR, the 2-byte wire VR is used, falling back to the
/// dictionary when the bytes don't parse to a recognized VR code.
pub fn read_header(
    stream: &mut ByteStream,
    explicit_vr: bool,
    endian: Endian,
    dict: &dyn DataDictionary,
) -> Result<ElementHeader> {
    let group = stream.read_u16(endian)?;
    let element = stream.read_u16(endian)?;
    let tag = Tag(group, element);

    if tag.group() == 0xFFFE {
        let length = Length(stream.read_u32(endian)?);
        return Ok(ElementHeader {
            tag,
            vr: VR::UN,
            length,
        });
    }

    if explicit_vr {
        let vr_bytes = stream.read_bytes(2)?;
        let vr = VR::from_bytes([vr_bytes[0], vr_bytes[1]]).unwrap_or_else(|| dict.vr_of(tag));
        let length = if vr.has_explicit_extended_length() {
            let _reserved = stream.read_u16(endian)?;
            Length(stream.read_u32(endian)?)
        } else {
            Length(stream.read_u16(endian)? as u32)
        };
        Ok(ElementHeader { tag, vr, length })
    } else {
        let vr = dict.vr_of(tag);
        let length = Length(stream.read_u32(endian)?);
        Ok(ElementHeader { tag, vr, length })
    }
}

/// Write an element header using the same dispatch rules as [`read_header`].
pub fn write_header(
    stream: &mut ByteStream,
    explicit_vr: bool,
    endian: Endian,
    header: ElementHeader,
) {
    stream.write_u16(header.tag.group(), endian);
    stream.write_u16(header.tag.element(), endian);

    if header.tag.group() == 0xFFFE {
        stream.write_u32(header.length.0, endian);
        return;
    }

    if explicit_vr {
        stream.write_bytes(&header.vr.to_bytes());
        if header.vr.has_explicit_extended_length() {
            stream.write_u16(0, endian);
            stream.write_u32(header.length.0, endian);
        } else {
            stream.write_u16(header.length.0 as u16, endian);
        }
    } else {
        stream.write_u32(header.length.0, endian);
    }
}

/// Validate that a primitive value's length is even, per spec §4.B step 4 /
/// §8 invariant. Delimiters and `SQ` headers are exempt (the caller never
/// calls this for them), and undefined length is always allowed.
///
/// When `tolerate_odd` is set (spec's `skipFillTag` option), a violation is
/// logged rather than rejected, matching real-world producers that get this
/// wrong.
pub fn validate_length(header: ElementHeader, tolerate_odd: bool) -> Result<()> {
    if header.length.is_undefined() {
        return Ok(());
    }
    if header.length.0 % 2 != 0 {
        if tolerate_odd {
            tracing::warn!(
                tag = %header.tag,
                vr = %header.vr,
                length = header.length.0,
                "tolerating odd-length element"
            );
            return Ok(());
        }
        return OddLengthSnafu {
            tag: header.tag,
            vr: header.vr.as_str(),
            length: header.length.0,
        }
        .fail();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmnet_dictionary::StandardDictionary;

    #[test]
    fn explicit_header_round_trip_short_form() {
        let dict = StandardDictionary::new();
        let mut s = ByteStream::new();
        write_header(
            &mut s,
            true,
            Endian::Little,
            ElementHeader {
                tag: Tag(0x0010, 0x0010),
                vr: VR::PN,
                length: Length(8),
            },
        );
        s.seek(0);
        let h = read_header(&mut s, true, Endian::Little, &dict).unwrap();
        assert_eq!(h.tag, Tag(0x0010, 0x0010));
        assert_eq!(h.vr, VR::PN);
        assert_eq!(h.length.0, 8);
    }

    #[test]
    fn explicit_header_round_trip_extended_form() {
        let dict = StandardDictionary::new();
        let mut s = ByteStream::new();
        write_header(
            &mut s,
            true,
            Endian::Little,
            ElementHeader {
                tag: Tag(0x7FE0, 0x0010),
                vr: VR::OW,
                length: Length::UNDEFINED,
            },
        );
        s.seek(0);
        let h = read_header(&mut s, true, Endian::Little, &dict).unwrap();
        assert_eq!(h.vr, VR::OW);
        assert!(h.length.is_undefined());
    }

    #[test]
    fn item_tag_has_no_vr_in_either_mode() {
        let dict = StandardDictionary::new();
        let mut s = ByteStream::new();
        write_header(
            &mut s,
            true,
            Endian::Little,
            ElementHeader {
                tag: Tag::ITEM,
                vr: VR::UN,
                length: Length(4),
            },
        );
        assert_eq!(s.len(), 8); // tag(4) + length(4), no VR bytes
        s.seek(0);
        let h = read_header(&mut s, true, Endian::Little, &dict).unwrap();
        assert_eq!(h.tag, Tag::ITEM);
        assert_eq!(h.length.0, 4);
    }

    #[test]
    fn implicit_vr_is_looked_up() {
        let dict = StandardDictionary::new();
        let mut s = ByteStream::new();
        s.write_u16(0x0010, Endian::Little);
        s.write_u16(0x0010, Endian::Little);
        s.write_u32(8, Endian::Little);
        s.seek(0);
        let h = read_header(&mut s, false, Endian::Little, &dict).unwrap();
        assert_eq!(h.vr, VR::PN);
    }

    #[test]
    fn odd_length_rejected_unless_tolerated() {
        let header = ElementHeader {
            tag: Tag(0x0010, 0x0010),
            vr: VR::PN,
            length: Length(7),
        };
        assert!(validate_length(header, false).is_err());
        assert!(validate_length(header, true).is_ok());
    }
}
