//! File Meta Information (group 0002) read/write, always Explicit VR
//! Little Endian regardless of the body's transfer syntax (spec §4.B step
//! 2, §6).
use crate::header_io::{read_header, write_header, ElementHeader};
use dcmnet_core::bytestream::Endian;
use dcmnet_core::error::{BadMetaSnafu, Result};
use dcmnet_core::{ByteStream, Length, Tag, VR};
use dcmnet_dictionary::StandardDictionary;
use snafu::ensure;

pub const DICM_MAGIC: &[u8; 4] = b"DICM";
const PREAMBLE_LEN: usize = 128;

/// The decoded File Meta Information group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMeta {
    pub media_storage_sop_class_uid: String,
    pub media_storage_sop_instance_uid: String,
    pub transfer_syntax_uid: String,
    pub implementation_class_uid: String,
    pub implementation_version_name: String,
    pub source_application_entity_title: String,
}

/// Read the 128-byte preamble and `DICM` magic. Returns `false` (headerless
/// stream) if the magic is absent, per spec §4.B step 1 - the caller must
/// then assume Implicit VR Little Endian and skip straight to the body.
pub fn read_preamble(stream: &mut ByteStream) -> Result<bool> {
    if stream.remaining() < PREAMBLE_LEN + 4 {
        return Ok(false);
    }
    let start = stream.position();
    let _preamble = stream.read_bytes(PREAMBLE_LEN)?;
    let magic = stream.read_bytes(4)?;
    if magic == DICM_MAGIC {
        Ok(true)
    } else {
        stream.seek(start);
        Ok(false)
    }
}

/// Read the group-0002 file meta elements (Explicit VR Little Endian).
/// Stops at the first element whose group is not `0002`, leaving the
/// cursor positioned at that element's tag for the caller to resume body
/// decoding from.
pub fn read_file_meta(stream: &mut ByteStream) -> Result<FileMeta> {
    let dict = StandardDictionary::new();
    let mut meta = FileMeta::default();

    // group length element: (0002,0000) UL
    let header = read_header(stream, true, Endian::Little, &dict)?;
    ensure!(header.tag == Tag(0x0002, 0x0000), BadMetaSnafu);
    let group_length = stream.read_u32(Endian::Little)? as usize;
    let group_end = stream.position() + group_length;

    while stream.position() < group_end {
        let header = read_header(stream, true, Endian::Little, &dict)?;
        if header.tag.group() != 0x0002 {
            break;
        }
        let len = header.length.get().unwrap_or(0) as usize;
        let bytes = stream.read_bytes(len)?.to_vec();
        let text = String::from_utf8_lossy(&bytes)
            .trim_end_matches(['\0', ' '])
            .to_string();
        match header.tag {
            Tag(0x0002, 0x0002) => meta.media_storage_sop_class_uid = text,
            Tag(0x0002, 0x0003) => meta.media_storage_sop_instance_uid = text,
            Tag(0x0002, 0x0010) => meta.transfer_syntax_uid = text,
            Tag(0x0002, 0x0012) => meta.implementation_class_uid = text,
            Tag(0x0002, 0x0013) => meta.implementation_version_name = text,
            Tag(0x0002, 0x0016) => meta.source_application_entity_title = text,
            _ => {}
        }
    }

    ensure!(!meta.transfer_syntax_uid.is_empty(), BadMetaSnafu);
    Ok(meta)
}

/// Write the 128-byte zero preamble, `DICM` magic, and the file meta group,
/// backfilling the group length after the fact (spec §4.B / §6).
pub fn write_file_meta(stream: &mut ByteStream, meta: &FileMeta) {
    stream.write_bytes(&[0u8; PREAMBLE_LEN]);
    stream.write_bytes(DICM_MAGIC);

    write_header(
        stream,
        true,
        Endian::Little,
        ElementHeader {
            tag: Tag(0x0002, 0x0000),
            vr: VR::UL,
            length: Length(4),
        },
    );
    let group_length_value_pos = stream.position();
    stream.write_u32(0, Endian::Little); // placeholder, backfilled below

    let body_start = stream.position();
    write_meta_string(stream, Tag(0x0002, 0x0002), VR::UI, &meta.media_storage_sop_class_uid);
    write_meta_string(
        stream,
        Tag(0x0002, 0x0003),
        VR::UI,
        &meta.media_storage_sop_instance_uid,
    );
    write_meta_string(stream, Tag(0x0002, 0x0010), VR::UI, &meta.transfer_syntax_uid);
    write_meta_string(
        stream,
        Tag(0x0002, 0x0012),
        VR::UI,
        &meta.implementation_class_uid,
    );
    write_meta_string(
        stream,
        Tag(0x0002, 0x0013),
        VR::SH,
        &meta.implementation_version_name,
    );
    if !meta.source_application_entity_title.is_empty() {
        write_meta_string(
            stream,
            Tag(0x0002, 0x0016),
            VR::AE,
            &meta.source_application_entity_title,
        );
    }
    let body_end = stream.position();

    let group_length = (body_end - body_start) as u32;
    let resume = stream.position();
    stream.seek(group_length_value_pos);
    stream.write_u32(group_length, Endian::Little);
    stream.seek(resume);
}

fn write_meta_string(stream: &mut ByteStream, tag: Tag, vr: VR, value: &str) {
    let padded = dcmnet_core::DataElement::pad_value(vr, value.as_bytes().to_vec());
    write_header(
        stream,
        true,
        Endian::Little,
        ElementHeader {
            tag,
            vr,
            length: Length(padded.len() as u32),
        },
    );
    stream.write_bytes(&padded);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_meta() -> FileMeta {
        FileMeta {
            media_storage_sop_class_uid: "1.2.840.10008.1.1".to_string(),
            media_storage_sop_instance_uid: "1.2.3.4.5".to_string(),
            transfer_syntax_uid: "1.2.840.10008.1.2.1".to_string(),
            implementation_class_uid: "1.2.826.0.1.3680043.10.90.999".to_string(),
            implementation_version_name: "TESTIMPL".to_string(),
            source_application_entity_title: "TESTAE".to_string(),
        }
    }

    #[test]
    fn round_trips() {
        let mut s = ByteStream::new();
        write_file_meta(&mut s, &sample_meta());
        s.seek(0);
        assert!(read_preamble(&mut s).unwrap());
        let meta = read_file_meta(&mut s).unwrap();
        assert_eq!(meta, sample_meta());
    }

    #[test]
    fn headerless_stream_detected() {
        let mut s = ByteStream::from_bytes(vec![0u8; 8]);
        assert!(!read_preamble(&mut s).unwrap());
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn unknown_ts_rejected_by_caller() {
        let mut meta = sample_meta();
        meta.transfer_syntax_uid.clear();
        let mut s = ByteStream::new();
        write_file_meta(&mut s, &meta);
        s.seek(0);
        read_preamble(&mut s).unwrap();
        assert!(read_file_meta(&mut s).is_err());
    }
}
