//! Big-endian wire encoding for upper-layer PDUs, spec §3/§4.C.
use super::types::*;
use crate::error::{MalformedSnafu, Result, TruncatedItemSnafu, UnknownPduTypeSnafu};
use dcmnet_core::bytestream::Endian;
use dcmnet_core::ByteStream;
use snafu::ensure;
use std::io::{Read, Write};

const PDU_ASSOCIATE_RQ: u8 = 0x01;
const PDU_ASSOCIATE_AC: u8 = 0x02;
const PDU_ASSOCIATE_RJ: u8 = 0x03;
const PDU_P_DATA_TF: u8 = 0x04;
const PDU_RELEASE_RQ: u8 = 0x05;
const PDU_RELEASE_RP: u8 = 0x06;
const PDU_ABORT: u8 = 0x07;

const ITEM_APPLICATION_CONTEXT: u8 = 0x10;
const ITEM_PRESENTATION_CONTEXT_RQ: u8 = 0x20;
const ITEM_PRESENTATION_CONTEXT_AC: u8 = 0x21;
const ITEM_ABSTRACT_SYNTAX: u8 = 0x30;
const ITEM_TRANSFER_SYNTAX: u8 = 0x40;
const ITEM_USER_INFORMATION: u8 = 0x50;
const ITEM_MAX_LENGTH: u8 = 0x51;
const ITEM_IMPLEMENTATION_CLASS_UID: u8 = 0x52;
const ITEM_ASYNC_OPS_WINDOW: u8 = 0x53;
const ITEM_ROLE_SELECTION: u8 = 0x54;
const ITEM_IMPLEMENTATION_VERSION_NAME: u8 = 0x55;

/// Read one full PDU: type byte, reserved byte, 4-byte big-endian length,
/// and a body of exactly that many bytes.
pub fn read_pdu(stream: &mut ByteStream) -> Result<Pdu> {
    let pdu_type = stream.read_u8()?;
    let _reserved = stream.read_u8()?;
    let length = stream.read_u32(Endian::Big)? as usize;
    let body = stream.read_bytes(length)?.to_vec();
    let mut body = ByteStream::from_bytes(body);

    match pdu_type {
        PDU_ASSOCIATE_RQ => read_associate_rq(&mut body),
        PDU_ASSOCIATE_AC => read_associate_ac(&mut body),
        PDU_ASSOCIATE_RJ => read_associate_rj(&mut body),
        PDU_P_DATA_TF => read_p_data(&mut body, length),
        PDU_RELEASE_RQ => Ok(Pdu::ReleaseRq),
        PDU_RELEASE_RP => Ok(Pdu::ReleaseRp),
        PDU_ABORT => read_abort(&mut body),
        other => UnknownPduTypeSnafu { pdu_type: other }.fail(),
    }
}

/// Write one full PDU, backfilling its length field after the body is laid
/// out, the same seek-back pattern used for File Meta group length.
pub fn write_pdu(stream: &mut ByteStream, pdu: &Pdu) {
    let pdu_type = match pdu {
        Pdu::AssociateRq { .. } => PDU_ASSOCIATE_RQ,
        Pdu::AssociateAc { .. } => PDU_ASSOCIATE_AC,
        Pdu::AssociateRj { .. } => PDU_ASSOCIATE_RJ,
        Pdu::PData { .. } => PDU_P_DATA_TF,
        Pdu::ReleaseRq => PDU_RELEASE_RQ,
        Pdu::ReleaseRp => PDU_RELEASE_RP,
        Pdu::Abort { .. } => PDU_ABORT,
    };
    stream.write_u8(pdu_type);
    stream.write_u8(0);
    let length_pos = stream.position();
    stream.write_u32(0, Endian::Big);
    let body_start = stream.position();

    match pdu {
        Pdu::AssociateRq {
            protocol_version,
            calling_ae_title,
            called_ae_title,
            application_context_name,
            presentation_contexts,
            user_information,
        } => write_associate_rq(
            stream,
            *protocol_version,
            called_ae_title,
            calling_ae_title,
            application_context_name,
            presentation_contexts,
            user_information,
        ),
        Pdu::AssociateAc {
            protocol_version,
            calling_ae_title,
            called_ae_title,
            application_context_name,
            presentation_contexts,
            user_information,
        } => write_associate_ac(
            stream,
            *protocol_version,
            called_ae_title,
            calling_ae_title,
            application_context_name,
            presentation_contexts,
            user_information,
        ),
        Pdu::AssociateRj { result, source, reason } => {
            stream.write_u8(0);
            stream.write_u8(*result as u8);
            stream.write_u8(*source as u8);
            stream.write_u8(reason.code());
        }
        Pdu::PData { pdvs } => write_p_data(stream, pdvs),
        Pdu::ReleaseRq | Pdu::ReleaseRp => stream.write_u32(0, Endian::Big),
        Pdu::Abort { source, reason } => {
            stream.write_u8(0);
            stream.write_u8(0);
            stream.write_u8(abort_source_code(*source));
            stream.write_u8(abort_reason_code(*reason));
        }
    }

    let body_end = stream.position();
    let body_len = (body_end - body_start) as u32;
    let resume = stream.position();
    stream.seek(length_pos);
    stream.write_u32(body_len, Endian::Big);
    stream.seek(resume);
}

fn fixed_ae_title(title: &str) -> [u8; 16] {
    let mut buf = [b' '; 16];
    let bytes = title.as_bytes();
    let n = bytes.len().min(16);
    buf[..n].copy_from_slice(&bytes[..n]);
    buf
}

fn read_fixed_ae_title(stream: &mut ByteStream) -> Result<String> {
    let bytes = stream.read_bytes(16)?.to_vec();
    Ok(String::from_utf8_lossy(&bytes).trim_end().to_string())
}

fn read_item_header(stream: &mut ByteStream) -> Result<(u8, usize)> {
    let item_type = stream.read_u8()?;
    let _reserved = stream.read_u8()?;
    let length = stream.read_u16(Endian::Big)? as usize;
    Ok((item_type, length))
}

fn write_item_header(stream: &mut ByteStream, item_type: u8, length: u16) {
    stream.write_u8(item_type);
    stream.write_u8(0);
    stream.write_u16(length, Endian::Big);
}

fn write_string_item(stream: &mut ByteStream, item_type: u8, value: &str) {
    write_item_header(stream, item_type, value.len() as u16);
    stream.write_bytes(value.as_bytes());
}

fn read_string_item_body(stream: &mut ByteStream, length: usize) -> Result<String> {
    let bytes = stream.read_bytes(length)?.to_vec();
    Ok(String::from_utf8_lossy(&bytes).trim_end_matches(['\0', ' ']).to_string())
}

fn read_associate_rq(body: &mut ByteStream) -> Result<Pdu> {
    let protocol_version = body.read_u16(Endian::Big)?;
    let _reserved = body.read_u16(Endian::Big)?;
    let called_ae_title = read_fixed_ae_title(body)?;
    let calling_ae_title = read_fixed_ae_title(body)?;
    let _reserved32 = body.read_bytes(32)?;

    let mut application_context_name = String::new();
    let mut presentation_contexts = Vec::new();
    let mut user_information = UserInformation::default();

    while body.remaining() > 0 {
        let (item_type, length) = read_item_header(body)?;
        match item_type {
            ITEM_APPLICATION_CONTEXT => {
                application_context_name = read_string_item_body(body, length)?;
            }
            ITEM_PRESENTATION_CONTEXT_RQ => {
                presentation_contexts.push(read_presentation_context_rq(body, length)?);
            }
            ITEM_USER_INFORMATION => {
                user_information = read_user_information(body, length)?;
            }
            _ => {
                body.read_bytes(length)?;
            }
        }
    }

    Ok(Pdu::AssociateRq {
        protocol_version,
        calling_ae_title,
        called_ae_title,
        application_context_name,
        presentation_contexts,
        user_information,
    })
}

fn read_associate_ac(body: &mut ByteStream) -> Result<Pdu> {
    let protocol_version = body.read_u16(Endian::Big)?;
    let _reserved = body.read_u16(Endian::Big)?;
    let called_ae_title = read_fixed_ae_title(body)?;
    let calling_ae_title = read_fixed_ae_title(body)?;
    let _reserved32 = body.read_bytes(32)?;

    let mut application_context_name = String::new();
    let mut presentation_contexts = Vec::new();
    let mut user_information = UserInformation::default();

    while body.remaining() > 0 {
        let (item_type, length) = read_item_header(body)?;
        match item_type {
            ITEM_APPLICATION_CONTEXT => {
                application_context_name = read_string_item_body(body, length)?;
            }
            ITEM_PRESENTATION_CONTEXT_AC => {
                presentation_contexts.push(read_presentation_context_ac(body, length)?);
            }
            ITEM_USER_INFORMATION => {
                user_information = read_user_information(body, length)?;
            }
            _ => {
                body.read_bytes(length)?;
            }
        }
    }

    Ok(Pdu::AssociateAc {
        protocol_version,
        calling_ae_title,
        called_ae_title,
        application_context_name,
        presentation_contexts,
        user_information,
    })
}

fn read_presentation_context_rq(body: &mut ByteStream, length: usize) -> Result<PresentationContextProposed> {
    let start = body.position();
    let id = body.read_u8()?;
    let _reserved = body.read_bytes(3)?;

    let mut abstract_syntax = String::new();
    let mut transfer_syntaxes = Vec::new();
    while body.position() < start + length {
        let (item_type, item_len) = read_item_header(body)?;
        match item_type {
            ITEM_ABSTRACT_SYNTAX => abstract_syntax = read_string_item_body(body, item_len)?,
            ITEM_TRANSFER_SYNTAX => transfer_syntaxes.push(read_string_item_body(body, item_len)?),
            _ => {
                body.read_bytes(item_len)?;
            }
        }
    }
    ensure!(
        body.position() == start + length,
        TruncatedItemSnafu { expected: start + length, declared: body.position() }
    );
    Ok(PresentationContextProposed { id, abstract_syntax, transfer_syntaxes })
}

fn read_presentation_context_ac(body: &mut ByteStream, length: usize) -> Result<PresentationContextResult> {
    let start = body.position();
    let id = body.read_u8()?;
    let _reserved1 = body.read_u8()?;
    let reason_byte = body.read_u8()?;
    let _reserved2 = body.read_u8()?;
    let reason = PresentationContextResultReason::from_u8(reason_byte).unwrap_or(PresentationContextResultReason::NoReason);

    let mut transfer_syntax = String::new();
    while body.position() < start + length {
        let (item_type, item_len) = read_item_header(body)?;
        if item_type == ITEM_TRANSFER_SYNTAX {
            transfer_syntax = read_string_item_body(body, item_len)?;
        } else {
            body.read_bytes(item_len)?;
        }
    }
    Ok(PresentationContextResult { id, reason, transfer_syntax })
}

fn read_user_information(body: &mut ByteStream, length: usize) -> Result<UserInformation> {
    let start = body.position();
    let mut info = UserInformation {
        max_pdu_length: crate::DEFAULT_MAX_PDU_LENGTH,
        implementation_class_uid: String::new(),
        implementation_version_name: None,
        async_ops_window: None,
        role_selections: Vec::new(),
    };

    while body.position() < start + length {
        let (item_type, item_len) = read_item_header(body)?;
        match item_type {
            ITEM_MAX_LENGTH => {
                ensure!(item_len == 4, MalformedSnafu { message: "max-length item must be 4 bytes".to_string() });
                info.max_pdu_length = body.read_u32(Endian::Big)?;
            }
            ITEM_IMPLEMENTATION_CLASS_UID => {
                info.implementation_class_uid = read_string_item_body(body, item_len)?;
            }
            ITEM_IMPLEMENTATION_VERSION_NAME => {
                info.implementation_version_name = Some(read_string_item_body(body, item_len)?);
            }
            ITEM_ASYNC_OPS_WINDOW => {
                let invoked = body.read_u16(Endian::Big)?;
                let performed = body.read_u16(Endian::Big)?;
                info.async_ops_window = Some((invoked, performed));
            }
            ITEM_ROLE_SELECTION => {
                let item_start = body.position();
                let uid_len = body.read_u16(Endian::Big)? as usize;
                let uid = read_string_item_body(body, uid_len)?;
                let scu_role = body.read_u8()? != 0;
                let scp_role = body.read_u8()? != 0;
                let consumed = body.position() - item_start;
                if consumed < item_len {
                    body.read_bytes(item_len - consumed)?;
                }
                info.role_selections.push(RoleSelection { sop_class_uid: uid, scu_role, scp_role });
            }
            _ => {
                body.read_bytes(item_len)?;
            }
        }
    }
    Ok(info)
}

fn read_p_data(body: &mut ByteStream, total_len: usize) -> Result<Pdu> {
    let mut pdvs = Vec::new();
    let mut consumed = 0usize;
    while consumed < total_len {
        let item_len = body.read_u32(Endian::Big)? as usize;
        ensure!(item_len >= 2, MalformedSnafu { message: "PDV item shorter than its own header".to_string() });
        let presentation_context_id = body.read_u8()?;
        let control = body.read_u8()?;
        let data = body.read_bytes(item_len - 2)?.to_vec();
        pdvs.push(Pdv {
            presentation_context_id,
            is_command: control & 0x01 != 0,
            is_last: control & 0x02 != 0,
            data,
        });
        consumed += 4 + item_len;
    }
    Ok(Pdu::PData { pdvs })
}

fn read_associate_rj(body: &mut ByteStream) -> Result<Pdu> {
    let _reserved = body.read_u8()?;
    let result_byte = body.read_u8()?;
    let source_byte = body.read_u8()?;
    let reason_byte = body.read_u8()?;

    let result = match result_byte {
        1 => RejectResult::Permanent,
        _ => RejectResult::Transient,
    };
    let source = match source_byte {
        1 => RejectSource::ServiceUser,
        2 => RejectSource::ServiceProviderAcse,
        _ => RejectSource::ServiceProviderPresentation,
    };
    let reason = RejectReason::from_code(source, reason_byte);
    Ok(Pdu::AssociateRj { result, source, reason })
}

fn read_abort(body: &mut ByteStream) -> Result<Pdu> {
    let _reserved1 = body.read_u8()?;
    let _reserved2 = body.read_u8()?;
    let source_byte = body.read_u8()?;
    let reason_byte = body.read_u8()?;
    let source = if source_byte == 0 { AbortSource::ServiceUser } else { AbortSource::ServiceProvider };
    let reason = match reason_byte {
        1 => AbortReason::UnrecognizedPdu,
        2 => AbortReason::UnexpectedPdu,
        4 => AbortReason::UnrecognizedPduParameter,
        5 => AbortReason::UnexpectedPduParameter,
        6 => AbortReason::InvalidPduParameter,
        _ => AbortReason::NotSpecified,
    };
    Ok(Pdu::Abort { source, reason })
}

/// Read one PDU directly off a socket (or any `Read`): the 6-byte header is
/// read first to learn the body length, then exactly that many body bytes.
pub fn read_pdu_from_reader<R: Read>(reader: &mut R) -> Result<Pdu> {
    let mut header = [0u8; 6];
    reader.read_exact(&mut header)?;
    let length = u32::from_be_bytes([header[2], header[3], header[4], header[5]]) as usize;
    let mut buf = Vec::with_capacity(6 + length);
    buf.extend_from_slice(&header);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body)?;
    buf.extend_from_slice(&body);
    let mut stream = ByteStream::from_bytes(buf);
    read_pdu(&mut stream)
}

/// Encode a PDU and write it to a socket (or any `Write`) in one call.
pub fn write_pdu_to_writer<W: Write>(writer: &mut W, pdu: &Pdu) -> Result<()> {
    let mut stream = ByteStream::new();
    write_pdu(&mut stream, pdu);
    writer.write_all(stream.as_slice())?;
    Ok(())
}

fn abort_source_code(source: AbortSource) -> u8 {
    match source {
        AbortSource::ServiceUser => 0,
        AbortSource::ServiceProvider => 2,
    }
}

fn abort_reason_code(reason: AbortReason) -> u8 {
    match reason {
        AbortReason::NotSpecified => 0,
        AbortReason::UnrecognizedPdu => 1,
        AbortReason::UnexpectedPdu => 2,
        AbortReason::UnrecognizedPduParameter => 4,
        AbortReason::UnexpectedPduParameter => 5,
        AbortReason::InvalidPduParameter => 6,
    }
}

fn write_associate_rq(
    stream: &mut ByteStream,
    protocol_version: u16,
    called_ae_title: &str,
    calling_ae_title: &str,
    application_context_name: &str,
    presentation_contexts: &[PresentationContextProposed],
    user_information: &UserInformation,
) {
    stream.write_u16(protocol_version, Endian::Big);
    stream.write_u16(0, Endian::Big);
    stream.write_bytes(&fixed_ae_title(called_ae_title));
    stream.write_bytes(&fixed_ae_title(calling_ae_title));
    stream.write_bytes(&[0u8; 32]);

    write_string_item(stream, ITEM_APPLICATION_CONTEXT, application_context_name);
    for pc in presentation_contexts {
        write_presentation_context_rq(stream, pc);
    }
    write_user_information(stream, user_information);
}

fn write_associate_ac(
    stream: &mut ByteStream,
    protocol_version: u16,
    called_ae_title: &str,
    calling_ae_title: &str,
    application_context_name: &str,
    presentation_contexts: &[PresentationContextResult],
    user_information: &UserInformation,
) {
    stream.write_u16(protocol_version, Endian::Big);
    stream.write_u16(0, Endian::Big);
    stream.write_bytes(&fixed_ae_title(called_ae_title));
    stream.write_bytes(&fixed_ae_title(calling_ae_title));
    stream.write_bytes(&[0u8; 32]);

    write_string_item(stream, ITEM_APPLICATION_CONTEXT, application_context_name);
    for pc in presentation_contexts {
        write_presentation_context_ac(stream, pc);
    }
    write_user_information(stream, user_information);
}

fn write_presentation_context_rq(stream: &mut ByteStream, pc: &PresentationContextProposed) {
    let length_pos = write_item_header_placeholder(stream, ITEM_PRESENTATION_CONTEXT_RQ);
    stream.write_u8(pc.id);
    stream.write_bytes(&[0u8; 3]);
    write_string_item(stream, ITEM_ABSTRACT_SYNTAX, &pc.abstract_syntax);
    for ts in &pc.transfer_syntaxes {
        write_string_item(stream, ITEM_TRANSFER_SYNTAX, ts);
    }
    backfill_item_length(stream, length_pos);
}

fn write_presentation_context_ac(stream: &mut ByteStream, pc: &PresentationContextResult) {
    let length_pos = write_item_header_placeholder(stream, ITEM_PRESENTATION_CONTEXT_AC);
    stream.write_u8(pc.id);
    stream.write_u8(0);
    stream.write_u8(pc.reason as u8);
    stream.write_u8(0);
    write_string_item(stream, ITEM_TRANSFER_SYNTAX, &pc.transfer_syntax);
    backfill_item_length(stream, length_pos);
}

fn write_user_information(stream: &mut ByteStream, info: &UserInformation) {
    let length_pos = write_item_header_placeholder(stream, ITEM_USER_INFORMATION);

    write_item_header(stream, ITEM_MAX_LENGTH, 4);
    stream.write_u32(info.max_pdu_length, Endian::Big);

    write_string_item(stream, ITEM_IMPLEMENTATION_CLASS_UID, &info.implementation_class_uid);

    if let Some((invoked, performed)) = info.async_ops_window {
        write_item_header(stream, ITEM_ASYNC_OPS_WINDOW, 4);
        stream.write_u16(invoked, Endian::Big);
        stream.write_u16(performed, Endian::Big);
    }

    for role in &info.role_selections {
        let item_len = 2 + role.sop_class_uid.len() + 2;
        write_item_header(stream, ITEM_ROLE_SELECTION, item_len as u16);
        stream.write_u16(role.sop_class_uid.len() as u16, Endian::Big);
        stream.write_bytes(role.sop_class_uid.as_bytes());
        stream.write_u8(role.scu_role as u8);
        stream.write_u8(role.scp_role as u8);
    }

    if let Some(version) = &info.implementation_version_name {
        write_string_item(stream, ITEM_IMPLEMENTATION_VERSION_NAME, version);
    }

    backfill_item_length(stream, length_pos);
}

fn write_item_header_placeholder(stream: &mut ByteStream, item_type: u8) -> usize {
    stream.write_u8(item_type);
    stream.write_u8(0);
    let length_pos = stream.position();
    stream.write_u16(0, Endian::Big);
    length_pos
}

fn backfill_item_length(stream: &mut ByteStream, length_pos: usize) {
    let body_start = length_pos + 2;
    let end = stream.position();
    let len = (end - body_start) as u16;
    stream.seek(length_pos);
    stream.write_u16(len, Endian::Big);
    stream.seek(end);
}

fn write_p_data(stream: &mut ByteStream, pdvs: &[Pdv]) {
    for pdv in pdvs {
        let item_len = 2 + pdv.data.len();
        stream.write_u32(item_len as u32, Endian::Big);
        stream.write_u8(pdv.presentation_context_id);
        let mut control = 0u8;
        if pdv.is_command {
            control |= 0x01;
        }
        if pdv.is_last {
            control |= 0x02;
        }
        stream.write_u8(control);
        stream.write_bytes(&pdv.data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user_info() -> UserInformation {
        UserInformation {
            max_pdu_length: 16384,
            implementation_class_uid: "1.2.3.4".to_string(),
            implementation_version_name: Some("TESTVER".to_string()),
            async_ops_window: None,
            role_selections: Vec::new(),
        }
    }

    #[test]
    fn associate_rq_round_trips() {
        let pdu = Pdu::AssociateRq {
            protocol_version: 1,
            calling_ae_title: "SCU_AE".to_string(),
            called_ae_title: "SCP_AE".to_string(),
            application_context_name: crate::DEFAULT_APPLICATION_CONTEXT_NAME.to_string(),
            presentation_contexts: vec![PresentationContextProposed {
                id: 1,
                abstract_syntax: "1.2.840.10008.1.1".to_string(),
                transfer_syntaxes: vec!["1.2.840.10008.1.2".to_string()],
            }],
            user_information: sample_user_info(),
        };
        let mut stream = ByteStream::new();
        write_pdu(&mut stream, &pdu);
        stream.seek(0);
        let decoded = read_pdu(&mut stream).unwrap();
        assert_eq!(decoded, pdu);
    }

    #[test]
    fn associate_ac_round_trips() {
        let pdu = Pdu::AssociateAc {
            protocol_version: 1,
            calling_ae_title: "SCU_AE".to_string(),
            called_ae_title: "SCP_AE".to_string(),
            application_context_name: crate::DEFAULT_APPLICATION_CONTEXT_NAME.to_string(),
            presentation_contexts: vec![PresentationContextResult {
                id: 1,
                reason: PresentationContextResultReason::Accepted,
                transfer_syntax: "1.2.840.10008.1.2".to_string(),
            }],
            user_information: sample_user_info(),
        };
        let mut stream = ByteStream::new();
        write_pdu(&mut stream, &pdu);
        stream.seek(0);
        let decoded = read_pdu(&mut stream).unwrap();
        assert_eq!(decoded, pdu);
    }

    #[test]
    fn associate_rj_round_trips() {
        let pdu = Pdu::AssociateRj {
            result: RejectResult::Permanent,
            source: RejectSource::ServiceUser,
            reason: RejectReason::CalledAeNotRecognized,
        };
        let mut stream = ByteStream::new();
        write_pdu(&mut stream, &pdu);
        stream.seek(0);
        assert_eq!(read_pdu(&mut stream).unwrap(), pdu);
    }

    #[test]
    fn p_data_with_two_pdvs_round_trips() {
        let pdu = Pdu::PData {
            pdvs: vec![
                Pdv { presentation_context_id: 1, is_command: true, is_last: true, data: vec![1, 2, 3] },
                Pdv { presentation_context_id: 1, is_command: false, is_last: false, data: vec![4, 5] },
            ],
        };
        let mut stream = ByteStream::new();
        write_pdu(&mut stream, &pdu);
        stream.seek(0);
        assert_eq!(read_pdu(&mut stream).unwrap(), pdu);
    }

    #[test]
    fn release_and_abort_round_trip() {
        let mut stream = ByteStream::new();
        write_pdu(&mut stream, &Pdu::ReleaseRq);
        write_pdu(&mut stream, &Pdu::ReleaseRp);
        write_pdu(
            &mut stream,
            &Pdu::Abort { source: AbortSource::ServiceProvider, reason: AbortReason::UnexpectedPdu },
        );
        stream.seek(0);
        assert_eq!(read_pdu(&mut stream).unwrap(), Pdu::ReleaseRq);
        assert_eq!(read_pdu(&mut stream).unwrap(), Pdu::ReleaseRp);
        assert_eq!(
            read_pdu(&mut stream).unwrap(),
            Pdu::Abort { source: AbortSource::ServiceProvider, reason: AbortReason::UnexpectedPdu }
        );
    }

    #[test]
    fn unknown_pdu_type_is_rejected() {
        let mut stream = ByteStream::new();
        stream.write_u8(0xAA);
        stream.write_u8(0);
        stream.write_u32(0, Endian::Big);
        stream.seek(0);
        assert!(read_pdu(&mut stream).is_err());
    }
}
