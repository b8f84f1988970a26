//! Building and parsing DIMSE command sets, always Implicit VR Little
//! Endian regardless of the negotiated transfer syntax (spec §4.E).
use crate::command::*;
use crate::error::{MissingElementSnafu, Result, UnknownCommandFieldSnafu};
use crate::status::{Status, SubOperationCounts};
use dcmnet_core::bytestream::Endian;
use dcmnet_core::{ByteStream, DataElement, Dataset, Tag, Value, VR};
use dcmnet_encoding::transfer_syntax::IMPLICIT_VR_LITTLE_ENDIAN;
use snafu::OptionExt;

fn push_us(ds: &mut Dataset, tag: Tag, value: u16) {
    ds.push(DataElement::new(tag, VR::US, Value::Primitive(value.to_le_bytes().to_vec()), Endian::Little));
}

fn push_ul(ds: &mut Dataset, tag: Tag, value: u32) {
    ds.push(DataElement::new(tag, VR::UL, Value::Primitive(value.to_le_bytes().to_vec()), Endian::Little));
}

fn push_str(ds: &mut Dataset, tag: Tag, vr: VR, value: &str) {
    let bytes = DataElement::pad_value(vr, value.as_bytes().to_vec());
    ds.push(DataElement::new(tag, vr, Value::Primitive(bytes), Endian::Little));
}

fn get_us(ds: &Dataset, tag: Tag) -> Option<u16> {
    ds.get(tag).map(|e| e.as_ushort())
}

fn get_str(ds: &Dataset, tag: Tag) -> Option<String> {
    ds.get(tag).map(|e| e.as_string())
}

/// Assemble a command set's group-length prefix and serialize it to bytes,
/// spec §4.E: Command Group Length (0000,0000) is the byte count of every
/// element that follows it in the Implicit VR Little Endian encoding.
fn finalize(mut elements: Vec<DataElement>) -> Vec<u8> {
    let mut body_only = Dataset::new(false, false);
    for e in elements.drain(..) {
        body_only.push(e);
    }
    let mut sizing = ByteStream::new();
    dcmnet_parser::write_body(&mut sizing, &body_only, &IMPLICIT_VR_LITTLE_ENDIAN);
    let group_length = sizing.len() as u32;

    let mut full = Dataset::new(false, false);
    push_ul(&mut full, COMMAND_GROUP_LENGTH, group_length);
    for e in body_only.into_elements() {
        full.push(e);
    }
    let mut stream = ByteStream::new();
    dcmnet_parser::write_body(&mut stream, &full, &IMPLICIT_VR_LITTLE_ENDIAN);
    stream.into_vec()
}

/// Parse a raw command set (Implicit VR Little Endian) into a [`Dataset`].
pub fn decode_command(bytes: &[u8]) -> Result<Dataset> {
    let mut stream = ByteStream::from_bytes(bytes.to_vec());
    Ok(dcmnet_parser::read_body(&mut stream, &IMPLICIT_VR_LITTLE_ENDIAN, Default::default())?)
}

pub fn command_field(ds: &Dataset) -> Result<CommandField> {
    let code = get_us(ds, COMMAND_FIELD).context(MissingElementSnafu { tag: "(0000,0100) CommandField".to_string() })?;
    CommandField::from_code(code).context(UnknownCommandFieldSnafu { code }).inspect_err(|_| {
        tracing::warn!(code, "received a command set with an unrecognized command field");
    })
}

pub fn message_id(ds: &Dataset) -> Option<u16> {
    get_us(ds, MESSAGE_ID)
}

pub fn message_id_being_responded_to(ds: &Dataset) -> Option<u16> {
    get_us(ds, MESSAGE_ID_BEING_RESPONDED_TO)
}

pub fn status(ds: &Dataset) -> Option<Status> {
    get_us(ds, STATUS).map(Status::from_code)
}

pub fn has_data_set(ds: &Dataset) -> bool {
    get_us(ds, COMMAND_DATA_SET_TYPE).map(|v| v != DATA_SET_TYPE_NONE).unwrap_or(false)
}

pub fn affected_sop_class_uid(ds: &Dataset) -> Option<String> {
    get_str(ds, AFFECTED_SOP_CLASS_UID)
}

pub fn affected_sop_instance_uid(ds: &Dataset) -> Option<String> {
    get_str(ds, AFFECTED_SOP_INSTANCE_UID)
}

pub fn move_destination(ds: &Dataset) -> Option<String> {
    get_str(ds, MOVE_DESTINATION)
}

pub fn sub_operation_counts(ds: &Dataset) -> SubOperationCounts {
    SubOperationCounts {
        remaining: get_us(ds, NUMBER_OF_REMAINING_SUBOPERATIONS).unwrap_or(0) as u32,
        completed: get_us(ds, NUMBER_OF_COMPLETED_SUBOPERATIONS).unwrap_or(0) as u32,
        failed: get_us(ds, NUMBER_OF_FAILED_SUBOPERATIONS).unwrap_or(0) as u32,
        warning: get_us(ds, NUMBER_OF_WARNING_SUBOPERATIONS).unwrap_or(0) as u32,
    }
}

pub fn build_c_echo_rq(message_id: u16) -> Vec<u8> {
    let mut ds = Dataset::new(false, false);
    push_str(&mut ds, AFFECTED_SOP_CLASS_UID, VR::UI, "1.2.840.10008.1.1");
    push_us(&mut ds, COMMAND_FIELD, CommandField::CEchoRq.code());
    push_us(&mut ds, MESSAGE_ID, message_id);
    push_us(&mut ds, COMMAND_DATA_SET_TYPE, DATA_SET_TYPE_NONE);
    finalize(ds.into_elements())
}

pub fn build_c_echo_rsp(responding_to: u16, status: Status) -> Vec<u8> {
    let mut ds = Dataset::new(false, false);
    push_str(&mut ds, AFFECTED_SOP_CLASS_UID, VR::UI, "1.2.840.10008.1.1");
    push_us(&mut ds, COMMAND_FIELD, CommandField::CEchoRsp.code());
    push_us(&mut ds, MESSAGE_ID_BEING_RESPONDED_TO, responding_to);
    push_us(&mut ds, COMMAND_DATA_SET_TYPE, DATA_SET_TYPE_NONE);
    push_us(&mut ds, STATUS, status.code());
    finalize(ds.into_elements())
}

pub fn build_c_find_rq(message_id: u16, affected_sop_class_uid: &str, priority: Priority) -> Vec<u8> {
    let mut ds = Dataset::new(false, false);
    push_str(&mut ds, AFFECTED_SOP_CLASS_UID, VR::UI, affected_sop_class_uid);
    push_us(&mut ds, COMMAND_FIELD, CommandField::CFindRq.code());
    push_us(&mut ds, MESSAGE_ID, message_id);
    push_us(&mut ds, PRIORITY, priority.code());
    push_us(&mut ds, COMMAND_DATA_SET_TYPE, DATA_SET_TYPE_PRESENT);
    finalize(ds.into_elements())
}

pub fn build_c_find_rsp(responding_to: u16, affected_sop_class_uid: &str, status: Status) -> Vec<u8> {
    let mut ds = Dataset::new(false, false);
    push_str(&mut ds, AFFECTED_SOP_CLASS_UID, VR::UI, affected_sop_class_uid);
    push_us(&mut ds, COMMAND_FIELD, CommandField::CFindRsp.code());
    push_us(&mut ds, MESSAGE_ID_BEING_RESPONDED_TO, responding_to);
    let has_identifier = status.is_pending();
    push_us(
        &mut ds,
        COMMAND_DATA_SET_TYPE,
        if has_identifier { DATA_SET_TYPE_PRESENT } else { DATA_SET_TYPE_NONE },
    );
    push_us(&mut ds, STATUS, status.code());
    finalize(ds.into_elements())
}

pub fn build_c_move_rq(message_id: u16, affected_sop_class_uid: &str, priority: Priority, move_destination: &str) -> Vec<u8> {
    let mut ds = Dataset::new(false, false);
    push_str(&mut ds, AFFECTED_SOP_CLASS_UID, VR::UI, affected_sop_class_uid);
    push_us(&mut ds, COMMAND_FIELD, CommandField::CMoveRq.code());
    push_us(&mut ds, MESSAGE_ID, message_id);
    push_str(&mut ds, MOVE_DESTINATION, VR::AE, move_destination);
    push_us(&mut ds, PRIORITY, priority.code());
    push_us(&mut ds, COMMAND_DATA_SET_TYPE, DATA_SET_TYPE_PRESENT);
    finalize(ds.into_elements())
}

pub fn build_c_move_rsp(
    responding_to: u16,
    affected_sop_class_uid: &str,
    status: Status,
    counts: SubOperationCounts,
) -> Vec<u8> {
    let mut ds = Dataset::new(false, false);
    push_str(&mut ds, AFFECTED_SOP_CLASS_UID, VR::UI, affected_sop_class_uid);
    push_us(&mut ds, COMMAND_FIELD, CommandField::CMoveRsp.code());
    push_us(&mut ds, MESSAGE_ID_BEING_RESPONDED_TO, responding_to);
    push_us(&mut ds, COMMAND_DATA_SET_TYPE, DATA_SET_TYPE_NONE);
    push_us(&mut ds, STATUS, status.code());
    push_us(&mut ds, NUMBER_OF_REMAINING_SUBOPERATIONS, counts.remaining as u16);
    push_us(&mut ds, NUMBER_OF_COMPLETED_SUBOPERATIONS, counts.completed as u16);
    push_us(&mut ds, NUMBER_OF_FAILED_SUBOPERATIONS, counts.failed as u16);
    push_us(&mut ds, NUMBER_OF_WARNING_SUBOPERATIONS, counts.warning as u16);
    finalize(ds.into_elements())
}

pub fn build_c_store_rq(
    message_id: u16,
    affected_sop_class_uid: &str,
    affected_sop_instance_uid: &str,
    priority: Priority,
) -> Vec<u8> {
    let mut ds = Dataset::new(false, false);
    push_str(&mut ds, AFFECTED_SOP_CLASS_UID, VR::UI, affected_sop_class_uid);
    push_us(&mut ds, COMMAND_FIELD, CommandField::CStoreRq.code());
    push_us(&mut ds, MESSAGE_ID, message_id);
    push_us(&mut ds, PRIORITY, priority.code());
    push_us(&mut ds, COMMAND_DATA_SET_TYPE, DATA_SET_TYPE_PRESENT);
    push_str(&mut ds, AFFECTED_SOP_INSTANCE_UID, VR::UI, affected_sop_instance_uid);
    finalize(ds.into_elements())
}

pub fn build_c_store_rsp(
    responding_to: u16,
    affected_sop_class_uid: &str,
    affected_sop_instance_uid: &str,
    status: Status,
) -> Vec<u8> {
    let mut ds = Dataset::new(false, false);
    push_str(&mut ds, AFFECTED_SOP_CLASS_UID, VR::UI, affected_sop_class_uid);
    push_us(&mut ds, COMMAND_FIELD, CommandField::CStoreRsp.code());
    push_us(&mut ds, MESSAGE_ID_BEING_RESPONDED_TO, responding_to);
    push_us(&mut ds, COMMAND_DATA_SET_TYPE, DATA_SET_TYPE_NONE);
    push_str(&mut ds, AFFECTED_SOP_INSTANCE_UID, VR::UI, affected_sop_instance_uid);
    push_us(&mut ds, STATUS, status.code());
    finalize(ds.into_elements())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_echo_round_trips() {
        let bytes = build_c_echo_rq(7);
        let ds = decode_command(&bytes).unwrap();
        assert_eq!(command_field(&ds).unwrap(), CommandField::CEchoRq);
        assert_eq!(message_id(&ds), Some(7));
        assert!(!has_data_set(&ds));
    }

    #[test]
    fn c_echo_rsp_carries_status() {
        let bytes = build_c_echo_rsp(7, Status::Success);
        let ds = decode_command(&bytes).unwrap();
        assert_eq!(command_field(&ds).unwrap(), CommandField::CEchoRsp);
        assert_eq!(status(&ds), Some(Status::Success));
        assert_eq!(message_id_being_responded_to(&ds), Some(7));
    }

    #[test]
    fn c_find_rq_proposes_an_identifier() {
        let bytes = build_c_find_rq(1, "1.2.840.10008.5.1.4.1.2.2.1", Priority::Medium);
        let ds = decode_command(&bytes).unwrap();
        assert!(has_data_set(&ds));
        assert_eq!(affected_sop_class_uid(&ds).as_deref(), Some("1.2.840.10008.5.1.4.1.2.2.1"));
    }

    #[test]
    fn c_find_rsp_pending_has_identifier_success_does_not() {
        let pending = decode_command(&build_c_find_rsp(1, "1.2.3", Status::Pending)).unwrap();
        assert!(has_data_set(&pending));
        let done = decode_command(&build_c_find_rsp(1, "1.2.3", Status::Success)).unwrap();
        assert!(!has_data_set(&done));
    }

    #[test]
    fn c_move_rsp_reports_suboperation_counts() {
        let counts = SubOperationCounts { remaining: 2, completed: 3, failed: 0, warning: 0 };
        let bytes = build_c_move_rsp(5, "1.2.3", Status::Pending, counts);
        let ds = decode_command(&bytes).unwrap();
        let decoded = sub_operation_counts(&ds);
        assert_eq!(decoded, counts);
        assert!(!decoded.done());
    }

    #[test]
    fn c_store_rq_round_trips_instance_uid() {
        let bytes = build_c_store_rq(2, "1.2.840.10008.5.1.4.1.1.7", "1.2.3.4.5", Priority::High);
        let ds = decode_command(&bytes).unwrap();
        assert_eq!(affected_sop_instance_uid(&ds).as_deref(), Some("1.2.3.4.5"));
    }

    #[test]
    fn group_length_matches_trailing_bytes() {
        let bytes = build_c_echo_rq(1);
        let ds = decode_command(&bytes).unwrap();
        let group_len = ds.get(COMMAND_GROUP_LENGTH).unwrap().as_uint() as usize;
        // CommandGroupLength's own element occupies an 8-byte implicit-VR header plus a 4-byte value.
        assert_eq!(bytes.len(), 12 + group_len);
    }
}
