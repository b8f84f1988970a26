//! PDV fragmentation and reassembly, spec §4.D.
use crate::error::{AbortedByPeerSnafu, InvalidStateSnafu, MalformedSnafu, Result};
use crate::pdu::{read_pdu_from_reader, write_pdu_to_writer, Pdu, Pdv};
use snafu::ensure;
use std::io::{Read, Write};

/// A fully reassembled DIMSE command, with its associated data set if one
/// followed (spec §4.D: "two consecutive results for command+data").
#[derive(Debug, Clone)]
pub struct DimseMessage {
    pub presentation_context_id: u8,
    pub command: Vec<u8>,
    pub data: Option<Vec<u8>>,
}

/// Per-PDV overhead within a P-DATA-TF PDU body: a 4-byte item length field
/// plus 1 byte presentation-context ID and 1 byte message control header.
const PDV_HEADER_LEN: u32 = 6;

/// Split `payload` into PDVs of at most `max_pdu_length - PDV_HEADER_LEN`
/// bytes each, one PDV per outbound P-DATA-TF PDU, marking the final
/// fragment's last-fragment bit.
pub fn fragment(pc_id: u8, is_command: bool, payload: &[u8], max_pdu_length: u32) -> Vec<Pdu> {
    let chunk_len = (max_pdu_length.saturating_sub(PDV_HEADER_LEN)).max(1) as usize;
    if payload.is_empty() {
        return vec![Pdu::PData {
            pdvs: vec![Pdv { presentation_context_id: pc_id, is_command, is_last: true, data: Vec::new() }],
        }];
    }
    let chunks: Vec<&[u8]> = payload.chunks(chunk_len).collect();
    let last_index = chunks.len() - 1;
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| Pdu::PData {
            pdvs: vec![Pdv {
                presentation_context_id: pc_id,
                is_command,
                is_last: i == last_index,
                data: chunk.to_vec(),
            }],
        })
        .collect()
}

/// Write a fragmented command (and optional data set) as one or more
/// P-DATA-TF PDUs, in command-then-data order per spec §4.D.
pub fn send_message<W: Write>(
    writer: &mut W,
    pc_id: u8,
    max_pdu_length: u32,
    command: &[u8],
    data: Option<&[u8]>,
) -> Result<()> {
    for pdu in fragment(pc_id, true, command, max_pdu_length) {
        write_pdu_to_writer(writer, &pdu)?;
    }
    if let Some(data) = data {
        for pdu in fragment(pc_id, false, data, max_pdu_length) {
            write_pdu_to_writer(writer, &pdu)?;
        }
    }
    Ok(())
}

/// Read P-DATA-TF PDUs off `reader`, reassembling the command (and the
/// following data set, if any) for a single presentation context.
///
/// Whether a data set follows is decided by the command set's own Command
/// Data Set Type (0000,0800) element (spec §4.E), never by attempting a
/// read and seeing whether it fails: a command-only message (C-ECHO,
/// C-STORE-RSP, the terminal status of a C-FIND/C-MOVE loop, ...) would
/// otherwise block for the full read timeout - or forever, with
/// `read_timeout(None)` - waiting for a data set that was never coming.
pub fn receive_message<R: Read>(reader: &mut R) -> Result<DimseMessage> {
    let (pc_id, command) = receive_fragment_stream(reader, true)?;
    if !command_has_data_set(&command) {
        return Ok(DimseMessage { presentation_context_id: pc_id, command, data: None });
    }
    let (data_pc_id, data) = receive_fragment_stream(reader, false)?;
    ensure!(
        data_pc_id == pc_id,
        MalformedSnafu { message: "data set presentation context differs from command".to_string() }
    );
    Ok(DimseMessage { presentation_context_id: pc_id, command, data: Some(data) })
}

/// Command Data Set Type (0000,0800): 0x0101 means no data set follows,
/// any other value means one does (spec §4.E).
const COMMAND_DATA_SET_TYPE: (u16, u16) = (0x0000, 0x0800);
const DATA_SET_TYPE_NONE: u16 = 0x0101;

/// Scan a reassembled command set - always Implicit VR Little Endian
/// regardless of the negotiated transfer syntax (spec §4.E) - for the
/// Command Data Set Type element. This only needs to recognize one
/// fixed-format, known-VR element, so it reads the raw Implicit VR tag
/// header (group, element, 4-byte length) directly rather than pulling in
/// a full data set decoder.
fn command_has_data_set(command: &[u8]) -> bool {
    let mut offset = 0;
    while offset + 8 <= command.len() {
        let group = u16::from_le_bytes([command[offset], command[offset + 1]]);
        let element = u16::from_le_bytes([command[offset + 2], command[offset + 3]]);
        let length = u32::from_le_bytes([
            command[offset + 4],
            command[offset + 5],
            command[offset + 6],
            command[offset + 7],
        ]) as usize;
        let value_start = offset + 8;
        if value_start + length > command.len() {
            return false;
        }
        if (group, element) == COMMAND_DATA_SET_TYPE {
            return length >= 2 && u16::from_le_bytes([command[value_start], command[value_start + 1]]) != DATA_SET_TYPE_NONE;
        }
        offset = value_start + length;
    }
    false
}

fn receive_fragment_stream<R: Read>(reader: &mut R, expect_command: bool) -> Result<(u8, Vec<u8>)> {
    let mut pc_id = None;
    let mut buf = Vec::new();
    loop {
        let pdu = read_pdu_from_reader(reader)?;
        match pdu {
            Pdu::PData { pdvs } => {
                for pdv in pdvs {
                    ensure!(
                        pdv.is_command == expect_command,
                        MalformedSnafu { message: "PDV command/data bit did not match expected stream".to_string() }
                    );
                    pc_id.get_or_insert(pdv.presentation_context_id);
                    buf.extend_from_slice(&pdv.data);
                    if pdv.is_last {
                        return Ok((pc_id.unwrap(), buf));
                    }
                }
            }
            Pdu::Abort { .. } => return AbortedByPeerSnafu.fail(),
            Pdu::ReleaseRq | Pdu::ReleaseRp => {
                return InvalidStateSnafu { state: "release received while awaiting P-DATA-TF".to_string() }.fail();
            }
            other => {
                return InvalidStateSnafu { state: format!("unexpected {other} while awaiting P-DATA-TF") }.fail();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_respect_max_pdu_length() {
        let payload = vec![0xAAu8; 100];
        let pdus = fragment(1, true, &payload, 30);
        assert!(pdus.len() > 1);
        for (i, pdu) in pdus.iter().enumerate() {
            let Pdu::PData { pdvs } = pdu else { panic!("expected P-DATA-TF") };
            assert_eq!(pdvs.len(), 1);
            assert!(pdvs[0].data.len() as u32 <= 30 - PDV_HEADER_LEN);
            assert_eq!(pdvs[0].is_last, i == pdus.len() - 1);
        }
    }

    /// Builds a minimal Implicit VR Little Endian command set containing
    /// only the Command Data Set Type element, the one `command_has_data_set`
    /// looks for.
    fn command_bytes(data_set_present: bool) -> Vec<u8> {
        let mut buf = vec![0x00, 0x00, 0x00, 0x08, 0x02, 0x00, 0x00, 0x00];
        let value: u16 = if data_set_present { 0x0000 } else { DATA_SET_TYPE_NONE };
        buf.extend_from_slice(&value.to_le_bytes());
        buf
    }

    #[test]
    fn command_has_data_set_reads_the_data_set_type_element() {
        assert!(command_has_data_set(&command_bytes(true)));
        assert!(!command_has_data_set(&command_bytes(false)));
        assert!(!command_has_data_set(b""));
        assert!(!command_has_data_set(b"not a command set"));
    }

    #[test]
    fn send_then_receive_round_trips_command_and_data() {
        let command = command_bytes(true);
        let mut buf = Vec::new();
        send_message(&mut buf, 3, 16384, &command, Some(b"DATASET-BYTES")).unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let msg = receive_message(&mut cursor).unwrap();
        assert_eq!(msg.presentation_context_id, 3);
        assert_eq!(msg.command, command);
        assert_eq!(msg.data.as_deref(), Some(&b"DATASET-BYTES"[..]));
    }

    #[test]
    fn send_then_receive_command_only() {
        let command = command_bytes(false);
        let mut buf = Vec::new();
        send_message(&mut buf, 1, 16384, &command, None).unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let msg = receive_message(&mut cursor).unwrap();
        assert_eq!(msg.command, command);
        assert!(msg.data.is_none());
    }
}
