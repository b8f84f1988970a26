//! SCU (Service Class User) operations: C-ECHO, C-FIND, C-MOVE, C-STORE
//! (spec §4.G), each driving one short-lived association.
pub mod destination;
pub mod error;

pub use destination::Destination;
pub use error::{Error, Result};

use dcmnet_core::{ByteStream, Dataset};
use dcmnet_dimse::command::Priority;
use dcmnet_dimse::{message, Status};
use dcmnet_encoding::transfer_syntax::TransferSyntax;
use dcmnet_ul::association::{ClientAssociation, ClientAssociationOptions};
use error::{FailureStatusSnafu, NoAcceptedContextSnafu};
use snafu::{ensure, OptionExt};

const VERIFICATION_SOP_CLASS: &str = "1.2.840.10008.1.1";

fn default_transfer_syntaxes() -> Vec<String> {
    dcmnet_registry::transfer_syntax::default_proposed().iter().map(|s| s.to_string()).collect()
}

fn associate(dest: &Destination, abstract_syntax: &str) -> Result<ClientAssociation> {
    associate_with(dest, abstract_syntax, default_transfer_syntaxes())
}

fn associate_with(dest: &Destination, abstract_syntax: &str, transfer_syntaxes: Vec<String>) -> Result<ClientAssociation> {
    let assoc = ClientAssociationOptions::new()
        .with_calling_ae_title(dest.calling_ae_title.clone())
        .with_called_ae_title(dest.called_ae_title.clone())
        .with_presentation_context(abstract_syntax, transfer_syntaxes)
        .read_timeout(Some(dest.timeout))
        .establish(&dest.address())?;
    Ok(assoc)
}

/// Propose the instance's own transfer syntax first, then the two
/// uncompressed transfer syntaxes every conformant AE accepts, so a peer
/// that cannot take the source encoding still has somewhere to land.
fn store_transfer_syntaxes(source_transfer_syntax_uid: &str) -> Vec<String> {
    let mut proposed = vec![source_transfer_syntax_uid.to_string()];
    for uid in [
        dcmnet_encoding::transfer_syntax::EXPLICIT_VR_LITTLE_ENDIAN.uid,
        dcmnet_encoding::transfer_syntax::IMPLICIT_VR_LITTLE_ENDIAN.uid,
    ] {
        if !proposed.iter().any(|t| t == uid) {
            proposed.push(uid.to_string());
        }
    }
    proposed
}

fn negotiated_transfer_syntax(assoc: &ClientAssociation, abstract_syntax: &str) -> Result<(u8, &'static TransferSyntax)> {
    let pc = assoc
        .presentation_context_for(abstract_syntax)
        .context(NoAcceptedContextSnafu { abstract_syntax: abstract_syntax.to_string() })?;
    let ts = dcmnet_registry::get_transfer_syntax(&pc.transfer_syntax)
        .context(NoAcceptedContextSnafu { abstract_syntax: abstract_syntax.to_string() })?;
    Ok((pc.id, ts))
}

fn encode_dataset(ds: &Dataset, ts: &TransferSyntax) -> Vec<u8> {
    let mut stream = ByteStream::new();
    dcmnet_parser::write_body(&mut stream, ds, ts);
    stream.into_vec()
}

fn decode_dataset(bytes: &[u8], ts: &TransferSyntax) -> Result<Dataset> {
    let mut stream = ByteStream::from_bytes(bytes.to_vec());
    Ok(dcmnet_parser::read_body(&mut stream, ts, Default::default())?)
}

fn check_not_failure(status: Status) -> Result<()> {
    ensure!(!status.is_failure(), FailureStatusSnafu { status: status.code(), detail: format!("{status:?}") });
    Ok(())
}

/// Verify connectivity and application-level reachability, spec §8
/// scenario 1.
pub fn c_echo(dest: &Destination) -> Result<Status> {
    let mut assoc = associate(dest, VERIFICATION_SOP_CLASS)?;
    let (pc_id, _ts) = negotiated_transfer_syntax(&assoc, VERIFICATION_SOP_CLASS)?;

    let command = message::build_c_echo_rq(1);
    assoc.send_message(pc_id, &command, None)?;
    let response = assoc.receive_message()?;
    let rsp = message::decode_command(&response.command)?;
    let status = message::status(&rsp).unwrap_or(Status::Other(0xFFFF));
    tracing::debug!(called_ae_title = %dest.called_ae_title, status = status.code(), "C-ECHO complete");

    assoc.release()?;
    Ok(status)
}

/// Query a remote AE, invoking `on_result` once per matching identifier as
/// it streams in rather than buffering the whole result set (spec §4.G,
/// §8 scenario 3).
pub fn c_find(
    dest: &Destination,
    abstract_syntax: &str,
    identifier: &Dataset,
    mut on_result: impl FnMut(Dataset),
) -> Result<Status> {
    let mut assoc = associate(dest, abstract_syntax)?;
    let (pc_id, ts) = negotiated_transfer_syntax(&assoc, abstract_syntax)?;

    let command = message::build_c_find_rq(1, abstract_syntax, Priority::Medium);
    let identifier_bytes = encode_dataset(identifier, ts);
    assoc.send_message(pc_id, &command, Some(&identifier_bytes))?;

    let final_status = loop {
        let response = assoc.receive_message()?;
        let rsp = message::decode_command(&response.command)?;
        let status = message::status(&rsp).unwrap_or(Status::Other(0xFFFF));
        check_not_failure(status)?;

        if let Some(data) = response.data {
            on_result(decode_dataset(&data, ts)?);
        }
        if !status.is_pending() {
            break status;
        }
    };

    assoc.release()?;
    Ok(final_status)
}

/// Request a remote AE move matching instances to a third AE, invoking
/// `on_progress` as sub-operation counts arrive (spec §4.G, §8 scenario 5).
pub fn c_move(
    dest: &Destination,
    abstract_syntax: &str,
    move_destination_ae: &str,
    identifier: &Dataset,
    mut on_progress: impl FnMut(dcmnet_dimse::SubOperationCounts),
) -> Result<Status> {
    let mut assoc = associate(dest, abstract_syntax)?;
    let (pc_id, ts) = negotiated_transfer_syntax(&assoc, abstract_syntax)?;

    let command = message::build_c_move_rq(1, abstract_syntax, Priority::Medium, move_destination_ae);
    let identifier_bytes = encode_dataset(identifier, ts);
    assoc.send_message(pc_id, &command, Some(&identifier_bytes))?;

    let final_status = loop {
        let response = assoc.receive_message()?;
        let rsp = message::decode_command(&response.command)?;
        let status = message::status(&rsp).unwrap_or(Status::Other(0xFFFF));
        check_not_failure(status)?;
        on_progress(message::sub_operation_counts(&rsp));
        if !status.is_pending() {
            break status;
        }
    };

    assoc.release()?;
    Ok(final_status)
}

/// Send one composite instance, transcoding it into whatever transfer
/// syntax was negotiated before sending (spec §4.G, §8 scenario 4).
pub fn c_store(
    dest: &Destination,
    sop_class_uid: &str,
    sop_instance_uid: &str,
    source_transfer_syntax_uid: &str,
    dataset: &Dataset,
) -> Result<Status> {
    let mut assoc = associate_with(dest, sop_class_uid, store_transfer_syntaxes(source_transfer_syntax_uid))?;
    let (pc_id, target_ts) = negotiated_transfer_syntax(&assoc, sop_class_uid)?;
    let source_ts = dcmnet_registry::get_transfer_syntax(source_transfer_syntax_uid)
        .context(NoAcceptedContextSnafu { abstract_syntax: sop_class_uid.to_string() })?;

    let mut transcoded = dataset.clone();
    if source_ts.uid != target_ts.uid {
        tracing::debug!(source = source_ts.uid, target = target_ts.uid, "transcoding pixel data before C-STORE");
    }
    dcmnet_transcode::transcode(&mut transcoded, source_ts, target_ts)?;

    let command = message::build_c_store_rq(1, sop_class_uid, sop_instance_uid, Priority::Medium);
    let dataset_bytes = encode_dataset(&transcoded, target_ts);
    assoc.send_message(pc_id, &command, Some(&dataset_bytes))?;

    let response = assoc.receive_message()?;
    let rsp = message::decode_command(&response.command)?;
    let status = message::status(&rsp).unwrap_or(Status::Other(0xFFFF));

    assoc.release()?;
    Ok(status)
}
