//! Thread-per-connection accept loop dispatching DIMSE requests to a
//! [`ServiceProvider`], spec §4.D/§4.G.
use crate::error::{Result, UnknownNegotiatedTransferSyntaxSnafu};
use crate::handlers::ServiceProvider;
use dcmnet_core::{ByteStream, Dataset};
use dcmnet_dimse::command::CommandField;
use dcmnet_dimse::{message, Status};
use dcmnet_ul::association::{IncomingAssociation, ServerAssociationOptions};
use snafu::OptionExt;
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Builder configuring what associations an SCP accepts, mirroring
/// [`ServerAssociationOptions`] one level up.
#[derive(Debug, Clone)]
pub struct ScpOptions {
    inner: ServerAssociationOptions,
}

impl Default for ScpOptions {
    fn default() -> Self {
        ScpOptions { inner: ServerAssociationOptions::new() }
    }
}

impl ScpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ae_title(mut self, title: impl Into<String>) -> Self {
        self.inner = self.inner.with_ae_title(title);
        self
    }

    pub fn with_allowed_calling_ae_title(mut self, title: impl Into<String>) -> Self {
        self.inner = self.inner.with_allowed_calling_ae_title(title);
        self
    }

    pub fn with_supported_abstract_syntax(mut self, abstract_syntax: impl Into<String>, transfer_syntaxes: Vec<String>) -> Self {
        self.inner = self.inner.with_supported_abstract_syntax(abstract_syntax, transfer_syntaxes);
        self
    }

    pub fn max_pdu_length(mut self, len: u32) -> Self {
        self.inner = self.inner.max_pdu_length(len);
        self
    }

    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.inner = self.inner.read_timeout(timeout);
        self
    }

    /// Accept connections from `listener` forever, handing each one to its
    /// own thread. Returns only if `listener.accept()` itself errors.
    pub fn serve(self, listener: TcpListener, handler: Arc<dyn ServiceProvider>) -> std::io::Result<()> {
        for incoming in listener.incoming() {
            let stream = incoming?;
            let options = self.inner.clone();
            let handler = Arc::clone(&handler);
            thread::spawn(move || {
                if let Err(err) = handle_connection(options, stream, handler) {
                    tracing::warn!(%err, "association ended with an error");
                }
            });
        }
        Ok(())
    }
}

fn transfer_syntax_of(assoc: &IncomingAssociation, pc_id: u8) -> Result<&'static dcmnet_encoding::transfer_syntax::TransferSyntax> {
    let uid = assoc.transfer_syntax_for(pc_id).context(UnknownNegotiatedTransferSyntaxSnafu { pc_id })?;
    dcmnet_registry::get_transfer_syntax(uid).context(UnknownNegotiatedTransferSyntaxSnafu { pc_id })
}

fn decode_identifier(bytes: &[u8], ts: &dcmnet_encoding::transfer_syntax::TransferSyntax) -> Result<Dataset> {
    let mut stream = ByteStream::from_bytes(bytes.to_vec());
    Ok(dcmnet_parser::read_body(&mut stream, ts, Default::default())?)
}

fn encode_dataset(ds: &Dataset, ts: &dcmnet_encoding::transfer_syntax::TransferSyntax) -> Vec<u8> {
    let mut stream = ByteStream::new();
    dcmnet_parser::write_body(&mut stream, ds, ts);
    stream.into_vec()
}

/// Service the single DIMSE operation an association carries (spec §4.G:
/// an SCU drives one operation per association), then wait for the peer's
/// A-RELEASE-RQ.
fn handle_connection(options: ServerAssociationOptions, stream: std::net::TcpStream, handler: Arc<dyn ServiceProvider>) -> Result<()> {
    let mut assoc = options.accept(stream)?;
    if !handler.on_association_request(&assoc.calling_ae_title, &assoc.called_ae_title) {
        return Ok(());
    }

    let request = match assoc.receive_message() {
        Ok(message) => message,
        Err(dcmnet_ul::Error::AbortedByPeer) => return Ok(()),
        Err(err) => return Err(err.into()),
    };
    let command = message::decode_command(&request.command)?;
    let pc_id = request.presentation_context_id;
    let message_id = message::message_id(&command).unwrap_or(0);

    match message::command_field(&command)? {
        CommandField::CEchoRq => {
            let status = handler.on_c_echo();
            let response = message::build_c_echo_rsp(message_id, status);
            assoc.send_message(pc_id, &response, None)?;
        }
        CommandField::CFindRq => {
            let sop_class_uid = message::affected_sop_class_uid(&command).unwrap_or_default();
            let ts = transfer_syntax_of(&assoc, pc_id)?;
            let identifier = decode_identifier(request.data.as_deref().unwrap_or(&[]), ts)?;

            let mut results = Vec::new();
            let status = handler.on_c_find(&sop_class_uid, &identifier, &mut |found| results.push(found));

            for result in results {
                let response = message::build_c_find_rsp(message_id, &sop_class_uid, Status::Pending);
                let identifier_bytes = encode_dataset(&result, ts);
                assoc.send_message(pc_id, &response, Some(&identifier_bytes))?;
            }
            let response = message::build_c_find_rsp(message_id, &sop_class_uid, status);
            assoc.send_message(pc_id, &response, None)?;
        }
        CommandField::CMoveRq => {
            let sop_class_uid = message::affected_sop_class_uid(&command).unwrap_or_default();
            let move_destination = message::move_destination(&command).unwrap_or_default();
            let ts = transfer_syntax_of(&assoc, pc_id)?;
            let identifier = decode_identifier(request.data.as_deref().unwrap_or(&[]), ts)?;

            let mut send_err = None;
            let status = handler.on_c_move(&sop_class_uid, &move_destination, &identifier, &mut |counts| {
                if send_err.is_some() {
                    return;
                }
                let response = message::build_c_move_rsp(message_id, &sop_class_uid, Status::Pending, counts);
                if let Err(err) = assoc.send_message(pc_id, &response, None) {
                    send_err = Some(err);
                }
            });
            if let Some(err) = send_err {
                return Err(err.into());
            }

            let response =
                message::build_c_move_rsp(message_id, &sop_class_uid, status, dcmnet_dimse::SubOperationCounts::default());
            assoc.send_message(pc_id, &response, None)?;
        }
        CommandField::CStoreRq => {
            let sop_class_uid = message::affected_sop_class_uid(&command).unwrap_or_default();
            let sop_instance_uid = message::affected_sop_instance_uid(&command).unwrap_or_default();
            let ts = transfer_syntax_of(&assoc, pc_id)?;
            let dataset = decode_identifier(request.data.as_deref().unwrap_or(&[]), ts)?;

            let status = handler.on_c_store(&sop_class_uid, &sop_instance_uid, ts.uid, &dataset);
            let response = message::build_c_store_rsp(message_id, &sop_class_uid, &sop_instance_uid, status);
            assoc.send_message(pc_id, &response, None)?;
        }
        other => {
            tracing::warn!(?other, "unexpected DIMSE command field on an SCP association");
            return Ok(());
        }
    }

    handler.on_association_release();
    match assoc.await_release() {
        Ok(()) => Ok(()),
        Err(dcmnet_ul::Error::AbortedByPeer) => Ok(()),
        Err(err) => Err(err.into()),
    }
}
