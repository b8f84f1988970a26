//! SCP-side association acceptance, spec §4.D/§4.G.
use super::pdata::{self, DimseMessage};
use super::AssociationState;
use crate::error::{InvalidStateSnafu, Result};
use crate::pdu::{
    Pdu, PresentationContextResult, PresentationContextResultReason, RejectReason, RejectResult, RejectSource,
    UserInformation,
};
use snafu::ensure;
use std::net::TcpStream;
use std::time::Duration;

/// Builder configuring what an SCP will accept, mirroring
/// [`super::client::ClientAssociationOptions`].
#[derive(Debug, Clone)]
pub struct ServerAssociationOptions {
    ae_title: String,
    application_context_name: String,
    supported_abstract_syntaxes: Vec<(String, Vec<String>)>,
    allowed_calling_ae_titles: Option<Vec<String>>,
    max_pdu_length: u32,
    implementation_class_uid: String,
    implementation_version_name: Option<String>,
    read_timeout: Option<Duration>,
}

impl Default for ServerAssociationOptions {
    fn default() -> Self {
        ServerAssociationOptions {
            ae_title: "DCMNET_SCP".to_string(),
            application_context_name: crate::DEFAULT_APPLICATION_CONTEXT_NAME.to_string(),
            supported_abstract_syntaxes: Vec::new(),
            allowed_calling_ae_titles: None,
            max_pdu_length: crate::DEFAULT_MAX_PDU_LENGTH,
            implementation_class_uid: crate::DEFAULT_IMPLEMENTATION_CLASS_UID.to_string(),
            implementation_version_name: Some(crate::DEFAULT_IMPLEMENTATION_VERSION.to_string()),
            read_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ServerAssociationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ae_title(mut self, title: impl Into<String>) -> Self {
        self.ae_title = title.into();
        self
    }

    pub fn with_supported_abstract_syntax(mut self, abstract_syntax: impl Into<String>, transfer_syntaxes: Vec<String>) -> Self {
        self.supported_abstract_syntaxes.push((abstract_syntax.into(), transfer_syntaxes));
        self
    }

    /// Restrict which calling AE titles may establish an association; an
    /// unrecognized title gets an A-ASSOCIATE-RJ instead of an AC (spec §8
    /// scenario 2). Unrestricted (any calling AE title accepted) until
    /// called.
    pub fn with_allowed_calling_ae_title(mut self, title: impl Into<String>) -> Self {
        self.allowed_calling_ae_titles.get_or_insert_with(Vec::new).push(title.into());
        self
    }

    pub fn max_pdu_length(mut self, len: u32) -> Self {
        self.max_pdu_length = len;
        self
    }

    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Perform the A-ASSOCIATE-RQ/AC/RJ handshake over an already-accepted
    /// `TcpStream`, per spec §4.D.
    pub fn accept(self, mut stream: TcpStream) -> Result<IncomingAssociation> {
        stream.set_read_timeout(self.read_timeout)?;
        let request = crate::pdu::read_pdu_from_reader(&mut stream)?;

        let Pdu::AssociateRq {
            calling_ae_title,
            called_ae_title,
            application_context_name,
            presentation_contexts,
            user_information,
            ..
        } = request
        else {
            let rj = Pdu::Abort {
                source: crate::pdu::AbortSource::ServiceProvider,
                reason: crate::pdu::AbortReason::UnexpectedPdu,
            };
            crate::pdu::write_pdu_to_writer(&mut stream, &rj)?;
            return InvalidStateSnafu { state: "expected A-ASSOCIATE-RQ".to_string() }.fail();
        };

        if let Some(allowed) = &self.allowed_calling_ae_titles {
            if !allowed.iter().any(|title| title == &calling_ae_title) {
                let rj = Pdu::AssociateRj {
                    result: RejectResult::Permanent,
                    source: RejectSource::ServiceUser,
                    reason: RejectReason::CallingAeNotRecognized,
                };
                tracing::warn!(calling_ae_title, "rejecting association from an unrecognized calling AE title");
                crate::pdu::write_pdu_to_writer(&mut stream, &rj)?;
                return crate::error::RejectedSnafu { reason: reason_text(&rj) }.fail();
            }
        }

        if application_context_name != self.application_context_name {
            let rj = Pdu::AssociateRj {
                result: RejectResult::Permanent,
                source: RejectSource::ServiceUser,
                reason: RejectReason::ApplicationContextNameNotSupported,
            };
            tracing::warn!(application_context_name, "rejecting association with an unsupported application context name");
            crate::pdu::write_pdu_to_writer(&mut stream, &rj)?;
            return crate::error::RejectedSnafu { reason: reason_text(&rj) }.fail();
        }

        let mut results = Vec::new();
        for pc in &presentation_contexts {
            let supported = self.supported_abstract_syntaxes.iter().find(|(uid, _)| uid == &pc.abstract_syntax);
            let result = match supported {
                None => PresentationContextResult {
                    id: pc.id,
                    reason: PresentationContextResultReason::AbstractUnsupported,
                    transfer_syntax: String::new(),
                },
                Some((_, supported_ts)) => {
                    match pc.transfer_syntaxes.iter().find(|ts| supported_ts.contains(ts)) {
                        Some(ts) => PresentationContextResult {
                            id: pc.id,
                            reason: PresentationContextResultReason::Accepted,
                            transfer_syntax: ts.clone(),
                        },
                        None => PresentationContextResult {
                            id: pc.id,
                            reason: PresentationContextResultReason::TransferUnsupported,
                            transfer_syntax: String::new(),
                        },
                    }
                }
            };
            results.push(result);
        }

        let negotiated_max_pdu = user_information.max_pdu_length.min(self.max_pdu_length).max(1);

        let ac = Pdu::AssociateAc {
            protocol_version: crate::PROTOCOL_VERSION,
            calling_ae_title: calling_ae_title.clone(),
            called_ae_title: called_ae_title.clone(),
            application_context_name: self.application_context_name.clone(),
            presentation_contexts: results.clone(),
            user_information: UserInformation {
                max_pdu_length: self.max_pdu_length,
                implementation_class_uid: self.implementation_class_uid.clone(),
                implementation_version_name: self.implementation_version_name.clone(),
                async_ops_window: None,
                role_selections: Vec::new(),
            },
        };
        crate::pdu::write_pdu_to_writer(&mut stream, &ac)?;
        tracing::debug!(calling_ae_title, called_ae_title, accepted = results.iter().filter(|pc| pc.reason.is_accepted()).count(), "association established");

        Ok(IncomingAssociation {
            stream,
            state: AssociationState::Established,
            calling_ae_title,
            called_ae_title,
            accepted: results.into_iter().filter(|pc| pc.reason.is_accepted()).collect(),
            negotiated_max_pdu,
        })
    }
}

fn reason_text(pdu: &Pdu) -> String {
    match pdu {
        Pdu::AssociateRj { reason, .. } => reason.description().to_string(),
        other => other.to_string(),
    }
}

/// An established SCP-side association, ready to service DIMSE requests.
pub struct IncomingAssociation {
    stream: TcpStream,
    state: AssociationState,
    pub calling_ae_title: String,
    pub called_ae_title: String,
    accepted: Vec<PresentationContextResult>,
    negotiated_max_pdu: u32,
}

impl IncomingAssociation {
    pub fn state(&self) -> AssociationState {
        self.state
    }

    pub fn accepted_contexts(&self) -> &[PresentationContextResult] {
        &self.accepted
    }

    pub fn transfer_syntax_for(&self, pc_id: u8) -> Option<&str> {
        self.accepted.iter().find(|pc| pc.id == pc_id).map(|pc| pc.transfer_syntax.as_str())
    }

    pub fn receive_message(&mut self) -> Result<DimseMessage> {
        pdata::receive_message(&mut self.stream)
    }

    pub fn send_message(&mut self, pc_id: u8, command: &[u8], data: Option<&[u8]>) -> Result<()> {
        ensure!(
            self.state == AssociationState::Established,
            InvalidStateSnafu { state: format!("{:?}", self.state) }
        );
        pdata::send_message(&mut self.stream, pc_id, self.negotiated_max_pdu, command, data)
    }

    /// Reply to a peer-initiated A-RELEASE-RQ with A-RELEASE-RP, the only
    /// release path an SCP drives (spec §4.D).
    pub fn await_release(&mut self) -> Result<()> {
        match crate::pdu::read_pdu_from_reader(&mut self.stream)? {
            Pdu::ReleaseRq => {
                crate::pdu::write_pdu_to_writer(&mut self.stream, &Pdu::ReleaseRp)?;
                self.state = AssociationState::Closed;
                Ok(())
            }
            Pdu::Abort { .. } => {
                self.state = AssociationState::Aborted;
                tracing::debug!(calling_ae_title = %self.calling_ae_title, "peer aborted instead of releasing");
                crate::error::AbortedByPeerSnafu.fail()
            }
            other => InvalidStateSnafu { state: format!("expected A-RELEASE-RQ, got {other}") }.fail(),
        }
    }
}
