//! SCU-side association establishment, spec §4.D/§4.G.
use super::pdata::{self, DimseMessage};
use super::AssociationState;
use crate::error::{NoAcceptedPresentationContextSnafu, RejectedSnafu, Result};
use crate::pdu::{Pdu, PresentationContextProposed, PresentationContextResult, UserInformation};
use dcmnet_registry::default_proposed;
use snafu::ensure;
use std::net::TcpStream;
use std::time::Duration;

/// Builder for an SCU-initiated association, mirroring the teacher's
/// "options struct with terminal `.establish()`" convention.
#[derive(Debug, Clone)]
pub struct ClientAssociationOptions {
    calling_ae_title: String,
    called_ae_title: String,
    application_context_name: String,
    presentation_contexts: Vec<(String, Vec<String>)>,
    max_pdu_length: u32,
    implementation_class_uid: String,
    implementation_version_name: Option<String>,
    read_timeout: Option<Duration>,
}

impl Default for ClientAssociationOptions {
    fn default() -> Self {
        ClientAssociationOptions {
            calling_ae_title: "DCMNET_SCU".to_string(),
            called_ae_title: "ANY_SCP".to_string(),
            application_context_name: crate::DEFAULT_APPLICATION_CONTEXT_NAME.to_string(),
            presentation_contexts: Vec::new(),
            max_pdu_length: crate::DEFAULT_MAX_PDU_LENGTH,
            implementation_class_uid: crate::DEFAULT_IMPLEMENTATION_CLASS_UID.to_string(),
            implementation_version_name: Some(crate::DEFAULT_IMPLEMENTATION_VERSION.to_string()),
            read_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ClientAssociationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calling_ae_title(mut self, title: impl Into<String>) -> Self {
        self.calling_ae_title = title.into();
        self
    }

    pub fn with_called_ae_title(mut self, title: impl Into<String>) -> Self {
        self.called_ae_title = title.into();
        self
    }

    /// Propose an abstract syntax with the default transfer syntax set
    /// (spec §4.G: Implicit VR Little Endian plus JPEG Lossless SV1).
    pub fn with_abstract_syntax(self, abstract_syntax: impl Into<String>) -> Self {
        let transfer_syntaxes = default_proposed().iter().map(|s| s.to_string()).collect();
        self.with_presentation_context(abstract_syntax, transfer_syntaxes)
    }

    pub fn with_presentation_context(mut self, abstract_syntax: impl Into<String>, transfer_syntaxes: Vec<String>) -> Self {
        self.presentation_contexts.push((abstract_syntax.into(), transfer_syntaxes));
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

    /// Connect to `address`, exchange A-ASSOCIATE-RQ/AC, and return the
    /// established association, or an error if the peer rejected or
    /// aborted, or accepted no usable presentation context.
    pub fn establish(self, address: &str) -> Result<ClientAssociation> {
        let stream = TcpStream::connect(address)?;
        stream.set_read_timeout(self.read_timeout)?;
        self.establish_over(stream)
    }

    fn establish_over(self, mut stream: TcpStream) -> Result<ClientAssociation> {
        let proposed: Vec<PresentationContextProposed> = self
            .presentation_contexts
            .iter()
            .enumerate()
            .map(|(i, (abstract_syntax, transfer_syntaxes))| PresentationContextProposed {
                id: (i as u8) * 2 + 1,
                abstract_syntax: abstract_syntax.clone(),
                transfer_syntaxes: transfer_syntaxes.clone(),
            })
            .collect();

        let rq = Pdu::AssociateRq {
            protocol_version: crate::PROTOCOL_VERSION,
            calling_ae_title: self.calling_ae_title.clone(),
            called_ae_title: self.called_ae_title.clone(),
            application_context_name: self.application_context_name.clone(),
            presentation_contexts: proposed.clone(),
            user_information: UserInformation {
                max_pdu_length: self.max_pdu_length,
                implementation_class_uid: self.implementation_class_uid.clone(),
                implementation_version_name: self.implementation_version_name.clone(),
                async_ops_window: None,
                role_selections: Vec::new(),
            },
        };

        crate::pdu::write_pdu_to_writer(&mut stream, &rq)?;
        let response = crate::pdu::read_pdu_from_reader(&mut stream)?;

        match response {
            Pdu::AssociateAc { presentation_contexts, user_information, .. } => {
                let accepted: Vec<PresentationContextResult> = presentation_contexts
                    .into_iter()
                    .filter(|pc| pc.reason.is_accepted())
                    .collect();
                ensure!(
                    !accepted.is_empty(),
                    NoAcceptedPresentationContextSnafu { abstract_syntax: "<all>".to_string() }
                );
                let negotiated_max_pdu = user_information.max_pdu_length.min(self.max_pdu_length).max(1);
                Ok(ClientAssociation {
                    stream,
                    state: AssociationState::Established,
                    proposed,
                    accepted,
                    negotiated_max_pdu,
                })
            }
            Pdu::AssociateRj { reason, .. } => {
                tracing::warn!(reason = reason.description(), "association rejected by peer");
                RejectedSnafu { reason: reason.description().to_string() }.fail()
            }
            other => RejectedSnafu { reason: format!("unexpected response {other}") }.fail(),
        }
    }
}

/// An established SCU-side association: negotiated presentation contexts
/// plus the underlying socket, ready to carry DIMSE messages.
pub struct ClientAssociation {
    stream: TcpStream,
    state: AssociationState,
    proposed: Vec<PresentationContextProposed>,
    accepted: Vec<PresentationContextResult>,
    negotiated_max_pdu: u32,
}

impl ClientAssociation {
    pub fn state(&self) -> AssociationState {
        self.state
    }

    pub fn accepted_contexts(&self) -> &[PresentationContextResult] {
        &self.accepted
    }

    /// Find the presentation context ID accepted for `abstract_syntax`,
    /// spec §4.D: contexts are proposed and accepted as (id, abstract
    /// syntax, transfer syntax) triples matched by ID.
    pub fn presentation_context_for(&self, abstract_syntax: &str) -> Option<&PresentationContextResult> {
        let proposed_ids: Vec<u8> = self
            .proposed
            .iter()
            .filter(|pc| pc.abstract_syntax == abstract_syntax)
            .map(|pc| pc.id)
            .collect();
        self.accepted.iter().find(|pc| proposed_ids.contains(&pc.id))
    }

    pub fn send_message(&mut self, pc_id: u8, command: &[u8], data: Option<&[u8]>) -> Result<()> {
        ensure!(
            self.state == AssociationState::Established,
            crate::error::InvalidStateSnafu { state: format!("{:?}", self.state) }
        );
        pdata::send_message(&mut self.stream, pc_id, self.negotiated_max_pdu, command, data)
    }

    pub fn receive_message(&mut self) -> Result<DimseMessage> {
        pdata::receive_message(&mut self.stream)
    }

    /// Negotiate a graceful A-RELEASE.
    pub fn release(mut self) -> Result<()> {
        self.state = AssociationState::Releasing;
        crate::pdu::write_pdu_to_writer(&mut self.stream, &Pdu::ReleaseRq)?;
        match crate::pdu::read_pdu_from_reader(&mut self.stream)? {
            Pdu::ReleaseRp => {
                self.state = AssociationState::Closed;
                Ok(())
            }
            other => crate::error::InvalidStateSnafu { state: format!("expected A-RELEASE-RP, got {other}") }.fail(),
        }
    }

    pub fn abort(mut self) -> Result<()> {
        self.state = AssociationState::Aborted;
        crate::pdu::write_pdu_to_writer(
            &mut self.stream,
            &Pdu::Abort {
                source: crate::pdu::AbortSource::ServiceUser,
                reason: crate::pdu::AbortReason::NotSpecified,
            },
        )
    }
}
