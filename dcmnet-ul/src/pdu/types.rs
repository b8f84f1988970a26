//! Upper-Layer PDU data types, spec §3/§4.C/§6.
use std::fmt;

/// A presentation context as proposed in an A-ASSOCIATE-RQ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationContextProposed {
    pub id: u8,
    pub abstract_syntax: String,
    pub transfer_syntaxes: Vec<String>,
}

/// Result code for a negotiated presentation context, spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationContextResultReason {
    Accepted = 0,
    UserReject = 1,
    NoReason = 2,
    AbstractUnsupported = 3,
    TransferUnsupported = 4,
}

impl PresentationContextResultReason {
    pub fn from_u8(v: u8) -> Option<Self> {
        use PresentationContextResultReason::*;
        Some(match v {
            0 => Accepted,
            1 => UserReject,
            2 => NoReason,
            3 => AbstractUnsupported,
            4 => TransferUnsupported,
            _ => return None,
        })
    }

    pub fn is_accepted(self) -> bool {
        matches!(self, PresentationContextResultReason::Accepted)
    }
}

/// A presentation context as negotiated in an A-ASSOCIATE-AC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationContextResult {
    pub id: u8,
    pub reason: PresentationContextResultReason,
    pub transfer_syntax: String,
}

/// Negotiated user-information sub-items of an A-ASSOCIATE-RQ/AC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInformation {
    pub max_pdu_length: u32,
    pub implementation_class_uid: String,
    pub implementation_version_name: Option<String>,
    pub async_ops_window: Option<(u16, u16)>,
    pub role_selections: Vec<RoleSelection>,
}

impl Default for UserInformation {
    fn default() -> Self {
        UserInformation {
            max_pdu_length: crate::DEFAULT_MAX_PDU_LENGTH,
            implementation_class_uid: crate::DEFAULT_IMPLEMENTATION_CLASS_UID.to_string(),
            implementation_version_name: Some(crate::DEFAULT_IMPLEMENTATION_VERSION.to_string()),
            async_ops_window: None,
            role_selections: Vec::new(),
        }
    }
}

/// A single SCP/SCU role-selection sub-item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSelection {
    pub sop_class_uid: String,
    pub scu_role: bool,
    pub scp_role: bool,
}

/// Why an A-ASSOCIATE-RQ was rejected, spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectResult {
    Permanent = 1,
    Transient = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectSource {
    ServiceUser = 1,
    ServiceProviderAcse = 2,
    ServiceProviderPresentation = 3,
}

/// Permanent reject reasons (source = service-user), spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NoReasonGiven,
    ApplicationContextNameNotSupported,
    CallingAeNotRecognized,
    CalledAeNotRecognized,
    TemporaryCongestion,
    LocalLimitExceeded,
    Other(u8),
}

impl RejectReason {
    pub fn code(self) -> u8 {
        use RejectReason::*;
        match self {
            NoReasonGiven => 1,
            ApplicationContextNameNotSupported => 2,
            CallingAeNotRecognized => 3,
            CalledAeNotRecognized => 7,
            TemporaryCongestion => 1,
            LocalLimitExceeded => 2,
            Other(v) => v,
        }
    }

    pub fn from_code(source: RejectSource, v: u8) -> RejectReason {
        use RejectReason::*;
        match (source, v) {
            (RejectSource::ServiceUser, 1) => NoReasonGiven,
            (RejectSource::ServiceUser, 2) => ApplicationContextNameNotSupported,
            (RejectSource::ServiceUser, 3) => CallingAeNotRecognized,
            (RejectSource::ServiceUser, 7) => CalledAeNotRecognized,
            (RejectSource::ServiceProviderPresentation, 1) => TemporaryCongestion,
            (RejectSource::ServiceProviderPresentation, 2) => LocalLimitExceeded,
            (_, other) => Other(other),
        }
    }

    pub fn description(self) -> &'static str {
        use RejectReason::*;
        match self {
            NoReasonGiven => "no reason given",
            ApplicationContextNameNotSupported => "application context name not supported",
            CallingAeNotRecognized => "calling AE title not recognized",
            CalledAeNotRecognized => "called AE title not recognized",
            TemporaryCongestion => "temporary congestion",
            LocalLimitExceeded => "local limit exceeded",
            Other(_) => "other reason",
        }
    }
}

/// Source of an A-ABORT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortSource {
    ServiceUser,
    ServiceProvider,
}

/// Reason for a service-provider-initiated A-ABORT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    NotSpecified,
    UnrecognizedPdu,
    UnexpectedPdu,
    UnrecognizedPduParameter,
    UnexpectedPduParameter,
    InvalidPduParameter,
}

/// One fragment within a P-DATA-TF PDU, spec §3 "PDV".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdv {
    pub presentation_context_id: u8,
    pub is_command: bool,
    pub is_last: bool,
    pub data: Vec<u8>,
}

/// The seven upper-layer PDU types, spec §3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pdu {
    AssociateRq {
        protocol_version: u16,
        calling_ae_title: String,
        called_ae_title: String,
        application_context_name: String,
        presentation_contexts: Vec<PresentationContextProposed>,
        user_information: UserInformation,
    },
    AssociateAc {
        protocol_version: u16,
        calling_ae_title: String,
        called_ae_title: String,
        application_context_name: String,
        presentation_contexts: Vec<PresentationContextResult>,
        user_information: UserInformation,
    },
    AssociateRj {
        result: RejectResult,
        source: RejectSource,
        reason: RejectReason,
    },
    PData {
        pdvs: Vec<Pdv>,
    },
    ReleaseRq,
    ReleaseRp,
    Abort {
        source: AbortSource,
        reason: AbortReason,
    },
}

impl fmt::Display for Pdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pdu::AssociateRq { .. } => write!(f, "A-ASSOCIATE-RQ"),
            Pdu::AssociateAc { .. } => write!(f, "A-ASSOCIATE-AC"),
            Pdu::AssociateRj { .. } => write!(f, "A-ASSOCIATE-RJ"),
            Pdu::PData { pdvs } => write!(f, "P-DATA-TF ({} PDV(s))", pdvs.len()),
            Pdu::ReleaseRq => write!(f, "A-RELEASE-RQ"),
            Pdu::ReleaseRp => write!(f, "A-RELEASE-RP"),
            Pdu::Abort { .. } => write!(f, "A-ABORT"),
        }
    }
}
