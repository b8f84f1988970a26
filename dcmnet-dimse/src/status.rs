//! The DIMSE status taxonomy (0000,0900), spec §4.E / §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Warning,
    Cancel,
    Pending,
    PendingWarning,
    FailureOutOfResources,
    FailureSopClassMismatch,
    FailureSopClassNotSupported,
    FailureUnableToProcess,
    FailureUnableToPerformSubOperations,
    Other(u16),
}

impl Status {
    pub fn code(self) -> u16 {
        use Status::*;
        match self {
            Success => 0x0000,
            Warning => 0x0001,
            FailureSopClassNotSupported => 0x0122,
            Cancel => 0xFE00,
            Pending => 0xFF00,
            PendingWarning => 0xFF01,
            FailureOutOfResources => 0xA700,
            FailureUnableToPerformSubOperations => 0xA702,
            FailureSopClassMismatch => 0xA900,
            FailureUnableToProcess => 0xC000,
            Other(code) => code,
        }
    }

    pub fn from_code(code: u16) -> Status {
        use Status::*;
        match code {
            0x0000 => Success,
            0x0001 => Warning,
            0x0122 => FailureSopClassNotSupported,
            0xFE00 => Cancel,
            0xFF00 => Pending,
            0xFF01 => PendingWarning,
            0xA700 => FailureOutOfResources,
            0xA702 => FailureUnableToPerformSubOperations,
            0xA900 => FailureSopClassMismatch,
            0xC000 => FailureUnableToProcess,
            other => Other(other),
        }
    }

    /// Whether a multi-response operation (C-FIND/C-MOVE) should keep
    /// listening for further responses after seeing this status.
    pub fn is_pending(self) -> bool {
        matches!(self, Status::Pending | Status::PendingWarning)
    }

    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    pub fn is_failure(self) -> bool {
        !matches!(self, Status::Success | Status::Warning | Status::Pending | Status::PendingWarning | Status::Cancel)
    }
}

/// Sub-operation progress reported with C-MOVE-RSP, spec §9 open question:
/// modeled as a plain remaining-operation count plus a separate
/// done/pending discriminant rather than overloading the count itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubOperationCounts {
    pub remaining: u32,
    pub completed: u32,
    pub failed: u32,
    pub warning: u32,
}

impl SubOperationCounts {
    pub fn done(self) -> bool {
        self.remaining == 0
    }
}
