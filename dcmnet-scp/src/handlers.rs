//! The callback surface an application implements to act as an SCP, spec
//! §4.G: unimplemented operations default to a processing failure status,
//! except C-ECHO, which is mandatory to support and defaults to success.
use dcmnet_core::Dataset;
use dcmnet_dimse::{Status, SubOperationCounts};

/// Dispatched once per accepted association, before any DIMSE request is
/// serviced.
pub trait ServiceProvider: Send + Sync {
    fn on_association_request(&self, _calling_ae_title: &str, _called_ae_title: &str) -> bool {
        true
    }

    fn on_association_release(&self) {}

    fn on_c_echo(&self) -> Status {
        Status::Success
    }

    /// Stream matching identifiers to `emit` as they are found; the
    /// returned status becomes the C-FIND-RSP's final (non-pending)
    /// status.
    fn on_c_find(&self, _sop_class_uid: &str, _identifier: &Dataset, _emit: &mut dyn FnMut(Dataset)) -> Status {
        Status::FailureUnableToProcess
    }

    /// Report progress to `on_progress` as sub-operations complete; the
    /// returned status becomes the C-MOVE-RSP's final status.
    fn on_c_move(
        &self,
        _sop_class_uid: &str,
        _move_destination_ae_title: &str,
        _identifier: &Dataset,
        _on_progress: &mut dyn FnMut(SubOperationCounts),
    ) -> Status {
        Status::FailureUnableToPerformSubOperations
    }

    fn on_c_store(&self, _sop_class_uid: &str, _sop_instance_uid: &str, _transfer_syntax_uid: &str, _dataset: &Dataset) -> Status {
        Status::FailureUnableToProcess
    }
}
