//! Data dictionary trait and a minimal built-in subset.
//!
//! The full standard data dictionary (thousands of entries mapping tag to
//! VR/VM/name) is an external collaborator per spec §1 - this crate only
//! defines the `DataDictionary` trait plus the handful of entries the rest
//! of the stack needs by name (command fields, file-meta attributes, and
//! the attributes used in the worked examples of spec §8).
use dcmnet_core::tag::Tag;
use dcmnet_core::vr::VR;
use std::sync::OnceLock;

/// A single dictionary entry: the tag's canonical alias and typical VR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub tag: Tag,
    pub alias: &'static str,
    pub vr: VR,
}

/// A dictionary of DICOM attributes, mapping tag to alias/VR and back.
///
/// Kept as a trait (rather than a single concrete type) so that a host
/// application can plug in a fuller or private dictionary without this
/// crate needing to depend on it; see [`StandardDictionary::merge`].
pub trait DataDictionary {
    fn by_tag(&self, tag: Tag) -> Option<&Entry>;
    fn by_alias(&self, alias: &str) -> Option<&Entry>;

    /// The typical VR for a tag, falling back to `VR::UN` when unknown -
    /// this is the lookup spec §4.B step 3 uses for implicit-VR streams
    /// and for the always-implicit groups 0000/0002/FFFE.
    fn vr_of(&self, tag: Tag) -> VR {
        self.by_tag(tag).map(|e| e.vr).unwrap_or(VR::UN)
    }
}

macro_rules! entry {
    ($group:expr, $elem:expr, $alias:expr, $vr:expr) => {
        Entry {
            tag: Tag($group, $elem),
            alias: $alias,
            vr: $vr,
        }
    };
}

/// The built-in entries: file-meta, DIMSE command fields, and the
/// attributes exercised by the worked examples in spec §8.
const BUILTIN: &[Entry] = &[
    // group 0000 - DIMSE command fields (always implicit VR little endian)
    entry!(0x0000, 0x0000, "CommandGroupLength", VR::UL),
    entry!(0x0000, 0x0002, "AffectedSOPClassUID", VR::UI),
    entry!(0x0000, 0x0003, "RequestedSOPClassUID", VR::UI),
    entry!(0x0000, 0x0100, "CommandField", VR::US),
    entry!(0x0000, 0x0110, "MessageID", VR::US),
    entry!(0x0000, 0x0120, "MessageIDBeingRespondedTo", VR::US),
    entry!(0x0000, 0x0600, "MoveDestination", VR::AE),
    entry!(0x0000, 0x0700, "Priority", VR::US),
    entry!(0x0000, 0x0800, "CommandDataSetType", VR::US),
    entry!(0x0000, 0x0900, "Status", VR::US),
    entry!(0x0000, 0x0901, "OffendingElement", VR::AT),
    entry!(0x0000, 0x0902, "ErrorComment", VR::LO),
    entry!(0x0000, 0x1000, "AffectedSOPInstanceUID", VR::UI),
    entry!(0x0000, 0x1001, "RequestedSOPInstanceUID", VR::UI),
    entry!(0x0000, 0x1020, "NumberOfRemainingSuboperations", VR::US),
    entry!(0x0000, 0x1021, "NumberOfCompletedSuboperations", VR::US),
    entry!(0x0000, 0x1022, "NumberOfFailedSuboperations", VR::US),
    entry!(0x0000, 0x1023, "NumberOfWarningSuboperations", VR::US),
    entry!(0x0000, 0x1030, "MoveOriginatorApplicationEntityTitle", VR::AE),
    entry!(0x0000, 0x1031, "MoveOriginatorMessageID", VR::US),
    // group 0002 - file meta (always explicit VR little endian)
    entry!(0x0002, 0x0000, "FileMetaInformationGroupLength", VR::UL),
    entry!(0x0002, 0x0001, "FileMetaInformationVersion", VR::OB),
    entry!(0x0002, 0x0002, "MediaStorageSOPClassUID", VR::UI),
    entry!(0x0002, 0x0003, "MediaStorageSOPInstanceUID", VR::UI),
    entry!(0x0002, 0x0010, "TransferSyntaxUID", VR::UI),
    entry!(0x0002, 0x0012, "ImplementationClassUID", VR::UI),
    entry!(0x0002, 0x0013, "ImplementationVersionName", VR::SH),
    entry!(0x0002, 0x0016, "SourceApplicationEntityTitle", VR::AE),
    // common identification / query attributes
    entry!(0x0008, 0x0005, "SpecificCharacterSet", VR::CS),
    entry!(0x0008, 0x0016, "SOPClassUID", VR::UI),
    entry!(0x0008, 0x0018, "SOPInstanceUID", VR::UI),
    entry!(0x0008, 0x0020, "StudyDate", VR::DA),
    entry!(0x0008, 0x0030, "StudyTime", VR::TM),
    entry!(0x0008, 0x0050, "AccessionNumber", VR::SH),
    entry!(0x0008, 0x0052, "QueryRetrieveLevel", VR::CS),
    entry!(0x0008, 0x0060, "Modality", VR::CS),
    entry!(0x0010, 0x0010, "PatientName", VR::PN),
    entry!(0x0010, 0x0020, "PatientID", VR::LO),
    entry!(0x0020, 0x000D, "StudyInstanceUID", VR::UI),
    entry!(0x0020, 0x000E, "SeriesInstanceUID", VR::UI),
    entry!(0x0028, 0x0002, "SamplesPerPixel", VR::US),
    entry!(0x0028, 0x0004, "PhotometricInterpretation", VR::CS),
    entry!(0x0028, 0x0006, "PlanarConfiguration", VR::US),
    entry!(0x0028, 0x0008, "NumberOfFrames", VR::IS),
    entry!(0x0028, 0x0010, "Rows", VR::US),
    entry!(0x0028, 0x0011, "Columns", VR::US),
    entry!(0x0028, 0x0100, "BitsAllocated", VR::US),
    entry!(0x0028, 0x0101, "BitsStored", VR::US),
    entry!(0x0028, 0x0102, "HighBit", VR::US),
    entry!(0x0028, 0x0103, "PixelRepresentation", VR::US),
    entry!(0x7FE0, 0x0010, "PixelData", VR::OW),
    entry!(0xFFFE, 0xE000, "Item", VR::UN),
    entry!(0xFFFE, 0xE00D, "ItemDelimitationItem", VR::UN),
    entry!(0xFFFE, 0xE0DD, "SequenceDelimitationItem", VR::UN),
];

/// The built-in, process-wide standard dictionary described in spec §9
/// ("process-wide, initialized once"). Extra entries from a host-supplied
/// private dictionary can be merged in at startup via [`StandardDictionary::with_extra`].
#[derive(Debug, Default, Clone)]
pub struct StandardDictionary {
    extra: Vec<Entry>,
}

impl StandardDictionary {
    pub fn new() -> Self {
        StandardDictionary::default()
    }

    /// Merge in additional entries (e.g. from a private dictionary loaded
    /// at process startup). Entries here take priority over the built-ins.
    pub fn with_extra(mut self, entries: impl IntoIterator<Item = Entry>) -> Self {
        self.extra.extend(entries);
        self
    }
}

impl DataDictionary for StandardDictionary {
    fn by_tag(&self, tag: Tag) -> Option<&Entry> {
        self.extra
            .iter()
            .find(|e| e.tag == tag)
            .or_else(|| BUILTIN.iter().find(|e| e.tag == tag))
    }

    fn by_alias(&self, alias: &str) -> Option<&Entry> {
        self.extra
            .iter()
            .find(|e| e.alias == alias)
            .or_else(|| BUILTIN.iter().find(|e| e.alias == alias))
    }
}

static GLOBAL: OnceLock<StandardDictionary> = OnceLock::new();

/// Explicitly initialize the process-wide dictionary singleton. Safe to
/// call more than once; only the first call's extra entries take effect.
/// Calling [`standard`] without calling this first is also fine - it
/// lazily initializes with no extra entries.
pub fn init_dict(extra: impl IntoIterator<Item = Entry>) {
    let _ = GLOBAL.set(StandardDictionary::new().with_extra(extra));
}

/// Retrieve the process-wide standard dictionary, initializing it with no
/// extra entries if [`init_dict`] was never called.
pub fn standard() -> &'static StandardDictionary {
    GLOBAL.get_or_init(StandardDictionary::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_builtin_by_tag_and_alias() {
        let dict = StandardDictionary::new();
        assert_eq!(dict.by_tag(Tag(0x0010, 0x0010)).unwrap().alias, "PatientName");
        assert_eq!(dict.by_alias("StudyDate").unwrap().tag, Tag(0x0008, 0x0020));
    }

    #[test]
    fn implicit_vr_groups_resolve_even_when_unlisted() {
        let dict = StandardDictionary::new();
        assert_eq!(dict.vr_of(Tag(0x0000, 0x0100)), VR::US);
        assert_eq!(dict.vr_of(Tag(0x9999, 0x9999)), VR::UN);
    }

    #[test]
    fn extra_entries_take_priority() {
        let dict = StandardDictionary::new().with_extra([Entry {
            tag: Tag(0x0010, 0x0010),
            alias: "PatientsName",
            vr: VR::PN,
        }]);
        assert_eq!(dict.by_tag(Tag(0x0010, 0x0010)).unwrap().alias, "PatientsName");
    }
}
