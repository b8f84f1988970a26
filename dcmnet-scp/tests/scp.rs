//! End-to-end SCU/SCP exchanges over a loopback socket, spec §8 scenarios
//! 1 (C-ECHO success), 2 (C-ECHO rejected AE), 3 (C-FIND), 4 (C-STORE with
//! pixel data transcoding), and 5 (C-MOVE sub-operation progress).
use dcmnet_core::bytestream::Endian;
use dcmnet_core::{DataElement, Dataset, Tag, Value, VR};
use dcmnet_dimse::{Status, SubOperationCounts};
use dcmnet_encoding::transfer_syntax::EXPLICIT_VR_LITTLE_ENDIAN;
use dcmnet_scp::{ScpOptions, ServiceProvider};
use dcmnet_scu::Destination;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const VERIFICATION_SOP_CLASS: &str = "1.2.840.10008.1.1";
const STUDY_ROOT_FIND: &str = "1.2.840.10008.5.1.4.1.2.2.1";
const SECONDARY_CAPTURE_SOP_CLASS: &str = "1.2.840.10008.5.1.4.1.1.7";
const IMPLICIT_VR_LE: &str = "1.2.840.10008.1.2";
const STUDY_DATE: Tag = Tag(0x0008, 0x0020);
const ROWS: Tag = Tag(0x0028, 0x0010);
const COLUMNS: Tag = Tag(0x0028, 0x0011);
const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
const PLANAR_CONFIGURATION: Tag = Tag(0x0028, 0x0006);
const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

struct EchoOnly;
impl ServiceProvider for EchoOnly {}

fn dest(addr: std::net::SocketAddr, calling: &str, called: &str) -> Destination {
    Destination::new("127.0.0.1", addr.port(), calling, called).with_timeout(Duration::from_secs(5))
}

#[test]
fn c_echo_round_trips_through_the_scp() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        ScpOptions::new()
            .with_ae_title("TEST_SCP")
            .with_supported_abstract_syntax(VERIFICATION_SOP_CLASS, vec![IMPLICIT_VR_LE.to_string()])
            .serve(listener, Arc::new(EchoOnly))
            .unwrap();
    });

    let status = dcmnet_scu::c_echo(&dest(addr, "TEST_SCU", "TEST_SCP")).unwrap();
    assert_eq!(status, Status::Success);

    drop(server);
}

#[test]
fn c_echo_from_an_unrecognized_calling_ae_is_rejected() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        ScpOptions::new()
            .with_ae_title("TEST_SCP")
            .with_allowed_calling_ae_title("KNOWN_SCU")
            .with_supported_abstract_syntax(VERIFICATION_SOP_CLASS, vec![IMPLICIT_VR_LE.to_string()])
            .serve(listener, Arc::new(EchoOnly))
            .unwrap();
    });

    let result = dcmnet_scu::c_echo(&dest(addr, "STRANGER_SCU", "TEST_SCP"));
    assert!(result.is_err());

    drop(server);
}

struct OneStudyFind;
impl ServiceProvider for OneStudyFind {
    fn on_c_find(&self, _sop_class_uid: &str, _identifier: &Dataset, emit: &mut dyn FnMut(Dataset)) -> Status {
        let mut found = Dataset::new(false, false);
        found.push(DataElement::new(STUDY_DATE, VR::DA, Value::Primitive(b"20260101".to_vec()), Endian::Little));
        emit(found);
        Status::Success
    }
}

#[test]
fn c_find_streams_a_single_matching_identifier() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        ScpOptions::new()
            .with_ae_title("TEST_SCP")
            .with_supported_abstract_syntax(STUDY_ROOT_FIND, vec![IMPLICIT_VR_LE.to_string()])
            .serve(listener, Arc::new(OneStudyFind))
            .unwrap();
    });

    let query = Dataset::new(false, false);
    let mut seen = Vec::new();
    let status =
        dcmnet_scu::c_find(&dest(addr, "TEST_SCU", "TEST_SCP"), STUDY_ROOT_FIND, &query, |ds| seen.push(ds)).unwrap();

    assert_eq!(status, Status::Success);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].get(STUDY_DATE).unwrap().as_string(), "20260101");

    drop(server);
}

struct PixelDataCapture {
    received: Arc<Mutex<Option<Dataset>>>,
}

impl ServiceProvider for PixelDataCapture {
    fn on_c_store(&self, _sop_class_uid: &str, _sop_instance_uid: &str, _transfer_syntax_uid: &str, dataset: &Dataset) -> Status {
        *self.received.lock().unwrap() = Some(dataset.clone());
        Status::Success
    }
}

fn sample_image_dataset(pixels: Vec<u8>) -> Dataset {
    let mut ds = Dataset::new(true, false);
    let push_us = |ds: &mut Dataset, tag: Tag, value: u16| {
        ds.push(DataElement::new(tag, VR::US, Value::Primitive(value.to_le_bytes().to_vec()), Endian::Little));
    };
    push_us(&mut ds, ROWS, 2);
    push_us(&mut ds, COLUMNS, 2);
    push_us(&mut ds, SAMPLES_PER_PIXEL, 1);
    push_us(&mut ds, BITS_ALLOCATED, 8);
    push_us(&mut ds, PLANAR_CONFIGURATION, 0);
    ds.push(DataElement::new(PIXEL_DATA, VR::OB, Value::Primitive(pixels), Endian::Little));
    ds
}

/// `c_store` proposes the source transfer syntax (Explicit VR Little
/// Endian) plus the uncompressed fallbacks, but this SCP only accepts
/// Implicit VR Little Endian for the abstract syntax, so the association
/// negotiates Implicit VR and `dcmnet-scu::c_store` has to transcode the
/// data set before it ever reaches the wire (spec §8 scenario 4).
#[test]
fn c_store_transcodes_pixel_data_to_the_negotiated_transfer_syntax() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(None));

    let server = thread::spawn({
        let received = Arc::clone(&received);
        move || {
            ScpOptions::new()
                .with_ae_title("TEST_SCP")
                .with_supported_abstract_syntax(SECONDARY_CAPTURE_SOP_CLASS, vec![IMPLICIT_VR_LE.to_string()])
                .serve(listener, Arc::new(PixelDataCapture { received }))
                .unwrap();
        }
    });

    let dataset = sample_image_dataset(vec![10, 20, 30, 40]);
    let status = dcmnet_scu::c_store(
        &dest(addr, "TEST_SCU", "TEST_SCP"),
        SECONDARY_CAPTURE_SOP_CLASS,
        "1.2.3.4.5",
        EXPLICIT_VR_LITTLE_ENDIAN.uid,
        &dataset,
    )
    .unwrap();
    assert_eq!(status, Status::Success);

    let received = received.lock().unwrap().clone().expect("C-STORE reached the handler");
    assert!(!received.explicit_vr, "data set should arrive re-encoded as implicit VR");
    assert_eq!(received.get(PIXEL_DATA).unwrap().value().as_primitive().unwrap(), &vec![10, 20, 30, 40]);

    drop(server);
}

struct ThreeSubOperationMove;
impl ServiceProvider for ThreeSubOperationMove {
    fn on_c_move(
        &self,
        _sop_class_uid: &str,
        _move_destination_ae_title: &str,
        _identifier: &Dataset,
        on_progress: &mut dyn FnMut(SubOperationCounts),
    ) -> Status {
        on_progress(SubOperationCounts { remaining: 2, completed: 1, failed: 0, warning: 0 });
        on_progress(SubOperationCounts { remaining: 0, completed: 3, failed: 0, warning: 0 });
        Status::Success
    }
}

#[test]
fn c_move_reports_suboperation_progress() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        ScpOptions::new()
            .with_ae_title("TEST_SCP")
            .with_supported_abstract_syntax(STUDY_ROOT_FIND, vec![IMPLICIT_VR_LE.to_string()])
            .serve(listener, Arc::new(ThreeSubOperationMove))
            .unwrap();
    });

    let query = Dataset::new(false, false);
    let mut progress = Vec::new();
    let status = dcmnet_scu::c_move(&dest(addr, "TEST_SCU", "TEST_SCP"), STUDY_ROOT_FIND, "DEST_AE", &query, |counts| {
        progress.push(counts)
    })
    .unwrap();

    assert_eq!(status, Status::Success);
    assert_eq!(progress.len(), 2);
    assert!(progress[1].done());

    drop(server);
}
