//! End-to-end association handshake and message exchange over a loopback
//! socket, spec §8 scenario 1 (C-ECHO) shape without the DIMSE layer.
use dcmnet_ul::association::{ClientAssociationOptions, ServerAssociationOptions};
use std::net::TcpListener;
use std::thread;

const VERIFICATION_SOP_CLASS: &str = "1.2.840.10008.1.1";
const IMPLICIT_VR_LE: &str = "1.2.840.10008.1.2";

#[test]
fn client_and_server_negotiate_and_exchange_a_message() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut assoc = ServerAssociationOptions::new()
            .with_ae_title("TEST_SCP")
            .with_supported_abstract_syntax(VERIFICATION_SOP_CLASS, vec![IMPLICIT_VR_LE.to_string()])
            .accept(stream)
            .unwrap();
        assert_eq!(assoc.accepted_contexts().len(), 1);
        let msg = assoc.receive_message().unwrap();
        assert_eq!(msg.command, b"C-ECHO-RQ");
        assoc.send_message(msg.presentation_context_id, b"C-ECHO-RSP", None).unwrap();
        assoc.await_release().unwrap();
    });

    let mut client = ClientAssociationOptions::new()
        .with_calling_ae_title("TEST_SCU")
        .with_called_ae_title("TEST_SCP")
        .with_presentation_context(VERIFICATION_SOP_CLASS, vec![IMPLICIT_VR_LE.to_string()])
        .establish(&addr.to_string())
        .unwrap();

    let pc = client.presentation_context_for(VERIFICATION_SOP_CLASS).unwrap().clone();
    client.send_message(pc.id, b"C-ECHO-RQ", None).unwrap();
    let response = client.receive_message().unwrap();
    assert_eq!(response.command, b"C-ECHO-RSP");
    client.release().unwrap();

    server.join().unwrap();
}

#[test]
fn server_rejects_unsupported_abstract_syntax_context() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let assoc = ServerAssociationOptions::new()
            .with_ae_title("TEST_SCP")
            .with_supported_abstract_syntax("1.2.840.10008.5.1.4.1.1.7", vec![IMPLICIT_VR_LE.to_string()])
            .accept(stream)
            .unwrap();
        assert!(assoc.accepted_contexts().is_empty());
    });

    let client = ClientAssociationOptions::new()
        .with_presentation_context(VERIFICATION_SOP_CLASS, vec![IMPLICIT_VR_LE.to_string()])
        .establish(&addr.to_string());
    assert!(client.is_err());

    server.join().unwrap();
}

#[test]
fn server_rejects_an_unrecognized_calling_ae_title() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let result = ServerAssociationOptions::new()
            .with_ae_title("TEST_SCP")
            .with_allowed_calling_ae_title("KNOWN_SCU")
            .with_supported_abstract_syntax(VERIFICATION_SOP_CLASS, vec![IMPLICIT_VR_LE.to_string()])
            .accept(stream);
        assert!(result.is_err());
    });

    let client = ClientAssociationOptions::new()
        .with_calling_ae_title("STRANGER_SCU")
        .with_called_ae_title("TEST_SCP")
        .with_presentation_context(VERIFICATION_SOP_CLASS, vec![IMPLICIT_VR_LE.to_string()])
        .establish(&addr.to_string());
    assert!(client.is_err());

    server.join().unwrap();
}
