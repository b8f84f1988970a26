use clap::Parser;
use dcmnet_dimse::Status;
use dcmnet_parser::FileMeta;
use dcmnet_scp::{ScpOptions, ServiceProvider};
use snafu::{prelude::*, Whatever};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};

const IMPLICIT_VR_LE: &str = "1.2.840.10008.1.2";
const EXPLICIT_VR_LE: &str = "1.2.840.10008.1.2.1";
const VERIFICATION_SOP_CLASS: &str = "1.2.840.10008.1.1";

/// DICOM C-STORE SCP: accepts associations and writes received instances
/// to a directory as Part 10 files named by SOP Instance UID.
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    /// port to listen on
    #[arg(short = 'p', long = "port", default_value = "11112")]
    port: u16,
    /// directory received instances are written into
    #[arg(short = 'o', long = "out-dir", default_value = ".")]
    out_dir: PathBuf,
    /// the called Application Entity title this SCP answers to
    #[arg(long = "ae-title", default_value = "STORESCP")]
    ae_title: String,
    /// a calling AE title to accept associations from; may be repeated.
    /// When omitted, associations from any calling AE title are accepted
    #[arg(long = "accept-from")]
    accept_from: Vec<String>,
    /// a SOP Class UID to accept for storage, in addition to Verification;
    /// may be repeated
    #[arg(long = "accept-sop-class", required = true)]
    accept_sop_class: Vec<String>,
    /// verbose mode
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

struct FileWriter {
    out_dir: PathBuf,
}

impl ServiceProvider for FileWriter {
    fn on_association_request(&self, calling_ae_title: &str, called_ae_title: &str) -> bool {
        info!(calling_ae_title, called_ae_title, "association requested");
        true
    }

    fn on_c_store(
        &self,
        sop_class_uid: &str,
        sop_instance_uid: &str,
        transfer_syntax_uid: &str,
        dataset: &dcmnet_core::Dataset,
    ) -> Status {
        let meta = FileMeta {
            media_storage_sop_class_uid: sop_class_uid.to_string(),
            media_storage_sop_instance_uid: sop_instance_uid.to_string(),
            transfer_syntax_uid: transfer_syntax_uid.to_string(),
            implementation_class_uid: dcmnet_ul::DEFAULT_IMPLEMENTATION_CLASS_UID.to_string(),
            implementation_version_name: dcmnet_ul::DEFAULT_IMPLEMENTATION_VERSION.to_string(),
            source_application_entity_title: String::new(),
        };

        let bytes = match dcmnet_parser::write_file(&meta, dataset) {
            Ok(stream) => stream.into_vec(),
            Err(err) => {
                warn!(%err, sop_instance_uid, "failed to serialize received instance");
                return Status::FailureUnableToProcess;
            }
        };

        let path = self.out_dir.join(format!("{sop_instance_uid}.dcm"));
        match std::fs::write(&path, bytes) {
            Ok(()) => {
                info!(path = %path.display(), "stored instance");
                Status::Success
            }
            Err(err) => {
                warn!(%err, path = %path.display(), "failed to write received instance");
                Status::FailureUnableToProcess
            }
        }
    }
}

fn main() {
    run().unwrap_or_else(|err| {
        tracing::error!("{}", snafu::Report::from_error(err));
        std::process::exit(-2);
    });
}

fn run() -> Result<(), Whatever> {
    let App { port, out_dir, ae_title, accept_from, accept_sop_class, verbose } = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
            .finish(),
    )
    .whatever_context("could not set up global logging subscriber")?;

    std::fs::create_dir_all(&out_dir).with_whatever_context(|_| format!("could not create {}", out_dir.display()))?;

    let transfer_syntaxes = vec![EXPLICIT_VR_LE.to_string(), IMPLICIT_VR_LE.to_string()];
    let mut options = ScpOptions::new()
        .with_ae_title(ae_title)
        .with_supported_abstract_syntax(VERIFICATION_SOP_CLASS, transfer_syntaxes.clone());
    for sop_class in &accept_sop_class {
        options = options.with_supported_abstract_syntax(sop_class, transfer_syntaxes.clone());
    }
    for title in &accept_from {
        options = options.with_allowed_calling_ae_title(title);
    }

    let listener = TcpListener::bind(("0.0.0.0", port)).with_whatever_context(|_| format!("could not bind port {port}"))?;
    info!(port, "listening for associations");

    options
        .serve(listener, Arc::new(FileWriter { out_dir }))
        .whatever_context("accept loop failed")
}

#[cfg(test)]
mod tests {
    use crate::App;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        App::command().debug_assert();
    }
}
