use clap::Parser;
use dcmnet_core::ByteStream;
use dcmnet_dimse::Status;
use dcmnet_scu::Destination;
use snafu::{prelude::*, whatever, Whatever};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// DICOM C-STORE SCU
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    /// host of the STORE SCP
    host: String,
    /// port of the STORE SCP
    port: u16,
    /// the DICOM file(s) to store
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// verbose mode
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
    /// fail on the first file that cannot be stored, instead of continuing
    #[arg(long = "fail-first")]
    fail_first: bool,
    /// the calling Application Entity title
    #[arg(long = "calling-ae-title", default_value = "STORESCU")]
    calling_ae_title: String,
    /// the called Application Entity title
    #[arg(long = "called-ae-title", default_value = "ANY-SCP")]
    called_ae_title: String,
    /// association timeout, in seconds
    #[arg(long = "timeout", default_value = "30")]
    timeout: u64,
}

fn main() {
    run().unwrap_or_else(|err| {
        tracing::error!("{}", snafu::Report::from_error(err));
        std::process::exit(-2);
    });
}

fn store_one(dest: &Destination, path: &PathBuf) -> Result<Status, Whatever> {
    let bytes = std::fs::read(path).with_whatever_context(|_| format!("could not read {}", path.display()))?;
    let mut stream = ByteStream::from_bytes(bytes);
    let (meta, dataset) = dcmnet_parser::read_file(&mut stream, Default::default())
        .with_whatever_context(|_| format!("could not parse {}", path.display()))?;
    let meta = meta.with_whatever_context(|| format!("{} has no File Meta Information to identify it by", path.display()))?;

    dcmnet_scu::c_store(
        dest,
        &meta.media_storage_sop_class_uid,
        &meta.media_storage_sop_instance_uid,
        &meta.transfer_syntax_uid,
        &dataset,
    )
    .with_whatever_context(|_| format!("C-STORE of {} failed", path.display()))
}

fn run() -> Result<(), Whatever> {
    let App { host, port, files, verbose, fail_first, calling_ae_title, called_ae_title, timeout } = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
            .finish(),
    )
    .whatever_context("could not set up global logging subscriber")?;

    let dest = Destination::new(host, port, calling_ae_title, called_ae_title).with_timeout(Duration::from_secs(timeout));

    let mut failures = 0usize;
    for path in &files {
        match store_one(&dest, path) {
            Ok(Status::Success) => {
                if verbose {
                    println!("{}: stored", path.display());
                }
            }
            Ok(status) => {
                failures += 1;
                tracing::warn!("{}: non-success status {:#06x}H", path.display(), status.code());
                if fail_first {
                    whatever!("stopping after first failed file");
                }
            }
            Err(err) => {
                failures += 1;
                tracing::error!("{}: {}", path.display(), snafu::Report::from_error(err));
                if fail_first {
                    whatever!("stopping after first failed file");
                }
            }
        }
    }

    if failures > 0 {
        whatever!("{failures} of {} file(s) failed to store", files.len());
    }
    Ok(())
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
