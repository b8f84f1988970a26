use clap::Parser;
use dcmnet_core::bytestream::Endian;
use dcmnet_core::{DataElement, Dataset, Value};
use dcmnet_dictionary::DataDictionary;
use dcmnet_dimse::Status;
use dcmnet_scu::Destination;
use snafu::{prelude::*, whatever, Whatever};
use std::time::Duration;
use tracing::Level;

const STUDY_ROOT_FIND: &str = "1.2.840.10008.5.1.4.1.2.2.1";

/// DICOM C-FIND SCU
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    /// host of the FIND SCP
    host: String,
    /// port of the FIND SCP
    port: u16,
    /// query attributes as `Alias=Value` pairs (e.g. `PatientName=DOE^JOHN`);
    /// an attribute named with no value requests it as a return key
    #[arg(short = 'q', long = "query")]
    query: Vec<String>,
    /// the abstract syntax (information model) to query
    #[arg(long = "abstract-syntax", default_value = STUDY_ROOT_FIND)]
    abstract_syntax: String,
    /// verbose mode
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
    /// the calling Application Entity title
    #[arg(long = "calling-ae-title", default_value = "FINDSCU")]
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

fn parse_identifier(queries: &[String]) -> Result<Dataset, Whatever> {
    let mut ds = Dataset::new(false, false);
    let dict = dcmnet_dictionary::standard();
    for q in queries {
        let (alias, value) = q.split_once('=').unwrap_or((q.as_str(), ""));
        let entry = dict.by_alias(alias).with_whatever_context(|| format!("unknown attribute alias {alias}"))?;
        let bytes = DataElement::pad_value(entry.vr, value.as_bytes().to_vec());
        ds.push(DataElement::new(entry.tag, entry.vr, Value::Primitive(bytes), Endian::Little));
    }
    if ds.iter().next().is_none() {
        whatever!("at least one query attribute is required (-q Alias=Value)");
    }
    Ok(ds)
}

fn run() -> Result<(), Whatever> {
    let App { host, port, query, abstract_syntax, verbose, calling_ae_title, called_ae_title, timeout } = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
            .finish(),
    )
    .whatever_context("could not set up global logging subscriber")?;

    let dest = Destination::new(host, port, calling_ae_title, called_ae_title).with_timeout(Duration::from_secs(timeout));
    let identifier = parse_identifier(&query)?;

    let mut count = 0usize;
    let status = dcmnet_scu::c_find(&dest, &abstract_syntax, &identifier, |result| {
        count += 1;
        println!("--- match {count} ---");
        for element in result.iter() {
            println!("{:?}", element);
        }
    })
    .whatever_context("C-FIND failed")?;

    if status != Status::Success {
        tracing::warn!("C-FIND finished with status {:#06x}H, {count} match(es) returned", status.code());
    } else if verbose {
        println!("C-FIND successful, {count} match(es) returned");
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
