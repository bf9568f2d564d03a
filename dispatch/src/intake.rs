use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use schema::{Hospital, OrderRequest, SchedulerError};
use thiserror::Error;

/// Problems turning input files into hospitals and order requests
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The row could not be read into a record at all
    #[error("line {line}: unreadable record: {source}")]
    Unreadable {
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// The row was read but the scheduler refused the order
    #[error("line {line}: {source}")]
    Rejected {
        line: u64,
        #[source]
        source: SchedulerError,
    },
}

/// An order request together with the line it was read from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderRecord {
    pub line: u64,
    pub request: OrderRequest,
}

fn open(path: impl AsRef<Path>) -> Result<File, IntakeError> {
    let path = path.as_ref();
    File::open(path).map_err(|source| IntakeError::Open {
        path: path.display().to_string(),
        source,
    })
}

/// Reads `name, north_m, east_m` rows. The directory has to be complete,
/// so the first bad row fails the whole read.
pub fn read_hospitals(reader: impl io::Read) -> Result<Vec<Hospital>, IntakeError> {
    rows(reader)
        .map(|row| row.and_then(|(line, record)| deserialize(line, &record)))
        .collect()
}

pub fn read_hospitals_from_path(path: impl AsRef<Path>) -> Result<Vec<Hospital>, IntakeError> {
    read_hospitals(open(path)?)
}

/// Reads `time, hospital, priority` rows. Bad rows are returned in place
/// as errors so the caller can report each one.
pub fn read_orders(reader: impl io::Read) -> Vec<Result<OrderRecord, IntakeError>> {
    rows(reader)
        .map(|row| -> Result<OrderRecord, IntakeError> {
            let (line, record) = row?;
            Ok(OrderRecord {
                line,
                request: deserialize(line, &record)?,
            })
        })
        .collect()
}

pub fn read_orders_from_path(
    path: impl AsRef<Path>,
) -> Result<Vec<Result<OrderRecord, IntakeError>>, IntakeError> {
    Ok(read_orders(open(path)?))
}

fn rows(reader: impl io::Read) -> impl Iterator<Item = Result<(u64, StringRecord), IntakeError>> {
    ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .from_reader(reader)
        .into_records()
        .map(|row| match row {
            Ok(record) => Ok((line_of(record.position()), record)),
            Err(source) => Err(IntakeError::Unreadable {
                line: line_of(source.position()),
                source,
            }),
        })
}

fn deserialize<T>(line: u64, record: &StringRecord) -> Result<T, IntakeError>
where
    T: serde::de::DeserializeOwned,
{
    record
        .deserialize(None)
        .map_err(|source| IntakeError::Unreadable { line, source })
}

fn line_of(position: Option<&csv::Position>) -> u64 {
    position.map_or(0, csv::Position::line)
}
