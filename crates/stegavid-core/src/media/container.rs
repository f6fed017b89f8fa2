//! Payload appended behind the end of an arbitrary file.
//!
//! Players and most parsers stop reading at the logical end of a container,
//! so a trailer `data ∥ metadata ∥ len(metadata) ∥ STEG_EOF_PAYLOAD` behind it
//! goes unnoticed. The carrier bytes themselves are never touched. Any
//! re-encoding or remuxing of the file drops the trailer.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};
use log::{debug, error};
use tempfile::NamedTempFile;

use crate::error::StegError;
use crate::media::payload::{EnvelopeFormat, Metadata, Payload, EOF_MARKER, LENGTH_PREFIX_LEN};
use crate::progress::ProgressTracker;
use crate::result::Result;

/// advertised for display only, the engine does not enforce it
pub const NOMINAL_CAPACITY: u64 = u32::MAX as u64;

pub const REENCODING_WARNING: &str =
    "The payload sits behind the end of the file, re-encoding or remuxing the carrier destroys it";

const COPY_CHUNK: usize = 64 * 1024;

/// copies `carrier` to `output` with the payload trailer appended, returns the output size
pub fn append(
    carrier: &Path,
    output: &Path,
    payload: &Payload,
    tracker: &mut ProgressTracker,
) -> Result<u64> {
    let trailer = EnvelopeFormat::ContainerTrailer.encode(payload)?;

    let mut source = File::open(carrier)
        .map_err(|e| StegError::CarrierUnreadable(format!("{carrier:?}: {e}")))?;
    let carrier_len = source
        .metadata()
        .map_err(|source| StegError::ReadError { source })?
        .len();

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut target = NamedTempFile::new_in(dir).map_err(|source| {
        error!("Error creating temporary file in {dir:?}: {source}");
        StegError::WriteError { source }
    })?;

    let mut buffer = vec![0u8; COPY_CHUNK];
    let mut copied = 0u64;
    loop {
        tracker.checkpoint()?;
        let n = source
            .read(&mut buffer)
            .map_err(|source| StegError::ReadError { source })?;
        if n == 0 {
            break;
        }
        target
            .write_all(&buffer[..n])
            .map_err(|source| StegError::WriteError { source })?;
        copied += n as u64;
        tracker.update(copied as usize, carrier_len as usize);
    }
    target
        .write_all(&trailer)
        .map_err(|source| StegError::WriteError { source })?;
    target
        .as_file()
        .sync_all()
        .map_err(|source| StegError::WriteError { source })?;
    target
        .persist(output)
        .map_err(|e| StegError::WriteError { source: e.error })?;

    let total = copied + trailer.len() as u64;
    debug!("Appended {} trailer bytes behind {copied} carrier bytes", trailer.len());

    Ok(total)
}

/// reads the trailer of `path`
pub fn extract(path: &Path) -> Result<Payload> {
    let file = File::open(path)
        .map_err(|e| StegError::CarrierUnreadable(format!("{path:?}: {e}")))?;

    read_trailer(BufReader::new(file))
}

/// walks backwards from the end: marker, metadata length, metadata, data
pub fn read_trailer<R: Read + Seek>(mut reader: R) -> Result<Payload> {
    let file_len = reader.seek(SeekFrom::End(0))?;
    let marker_len = EOF_MARKER.len() as u64;
    if file_len < marker_len {
        return Err(StegError::MarkerNotFound);
    }

    let marker_at = file_len - marker_len;
    let mut marker = vec![0u8; EOF_MARKER.len()];
    reader.seek(SeekFrom::Start(marker_at))?;
    reader.read_exact(&mut marker)?;
    if marker != EOF_MARKER {
        return Err(StegError::MarkerNotFound);
    }

    let Some(length_at) = marker_at.checked_sub(LENGTH_PREFIX_LEN as u64) else {
        return Err(StegError::CorruptMetadata(
            "no room for the metadata length".to_string(),
        ));
    };
    reader.seek(SeekFrom::Start(length_at))?;
    let metadata_len = u64::from(reader.read_u32::<BigEndian>()?);

    let Some(metadata_at) = length_at.checked_sub(metadata_len) else {
        return Err(StegError::CorruptMetadata(format!(
            "metadata of {metadata_len} bytes would start before the file"
        )));
    };
    let mut raw_metadata = vec![0u8; metadata_len as usize];
    reader.seek(SeekFrom::Start(metadata_at))?;
    reader.read_exact(&mut raw_metadata)?;
    let metadata = Metadata::from_json(&raw_metadata)?;

    let Some(data_at) = metadata_at.checked_sub(metadata.size) else {
        return Err(StegError::TruncatedPayload);
    };
    let mut data = vec![0u8; metadata.size as usize];
    reader.seek(SeekFrom::Start(data_at))?;
    reader.read_exact(&mut data)?;

    Ok(Payload::from_file_data(data, metadata))
}
