//! Validation of legacy (97-2003) Office files before conversion.
//!
//! Legacy documents use the Microsoft Compound File Binary (CFB) format.
//! Checking the container up front avoids launching the office application
//! for files it cannot possibly open.

use crate::ApplicationKind;
use cfb::CompoundFile;
use doctext_core::{classify_io_error, Error, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Stream present in password-protected Office files.
const ENCRYPTED_PACKAGE_STREAM: &str = "/EncryptedPackage";

/// Verify `path` is a CFB container holding the main stream for `kind`.
pub fn probe(path: &Path, kind: ApplicationKind) -> Result<()> {
    let file = File::open(path).map_err(|e| classify_io_error(e, path))?;
    probe_reader(BufReader::new(file), kind)
}

/// Verify a reader holds a CFB container with the main stream for `kind`.
pub fn probe_reader<R: Read + Seek>(reader: R, kind: ApplicationKind) -> Result<()> {
    let cfb = CompoundFile::open(reader)
        .map_err(|e| Error::CfbError(format!("Failed to open CFB container: {}", e)))?;

    let has_stream = |wanted: &str| cfb.walk().any(|entry| entry.path().to_string_lossy() == wanted);

    if has_stream(ENCRYPTED_PACKAGE_STREAM) {
        return Err(Error::CorruptedFile(
            "Document is password-protected and cannot be read".to_string(),
        ));
    }

    let main_stream = kind.legacy_stream();
    if !has_stream(main_stream) {
        return Err(Error::CorruptedFile(format!(
            "Missing '{}' stream. This may not be a valid {} file \
             or may be a different Office format.",
            main_stream.trim_start_matches('/'),
            kind.legacy_extension()
        )));
    }

    log::debug!("Legacy container has '{}' stream", main_stream);
    Ok(())
}
