//! Whole-file loading helper.

#[cfg(feature = "std")]
use crate::alloc_prelude::Vec;

/// Read an entire file into a byte buffer.
///
/// A missing or unreadable file is not an error at this level: the failure
/// is logged as a warning and an empty buffer is returned, leaving the
/// caller to decide whether "no data" matters.
#[cfg(feature = "std")]
pub fn load_file_bytes<P: AsRef<std::path::Path>>(path: P) -> Vec<u8> {
    match std::fs::read(path.as_ref()) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("could not read '{}': {}", path.as_ref().display(), err);
            Vec::new()
        }
    }
}
