//! Binary file detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CutterResult, IoResultExt};

/// Number of leading bytes inspected.
const SAMPLE_SIZE: u64 = 8192;

/// Returns true if the file at `path` looks binary.
///
/// Only the first 8 KiB are read; see [`is_binary_content`].
pub fn is_binary<P: AsRef<Path>>(path: P) -> CutterResult<bool> {
    let path = path.as_ref();
    let mut sample = Vec::new();
    File::open(path)
        .and_then(|file| file.take(SAMPLE_SIZE).read_to_end(&mut sample))
        .with_path(path)?;
    Ok(is_binary_content(&sample))
}

/// Classifies a content sample.
///
/// A NUL byte or an invalid UTF-8 sequence marks the content as binary. A
/// multi-byte sequence cut short at the end of the sample does not count.
pub fn is_binary_content(sample: &[u8]) -> bool {
    if sample.contains(&0) {
        return true;
    }
    match std::str::from_utf8(sample) {
        Ok(_) => false,
        Err(e) => e.error_len().is_some(),
    }
}

