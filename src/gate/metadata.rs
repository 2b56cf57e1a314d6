//! Header extraction from call metadata

use gate_core::HeaderSet;
use tonic::metadata::{KeyAndValueRef, MetadataMap};

/// Collect the ASCII entries of `metadata` into a [`HeaderSet`].
///
/// Binary (`-bin`) entries are skipped; none of the gated headers are
/// binary. A call without metadata yields an empty set, which the validator
/// reports as every header missing.
#[must_use]
pub fn header_set(metadata: &MetadataMap) -> HeaderSet {
    let mut headers = HeaderSet::new();
    for entry in metadata.iter() {
        if let KeyAndValueRef::Ascii(key, value) = entry {
            headers.insert(
                key.as_str(),
                String::from_utf8_lossy(value.as_encoded_bytes()).into_owned(),
            );
        }
    }
    headers
}
