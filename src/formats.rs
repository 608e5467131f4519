//! On-disk format constants.

/// Magic bytes for segment signature files.
pub const SIGNATURE_MAGIC: [u8; 4] = *b"HGSG";
/// Current on-disk format version for signature files.
pub const FORMAT_VERSION: u32 = 1;
/// Name of the signature file inside each segment directory.
pub const SIGNATURE_FILE_NAME: &str = "index.sig";

/// Upper bound on a signature payload, to avoid allocating absurd buffers
/// from corrupt headers.
pub const MAX_SIGNATURE_PAYLOAD_BYTES: usize = 64 * 1024;
