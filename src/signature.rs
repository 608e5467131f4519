//! Per-segment index signature file.
//!
//! A signature records the version a segment was sealed at. The archive scanner reads
//! signatures to find the highest committed version across sealed segments, which is
//! where version numbering resumes after a restart.
//!
//! ## Public invariants (must not change without a format bump)
//!
//! - **Header**: `[SIGNATURE_MAGIC][FORMAT_VERSION][payload_len:u64][crc32:u32]`
//!   (little-endian for integers).
//! - **Payload**: postcard-encoded [`IndexSignature`].
//! - **Checksum**: `crc32fast` over the payload bytes.
//! - **Atomicity**: writes go through [`storage::atomic_write`] (temp + rename).

use crate::error::{HourglassError, HourglassResult};
use crate::formats::{FORMAT_VERSION, MAX_SIGNATURE_PAYLOAD_BYTES, SIGNATURE_MAGIC};
use crate::storage;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

/// Metadata stored alongside a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSignature {
    /// Highest version committed into the segment.
    ///
    /// Set when the segment is sealed and never decreased for that segment.
    pub version: u64,
    /// When the signature was written (seconds since epoch), if known.
    pub sealed_at: Option<i64>,
}

impl IndexSignature {
    /// A signature for `version` with no timestamp.
    pub fn new(version: u64) -> Self {
        Self {
            version,
            sealed_at: None,
        }
    }

    /// A signature for `version` stamped with `at`.
    pub fn sealed(version: u64, at: DateTime<Utc>) -> Self {
        Self {
            version,
            sealed_at: Some(at.timestamp()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
/// Fixed-size header stored at the start of a signature file.
pub struct SignatureHeader {
    /// Magic bytes (should equal `SIGNATURE_MAGIC`).
    pub magic: [u8; 4],
    /// Format version (should equal `FORMAT_VERSION`).
    pub format_version: u32,
    /// Payload length in bytes.
    pub payload_len: u64,
    /// CRC32 computed over payload bytes.
    pub checksum: u32,
}

impl SignatureHeader {
    /// Number of bytes in the serialized header.
    pub const SIZE: usize = 4 + 4 + 8 + 4;

    /// Write the header to a stream.
    pub fn write<W: Write>(&self, w: &mut W) -> HourglassResult<()> {
        w.write_all(&self.magic)?;
        w.write_u32::<LittleEndian>(self.format_version)?;
        w.write_u64::<LittleEndian>(self.payload_len)?;
        w.write_u32::<LittleEndian>(self.checksum)?;
        Ok(())
    }

    /// Read the header from a stream.
    pub fn read<R: Read + ?Sized>(r: &mut R) -> HourglassResult<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != SIGNATURE_MAGIC {
            return Err(HourglassError::Format("invalid signature magic".into()));
        }
        let format_version = r.read_u32::<LittleEndian>()?;
        if format_version != FORMAT_VERSION {
            return Err(HourglassError::Format(format!(
                "signature format version mismatch: expected {FORMAT_VERSION}, got {format_version}"
            )));
        }
        Ok(Self {
            magic,
            format_version,
            payload_len: r.read_u64::<LittleEndian>()?,
            checksum: r.read_u32::<LittleEndian>()?,
        })
    }
}

/// Encode a signature into file bytes (header + payload).
pub fn encode(sig: &IndexSignature) -> HourglassResult<Vec<u8>> {
    let payload = postcard::to_allocvec(sig).map_err(|e| HourglassError::Encode(e.to_string()))?;
    let h = SignatureHeader {
        magic: SIGNATURE_MAGIC,
        format_version: FORMAT_VERSION,
        payload_len: payload.len() as u64,
        checksum: crc32fast::hash(&payload),
    };
    let mut buf = Vec::with_capacity(SignatureHeader::SIZE + payload.len());
    h.write(&mut buf)?;
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Decode signature file bytes, validating header, length and CRC.
pub fn decode<R: Read + ?Sized>(r: &mut R) -> HourglassResult<IndexSignature> {
    let h = SignatureHeader::read(r)?;
    let len = usize::try_from(h.payload_len)
        .map_err(|_| HourglassError::Format("payload_len overflow".into()))?;
    if len > MAX_SIGNATURE_PAYLOAD_BYTES {
        return Err(HourglassError::Format(format!(
            "signature payload too large: {len} bytes (max {MAX_SIGNATURE_PAYLOAD_BYTES})"
        )));
    }
    let mut payload = vec![0u8; len];
    r.read_exact(&mut payload)?;
    let got = crc32fast::hash(&payload);
    if got != h.checksum {
        return Err(HourglassError::CrcMismatch {
            expected: h.checksum,
            actual: got,
        });
    }
    postcard::from_bytes(&payload).map_err(|e| HourglassError::Decode(e.to_string()))
}

/// Reads and writes the signature file at a fixed path.
#[derive(Debug, Clone)]
pub struct SignatureFile {
    path: PathBuf,
}

impl SignatureFile {
    /// Bind to the signature file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the signature file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the signature.
    ///
    /// - absent file: `SignatureMissing`
    /// - present but undecodable (magic, version, length, CRC, payload): `SignatureCorrupt`
    /// - any other I/O failure (permissions, ...): `IoAt`
    pub fn read(&self) -> HourglassResult<IndexSignature> {
        let mut f = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(HourglassError::SignatureMissing(self.path.clone()))
            }
            Err(e) => return Err(HourglassError::io_at(&self.path, e)),
        };
        decode(&mut f).map_err(|e| match e {
            HourglassError::Io(io) if io.kind() != ErrorKind::UnexpectedEof => {
                HourglassError::io_at(&self.path, io)
            }
            other => HourglassError::SignatureCorrupt {
                path: self.path.clone(),
                reason: other.to_string(),
            },
        })
    }

    /// Atomically (re)write the signature.
    pub fn write(&self, sig: &IndexSignature) -> HourglassResult<()> {
        storage::atomic_write(&self.path, &encode(sig)?)
    }

    /// Write the signature and make it durable on stable storage (file + parent dir sync).
    pub fn write_durable(&self, sig: &IndexSignature) -> HourglassResult<()> {
        storage::atomic_write_durable(&self.path, &encode(sig)?)
    }
}
