//! Streaming checksum verification.
//!
//! The payload is hashed while it is written to its destination, so large
//! artifacts are never held in memory.

use std::fmt;
use std::io::Read;

use binq_schema::{Checksum, ChecksumKind};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::Reporter;
use crate::io::download::DownloadError;

const BUF_SIZE: usize = 64 * 1024;

/// Incremental hasher for one [`ChecksumKind`].
pub enum StreamHasher {
    /// SHA-256 state.
    Sha256(Sha256),
    /// CRC-32 (IEEE) state.
    Crc32(crc32fast::Hasher),
}

impl StreamHasher {
    /// Fresh state for `kind`.
    pub fn new(kind: ChecksumKind) -> Self {
        match kind {
            ChecksumKind::Sha256 => Self::Sha256(Sha256::new()),
            ChecksumKind::Crc32 => Self::Crc32(crc32fast::Hasher::new()),
        }
    }

    /// Feeds bytes into the digest.
    pub fn update(&mut self, bytes: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(bytes),
            Self::Crc32(h) => h.update(bytes),
        }
    }

    /// Hex-encoded digest. CRC-32 is written big-endian.
    pub fn finish(self) -> String {
        match self {
            Self::Sha256(h) => hex::encode(h.finalize()),
            Self::Crc32(h) => hex::encode(h.finalize().to_be_bytes()),
        }
    }
}

impl fmt::Debug for StreamHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256(_) => f.write_str("StreamHasher::Sha256"),
            Self::Crc32(_) => f.write_str("StreamHasher::Crc32"),
        }
    }
}

/// Hex digest of everything `reader` yields.
pub fn digest_reader<R: Read>(kind: ChecksumKind, mut reader: R) -> std::io::Result<String> {
    let mut hasher = StreamHasher::new(kind);
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finish())
}

/// Result of a verified copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// No checksum was recorded; nothing was compared.
    Skipped,
    /// The digest equals the recorded one.
    Matched {
        /// Computed digest.
        digest: String,
    },
    /// The digest differs from a real recorded value. The file is kept.
    Mismatch {
        /// Recorded digest.
        expected: String,
        /// Computed digest.
        actual: String,
    },
    /// The recorded value was the placeholder and now holds the digest.
    Recorded {
        /// Computed digest.
        digest: String,
    },
}

impl Verification {
    /// Whether the checksum record was modified and should be persisted.
    pub fn changed(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }
}

/// Copies `src` into `dest`, hashing on the way, and checks the result.
///
/// With no `checksum` the copy still happens and a notice is reported. A
/// mismatch is reported as a warning and never treated as an error. When the
/// recorded value is the placeholder, it is replaced by the computed digest
/// and [`Verification::Recorded`] is returned.
///
/// I/O errors abort the copy; `dest` may then hold a partial file.
pub async fn verify_download<R, W, P>(
    checksum: Option<&mut Checksum>,
    mut src: R,
    dest: &mut W,
    reporter: &P,
) -> Result<Verification, DownloadError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    P: Reporter + ?Sized,
{
    let mut hasher = checksum.as_ref().map(|sum| StreamHasher::new(sum.kind));
    let mut buf = vec![0u8; BUF_SIZE];
    let mut written: u64 = 0;

    loop {
        let n = src.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        dest.write_all(&buf[..n]).await?;
        if let Some(h) = hasher.as_mut() {
            h.update(&buf[..n]);
        }
        written += n as u64;
    }
    dest.flush().await?;
    debug!(bytes = written, "copy finished");

    let (Some(sum), Some(hasher)) = (checksum, hasher) else {
        reporter.notice("Checksum is not provided. Skip verification");
        return Ok(Verification::Skipped);
    };
    let digest = hasher.finish();
    debug!(file = %sum.file, kind = %sum.kind, digest = %digest, "computed digest");

    if sum.is_placeholder() {
        sum.set_value(digest.as_str());
        reporter.info(&format!("Recorded {} checksum of {}: {digest}", sum.kind, sum.file));
        return Ok(Verification::Recorded { digest });
    }
    if sum.matches(&digest) {
        reporter.success(&format!("Checksum is OK: {}", sum.file));
        return Ok(Verification::Matched { digest });
    }

    reporter.warning(&format!(
        "Checksum differs! Maybe corrupt? File: {}, want: {}, got: {digest}",
        sum.file, sum.value
    ));
    Ok(Verification::Mismatch {
        expected: sum.value.clone(),
        actual: digest,
    })
}
