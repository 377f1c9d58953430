//! Async download with streaming checksum verification.

use std::path::Path;

use binq_schema::Checksum;
use futures::TryStreamExt;
use reqwest::{Client, Url};
use thiserror::Error;
use tokio::fs::File;
use tokio_util::io::StreamReader;
use tracing::{debug, info};

use crate::Reporter;
use crate::verify::{Verification, verify_download};

/// Errors raised while fetching or saving a download.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Transport failure or non-success status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local read/write failure, including a broken response body.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Percent-decoded last non-empty path segment of a URL.
///
/// Query and fragment are ignored. Returns an empty string when the URL does
/// not parse or has no usable segment, including names that decode to a path.
///
/// # Example
///
/// ```
/// use binq_core::io::download::filename_from_url;
///
/// assert_eq!(filename_from_url("https://example.com/path/to/file.tar.gz?x=1"), "file.tar.gz");
/// assert_eq!(filename_from_url("https://example.com/dl/tool%2Bx.zip"), "tool+x.zip");
/// assert_eq!(filename_from_url(""), "");
/// ```
pub fn filename_from_url(url: &str) -> String {
    let Ok(url) = Url::parse(url) else {
        return String::new();
    };
    let Some(segment) = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
    else {
        return String::new();
    };
    let name = percent_decode(segment);
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return String::new();
    }
    name
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let mut byte = [0u8; 1];
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && hex::decode_to_slice(&bytes[i + 1..i + 3], &mut byte).is_ok()
        {
            out.push(byte[0]);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// GETs `url` into `dest`, verifying against `checksum` while writing.
///
/// The returned [`Verification`] says whether the digest matched; a
/// mismatch keeps the file. Progress is reported under `dest`'s file name.
pub async fn download<P: Reporter + ?Sized>(
    client: &Client,
    url: &str,
    dest: &Path,
    checksum: Option<&mut Checksum>,
    reporter: &P,
) -> Result<Verification, DownloadError> {
    info!(url, "GET");
    let response = client.get(url).send().await?.error_for_status()?;
    let total = response.content_length();
    let label = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    reporter.downloading(&label, 0, total);
    let mut received: u64 = 0;
    let stream = response
        .bytes_stream()
        .inspect_ok(|chunk| {
            received += chunk.len() as u64;
            reporter.downloading(&label, received, total);
        })
        .map_err(std::io::Error::other);

    let mut file = File::create(dest).await?;
    let outcome = verify_download(
        checksum,
        StreamReader::new(Box::pin(stream)),
        &mut file,
        reporter,
    )
    .await?;
    debug!(path = %dest.display(), "saved download");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullReporter;
    use binq_schema::ChecksumKind;
    use mockito::Server;

    #[tokio::test]
    async fn test_download_verifies() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/tool.bin")
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("tool.bin");
        let mut sum = Checksum::new(
            "tool.bin",
            ChecksumKind::Sha256,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
        );

        let url = format!("{}/tool.bin", server.url());
        let res = download(&Client::new(), &url, &dest, Some(&mut sum), &NullReporter)
            .await
            .unwrap();
        assert!(matches!(res, Verification::Matched { .. }));
        assert_eq!(std::fs::read(&dest).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_download_http_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let url = format!("{}/missing", server.url());
        let err = download(&Client::new(), &url, &dir.path().join("x"), None, &NullReporter)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::Http(_)));
        assert!(!dir.path().join("x").exists());
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(filename_from_url("https://h/a/b/c.zip"), "c.zip");
        assert_eq!(filename_from_url("https://h/a/b/c.zip#frag"), "c.zip");
        assert_eq!(filename_from_url("https://h/a/tool-1.0/"), "tool-1.0");
        assert_eq!(filename_from_url("https://h/a/my%20tool.tar.gz"), "my tool.tar.gz");
        assert_eq!(filename_from_url("https://h/a/%zz"), "%zz");
        assert_eq!(filename_from_url("https://h/"), "");
        assert_eq!(filename_from_url("https://h/a/..%2Fetc%2Fpasswd"), "");
        assert_eq!(filename_from_url("not a url"), "");
    }
}
