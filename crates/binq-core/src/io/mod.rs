//! Network and filesystem plumbing: downloads, archive extraction and
//! placement of executables.

pub mod download;
pub mod extract;
pub mod place;
