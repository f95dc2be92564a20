//! Writes level containers: a WAD-style header, a run of 4-byte-aligned lumps, and a directory,
//! assembled in two passes so the header can be patched once the final layout is known.
//!
//! Content generators fill lumps through a `LevelBuilder`; the builder owns the output stream
//! from `start` to `finish_build`.

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
extern crate byteorder;
#[cfg(test)]
extern crate tempfile;

pub mod archive;
pub mod backup;
pub mod build;
pub mod errors;

pub use archive::{aligned, ContainerHeader, DirectoryEntry, Layout, Lump, LumpRegistry, QUAKE1};
pub use build::{BuildInfo, BuildSummary, FileBuilder, FinishStep, LevelBuilder, Phase};
