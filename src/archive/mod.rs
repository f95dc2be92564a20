//! Container mechanics: lump payloads, the slot table, and the writer that streams them to disk
//! behind a WAD-style header and directory.

use std::str;

use byteorder::{ByteOrder, LittleEndian};

pub mod layout;
pub mod lump;
pub mod registry;
pub mod writer;

pub use self::layout::{Layout, QUAKE1};
pub use self::lump::Lump;
pub use self::registry::LumpRegistry;
pub use self::writer::{ContainerWriter, FailureLog, MAX_LOGGED_FAILURES};


/// Tag written at the start of a build; a file still carrying it was never finished.
pub const PROVISIONAL_TAG: [u8; 4] = *b"XWAD";
/// Tag patched in once the directory has been written.
pub const FINAL_TAG: [u8; 4] = *b"PWAD";

pub const HEADER_SIZE: usize = 12;
pub const DIRECTORY_ENTRY_SIZE: usize = 16;
pub const MAX_LUMP_NAME: usize = 8;


/// Round a lump length up to the next multiple of four.
pub fn aligned(len: usize) -> usize {
    (len + 3) & !3
}


#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ContainerHeader {
    pub type_tag: [u8; 4],
    pub directory_start: u32,
    pub entry_count: u32,
}

impl ContainerHeader {
    /// The placeholder written before any content exists.
    pub fn provisional() -> Self {
        ContainerHeader {
            type_tag: PROVISIONAL_TAG,
            directory_start: 0,
            entry_count: 0,
        }
    }

    pub fn finished(directory_start: u32, entry_count: u32) -> Self {
        ContainerHeader {
            type_tag: FINAL_TAG,
            directory_start,
            entry_count,
        }
    }

    pub fn is_final(&self) -> bool {
        self.type_tag == FINAL_TAG
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.type_tag);
        LittleEndian::write_u32(&mut buf[4..8], self.directory_start);
        LittleEndian::write_u32(&mut buf[8..12], self.entry_count);
        buf
    }
}


/// One record of the directory.  `length` is the unpadded payload size.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub start: u32,
    pub length: u32,
    pub name: [u8; MAX_LUMP_NAME],
}

impl DirectoryEntry {
    pub fn new(name: &str, start: u32, length: u32) -> Self {
        DirectoryEntry {
            start,
            length,
            name: pack_lump_name(name),
        }
    }

    /// The name with its zero padding stripped.
    pub fn name(&self) -> &str {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(MAX_LUMP_NAME);
        str::from_utf8(&self.name[..end]).unwrap_or("")
    }

    pub fn to_bytes(&self) -> [u8; DIRECTORY_ENTRY_SIZE] {
        let mut buf = [0u8; DIRECTORY_ENTRY_SIZE];
        LittleEndian::write_u32(&mut buf[0..4], self.start);
        LittleEndian::write_u32(&mut buf[4..8], self.length);
        buf[8..16].copy_from_slice(&self.name);
        buf
    }
}

/// Zero-pad a lump name to its fixed on-disk width.
///
/// Panics if the name doesn't fit; every caller passes a name from a `Layout` or a collaborator,
/// so an overlong one is a bug, not bad input.
pub fn pack_lump_name(name: &str) -> [u8; MAX_LUMP_NAME] {
    let bytes = name.as_bytes();
    if bytes.len() > MAX_LUMP_NAME {
        panic!("INTERNAL ERROR: lump name {:?} is longer than {} bytes", name, MAX_LUMP_NAME);
    }
    let mut packed = [0u8; MAX_LUMP_NAME];
    packed[..bytes.len()].copy_from_slice(bytes);
    packed
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_pads_to_four() {
        for n in 0..1000 {
            let a = aligned(n);
            assert_eq!(a % 4, 0);
            assert!(a - n <= 3, "aligned({}) = {}", n, a);
        }
        assert_eq!(aligned(0), 0);
        assert_eq!(aligned(4), 4);
        assert_eq!(aligned(5), 8);
    }

    #[test]
    fn header_layout() {
        let header = ContainerHeader::finished(0x1234, 3);
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], b"PWAD");
        assert_eq!(&bytes[4..8], &[0x34, 0x12, 0, 0]);
        assert_eq!(&bytes[8..12], &[3, 0, 0, 0]);
        assert!(header.is_final());
        assert!(!ContainerHeader::provisional().is_final());
        assert_eq!(&ContainerHeader::provisional().to_bytes()[..], b"XWAD\0\0\0\0\0\0\0\0");
    }

    #[test]
    fn directory_entry_layout() {
        let entry = DirectoryEntry::new("FACES", 12, 5);
        let bytes = entry.to_bytes();
        assert_eq!(&bytes[0..4], &[12, 0, 0, 0]);
        assert_eq!(&bytes[4..8], &[5, 0, 0, 0]);
        assert_eq!(&bytes[8..16], b"FACES\0\0\0");
        assert_eq!(entry.name(), "FACES");

        assert_eq!(DirectoryEntry::new("SURFEDGE", 0, 0).name(), "SURFEDGE");
    }

    #[test]
    #[should_panic(expected = "longer than 8 bytes")]
    fn overlong_name_is_fatal() {
        pack_lump_name("MARKSURFACES");
    }
}
