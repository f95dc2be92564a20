use std::str::FromStr;

use ::errors::{ErrorKind, Result};


/// The fixed set of lump slots a target format defines, plus the extra slot reserved for the
/// builder's own provenance text.
#[derive(Debug)]
pub struct Layout {
    pub name: &'static str,
    /// Content lumps, indexed by slot id.
    pub lump_names: &'static [&'static str],
    /// Name of the metadata lump, which lives in the slot right after the content lumps.
    pub info_lump_name: &'static str,
}

// Quake 1 BSP lumps, in header order, squeezed into eight characters
const QUAKE1_LUMPS: [&str; 15] = [
    "ENTITIES",
    "PLANES",
    "TEXTURES",
    "VERTEXES",
    "VISIBILI",
    "NODES",
    "TEXINFO",
    "FACES",
    "LIGHTING",
    "CLIPNODE",
    "LEAFS",
    "MARKSURF",
    "EDGES",
    "SURFEDGE",
    "MODELS",
];

pub static QUAKE1: Layout = Layout {
    name: "quake1",
    lump_names: &QUAKE1_LUMPS,
    info_lump_name: "BUILDINF",
};

impl Layout {
    /// Number of content slots, i.e. `N`.
    pub fn content_slots(&self) -> usize {
        self.lump_names.len()
    }

    /// Total slots including the metadata slot.
    pub fn slot_count(&self) -> usize {
        self.lump_names.len() + 1
    }

    pub fn info_slot(&self) -> usize {
        self.lump_names.len()
    }

    pub fn slot_name(&self, id: usize) -> Option<&'static str> {
        if id < self.lump_names.len() {
            Some(self.lump_names[id])
        }
        else if id == self.info_slot() {
            Some(self.info_lump_name)
        }
        else {
            None
        }
    }

    /// Find a slot by lump name, ignoring case.
    pub fn find_slot(&self, name: &str) -> Option<usize> {
        (0..self.slot_count())
        .find(|&id| self.slot_name(id).map_or(false, |n| n.eq_ignore_ascii_case(name)))
    }

    /// Accept either a numeric slot id or a lump name.
    pub fn parse_slot(&self, spec: &str) -> Result<usize> {
        if let Ok(id) = usize::from_str(spec) {
            if id < self.slot_count() {
                return Ok(id);
            }
        }
        else if let Some(id) = self.find_slot(spec) {
            return Ok(id);
        }
        Err(ErrorKind::UnknownSlot(spec.to_owned()).into())
    }
}
