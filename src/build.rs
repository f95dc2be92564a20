//! The three-phase build: start a container, let collaborators fill lumps, then finish it.

use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::mem;
use std::path::Path;

use archive::{ContainerHeader, ContainerWriter, DirectoryEntry, FailureLog, Layout, Lump, LumpRegistry};
use backup;
use errors::{ErrorKind, Result};


/// Marks the end of the metadata text: ^Z, then a NUL.
const INFO_TERMINATOR: [u8; 2] = [26, 0];

pub const DEFAULT_SECTIONS: [&str; 3] = ["Game Settings", "Level Architecture", "Playing Style"];


#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsSection {
    pub title: String,
    pub values: Vec<(String, String)>,
}

/// Provenance recorded in the metadata lump: what made this level, and with which settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildInfo {
    pub tool: String,
    pub version: String,
    pub credits: Vec<String>,
    pub sections: Vec<SettingsSection>,
}

impl BuildInfo {
    pub fn new<T: Into<String>, V: Into<String>>(tool: T, version: V) -> Self {
        BuildInfo {
            tool: tool.into(),
            version: version.into(),
            credits: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn credit<S: Into<String>>(&mut self, line: S) {
        self.credits.push(line.into());
    }

    /// The section with this title, created at the end if it doesn't exist yet.
    pub fn section_mut(&mut self, title: &str) -> &mut SettingsSection {
        let index = match self.sections.iter().position(|s| s.title == title) {
            Some(index) => index,
            None => {
                self.sections.push(SettingsSection { title: title.to_owned(), values: Vec::new() });
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, section: &str, key: K, value: V) {
        self.section_mut(section).values.push((key.into(), value.into()));
    }

    /// Render as DOS text into `lump`, commented so that it reads sensibly in a text editor.
    pub fn write_to(&self, lump: &mut Lump) {
        // Lump's fmt::Write never fails
        let _ = self.write_text(lump);
        lump.append(&INFO_TERMINATOR);
    }

    fn write_text(&self, lump: &mut Lump) -> ::std::fmt::Result {
        write!(lump, "\n\n\n\n")?;
        write!(lump, "-- Map created by {} {}\n", self.tool, self.version)?;
        for line in self.credits.iter() {
            write!(lump, "-- {}\n", line)?;
        }
        write!(lump, "\n")?;

        for section in self.sections.iter() {
            write!(lump, "-- {} --\n", section.title)?;
            for &(ref key, ref value) in section.values.iter() {
                write!(lump, "{} = {}\n", key, value)?;
            }
            write!(lump, "\n")?;
        }

        write!(lump, "\n\n\n\n\n\n")
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        let mut info = BuildInfo::new("wadsmith", env!("CARGO_PKG_VERSION"));
        for title in DEFAULT_SECTIONS.iter() {
            info.section_mut(title);
        }
        info
    }
}


/// Something that has to run after content generation but before the container is sealed, e.g.
/// node building, visibility, or writing out auxiliary patch lumps.
pub trait FinishStep {
    fn run(&mut self, lumps: &mut LumpRegistry);
}

impl<F: FnMut(&mut LumpRegistry)> FinishStep for F {
    fn run(&mut self, lumps: &mut LumpRegistry) {
        self(lumps)
    }
}


#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Started,
    Finished,
}

/// What the last finished build produced.
#[derive(Clone, Debug)]
pub struct BuildSummary {
    pub header: ContainerHeader,
    pub directory: Vec<DirectoryEntry>,
    pub write_failures: FailureLog,
    pub seek_failures: FailureLog,
}

impl BuildSummary {
    pub fn is_clean(&self) -> bool {
        self.write_failures.is_clean() && self.seek_failures.is_clean()
    }
}

enum State<W> {
    Idle,
    Started(ContainerWriter<W>),
    Finished(BuildSummary),
}


/// Drives one container build at a time: `Idle → Started → Finished`.
///
/// All per-build state (slots, directory, failure counts) is reset by `start`, so one builder can
/// be reused for a batch of levels.
pub struct LevelBuilder<W> {
    lumps: LumpRegistry,
    info: BuildInfo,
    steps: Vec<Box<dyn FinishStep>>,
    state: State<W>,
}

impl<W: Write + Seek> LevelBuilder<W> {
    pub fn new(layout: &'static Layout, info: BuildInfo) -> Self {
        LevelBuilder {
            lumps: LumpRegistry::new(layout),
            info,
            steps: Vec::new(),
            state: State::Idle,
        }
    }

    pub fn layout(&self) -> &'static Layout {
        self.lumps.layout()
    }

    pub fn info_mut(&mut self) -> &mut BuildInfo {
        &mut self.info
    }

    /// Register a step to run, in order, at the start of `finish_build`.
    pub fn add_step<S: FinishStep + 'static>(&mut self, step: S) {
        self.steps.push(Box::new(step));
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::Started(_) => Phase::Started,
            State::Finished(_) => Phase::Finished,
        }
    }

    /// Results of the most recent `finish_build`, successful or not.
    pub fn summary(&self) -> Option<&BuildSummary> {
        match self.state {
            State::Finished(ref summary) => Some(summary),
            _ => None,
        }
    }

    /// Take over `stream`, write the provisional header, and write the metadata lump right after.
    pub fn start(&mut self, stream: W) {
        if let State::Started(_) = self.state {
            panic!("INTERNAL ERROR: build started while another is still in progress");
        }

        self.lumps.clear();
        let mut writer = ContainerWriter::open(stream);
        writer.raw_write(&ContainerHeader::provisional().to_bytes());

        let info_slot = self.layout().info_slot();
        self.info.write_to(self.lumps.create_slot(info_slot));
        if let Some(lump) = self.lumps.take(info_slot) {
            writer.write_lump(self.layout().info_lump_name, lump.as_bytes());
        }

        info!("started {} container", self.layout().name);
        self.state = State::Started(writer);
    }

    fn assert_started(&self, what: &str) {
        if let State::Started(_) = self.state {
            return;
        }
        panic!("INTERNAL ERROR: {} called with no build in progress", what);
    }

    /// Create the lump for `slot`; each slot may only be created once per build.
    pub fn new_lump(&mut self, slot: usize) -> &mut Lump {
        self.assert_started("new_lump");
        self.lumps.create_slot(slot)
    }

    pub fn lump_mut(&mut self, slot: usize) -> &mut Lump {
        self.assert_started("lump_mut");
        self.lumps.get_slot(slot)
    }

    pub fn lumps_mut(&mut self) -> &mut LumpRegistry {
        self.assert_started("lumps_mut");
        &mut self.lumps
    }

    /// Run the finishing steps, stream every created slot in slot order, write the directory, and
    /// patch the real header in.  The stream is closed afterwards.
    ///
    /// A slot that was created but never filled is still written, as a zero-length entry; only
    /// slots nobody created are left out of the directory.
    ///
    /// Everything is attempted even if the stream is failing; an `ExportFailed` error means the
    /// file on disk is incomplete, and it's up to the caller to decide what to do with it.
    pub fn finish_build(&mut self) -> Result<()> {
        let mut writer = match mem::replace(&mut self.state, State::Idle) {
            State::Started(writer) => writer,
            other => {
                self.state = other;
                panic!("INTERNAL ERROR: finish_build called with no build in progress");
            }
        };

        for step in self.steps.iter_mut() {
            step.run(&mut self.lumps);
        }

        let layout = self.layout();
        for slot in 0..layout.slot_count() {
            if let Some(lump) = self.lumps.take(slot) {
                // slot_count() bounds the loop, so every slot has a name
                let name = layout.slot_name(slot).unwrap_or("");
                writer.write_lump(name, lump.as_bytes());
            }
        }

        let header = writer.finalize();
        let (directory, write_failures, seek_failures) = writer.close();
        self.lumps.clear();

        let summary = BuildSummary { header, directory, write_failures, seek_failures };
        let result = if summary.is_clean() {
            info!("finished container: {} lumps, directory at offset {}", header.entry_count, header.directory_start);
            Ok(())
        }
        else {
            Err(ErrorKind::ExportFailed(summary.write_failures.total(), summary.seek_failures.total()).into())
        };
        self.state = State::Finished(summary);
        result
    }
}

/// A builder writing straight to a file on disk.
pub type FileBuilder = LevelBuilder<BufWriter<File>>;

impl FileBuilder {
    /// Back up whatever is at `path`, then start a build writing to it.
    pub fn start_build<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        debug!("target filename: {}", path.display());
        backup::backup_existing(path);

        let file = File::create(path)?;
        self.start(BufWriter::new(file));
        Ok(())
    }
}
