use std::convert::TryFrom;
use std::io::{Seek, SeekFrom, Write};

use super::{aligned, ContainerHeader, DirectoryEntry, MAX_LUMP_NAME};


/// Only this many failures of each kind get logged, so a dead disk doesn't bury everything else.
pub const MAX_LOGGED_FAILURES: usize = 10;

/// Counts failures of one kind and decides which of them are worth logging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureLog {
    limit: usize,
    total: usize,
    logged: usize,
}

impl FailureLog {
    pub fn new(limit: usize) -> Self {
        FailureLog { limit, total: 0, logged: 0 }
    }

    /// Count a failure.  Returns whether the caller should log it.
    pub fn record(&mut self) -> bool {
        self.total += 1;
        if self.logged < self.limit {
            self.logged += 1;
            true
        }
        else {
            false
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn logged(&self) -> usize {
        self.logged
    }

    pub fn is_clean(&self) -> bool {
        self.total == 0
    }
}

impl Default for FailureLog {
    fn default() -> Self {
        FailureLog::new(MAX_LOGGED_FAILURES)
    }
}


/// Sole owner of the output stream for the length of a build.
///
/// I/O failures never stop the writer: they are counted, the first few are logged, and it carries
/// on with whatever is left to write.  Callers check `write_failures()` / `seek_failures()` at
/// the end.
pub struct ContainerWriter<W> {
    stream: W,
    /// Where we believe the stream is, for when it can't tell us
    cursor: u64,
    directory: Vec<DirectoryEntry>,
    write_failures: FailureLog,
    seek_failures: FailureLog,
}

impl<W: Write + Seek> ContainerWriter<W> {
    pub fn open(stream: W) -> Self {
        ContainerWriter::with_failure_logs(stream, FailureLog::default(), FailureLog::default())
    }

    pub fn with_failure_logs(stream: W, write_failures: FailureLog, seek_failures: FailureLog) -> Self {
        ContainerWriter {
            stream,
            cursor: 0,
            directory: Vec::new(),
            write_failures,
            seek_failures,
        }
    }

    pub fn raw_write(&mut self, bytes: &[u8]) {
        match self.stream.write_all(bytes) {
            Ok(()) => {
                self.cursor += bytes.len() as u64;
            }
            Err(err) => {
                if self.write_failures.record() {
                    error!("Failure writing to container file! ({} bytes): {}", bytes.len(), err);
                }
            }
        }
    }

    pub fn raw_seek(&mut self, offset: u32) {
        if let Err(err) = self.stream.flush() {
            if self.write_failures.record() {
                error!("Failure flushing container file before seek: {}", err);
            }
        }

        match self.stream.seek(SeekFrom::Start(offset as u64)) {
            Ok(_) => {
                self.cursor = offset as u64;
            }
            Err(err) => {
                if self.seek_failures.record() {
                    error!("Failure seeking in container file! (offset {}): {}", offset, err);
                }
            }
        }
    }

    /// Current offset in the stream.
    ///
    /// Buffered writes are flushed first, so a failure to write them counts against the writes
    /// rather than showing up as a failed position query.
    pub fn tell(&mut self) -> u32 {
        let position = match self.stream.flush() {
            Err(err) => {
                if self.write_failures.record() {
                    error!("Failure writing to container file! (flushing before tell): {}", err);
                }
                self.cursor
            }
            Ok(()) => match self.stream.seek(SeekFrom::Current(0)) {
                Ok(position) => position,
                Err(err) => {
                    if self.seek_failures.record() {
                        error!("Failure querying position in container file!: {}", err);
                    }
                    self.cursor
                }
            },
        };

        match u32::try_from(position) {
            Ok(position) => position,
            Err(_) => {
                if self.write_failures.record() {
                    error!("Container file has grown past 4 GiB (offset {})", position);
                }
                u32::max_value()
            }
        }
    }

    /// Write one lump, padded to a multiple of four, and note it in the directory.
    ///
    /// The entry records the offset *before* the payload and the unpadded length.
    pub fn write_lump(&mut self, name: &str, data: &[u8]) {
        if name.len() > MAX_LUMP_NAME {
            panic!("INTERNAL ERROR: lump name {:?} is longer than {} bytes", name, MAX_LUMP_NAME);
        }

        let start = self.tell();
        let length = match u32::try_from(data.len()) {
            Ok(length) => length,
            Err(_) => {
                if self.write_failures.record() {
                    error!("Lump {} is too large for the container ({} bytes)", name, data.len());
                }
                u32::max_value()
            }
        };
        self.directory.push(DirectoryEntry::new(name, start, length));
        debug!("writing lump {} at offset {} ({} bytes)", name, start, data.len());

        if data.is_empty() {
            return;
        }
        self.raw_write(data);

        let padding = aligned(data.len()) - data.len();
        debug_assert!(padding <= 3);
        if padding > 0 {
            static ZEROS: [u8; 4] = [0; 4];
            self.raw_write(&ZEROS[..padding]);
        }
    }

    /// Write the directory after the last lump, then patch the real header in at offset 0.
    ///
    /// Nothing else touches the stream between building the final header and writing it.
    pub fn finalize(&mut self) -> ContainerHeader {
        let directory_start = self.tell();
        let entries: Vec<[u8; 16]> = self.directory.iter().map(DirectoryEntry::to_bytes).collect();
        for entry in entries.iter() {
            self.raw_write(entry);
        }

        let header = ContainerHeader::finished(directory_start, self.directory.len() as u32);
        self.raw_seek(0);
        self.raw_write(&header.to_bytes());
        header
    }

    /// Flush and give up the stream; the file closes when the last handle drops.
    pub fn close(mut self) -> (Vec<DirectoryEntry>, FailureLog, FailureLog) {
        if let Err(err) = self.stream.flush() {
            if self.write_failures.record() {
                error!("Failure flushing container file: {}", err);
            }
        }
        (self.directory, self.write_failures, self.seek_failures)
    }

    pub fn directory(&self) -> &[DirectoryEntry] {
        &self.directory
    }

    pub fn write_failures(&self) -> &FailureLog {
        &self.write_failures
    }

    pub fn seek_failures(&self) -> &FailureLog {
        &self.seek_failures
    }
}
