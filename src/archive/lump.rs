use std::fmt;


/// The payload of a single lump.  Only ever grows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lump {
    data: Vec<u8>,
}

impl Lump {
    pub fn new() -> Self {
        Lump { data: Vec::new() }
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Append text as DOS-style lines: every `\n` is written as `\r\n`.
    ///
    /// Only the incoming text is converted, one line at a time; whatever the lump already holds
    /// (binary data, NULs, existing CRs) is left alone.
    pub fn append_text(&mut self, text: &str) {
        let mut lines = text.split('\n');
        if let Some(first) = lines.next() {
            self.append(first.as_bytes());
        }
        for line in lines {
            self.append(b"\r\n");
            self.append(line.as_bytes());
        }
    }

    /// Like `append_text`, but for `format_args!` output.  `write!` works too, via `fmt::Write`.
    pub fn append_formatted(&mut self, args: fmt::Arguments) {
        // Writing into a Vec can't fail; an error here could only come from a broken Display impl
        let _ = fmt::Write::write_fmt(self, args);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Write for Lump {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_text(s);
        Ok(())
    }
}

impl AsRef<[u8]> for Lump {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
