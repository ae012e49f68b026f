use std::path::{Path, PathBuf};

use crate::error::BufferError;

/// In-memory, line-oriented byte buffer.
///
/// The buffer owns the file's raw bytes verbatim (every newline included)
/// together with a parallel index of per-line byte lengths, each length
/// counting the terminating newline. Lines handed back to callers are the
/// spans without their newline. The two structures are mutated together on
/// every operation, so `line_lengths` always sums to `bytes.len()` and the
/// buffer always holds at least one line whose span ends in a newline.
pub struct LineBuffer {
    bytes: Vec<u8>,
    line_lengths: Vec<usize>,
    path: Option<PathBuf>,
    modified: bool,
}

impl LineBuffer {
    /// Creates an empty buffer: a single blank line, no file bound.
    pub fn new() -> Self {
        Self {
            bytes: vec![b'\n'],
            line_lengths: vec![1],
            path: None,
            modified: false,
        }
    }

    /// Loads `path`, or starts empty with `path` bound as the future save
    /// target if no such file exists yet.
    ///
    /// The file is read as raw bytes; line boundaries are exactly the
    /// `\n` bytes, with no CRLF or encoding treatment. A non-empty file
    /// that does not end in a newline gets one synthesized so the trailing
    /// run of bytes stays a real line instead of being dropped by the scan.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, BufferError> {
        let path = path.into();
        if !path.exists() {
            log::info!("{} does not exist, starting empty", path.display());
            return Ok(Self {
                path: Some(path),
                ..Self::new()
            });
        }

        let mut bytes = std::fs::read(&path)?;
        if bytes.last() != Some(&b'\n') {
            if !bytes.is_empty() {
                log::debug!(
                    "{} has no trailing newline, normalizing",
                    path.display()
                );
            }
            bytes.push(b'\n');
        }
        let line_lengths = scan_line_lengths(&bytes);
        log::info!(
            "loaded {} bytes ({} lines) from {}",
            bytes.len(),
            line_lengths.len(),
            path.display()
        );

        Ok(Self {
            bytes,
            line_lengths,
            path: Some(path),
            modified: false,
        })
    }

    pub fn line_count(&self) -> usize {
        self.line_lengths.len()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The whole byte store, exactly as it would be written by `save`.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Returns line `index` without its terminating newline.
    ///
    /// The start offset is recomputed by summing the lengths of the lines
    /// before it, so this is O(index) per call. Acceptable at the file
    /// sizes this editor targets.
    pub fn line(&self, index: usize) -> Result<&[u8], BufferError> {
        let len = *self
            .line_lengths
            .get(index)
            .ok_or_else(|| self.out_of_bounds(index))?;
        let start = self.line_start(index);
        Ok(&self.bytes[start..start + len - 1])
    }

    /// Replaces the content of line `index`.
    ///
    /// `content` is the line without a newline; passing bytes containing
    /// `\n` is a contract violation and fails before anything is mutated.
    /// Writing past the end of the buffer first extends it with blank
    /// lines until `index` exists.
    pub fn set_line(&mut self, index: usize, content: &[u8]) -> Result<(), BufferError> {
        if content.contains(&b'\n') {
            return Err(BufferError::EmbeddedNewline);
        }

        while index >= self.line_lengths.len() {
            let end = self.bytes.len();
            self.splice(end, end, b"\n");
            self.line_lengths.push(1);
        }

        let start = self.line_start(index);
        let old_len = self.line_lengths[index];
        // The old span ends with its newline; only the content part in
        // front of it is replaced.
        self.splice(start, start + old_len - 1, content);
        self.line_lengths[index] = content.len() + 1;
        self.modified = true;
        Ok(())
    }

    /// Inserts a blank line immediately after line `index`. Lines below
    /// shift down by one index; their bytes are untouched.
    pub fn insert_line_after(&mut self, index: usize) -> Result<(), BufferError> {
        if index >= self.line_lengths.len() {
            return Err(self.out_of_bounds(index));
        }
        let offset = self.line_start(index) + self.line_lengths[index];
        self.splice(offset, offset, b"\n");
        self.line_lengths.insert(index + 1, 1);
        self.modified = true;
        Ok(())
    }

    /// Deletes line `index`, content and newline both.
    ///
    /// Removing the sole remaining line resets the buffer to its empty
    /// state (one blank line) rather than dropping below one line.
    pub fn remove_line(&mut self, index: usize) -> Result<(), BufferError> {
        if index >= self.line_lengths.len() {
            return Err(self.out_of_bounds(index));
        }
        if self.line_lengths.len() == 1 {
            let end = self.bytes.len();
            self.splice(0, end, b"\n");
            self.line_lengths[0] = 1;
            self.modified = true;
            return Ok(());
        }
        let start = self.line_start(index);
        let len = self.line_lengths[index];
        self.splice(start, start + len, b"");
        self.line_lengths.remove(index);
        self.modified = true;
        Ok(())
    }

    /// Writes the byte store verbatim to the bound path.
    pub fn save(&mut self) -> Result<(), BufferError> {
        let path = self.path.as_ref().ok_or(BufferError::PathUnset)?;
        std::fs::write(path, &self.bytes)?;
        log::info!("wrote {} bytes to {}", self.bytes.len(), path.display());
        self.modified = false;
        Ok(())
    }

    /// Writes the byte store to `path` and makes it the bound path.
    pub fn save_to(&mut self, path: impl Into<PathBuf>) -> Result<(), BufferError> {
        let path = path.into();
        std::fs::write(&path, &self.bytes)?;
        log::info!("wrote {} bytes to {}", self.bytes.len(), path.display());
        self.path = Some(path);
        self.modified = false;
        Ok(())
    }

    /// Byte offset where line `index` starts. O(index).
    fn line_start(&self, index: usize) -> usize {
        self.line_lengths[..index].iter().sum()
    }

    /// The one splice primitive every mutator goes through: replaces the
    /// byte range `[start, end)` with `replacement`, shifting everything
    /// after it. `line_lengths` is adjusted by the caller afterwards, so
    /// the index never describes a store the splice left half-shifted.
    fn splice(&mut self, start: usize, end: usize, replacement: &[u8]) {
        self.bytes.splice(start..end, replacement.iter().copied());
    }

    fn out_of_bounds(&self, index: usize) -> BufferError {
        BufferError::OutOfBounds {
            index,
            count: self.line_lengths.len(),
        }
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// One pass over the store: every newline closes a line whose length is
/// the bytes accumulated since the previous newline, plus the newline
/// itself. Assumes the store ends with a newline.
fn scan_line_lengths(bytes: &[u8]) -> Vec<usize> {
    let mut lengths = Vec::new();
    let mut run = 0;
    for &b in bytes {
        run += 1;
        if b == b'\n' {
            lengths.push(run);
            run = 0;
        }
    }
    lengths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_from(content: &[u8]) -> LineBuffer {
        let mut buffer = LineBuffer::new();
        let mut pieces: Vec<&[u8]> = content.split(|&b| b == b'\n').collect();
        if content.ends_with(b"\n") {
            pieces.pop();
        }
        for (i, line) in pieces.iter().enumerate() {
            buffer.set_line(i, line).unwrap();
        }
        buffer
    }

    #[test]
    fn test_new_buffer_is_single_blank_line() {
        let buffer = LineBuffer::new();
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.line(0).unwrap(), b"");
        assert_eq!(buffer.bytes(), b"\n");
        assert!(!buffer.is_modified());
        assert!(buffer.path().is_none());
    }

    #[test]
    fn test_set_line_replaces_content() {
        let mut buffer = buffer_from(b"hello\nworld\n");
        buffer.set_line(0, b"HELLO").unwrap();
        assert_eq!(buffer.line(0).unwrap(), b"HELLO");
        assert_eq!(buffer.line(1).unwrap(), b"world");
        assert_eq!(buffer.bytes(), b"HELLO\nworld\n");
    }

    #[test]
    fn test_set_line_grow_and_shrink() {
        let mut buffer = buffer_from(b"ab\ncd\nef\n");
        let before = buffer.bytes().len();

        buffer.set_line(1, b"longer middle").unwrap();
        assert_eq!(buffer.bytes().len(), before + 11);
        assert_eq!(buffer.line(0).unwrap(), b"ab");
        assert_eq!(buffer.line(2).unwrap(), b"ef");

        buffer.set_line(1, b"").unwrap();
        assert_eq!(buffer.bytes(), b"ab\n\nef\n");
    }

    #[test]
    fn test_set_line_rejects_embedded_newline() {
        let mut buffer = LineBuffer::new();
        let err = buffer.set_line(0, b"two\nlines").unwrap_err();
        assert!(matches!(err, BufferError::EmbeddedNewline));
        // failed fast, nothing mutated
        assert_eq!(buffer.bytes(), b"\n");
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_set_line_extends_with_blank_lines() {
        let mut buffer = LineBuffer::new();
        buffer.set_line(3, b"x").unwrap();
        assert_eq!(buffer.line_count(), 4);
        assert_eq!(buffer.line(1).unwrap(), b"");
        assert_eq!(buffer.line(2).unwrap(), b"");
        assert_eq!(buffer.line(3).unwrap(), b"x");
    }

    #[test]
    fn test_insert_line_after() {
        let mut buffer = buffer_from(b"first\nlast\n");
        buffer.insert_line_after(0).unwrap();
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line(0).unwrap(), b"first");
        assert_eq!(buffer.line(1).unwrap(), b"");
        assert_eq!(buffer.line(2).unwrap(), b"last");
    }

    #[test]
    fn test_insert_line_after_last() {
        let mut buffer = buffer_from(b"only\n");
        buffer.insert_line_after(0).unwrap();
        assert_eq!(buffer.bytes(), b"only\n\n");
    }

    #[test]
    fn test_remove_middle_line() {
        let mut buffer = buffer_from(b"a\nb\nc\n");
        buffer.remove_line(1).unwrap();
        assert_eq!(buffer.line_count(), 2);
        assert_eq!(buffer.bytes(), b"a\nc\n");
    }

    #[test]
    fn test_remove_last_line_truncates() {
        let mut buffer = buffer_from(b"a\nb\n");
        buffer.remove_line(1).unwrap();
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.bytes(), b"a\n");
    }

    #[test]
    fn test_remove_sole_line_clamps_to_empty() {
        let mut buffer = buffer_from(b"content\n");
        buffer.remove_line(0).unwrap();
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.line(0).unwrap(), b"");
        assert_eq!(buffer.bytes(), b"\n");
    }

    #[test]
    fn test_out_of_bounds_reads_and_mutations() {
        let mut buffer = buffer_from(b"a\nb\n");
        assert!(matches!(
            buffer.line(2),
            Err(BufferError::OutOfBounds { index: 2, count: 2 })
        ));
        assert!(matches!(
            buffer.insert_line_after(2),
            Err(BufferError::OutOfBounds { .. })
        ));
        assert!(matches!(
            buffer.remove_line(5),
            Err(BufferError::OutOfBounds { index: 5, .. })
        ));
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut buffer = LineBuffer::new();
        assert!(matches!(buffer.save(), Err(BufferError::PathUnset)));
    }

    #[test]
    fn test_modified_tracking() {
        let mut buffer = buffer_from(b"a\n");
        assert!(buffer.is_modified()); // buffer_from mutates
        let dir = tempfile::tempdir().unwrap();
        buffer.save_to(dir.path().join("out.txt")).unwrap();
        assert!(!buffer.is_modified());
        buffer.set_line(0, b"b").unwrap();
        assert!(buffer.is_modified());
    }

    #[test]
    fn test_scan_line_lengths() {
        assert_eq!(scan_line_lengths(b"\n"), vec![1]);
        assert_eq!(scan_line_lengths(b"hello\nworld\n"), vec![6, 6]);
        assert_eq!(scan_line_lengths(b"\n\n\n"), vec![1, 1, 1]);
    }
}
