//! Forward-only read cursor over a fixed memory region.

/// Sequential reader over a fixed byte region.
///
/// Supports fixed-size extraction and line-oriented text extraction, both
/// advancing an internal offset. The cursor is single-reader: it is not
/// meant to be shared across threads — give each consumer its own cursor
/// over the shared bytes.
pub struct CursorReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> CursorReader<'a> {
    /// Maximum window for a single line scan. Lines in blob headers are
    /// short; anything approaching this limit is a usage error.
    const LINE_SCAN_LIMIT: usize = i32::MAX as usize;

    /// Creates a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Current position within the region.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left between the current position and the end of the region.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Returns the next `n` bytes and advances the cursor past them.
    ///
    /// If fewer than `n` bytes remain, returns `None` and leaves the cursor
    /// where it was.
    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if n > self.remaining() {
            return None;
        }
        let view = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Some(view)
    }

    /// Reads text up to (not including) the next `\n` into `out`.
    ///
    /// The cursor advances by the line length only; the terminator, if any,
    /// stays at the cursor (skip it with `take(1)`). The scan window is
    /// clamped to just under 2^31 bytes from the current position; a line
    /// that would span past the clamp is truncated at the window end.
    pub fn read_line(&mut self, out: &mut String) {
        out.clear();
        let window_len = self.remaining().min(Self::LINE_SCAN_LIMIT);
        let window = &self.data[self.offset..self.offset + window_len];
        let line_len = window
            .iter()
            .position(|&b| b == b'\n')
            .unwrap_or(window.len());
        out.push_str(&String::from_utf8_lossy(&window[..line_len]));
        self.offset += line_len;
    }
}
