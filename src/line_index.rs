//! Byte offset to line number mapping.
//!
//! Built once per source file and shared by the parser adapter (statement
//! spans) and the suppression resolver.

/// Sorted byte offsets at which each line of a source file begins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    /// 1-based line containing `offset`. Offsets past the end map to the last line.
    ///
    /// An empty index (never built from source) answers 1 for every offset.
    pub fn line_of(&self, offset: usize) -> usize {
        if self.line_starts.is_empty() {
            return 1;
        }
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx.max(1),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
