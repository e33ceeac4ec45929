use crate::parser::{char_len, truncate_chars};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

/// Why a batch was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SealReason {
    /// The next line would have pushed the batch over the length limit.
    SizeLimit,
    /// The collection window ended.
    WindowElapsed,
    /// The pipeline was draining for shutdown.
    Shutdown,
}

/// Newline-joined formatted lines sent as a single webhook message.
#[derive(Debug, Clone)]
pub struct Batch {
    id: String,
    content: String,
    line_count: usize,
    char_len: usize,
    seal_reason: SealReason,
    created_at: Instant,
}

impl Batch {
    pub fn new(content: String, line_count: usize, seal_reason: SealReason) -> Self {
        let char_len = char_len(&content);
        Self {
            id: Uuid::new_v4().to_string(),
            content,
            line_count,
            char_len,
            seal_reason,
            created_at: Instant::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn char_len(&self) -> usize {
        self.char_len
    }

    pub fn seal_reason(&self) -> SealReason {
        self.seal_reason
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn is_empty(&self) -> bool {
        self.line_count == 0
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.lines()
    }
}

/// Packs formatted lines into batches no longer than `max_length` characters.
///
/// A line is never split across batches; when appending it (plus the joining
/// newline) would overflow, the open batch is sealed first.
#[derive(Debug)]
pub struct BatchPacker {
    max_length: usize,
    current: String,
    current_chars: usize,
    current_lines: usize,
    sealed: Vec<Batch>,
}

impl BatchPacker {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            current: String::new(),
            current_chars: 0,
            current_lines: 0,
            sealed: Vec::new(),
        }
    }

    pub fn push(&mut self, mut line: String) {
        truncate_chars(&mut line, self.max_length);
        let line_chars = char_len(&line);
        if line_chars == 0 {
            return;
        }

        if self.current_lines > 0 && self.current_chars + 1 + line_chars > self.max_length {
            self.seal(SealReason::SizeLimit);
        }

        if self.current_lines > 0 {
            self.current.push('\n');
            self.current_chars += 1;
        }

        self.current.push_str(&line);
        self.current_chars += line_chars;
        self.current_lines += 1;
    }

    fn seal(&mut self, reason: SealReason) {
        if self.current_lines == 0 {
            return;
        }

        let content = std::mem::take(&mut self.current);
        self.sealed
            .push(Batch::new(content, self.current_lines, reason));
        self.current_chars = 0;
        self.current_lines = 0;
    }

    /// Seals the open batch (if any) and returns every sealed batch in order.
    pub fn drain(&mut self, reason: SealReason) -> Vec<Batch> {
        self.seal(reason);
        std::mem::take(&mut self.sealed)
    }

    pub fn is_empty(&self) -> bool {
        self.current_lines == 0 && self.sealed.is_empty()
    }

    pub fn sealed_count(&self) -> usize {
        self.sealed.len()
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}
