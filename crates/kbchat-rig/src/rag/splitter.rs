//! Text splitting for document chunks.

use std::sync::Arc;

use text_splitter::{Characters, ChunkConfig, TextSplitter as TextSplitterImpl};
use tracing::{debug, instrument};

use super::chunk::ChunkMetadata;
use crate::{Error, Result};

/// A borrowed chunk of a document's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Chunk text.
    pub text: &'a str,
    /// Position of the chunk in its document.
    pub metadata: ChunkMetadata,
}

/// Text splitter for creating document chunks.
#[derive(Clone)]
pub struct TextSplitter {
    max_characters: u32,
    overlap: u32,
    trim: bool,
    inner: Arc<TextSplitterImpl<Characters>>,
}

impl TextSplitter {
    /// Creates a new text splitter.
    ///
    /// Fails when `overlap` is not smaller than `max_characters`.
    pub fn new(max_characters: u32, overlap: u32, trim: bool) -> Result<Self> {
        let chunk_config = ChunkConfig::new(max_characters as usize)
            .with_overlap(overlap as usize)
            .map_err(Error::config)?
            .with_trim(trim);

        debug!(max_characters, overlap, trim, "created text splitter");

        Ok(Self {
            max_characters,
            overlap,
            trim,
            inner: Arc::new(TextSplitterImpl::new(chunk_config)),
        })
    }

    /// Returns the maximum characters per chunk.
    pub fn max_characters(&self) -> u32 {
        self.max_characters
    }

    /// Returns the overlap between chunks.
    pub fn overlap(&self) -> u32 {
        self.overlap
    }

    /// Splits text into chunks with byte offset tracking.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn split<'a>(&self, text: &'a str) -> Vec<Chunk<'a>> {
        let chunks: Vec<_> = self
            .inner
            .chunk_indices(text)
            .enumerate()
            .map(|(index, (byte_offset, chunk_text))| Chunk {
                text: chunk_text,
                metadata: ChunkMetadata::new(index, byte_offset, byte_offset + chunk_text.len()),
            })
            .collect();

        debug!(chunk_count = chunks.len(), "split text into chunks");
        chunks
    }
}

impl std::fmt::Debug for TextSplitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextSplitter")
            .field("max_characters", &self.max_characters)
            .field("overlap", &self.overlap)
            .field("trim", &self.trim)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_respects_max_characters() {
        let splitter = TextSplitter::new(50, 0, true).expect("valid splitter");
        let text = "Hello world. This is a test. Another sentence here.";
        let chunks = splitter.split(text);

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 50);
        }
    }

    #[test]
    fn split_with_overlap() {
        let splitter = TextSplitter::new(20, 5, true).expect("valid splitter");
        let chunks = splitter.split("The quick brown fox jumps over the lazy dog.");

        assert!(chunks.len() > 1);
        assert!(chunks.windows(2).all(|w| w[0].metadata.index < w[1].metadata.index));
    }

    #[test]
    fn metadata_offsets() {
        let splitter = TextSplitter::new(500, 0, false).expect("valid splitter");
        let text = "Hello world";
        let chunks = splitter.split(text);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.start_offset, 0);
        assert_eq!(chunks[0].metadata.end_offset, text.len());
        assert_eq!(&text[chunks[0].metadata.start_offset..chunks[0].metadata.end_offset], text);
    }

    #[test]
    fn clones_share_configuration() {
        let splitter = TextSplitter::new(20, 5, true).expect("valid splitter");
        let copy = splitter.clone();
        let text = "The quick brown fox jumps over the lazy dog.";

        assert_eq!(copy.max_characters(), 20);
        assert_eq!(copy.overlap(), 5);
        assert_eq!(copy.split(text), splitter.split(text));
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk() {
        assert!(matches!(TextSplitter::new(10, 10, true), Err(Error::Config(_))));
    }
}
