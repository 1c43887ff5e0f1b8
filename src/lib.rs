//! Turns subtitle cues into a timeline of short, keyword-tagged splits.
//!
//! Each cue is cut into roughly `unit_seconds` long splits; its text is
//! divided over them along natural boundaries, and every split gets a
//! ranked keyword set plus the search queries built from it. The result is
//! meant to drive an image search and assembly step elsewhere.

pub mod chunker;
pub mod config;
pub mod error;
pub mod keywords;
pub mod parser;
pub mod processor;
pub mod query;
pub mod serialiser;
pub mod splitter;
pub mod subtitle;

pub use config::PipelineConfig;
pub use error::TimelineError;
pub use keywords::{KeywordExtractor, KeywordSet, StopWords};
pub use processor::{Assembler, Assembly, TextChunk, Timeline, TimelineRecord, TimelineStats};
pub use query::{FallbackOrder, QueryGenerator, SearchQuery};
pub use subtitle::{SubtitleEntry, TimeRange, Timestamp};

/// Runs the whole pipeline with the given configuration.
pub fn assemble(entries: &[SubtitleEntry], config: &PipelineConfig) -> Result<Timeline, TimelineError> {
    Assembler::new(config)?.assemble(entries)
}
