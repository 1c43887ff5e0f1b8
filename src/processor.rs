use crate::chunker;
use crate::config::PipelineConfig;
use crate::error::TimelineError;
use crate::keywords::{KeywordExtractor, KeywordSet};
use crate::query::{QueryGenerator, SearchQuery};
use crate::splitter;
use crate::subtitle::{SubtitleEntry, TimeRange, Timestamp};

use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;

/// One split of an entry: its time range and its share of the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub parent_entry_index: usize,
    pub split_index: usize,
    pub range: TimeRange,
    pub text: String,
}

/// The unit handed to image search: when to show it, and what to look for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineRecord {
    #[serde(flatten)]
    pub range: TimeRange,
    #[serde(rename = "entry")]
    pub entry_index: usize,
    #[serde(rename = "split")]
    pub split_index: usize,
    pub text: String,
    pub keywords: KeywordSet,
    pub queries: SearchQuery,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timeline(Vec<TimelineRecord>);

impl Timeline {
    pub fn records(&self) -> &[TimelineRecord] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimelineRecord> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_records(self) -> Vec<TimelineRecord> {
        self.0
    }

    pub fn stats(&self) -> TimelineStats {
        TimelineStats::from_timeline(self)
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a TimelineRecord;
    type IntoIter = std::slice::Iter<'a, TimelineRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Result of a lenient run: what could be built, and what was rejected.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub timeline: Timeline,
    pub rejected: Vec<TimelineError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TimelineStats {
    pub entries: usize,
    pub records: usize,
    pub total_duration: Duration,
    pub total_keywords: usize,
}

impl TimelineStats {
    pub fn from_timeline(timeline: &Timeline) -> Self {
        let mut entries = 0;
        let mut total_duration = Duration::ZERO;
        let mut total_keywords = 0;
        for record in timeline {
            // Every entry contributes exactly one first split.
            if record.split_index == 0 {
                entries += 1;
            }
            total_duration += record.range.duration();
            total_keywords += record.keywords.len();
        }
        TimelineStats {
            entries,
            records: timeline.len(),
            total_duration,
            total_keywords,
        }
    }

    pub fn splits_per_entry(&self) -> f64 {
        ratio(self.records, self.entries)
    }

    pub fn keywords_per_record(&self) -> f64 {
        ratio(self.total_keywords, self.records)
    }

    pub fn average_duration(&self) -> Duration {
        if self.records == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.records as u32
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Turns validated subtitle entries into a timeline.
pub struct Assembler<'a> {
    config: &'a PipelineConfig,
    keywords: KeywordExtractor<'a>,
    queries: QueryGenerator,
}

impl<'a> Assembler<'a> {
    pub fn new(config: &'a PipelineConfig) -> Result<Self, TimelineError> {
        config.validate()?;
        Ok(Self {
            config,
            keywords: KeywordExtractor::new(&config.stop_words),
            queries: QueryGenerator::new(config.fallback_order, config.max_queries),
        })
    }

    /// Builds the timeline, stopping at the first entry that is invalid or
    /// starts before its predecessor ends.
    pub fn assemble(&self, entries: &[SubtitleEntry]) -> Result<Timeline, TimelineError> {
        let mut records = Vec::new();
        let mut previous_end = None;
        for entry in entries {
            check_order(entry, previous_end)?;
            records.extend(self.assemble_entry(entry)?);
            previous_end = Some(entry.end);
        }
        Ok(Timeline(records))
    }

    /// Builds the timeline from every acceptable entry. Rejected entries
    /// are reported and leave no trace in the timeline; ordering is checked
    /// against the last accepted entry.
    pub fn assemble_lenient(&self, entries: &[SubtitleEntry]) -> Assembly {
        let mut assembly = Assembly::default();
        let mut previous_end = None;
        for entry in entries {
            let result = check_order(entry, previous_end).and_then(|_| self.assemble_entry(entry));
            match result {
                Ok(records) => {
                    assembly.timeline.0.extend(records);
                    previous_end = Some(entry.end);
                }
                Err(err) => {
                    warn!("Skipping subtitle entry: {}", err);
                    assembly.rejected.push(err);
                }
            }
        }
        assembly
    }

    /// Records for a single entry, independent of any other entry.
    pub fn assemble_entry(&self, entry: &SubtitleEntry) -> Result<Vec<TimelineRecord>, TimelineError> {
        let chunks = self.chunk_entry(entry)?;
        debug!(
            "Entry {} ({} --> {}): {} split(s)",
            entry.index,
            entry.start,
            entry.end,
            chunks.len()
        );

        Ok(chunks
            .into_iter()
            .map(|chunk| {
                let keywords = self.keywords.extract(&chunk.text, self.config.max_keywords);
                let queries = self.queries.generate(&keywords);
                debug!(
                    "  split {}: '{}' -> {:?}",
                    chunk.split_index,
                    chunk.text,
                    keywords.as_slice()
                );
                TimelineRecord {
                    range: chunk.range,
                    entry_index: chunk.parent_entry_index,
                    split_index: chunk.split_index,
                    text: chunk.text,
                    keywords,
                    queries,
                }
            })
            .collect())
    }

    /// Pairs an entry's time splits with its text chunks.
    ///
    /// Every time split gets a chunk. When the text has fewer words than
    /// there are splits, consecutive splits share a chunk.
    pub fn chunk_entry(&self, entry: &SubtitleEntry) -> Result<Vec<TextChunk>, TimelineError> {
        let text = chunker::clean_markup(&entry.text);
        if text.trim().is_empty() {
            return Err(TimelineError::InvalidEntry {
                index: entry.index,
                reason: "text is empty".to_string(),
            });
        }

        let ranges = splitter::split(entry, self.config.unit_seconds)?;
        let chunks = chunker::chunk(&text, ranges.len());
        let split_count = ranges.len();

        Ok(ranges
            .into_iter()
            .enumerate()
            .map(|(split_index, range)| TextChunk {
                parent_entry_index: entry.index,
                split_index,
                range,
                text: chunks[split_index * chunks.len() / split_count].clone(),
            })
            .collect())
    }
}

fn check_order(entry: &SubtitleEntry, previous_end: Option<Timestamp>) -> Result<(), TimelineError> {
    match previous_end {
        Some(previous_end) if entry.start < previous_end => Err(TimelineError::OutOfOrderInput {
            index: entry.index,
            start: entry.start,
            previous_end,
        }),
        _ => Ok(()),
    }
}
