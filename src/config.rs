use crate::error::TimelineError;
use crate::keywords::StopWords;
use crate::query::FallbackOrder;

pub const DEFAULT_UNIT_SECONDS: f64 = 3.0;
pub const DEFAULT_MAX_KEYWORDS: usize = 2;

/// Everything the pipeline reads. Passed explicitly to each stage; nothing
/// here is global.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Target length of one split, in seconds.
    pub unit_seconds: f64,
    /// Keyword cap per chunk, normally the number of images per split.
    pub max_keywords: usize,
    pub stop_words: StopWords,
    pub fallback_order: FallbackOrder,
    /// Cap on search candidates per chunk. `None` keeps them all.
    pub max_queries: Option<usize>,
}

impl PipelineConfig {
    pub fn new(unit_seconds: f64, max_keywords: usize) -> Self {
        PipelineConfig {
            unit_seconds,
            max_keywords,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), TimelineError> {
        if !self.unit_seconds.is_finite() || self.unit_seconds <= 0.0 {
            return Err(TimelineError::InvalidConfig(format!(
                "unit seconds must be a positive number, got {}",
                self.unit_seconds
            )));
        }
        if self.max_keywords == 0 {
            return Err(TimelineError::InvalidConfig(
                "at least one keyword per split is required".to_string(),
            ));
        }
        if self.max_queries == Some(0) {
            return Err(TimelineError::InvalidConfig(
                "at least one query per split is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            unit_seconds: DEFAULT_UNIT_SECONDS,
            max_keywords: DEFAULT_MAX_KEYWORDS,
            stop_words: StopWords::english(),
            fallback_order: FallbackOrder::default(),
            max_queries: None,
        }
    }
}
