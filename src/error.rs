use crate::subtitle::Timestamp;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    #[error("{0}")]
    Parse(String),

    /// An entry whose end does not come after its start, or whose text is empty.
    #[error("Invalid subtitle entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    /// An entry starting before the previous entry has ended.
    #[error("Subtitle entry {index} starts at {start}, before the previous entry ends at {previous_end}")]
    OutOfOrderInput {
        index: usize,
        start: Timestamp,
        previous_end: Timestamp,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TimelineError {
    /// The index of the entry this error refers to, if any.
    pub fn entry_index(&self) -> Option<usize> {
        match self {
            TimelineError::InvalidEntry { index, .. }
            | TimelineError::OutOfOrderInput { index, .. } => Some(*index),
            TimelineError::Parse(_) | TimelineError::InvalidConfig(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_entry() {
        let err = TimelineError::OutOfOrderInput {
            index: 4,
            start: Timestamp::from_millis(1_500),
            previous_end: Timestamp::from_millis(2_000),
        };
        assert_eq!(
            err.to_string(),
            "Subtitle entry 4 starts at 00:00:01,500, before the previous entry ends at 00:00:02,000"
        );
        assert_eq!(err.entry_index(), Some(4));
        assert_eq!(TimelineError::Parse("bad".into()).entry_index(), None);
    }
}
