use thiserror::Error;

/// Fatal error taxonomy. Frame skips are not errors; they are coalesced
/// by the scheduler and only show up in the interval statistics.
#[derive(Debug, Error)]
pub enum StimulusError {
    /// Bad CLI argument or configuration invariant violation.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Surface or buffer allocation/present failure.
    #[error("display resource failure: {0}")]
    Resource(String),
}

impl StimulusError {
    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            StimulusError::Config(_) => 1,
            StimulusError::Resource(_) => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_failure_class() {
        assert_eq!(StimulusError::Config("x".into()).exit_code(), 1);
        assert_eq!(StimulusError::Resource("x".into()).exit_code(), 2);
    }
}
