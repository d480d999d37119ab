use thiserror::Error;

/// Errors that reach the caller of the daily message pipeline.
///
/// Everything else (single passage failures, explanation failures) is
/// recovered where it happens and only logged.
#[derive(Debug, Error)]
pub enum VerseError {
    #[error("could not retrieve the verse of the day for version {translation}")]
    CitationUnavailable {
        translation: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{0} is not configured")]
    MissingConfig(&'static str),

    #[error("failed to deliver message: {0}")]
    Delivery(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, VerseError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_citation_error_names_translation() {
        let err = VerseError::CitationUnavailable {
            translation: "RUSV".to_string(),
            source: anyhow!("status 503"),
        };
        assert_eq!(
            err.to_string(),
            "could not retrieve the verse of the day for version RUSV"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_missing_config_message() {
        assert_eq!(
            VerseError::MissingConfig("TG_TOKEN").to_string(),
            "TG_TOKEN is not configured"
        );
    }
}
