use std::fmt;

/// Why a claimed URL ended in [`PageState::Rejected`](super::PageState::Rejected)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// URL (or its redirect target) lies outside the allowed origin
    OriginViolation,

    /// Connection failure or timeout persisted through every retry
    Transport,

    /// Final response status was not 200
    HttpStatus(u16),

    /// Response was not `text/html` or `application/xhtml+xml`
    ContentType(String),

    /// Redirect landed on a URL that another worker already claimed
    DuplicateTarget,

    /// Page content could not be written to disk
    WriteFailed,
}

impl RejectReason {
    /// Stable label used for statistics grouping
    pub fn label(&self) -> &'static str {
        match self {
            Self::OriginViolation => "origin_violation",
            Self::Transport => "transport",
            Self::HttpStatus(_) => "http_status",
            Self::ContentType(_) => "content_type",
            Self::DuplicateTarget => "duplicate_target",
            Self::WriteFailed => "write_failed",
        }
    }

    /// Returns true for failures that were retried before giving up
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport => true,
            Self::HttpStatus(code) => (500..600).contains(code),
            _ => false,
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(code) => write!(f, "HTTP {}", code),
            Self::ContentType(content_type) => write!(f, "content type '{}'", content_type),
            other => write!(f, "{}", other.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(RejectReason::Transport.is_transient());
        assert!(RejectReason::HttpStatus(503).is_transient());
        assert!(!RejectReason::HttpStatus(404).is_transient());
        assert!(!RejectReason::ContentType("application/json".into()).is_transient());
        assert!(!RejectReason::OriginViolation.is_transient());
    }

    #[test]
    fn test_display() {
        assert_eq!(RejectReason::HttpStatus(404).to_string(), "HTTP 404");
        assert_eq!(RejectReason::WriteFailed.to_string(), "write_failed");
        assert_eq!(
            RejectReason::ContentType("image/png".into()).to_string(),
            "content type 'image/png'"
        );
    }
}
