use thiserror::Error;

/// Result alias for errors emitted by cxx-clippy internals.
pub type ClippyResult<T> = Result<T, ClippyError>;

/// Structured error type for loading inputs. Analysis itself never fails.
#[derive(Debug, Error)]
pub enum ClippyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed AST document: {0}")]
    AstDocument(#[source] serde_json::Error),

    #[error("unrecognized language standard: {0}")]
    InvalidStandard(String),

    #[error("{0}")]
    Other(String),
}

impl ClippyError {
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Convenience macro mirroring `anyhow::bail!` but returning ClippyError.
#[macro_export]
macro_rules! clippy_bail {
    ($($arg:tt)*) => {
        return Err($crate::error::ClippyError::other(format!($($arg)*)));
    };
}

/// Convenience macro mirroring `anyhow::ensure!`.
#[macro_export]
macro_rules! clippy_ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::clippy_bail!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_at_cli_edge() -> anyhow::Result<()> {
        Err(ClippyError::InvalidStandard("c++99x".to_string()))?;
        Ok(())
    }

    #[test]
    fn errors_cross_into_anyhow_with_question_mark() {
        let err = load_at_cli_edge().expect_err("should fail");
        assert_eq!(err.to_string(), "unrecognized language standard: c++99x");
        assert!(err.downcast_ref::<ClippyError>().is_some());
    }

    #[test]
    fn ensure_reports_the_formatted_message() {
        fn check(ok: bool) -> ClippyResult<()> {
            crate::clippy_ensure!(ok, "expected {}", "TranslationUnitDecl");
            Ok(())
        }
        assert!(check(true).is_ok());
        let err = check(false).expect_err("should fail");
        assert!(matches!(&err, ClippyError::Other(msg) if msg == "expected TranslationUnitDecl"));
    }
}
