//! Error taxonomy for sheet construction and presentation.
//!
//! Every variant is recoverable. Callers that drive transitions turn these
//! into "no-op, complete with `false`" instead of propagating them further.

/// Errors from sheet construction and binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// Presentation was requested without any content to host.
    MissingContent,
    /// The configured target-height sequence was empty.
    EmptyTargetHeights,
    /// A target index was outside `[0, len)`.
    ///
    /// Only produced by checked lookups; presentation clamps instead.
    InvalidTargetIndex { index: usize, len: usize },
}

impl std::fmt::Display for SheetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingContent => write!(f, "no content bound to the sheet"),
            Self::EmptyTargetHeights => write!(f, "target height sequence is empty"),
            Self::InvalidTargetIndex { index, len } => {
                write!(f, "target index {index} out of range for {len} heights")
            }
        }
    }
}

impl std::error::Error for SheetError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            SheetError::MissingContent.to_string(),
            "no content bound to the sheet"
        );
        assert_eq!(
            SheetError::InvalidTargetIndex { index: 4, len: 2 }.to_string(),
            "target index 4 out of range for 2 heights"
        );
    }
}
