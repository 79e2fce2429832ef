//! Domain-specific errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The input directory held no documentation pages. Fatal: there is
    /// nothing to extract.
    #[error("no documentation pages found under {}", root.display())]
    NoPagesFound { root: PathBuf },

    /// A page could not be read. Reported per page; the run continues.
    #[error("failed to read page {}", path.display())]
    PageUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A page could not be decoded as UTF-8 text. Reported per page; the run
    /// continues.
    #[error("page {} is not valid UTF-8 text", path.display())]
    PageNotText { path: PathBuf },
}

impl ExtractError {
    /// Whether the run can continue past this error with the remaining pages.
    pub fn is_page_local(&self) -> bool {
        matches!(
            self,
            ExtractError::PageUnreadable { .. } | ExtractError::PageNotText { .. }
        )
    }
}
