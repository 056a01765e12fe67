
use thiserror::Error;

// errors owned by this crate. failures coming out of an external trainer are
// not translated, they propagate as Box<dyn Error> from the seam.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Sec2VecError {

    #[error("keyword set is empty, at least one keyword is required")]
    EmptyKeywords,

    #[error("unknown-token fallback '{0}' is missing from the vector lookup")]
    MissingFallback(String),

    #[error("update-mode training was requested without new sentences")]
    UpdateWithoutSentences,
}
