//! Errors that end a capture run.
//!
//! Each domain module owns its error enum; `SessionError` gathers them so
//! the capture loop can use `?` throughout. Cleanup problems after a
//! successful run are not errors; they travel as warnings on the
//! completion event instead.

use crate::capture::CaptureError;
use crate::document::DocumentError;
use crate::input::InputError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid capture request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Failed to write temporary page image: {0}")]
    TempFile(#[from] std::io::Error),
}
