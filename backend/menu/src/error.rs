use reqwest::StatusCode;
use thiserror::Error;

use crate::drag::ReorderError;

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Wrong credentials: {0}")]
    Unauthorized(String),

    #[error("Request rejected with {status}: {message}")]
    Rejected { status: StatusCode, message: String },

    #[error(transparent)]
    Reorder(#[from] ReorderError),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
