use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid recurrence pattern: {}", .0.join("; "))]
    InvalidPattern(Vec<String>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
