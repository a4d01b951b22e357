use docfile::{DocfileError, DocfileErrorConvertible};
use std::fmt::Formatter;

#[derive(Debug, PartialEq, Clone)]
pub struct ToolError {
    message: String,
}

impl ToolError {
    pub fn new(message: &str) -> Self {
        return ToolError {
            message: String::from(message),
        };
    }

    pub fn get_message(&self) -> String {
        return self.message.clone();
    }
}

impl DocfileErrorConvertible for ToolError {}

impl From<DocfileError<ToolError>> for ToolError {
    fn from(error: DocfileError<ToolError>) -> Self {
        return match error {
            DocfileError::DiskError(e) => e,
            e => ToolError::new(&format!("{}", e)),
        };
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}", self.message);
    }
}
