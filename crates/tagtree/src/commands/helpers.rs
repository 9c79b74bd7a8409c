use crate::error::{Result, TreeError};

/// Reject an empty required field with `message`.
pub fn require<'a>(value: &'a str, message: &str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(TreeError::Validation(message.to_string()));
    }
    Ok(value)
}

pub fn require_path(path: &str) -> Result<&str> {
    require(path, "Path cannot be empty.")
}

/// Display name for a logical path: its last segment.
pub fn leaf_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn require_rejects_empty_only() {
        assert_eq!(require_path("a").unwrap(), "a");
        assert_eq!(require_path(" ").unwrap(), " ");
        let err = require_path("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Path cannot be empty.");
    }

    #[test]
    fn leaf_name_takes_last_segment() {
        assert_eq!(leaf_name("a/b/c"), "c");
        assert_eq!(leaf_name("top"), "top");
    }
}
