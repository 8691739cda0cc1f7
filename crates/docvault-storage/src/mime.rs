//! MIME type guessing from file names.

/// Guess a MIME type from a file name's extension.
pub fn mime_from_name(name: &str) -> Option<&'static str> {
    mime_guess::from_path(name).first_raw()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(mime_from_name("notes.TXT"), Some("text/plain"));
        assert_eq!(mime_from_name("report.pdf"), Some("application/pdf"));
        assert_eq!(mime_from_name("data.json"), Some("application/json"));
    }

    #[test]
    fn test_missing_extension() {
        assert_eq!(mime_from_name("Makefile"), None);
        assert_eq!(mime_from_name("notes."), None);
    }
}
