//! File-backed session instructions.

use std::path::{Path, PathBuf};

/// Instructions used when the prompt file cannot be read.
pub const DEFAULT_INSTRUCTIONS: &str =
    "You are a helpful assistant that can answer questions and help with tasks.";

/// Loads session instructions from disk on every call.
#[derive(Debug, Clone)]
pub struct PromptLoader {
    path: PathBuf,
}

impl PromptLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current instructions. Never fails: read errors fall back to
    /// `DEFAULT_INSTRUCTIONS`.
    pub async fn get_instructions(&self) -> String {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Could not read prompt file, using default instructions"
                );
                DEFAULT_INSTRUCTIONS.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_file_each_call() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Speak like a pirate.").unwrap();

        let loader = PromptLoader::new(file.path());
        assert_eq!(loader.get_instructions().await, "Speak like a pirate.");

        std::fs::write(file.path(), "Speak like a poet.").unwrap();
        assert_eq!(loader.get_instructions().await, "Speak like a poet.");
    }

    #[tokio::test]
    async fn test_missing_file_falls_back() {
        let loader = PromptLoader::new("/definitely/not/here/prompt.md");
        assert_eq!(loader.get_instructions().await, DEFAULT_INSTRUCTIONS);
    }
}
