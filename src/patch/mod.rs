//! Patch input: reading patch text and parsing it into addressable lines.

pub mod parser;

use std::path::Path;
use thiserror::Error;

pub use parser::parse;

/// Errors while loading patch text.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("failed to read patch: {0}")]
    Read(#[from] std::io::Error),

    #[error("patch file not found: {0}")]
    NotFound(String),
}

/// Read patch text from a file path.
pub async fn read_patch_file(path: &Path) -> Result<String, PatchError> {
    if !path.exists() {
        return Err(PatchError::NotFound(path.display().to_string()));
    }

    Ok(tokio::fs::read_to_string(path).await?)
}

/// Read patch text from stdin.
pub async fn read_patch_stdin() -> Result<String, PatchError> {
    use tokio::io::AsyncReadExt;
    let mut buf = String::new();
    tokio::io::stdin().read_to_string(&mut buf).await?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_existing_patch_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.patch");
        std::fs::write(&path, "@@ -1 +1 @@\n-a\n+b").unwrap();

        let content = read_patch_file(&path).await.unwrap();
        assert_eq!(parse(&content).len(), 3);
    }

    #[tokio::test]
    async fn read_nonexistent_patch_file() {
        let result = read_patch_file(Path::new("/tmp/diffthread_no_such.patch")).await;
        assert!(result.unwrap_err().to_string().contains("not found"));
    }
}
