//! Command implementations.

use anyhow::Context;
use camino::Utf8Path;

pub mod bump;
pub mod info;
pub mod reflow;

/// Read a file and validate its size against the configured limit.
pub fn read_input_file(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<String> {
    // Preflight: check file size via metadata before reading into memory.
    let metadata =
        std::fs::metadata(path.as_std_path()).with_context(|| format!("failed to read {path}"))?;
    if let Some(max) = max_bytes {
        let size = metadata.len() as usize;
        if size > max {
            anyhow::bail!("input too large: {path} is {size} bytes (limit: {max} bytes)");
        }
    }

    let content = std::fs::read_to_string(path.as_std_path())
        .with_context(|| format!("failed to read {path}"))?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn write(tmp: &TempDir, content: &str) -> Utf8PathBuf {
        let path = tmp.path().join("doc.md");
        std::fs::write(&path, content).unwrap();
        Utf8PathBuf::try_from(path).unwrap()
    }

    #[test]
    fn reads_file_within_limit() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "hello\n");
        assert_eq!(read_input_file(&path, Some(100)).unwrap(), "hello\n");
        assert_eq!(read_input_file(&path, None).unwrap(), "hello\n");
    }

    #[test]
    fn rejects_file_over_limit() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, &"x".repeat(64));
        let err = read_input_file(&path, Some(10)).unwrap_err();
        assert!(err.to_string().contains("input too large"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_input_file(Utf8Path::new("/definitely/not/here.md"), None).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
