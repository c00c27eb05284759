use log::debug;
use std::{io::Write, path::Path};
use tempfile::NamedTempFile;

use crate::error::{BuildError, BuildResult};

/// Writes `code` to `path` atomically: either the whole bundle lands or nothing does.
pub fn write_bundle(path: &Path, code: &str) -> BuildResult<()> {
    let write_err = |source| BuildError::Write { path: path.to_path_buf(), source };

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(code.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!("Wrote {} bytes to {}", code.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_write_bundle_creates_and_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("bundle.js");

        write_bundle(&out, "first").unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "first");

        write_bundle(&out, "second").unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "second");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_bundle_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("no/such/dir/bundle.js");
        let err = write_bundle(&out, "code").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(!out.exists());
    }
}
