use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Created,
    Updated,
    Unchanged,
    /// Left as found; the file belongs to the user once it exists
    Skipped,
}

/// Write `lines` to `path`, one per line, creating parent directories.
///
/// An existing file with identical content is left alone so build systems
/// watching generated files do not rebuild for nothing.
pub fn write_lines(path: &Path, lines: &[String]) -> io::Result<WriteStatus> {
    let mut content = lines.join("\n");
    content.push('\n');

    let status = match fs::read_to_string(path) {
        Ok(existing) if existing == content => return Ok(WriteStatus::Unchanged),
        Ok(_) => WriteStatus::Updated,
        Err(e) if e.kind() == io::ErrorKind::NotFound => WriteStatus::Created,
        Err(e) => return Err(e),
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_lines_status() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested/out/Makefile");
        let lines = vec!["all:".to_string(), "\t@true".to_string()];

        assert_eq!(write_lines(&path, &lines)?, WriteStatus::Created);
        assert_eq!(fs::read_to_string(&path)?, "all:\n\t@true\n");

        assert_eq!(write_lines(&path, &lines)?, WriteStatus::Unchanged);

        let changed = vec!["all:".to_string()];
        assert_eq!(write_lines(&path, &changed)?, WriteStatus::Updated);
        assert_eq!(fs::read_to_string(&path)?, "all:\n");
        Ok(())
    }
}
