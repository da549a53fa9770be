//! Input path checks before any extraction starts.

use anyhow::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, PartialEq)]
pub enum FileSelection {
    Proceed(Vec<PathBuf>),
    Abort,
}

/// Keep the paths that name existing regular files. For each one that does
/// not, `confirm_skip` decides whether to drop it and continue or abort the
/// whole run.
pub fn select_existing<F>(paths: &[PathBuf], mut confirm_skip: F) -> Result<FileSelection>
where
    F: FnMut(&Path) -> Result<bool>,
{
    let mut selected = Vec::with_capacity(paths.len());
    for path in paths {
        if path.is_file() {
            selected.push(path.clone());
            continue;
        }
        if !confirm_skip(path)? {
            return Ok(FileSelection::Abort);
        }
        tracing::info!(path = %path.display(), "skipping missing input");
    }
    Ok(FileSelection::Proceed(selected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        fs::write(&a, b"%PDF").unwrap();
        fs::write(&b, b"%PDF").unwrap();
        (dir, a, b)
    }

    #[test]
    fn test_all_present_never_asks() {
        let (_dir, a, b) = fixture();
        let sel = select_existing(&[a.clone(), b.clone()], |_| panic!("asked")).unwrap();
        assert_eq!(sel, FileSelection::Proceed(vec![a, b]));
    }

    #[test]
    fn test_missing_file_skipped_when_confirmed() {
        let (dir, a, b) = fixture();
        let missing = dir.path().join("missing.pdf");
        let mut asked = Vec::new();
        let sel = select_existing(&[a.clone(), missing.clone(), b.clone()], |p| {
            asked.push(p.to_path_buf());
            Ok(true)
        })
        .unwrap();
        assert_eq!(sel, FileSelection::Proceed(vec![a, b]));
        assert_eq!(asked, vec![missing]);
    }

    #[test]
    fn test_declining_aborts() {
        let (dir, a, _b) = fixture();
        let sel = select_existing(&[a, dir.path().join("missing.pdf")], |_| Ok(false)).unwrap();
        assert_eq!(sel, FileSelection::Abort);
    }

    #[test]
    fn test_directory_is_not_a_statement() {
        let (dir, a, _b) = fixture();
        let sel = select_existing(&[dir.path().to_path_buf(), a.clone()], |_| Ok(true)).unwrap();
        assert_eq!(sel, FileSelection::Proceed(vec![a]));
    }

    #[test]
    fn test_prompt_error_propagates() {
        let (dir, _a, _b) = fixture();
        let res = select_existing(&[dir.path().join("missing.pdf")], |_| {
            Err(anyhow::anyhow!("no tty"))
        });
        assert!(res.is_err());
    }
}
