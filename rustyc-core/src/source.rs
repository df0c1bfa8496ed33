use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::CoreError;

/// Extension of source files picked up from directories.
pub const SOURCE_EXTENSION: &str = "rs";

/// Expands input paths into source files.
///
/// Files are taken as given, whatever their extension. Directories are
/// walked recursively for `*.rs` files, which are returned sorted so the
/// order does not depend on the file system. A path that cannot be read
/// yields an `Err` entry in its place; the remaining inputs are still
/// collected.
pub fn collect_source_files(paths: &[PathBuf]) -> Vec<Result<PathBuf, CoreError>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            match walk_dir(path) {
                Ok(mut found) => {
                    found.sort();
                    files.extend(found.into_iter().map(Ok));
                }
                Err(err) => files.push(Err(err)),
            }
        } else if path.is_file() {
            files.push(Ok(path.clone()));
        } else {
            files.push(Err(not_found(path)));
        }
    }
    tracing::debug!(inputs = paths.len(), files = files.len(), "collected sources");
    files
}

fn not_found(path: &Path) -> CoreError {
    CoreError::SourceIo {
        path: path.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file or directory",
        ),
    }
}

fn walk_dir(root: &Path) -> Result<Vec<PathBuf>, CoreError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(root).to_path_buf();
            CoreError::SourceIo {
                path,
                source: err.into(),
            }
        })?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
        {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn collect_ok(paths: &[PathBuf]) -> Vec<PathBuf> {
        collect_source_files(paths)
            .into_iter()
            .map(|entry| entry.expect("readable input"))
            .collect()
    }

    #[test]
    fn walks_directories_for_sources() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("nested/deeper")).expect("dirs");
        fs::write(root.join("b.rs"), "").expect("write");
        fs::write(root.join("a.rs"), "").expect("write");
        fs::write(root.join("notes.txt"), "").expect("write");
        fs::write(root.join("nested/deeper/c.rs"), "").expect("write");

        let files = collect_ok(&[root.to_path_buf()]);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).expect("under root").to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.rs"),
                PathBuf::from("b.rs"),
                PathBuf::from("nested/deeper/c.rs"),
            ]
        );
    }

    #[test]
    fn explicit_files_keep_their_order() {
        let dir = tempdir().expect("tempdir");
        let second = dir.path().join("second.txt");
        let first = dir.path().join("first.rs");
        fs::write(&second, "").expect("write");
        fs::write(&first, "").expect("write");

        let files = collect_ok(&[second.clone(), first.clone()]);
        assert_eq!(files, vec![second, first]);
    }

    #[test]
    fn missing_paths_do_not_hide_the_others() {
        let dir = tempdir().expect("tempdir");
        let good = dir.path().join("good.rs");
        fs::write(&good, "").expect("write");
        let missing = dir.path().join("nope.rs");

        let entries = collect_source_files(&[missing.clone(), good.clone()]);
        assert_eq!(entries.len(), 2);
        match &entries[0] {
            Err(CoreError::SourceIo { path, .. }) => assert_eq!(path, &missing),
            other => panic!("expected a source error, got {other:?}"),
        }
        assert_eq!(entries[1].as_ref().expect("good input"), &good);
    }
}
