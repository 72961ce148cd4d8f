use crate::artifacts::index::entry_mode::{EntryMode, FileMode};
use crate::artifacts::objects::blob::Blob;
use crate::errors::{LitError, Result, StorageContext};
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

pub const LIT_DIR: &str = ".lit";

const IGNORED_PATHS: [&str; 1] = [LIT_DIR];

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Map a filesystem path to its `/`-separated name inside the work tree.
    ///
    /// Relative paths are taken relative to the work tree root. Symlinks are
    /// not followed for the final component, so a link is staged as itself.
    pub fn to_repo_path(&self, path: &Path) -> Result<String> {
        let display = path.to_string_lossy().to_string();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.path.join(path)
        };

        let file_name = absolute.file_name().map(PathBuf::from);
        let parent = match (&file_name, absolute.parent()) {
            (Some(_), Some(parent)) => std::fs::canonicalize(parent).at_path(parent)?,
            _ => std::fs::canonicalize(&absolute).at_path(&absolute)?,
        };
        let resolved = match file_name {
            Some(name) => parent.join(name),
            None => parent,
        };

        let relative = resolved
            .strip_prefix(&self.path)
            .map_err(|_| LitError::invalid_path(&display, "outside the repository"))?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => {
                    let segment = segment
                        .to_str()
                        .ok_or_else(|| LitError::invalid_path(&display, "path is not UTF-8"))?;
                    segments.push(segment);
                }
                _ => return Err(LitError::invalid_path(&display, "unexpected path component")),
            }
        }

        if segments.first().is_some_and(|first| IGNORED_PATHS.contains(first)) {
            return Err(LitError::invalid_path(&display, "inside the repository metadata"));
        }
        if segments.is_empty() {
            return Err(LitError::invalid_path(&display, "the repository root is not a file"));
        }

        Ok(segments.join("/"))
    }

    /// Every file at or below `path`, skipping the metadata directory.
    pub fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let root = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.path.join(path)
        };

        let metadata = std::fs::symlink_metadata(&root).at_path(&root)?;
        if !metadata.is_dir() {
            return Ok(vec![root]);
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored(entry.file_name()));
        for entry in walker {
            let entry = entry.map_err(|e| {
                let failed_path = e.path().unwrap_or(&root).to_path_buf();
                LitError::Storage {
                    path: failed_path,
                    source: e.into(),
                }
            })?;
            if !entry.file_type().is_dir() {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Blob for a work tree file: its bytes, or the target of a symlink.
    pub fn read_blob(&self, path: &Path, mode: EntryMode) -> Result<Blob> {
        let content = match mode {
            EntryMode::File(FileMode::Symlink) => {
                let target = std::fs::read_link(path).at_path(path)?;
                Bytes::from(target.to_string_lossy().into_owned())
            }
            _ => Bytes::from(std::fs::read(path).at_path(path)?),
        };

        Ok(Blob::new(content))
    }

    /// Classify a work tree entry without following symlinks.
    pub fn stat_file(&self, path: &Path) -> Result<EntryMode> {
        let metadata = std::fs::symlink_metadata(path).at_path(path)?;

        Ok(EntryMode::from_metadata(path, &metadata))
    }

    fn is_ignored(name: &std::ffi::OsStr) -> bool {
        name.to_str().is_some_and(|name| IGNORED_PATHS.contains(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn work_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        dir.child(".lit/HEAD").write_str("ref: refs/heads/main\n").unwrap();
        dir.child("a.txt").write_str("a").unwrap();
        dir.child("dir/b.txt").write_str("b").unwrap();
        dir.child("dir/nested/c.txt").write_str("c").unwrap();
        dir
    }

    fn workspace(dir: &TempDir) -> Workspace {
        Workspace::new(dir.path().canonicalize().unwrap().into_boxed_path())
    }

    #[rstest]
    fn repo_paths_are_slash_separated(work_tree: TempDir) {
        let workspace = workspace(&work_tree);

        assert_eq!(
            workspace.to_repo_path(&work_tree.path().join("dir/nested/c.txt")).unwrap(),
            "dir/nested/c.txt"
        );
        assert_eq!(workspace.to_repo_path(Path::new("a.txt")).unwrap(), "a.txt");
        assert_eq!(
            workspace.to_repo_path(Path::new("dir/../a.txt")).unwrap(),
            "a.txt"
        );
    }

    #[rstest]
    #[case(".lit/HEAD")]
    #[case(".lit")]
    #[case("..")]
    #[case(".")]
    fn paths_outside_the_work_tree_are_rejected(work_tree: TempDir, #[case] path: &str) {
        let workspace = workspace(&work_tree);

        assert!(matches!(
            workspace.to_repo_path(Path::new(path)),
            Err(LitError::InvalidPath { .. })
        ));
    }

    #[rstest]
    fn list_files_skips_metadata(work_tree: TempDir) {
        let workspace = workspace(&work_tree);

        let files = workspace
            .list_files(workspace.path())
            .unwrap()
            .into_iter()
            .map(|path| workspace.to_repo_path(&path).unwrap())
            .collect::<Vec<_>>();

        assert_eq!(files, vec!["a.txt", "dir/b.txt", "dir/nested/c.txt"]);
    }

    #[rstest]
    fn list_files_on_a_file_returns_it(work_tree: TempDir) {
        let workspace = workspace(&work_tree);

        let files = workspace.list_files(Path::new("a.txt")).unwrap();

        assert_eq!(files, vec![workspace.path().join("a.txt")]);
    }

    #[cfg(unix)]
    #[rstest]
    fn symlinks_are_read_as_their_target(work_tree: TempDir) {
        let workspace = workspace(&work_tree);
        let link = workspace.path().join("link");
        std::os::unix::fs::symlink("a.txt", &link).unwrap();

        let mode = workspace.stat_file(&link).unwrap();
        let blob = workspace.read_blob(&link, mode).unwrap();

        assert_eq!(mode, EntryMode::File(FileMode::Symlink));
        assert_eq!(blob.content().as_ref(), b"a.txt");
        assert_eq!(workspace.to_repo_path(&link).unwrap(), "link");
    }

    #[cfg(unix)]
    #[rstest]
    fn executable_bit_is_detected(work_tree: TempDir) {
        use std::os::unix::fs::PermissionsExt;

        let workspace = workspace(&work_tree);
        let script = workspace.path().join("run.sh");
        std::fs::write(&script, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(
            workspace.stat_file(&script).unwrap(),
            EntryMode::File(FileMode::Executable)
        );
    }
}
