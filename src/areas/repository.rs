//! Repository handle
//!
//! A [`Repository`] bundles the work tree, the object database and the refs of
//! one `.lit` directory, plus the writer commands print to.
//!
//! ## Concurrency
//!
//! Nothing is locked. Each command loads the index, edits it and saves it
//! back, and a commit overwrites the branch ref without comparing it to the
//! value it started from. Two invocations running at once on the same
//! repository can therefore lose an update. Serialising writers (an advisory
//! lock file held across a stage or commit) is the place to extend if that is
//! ever needed.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::{LIT_DIR, Workspace};
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::config::Config;
use crate::errors::{LitError, Result, StorageContext};
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

/// Walk up from `start` to the first directory containing `.lit/`.
pub fn find_root(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().ok()?;

    start
        .ancestors()
        .find(|dir| dir.join(LIT_DIR).is_dir())
        .map(Path::to_path_buf)
}

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Open the repository rooted at `path`, creating the directory if needed.
    ///
    /// The `.lit` directory itself is not required to exist yet, so this is
    /// also the entry point for `init`.
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path).at_path(path)?;
        }
        let path = path.canonicalize().at_path(path)?;
        let lit_dir = path.join(LIT_DIR);

        Ok(Repository {
            database: Database::new(lit_dir.join("objects").into_boxed_path()),
            workspace: Workspace::new(path.clone().into_boxed_path()),
            refs: Refs::new(lit_dir.into_boxed_path()),
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
        })
    }

    /// Open the repository enclosing `start`.
    pub fn discover(start: &Path, writer: Box<dyn std::io::Write>) -> Result<Self> {
        let root = find_root(start).ok_or_else(|| LitError::MissingRepository(start.into()))?;
        tracing::debug!("found repository at {}", root.display());

        Self::new(&root, writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lit_dir(&self) -> PathBuf {
        self.path.join(LIT_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.lit_dir().join("index")
    }

    pub fn config_path(&self) -> PathBuf {
        self.lit_dir().join("config")
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn load_index(&self) -> Result<Index> {
        Index::load(&self.index_path())
    }

    pub fn config(&self) -> Result<Config> {
        Config::load(&self.config_path())
    }

    /// Snapshot one work tree file into the object store and the index.
    ///
    /// The stored blob holds the file bytes, or the link target for a
    /// symlink. Any previous entry for the same path is replaced.
    pub fn stage(&self, index: &mut Index, path: &Path) -> Result<IndexEntry> {
        let repo_path = self.workspace.to_repo_path(path)?;
        let file_path = self.path.join(&repo_path);

        let mode = self.workspace.stat_file(&file_path)?;
        if mode == EntryMode::Directory {
            return Err(LitError::invalid_path(repo_path, "is a directory"));
        }

        let blob = self.workspace.read_blob(&file_path, mode)?;
        let oid = self.database.store(&blob)?;

        let entry = IndexEntry::new(repo_path, oid, mode);
        index.add(entry.clone())?;
        tracing::debug!("staged {} as {}", entry.name, entry.oid);

        Ok(entry)
    }
}
