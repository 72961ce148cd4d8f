//! Branch references and HEAD
//!
//! HEAD is always symbolic, `ref: refs/<name>`, naming the branch that
//! the next commit advances. A branch ref is a text file holding the id of the
//! branch tip; it does not exist until the first commit on that branch.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{LitError, Result, StorageContext};
use std::path::{Path, PathBuf};

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Characters and sequences that may not appear in a ref name
const INVALID_REF_NAME_REGEX: &str = r"\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";

pub const HEAD_REF_NAME: &str = "HEAD";

pub const DEFAULT_BRANCH: &str = "main";

const REFS_PREFIX: &str = "refs/";

const HEADS_PREFIX: &str = "refs/heads/";

#[derive(Debug)]
pub struct Refs {
    /// The `.lit` directory
    path: Box<Path>,
}

impl Refs {
    pub fn new(path: Box<Path>) -> Self {
        Refs { path }
    }

    /// The ref path HEAD points at, e.g. `refs/heads/main`.
    pub fn current_ref(&self) -> Result<String> {
        let head_path = self.head_path();
        let content = std::fs::read_to_string(&head_path).at_path(&head_path)?;
        let content = content.trim_end_matches(['\n', '\r']);

        let symref = regex::Regex::new(SYMREF_REGEX)
            .ok()
            .and_then(|re| re.captures(content))
            .map(|captures| captures[1].to_string())
            .ok_or_else(|| LitError::CorruptHead(content.to_string()))?;

        if !symref.starts_with(REFS_PREFIX) || !is_valid_ref_name(&symref) {
            return Err(LitError::CorruptHead(content.to_string()));
        }

        Ok(symref)
    }

    /// Short name of the branch HEAD points at.
    ///
    /// Refs outside `refs/heads/` are returned as their full path.
    pub fn current_branch(&self) -> Result<String> {
        let current_ref = self.current_ref()?;

        Ok(current_ref
            .strip_prefix(HEADS_PREFIX)
            .unwrap_or(&current_ref)
            .to_string())
    }

    /// The commit at the tip of the current branch, `None` before the first commit.
    pub fn latest_commit(&self) -> Result<Option<ObjectId>> {
        let ref_path = self.path.join(self.current_ref()?);
        self.read_ref_file(&ref_path)
    }

    /// Point the current branch at `oid`.
    ///
    /// The previous value is overwritten without comparing it first.
    pub fn update_branch(&self, oid: &ObjectId) -> Result<()> {
        let current_ref = self.current_ref()?;
        let ref_path = self.path.join(&current_ref);

        self.update_ref_file(&ref_path, oid.as_ref())?;
        tracing::debug!("updated {current_ref} to {oid}");

        Ok(())
    }

    /// Point HEAD at `refs/heads/<branch>`.
    pub fn init_head(&self, branch: &str) -> Result<()> {
        let target = format!("{HEADS_PREFIX}{branch}");
        if !is_valid_ref_name(&target) {
            return Err(LitError::invalid_path(target, "invalid branch name"));
        }

        self.update_ref_file(&self.head_path(), &format!("ref: {target}\n"))
    }

    fn read_ref_file(&self, path: &Path) -> Result<Option<ObjectId>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).at_path(path)?;
        let oid = content.trim();
        if oid.is_empty() {
            tracing::warn!("ref file {} is empty", path.display());
            return Ok(None);
        }

        ObjectId::try_parse(oid)
            .map(Some)
            .map_err(|_| LitError::CorruptRef {
                path: path.to_path_buf(),
                content: content.clone(),
            })
    }

    fn update_ref_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).at_path(parent)?;
        }

        std::fs::write(path, content).at_path(path)
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.refs_path().join("heads")
    }
}

/// A relative, `/`-separated ref path with no empty or dot-leading segments.
fn is_valid_ref_name(name: &str) -> bool {
    let has_bad_segment = name
        .split('/')
        .any(|segment| segment.is_empty() || segment.starts_with('.'));
    if name.is_empty() || has_bad_segment {
        return false;
    }

    regex::Regex::new(INVALID_REF_NAME_REGEX)
        .map(|re| !re.is_match(name))
        .unwrap_or(false)
}
