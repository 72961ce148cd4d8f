use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit, normalize_message};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{LitError, Result};

impl Repository {
    /// Record a commit of `tree_id` and advance the current branch to it.
    ///
    /// The message and the identity are checked before anything is written.
    pub fn write_commit(
        &self,
        tree_id: ObjectId,
        parents: Vec<ObjectId>,
        message: &str,
    ) -> Result<(ObjectId, Commit)> {
        normalize_message(message).ok_or(LitError::EmptyMessage)?;
        let author = self.config()?.author()?;

        self.write_commit_as(tree_id, parents, message, author)
    }

    pub(crate) fn write_commit_as(
        &self,
        tree_id: ObjectId,
        parents: Vec<ObjectId>,
        message: &str,
        author: Author,
    ) -> Result<(ObjectId, Commit)> {
        let commit = Commit::try_new(parents, tree_id, author, message)?;
        let commit_id = self.database().store(&commit)?;

        self.refs().update_branch(&commit_id)?;
        tracing::debug!("wrote commit {commit_id}");

        Ok((commit_id, commit))
    }
}
