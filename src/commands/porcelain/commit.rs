use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::normalize_message;
use crate::errors::LitError;
use std::io::Write;

impl Repository {
    /// Commit the staged snapshot on top of the current branch.
    ///
    /// The index is left as it is, so it keeps describing the next snapshot.
    pub fn commit(&self, message: &str) -> anyhow::Result<()> {
        normalize_message(message).ok_or(LitError::EmptyMessage)?;
        let author = self.config()?.author()?;

        let index = self.load_index()?;
        let tree_id = self.write_tree(&index)?;
        let parents = self.refs().latest_commit()?.into_iter().collect::<Vec<_>>();

        let (commit_id, commit) = self.write_commit_as(tree_id, parents, message, author)?;

        let branch = self.refs().current_branch()?;
        let root = if commit.is_root() { " (root-commit)" } else { "" };
        tracing::info!("committed {commit_id} on {branch}");
        writeln!(
            self.writer(),
            "[{branch}{root} {}] {}",
            commit_id.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
