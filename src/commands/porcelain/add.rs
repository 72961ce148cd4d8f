use crate::areas::repository::Repository;
use std::path::PathBuf;

impl Repository {
    /// Stage every file at or below each of `paths`.
    ///
    /// The index is saved once, after all paths were staged, and only if
    /// something was staged.
    pub fn add(&self, paths: &[PathBuf]) -> anyhow::Result<()> {
        let mut index = self.load_index()?;

        let files = paths
            .iter()
            .map(|path| self.workspace().list_files(path))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten();

        let mut staged = 0;
        for file in files {
            self.stage(&mut index, &file)?;
            staged += 1;
        }

        if index.is_changed() {
            index.save()?;
        }
        tracing::info!("staged {staged} files");

        Ok(())
    }
}
