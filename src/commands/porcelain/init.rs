use crate::areas::refs::DEFAULT_BRANCH;
use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    pub fn init(&self) -> anyhow::Result<()> {
        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .lit/objects directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create .lit/refs/heads directory")?;

        let reinitialized = self.refs().head_path().exists();
        if !reinitialized {
            self.refs()
                .init_head(DEFAULT_BRANCH)
                .context("Failed to create initial HEAD reference")?;
        }

        let state = if reinitialized {
            "Reinitialized existing"
        } else {
            "Initialized empty"
        };
        tracing::info!("{state} repository at {}", self.path().display());
        writeln!(
            self.writer(),
            "{state} Lit repository in {}",
            self.lit_dir().display()
        )?;

        Ok(())
    }
}
