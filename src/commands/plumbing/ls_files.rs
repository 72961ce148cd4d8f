use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    pub fn ls_files(&self) -> anyhow::Result<()> {
        let index = self.load_index()?;

        for entry in index.entries() {
            writeln!(self.writer(), "{} {}\t{}", entry.mode, entry.oid, entry.name)?;
        }

        Ok(())
    }
}
