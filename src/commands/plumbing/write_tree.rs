use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::errors::Result;
use std::io::Write;

impl Repository {
    /// Store the tree hierarchy described by `index` and return the root id.
    ///
    /// Subtrees are written before the trees that reference them. An empty
    /// index yields the empty tree.
    pub fn write_tree(&self, index: &Index) -> Result<ObjectId> {
        let tree = Tree::build(index.entries())?;

        let mut store_tree = |tree: &Tree| self.database().store(tree).map(|_| ());
        tree.traverse(&mut store_tree)?;

        let tree_id = tree.object_id()?;
        tracing::debug!("wrote tree {tree_id} for {} entries", index.len());

        Ok(tree_id)
    }

    pub fn write_index_tree(&self) -> anyhow::Result<()> {
        let index = self.load_index()?;
        let tree_id = self.write_tree(&index)?;

        writeln!(self.writer(), "{tree_id}")?;

        Ok(())
    }
}
