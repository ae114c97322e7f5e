use serde::{Deserialize, Serialize};

use crate::directory::Directory;
use crate::entry::EntryPayload;

/// Counts over a whole directory tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSummary {
    /// Directories, including the root.
    pub directories: usize,
    pub typed_entries: usize,
    /// Entries carrying a nested directory.
    pub directory_entries: usize,
    pub raw_entries: usize,
    pub raw_bytes: usize,
    pub unresolved_entries: usize,
    pub opaque_objects: usize,
    /// Deepest nesting level; the root is 0.
    pub max_depth: usize,
}

impl SceneSummary {
    pub fn of(root: &Directory) -> Self {
        let mut summary = Self::default();
        summary.visit(root, 0);
        summary
    }

    fn visit(&mut self, dir: &Directory, depth: usize) {
        self.directories += 1;
        self.max_depth = self.max_depth.max(depth);
        if dir.object.is_opaque() {
            self.opaque_objects += 1;
        }
        for entry in &dir.entries {
            match entry.payload() {
                Some(EntryPayload::Typed(_)) => self.typed_entries += 1,
                Some(EntryPayload::Directory { dir: nested, .. }) => {
                    self.directory_entries += 1;
                    self.visit(nested, depth + 1);
                }
                Some(EntryPayload::Raw(bytes)) => {
                    self.raw_entries += 1;
                    self.raw_bytes += bytes.len();
                }
                None => self.unresolved_entries += 1,
            }
        }
    }

    pub fn entries(&self) -> usize {
        self.typed_entries + self.directory_entries + self.raw_entries + self.unresolved_entries
    }
}
