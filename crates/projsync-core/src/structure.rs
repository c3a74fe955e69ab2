//! Text rendering of the synchronized directory tree.
//!
//! The rendered document is uploaded next to the regular files so the remote
//! side can see how they were laid out locally.
//!
//! ```text
//! demo/
//!     README.md
//!     src/
//!         lib.rs
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::newtypes::RelativePath;

/// Document name used for the rendered tree
pub const STRUCTURE_FILE_NAME: &str = "PROJECT_STRUCTURE.txt";

const INDENT: &str = "    ";

#[derive(Default)]
struct DirNode<'a> {
    files: BTreeSet<&'a str>,
    dirs: BTreeMap<&'a str, DirNode<'a>>,
}

impl<'a> DirNode<'a> {
    fn insert(&mut self, path: &'a RelativePath) {
        let mut node = self;
        for segment in path.parent_segments() {
            node = node.dirs.entry(segment).or_default();
        }
        node.files.insert(path.file_name());
    }

    fn render(&self, depth: usize, out: &mut Vec<String>) {
        let indent = INDENT.repeat(depth);
        for file in &self.files {
            out.push(format!("{indent}{file}"));
        }
        for (name, child) in &self.dirs {
            out.push(format!("{indent}{name}/"));
            child.render(depth + 1, out);
        }
    }
}

/// Renders `paths` as an indented tree under `root_name`.
///
/// Each directory lists its files first and then its subdirectories, both
/// sorted by name. Directories only appear if they contain at least one of
/// the given paths.
pub fn render_structure<'a, I>(root_name: &str, paths: I) -> String
where
    I: IntoIterator<Item = &'a RelativePath>,
{
    let mut root = DirNode::default();
    for path in paths {
        root.insert(path);
    }

    let mut lines = vec![format!("{root_name}/")];
    root.render(1, &mut lines);
    lines.join("\n")
}
