use std::path::Path;

/// Category label carried by every discovered file node.
pub const NODE_TYPE: &str = "python";

/// A discovered source file.
///
/// `id` is the path relative to the project root with `/` separators on every
/// platform. It is the sole identity key of the node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FileNode {
    pub id: String,
    /// File basename, e.g. `"helper.py"`.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FileNode {
    /// Build a node from its relative id. The basename is the last `/` segment.
    pub fn new(id: String) -> Self {
        let name = id.rsplit('/').next().unwrap_or(id.as_str()).to_owned();
        Self {
            id,
            name,
            kind: NODE_TYPE.to_owned(),
        }
    }

    /// Absolute location of this node's file under `root`.
    pub fn path_under(&self, root: &Path) -> std::path::PathBuf {
        self.id.split('/').fold(root.to_path_buf(), |acc, part| acc.join(part))
    }
}
