/// File -> File: `source` declares an import that resolved to `target`.
///
/// Both fields are node ids. Identical edges are kept: two matching import
/// declarations in one file produce two edges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DependencyEdge {
    pub source: String,
    pub target: String,
}
