use tree_sitter::{Node, Tree};

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// One import declaration as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportDeclaration {
    /// `import a.b, c as d`: every listed dotted name, aliases dropped.
    Direct { names: Vec<String> },
    /// `from a.b import x, y`: only the source module is kept.
    /// `None` for a relative import with no named module (`from . import x`).
    From { module: Option<String> },
}

impl ImportDeclaration {
    /// Dotted names this declaration contributes, in source order.
    pub fn dotted_names(&self) -> &[String] {
        match self {
            Self::Direct { names } => names,
            Self::From { module } => module.as_slice(),
        }
    }
}

/// The closed set of import-like statement kinds in the Python grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclarationKind {
    Import,
    ImportFrom,
    FutureImport,
}

impl DeclarationKind {
    fn classify(kind: &str) -> Option<Self> {
        match kind {
            "import_statement" => Some(Self::Import),
            "import_from_statement" => Some(Self::ImportFrom),
            "future_import_statement" => Some(Self::FutureImport),
            _ => None,
        }
    }
}

/// Module name of every `from __future__ import ...` statement.
const FUTURE_MODULE: &str = "__future__";

// ---------------------------------------------------------------------------
// Helper utilities
// ---------------------------------------------------------------------------

fn node_text<'a>(node: Node<'a>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Normalised text of a `dotted_name`: identifiers joined by `.`, so
/// `a . b` and `a.b` are the same name.
fn dotted_text(node: Node, source: &[u8]) -> String {
    let mut cursor = node.walk();
    let parts: Vec<&str> = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "identifier")
        .map(|c| node_text(c, source))
        .collect();
    if parts.is_empty() {
        return node_text(node, source).trim().to_owned();
    }
    parts.join(".")
}

// ---------------------------------------------------------------------------
// Declaration extraction
// ---------------------------------------------------------------------------

/// `import a.b, c as d` -> `["a.b", "c"]`
fn extract_direct(node: Node, source: &[u8]) -> ImportDeclaration {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children_by_field_name("name", &mut cursor) {
        match child.kind() {
            "dotted_name" => names.push(dotted_text(child, source)),
            "aliased_import" => {
                if let Some(name) = child.child_by_field_name("name") {
                    names.push(dotted_text(name, source));
                }
            }
            _ => {}
        }
    }
    ImportDeclaration::Direct { names }
}

/// `from a.b import x` -> `Some("a.b")`; `from .a import x` -> `Some("a")`;
/// `from . import x` -> `None`. Relative level markers are dropped.
fn extract_from(node: Node, source: &[u8]) -> ImportDeclaration {
    let module = node
        .child_by_field_name("module_name")
        .and_then(|m| match m.kind() {
            "dotted_name" => Some(dotted_text(m, source)),
            "relative_import" => {
                let mut cursor = m.walk();
                m.named_children(&mut cursor)
                    .find(|c| c.kind() == "dotted_name")
                    .map(|d| dotted_text(d, source))
            }
            _ => None,
        });
    ImportDeclaration::From { module }
}

fn extract_declaration(kind: DeclarationKind, node: Node, source: &[u8]) -> ImportDeclaration {
    match kind {
        DeclarationKind::Import => extract_direct(node, source),
        DeclarationKind::ImportFrom => extract_from(node, source),
        DeclarationKind::FutureImport => ImportDeclaration::From {
            module: Some(FUTURE_MODULE.to_owned()),
        },
    }
}

/// Collect every import declaration in the tree, at any nesting depth, in
/// source order.
///
/// Imports inside `if`, `try`, function and class bodies are captured the same
/// way as top-level ones.
pub fn extract_declarations(tree: &Tree, source: &[u8]) -> Vec<ImportDeclaration> {
    let mut declarations = Vec::new();
    let mut cursor = tree.walk();

    loop {
        let node = cursor.node();
        let declaration = DeclarationKind::classify(node.kind());
        if let Some(kind) = declaration {
            declarations.push(extract_declaration(kind, node, source));
        }

        // Import statements never contain nested statements.
        if declaration.is_none() && cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return declarations;
            }
        }
    }
}

/// Flattened dotted names of every declaration, duplicates preserved.
pub fn extract_imports(tree: &Tree, source: &[u8]) -> Vec<String> {
    extract_declarations(tree, source)
        .iter()
        .flat_map(|d| d.dotted_names().iter().cloned())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
