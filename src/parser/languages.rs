use tree_sitter::Language;

/// The tree-sitter grammar used for every discovered file.
pub fn python_language() -> Language {
    tree_sitter_python::LANGUAGE.into()
}
