use tree_sitter::{Node, Point, Tree};

/// 1-based position of the first construct that makes the file invalid
/// Python 3, if any.
///
/// tree-sitter-python recovers from more than the Python 3 compiler accepts,
/// so beyond error and missing nodes this also rejects Python 2 only syntax
/// and statements indented at module level.
pub fn first_invalid_position(tree: &Tree, source: &[u8]) -> Option<(usize, usize)> {
    let root = tree.root_node();
    let point = first_rejected_node(tree, source)
        .or_else(|| root.has_error().then(|| root.start_position()))
        .or_else(|| first_misindented_statement(root))?;
    Some((point.row + 1, point.column + 1))
}

/// Pre-order walk: the first error, missing or Python 2 node.
fn first_rejected_node(tree: &Tree, source: &[u8]) -> Option<Point> {
    let mut cursor = tree.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() || is_python2_only(node, source) {
            return Some(node.start_position());
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Kinds the grammar keeps for Python 2 compatibility.
fn is_python2_only(node: Node, source: &[u8]) -> bool {
    match node.kind() {
        // `print "x"`, `exec "code"`, `a <> b`
        "print_statement" | "exec_statement" | "<>" => true,
        // `` `expr` `` is lexed as a string with backtick delimiters.
        "string_start" => node
            .utf8_text(source)
            .map(|text| text.ends_with('`'))
            .unwrap_or(false),
        // `except ValueError, e:`
        "except_clause" => {
            let mut cursor = node.walk();
            node.children_by_field_name("value", &mut cursor).count() > 1
        }
        _ => false,
    }
}

/// A module-level statement that opens its line anywhere but column 0.
///
/// Statements sharing a line after `;` are fine. Comments may sit anywhere.
fn first_misindented_statement(root: Node) -> Option<Point> {
    let mut cursor = root.walk();
    let mut previous_end_row: Option<usize> = None;

    for child in root.named_children(&mut cursor) {
        if child.kind() == "comment" {
            continue;
        }
        let start = child.start_position();
        let opens_line = previous_end_row.is_none_or(|row| row < start.row);
        if opens_line && start.column != 0 {
            return Some(start);
        }
        previous_end_row = Some(child.end_position().row);
    }
    None
}
