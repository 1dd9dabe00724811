//! Graphviz DOT rendering

use cld_domain::extract_variables;

/// Render relationship lines as a Graphviz digraph, one labeled edge per
/// line, left-to-right layout, box-shaped nodes.
pub fn render_dot(lines: &[String]) -> String {
    let mut dot = String::from("digraph G {\n  rankdir=LR;\n  node [shape=box];\n");
    for line in lines {
        let (subject, object, symbol) = extract_variables(line);
        if subject.is_empty() || object.is_empty() || subject == object {
            continue;
        }
        dot.push_str(&format!(
            "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
            subject, object, symbol
        ));
    }
    dot.push_str("}\n");
    dot
}
