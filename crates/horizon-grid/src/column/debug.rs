//! Text rendering of a column tree for trace logs and debugging.

use std::fmt::{self, Write};

use super::{Column, ColumnKind, ColumnModel, compute_span};

/// Renders a [`ColumnModel`] as an indented tree.
///
/// ```text
/// Columns (depth 2, 3 leaves):
/// OrderID [OrderID] (number, pk)
/// Ship [group-0] (span 2)
/// ├── ShipCity [ShipCity] (string)
/// └── ShipCountry [ShipCountry] (string, hidden)
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ColumnTreeDebug<'a> {
    model: &'a ColumnModel,
    indent_size: usize,
}

impl<'a> ColumnTreeDebug<'a> {
    /// Debug view of a model.
    pub fn new(model: &'a ColumnModel) -> Self {
        Self {
            model,
            indent_size: 2,
        }
    }

    /// Extra indentation per nesting level.
    pub fn indent_size(mut self, size: usize) -> Self {
        self.indent_size = size;
        self
    }

    fn format_subtree_into(
        &self,
        column: &Column,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) -> fmt::Result {
        output.push_str(&self.build_prefix(depth, is_last));
        write!(output, "{} [{}]", column.header_text, column.uid)?;

        let mut notes = Vec::new();
        match &column.kind {
            ColumnKind::Leaf(leaf) => {
                notes.push(leaf.column_type.to_string());
                if leaf.is_primary_key {
                    notes.push("pk".to_string());
                }
            }
            ColumnKind::Group(_) => notes.push(format!("span {}", compute_span(column))),
        }
        if !column.visible {
            notes.push("hidden".to_string());
        }
        writeln!(output, " ({})", notes.join(", "))?;

        let children = column.children();
        for (i, child) in children.iter().enumerate() {
            self.format_subtree_into(child, depth + 1, i + 1 == children.len(), output)?;
        }
        Ok(())
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }
        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push('\u{2502}');
            prefix.push_str(&" ".repeat(self.indent_size + 1));
        }
        prefix.push_str(if is_last {
            "\u{2514}\u{2500}\u{2500} "
        } else {
            "\u{251c}\u{2500}\u{2500} "
        });
        prefix
    }
}

impl fmt::Display for ColumnTreeDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut output = String::new();
        writeln!(
            output,
            "Columns (depth {}, {} leaves):",
            self.model.depth(),
            self.model.leaf_columns().len()
        )?;
        if self.model.is_empty() {
            writeln!(output, "  (empty)")?;
        }
        for column in self.model.columns() {
            self.format_subtree_into(column, 0, true, &mut output)?;
        }
        f.write_str(&output)
    }
}
