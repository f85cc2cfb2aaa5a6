//! reStructuredText output for the document tree.
//!
//! Every section is preceded by a `.. _id:` target so dependency tables can
//! point at it with `:ref:`. Tables become `list-table` directives and
//! purpose text a `::` literal block.

use crate::render::{Block, Cell, Document, Section, Table};

/// Heading underline characters by depth.
const UNDERLINES: [char; 4] = ['=', '-', '~', '^'];

/// Trait for converting document nodes to reStructuredText.
pub trait ToRst {
    /// Convert this node to reStructuredText.
    fn to_rst(&self) -> String;
}

impl ToRst for Document {
    fn to_rst(&self) -> String {
        let mut out = String::new();

        if let Some(title) = &self.title {
            let title = escape(title);
            let rule = "#".repeat(title.chars().count());
            out.push_str(&format!("{}\n{}\n{}\n\n", rule, title, rule));
        }

        out.push_str(&self.sections.to_rst());
        out
    }
}

impl ToRst for [Section] {
    fn to_rst(&self) -> String {
        let mut out = String::new();
        for section in self {
            write_section(section, 0, &mut out);
        }
        out
    }
}

impl ToRst for Section {
    fn to_rst(&self) -> String {
        let mut out = String::new();
        write_section(self, 0, &mut out);
        out
    }
}

fn write_section(section: &Section, depth: usize, out: &mut String) {
    let title = escape(&section.title);
    let underline = UNDERLINES[depth.min(UNDERLINES.len() - 1)];

    out.push_str(&format!(".. _{}:\n\n", section.id));
    out.push_str(&title);
    out.push('\n');
    out.push_str(&underline.to_string().repeat(title.chars().count()));
    out.push_str("\n\n");

    for block in &section.blocks {
        let rst = block.to_rst();
        if !rst.is_empty() {
            out.push_str(&rst);
            out.push_str("\n\n");
        }
    }

    for child in &section.children {
        write_section(child, depth + 1, out);
    }
}

impl ToRst for Block {
    fn to_rst(&self) -> String {
        match self {
            Block::Field { label, value } => {
                if value.is_empty() {
                    format!("{}:", escape(label))
                } else {
                    format!("{}: {}", escape(label), escape(value))
                }
            }
            Block::Line(text) | Block::Text(text) => escape(text),
            Block::Label(text) => format!("**{}**", escape(text)),
            Block::Literal(text) => {
                if text.trim().is_empty() {
                    return String::new();
                }
                let body: Vec<String> = text
                    .lines()
                    .map(|line| {
                        if line.trim().is_empty() {
                            String::new()
                        } else {
                            format!("    {}", line)
                        }
                    })
                    .collect();
                format!("::\n\n{}", body.join("\n"))
            }
            Block::Table(table) => table.to_rst(),
        }
    }
}

impl ToRst for Table {
    fn to_rst(&self) -> String {
        let mut out = String::from(".. list-table::\n   :header-rows: 1\n");

        let header: Vec<String> = self.header.iter().map(|h| escape(h)).collect();
        push_row(&mut out, &header);

        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| c.to_rst()).collect();
            push_row(&mut out, &cells);
        }

        out.truncate(out.trim_end().len());
        out
    }
}

fn push_row(out: &mut String, cells: &[String]) {
    out.push('\n');
    for (i, cell) in cells.iter().enumerate() {
        let bullet = if i == 0 { "   * -" } else { "     -" };
        out.push_str(bullet);
        if !cell.is_empty() {
            out.push(' ');
            out.push_str(cell);
        }
        out.push('\n');
    }
}

impl ToRst for Cell {
    fn to_rst(&self) -> String {
        match self {
            Cell::Text { text } => escape(text),
            Cell::Reference { text, refid } => {
                let text = text.replace('<', "\\<").replace('`', "\\`");
                format!(":ref:`{} <{}>`", text, refid)
            }
        }
    }
}

/// Escape inline markup characters.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '`' | '|' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell(text: &str) -> Cell {
        Cell::Text { text: text.into() }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("sales_daily *raw*"), "sales\\_daily \\*raw\\*");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_field() {
        let block = Block::Field {
            label: "OBJECT TYPE".into(),
            value: "TABLE".into(),
        };
        assert_eq!(block.to_rst(), "OBJECT TYPE: TABLE");

        let empty = Block::Field {
            label: "RETURNS".into(),
            value: String::new(),
        };
        assert_eq!(empty.to_rst(), "RETURNS:");
    }

    #[test]
    fn test_literal() {
        let block = Block::Literal("first\n\n    nested".into());
        assert_eq!(block.to_rst(), "::\n\n    first\n\n        nested");
        assert_eq!(Block::Literal("  ".into()).to_rst(), "");
    }

    #[test]
    fn test_list_table_with_reference() {
        let table = Table {
            header: vec!["Type".into(), "Name".into()],
            rows: vec![vec![
                cell(""),
                Cell::Reference {
                    text: "sales.orders".into(),
                    refid: "sales-orders".into(),
                },
            ]],
        };
        assert_eq!(
            table.to_rst(),
            ".. list-table::\n   :header-rows: 1\n\n   * - Type\n     - Name\n\n   * -\n     - :ref:`sales.orders <sales-orders>`"
        );
    }

    #[test]
    fn test_section_tree() {
        let section = Section {
            id: "view-objects".into(),
            title: "VIEW".into(),
            blocks: Vec::new(),
            children: vec![Section {
                id: "s-v".into(),
                title: "s.v".into(),
                blocks: vec![
                    Block::Label("PURPOSE:".into()),
                    Block::Literal("Daily totals.".into()),
                ],
                children: Vec::new(),
            }],
        };
        assert_eq!(
            section.to_rst(),
            ".. _view-objects:\n\nVIEW\n====\n\n.. _s-v:\n\ns.v\n---\n\n**PURPOSE:**\n\n::\n\n    Daily totals.\n\n"
        );
    }

    #[test]
    fn test_document_title() {
        let doc = Document {
            title: Some("Warehouse".into()),
            sections: Vec::new(),
            objects: Vec::new(),
        };
        assert_eq!(doc.to_rst(), "#########\nWarehouse\n#########\n\n");
    }
}
