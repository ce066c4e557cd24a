//! Table converter - flattens tables into row and cell nodes.

use super::{ConversionContext, RunConverter};
use crate::core::ast::{Node, NodeLabel};
use crate::docx::{Table, TableCell};

/// Converter for Table elements.
pub struct TableConverter;

impl TableConverter {
    /// Converts a table to a numbered `table{n}` node. Every row and cell is kept,
    /// empty ones included, in source order.
    pub fn convert(table: &Table, context: &mut ConversionContext<'_>) -> Node {
        let number = context.next_table_number();
        let mut node = Node::new(NodeLabel::Table(number));

        for row in &table.rows {
            let mut row_node = Node::new(NodeLabel::Row);
            for cell in &row.cells {
                row_node.children.push(Self::convert_cell(cell, context));
            }
            node.children.push(row_node);
        }

        log::debug!("Table {} with {} rows", number, table.rows.len());
        node
    }

    /// A cell's style comes from its first paragraph's first run only.
    fn convert_cell(cell: &TableCell, context: &ConversionContext<'_>) -> Node {
        let text = cell.text();
        let style = cell
            .paragraphs
            .first()
            .and_then(|para| {
                para.runs.first().map(|run| {
                    let para_style_id = context.styles().paragraph_style_id(para);
                    RunConverter::style_info(run, para_style_id, context)
                })
            })
            .unwrap_or_default();

        Node::new(NodeLabel::Cell)
            .with_text(context.truncate(&text))
            .attrs(style.attributes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::LocalPalette;
    use crate::docx::{Paragraph, Run, RunProperties, StyleSheet, TableRow};
    use crate::localization::RussianLocalization;
    use crate::ConvertOptions;

    fn cell(texts: &[&str]) -> TableCell {
        TableCell {
            paragraphs: texts
                .iter()
                .map(|text| Paragraph {
                    runs: vec![Run {
                        text: text.to_string(),
                        properties: RunProperties {
                            font: Some("Arial".into()),
                            ..Default::default()
                        },
                        ..Default::default()
                    }],
                    text: text.to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[test]
    fn test_table_keeps_row_and_cell_order() {
        let sheet = StyleSheet::default();
        let options = ConvertOptions::default();
        let palette = LocalPalette::default();
        let mut context = ConversionContext::new(&sheet, &options, &palette, &RussianLocalization);
        let table = Table {
            rows: vec![
                TableRow {
                    cells: vec![cell(&["Name. Extra"]), cell(&[])],
                },
                TableRow {
                    cells: vec![cell(&["a", "b"]), cell(&["c"])],
                },
            ],
        };

        let first = TableConverter::convert(&table, &mut context);
        let second = TableConverter::convert(&Table::default(), &mut context);

        assert_eq!(first.label.tag(), "table1");
        assert_eq!(second.label.tag(), "table2");
        assert_eq!(first.children.len(), 2);

        let row0 = &first.children[0].children;
        assert_eq!(row0[0].text.as_deref(), Some("Name"));
        assert_eq!(row0[0].get_attr("font"), Some("Arial"));
        assert_eq!(row0[1].text.as_deref(), Some(""));
        assert_eq!(row0[1].get_attr("font"), Some("Unknown"));

        let row1 = &first.children[1].children;
        assert_eq!(row1[0].text.as_deref(), Some("a\nb"));
        assert_eq!(row1[1].text.as_deref(), Some("c"));
    }
}
