//! Markdown style guide rendered from a schema.

use super::model::{ColumnKind, ResultGrouping, StepNumbering, StyleSchema};
use crate::record::CellValue;
use crate::table::encode_cell;

/// Human-readable summary of the schema, suitable for review or for a prompt.
pub fn render_style_guide(schema: &StyleSchema) -> String {
    let mut out = String::from("# Test Case Style Guide\n\n## Columns\n\n");
    out.push_str("| # | Column | Kind | Required | Allowed values |\n");
    out.push_str("|---|--------|------|----------|----------------|\n");

    for (index, column) in schema.columns.iter().enumerate() {
        let allowed = if column.kind == ColumnKind::Enumerated && !column.allowed_values.is_empty()
        {
            column
                .allowed_values
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            String::new()
        };
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            index + 1,
            encode_cell(&CellValue::new(&column.name)),
            column.kind,
            if column.required { "yes" } else { "no" },
            encode_cell(&CellValue::new(allowed)),
        ));
    }

    let steps = match schema.meta.step_numbering {
        StepNumbering::Numbered => "numbered (`1.`, `2.`, ...)",
        StepNumbering::Bulleted => "bulleted",
    };
    let results = match schema.meta.result_grouping {
        ResultGrouping::Single => "one outcome per cell",
        ResultGrouping::Grouped => "several outcomes per cell, one per line",
    };

    out.push_str(&format!(
        "\n## Style\n\n- Steps: {steps}\n- Expected results: {results}\n- Language: {}\n- Line breaks inside a cell: `<br>`\n",
        schema.meta.language
    ));
    out
}
