//! Static column definitions exposed to the grid widget

use serde::Serialize;

use crate::dataset::Row;

/// How a column's cell value is rendered
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CellFormat {
    Plain,
    Currency,
}

/// A single column definition
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ColumnDef {
    /// Row field the column reads from
    pub field: &'static str,
    /// Header label
    pub header: &'static str,
    /// Width in pixels
    pub width: u32,
    /// Whether cells can be edited in place
    pub editable: bool,
    pub format: CellFormat,
}

/// The five grid columns: id, agent, strategy, location, risk
pub const COLUMNS: [ColumnDef; 5] = [
    ColumnDef {
        field: "id",
        header: "ID",
        width: 100,
        editable: false,
        format: CellFormat::Plain,
    },
    ColumnDef {
        field: "agent",
        header: "Agent",
        width: 150,
        editable: true,
        format: CellFormat::Plain,
    },
    ColumnDef {
        field: "strategy",
        header: "Strategy",
        width: 200,
        editable: false,
        format: CellFormat::Plain,
    },
    ColumnDef {
        field: "location",
        header: "Location",
        width: 150,
        editable: false,
        format: CellFormat::Plain,
    },
    ColumnDef {
        field: "risk",
        header: "Risk",
        width: 150,
        editable: false,
        format: CellFormat::Currency,
    },
];

/// Format a risk value as currency text, treating a missing value as zero
pub fn format_risk(value: Option<u32>) -> String {
    let digits = value.unwrap_or(0).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    grouped.push('$');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

impl ColumnDef {
    /// Render the cell text for `row` in this column
    pub fn cell_text(&self, row: &Row) -> String {
        match self.field {
            "id" => row.id.to_string(),
            "agent" => row.agent.clone(),
            "strategy" => row.strategy.to_string(),
            "location" => row.location.to_string(),
            "risk" => format_risk(Some(row.risk)),
            _ => String::new(),
        }
    }
}
