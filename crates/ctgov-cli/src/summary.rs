use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::pipeline::BatchSummary;

pub fn print_summary(summary: &BatchSummary) {
    println!("Output: {}", summary.output.display());
    println!("{}", summary_table(summary));
}

pub fn summary_table(summary: &BatchSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Records"),
        header_cell("Failures"),
        header_cell("Stopped at cap"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Center);
    table.add_row(vec![
        Cell::new(summary.records).add_attribute(Attribute::Bold),
        count_cell(summary.failures, Color::Red),
        if summary.reached_limit {
            Cell::new("yes").fg(Color::Yellow)
        } else {
            dim_cell("no")
        },
    ]);
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
