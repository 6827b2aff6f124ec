use super::ui;
use crate::core::History;
use comfy_table::Cell;

pub fn display_history(history: &History) -> String {
    if history.is_empty() {
        return "No history available.".to_string();
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Timestamp"),
        ui::header_cell("Amount"),
        ui::header_cell("From"),
        ui::header_cell("Converted"),
        ui::header_cell("To"),
        ui::header_cell("Rate"),
    ]);

    for record in history.records() {
        table.add_row(vec![
            Cell::new(record.timestamp.format("%Y-%m-%d %H:%M:%S")),
            ui::number_cell(record.amount.to_string()),
            Cell::new(&record.base_currency),
            ui::number_cell(format!("{:.2}", record.converted_amount)),
            Cell::new(&record.target_currency),
            ui::number_cell(format!("{}", record.rate)),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Exchange History", ui::StyleType::Title),
        table
    )
}

pub fn run(history: &History) {
    println!("{}", display_history(history));
}
