use super::ui;
use crate::core::{ConversionLedger, Statistics, input::normalize_code};
use anyhow::Result;

pub fn display_statistics(base: &str, target: &str, stats: &Statistics) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Max"),
        ui::header_cell("Min"),
        ui::header_cell("Average"),
        ui::header_cell("Conversions"),
    ]);
    table.add_row(vec![
        ui::number_cell(format!("{:.4}", stats.max_rate)),
        ui::number_cell(format!("{:.4}", stats.min_rate)),
        ui::number_cell(format!("{:.4}", stats.avg_rate)),
        ui::number_cell(stats.count.to_string()),
    ]);

    format!(
        "{}\n\n{}",
        ui::style_text(&format!("Statistics {base} -> {target}"), ui::StyleType::Title),
        table
    )
}

pub fn run(ledger: &ConversionLedger, base: &str, target: &str) -> Result<()> {
    let base = normalize_code(base);
    let target = normalize_code(target);
    let stats = ledger.statistics(&base, &target)?;
    println!("{}", display_statistics(&base, &target, &stats));
    Ok(())
}
