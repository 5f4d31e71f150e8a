// XLSX export of a reconciliation report
//
// "Resumen" holds the metrics, the per-agent and per-product breakdowns
// and the variance ranking; "Detalle" is the input table with a computed `Dif_calc` column.

use std::path::Path;

use countboard_recon::model::{AggregateReport, Cell, Dataset, GroupBreakdown, VarianceRanking};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::error::ExportError;

pub const SUMMARY_SHEET: &str = "Resumen";
pub const DETAIL_SHEET: &str = "Detalle";
pub const DIFFERENCE_COLUMN: &str = "Dif_calc";

pub fn write_report_xlsx(
    path: &Path,
    dataset: &Dataset,
    report: &AggregateReport,
) -> Result<(), ExportError> {
    let to_export = |e: XlsxError| ExportError {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let quantity = Format::new().set_num_format("#,##0.##");
    let percent = Format::new().set_num_format("0.00");

    let summary = workbook
        .add_worksheet()
        .set_name(SUMMARY_SHEET)
        .map_err(to_export)?;
    write_summary(summary, report, &bold, &quantity, &percent).map_err(to_export)?;

    let detail = workbook
        .add_worksheet()
        .set_name(DETAIL_SHEET)
        .map_err(to_export)?;
    write_detail(detail, dataset, report, &bold).map_err(to_export)?;

    workbook.save(path).map_err(to_export)?;
    log::info!("wrote report to {}", path.display());
    Ok(())
}

fn write_summary(
    ws: &mut Worksheet,
    report: &AggregateReport,
    bold: &Format,
    quantity: &Format,
    percent: &Format,
) -> Result<(), XlsxError> {
    let t = &report.totals;
    ws.write_string_with_format(0, 0, "Metrica", bold)?;
    ws.write_string_with_format(0, 1, "Valor", bold)?;

    let metrics: [(&str, f64, &Format); 5] = [
        ("Cantidad sistema", t.system_total, quantity),
        ("Cantidad contada", t.counted_total, quantity),
        ("Diferencia total", t.difference_total, quantity),
        ("% diferencia", t.percent_variance, percent),
        ("% avance conteo", report.progress.raw_percent, percent),
    ];
    for (i, (label, value, format)) in metrics.iter().enumerate() {
        let row = i as u32 + 1;
        ws.write_string(row, 0, *label)?;
        ws.write_number_with_format(row, 1, *value, format)?;
    }

    let mut row = metrics.len() as u32 + 2;
    if let Some(by_agent) = &report.by_agent {
        row = write_breakdown(ws, row, by_agent, bold, quantity, percent)? + 1;
    }
    if let Some(by_product) = &report.by_product {
        row = write_breakdown(ws, row, by_product, bold, quantity, percent)? + 1;
    }
    if let Some(ranking) = &report.top_variances {
        write_ranking(ws, row, ranking, bold, quantity)?;
    }

    ws.set_column_width(0, 24.0)?;
    ws.set_column_width(1, 16.0)?;
    ws.set_column_width(2, 16.0)?;
    ws.set_column_width(3, 14.0)?;
    ws.set_column_width(4, 12.0)?;
    Ok(())
}

/// Returns the first row after the table.
fn write_breakdown(
    ws: &mut Worksheet,
    start: u32,
    breakdown: &GroupBreakdown,
    bold: &Format,
    quantity: &Format,
    percent: &Format,
) -> Result<u32, XlsxError> {
    let headers = [
        breakdown.column.as_str(),
        "Cantidad sistema",
        "Cantidad contada",
        "Diferencia",
        "% avance",
    ];
    for (col, h) in headers.iter().enumerate() {
        ws.write_string_with_format(start, col as u16, *h, bold)?;
    }

    let mut row = start + 1;
    for group in &breakdown.groups {
        ws.write_string(row, 0, &group.key)?;
        ws.write_number_with_format(row, 1, group.totals.system_total, quantity)?;
        ws.write_number_with_format(row, 2, group.totals.counted_total, quantity)?;
        ws.write_number_with_format(row, 3, group.totals.difference_total, quantity)?;
        ws.write_number_with_format(row, 4, group.totals.percent_complete, percent)?;
        row += 1;
    }
    Ok(row)
}

fn write_ranking(
    ws: &mut Worksheet,
    start: u32,
    ranking: &VarianceRanking,
    bold: &Format,
    quantity: &Format,
) -> Result<u32, XlsxError> {
    ws.write_string_with_format(start, 0, ranking.column.as_str(), bold)?;
    ws.write_string_with_format(start, 1, "Diferencia", bold)?;
    ws.write_string_with_format(start, 2, "Dif. absoluta", bold)?;

    let mut row = start + 1;
    for entry in &ranking.entries {
        ws.write_string(row, 0, &entry.key)?;
        ws.write_number_with_format(row, 1, entry.difference, quantity)?;
        ws.write_number_with_format(row, 2, entry.abs_difference, quantity)?;
        row += 1;
    }
    Ok(row)
}

fn write_detail(
    ws: &mut Worksheet,
    dataset: &Dataset,
    report: &AggregateReport,
    bold: &Format,
) -> Result<(), XlsxError> {
    let columns = dataset.columns();
    for (col, column) in columns.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, &column.name, bold)?;
    }
    let diff_col = columns.len() as u16;
    ws.write_string_with_format(0, diff_col, DIFFERENCE_COLUMN, bold)?;

    for annotated in &report.rows {
        let row = annotated.index as u32 + 1;
        for (col, column) in columns.iter().enumerate() {
            let col = col as u16;
            match column.cells.get(annotated.index) {
                Some(Cell::Number(n)) => {
                    ws.write_number(row, col, *n)?;
                }
                Some(Cell::Text(s)) if !s.is_empty() => {
                    ws.write_string(row, col, s)?;
                }
                Some(Cell::Bool(b)) => {
                    ws.write_boolean(row, col, *b)?;
                }
                _ => {}
            }
        }
        ws.write_number(row, diff_col, annotated.difference)?;
    }

    ws.set_freeze_panes(1, 0)?;
    Ok(())
}
