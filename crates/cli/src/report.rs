//! `countboard report`: metrics, per-agent and per-product progress, variance
//! ranking and an
//! optional detail table, as text or JSON, with optional xlsx export.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use countboard_recon::model::{GroupBreakdown, Progress, VarianceRanking};
use countboard_recon::{filter_rows, AggregateReport, Cell, Dataset, ReconColumns, RowFilter, Totals};

use crate::input::{self, InputArgs};
use crate::util::{
    display_width, format_percent, format_quantity, pad_left, pad_right, progress_bar,
};
use crate::CliError;

const BAR_WIDTH: usize = 40;
const MAX_COL_WIDTH: usize = 30;
const DIFFERENCE_HEADER: &str = "Dif_calc";

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Entries in the variance ranking (1-100, default from settings or 10)
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Detail filter COLUMN=V1,V2 (repeatable; replaces filters from settings)
    #[arg(long = "filter", value_name = "COL=V1,V2")]
    pub filters: Vec<String>,

    /// Include the row-level detail table
    #[arg(long)]
    pub detail: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Also write the JSON report to FILE
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write the report as an xlsx workbook (Resumen + Detalle sheets)
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Suppress notes on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

pub fn cmd_report(args: ReportArgs) -> Result<(), CliError> {
    let loaded = input::load(&args.input)?;

    let mut options = loaded.settings.report.clone();
    if let Some(top) = args.top {
        options.top_n = top;
    }
    if !args.filters.is_empty() {
        options.filters = parse_filters(&args.filters)?;
    }

    let dataset = &loaded.dataset;
    let report = countboard_recon::run(dataset, &options)?;

    let detail_rows = if args.detail {
        Some(filter_rows(dataset, &options.filters))
    } else {
        None
    };

    if let Some(path) = &args.export {
        countboard_io::export::write_report_xlsx(path, dataset, &report)?;
        if !args.quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if args.json || args.output.is_some() {
        let json = JsonReport::new(&loaded.source.to_string(), dataset, &report, detail_rows.as_deref());
        let json_str = serde_json::to_string_pretty(&json)
            .map_err(|e| CliError::new(crate::exit_codes::EXIT_ERROR, format!("JSON serialization error: {e}")))?;

        if let Some(path) = &args.output {
            std::fs::write(path, &json_str)
                .map_err(|e| CliError::output(format!("cannot write {}: {e}", path.display())))?;
            if !args.quiet {
                eprintln!("wrote {}", path.display());
            }
        }
        if args.json {
            println!("{json_str}");
            return Ok(());
        }
    }

    print!("{}", render_text(dataset, &report, detail_rows.as_deref()));
    Ok(())
}

fn parse_filters(exprs: &[String]) -> Result<Vec<RowFilter>, CliError> {
    exprs
        .iter()
        .map(|expr| {
            RowFilter::parse(expr).ok_or_else(|| {
                CliError::args(format!("invalid filter '{expr}'"))
                    .with_hint("expected COLUMN=VALUE or COLUMN=V1,V2")
            })
        })
        .collect()
}

// ============================================================================
// Text
// ============================================================================

pub(crate) fn render_text(
    dataset: &Dataset,
    report: &AggregateReport,
    detail_rows: Option<&[usize]>,
) -> String {
    let mut out = String::new();
    render_metrics(&mut out, &report.totals, &report.progress);

    if let Some(by_agent) = &report.by_agent {
        out.push('\n');
        render_breakdown(&mut out, by_agent);
    }
    if let Some(by_product) = &report.by_product {
        out.push('\n');
        render_breakdown(&mut out, by_product);
    }
    if let Some(ranking) = &report.top_variances {
        out.push('\n');
        render_ranking(&mut out, ranking);
    }
    if let Some(rows) = detail_rows {
        out.push('\n');
        render_detail(&mut out, dataset, report, rows);
    }
    out
}

fn render_metrics(out: &mut String, totals: &Totals, progress: &Progress) {
    let metrics = [
        ("Cantidad sistema", format_quantity(totals.system_total)),
        ("Cantidad contada", format_quantity(totals.counted_total)),
        ("Diferencia total", format_quantity(totals.difference_total)),
        ("% diferencia", format_percent(totals.percent_variance)),
        ("% avance conteo", format_percent(progress.raw_percent)),
    ];
    let label_width = metrics.iter().map(|(l, _)| display_width(l)).max().unwrap_or(0);
    for (label, value) in &metrics {
        out.push_str(&format!("{}  {}\n", pad_right(label, label_width), value));
    }

    // Bar shows the clamped value, the caption the raw one
    out.push('\n');
    out.push_str(&format!(
        "{} {}\n",
        progress_bar(progress.fraction(), BAR_WIDTH),
        format_percent(progress.raw_percent)
    ));
    out.push_str(&format!(
        "Avance general de conteo: {} ({} de {} filas contadas)\n",
        format_percent(progress.raw_percent),
        totals.counted_rows,
        totals.rows
    ));
}

fn render_breakdown(out: &mut String, breakdown: &GroupBreakdown) {
    out.push_str(&format!("Avance por {} (% sobre su propio sistema)\n", breakdown.column));
    let headers = [
        breakdown.column.clone(),
        "Cantidad sistema".to_string(),
        "Cantidad contada".to_string(),
        "Diferencia".to_string(),
        "% avance".to_string(),
    ];
    let rows: Vec<Vec<String>> = breakdown
        .groups
        .iter()
        .map(|g| {
            vec![
                g.key.clone(),
                format_quantity(g.totals.system_total),
                format_quantity(g.totals.counted_total),
                format_quantity(g.totals.difference_total),
                format_percent(g.totals.percent_complete),
            ]
        })
        .collect();
    render_table(out, &headers, &rows, &[false, true, true, true, true]);
}

fn render_ranking(out: &mut String, ranking: &VarianceRanking) {
    out.push_str(&format!(
        "Top {} diferencias por {}\n",
        ranking.entries.len(),
        ranking.column
    ));
    let headers = [
        ranking.column.clone(),
        "Diferencia".to_string(),
        "Dif. absoluta".to_string(),
    ];
    let rows: Vec<Vec<String>> = ranking
        .entries
        .iter()
        .map(|e| {
            vec![
                e.key.clone(),
                format_quantity(e.difference),
                format_quantity(e.abs_difference),
            ]
        })
        .collect();
    render_table(out, &headers, &rows, &[false, true, true]);
}

fn render_detail(out: &mut String, dataset: &Dataset, report: &AggregateReport, rows: &[usize]) {
    out.push_str(&format!("Detalle ({} de {} filas)\n", rows.len(), dataset.row_count()));

    let mut headers = dataset.column_names();
    headers.push(DIFFERENCE_HEADER.to_string());
    let ncols = dataset.columns().len();

    let table: Vec<Vec<String>> = rows
        .iter()
        .filter_map(|&r| {
            let annotated = report.rows.get(r)?;
            let mut cells: Vec<String> = (0..ncols)
                .map(|c| dataset.cell(r, c).map(Cell::display).unwrap_or_default())
                .collect();
            cells.push(Cell::Number(annotated.difference).display());
            Some(cells)
        })
        .collect();

    let mut right = vec![false; ncols];
    right.push(true);
    render_table(out, &headers, &table, &right);
}

/// Column-aligned table with a dashed rule under the header.
fn render_table(out: &mut String, headers: &[String], rows: &[Vec<String>], right_align: &[bool]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(display_width(cell));
            }
        }
    }
    for w in &mut widths {
        *w = (*w).min(MAX_COL_WIDTH);
    }

    let line = |cells: &[String]| -> String {
        let parts: Vec<String> = cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, &w))| {
                if right_align.get(i).copied().unwrap_or(false) && display_width(cell) <= w {
                    pad_left(cell, w)
                } else {
                    pad_right(cell, w)
                }
            })
            .collect();
        format!("{}\n", parts.join("  ").trim_end())
    };

    out.push_str(&line(headers));
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&format!("{}\n", rule.join("  ")));
    for row in rows {
        out.push_str(&line(row));
    }
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Serialize)]
struct JsonReport<'a> {
    source: String,
    columns: &'a ReconColumns,
    totals: &'a Totals,
    progress: &'a Progress,
    #[serde(skip_serializing_if = "Option::is_none")]
    by_agent: Option<&'a GroupBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    by_product: Option<&'a GroupBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_variances: Option<&'a VarianceRanking>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<Vec<JsonDetailRow>>,
}

#[derive(Serialize)]
struct JsonDetailRow {
    row: usize,
    cells: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "Dif_calc")]
    difference: f64,
}

impl<'a> JsonReport<'a> {
    fn new(
        source: &str,
        dataset: &Dataset,
        report: &'a AggregateReport,
        detail_rows: Option<&[usize]>,
    ) -> Self {
        let detail = detail_rows.map(|rows| {
            rows.iter()
                .filter_map(|&r| {
                    let annotated = report.rows.get(r)?;
                    let cells = dataset
                        .columns()
                        .iter()
                        .map(|col| {
                            let value = col
                                .cells
                                .get(r)
                                .and_then(|c| serde_json::to_value(c).ok())
                                .unwrap_or(serde_json::Value::Null);
                            (col.name.clone(), value)
                        })
                        .collect();
                    Some(JsonDetailRow { row: r, cells, difference: annotated.difference })
                })
                .collect()
        });

        Self {
            source: source.to_string(),
            columns: &report.columns,
            totals: &report.totals,
            progress: &report.progress,
            by_agent: report.by_agent.as_ref(),
            by_product: report.by_product.as_ref(),
            top_variances: report.top_variances.as_ref(),
            detail,
        }
    }
}
