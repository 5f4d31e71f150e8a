use crate::aggregate::{group_totals, rank_variances, totals};
use crate::coerce::{counted_quantity, parse_number, system_quantity};
use crate::config::ReportOptions;
use crate::error::ReconError;
use crate::matcher::resolve_roles;
use crate::model::{AggregateReport, AnnotatedRow, Dataset, Progress, ReconColumns};

/// Coerce both quantity columns and derive the per-row difference.
pub fn annotate(dataset: &Dataset, columns: &ReconColumns) -> Result<Vec<AnnotatedRow>, ReconError> {
    let system_col = dataset.require_column(&columns.system_quantity)?;
    let count_col = dataset.require_column(&columns.count_target)?;

    let mut rows = Vec::with_capacity(dataset.row_count());
    let mut system_unparsed = 0usize;

    for (index, (system_cell, count_cell)) in system_col.cells.iter().zip(&count_col.cells).enumerate() {
        if !system_cell.is_empty() && parse_number(system_cell).is_none() {
            system_unparsed += 1;
        }
        let system = system_quantity(system_cell);
        let counted = counted_quantity(count_cell);
        let difference = counted.value().map(|c| c - system).unwrap_or(0.0);
        rows.push(AnnotatedRow { index, system, counted, difference });
    }

    if system_unparsed > 0 {
        log::info!(
            "{system_unparsed} non-numeric value(s) in \"{}\" treated as 0",
            columns.system_quantity
        );
    }

    Ok(rows)
}

/// Totals and progress over the whole dataset, for already-resolved columns.
/// Grouped aggregates are left empty.
pub fn compute(dataset: &Dataset, columns: &ReconColumns) -> Result<AggregateReport, ReconError> {
    let rows = annotate(dataset, columns)?;
    let totals = totals(&rows);
    let progress = Progress::from_percent(totals.percent_complete);

    log::debug!(
        "reconciled {} row(s): {} counted, system={} counted={} diff={}",
        totals.rows,
        totals.counted_rows,
        totals.system_total,
        totals.counted_total,
        totals.difference_total,
    );

    Ok(AggregateReport {
        columns: columns.clone(),
        totals,
        progress,
        by_agent: None,
        by_product: None,
        top_variances: None,
        rows,
    })
}

/// Full pipeline: resolve roles from the headers, reconcile, then attach the
/// grouped aggregates whose grouping column is available.
pub fn run(dataset: &Dataset, options: &ReportOptions) -> Result<AggregateReport, ReconError> {
    options.validate()?;

    let names = dataset.column_names();
    let columns = resolve_roles(&names).require(&names)?;
    log::info!(
        "system quantity: \"{}\", count target: \"{}\"",
        columns.system_quantity,
        columns.count_target
    );

    let mut report = compute(dataset, &columns)?;

    let agent_column = options.agent_column.as_deref().or(columns.agent.as_deref());
    report.by_agent = match agent_column {
        Some(col) if dataset.column(col).is_some() => Some(group_totals(dataset, &report.rows, col)?),
        Some(col) => {
            log::warn!("agent column \"{col}\" not found, per-agent progress omitted");
            None
        }
        None => {
            log::info!("no counting agent column, per-agent progress omitted");
            None
        }
    };

    let product_column = options
        .variance_column
        .as_deref()
        .or(columns.family.as_deref())
        .or(columns.product.as_deref());
    match product_column {
        Some(col) if dataset.column(col).is_some() => {
            report.by_product = Some(group_totals(dataset, &report.rows, col)?);
            report.top_variances = Some(rank_variances(dataset, &report.rows, col, options.top_n)?);
        }
        Some(col) => {
            log::warn!("product column \"{col}\" not found, per-product progress and ranking omitted");
        }
        None => {
            log::info!("no family or product code column, per-product progress and ranking omitted");
        }
    }

    Ok(report)
}
