use countboard_recon::engine::{compute, run};
use countboard_recon::matcher::resolve_roles;
use countboard_recon::model::{Cell, CountedQuantity, Dataset, ReconColumns};
use countboard_recon::{filter_rows, ReconError, ReportOptions, RowFilter};

fn text(s: &str) -> Cell {
    Cell::from(s)
}

/// A small count export shaped like the real ones: mixed-case headers with
/// irregular spacing, text quantities, some items not counted yet.
fn count_export() -> Dataset {
    Dataset::from_rows(
        vec![
            "Cod. Producto".into(),
            "Familia".into(),
            " Cantidad ".into(),
            "Cantidad  a Contar".into(),
            "Contador".into(),
            "Cliente".into(),
        ],
        vec![
            vec![text("P-001"), text("Bebidas"), text("10"), text("8"), text("ana"), text("acme")],
            vec![text("P-002"), text("Bebidas"), text("5"), text(""), text("ana"), text("acme")],
            vec![text("P-003"), text("Snacks"), text("0"), text("3"), text("luis"), text("globex")],
            vec![Cell::Number(4.0), text("Limpieza"), Cell::Number(20.0), Cell::Number(20.0), text("luis"), text("acme")],
            vec![text("P-005"), text(""), text("abc"), text("pendiente"), text(""), text("globex")],
        ],
    )
}

// -------------------------------------------------------------------------
// Worked example
// -------------------------------------------------------------------------

#[test]
fn worked_example_totals() {
    let ds = Dataset::from_rows(
        vec!["system".into(), "counted".into()],
        vec![
            vec![text("10"), text("8")],
            vec![text("5"), text("")],
            vec![text("0"), text("3")],
        ],
    );
    let report = compute(&ds, &ReconColumns::new("system", "counted")).unwrap();
    let t = &report.totals;

    assert_eq!(t.system_total, 15.0);
    assert_eq!(t.counted_total, 11.0);
    assert_eq!(t.difference_total, 1.0);
    assert!((t.percent_complete - 73.333_333).abs() < 1e-4, "{}", t.percent_complete);
    assert!((t.percent_variance - 6.666_667).abs() < 1e-4, "{}", t.percent_variance);

    // The uncounted row is summed as a zero difference but not as a count.
    assert_eq!(t.rows, 3);
    assert_eq!(t.counted_rows, 2);
    assert_eq!(report.rows[1].counted, CountedQuantity::NotCounted);
    assert_eq!(report.rows[1].difference, 0.0);
}

#[test]
fn zero_system_total_percents_are_zero() {
    let ds = Dataset::from_rows(
        vec!["Cantidad".into(), "Cantidad a contar".into()],
        vec![vec![text("0"), text("12")], vec![text(""), text("7")]],
    );
    let report = run(&ds, &ReportOptions::default()).unwrap();
    assert_eq!(report.totals.counted_total, 19.0);
    assert_eq!(report.totals.percent_complete, 0.0);
    assert_eq!(report.totals.percent_variance, 0.0);
    assert_eq!(report.progress.clamped_percent, 0.0);
}

// -------------------------------------------------------------------------
// Full pipeline
// -------------------------------------------------------------------------

#[test]
fn full_report_over_count_export() {
    let ds = count_export();
    let report = run(&ds, &ReportOptions::default()).unwrap();

    assert_eq!(report.columns.system_quantity, " Cantidad ");
    assert_eq!(report.columns.count_target, "Cantidad  a Contar");
    assert_eq!(report.columns.product.as_deref(), Some("Cod. Producto"));
    assert_eq!(report.columns.family.as_deref(), Some("Familia"));
    assert_eq!(report.columns.agent.as_deref(), Some("Contador"));

    let t = &report.totals;
    assert_eq!(t.system_total, 35.0);
    assert_eq!(t.counted_total, 31.0);
    assert_eq!(t.difference_total, 1.0);
    assert_eq!(t.rows, 5);
    assert_eq!(t.counted_rows, 3);

    let agents = report.by_agent.as_ref().unwrap();
    let keys: Vec<&str> = agents.groups.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["ana", "luis"]);
    assert!((agents.groups[0].totals.percent_complete - 8.0 / 15.0 * 100.0).abs() < 1e-9);
    assert!((agents.groups[1].totals.percent_complete - 115.0).abs() < 1e-9);

    // Family wins over product code for the ranking.
    let ranking = report.top_variances.as_ref().unwrap();
    assert_eq!(ranking.column, "Familia");
    let ranked: Vec<(&str, f64)> =
        ranking.entries.iter().map(|e| (e.key.as_str(), e.difference)).collect();
    assert_eq!(ranked, vec![("Snacks", 3.0), ("Bebidas", -2.0), ("Limpieza", 0.0)]);
}

#[test]
fn over_count_progress_is_clamped_but_raw_kept() {
    let ds = Dataset::from_rows(
        vec!["Cantidad".into(), "Cantidad a contar".into()],
        vec![vec![text("10"), text("25")]],
    );
    let report = run(&ds, &ReportOptions::default()).unwrap();
    assert_eq!(report.progress.raw_percent, 250.0);
    assert_eq!(report.progress.clamped_percent, 100.0);
    assert_eq!(report.totals.percent_complete, 250.0);
}

#[test]
fn product_code_ranking_when_no_family() {
    let ds = Dataset::from_rows(
        vec!["Cod Producto".into(), "Cantidad".into(), "Cantidad a contar".into()],
        vec![
            vec![text("A"), text("100"), text("50")],
            vec![text("B"), text("0"), text("50")],
            vec![text("C"), text("30"), text("0")],
            vec![text("A"), text("1"), text("")],
        ],
    );
    let opts = ReportOptions { top_n: 2, ..Default::default() };
    let report = run(&ds, &opts).unwrap();
    let ranking = report.top_variances.unwrap();
    assert_eq!(ranking.column, "Cod Producto");
    // |A| = 50 and |B| = 50 tie: first-encountered group first.
    let keys: Vec<&str> = ranking.entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["A", "B"]);
}

#[test]
fn unresolved_roles_carry_available_columns() {
    let ds = Dataset::from_rows(vec!["Producto".into(), "Stock".into()], vec![vec![text("x"), text("1")]]);
    let err = run(&ds, &ReportOptions::default()).unwrap_err();
    match err {
        ReconError::UnresolvedRoles { missing, available } => {
            assert_eq!(missing.len(), 2);
            assert_eq!(available, vec!["Producto".to_string(), "Stock".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn run_twice_is_identical() {
    let ds = count_export();
    let opts = ReportOptions::default();
    let first = run(&ds, &opts).unwrap();
    let second = run(&ds, &opts).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.totals.percent_complete.to_bits(), second.totals.percent_complete.to_bits());
}

#[test]
fn filters_leave_metrics_untouched() {
    let ds = count_export();
    let opts = ReportOptions {
        filters: vec![RowFilter { column: "Cliente".into(), values: vec!["globex".into()] }],
        ..Default::default()
    };
    let report = run(&ds, &opts).unwrap();
    assert_eq!(report.totals.rows, 5);
    assert_eq!(filter_rows(&ds, &opts.filters), vec![2, 4]);
}

#[test]
fn resolver_sees_original_names() {
    let names = count_export().column_names();
    let roles = resolve_roles(&names);
    assert_eq!(roles.system_quantity.as_deref(), Some(" Cantidad "));
}

#[test]
fn per_product_progress_by_family() {
    let ds = count_export();
    let report = run(&ds, &ReportOptions::default()).unwrap();

    let products = report.by_product.as_ref().unwrap();
    assert_eq!(products.column, "Familia");
    let keys: Vec<&str> = products.groups.iter().map(|g| g.key.as_str()).collect();
    // The row with an empty family belongs to no group
    assert_eq!(keys, vec!["Bebidas", "Snacks", "Limpieza"]);

    // P-002 is not counted: its system quantity counts, its count does not
    let bebidas = &products.groups[0].totals;
    assert_eq!(bebidas.system_total, 15.0);
    assert_eq!(bebidas.counted_total, 8.0);
    assert_eq!(bebidas.difference_total, -2.0);
    assert!((bebidas.percent_complete - 8.0 / 15.0 * 100.0).abs() < 1e-9);
    assert_eq!(bebidas.rows, 2);
    assert_eq!(bebidas.counted_rows, 1);

    let snacks = &products.groups[1].totals;
    assert_eq!(snacks.counted_total, 3.0);
    assert_eq!(snacks.percent_complete, 0.0);

    let limpieza = &products.groups[2].totals;
    assert_eq!(limpieza.difference_total, 0.0);
    assert_eq!(limpieza.percent_complete, 100.0);
}

#[test]
fn per_product_progress_falls_back_to_product_code() {
    let ds = Dataset::from_rows(
        vec!["Cod. Producto".into(), "Cantidad".into(), "Cantidad a contar".into()],
        vec![
            vec![text("A"), text("10"), text("4")],
            vec![text("A"), text("10"), text("")],
            vec![text("B"), text("5"), text("5")],
        ],
    );
    let report = run(&ds, &ReportOptions::default()).unwrap();

    let products = report.by_product.as_ref().unwrap();
    assert_eq!(products.column, "Cod. Producto");
    let a = &products.groups[0];
    assert_eq!(a.key, "A");
    assert_eq!(a.totals.system_total, 20.0);
    assert_eq!(a.totals.counted_total, 4.0);
    assert_eq!(a.totals.difference_total, -6.0);
    assert_eq!(a.totals.percent_complete, 20.0);
    assert_eq!(products.groups[1].totals.percent_complete, 100.0);
}
