// Integration tests for `countboard report` and `countboard columns`.
// Run with: cargo test -p countboard-cli --test report_tests

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const COUNT_CSV: &str = "\
Cod. Producto;Familia;Contador;Cantidad;Cantidad a contar
P-1;Bebidas;ana;10;8
P-2;Snacks;luis;5;
P-3;Snacks;ana;0;3
";

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn config_dir(&self) -> PathBuf {
        self.dir.path().join("config")
    }

    fn countboard(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_countboard"));
        cmd.current_dir(self.dir.path());
        // Keep the user's saved sources and settings out of the tests
        cmd.env("COUNTBOARD_CONFIG_DIR", self.config_dir());
        cmd.env_remove("COUNTBOARD_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.countboard().args(args).output().expect("failed to run countboard")
    }
}

fn path_str(p: &Path) -> &str {
    p.to_str().unwrap()
}

fn assert_exit(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "expected exit {code}, got {:?}\nstdout: {}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
}

#[test]
fn text_report_on_csv() {
    let env = Env::new();
    let csv = env.write("conteo.csv", COUNT_CSV);

    let output = env.run(&["report", path_str(&csv)]);
    assert_exit(&output, 0);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Cantidad sistema  15"), "{stdout}");
    assert!(stdout.contains("% avance conteo   73.33%"), "{stdout}");
    assert!(stdout.contains("Avance por Contador"), "{stdout}");
    assert!(stdout.contains("Top 2 diferencias por Familia"), "{stdout}");
}

#[test]
fn json_report_fields() {
    let env = Env::new();
    let csv = env.write("conteo.csv", COUNT_CSV);

    let output = env.run(&["report", path_str(&csv), "--json", "--top", "1"]);
    assert_exit(&output, 0);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["columns"]["system_quantity"], "Cantidad");
    assert_eq!(json["columns"]["count_target"], "Cantidad a contar");
    assert_eq!(json["totals"]["system_total"], 15.0);
    assert_eq!(json["totals"]["counted_total"], 11.0);
    assert_eq!(json["totals"]["difference_total"], 1.0);
    assert_eq!(json["progress"]["clamped_percent"], json["progress"]["raw_percent"]);

    let ranking = json["top_variances"]["entries"].as_array().unwrap();
    assert_eq!(ranking.len(), 1);
    assert_eq!(ranking[0]["key"], "Snacks");

    let agents = json["by_agent"]["groups"].as_array().unwrap();
    assert_eq!(agents[0]["key"], "ana");
    assert_eq!(agents[1]["key"], "luis");

    let products = json["by_product"]["groups"].as_array().unwrap();
    assert_eq!(json["by_product"]["column"], "Familia");
    assert_eq!(products[1]["key"], "Snacks");
    assert_eq!(products[1]["system_total"], 5.0);
    assert_eq!(products[1]["counted_total"], 3.0);
    assert_eq!(products[1]["percent_complete"], 60.0);
    assert!(json.get("detail").is_none());
}

#[test]
fn json_detail_respects_filters() {
    let env = Env::new();
    let csv = env.write("conteo.csv", COUNT_CSV);

    let output = env.run(&[
        "report", path_str(&csv), "--json", "--detail", "--filter", "Contador=ana",
    ]);
    assert_exit(&output, 0);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let detail = json["detail"].as_array().unwrap();
    assert_eq!(detail.len(), 2);
    assert_eq!(detail[0]["row"], 0);
    assert_eq!(detail[1]["row"], 2);
    // Metrics are computed on every row regardless of the filter
    assert_eq!(json["totals"]["system_total"], 15.0);
}

#[test]
fn unresolved_columns_exit_4() {
    let env = Env::new();
    let csv = env.write("stock.csv", "Producto,Stock\nA,3\n");

    let output = env.run(&["report", path_str(&csv)]);
    assert_exit(&output, 4);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("system quantity"), "stderr: {stderr}");
    assert!(stderr.contains("\"Producto\", \"Stock\""), "stderr: {stderr}");
}

#[test]
fn missing_file_exits_3() {
    let env = Env::new();
    let output = env.run(&["report", "no-such-file.xlsx"]);
    assert_exit(&output, 3);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no-such-file.xlsx"), "stderr: {stderr}");
}

#[test]
fn no_input_exits_2() {
    let env = Env::new();
    let output = env.run(&["report"]);
    assert_exit(&output, 2);
}

#[test]
fn top_out_of_range_exits_2() {
    let env = Env::new();
    let csv = env.write("conteo.csv", COUNT_CSV);
    let output = env.run(&["report", path_str(&csv), "--top", "0"]);
    assert_exit(&output, 2);
}

#[test]
fn invalid_settings_exit_5() {
    let env = Env::new();
    let csv = env.write("conteo.csv", COUNT_CSV);
    let settings = env.write("settings.toml", "[report]\ntop_n = \"ten\"\n");

    let output = env.run(&["report", path_str(&csv), "--config", path_str(&settings)]);
    assert_exit(&output, 5);
}

#[test]
fn settings_top_n_applies() {
    let env = Env::new();
    let csv = env.write("conteo.csv", COUNT_CSV);
    let settings = env.write("settings.toml", "[report]\ntop_n = 1\n");

    let output = env.run(&["report", path_str(&csv), "--config", path_str(&settings), "--json"]);
    assert_exit(&output, 0);
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["top_variances"]["entries"].as_array().unwrap().len(), 1);
}

#[test]
fn unwritable_output_exits_6() {
    let env = Env::new();
    let csv = env.write("conteo.csv", COUNT_CSV);
    let target = env.dir.path().join("missing-dir").join("r.json");

    let output = env.run(&["report", path_str(&csv), "--output", path_str(&target)]);
    assert_exit(&output, 6);
}

#[test]
fn unwritable_export_exits_6() {
    let env = Env::new();
    let csv = env.write("conteo.csv", COUNT_CSV);
    let target = env.dir.path().join("missing-dir").join("r.xlsx");

    let output = env.run(&["report", path_str(&csv), "--export", path_str(&target)]);
    assert_exit(&output, 6);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot write"), "stderr: {stderr}");
}

#[test]
fn export_writes_workbook() {
    use calamine::{open_workbook_auto, Reader};

    let env = Env::new();
    let csv = env.write("conteo.csv", COUNT_CSV);
    let target = env.dir.path().join("reporte.xlsx");

    let output = env.run(&["report", path_str(&csv), "--export", path_str(&target), "-q"]);
    assert_exit(&output, 0);
    assert!(output.stderr.is_empty(), "{}", String::from_utf8_lossy(&output.stderr));

    let wb = open_workbook_auto(&target).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Resumen".to_string(), "Detalle".to_string()]);
}

#[test]
fn xlsx_input_with_named_sheet() {
    let env = Env::new();
    let path = env.dir.path().join("conteo.xlsx");
    let mut wb = rust_xlsxwriter::Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Portada").unwrap();
    ws.write_string(0, 0, "Inventario 2026").unwrap();
    let ws = wb.add_worksheet();
    ws.set_name("Conteo").unwrap();
    ws.write_string(0, 0, "CANTIDAD").unwrap();
    ws.write_string(0, 1, "Cantidad a Contar").unwrap();
    ws.write_number(1, 0, 4.0).unwrap();
    ws.write_number(1, 1, 2.0).unwrap();
    wb.save(&path).unwrap();

    let output = env.run(&["report", path_str(&path), "--sheet", "Conteo", "--json"]);
    assert_exit(&output, 0);
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["totals"]["percent_complete"], 50.0);

    let output = env.run(&["report", path_str(&path), "--sheet", "Hoja1"]);
    assert_exit(&output, 3);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Portada, Conteo"), "stderr: {stderr}");
}

#[test]
fn columns_lists_roles() {
    let env = Env::new();
    let csv = env.write("conteo.csv", COUNT_CSV);

    let output = env.run(&["columns", path_str(&csv)]);
    assert_exit(&output, 0);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("product code"), "{stdout}");
    assert!(stdout.contains("counting agent"), "{stdout}");
    assert!(!stdout.contains("missing"), "{stdout}");
}
