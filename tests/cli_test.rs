//! Integration tests for the dbdiagram binary.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn get_binary_path() -> String {
    std::env::var("CARGO_BIN_EXE_dbdiagram")
        .unwrap_or_else(|_| "target/debug/dbdiagram".to_string())
}

fn write_schema(dir: &TempDir, json: &str) -> std::path::PathBuf {
    let path = dir.path().join("schema.json");
    fs::write(&path, json).unwrap();
    path
}

const SHOP: &str = r#"[
  { "table_schema": "public", "table_name": "users", "foreign_keys": [],
    "columns": [{ "name": "id", "type": "int", "primary_key": true }, { "name": "email", "type": "varchar" }] },
  { "table_schema": "public", "table_name": "orders", "foreign_keys": [{ "toTable": "users", "column": "user_id" }],
    "columns": [{ "name": "id", "type": "int", "primary_key": true }, { "name": "user_id", "type": "int" }] },
  { "table_schema": "public", "table_name": "order_items", "foreign_keys": ["orders", "products"] },
  { "table_schema": "public", "table_name": "products", "foreign_keys": [] }
]"#;

#[test]
fn test_svg_to_file() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, SHOP);
    let output = dir.path().join("shop.svg");

    let status = Command::new(get_binary_path())
        .args([schema.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .status()
        .unwrap();

    assert!(status.success());
    let content = fs::read_to_string(&output).unwrap();
    assert!(content.starts_with("<svg"));
    assert!(content.contains("order_items"));
    assert_eq!(content.matches(r#"class="link""#).count(), 3);
}

#[test]
fn test_html_format_from_extension() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, SHOP);
    let output = dir.path().join("shop.html");

    let status = Command::new(get_binary_path())
        .args([
            schema.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--title",
            "Shop",
            "--no-zoom",
        ])
        .status()
        .unwrap();

    assert!(status.success());
    let content = fs::read_to_string(&output).unwrap();
    assert!(content.starts_with("<!DOCTYPE html>"));
    assert!(content.contains("<title>Shop</title>"));
    assert!(content.contains("const allowZoom = false;"));
}

#[test]
fn test_json_layout_to_stdout() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, SHOP);

    let output = Command::new(get_binary_path())
        .args([schema.to_str().unwrap(), "-f", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["nodes"].as_array().unwrap().len(), 4);
    assert_eq!(json["links"].as_array().unwrap().len(), 3);
    assert!(json["links"][0]["sourcePort"].as_str().unwrap().ends_with(":bottom"));
}

#[test]
fn test_config_file() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, SHOP);
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{ "className": "shop-canvas", "allowLooseLinks": true }"#).unwrap();

    let output = Command::new(get_binary_path())
        .args([schema.to_str().unwrap(), "-c", config.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let svg = String::from_utf8_lossy(&output.stdout);
    assert!(svg.contains(r#"class="shop-canvas""#));
    assert!(svg.contains(r#"data-allow-loose-links="true""#));
}

#[test]
fn test_empty_schema_prints_placeholder() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, "[]");

    let output = Command::new(get_binary_path())
        .arg(schema.to_str().unwrap())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Schema has no tables"));
    assert!(!stdout.contains("<svg"));
}

#[test]
fn test_empty_schema_html_is_a_page() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, "[]");
    let output = dir.path().join("empty.html");

    let status = Command::new(get_binary_path())
        .args([schema.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .status()
        .unwrap();

    assert!(status.success());
    let content = fs::read_to_string(&output).unwrap();
    assert!(content.starts_with("<!DOCTYPE html>"));
    assert!(content.contains("Schema has no tables"));
    assert!(content.trim_end().ends_with("</html>"));
}

#[test]
fn test_config_metrics_size_nodes() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(&dir, SHOP);
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{ "metrics": { "charWidth": 40 } }"#).unwrap();

    let default = Command::new(get_binary_path())
        .args([schema.to_str().unwrap(), "-f", "json"])
        .output()
        .unwrap();
    let custom = Command::new(get_binary_path())
        .args([schema.to_str().unwrap(), "-f", "json", "-c", config.to_str().unwrap()])
        .output()
        .unwrap();

    let default: serde_json::Value = serde_json::from_slice(&default.stdout).unwrap();
    let custom: serde_json::Value = serde_json::from_slice(&custom.stdout).unwrap();
    let width = |v: &serde_json::Value| v["nodes"][0]["width"].as_f64().unwrap();
    assert!(width(&custom) > width(&default));
}

#[test]
fn test_unresolved_fk_fails() {
    let dir = TempDir::new().unwrap();
    let schema = write_schema(
        &dir,
        r#"[{ "table_schema": "public", "table_name": "orders", "foreign_keys": ["customers"] }]"#,
    );

    let output = Command::new(get_binary_path())
        .arg(schema.to_str().unwrap())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unresolved foreign key"));
    assert!(stderr.contains("customers"));
}

#[test]
fn test_missing_input_fails() {
    let output = Command::new(get_binary_path())
        .arg("/nonexistent/schema.json")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read"));
}
