use std::io::Write;
use std::process::Command;

const REQUEST: &str = r#"{
    "tables": {
        "logs": {
            "schema": {"action": "STRING", "response": "INTEGER"},
            "rows": [
                {"action": "GET", "response": 200},
                {"action": "GET", "response": 404},
                {"action": "POST"}
            ]
        }
    },
    "query": {
        "type": "filter",
        "input": {"type": "relation", "table_name": "logs"},
        "condition": {
            "type": "equal_to",
            "left": {"type": "qualified_name", "parts": ["response"]},
            "right": {"type": "literal", "value": {"type": "integer", "value": 404}}
        }
    }
}"#;

fn request_file(contents: &str) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

#[test]
fn test_cli_prints_json_rows() -> anyhow::Result<()> {
    let file = request_file(REQUEST)?;
    let output = Command::new(env!("CARGO_BIN_EXE_exprplan"))
        .arg("--input")
        .arg(file.path())
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let rows: Vec<serde_json::Value> = stdout
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(rows, vec![serde_json::json!({"action": "GET", "response": 404})]);
    Ok(())
}

#[test]
fn test_cli_explain() -> anyhow::Result<()> {
    let file = request_file(REQUEST)?;
    let output = Command::new(env!("CARGO_BIN_EXE_exprplan"))
        .arg("--input")
        .arg(file.path())
        .arg("--explain")
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(stdout.trim_end(), "Filter: response = 404\n  Relation: logs");
    Ok(())
}

#[test]
fn test_cli_reports_unknown_table() -> anyhow::Result<()> {
    let file = request_file(r#"{"query": {"type": "relation", "table_name": "nope"}}"#)?;
    let output = Command::new(env!("CARGO_BIN_EXE_exprplan"))
        .arg("--input")
        .arg(file.path())
        .output()?;
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("no such table: nope"));
    Ok(())
}
