use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use regex::Regex;
use serde_json::json;
use tempfile::{tempdir, TempDir};

const BIN: &str = "form_core_cli";
const SCRIPT_ENV: &str = "FORM_CORE_CLI_SCRIPT";

fn cli() -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin(BIN)?;
    cmd.arg("--plain");
    Ok(cmd)
}

fn example_settings() -> Result<(TempDir, PathBuf), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("settings.json");
    cli()?.arg("init").arg(&path).assert().success();
    Ok((dir, path))
}

fn write_mixed_settings(path: &Path) -> Result<(), Box<dyn Error>> {
    let settings = json!({
        "formDefinitions": [
            {
                "title": "Current", "name": "current", "version": "1",
                "fields": [ { "name": "a", "description": "", "input": { "type": "text" } } ]
            },
            {
                "title": "Legacy", "name": "legacy",
                "fields": [ { "name": "b", "description": "", "input": { "type": "toggle" } } ]
            },
            {
                "title": "Broken", "name": "broken",
                "fields": [ { "name": "c", "input": { "type": "note" } } ]
            },
            { "fields": "garbage" }
        ]
    });
    fs::write(path, serde_json::to_string_pretty(&settings)?)?;
    Ok(())
}

#[test]
fn init_writes_example_form_once() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("settings.json");

    cli()?
        .arg("init")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("with the example form"));
    assert!(fs::read_to_string(&path)?.contains("\"example-form\""));

    cli()?
        .arg("init")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    cli()?.args(["init", "--force"]).arg(&path).assert().success();
    let backups: Vec<String> = fs::read_dir(dir.path().join("backups"))?
        .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    let pattern = Regex::new(r"^settings_\d{8}_\d{4}_before-init\.json$")?;
    assert_eq!(backups.len(), 1);
    assert!(pattern.is_match(&backups[0]), "{backups:?}");
    Ok(())
}

#[test]
fn check_reports_then_writes_migrations() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("settings.json");
    write_mixed_settings(&path)?;

    cli()?
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Current [current]: ok")
                .and(predicate::str::contains("Legacy [legacy]: migrated to version 1"))
                .and(predicate::str::contains("Form \"broken\" needs a manual fix"))
                .and(predicate::str::contains("2 usable, 1 need a manual fix, 1 invalid"))
                .and(predicate::str::contains("--write")),
        )
        .stderr(predicate::str::contains("Invalid form data"));

    cli()?
        .args(["check", "--write"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved migrated settings"));
    assert_eq!(fs::read_dir(dir.path().join("backups"))?.count(), 1);

    cli()?
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Legacy [legacy]: ok")
                .and(predicate::str::contains("--write").not()),
        );
    Ok(())
}

#[test]
fn script_mode_fills_and_renders_a_note() -> Result<(), Box<dyn Error>> {
    let (_dir, path) = example_settings()?;
    let answers = "Ada\n30\n\nyes\nTom, Felix\npasta\nreading\n7\nMathematician\n";

    cli()?
        .env(SCRIPT_ENV, "1")
        .arg("fill")
        .arg(&path)
        .arg("example-form")
        .write_stdin(answers)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("catNames:\n  - Tom\n  - Felix")
                .and(predicate::str::contains("favoriteMeal: pasta"))
                .and(predicate::str::contains("happiness: 7"))
                .and(predicate::str::contains("# Ada\n\nMathematician\n")),
        );
    Ok(())
}

#[test]
fn script_mode_reasks_and_formats_as_dataview() -> Result<(), Box<dyn Error>> {
    let (_dir, path) = example_settings()?;
    // name skipped, age 12 hides bio, happiness out of range first.
    let answers = "\n12\n\nno\n\n\n42\n3\nAda\n";

    cli()?
        .env(SCRIPT_ENV, "1")
        .args(["fill", "--format", "dataview"])
        .arg(&path)
        .arg("example-form")
        .write_stdin(answers)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("expected a number between 1 and 10")
                .and(predicate::str::contains("'Name' is required"))
                .and(predicate::str::contains(
                    "age:: 12\nhappiness:: 3\nlikesCats:: false\nname:: Ada",
                )),
        );
    Ok(())
}

#[test]
fn end_of_input_cancels_the_form() -> Result<(), Box<dyn Error>> {
    let (_dir, path) = example_settings()?;
    cli()?
        .env(SCRIPT_ENV, "1")
        .arg("fill")
        .arg(&path)
        .arg("example-form")
        .write_stdin("Ada\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Form \"example-form\" was cancelled."));
    Ok(())
}

#[test]
fn unreadable_answers_fail_instead_of_cancelling() -> Result<(), Box<dyn Error>> {
    let (_dir, path) = example_settings()?;
    cli()?
        .env(SCRIPT_ENV, "1")
        .arg("fill")
        .arg(&path)
        .arg("example-form")
        .write_stdin(vec![0xff, 0xfe, b'\n'])
        .assert()
        .failure()
        .stdout(predicate::str::contains("was cancelled").not())
        .stderr(predicate::str::contains("Error: IO error"));
    Ok(())
}

#[test]
fn unknown_form_is_an_error()-> Result<(), Box<dyn Error>> {
    let (_dir, path) = example_settings()?;
    cli()?
        .env(SCRIPT_ENV, "1")
        .arg("fill")
        .arg(&path)
        .arg("nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Unknown form \"nope\""));
    Ok(())
}

#[test]
fn render_uses_the_form_template() -> Result<(), Box<dyn Error>> {
    let (dir, path) = example_settings()?;
    let data = dir.path().join("data.json");
    fs::write(&data, json!({ "name": "Ada", "age": 30, "bio": "Hi" }).to_string())?;

    cli()?
        .arg("render")
        .arg(&path)
        .arg("example-form")
        .arg(&data)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "---\nage: 30\nname: Ada\n---\n# Ada\n\nHi\n",
        ));
    Ok(())
}

#[test]
fn template_command_prints_tokens_or_positioned_error() -> Result<(), Box<dyn Error>> {
    cli()?
        .args(["template", "Hello {{ name | upper }}"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"tag\": \"variable\"")
                .and(predicate::str::contains("\"transformation\": \"upper\"")),
        );

    cli()?
        .args(["template", "ok\n{{ broken"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("(line 2, column 1)"));
    Ok(())
}

#[test]
fn template_command_flags_variables_without_fields() -> Result<(), Box<dyn Error>> {
    let (_dir, path) = example_settings()?;
    cli()?
        .args(["template", "{{ name }} aka {{ nickname }}", "--form", "example-form"])
        .arg("--settings")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Not fields of \"example-form\": nickname",
        ));
    Ok(())
}
