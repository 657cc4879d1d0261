use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn process_template() -> Result<Command, Box<dyn std::error::Error>> {
    #[allow(deprecated)]
    let cmd = Command::cargo_bin("process-template")?;
    Ok(cmd)
}

#[test]
fn renders_template_to_stdout() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let template = dir.path().join("header.html");
    fs::write(
        &template,
        "<!-- header -->\n<h1>{{TITLE}}</h1>\n{{#if GIT_REPO_URL}}<a href=\"{{GIT_REPO_URL}}\">repo</a>{{/if}}",
    )?;

    process_template()?
        .arg(&template)
        .args(["TITLE=My Book", "GIT_REPO_URL=https://github.com/owner/repo"])
        .assert()
        .success()
        .stdout("\n<h1>My Book</h1>\n<a href=\"https://github.com/owner/repo\">repo</a>");

    Ok(())
}

#[test]
fn output_has_no_added_trailing_newline() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let template = dir.path().join("footer.html");
    fs::write(&template, "<p>{{REPO}}</p>")?;

    process_template()?
        .arg(&template)
        .arg("REPO=owner/repo")
        .assert()
        .success()
        .stdout("<p>owner/repo</p>");

    Ok(())
}

#[test]
fn bare_arguments_are_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let template = dir.path().join("t.html");
    fs::write(&template, "[{{A}}][{{stray}}]")?;

    process_template()?
        .arg(&template)
        .args(["stray", "A=x=y"])
        .assert()
        .success()
        .stdout("[x=y][]");

    Ok(())
}

#[test]
fn hyphenated_bare_arguments_are_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let template = dir.path().join("t.html");
    fs::write(&template, "[{{A}}]")?;

    process_template()?
        .arg(&template)
        .args(["-x", "A=1", "--stray"])
        .assert()
        .success()
        .stdout("[1]");

    Ok(())
}

#[test]
fn missing_template_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    process_template()?
        .arg(dir.path().join("missing.html"))
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("not found"));

    Ok(())
}

#[test]
fn missing_template_argument_fails() -> Result<(), Box<dyn std::error::Error>> {
    process_template()?
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage"));

    Ok(())
}

#[test]
fn unknown_flag_fails_with_code_one() -> Result<(), Box<dyn std::error::Error>> {
    process_template()?.arg("--bogus").assert().code(1);

    Ok(())
}

#[test]
fn vars_file_supplies_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let template = dir.path().join("t.html");
    let vars = dir.path().join("vars.yml");
    fs::write(&template, "{{TITLE}} by {{AUTHOR}}")?;
    fs::write(&vars, "variables:\n  TITLE: File Title\n  AUTHOR: Someone\n")?;

    process_template()?
        .arg("--vars-file")
        .arg(&vars)
        .arg(&template)
        .arg("TITLE=Arg Title")
        .assert()
        .success()
        .stdout("Arg Title by Someone");

    Ok(())
}

#[test]
fn now_flag_stamps_generation_date() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let template = dir.path().join("t.html");
    fs::write(&template, "Generated {{GENERATION_DATE}}")?;

    process_template()?
        .arg("--now")
        .arg(&template)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Generated ").and(predicate::str::ends_with(" UTC")));

    process_template()?
        .arg("--now")
        .arg(&template)
        .arg("GENERATION_DATE=today")
        .assert()
        .success()
        .stdout("Generated today");

    Ok(())
}

#[test]
fn invalid_date_format_fails_with_code_one() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let template = dir.path().join("t.html");
    let vars = dir.path().join("vars.yml");
    fs::write(&template, "Generated {{GENERATION_DATE}}")?;
    fs::write(&vars, "date_format: \"%Q\"\n")?;

    process_template()?
        .arg("--vars-file")
        .arg(&vars)
        .arg("--now")
        .arg(&template)
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Invalid date format"));

    Ok(())
}
