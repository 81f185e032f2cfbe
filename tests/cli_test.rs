use std::fs;

use predicates::prelude::*;

const BOOK: &str = r##"<html><head><title>Guide</title></head><body>
<div id="toc"><ul><li><a href="#_part">Part</a>
<ul><li><a href="#_one">1. One</a></li><li><a href="#_two">2. Two</a></li></ul>
</li></ul></div>
<div id="content">
<h1 id="_part" class="sect0">Part</h1>
<div class="sect1"><h2 id="_one">1. One</h2><p>First.</p></div>
<div class="sect1"><h2 id="_two">2. Two</h2><h3 id="_two_a">More</h3><p>Second, see <a href="#nowhere">x</a>.</p></div>
</div>
</body></html>
"##;

fn book_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("guide.html"), BOOK).unwrap();
    dir
}

#[test]
fn writes_one_page_per_section() {
    let dir = book_dir();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("htmlchunk");
    cmd.arg(dir.path())
        .arg("guide")
        .assert()
        .success()
        .stdout("");

    for name in ["_part.html", "_one.html", "_two.html"] {
        assert!(dir.path().join(name).is_file(), "{name} not written");
    }
    let one = fs::read_to_string(dir.path().join("_one.html")).unwrap();
    assert!(one.contains("Two ▶"));
}

#[test]
fn prefix_base_names_pages_after_document() {
    let dir = book_dir();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("htmlchunk");
    cmd.arg("--prefix-base")
        .arg(dir.path())
        .arg("guide")
        .assert()
        .success();

    assert!(dir.path().join("guide_one.html").is_file());
    let part = fs::read_to_string(dir.path().join("guide_part.html")).unwrap();
    assert!(part.contains(r#"href="guide_two.html""#));
}

#[test]
fn unresolved_links_are_warned_about() {
    let dir = book_dir();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("htmlchunk");
    cmd.arg(dir.path())
        .arg("guide")
        .assert()
        .success()
        .stderr(predicate::str::contains("nowhere"));
}

#[test]
fn quiet_hides_progress() {
    let dir = book_dir();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("htmlchunk");
    cmd.env_remove("RUST_LOG")
        .args(["-q"])
        .arg(dir.path())
        .arg("guide")
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote page").not());
}

#[test]
fn missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("htmlchunk");
    cmd.arg(dir.path())
        .arg("absent")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: cannot read"));
}

#[test]
fn invalid_selector_fails() {
    let dir = book_dir();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("htmlchunk");
    cmd.args(["--chapter-selector", "div["])
        .arg(dir.path())
        .arg("guide")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid selector"));
}

#[test]
fn info_lists_structure_without_writing() {
    let dir = book_dir();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("htmlchunk");
    cmd.arg("-i")
        .arg(dir.path())
        .arg("guide")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chapters: 2"))
        .stdout(predicate::str::contains("One -> _one.html"))
        .stdout(predicate::str::contains("#_two_a"));

    assert!(!dir.path().join("_one.html").exists());
}

#[test]
fn info_json_is_machine_readable() {
    let dir = book_dir();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("htmlchunk");
    let output = cmd
        .args(["-i", "--json"])
        .arg(dir.path())
        .arg("guide")
        .output()
        .unwrap();
    assert!(output.status.success());

    let outline: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outline["parts"][0]["id"], "_part");
    assert_eq!(outline["chapters"][1]["prev"], "_one");
    assert_eq!(outline["chapters"][1]["next"], serde_json::Value::Null);
    assert_eq!(outline["unresolved"][0], "nowhere");
}
