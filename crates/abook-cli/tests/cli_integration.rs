//! End-to-end runs of the `abook` binary against temporary trees

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

struct TestFixture {
    _temp_dir: TempDir,
    source: PathBuf,
    destination: PathBuf,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("incoming");
        let destination = temp_dir.path().join("library");
        fs::create_dir_all(&source).unwrap();
        Self {
            _temp_dir: temp_dir,
            source,
            destination,
        }
    }

    fn audio(&self, relative: &str) -> PathBuf {
        let path = self.source.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"not really audio").unwrap();
        path
    }
}

fn abook(args: &[&Path], flags: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_abook"));
    for arg in args {
        command.arg(arg);
    }
    command.args(flags).env("RUST_LOG", "off").output().unwrap()
}

fn json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "abook failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_scan_lists_units() {
    let fixture = TestFixture::new();
    fixture.audio("Frank Herbert/Dune/01.mp3");
    fixture.audio("Frank Herbert/Dune/02.mp3");
    fixture.audio("Ursula K. Le Guin/Earthsea/01.mp3");

    let output = abook(&[Path::new("scan"), &fixture.source], &["--json"]);
    let value = json(&output);

    assert_eq!(value["units"].as_array().unwrap().len(), 2);
    assert_eq!(value["audio_files"], 3);
}

#[test]
fn test_preview_touches_nothing() {
    let fixture = TestFixture::new();
    fixture.audio("Frank Herbert/Dune/01.mp3");

    let csv = fixture.source.parent().unwrap().join("preview.csv");
    let output = abook(
        &[
            Path::new("preview"),
            &fixture.source,
            &fixture.destination,
            Path::new("--csv"),
            &csv,
        ],
        &["--json"],
    );
    let value = json(&output);

    let operations = value["operations"].as_array().unwrap();
    assert_eq!(operations.len(), 1);
    let destination = PathBuf::from(operations[0]["destination"].as_str().unwrap());
    assert!(destination.ends_with(Path::new("Frank Herbert").join("Dune")));

    assert!(!fixture.destination.exists());
    assert!(fs::read_to_string(&csv).unwrap().starts_with("Source,Destination"));
}

#[test]
fn test_organize_copies_into_layout() {
    let fixture = TestFixture::new();
    let original = fixture.audio("Frank Herbert/Dune/01.mp3");

    let output = abook(
        &[Path::new("organize"), &fixture.source, &fixture.destination],
        &["--op", "copy", "--verify", "checksum", "--json"],
    );
    let value = json(&output);

    assert_eq!(value["succeeded"], 1);
    assert_eq!(value["failed"], 0);
    assert!(fixture
        .destination
        .join("Frank Herbert")
        .join("Dune")
        .join("01.mp3")
        .is_file());
    assert!(original.is_file());
}

#[test]
fn test_invalid_arguments_exit_with_error() {
    let output = abook(&[Path::new("organize"), Path::new("/only-one")], &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage: abook organize"));
}
