use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

// Echoes what it was given, so expected outputs stay predictable.
const FAKE_SCHEDULER: &str = r#"
case "$3" in
  hang) exec sleep 30 ;;
esac
echo "quantum=$2"
head -n 1 "$1"
"#;

const CORPUS: &str = r#"# Basic

## Two Processes

```input
2
0, 4
1, 3
```

```output
quantum=2
2
```

# Broken

## Wrong Quantum

```input
3
0, 1
```

```output
quantum=4
1
```
"#;

fn project(corpus: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("rr.sh");
    std::fs::write(&script, FAKE_SCHEDULER).unwrap();
    std::fs::write(dir.path().join("unit_tests.md"), corpus).unwrap();
    std::fs::write(
        dir.path().join("rrtest.toml"),
        format!(
            "corpus = \"unit_tests.md\"\n\n[program]\npath = \"sh\"\nargs = [{:?}]\ntimeout_ms = 5000\n\n[build]\nenabled = false\n",
            script.to_string_lossy()
        ),
    )
    .unwrap();
    dir
}

fn rrtest(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rrtest").unwrap();
    cmd.current_dir(dir).env("NO_COLOR", "1");
    cmd
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn passing_section_succeeds() {
    let dir = project(CORPUS);
    let out = rrtest(dir.path())
        .args(["testit", "-s", "basic"])
        .assert()
        .success()
        .get_output()
        .clone();
    let stdout = stdout_of(&out);
    assert!(stdout.contains("# Basic"), "{}", stdout);
    assert!(stdout.contains("All 1 test cases passed."), "{}", stdout);
    assert!(stdout.contains("- score: 1/1"), "{}", stdout);
    assert!(stdout.contains("unit_tests.md\n- score"), "{}", stdout);
    assert!(!stdout.contains("# Broken"), "{}", stdout);
}

#[test]
fn failing_case_exits_with_failure_and_shows_diff() {
    let dir = project(CORPUS);
    let out = rrtest(dir.path())
        .arg("t")
        .assert()
        .failure()
        .get_output()
        .clone();
    let stdout = stdout_of(&out);
    assert!(stdout.contains("## Wrong Quantum"), "{}", stdout);
    assert!(stdout.contains("**FAILED** (exit code: 0"), "{}", stdout);
    assert!(stdout.contains("- quantum=4\n+ quantum=3\n  1"), "{}", stdout);
    assert!(stdout.contains("- score: 1/2"), "{}", stdout);
}

#[test]
fn unknown_section_is_reported_but_not_fatal() {
    let dir = project(CORPUS);
    let out = rrtest(dir.path())
        .args(["testit", "-s", "Nonexistent"])
        .assert()
        .success()
        .get_output()
        .clone();
    let stdout = stdout_of(&out);
    assert!(
        stdout.contains("Unknown section(s): 'Nonexistent'"),
        "{}",
        stdout
    );
    assert!(stdout.contains("No test cases were run."), "{}", stdout);
}

#[test]
fn makeit_output_is_a_corpus() {
    let dir = project(CORPUS);
    let report = dir.path().join("out").join("made.md");
    rrtest(dir.path())
        .args(["makeit", "-o"])
        .arg(&report)
        .assert()
        .success();

    let made = std::fs::read_to_string(&report).unwrap();
    let corpus = rrtest_core::corpus::parse(&made);
    assert!(corpus.errors.is_empty(), "{:?}", corpus.errors);
    let wrong = corpus
        .section("Broken")
        .and_then(|s| s.find("Wrong Quantum"))
        .unwrap();
    assert_eq!(wrong.expected_output(), ["quantum=3", "1"]);
    assert_eq!(wrong.input().quantum, 3);
}

#[test]
fn timeit_shows_elapsed_time() {
    let dir = project(CORPUS);
    let out = rrtest(dir.path())
        .args(["p", "-s", "Basic"])
        .assert()
        .success()
        .get_output()
        .clone();
    let stdout = stdout_of(&out);
    assert!(stdout.contains("quantum: 2"), "{}", stdout);
    assert!(stdout.contains("| pid | arrival | burst |"), "{}", stdout);
    assert!(stdout.contains("elapsed: "), "{}", stdout);
    assert!(stdout.contains("- test cases: 1"), "{}", stdout);
}

#[test]
fn missing_program_is_fatal() {
    let dir = project(CORPUS);
    let out = rrtest(dir.path())
        .args(["testit", "--program", "./no-such-rr"])
        .assert()
        .failure()
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Missing program under test"), "{}", stderr);
}

#[test]
fn hanging_program_times_out() {
    let dir = project(CORPUS);
    let out = rrtest(dir.path())
        .args(["testit", "-s", "Basic", "--timeout", "300", "--", "hang"])
        .assert()
        .failure()
        .get_output()
        .clone();
    let stdout = stdout_of(&out);
    assert!(stdout.contains("**TIMED OUT**"), "{}", stdout);
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    rrtest(dir.path()).arg("init").assert().success();
    let written = std::fs::read_to_string(dir.path().join("rrtest.toml")).unwrap();
    assert_eq!(written, rrtest_core::Config::example_toml());

    rrtest(dir.path()).arg("init").assert().failure();
}

