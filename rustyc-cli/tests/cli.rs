use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn rustyc() -> Command {
    let mut cmd = Command::cargo_bin("rustyc").expect("binary exists");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn checks_a_valid_file() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("main.rs");
    fs::write(&input_path, "fn main() -> i32 { 1 }").expect("write input");

    rustyc()
        .arg(&input_path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("RustyC v"));

    assert!(!dir.path().join("main.wasm").exists());
}

#[test]
fn compiles_and_runs_wasm() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("fib.rs");
    fs::write(
        &input_path,
        "fn fib(n: i32) -> i32 { if n < 2 { n } else { fib(n - 1) + fib(n - 2) } }\n\
         fn main() -> i32 { fib(10) }\n",
    )
    .expect("write input");

    rustyc()
        .arg(&input_path)
        .arg("--run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Program exited with 55"));

    assert!(dir.path().join("fib.wasm").exists(), "wasm output was not created");
}

#[test]
fn unit_main_exits_with_zero() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("main.rs");
    fs::write(&input_path, "fn main() { let x = 1; }").expect("write input");

    rustyc()
        .arg(&input_path)
        .arg("--run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Program exited with 0"));
}

#[test]
fn float_remainder_runs() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("rem.rs");
    fs::write(
        &input_path,
        "fn main() -> i32 { let r = 5.5 % 2.0; if r == 1.5 { 1 } else { 0 } }",
    )
    .expect("write input");

    rustyc()
        .arg(&input_path)
        .arg("--run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Program exited with 1"));
}

#[test]
fn writes_wasm_into_out_dir() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("prog.rs");
    fs::write(&input_path, "fn main() -> i64 { 2i64 * 21i64 }").expect("write input");
    let out_dir = dir.path().join("build/out");

    rustyc()
        .arg(&input_path)
        .arg("--emit")
        .arg("wasm")
        .arg("-o")
        .arg(&out_dir)
        .assert()
        .success();

    let wasm = fs::read(out_dir.join("prog.wasm")).expect("read wasm");
    assert_eq!(&wasm[..4], b"\0asm");
}

#[test]
fn reports_plain_diagnostics() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("bad.rs");
    fs::write(&input_path, "fn g(a: i32) {}\nfn main() { g(1.0); }\n").expect("write input");

    rustyc()
        .arg(&input_path)
        .arg("--plain")
        .assert()
        .failure()
        .stderr(predicate::str::contains(":2:").and(predicate::str::contains("error[E0202]")));
}

#[test]
fn reports_ariadne_diagnostics() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("bad.rs");
    fs::write(&input_path, "fn main() { let x = y; }").expect("write input");

    rustyc()
        .arg(&input_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E0200").and(predicate::str::contains("bad.rs")));
}

#[test]
fn reports_unsupported_constructs_with_location() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("m.rs");
    fs::write(&input_path, "fn main() {\n    match 1 {}\n}\n").expect("write input");

    rustyc()
        .arg(&input_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "m.rs:2:5: error: `match` expression is not supported",
        ));
}

#[test]
fn one_failing_file_does_not_stop_the_batch() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("a_bad.rs"), "fn main() -> bool { 1 }").expect("write input");
    fs::write(dir.path().join("b_good.rs"), "fn main() -> i32 { 7 }").expect("write input");

    rustyc()
        .arg(dir.path())
        .arg("--emit")
        .arg("wasm")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 2 file(s) failed to compile"));

    assert!(dir.path().join("b_good.wasm").exists());
    assert!(!dir.path().join("a_bad.wasm").exists());
}

#[test]
fn prints_the_ast() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("main.rs");
    fs::write(&input_path, "fn main() { let x = -a * b; }").expect("write input");

    rustyc()
        .arg(&input_path)
        .arg("--emit")
        .arg("ast")
        .assert()
        .success()
        .stdout(predicate::str::contains("fn main() { let x = ((-a) * b); }"));
}

#[test]
fn missing_input_is_counted_and_the_rest_still_compile() {
    let dir = tempdir().expect("tempdir");
    let good = dir.path().join("good.rs");
    fs::write(&good, "fn main() -> i32 { 3 }").expect("write input");

    rustyc()
        .arg(&good)
        .arg(dir.path().join("missing.rs"))
        .arg("--emit")
        .arg("wasm")
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("failed to collect source files")
                .and(predicate::str::contains("missing.rs"))
                .and(predicate::str::contains("1 of 2 file(s) failed to compile")),
        );

    assert!(dir.path().join("good.wasm").exists());
}
