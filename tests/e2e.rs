//! End-to-end tests driving the `blade` binary.

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn template(dir: &TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).expect("write template");
    path
}

// -----------------------------------------------------------
// tokens / tree
// -----------------------------------------------------------

#[test]
fn cli_tokens() {
    let dir = TempDir::new().expect("tempdir");
    let path = template(&dir, "a.blade.php", "@csrf\n{{ $a }}");

    cargo_bin_cmd!("blade")
        .arg("tokens")
        .arg(&path)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("directive")
                .and(predicate::str::contains("\"@csrf\""))
                .and(predicate::str::contains("\"{{ $a }}\""))
                .and(predicate::str::contains("eof")),
        );
}

#[test]
fn cli_tree_json() {
    let dir = TempDir::new().expect("tempdir");
    let path = template(&dir, "a.blade.php", "@if($a) {{ $b }} @endif");

    let output = cargo_bin_cmd!("blade")
        .args(["tree", "--json"])
        .arg(&path)
        .output()
        .expect("run blade");
    assert!(output.status.success());

    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let pair = &tree["children"][0];
    assert_eq!(pair["type"], "directive_pair");
    assert_eq!(pair["open"]["name"], "if");
    assert_eq!(pair["close"]["name"], "endif");
    assert_eq!(pair["body"][0]["type"], "echo");
    assert_eq!(pair["body"][0]["expression"], "$b");
}

// -----------------------------------------------------------
// check
// -----------------------------------------------------------

#[test]
fn cli_check_valid() {
    let dir = TempDir::new().expect("tempdir");
    let path = template(&dir, "a.blade.php", "@foreach($a as $b) x @endforeach");

    for via_cst in [false, true] {
        let mut cmd = cargo_bin_cmd!("blade");
        cmd.arg("check").arg(&path);
        if via_cst {
            cmd.arg("--via-cst");
        }
        cmd.assert()
            .success()
            .stderr(predicate::str::contains("valid (2 node(s))"));
    }
}

#[test]
fn cli_check_unclosed_block_fails() {
    let dir = TempDir::new().expect("tempdir");
    let path = template(&dir, "bad.blade.php", "\n@if($a) x");

    cargo_bin_cmd!("blade")
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "could not find \"@endif\" directive for \"@if\" at line 2",
        ));
}

#[test]
fn cli_check_reports_every_file() {
    let dir = TempDir::new().expect("tempdir");
    let good = template(&dir, "good.blade.php", "@csrf");
    let missing = dir.path().join("missing.blade.php");

    cargo_bin_cmd!("blade")
        .arg("check")
        .arg(&missing)
        .arg(&good)
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("missing.blade.php")
                .and(predicate::str::contains("good.blade.php: valid")),
        );
}

#[test]
fn cli_requires_files() {
    cargo_bin_cmd!("blade").arg("check").assert().failure();
}

// -----------------------------------------------------------
// fmt
// -----------------------------------------------------------

#[test]
fn cli_fmt_default() {
    let dir = TempDir::new().expect("tempdir");
    let path = template(&dir, "a.blade.php", "@if($a)   {{$b}}  @include('x',[1]) @endif");

    cargo_bin_cmd!("blade")
        .arg("fmt")
        .arg(&path)
        .assert()
        .success()
        .stdout("@if($a)\n    {{ $b }}\n    @include('x', [1])\n@endif\n");
}

#[test]
fn cli_fmt_options() {
    let dir = TempDir::new().expect("tempdir");
    let path = template(&dir, "a.blade.php", "@auth @include('x',[1]) @endauth");

    cargo_bin_cmd!("blade")
        .args(["fmt", "--indent", "2", "--no-format-arguments"])
        .arg(&path)
        .assert()
        .success()
        .stdout("@auth\n  @include('x',[1])\n@endauth\n");

    cargo_bin_cmd!("blade")
        .args(["fmt", "--tabs"])
        .arg(&path)
        .assert()
        .success()
        .stdout("@auth\n\t@include('x', [1])\n@endauth\n");
}

#[test]
fn cli_fmt_invalid_fails() {
    let dir = TempDir::new().expect("tempdir");
    let path = template(&dir, "bad.blade.php", "@if($a) @endforeach");

    cargo_bin_cmd!("blade")
        .arg("fmt")
        .arg(&path)
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains(
            "unexpected directive @endforeach, expected @endif",
        ));
}
