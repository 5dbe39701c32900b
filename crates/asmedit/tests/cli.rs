use std::fs;
use std::process::Command;

use pretty_assertions::assert_eq;

fn asmedit(dir: &std::path::Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_asmedit"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("spawn asmedit")
}

#[test]
fn script_edits_are_printed() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("prog.s"), "main:\n  li $v0, 10").unwrap();
    fs::write(dir.path().join("cfg.toml"), "[editor]\ntab_size = 2\n").unwrap();

    let out = asmedit(
        dir.path(),
        &["prog.s", "--config", "cfg.toml", "--script", "<Down><End><CR>syscall"],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "main:\n  li $v0, 10\n  syscall\n"
    );
}

#[test]
fn write_flag_saves_document() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("prog.s"), "nop").unwrap();

    let out = asmedit(dir.path(), &["prog.s", "--script", "<C-/>", "--write"]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    assert_eq!(fs::read_to_string(dir.path().join("prog.s")).unwrap(), "# nop");
}

#[test]
fn missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let out = asmedit(dir.path(), &["new.s", "--script", "jr $ra"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "jr $ra\n");
}

#[test]
fn unknown_platform_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = asmedit(dir.path(), &["x.s", "--platform", "amiga"]);
    assert!(!out.status.success());
}

#[test]
fn malformed_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = asmedit(dir.path(), &["x.s", "--script", "<Q-x>"]);
    assert!(!out.status.success());
}

#[cfg(unix)]
fn write_checker(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("check.sh");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn checker_reports_located_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("prog.s"), "main:\n  lx $t0").unwrap();
    let checker = write_checker(dir.path(), "echo '1:2: unknown instruction' >&2\nexit 1");

    let out = asmedit(dir.path(), &["prog.s", "--checker", checker.to_str().unwrap()]);
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("syntax error at 1:2: unknown instruction"), "{stderr}");
}

#[cfg(unix)]
#[test]
fn checker_sees_edited_text() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("prog.s"), "nop").unwrap();
    let checker = write_checker(dir.path(), "grep -q '^# nop$' || exit 1");

    let out = asmedit(
        dir.path(),
        &["prog.s", "--script", "<C-/>", "--checker", checker.to_str().unwrap()],
    );
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("syntax ok"));
}
