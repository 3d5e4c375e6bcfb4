mod common;

use anyhow::Result;
use assert_cmd::Command;
use common::TestExperiment;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn runpack(exp: &TestExperiment) -> Result<Command> {
    let mut cmd = Command::cargo_bin("runpack")?;
    cmd.env("HOME", exp.path())
        .env("RUNPACK_CONFIG_PATH", &exp.ctx.config_path)
        .env("NO_COLOR", "1")
        .env_remove("RUNPACK_LOG");
    Ok(cmd)
}

fn add_all(exp: &TestExperiment, manifest: &Path) -> Result<()> {
    runpack(exp)?
        .arg("add")
        .arg("--manifest")
        .arg(manifest)
        .args(["--experiment", "hz9n"])
        .arg("--root")
        .arg(exp.exp_root())
        .arg("--root")
        .arg(exp.data_root())
        .args(exp.input_files())
        .assert()
        .success()
        .stderr(predicate::str::contains("Tracked 3 new file(s)"));
    Ok(())
}

#[test]
fn test_add_and_show() -> Result<()> {
    let exp = TestExperiment::new()?;
    let manifest = exp.path().join("hz9n.yml");
    add_all(&exp, &manifest)?;
    assert!(manifest.exists());

    runpack(&exp)?
        .arg("show")
        .arg("--manifest")
        .arg(&manifest)
        .arg("--verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("experiment hz9n"))
        .stdout(predicate::str::contains("init/ICMSHhz9nINIT"))
        .stdout(predicate::str::contains("ifsdata/rtables/rtable80 (static)"))
        .stderr(predicate::str::contains("All checksums verified"));
    Ok(())
}

#[test]
fn test_add_is_idempotent() -> Result<()> {
    let exp = TestExperiment::new()?;
    let manifest = exp.path().join("hz9n.yml");
    add_all(&exp, &manifest)?;

    runpack(&exp)?
        .arg("add")
        .arg("--manifest")
        .arg(&manifest)
        .arg(exp.path().join("data/hz9n/ICMGGhz9nINIT"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Tracked 0 new file(s)"))
        .stderr(predicate::str::contains("3 total"));
    Ok(())
}

#[test]
fn test_add_new_manifest_requires_experiment() -> Result<()> {
    let exp = TestExperiment::new()?;

    runpack(&exp)?
        .arg("add")
        .arg("--manifest")
        .arg(exp.path().join("new.yml"))
        .arg(exp.path().join("data/hz9n/ICMGGhz9nINIT"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("experiment id is required"));
    Ok(())
}

#[test]
fn test_add_missing_file_fails() -> Result<()> {
    let exp = TestExperiment::new()?;

    runpack(&exp)?
        .arg("add")
        .arg("--manifest")
        .arg(exp.path().join("hz9n.yml"))
        .args(["--experiment", "hz9n"])
        .arg(exp.path().join("absent.grib"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a file"));
    Ok(())
}

#[test]
fn test_pack_and_unpack() -> Result<()> {
    let exp = TestExperiment::new()?;
    let manifest = exp.path().join("hz9n.yml");
    add_all(&exp, &manifest)?;
    let archives = exp.path().join("archives");

    runpack(&exp)?
        .arg("pack")
        .arg("--manifest")
        .arg(&manifest)
        .arg("--output")
        .arg(&archives)
        .arg("--include-static")
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote 2 archive(s)"));
    assert!(archives.join("hz9n.tar.gz").is_file());
    assert!(archives.join("ifsdata.tar.gz").is_file());
    assert!(archives.join("hz9n.yml").is_file());

    let restore = exp.path().join("restore");
    runpack(&exp)?
        .arg("unpack")
        .arg("--manifest")
        .arg(&manifest)
        .arg("--search")
        .arg(&archives)
        .arg("--output")
        .arg(&restore)
        .arg("--include-static")
        .assert()
        .success()
        .stderr(predicate::str::contains("Restored 3 file(s)"));

    assert_eq!(
        fs::read(restore.join("init/ICMSHhz9nINIT"))?,
        b"spectral fields"
    );
    assert!(restore.join("ifsdata/rtables/rtable80").is_file());
    assert!(restore.join("hz9n.yml").is_file());
    Ok(())
}

#[test]
fn test_unpack_missing_archive_fails() -> Result<()> {
    let exp = TestExperiment::new()?;
    let manifest = exp.path().join("hz9n.yml");
    add_all(&exp, &manifest)?;
    let empty = exp.path().join("empty");
    fs::create_dir_all(&empty)?;

    runpack(&exp)?
        .arg("unpack")
        .arg("--manifest")
        .arg(&manifest)
        .arg("--search")
        .arg(&empty)
        .arg("--output")
        .arg(exp.path().join("restore"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("hz9n.tar.gz not found"));
    Ok(())
}

#[test]
fn test_rebase_to_root_without_files_fails() -> Result<()> {
    let exp = TestExperiment::new()?;
    let manifest = exp.path().join("hz9n.yml");
    add_all(&exp, &manifest)?;
    let before = fs::read_to_string(&manifest)?;
    let empty = exp.path().join("empty");
    fs::create_dir_all(&empty)?;

    runpack(&exp)?
        .arg("rebase")
        .arg("--manifest")
        .arg(&manifest)
        .arg("--root")
        .arg(&empty)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in source roots"));

    assert_eq!(fs::read_to_string(&manifest)?, before);
    Ok(())
}

#[test]
fn test_rebase_keep_files_only_changes_roots() -> Result<()> {
    let exp = TestExperiment::new()?;
    let manifest = exp.path().join("hz9n.yml");
    add_all(&exp, &manifest)?;
    let empty = exp.path().join("empty");

    runpack(&exp)?
        .arg("rebase")
        .arg("--manifest")
        .arg(&manifest)
        .arg("--root")
        .arg(&empty)
        .arg("--keep-files")
        .assert()
        .success()
        .stderr(predicate::str::contains("0 file(s) relocated"));

    let text = fs::read_to_string(&manifest)?;
    assert!(text.contains(&format!("{}: {{}}", empty.display())));
    Ok(())
}

#[test]
fn test_plan_uses_configured_rules() -> Result<()> {
    let exp = TestExperiment::new()?;
    let manifest = exp.path().join("hz9n.yml");
    add_all(&exp, &manifest)?;

    fs::write(
        &exp.ctx.config_path,
        r#"
[[rewrite]]
kind = "file"
pattern = "INIT"
replacement = "${pre}"
mode = "right_aligned"

[[rewrite]]
kind = "dir"
pattern = "rtables"
replacement = "rtables${child}"
mode = "exact"
"#,
    )?;

    runpack(&exp)?
        .arg("plan")
        .arg("--manifest")
        .arg(&manifest)
        .args(["--rundir", "/run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ICMGGhz9nINIT -> /run/ICMGGhz9n\n"))
        .stdout(predicate::str::contains("rtable80 -> /run/rtables/rtable80\n"));
    Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> Result<()> {
    let exp = TestExperiment::new()?;
    fs::write(&exp.ctx.config_path, "[archive]\ncompression_level = 42\n")?;

    runpack(&exp)?
        .arg("show")
        .arg("--manifest")
        .arg(exp.path().join("hz9n.yml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Compression level"));
    Ok(())
}

#[test]
fn test_completion_generation() -> Result<()> {
    let exp = TestExperiment::new()?;

    runpack(&exp)?
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("runpack"));
    Ok(())
}
