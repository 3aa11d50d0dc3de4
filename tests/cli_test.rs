use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

#[test]
fn cli_round_trip() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let orig_path = temp_dir.path().join("sam.txt");
    let packed_path = temp_dir.path().join("sam.lzu");
    let unpacked_path = temp_dir.path().join("sam_out.txt");
    let text = "I am Sam. Sam I am. I do not like this Sam I am.\n".repeat(50);
    std::fs::write(&orig_path,&text)?;

    let mut cmd = Command::cargo_bin("lzuf")?;
    cmd.arg("compress")
        .arg("-i").arg(&orig_path)
        .arg("-o").arg(&packed_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("compressed"));

    let mut cmd = Command::cargo_bin("lzuf")?;
    cmd.arg("expand")
        .arg("-i").arg(&packed_path)
        .arg("-o").arg(&unpacked_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("expanded"));

    match (std::fs::read(&orig_path),std::fs::read(&unpacked_path)) {
        (Ok(v1),Ok(v2)) => {
            assert_eq!(v1,v2);
        },
        _ => panic!("unable to compare output with original")
    }
    let packed = std::fs::read(&packed_path)?;
    assert!(packed.len() < text.len());
    Ok(())
}

#[test]
fn cli_rejects_foreign_file() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let bad_path = temp_dir.path().join("not_an_archive.bin");
    let out_path = temp_dir.path().join("out.txt");
    std::fs::write(&bad_path,b"this is not an archive")?;

    let mut cmd = Command::cargo_bin("lzuf")?;
    cmd.arg("expand")
        .arg("-i").arg(&bad_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure();
    Ok(())
}

#[test]
fn cli_round_trip_empty_file() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let orig_path = temp_dir.path().join("empty.txt");
    let packed_path = temp_dir.path().join("empty.lzu");
    let unpacked_path = temp_dir.path().join("empty_out.txt");
    std::fs::write(&orig_path,b"")?;

    let mut cmd = Command::cargo_bin("lzuf")?;
    cmd.arg("compress")
        .arg("-i").arg(&orig_path)
        .arg("-o").arg(&packed_path)
        .assert()
        .success();

    let mut cmd = Command::cargo_bin("lzuf")?;
    cmd.arg("expand")
        .arg("-i").arg(&packed_path)
        .arg("-o").arg(&unpacked_path)
        .assert()
        .success();

    assert_eq!(std::fs::read(&packed_path)?.len(),8);
    assert_eq!(std::fs::read(&unpacked_path)?.len(),0);
    Ok(())
}
