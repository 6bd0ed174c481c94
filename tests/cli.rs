use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

type StdResult = Result<(), Box<dyn std::error::Error>>;

fn wadkit() -> Command {
    Command::cargo_bin("wadkit").unwrap()
}

#[test]
fn insert_and_save_round_trips_through_wad_bytes() -> StdResult {
    let dir = tempdir()?;
    let script_path = dir.path().join("build.txt");
    let wad_path = dir.path().join("out.wad");

    fs::write(
        &script_path,
        format!(
            "insert 1 MAP01\ninsert 2 THINGS hello\nsave {}\n",
            wad_path.display()
        ),
    )?;

    wadkit()
        .arg(&script_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("<- saved"));

    let bytes = fs::read(&wad_path)?;
    assert_eq!(&bytes[0..4], b"PWAD");

    let reopen_script = dir.path().join("reopen.txt");
    fs::write(
        &reopen_script,
        format!("open {}\nlist\nfind THINGS\n", wad_path.display()),
    )?;
    wadkit()
        .arg(&reopen_script)
        .assert()
        .success()
        .stderr(predicate::str::contains("1 MAP01"))
        .stderr(predicate::str::contains("2 THINGS"))
        .stderr(predicate::str::contains("<- 2"));
    Ok(())
}

#[test]
fn find_reports_absent_for_missing_lump() -> StdResult {
    let dir = tempdir()?;
    let script_path = dir.path().join("script.txt");
    fs::write(&script_path, "insert 1 MAP01\nfind NOPE\n")?;

    wadkit()
        .arg(&script_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("<- absent"));
    Ok(())
}

#[test]
fn unknown_command_fails_and_reports_line_number() -> StdResult {
    let dir = tempdir()?;
    let script_path = dir.path().join("script.txt");
    fs::write(&script_path, "insert 1 MAP01\nfrobnicate\n")?;

    wadkit()
        .arg(&script_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
    Ok(())
}

#[test]
fn dash_argument_reads_script_from_stdin() -> StdResult {
    wadkit()
        .arg("-")
        .write_stdin("insert 1 MAP01 x\nlist\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("1 MAP01 (1 bytes)"));
    Ok(())
}

#[test]
fn unpack_and_pack_round_trip_reports_record_counts() -> StdResult {
    let dir = tempdir()?;
    let script_path = dir.path().join("script.txt");
    let wad_path = dir.path().join("map.wad");

    // Build a minimal 11-lump map run by hand, then round-trip it.
    fs::write(
        &script_path,
        format!(
            concat!(
                "insert 1 MAP01\n",
                "insert 2 THINGS\n",
                "insert 3 LINEDEFS\n",
                "insert 4 SIDEDEFS\n",
                "insert 5 VERTEXES\n",
                "insert 6 SEGS\n",
                "insert 7 SSECTORS\n",
                "insert 8 NODES\n",
                "insert 9 SECTORS\n",
                "insert 10 REJECT\n",
                "insert 11 BLOCKMAP\n",
                "unpack 1\n",
                "pack MAP01\n",
                "save {}\n",
            ),
            wad_path.display()
        ),
    )?;

    wadkit()
        .arg(&script_path)
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "things=0 linedefs=0 sidedefs=0 vertexes=0 sectors=0",
        ))
        .stderr(predicate::str::contains("packed 11 lumps"));

    let bytes = fs::read(&wad_path)?;
    assert_eq!(&bytes[0..4], b"PWAD");
    Ok(())
}
