// Numan Thabit 2025
use std::fs;

use anyhow::Result;
use pdns_dashboards::{find_stale, generate_all, write_all};
use tempfile::tempdir;

#[test]
fn write_then_check_is_clean() -> Result<()> {
    let dir = tempdir()?;
    let out = dir.path().join("dashboards");
    let dashboards = generate_all("metronome")?;

    let written = write_all(&out, &dashboards)?;
    assert_eq!(written, vec![out.join("dnsdist.json")]);
    assert!(find_stale(&out, &dashboards)?.is_empty());
    Ok(())
}

#[test]
fn regenerating_is_byte_identical() -> Result<()> {
    let dir = tempdir()?;
    let dashboards = generate_all("metronome")?;

    write_all(dir.path(), &dashboards)?;
    let first = fs::read(dir.path().join("dnsdist.json"))?;
    write_all(dir.path(), &generate_all("metronome")?)?;
    let second = fs::read(dir.path().join("dnsdist.json"))?;
    assert_eq!(first, second);
    assert_eq!(first.last(), Some(&b'\n'));
    Ok(())
}

#[test]
fn check_reports_missing_and_edited_files() -> Result<()> {
    let dir = tempdir()?;
    let dashboards = generate_all("metronome")?;
    assert_eq!(
        find_stale(dir.path(), &dashboards)?,
        vec![dir.path().join("dnsdist.json")]
    );

    write_all(dir.path(), &dashboards)?;
    let other = generate_all("graphite")?;
    assert_eq!(
        find_stale(dir.path(), &other)?,
        vec![dir.path().join("dnsdist.json")]
    );
    Ok(())
}

#[test]
fn unwritable_target_is_an_error() -> Result<()> {
    let dir = tempdir()?;
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "file")?;

    let err = write_all(&blocker, &generate_all("metronome")?).unwrap_err();
    assert!(err.to_string().contains("not-a-dir"));
    Ok(())
}
