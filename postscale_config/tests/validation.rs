use postscale_config::{OutputMode, load_file, load_toml};
use rstest::rstest;
use std::fs;
use tempfile::tempdir;

#[rstest]
#[case("[device]\nvendor_id = 0\n", "device.vendor_id must be non-zero")]
#[case("[device]\nread_timeout_ms = 0\n", "device.read_timeout_ms must be >= 1")]
#[case("[poll]\ninterval_ms = 0\n", "poll.interval_ms must be >= 1")]
#[case("[poll]\ninterval_ms = 90000000\n", "unreasonably large")]
#[case("[poll]\ncount = 0\n", "poll.count must be >= 1")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation must be one of")]
fn rejects_out_of_range(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(needle),
        "expected {needle:?} in {err}"
    );
}

#[test]
fn accepts_full_config() {
    let toml = r#"
[device]
vendor_id = 0x0922
read_timeout_ms = 250

[poll]
mode = "parsed"
interval_ms = 500
count = 10

[logging]
file = "scale.log"
level = "debug"
rotation = "hourly"
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.poll.mode, OutputMode::Parsed);
    assert_eq!(cfg.poll.count, Some(10));
    assert_eq!(cfg.device.read_timeout_ms, 250);
}

#[test]
fn load_file_validates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    fs::write(&path, "[poll]\ninterval_ms = 0\n").unwrap();
    let err = load_file(&path).expect_err("invalid interval");
    assert!(err.to_string().contains("poll.interval_ms"));
}

#[test]
fn load_file_reports_missing_path() {
    let dir = tempdir().unwrap();
    let err = load_file(&dir.path().join("absent.toml")).expect_err("missing file");
    assert!(err.to_string().contains("read config"));
}

#[test]
fn load_file_reports_parse_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    fs::write(&path, "[poll]\nmode = \"stones\"\n").unwrap();
    let err = load_file(&path).expect_err("bad mode");
    assert!(err.to_string().contains("invalid configuration"));
}
