use std::fs;

use fxkit::legacy::parse_bundle;
use fxkit::test_utils::{BundleBuilder, PassRecord, TypeDef};
use fxkit::ParameterType;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn legacy_bundle() -> Vec<u8> {
    let mut b = BundleBuilder::new();
    let t = b.typedef(&TypeDef::scalar("Alpha", ParameterType::Float));
    let v = b.floats(&[0.5]);
    b.parameter(t, v, &[]);
    let t = b.typedef(&TypeDef::vector("Tint", 4).semantic("COLOR"));
    let v = b.floats(&[1.0, 0.0, 0.0, 1.0]);
    b.parameter(t, v, &[]);
    let blend = b.state(
        "AlphaBlendEnable",
        0,
        &TypeDef::scalar("", ParameterType::Bool),
        &[1],
    );
    b.technique(
        "Main",
        &[PassRecord {
            name: "P0".into(),
            annotations: Vec::new(),
            states: vec![blend],
        }],
    );
    b.build()
}

#[test]
fn convert_then_dump() {
    let dir = tempdir().unwrap();
    let in_path = dir.path().join("in.fxo");
    let out_path = dir.path().join("out.fxkc");
    let input = legacy_bundle();
    fs::write(&in_path, &input).unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("fxkit")
        .args(["convert", in_path.to_str().unwrap(), out_path.to_str().unwrap()])
        .assert()
        .success();

    let output = fs::read(&out_path).unwrap();
    assert_eq!(&output[..4], &fxkit::compact::MAGIC);
    assert_eq!(
        fxkit::compact::read_effect(&output).unwrap(),
        parse_bundle(&input).unwrap()
    );

    let dumped = assert_cmd::cargo::cargo_bin_cmd!("fxkit")
        .args(["dump", out_path.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(dumped).unwrap();
    assert!(text.contains("  Alpha Scalar Float 1x1 = [0.5]\n"), "{text}");
    assert!(text.contains("  Tint Vector Float 1x4 : COLOR"), "{text}");
    assert!(text.contains("AlphaBlendEnable[0] Constant"), "{text}");
}

#[test]
fn convert_does_not_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let in_path = dir.path().join("in.fxo");
    let out_path = dir.path().join("out.fxkc");
    fs::write(&in_path, legacy_bundle()).unwrap();
    fs::write(&out_path, b"keep").unwrap();

    assert_cmd::cargo::cargo_bin_cmd!("fxkit")
        .args(["convert", in_path.to_str().unwrap(), out_path.to_str().unwrap()])
        .assert()
        .failure();
    assert_eq!(fs::read(&out_path).unwrap(), b"keep");

    assert_cmd::cargo::cargo_bin_cmd!("fxkit")
        .args([
            "convert",
            "--force",
            in_path.to_str().unwrap(),
            out_path.to_str().unwrap(),
        ])
        .assert()
        .success();
    assert!(fs::read(&out_path).unwrap().starts_with(b"FXKC"));
}

#[test]
fn dump_reports_decode_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.fxo");
    fs::write(&path, [0u8; 8]).unwrap();

    let out = assert_cmd::cargo::cargo_bin_cmd!("fxkit")
        .args(["dump", path.to_str().unwrap()])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(out).unwrap();
    assert!(stderr.contains("decode"), "{stderr}");
}
