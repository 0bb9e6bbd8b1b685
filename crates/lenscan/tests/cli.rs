#![cfg(feature = "cli")]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use image::{GrayImage, Luma};
use lenscan::io::{ScanConfig, ScanReport};
use lenscan::ClassifierConfig;
use predicates::prelude::*;

fn write_frame(dir: &Path, name: &str, bright: Option<(u32, u32)>) -> PathBuf {
    let mut img = GrayImage::new(640, 480);
    if let Some((cx, cy)) = bright {
        for y in cy - 15..cy + 15 {
            for x in cx - 15..cx + 15 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
    }
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

fn lenscan() -> Command {
    Command::cargo_bin("lenscan").unwrap()
}

#[test]
fn analyze_writes_report_with_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let hot = write_frame(dir.path(), "hot.png", Some((100, 100)));
    let dark = write_frame(dir.path(), "dark.png", None);
    let out = dir.path().join("report.json");

    lenscan()
        .args(["analyze", "--display", "1080x1920", "--output"])
        .arg(&out)
        .arg(&hot)
        .arg(&dark)
        .assert()
        .success();

    let report = ScanReport::load_json(&out).unwrap();
    assert_eq!(report.frames.len(), 2);
    assert_eq!(report.detected_count(), 1);
    let hot = &report.frames[0];
    assert!(hot.result.detected);
    let overlay = hot.overlay.as_ref().unwrap();
    assert!(overlay.alert);
    assert!(overlay.marker.is_some());
    assert!(!report.frames[1].result.detected);
}

#[test]
fn analyze_prints_json_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let hot = write_frame(dir.path(), "hot.png", Some((320, 240)));

    lenscan()
        .arg("analyze")
        .arg(&hot)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"detected\": true"))
        .stdout(predicate::str::contains("cluster_centroid"));
}

#[test]
fn missing_image_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let hot = write_frame(dir.path(), "hot.png", Some((320, 240)));

    lenscan()
        .arg("analyze")
        .arg(&hot)
        .arg(dir.path().join("missing.png"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"error\""));
}

#[test]
fn config_file_selects_strategy_and_flags_override() {
    let dir = tempfile::tempdir().unwrap();
    let hot = write_frame(dir.path(), "hot.png", Some((320, 240)));
    let cfg_path = dir.path().join("scan.json");
    let out = dir.path().join("report.json");
    ScanConfig {
        images: vec![hot.display().to_string()],
        classifier: ClassifierConfig::BrightestPixel(Default::default()),
        display: None,
        output_path: Some(out.display().to_string()),
    }
    .write_json(&cfg_path)
    .unwrap();

    lenscan()
        .args(["analyze", "--step", "1", "--config"])
        .arg(&cfg_path)
        .assert()
        .success();

    let report = ScanReport::load_json(&out).unwrap();
    match report.classifier {
        ClassifierConfig::BrightestPixel(p) => assert_eq!(p.sample_step, 1),
        other => panic!("unexpected classifier {other:?}"),
    }
    assert!(report.frames[0].result.detected);
}

#[test]
fn invalid_arguments_fail() {
    lenscan()
        .args(["analyze", "--display", "wide"])
        .assert()
        .failure();

    lenscan()
        .args(["analyze", "--min-count", "0", "x.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ZeroClusterCount"));

    lenscan().arg("analyze").assert().failure();
}

#[test]
fn replay_prints_every_snapshot_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let hot = write_frame(dir.path(), "hot.png", Some((100, 100)));
    let dark = write_frame(dir.path(), "dark.png", None);

    let output = lenscan()
        .args(["replay", "--fps", "20", "--loops", "2"])
        .arg(&hot)
        .arg(&dark)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let (stats, snapshots) = lines.split_last().unwrap();
    assert_eq!(stats["submitted"], 4);

    let analyzed = stats["analyzed"].as_u64().unwrap();
    assert!(analyzed >= 1);
    assert_eq!(snapshots.len() as u64, analyzed);
    let sequences: Vec<u64> = snapshots
        .iter()
        .map(|s| s["sequence"].as_u64().unwrap())
        .collect();
    assert_eq!(sequences, (1..=analyzed).collect::<Vec<_>>());
    assert_eq!(snapshots[0]["result"]["detected"], true);
}
