//! Analyzer over real files

use iso9660::{analyze, analyze_image, AnalyzeLimits, BootloaderType};
use morpheus_installer::plan::{build_plan, PlanKind};
use morpheus_installer::{FileBlockIo, ResourceLocator, UnattendFlags};
use std::path::PathBuf;

fn temp_file(name: &str, data: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("morpheus-it-{}-{}", std::process::id(), name));
    std::fs::write(&path, data).unwrap();
    path
}

#[test]
fn test_blank_file_is_unknown() {
    let path = temp_file("blank", &vec![0u8; 40 * 2048]);
    let mut device = FileBlockIo::open(&path).unwrap();

    let set = analyze(&mut device).unwrap();
    assert!(set.contains(BootloaderType::Unknown));

    let report = analyze_image(&mut device, &AnalyzeLimits::default()).unwrap();
    assert!(!report.is_iso9660);
    let plan = build_plan(&report, &ResourceLocator::new("res"), UnattendFlags::DEFAULT);
    assert_eq!(plan.kind, PlanKind::RawWrite);
    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_short_file_is_unknown() {
    let path = temp_file("short", b"not an image");
    let mut device = FileBlockIo::open(&path).unwrap();
    assert!(analyze(&mut device).unwrap().is_empty());
    std::fs::remove_file(path).unwrap();
}

/// Set `MORPHEUS_TEST_ISO` to a real image to run
#[test]
#[ignore]
fn test_real_image() {
    let Ok(path) = std::env::var("MORPHEUS_TEST_ISO") else {
        return;
    };
    let mut device = FileBlockIo::open(path.as_ref()).unwrap();
    let report = analyze_image(&mut device, &AnalyzeLimits::default()).unwrap();
    assert!(report.is_iso9660);
    println!("{}: {}", path, report.bootloaders);
}
