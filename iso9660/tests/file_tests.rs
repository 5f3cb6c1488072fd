//! File reading tests

mod common;

use common::builder::IsoBuilder;
use iso9660::error::Iso9660Error;
use iso9660::file::read_file_prefix;
use iso9660::utils::sector::SectorReader;
use iso9660::{find_file, mount, read_file, read_file_vec};

#[test]
fn test_read_file_content() {
    let mut builder = IsoBuilder::new();
    builder.add_file("TEST.TXT", b"Hello ISO9660");
    let mut device = builder.build();

    let volume = mount(&mut device, 0).expect("mount");
    let file = find_file(&mut device, &volume, "/TEST.TXT").expect("find");

    let mut content = vec![0u8; file.size as usize];
    let read = read_file(&mut device, &volume, &file, &mut content).expect("read");

    assert_eq!(read, 13);
    assert_eq!(content, b"Hello ISO9660");
}

#[test]
fn test_read_file_crossing_sectors() {
    let expected: Vec<u8> = (0..5120).map(|i| (i % 256) as u8).collect();

    let mut builder = IsoBuilder::new();
    builder.add_file("/DATA/LARGE.DAT", &expected);
    let mut device = builder.build();

    let volume = mount(&mut device, 0).expect("mount");
    let file = find_file(&mut device, &volume, "/DATA/LARGE.DAT").expect("find");
    assert_eq!(file.size, 5120);

    let content = read_file_vec(&mut device, &volume, &file).expect("read");
    assert_eq!(content, expected);
}

#[test]
fn test_buffer_too_small() {
    let mut builder = IsoBuilder::new();
    builder.add_file("PARTIAL.DAT", &[0xAA; 2050]);
    let mut device = builder.build();

    let volume = mount(&mut device, 0).expect("mount");
    let file = find_file(&mut device, &volume, "/PARTIAL.DAT").expect("find");

    let mut content = vec![0u8; 2049];
    let result = read_file(&mut device, &volume, &file, &mut content);
    assert_eq!(result.unwrap_err(), Iso9660Error::ReadFailed);
}

#[test]
fn test_read_prefix() {
    let data: Vec<u8> = (0..6000).map(|i| (i % 251) as u8).collect();
    let mut builder = IsoBuilder::new();
    builder.add_file("/ISOLINUX/ISOLINUX.BIN", &data);
    let mut device = builder.build();

    let volume = mount(&mut device, 0).expect("mount");
    let file = find_file(&mut device, &volume, "/ISOLINUX/ISOLINUX.BIN").expect("find");

    let mut reader = SectorReader::new(&mut device, 0).expect("reader");
    let prefix = read_file_prefix(&mut reader, &file, 2500).expect("prefix");
    assert_eq!(prefix, &data[..2500]);

    let whole = read_file_prefix(&mut reader, &file, 1 << 20).expect("whole");
    assert_eq!(whole, data);
}

#[test]
fn test_extent_past_end_of_image() {
    let mut builder = IsoBuilder::new();
    builder.add_file("A.BIN", &[1; 100]);
    let mut device = builder.build();

    let volume = mount(&mut device, 0).expect("mount");
    let mut file = find_file(&mut device, &volume, "/A.BIN").expect("find");
    file.extent_lba = 10_000;

    let result = read_file_vec(&mut device, &volume, &file);
    assert_eq!(result.unwrap_err(), Iso9660Error::ExtentOutOfBounds);
}
