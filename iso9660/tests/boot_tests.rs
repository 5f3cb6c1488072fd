//! Boot tests (El Torito)

mod common;

use common::builder::{IsoBuilder, LoadTarget};
use iso9660::boot::read_boot_catalog;
use iso9660::error::Iso9660Error;
use iso9660::utils::sector::SectorReader;
use iso9660::{find_boot_image, mount, BootMediaType, BootPlatform};

#[test]
fn test_find_boot_image() {
    let mut builder = IsoBuilder::new();
    builder
        .add_file("/ISOLINUX/ISOLINUX.BIN", &[0xFA; 3000])
        .add_boot_entry(0x00, true, LoadTarget::File("/ISOLINUX/ISOLINUX.BIN".into()));
    let (mut device, layout) = builder.build_with_layout();

    let volume = mount(&mut device, 0).expect("mount");
    let boot = find_boot_image(&mut device, &volume).expect("boot image");

    assert!(boot.bootable);
    assert_eq!(boot.platform, BootPlatform::X86);
    assert_eq!(boot.media_type, BootMediaType::NoEmulation);
    assert_eq!(boot.sector_count, 4);
    assert_eq!(boot.image_size(), 2048);
    assert_eq!(boot.load_rba, layout.lba("/ISOLINUX/ISOLINUX.BIN"));
}

#[test]
fn test_no_boot_catalog() {
    let mut device = IsoBuilder::new().build();
    let volume = mount(&mut device, 0).expect("mount");

    assert_eq!(
        find_boot_image(&mut device, &volume).unwrap_err(),
        Iso9660Error::NoBootCatalog
    );
}

#[test]
fn test_sections_enumerated() {
    let mut builder = IsoBuilder::new();
    builder
        .add_boot_entry(0x00, true, LoadTarget::Rba(100))
        .add_boot_entry(0xEF, true, LoadTarget::Rba(200))
        .add_boot_entry(0xEF, false, LoadTarget::Rba(300))
        .add_boot_entry(0x02, true, LoadTarget::Rba(400));
    let (mut device, layout) = builder.build_with_layout();

    let mut reader = SectorReader::new(&mut device, 0).expect("reader");
    let catalog = read_boot_catalog(&mut reader, layout.catalog_lba.unwrap()).expect("catalog");

    assert_eq!(catalog.validation.platform, BootPlatform::X86);
    assert_eq!(&catalog.validation.id_string[..13], b"MORPHEUS TEST");

    let summary: Vec<_> = catalog
        .entries
        .iter()
        .map(|e| (e.platform, e.bootable, e.load_rba))
        .collect();
    assert_eq!(
        summary,
        [
            (BootPlatform::X86, true, 100),
            (BootPlatform::Efi, true, 200),
            (BootPlatform::Efi, false, 300),
            (BootPlatform::Mac, true, 400),
        ]
    );
    assert_eq!(catalog.bootable_entries().count(), 3);
}

#[test]
fn test_non_bootable_default_falls_through() {
    let mut builder = IsoBuilder::new();
    builder
        .add_boot_entry(0x00, false, LoadTarget::Rba(100))
        .add_boot_entry(0xEF, true, LoadTarget::Rba(200));
    let mut device = builder.build();

    let volume = mount(&mut device, 0).expect("mount");
    let boot = find_boot_image(&mut device, &volume).expect("boot image");
    assert_eq!(boot.platform, BootPlatform::Efi);
    assert_eq!(boot.load_rba, 200);
}

#[test]
fn test_bad_checksum() {
    let mut builder = IsoBuilder::new();
    builder.add_boot_entry(0x00, true, LoadTarget::Rba(100));
    let (mut device, layout) = builder.build_with_layout();
    device.sector_mut(layout.catalog_lba.unwrap())[28] ^= 0xFF;

    let volume = mount(&mut device, 0).expect("mount");
    assert_eq!(
        find_boot_image(&mut device, &volume).unwrap_err(),
        Iso9660Error::ChecksumFailed
    );
}

#[test]
fn test_bad_key_bytes() {
    let mut builder = IsoBuilder::new();
    builder.add_boot_entry(0x00, true, LoadTarget::Rba(100));
    let (mut device, layout) = builder.build_with_layout();
    device.sector_mut(layout.catalog_lba.unwrap())[30] = 0;

    let volume = mount(&mut device, 0).expect("mount");
    assert_eq!(
        find_boot_image(&mut device, &volume).unwrap_err(),
        Iso9660Error::InvalidBootCatalog
    );
}

#[test]
fn test_bad_boot_indicator() {
    let mut builder = IsoBuilder::new();
    builder.add_boot_entry(0x00, true, LoadTarget::Rba(100));
    let (mut device, layout) = builder.build_with_layout();
    device.sector_mut(layout.catalog_lba.unwrap())[32] = 0x42;

    let volume = mount(&mut device, 0).expect("mount");
    assert_eq!(
        find_boot_image(&mut device, &volume).unwrap_err(),
        Iso9660Error::InvalidBootEntry
    );
}

#[test]
fn test_catalog_outside_image() {
    let mut builder = IsoBuilder::new();
    builder.add_boot_entry(0x00, true, LoadTarget::Rba(100));
    let mut device = builder.build();
    // repoint the boot record at a sector past the end
    device.sector_mut(17)[71..75].copy_from_slice(&50_000u32.to_le_bytes());

    let volume = mount(&mut device, 0).expect("mount");
    assert_eq!(volume.boot_catalog_lba, Some(50_000));
    assert_eq!(
        find_boot_image(&mut device, &volume).unwrap_err(),
        Iso9660Error::ExtentOutOfBounds
    );
}
