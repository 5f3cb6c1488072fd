//! Synthetic ISO9660 images with nested directories and El Torito catalogs
//!
//! Layout: PVD at 16, optional boot record at 17, terminator, optional boot
//! catalog, then directory extents in preorder, then file data.

use crate::common::MemoryBlockDevice;
use std::collections::{BTreeMap, HashMap};

const SECTOR: usize = 2048;

#[derive(Default)]
struct Dir {
    children: BTreeMap<String, Node>,
}

enum Node {
    File(Vec<u8>),
    Dir(Dir),
}

/// What a catalog entry loads
pub enum LoadTarget {
    /// Fixed sector
    Rba(u32),
    /// Extent of a file added to the builder
    File(String),
}

struct BootEntry {
    platform: u8,
    bootable: bool,
    target: LoadTarget,
    sector_count: u16,
}

/// Where the builder put things
pub struct IsoLayout {
    pub catalog_lba: Option<u32>,
    pub total_sectors: u32,
    extents: HashMap<String, (u32, u32)>,
}

impl IsoLayout {
    /// Extent LBA of a file or directory
    pub fn lba(&self, path: &str) -> u32 {
        self.extents[&normalize(path)].0
    }
}

pub struct IsoBuilder {
    volume_id: String,
    root: Dir,
    boot_entries: Vec<BootEntry>,
}

fn normalize(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
    format!("/{}", parts.join("/"))
}

fn join(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

fn record_len(name_len: usize) -> usize {
    let len = 33 + name_len;
    len + len % 2
}

fn identifier(name: &str, node: &Node) -> String {
    match node {
        Node::File(_) => format!("{};1", name),
        Node::Dir(_) => name.to_string(),
    }
}

fn dir_sectors(dir: &Dir) -> u32 {
    let mut sectors = 1;
    let mut used = 2 * record_len(1);
    for (name, node) in &dir.children {
        let len = record_len(identifier(name, node).len());
        if used + len > SECTOR {
            sectors += 1;
            used = 0;
        }
        used += len;
    }
    sectors
}

fn write_both_endian_u32(dst: &mut [u8], value: u32) {
    dst[0..4].copy_from_slice(&value.to_le_bytes());
    dst[4..8].copy_from_slice(&value.to_be_bytes());
}

fn write_both_endian_u16(dst: &mut [u8], value: u16) {
    dst[0..2].copy_from_slice(&value.to_le_bytes());
    dst[2..4].copy_from_slice(&value.to_be_bytes());
}

fn write_record(data: &mut [u8], cursor: &mut usize, lba: u32, size: u32, flags: u8, name: &[u8]) {
    let len = record_len(name.len());
    if *cursor % SECTOR + len > SECTOR {
        *cursor = (*cursor / SECTOR + 1) * SECTOR;
    }

    let start = *cursor;
    data[start] = len as u8;
    write_both_endian_u32(&mut data[start + 2..], lba);
    write_both_endian_u32(&mut data[start + 10..], size);
    data[start + 25] = flags;
    data[start + 28] = 1; // volume sequence number
    data[start + 32] = name.len() as u8;
    data[start + 33..start + 33 + name.len()].copy_from_slice(name);

    *cursor += len;
}

impl IsoBuilder {
    pub fn new() -> Self {
        Self {
            volume_id: "TEST VOLUME".to_string(),
            root: Dir::default(),
            boot_entries: Vec::new(),
        }
    }

    pub fn volume_id(&mut self, id: &str) -> &mut Self {
        self.volume_id = id.to_string();
        self
    }

    fn dir_mut(&mut self, components: &[&str]) -> &mut Dir {
        let mut dir = &mut self.root;
        for component in components {
            dir = match dir
                .children
                .entry(component.to_string())
                .or_insert_with(|| Node::Dir(Dir::default()))
            {
                Node::Dir(d) => d,
                Node::File(_) => panic!("{} is a file", component),
            };
        }
        dir
    }

    /// Add a directory, creating parents
    pub fn add_dir(&mut self, path: &str) -> &mut Self {
        let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        self.dir_mut(&components);
        self
    }

    /// Add a file, creating parent directories
    pub fn add_file(&mut self, path: &str, content: &[u8]) -> &mut Self {
        let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        let (name, parents) = components.split_last().expect("non-empty path");
        self.dir_mut(parents)
            .children
            .insert(name.to_string(), Node::File(content.to_vec()));
        self
    }

    /// Add a catalog entry; the first one becomes the initial/default entry
    pub fn add_boot_entry(&mut self, platform: u8, bootable: bool, target: LoadTarget) -> &mut Self {
        self.boot_entries.push(BootEntry {
            platform,
            bootable,
            target,
            sector_count: 4,
        });
        self
    }

    pub fn build(self) -> MemoryBlockDevice {
        self.build_with_layout().0
    }

    pub fn build_with_layout(self) -> (MemoryBlockDevice, IsoLayout) {
        let has_boot = !self.boot_entries.is_empty();
        let terminator = if has_boot { 18 } else { 17 };
        let catalog_lba = has_boot.then_some(terminator + 1);
        let mut next = terminator + 1 + has_boot as u32;

        let mut extents = HashMap::new();
        assign_dirs(&self.root, "/", &mut next, &mut extents);
        assign_files(&self.root, "/", &mut next, &mut extents);
        let total = next + 1;

        let mut data = vec![0u8; total as usize * SECTOR];

        // Primary volume descriptor
        let pvd = 16 * SECTOR;
        data[pvd] = 1;
        data[pvd + 1..pvd + 6].copy_from_slice(b"CD001");
        data[pvd + 6] = 1;
        data[pvd + 40..pvd + 72].fill(b' ');
        let id = self.volume_id.as_bytes();
        data[pvd + 40..pvd + 40 + id.len()].copy_from_slice(id);
        write_both_endian_u32(&mut data[pvd + 80..], total);
        write_both_endian_u16(&mut data[pvd + 128..], SECTOR as u16);
        let (root_lba, root_len) = extents["/"];
        let mut cursor = pvd + 156;
        write_record(&mut data, &mut cursor, root_lba, root_len, 0x02, &[0]);

        // Boot record
        if let Some(catalog) = catalog_lba {
            let br = 17 * SECTOR;
            data[br + 1..br + 6].copy_from_slice(b"CD001");
            data[br + 6] = 1;
            data[br + 7..br + 30].copy_from_slice(b"EL TORITO SPECIFICATION");
            data[br + 71..br + 75].copy_from_slice(&catalog.to_le_bytes());
        }

        // Terminator
        let term = terminator as usize * SECTOR;
        data[term] = 255;
        data[term + 1..term + 6].copy_from_slice(b"CD001");
        data[term + 6] = 1;

        if let Some(catalog) = catalog_lba {
            let start = catalog as usize * SECTOR;
            write_catalog(&mut data[start..start + SECTOR], &self.boot_entries, &extents);
        }

        write_dirs(&self.root, "/", "/", &mut data, &extents);

        let layout = IsoLayout {
            catalog_lba,
            total_sectors: total,
            extents,
        };
        (MemoryBlockDevice::new(data), layout)
    }
}

fn assign_dirs(dir: &Dir, path: &str, next: &mut u32, extents: &mut HashMap<String, (u32, u32)>) {
    let sectors = dir_sectors(dir);
    extents.insert(path.to_string(), (*next, sectors * SECTOR as u32));
    *next += sectors;

    for (name, node) in &dir.children {
        if let Node::Dir(child) = node {
            assign_dirs(child, &join(path, name), next, extents);
        }
    }
}

fn assign_files(dir: &Dir, path: &str, next: &mut u32, extents: &mut HashMap<String, (u32, u32)>) {
    for (name, node) in &dir.children {
        match node {
            Node::File(content) => {
                extents.insert(join(path, name), (*next, content.len() as u32));
                *next += (content.len().div_ceil(SECTOR)).max(1) as u32;
            }
            Node::Dir(child) => assign_files(child, &join(path, name), next, extents),
        }
    }
}

fn write_dirs(
    dir: &Dir,
    path: &str,
    parent: &str,
    data: &mut [u8],
    extents: &HashMap<String, (u32, u32)>,
) {
    let (lba, len) = extents[path];
    let (parent_lba, parent_len) = extents[parent];

    let mut cursor = lba as usize * SECTOR;
    write_record(data, &mut cursor, lba, len, 0x02, &[0]);
    write_record(data, &mut cursor, parent_lba, parent_len, 0x02, &[1]);

    for (name, node) in &dir.children {
        let child = join(path, name);
        let (child_lba, child_len) = extents[&child];
        let flags = match node {
            Node::Dir(_) => 0x02,
            Node::File(_) => 0x00,
        };
        write_record(
            data,
            &mut cursor,
            child_lba,
            child_len,
            flags,
            identifier(name, node).as_bytes(),
        );

        match node {
            Node::File(content) => {
                let start = child_lba as usize * SECTOR;
                data[start..start + content.len()].copy_from_slice(content);
            }
            Node::Dir(sub) => write_dirs(sub, &child, path, data, extents),
        }
    }
}

fn write_entry(dst: &mut [u8], entry: &BootEntry, extents: &HashMap<String, (u32, u32)>) {
    let rba = match &entry.target {
        LoadTarget::Rba(rba) => *rba,
        LoadTarget::File(path) => extents[&normalize(path)].0,
    };
    dst[0] = if entry.bootable { 0x88 } else { 0x00 };
    dst[6..8].copy_from_slice(&entry.sector_count.to_le_bytes());
    dst[8..12].copy_from_slice(&rba.to_le_bytes());
}

fn write_catalog(sector: &mut [u8], entries: &[BootEntry], extents: &HashMap<String, (u32, u32)>) {
    sector[0] = 0x01;
    sector[1] = entries[0].platform;
    sector[4..17].copy_from_slice(b"MORPHEUS TEST");
    sector[30] = 0x55;
    sector[31] = 0xAA;
    let sum = sector[..32]
        .chunks(2)
        .fold(0u16, |acc, w| acc.wrapping_add(u16::from_le_bytes([w[0], w[1]])));
    sector[28..30].copy_from_slice(&0u16.wrapping_sub(sum).to_le_bytes());

    write_entry(&mut sector[32..64], &entries[0], extents);

    // one section per run of equal platforms
    let mut groups: Vec<&[BootEntry]> = Vec::new();
    let rest = &entries[1..];
    let mut start = 0;
    for i in 1..=rest.len() {
        if i == rest.len() || rest[i].platform != rest[start].platform {
            groups.push(&rest[start..i]);
            start = i;
        }
    }

    let mut offset = 64;
    for (g, group) in groups.iter().enumerate() {
        sector[offset] = if g + 1 == groups.len() { 0x91 } else { 0x90 };
        sector[offset + 1] = group[0].platform;
        sector[offset + 2..offset + 4].copy_from_slice(&(group.len() as u16).to_le_bytes());
        offset += 32;
        for entry in *group {
            write_entry(&mut sector[offset..offset + 32], entry, extents);
            offset += 32;
        }
    }
}
