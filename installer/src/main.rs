use anyhow::{bail, Context, Result};
use iso9660::{analyze_image, AnalyzeLimits, ImageReport};
use morpheus_installer::plan::build_plan;
use morpheus_installer::resources::ResourceLocator;
use morpheus_installer::sectors::{FilefragSource, SectorListFile, SectorSource};
use morpheus_installer::unattend::{self, UnattendFlags};
use morpheus_installer::{loader, FileBlockIo};
use morpheus_syslinux::{PatchOptions, DEFAULT_BOOT_SECTOR};
use std::fs;
use std::path::{Path, PathBuf};
use structopt::StructOpt;
use tracing::Level;

#[derive(StructOpt, Debug)]
#[structopt(name = "morpheus-installer", about = "Inspect boot images and prepare USB installs")]
struct Opt {
    /// More output (-v info, -vv debug, -vvv trace)
    #[structopt(short, long, parse(from_occurrences), global = true)]
    verbose: u8,

    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(StructOpt, Debug)]
enum Cmd {
    /// Classify the boot mechanisms of an image
    Analyze {
        #[structopt(parse(from_os_str))]
        image: PathBuf,
        /// Deepest directory level visited
        #[structopt(long, default_value = "8")]
        max_depth: usize,
        /// Directory entries visited before the walk stops
        #[structopt(long, default_value = "4096")]
        max_entries: usize,
        /// Bytes of each loader scanned for a version banner
        #[structopt(long, default_value = "65536")]
        probe_bytes: usize,
    },

    /// Show how an image would be installed
    Plan {
        #[structopt(parse(from_os_str))]
        image: PathBuf,
        /// Resource directory
        #[structopt(long, parse(from_os_str), default_value = "res")]
        resources: PathBuf,
        /// Answer file flags for Windows images
        #[structopt(long, default_value = "default", parse(try_from_str = unattend::parse_flags))]
        flags: UnattendFlags,
    },

    /// Write a patched copy of ldlinux.sys for its installed location
    Patch {
        /// Unpatched loader image
        #[structopt(long, parse(from_os_str))]
        loader: PathBuf,
        /// Installed loader whose sectors are looked up with filefrag
        #[structopt(long, parse(from_os_str))]
        installed: Option<PathBuf>,
        /// File listing the sectors instead
        #[structopt(long, parse(from_os_str))]
        sectors: Option<PathBuf>,
        /// Patched loader output; must be a regular file
        #[structopt(long, parse(from_os_str))]
        output: PathBuf,
        /// Boot sector to receive the first sector pointer
        #[structopt(long, parse(from_os_str))]
        boot_sector: Option<PathBuf>,
        /// Patched boot sector output
        #[structopt(long, parse(from_os_str))]
        boot_sector_output: Option<PathBuf>,
        /// Fall back to the next boot device on failure
        #[structopt(long)]
        raid: bool,
        /// One sector per BIOS transfer
        #[structopt(long)]
        stupid: bool,
        /// Directory the loader is installed in
        #[structopt(long)]
        subdir: Option<String>,
        /// Btrfs subvolume holding the loader
        #[structopt(long)]
        subvol: Option<String>,
    },

    /// Generate a Windows answer file
    Unattend {
        /// Comma separated flags, e.g. default,set_user
        #[structopt(long, default_value = "default", parse(try_from_str = unattend::parse_flags))]
        flags: UnattendFlags,
        /// Local account to create with set_user
        #[structopt(long)]
        user: Option<String>,
        /// Processor architecture
        #[structopt(long, default_value = "amd64")]
        arch: String,
        /// Output file; stdout if absent
        #[structopt(long, parse(from_os_str))]
        output: Option<PathBuf>,
        /// Print the LabConfig registry commands instead
        #[structopt(long)]
        registry: bool,
    },

    /// Find a bundled resource or where to download it
    Resource {
        /// ldlinux.sys, ldlinux.bss, ldlinux.c32 or uefi-ntfs.img
        name: String,
        /// Resource directory
        #[structopt(long, parse(from_os_str), default_value = "res")]
        resources: PathBuf,
        /// SYSLINUX version, e.g. 6.04
        #[structopt(long = "syslinux-version")]
        version: Option<String>,
        /// Build extension, e.g. /2014-10-06
        #[structopt(long, default_value = "")]
        ext: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let opt = Opt::from_args();
    init_logging(opt.verbose);

    match opt.cmd {
        Cmd::Analyze {
            image,
            max_depth,
            max_entries,
            probe_bytes,
        } => {
            let limits = AnalyzeLimits::default()
                .walk(max_depth, max_entries)
                .version_probe(probe_bytes);
            let report = open_and_analyze(&image, &limits)?;
            print_report(&report);
        }

        Cmd::Plan {
            image,
            resources,
            flags,
        } => {
            let report = open_and_analyze(&image, &AnalyzeLimits::default())?;
            print_report(&report);

            let plan = build_plan(&report, &ResourceLocator::new(resources), flags);
            println!();
            println!("Plan: {}", plan.kind);
            for (i, step) in plan.steps.iter().enumerate() {
                println!("  {}. {}", i + 1, step);
            }
            if plan.missing_resources().next().is_some() {
                println!("Some resources must be downloaded first.");
            }
        }

        Cmd::Patch {
            loader: loader_path,
            installed,
            sectors,
            output,
            boot_sector,
            boot_sector_output,
            raid,
            stupid,
            subdir,
            subvol,
        } => {
            let content = fs::read(&loader_path)
                .with_context(|| format!("Failed to read {}", loader_path.display()))?;

            let (source, target): (Box<dyn SectorSource>, PathBuf) = match (sectors, installed) {
                (Some(list), installed) => (
                    Box::new(SectorListFile::new(list)),
                    installed.unwrap_or_else(|| loader_path.clone()),
                ),
                (None, Some(installed)) => (Box::new(FilefragSource::default()), installed),
                (None, None) => bail!("either --installed or --sectors is required"),
            };
            let sector_list = loader::sector_map(source.as_ref(), &target, content.len())
                .context("Failed to map loader sectors")?;

            let bss = match &boot_sector {
                Some(path) => Some(
                    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?,
                ),
                None => None,
            };
            if raid && bss.is_none() {
                tracing::warn!("--raid has no effect without --boot-sector");
            }

            let bss_name = boot_sector
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| DEFAULT_BOOT_SECTOR.to_string());
            let mut options = PatchOptions::default()
                .boot_sector(Some(&bss_name))
                .raid(raid)
                .stupid(stupid);
            if let Some(dir) = &subdir {
                options = options.subdir(dir);
            }
            if let Some(vol) = &subvol {
                options = options.subvol(vol);
            }

            let name = loader_path.display().to_string();
            let patched =
                loader::patch_loader(&name, &content, bss.as_deref(), &sector_list, &options)
                    .context("Failed to patch loader")?;

            write_regular(&output, &patched.loader)?;
            println!("Wrote {} ({} patches)", output.display(), patched.patches.len());

            match (patched.boot_sector, boot_sector_output) {
                (Some(bytes), Some(path)) => {
                    write_regular(&path, &bytes)?;
                    println!("Wrote {}", path.display());
                }
                (Some(_), None) => {
                    tracing::warn!("boot sector patched but no --boot-sector-output given")
                }
                _ => {}
            }
        }

        Cmd::Unattend {
            flags,
            user,
            arch,
            output,
            registry,
        } => {
            let text = if registry {
                unattend::bypass_registry_script()
            } else {
                unattend::generate_unattend_xml(flags, user.as_deref(), &arch)
            };
            match output {
                Some(path) => {
                    write_regular(&path, text.as_bytes())?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", text),
            }
        }

        Cmd::Resource {
            name,
            resources,
            version,
            ext,
        } => {
            let locator = ResourceLocator::new(resources);
            println!("{}", locator.locate(&name, version.as_deref(), &ext));
        }
    }

    Ok(())
}

fn open_and_analyze(image: &Path, limits: &AnalyzeLimits) -> Result<ImageReport> {
    tracing::info!("Analyzing {}", image.display());
    let mut device = FileBlockIo::open(image)
        .with_context(|| format!("Failed to open {}", image.display()))?;
    let report = analyze_image(&mut device, limits)
        .with_context(|| format!("Failed to analyze {}", image.display()))?;
    Ok(report)
}

fn print_report(report: &ImageReport) {
    println!("ISO9660:     {}", if report.is_iso9660 { "yes" } else { "no" });
    if !report.volume_label.is_empty() {
        println!("Label:       {}", report.volume_label);
    }
    println!("Bootloaders: {}", report.bootloaders);
    for entry in &report.boot_entries {
        println!(
            "  catalog:   {:?} {:?} rba={} sectors={}{}",
            entry.platform,
            entry.media_type,
            entry.load_rba,
            entry.sector_count,
            if entry.bootable { "" } else { " (not bootable)" }
        );
    }
    if let Some(version) = &report.syslinux_version {
        let from = report.syslinux_banner_path.as_deref().unwrap_or("?");
        println!("SYSLINUX:    {} ({})", version, from);
    }
    if report.walk.truncated {
        println!("Note: directory walk stopped after {} entries", report.walk.entries);
    }
}

/// Refuse anything that is not, or would not become, a regular file
fn write_regular(path: &Path, data: &[u8]) -> Result<()> {
    if let Ok(meta) = fs::metadata(path) {
        if !meta.file_type().is_file() {
            bail!("{} is not a regular file; refusing to write", path.display());
        }
    }
    fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))
}
