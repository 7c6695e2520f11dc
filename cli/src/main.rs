use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use vfat_core::{BlockDevice, VolumeConfig, BLOCK_SIZE};
use vfat_filesystems::{FatAttributes, FatDirEntry, VfatEngine, MAX_FILE_SLOTS};

#[derive(Parser)]
#[command(name = "vfat")]
#[command(about = "Virtual FAT16 volume with streamed write handlers", long_about = None)]
struct Cli {
    /// Volume configuration (JSON). Defaults to an empty 4 MiB volume.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the volume layout and published files
    Info,
    /// Write the synthesized volume to a raw image file
    Image {
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Hex dump a single block
    DumpBlock {
        block: u32,
    },
    /// Copy a file onto the volume as a host would and capture what the
    /// write handler receives
    Stream {
        /// File to copy onto the volume
        #[arg(short, long)]
        input: PathBuf,
        /// Where the streamed payload is written
        #[arg(short, long)]
        output: PathBuf,
        /// Extension the file is copied under
        #[arg(short, long, default_value = "BIN")]
        ext: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => VolumeConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => VolumeConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            let engine = VfatEngine::from_config(&config)?;
            print_info(&engine, &config.write_extensions);
        }
        Commands::Image { output } => {
            let engine = VfatEngine::from_config(&config)?;
            write_image(&engine, &output)?;
            println!(
                "Wrote {} blocks to {}",
                engine.capacity_blocks(),
                output.display()
            );
        }
        Commands::DumpBlock { block } => {
            let engine = VfatEngine::from_config(&config)?;
            let mut buf = vec![0u8; BLOCK_SIZE];
            engine.read(&mut buf, block, 1)?;
            println!("Block {} ({:?})", block, engine.geometry().classify(block));
            for (i, row) in buf.chunks(16).enumerate() {
                println!("{:04x}: {}", i * 16, hex::encode(row));
            }
        }
        Commands::Stream { input, output, ext } => {
            let mut engine = VfatEngine::from_config(&config)?;
            stream_file(&mut engine, &input, &output, &ext)?;
        }
    }

    Ok(())
}

fn print_info(engine: &VfatEngine, write_extensions: &[String]) {
    let geometry = engine.geometry();
    println!("Volume label:     {}", String::from_utf8_lossy(engine.volume_label()).trim_end());
    println!("Capacity:         {} blocks ({} bytes)", engine.capacity_blocks(), engine.capacity_blocks() as u64 * BLOCK_SIZE as u64);
    println!("Sectors per FAT:  {}", geometry.sectors_per_fat());
    println!("FAT copies at:    {}, {}", geometry.fat_start(0), geometry.fat_start(1));
    println!("Root directory:   {}", geometry.root_dir_start());
    println!("Data region:      {} ({} blocks)", geometry.data_start(), geometry.data_blocks());

    if engine.read_files().is_empty() {
        println!("\nNo published files.");
    } else {
        println!("\nPublished files:");
        for (i, file) in engine.read_files().iter().enumerate() {
            println!("  {:<12} {:>4} bytes  cluster {}", file.display_name(), file.size(), i + 2);
        }
    }

    if !write_extensions.is_empty() {
        println!("\nStreamed extensions: {}", write_extensions.join(", "));
    }
}

fn write_image(engine: &VfatEngine, output: &Path) -> anyhow::Result<()> {
    let file = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);

    const BURST: u32 = 64;
    let mut buf = vec![0u8; BURST as usize * BLOCK_SIZE];
    let mut block = 0u32;
    while block < engine.capacity_blocks() {
        let count = BURST.min(engine.capacity_blocks() - block);
        let len = count as usize * BLOCK_SIZE;
        engine.read(&mut buf[..len], block, count as u16)?;
        writer.write_all(&buf[..len])?;
        block += count;
    }
    writer.flush()?;
    Ok(())
}

fn stream_file(engine: &mut VfatEngine, input: &Path, output: &Path, ext: &str) -> anyhow::Result<()> {
    let payload = std::fs::read(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    if payload.is_empty() {
        bail!("{} is empty, hosts never announce zero-length files", input.display());
    }

    let slot = engine.read_files().len();
    if slot >= MAX_FILE_SLOTS {
        bail!("root directory has no free slot for a streamed file");
    }

    let sink = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut sink = BufWriter::new(sink);
    engine.register_write_handler(ext, move |data: &[u8], offset: u32, remaining: u32| -> anyhow::Result<()> {
        let take = (remaining as usize).min(data.len());
        sink.write_all(&data[..take])?;
        if remaining as usize <= data.len() {
            sink.flush()?;
        }
        info!("Block {}: {} bytes, {} remaining", offset, take, remaining as usize - take);
        Ok(())
    })?;

    let geometry = *engine.geometry();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_default();
    let mut name = [b' '; 8];
    for (dst, src) in name.iter_mut().zip(stem.bytes().filter(u8::is_ascii_alphanumeric)) {
        *dst = src;
    }
    if name[0] == b' ' {
        name[..6].copy_from_slice(b"STREAM");
    }
    let mut ext_bytes = [b' '; 3];
    for (dst, src) in ext_bytes.iter_mut().zip(ext.to_uppercase().bytes()) {
        *dst = src;
    }

    // Directory flush as the host would issue it after creating the file
    let mut dir = vec![0u8; BLOCK_SIZE];
    engine.read(&mut dir, geometry.root_dir_start(), 1)?;
    let cluster = 2 + slot as u16;
    let entry = FatDirEntry {
        name,
        ext: ext_bytes,
        attributes: FatAttributes::ARCHIVE,
        first_cluster_low: cluster,
        file_size: payload.len() as u32,
        ..FatDirEntry::default()
    };
    entry.write_to(&mut dir[(slot + 1) * 32..(slot + 2) * 32]);
    engine.write(&dir, geometry.root_dir_start(), 1)?;

    if engine.active_session().is_none() {
        bail!("no write session started for *.{}", ext.to_uppercase());
    }

    let first_block = geometry.data_start() + cluster as u32 - 2;
    let mut block = vec![0u8; BLOCK_SIZE];
    for (i, chunk) in payload.chunks(BLOCK_SIZE).enumerate() {
        block.fill(0);
        block[..chunk.len()].copy_from_slice(chunk);
        if let Err(e) = engine.write(&block, first_block + i as u32, 1) {
            warn!("Stream aborted: {}", e);
            engine.cancel_active_session();
            return Err(e.into());
        }
    }

    println!(
        "Streamed {} bytes from {} to {}",
        payload.len(),
        input.display(),
        output.display()
    );
    Ok(())
}
