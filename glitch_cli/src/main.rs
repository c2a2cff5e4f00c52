use glitch_core::config::{BackupSettings, CampaignSettings, GlitchConfig};
use glitch_core::engine::Injector;
use glitch_core::fault::Fault;
use glitch_core::target::FileTarget;

use clap::{Parser, Subcommand};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(short, long, value_parser)]
    config_file: Option<PathBuf>,

    /// File whose bytes get corrupted in place.
    #[clap(value_parser)]
    filepath: PathBuf,

    /// Corrupt this byte instead of drawing random offsets.
    #[clap(short, long)]
    offset: Option<usize>,

    /// XOR bitmask for a targeted attack.
    #[clap(long)]
    pattern: Option<u8>,

    /// Number of random faults to inject.
    #[clap(short = 'n', long)]
    fault_count: Option<u32>,

    /// Seed for the fault generator, for reproducible campaigns.
    #[clap(short, long)]
    seed: Option<u64>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Back the file up beside itself, then flip bits in it.
    Attack,
    /// Discard the corrupted file and move the backup back into place.
    Restore,
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config_file {
        Some(config_path) => {
            info!("Loading configuration from specified path: {config_path:?}");
            GlitchConfig::load_from_file(config_path)?
        }
        None => {
            // No config file specified via CLI, load default
            let default_config_path = PathBuf::from("glitch.toml");
            if default_config_path.exists() {
                info!("No config file specified via CLI, loading default: {default_config_path:?}");
                GlitchConfig::load_from_file(&default_config_path)?
            } else {
                GlitchConfig::default()
            }
        }
    };

    let campaign = config.campaign.get_or_insert_with(Default::default);
    if let Some(fault_count) = cli.fault_count {
        campaign.fault_count = fault_count;
    }
    if let Some(seed) = cli.seed {
        campaign.seed = Some(seed);
    }
    if let Some(offset) = cli.offset {
        campaign.offset = Some(offset);
    }
    if let Some(pattern) = cli.pattern {
        campaign.pattern = Some(pattern);
    }
    let campaign = campaign.clone();
    let backup = config.backup.unwrap_or_default();

    match cli.command {
        Command::Attack => attack(&cli.filepath, &campaign, &backup),
        Command::Restore => restore(&cli.filepath, &backup),
    }
}

fn backup_filepath(filepath: &Path, backup: &BackupSettings) -> PathBuf {
    let mut path = filepath.to_path_buf();
    path.set_extension(&backup.extension);
    path
}

fn attack(
    filepath: &Path,
    campaign: &CampaignSettings,
    backup: &BackupSettings,
) -> Result<(), anyhow::Error> {
    let original = fs::read(filepath)?;
    info!(
        "Digest of {:?} before attack: {:x}",
        filepath,
        md5::compute(&original)
    );

    let backup_file = backup_filepath(filepath, backup);
    if backup_file.exists() {
        info!("Backup {backup_file:?} already exists, leaving it in place");
    } else {
        fs::copy(filepath, &backup_file)?;
        info!("Backed up {filepath:?} to {backup_file:?}");
    }

    let file = OpenOptions::new().read(true).write(true).open(filepath)?;
    let mut target = FileTarget::new(file);
    let mut injector = Injector::new();

    match campaign.offset {
        Some(offset) => {
            let pattern = campaign.pattern.unwrap_or(Fault::BIT0);
            let value = injector.attack(&mut target, Fault::with_pattern(offset, pattern))?;
            info!("Flipped {pattern:#010b} at offset {offset}, byte now reads {value:#04x}");
        }
        None => {
            let seed = campaign.seed.unwrap_or_else(|| rand::rng().random());
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            info!("Fault generator seeded with {seed}");

            for _ in 0..campaign.fault_count {
                injector.attack_random(&mut target, &mut rng)?;
            }
            for fault in injector.history() {
                info!("Flipped {:#010b} at offset {}", fault.pattern, fault.offset);
            }
        }
    }

    println!(
        "{} fault(s) injected into {:?}; the restore subcommand undoes them.",
        injector.history().len(),
        filepath
    );
    Ok(())
}

fn restore(filepath: &Path, backup: &BackupSettings) -> Result<(), anyhow::Error> {
    let backup_file = backup_filepath(filepath, backup);
    if !backup_file.exists() {
        return Err(anyhow::anyhow!(
            "No backup found at {:?}, nothing to restore",
            backup_file
        ));
    }

    fs::remove_file(filepath).ok();
    fs::rename(&backup_file, filepath)?;

    let restored = fs::read(filepath)?;
    info!(
        "Digest of {:?} after restore: {:x}",
        filepath,
        md5::compute(&restored)
    );
    println!("Restored {filepath:?} from {backup_file:?}.");
    Ok(())
}
