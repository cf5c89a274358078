// Command Line Entry Point
// Key generation, hiding and revealing of RSA-encrypted messages in PNG images

use std::io::Write;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use log::{debug, info, LevelFilter};

use rsa_stego::rsa::random::entropy_seed;
use rsa_stego::rsa::serialize::pack_public_key;
use rsa_stego::rsa::{generate_seeded_keypair, RsaPrivateKey};
use rsa_stego::stego::{hide_message, reveal_message, Carrier};
use rsa_stego::util::{format_file_size, load_key, save_key, Progress};
use rsa_stego::{load_config, StegoConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file with key generation settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log per-step details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an RSA key pair and write both key files
    Keygen {
        #[command(flatten)]
        key: KeyArgs,

        /// Output path of the public key file
        #[arg(long)]
        public: PathBuf,

        /// Output path of the private key file
        #[arg(long)]
        private: PathBuf,
    },

    /// Encrypt a message under a new key pair and hide it in an image
    Hide {
        #[command(flatten)]
        key: KeyArgs,

        /// Carrier image (any format the decoder supports)
        #[arg(short, long)]
        image: PathBuf,

        /// Text to hide
        #[arg(short, long)]
        message: String,

        /// Output PNG
        #[arg(short, long, default_value = "output_image_with_message.png")]
        output: PathBuf,

        /// Where to write the private key needed to reveal the message
        #[arg(long, default_value = "private_key.pem")]
        private_key: PathBuf,
    },

    /// Recover and decrypt a hidden message
    Reveal {
        /// Image produced by `hide`
        #[arg(short, long)]
        image: PathBuf,

        /// Private key file written by `hide` or `keygen`
        #[arg(long)]
        private_key: PathBuf,
    },
}

#[derive(Args, Debug)]
struct KeyArgs {
    /// Modulus size in bits
    #[arg(short, long)]
    bits: Option<u32>,

    /// Seed of the deterministic generator
    #[arg(short, long, conflicts_with = "random_seed")]
    seed: Option<u64>,

    /// Draw the generator seed from the OS entropy pool
    #[arg(long)]
    random_seed: bool,
}

/// Initialize the logging system with timestamp, level, and message formatting.
///
/// `RUST_LOG` takes precedence over the level chosen here.
fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn resolve_config(path: Option<&PathBuf>, key: &KeyArgs) -> Result<StegoConfig> {
    let mut config = match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => StegoConfig::default(),
    };

    if let Some(bits) = key.bits {
        config = config.with_key_bits(bits);
    }
    if let Some(seed) = key.seed {
        config = config.with_seed(seed);
    }
    if key.random_seed {
        config = config.with_seed(entropy_seed());
    }

    config.validate()?;
    Ok(config)
}

fn log_progress(label: &'static str) -> impl FnMut(Progress) {
    let mut last_decile = 0;
    move |progress: Progress| {
        let decile = (progress.percent / 10.0) as u32;
        if decile > last_decile {
            last_decile = decile;
            debug!("{}: {:.0}%", label, progress.percent);
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Keygen {
            key,
            public,
            private,
        } => {
            let config = resolve_config(cli.config.as_ref(), &key)?;
            let keypair = generate_seeded_keypair(&config)?;
            let width = config.key_field_width;

            let public_key = &keypair.public_key;
            save_key(&public, &public_key.e, &public_key.n, width)
                .with_context(|| format!("Failed to write {}", public.display()))?;
            let private_key = &keypair.private_key;
            save_key(&private, &private_key.d, &private_key.n, width)
                .with_context(|| format!("Failed to write {}", private.display()))?;

            info!(
                "Wrote {}-bit key pair to {} and {}",
                keypair.bit_length(),
                public.display(),
                private.display()
            );
            println!("{}", hex::encode(pack_public_key(public_key, width)?));
        }
        Command::Hide {
            key,
            image,
            message,
            output,
            private_key,
        } => {
            let config = resolve_config(cli.config.as_ref(), &key)?;
            let carrier = Carrier::open(&image)
                .with_context(|| format!("Failed to open image {}", image.display()))?;
            let keypair = generate_seeded_keypair(&config)?;

            let stego = hide_message(
                &carrier,
                &message,
                &keypair.public_key,
                &mut log_progress("embedding"),
            )?;
            // Key first: an image without its key cannot be revealed
            let private = &keypair.private_key;
            save_key(&private_key, &private.d, &private.n, config.key_field_width)
                .with_context(|| format!("Failed to write {}", private_key.display()))?;

            stego
                .save_png(&output)
                .with_context(|| format!("Failed to write {}", output.display()))?;

            let size = std::fs::metadata(&output).map(|m| m.len()).unwrap_or(0);
            info!(
                "Wrote {} ({}) and private key {}",
                output.display(),
                format_file_size(size),
                private_key.display()
            );
        }
        Command::Reveal { image, private_key } => {
            let width = match cli.config.as_ref() {
                Some(path) => load_config(path)?.key_field_width,
                None => StegoConfig::default().key_field_width,
            };
            let (d, n) = load_key(&private_key, width)
                .with_context(|| format!("Failed to read key {}", private_key.display()))?;
            let carrier = Carrier::open(&image)
                .with_context(|| format!("Failed to open image {}", image.display()))?;

            let revealed = reveal_message(
                &carrier,
                &RsaPrivateKey::new(d, n),
                &mut log_progress("scanning"),
            )?;
            match revealed {
                Some(message) => println!("{}", message),
                None => {
                    eprintln!("No message found in image");
                    return Ok(false);
                }
            }
        }
    }

    Ok(true)
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
