//! bwire: BlockWire transport CLI
//!
//! Commands:
//!   keygen [--out <file>]    - generate a key file (256-bit key + initial IV)
//!   seal --keyfile <file>    - encrypt stdin (or --input) to stdout (or --output)
//!   open --keyfile <file>    - decrypt stdin (or --input) to stdout (or --output)
//!
//! The key file is TOML with hex-encoded material. Both ends of a channel
//! must use the same file; treat it like any other secret.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::info;

use bwire_cipher::{generate_iv, generate_stream_key, Aes256CbcEngine, StreamKey, AES_BLOCK_SIZE};
use bwire_stream::{DecryptingReader, EncryptingWriter, StreamConfig};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "bwire",
    version,
    about = "BlockWire streaming encryption transport",
    long_about = "bwire: seal and open byte streams with AES-256-CBC rolling-IV framing"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "BWIRE_LOG", default_value = "warn")]
    log: String,

    /// Log format (json, text)
    #[arg(long, env = "BWIRE_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a new key file with a random key and initial IV
    Keygen {
        /// Destination path; prints to stdout when omitted
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Encrypt a byte stream
    Seal {
        /// Key file produced by `bwire keygen`
        #[arg(long, short = 'k', env = "BWIRE_KEYFILE")]
        keyfile: PathBuf,
        /// Input path (default: stdin)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
        /// Output path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Frame capacity in plaintext blocks (1..=126)
        #[arg(long, default_value_t = StreamConfig::default().blocks_per_frame)]
        frame_blocks: usize,
    },

    /// Decrypt a byte stream
    Open {
        /// Key file produced by `bwire keygen`
        #[arg(long, short = 'k', env = "BWIRE_KEYFILE")]
        keyfile: PathBuf,
        /// Input path (default: stdin)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
        /// Output path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

// ── Key file ───────────────────────────────────────────────────────────────────

/// On-disk key material, shared out-of-band between the two ends.
#[derive(Debug, Serialize, Deserialize)]
struct KeyFile {
    /// 256-bit key, hex
    key: String,
    /// Initial IV, one cipher block, hex
    iv: String,
}

impl KeyFile {
    fn generate() -> Self {
        Self {
            key: generate_stream_key().to_hex(),
            iv: hex::encode(generate_iv(AES_BLOCK_SIZE)),
        }
    }

    fn load(path: &Path) -> Result<(StreamKey, Vec<u8>)> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading key file {}: {e}", path.display()))?;
        let parsed: KeyFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("parsing key file {}: {e}", path.display()))?;

        let key = StreamKey::from_hex(&parsed.key)
            .map_err(|e| anyhow::anyhow!("key field in {}: {e}", path.display()))?;
        let iv = hex::decode(parsed.iv.trim())
            .map_err(|e| anyhow::anyhow!("iv field in {}: {e}", path.display()))?;
        if iv.len() != AES_BLOCK_SIZE {
            anyhow::bail!(
                "iv field in {} is {} bytes, expected {}",
                path.display(),
                iv.len(),
                AES_BLOCK_SIZE
            );
        }
        Ok((key, iv))
    }
}

// ── Entry point ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log, &cli.log_format);

    match cli.command {
        Commands::Keygen { out } => keygen(out.as_deref()),
        Commands::Seal {
            keyfile,
            input,
            output,
            frame_blocks,
        } => seal(&keyfile, input.as_deref(), output.as_deref(), frame_blocks),
        Commands::Open {
            keyfile,
            input,
            output,
        } => open(&keyfile, input.as_deref(), output.as_deref()),
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries stream data; logs go to stderr
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(io::stderr))
                .init();
        }
    }
}

// ── Commands ───────────────────────────────────────────────────────────────────

fn keygen(out: Option<&Path>) -> Result<()> {
    let rendered = toml::to_string(&KeyFile::generate()).context("serializing key file")?;

    match out {
        None => {
            print!("{rendered}");
            Ok(())
        }
        Some(path) => {
            if path.exists() {
                anyhow::bail!(
                    "refusing to overwrite existing key file {}",
                    path.display()
                );
            }
            fs::write(path, &rendered)
                .map_err(|e| anyhow::anyhow!("writing key file {}: {e}", path.display()))?;
            restrict_permissions(path)?;
            info!(path = %path.display(), "key file written");
            Ok(())
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| anyhow::anyhow!("restricting key file mode {}: {e}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

fn seal(
    keyfile: &Path,
    input: Option<&Path>,
    output: Option<&Path>,
    frame_blocks: usize,
) -> Result<()> {
    let (key, iv) = KeyFile::load(keyfile)?;
    let engine = Aes256CbcEngine::new(key);
    let config = StreamConfig {
        blocks_per_frame: frame_blocks,
    };

    let mut source = open_input(input)?;
    let sink = open_output(output)?;

    let mut writer = EncryptingWriter::new(sink, engine, &iv, config)
        .context("constructing the encrypting writer")?;
    let bytes = io::copy(&mut source, &mut writer).context("sealing stream")?;
    let mut sink = writer.finish().context("flushing final frame")?;
    sink.flush()?;

    info!(bytes, frame_blocks, "stream sealed");
    Ok(())
}

fn open(keyfile: &Path, input: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let (key, iv) = KeyFile::load(keyfile)?;
    let engine = Aes256CbcEngine::new(key);

    let source = open_input(input)?;
    let mut sink = open_output(output)?;

    let mut reader =
        DecryptingReader::new(source, engine, &iv).context("constructing the decrypting reader")?;
    let bytes = io::copy(&mut reader, &mut sink).context("opening stream")?;
    sink.flush()?;

    info!(bytes, "stream opened");
    Ok(())
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    Ok(match path {
        Some(p) => Box::new(
            fs::File::open(p).map_err(|e| anyhow::anyhow!("opening input {}: {e}", p.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    })
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(
            fs::File::create(p)
                .map_err(|e| anyhow::anyhow!("creating output {}: {e}", p.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyfile_generate_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.key");

        let generated = KeyFile::generate();
        fs::write(&path, toml::to_string(&generated).unwrap()).unwrap();

        let (key, iv) = KeyFile::load(&path).unwrap();
        assert_eq!(key.to_hex(), generated.key);
        assert_eq!(hex::encode(&iv), generated.iv);
        assert_eq!(iv.len(), AES_BLOCK_SIZE);
    }

    #[test]
    fn test_keyfile_rejects_short_iv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.key");
        fs::write(
            &path,
            format!("key = \"{}\"\niv = \"deadbeef\"\n", "00".repeat(32)),
        )
        .unwrap();

        let err = KeyFile::load(&path).unwrap_err();
        assert!(err.to_string().contains("expected 16"), "{err}");
    }

    #[test]
    fn test_keyfile_rejects_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.key");
        fs::write(&path, "").unwrap();

        assert!(KeyFile::load(&path).is_err());
    }

    #[test]
    fn test_seal_open_file_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let keyfile = dir.path().join("stream.key");
        let plain_in = dir.path().join("plain.in");
        let sealed = dir.path().join("sealed.bwx");
        let plain_out = dir.path().join("plain.out");

        keygen(Some(keyfile.as_path())).unwrap();
        fs::write(&plain_in, b"pipe me through the transport").unwrap();

        seal(
            &keyfile,
            Some(plain_in.as_path()),
            Some(sealed.as_path()),
            64,
        )
        .unwrap();
        assert_ne!(fs::read(&sealed).unwrap(), fs::read(&plain_in).unwrap());

        open(&keyfile, Some(sealed.as_path()), Some(plain_out.as_path())).unwrap();
        assert_eq!(
            fs::read(&plain_out).unwrap(),
            b"pipe me through the transport"
        );
    }

    #[test]
    fn test_keygen_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let keyfile = dir.path().join("stream.key");

        keygen(Some(keyfile.as_path())).unwrap();
        let err = keygen(Some(keyfile.as_path())).unwrap_err();
        assert!(err.to_string().contains("refusing to overwrite"), "{err}");
    }
}
