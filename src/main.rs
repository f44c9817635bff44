//! CLI entry point for `mimeattach`.
//!
//! Body parts come from JSON manifests (one part or an array of parts), as
//! produced by whatever MIME parser sits in front of this tool.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

use mimeattach::config::{Config, DecoderMode};
use mimeattach::message::{MessageContext, StandardMessage};
use mimeattach::model::part::load_manifest;
use mimeattach::Attachment;

#[derive(Parser)]
#[command(
    name = "mimeattach",
    version,
    about = "Decode, name and present email MIME attachments"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Override the configured attachment name decoder
    #[arg(long, global = true, value_enum)]
    decoder: Option<DecoderArg>,

    /// Override the configured default mask
    #[arg(long, global = true, env = "MIMEATTACH_MASK")]
    default_mask: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum DecoderArg {
    LegacyCharset,
    Generic,
}

impl From<DecoderArg> for DecoderMode {
    fn from(arg: DecoderArg) -> Self {
        match arg {
            DecoderArg::LegacyCharset => DecoderMode::LegacyCharset,
            DecoderArg::Generic => DecoderMode::Generic,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the decoded attributes of every part in a manifest
    Inspect {
        manifest: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Decode attachments and write them to a directory
    Save {
        manifest: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// File name to use instead of the resolved name (single-part manifests)
        #[arg(long)]
        filename: Option<String>,
    },
    /// Render attachments through a mask
    Render {
        manifest: PathBuf,
        /// Mask name; defaults to the attachment's default mask
        #[arg(long)]
        mask: Option<String>,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = mimeattach::config::load_config();
    if let Some(decoder) = cli.decoder {
        config.attachment.decoder_mode = decoder.into();
    }
    if let Some(mask) = cli.default_mask.clone() {
        config.attachment.default_mask = Some(mask);
    }

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    if config.attachment.decoder_mode == DecoderMode::LegacyCharset
        && !mimeattach::parser::header::legacy_charset_available()
    {
        tracing::warn!("Built without legacy-charset; using the generic name decoder");
    }

    let message: Arc<dyn MessageContext> =
        Arc::new(StandardMessage::new(config.attachment.clone()));

    match cli.command {
        Commands::Inspect { manifest, json } => cmd_inspect(&message, &manifest, json),
        Commands::Save {
            manifest,
            output,
            filename,
        } => cmd_save(&message, &manifest, &output, filename.as_deref()),
        Commands::Render { manifest, mask } => cmd_render(&message, &manifest, mask.as_deref()),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = mimeattach::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mimeattach.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Build every attachment described by a manifest.
fn load_attachments(
    message: &Arc<dyn MessageContext>,
    manifest: &Path,
) -> anyhow::Result<Vec<Attachment>> {
    if !manifest.exists() {
        anyhow::bail!("Manifest not found: {}", manifest.display());
    }
    let parts = load_manifest(manifest)?;
    let mut attachments = Vec::with_capacity(parts.len());
    for part in parts {
        attachments.push(Attachment::new(Arc::clone(message), part)?);
    }
    Ok(attachments)
}

fn cmd_inspect(
    message: &Arc<dyn MessageContext>,
    manifest: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let attachments = load_attachments(message, manifest)?;

    if json {
        let summaries: Vec<_> = attachments.iter().map(Attachment::summary).collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for a in &attachments {
        let s = a.summary();
        println!();
        println!("  Part {}", s.part_number);
        println!("  ─────────────────────────────────────");
        println!("  Name:          {}", s.name.as_deref().unwrap_or("-"));
        println!("  Content-Type:  {}", s.content_type);
        println!("  Sniffed type:  {}", s.mime_type);
        println!("  Extension:     {}", s.extension.as_deref().unwrap_or("-"));
        println!("  Disposition:   {}", s.disposition.as_deref().unwrap_or("-"));
        println!("  Content-ID:    {}", s.id.as_deref().unwrap_or("-"));
        println!(
            "  Size:          {} declared, {} decoded",
            humansize::format_size(s.size, humansize::DECIMAL),
            humansize::format_size(s.decoded_size, humansize::DECIMAL)
        );
        println!("  SHA-256:       {}", s.sha256);
        println!("  Mask:          {}", s.mask);
    }
    println!();
    Ok(())
}

fn cmd_save(
    message: &Arc<dyn MessageContext>,
    manifest: &Path,
    output: &Path,
    filename: Option<&str>,
) -> anyhow::Result<()> {
    let attachments = load_attachments(message, manifest)?;
    if filename.is_some() && attachments.len() > 1 {
        anyhow::bail!("--filename only applies to manifests with a single part");
    }

    std::fs::create_dir_all(output)?;
    let mut prefix = output.display().to_string();
    if !prefix.ends_with(MAIN_SEPARATOR) {
        prefix.push(MAIN_SEPARATOR);
    }

    let mut failed = 0usize;
    for a in &attachments {
        if a.save(&prefix, filename) {
            let written = a.save_filename(filename).unwrap_or_default();
            println!("  Saved part {} to {prefix}{written}", a.part_number());
        } else {
            failed += 1;
            eprintln!("  Could not save part {}", a.part_number());
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} attachment(s) not saved", attachments.len());
    }
    Ok(())
}

fn cmd_render(
    message: &Arc<dyn MessageContext>,
    manifest: &Path,
    mask: Option<&str>,
) -> anyhow::Result<()> {
    let attachments = load_attachments(message, manifest)?;
    for a in &attachments {
        let view = a.mask(mask)?;
        println!("{}", view.render());
    }
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mimeattach", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}
