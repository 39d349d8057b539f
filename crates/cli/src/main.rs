use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use regmap::commands;
use simple_logger::SimpleLogger;

/// Register-map extraction pipeline CLI.
///
/// This CLI is a thin wrapper around `regmap-core` (exposed in code as
/// `regmap_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "regmap",
    version,
    about = "Register-map extraction pipeline for microcontroller chip descriptions",
    long_about = None
)]
struct Cli {
    /// Enable debug logging (skipped peripherals, override reconciliation,
    /// per-page miner diagnostics).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full extraction: load the chip description, mine the manual,
    /// flatten, and replace the register database contents.
    Extract {
        /// Path to the chip-description document (SVD-style XML).
        #[arg(long)]
        svd: Option<String>,

        /// Path to the reference manual (PDF) to mine base addresses from.
        #[arg(long)]
        manual: Option<String>,

        /// Path to the destination register database.
        #[arg(long)]
        db: Option<String>,

        /// YAML job file providing any of the other flags; flags win.
        #[arg(long)]
        config: Option<String>,

        /// Pre-extracted manual text to scan instead of reading the PDF.
        #[arg(long)]
        text_dump: Option<String>,

        /// Pages with fewer embedded-text characters than this go through OCR.
        #[arg(long)]
        min_embedded_chars: Option<usize>,

        /// Rasterization resolution for the OCR fallback.
        #[arg(long)]
        ocr_dpi: Option<u32>,

        /// Emit the run report as JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Mine base-address overrides from a reference manual and print them.
    ///
    /// Debugging aid for the heuristic scan; the full pipeline applies the
    /// same map during `extract`.
    Mine {
        /// Path to the reference manual (PDF).
        #[arg(long)]
        manual: Option<String>,

        /// Pre-extracted manual text to scan instead of reading the PDF.
        #[arg(long)]
        text_dump: Option<String>,

        /// Pages with fewer embedded-text characters than this go through OCR.
        #[arg(long)]
        min_embedded_chars: Option<usize>,

        /// Rasterization resolution for the OCR fallback.
        #[arg(long)]
        ocr_dpi: Option<u32>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Resolve one peripheral's inheritance chain and print the result.
    Resolve {
        /// Path to the chip-description document (SVD-style XML).
        #[arg(long)]
        svd: String,

        /// Name of the peripheral to resolve.
        #[arg(long)]
        peripheral: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show record count and latest run provenance for a register database.
    Status {
        /// Path to the register database.
        #[arg(long, default_value = "registers.db")]
        db: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    SimpleLogger::new().with_level(level).init().ok();

    match cli.command {
        Command::Extract {
            svd,
            manual,
            db,
            config,
            text_dump,
            min_embedded_chars,
            ocr_dpi,
            json,
        } => commands::extract_command(
            svd,
            manual,
            db,
            config,
            text_dump,
            min_embedded_chars,
            ocr_dpi,
            json,
        )?,
        Command::Mine { manual, text_dump, min_embedded_chars, ocr_dpi, json } => {
            commands::mine_command(manual, text_dump, min_embedded_chars, ocr_dpi, json)?
        }
        Command::Resolve { svd, peripheral, json } => {
            commands::resolve_command(&svd, &peripheral, json)?
        }
        Command::Status { db, json } => commands::status_command(&db, json)?,
    }

    Ok(())
}
