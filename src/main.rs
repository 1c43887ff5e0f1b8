use subtimeline::parser::Parser;
use subtimeline::serialiser::{self, Format};
use subtimeline::{Assembler, FallbackOrder, PipelineConfig, Timeline};

use std::io::{self, Read};

use anyhow::{anyhow, Context, Result};
use clap::{Parser as ClapParser, ValueEnum};
use log::info;

fn main() {
    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Json,
    Srt,
}

impl From<CliFormat> for Format {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Json => Format::Json,
            CliFormat::Srt => Format::Srt,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFallbackOrder {
    Textual,
    Importance,
}

impl From<CliFallbackOrder> for FallbackOrder {
    fn from(order: CliFallbackOrder) -> Self {
        match order {
            CliFallbackOrder::Textual => FallbackOrder::Textual,
            CliFallbackOrder::Importance => FallbackOrder::Importance,
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Split SRT subtitles into a keyword-tagged timeline for image search")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to read from. If not supplied, the subtitles will be read from standard input.",
        default_value = "-"
    )]
    input: String,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to write to. If not supplied, the timeline will be written to standard output.",
        default_value = "-"
    )]
    output: String,
    #[arg(long, value_enum, default_value = "json", help = "Output format.")]
    format: CliFormat,
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = subtimeline::config::DEFAULT_UNIT_SECONDS,
        help = "Target length of a single split."
    )]
    unit_seconds: f64,
    #[arg(
        long,
        value_name = "N",
        default_value_t = 2,
        value_parser = clap::value_parser!(u8).range(1..=10),
        help = "Images wanted per split; caps the keywords per split."
    )]
    images_per_split: u8,
    #[arg(
        long,
        value_enum,
        default_value = "textual",
        help = "Order of the single-keyword fallback queries."
    )]
    fallback_order: CliFallbackOrder,
    #[arg(long, value_name = "N", help = "Maximum number of search queries per split.")]
    max_queries: Option<usize>,
    #[arg(long, help = "Skip invalid or out-of-order entries instead of failing.")]
    skip_invalid: bool,
    #[arg(long, help = "Print a preview of the timeline to standard error.")]
    preview: bool,
    #[arg(long, help = "Print statistics to standard error.")]
    stats: bool,
    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity.")]
    verbose: u8,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let data = if cli.input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(&cli.input)
            .context(format!("Failed to open input file: '{}'", cli.input))?
    };

    let mut parser = Parser::new();
    let entries = parser
        .parse(&data)
        .context(format!("Failed to parse SRT file: '{}'", cli.input))?;
    if entries.is_empty() {
        return Err(anyhow!("You appear to have supplied an empty file."));
    }
    info!("Read {} subtitle entries from '{}'", entries.len(), cli.input);

    let config = PipelineConfig {
        unit_seconds: cli.unit_seconds,
        max_keywords: cli.images_per_split as usize,
        fallback_order: cli.fallback_order.into(),
        max_queries: cli.max_queries,
        ..Default::default()
    };
    let assembler = Assembler::new(&config)?;
    let timeline = build_timeline(&assembler, &entries, cli.skip_invalid)?;
    info!("Built {} timeline records", timeline.len());

    let format = cli.format.into();
    if cli.output == "-" {
        serialiser::serialise(&timeline, format, io::stdout().lock())?;
    } else {
        serialiser::serialise_to_path(&timeline, format, &cli.output)?;
    }

    let mut stderr = io::stderr().lock();
    if cli.preview {
        serialiser::write_preview(&mut stderr, &timeline, 10)?;
    }
    if cli.stats {
        serialiser::write_stats(&mut stderr, &timeline.stats())?;
    }

    Ok(())
}

fn build_timeline(
    assembler: &Assembler,
    entries: &[subtimeline::SubtitleEntry],
    skip_invalid: bool,
) -> Result<Timeline> {
    if !skip_invalid {
        return assembler
            .assemble(entries)
            .context("Failed to build the timeline");
    }

    let assembly = assembler.assemble_lenient(entries);
    if assembly.timeline.is_empty() {
        return Err(anyhow!(
            "None of the {} subtitle entries could be used.",
            entries.len()
        ));
    }
    if !assembly.rejected.is_empty() {
        info!("Skipped {} subtitle entries", assembly.rejected.len());
    }
    Ok(assembly.timeline)
}
