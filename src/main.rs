use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use wikialias::generator::AliasGenerator;
use wikialias::models::{AliasType, AliasTypeSet};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "wikialias")]
#[command(about = "Extract typed alias relations from Wikipedia XML dumps")]
struct Cli {
    /// Path to the Wikipedia dump file (.xml, .xml.gz or .xml.bz2)
    #[arg(short, long)]
    input: String,

    /// Output TSV file (stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,

    /// Alias types to produce: standard, hackey, all, or a comma-separated
    /// list of type names
    #[arg(short, long, default_value = "standard")]
    types: String,

    /// Also emit aliases whose source equals their target
    #[arg(long)]
    identity: bool,

    /// Limit number of pages to process (for testing)
    #[arg(long)]
    limit: Option<u64>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_type_set(spec: &str) -> Result<AliasTypeSet> {
    match spec.trim().to_ascii_lowercase().as_str() {
        "standard" => return Ok(AliasTypeSet::STANDARD),
        "hackey" => return Ok(AliasTypeSet::HACKEY),
        "all" => return Ok(AliasTypeSet::ALL),
        _ => {}
    }
    let mut set = AliasTypeSet::EMPTY;
    for name in spec.split(',') {
        let name = name.trim();
        match AliasType::from_name(name) {
            Some(t) => set = set.with(t),
            None => bail!("Unknown alias type: {}", name),
        }
    }
    Ok(set)
}

fn run(cli: Cli) -> Result<()> {
    let types = parse_type_set(&cli.types)?;
    let generator = AliasGenerator::new(types)?.identity_aliases(cli.identity);

    let sink: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(
            || format!("Failed to create output file: {}", path),
        )?)),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(sink);

    let start = Instant::now();
    // The handler cannot fail, so the first write error is parked here and
    // surfaced after the run.
    let mut write_err: Option<csv::Error> = None;
    let stats = generator.process_path(&cli.input, cli.limit, |alias| {
        if write_err.is_none() {
            if let Err(e) = writer.serialize(alias) {
                write_err = Some(e);
            }
        }
    })?;
    if let Some(e) = write_err {
        return Err(e).context("Failed to write alias record");
    }
    writer.flush().context("Failed to flush output")?;

    // Summary goes to stderr; stdout may be carrying the TSV stream.
    eprintln!();
    eprintln!("=== Summary ===");
    eprintln!("Processing time:  {:.2}s", start.elapsed().as_secs_f64());
    eprintln!("Pages processed:  {}", stats.pages);
    eprintln!("Pages failed:     {}", stats.failed_pages);
    eprintln!("Aliases emitted:  {}", stats.aliases);

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    match run(cli) {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
