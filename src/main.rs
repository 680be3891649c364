//! CLI `fbxbin`
//!
//! Просмотр, проверка и перепаковка бинарных FBX-файлов.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use fbxbin::{
    config::Settings,
    engine::fbx::{read_header, PositionedReader},
    export::write_document_text,
    document_to_bytes, init_logging, read_document_with, CountingHook, DecodeHook, DecodeOptions,
    FbxDocument, NoopHook, StackError, TracingHook,
};
use fbxbin_error::{FbxbinResult, ResultExt};
use tracing::{debug, info};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

/// Аргументы командной строки.
#[derive(Parser)]
#[command(name = "fbxbin")]
#[command(version = VERSION)]
#[command(about = "Inspect, validate and repack binary FBX files", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Мягкий режим разбора
    #[arg(long, global = true, help = "Decode in lenient mode (skip integrity checks)")]
    lenient: bool,
    /// Путь к файлу конфигурации
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Configuration file (default: ./fbxbin.toml if present)"
    )]
    config: Option<PathBuf>,
    /// -v: debug, -vv: trace
    #[arg(short, long, global = true, action = ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,
    #[arg(short, long, global = true, help = "Disable logging")]
    quiet: bool,
    #[arg(long, global = true, help = "Log every decoded node")]
    trace_nodes: bool,
    #[command(subcommand)]
    command: Commands,
}

/// Подкоманды CLI
#[derive(Subcommand)]
enum Commands {
    /// Вывести дерево в текстовом виде
    Dump {
        input: PathBuf,
        #[arg(short, long, help = "Write the dump to a file instead of stdout")]
        output: Option<PathBuf>,
    },
    /// Декодировать файл и вывести статистику
    Check { input: PathBuf },
    /// Декодировать и записать заново
    Repack {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, help = "Store all arrays uncompressed")]
        no_compress: bool,
        #[arg(long, value_name = "BYTES", help = "Compress arrays of at least this many bytes")]
        min_compress_bytes: Option<usize>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=9), help = "zlib level 0-9")]
        level: Option<u32>,
        #[arg(long, help = "Do not write the footer")]
        no_footer: bool,
    },
    /// Вывести версию из преамбулы
    Header { input: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            let code = e
                .downcast_ref::<StackError>()
                .map(|s| s.status_code().exit_code())
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.lenient {
        settings.mode = fbxbin::Mode::Lenient;
    }
    settings.log.level = log_directive(cli, &settings.log.level);
    init_logging(&settings.log)?;
    debug!(?settings, "settings loaded");

    let decode = settings.decode_options();
    match &cli.command {
        Commands::Dump { input, output } => {
            let mut hook = node_tracer(cli);
            let doc = decode_file(input, &decode, hook.as_mut())?;
            match output {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("cannot create {}", path.display()))?;
                    let mut w = BufWriter::new(file);
                    write_document_text(&mut w, &doc)
                        .and_then(|_| w.flush())
                        .with_context(|| format!("cannot write {}", path.display()))?;
                }
                None => {
                    let stdout = io::stdout();
                    let mut w = BufWriter::new(stdout.lock());
                    write_document_text(&mut w, &doc)
                        .and_then(|_| w.flush())
                        .context("cannot write dump to stdout")?;
                }
            }
        }
        Commands::Check { input } => {
            let mut counter = CountingHook::new();
            let doc = if cli.trace_nodes {
                let mut pair = (counter, TracingHook);
                let doc = decode_file(input, &decode, &mut pair)?;
                counter = pair.0;
                doc
            } else {
                decode_file(input, &decode, &mut counter)?
            };
            let stats = counter.into_stats();
            println!("{}: OK ({} mode)", input.display(), decode.mode.as_str());
            println!("version:         {}", doc.version);
            println!("nodes:           {}", stats.nodes);
            println!("properties:      {}", stats.properties);
            println!(
                "arrays:          {} ({} compressed)",
                stats.arrays, stats.compressed_arrays
            );
            println!("array elements:  {}", stats.array_elements);
            println!("max depth:       {}", stats.max_depth);
        }
        Commands::Repack {
            input,
            output,
            no_compress,
            min_compress_bytes,
            level,
            no_footer,
        } => {
            let mut hook = node_tracer(cli);
            let doc = decode_file(input, &decode, hook.as_mut())?;

            let mut encode = settings.encode_options(doc.version);
            if *no_compress {
                encode.compression.enabled = false;
            }
            if let Some(min) = min_compress_bytes {
                encode.compression.min_payload_bytes = *min;
            }
            if let Some(level) = level {
                encode.compression.level = *level;
            }
            if *no_footer {
                encode.write_footer = false;
            }

            let bytes = document_to_bytes(&doc, &encode)
                .with_context(|| format!("cannot encode {}", input.display()))?;
            std::fs::write(output, &bytes)
                .with_context(|| format!("cannot write {}", output.display()))?;
            info!(
                input = %input.display(),
                output = %output.display(),
                bytes = bytes.len(),
                "file repacked"
            );
        }
        Commands::Header { input } => {
            let file = open(input)?;
            let version = PositionedReader::new(BufReader::new(file))
                .and_then(|mut src| read_header(&mut src, decode.mode))
                .with_context(|| format!("cannot read header of {}", input.display()))?;
            println!("{version}");
        }
    }
    Ok(())
}

/// Итоговая директива фильтра с учётом флагов.
fn log_directive(
    cli: &Cli,
    configured: &str,
) -> String {
    let base = if cli.quiet {
        "off".to_string()
    } else {
        match cli.verbose {
            0 => configured.to_string(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };
    if cli.trace_nodes && !cli.quiet {
        format!("{base},fbxbin::engine::fbx::hooks=trace")
    } else {
        base
    }
}

fn node_tracer(cli: &Cli) -> Box<dyn DecodeHook> {
    if cli.trace_nodes {
        Box::new(TracingHook)
    } else {
        Box::new(NoopHook)
    }
}

fn open(path: &Path) -> FbxbinResult<File> {
    File::open(path).with_context(|| format!("cannot open {}", path.display()))
}

fn decode_file<H: DecodeHook + ?Sized>(
    path: &Path,
    options: &DecodeOptions,
    hook: &mut H,
) -> FbxbinResult<FbxDocument> {
    let file = open(path)?;
    read_document_with(BufReader::new(file), options, hook)
        .with_context(|| format!("cannot decode {}", path.display()))
}
