use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;
use std::rc::Rc;

use clap::Parser;
use tracing::Level;

use page_translator::core::{translate_document, PageTranslatorError, PageTranslatorOptions};
use page_translator::env::{core as env_core, EnvVar};
use page_translator::translation::{
    open_store, ConfigManager, MyMemoryBackend, PageOutcome, TranslationConfig,
};

const ASCII: &str = " \
 ____                    _____                    _       _
|  _ \\ __ _  __ _  ___  |_   _| __ __ _ _ __  ___| | __ _| |_ ___  _ __
| |_) / _` |/ _` |/ _ \\   | || '__/ _` | '_ \\/ __| |/ _` | __/ _ \\| '__|
|  __/ (_| | (_| |  __/   | || | | (_| | | | \\__ \\ | (_| | || (_) | |
|_|   \\__,_|\\__, |\\___|   |_||_|  \\__,_|_| |_|___/_|\\__,_|\\__\\___/|_|
            |___/
";

#[derive(Parser, Debug)]
#[command(
    name = "page-translator",
    version,
    about = "Translates the visible text of a static HTML page in place",
    before_help = ASCII
)]
struct Cli {
    /// Language to switch the page to after it loads
    #[arg(short = 'l', long = "lang", value_name = "CODE")]
    lang: Option<String>,

    /// Write translated HTML to this file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// redb database holding cached translations and the language preference
    #[arg(short = 'c', long = "cache", value_name = "FILE")]
    cache: Option<PathBuf>,

    /// Override the translation endpoint
    #[arg(short = 'a', long = "api-url", value_name = "URL")]
    api_url: Option<String>,

    /// Read configuration from this TOML or JSON file
    #[arg(short = 'C', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Charset of the input document
    #[arg(short = 'E', long = "encoding", value_name = "CHARSET")]
    encoding: Option<String>,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// HTML file to translate, or - for stdin
    #[arg(value_name = "INPUT")]
    input: String,
}

enum Output {
    Stdout(io::Stdout),
    File(fs::File),
}

impl Output {
    fn new(path: Option<&PathBuf>) -> Result<Output, io::Error> {
        match path {
            None => Ok(Output::Stdout(io::stdout())),
            Some(path) if path.as_os_str() == "-" => Ok(Output::Stdout(io::stdout())),
            Some(path) => Ok(Output::File(fs::File::create(path)?)),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), io::Error> {
        match self {
            Output::Stdout(stdout) => {
                let mut handle = stdout.lock();
                handle.write_all(bytes)?;
                handle.flush()
            }
            Output::File(file) => {
                file.write_all(bytes)?;
                file.flush()
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else {
        match env_core::LogLevel::get_or_default("info".to_string()).as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(!env_core::NoColor::get_or_default(false))
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<TranslationConfig, PageTranslatorError> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::from_path(path)?,
        None => ConfigManager::new()?,
    };
    let mut config = manager.into_config();

    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }

    if let Some(cache) = &cli.cache {
        config.cache_enabled = true;
        config.cache_path = Some(cache.to_string_lossy().into_owned());
    }

    config.validate()?;
    Ok(config)
}

fn read_input(input: &str) -> Result<Vec<u8>, PageTranslatorError> {
    if input == "-" {
        let mut data = Vec::new();
        io::stdin()
            .read_to_end(&mut data)
            .map_err(|e| PageTranslatorError::new(&format!("Unable to read stdin: {}", e)))?;
        return Ok(data);
    }

    fs::read(input)
        .map_err(|e| PageTranslatorError::new(&format!("Unable to read {}: {}", input, e)))
}

fn describe(outcome: &PageOutcome) -> String {
    match outcome {
        PageOutcome::Skipped(reason) => format!("skipped ({:?})", reason),
        PageOutcome::Restored { nodes } => format!("restored {} nodes", nodes),
        PageOutcome::Translated {
            batches,
            applied,
            unchanged,
        } => format!(
            "translated {} nodes in {} batches ({} unchanged)",
            applied, batches, unchanged
        ),
    }
}

async fn run(cli: Cli) -> Result<(), PageTranslatorError> {
    let config = load_config(&cli)?;
    let input_data = read_input(&cli.input)?;

    let backend = Rc::new(MyMemoryBackend::new(&config.api_url)?);
    let store = open_store(config.resolved_cache_path().as_deref());

    let options = PageTranslatorOptions {
        encoding: cli.encoding.clone(),
        target_language: cli.lang.clone(),
    };

    let result = translate_document(&input_data, &options, config, backend, store).await?;

    for outcome in [&result.load_outcome, &result.change_outcome].into_iter().flatten() {
        tracing::info!("{}", describe(outcome));
    }

    let mut output = Output::new(cli.output.as_ref())
        .map_err(|e| PageTranslatorError::new(&format!("Unable to open output: {}", e)))?;
    output
        .write(&result.data)
        .map_err(|e| PageTranslatorError::new(&format!("Unable to write output: {}", e)))?;

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: unable to start runtime: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli)) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
