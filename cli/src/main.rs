use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dotenvy::dotenv;

use concordance_backend::concordance::{build_concordance, load_lexicon, Corpus};
use concordance_backend::esword_import::parse_esword_module;
use concordance_backend::export_helpers::write_json_atomic;
use concordance_backend::gematria::gematria_str;
use concordance_backend::logger;
use concordance_backend::osis_parse::parse_verse_file;
use concordance_backend::pdf_lexicon::{parse_pdf_lexicon, LemmaLineBoundary};
use concordance_backend::settings::ConverterSettings;
use concordance_backend::types::ConcordanceEntry;
use concordance_backend::ensure_input_exists;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert dictionary, lexicon and corpus sources to JSON", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract dictionary entries from an e-Sword .dctx or .dcti module
    #[command(arg_required_else_help = true)]
    ParseEsword {
        /// Path to the e-Sword module
        #[arg(long, value_name = "FILE")]
        input: PathBuf,

        /// Output JSON file
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Extract lexicon entries from the text layer of a PDF
    #[command(arg_required_else_help = true)]
    ParsePdf {
        #[arg(long, value_name = "FILE")]
        input: PathBuf,

        #[arg(long, value_name = "FILE")]
        output: PathBuf,

        /// Regex character class of the headword alphabet, e.g. '\x{0700}-\x{074F}'.
        /// Defaults to the Hebrew block.
        #[arg(long, value_name = "CLASS")]
        alphabet: Option<String>,
    },

    /// Build concordances for the given corpora against a lexicon
    #[command(arg_required_else_help = true)]
    CreateConcordance {
        /// Lexicon JSON, as written by parse-pdf
        #[arg(long, value_name = "FILE")]
        lexicon: PathBuf,

        /// Tanakh corpus file (USFM or OSIS)
        #[arg(long, value_name = "FILE")]
        tanakh: Option<PathBuf>,

        /// Targums corpus file (USFM or OSIS)
        #[arg(long, value_name = "FILE")]
        targums: Option<PathBuf>,

        /// Peshitta corpus file (USFM or OSIS)
        #[arg(long, value_name = "FILE")]
        peshitta: Option<PathBuf>,

        /// Directory for the <corpus>_concordance.json files
        #[arg(long, value_name = "DIRECTORY_PATH")]
        output_dir: PathBuf,
    },

    /// Parse a USFM or OSIS file and write its verses as JSON
    #[command(arg_required_else_help = true)]
    ParseVerses {
        #[arg(long, value_name = "FILE")]
        input: PathBuf,

        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Print the gematria value of a Hebrew word
    #[command(arg_required_else_help = true)]
    Gematria {
        word: String,

        /// standard, ordinal, reduced or atbash
        #[arg(long, default_value = "standard")]
        method: String,
    },
}

fn parse_esword(input: &Path, output: &Path, settings: &ConverterSettings) -> Result<()> {
    let entries = parse_esword_module(input, settings)?;
    write_json_atomic(&entries, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Extracted {} entries to {}", entries.len(), output.display());
    Ok(())
}

fn parse_pdf(input: &Path, output: &Path, alphabet: Option<&str>, settings: &ConverterSettings) -> Result<()> {
    let boundary = match alphabet {
        Some(class) => LemmaLineBoundary::with_alphabet(class)
            .with_context(|| format!("Invalid alphabet class: {}", class))?,
        None => LemmaLineBoundary::default(),
    };

    let entries = parse_pdf_lexicon(input, &boundary, settings)?;
    write_json_atomic(&entries, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Extracted {} lexicon entries to {}", entries.len(), output.display());
    Ok(())
}

fn create_concordance(lexicon: &Path, corpora: &[(Corpus, PathBuf)], output_dir: &Path) -> Result<()> {
    let lemmas = load_lexicon(lexicon)
        .with_context(|| format!("Failed to load lexicon {}", lexicon.display()))?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    if corpora.is_empty() {
        logger::warn("No corpus given, nothing to index.");
        println!("Wrote 0 concordance files to {}", output_dir.display());
        return Ok(());
    }

    // All corpora are read before anything is written.
    let mut results: Vec<(Corpus, Vec<ConcordanceEntry>)> = Vec::new();
    for (corpus, path) in corpora {
        let verses = parse_verse_file(path)
            .with_context(|| format!("Failed to read {} corpus", corpus))?;
        logger::info(&format!("{}: {} verses", corpus, verses.len()));
        results.push((*corpus, build_concordance(&verses, &lemmas, corpus.name())));
    }

    for (corpus, entries) in results {
        let output = output_dir.join(corpus.output_file_name());
        write_json_atomic(&entries, &output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!("{}: {} occurrences written to {}", corpus, entries.len(), output.display());
    }

    Ok(())
}

fn parse_verses(input: &Path, output: &Path) -> Result<()> {
    let verses = parse_verse_file(input)?;
    write_json_atomic(&verses, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Parsed {} verses to {}", verses.len(), output.display());
    Ok(())
}

fn run(command: Commands, settings: &ConverterSettings) -> Result<()> {
    match command {
        Commands::ParseEsword { input, output } => {
            parse_esword(&input, &output, settings)
        }

        Commands::ParsePdf { input, output, alphabet } => {
            parse_pdf(&input, &output, alphabet.as_deref(), settings)
        }

        Commands::CreateConcordance { lexicon, tanakh, targums, peshitta, output_dir } => {
            let corpora: Vec<(Corpus, PathBuf)> = [
                (Corpus::Tanakh, tanakh),
                (Corpus::Targums, targums),
                (Corpus::Peshitta, peshitta),
            ]
            .into_iter()
            .filter_map(|(corpus, path)| path.map(|p| (corpus, p)))
            .collect();

            for (_, path) in &corpora {
                ensure_input_exists(path)?;
            }
            create_concordance(&lexicon, &corpora, &output_dir)
        }

        Commands::ParseVerses { input, output } => {
            parse_verses(&input, &output)
        }

        Commands::Gematria { word, method } => {
            let value = gematria_str(&word, &method)?;
            println!("{}", value);
            Ok(())
        }
    }
}

fn main() {
    // LOG_LEVEL and CONCORDANCE_* may come from a .env file.
    let dotenv_loaded = dotenv().is_ok();

    let cli = Cli::parse();

    logger::init_tracing();
    if !dotenv_loaded {
        logger::debug("No .env file found or failed to load.");
    }

    let settings = ConverterSettings::from_env();

    if let Err(e) = run(cli.command, &settings) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        exit(1);
    }
}
