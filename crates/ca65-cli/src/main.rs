use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ca65_syntax::{Node, Span, Tree};

mod config;

use config::Config;

#[derive(Parser)]
#[command(author, version, about = "CA65 - Syntax tools for ca65 6502 assembly")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Configuration file (default: nearest ca65.toml)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the syntax tree of a file
    Parse {
        /// Path to the assembly file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Output format
        #[arg(long, short, default_value = "sexp")]
        format: TreeFormat,
    },
    /// Check files for syntax errors
    Check {
        /// Files to check
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },
    /// List the symbols a file defines, imports and exports
    Symbols {
        /// Path to the assembly file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Output format
        #[arg(long, short, default_value = "text")]
        format: SymbolsFormat,
    },
    /// Format assembly files
    Format {
        /// Files to format
        #[arg(value_name = "FILES")]
        files: Vec<PathBuf>,
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
    },
    /// Show the grammar metadata
    Language,
}

#[derive(Clone, Copy, ValueEnum)]
enum TreeFormat {
    /// S-expression of named nodes
    Sexp,
    /// Every node as JSON
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum SymbolsFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr. `-v` flags win over `RUST_LOG`, which wins over `warn`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Parse { file, format } => parse_file(&file, format),
        Commands::Check { files } => check_files(&files),
        Commands::Symbols { file, format } => symbols_file(&file, format),
        Commands::Format { files, check } => {
            let cwd = std::env::current_dir()?;
            let config = Config::resolve(cli.config.as_deref(), &cwd)?;
            format_files(&files, check, &config)
        }
        Commands::Language => {
            print_language();
            Ok(true)
        }
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))
}

/// A file's text together with its parse.
struct Parsed {
    source: String,
    tree: Tree,
}

fn parse_source(path: &Path) -> Result<Parsed> {
    let source = read_source(path)?;
    let mut parser = ca65_syntax::Parser::new()?;
    let tree = parser.parse(&source)?;
    debug!(file = %path.display(), errors = tree.root_node().has_error(), "parsed");
    Ok(Parsed { source, tree })
}

fn parse_file(path: &Path, format: TreeFormat) -> Result<bool> {
    let Parsed { source, tree } = parse_source(path)?;
    match format {
        TreeFormat::Sexp => println!("{}", tree.root_node().to_sexp()),
        TreeFormat::Json => {
            let json = node_json(tree.root_node(), None, &source);
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(!tree.root_node().has_error())
}

fn node_json(node: Node<'_>, field: Option<&str>, source: &str) -> serde_json::Value {
    let mut value = serde_json::json!({
        "kind": node.kind(),
        "named": node.is_named(),
        "span": Span::from_node(&node),
    });
    if let Some(field) = field {
        value["field"] = field.into();
    }
    if node.is_error() {
        value["error"] = true.into();
    }
    if node.is_missing() {
        value["missing"] = true.into();
    }
    if node.child_count() == 0 {
        value["text"] = source.get(node.byte_range()).unwrap_or("").into();
    } else {
        let mut cursor = node.walk();
        let mut children = Vec::with_capacity(node.child_count());
        if cursor.goto_first_child() {
            loop {
                children.push(node_json(cursor.node(), cursor.field_name(), source));
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        value["children"] = children.into();
    }
    value
}

fn check_files(files: &[PathBuf]) -> Result<bool> {
    let mut error_count = 0;

    for path in files {
        let Parsed { source, tree } = parse_source(path)?;
        let diagnostics = ca65_syntax::diagnostics(&tree, &source);

        if diagnostics.is_empty() {
            println!("{} {}", "✓".green().bold(), path.display());
            continue;
        }

        let filename = path.display().to_string();
        for diag in &diagnostics {
            eprintln!(
                "{}:{}:{}: {}: {}",
                filename,
                diag.span.start_line + 1,
                diag.span.start_col + 1,
                "error".red().bold(),
                diag.message
            );
        }
        error_count += diagnostics.len();
    }

    if error_count > 0 {
        eprintln!(
            "\n{}: {} syntax error(s) found",
            "error".red().bold(),
            error_count
        );
    }
    Ok(error_count == 0)
}

fn symbols_file(path: &Path, format: SymbolsFormat) -> Result<bool> {
    let Parsed { source, tree } = parse_source(path)?;
    let definitions = ca65_syntax::outline(&tree, &source);

    match format {
        SymbolsFormat::Text => {
            for def in &definitions {
                println!(
                    "{:>5}:{:<3} {:<12} {}",
                    def.span.start_line + 1,
                    def.span.start_col + 1,
                    def.kind.as_str().cyan(),
                    def.name.bold()
                );
            }
        }
        SymbolsFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&definitions)?);
        }
    }

    Ok(true)
}

fn format_files(files: &[PathBuf], check: bool, config: &Config) -> Result<bool> {
    if files.is_empty() {
        eprintln!("{}: No files specified", "error".red().bold());
        return Ok(false);
    }

    let mut all_ok = true;

    for path in files {
        let Parsed {
            source: content,
            tree,
        } = parse_source(path)?;
        let formatted = ca65_syntax::format(&tree, &content, &config.format);

        if check {
            if formatted == content {
                println!("{} {}", "✓".green().bold(), path.display());
            } else {
                println!(
                    "{}: {} would be reformatted",
                    "warning".yellow().bold(),
                    path.display()
                );
                all_ok = false;
            }
        } else if formatted == content {
            println!("{} {} (unchanged)", "✓".green().bold(), path.display());
        } else {
            std::fs::write(path, &formatted)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
            println!("{} {}", "formatted".green().bold(), path.display());
        }
    }

    Ok(all_ok)
}

fn print_language() {
    let language = tree_sitter_ca65::language();
    let named_kinds = |prefix: &str| {
        (0..language.node_kind_count())
            .filter_map(|id| u16::try_from(id).ok())
            .filter(|&id| language.node_kind_is_named(id))
            .filter_map(|id| language.node_kind_for_id(id))
            .filter(|kind| kind.starts_with(prefix))
            .collect::<BTreeSet<_>>()
            .len()
    };
    println!("{}", "Language".bold().underline());
    println!("  name:        {}", language.name().unwrap_or("?"));
    println!("  abi version: {}", language.abi_version());
    println!(
        "  supported:   {}..={}",
        ca65_syntax::MIN_COMPATIBLE_LANGUAGE_VERSION,
        ca65_syntax::LANGUAGE_VERSION
    );
    println!("  file types:  {}", tree_sitter_ca65::FILE_TYPES.join(", "));
    println!("  node kinds:  {}", language.node_kind_count());
    println!("  fields:      {}", language.field_count());
    println!("  opcodes:     {}", named_kinds("opcode_"));
    println!("  keywords:    {}", named_kinds("dot_keyword_"));
}
