//! `viml` command-line entry point.

mod config;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use viml_ir::print_expr;
use viml_runtime_luajit::{TranslateError, translate};
use viml_syntax::{ParseError, parse_expression_str, parse_script};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "viml")]
#[command(about = "Legacy editor script parser and Lua translator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an expression and print its tree as JSON
    ParseExpr {
        /// Expression source
        expr: String,
    },

    /// Parse an expression and print it back as source
    PrintExpr {
        /// Expression source
        expr: String,
    },

    /// Parse a script and print its command tree as JSON
    Parse {
        /// Input script (or - for stdin)
        file: String,
    },

    /// Translate a script to Lua
    Translate {
        /// Input script (or - for stdin)
        file: String,

        /// Output file
        #[arg(short, long)]
        out: Option<String>,

        /// Write to stdout instead of file
        #[arg(long)]
        stdout: bool,

        /// Config file with a [translate] table
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Module the generated chunk requires
        #[arg(long)]
        runtime_module: Option<String>,

        /// Spaces per nesting level
        #[arg(long)]
        indent: Option<usize>,

        /// Leave out the `-- line:col:name` comments
        #[arg(long)]
        no_positions: bool,
    },
}

fn read_input(file: &str) -> std::io::Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file)
    }
}

/// `file:line:col: Ennn: message`
fn parse_diagnostic(file: &str, err: &ParseError) -> String {
    format!("{file}:{}:{}: {err}", err.line.unwrap_or(1), err.position + 1)
}

fn translate_diagnostic(file: &str, err: &TranslateError) -> String {
    match err {
        TranslateError::Parse(err) => parse_diagnostic(file, err),
        other => format!("{file}:{other}"),
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("rhizome_viml=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ParseExpr { expr } => match parse_expression_str(&expr) {
            Ok(parsed) => println!("{}", serde_json::to_string_pretty(&parsed.root)?),
            Err(err) => {
                eprintln!("{}", parse_diagnostic("<expr>", &err));
                return Ok(ExitCode::FAILURE);
            }
        },

        Commands::PrintExpr { expr } => match parse_expression_str(&expr) {
            Ok(parsed) => println!("{}", print_expr(&parsed.root)),
            Err(err) => {
                eprintln!("{}", parse_diagnostic("<expr>", &err));
                return Ok(ExitCode::FAILURE);
            }
        },

        Commands::Parse { file } => {
            let source = read_input(&file)?;
            match parse_script(&source) {
                Ok(commands) => println!("{}", serde_json::to_string_pretty(&commands)?),
                Err(err) => {
                    eprintln!("{}", parse_diagnostic(&file, &err));
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Commands::Translate {
            file,
            out,
            stdout,
            config,
            runtime_module,
            indent,
            no_positions,
        } => {
            let mut options = match config {
                Some(path) => {
                    info!("Using config {}", path.display());
                    Config::load(&path)?.translate
                }
                None => Config::default().translate,
            };
            if let Some(module) = runtime_module {
                options.runtime_module = module;
            }
            if let Some(indent) = indent {
                options.indent = indent;
            }
            if no_positions {
                options.emit_positions = false;
            }

            let source = read_input(&file)?;
            let lua_code = match parse_script(&source)
                .map_err(TranslateError::from)
                .and_then(|commands| translate(&commands, &options))
            {
                Ok(code) => code,
                Err(err) => {
                    eprintln!("{}", translate_diagnostic(&file, &err));
                    return Ok(ExitCode::FAILURE);
                }
            };

            if stdout {
                print!("{lua_code}");
            } else {
                let out_path = match out {
                    Some(path) => path,
                    None if file == "-" => "output.lua".to_string(),
                    None => Path::new(&file).with_extension("lua").to_string_lossy().into_owned(),
                };
                std::fs::write(&out_path, &lua_code)?;
                println!("Wrote: {out_path}");
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
