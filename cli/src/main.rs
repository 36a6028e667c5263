mod config;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use bdash::segment::Segment;
use compiler::DiagnosticError;

#[derive(Parser)]
#[command(name = "bdash", version, about = "Markdown-to-Dash document compiler")]
struct Cli {
    /// Markdown document to compile
    file: String,

    /// Application root for resolving app= references
    #[arg(long, value_name = "DIR")]
    app_path: Option<PathBuf>,

    /// Configuration file (default: bdash.toml next to the document)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Parse and resolve only, don't emit the program (exit 0 if valid)
    #[arg(long)]
    check: bool,

    /// List the parsed segment sequence
    #[arg(long)]
    segments: bool,

    /// Disable colored error output
    #[arg(long)]
    no_color: bool,
}

fn main() {
    let cli = Cli::parse();

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    // Read source
    let source = match std::fs::read_to_string(&cli.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", cli.file, e);
            process::exit(1);
        }
    };

    let config = match config::load(cli.config.as_deref(), &cli.file) {
        Ok(c) => c,
        Err(message) => {
            eprintln!("error: {}", message);
            process::exit(1);
        }
    };

    // Set up codespan file database
    let mut files = SimpleFiles::new();
    let file_id = files.add(cli.file.clone(), source.clone());

    // Parse
    let parser = bdash::parser::Parser::new(source, file_id);
    let document = match parser.parse() {
        Ok(d) => d,
        Err(errors) => {
            let writer = StandardStream::stderr(color_choice);
            let term_config = term::Config::default();
            for error in &errors {
                let diagnostic = error.to_diagnostic();
                let _ = term::emit_to_write_style(
                    &mut writer.lock(),
                    &term_config,
                    &files,
                    &diagnostic,
                );
            }
            process::exit(1);
        }
    };

    // --segments: print the parsed segment sequence
    if cli.segments {
        for (i, segment) in document.segments.iter().enumerate() {
            match segment {
                Segment::Prose { text, .. } => {
                    println!("{}: prose ({} bytes)", i, text.len());
                }
                Segment::App { reference, .. } => {
                    println!("{}: app {}", i, reference);
                }
            }
        }
        return;
    }

    let app_root = cli
        .app_path
        .clone()
        .or_else(|| config.app_path.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let options = config.to_options();

    match compiler::compile_with_options(&document, &app_root, &options) {
        Ok(program) => {
            if cli.check {
                eprintln!("ok: {} compiled successfully", cli.file);
            } else {
                print!("{}", program);
            }
        }
        Err(error) => {
            let writer = StandardStream::stderr(color_choice);
            let term_config = term::Config::default();
            emit_compile_error(&writer, &term_config, &files, &error);
            process::exit(1);
        }
    }
}

fn emit_compile_error(
    writer: &StandardStream,
    config: &term::Config,
    files: &SimpleFiles<String, String>,
    error: &DiagnosticError,
) {
    if let Some(span) = &error.span {
        let diagnostic = Diagnostic::error()
            .with_message(error.to_string())
            .with_labels(vec![Label::primary(error.source_id, span.clone())]);
        let _ = term::emit_to_write_style(&mut writer.lock(), config, files, &diagnostic);
    } else {
        eprintln!("error: {}", error);
    }
}
