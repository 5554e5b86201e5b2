//! Thin command-line driver over the Transformer API (§B.3/§B.1): reads an
//! input file, auto-detects its markup format from the extension, runs
//! `transform`, and writes the rendered output to stdout or a file.

mod config;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{anyhow, Context, Result};
use laika::{HtmlRenderer, RenderBackend, Transformer};

use config::CliConfig;

struct Args {
    input_path: PathBuf,
    output_path: Option<PathBuf>,
    output_format: Option<String>,
}

fn print_usage_and_exit(program: &str) -> ! {
    eprintln!("Usage: {program} <input-file> [-o <output-file>] [--to <html|ast-dump>]");
    process::exit(1);
}

fn parse_args(raw: &[String]) -> Result<Args> {
    let mut input_path = None;
    let mut output_path = None;
    let mut output_format = None;

    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                let value = raw.get(i).ok_or_else(|| anyhow!("{} expects a value", raw[i - 1]))?;
                output_path = Some(PathBuf::from(value));
            }
            "--to" => {
                i += 1;
                let value = raw.get(i).ok_or_else(|| anyhow!("--to expects a value"))?;
                output_format = Some(value.clone());
            }
            other if input_path.is_none() => {
                input_path = Some(PathBuf::from(other));
            }
            other => return Err(anyhow!("unexpected argument: {other}")),
        }
        i += 1;
    }

    let input_path = input_path.ok_or_else(|| anyhow!("missing input file"))?;
    Ok(Args { input_path, output_path, output_format })
}

fn format_for(path: &Path) -> Result<laika::Format> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    laika::Format::from_extension(ext)
        .with_context(|| format!("unrecognized input format for '{}' (expected .md or .rst)", path.display()))
}

fn backend_for(name: &str) -> Result<Box<dyn RenderBackend>> {
    match name {
        "html" => Ok(Box::new(HtmlRenderer)),
        "ast-dump" => Ok(Box::new(laika::AstDumpRenderer)),
        other => Err(anyhow!("unknown output format '{other}' (expected html or ast-dump)")),
    }
}

fn run() -> Result<()> {
    env_logger::init();
    let raw: Vec<String> = std::env::args().collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {err}");
            print_usage_and_exit(&raw[0]);
        }
    };

    let file_config = CliConfig::load().unwrap_or_else(|err| {
        eprintln!("Warning: ignoring laika.toml ({err})");
        None
    });

    let format = format_for(&args.input_path)?;
    let output_format = args
        .output_format
        .or_else(|| file_config.as_ref().and_then(|c| c.output_format.clone()))
        .unwrap_or_else(|| "html".to_string());
    let backend = backend_for(&output_format)?;

    let input = fs::read_to_string(&args.input_path)
        .with_context(|| format!("failed to read '{}'", args.input_path.display()))?;

    let mut transformer = Transformer::new();
    if file_config.as_ref().and_then(|c| c.autosectionnumbering).unwrap_or(false) {
        transformer = transformer.with_config_value("laika.autosectionnumbering", laika::ConfigValue::bool(true, laika::Origin::Api));
    }

    let rendered = transformer.transform(format, &input, backend.as_ref());
    let output = match rendered {
        Ok(output) => output,
        Err(invalid) => {
            eprintln!("{invalid}");
            process::exit(1);
        }
    };

    match args.output_path {
        Some(path) => fs::write(&path, output).with_context(|| format!("failed to write '{}'", path.display()))?,
        None => println!("{output}"),
    }

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}
