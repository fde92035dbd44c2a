use crate::branch::compute_active_path_text;
use crate::config::load_config;
use crate::layout::auto_layout;
use crate::model::NodeKind;
use crate::persist::{export_sheet, import_sheet};
use crate::template::extract_parameters;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "pcv",
    version,
    about = "Prompt canvas tools: active-path text, auto-layout, template parameters"
)]
pub struct Args {
    /// Input sheet export (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for layout mode. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// What to produce from the sheet
    #[arg(short = 'm', long = "mode", value_enum, default_value = "text")]
    pub mode: Mode,

    /// Node id to seed the text traversal from; defaults to all roots
    #[arg(long = "start")]
    pub start: Option<String>,

    /// Collapse every node to a pill in layout mode
    #[arg(long = "collapsed")]
    pub collapsed: bool,

    /// Config JSON file overriding layout/routing defaults
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Mode {
    /// Print the combined text along the active path
    Text,
    /// Re-run auto-layout and write the sheet back out
    Layout,
    /// List the distinct template parameters used in the sheet
    Params,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;
    let mut sheet = import_sheet(&input, "cli")?;

    match args.mode {
        Mode::Text => {
            println!(
                "{}",
                compute_active_path_text(&sheet, args.start.as_deref())
            );
        }
        Mode::Params => {
            let mut seen: Vec<String> = Vec::new();
            for node in &sheet.nodes {
                if let NodeKind::Template { template, .. } = &node.kind {
                    for name in extract_parameters(template) {
                        if !seen.contains(&name) {
                            seen.push(name);
                        }
                    }
                }
            }
            for name in seen {
                println!("{name}");
            }
        }
        Mode::Layout => {
            auto_layout(&mut sheet, !args.collapsed, &config.layout);
            let json = export_sheet(&sheet)?;
            write_output(&json, args.output.as_deref())?;
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => Ok(std::fs::read_to_string(p)?),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn write_output(contents: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => std::fs::write(p, contents)?,
        None => println!("{contents}"),
    }
    Ok(())
}
