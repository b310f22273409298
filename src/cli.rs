use crate::config::load_config;
use crate::layout::compute_track_layout;
use crate::layout_dump::{AllocationDump, write_allocation_dump};
use crate::parser::parse_boreholes;
use crate::render::{render_dxf, write_output};
use anyhow::Result;
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "blr", version, about = "Soil boring stick renderer (JSON logs to DXF)")]
pub struct Args {
    /// Input JSON file (one borehole or an array) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output DXF file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON5 file overriding layout/render/theme defaults
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Write per-cluster allocation diagnostics to a JSON file
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let boreholes = parse_boreholes(&input)?;
    if boreholes.is_empty() {
        return Err(anyhow::anyhow!("no boreholes found in input"));
    }

    if let Some(path) = args.dump_layout.as_deref() {
        let dumps: Vec<AllocationDump> = boreholes
            .iter()
            .filter_map(|hole| {
                compute_track_layout(hole, &config.layout)
                    .ok()
                    .map(|track| AllocationDump::from_track(&hole.hole_id, &track))
            })
            .collect();
        write_allocation_dump(path, &dumps)?;
    }

    let (dxf, report) = render_dxf(&boreholes, &config);
    write_output(&dxf, args.output.as_deref())?;

    for warning in &report.warnings {
        eprintln!("warning: {warning}");
    }
    if !report.failed.is_empty() {
        eprintln!(
            "skipped {} of {} boreholes: {}",
            report.failed.len(),
            report.total,
            report.failed.join(", ")
        );
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
