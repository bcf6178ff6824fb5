use anyhow::{Context, Result};

use atomco::config::Config;
use atomco::io::{self, poscar, xdatcar};
use atomco::utils::report;

use crate::cli::{Command, ConstrainArgs, ConvertArgs, FramesArgs, InfoArgs};

pub fn dispatch(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Info(args) => run_info(args),
        Command::Convert(args) => run_convert(args, config),
        Command::Constrain(args) => run_constrain(args, config),
        Command::Frames(args) => run_frames(args),
    }
}

fn run_info(args: InfoArgs) -> Result<()> {
    let system = io::load_structure(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    if args.json {
        let text = serde_json::to_string_pretty(&system).context("failed to serialize system")?;
        println!("{}", text);
    } else {
        print!("{}", report::structure_summary(&system, &args.file.display().to_string()));
    }
    Ok(())
}

fn run_convert(args: ConvertArgs, config: &Config) -> Result<()> {
    let system = io::load_structure(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    io::save_structure(&args.output, &system, &config.write)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    Ok(())
}

fn run_constrain(args: ConstrainArgs, config: &Config) -> Result<()> {
    let mut system = io::load_structure(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let changed = poscar::constrain_atom_type(&mut system, &args.atom_type, &args.flag, &args.axis)?;
    if changed {
        log::info!("Set {} of '{}' atoms to {}", args.axis, args.atom_type, args.flag);
    }

    io::save_structure(&args.output, &system, &config.write)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    Ok(())
}

fn run_frames(args: FramesArgs) -> Result<()> {
    let traj = xdatcar::Xdatcar::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;

    let header = traj.header();
    println!("Title: {}", header.title);
    println!("Atoms per frame: {}", header.total_count());
    println!("{:<10} {:<10}", "Frame", "Rows");
    let mut count = 0;
    for frame in traj.frames()? {
        let frame = frame.with_context(|| format!("bad frame in {}", args.file.display()))?;
        println!("{:<10} {:<10}", frame.index, frame.coordinates.len());
        count += 1;
    }
    println!("{} frames", count);
    Ok(())
}
