//! Mastery Stack entry point
//!
//! Fetches the record list, lays out one tower per grade and prints the
//! placements as JSON or as a readable summary.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use glam::Vec3;

use mastery_stack::consts::STACK_SEPARATION;
use mastery_stack::settings::StackSettings;
use mastery_stack::{BlockDetails, GeometryPreset, PipelineConfig, StackLayout, run_config};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Summary,
}

/// Tower geometry on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GeometryArg {
    /// First block at anchor + (1, 0.6, 0)
    Flush,
    /// First tier centred over the anchor
    #[value(alias = "centred")]
    Centered,
}

impl From<GeometryArg> for GeometryPreset {
    fn from(arg: GeometryArg) -> Self {
        match arg {
            GeometryArg::Flush => GeometryPreset::Flush,
            GeometryArg::Centered => GeometryPreset::Centered,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "mastery-stack", version, about = "Lay out graded mastery records as block towers")]
struct Cli {
    /// JSON config file (defaults apply for anything it omits)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Record source: http(s) URL, file:// URI or path
    #[arg(short, long)]
    source: Option<String>,

    /// Wanted grade label; repeat for several towers (replaces configured stacks)
    #[arg(short, long = "grade")]
    grades: Vec<String>,

    /// Jitter seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Fetch timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Tower geometry preset
    #[arg(long, value_enum)]
    geometry: Option<GeometryArg>,

    /// Lay out grades in parallel
    #[arg(long)]
    parallel: bool,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Include each block's detail text in the summary
    #[arg(long)]
    details: bool,
}

impl Cli {
    fn into_config(self) -> mastery_stack::Result<(PipelineConfig, OutputFormat, bool)> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(source) = self.source {
            config.source_uri = source;
        }
        if !self.grades.is_empty() {
            config.stacks = self
                .grades
                .into_iter()
                .enumerate()
                .map(|(i, grade)| StackSettings {
                    grade,
                    position: Vec3::new(i as f32 * STACK_SEPARATION, 0.0, 0.0),
                    yaw_degrees: 0.0,
                })
                .collect();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(timeout) = self.timeout {
            config.fetch_timeout_secs = timeout;
        }
        if let Some(geometry) = self.geometry {
            config.geometry = geometry.into();
        }
        config.parallel |= self.parallel;
        config.validate()?;

        Ok((config, self.format, self.details))
    }
}

fn print_summary(layout: &StackLayout, details: bool) {
    println!("Seed: {}", layout.seed);
    for stack in &layout.stacks {
        println!();
        println!("{} ({} blocks) @ {}", stack.grade, stack.placements.len(), stack.anchor.position);
        for p in &stack.placements {
            println!(
                "  #{:<6} tier {:>2} slot {} {:>3}° {:<5} at ({:.2}, {:.2}, {:.2})",
                p.record.id,
                p.tier,
                p.slot.number(),
                p.rotation_degrees(),
                p.material.as_str(),
                p.position.x,
                p.position.y,
                p.position.z,
            );
            if details {
                for line in BlockDetails::from(p.record.as_ref()).to_string().lines().filter(|l| !l.is_empty()) {
                    println!("           {line}");
                }
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let (config, format, details) = match cli.into_config() {
        Ok(parts) => parts,
        Err(e) => {
            log::error!("{}", e.report());
            eprintln!("error: {}", e.report());
            return ExitCode::FAILURE;
        }
    };

    log::info!("Mastery Stack starting ({} grades)", config.stacks.len());
    let layout = match run_config(&config) {
        Ok(layout) => layout,
        Err(e) => {
            log::error!("{}", e.report());
            eprintln!("error: {}", e.report());
            return ExitCode::FAILURE;
        }
    };

    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&layout) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        },
        OutputFormat::Summary => print_summary(&layout, details),
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_flag_maps_to_preset() {
        let cli = Cli::try_parse_from(["mastery-stack", "--geometry", "centered", "--seed", "4"]).unwrap();
        let (config, format, _) = cli.into_config().unwrap();
        assert_eq!(config.geometry, GeometryPreset::Centered);
        assert_eq!(config.seed, Some(4));
        assert_eq!(format, OutputFormat::Summary);

        let cli = Cli::try_parse_from(["mastery-stack", "--geometry", "centred"]).unwrap();
        assert_eq!(cli.geometry, Some(GeometryArg::Centered));
    }

    #[test]
    fn test_unknown_geometry_rejected_by_parser() {
        let err = Cli::try_parse_from(["mastery-stack", "--geometry", "wobbly"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_grade_flags_replace_stacks() {
        let cli = Cli::try_parse_from(["mastery-stack", "-g", "7th Grade", "-g", "8th Grade"]).unwrap();
        let (config, _, _) = cli.into_config().unwrap();
        assert_eq!(config.wanted_grades(), vec!["7th Grade", "8th Grade"]);
        assert_eq!(config.stacks[1].position, Vec3::new(STACK_SEPARATION, 0.0, 0.0));
    }
}
