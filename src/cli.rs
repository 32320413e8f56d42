use crate::config::load_config;
use crate::layout_dump::write_layout_dump;
use crate::model::SubwayMap;
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::write_output_svg;
use crate::view::MapView;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "smr", version, about = "Schematic subway map renderer")]
pub struct Args {
    /// Input map file (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, themeVariables, layout)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Draw the cell grid under the map
    #[arg(long = "grid")]
    pub grid: bool,

    /// Write the computed layout as JSON to this path
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// PNG width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// PNG height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if args.grid {
        config.layout.draw_grid = true;
    }

    let input = read_input(args.input.as_deref())?;
    let mut map = SubwayMap::default();
    map.from_json(&input).context("failed to load map")?;
    let canvas = map.settings().canvas_size as f32;
    config.render.width = args.width.unwrap_or(canvas);
    config.render.height = args.height.unwrap_or(canvas);

    let mut view = MapView::new(config.layout.clone(), config.theme.clone());
    view.redraw_map(&mut map)?;
    info!(
        "rendered {:?}: {} stations, {} routes",
        map.name(),
        map.stations().len(),
        map.route_count()
    );

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, view.layout(), &map)?;
    }

    let svg = view.render_svg();
    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref())?,
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &config)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &crate::config::Config) -> Result<()> {
    write_output_png(svg, output, &config.render, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &crate::config::Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_flags() {
        let args = Args::parse_from([
            "smr",
            "-i",
            "map.json",
            "-e",
            "png",
            "-o",
            "map.png",
            "--grid",
            "--dumpLayout",
            "layout.json",
        ]);
        assert_eq!(args.input, Some(PathBuf::from("map.json")));
        assert_eq!(args.output_format, OutputFormat::Png);
        assert!(args.grid);
        assert_eq!(args.dump_layout, Some(PathBuf::from("layout.json")));
        assert!(args.width.is_none());
    }

    #[test]
    fn png_needs_an_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        assert_eq!(
            ensure_output(&Some(PathBuf::from("out.png")), "png").unwrap(),
            PathBuf::from("out.png")
        );
    }
}
