//! fieldsight: line-of-sight coverage maps for a competition field.

mod config;
mod viewer;

use std::io;
use std::path::PathBuf;

use clap::Parser;
use fieldsight_core::Point;
use fieldsight_los::{Coverage, HeightField, VisibilityMap};
use fieldsight_render::{OverlayRenderer, TerminalPreview, coverage_grid, load_background, save_png};

use config::{Overrides, parse_cell};
use viewer::Viewer;

#[derive(Parser, Debug)]
#[command(name = "fieldsight")]
#[command(about = "Compute which field cells an observer can hit and be seen from")]
struct Args {
    /// Grayscale height map; black is the highest terrain
    height_map: PathBuf,

    /// Field picture to draw the overlay on
    #[arg(long)]
    background: Option<PathBuf>,

    /// JSON engine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Observer cell as X,Y
    #[arg(long, value_parser = parse_cell, default_value = "0,0")]
    observer: Point,

    /// Enemy cell as X,Y
    #[arg(long, value_parser = parse_cell, default_value = "0,0")]
    enemy: Point,

    #[command(flatten)]
    overrides: Overrides,

    /// Write the overlay to this PNG file
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Overlay pixels per grid cell
    #[arg(long, default_value = "4")]
    cell_size: u32,

    /// Print a colored preview to the terminal
    #[arg(short, long)]
    preview: bool,

    /// Preview width in terminal columns
    #[arg(long, default_value = "70")]
    columns: u16,

    /// Explore interactively in the terminal
    #[arg(short, long)]
    interactive: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = config::load(args.config.as_deref())?;
    args.overrides.apply(&mut config);

    let field = HeightField::load(&args.height_map, config.max_height)?;
    let mut map = VisibilityMap::from_config(&config);
    map.set_observer(args.observer);
    map.set_enemy(args.enemy);
    map.load_height_field(field);

    if args.interactive {
        let columns = match crossterm::terminal::size() {
            Ok((cols, _)) => args.columns.min(cols),
            Err(_) => args.columns,
        };
        return Viewer::new(map, TerminalPreview::new(columns)).run();
    }

    print_summary(&map);

    let Some(grids) = map.grids() else {
        return Ok(());
    };
    if let Some(out) = &args.out {
        let renderer = OverlayRenderer::new(args.cell_size)?;
        let overlay = renderer.render(grids, Some(map.observer()))?;
        let image = match &args.background {
            Some(bg) => renderer.compose(&load_background(bg)?, &overlay),
            None => overlay,
        };
        save_png(&image, out)?;
        println!("overlay written to {}", out.display());
    }
    if args.preview {
        TerminalPreview::new(args.columns).write(
            &mut io::stdout().lock(),
            grids,
            Some(map.observer()),
            Some(map.enemy()),
        )?;
    }
    Ok(())
}

fn print_summary(map: &VisibilityMap) {
    let Some(grids) = map.grids() else {
        return;
    };
    let coverage = coverage_grid(grids);
    let p = map.params();
    println!(
        "observer {}  camera {:.2} m  target {:.2} m  range {:.1} m",
        map.observer(),
        p.camera_height,
        p.target_height,
        p.max_range
    );
    for c in Coverage::ALL {
        println!(
            "  {:<17}{:>7} cells",
            c.label(),
            coverage.count_fn(|_, v| *v == c)
        );
    }
    if let Some(duel) = map.duel() {
        println!(
            "enemy {}: observer can hit it: {}, it can see the observer: {}",
            map.enemy(),
            duel.observer_hits_enemy,
            duel.enemy_sees_observer
        );
    }
}
