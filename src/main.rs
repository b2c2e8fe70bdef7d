// rbounce - A floating window that bounces around your screen
// Drag and throw it, watch it bounce off the screen edges, F6 swaps its background

mod app;
mod background;
mod cli;
mod dialogs;
mod fade;
mod image_loader;
mod physics;
mod wayland;
mod wgpu_renderer;

use anyhow::Result;
use log::info;

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args = cli::parse_args()?;

    info!(
        "Starting rbounce: {}x{} window, tick {:?}, background: {}",
        args.width,
        args.height,
        args.tick,
        match (&args.image_path, &args.image_data) {
            (_, Some(_)) => "stdin".to_string(),
            (Some(path), None) => path.display().to_string(),
            (None, None) => "built-in".to_string(),
        }
    );

    let source = image_loader::load_source(&args)?;

    info!("Background source: {}x{} pixels", source.width(), source.height());

    wayland::run(source, args.width, args.height, args.tick, args.use_gpu)
}
