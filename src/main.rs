use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;
use indicatif::ProgressBar;
use log::{ error, info, warn };

use whitted_tracer::consts::DEFAULT_OUT_FILE;
use whitted_tracer::scene::Scene;
use whitted_tracer::canvas::Canvas;
use whitted_tracer::render::{ CancellationToken, RenderOutcome, Renderer };
use whitted_tracer::error::Result;

/// Renders a scene description to a PPM image.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// JSON scene description. Renders the built-in demo when omitted.
    #[clap(parse(from_os_str))]
    scene: Option<PathBuf>,

    /// Where to write the image.
    #[clap(short, long, parse(from_os_str), default_value = DEFAULT_OUT_FILE)]
    output: PathBuf,

    /// Image width in pixels, overriding the scene's camera.
    #[clap(long)]
    width: Option<usize>,

    /// Image height in pixels, overriding the scene's camera.
    #[clap(long)]
    height: Option<usize>,

    /// Recursion depth for reflected and refracted rays.
    #[clap(short = 'r', long)]
    max_reflections: Option<usize>,

    /// Worker threads (defaults to one per logical CPU).
    #[clap(short = 'j', long)]
    threads: Option<usize>,

    /// Cancel the render after this many seconds and keep what was traced.
    #[clap(short, long)]
    time_limit: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut scene = match &args.scene {
        Some(path) => Scene::load(path)?,
        None => {
            info!("no scene given, rendering the demo scene");
            Scene::demo()?
        }
    };

    if args.width.is_some() || args.height.is_some() {
        let width = args.width.unwrap_or(scene.camera.hsize());
        let height = args.height.unwrap_or(scene.camera.vsize());
        scene.camera.set_dimensions(width, height)?;
    }

    let (width, height) = (scene.camera.hsize(), scene.camera.vsize());
    let max_reflections = args.max_reflections
        .unwrap_or(scene.max_reflections);

    let renderer = Renderer::new(args.threads, max_reflections)?;
    let canvas = Canvas::new(width, height);
    let cancel = CancellationToken::new();

    if let Some(secs) = args.time_limit {
        let token = cancel.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            warn!("time limit of {}s reached, cancelling render", secs);
            token.cancel();
        });
    }

    let bar = ProgressBar::new((width * height) as u64);
    let progress = |n: usize| bar.inc(n as u64);
    let outcome = renderer.render(&scene.camera, &scene.world, &canvas,
        &cancel, Some(&progress));
    bar.finish_and_clear();

    if outcome == RenderOutcome::Cancelled {
        warn!("saving partially rendered image");
    }

    canvas.save(&args.output)
}
