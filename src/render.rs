use std::sync::Arc;
use std::sync::atomic::{ AtomicBool, AtomicUsize, Ordering };
use std::thread::{ self, JoinHandle };
use std::time::Instant;

use log::{ debug, info };
use rayon::prelude::*;

use crate::color::Color;
use crate::camera::Camera;
use crate::world::World;
use crate::error::{ Result, TracerError };

/// A destination for rendered pixels.
///
/// Sinks are shared between render workers, so `put_pixel` takes `&self` and
/// may be called from many threads at once. Every pixel is delivered at most
/// once per render.
pub trait PixelSink: Sync {
    fn put_pixel(&self, x: usize, y: usize, color: Color);
}

impl<F> PixelSink for F
where
    F: Fn(usize, usize, Color) + Sync,
{
    fn put_pixel(&self, x: usize, y: usize, color: Color) {
        self(x, y, color)
    }
}

/// Cooperative cancellation flag shared between a render and its owner.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> CancellationToken {
        Default::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Every pixel was delivered to the sink.
    Completed,
    /// The token fired before every pixel was traced.
    Cancelled,
}

/// Progress callback, invoked with the number of pixels just finished.
pub type Progress<'a> = &'a (dyn Fn(usize) + Sync);

/// Renders `world` through `camera` on the current rayon pool.
///
/// Rows are distributed across worker threads. The token is polled before
/// each pixel; once it fires, no further pixels are traced and the render
/// returns `Cancelled`.
pub fn render<S>(camera: &Camera, world: &World, sink: &S,
    max_reflections: usize, cancel: &CancellationToken,
    progress: Option<Progress>) -> RenderOutcome
where
    S: PixelSink + ?Sized,
{
    let (hsize, vsize) = (camera.hsize(), camera.vsize());
    let total = hsize * vsize;
    let traced = AtomicUsize::new(0);
    let start = Instant::now();

    info!("rendering {}x{} pixels on {} threads", hsize, vsize,
        rayon::current_num_threads());

    (0..vsize).into_par_iter().for_each(|y| {
        let mut done = 0;
        for x in 0..hsize {
            if cancel.is_cancelled() {
                break;
            }

            let ray = camera.ray_for_pixel(x, y);
            sink.put_pixel(x, y, world.color_at(&ray, max_reflections));
            done += 1;
        }

        traced.fetch_add(done, Ordering::Relaxed);
        if let Some(progress) = progress {
            progress(done);
        }
    });

    let traced = traced.into_inner();
    if traced == total {
        info!("render finished in {:.2?}", start.elapsed());
        RenderOutcome::Completed
    } else {
        info!("render cancelled after {} of {} pixels", traced, total);
        RenderOutcome::Cancelled
    }
}

/// Renders on a dedicated thread pool.
pub struct Renderer {
    pool: Arc<rayon::ThreadPool>,
    max_reflections: usize,
}

impl Renderer {
    /// Creates a renderer with `threads` workers.
    ///
    /// `None` lets rayon pick the worker count (one per logical CPU unless
    /// `RAYON_NUM_THREADS` says otherwise).
    pub fn new(threads: Option<usize>, max_reflections: usize)
        -> Result<Renderer> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.unwrap_or(0))
            .thread_name(|i| format!("render-{}", i))
            .build()?;

        debug!("built render pool with {} threads",
            pool.current_num_threads());

        Ok(Renderer { pool: Arc::new(pool), max_reflections })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn max_reflections(&self) -> usize {
        self.max_reflections
    }

    /// Renders on this renderer's pool, blocking until done or cancelled.
    pub fn render<S>(&self, camera: &Camera, world: &World, sink: &S,
        cancel: &CancellationToken, progress: Option<Progress>)
        -> RenderOutcome
    where
        S: PixelSink + ?Sized,
    {
        let max_reflections = self.max_reflections;
        self.pool.install(|| {
            render(camera, world, sink, max_reflections, cancel, progress)
        })
    }

    /// Starts a render in the background, stopping early once `cancel`
    /// fires.
    ///
    /// The returned handle can also cancel the render, and waits for its
    /// outcome.
    pub fn spawn<S>(&self, camera: Camera, world: Arc<World>, sink: Arc<S>,
        cancel: CancellationToken) -> RenderHandle
    where
        S: PixelSink + Send + 'static,
    {
        let token = cancel.clone();
        let pool = Arc::clone(&self.pool);
        let max_reflections = self.max_reflections;

        let thread = thread::spawn(move || {
            pool.install(|| {
                render(&camera, &world, &*sink, max_reflections, &token, None)
            })
        });

        RenderHandle { thread, cancel }
    }
}

/// A render running in the background.
pub struct RenderHandle {
    thread: JoinHandle<RenderOutcome>,
    cancel: CancellationToken,
}

impl RenderHandle {
    /// Asks the render to stop. Pixels already traced stay in the sink.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Waits for the render to end.
    pub fn join(self) -> Result<RenderOutcome> {
        self.thread.join().map_err(|_| TracerError::RenderPanicked)
    }
}

#[cfg(test)]
fn test_camera(hsize: usize, vsize: usize) -> Camera {
    use crate::tuple::Tuple4D;

    let mut c = Camera::new(hsize, vsize, std::f64::consts::PI / 2.0)
        .unwrap();
    c.look_at(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::origin(),
        Tuple4D::vector(0.0, 1.0, 0.0)).unwrap();
    c
}

#[test]
fn render_fills_every_pixel() {
    use crate::canvas::Canvas;

    let w = World::new();
    let c = test_camera(11, 11);
    let canvas = Canvas::new(11, 11);

    let outcome = render(&c, &w, &canvas, 5, &CancellationToken::new(), None);
    assert_eq!(outcome, RenderOutcome::Completed);
    assert_eq!(canvas.read_pixel(5, 5),
        Some(Color::rgb(0.38066, 0.47583, 0.2855)));
}

#[test]
fn closure_sink_sees_each_pixel_once() {
    use std::sync::Mutex;

    let w = World::new();
    let c = test_camera(8, 6);
    let seen = Mutex::new(vec![0; 8 * 6]);
    let sink = |x: usize, y: usize, _: Color| {
        seen.lock().unwrap()[y * 8 + x] += 1;
    };

    let renderer = Renderer::new(Some(2), 5).unwrap();
    let outcome = renderer.render(&c, &w, &sink, &CancellationToken::new(),
        None);

    assert_eq!(outcome, RenderOutcome::Completed);
    assert!(seen.into_inner().unwrap().iter().all(|&n| n == 1));
}

#[test]
fn progress_counts_all_pixels() {
    use crate::canvas::Canvas;

    let w = World::new();
    let c = test_camera(10, 7);
    let canvas = Canvas::new(10, 7);
    let counted = AtomicUsize::new(0);
    let progress = |n: usize| {
        counted.fetch_add(n, Ordering::Relaxed);
    };

    render(&c, &w, &canvas, 5, &CancellationToken::new(), Some(&progress));
    assert_eq!(counted.into_inner(), 70);
}

#[test]
fn cancelled_before_start_traces_nothing() {
    let w = World::new();
    let c = test_camera(16, 16);
    let hits = AtomicUsize::new(0);
    let sink = |_: usize, _: usize, _: Color| {
        hits.fetch_add(1, Ordering::Relaxed);
    };

    let token = CancellationToken::new();
    token.cancel();

    assert_eq!(render(&c, &w, &sink, 5, &token, None),
        RenderOutcome::Cancelled);
    assert_eq!(hits.into_inner(), 0);
}

#[test]
fn cancel_from_inside_the_sink_stops_the_render() {
    let w = World::new();
    let c = test_camera(64, 64);
    let token = CancellationToken::new();
    let hits = AtomicUsize::new(0);
    let sink = |_: usize, _: usize, _: Color| {
        if hits.fetch_add(1, Ordering::Relaxed) == 10 {
            token.cancel();
        }
    };

    let renderer = Renderer::new(Some(1), 5).unwrap();
    let outcome = renderer.render(&c, &w, &sink, &token, None);

    assert_eq!(outcome, RenderOutcome::Cancelled);
    assert!(hits.into_inner() < 64 * 64);
}

#[test]
fn spawned_render_can_be_joined() {
    use crate::canvas::Canvas;

    let w = Arc::new(World::new());
    let c = test_camera(11, 11);
    let canvas = Arc::new(Canvas::new(11, 11));

    let renderer = Renderer::new(None, 5).unwrap();
    let handle = renderer.spawn(c, w, Arc::clone(&canvas),
        CancellationToken::new());

    assert_eq!(handle.join().unwrap(), RenderOutcome::Completed);
    assert_eq!(canvas.read_pixel(5, 5),
        Some(Color::rgb(0.38066, 0.47583, 0.2855)));
}

#[test]
fn spawned_render_stops_when_cancelled() {
    let w = Arc::new(World::new());
    let c = test_camera(200, 200);
    let token = CancellationToken::new();
    let hits = Arc::new(AtomicUsize::new(0));

    let sink = {
        let token = token.clone();
        let hits = Arc::clone(&hits);
        Arc::new(move |_: usize, _: usize, _: Color| {
            if hits.fetch_add(1, Ordering::Relaxed) == 10 {
                token.cancel();
            }
        })
    };

    let renderer = Renderer::new(Some(1), 5).unwrap();
    let handle = renderer.spawn(c, w, sink, token);

    assert_eq!(handle.join().unwrap(), RenderOutcome::Cancelled);
    assert!(hits.load(Ordering::Relaxed) < 200 * 200);
}

#[test]
fn handle_cancel_reaches_the_render() {
    let w = Arc::new(World::new());
    let c = test_camera(200, 200);
    let token = CancellationToken::new();
    let hits = Arc::new(AtomicUsize::new(0));

    // The first pixel waits until the handle cancels the render
    let sink = {
        let token = token.clone();
        let hits = Arc::clone(&hits);
        Arc::new(move |_: usize, _: usize, _: Color| {
            hits.fetch_add(1, Ordering::Relaxed);
            while !token.is_cancelled() {
                thread::yield_now();
            }
        })
    };

    let renderer = Renderer::new(Some(1), 5).unwrap();
    let handle = renderer.spawn(c, w, sink, token);
    handle.cancel();

    assert_eq!(handle.join().unwrap(), RenderOutcome::Cancelled);
    assert_eq!(hits.load(Ordering::Relaxed), 1);
}
