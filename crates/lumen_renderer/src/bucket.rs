//! Bucket-based parallel rendering.
//!
//! Divides the image into horizontal strips (buckets) of whole rows that
//! are rendered independently on the rayon pool. Each row draws from its own
//! generator seeded from the master seed and the row index, so the result
//! does not depend on scheduling or on the bucket size.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::renderer::{color_to_rgb8, sample_pixel};
use crate::sampling::row_rng;
use crate::{Camera, Hittable, PixelSink, RenderConfig, RenderError, RenderResult, Rgb8};

/// Default bucket height in rows.
const DEFAULT_BUCKET_ROWS: u32 = 16;

/// A horizontal strip of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bucket {
    /// First (topmost) row of the bucket
    y: u32,
    /// Number of rows in the bucket
    height: u32,
    /// Index of this bucket in the render order
    index: usize,
}

impl Bucket {
    /// Create a new bucket.
    fn new(y: u32, height: u32, index: usize) -> Self {
        Self { y, height, index }
    }

    /// Rows covered by this bucket, bottom row first.
    fn rows(&self) -> impl Iterator<Item = u32> {
        (self.y..self.y + self.height).rev()
    }
}

/// Split an image into row buckets, ordered from the bottom of the image up.
fn generate_buckets(height: u32, bucket_rows: u32) -> Vec<Bucket> {
    let bucket_rows = bucket_rows.max(1);
    let mut buckets = Vec::new();

    let mut end = height;
    while end > 0 {
        let y = end.saturating_sub(bucket_rows);
        buckets.push(Bucket::new(y, end - y, buckets.len()));
        end = y;
    }

    buckets
}

/// Shared flag for cooperative cancellation.
///
/// Clones share the same flag. Renders check it between rows.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every render holding this token to stop after its current row.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Why a render stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Cancelled,
    TimedOut,
}

/// Cancellation token plus optional deadline, checked once per row.
///
/// `aborted` stops the workers of a single render without touching the
/// caller's token.
struct StopCondition<'a> {
    token: &'a CancelToken,
    deadline: Option<Instant>,
    aborted: AtomicBool,
}

impl<'a> StopCondition<'a> {
    fn new(token: &'a CancelToken, deadline: Option<Instant>) -> Self {
        Self {
            token,
            deadline,
            aborted: AtomicBool::new(false),
        }
    }

    fn abort(&self) {
        self.aborted.store(true, Ordering::Relaxed);
    }

    fn check(&self) -> Option<StopReason> {
        if self.aborted.load(Ordering::Relaxed) || self.token.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(StopReason::TimedOut),
            _ => None,
        }
    }
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
struct BucketResult {
    bucket: Bucket,
    /// Finished rows as `(y, pixels)`; shorter than the bucket if the
    /// render was stopped part way through
    rows: Vec<(u32, Vec<Rgb8>)>,
}

/// Render one row with its own seeded generator.
fn render_row(camera: &Camera, world: &dyn Hittable, y: u32, config: &RenderConfig) -> Vec<Rgb8> {
    let mut rng = row_rng(config.seed, y);
    (0..config.width)
        .map(|x| color_to_rgb8(sample_pixel(camera, world, x, y, config, &mut rng)))
        .collect()
}

/// Render a single bucket, row by row.
///
/// `stop` is checked before every row; a stopped render returns the rows
/// finished so far.
fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    stop: &StopCondition<'_>,
) -> BucketResult {
    let mut rows = Vec::with_capacity(bucket.height as usize);

    for y in bucket.rows() {
        if stop.check().is_some() {
            break;
        }
        rows.push((y, render_row(camera, world, y, config)));
    }

    BucketResult {
        bucket: *bucket,
        rows,
    }
}

/// Summary of a finished render.
#[derive(Debug, Clone, Copy)]
pub struct RenderStats {
    pub rows: u32,
    pub buckets: usize,
    pub elapsed: Duration,
}

/// Render the entire scene in parallel.
///
/// Buckets are rendered on the rayon pool from a helper thread while the
/// calling thread receives finished buckets over a channel and writes them
/// to `sink`, so the sink never needs to be shared between threads.
///
/// Returns [`RenderError::Cancelled`] or [`RenderError::TimedOut`] if the
/// render was stopped early; rows finished before that have already been
/// written to the sink.
pub fn render_parallel(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    sink: &mut dyn PixelSink,
    token: &CancelToken,
) -> RenderResult<RenderStats> {
    config.validate()?;
    let time_limit = config.time_limit()?;

    let buckets = generate_buckets(config.height, DEFAULT_BUCKET_ROWS);
    let start = Instant::now();
    let stop = StopCondition::new(token, time_limit.map(|limit| start + limit));

    log::info!(
        "Rendering {}x{} @ {} spp, depth {} ({} buckets on {} threads)",
        config.width,
        config.height,
        config.samples_per_pixel,
        config.max_depth,
        buckets.len(),
        rayon::current_num_threads()
    );

    let (sender, receiver) = mpsc::channel::<BucketResult>();
    let mut rows_completed = 0u32;
    let mut sink_result = Ok(());

    std::thread::scope(|scope| {
        let buckets = &buckets;
        let stop = &stop;
        scope.spawn(move || {
            buckets.par_iter().for_each_with(sender, |sender, bucket| {
                if stop.check().is_some() {
                    return;
                }
                let result = render_bucket(bucket, camera, world, config, stop);
                // The receiver only goes away once the sink has failed.
                let _ = sender.send(result);
            });
        });

        for result in receiver.iter() {
            log::debug!(
                "Bucket {} (rows {}..{}) finished with {} rows",
                result.bucket.index,
                result.bucket.y,
                result.bucket.y + result.bucket.height,
                result.rows.len()
            );
            for (y, row) in &result.rows {
                if let Err(err) = sink.put_row(*y, row) {
                    sink_result = Err(err);
                    break;
                }
                rows_completed += 1;
            }
            if sink_result.is_err() {
                // Stop the workers; nothing else can be written.
                stop.abort();
                break;
            }
        }
    });
    sink_result?;

    let elapsed = start.elapsed();
    if rows_completed < config.height {
        let rows_total = config.height;
        return match stop.check() {
            Some(StopReason::TimedOut) => {
                log::warn!("Render timed out after {rows_completed}/{rows_total} rows");
                Err(RenderError::TimedOut {
                    limit: time_limit.unwrap_or_default(),
                    rows_completed,
                    rows_total,
                })
            }
            _ => {
                log::warn!("Render cancelled after {rows_completed}/{rows_total} rows");
                Err(RenderError::Cancelled {
                    rows_completed,
                    rows_total,
                })
            }
        };
    }

    log::info!("Rendered in {:?}", elapsed);
    Ok(RenderStats {
        rows: rows_completed,
        buckets: buckets.len(),
        elapsed,
    })
}
