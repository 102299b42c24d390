use rayon::prelude::*;
use tracing::{debug, error, warn};

use super::blend::composite_pixel;
use crate::{
    config::CompositorConfig,
    effects::EffectChain,
    error::CompositeError,
    segmentation::ConfidenceMask,
    timeline::EffectWindow,
    video::FrameBuffer,
};

/// Why a tick presented the original pixels
#[derive(Debug, Clone, PartialEq)]
pub enum PassThroughReason {
    NoActiveEffects,
    MaskUnavailable,
    PreconditionViolated(CompositeError),
}

/// What [`PixelCompositor::composite`] did with the frame
#[derive(Debug, Clone, PartialEq)]
pub enum CompositeOutcome {
    /// Output is a copy of the original
    PassThrough(PassThroughReason),
    /// Effects were blended in under the mask
    Applied { effects: usize },
}

impl CompositeOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CompositeOutcome::Applied { .. })
    }
}

/// Blends the active effect chain into a frame under a confidence mask
///
/// Rows are independent, so with more than one worker thread the pass runs
/// on a dedicated rayon pool. The render thread still waits for the whole
/// frame; one call is one tick.
pub struct PixelCompositor {
    pool: Option<rayon::ThreadPool>,
}

impl PixelCompositor {
    pub fn new(config: &CompositorConfig) -> Self {
        let pool = if config.worker_threads > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(config.worker_threads)
                .thread_name(|i| format!("composite-{}", i))
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    warn!("Failed to build compositor pool, running serially: {}", e);
                    None
                }
            }
        } else {
            None
        };

        debug!(
            "Pixel compositor using {} thread(s)",
            pool.as_ref().map_or(1, |p| p.current_num_threads())
        );

        Self { pool }
    }

    /// Run every row on the calling thread
    pub fn serial() -> Self {
        Self { pool: None }
    }

    /// Write the composited frame into `output`
    ///
    /// Never fails: any problem with the inputs degrades to a copy of
    /// `original` for this tick. `output` is reallocated if its size differs
    /// from the original's.
    pub fn composite(
        &self,
        original: &FrameBuffer,
        mask: Option<&ConfidenceMask>,
        active: &[EffectWindow],
        output: &mut FrameBuffer,
    ) -> CompositeOutcome {
        let _span = tracing::debug_span!("composite", effects = active.len()).entered();

        if output.dimensions() != original.dimensions() {
            debug!(
                "Reallocating output {:?} -> {:?}",
                output.dimensions(),
                original.dimensions()
            );
            *output = original.clone();
        }

        if active.is_empty() {
            output.copy_from(original);
            return CompositeOutcome::PassThrough(PassThroughReason::NoActiveEffects);
        }

        let Some(mask) = mask else {
            output.copy_from(original);
            return CompositeOutcome::PassThrough(PassThroughReason::MaskUnavailable);
        };

        let chain = EffectChain::from_windows(active);
        match self.try_composite(original, mask, &chain, output) {
            Ok(()) => CompositeOutcome::Applied {
                effects: chain.len(),
            },
            Err(e) => {
                error!("Skipping effects for this frame: {}", e);
                output.copy_from(original);
                CompositeOutcome::PassThrough(PassThroughReason::PreconditionViolated(e))
            }
        }
    }

    fn try_composite(
        &self,
        original: &FrameBuffer,
        mask: &ConfidenceMask,
        chain: &EffectChain,
        output: &mut FrameBuffer,
    ) -> Result<(), CompositeError> {
        let pixel_count = original.pixel_count();
        if mask.len() != pixel_count || mask.dimensions() != original.dimensions() {
            return Err(CompositeError::MaskSizeMismatch {
                mask_len: mask.len(),
                pixel_count,
            });
        }

        let expected = pixel_count * FrameBuffer::CHANNELS;
        if output.as_raw().len() != expected {
            return Err(CompositeError::BufferSizeMismatch {
                actual: output.as_raw().len(),
                expected,
            });
        }

        let width = original.width() as usize;
        if width == 0 {
            return Ok(());
        }

        let row_bytes = width * FrameBuffer::CHANNELS;
        let source = original.as_raw();
        let confidences = mask.values();
        let target = output.as_raw_mut();

        match &self.pool {
            Some(pool) => pool.install(|| {
                target
                    .par_chunks_mut(row_bytes)
                    .zip(source.par_chunks(row_bytes))
                    .zip(confidences.par_chunks(width))
                    .for_each(|((out, src), conf)| composite_row(src, conf, chain, out));
            }),
            None => target
                .chunks_mut(row_bytes)
                .zip(source.chunks(row_bytes))
                .zip(confidences.chunks(width))
                .for_each(|((out, src), conf)| composite_row(src, conf, chain, out)),
        }

        Ok(())
    }
}

impl Default for PixelCompositor {
    fn default() -> Self {
        Self::new(&CompositorConfig::default())
    }
}

fn composite_row(source: &[u8], confidences: &[f32], chain: &EffectChain, out: &mut [u8]) {
    for ((src, dst), &confidence) in source
        .chunks_exact(FrameBuffer::CHANNELS)
        .zip(out.chunks_exact_mut(FrameBuffer::CHANNELS))
        .zip(confidences)
    {
        let rgb = composite_pixel([src[0], src[1], src[2]], confidence, chain);
        dst[..3].copy_from_slice(&rgb);
        dst[3] = src[3];
    }
}
