//! Pure calculation functions for output dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;
use thiserror::Error;

/// A zero width or height was supplied to the resolver.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid dimensions: original {original_width}x{original_height}, target {target_width}x{target_height}")]
pub struct InvalidDimension {
    pub original_width: u32,
    pub original_height: u32,
    pub target_width: u32,
    pub target_height: u32,
}

/// Resolve the output dimensions for one image.
///
/// With `keep_aspect` off the target box is returned as-is, distortion and all.
/// With it on, the image is scaled by `min(target_w / w, target_h / h)` so the
/// result fits inside the box on both axes ("fit inside", not "fill"). Scaling
/// up is allowed when the box is larger than the source.
///
/// Each axis is rounded to the nearest pixel and clamped to `1..=target`, so
/// extreme aspect ratios never produce a zero-pixel edge.
///
/// # Examples
/// ```
/// # use pixbatch::imaging::{Dimensions, resolve_dimensions};
/// let fit = resolve_dimensions((1920, 1080), (800, 600), true).unwrap();
/// assert_eq!(fit, Dimensions { width: 800, height: 450 });
///
/// let stretched = resolve_dimensions((1920, 1080), (800, 600), false).unwrap();
/// assert_eq!(stretched, Dimensions { width: 800, height: 600 });
/// ```
pub fn resolve_dimensions(
    original: (u32, u32),
    target: (u32, u32),
    keep_aspect: bool,
) -> Result<Dimensions, InvalidDimension> {
    let (orig_w, orig_h) = original;
    let (tgt_w, tgt_h) = target;

    if orig_w == 0 || orig_h == 0 || tgt_w == 0 || tgt_h == 0 {
        return Err(InvalidDimension {
            original_width: orig_w,
            original_height: orig_h,
            target_width: tgt_w,
            target_height: tgt_h,
        });
    }

    if !keep_aspect {
        return Ok(Dimensions {
            width: tgt_w,
            height: tgt_h,
        });
    }

    let ratio = (tgt_w as f64 / orig_w as f64).min(tgt_h as f64 / orig_h as f64);
    let width = scale_edge(orig_w, ratio, tgt_w);
    let height = scale_edge(orig_h, ratio, tgt_h);

    Ok(Dimensions { width, height })
}

fn scale_edge(edge: u32, ratio: f64, bound: u32) -> u32 {
    let scaled = (edge as f64 * ratio).round();
    (scaled as u32).clamp(1, bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    // =========================================================================
    // keep_aspect = true
    // =========================================================================

    #[test]
    fn landscape_into_4_3_box() {
        // 1920x1080 → 800x600 box: width constrains, ratio 0.41667
        assert_eq!(
            resolve_dimensions((1920, 1080), (800, 600), true).unwrap(),
            dims(800, 450)
        );
    }

    #[test]
    fn portrait_into_landscape_box() {
        // 1080x1920 → 800x600 box: height constrains, ratio 0.3125
        assert_eq!(
            resolve_dimensions((1080, 1920), (800, 600), true).unwrap(),
            dims(338, 600)
        );
    }

    #[test]
    fn same_aspect_hits_box_exactly() {
        assert_eq!(
            resolve_dimensions((1600, 1200), (800, 600), true).unwrap(),
            dims(800, 600)
        );
    }

    #[test]
    fn small_source_is_scaled_up_to_fit() {
        // 400x300 into 800x800: width constrains at 2x
        assert_eq!(
            resolve_dimensions((400, 300), (800, 800), true).unwrap(),
            dims(800, 600)
        );
    }

    #[test]
    fn identical_box_is_identity() {
        assert_eq!(
            resolve_dimensions((640, 480), (640, 480), true).unwrap(),
            dims(640, 480)
        );
    }

    #[test]
    fn extreme_panorama_keeps_one_pixel_edge() {
        // 10000x1 → 100x100: height would round to 0
        assert_eq!(
            resolve_dimensions((10000, 1), (100, 100), true).unwrap(),
            dims(100, 1)
        );
    }

    #[test]
    fn rounds_to_nearest_pixel() {
        // 1000x333 → 500x500: ratio 0.5, height 166.5 rounds to 167
        assert_eq!(
            resolve_dimensions((1000, 333), (500, 500), true).unwrap(),
            dims(500, 167)
        );
    }

    #[test]
    fn fit_inside_holds_across_grid() {
        let edges = [1, 7, 64, 333, 800, 1080, 1920, 4000];
        for &ow in &edges {
            for &oh in &edges {
                for &tw in &edges {
                    for &th in &edges {
                        let out = resolve_dimensions((ow, oh), (tw, th), true).unwrap();
                        assert!(out.width <= tw && out.height <= th, "{ow}x{oh} in {tw}x{th}");
                        assert!(out.width >= 1 && out.height >= 1);

                        // One axis must touch the box unless clamping kicked in.
                        assert!(
                            out.width == tw || out.height == th,
                            "{ow}x{oh} in {tw}x{th} → {out:?}"
                        );

                        // Aspect ratio preserved within one pixel of rounding.
                        let ratio = (tw as f64 / ow as f64).min(th as f64 / oh as f64);
                        let exact_w = ow as f64 * ratio;
                        let exact_h = oh as f64 * ratio;
                        assert!((out.width as f64 - exact_w).abs() <= 1.0);
                        assert!((out.height as f64 - exact_h).abs() <= 1.0);
                    }
                }
            }
        }
    }

    // =========================================================================
    // keep_aspect = false
    // =========================================================================

    #[test]
    fn stretch_returns_target_box() {
        assert_eq!(
            resolve_dimensions((1920, 1080), (800, 600), false).unwrap(),
            dims(800, 600)
        );
    }

    #[test]
    fn stretch_upscales_to_target() {
        assert_eq!(
            resolve_dimensions((10, 10), (300, 20), false).unwrap(),
            dims(300, 20)
        );
    }

    // =========================================================================
    // Preconditions
    // =========================================================================

    #[test]
    fn zero_target_is_rejected() {
        let err = resolve_dimensions((100, 100), (0, 600), true).unwrap_err();
        assert_eq!(err.target_width, 0);
    }

    #[test]
    fn zero_original_is_rejected_even_when_stretching() {
        assert!(resolve_dimensions((0, 100), (800, 600), false).is_err());
        assert!(resolve_dimensions((100, 0), (800, 600), false).is_err());
    }
}
