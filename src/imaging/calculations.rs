//! Pure calculation functions for derivative dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! Neither function ever returns a dimension larger than the source.

/// Dimensions for a fixed-width thumbnail.
///
/// The width is `target_width` unless the source is narrower, in which case
/// the source size is kept. Height follows the source aspect ratio.
///
/// # Examples
/// ```
/// # use contact_sheet::imaging::thumbnail_dimensions;
/// assert_eq!(thumbnail_dimensions((4000, 3000), 400), (400, 300));
/// // Never upscaled
/// assert_eq!(thumbnail_dimensions((300, 200), 400), (300, 200));
/// ```
pub fn thumbnail_dimensions(source: (u32, u32), target_width: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 || src_w <= target_width {
        return source;
    }
    let h = (src_h as f64 * target_width as f64 / src_w as f64).round() as u32;
    (target_width, h.max(1))
}

/// Dimensions that fit inside a `bound`×`bound` box.
///
/// Only the limiting dimension reaches the bound; the other shrinks with the
/// aspect ratio. Sources already inside the box are returned unchanged.
///
/// # Examples
/// ```
/// # use contact_sheet::imaging::fit_inside_dimensions;
/// assert_eq!(fit_inside_dimensions((6000, 4000), 2048), (2048, 1365));
/// assert_eq!(fit_inside_dimensions((3000, 4500), 2048), (1365, 2048));
/// assert_eq!(fit_inside_dimensions((1200, 800), 2048), (1200, 800));
/// ```
pub fn fit_inside_dimensions(source: (u32, u32), bound: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 || (src_w <= bound && src_h <= bound) {
        return source;
    }
    let scale = (bound as f64 / src_w as f64).min(bound as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, bound);
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, bound);
    (w, h)
}
