//! Image processing on top of the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader`, EXIF orientation applied |
//! | **Thumbnail** | fixed width, aspect kept, Lanczos3 → JPEG |
//! | **Optimized** | fit inside a square bound, Lanczos3 → JPEG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{fit_inside_dimensions, thumbnail_dimensions};
pub use operations::{
    OptimizedImageConfig, ThumbnailConfig, create_optimized, create_thumbnail, plan_optimized,
    plan_thumbnail,
};
pub use params::{DerivativeKind, DerivativeParams, Quality};
pub use rust_backend::RustBackend;
