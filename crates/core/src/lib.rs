//! Batch conversion of video files to other containers or to GIF.
//!
//! The encoding itself is delegated to the `ffmpeg` executable; this crate
//! owns job construction, output path resolution, GIF parameter clamping
//! and the sequential batch orchestrator that reports progress events.

pub mod conversion;
pub mod pipeline;
pub mod shared;
