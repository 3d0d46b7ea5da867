//! Dubsync - Automated Video Dubbing Workflow
//!
//! Extracts speech from a video, transcribes and translates it with a persona,
//! synthesizes a new voice track, reconciles its duration with the original
//! video, and renders the result with ffmpeg.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod jobs;
pub mod sync;
pub mod filters;
pub mod media;
pub mod transcribe;
pub mod translate;
pub mod voice;
pub mod assets;
pub mod error;
