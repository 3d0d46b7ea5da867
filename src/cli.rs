use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Dub a single video and wait for the result
    Process {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Target language code
        #[arg(short, long, default_value = "ja")]
        target_lang: String,

        /// Output directory for final renders
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Skip the randomized output filters
        #[arg(long)]
        no_filters: bool,

        /// Render a vertical 9:16 video with a blurred background
        #[arg(long)]
        shorts: bool,

        /// Synthesis voice, overriding the configured one
        #[arg(long)]
        voice: Option<String>,

        /// Print the final job record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dub all video files in a directory
    Batch {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Target language code
        #[arg(short, long, default_value = "ja")]
        target_lang: String,

        /// Output directory for final renders
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Render vertical 9:16 videos with a blurred background
        #[arg(long)]
        shorts: bool,

        /// Synthesis voice, overriding the configured one
        #[arg(long)]
        voice: Option<String>,
    },

    /// Print the duration of a media file
    Probe {
        /// Media file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show how a voice track would be synced to a video, without running it
    Plan {
        /// Source video
        #[arg(long)]
        video: PathBuf,

        /// Synthesized voice track
        #[arg(long)]
        audio: PathBuf,

        /// Output file used in the printed command
        #[arg(short, long, default_value = "synced.mp4")]
        output: PathBuf,
    },

    /// Sync a voice track to a video
    Sync {
        /// Source video
        #[arg(long)]
        video: PathBuf,

        /// Synthesized voice track
        #[arg(long)]
        audio: PathBuf,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print a randomized filter chain
    Filters {
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Extract audio from video file
    Extract {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Generate images from text prompts with the configured generator
    Assets {
        /// File with one prompt per line
        #[arg(short, long)]
        prompts: PathBuf,

        /// Directory for generated images
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Check that the media tools are available
    Check,
}
