use std::fmt;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, DubError};

/// Abstract media processing command representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Copy video stream
    pub fn copy_video(self) -> Self {
        self.video_codec("copy")
    }

    /// Disable video
    pub fn no_video(self) -> Self {
        self.arg("-vn")
    }

    /// Set audio sample rate
    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.arg("-ar").arg(rate.to_string())
    }

    /// Set audio channels
    pub fn audio_channels(self, channels: u32) -> Self {
        self.arg("-ac").arg(channels.to_string())
    }

    /// Add a filter graph with labelled outputs
    pub fn filter_complex<S: Into<String>>(self, graph: S) -> Self {
        self.arg("-filter_complex").arg(graph)
    }

    /// Map an input stream (`0:v:0`) or filter output label (`[v_out]`)
    pub fn map<S: Into<String>>(self, stream: S) -> Self {
        self.arg("-map").arg(stream)
    }

    /// Set encoder preset
    pub fn preset<S: Into<String>>(self, preset: S) -> Self {
        self.arg("-preset").arg(preset)
    }

    /// Stop writing when the shortest stream ends
    pub fn shortest(self) -> Self {
        self.arg("-shortest")
    }

    /// Whether the argument list contains `arg` verbatim
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Value following the first occurrence of `flag`
    pub fn arg_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|idx| self.args.get(idx + 1))
            .map(String::as_str)
    }

    /// Values following every occurrence of `flag`
    pub fn arg_values(&self, flag: &str) -> Vec<&str> {
        self.args
            .windows(2)
            .filter(|pair| pair[0] == flag)
            .map(|pair| pair[1].as_str())
            .collect()
    }

    /// Execute the command
    pub async fn execute(&self) -> Result<()> {
        debug!("Executing media processing command: {} {:?}", self.binary_path, self.args);
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| DubError::Media(format!("Failed to execute media processor: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DubError::Media(format!(
                "{} failed: {}",
                self.description,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

impl fmt::Display for MediaCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.binary_path)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == ';' || c == '[') {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Vertical 9:16 layout: the source scaled to full width, centred over a
/// blurred fill of itself
pub const SHORTS_LAYOUT_FILTER: &str = "split[sh_main][sh_fill];\
    [sh_fill]scale=1080:1920:force_original_aspect_ratio=increase,crop=1080:1920,boxblur=20:10[sh_bg];\
    [sh_main]scale=1080:-1[sh_fg];\
    [sh_bg][sh_fg]overlay=(W-w)/2:(H-h)/2";

/// [`SHORTS_LAYOUT_FILTER`] wired between two graph labels
pub fn shorts_layout_graph(input_label: &str, output_label: &str) -> String {
    format!("[{}]{}[{}]", input_label, SHORTS_LAYOUT_FILTER, output_label)
}

/// Builder for common media processing operations
#[derive(Debug, Clone)]
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build audio extraction command (PCM WAV for speech recognition)
    pub fn extract_audio<P: AsRef<Path>>(
        &self,
        video_path: P,
        audio_path: P,
        sample_rate: u32,
        channels: u32,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Audio extraction")
            .overwrite()
            .input(video_path)
            .no_video()
            .map("0:a:0")
            .audio_codec("pcm_s16le")
            .audio_sample_rate(sample_rate)
            .audio_channels(channels)
            .output(audio_path)
    }

    /// Build the final render command applying a filter graph with `[outv]`/`[outa]` outputs
    pub fn render_filtered<P: AsRef<Path>>(
        &self,
        input_path: P,
        filter_graph: &str,
        output_path: P,
        video_codec: &str,
        audio_codec: &str,
        preset: &str,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Filter render")
            .overwrite()
            .input(input_path)
            .filter_complex(filter_graph)
            .map("[outv]")
            .map("[outa]")
            .video_codec(video_codec)
            .preset(preset)
            .audio_codec(audio_codec)
            .output(output_path)
    }

    /// Build a 16:9 to 9:16 conversion; audio is copied untouched
    pub fn resize_to_shorts<P: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: P,
        video_codec: &str,
        preset: &str,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Shorts resize")
            .overwrite()
            .input(input_path)
            .filter_complex(shorts_layout_graph("0:v", "outv"))
            .map("[outv]")
            .map("0:a?")
            .video_codec(video_codec)
            .preset(preset)
            .audio_codec("copy")
            .output(output_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check")
            .arg("-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_audio_args() {
        let builder = MediaCommandBuilder::new("ffmpeg");
        let cmd = builder.extract_audio("in.mp4", "out.wav", 16000, 1);

        assert_eq!(
            cmd.args,
            vec![
                "-y", "-i", "in.mp4", "-vn", "-map", "0:a:0", "-c:a", "pcm_s16le",
                "-ar", "16000", "-ac", "1", "out.wav"
            ]
        );
    }

    #[test]
    fn test_render_filtered_maps_labels() {
        let builder = MediaCommandBuilder::new("ffmpeg");
        let cmd = builder.render_filtered("synced.mp4", "[0:v]null[outv];[0:a]anull[outa]", "final.mp4", "libx264", "aac", "fast");

        assert_eq!(cmd.arg_values("-map"), vec!["[outv]", "[outa]"]);
        assert_eq!(cmd.arg_value("-c:v"), Some("libx264"));
        assert_eq!(cmd.arg_value("-c:a"), Some("aac"));
        assert_eq!(cmd.args.last().map(String::as_str), Some("final.mp4"));
    }

    #[test]
    fn test_resize_to_shorts_args() {
        let builder = MediaCommandBuilder::new("ffmpeg");
        let cmd = builder.resize_to_shorts("wide.mp4", "tall.mp4", "libx264", "fast");

        assert_eq!(
            cmd.args,
            vec![
                "-y".to_string(), "-i".to_string(), "wide.mp4".to_string(),
                "-filter_complex".to_string(), shorts_layout_graph("0:v", "outv"),
                "-map".to_string(), "[outv]".to_string(), "-map".to_string(), "0:a?".to_string(),
                "-c:v".to_string(), "libx264".to_string(), "-preset".to_string(), "fast".to_string(),
                "-c:a".to_string(), "copy".to_string(), "tall.mp4".to_string(),
            ]
        );
    }

    #[test]
    fn test_shorts_layout_graph_fills_vertical_frame() {
        let graph = shorts_layout_graph("in", "out");

        assert!(graph.starts_with("[in]split[sh_main][sh_fill];"));
        assert!(graph.contains("scale=1080:1920:force_original_aspect_ratio=increase,crop=1080:1920,boxblur=20:10[sh_bg]"));
        assert!(graph.contains("[sh_main]scale=1080:-1[sh_fg]"));
        assert!(graph.ends_with("[sh_bg][sh_fg]overlay=(W-w)/2:(H-h)/2[out]"));
    }

    #[test]
    fn test_display_quotes_filter_graphs() {
        let cmd = MediaCommand::new("ffmpeg", "Test")
            .input("a.mp4")
            .filter_complex("[0:v]null[v]");

        assert_eq!(cmd.to_string(), "ffmpeg -i a.mp4 -filter_complex '[0:v]null[v]'");
    }

    #[tokio::test]
    async fn test_execute_missing_binary_is_media_error() {
        let cmd = MediaCommand::new("/nonexistent/dubsync-ffmpeg", "Missing binary").arg("-version");
        let err = cmd.execute().await.unwrap_err();
        assert!(matches!(err, DubError::Media(_)));
    }
}
