//! Audio/video duration reconciliation.
//!
//! Given the duration of the source video and of the newly synthesized voice
//! track, [`SyncPlanner`] picks exactly one strategy and produces the ffmpeg
//! invocation that realizes it. Planning is pure: no I/O, no hidden state, and
//! identical inputs always give identical decisions.

use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::config::MediaConfig;
use crate::media::{MediaCommand, ProbedDuration};

/// Mismatches shorter than this are imperceptible and muxed as-is
pub const NEGLIGIBLE_DELTA_SECS: f64 = 0.1;

/// Fastest video playback that still looks natural
pub const MAX_NATURAL_SPEEDUP: f64 = 1.10;

/// Reconciliation strategy together with its parameters
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStrategy {
    /// Mux unmodified, truncate to the shorter stream
    Passthrough,
    /// Audio is longer: clone the last video frame for `pad_secs`
    FreezePad { pad_secs: f64 },
    /// Video is slightly longer: scale video timestamps by `pts_multiplier`
    SpeedUp { speed_factor: f64, pts_multiplier: f64 },
    /// Video is much longer: append `pad_secs` of silence to the audio
    SilencePad { pad_secs: f64, speed_factor: f64 },
}

impl SyncStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Passthrough => "passthrough",
            Self::FreezePad { .. } => "freeze-pad",
            Self::SpeedUp { .. } => "speed-up",
            Self::SilencePad { .. } => "silence-pad",
        }
    }
}

impl fmt::Display for SyncStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passthrough => write!(f, "passthrough"),
            Self::FreezePad { pad_secs } => write!(f, "freeze-pad ({:.3}s)", pad_secs),
            Self::SpeedUp { speed_factor, pts_multiplier } => {
                write!(f, "speed-up ({:.4}x, setpts {:.4})", speed_factor, pts_multiplier)
            }
            Self::SilencePad { pad_secs, speed_factor } => {
                write!(f, "silence-pad ({:.3}s, speed-up {:.4}x rejected)", pad_secs, speed_factor)
            }
        }
    }
}

/// Files taking part in a sync operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPaths {
    pub video: PathBuf,
    pub audio: PathBuf,
    pub output: PathBuf,
}

impl SyncPaths {
    pub fn new<V, A, O>(video: V, audio: A, output: O) -> Self
    where
        V: Into<PathBuf>,
        A: Into<PathBuf>,
        O: Into<PathBuf>,
    {
        Self {
            video: video.into(),
            audio: audio.into(),
            output: output.into(),
        }
    }
}

/// Outcome of planning: immutable, consumed once by the execution step
#[derive(Debug, Clone, PartialEq)]
pub struct SyncDecision {
    pub video_secs: f64,
    pub audio_secs: f64,
    /// `audio_secs - video_secs`
    pub delta: f64,
    pub strategy: SyncStrategy,
    pub command: MediaCommand,
}

/// Chooses how to reconcile a voice track with the source video
#[derive(Debug, Clone)]
pub struct SyncPlanner {
    binary_path: String,
    video_codec: String,
    audio_codec: String,
    preset: String,
}

impl SyncPlanner {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            binary_path: config.binary_path.clone(),
            video_codec: config.video_codec.clone(),
            audio_codec: config.audio_codec.clone(),
            preset: config.preset.clone(),
        }
    }

    /// Select the strategy for the two durations and build its command
    pub fn plan(&self, video_secs: f64, audio_secs: f64, paths: &SyncPaths) -> SyncDecision {
        let strategy = choose_strategy(video_secs, audio_secs);
        debug!(
            "Sync plan: video {:.3}s, audio {:.3}s -> {}",
            video_secs, audio_secs, strategy
        );

        let command = self.build_command(&strategy, paths);
        SyncDecision {
            video_secs,
            audio_secs,
            delta: audio_secs - video_secs,
            strategy,
            command,
        }
    }

    /// Plan from probe results; an unknown duration falls back to a plain mux
    pub fn plan_probed(
        &self,
        video: &ProbedDuration,
        audio: &ProbedDuration,
        paths: &SyncPaths,
    ) -> SyncDecision {
        match (video.secs(), audio.secs()) {
            (Some(video_secs), Some(audio_secs)) => self.plan(video_secs, audio_secs, paths),
            _ => {
                warn!(
                    "Duration unknown (video: {}, audio: {}); muxing without reconciliation",
                    video, audio
                );
                let strategy = SyncStrategy::Passthrough;
                let command = self.build_command(&strategy, paths);
                SyncDecision {
                    video_secs: video.seconds_or_sentinel(),
                    audio_secs: audio.seconds_or_sentinel(),
                    delta: 0.0,
                    strategy,
                    command,
                }
            }
        }
    }

    fn build_command(&self, strategy: &SyncStrategy, paths: &SyncPaths) -> MediaCommand {
        let base = MediaCommand::new(&self.binary_path, format!("Audio/video sync ({})", strategy.name()))
            .overwrite()
            .input(&paths.video)
            .input(&paths.audio);

        let command = match strategy {
            SyncStrategy::Passthrough => base
                .copy_video()
                .audio_codec(&self.audio_codec)
                .map("0:v:0")
                .map("1:a:0")
                .shortest(),
            SyncStrategy::FreezePad { pad_secs } => base
                .filter_complex(format!("[0:v]tpad=stop_mode=clone:stop_duration={}[v_out]", pad_secs))
                .map("[v_out]")
                .map("1:a:0")
                .video_codec(&self.video_codec)
                .preset(&self.preset)
                .audio_codec(&self.audio_codec),
            SyncStrategy::SpeedUp { pts_multiplier, .. } => base
                .filter_complex(format!("[0:v]setpts={}*PTS[v_out]", pts_multiplier))
                .map("[v_out]")
                .map("1:a:0")
                .video_codec(&self.video_codec)
                .preset(&self.preset)
                .audio_codec(&self.audio_codec),
            SyncStrategy::SilencePad { pad_secs, .. } => base
                .filter_complex(format!("[1:a]apad=pad_dur={}[a_out]", pad_secs))
                .map("0:v:0")
                .map("[a_out]")
                .copy_video()
                .audio_codec(&self.audio_codec)
                .shortest(),
        };

        command.output(&paths.output)
    }
}

/// Decision procedure over the two durations, evaluated in fixed order.
///
/// Both durations must be finite; unknown durations go through
/// [`SyncPlanner::plan_probed`].
pub fn choose_strategy(video_secs: f64, audio_secs: f64) -> SyncStrategy {
    debug_assert!(
        video_secs.is_finite() && audio_secs.is_finite(),
        "durations must be finite: video {}, audio {}",
        video_secs,
        audio_secs
    );
    let delta = audio_secs - video_secs;

    if delta.abs() < NEGLIGIBLE_DELTA_SECS {
        return SyncStrategy::Passthrough;
    }

    if delta > 0.0 {
        return SyncStrategy::FreezePad { pad_secs: delta };
    }

    // Video is longer; the negligible branch already excluded equal durations.
    let speed_factor = video_secs / audio_secs;
    if speed_factor > MAX_NATURAL_SPEEDUP {
        SyncStrategy::SilencePad {
            pad_secs: -delta,
            speed_factor,
        }
    } else {
        SyncStrategy::SpeedUp {
            speed_factor,
            pts_multiplier: audio_secs / video_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner() -> SyncPlanner {
        SyncPlanner::new(&MediaConfig::default())
    }

    fn paths() -> SyncPaths {
        SyncPaths::new("video.mp4", "voice.mp3", "synced.mp4")
    }

    #[test]
    fn test_small_mismatch_is_passthrough() {
        let decision = planner().plan(10.0, 10.05, &paths());
        assert_eq!(decision.strategy, SyncStrategy::Passthrough);

        let decision = planner().plan(10.0, 9.95, &paths());
        assert_eq!(decision.strategy, SyncStrategy::Passthrough);

        let decision = planner().plan(10.0, 10.0, &paths());
        assert_eq!(decision.strategy, SyncStrategy::Passthrough);
    }

    #[test]
    fn test_delta_just_under_threshold_is_passthrough() {
        // 10.10 - 10.0 is 0.0999... in binary floating point
        let decision = planner().plan(10.0, 10.10, &paths());
        assert_eq!(decision.strategy, SyncStrategy::Passthrough);

        let decision = planner().plan(10.0, 10.0999999995, &paths());
        assert_eq!(decision.strategy, SyncStrategy::Passthrough);

        let decision = planner().plan(10.0999999995, 10.0, &paths());
        assert_eq!(decision.strategy, SyncStrategy::Passthrough);
    }

    #[test]
    fn test_exact_delta_above_threshold_freezes() {
        // 0.125 is exactly representable
        let decision = planner().plan(10.0, 10.125, &paths());
        assert_eq!(decision.strategy, SyncStrategy::FreezePad { pad_secs: 0.125 });
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "durations must be finite")]
    fn test_non_finite_duration_is_rejected() {
        choose_strategy(10.0, f64::NAN);
    }

    #[test]
    fn test_longer_audio_freezes_last_frame() {
        let decision = planner().plan(10.0, 12.0, &paths());
        assert_eq!(decision.strategy, SyncStrategy::FreezePad { pad_secs: 2.0 });
        assert_eq!(decision.delta, 2.0);

        let cmd = &decision.command;
        assert_eq!(
            cmd.arg_value("-filter_complex"),
            Some("[0:v]tpad=stop_mode=clone:stop_duration=2[v_out]")
        );
        assert_eq!(cmd.arg_values("-map"), vec!["[v_out]", "1:a:0"]);
        assert_eq!(cmd.arg_value("-c:v"), Some("libx264"));
        assert_eq!(cmd.arg_value("-c:a"), Some("aac"));
        assert!(!cmd.has_arg("-shortest"));
    }

    #[test]
    fn test_slightly_longer_video_speeds_up() {
        let decision = planner().plan(12.0, 11.0, &paths());
        match decision.strategy {
            SyncStrategy::SpeedUp { speed_factor, pts_multiplier } => {
                assert_eq!(speed_factor, 12.0 / 11.0);
                assert!(speed_factor <= MAX_NATURAL_SPEEDUP);
                assert_eq!(pts_multiplier, 11.0 / 12.0);
                assert!((pts_multiplier - 0.9167).abs() < 1e-4);
            }
            other => panic!("expected speed-up, got {:?}", other),
        }

        let cmd = &decision.command;
        assert_eq!(
            cmd.arg_value("-filter_complex").map(|g| g.starts_with("[0:v]setpts=0.9166")),
            Some(true)
        );
        assert_eq!(cmd.arg_values("-map"), vec!["[v_out]", "1:a:0"]);
        assert_eq!(cmd.arg_value("-c:v"), Some("libx264"));
    }

    #[test]
    fn test_much_longer_video_pads_silence() {
        let decision = planner().plan(12.0, 9.0, &paths());
        match decision.strategy {
            SyncStrategy::SilencePad { pad_secs, speed_factor } => {
                assert_eq!(pad_secs, 3.0);
                assert!(speed_factor > MAX_NATURAL_SPEEDUP);
            }
            other => panic!("expected silence-pad, got {:?}", other),
        }

        let cmd = &decision.command;
        assert_eq!(cmd.arg_value("-filter_complex"), Some("[1:a]apad=pad_dur=3[a_out]"));
        assert_eq!(cmd.arg_values("-map"), vec!["0:v:0", "[a_out]"]);
        assert_eq!(cmd.arg_value("-c:v"), Some("copy"));
        assert_eq!(cmd.arg_value("-c:a"), Some("aac"));
        assert!(cmd.has_arg("-shortest"));
    }

    #[test]
    fn test_speedup_ceiling_is_inclusive() {
        // 11 / 10 is exactly the ceiling
        let strategy = choose_strategy(11.0, 10.0);
        assert!(matches!(strategy, SyncStrategy::SpeedUp { .. }));

        let strategy = choose_strategy(11.2, 10.0);
        assert!(matches!(strategy, SyncStrategy::SilencePad { .. }));
    }

    #[test]
    fn test_passthrough_command_copies_video() {
        let decision = planner().plan(30.0, 30.02, &paths());
        let cmd = &decision.command;

        assert_eq!(
            cmd.args,
            vec![
                "-y", "-i", "video.mp4", "-i", "voice.mp3", "-c:v", "copy", "-c:a", "aac",
                "-map", "0:v:0", "-map", "1:a:0", "-shortest", "synced.mp4"
            ]
        );
        assert_eq!(cmd.binary_path, "ffmpeg");
        assert!(!cmd.has_arg("-filter_complex"));
    }

    #[test]
    fn test_planning_is_idempotent() {
        let planner = planner();
        for (video, audio) in [(10.0, 12.0), (12.0, 11.0), (12.0, 9.0), (5.0, 5.01)] {
            assert_eq!(planner.plan(video, audio, &paths()), planner.plan(video, audio, &paths()));
        }
    }

    #[test]
    fn test_branch_properties_over_grid() {
        let planner = planner();
        let mut video = 0.5;
        while video < 40.0 {
            let mut audio = 0.5;
            while audio < 40.0 {
                let delta = audio - video;
                let decision = planner.plan(video, audio, &paths());
                match decision.strategy {
                    SyncStrategy::Passthrough => assert!(delta.abs() < NEGLIGIBLE_DELTA_SECS),
                    SyncStrategy::FreezePad { pad_secs } => {
                        assert!(delta > 0.0);
                        assert_eq!(pad_secs, delta);
                    }
                    SyncStrategy::SpeedUp { speed_factor, pts_multiplier } => {
                        assert!(speed_factor > 1.0 && speed_factor <= MAX_NATURAL_SPEEDUP);
                        assert_eq!(pts_multiplier, audio / video);
                    }
                    SyncStrategy::SilencePad { pad_secs, speed_factor } => {
                        assert!(speed_factor > MAX_NATURAL_SPEEDUP);
                        assert_eq!(pad_secs, video - audio);
                    }
                }
                audio += 0.37;
            }
            video += 0.41;
        }
    }

    #[test]
    fn test_unusable_known_duration_falls_back_to_passthrough() {
        for bad in [f64::NAN, f64::INFINITY, 0.0, -3.0] {
            let decision = planner().plan_probed(
                &ProbedDuration::Known(10.0),
                &ProbedDuration::Known(bad),
                &paths(),
            );
            assert_eq!(decision.strategy, SyncStrategy::Passthrough);
            assert!(!decision.command.to_string().contains("NaN"));
        }
    }

    #[test]
    fn test_unknown_duration_falls_back_to_passthrough() {
        let decision = planner().plan_probed(
            &ProbedDuration::Known(10.0),
            &ProbedDuration::unknown("probe failed"),
            &paths(),
        );
        assert_eq!(decision.strategy, SyncStrategy::Passthrough);
        assert_eq!(decision.audio_secs, 0.0);
        assert!(decision.command.has_arg("-shortest"));

        let decision = planner().plan_probed(
            &ProbedDuration::Known(10.0),
            &ProbedDuration::Known(12.0),
            &paths(),
        );
        assert_eq!(decision.strategy, SyncStrategy::FreezePad { pad_secs: 2.0 });
    }

    #[test]
    fn test_configured_codecs_are_used() {
        let config = MediaConfig {
            binary_path: "/usr/local/bin/ffmpeg".to_string(),
            video_codec: "libx265".to_string(),
            audio_codec: "libopus".to_string(),
            preset: "slow".to_string(),
            ..MediaConfig::default()
        };
        let decision = SyncPlanner::new(&config).plan(10.0, 12.0, &paths());

        assert_eq!(decision.command.binary_path, "/usr/local/bin/ffmpeg");
        assert_eq!(decision.command.arg_value("-c:v"), Some("libx265"));
        assert_eq!(decision.command.arg_value("-c:a"), Some("libopus"));
        assert_eq!(decision.command.arg_value("-preset"), Some("slow"));
    }
}
