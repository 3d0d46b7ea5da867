//! Randomized cosmetic filter chains used to diversify rendered outputs.
//!
//! Every call to [`FilterChainSpec::generate`] draws fresh parameters from the
//! supplied random source; nothing is shared or remembered between calls.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::media::shorts_layout_graph;

pub const SPEED_FACTOR_RANGE: RangeInclusive<f64> = 1.01..=1.03;
pub const BRIGHTNESS_RANGE: RangeInclusive<f64> = -0.02..=0.02;
pub const CONTRAST_RANGE: RangeInclusive<f64> = 0.98..=1.02;
pub const SATURATION_RANGE: RangeInclusive<f64> = 0.98..=1.02;

/// Opacity of the grain overlay
pub const NOISE_OPACITY: f64 = 0.03;

/// Randomized filter parameters plus the derived filter-graph strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterChainSpec {
    pub speed_factor: f64,
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    /// Video speed jitter (`setpts`)
    pub speed_filter: String,
    /// Audio tempo matching the video speed jitter (`atempo`)
    pub tempo_filter: String,
    /// Colour jitter (`eq`)
    pub color_filter: String,
    /// Grain source chain, applied to a copy of the video
    pub noise_filter: String,
    /// Video output is re-laid out to 9:16
    #[serde(default)]
    pub vertical: bool,
    /// Complete graph producing `[outv]` and `[outa]` from input 0
    pub filter_complex: String,
}

impl FilterChainSpec {
    /// Draw a new chain from `rng`
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let speed_factor = rng.gen_range(SPEED_FACTOR_RANGE);
        let brightness = rng.gen_range(BRIGHTNESS_RANGE);
        let contrast = rng.gen_range(CONTRAST_RANGE);
        let saturation = rng.gen_range(SATURATION_RANGE);

        let speed_filter = format!("setpts=PTS/{:.4}", speed_factor);
        let tempo_filter = format!("atempo={:.4}", speed_factor);
        let color_filter = format!(
            "eq=brightness={:.3}:contrast={:.3}:saturation={:.3}",
            brightness, contrast, saturation
        );
        let noise_filter = format!(
            "geq=lum='random(1)*255':cb=128:cr=128,deflate,format=yuva420p,colorchannelmixer=aa={}",
            NOISE_OPACITY
        );

        let mut chain = Self {
            speed_factor,
            brightness,
            contrast,
            saturation,
            speed_filter,
            tempo_filter,
            color_filter,
            noise_filter,
            vertical: false,
            filter_complex: String::new(),
        };
        chain.filter_complex = chain.compose_graph();
        chain
    }

    /// Same parameters, with the filtered video converted to 9:16 before `[outv]`
    pub fn with_shorts_layout(mut self) -> Self {
        self.vertical = true;
        self.filter_complex = self.compose_graph();
        self
    }

    fn compose_graph(&self) -> String {
        let video_out = if self.vertical { "filtered" } else { "outv" };
        let mut graph = format!(
            "[0:v]{speed},{color},split[base][grain_src];\
             [grain_src]{noise}[noise];\
             [base][noise]overlay=shortest=1,format=yuv420p[{video_out}];\
             [0:a]{tempo}[outa]",
            speed = self.speed_filter,
            color = self.color_filter,
            noise = self.noise_filter,
            tempo = self.tempo_filter,
            video_out = video_out,
        );

        if self.vertical {
            graph.push(';');
            graph.push_str(&shorts_layout_graph(video_out, "outv"));
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_parameters_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..10_000 {
            let chain = FilterChainSpec::generate(&mut rng);
            assert!(SPEED_FACTOR_RANGE.contains(&chain.speed_factor), "speed {}", chain.speed_factor);
            assert!(BRIGHTNESS_RANGE.contains(&chain.brightness), "brightness {}", chain.brightness);
            assert!(CONTRAST_RANGE.contains(&chain.contrast), "contrast {}", chain.contrast);
            assert!(SATURATION_RANGE.contains(&chain.saturation), "saturation {}", chain.saturation);
        }
    }

    #[test]
    fn test_fixed_seed_is_deterministic() {
        let a = FilterChainSpec::generate(&mut StdRng::seed_from_u64(42));
        let b = FilterChainSpec::generate(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_consecutive_chains_differ() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = FilterChainSpec::generate(&mut rng);
        let b = FilterChainSpec::generate(&mut rng);
        assert_ne!(a.filter_complex, b.filter_complex);
    }

    #[test]
    fn test_graph_wires_labelled_outputs() {
        let chain = FilterChainSpec::generate(&mut StdRng::seed_from_u64(1));

        assert!(chain.filter_complex.starts_with("[0:v]setpts=PTS/"));
        assert!(chain.filter_complex.contains(&chain.color_filter));
        assert!(chain.filter_complex.contains("colorchannelmixer=aa=0.03[noise]"));
        assert!(chain.filter_complex.contains("[base][noise]overlay=shortest=1"));
        assert!(chain.filter_complex.ends_with(&format!("[0:a]{}[outa]", chain.tempo_filter)));
        assert!(chain.filter_complex.contains("[outv]"));
    }

    #[test]
    fn test_shorts_layout_feeds_outv() {
        let wide = FilterChainSpec::generate(&mut StdRng::seed_from_u64(5));
        let tall = wide.clone().with_shorts_layout();

        assert!(!wide.vertical);
        assert!(tall.vertical);
        assert_eq!(tall.speed_factor, wide.speed_factor);
        assert!(tall.filter_complex.contains("format=yuv420p[filtered]"));
        assert!(tall.filter_complex.ends_with(&shorts_layout_graph("filtered", "outv")));
        assert_eq!(tall.filter_complex.matches("[outv]").count(), 1);
        assert!(tall.filter_complex.contains("[outa]"));
        assert!(!wide.filter_complex.contains("boxblur"));
    }

    #[test]
    fn test_speed_and_tempo_use_same_factor() {
        let chain = FilterChainSpec::generate(&mut StdRng::seed_from_u64(99));
        let factor = format!("{:.4}", chain.speed_factor);
        assert_eq!(chain.speed_filter, format!("setpts=PTS/{}", factor));
        assert_eq!(chain.tempo_filter, format!("atempo={}", factor));
    }
}
