use serde::{Deserialize, Serialize};

/// Timing curve attached to every render command. Painters map these onto their
/// platform's equivalent (CSS `cubic-bezier`, a tween library, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    QuadInOut,
    CubicInOut,
}

impl Easing {
    /// Map `t` in [0, 1] to eased progress in [0, 1].
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Linear stagger: item `i` starts `i * step_ms` after the first.
pub fn stagger_delay(index: usize, step_ms: u32) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX).saturating_mul(step_ms)
}

/// Progress of a delayed transition at `elapsed_ms`, in [0, 1] before easing.
pub fn progress(elapsed_ms: f32, delay_ms: u32, duration_ms: u32) -> f32 {
    if duration_ms == 0 {
        return if elapsed_ms >= delay_ms as f32 { 1.0 } else { 0.0 };
    }
    ((elapsed_ms - delay_ms as f32) / duration_ms as f32).clamp(0.0, 1.0)
}
