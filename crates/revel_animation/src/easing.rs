//! Easing functions
//!
//! All curves map [0,1] → [0,1] and are monotonic, except the back/elastic
//! variants which intentionally overshoot. Consumers must not clamp
//! intermediate output; natural-domain clamping happens at the style sink.

/// Easing curve applied to normalized segment time
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    /// Quadratic ease-in-out (gentle, used for pulses)
    QuadInOut,
    /// Cubic ease-in
    EaseIn,
    /// Cubic ease-out (the workhorse entrance curve)
    EaseOut,
    /// Cubic ease-in-out
    EaseInOut,
    /// Overshoots past 1 before settling
    BackOut,
    /// Decaying oscillation around 1
    ElasticOut,
}

impl Easing {
    /// Remap normalized time through this curve
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::BackOut => {
                const C1: f32 = 1.70158;
                const C3: f32 = C1 + 1.0;
                1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
            }
            Easing::ElasticOut => {
                const C4: f32 = std::f32::consts::TAU / 3.0;
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else {
                    2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * C4).sin() + 1.0
                }
            }
        }
    }

    /// Whether this curve may transiently leave [0,1]
    pub fn overshoots(&self) -> bool {
        matches!(self, Easing::BackOut | Easing::ElasticOut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: &[Easing] = &[
        Easing::Linear,
        Easing::QuadInOut,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::BackOut,
        Easing::ElasticOut,
    ];

    #[test]
    fn test_endpoints_fixed() {
        for ease in CURVES {
            assert!((ease.apply(0.0) - 0.0).abs() < 1e-5, "{:?} at 0", ease);
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-5, "{:?} at 1", ease);
        }
    }

    #[test]
    fn test_monotonic_curves_stay_in_range() {
        for ease in CURVES.iter().filter(|e| !e.overshoots()) {
            let mut prev = 0.0;
            for i in 0..=100 {
                let v = ease.apply(i as f32 / 100.0);
                assert!((0.0..=1.0).contains(&v), "{:?} left [0,1]: {}", ease, v);
                assert!(v >= prev - 1e-6, "{:?} not monotonic", ease);
                prev = v;
            }
        }
    }

    #[test]
    fn test_back_out_overshoots() {
        let peak = (0..=100)
            .map(|i| Easing::BackOut.apply(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
    }
}
