//! Elapsed time -> frame index for looping animations.

use crate::error::SheetError;
use crate::registry::ImageEntry;
use crate::sheet::{Animation, SpriteSheet};

/// Frame of `animation` shown `elapsed_secs` after it started, looping
/// forever.
///
/// Time is taken to whole microseconds before the modulo so that float
/// noise never moves a frame boundary. Negative time wraps backwards
/// into the loop. NaN, infinities and times too large to express in
/// microseconds are rejected.
pub fn frame_at(
    sheet: &SpriteSheet,
    animation: &Animation,
    elapsed_secs: f64,
) -> Result<usize, SheetError> {
    if !elapsed_secs.is_finite() {
        return Err(SheetError::new("invalid-time").with_arg("elapsed", elapsed_secs));
    }

    let period_us = animation.total_duration_ms.saturating_mul(1000);
    if period_us == 0 {
        return Err(walk_exhausted(animation, elapsed_secs));
    }

    let micros = (elapsed_secs * 1_000_000.0).round();
    if !micros.is_finite() {
        return Err(SheetError::new("invalid-time").with_arg("elapsed", elapsed_secs));
    }
    let local_us = micros.rem_euclid(period_us as f64) as u64;

    let mut cumulative_us = 0u64;
    for index in animation.from..=animation.to {
        let Some(frame) = sheet.frames.get(index) else {
            break;
        };
        cumulative_us += u64::from(frame.duration) * 1000;
        if cumulative_us > local_us {
            return Ok(index);
        }
    }

    Err(walk_exhausted(animation, elapsed_secs))
}

fn walk_exhausted(animation: &Animation, elapsed_secs: f64) -> SheetError {
    SheetError::new("frame-walk-exhausted")
        .with_arg("from", animation.from)
        .with_arg("to", animation.to)
        .with_arg("total_ms", animation.total_duration_ms)
        .with_arg("elapsed", elapsed_secs)
}

/// [`frame_at`] on a loaded entry, looking the animation up by name.
///
/// The entry must be ready and must define `animation_name`.
pub fn resolve_frame(
    entry: &ImageEntry,
    animation_name: &str,
    elapsed_secs: f64,
) -> Result<usize, SheetError> {
    let sheet = match entry.sheet() {
        Some(sheet) if entry.is_ready() => sheet,
        _ => return Err(SheetError::new("not-ready").with_arg("name", entry.name())),
    };

    let animation = sheet.animation(animation_name).ok_or_else(|| {
        SheetError::new("unknown-animation")
            .with_arg("name", entry.name())
            .with_arg("animation", animation_name)
    })?;

    frame_at(sheet, animation, elapsed_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{Direction, Frame, Rect};

    fn sheet(durations: &[u32]) -> SpriteSheet {
        SpriteSheet {
            frames: durations
                .iter()
                .enumerate()
                .map(|(i, &duration)| Frame {
                    rect: Rect::new(i as u32 * 16, 0, 16, 16),
                    duration,
                })
                .collect(),
            animations: Default::default(),
        }
    }

    fn anim(sheet: &SpriteSheet, from: usize, to: usize) -> Animation {
        Animation {
            from,
            to,
            total_duration_ms: sheet.frames[from..=to]
                .iter()
                .map(|f| u64::from(f.duration))
                .sum(),
            direction: Direction::Forward,
        }
    }

    #[test]
    fn hero_idle_scenario() {
        let s = sheet(&[100, 200]);
        let idle = anim(&s, 0, 1);
        assert_eq!(idle.total_duration_ms, 300);
        assert_eq!(frame_at(&s, &idle, 0.05).unwrap(), 0);
        assert_eq!(frame_at(&s, &idle, 0.15).unwrap(), 1);
        assert_eq!(frame_at(&s, &idle, 0.35).unwrap(), 0);
    }

    #[test]
    fn time_zero_is_first_frame() {
        let s = sheet(&[30, 70, 20, 40]);
        for (from, to) in [(0, 3), (1, 2), (3, 3)] {
            assert_eq!(frame_at(&s, &anim(&s, from, to), 0.0).unwrap(), from);
        }
    }

    #[test]
    fn boundaries_step_exactly_at_cumulative_duration() {
        let s = sheet(&[10, 100, 7, 33, 50]);
        let a = anim(&s, 1, 4);
        let mut sum_ms = 0u64;
        for k in a.from..=a.to {
            sum_ms += u64::from(s.frames[k].duration);
            let before = (sum_ms - 1) as f64 / 1000.0;
            let at = sum_ms as f64 / 1000.0;
            assert_eq!(frame_at(&s, &a, before).unwrap(), k, "just before end of {k}");
            let next = if k == a.to { a.from } else { k + 1 };
            assert_eq!(frame_at(&s, &a, at).unwrap(), next, "at end of {k}");
        }
    }

    #[test]
    fn output_repeats_every_period() {
        let s = sheet(&[40, 60, 25]);
        let a = anim(&s, 0, 2);
        let period = a.total_duration_ms as f64 / 1000.0;
        for step in 0..250 {
            let t = step as f64 * 0.001;
            let base = frame_at(&s, &a, t).unwrap();
            assert_eq!(frame_at(&s, &a, t + period).unwrap(), base);
            assert_eq!(frame_at(&s, &a, t + 7.0 * period).unwrap(), base);
        }
    }

    #[test]
    fn zero_duration_frames_are_skipped() {
        let s = sheet(&[0, 50, 0, 50]);
        let a = anim(&s, 0, 3);
        assert_eq!(frame_at(&s, &a, 0.0).unwrap(), 1);
        assert_eq!(frame_at(&s, &a, 0.05).unwrap(), 3);
    }

    #[test]
    fn negative_time_wraps_backwards() {
        let s = sheet(&[100, 200]);
        let a = anim(&s, 0, 1);
        // -0.05 s == 250 ms into the loop
        assert_eq!(frame_at(&s, &a, -0.05).unwrap(), 1);
    }

    #[test]
    fn non_finite_time_is_rejected() {
        let s = sheet(&[100]);
        let a = anim(&s, 0, 0);
        for t in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(frame_at(&s, &a, t).unwrap_err().key, "invalid-time");
        }
    }

    #[test]
    fn huge_time_is_rejected_not_clamped() {
        let s = sheet(&[100, 200]);
        let a = anim(&s, 0, 1);
        for t in [f64::MAX, 1e303, -1e303] {
            assert_eq!(frame_at(&s, &a, t).unwrap_err().key, "invalid-time");
        }
        // Large but representable still resolves.
        assert!(frame_at(&s, &a, 1e12).is_ok());
    }

    #[test]
    fn corrupt_durations_fail_loudly() {
        let s = sheet(&[100, 200]);
        let mut a = anim(&s, 0, 1);
        a.total_duration_ms = 1000;
        let err = frame_at(&s, &a, 0.5).unwrap_err();
        assert_eq!(err.key, "frame-walk-exhausted");

        a.total_duration_ms = 0;
        assert_eq!(frame_at(&s, &a, 0.0).unwrap_err().key, "frame-walk-exhausted");
    }
}
