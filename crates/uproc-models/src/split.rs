//! Split window computation.

use thiserror::Error;

use crate::timecode::Timecode;

/// The fraction of the way through a video where a split preferably starts.
const PREFERRED_START_FRACTION: f64 = 0.4;

/// The (start offset, length) pair used to cut one slot's clip.
///
/// Computed per run from a timecode and the probed source duration;
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitWindow {
    /// Start offset from the beginning of the source, in seconds
    pub start: f64,
    /// Clip length in seconds
    pub length: f64,
}

/// The source is shorter than the requested clip length.
///
/// Not a hard error: the caller skips the slot and carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("video is too short for this slot")]
pub struct VideoTooShort;

/// Compute the window to cut for one slot.
///
/// Prefers starting 40% of the way through the source when the full
/// clip still fits from there; otherwise starts at zero. A clip longer
/// than the source cannot be hosted at all.
pub fn split_window(timecode: Timecode, duration: f64) -> Result<SplitWindow, VideoTooShort> {
    let length = timecode.length;

    if length > duration {
        return Err(VideoTooShort);
    }

    let preferred = duration * PREFERRED_START_FRACTION;
    let start = if preferred + length <= duration {
        preferred
    } else {
        0.0
    };

    Ok(SplitWindow { start, length })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(length: f64, duration: f64) -> Result<SplitWindow, VideoTooShort> {
        split_window(Timecode { length }, duration)
    }

    #[test]
    fn test_preferred_start_fits() {
        // L <= 0.6*D: start at 40% of D
        let w = window(10.0, 120.0).unwrap();
        assert_eq!(w, SplitWindow { start: 48.0, length: 10.0 });

        // Exactly at the boundary: 0.4*D + L == D still fits
        let w = window(72.0, 120.0).unwrap();
        assert_eq!(w, SplitWindow { start: 48.0, length: 72.0 });
    }

    #[test]
    fn test_falls_back_to_zero() {
        // 0.6*D < L <= D: the 40% start would overrun, start at 0
        let w = window(80.0, 120.0).unwrap();
        assert_eq!(w, SplitWindow { start: 0.0, length: 80.0 });

        // L == D: whole video
        let w = window(120.0, 120.0).unwrap();
        assert_eq!(w, SplitWindow { start: 0.0, length: 120.0 });
    }

    #[test]
    fn test_too_short() {
        assert_eq!(window(60.0, 50.0), Err(VideoTooShort));
        assert_eq!(window(1.0, 0.0), Err(VideoTooShort));
    }
}
