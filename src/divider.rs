//! Tick division from 24 PPQN MIDI clock down to sync pulse densities.

/// MIDI clock pulses per quarter note.
pub const PPQN: u32 = 24;

/// True when `divisor` yields a whole number of ticks per output pulse.
pub fn valid_divisor(divisor: u32) -> bool {
    divisor != 0 && PPQN % divisor == 0
}

/// Ticks between output pulses for `divisor` pulses per beat.
pub fn boundary_interval(divisor: u32) -> u32 {
    PPQN / divisor
}

/// Whether the clock at `tick` (counted before the increment) starts a new
/// output pulse for a driver running at `divisor` pulses per beat.
///
/// Tick 0 satisfies every divisor, so coarser drivers fire alongside finer
/// ones on the downbeat.
pub fn is_boundary(tick: u32, divisor: u32) -> bool {
    tick % boundary_interval(divisor) == 0
}

/// Tick value after one clock, wrapped into `[0, PPQN)`.
pub fn next_tick(tick: u32) -> u32 {
    (tick + 1) % PPQN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_beat_boundaries() {
        let fired: Vec<u32> = (0..PPQN).filter(|t| is_boundary(*t, 2)).collect();
        assert_eq!(fired, vec![0, 12]);
    }

    #[test]
    fn test_beat_boundary_only_on_downbeat() {
        let fired: Vec<u32> = (0..PPQN).filter(|t| is_boundary(*t, 1)).collect();
        assert_eq!(fired, vec![0]);
    }

    #[test]
    fn test_full_rate_fires_every_tick() {
        assert!((0..PPQN).all(|t| is_boundary(t, 24)));
    }

    #[test]
    fn test_divisor_validation() {
        for d in [1, 2, 3, 4, 6, 8, 12, 24] {
            assert!(valid_divisor(d), "divisor {} should be accepted", d);
        }
        for d in [0, 5, 7, 16, 48] {
            assert!(!valid_divisor(d), "divisor {} should be rejected", d);
        }
    }

    #[test]
    fn test_tick_wraps_after_full_cycle() {
        let mut tick = 0;
        for _ in 0..PPQN {
            tick = next_tick(tick);
        }
        assert_eq!(tick, 0);
        assert_eq!(next_tick(PPQN - 1), 0);
    }
}
