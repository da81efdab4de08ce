//! CLOCK gate output as a function of wall-clock time.

use crate::model::circuit::ClockState;

/// Level of a running clock at `now_ms`, or `None` when it should hold its
/// last value (stopped, or configured with an unusable frequency).
///
/// One period lasts `1000 / frequency` ms; the output is low for the first
/// half and high for the second, starting at `start_time_ms`.
pub fn clock_level(state: &ClockState, now_ms: u64) -> Option<bool> {
    if !state.is_running || !state.frequency.is_finite() || state.frequency <= 0.0 {
        return None;
    }
    let half_period = 1000.0 / state.frequency / 2.0;
    let elapsed = now_ms.saturating_sub(state.start_time_ms) as f64;
    let phase = (elapsed / half_period).floor() as u64;
    Some(phase % 2 == 1)
}
