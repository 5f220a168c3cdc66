use std::time::Duration;

pub const TICK_RATE_MS: u64 = 100;

/// Length of a round and the ceiling for time bonuses
pub const ROUND_DURATION: Duration = Duration::from_secs(30);
pub const POWER_UP_DURATION: Duration = Duration::from_secs(5);

/// Time drained per tick (halved while a power-up is running)
pub const TICK_DRAIN: Duration = Duration::from_millis(TICK_RATE_MS);
pub const POWER_UP_TICK_DRAIN: Duration = Duration::from_millis(TICK_RATE_MS / 2);

pub const MISS_PENALTY: Duration = Duration::from_secs(2);
pub const SHAKE_DURATION: Duration = Duration::from_millis(500);

/// Consecutive correct taps needed for each power-up
pub const PERFECT_TAPS_PER_POWER_UP: u32 = 5;

const POINTS_PER_LEVEL: u32 = 100;
const MIN_TIME_BONUS_MS: u64 = 500;

/// Points for a correct tap.
///
/// `combo` is the combo including this tap, `level` is the level before the
/// tap is scored.
pub fn points_for_hit(combo: u32, level: u32, power_up_active: bool) -> u32 {
    let multiplier = if power_up_active { 2 } else { 1 };
    combo
        .saturating_mul(10 * multiplier)
        .saturating_add(level.saturating_mul(2))
}

pub fn level_for_score(score: u32) -> u32 {
    score / POINTS_PER_LEVEL + 1
}

/// Time added by a correct tap: `max(0.5, 3 - level * 0.2)` seconds
pub fn time_bonus(level: u32) -> Duration {
    let ms = 3000_u64.saturating_sub(level as u64 * 200);
    Duration::from_millis(ms.max(MIN_TIME_BONUS_MS))
}

/// Whether this run of perfect taps earns a power-up
pub fn earns_power_up(perfect_taps: u32) -> bool {
    perfect_taps > 0 && perfect_taps % PERFECT_TAPS_PER_POWER_UP == 0
}
