use std::time::Duration;

use rand::Rng;

use crate::catalog::{category_name, emoji_count_for_level, pick_random_emojis, pick_target};
use crate::scoring::{
    earns_power_up, level_for_score, points_for_hit, time_bonus, MISS_PENALTY,
    POWER_UP_DURATION, POWER_UP_TICK_DRAIN, ROUND_DURATION, SHAKE_DURATION, TICK_DRAIN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum EmojiSize {
    Small,
    #[default]
    Normal,
    Large,
}

/// Transition a tap asks the scheduler to apply after the tap itself commits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    ActivatePowerUp,
    ClearShakeAfter(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// Tap arrived outside of play
    Ignored,
    Hit { points: u32 },
    Miss,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapResult {
    pub outcome: TapOutcome,
    pub follow_ups: Vec<FollowUp>,
}

impl TapResult {
    fn ignored() -> Self {
        Self {
            outcome: TapOutcome::Ignored,
            follow_ups: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No session running, nothing changed
    Ignored,
    Running,
    /// This tick ran the clock out
    Expired,
}

/// One play-through. Every mutation goes through `start`, `tick`, `tap`,
/// `activate_power_up`, `clear_shake` or `reset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: u64,
    is_playing: bool,
    game_over: bool,
    score: u32,
    combo: u32,
    max_combo: u32,
    level: u32,
    time_left: Duration,
    target_emoji: String,
    emojis: Vec<String>,
    last_tap_correct: Option<bool>,
    power_up_active: bool,
    power_up_time_left: Duration,
    perfect_taps: u32,
    total_taps: u32,
    hits: u32,
    shaking_emojis: bool,
    emoji_size: EmojiSize,
}

impl Default for Session {
    fn default() -> Self {
        Self::idle(0)
    }
}

impl Session {
    pub fn idle(id: u64) -> Self {
        Self {
            id,
            is_playing: false,
            game_over: false,
            score: 0,
            combo: 0,
            max_combo: 0,
            level: 1,
            time_left: ROUND_DURATION,
            target_emoji: String::new(),
            emojis: Vec::new(),
            last_tap_correct: None,
            power_up_active: false,
            power_up_time_left: Duration::ZERO,
            perfect_taps: 0,
            total_taps: 0,
            hits: 0,
            shaking_emojis: false,
            emoji_size: EmojiSize::Normal,
        }
    }

    /// Fresh playing session with the first round dealt
    pub fn new_game<R: Rng + ?Sized>(id: u64, rng: &mut R) -> Self {
        let mut session = Self::idle(id);
        session.start(id, rng);
        session
    }

    pub fn start<R: Rng + ?Sized>(&mut self, id: u64, rng: &mut R) {
        *self = Self::idle(id);
        self.is_playing = true;
        self.deal_round(rng);
    }

    pub fn reset(&mut self, id: u64) {
        *self = Self::idle(id);
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.phase() != Phase::Playing {
            return TickOutcome::Ignored;
        }

        let drain = if self.power_up_active {
            POWER_UP_TICK_DRAIN
        } else {
            TICK_DRAIN
        };
        self.time_left = self.time_left.saturating_sub(drain);

        if self.power_up_active {
            self.power_up_time_left = self.power_up_time_left.saturating_sub(TICK_DRAIN);
            if self.power_up_time_left.is_zero() {
                self.power_up_active = false;
                self.emoji_size = EmojiSize::Normal;
            }
        }

        if self.time_left.is_zero() {
            self.is_playing = false;
            self.game_over = true;
            return TickOutcome::Expired;
        }

        TickOutcome::Running
    }

    pub fn tap<R: Rng + ?Sized>(&mut self, emoji: &str, rng: &mut R) -> TapResult {
        if self.phase() != Phase::Playing {
            return TapResult::ignored();
        }

        self.total_taps += 1;

        if emoji == self.target_emoji {
            self.combo += 1;
            self.max_combo = self.max_combo.max(self.combo);

            let points = points_for_hit(self.combo, self.level, self.power_up_active);
            self.score = self.score.saturating_add(points);
            self.level = level_for_score(self.score).max(self.level);

            self.deal_round(rng);
            self.time_left = (self.time_left + time_bonus(self.level)).min(ROUND_DURATION);

            self.last_tap_correct = Some(true);
            self.perfect_taps += 1;
            self.hits += 1;

            let follow_ups = if earns_power_up(self.perfect_taps) {
                vec![FollowUp::ActivatePowerUp]
            } else {
                Vec::new()
            };

            TapResult {
                outcome: TapOutcome::Hit { points },
                follow_ups,
            }
        } else {
            // Running out here is left for the next tick to finalize
            self.combo = 0;
            self.time_left = self.time_left.saturating_sub(MISS_PENALTY);
            self.last_tap_correct = Some(false);
            self.perfect_taps = 0;
            self.shaking_emojis = true;

            TapResult {
                outcome: TapOutcome::Miss,
                follow_ups: vec![FollowUp::ClearShakeAfter(SHAKE_DURATION)],
            }
        }
    }

    /// Returns false when a power-up is already running or nothing is being played
    pub fn activate_power_up(&mut self) -> bool {
        if self.power_up_active || self.phase() != Phase::Playing {
            return false;
        }
        self.power_up_active = true;
        self.power_up_time_left = POWER_UP_DURATION;
        self.emoji_size = EmojiSize::Large;
        true
    }

    pub fn clear_shake(&mut self) {
        self.shaking_emojis = false;
    }

    fn deal_round<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.emojis = pick_random_emojis(rng, self.level, emoji_count_for_level(self.level));
        self.target_emoji = pick_target(rng, &self.emojis).unwrap_or_default();
    }

    pub fn phase(&self) -> Phase {
        match (self.is_playing, self.game_over) {
            (_, true) => Phase::GameOver,
            (true, false) => Phase::Playing,
            (false, false) => Phase::Idle,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn category(&self) -> &'static str {
        category_name(self.level)
    }

    pub fn time_left(&self) -> Duration {
        self.time_left
    }

    pub fn seconds_left(&self) -> f64 {
        self.time_left.as_secs_f64()
    }

    /// Remaining share of a full round, for the time bar
    pub fn time_fraction(&self) -> f64 {
        self.time_left.as_secs_f64() / ROUND_DURATION.as_secs_f64()
    }

    pub fn target_emoji(&self) -> &str {
        &self.target_emoji
    }

    pub fn emojis(&self) -> &[String] {
        &self.emojis
    }

    pub fn last_tap_correct(&self) -> Option<bool> {
        self.last_tap_correct
    }

    pub fn power_up_active(&self) -> bool {
        self.power_up_active
    }

    pub fn power_up_time_left(&self) -> Duration {
        self.power_up_time_left
    }

    pub fn perfect_taps(&self) -> u32 {
        self.perfect_taps
    }

    pub fn total_taps(&self) -> u32 {
        self.total_taps
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn accuracy(&self) -> Option<f64> {
        crate::util::percentage(self.hits, self.total_taps)
    }

    pub fn is_shaking(&self) -> bool {
        self.shaking_emojis
    }

    pub fn emoji_size(&self) -> EmojiSize {
        self.emoji_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(2024)
    }

    fn playing() -> (Session, StdRng) {
        let mut rng = rng();
        let session = Session::new_game(1, &mut rng);
        (session, rng)
    }

    fn hit(session: &mut Session, rng: &mut StdRng) -> TapResult {
        let target = session.target_emoji().to_string();
        session.tap(&target, rng)
    }

    #[test]
    fn test_idle_defaults() {
        let session = Session::default();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.level(), 1);
        assert_eq!(session.time_left(), ROUND_DURATION);
        assert!(session.emojis().is_empty());
        assert_eq!(session.last_tap_correct(), None);
        assert_eq!(session.accuracy(), None);
    }

    #[test]
    fn test_start_deals_first_round() {
        let (session, _) = playing();
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.emojis().len(), 4);
        assert!(session.emojis().iter().any(|e| e == session.target_emoji()));
        assert_eq!(session.score(), 0);
        assert_eq!(session.seconds_left(), 30.0);
        assert_eq!(session.category(), "Smiley");
    }

    #[test]
    fn test_tick_drains_a_tenth_until_game_over() {
        let (mut session, _) = playing();

        for n in 1..300u64 {
            assert_eq!(session.tick(), TickOutcome::Running);
            assert_eq!(
                session.time_left(),
                ROUND_DURATION - Duration::from_millis(100 * n)
            );
        }

        assert_eq!(session.tick(), TickOutcome::Expired);
        assert_eq!(session.time_left(), Duration::ZERO);
        assert_eq!(session.phase(), Phase::GameOver);
        assert!(!session.is_playing());
        assert!(session.is_game_over());

        let frozen = session.clone();
        assert_eq!(session.tick(), TickOutcome::Ignored);
        assert_eq!(session, frozen);
    }

    #[test]
    fn test_tick_with_power_up_drains_half() {
        let (mut session, _) = playing();
        assert!(session.activate_power_up());
        assert_eq!(session.emoji_size(), EmojiSize::Large);

        session.tick();
        assert_eq!(session.time_left(), Duration::from_millis(29_950));
        assert_eq!(session.power_up_time_left(), Duration::from_millis(4_900));

        for _ in 1..49 {
            session.tick();
        }
        assert!(session.power_up_active());
        assert_eq!(session.power_up_time_left(), Duration::from_millis(100));

        session.tick();
        assert!(!session.power_up_active());
        assert_eq!(session.power_up_time_left(), Duration::ZERO);
        assert_eq!(session.emoji_size(), EmojiSize::Normal);
        assert_eq!(session.time_left(), Duration::from_millis(27_500));

        session.tick();
        assert_eq!(session.time_left(), Duration::from_millis(27_400));
    }

    #[test]
    fn test_hits_score_with_combo() {
        let (mut session, mut rng) = playing();

        assert_matches!(
            hit(&mut session, &mut rng).outcome,
            TapOutcome::Hit { points: 12 }
        );
        assert_eq!(session.score(), 12);
        assert_matches!(
            hit(&mut session, &mut rng).outcome,
            TapOutcome::Hit { points: 22 }
        );
        assert_eq!(session.score(), 34);
        hit(&mut session, &mut rng);
        assert_eq!(session.score(), 66);

        assert_eq!(session.combo(), 3);
        assert_eq!(session.max_combo(), 3);
        assert_eq!(session.perfect_taps(), 3);
        assert_eq!(session.total_taps(), 3);
        assert_eq!(session.last_tap_correct(), Some(true));
        assert_eq!(session.accuracy(), Some(100.0));
    }

    #[test]
    fn test_hit_adds_time_bonus_capped_at_round_length() {
        let (mut session, mut rng) = playing();
        hit(&mut session, &mut rng);
        assert_eq!(session.time_left(), ROUND_DURATION);

        for _ in 0..50 {
            session.tick();
        }
        assert_eq!(session.time_left(), Duration::from_secs(25));
        hit(&mut session, &mut rng);
        assert_eq!(session.time_left(), Duration::from_millis(27_800));
    }

    #[test]
    fn test_level_follows_score_and_grid_grows() {
        let (mut session, mut rng) = playing();
        // 12 + 22 + 32 + 42 = 108
        for _ in 0..4 {
            hit(&mut session, &mut rng);
        }
        assert_eq!(session.score(), 108);
        assert_eq!(session.level(), 2);
        assert_eq!(session.emojis().len(), emoji_count_for_level(2));
        assert!(session.emojis().iter().any(|e| e == session.target_emoji()));
    }

    #[test]
    fn test_level_bonus_uses_level_before_the_tap() {
        let (mut session, mut rng) = playing();
        for _ in 0..4 {
            hit(&mut session, &mut rng);
        }
        assert_eq!(session.level(), 2);
        // combo 5, level 2
        assert_matches!(
            hit(&mut session, &mut rng).outcome,
            TapOutcome::Hit { points: 54 }
        );
    }

    #[test]
    fn test_miss_resets_combo_and_penalizes() {
        let (mut session, mut rng) = playing();
        hit(&mut session, &mut rng);
        hit(&mut session, &mut rng);

        let result = session.tap("not an emoji", &mut rng);
        assert_eq!(result.outcome, TapOutcome::Miss);
        assert_eq!(
            result.follow_ups,
            vec![FollowUp::ClearShakeAfter(SHAKE_DURATION)]
        );
        assert_eq!(session.combo(), 0);
        assert_eq!(session.max_combo(), 2);
        assert_eq!(session.perfect_taps(), 0);
        assert_eq!(session.total_taps(), 3);
        assert_eq!(session.hits(), 2);
        assert_eq!(session.time_left(), Duration::from_secs(28));
        assert_eq!(session.last_tap_correct(), Some(false));
        assert!(session.is_shaking());

        session.clear_shake();
        assert!(!session.is_shaking());
    }

    #[test]
    fn test_miss_clamps_at_zero_and_waits_for_tick() {
        let (mut session, mut rng) = playing();
        for _ in 0..16 {
            session.tap("nope", &mut rng);
        }
        assert_eq!(session.time_left(), Duration::ZERO);
        assert_eq!(session.phase(), Phase::Playing);

        assert_eq!(session.tick(), TickOutcome::Expired);
        assert_eq!(session.phase(), Phase::GameOver);
        assert_eq!(session.time_left(), Duration::ZERO);
    }

    #[test]
    fn test_fifth_perfect_tap_requests_power_up() {
        let (mut session, mut rng) = playing();
        for _ in 0..4 {
            assert!(hit(&mut session, &mut rng).follow_ups.is_empty());
        }
        let fifth = hit(&mut session, &mut rng);
        assert_eq!(fifth.follow_ups, vec![FollowUp::ActivatePowerUp]);
        // The tap itself does not flip the power-up on
        assert!(!session.power_up_active());
        assert_eq!(session.last_tap_correct(), Some(true));
    }

    #[test]
    fn test_miss_breaks_perfect_run() {
        let (mut session, mut rng) = playing();
        for _ in 0..4 {
            hit(&mut session, &mut rng);
        }
        session.tap("miss", &mut rng);
        for _ in 0..4 {
            assert!(hit(&mut session, &mut rng).follow_ups.is_empty());
        }
        assert_eq!(
            hit(&mut session, &mut rng).follow_ups,
            vec![FollowUp::ActivatePowerUp]
        );
    }

    #[test]
    fn test_power_up_doubles_combo_points() {
        let (mut session, mut rng) = playing();
        session.activate_power_up();
        assert_matches!(
            hit(&mut session, &mut rng).outcome,
            TapOutcome::Hit { points: 22 }
        );
    }

    #[test]
    fn test_activate_power_up_rejected_while_active_or_idle() {
        let mut idle = Session::default();
        assert!(!idle.activate_power_up());
        assert!(!idle.power_up_active());

        let (mut session, _) = playing();
        assert!(session.activate_power_up());
        session.tick();
        assert!(!session.activate_power_up());
        assert_eq!(session.power_up_time_left(), Duration::from_millis(4_900));
    }

    #[test]
    fn test_taps_ignored_outside_play() {
        let mut rng = rng();
        let mut session = Session::default();
        let before = session.clone();
        assert_eq!(session.tap("😀", &mut rng).outcome, TapOutcome::Ignored);
        assert_eq!(session, before);

        let (mut session, mut rng) = playing();
        while session.tick() != TickOutcome::Expired {}
        let over = session.clone();
        let target = session.target_emoji().to_string();
        assert_eq!(session.tap(&target, &mut rng).outcome, TapOutcome::Ignored);
        assert_eq!(session, over);
    }

    #[test]
    fn test_max_combo_tracks_highest_combo() {
        let (mut session, mut rng) = playing();
        let mut highest = 0;
        let mut last_max = 0;
        let script = [true, true, true, false, true, false, true, true, true, true, false];

        for correct in script {
            if correct {
                hit(&mut session, &mut rng);
            } else {
                session.tap("miss", &mut rng);
            }
            highest = highest.max(session.combo());
            assert!(session.max_combo() >= last_max);
            assert!(session.combo() <= session.max_combo());
            last_max = session.max_combo();
        }
        assert_eq!(session.max_combo(), highest);
        assert_eq!(session.max_combo(), 4);
    }

    #[test]
    fn test_start_again_after_game_over() {
        let (mut session, mut rng) = playing();
        hit(&mut session, &mut rng);
        while session.tick() != TickOutcome::Expired {}

        session.start(2, &mut rng);
        assert_eq!(session.id(), 2);
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.score(), 0);
        assert_eq!(session.max_combo(), 0);
        assert_eq!(session.time_left(), ROUND_DURATION);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let (mut session, mut rng) = playing();
        hit(&mut session, &mut rng);
        session.activate_power_up();

        session.reset(9);
        assert_eq!(session, Session::idle(9));

        let before = session.clone();
        assert_eq!(session.tick(), TickOutcome::Ignored);
        assert_eq!(session, before);
    }
}
