use std::time::Instant;

use rand::Rng;

use crate::session::{FollowUp, Phase, Session, TapOutcome, TickOutcome};

/// Real-time timer owned by one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTimer {
    session_id: u64,
    due: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapReport {
    pub outcome: TapOutcome,
    /// A follow-up turned a power-up on right after this tap
    pub power_up_activated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub ticked: bool,
    pub game_over_now: bool,
    pub shake_cleared: bool,
}

/// Sole owner of the live session: applies events one at a time, then any
/// follow-up transitions they request, and keeps the timers for the session
/// that scheduled them.
#[derive(Debug)]
pub struct Game<R: Rng> {
    session: Session,
    rng: R,
    next_session_id: u64,
    clock_running: bool,
    shake_timer: Option<PendingTimer>,
}

impl<R: Rng> Game<R> {
    pub fn new(rng: R) -> Self {
        Self {
            session: Session::idle(0),
            rng,
            next_session_id: 1,
            clock_running: false,
            shake_timer: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn clock_running(&self) -> bool {
        self.clock_running
    }

    pub fn start(&mut self) {
        let id = self.claim_session_id();
        self.session.start(id, &mut self.rng);
        self.shake_timer = None;
        self.clock_running = true;
        log::info!("session {id} started");
    }

    pub fn reset(&mut self) {
        let id = self.claim_session_id();
        self.session.reset(id);
        self.shake_timer = None;
        self.clock_running = false;
        log::debug!("session reset, now {id}");
    }

    pub fn tap(&mut self, emoji: &str, now: Instant) -> TapReport {
        let result = self.session.tap(emoji, &mut self.rng);
        let mut power_up_activated = false;

        for follow_up in result.follow_ups {
            match follow_up {
                FollowUp::ActivatePowerUp => {
                    if self.session.activate_power_up() {
                        power_up_activated = true;
                        log::debug!(
                            "power-up on after {} perfect taps",
                            self.session.perfect_taps()
                        );
                    }
                }
                FollowUp::ClearShakeAfter(delay) => {
                    self.shake_timer = Some(PendingTimer {
                        session_id: self.session.id(),
                        due: now + delay,
                    });
                }
            }
        }

        TapReport {
            outcome: result.outcome,
            power_up_activated,
        }
    }

    /// Fire due timers, then advance the clock by one tick if it is running
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let mut report = TickReport {
            shake_cleared: self.poll_timers(now),
            ..TickReport::default()
        };

        if !self.clock_running {
            return report;
        }

        match self.session.tick() {
            TickOutcome::Ignored => self.clock_running = false,
            TickOutcome::Running => report.ticked = true,
            TickOutcome::Expired => {
                report.ticked = true;
                report.game_over_now = true;
                self.clock_running = false;
                log::info!(
                    "session {} over: score {} max combo {} level {}",
                    self.session.id(),
                    self.session.score(),
                    self.session.max_combo(),
                    self.session.level()
                );
            }
        }

        report
    }

    /// Fire due real-time timers. Returns true when the shake was cleared.
    pub fn poll_timers(&mut self, now: Instant) -> bool {
        match self.shake_timer {
            Some(timer) if timer.due <= now => {
                self.shake_timer = None;
                if timer.session_id == self.session.id() {
                    self.session.clear_shake();
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    fn claim_session_id(&mut self) -> u64 {
        let id = self.next_session_id;
        self.next_session_id += 1;
        id
    }
}
