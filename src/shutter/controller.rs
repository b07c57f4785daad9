//! The per-controller command/selection state machine.
//!
//! One [`Controller`] instance exists per physically wired remote. All
//! mutable state (the five buttons plus the tracked selection) lives
//! behind a single mutex, so concurrent callers serialise per controller
//! while different controllers operate fully independently. Commands
//! queue on the mutex in arrival order; there is no priority and no
//! cancellation.
//!
//! ## Display-wake heuristic
//!
//! Selection presses only register while the remote's channel display is
//! awake. The controller tracks the last press timestamp and classifies
//! the display as awake (`elapsed < selection_active_min`), ambiguous, or
//! asleep (`elapsed >= selection_active_max`). The ambiguous window is
//! resolved by waiting until the display is certainly asleep, then waking
//! it with a single "next" press.
//!
//! Known drift hazard, deliberately preserved from the reference
//! behaviour: on the real remote the wake press *does* advance the
//! selection by one step, but `selected_channel` is not updated to match.
//! Tracked and physical selection can therefore drift apart after an
//! ambiguous wake. Fixing this guess-free requires a feedback path the
//! hardware does not have.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info};

use crate::error::CommandError;

use super::arith;
use super::button::{Button, PressPin};
use super::clock::Clock;
use super::profile::{ChannelIndex, ControllerProfile, ShutterProfile};

/// The five output pins wired to one remote controller, in the order the
/// buttons appear on the hardware.
pub struct ButtonPins<P> {
    pub up: P,
    pub stop: P,
    pub down: P,
    pub previous: P,
    pub next: P,
}

/// Mutable controller state, all behind the one guard.
struct Deck<P> {
    up: Button<P>,
    stop: Button<P>,
    down: Button<P>,
    previous: Button<P>,
    next: Button<P>,

    /// Channel the remote is assumed to have selected. Starts at 0 on
    /// boot without hardware verification; may be overwritten by a
    /// persistence restore.
    selected_channel: ChannelIndex,
    /// Monotonic timestamp of the last button press.
    last_active_at: Duration,
}

/// Which command button a send sequence drives.
#[derive(Debug, Clone, Copy)]
enum Motion {
    Up,
    Stop,
    Down,
}

/// Stateful driver for one physical remote controller.
pub struct Controller<P, C> {
    profile: ControllerProfile,
    clock: C,
    deck: Mutex<Deck<P>>,
}

impl<P: PressPin, C: Clock> Controller<P, C> {
    pub fn new(profile: ControllerProfile, clock: C, pins: ButtonPins<P>) -> Self {
        let deck = Deck {
            up: Button::new(pins.up),
            stop: Button::new(pins.stop),
            down: Button::new(pins.down),
            previous: Button::new(pins.previous),
            next: Button::new(pins.next),
            selected_channel: 0,
            last_active_at: Duration::ZERO,
        };
        Self {
            profile,
            clock,
            deck: Mutex::new(deck),
        }
    }

    /// Number of channels this controller can address.
    pub fn channels(&self) -> ChannelIndex {
        self.profile.channels
    }

    /// The channel the remote is assumed to have selected. Callers poll
    /// this after a command completes, for telemetry or persistence.
    pub fn selected_channel(&self) -> ChannelIndex {
        self.lock().selected_channel
    }

    /// Overwrite the tracked selection, e.g. from a persisted snapshot
    /// after reboot. Rejects out-of-range channels; never wraps.
    pub fn restore_selection(&self, channel: ChannelIndex) -> Result<(), CommandError> {
        self.check_channel(channel)?;
        self.lock().selected_channel = channel;
        Ok(())
    }

    // ── Command surface ───────────────────────────────────────

    /// Roll the shutter on `channel` up (fire-and-forget).
    pub fn roll_up(&self, channel: ChannelIndex) -> Result<(), CommandError> {
        self.check_channel(channel)?;
        info!("rolling up channel {}", channel);
        let mut deck = self.lock();
        self.press_motion(&mut deck, channel, Motion::Up);
        Ok(())
    }

    /// Roll the shutter on `channel` down (fire-and-forget).
    pub fn roll_down(&self, channel: ChannelIndex) -> Result<(), CommandError> {
        self.check_channel(channel)?;
        info!("rolling down channel {}", channel);
        let mut deck = self.lock();
        self.press_motion(&mut deck, channel, Motion::Down);
        Ok(())
    }

    /// Stop whatever the shutter on `channel` is doing.
    pub fn roll_stop(&self, channel: ChannelIndex) -> Result<(), CommandError> {
        self.check_channel(channel)?;
        info!("stopping channel {}", channel);
        let mut deck = self.lock();
        self.press_motion(&mut deck, channel, Motion::Stop);
        Ok(())
    }

    /// Roll up for `hold`, then stop. The deadline is taken before the
    /// initial press sequence, so selection and send time count against
    /// the hold.
    pub fn roll_up_for(&self, channel: ChannelIndex, hold: Duration) -> Result<(), CommandError> {
        self.timed_motion(channel, Motion::Up, hold)
    }

    /// Roll down for `hold`, then stop.
    pub fn roll_down_for(&self, channel: ChannelIndex, hold: Duration) -> Result<(), CommandError> {
        self.timed_motion(channel, Motion::Down, hold)
    }

    /// Drive to the top as a known reference, wait out a full traversal,
    /// then roll down for `hold`.
    ///
    /// The traversal wait happens without the guard held, so another
    /// command may interleave and move the shutter mid-wait. Accepted:
    /// commands are idempotent-ish physical actions, not transactions.
    pub fn roll_from_top(&self, shutter: ShutterProfile, hold: Duration) -> Result<(), CommandError> {
        self.roll_up(shutter.index)?;
        self.clock.sleep(shutter.total_travel_time);
        self.roll_down_for(shutter.index, hold)
    }

    /// Symmetric to [`roll_from_top`](Self::roll_from_top): reference at
    /// the bottom, then roll up for `hold`.
    pub fn roll_from_bottom(&self, shutter: ShutterProfile, hold: Duration) -> Result<(), CommandError> {
        self.roll_down(shutter.index)?;
        self.clock.sleep(shutter.total_travel_time);
        self.roll_up_for(shutter.index, hold)
    }

    /// Move the shutter to `fraction` of its travel (0.0 = fully open,
    /// 1.0 = fully closed), approaching from whichever end is nearer so
    /// worst-case travel is halved. Fractions outside `[0, 1]` (including
    /// NaN) are rejected without touching any button.
    pub fn roll_to(&self, shutter: ShutterProfile, fraction: f64) -> Result<(), CommandError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(CommandError::FractionOutOfRange);
        }
        if fraction <= 0.5 {
            self.roll_from_top(shutter, shutter.total_travel_time.mul_f64(fraction))
        } else {
            self.roll_from_bottom(shutter, shutter.total_travel_time.mul_f64(1.0 - fraction))
        }
    }

    // ── Selection sub-machine ─────────────────────────────────

    /// Make sure the channel display is awake before stepping.
    fn ensure_display_active(&self, deck: &mut Deck<P>) {
        let elapsed = self.clock.now().saturating_sub(deck.last_active_at);
        if elapsed < self.profile.selection_active_min {
            // Certainly still awake.
            return;
        }

        if elapsed < self.profile.selection_active_max {
            // Ambiguous: wait until the display is certainly asleep.
            self.clock.sleep(self.profile.selection_active_max - elapsed);
        }

        // Wake press. The tracked selection intentionally stays put even
        // though the physical remote advances one step (see module docs).
        deck.next.press(&self.clock, self.profile.select_duration);
        deck.last_active_at = self.clock.now();
    }

    /// Step the selection to `target` over the shorter ring direction.
    /// Exactly-half distances tie-break forward, for reproducibility.
    fn select_channel(&self, deck: &mut Deck<P>, target: ChannelIndex) {
        let total = self.profile.channels;
        let halfway = total / 2;

        let mut steps = arith::sub_mod(target, deck.selected_channel, total);
        if steps == 0 {
            return;
        }

        let forwards = steps <= halfway;
        if !forwards {
            steps = total - steps;
        }
        debug!(
            "selecting channel {} from {} ({} step(s) {})",
            target,
            deck.selected_channel,
            steps,
            if forwards { "forward" } else { "backward" },
        );

        self.ensure_display_active(deck);

        for _ in 0..steps {
            self.clock.sleep(self.profile.select_recovery_duration);
            if forwards {
                deck.next.press(&self.clock, self.profile.select_duration);
                deck.selected_channel = arith::add_mod(deck.selected_channel, 1, total);
            } else {
                deck.previous.press(&self.clock, self.profile.select_duration);
                deck.selected_channel = arith::sub_mod(deck.selected_channel, 1, total);
            }
            deck.last_active_at = self.clock.now();
        }
    }

    // ── Internals ─────────────────────────────────────────────

    fn check_channel(&self, channel: ChannelIndex) -> Result<(), CommandError> {
        if channel < self.profile.channels {
            Ok(())
        } else {
            Err(CommandError::ChannelOutOfRange)
        }
    }

    /// Select `channel`, then fire the command button `send_count` times.
    fn press_motion(&self, deck: &mut Deck<P>, channel: ChannelIndex, motion: Motion) {
        self.select_channel(deck, channel);
        let button = match motion {
            Motion::Up => &mut deck.up,
            Motion::Stop => &mut deck.stop,
            Motion::Down => &mut deck.down,
        };
        button.press_repeat(
            &self.clock,
            self.profile.send_duration,
            self.profile.send_count,
            self.profile.send_recovery_duration,
        );
        deck.last_active_at = self.clock.now();
    }

    fn timed_motion(&self, channel: ChannelIndex, motion: Motion, hold: Duration) -> Result<(), CommandError> {
        self.check_channel(channel)?;
        let mut deck = self.lock();
        let deadline = self.clock.now() + hold;
        self.press_motion(&mut deck, channel, motion);
        let mut deck = self.sleep_until(deck, deadline);
        self.press_motion(&mut deck, channel, Motion::Stop);
        Ok(())
    }

    /// Sleep until `deadline`, releasing the guard for long waits.
    ///
    /// Short remainders are slept through while holding the guard — not
    /// worth the release/reacquire churn. Long remainders drop the guard,
    /// sleep until shortly before the deadline, reacquire, and sleep the
    /// precise tail. This bounds how long a queued command can be starved
    /// by a long hold, at the cost of letting another command interleave
    /// mid-hold.
    fn sleep_until<'a>(&'a self, deck: MutexGuard<'a, Deck<P>>, deadline: Duration) -> MutexGuard<'a, Deck<P>> {
        let remaining = deadline.saturating_sub(self.clock.now());
        if remaining < self.profile.unlock_threshold {
            self.clock.sleep(remaining);
            return deck;
        }

        debug!("long hold: releasing controller guard");
        drop(deck);
        // A margin beyond the remainder degrades to an immediate wakeup;
        // both tunables are public, so the combination can occur.
        self.clock
            .sleep(remaining.saturating_sub(self.profile.early_wakeup_margin));

        debug!("long hold: reacquiring controller guard");
        let deck = self.lock();
        self.clock.sleep(deadline.saturating_sub(self.clock.now()));
        deck
    }

    /// A poisoned mutex only means another command panicked mid-press;
    /// the tracked state is still the best estimate available, so keep
    /// going with it.
    fn lock(&self) -> MutexGuard<'_, Deck<P>> {
        self.deck.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
