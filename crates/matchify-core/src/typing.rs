//! Typing indicator coordination.
//!
//! [`TypingDebouncer`] turns a stream of local keystrokes into at most two
//! transitions per burst: [`TypingTransition::Started`] on the first keystroke
//! and [`TypingTransition::Stopped`] once the quiet interval passes without
//! input. The pending timer is a single deadline that every keystroke pushes
//! back, so timers never stack.
//!
//! Time is passed in, never read. The driver calls [`TypingDebouncer::poll`]
//! on each tick; [`TypingDebouncer::remaining`] tells it how long it may sleep.
//!
//! [`TypingSignal`] is the remote side: one overwritable slot for the peer.

use std::{ops::Sub, time::Duration};

/// Inactivity required before "stopped typing" is sent.
pub const DEFAULT_QUIET_INTERVAL: Duration = Duration::from_millis(500);

/// Outbound typing-state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingTransition {
    /// Burst started; send `typing: true`
    Started,
    /// Quiet interval elapsed; send `typing: false`
    Stopped,
}

impl TypingTransition {
    /// Wire value of the `typing` field.
    pub const fn is_typing(self) -> bool {
        matches!(self, Self::Started)
    }
}

/// Local typing debouncer.
///
/// # Invariants
///
/// - At most one pending deadline exists.
/// - Transitions alternate: `Started`, `Stopped`, `Started`, ... never two of
///   the same kind in a row.
#[derive(Debug, Clone)]
pub struct TypingDebouncer<I> {
    quiet_interval: Duration,
    /// Time of the last qualifying input while a burst is active
    last_input: Option<I>,
}

impl<I> TypingDebouncer<I>
where
    I: Copy + Ord + Sub<Output = Duration>,
{
    /// Create an idle debouncer.
    pub fn new(quiet_interval: Duration) -> Self {
        Self { quiet_interval, last_input: None }
    }

    /// Configured quiet interval.
    pub fn quiet_interval(&self) -> Duration {
        self.quiet_interval
    }

    /// True while a burst is active.
    pub fn is_typing(&self) -> bool {
        self.last_input.is_some()
    }

    /// Record a qualifying input event.
    ///
    /// Returns `Started` on the first input of a burst. Every input restarts
    /// the quiet timer.
    pub fn input(&mut self, now: I) -> Option<TypingTransition> {
        let started = self.last_input.is_none();
        self.last_input = Some(now);
        started.then_some(TypingTransition::Started)
    }

    /// Fire the quiet timer if it has expired.
    pub fn poll(&mut self, now: I) -> Option<TypingTransition> {
        let last = self.last_input?;
        if now - last < self.quiet_interval {
            return None;
        }

        self.last_input = None;
        Some(TypingTransition::Stopped)
    }

    /// Time until the quiet timer fires. `None` when idle.
    pub fn remaining(&self, now: I) -> Option<Duration> {
        self.last_input.map(|last| self.quiet_interval.saturating_sub(now - last))
    }

    /// Cancel any pending timer without emitting a transition.
    ///
    /// Returns true if a burst was active.
    pub fn reset(&mut self) -> bool {
        self.last_input.take().is_some()
    }
}

/// Remote typing indicator. One slot, overwritten in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypingSignal {
    /// Sender id of the last typing update
    pub who: Option<String>,
    /// Whether they are typing
    pub is_typing: bool,
}

impl TypingSignal {
    /// Overwrite the slot. Returns true if the typing flag changed.
    pub fn set(&mut self, who: &str, is_typing: bool) -> bool {
        let changed = self.is_typing != is_typing;
        self.who = Some(who.to_string());
        self.is_typing = is_typing;
        changed
    }

    /// Clear the slot. Returns true if the peer was shown as typing.
    pub fn reset(&mut self) -> bool {
        let was_typing = self.is_typing;
        *self = Self::default();
        was_typing
    }
}
