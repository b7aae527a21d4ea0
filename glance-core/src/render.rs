//! Render-scheduling state machine for the companion face.
//!
//! Pure machine: visibility and ambient transitions come in as events, and
//! the engine gets back the actions to run (connect, redraw, schedule or
//! cancel ticks, send a refresh request). The engine owns the actual timer,
//! link, and drawing; this module owns the rules.
//!
//! Tick discipline: a recurring tick runs only while the face is visible
//! AND interactive. Every (re)schedule is preceded by a cancel, so at most
//! one tick is pending, and eligibility is re-checked when a tick fires so
//! a stray tick after a state change is dropped. While ambient, redraws
//! come from the platform's own coarse time-tick callback instead.

/// Update rate in milliseconds for interactive mode. Seconds are shown in
/// interactive mode, so the face updates once a second.
pub const INTERACTIVE_UPDATE_RATE_MS: u64 = 1000;

/// Delay until the next tick, aligned to the interval boundary.
///
/// For any `now_ms`, `0 <= delay < interval_ms` and `now_ms + delay` is a
/// multiple of `interval_ms`.
pub fn next_tick_delay(now_ms: u64, interval_ms: u64) -> u64 {
    (interval_ms - (now_ms % interval_ms)) % interval_ms
}

/// Lifecycle phase of the render engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    /// Constructed: face and scheduler allocated, not yet shown.
    Initialized,
    /// Visible: listeners registered, link requested, ticks may run.
    Active,
    /// Hidden: listeners unregistered, link released.
    Inactive,
    /// Torn down: all further events are ignored.
    Destroyed,
}

/// Phase of a tap gesture as classified by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapPhase {
    /// The user has started touching the screen.
    TouchStart,
    /// The user has started a different gesture or cancelled the tap.
    TouchCancel,
    /// The user has completed the tap gesture.
    TapComplete,
}

/// Events delivered to the render state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    /// The face became visible.
    BecameVisible,
    /// The face became hidden.
    BecameHidden,
    /// The platform entered or left ambient mode.
    AmbientChanged(bool),
    /// The platform reported display properties.
    PropertiesChanged {
        /// Whether ambient mode uses fewer bits per color. When true,
        /// anti-aliasing is disabled while ambient.
        low_bit_ambient: bool,
    },
    /// A tap gesture phase.
    Tap(TapPhase),
    /// A self-scheduled tick fired.
    TickFired,
    /// The platform's own periodic time callback (ambient cadence).
    PlatformTimeTick,
    /// The engine is being torn down.
    Destroy,
}

/// Actions for the engine to execute, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderAction {
    /// Start listening for environment changes (time zone etc.).
    RegisterEnvironmentListeners,
    /// Stop listening for environment changes.
    UnregisterEnvironmentListeners,
    /// Re-read the local time reference (it may have changed while hidden).
    ResetTimeReference,
    /// Ask the connection manager to connect.
    Connect,
    /// Ask the connection manager to disconnect.
    Disconnect,
    /// Toggle anti-aliasing on every face paint.
    SetAntialias(bool),
    /// Redraw the face from the cached snapshot.
    Redraw,
    /// Cancel any pending tick.
    CancelTick,
    /// Schedule the next tick after `delay_ms`. Always preceded by
    /// [`RenderAction::CancelTick`] so at most one tick is pending.
    ScheduleTick {
        /// Delay before the tick fires, in milliseconds.
        delay_ms: u64,
    },
    /// Send a refresh request toward the last known peer. A silent no-op
    /// when no peer id has been learned yet.
    SendRefreshRequest,
}

/// Render-scheduling state for the companion face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
    phase: RenderPhase,
    ambient: bool,
    low_bit_ambient: bool,
    antialias: bool,
    tap_count: u32,
    interval_ms: u64,
}

impl RenderState {
    /// Create a freshly initialized state with the default tick interval.
    pub fn new() -> Self {
        Self::with_interval(INTERACTIVE_UPDATE_RATE_MS)
    }

    /// Create a state with a custom tick interval.
    pub fn with_interval(interval_ms: u64) -> Self {
        Self {
            phase: RenderPhase::Initialized,
            ambient: false,
            low_bit_ambient: false,
            antialias: true,
            tap_count: 0,
            interval_ms,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    /// Whether the display is in ambient mode.
    pub fn is_ambient(&self) -> bool {
        self.ambient
    }

    /// Whether face paints currently use anti-aliasing.
    pub fn antialias(&self) -> bool {
        self.antialias
    }

    /// Number of completed taps so far.
    pub fn tap_count(&self) -> u32 {
        self.tap_count
    }

    /// Whether the cosmetic alternate background is in effect (alternates
    /// with every completed tap).
    pub fn background_alternate(&self) -> bool {
        self.tap_count % 2 == 1
    }

    /// Whether the self-scheduled tick should be running: visible and
    /// interactive, nothing else.
    pub fn timer_eligible(&self) -> bool {
        self.phase == RenderPhase::Active && !self.ambient
    }

    /// Process an event and return the actions to execute.
    ///
    /// `now_ms` is the current wall-clock time in epoch milliseconds, used
    /// only to align tick delays; the machine keeps no clock of its own.
    pub fn on_event(&mut self, event: RenderEvent, now_ms: u64) -> Vec<RenderAction> {
        if self.phase == RenderPhase::Destroyed {
            return vec![];
        }

        match event {
            RenderEvent::BecameVisible => {
                self.phase = RenderPhase::Active;
                let mut actions = vec![
                    RenderAction::RegisterEnvironmentListeners,
                    RenderAction::ResetTimeReference,
                    RenderAction::Connect,
                ];
                actions.extend(self.update_timer());
                actions
            }

            RenderEvent::BecameHidden => {
                self.phase = RenderPhase::Inactive;
                let mut actions = vec![
                    RenderAction::UnregisterEnvironmentListeners,
                    RenderAction::Disconnect,
                ];
                actions.extend(self.update_timer());
                actions
            }

            RenderEvent::AmbientChanged(ambient) => {
                let mut actions = vec![];
                if self.ambient != ambient {
                    self.ambient = ambient;
                    if self.low_bit_ambient {
                        self.antialias = !ambient;
                        actions.push(RenderAction::SetAntialias(!ambient));
                    }
                    actions.push(RenderAction::Redraw);
                }
                // The timer is re-evaluated even when the flag did not
                // change; the platform may repeat notifications.
                actions.extend(self.update_timer());
                actions
            }

            RenderEvent::PropertiesChanged { low_bit_ambient } => {
                self.low_bit_ambient = low_bit_ambient;
                vec![]
            }

            RenderEvent::Tap(TapPhase::TouchStart) | RenderEvent::Tap(TapPhase::TouchCancel) => {
                vec![RenderAction::Redraw]
            }

            RenderEvent::Tap(TapPhase::TapComplete) => {
                self.tap_count += 1;
                vec![RenderAction::SendRefreshRequest, RenderAction::Redraw]
            }

            RenderEvent::TickFired => {
                // Eligibility is re-checked here, not only at schedule time:
                // a tick cancelled too late must not redraw or reschedule.
                if !self.timer_eligible() {
                    return vec![];
                }
                vec![
                    RenderAction::Redraw,
                    RenderAction::CancelTick,
                    RenderAction::ScheduleTick {
                        delay_ms: next_tick_delay(now_ms, self.interval_ms),
                    },
                ]
            }

            RenderEvent::PlatformTimeTick => vec![RenderAction::Redraw],

            RenderEvent::Destroy => {
                self.phase = RenderPhase::Destroyed;
                vec![RenderAction::CancelTick, RenderAction::Disconnect]
            }
        }
    }

    /// Cancel-then-maybe-start, the only way the tick timer is touched. An
    /// immediate tick is scheduled when eligible; the fired tick redraws
    /// and chains the aligned reschedule itself.
    fn update_timer(&self) -> Vec<RenderAction> {
        let mut actions = vec![RenderAction::CancelTick];
        if self.timer_eligible() {
            actions.push(RenderAction::ScheduleTick { delay_ms: 0 });
        }
        actions
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible_interactive() -> RenderState {
        let mut state = RenderState::new();
        state.on_event(RenderEvent::BecameVisible, 0);
        state
    }

    #[test]
    fn starts_initialized_and_interactive() {
        let state = RenderState::new();
        assert_eq!(state.phase(), RenderPhase::Initialized);
        assert!(!state.is_ambient());
        assert!(state.antialias());
        assert!(!state.timer_eligible());
    }

    #[test]
    fn becoming_visible_connects_and_starts_the_timer() {
        let mut state = RenderState::new();
        let actions = state.on_event(RenderEvent::BecameVisible, 0);

        assert_eq!(state.phase(), RenderPhase::Active);
        assert!(actions.contains(&RenderAction::RegisterEnvironmentListeners));
        assert!(actions.contains(&RenderAction::ResetTimeReference));
        assert!(actions.contains(&RenderAction::Connect));
        // Cancel always precedes schedule.
        let cancel = actions
            .iter()
            .position(|a| matches!(a, RenderAction::CancelTick))
            .unwrap();
        let schedule = actions
            .iter()
            .position(|a| matches!(a, RenderAction::ScheduleTick { .. }))
            .unwrap();
        assert!(cancel < schedule);
    }

    #[test]
    fn becoming_hidden_disconnects_and_stops_the_timer() {
        let mut state = visible_interactive();
        let actions = state.on_event(RenderEvent::BecameHidden, 0);

        assert_eq!(state.phase(), RenderPhase::Inactive);
        assert!(actions.contains(&RenderAction::UnregisterEnvironmentListeners));
        assert!(actions.contains(&RenderAction::Disconnect));
        assert!(actions.contains(&RenderAction::CancelTick));
        assert!(!actions
            .iter()
            .any(|a| matches!(a, RenderAction::ScheduleTick { .. })));
    }

    #[test]
    fn tick_redraws_and_reschedules_on_the_interval_boundary() {
        let mut state = visible_interactive();
        let actions = state.on_event(RenderEvent::TickFired, 12_345);

        assert_eq!(
            actions,
            vec![
                RenderAction::Redraw,
                RenderAction::CancelTick,
                RenderAction::ScheduleTick { delay_ms: 655 },
            ]
        );
    }

    #[test]
    fn tick_delay_is_bounded_and_aligned() {
        let interval = 1000;
        for now in [0u64, 1, 250, 999, 1000, 1001, 59_999, 60_000, u64::MAX - 7] {
            let delay = next_tick_delay(now, interval);
            assert!(delay < interval, "delay {} out of bounds for now {}", delay, now);
            // u128 so the check itself cannot overflow near u64::MAX.
            assert_eq!(
                (now as u128 + delay as u128) % interval as u128,
                0,
                "not aligned for now {}",
                now
            );
        }
    }

    #[test]
    fn stray_tick_after_hiding_is_dropped() {
        let mut state = visible_interactive();
        state.on_event(RenderEvent::BecameHidden, 0);

        let actions = state.on_event(RenderEvent::TickFired, 500);
        assert!(actions.is_empty(), "ineligible tick must do nothing");
    }

    #[test]
    fn ambient_stops_self_scheduled_ticks() {
        let mut state = visible_interactive();
        let actions = state.on_event(RenderEvent::AmbientChanged(true), 0);

        assert!(state.is_ambient());
        assert!(actions.contains(&RenderAction::CancelTick));
        assert!(!actions
            .iter()
            .any(|a| matches!(a, RenderAction::ScheduleTick { .. })));

        // A stray tick that was already in flight is dropped too.
        assert!(state.on_event(RenderEvent::TickFired, 100).is_empty());
    }

    #[test]
    fn platform_time_tick_redraws_while_ambient() {
        let mut state = visible_interactive();
        state.on_event(RenderEvent::AmbientChanged(true), 0);

        let actions = state.on_event(RenderEvent::PlatformTimeTick, 60_000);
        assert_eq!(actions, vec![RenderAction::Redraw]);
    }

    #[test]
    fn low_bit_ambient_toggles_antialias() {
        let mut state = visible_interactive();
        state.on_event(
            RenderEvent::PropertiesChanged {
                low_bit_ambient: true,
            },
            0,
        );

        let actions = state.on_event(RenderEvent::AmbientChanged(true), 0);
        assert!(actions.contains(&RenderAction::SetAntialias(false)));
        assert!(!state.antialias());

        let actions = state.on_event(RenderEvent::AmbientChanged(false), 0);
        assert!(actions.contains(&RenderAction::SetAntialias(true)));
        assert!(state.antialias());
    }

    #[test]
    fn full_color_ambient_leaves_antialias_alone() {
        let mut state = visible_interactive();
        state.on_event(
            RenderEvent::PropertiesChanged {
                low_bit_ambient: false,
            },
            0,
        );

        let actions = state.on_event(RenderEvent::AmbientChanged(true), 0);
        assert!(!actions
            .iter()
            .any(|a| matches!(a, RenderAction::SetAntialias(_))));
        assert!(state.antialias());

        let actions = state.on_event(RenderEvent::AmbientChanged(false), 0);
        assert!(!actions
            .iter()
            .any(|a| matches!(a, RenderAction::SetAntialias(_))));
    }

    #[test]
    fn repeated_ambient_notification_does_not_redraw() {
        let mut state = visible_interactive();
        state.on_event(RenderEvent::AmbientChanged(true), 0);
        let actions = state.on_event(RenderEvent::AmbientChanged(true), 0);

        assert!(!actions.contains(&RenderAction::Redraw));
        // The timer is still re-evaluated.
        assert!(actions.contains(&RenderAction::CancelTick));
    }

    #[test]
    fn only_completed_taps_count_and_request() {
        let mut state = visible_interactive();

        let actions = state.on_event(RenderEvent::Tap(TapPhase::TouchStart), 0);
        assert!(!actions.contains(&RenderAction::SendRefreshRequest));
        let actions = state.on_event(RenderEvent::Tap(TapPhase::TouchCancel), 0);
        assert!(!actions.contains(&RenderAction::SendRefreshRequest));
        assert_eq!(state.tap_count(), 0);

        let actions = state.on_event(RenderEvent::Tap(TapPhase::TapComplete), 0);
        assert!(actions.contains(&RenderAction::SendRefreshRequest));
        assert!(actions.contains(&RenderAction::Redraw));
        assert_eq!(state.tap_count(), 1);
    }

    #[test]
    fn tap_parity_alternates_background() {
        let mut state = visible_interactive();
        assert!(!state.background_alternate());

        state.on_event(RenderEvent::Tap(TapPhase::TapComplete), 0);
        assert!(state.background_alternate());

        state.on_event(RenderEvent::Tap(TapPhase::TapComplete), 0);
        assert!(!state.background_alternate());
    }

    #[test]
    fn destroy_cancels_and_disconnects() {
        let mut state = visible_interactive();
        let actions = state.on_event(RenderEvent::Destroy, 0);

        assert_eq!(state.phase(), RenderPhase::Destroyed);
        assert_eq!(
            actions,
            vec![RenderAction::CancelTick, RenderAction::Disconnect]
        );
    }

    #[test]
    fn events_after_destroy_are_ignored() {
        let mut state = visible_interactive();
        state.on_event(RenderEvent::Destroy, 0);

        assert!(state.on_event(RenderEvent::BecameVisible, 0).is_empty());
        assert!(state.on_event(RenderEvent::TickFired, 0).is_empty());
        assert!(state
            .on_event(RenderEvent::Tap(TapPhase::TapComplete), 0)
            .is_empty());
        assert_eq!(state.tap_count(), 0);
    }

    #[test]
    fn custom_interval_respected() {
        let mut state = RenderState::with_interval(60_000);
        state.on_event(RenderEvent::BecameVisible, 0);

        let actions = state.on_event(RenderEvent::TickFired, 61_500);
        assert!(actions.contains(&RenderAction::ScheduleTick { delay_ms: 58_500 }));
    }
}
