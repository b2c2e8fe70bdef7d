// Fade module
// Lifecycle of the window: fade in on launch, fade out on close

use log::debug;

/// Opacity the launch fade settles at
pub const OPACITY_CAP: f64 = 0.9;

/// Closing fade is finished once opacity drops to this value
pub const CLOSE_THRESHOLD: f64 = 0.01;

/// Fraction of the current opacity removed on every closing tick
const CLOSE_DECAY: f64 = 0.2;

const RAMP_STEP: f64 = 0.007;
const ACCELERATION_FACTOR: f64 = 0.006;

/// Lifecycle phase of the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Fading in with an accelerating ease-in
    Launching {
        ramp: f64,
        acceleration: f64,
        close_requested: bool,
    },
    /// Fully faded in, waiting for a close request
    Idle,
    /// Fading out
    Closing,
    /// The window may be destroyed
    Closed,
}

/// Answer to a close request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseRequest {
    /// Swallowed so the fade-out can play
    Deferred,
    /// Allowed through; the window must go away now
    Granted,
}

/// Result of advancing the fade by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeTick {
    Running,
    /// The closing fade completed. Stop ticking and close again.
    Finished,
}

#[derive(Debug, Clone)]
pub struct Fade {
    phase: Phase,
    opacity: f64,
}

impl Fade {
    /// Start a launch fade from fully transparent
    pub fn new() -> Self {
        Self {
            phase: Phase::Launching {
                ramp: 0.0,
                acceleration: 0.0,
                close_requested: false,
            },
            opacity: 0.0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Whether the periodic tick should keep running
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Closed
    }

    pub fn request_close(&mut self) -> CloseRequest {
        match self.phase {
            Phase::Launching {
                ramp,
                acceleration,
                close_requested: false,
            } => {
                debug!("Close requested during launch fade, deferring");
                self.phase = Phase::Launching {
                    ramp,
                    acceleration,
                    close_requested: true,
                };
                CloseRequest::Deferred
            }
            Phase::Idle => {
                debug!("Close requested, starting fade out");
                self.phase = Phase::Closing;
                CloseRequest::Deferred
            }
            _ => {
                self.phase = Phase::Closed;
                CloseRequest::Granted
            }
        }
    }

    pub fn tick(&mut self) -> FadeTick {
        match self.phase {
            Phase::Launching {
                ramp,
                acceleration,
                close_requested,
            } => {
                let ramp = ramp + RAMP_STEP;
                let acceleration = acceleration + ACCELERATION_FACTOR * ramp;
                self.opacity += acceleration;
                self.phase = if self.opacity >= OPACITY_CAP {
                    self.opacity = OPACITY_CAP;
                    let next = if close_requested {
                        Phase::Closing
                    } else {
                        Phase::Idle
                    };
                    debug!("Launch fade complete, now {:?}", next);
                    next
                } else {
                    Phase::Launching {
                        ramp,
                        acceleration,
                        close_requested,
                    }
                };
                FadeTick::Running
            }
            Phase::Closing => {
                self.opacity -= self.opacity * CLOSE_DECAY;
                // Exactly 1.0 can never decay visibly; treat it as done
                if self.opacity <= CLOSE_THRESHOLD || self.opacity == 1.0 {
                    FadeTick::Finished
                } else {
                    FadeTick::Running
                }
            }
            Phase::Idle | Phase::Closed => FadeTick::Running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until_idle(fade: &mut Fade) -> usize {
        let mut ticks = 0;
        while matches!(fade.phase(), Phase::Launching { .. }) {
            fade.tick();
            ticks += 1;
            assert!(ticks < 10_000, "launch fade never settled");
        }
        ticks
    }

    #[test]
    fn test_launch_is_monotonic_and_capped() {
        let mut fade = Fade::new();
        let mut last = fade.opacity();
        while matches!(fade.phase(), Phase::Launching { .. }) {
            fade.tick();
            assert!(fade.opacity() >= last);
            assert!(fade.opacity() <= OPACITY_CAP);
            last = fade.opacity();
        }
        assert_eq!(fade.opacity(), OPACITY_CAP);
        assert_eq!(fade.phase(), Phase::Idle);
    }

    #[test]
    fn test_launch_accelerates() {
        let mut fade = Fade::new();
        fade.tick();
        let first = fade.opacity();
        fade.tick();
        let second = fade.opacity() - first;
        assert!(second > first);
    }

    #[test]
    fn test_idle_tick_keeps_opacity() {
        let mut fade = Fade::new();
        run_until_idle(&mut fade);
        for _ in 0..10 {
            assert_eq!(fade.tick(), FadeTick::Running);
        }
        assert_eq!(fade.opacity(), OPACITY_CAP);
    }

    #[test]
    fn test_close_fade_is_monotonic_and_finishes_at_threshold() {
        let mut fade = Fade::new();
        run_until_idle(&mut fade);
        assert_eq!(fade.request_close(), CloseRequest::Deferred);
        assert_eq!(fade.phase(), Phase::Closing);

        let mut last = fade.opacity();
        loop {
            let result = fade.tick();
            assert!(fade.opacity() <= last);
            last = fade.opacity();
            if result == FadeTick::Finished {
                assert!(fade.opacity() <= CLOSE_THRESHOLD);
                break;
            }
            assert!(fade.opacity() > CLOSE_THRESHOLD);
        }
    }

    #[test]
    fn test_two_close_requests_terminate() {
        let mut fade = Fade::new();
        run_until_idle(&mut fade);

        assert_eq!(fade.request_close(), CloseRequest::Deferred);
        assert!(fade.is_active());
        while fade.tick() != FadeTick::Finished {}
        assert_eq!(fade.request_close(), CloseRequest::Granted);
        assert_eq!(fade.phase(), Phase::Closed);
        assert!(!fade.is_active());
    }

    #[test]
    fn test_close_during_launch_waits_for_fade_in() {
        let mut fade = Fade::new();
        fade.tick();
        assert_eq!(fade.request_close(), CloseRequest::Deferred);
        assert!(matches!(fade.phase(), Phase::Launching { .. }));

        run_until_idle(&mut fade);
        assert_eq!(fade.phase(), Phase::Closing);
        assert_eq!(fade.opacity(), OPACITY_CAP);
    }

    #[test]
    fn test_second_request_while_closing_is_granted() {
        let mut fade = Fade::new();
        run_until_idle(&mut fade);
        fade.request_close();
        fade.tick();
        assert_eq!(fade.request_close(), CloseRequest::Granted);
    }
}
