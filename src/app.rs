// Application state module
// Toolkit-independent window state. Every platform callback is turned into an
// `Event` and fed through `BounceWindow::update`.

use crate::background::{Backgrounds, Tint};
use crate::dialogs::Dialogs;
use crate::fade::{CloseRequest, Fade, FadeTick, Phase};
use crate::physics::{Bounds, Motion, Vec2};
use image::DynamicImage;
use log::{debug, info, warn};
use std::time::{Duration, Instant};

/// Holding the pointer still for longer than this before release drops the fling
pub const FLING_TIMEOUT: Duration = Duration::from_millis(500);

/// Keys the window reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ChooseBackground,
    Other,
}

/// Input and host notifications
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Periodic animation/physics tick
    Tick,
    PointerEntered,
    PointerLeft { at: Instant },
    /// Left button pressed. `offset` is the pointer inside the window, `cursor`
    /// its raw screen position.
    PointerPressed { offset: Vec2, cursor: Vec2, at: Instant },
    PointerMoved { offset: Vec2, cursor: Vec2, at: Instant },
    PointerReleased { at: Instant },
    KeyReleased(Key),
    DisplayChanged(Bounds),
}

/// What the host has to do after an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Response {
    pub redraw: bool,
    /// The window location changed and must be pushed to the compositor
    pub moved: bool,
    /// The background surfaces were regenerated
    pub surfaces_changed: bool,
    /// Stop ticking and tear the window down
    pub exit: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct Pointer {
    pressed: bool,
    hovering: bool,
    /// Window position plus pointer offset at the last drag step
    reference: Vec2,
    /// Raw cursor position, used to ignore repeated motion reports
    last_cursor: Vec2,
    /// When the pointer last moved while pressed
    still_since: Option<Instant>,
}

pub struct BounceWindow {
    size: Vec2,
    bounds: Bounds,
    motion: Motion,
    pointer: Pointer,
    fade: Fade,
    backgrounds: Backgrounds,
    tint: Tint,
}

impl BounceWindow {
    /// Create the window centered in `bounds`, fading in
    pub fn new(source: &DynamicImage, width: u32, height: u32, bounds: Bounds) -> Self {
        let size = Vec2::new(width as f32, height as f32);
        Self {
            size,
            bounds,
            motion: Motion::at(bounds.centered(size)),
            pointer: Pointer::default(),
            fade: Fade::new(),
            backgrounds: Backgrounds::new(source, width, height),
            tint: Tint::Plain,
        }
    }

    /// Place the window on a freshly queried display, centered
    pub fn show(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.motion = Motion::at(bounds.centered(self.size));
        info!(
            "Window shown at {:?} on {}x{} display",
            self.motion.location(),
            bounds.width,
            bounds.height
        );
    }

    pub fn update(&mut self, event: Event, dialogs: &mut dyn Dialogs) -> Response {
        match event {
            Event::Tick => self.tick(),
            Event::PointerEntered => self.set_hover(true),
            Event::PointerLeft { at } => {
                let mut response = Response::default();
                if self.pointer.pressed {
                    debug!("Pointer left while pressed, releasing");
                    response = self.release(at);
                }
                let hover = self.set_hover(false);
                response.redraw |= hover.redraw;
                response
            }
            Event::PointerPressed { offset, cursor, at } => self.press(offset, cursor, at),
            Event::PointerMoved { offset, cursor, at } => self.drag(offset, cursor, at),
            Event::PointerReleased { at } => self.release(at),
            Event::KeyReleased(Key::Escape) => self.close(),
            Event::KeyReleased(Key::ChooseBackground) => self.choose_background(dialogs),
            Event::KeyReleased(Key::Other) => Response::default(),
            Event::DisplayChanged(bounds) => {
                info!(
                    "Display bounds changed: {}x{} at ({}, {})",
                    bounds.width, bounds.height, bounds.x, bounds.y
                );
                self.bounds = bounds;
                Response::default()
            }
        }
    }

    pub fn location(&self) -> (i32, i32) {
        self.motion.location()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.size.x as u32, self.size.y as u32)
    }

    pub fn opacity(&self) -> f64 {
        self.fade.opacity()
    }

    pub fn tint(&self) -> Tint {
        self.tint
    }

    pub fn backgrounds(&self) -> &Backgrounds {
        &self.backgrounds
    }

    #[cfg(test)]
    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn is_active(&self) -> bool {
        self.fade.is_active()
    }

    /// Still fading in after being shown
    pub fn is_launching(&self) -> bool {
        matches!(self.fade.phase(), Phase::Launching { .. })
    }

    fn tick(&mut self) -> Response {
        let mut response = Response {
            redraw: true,
            ..Response::default()
        };

        if self.fade.tick() == FadeTick::Finished {
            // The fade is over; issue the close that is allowed through
            if self.fade.request_close() == CloseRequest::Granted {
                info!("Fade out complete, closing window");
                response.exit = true;
                return response;
            }
        }

        if !self.pointer.pressed {
            let before = self.motion.location();
            self.motion.step(self.size, &self.bounds);
            response.moved = self.motion.location() != before;
        }
        response
    }

    fn close(&mut self) -> Response {
        match self.fade.request_close() {
            CloseRequest::Deferred => Response::default(),
            CloseRequest::Granted => {
                info!("Close request granted");
                Response {
                    exit: true,
                    ..Response::default()
                }
            }
        }
    }

    fn set_tint(&mut self, tint: Tint) -> Response {
        let changed = self.tint != tint;
        self.tint = tint;
        Response {
            redraw: changed,
            ..Response::default()
        }
    }

    fn set_hover(&mut self, hovering: bool) -> Response {
        self.pointer.hovering = hovering;
        if self.pointer.pressed {
            return Response::default();
        }
        self.set_tint(if hovering { Tint::Hover } else { Tint::Plain })
    }

    fn press(&mut self, offset: Vec2, cursor: Vec2, at: Instant) -> Response {
        self.pointer.pressed = true;
        self.pointer.reference = self.motion.position + offset;
        self.pointer.last_cursor = cursor;
        self.pointer.still_since = Some(at);
        self.motion.velocity = Vec2::ZERO;
        self.set_tint(Tint::Pressed)
    }

    fn drag(&mut self, offset: Vec2, cursor: Vec2, at: Instant) -> Response {
        if !self.pointer.pressed || cursor == self.pointer.last_cursor {
            return Response::default();
        }
        self.pointer.last_cursor = cursor;

        let reference = self.motion.position + offset;
        let delta = reference - self.pointer.reference;
        self.pointer.reference = reference;

        let before = self.motion.location();
        self.motion.drag_by(delta, self.size, &self.bounds);
        self.pointer.still_since = Some(at);
        Response {
            moved: self.motion.location() != before,
            ..Response::default()
        }
    }

    fn release(&mut self, at: Instant) -> Response {
        self.pointer.pressed = false;
        if let Some(since) = self.pointer.still_since.take() {
            if at.saturating_duration_since(since) > FLING_TIMEOUT {
                debug!("Pointer held still before release, dropping velocity");
                self.motion.velocity = Vec2::ZERO;
            }
        }
        self.set_tint(Tint::Hover)
    }

    fn choose_background(&mut self, dialogs: &mut dyn Dialogs) -> Response {
        let Some(path) = dialogs.pick_image() else {
            return Response::default();
        };
        match self.backgrounds.replace_from_path(&path) {
            Ok(()) => {
                // Restore whichever surface matches the pointer state
                self.tint = if self.pointer.pressed {
                    Tint::Pressed
                } else if self.pointer.hovering {
                    Tint::Hover
                } else {
                    Tint::Plain
                };
                Response {
                    redraw: true,
                    surfaces_changed: true,
                    ..Response::default()
                }
            }
            Err(e) => {
                warn!("Could not use {} as background: {}", path.display(), e);
                dialogs.show_error("Error", "Image type not supported.");
                Response::default()
            }
        }
    }
}
