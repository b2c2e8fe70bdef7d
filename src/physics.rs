// Physics module
// Gravity/friction integration with wall bounces, and drag clamping

use std::ops::{Add, AddAssign, Sub};

/// Downward acceleration added to the vertical velocity every tick
pub const GRAVITY: f32 = 0.5;

/// Per-axis velocity multiplier applied every tick
pub const FRICTION: f32 = 0.992_063_463;

/// 2D vector in screen pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Usable area of the display, in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Top-left position that centers a window of `size` inside the bounds
    pub fn centered(&self, size: Vec2) -> Vec2 {
        Vec2::new(
            self.x + (self.width - size.x) * 0.5,
            self.y + (self.height - size.y) * 0.5,
        )
    }
}

/// Position and momentum of the window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Motion {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Motion {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
        }
    }

    /// Advance one free-flight tick: gravity, friction, integration and bounce.
    pub fn step(&mut self, size: Vec2, bounds: &Bounds) {
        self.velocity.y += GRAVITY;
        self.velocity.x *= FRICTION;
        self.velocity.y *= FRICTION;
        self.position += self.velocity;

        let (x, vx) = bounce_axis(self.position.x, self.velocity.x, size.x, bounds.x, bounds.right());
        let (y, vy) = bounce_axis(self.position.y, self.velocity.y, size.y, bounds.y, bounds.bottom());
        self.position = Vec2::new(x, y);
        self.velocity = Vec2::new(vx, vy);
    }

    /// Move by a drag delta. The delta becomes the velocity; no bounce.
    pub fn drag_by(&mut self, delta: Vec2, size: Vec2, bounds: &Bounds) {
        self.velocity = delta;
        self.position += delta;
        self.position = clamp_within(self.position, size, bounds);
    }

    /// Integer location the window is actually placed at
    pub fn location(&self) -> (i32, i32) {
        (self.position.x as i32, self.position.y as i32)
    }
}

fn bounce_axis(pos: f32, vel: f32, extent: f32, min: f32, max: f32) -> (f32, f32) {
    if pos < min {
        (min, -vel)
    } else if pos + extent >= max {
        (max - extent, -vel)
    } else {
        (pos, vel)
    }
}

/// Clamp a window position so its full extent stays inside the bounds
pub fn clamp_within(position: Vec2, size: Vec2, bounds: &Bounds) -> Vec2 {
    let clamp_axis = |pos: f32, extent: f32, min: f32, max: f32| {
        if pos < min {
            min
        } else if pos + extent > max {
            max - extent
        } else {
            pos
        }
    };
    Vec2::new(
        clamp_axis(position.x, size.x, bounds.x, bounds.right()),
        clamp_axis(position.y, size.y, bounds.y, bounds.bottom()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: Vec2 = Vec2::new(246.0, 200.0);

    fn screen() -> Bounds {
        Bounds::new(0.0, 0.0, 1920.0, 1080.0)
    }

    #[test]
    fn test_gravity_and_friction_in_free_flight() {
        let mut motion = Motion::at(Vec2::new(500.0, 300.0));
        motion.velocity = Vec2::new(10.0, 0.0);
        motion.step(SIZE, &screen());

        assert!((motion.velocity.x - 10.0 * FRICTION).abs() < 1e-5);
        assert!((motion.velocity.y - GRAVITY * FRICTION).abs() < 1e-5);
        assert!((motion.position.x - (500.0 + 10.0 * FRICTION)).abs() < 1e-4);
        assert!((motion.position.y - (300.0 + GRAVITY * FRICTION)).abs() < 1e-4);
    }

    #[test]
    fn test_bounce_off_left_wall() {
        let mut motion = Motion::at(Vec2::new(2.0, 300.0));
        motion.velocity = Vec2::new(-20.0, 0.0);
        motion.step(SIZE, &screen());

        assert_eq!(motion.position.x, 0.0);
        assert!(motion.velocity.x > 0.0);
    }

    #[test]
    fn test_bounce_off_right_wall_clamps_exactly() {
        let bounds = screen();
        let mut motion = Motion::at(Vec2::new(bounds.right() - SIZE.x - 1.0, 300.0));
        motion.velocity = Vec2::new(30.0, 0.0);
        motion.step(SIZE, &bounds);

        assert_eq!(motion.position.x, bounds.right() - SIZE.x);
        assert!(motion.velocity.x < 0.0);
    }

    #[test]
    fn test_bounce_off_floor() {
        let bounds = screen();
        let mut motion = Motion::at(Vec2::new(100.0, bounds.bottom() - SIZE.y - 0.1));
        motion.velocity = Vec2::new(0.0, 12.0);
        motion.step(SIZE, &bounds);

        assert_eq!(motion.position.y, bounds.bottom() - SIZE.y);
        assert!(motion.velocity.y < 0.0);
    }

    #[test]
    fn test_bounce_respects_bounds_origin() {
        let bounds = Bounds::new(100.0, 50.0, 800.0, 600.0);
        let mut motion = Motion::at(Vec2::new(101.0, 51.0));
        motion.velocity = Vec2::new(-10.0, -10.0);
        motion.step(SIZE, &bounds);

        assert_eq!(motion.position, Vec2::new(100.0, 50.0));
        assert!(motion.velocity.x > 0.0);
        assert!(motion.velocity.y > 0.0);
    }

    #[test]
    fn test_position_never_leaves_bounds_over_many_ticks() {
        let bounds = screen();
        let mut motion = Motion::at(Vec2::new(800.0, 100.0));
        motion.velocity = Vec2::new(75.0, -40.0);
        for _ in 0..5_000 {
            motion.step(SIZE, &bounds);
            assert!(motion.position.x >= bounds.x);
            assert!(motion.position.y >= bounds.y);
            assert!(motion.position.x + SIZE.x <= bounds.right());
            assert!(motion.position.y + SIZE.y <= bounds.bottom());
        }
    }

    #[test]
    fn test_drag_clamps_without_reflecting() {
        let bounds = screen();
        let mut motion = Motion::at(Vec2::new(10.0, 10.0));
        motion.drag_by(Vec2::new(-50.0, 5.0), SIZE, &bounds);

        assert_eq!(motion.position, Vec2::new(0.0, 15.0));
        assert_eq!(motion.velocity, Vec2::new(-50.0, 5.0));
    }

    #[test]
    fn test_drag_clamps_at_far_edges() {
        let bounds = screen();
        let mut motion = Motion::at(Vec2::new(1600.0, 800.0));
        motion.drag_by(Vec2::new(500.0, 400.0), SIZE, &bounds);

        assert_eq!(motion.position, Vec2::new(1920.0 - 246.0, 1080.0 - 200.0));
        assert_eq!(motion.velocity, Vec2::new(500.0, 400.0));
    }

    #[test]
    fn test_centered() {
        let pos = screen().centered(SIZE);
        assert_eq!(pos, Vec2::new(837.0, 440.0));
    }

    #[test]
    fn test_location_truncates() {
        let motion = Motion::at(Vec2::new(12.9, 7.2));
        assert_eq!(motion.location(), (12, 7));
    }
}
