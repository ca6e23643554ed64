//! Collision detection for balls, blocks, paddle, and pickups
//!
//! This module is the collision source the rest of the core consumes: it
//! only produces geometry results and [`CollisionEvent`]s, never mutates
//! game state. Everything is circles against axis-aligned rectangles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Reference to a session-owned entity
///
/// Direct references by role and id replace the old string-keyed lookup
/// scheme ("paddle", "ball_3", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityRef {
    Paddle,
    Ball(u32),
    Block(u32),
    Pickup(u32),
}

/// A collision between two entities, as raised by the collision source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub subject: EntityRef,
    pub collided: EntityRef,
}

/// Result of resolving a ball against a rectangle
#[derive(Debug, Clone, Copy)]
pub struct CollisionResult {
    /// Corrected position (pushed out of the rectangle)
    pub pos: Vec2,
    /// Reflected velocity
    pub vel: Vec2,
    /// Outward surface normal at the contact
    pub normal: Vec2,
}

/// Reflect a velocity about a surface normal
#[inline]
pub fn reflect(vel: Vec2, normal: Vec2) -> Vec2 {
    vel - 2.0 * vel.dot(normal) * normal
}

/// Closest point on an axis-aligned rectangle to `point`
#[inline]
fn closest_point_on_rect(point: Vec2, center: Vec2, half: Vec2) -> Vec2 {
    Vec2::new(
        point.x.clamp(center.x - half.x, center.x + half.x),
        point.y.clamp(center.y - half.y, center.y + half.y),
    )
}

/// Does a circle overlap an axis-aligned rectangle?
pub fn circle_rect_overlap(pos: Vec2, radius: f32, center: Vec2, half: Vec2) -> bool {
    pos.distance_squared(closest_point_on_rect(pos, center, half)) <= radius * radius
}

/// Resolve a moving circle against a rectangle.
///
/// Returns None if there is no contact, or if the ball is already moving
/// away from the surface (prevents re-collding on consecutive ticks while
/// still overlapping).
pub fn ball_rect_collision(
    pos: Vec2,
    radius: f32,
    vel: Vec2,
    center: Vec2,
    half: Vec2,
) -> Option<CollisionResult> {
    let closest = closest_point_on_rect(pos, center, half);
    let diff = pos - closest;
    let dist_sq = diff.length_squared();
    if dist_sq > radius * radius {
        return None;
    }

    let normal = if dist_sq > 1e-8 {
        diff / dist_sq.sqrt()
    } else {
        // Center inside the rectangle - push out along the shallowest axis
        let local = pos - center;
        let overlap_x = half.x - local.x.abs();
        let overlap_y = half.y - local.y.abs();
        if overlap_x < overlap_y {
            Vec2::new(local.x.signum(), 0.0)
        } else {
            Vec2::new(0.0, local.y.signum())
        }
    };

    if vel.dot(normal) >= 0.0 {
        return None;
    }

    Some(CollisionResult {
        pos: closest + normal * (radius + 0.01),
        vel: reflect(vel, normal),
        normal,
    })
}

/// Paddle bounce direction for a ball hitting at `offset_ratio` in [-1, 1]
/// across the paddle face. Center hits go straight up; edge hits go out at
/// a steep angle, which is what gives the player aim control.
pub fn paddle_bounce_dir(offset_ratio: f32) -> Vec2 {
    let t = offset_ratio.clamp(-1.0, 1.0);
    // Up to 60 degrees off vertical at the edges
    let angle = t * std::f32::consts::FRAC_PI_3;
    Vec2::new(angle.sin(), -angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF: Vec2 = Vec2::new(25.0, 12.0);

    #[test]
    fn test_no_contact_when_far() {
        let result = ball_rect_collision(
            Vec2::new(100.0, 100.0),
            8.0,
            Vec2::new(0.0, 50.0),
            Vec2::ZERO,
            HALF,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_bottom_hit_reflects_downward() {
        // Ball rising into the underside of a block
        let result = ball_rect_collision(
            Vec2::new(0.0, 18.0),
            8.0,
            Vec2::new(0.0, -100.0),
            Vec2::ZERO,
            HALF,
        )
        .expect("should collide");
        assert!(result.vel.y > 0.0);
        assert_eq!(result.normal, Vec2::new(0.0, 1.0));
        assert!(result.pos.y > 12.0);
    }

    #[test]
    fn test_side_hit_reflects_horizontally() {
        let result = ball_rect_collision(
            Vec2::new(-31.0, 0.0),
            8.0,
            Vec2::new(100.0, 0.0),
            Vec2::ZERO,
            HALF,
        )
        .expect("should collide");
        assert!(result.vel.x < 0.0);
        assert_eq!(result.normal, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_separating_ball_is_ignored() {
        // Overlapping but already moving away
        let result = ball_rect_collision(
            Vec2::new(0.0, 18.0),
            8.0,
            Vec2::new(0.0, 100.0),
            Vec2::ZERO,
            HALF,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_overlap_check() {
        assert!(circle_rect_overlap(
            Vec2::new(0.0, 19.0),
            8.0,
            Vec2::ZERO,
            HALF
        ));
        assert!(!circle_rect_overlap(
            Vec2::new(0.0, 21.0),
            8.0,
            Vec2::ZERO,
            HALF
        ));
    }

    #[test]
    fn test_paddle_bounce_center_goes_up() {
        let dir = paddle_bounce_dir(0.0);
        assert!((dir.x).abs() < 1e-6);
        assert!(dir.y < 0.0);
    }

    #[test]
    fn test_paddle_bounce_edges_angle_out() {
        assert!(paddle_bounce_dir(1.0).x > 0.5);
        assert!(paddle_bounce_dir(-1.0).x < -0.5);
    }
}
