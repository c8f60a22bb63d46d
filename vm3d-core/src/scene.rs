//! The compound spaceship and its launch path
//!
//! The ship is built from primitives placed by `scaling * translation`
//! pre-transforms (translation in the primitive's unit frame, then scaled)
//! and fused into one triangle list.

use std::f32::consts::{FRAC_PI_2, PI};

use tracing::debug;

use crate::mat::Mat44f;
use crate::mesh::MeshBuffer;
use crate::shapes::{make_cone, make_cube, make_cylinder};
use crate::transform::Transform;
use crate::vec::Vec3f;

pub const HULL_ORANGE: Vec3f = Vec3f::new(0.9098, 0.5137, 0.0627);
pub const HULL_WHITE: Vec3f = Vec3f::new(1.0, 1.0, 1.0);
pub const NOZZLE_BLACK: Vec3f = Vec3f::new(0.01, 0.01, 0.01);

fn place(scale: (f32, f32, f32), offset: (f32, f32, f32)) -> Mat44f {
    Transform::scaling(scale.0, scale.1, scale.2)
        * Transform::translation(Vec3f::new(offset.0, offset.1, offset.2))
}

/// Build the ship along +X: main body, nose cone, base block and main
/// thruster, flanked by two boosters at ±Y.
pub fn make_ship(subdivs: usize) -> MeshBuffer {
    let body = make_cylinder(true, subdivs, HULL_ORANGE, place((0.7, 0.1, 0.1), (0.0, 0.0, 0.0)));
    let nose = make_cone(true, subdivs, HULL_WHITE, place((0.13, 0.1, 0.1), (5.385, 0.0, 0.0)));
    let base = make_cube(HULL_ORANGE, place((0.24, 0.2, 0.2), (-0.5, 0.0, 0.0)));
    let thruster = make_cone(true, subdivs, NOZZLE_BLACK, place((0.2, 0.1, 0.1), (-1.6, 0.0, 0.0)));

    let mut ship = body.concatenate(&nose).concatenate(&base).concatenate(&thruster);

    for side in [2.25, -2.25] {
        let booster = make_cylinder(true, subdivs, HULL_WHITE, place((0.7, 0.08, 0.08), (-0.4, side, 0.0)));
        let cap = make_cone(true, subdivs, NOZZLE_BLACK, place((0.08, 0.08, 0.08), (5.25, side, 0.0)));
        let nozzle = make_cone(true, subdivs, NOZZLE_BLACK, place((0.2, 0.08, 0.08), (-1.8, side, 0.0)));
        ship = ship.concatenate(&booster).concatenate(&cap).concatenate(&nozzle);
    }

    debug!(vertices = ship.vertex_count(), "assembled ship");
    ship
}

/// Camera placement as a position plus yaw (`phi`) and pitch (`theta`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3f,
    pub phi: f32,
    pub theta: f32,
}

/// Offsets of the launch at a given time.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LaunchPose {
    rise: f32,
    drift: f32,
    yaw: f32,
}

/// Launch trajectory: straight up for five seconds, then banking away
/// along -Z. Time is seconds since launch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchPath {
    /// Where the ship stands on its pad.
    pub pad: Vec3f,
    /// Seconds after which the launch is over.
    pub duration: f32,
}

impl Default for LaunchPath {
    fn default() -> Self {
        Self {
            pad: Vec3f::new(-5.7, -0.6, -2.0),
            duration: 30.0,
        }
    }
}

impl LaunchPath {
    const BANK_START: f32 = 5.0;
    const BANK_END: f32 = 10.0;

    fn pose(&self, t: f32) -> LaunchPose {
        let rise = 0.05 * t * t;
        if t < Self::BANK_START {
            return LaunchPose { rise, drift: 0.0, yaw: 0.0 };
        }
        let banked = t.min(Self::BANK_END) - Self::BANK_START;
        LaunchPose {
            rise,
            drift: 90.0 * (0.004 * (t - Self::BANK_START)).atanh(),
            yaw: 5.0 * (0.0125 * banked).atan(),
        }
    }

    pub fn is_finished(&self, t: f32) -> bool {
        t > self.duration
    }

    /// Ship standing upright on the pad.
    pub fn rest_model(&self) -> Mat44f {
        Transform::translation(self.pad) * Transform::rotation_z(FRAC_PI_2)
    }

    /// Model-to-world matrix `t` seconds into the launch.
    pub fn model_at(&self, t: f32) -> Mat44f {
        let pose = self.pose(t);
        let offset = Vec3f::new(0.0, pose.rise, -pose.drift);
        Transform::translation(self.pad + offset)
            * Transform::rotation_z(FRAC_PI_2)
            * Transform::rotation_y(pose.yaw)
    }

    /// Chase camera trailing the ship.
    pub fn follow_camera(&self, t: f32) -> CameraPose {
        let pose = self.pose(t);
        CameraPose {
            position: self.pad + Vec3f::new(-6.0, pose.rise, -6.0 - pose.drift),
            phi: PI * 0.75,
            theta: -pose.yaw / PI,
        }
    }

    /// Fixed camera on the ground, turning to keep the ship in view.
    pub fn ground_camera(&self, t: f32) -> CameraPose {
        let pose = self.pose(t);
        CameraPose {
            position: Vec3f::new(self.pad.x + 10.0, self.pad.y, self.pad.z),
            phi: PI * 1.5 + (pose.drift / 10.0).atan(),
            theta: -(pose.rise / 10.0).atan(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ship_vertex_count() {
        // body + 2 boosters: 12N each; nose, thruster, 2 caps, 2 nozzles: 6N each; cube: 36
        let n = 16;
        let ship = make_ship(n);
        assert_eq!(ship.vertex_count(), 3 * 12 * n + 6 * 6 * n + 36);
        assert!(ship.validate().is_ok());
    }

    #[test]
    fn test_ship_starts_with_main_body() {
        let ship = make_ship(8);
        let body = make_cylinder(true, 8, HULL_ORANGE, place((0.7, 0.1, 0.1), (0.0, 0.0, 0.0)));
        assert_eq!(&ship.positions[..body.vertex_count()], &body.positions[..]);
    }

    #[test]
    fn test_launch_starts_at_rest() {
        let path = LaunchPath::default();
        assert_eq!(path.model_at(0.0), path.rest_model());
    }

    #[test]
    fn test_launch_rises_then_banks() {
        let path = LaunchPath::default();
        let at = |t: f32| path.model_at(t).transform_point(Vec3f::ZERO);

        let early = at(4.0);
        assert!((early.y - (-0.6 + 0.8)).abs() < 1e-5);
        assert!((early.z + 2.0).abs() < 1e-5);

        let late = at(12.0);
        assert!(late.z < -2.0);
        assert!(path.is_finished(31.0));
        assert!(!path.is_finished(12.0));
    }

    #[test]
    fn test_yaw_freezes_after_banking() {
        let path = LaunchPath::default();
        assert_eq!(path.follow_camera(12.0).theta, path.follow_camera(20.0).theta);
        assert!(path.follow_camera(7.0).theta > path.follow_camera(12.0).theta);
    }
}
