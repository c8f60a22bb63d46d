//! Per-frame camera and launch state for the viewer.
use std::f32::consts::FRAC_PI_2;

use tracing::info;
use vm3d_core::projection::fly_view;
use vm3d_core::scene::{CameraPose, LaunchPath};
use vm3d_core::{Mat44f, Vec3f};

use crate::config::CameraConfig;

/// Where the view comes from while the ship is launching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    #[default]
    Free,
    Follow,
    Ground,
}

impl CameraMode {
    pub fn next(self) -> Self {
        match self {
            CameraMode::Free => CameraMode::Follow,
            CameraMode::Follow => CameraMode::Ground,
            CameraMode::Ground => CameraMode::Free,
        }
    }
}

/// Movement requested for the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Movement {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Camera state threaded through input handling and the frame update.
#[derive(Debug, Clone)]
pub struct CameraControl {
    pub position: Vec3f,
    /// Yaw about +Y.
    pub phi: f32,
    /// Pitch about +X, clamped to ±π/2.
    pub theta: f32,
    pub active: bool,
    pub movement: Movement,
    pub fast: bool,
    pub slow: bool,
    pub mode: CameraMode,
    last_mouse: Option<(u16, u16)>,
    launch_time: Option<f32>,
    path: LaunchPath,
    settings: CameraConfig,
}

impl CameraControl {
    pub fn new(settings: CameraConfig) -> Self {
        Self {
            position: settings.start_position(),
            phi: 0.0,
            theta: 0.0,
            active: true,
            movement: Movement::default(),
            fast: false,
            slow: false,
            mode: CameraMode::Free,
            last_mouse: None,
            launch_time: None,
            path: LaunchPath::default(),
            settings,
        }
    }

    /// Unit vector the camera looks along.
    pub fn direction(&self) -> Vec3f {
        Vec3f::new(self.phi.sin(), self.theta.sin(), -self.phi.cos()).normalize()
    }

    pub fn speed(&self) -> f32 {
        let mut speed = self.settings.movement_per_second;
        if self.fast {
            speed *= self.settings.fast_multiplier;
        }
        if self.slow {
            speed *= self.settings.slow_multiplier;
        }
        speed
    }

    /// Turn by the given yaw and pitch deltas.
    pub fn turn(&mut self, d_phi: f32, d_theta: f32) {
        self.phi += d_phi;
        self.theta = (self.theta + d_theta).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Turn by mouse motion since the last reported position.
    pub fn mouse_moved(&mut self, column: u16, row: u16) {
        if let Some((last_col, last_row)) = self.last_mouse {
            if self.active {
                let dx = column as f32 - last_col as f32;
                let dy = row as f32 - last_row as f32;
                let sensitivity = self.settings.mouse_sensitivity;
                self.turn(dx * sensitivity, dy * sensitivity);
            }
        }
        self.last_mouse = Some((column, row));
    }

    pub fn mouse_released(&mut self) {
        self.last_mouse = None;
    }

    pub fn toggle_active(&mut self) {
        self.active = !self.active;
        self.movement = Movement::default();
    }

    /// Start the launch; `now` is seconds on the app clock.
    pub fn launch(&mut self, now: f32) {
        info!("launch started");
        self.launch_time = Some(now);
        self.mode = CameraMode::Free;
    }

    pub fn reset_launch(&mut self) {
        self.launch_time = None;
        self.mode = CameraMode::Free;
    }

    pub fn is_launching(&self) -> bool {
        self.launch_time.is_some()
    }

    /// Camera modes only cycle while the ship is in flight.
    pub fn cycle_mode(&mut self) {
        if self.is_launching() {
            self.mode = self.mode.next();
        }
    }

    /// Advance by `dt` seconds; `now` is seconds on the app clock.
    pub fn update(&mut self, dt: f32, now: f32) {
        if let Some(start) = self.launch_time {
            let t = now - start;
            if self.path.is_finished(t) {
                info!("launch finished");
                self.reset_launch();
            } else {
                match self.mode {
                    CameraMode::Free => {}
                    CameraMode::Follow => self.set_pose(self.path.follow_camera(t)),
                    CameraMode::Ground => self.set_pose(self.path.ground_camera(t)),
                }
            }
        }

        if !self.active || self.mode != CameraMode::Free {
            return;
        }

        let step = self.speed() * dt;
        let direction = self.direction();
        let right = Vec3f::new(0.0, 1.0, 0.0).cross(direction);
        // Pitch is positive looking down, so the vertical component flips.
        let ahead = Vec3f::new(direction.x, -direction.y, direction.z);

        let m = self.movement;
        if m.forward {
            self.position += ahead * step;
        }
        if m.back {
            self.position -= ahead * step;
        }
        if m.left {
            self.position += right * step;
        }
        if m.right {
            self.position -= right * step;
        }
        if m.up {
            self.position.y += step;
        }
        if m.down {
            self.position.y -= step;
        }
    }

    fn set_pose(&mut self, pose: CameraPose) {
        self.position = pose.position;
        self.phi = pose.phi;
        self.theta = pose.theta;
    }

    /// Ship model matrix at app time `now`.
    pub fn ship_model(&self, now: f32) -> Mat44f {
        match self.launch_time {
            Some(start) => self.path.model_at(now - start),
            None => self.path.rest_model(),
        }
    }

    pub fn view_matrix(&self) -> Mat44f {
        fly_view(self.position, self.phi, self.theta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control() -> CameraControl {
        CameraControl::new(CameraConfig {
            start_position: [0.0, 0.0, 0.0],
            ..CameraConfig::default()
        })
    }

    fn close(a: Vec3f, b: Vec3f) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn forward_moves_along_negative_z_at_rest() {
        let mut c = control();
        c.movement.forward = true;
        c.update(1.0, 0.0);
        assert!(close(c.position, Vec3f::new(0.0, 0.0, -5.0)));
    }

    #[test]
    fn strafe_and_vertical_movement() {
        let mut c = control();
        c.movement.left = true;
        c.update(0.5, 0.0);
        assert!(close(c.position, Vec3f::new(-2.5, 0.0, 0.0)));

        let mut c = control();
        c.movement.up = true;
        c.update(1.0, 0.0);
        assert!(close(c.position, Vec3f::new(0.0, 5.0, 0.0)));
    }

    #[test]
    fn speed_modifiers_scale_movement() {
        let mut c = control();
        assert_eq!(c.speed(), 5.0);
        c.fast = true;
        assert_eq!(c.speed(), 20.0);
        c.slow = true;
        assert_eq!(c.speed(), 10.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut c = control();
        c.turn(0.0, 10.0);
        assert_eq!(c.theta, FRAC_PI_2);
        c.turn(0.0, -10.0);
        assert_eq!(c.theta, -FRAC_PI_2);
    }

    #[test]
    fn mouse_turns_by_sensitivity() {
        let mut c = control();
        c.mouse_moved(10, 10);
        assert_eq!(c.phi, 0.0);
        c.mouse_moved(20, 5);
        assert!((c.phi - 0.1).abs() < 1e-6);
        assert!((c.theta + 0.05).abs() < 1e-6);
    }

    #[test]
    fn inactive_camera_ignores_input() {
        let mut c = control();
        c.toggle_active();
        c.movement.forward = true;
        c.update(1.0, 0.0);
        assert_eq!(c.position, Vec3f::ZERO);
    }

    #[test]
    fn view_matrix_centres_the_camera() {
        let mut c = control();
        c.position = Vec3f::new(3.0, -1.0, 2.0);
        let eye = c.view_matrix().transform_point(c.position);
        assert!(close(eye, Vec3f::ZERO));
    }

    #[test]
    fn launch_drives_follow_camera_and_ends() {
        let mut c = control();
        c.cycle_mode();
        assert_eq!(c.mode, CameraMode::Free);

        c.launch(100.0);
        c.cycle_mode();
        assert_eq!(c.mode, CameraMode::Follow);
        c.update(0.1, 102.0);
        assert_eq!(c.position, LaunchPath::default().follow_camera(2.0).position);
        assert_ne!(c.ship_model(102.0), LaunchPath::default().rest_model());

        c.update(0.1, 131.0);
        assert!(!c.is_launching());
        assert_eq!(c.mode, CameraMode::Free);
        assert_eq!(c.ship_model(131.0), LaunchPath::default().rest_model());
    }
}
