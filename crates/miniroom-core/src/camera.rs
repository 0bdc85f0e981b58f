//! Camera transitions along the shortest angular path.
//!
//! Orbit controllers track azimuth as an accumulated angle. After a few user
//! drags that angle can sit several turns away from the visible heading, and a
//! large look-at jump then unwinds through every extra revolution. The helpers
//! here realign that bookkeeping before each jump.
//!
//! Rigs are reached through [`CameraRig`]. The browser adapter drives the JS
//! `camera-controls` object; [`OrbitRig`] is a self-contained implementation of
//! the same behaviour.

use crate::constants::*;
use crate::error::CameraError;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Reduces any finite radian value into `(-π, π]`.
///
/// Values already in range come back bit-for-bit, so the function is
/// idempotent. Non-finite input maps to 0.
pub fn normalize_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    if angle > -PI && angle <= PI {
        return angle;
    }
    let r = angle.rem_euclid(TAU);
    let wrapped = if r > PI { r - TAU } else { r };
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Signed delta from `from` to `to` with the smallest magnitude (`<= π`).
pub fn shortest_rotation(from: f32, to: f32) -> f32 {
    let mut diff = normalize_angle(to) - normalize_angle(from);
    if diff > PI {
        diff -= TAU;
    } else if diff < -PI {
        diff += TAU;
    }
    diff
}

/// A camera that orbits a look-at target.
pub trait CameraRig {
    fn position(&self) -> Vec3;
    fn target(&self) -> Vec3;
    /// Moves to `position` looking at `target`, eased when `smooth` is set.
    fn set_look_at(&mut self, position: Vec3, target: Vec3, smooth: bool);
    /// Re-bases internal azimuth/polar tracking on the current pose.
    fn reset_orientation_bookkeeping(&mut self) -> Result<(), CameraError>;
    /// Whether any eased transition has finished.
    fn is_settled(&self) -> bool {
        true
    }
}

/// Re-issues the current pose instantly so the rig's rotation state matches
/// what is on screen.
pub fn reset_camera_rotation<R: CameraRig + ?Sized>(rig: &mut R) {
    let position = rig.position();
    let target = rig.target();
    rig.set_look_at(position, target, false);
}

/// Best-effort realignment of the rig's internal rotation tracking.
///
/// A rig without the expected internals logs a warning and is only realigned
/// to its current pose.
pub fn reset_camera_controls_rotation<R: CameraRig + ?Sized>(rig: &mut R) {
    if let Err(e) = rig.reset_orientation_bookkeeping() {
        log::warn!("[camera] rotation reset skipped: {}", e);
    }
    reset_camera_rotation(rig);
}

/// Resets rotation bookkeeping, then issues a single look-at to the target.
pub fn move_camera_to_target<R: CameraRig + ?Sized>(
    rig: &mut R,
    position: Vec3,
    target: Vec3,
    smooth: bool,
) {
    reset_camera_controls_rotation(rig);
    rig.set_look_at(position, target, smooth);
}

/// Distance and angle limits plus easing for an orbit camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraProfile {
    pub smooth_time: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_height: f32,
}

impl CameraProfile {
    pub fn desktop() -> Self {
        Self {
            smooth_time: 0.08,
            min_distance: 1.0,
            max_distance: 15.0,
            min_polar: PI * 0.15,
            max_polar: PI * 0.85,
            min_height: CAMERA_MIN_HEIGHT,
        }
    }

    pub fn mobile() -> Self {
        Self {
            smooth_time: 0.15,
            min_distance: 1.0,
            max_distance: 10.0,
            min_polar: PI * 0.25,
            max_polar: PI * 0.75,
            min_height: CAMERA_MIN_HEIGHT,
        }
    }

    /// Keeps the camera above the floor.
    pub fn clamp_height(&self, position: Vec3) -> Vec3 {
        Vec3::new(position.x, position.y.max(self.min_height), position.z)
    }

    /// Tightens `s` so the camera it describes around `target` stays at or
    /// above `min_height`. Applied after the distance and polar limits.
    pub fn keep_above_floor(&self, s: &mut Spherical, target: Vec3) {
        if target.y + s.radius * s.polar.cos() >= self.min_height {
            return;
        }
        let need = if s.radius > f32::EPSILON {
            (self.min_height - target.y) / s.radius
        } else {
            f32::INFINITY
        };
        if need <= 1.0 {
            s.polar = s.polar.min(need.max(-1.0).acos());
        } else {
            // target too low for this radius: look down steeply and back off
            s.polar = s.polar.min(self.min_polar);
            let c = s.polar.cos();
            if c > f32::EPSILON {
                s.radius = (self.min_height - target.y) / c;
            }
        }
    }
}

impl Default for CameraProfile {
    fn default() -> Self {
        Self {
            smooth_time: CAMERA_SMOOTH_TIME_SEC,
            ..Self::desktop()
        }
    }
}

/// Spherical coordinates around a target; azimuth measured from +Z about +Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub azimuth: f32,
    pub polar: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return Self {
                radius: 0.0,
                azimuth: 0.0,
                polar: PI / 2.0,
            };
        }
        Self {
            radius,
            azimuth: offset.x.atan2(offset.z),
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let sin_polar = self.polar.sin();
        Vec3::new(
            self.radius * sin_polar * self.azimuth.sin(),
            self.radius * self.polar.cos(),
            self.radius * sin_polar * self.azimuth.cos(),
        )
    }
}

/// Orbit camera with eased transitions that never take the long way round.
#[derive(Clone, Debug)]
pub struct OrbitRig {
    profile: CameraProfile,
    target: Vec3,
    goal_target: Vec3,
    current: Spherical,
    goal: Spherical,
}

impl OrbitRig {
    pub fn new(position: Vec3, target: Vec3, profile: CameraProfile) -> Self {
        let s = Spherical::from_offset(profile.clamp_height(position) - target);
        Self {
            profile,
            target,
            goal_target: target,
            current: s,
            goal: s,
        }
    }

    pub fn azimuth(&self) -> f32 {
        self.current.azimuth
    }

    pub fn goal_azimuth(&self) -> f32 {
        self.goal.azimuth
    }

    /// User drag: rotates the goal by raw deltas, accumulating azimuth
    /// the way interactive orbit controls do.
    pub fn rotate(&mut self, d_azimuth: f32, d_polar: f32) {
        self.goal.azimuth += d_azimuth;
        self.goal.polar =
            (self.goal.polar + d_polar).clamp(self.profile.min_polar, self.profile.max_polar);
        self.profile.keep_above_floor(&mut self.goal, self.goal_target);
        self.current = self.goal;
    }

    /// Advances the eased transition by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if self.is_settled() {
            return;
        }
        let k = if self.profile.smooth_time > 0.0 {
            1.0 - (-dt / self.profile.smooth_time).exp()
        } else {
            1.0
        };
        self.current.radius += (self.goal.radius - self.current.radius) * k;
        self.current.azimuth += (self.goal.azimuth - self.current.azimuth) * k;
        self.current.polar += (self.goal.polar - self.current.polar) * k;
        self.target = self.target.lerp(self.goal_target, k);
        if self.remaining() < CAMERA_SETTLE_DISTANCE {
            self.current = self.goal;
            self.target = self.goal_target;
        }
    }

    fn remaining(&self) -> f32 {
        (self.goal.radius - self.current.radius).abs()
            + (self.goal.azimuth - self.current.azimuth).abs()
            + (self.goal.polar - self.current.polar).abs()
            + self.goal_target.distance(self.target)
    }
}

impl CameraRig for OrbitRig {
    fn position(&self) -> Vec3 {
        self.target + self.current.to_offset()
    }

    fn target(&self) -> Vec3 {
        self.target
    }

    fn set_look_at(&mut self, position: Vec3, target: Vec3, smooth: bool) {
        let position = self.profile.clamp_height(position);
        let mut next = Spherical::from_offset(position - target);
        next.radius = next
            .radius
            .clamp(self.profile.min_distance, self.profile.max_distance);
        next.polar = next.polar.clamp(self.profile.min_polar, self.profile.max_polar);
        self.profile.keep_above_floor(&mut next, target);
        // continue from the accumulated azimuth along the short arc
        next.azimuth = self.current.azimuth + shortest_rotation(self.current.azimuth, next.azimuth);
        self.goal = next;
        self.goal_target = target;
        if !smooth {
            self.current = self.goal;
            self.target = self.goal_target;
        }
    }

    fn reset_orientation_bookkeeping(&mut self) -> Result<(), CameraError> {
        self.current.azimuth = normalize_angle(self.current.azimuth);
        self.goal = self.current;
        self.goal_target = self.target;
        Ok(())
    }

    fn is_settled(&self) -> bool {
        self.remaining() < CAMERA_SETTLE_DISTANCE
    }
}

/// Locked "presentation" view: a fixed pose the camera eases into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewLock {
    pub position: Vec3,
    pub target: Vec3,
    locked: bool,
    transitioning: bool,
}

impl Default for ViewLock {
    fn default() -> Self {
        Self {
            position: locked_view_position(),
            target: locked_view_target(),
            locked: false,
            transitioning: false,
        }
    }
}

impl ViewLock {
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn engage<R: CameraRig + ?Sized>(&mut self, rig: &mut R) {
        self.locked = true;
        self.transitioning = true;
        log::info!("[camera] view lock engaged");
        move_camera_to_target(rig, self.position, self.target, true);
    }

    pub fn release(&mut self) {
        self.locked = false;
        self.transitioning = false;
        log::info!("[camera] view lock released");
    }

    pub fn toggle<R: CameraRig + ?Sized>(&mut self, rig: &mut R) {
        if self.locked {
            self.release();
        } else {
            self.engage(rig);
        }
    }

    /// Clears the transition flag once the rig has settled; returns whether
    /// the transition is still running.
    pub fn poll<R: CameraRig + ?Sized>(&mut self, rig: &R) -> bool {
        if self.transitioning && rig.is_settled() {
            self.transitioning = false;
            log::debug!("[camera] locked view reached");
        }
        self.transitioning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_angle_range_and_idempotence() {
        let mut x = -50.0_f32;
        while x < 50.0 {
            let n = normalize_angle(x);
            assert!(n > -PI && n <= PI, "x={x} n={n}");
            assert_eq!(normalize_angle(n), n);
            x += 0.377;
        }
        assert_eq!(normalize_angle(PI), PI);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-6);
        assert!((normalize_angle(3.5 * PI) + PI / 2.0).abs() < 1e-5);
        assert_eq!(normalize_angle(f32::NAN), 0.0);
    }

    #[test]
    fn shortest_rotation_wraps_through_pi() {
        let d = shortest_rotation(170f32.to_radians(), (-170f32).to_radians());
        assert!((d - 20f32.to_radians()).abs() < 1e-5, "d={d}");
        let d = shortest_rotation((-170f32).to_radians(), 170f32.to_radians());
        assert!((d + 20f32.to_radians()).abs() < 1e-5, "d={d}");
    }

    #[test]
    fn shortest_rotation_lands_on_target() {
        let samples = [-7.0_f32, -3.1, -1.0, 0.0, 0.5, 2.9, 3.2, 9.4];
        for &from in &samples {
            for &to in &samples {
                let d = shortest_rotation(from, to);
                assert!(d.abs() <= PI + 1e-6);
                let landed = normalize_angle(normalize_angle(from) + d);
                let diff = shortest_rotation(landed, normalize_angle(to)).abs();
                assert!(diff < 1e-4, "from={from} to={to} landed={landed}");
            }
        }
    }

    #[derive(Default)]
    struct Recording {
        pos: Vec3,
        target: Vec3,
        calls: Vec<(Vec3, Vec3, bool)>,
        has_internals: bool,
        resets: usize,
    }

    impl CameraRig for Recording {
        fn position(&self) -> Vec3 {
            self.pos
        }
        fn target(&self) -> Vec3 {
            self.target
        }
        fn set_look_at(&mut self, position: Vec3, target: Vec3, smooth: bool) {
            self.calls.push((position, target, smooth));
            self.pos = position;
            self.target = target;
        }
        fn reset_orientation_bookkeeping(&mut self) -> Result<(), CameraError> {
            if self.has_internals {
                self.resets += 1;
                Ok(())
            } else {
                Err(CameraError::MissingInternals("azimuthAngle".into()))
            }
        }
    }

    #[test]
    fn move_realigns_then_issues_one_transition() {
        let mut rig = Recording {
            pos: Vec3::new(1.0, 2.0, 3.0),
            has_internals: true,
            ..Default::default()
        };
        move_camera_to_target(&mut rig, Vec3::new(5.0, 4.0, 6.0), Vec3::ZERO, true);
        assert_eq!(rig.resets, 1);
        assert_eq!(
            rig.calls,
            vec![
                (Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, false),
                (Vec3::new(5.0, 4.0, 6.0), Vec3::ZERO, true),
            ]
        );
    }

    #[test]
    fn missing_internals_degrade_to_plain_move() {
        let mut rig = Recording::default();
        move_camera_to_target(&mut rig, Vec3::X, Vec3::ZERO, false);
        assert_eq!(rig.resets, 0);
        assert_eq!(rig.calls.last(), Some(&(Vec3::X, Vec3::ZERO, false)));
    }

    fn pos_at_azimuth(deg: f32) -> Vec3 {
        let a = deg.to_radians();
        Vec3::new(6.0 * a.sin(), 3.0, 6.0 * a.cos())
    }

    #[test]
    fn orbit_rig_takes_short_arc_after_wound_up_drags() {
        let mut rig = OrbitRig::new(pos_at_azimuth(170.0), Vec3::ZERO, CameraProfile::default());
        // two full user turns accumulate in the azimuth
        rig.rotate(2.0 * TAU, 0.0);
        move_camera_to_target(&mut rig, pos_at_azimuth(-170.0), Vec3::ZERO, true);
        let start = rig.azimuth();
        let travel = rig.goal_azimuth() - start;
        assert!((travel - 20f32.to_radians()).abs() < 1e-4, "travel={travel}");
        for _ in 0..240 {
            rig.update(1.0 / 60.0);
        }
        assert!(rig.is_settled());
        assert!(rig.position().abs_diff_eq(pos_at_azimuth(-170.0), 1e-3));
    }

    #[test]
    fn orbit_rig_instant_move_applies_immediately() {
        let mut rig = OrbitRig::new(pos_at_azimuth(0.0), Vec3::ZERO, CameraProfile::default());
        rig.set_look_at(pos_at_azimuth(90.0), Vec3::ZERO, false);
        assert!(rig.is_settled());
        assert!(rig.position().abs_diff_eq(pos_at_azimuth(90.0), 1e-4));
    }

    #[test]
    fn camera_never_dips_below_min_height() {
        let mut rig = OrbitRig::new(Vec3::new(0.0, 3.0, 6.0), Vec3::ZERO, CameraProfile::default());
        rig.set_look_at(Vec3::new(0.0, -2.0, 6.0), Vec3::new(0.0, 1.0, 0.0), false);
        assert!(rig.position().y >= CAMERA_MIN_HEIGHT - 1e-4);
    }

    #[test]
    fn distance_and_polar_limits_cannot_sink_the_camera() {
        let mut rig = OrbitRig::new(Vec3::new(0.0, 3.0, 6.0), Vec3::ZERO, CameraProfile::default());
        rig.set_look_at(Vec3::new(0.0, 0.5, 0.1), Vec3::new(0.0, 1.0, 0.0), false);
        assert!(rig.position().y >= CAMERA_MIN_HEIGHT - 1e-4, "y={}", rig.position().y);

        rig.rotate(0.0, PI);
        assert!(rig.position().y >= CAMERA_MIN_HEIGHT - 1e-4, "y={}", rig.position().y);
    }

    #[test]
    fn low_target_backs_the_camera_off() {
        let profile = CameraProfile::default();
        let target = Vec3::new(0.0, -3.0, 0.0);
        let mut s = Spherical { radius: 1.0, azimuth: 0.0, polar: PI / 2.0 };
        profile.keep_above_floor(&mut s, target);
        assert!(target.y + s.to_offset().y >= CAMERA_MIN_HEIGHT - 1e-4);
    }

    #[test]
    fn view_lock_tracks_transition() {
        let mut rig = OrbitRig::new(Vec3::new(-6.0, 3.0, -2.0), Vec3::ZERO, CameraProfile::default());
        let mut lock = ViewLock::default();
        lock.engage(&mut rig);
        assert!(lock.is_locked());
        assert!(lock.poll(&rig));
        for _ in 0..300 {
            rig.update(1.0 / 60.0);
        }
        assert!(!lock.poll(&rig));
        assert!(rig.position().abs_diff_eq(locked_view_position(), 1e-3));
        lock.toggle(&mut rig);
        assert!(!lock.is_locked());
    }
}
