use glam::{DQuat, DVec3, DVec4, EulerRot};
use std::f64::consts::FRAC_PI_2;

use crate::field::{ScalarField, SurfaceField};
use crate::settings::NavSettings;

/// Default vertical look limit.
pub const DEFAULT_MAX_PITCH: f64 = FRAC_PI_2;

// The first tangent seed is swapped for +Y when its component along the
// surface normal exceeds this.
const SEED_ALIGNMENT_LIMIT: f64 = 0.9;
const DEGENERATE_LENGTH_SQ: f64 = 1e-12;

// Fixed local frame the orientation quaternion lives in. Rotations happen
// here and are mapped into the ambient tangent hyperplane via the basis.
const LOCAL_FORWARD: DVec3 = DVec3::X;
const LOCAL_UP: DVec3 = DVec3::Y;
const LOCAL_RIGHT: DVec3 = DVec3::Z;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveAxis {
    Forward,
    Up,
    Right,
}

/// First-person observer pinned to the zero set of a scalar field.
///
/// The tangent basis is built once, from the gradient at the initial
/// position, and reused unchanged as the observer moves. On a curved surface
/// that frame slowly stops being tangent far from the start point; the
/// trade is stable controls for an approximation error that only projection
/// corrects.
pub struct SurfaceCamera {
    pub sensitivity: f64,
    pub field_of_view: f64,
    pub max_pitch: f64,
    position: DVec4,
    orientation: DQuat,
    pitch: f64,
    forward_basis: DVec4,
    up_basis: DVec4,
    right_basis: DVec4,
    forward: DVec4,
    up: DVec4,
    right: DVec4,
}

fn reject(seed: DVec4, against: &[DVec4]) -> DVec4 {
    let mut v = seed;
    for axis in against {
        v -= *axis * v.dot(*axis);
    }
    v
}

// Gram-Schmidt step. When the seed lies in the span of the already accepted
// vectors, the canonical axis with the largest remaining rejection is used
// instead, so an axis-aligned surface normal cannot zero out a basis vector.
fn tangent_basis_vector(seed: DVec4, against: &[DVec4]) -> DVec4 {
    let v = reject(seed, against);
    if v.length_squared() > DEGENERATE_LENGTH_SQ {
        return v.normalize();
    }

    let mut best = DVec4::X;
    let mut best_len_sq = -1.0;
    for axis in DVec4::AXES {
        let candidate = reject(axis, against);
        let len_sq = candidate.length_squared();
        if len_sq > best_len_sq {
            best_len_sq = len_sq;
            best = candidate;
        }
    }
    best.normalize()
}

impl SurfaceCamera {
    /// Snaps `initial_position` onto the surface and builds the tangent
    /// frame there from the local gradient.
    pub fn new<F: ScalarField>(
        surface: &SurfaceField<F>,
        initial_position: DVec4,
        sensitivity: f64,
        field_of_view: f64,
    ) -> Self {
        let position = surface.project(initial_position);
        let normal = surface.gradient(position);

        let mut first_seed = DVec4::X;
        if normal.dot(first_seed).abs() > SEED_ALIGNMENT_LIMIT {
            first_seed = DVec4::Y;
        }
        let forward_basis = tangent_basis_vector(first_seed, &[normal]);
        let up_basis = tangent_basis_vector(DVec4::Z, &[normal, forward_basis]);
        let right_basis = tangent_basis_vector(DVec4::W, &[normal, forward_basis, up_basis]);

        let mut camera = Self {
            sensitivity,
            field_of_view,
            max_pitch: DEFAULT_MAX_PITCH,
            position,
            orientation: DQuat::IDENTITY,
            pitch: 0.0,
            forward_basis,
            up_basis,
            right_basis,
            forward: DVec4::ZERO,
            up: DVec4::ZERO,
            right: DVec4::ZERO,
        };
        camera.update_directions();
        camera
    }

    pub fn from_settings<F: ScalarField>(
        surface: &SurfaceField<F>,
        initial_position: DVec4,
        settings: &NavSettings,
    ) -> Self {
        let mut camera = Self::new(
            surface,
            initial_position,
            settings.mouse_sensitivity,
            settings.field_of_view,
        );
        camera.max_pitch = settings.max_pitch;
        camera
    }

    /// One pointer event. Pointer-right yaws the view right, pointer-up
    /// pitches it up; pitch saturates at `max_pitch` without accumulating
    /// overshoot, so pulling further past the limit is absorbed.
    pub fn handle_mouse(&mut self, delta_x: f64, delta_y: f64) {
        let yaw = -delta_x * self.sensitivity;
        let pitch_delta = -delta_y * self.sensitivity;

        let clamped_pitch = (self.pitch + pitch_delta).clamp(-self.max_pitch, self.max_pitch);
        let applied_pitch = clamped_pitch - self.pitch;
        self.pitch = clamped_pitch;

        self.rotate(DVec3::new(0.0, yaw, 0.0));
        self.rotate(DVec3::new(0.0, 0.0, applied_pitch));
    }

    /// Composes an incremental local-frame rotation onto the orientation.
    /// Right-multiplication: the rotation applies in the body frame.
    pub fn rotate(&mut self, euler_angles: DVec3) {
        let delta = DQuat::from_euler(
            EulerRot::XYZ,
            euler_angles.x,
            euler_angles.y,
            euler_angles.z,
        );
        self.orientation = self.orientation * delta;
        self.update_directions();
    }

    fn update_directions(&mut self) {
        self.forward = self.world_direction(self.orientation * LOCAL_FORWARD);
        self.up = self.world_direction(self.orientation * LOCAL_UP);
        self.right = self.world_direction(self.orientation * LOCAL_RIGHT);
    }

    // A rotated local direction's components weight the frozen tangent basis,
    // turning a 3D rotation into a direction in the 4D tangent hyperplane.
    fn world_direction(&self, local: DVec3) -> DVec4 {
        self.forward_basis * local.x + self.up_basis * local.y + self.right_basis * local.z
    }

    /// Moves along one of the cached world directions, then re-projects so
    /// the position stays pinned to the surface.
    pub fn translate<F: ScalarField>(
        &mut self,
        surface: &SurfaceField<F>,
        axis: MoveAxis,
        distance: f64,
    ) {
        let direction = match axis {
            MoveAxis::Forward => self.forward,
            MoveAxis::Up => self.up,
            MoveAxis::Right => self.right,
        };
        self.position = surface.project(self.position + direction * distance);
    }

    pub fn move_forward<F: ScalarField>(&mut self, surface: &SurfaceField<F>, distance: f64) {
        self.translate(surface, MoveAxis::Forward, distance);
    }

    pub fn move_backward<F: ScalarField>(&mut self, surface: &SurfaceField<F>, distance: f64) {
        self.translate(surface, MoveAxis::Forward, -distance);
    }

    pub fn move_up<F: ScalarField>(&mut self, surface: &SurfaceField<F>, distance: f64) {
        self.translate(surface, MoveAxis::Up, distance);
    }

    pub fn move_down<F: ScalarField>(&mut self, surface: &SurfaceField<F>, distance: f64) {
        self.translate(surface, MoveAxis::Up, -distance);
    }

    pub fn move_right<F: ScalarField>(&mut self, surface: &SurfaceField<F>, distance: f64) {
        self.translate(surface, MoveAxis::Right, distance);
    }

    pub fn move_left<F: ScalarField>(&mut self, surface: &SurfaceField<F>, distance: f64) {
        self.translate(surface, MoveAxis::Right, -distance);
    }

    pub fn position(&self) -> DVec4 {
        self.position
    }

    pub fn orientation(&self) -> DQuat {
        self.orientation
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn forward(&self) -> DVec4 {
        self.forward
    }

    pub fn up(&self) -> DVec4 {
        self.up
    }

    pub fn right(&self) -> DVec4 {
        self.right
    }

    /// Frozen tangent frame: forward, up and right basis vectors.
    pub fn tangent_basis(&self) -> [DVec4; 3] {
        [self.forward_basis, self.up_basis, self.right_basis]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Hypersphere;

    fn sphere(radius: f64) -> SurfaceField<Hypersphere> {
        SurfaceField::new(Hypersphere { radius })
    }

    fn pole_camera(radius: f64) -> (SurfaceField<Hypersphere>, SurfaceCamera) {
        let surface = sphere(radius);
        let camera = SurfaceCamera::new(
            &surface,
            DVec4::new(0.0, 0.0, 0.0, 2.0 * radius),
            0.002,
            FRAC_PI_2,
        );
        (surface, camera)
    }

    #[test]
    fn construction_snaps_the_start_position_onto_the_surface() {
        let (_, camera) = pole_camera(10.0);
        let expected = DVec4::new(0.0, 0.0, 0.0, 10.0);
        assert!(
            (camera.position() - expected).length() < 1e-5,
            "expected the +W pole, got {:?}",
            camera.position()
        );
    }

    #[test]
    fn tangent_basis_is_orthonormal_and_orthogonal_to_the_gradient() {
        let surface = sphere(10.0);
        let camera = SurfaceCamera::new(
            &surface,
            DVec4::new(3.0, -2.0, 5.0, 1.0),
            0.002,
            FRAC_PI_2,
        );
        let normal = surface.gradient(camera.position());
        let basis = camera.tangent_basis();

        for (i, v) in basis.iter().enumerate() {
            assert!(
                (v.length() - 1.0).abs() < 1e-5,
                "basis vector {i} should be unit length, got {}",
                v.length()
            );
            assert!(
                v.dot(normal).abs() < 1e-5,
                "basis vector {i} should be tangent, dot with gradient = {}",
                v.dot(normal)
            );
            for (j, w) in basis.iter().enumerate().skip(i + 1) {
                assert!(
                    v.dot(*w).abs() < 1e-5,
                    "basis vectors {i},{j} should be orthogonal, dot = {}",
                    v.dot(*w)
                );
            }
        }
    }

    #[test]
    fn first_seed_swaps_away_from_an_x_aligned_gradient() {
        // Gradient of this field is exactly +X everywhere, which collides
        // with the preferred first seed.
        let surface = SurfaceField::new(|p: DVec4| p.x);
        let camera = SurfaceCamera::new(
            &surface,
            DVec4::new(3.0, 1.0, -2.0, 0.5),
            0.002,
            FRAC_PI_2,
        );
        let [forward_basis, _, _] = camera.tangent_basis();
        assert!(
            forward_basis.x.abs() < 1e-9,
            "forward basis must not lean on the gradient axis, got {forward_basis:?}"
        );
        assert!((forward_basis.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn basis_survives_an_axis_aligned_gradient_eating_a_seed() {
        // At the +W pole of the sphere the gradient is exactly +W, which
        // annihilates the +W seed of the third basis vector.
        let (surface, camera) = pole_camera(10.0);
        let normal = surface.gradient(camera.position());
        for (i, v) in camera.tangent_basis().iter().enumerate() {
            assert!(
                (v.length() - 1.0).abs() < 1e-5,
                "basis vector {i} degenerated to length {}",
                v.length()
            );
            assert!(v.dot(normal).abs() < 1e-5);
        }
    }

    #[test]
    fn pitch_saturates_without_accumulating_overshoot() {
        let (_, mut camera) = pole_camera(10.0);
        // Pointer-up far past the vertical limit, repeatedly.
        for _ in 0..5 {
            camera.handle_mouse(0.0, -10_000.0);
        }
        assert!(
            (camera.pitch() - camera.max_pitch).abs() < 1e-9,
            "pitch should saturate at the limit, got {}",
            camera.pitch()
        );

        let orientation = camera.orientation();
        let forward = camera.forward();
        camera.handle_mouse(0.0, -10_000.0);
        assert!(
            (camera.orientation() - orientation).length() < 1e-12,
            "saturated pitch must not keep rotating"
        );
        assert!((camera.forward() - forward).length() < 1e-12);
    }

    #[test]
    fn zero_delta_pointer_event_is_a_no_op() {
        let (_, mut camera) = pole_camera(10.0);
        camera.handle_mouse(35.0, -12.0);

        let orientation = camera.orientation();
        let pitch = camera.pitch();
        let (forward, up, right) = (camera.forward(), camera.up(), camera.right());

        camera.handle_mouse(0.0, 0.0);

        assert!((camera.orientation() - orientation).length() < 1e-12);
        assert!((camera.pitch() - pitch).abs() < 1e-12);
        assert!((camera.forward() - forward).length() < 1e-12);
        assert!((camera.up() - up).length() < 1e-12);
        assert!((camera.right() - right).length() < 1e-12);
    }

    #[test]
    fn quarter_turn_right_swings_forward_onto_the_old_right() {
        let (_, mut camera) = pole_camera(10.0);
        let old_right = camera.right();

        // yaw = -dx * sensitivity, so a positive dx of pi/2 / sensitivity
        // rotates the view a quarter turn to the right.
        camera.handle_mouse(FRAC_PI_2 / camera.sensitivity, 0.0);

        assert!(
            (camera.forward() - old_right).length() < 1e-9,
            "after a quarter turn forward should equal the old right, got {:?} vs {:?}",
            camera.forward(),
            old_right
        );
    }

    #[test]
    fn world_directions_stay_orthonormal_under_composed_rotations() {
        let (_, mut camera) = pole_camera(10.0);
        camera.handle_mouse(123.0, -45.0);
        camera.handle_mouse(-310.0, 80.0);
        camera.handle_mouse(17.0, 400.0);

        let dirs = [camera.forward(), camera.up(), camera.right()];
        for (i, v) in dirs.iter().enumerate() {
            assert!(
                (v.length() - 1.0).abs() < 1e-9,
                "direction {i} should stay unit length, got {}",
                v.length()
            );
            for (j, w) in dirs.iter().enumerate().skip(i + 1) {
                assert!(
                    v.dot(*w).abs() < 1e-9,
                    "directions {i},{j} should stay orthogonal, dot = {}",
                    v.dot(*w)
                );
            }
        }
    }

    #[test]
    fn forward_move_stays_on_the_surface_and_makes_progress() {
        let (surface, mut camera) = pole_camera(10.0);
        let before = camera.position();

        camera.move_forward(&surface, 1.0);

        let residual = surface.sample(camera.position()).abs();
        assert!(
            residual < 1e-5,
            "camera left the surface, residual = {residual:e}"
        );
        let moved = (camera.position() - before).length();
        assert!(moved > 0.5, "forward move barely moved the camera: {moved}");
    }

    #[test]
    fn mixed_move_sequence_remains_pinned_to_the_surface() {
        let (surface, mut camera) = pole_camera(10.0);
        let moves = [
            (MoveAxis::Forward, 1.0),
            (MoveAxis::Right, -2.0),
            (MoveAxis::Up, 0.75),
            (MoveAxis::Forward, -1.5),
            (MoveAxis::Up, -0.25),
            (MoveAxis::Right, 3.0),
        ];
        for (step, (axis, distance)) in moves.into_iter().enumerate() {
            camera.handle_mouse(25.0, -10.0);
            camera.translate(&surface, axis, distance);
            let residual = surface.sample(camera.position()).abs();
            assert!(
                residual < 1e-5,
                "step {step} drifted off the surface, residual = {residual:e}"
            );
        }
    }

    #[test]
    fn negative_direction_moves_mirror_their_positive_counterparts() {
        let (surface, mut going_back) = pole_camera(10.0);
        let (_, mut going_forward) = pole_camera(10.0);

        going_forward.move_forward(&surface, -1.0);
        going_back.move_backward(&surface, 1.0);

        assert!(
            (going_forward.position() - going_back.position()).length() < 1e-9,
            "backward must be forward with the distance negated"
        );
    }
}
