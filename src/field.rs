use glam::DVec4;

/// Finite-difference step for the gradient estimator. Fixed rather than
/// derived: small enough for local linearity, large enough that the central
/// difference does not cancel away in f64.
pub const GRADIENT_EPSILON: f64 = 1e-6;

/// A point counts as on-surface once |field| drops below this.
pub const CONVERGENCE_EPSILON: f64 = 1e-6;

/// Correction steps the projector is allowed before giving up.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

// Below this squared length a direction is treated as degenerate.
const DEGENERATE_LENGTH_SQ: f64 = 1e-12;

/// A scalar field over ambient 4-space whose zero set is the surface the
/// observer walks on. Must be pure; need not be a true signed distance.
pub trait ScalarField {
    fn sample(&self, point: DVec4) -> f64;
}

impl<F> ScalarField for F
where
    F: Fn(DVec4) -> f64,
{
    fn sample(&self, point: DVec4) -> f64 {
        self(point)
    }
}

/// Placeholder field with no surface structure at all.
pub struct ConstantField(pub f64);

impl ScalarField for ConstantField {
    fn sample(&self, _point: DVec4) -> f64 {
        self.0
    }
}

/// Signed distance to the 4-sphere of the given radius around the origin.
pub struct Hypersphere {
    pub radius: f64,
}

impl ScalarField for Hypersphere {
    fn sample(&self, point: DVec4) -> f64 {
        point.length() - self.radius
    }
}

/// Hyperplane `normal . p = offset`; positive on the side the normal points into.
pub struct Hyperplane {
    pub normal: DVec4,
    pub offset: f64,
}

impl ScalarField for Hyperplane {
    fn sample(&self, point: DVec4) -> f64 {
        point.dot(self.normal) - self.offset
    }
}

/// Tunables for the gradient estimator and the projection solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldParams {
    pub gradient_epsilon: f64,
    pub convergence_epsilon: f64,
    pub max_iterations: usize,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            gradient_epsilon: GRADIENT_EPSILON,
            convergence_epsilon: CONVERGENCE_EPSILON,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Diagnostic output of a projection run. `project` discards this; callers
/// that want to observe non-convergence use `project_with_report`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionReport {
    pub iterations: usize,
    pub residual: f64,
    pub converged: bool,
}

/// A scalar field bound to solver parameters.
pub struct SurfaceField<F> {
    field: F,
    params: FieldParams,
}

impl<F: ScalarField> SurfaceField<F> {
    pub fn new(field: F) -> Self {
        Self::with_params(field, FieldParams::default())
    }

    pub fn with_params(field: F, params: FieldParams) -> Self {
        Self { field, params }
    }

    pub fn params(&self) -> FieldParams {
        self.params
    }

    pub fn sample(&self, point: DVec4) -> f64 {
        self.field.sample(point)
    }

    /// Unit steepest-ascent direction, estimated by central differences along
    /// each ambient axis. At a critical point of the field the true gradient
    /// vanishes; +X is returned there so callers never see NaN.
    pub fn gradient(&self, point: DVec4) -> DVec4 {
        let eps = self.params.gradient_epsilon;
        let inv_two_eps = 1.0 / (2.0 * eps);

        let mut components = [0.0f64; 4];
        for (i, axis) in DVec4::AXES.iter().enumerate() {
            let step = *axis * eps;
            components[i] =
                (self.field.sample(point + step) - self.field.sample(point - step)) * inv_two_eps;
        }

        let grad = DVec4::from_array(components);
        if grad.length_squared() <= DEGENERATE_LENGTH_SQ {
            return DVec4::X;
        }
        grad.normalize()
    }

    /// Pulls a point onto the zero set with Newton-style steps against the
    /// gradient, assuming the field behaves like a signed distance near the
    /// surface. Best effort: after `max_iterations` corrections the working
    /// point is returned whether or not it converged.
    pub fn project(&self, point: DVec4) -> DVec4 {
        self.project_with_report(point).0
    }

    pub fn project_with_report(&self, point: DVec4) -> (DVec4, ProjectionReport) {
        let mut q = point;
        let mut residual = self.field.sample(q);
        let mut iterations = 0;

        while iterations < self.params.max_iterations
            && residual.abs() >= self.params.convergence_epsilon
        {
            q -= self.gradient(q) * residual;
            residual = self.field.sample(q);
            iterations += 1;
        }

        let report = ProjectionReport {
            iterations,
            residual,
            converged: residual.abs() < self.params.convergence_epsilon,
        };
        (q, report)
    }
}
