mod camera;
mod field;
mod settings;

pub use camera::{MoveAxis, SurfaceCamera, DEFAULT_MAX_PITCH};
pub use field::{
    ConstantField, FieldParams, Hyperplane, Hypersphere, ProjectionReport, ScalarField,
    SurfaceField, CONVERGENCE_EPSILON, DEFAULT_MAX_ITERATIONS, GRADIENT_EPSILON,
};
pub use settings::{load_settings, save_settings, NavSettings};
