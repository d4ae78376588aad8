use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

use crate::camera::DEFAULT_MAX_PITCH;
use crate::field::{FieldParams, CONVERGENCE_EPSILON, DEFAULT_MAX_ITERATIONS, GRADIENT_EPSILON};

const DEFAULT_MOUSE_SENSITIVITY: f64 = 0.002;
const DEFAULT_FIELD_OF_VIEW: f64 = std::f64::consts::FRAC_PI_2;

/// Navigation settings persisted as JSON. Unknown files are ignored rather
/// than failing startup; bad values are clamped back to defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavSettings {
    pub mouse_sensitivity: f64,
    pub field_of_view: f64,
    pub max_pitch: f64,
    pub gradient_epsilon: f64,
    pub convergence_epsilon: f64,
    pub max_iterations: usize,
}

impl Default for NavSettings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: DEFAULT_MOUSE_SENSITIVITY,
            field_of_view: DEFAULT_FIELD_OF_VIEW,
            max_pitch: DEFAULT_MAX_PITCH,
            gradient_epsilon: GRADIENT_EPSILON,
            convergence_epsilon: CONVERGENCE_EPSILON,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl NavSettings {
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.mouse_sensitivity.is_finite() || self.mouse_sensitivity <= 0.0 {
            self.mouse_sensitivity = defaults.mouse_sensitivity;
        }
        if !self.field_of_view.is_finite() || self.field_of_view <= 0.0 {
            self.field_of_view = defaults.field_of_view;
        }
        if !self.max_pitch.is_finite() || self.max_pitch <= 0.0 {
            self.max_pitch = defaults.max_pitch;
        }
        if !self.gradient_epsilon.is_finite() || self.gradient_epsilon <= 0.0 {
            self.gradient_epsilon = defaults.gradient_epsilon;
        }
        if !self.convergence_epsilon.is_finite() || self.convergence_epsilon <= 0.0 {
            self.convergence_epsilon = defaults.convergence_epsilon;
        }
        if self.max_iterations == 0 {
            self.max_iterations = defaults.max_iterations;
        }
        self
    }

    pub fn field_params(&self) -> FieldParams {
        FieldParams {
            gradient_epsilon: self.gradient_epsilon,
            convergence_epsilon: self.convergence_epsilon,
            max_iterations: self.max_iterations,
        }
    }
}

pub fn load_settings(path: &Path) -> Option<NavSettings> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            if error.kind() != io::ErrorKind::NotFound {
                eprintln!("Failed to read settings {}: {}", path.display(), error);
            }
            return None;
        }
    };

    match serde_json::from_str::<NavSettings>(&raw) {
        Ok(settings) => Some(settings.sanitized()),
        Err(error) => {
            eprintln!(
                "Failed to parse settings {}: {} (ignoring file)",
                path.display(),
                error
            );
            None
        }
    }
}

pub fn save_settings(path: &Path, settings: &NavSettings) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec_pretty(settings)
        .map_err(|error| io::Error::new(io::ErrorKind::Other, error))?;
    std::fs::write(path, bytes)
}
