use clap::{Parser, ValueEnum};
use glam::DVec4;
use std::path::PathBuf;

use hyperwalk::{
    load_settings, Hyperplane, Hypersphere, NavSettings, ScalarField, SurfaceCamera, SurfaceField,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SurfacePreset {
    /// 4-sphere around the origin
    Sphere,
    /// Hyperplane x = 0
    Plane,
}

#[derive(Parser, Debug)]
#[command(
    name = "hyperwalk",
    about = "Walk a first-person camera across an implicit hypersurface in 4D"
)]
struct Args {
    /// Surface to walk on
    #[arg(long, value_enum, default_value_t = SurfacePreset::Sphere)]
    surface: SurfacePreset,

    /// Radius of the sphere preset
    #[arg(long, default_value_t = 10.0)]
    radius: f64,

    /// Number of walk steps
    #[arg(long, default_value_t = 24)]
    steps: u32,

    /// Distance travelled per step
    #[arg(long, default_value_t = 0.5)]
    stride: f64,

    /// Horizontal pointer delta fed to the camera before each step
    #[arg(long, default_value_t = 40.0)]
    turn: f64,

    /// Settings file overriding sensitivity, pitch limit and solver parameters
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let settings = args
        .settings
        .as_deref()
        .and_then(load_settings)
        .unwrap_or_default();

    match args.surface {
        SurfacePreset::Sphere => {
            let field = Hypersphere {
                radius: args.radius,
            };
            // Start well off-surface; construction snaps it down.
            let start = DVec4::new(0.0, 0.0, 0.0, 2.0 * args.radius);
            run_walk(field, start, &settings, &args);
        }
        SurfacePreset::Plane => {
            let field = Hyperplane {
                normal: DVec4::X,
                offset: 0.0,
            };
            let start = DVec4::new(3.0, 1.0, -2.0, 0.5);
            run_walk(field, start, &settings, &args);
        }
    }
}

fn run_walk<F: ScalarField>(field: F, start: DVec4, settings: &NavSettings, args: &Args) {
    let surface = SurfaceField::with_params(field, settings.field_params());
    let mut camera = SurfaceCamera::from_settings(&surface, start, settings);

    log::info!(
        "walk start: position {:?}, forward {:?}, fov {:.2} rad",
        camera.position(),
        camera.forward(),
        camera.field_of_view
    );

    for step in 0..args.steps {
        camera.handle_mouse(args.turn, 0.0);
        camera.move_forward(&surface, args.stride);
        log::debug!(
            "step {step}: position {:?}, residual {:.3e}",
            camera.position(),
            surface.sample(camera.position())
        );
    }

    let (_, report) = surface.project_with_report(camera.position());
    println!("final position: {:?}", camera.position());
    println!(
        "surface residual {:.3e} ({} after {} iterations)",
        report.residual,
        if report.converged {
            "converged"
        } else {
            "not converged"
        },
        report.iterations
    );
}
