//! wire4d - hidden-line wireframe viewer for 3D and 4D convex shapes
//!
//! Loads a scene, then runs the render pass headless for a configured number
//! of frames while the camera orbits the scene and the shapes spin. The
//! vertex buffers the backends produce are ready for a windowing layer to
//! upload; no window is opened here.

use std::process::ExitCode;

use log::{debug, error, info, warn};
use wire4d::config::{AppConfig, ConfigError};
use wire4d_core::{SceneError, SceneTemplate, ShapeEntry, ShapeTemplate, World};
use wire4d_math::{plane_rotation, Field, HasSubspace, MatrixTrait, Vec3, Vec4, VectorTrait};
use wire4d_render::{Camera, FrameStats, RenderContext, Renderer, Renderer2D, StereoRenderer3D};

/// Camera distance from the origin when neither config nor scene sets a start
const DEFAULT_CAMERA_DISTANCE: Field = 8.0;

/// Main application state
struct App<V: VectorTrait, R> {
    config: AppConfig,
    world: World<V>,
    camera: Camera<V>,
    render: RenderContext<V>,
    renderer: R,
}

impl<V: HasSubspace, R: Renderer<V::SubV>> App<V, R> {
    fn new(config: AppConfig, scene: &SceneTemplate, renderer: R) -> Result<Self, SceneError> {
        let world = scene.instantiate::<V>()?;

        // config start wins over the scene's own start
        let start = match V::from_slice(&config.camera.start) {
            Some(start) => start,
            None => scene
                .camera_start::<V>()?
                .unwrap_or_else(|| V::one_hot(V::last_axis()) * -DEFAULT_CAMERA_DISTANCE),
        };
        let mut camera = Camera::new(start).with_settings(config.camera.to_camera_settings());
        camera.look_at(V::zero());

        let render = RenderContext::new(config.render.to_render_settings(), config.debug.seed);

        info!(
            "Loaded scene '{}' with {} shapes in {}D",
            scene.name,
            world.len(),
            V::DIM
        );

        Ok(Self {
            config,
            world,
            camera,
            render,
            renderer,
        })
    }

    /// Advance the animation by one frame and render it
    fn step(&mut self) -> FrameStats {
        let dt = self.config.debug.frame_time;
        let angular_speed = self.camera.settings.angular_speed;

        // orbit the origin in the plane of the first and depth axes
        let orbit = plane_rotation::<V>(0.25 * angular_speed * dt, 0, V::last_axis());
        self.camera.set_pos(orbit.transform(self.camera.pos));
        self.camera.look_at(V::zero());

        for (_, shape) in self.world.iter_mut() {
            shape.rotate(0, 1, 0.5 * angular_speed * dt);
        }

        self.render.render_frame(&mut self.world, &self.camera, &mut self.renderer)
    }

    fn run(&mut self) -> FrameStats {
        let frames = self.config.debug.frames;
        let mut total = FrameStats::default();
        for frame in 0..frames {
            let stats = self.step();
            debug!(
                "Frame {}: {} faces, {}/{} lines, {} points, {} boundary planes",
                frame, stats.faces_drawn, stats.lines_drawn, stats.lines_in, stats.points_drawn, stats.boundary_planes
            );
            total.faces_drawn += stats.faces_drawn;
            total.lines_in += stats.lines_in;
            total.lines_drawn += stats.lines_drawn;
            total.points_drawn += stats.points_drawn;
        }
        total.shapes = self.world.len();
        info!(
            "Rendered {} frames: {} lines drawn of {} ({} points)",
            frames, total.lines_drawn, total.lines_in, total.points_drawn
        );
        total
    }
}

/// Scene used when the configured scene file cannot be loaded
fn default_scene(dimension: usize) -> SceneTemplate {
    let mut far = vec![0.0; dimension];
    if let Some(depth) = far.last_mut() {
        *depth = 5.0;
    }
    let mut side = vec![0.0; dimension];
    side[0] = 3.0;

    SceneTemplate::new("Default Cubes", dimension)
        .with_shape(ShapeEntry::new(ShapeTemplate::cube(2.0)).with_rotation(0, 1, 0.4))
        .with_shape(ShapeEntry::new(ShapeTemplate::cube(2.0)).at(&far).with_scale(1.5))
        .with_shape(ShapeEntry::new(ShapeTemplate::cube(1.0)).at(&side).transparent())
}

fn load_scene(config: &AppConfig) -> SceneTemplate {
    let dimension = config.scene.dimension;
    match SceneTemplate::load(&config.scene.path) {
        Ok(scene) if scene.dimension == dimension => scene,
        Ok(scene) => {
            warn!(
                "Scene '{}' is {}D but {}D is configured. Using the default scene.",
                config.scene.path, scene.dimension, dimension
            );
            default_scene(dimension)
        }
        Err(e) => {
            warn!("Failed to load scene '{}': {}. Using the default scene.", config.scene.path, e);
            default_scene(dimension)
        }
    }
}

fn run(config: AppConfig) -> Result<(), SceneError> {
    let scene = load_scene(&config);
    let display = &config.display;

    match config.scene.dimension {
        3 => {
            let renderer = Renderer2D::new(display.width, display.height, display.screen_scale);
            let mut app: App<Vec3, _> = App::new(config, &scene, renderer)?;
            app.run();
            info!("2D backend holds {} line vertices", app.renderer.line_vertices().len());
        }
        _ => {
            let origin = Vec3::from_array(display.origin);
            let renderer = if display.stereo {
                StereoRenderer3D::stereo(origin, Vec3::from_array(display.stereo_separation))
            } else {
                StereoRenderer3D::mono(origin)
            };
            let mut app: App<Vec4, _> = App::new(config, &scene, renderer)?;
            app.run();
            for (i, eye) in app.renderer.eyes().iter().enumerate() {
                info!("Eye {} holds {} line vertices", i, eye.line_vertices().len());
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let (config, load_error): (AppConfig, Option<ConfigError>) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()))
        .init();
    info!("Starting wire4d");

    if let Some(e) = load_error {
        warn!("Failed to load config: {}. Using defaults.", e);
    }
    if let Err(e) = config.validate() {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headless_config(dimension: usize) -> AppConfig {
        let mut config = AppConfig::default();
        config.scene.dimension = dimension;
        config.debug.frames = 3;
        config
    }

    #[test]
    fn test_default_scene_dimensions() {
        for dimension in [3, 4] {
            let scene = default_scene(dimension);
            assert_eq!(scene.dimension, dimension);
            assert_eq!(scene.shapes.len(), 3);
        }
        assert!(default_scene(3).instantiate::<Vec3>().is_ok());
        assert!(default_scene(4).instantiate::<Vec4>().is_ok());
    }

    #[test]
    fn test_app_3d_runs() {
        let config = headless_config(3);
        let scene = default_scene(3);
        let renderer = Renderer2D::new(800, 600, 100.0);
        let mut app: App<Vec3, _> = App::new(config, &scene, renderer).unwrap();
        assert!(app.camera.pos.is_close(Vec3::new(0.0, 0.0, -DEFAULT_CAMERA_DISTANCE)));

        let total = app.run();
        assert_eq!(total.shapes, 3);
        assert!(total.lines_drawn > 0);
        assert_eq!(app.renderer.frames(), 3);
    }

    #[test]
    fn test_app_4d_runs() {
        let config = headless_config(4);
        let scene = default_scene(4);
        let mut app: App<Vec4, _> = App::new(config, &scene, StereoRenderer3D::default()).unwrap();
        let total = app.run();
        assert!(total.lines_drawn > 0);
        assert_eq!(app.renderer.frames(), 3);
    }

    #[test]
    fn test_config_camera_start_wins() {
        let mut config = headless_config(3);
        config.camera.start = vec![0.0, 0.0, -3.0];
        let scene = default_scene(3).with_camera_start(&[0.0, 0.0, -10.0]);
        let app: App<Vec3, _> = App::new(config, &scene, Renderer2D::new(100, 100, 10.0)).unwrap();
        assert!(app.camera.pos.is_close(Vec3::new(0.0, 0.0, -3.0)));
    }

    #[test]
    fn test_camera_orbit_keeps_distance() {
        let config = headless_config(4);
        let scene = default_scene(4);
        let mut app: App<Vec4, _> = App::new(config, &scene, StereoRenderer3D::default()).unwrap();
        let distance = app.camera.pos.length();
        app.step();
        assert!((app.camera.pos.length() - distance).abs() < 1e-3);
        // still facing the origin
        assert!(app.camera.heading().is_close((-app.camera.pos).normalized()));
    }
}
