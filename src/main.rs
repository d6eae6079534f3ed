mod camera;
mod render;
mod selection;

use anyhow::{Context, Result};
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, egui};
use camera::{CameraState, camera_pan, camera_zoom, setup_camera, track_stimulus};
use pheroflock::config::{ARENA_HEIGHT, ARENA_WIDTH};
use pheroflock::{SimulationConfig, World};
use render::{
    draw_flock, draw_pheromones, draw_selection_outline, spawn_boid_meshes, sync_boid_meshes,
};
use selection::{SelectedBoid, handle_selection};
use tracing::info;

/// Resource to control simulation state
#[derive(Resource, PartialEq, Eq, Clone, Copy, Default)]
pub enum SimulationState {
    #[default]
    Running,
    Paused,
}

/// The simulation core driven by this app
#[derive(Resource)]
pub struct Simulation(pub World);

fn main() -> Result<()> {
    let config = load_config()?;
    let tick_hz = 1000.0 / f64::from(config.tick_interval_ms);
    let world = World::from_config(ARENA_WIDTH, ARENA_HEIGHT, config)
        .context("failed to build the simulation")?;

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Pheromone Flocking".to_string(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .insert_resource(ClearColor(Color::srgb(0.04, 0.05, 0.08)))
        .insert_resource(Time::<Fixed>::from_hz(tick_hz))
        .insert_resource(Simulation(world))
        .init_resource::<CameraState>()
        .init_resource::<SelectedBoid>()
        .init_resource::<SimulationState>()
        .add_systems(Startup, (setup_camera, spawn_boid_meshes, log_configuration))
        .add_systems(
            Update,
            (
                // Always run (even when paused)
                camera_zoom,
                camera_pan,
                track_stimulus,
                handle_selection,
                sync_boid_meshes,
                draw_flock,
                draw_pheromones,
                draw_selection_outline,
                ui_system,
            ),
        )
        .add_systems(
            FixedUpdate,
            advance_simulation
                .run_if(|state: Res<SimulationState>| *state == SimulationState::Running),
        )
        .run();

    Ok(())
}

/// Reads a JSON configuration from the first argument, or uses defaults.
fn load_config() -> Result<SimulationConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(SimulationConfig::default());
    };
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {path}"))?;
    SimulationConfig::from_json_str(&source)
        .with_context(|| format!("invalid config file {path}"))
}

/// Reports the running configuration once the log subscriber is installed.
fn log_configuration(simulation: Res<Simulation>) {
    let config = simulation.0.config();
    info!(
        population = config.population,
        predators = config.predator_count,
        alarm = config.alarm_enabled,
        stimulus = config.stimulus_enabled,
        repels = config.stimulus_repels,
        seed = ?config.rng_seed,
        "simulation ready"
    );
}

fn advance_simulation(mut simulation: ResMut<Simulation>) {
    simulation.0.tick();
}

fn ui_system(
    mut contexts: EguiContexts,
    mut simulation: ResMut<Simulation>,
    mut simulation_state: ResMut<SimulationState>,
    mut selected: ResMut<SelectedBoid>,
    camera_state: Res<CameraState>,
) {
    egui::Window::new("Simulation")
        .default_pos(egui::pos2(10.0, 10.0))
        .show(contexts.ctx_mut(), |ui| {
            ui.horizontal(|ui| {
                let running = *simulation_state == SimulationState::Running;
                let button_text = if running { "⏸ Pause" } else { "▶ Resume" };
                if ui.button(button_text).clicked() {
                    *simulation_state = if running {
                        SimulationState::Paused
                    } else {
                        SimulationState::Running
                    };
                    info!(running = !running, "simulation state changed");
                }

                if ui.button("⟲ Reset").clicked() {
                    simulation.0.reset();
                    selected.index = None;
                    info!("simulation reset");
                }

                ui.label(format!(
                    "State: {}",
                    if running { "Running" } else { "Paused" }
                ));
            });

            ui.separator();
            ui.heading("Flock");
            ui.separator();

            let stats = simulation.0.stats();
            ui.label(format!("Tick: {}", stats.tick));
            ui.label(format!("Boids: {}", stats.boids));
            ui.label(format!("Predators: {}", stats.predators));
            ui.label(format!("Pheromones: {}", stats.pheromones));
            ui.label(format!("Escaping: {}", stats.escaping));
            ui.label(format!("Frightened: {}", stats.frightened));

            ui.separator();
            ui.heading("Features");
            ui.separator();

            let config = simulation.0.config();
            let on_off = |enabled: bool| if enabled { "on" } else { "off" };
            ui.label(format!("Alarm pheromones: {}", on_off(config.alarm_enabled)));
            ui.label(format!("Pointer raises alarm: {}", on_off(config.stimulus_enabled)));
            ui.label(format!("Pointer repels: {}", on_off(config.stimulus_repels)));
            ui.label(format!("Tick interval: {:.2} ms", config.tick_interval_ms));
            match simulation.0.stimulus() {
                Some(at) => ui.label(format!("Pointer: ({:.1}, {:.1})", at.x, at.y)),
                None => ui.label("Pointer: outside"),
            };

            ui.separator();
            ui.label(format!("Zoom: {:.2}x", camera_state.zoom));
            ui.label("• Mouse Wheel - Zoom in/out");
            ui.label("• Middle Mouse - Pan camera");
            ui.label("• Home - Recenter camera");
            ui.label("• Left Click - Select boid");
        });

    let Some(boid) = selected
        .index
        .and_then(|index| simulation.0.boids().get(index))
    else {
        return;
    };

    egui::Window::new("Selected Boid")
        .default_pos(egui::pos2(10.0, 420.0))
        .show(contexts.ctx_mut(), |ui| {
            let role = if boid.is_predator() { "Predator" } else { "Boid" };
            ui.heading(format!("{role} #{}", boid.index()));
            ui.separator();

            ui.label(format!(
                "Position: ({:.1}, {:.1})",
                boid.position.x, boid.position.y
            ));
            ui.label(format!(
                "Velocity: ({:.2}, {:.2}) |v| = {:.2}",
                boid.velocity.x,
                boid.velocity.y,
                boid.velocity.length()
            ));

            ui.separator();
            ui.label(format!("Escape timer: {}", boid.escape_timer()));
            ui.label(format!("Fear timer: {}", boid.fear_timer()));
            ui.label(format!("Release cooldown: {}", boid.release_counter()));
            if boid.is_escaping() {
                let direction = boid.escape_direction();
                ui.label(format!(
                    "Fleeing toward ({:.2}, {:.2})",
                    direction.x, direction.y
                ));
            }

            ui.separator();
            let params = boid.params();
            ui.label(format!(
                "Space {:.1} | Sight {:.1} | Speed {:.1}-{:.1}",
                params.space, params.sight, params.min_speed, params.max_speed
            ));
        });
}
