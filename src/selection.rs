use crate::Simulation;
use crate::camera::{MainCamera, cursor_arena_position};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

/// Maximum distance in arena units for picking a boid with the mouse
pub const SELECTION_RADIUS: f32 = 12.0;

/// Index of the boid shown in the inspector, if any
#[derive(Resource, Default)]
pub struct SelectedBoid {
    pub index: Option<usize>,
}

/// Left click selects the nearest boid within SELECTION_RADIUS, or clears
/// the selection when nothing is close enough.
pub fn handle_selection(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    simulation: Res<Simulation>,
    mut selected: ResMut<SelectedBoid>,
    mut contexts: EguiContexts,
) {
    if !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }
    // Clicks on the control panel are not selections.
    if contexts.ctx_mut().is_pointer_over_area() {
        return;
    }

    let arena = Vec2::new(simulation.0.width(), simulation.0.height());
    let Some(click) = cursor_arena_position(&windows, &camera_query, arena) else {
        return;
    };

    selected.index = simulation
        .0
        .boids()
        .iter()
        .map(|boid| (boid.index(), boid.position.distance(click)))
        .filter(|(_, distance)| *distance <= SELECTION_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index);
}
