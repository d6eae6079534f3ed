use crate::Simulation;
use crate::render::world_to_arena;
use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

#[derive(Component)]
pub struct MainCamera;

#[derive(Resource)]
pub struct CameraState {
    pub zoom: f32,
    pub position: Vec2,
    pub is_panning: bool,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            position: Vec2::ZERO,
            is_panning: false,
        }
    }
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        MainCamera,
        Transform::from_xyz(0.0, 0.0, 0.0),
        OrthographicProjection {
            scale: 1.0,
            ..OrthographicProjection::default_2d()
        },
    ));
}

pub fn camera_zoom(
    mut scroll_events: EventReader<MouseWheel>,
    mut camera_state: ResMut<CameraState>,
    mut query: Query<&mut OrthographicProjection, With<MainCamera>>,
) {
    for event in scroll_events.read() {
        camera_state.zoom = (camera_state.zoom - event.y * 0.1).clamp(0.2, 5.0);
        if let Ok(mut projection) = query.get_single_mut() {
            projection.scale = camera_state.zoom;
        }
    }
}

/// Middle mouse drags the view; Home recenters it.
pub fn camera_pan(
    mouse_button: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    mut motion_events: EventReader<MouseMotion>,
    mut camera_state: ResMut<CameraState>,
    mut query: Query<&mut Transform, With<MainCamera>>,
) {
    if mouse_button.just_pressed(MouseButton::Middle) {
        camera_state.is_panning = true;
    }
    if mouse_button.just_released(MouseButton::Middle) {
        camera_state.is_panning = false;
    }
    if keys.just_pressed(KeyCode::Home) {
        camera_state.position = Vec2::ZERO;
    }

    if camera_state.is_panning {
        for event in motion_events.read() {
            // Screen y grows downward, world y upward.
            let delta = Vec2::new(-event.delta.x, event.delta.y) * camera_state.zoom;
            camera_state.position += delta;
        }
    } else {
        motion_events.clear();
    }

    if let Ok(mut transform) = query.get_single_mut() {
        transform.translation.x = camera_state.position.x;
        transform.translation.y = camera_state.position.y;
    }
}

/// Cursor position in arena coordinates, if the cursor is over the window.
pub fn cursor_arena_position(
    windows: &Query<&Window, With<PrimaryWindow>>,
    camera_query: &Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    arena: Vec2,
) -> Option<Vec2> {
    let window = windows.get_single().ok()?;
    let (camera, camera_transform) = camera_query.get_single().ok()?;
    let cursor = window.cursor_position()?;
    let world_pos = camera.viewport_to_world_2d(camera_transform, cursor).ok()?;
    Some(world_to_arena(world_pos, arena))
}

/// Feeds the pointer to the simulation as its external stimulus.
pub fn track_stimulus(
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut simulation: ResMut<Simulation>,
) {
    let arena = Vec2::new(simulation.0.width(), simulation.0.height());
    let stimulus = cursor_arena_position(&windows, &camera_query, arena);
    if simulation.0.stimulus() != stimulus {
        simulation.0.set_stimulus(stimulus);
    }
}
