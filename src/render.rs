use crate::Simulation;
use crate::selection::SelectedBoid;
use bevy::prelude::*;
use pheroflock::Pheromone;

/// Links a mesh entity to the boid with the same index.
#[derive(Component)]
pub struct BoidMarker {
    pub index: usize,
}

const PREY_COLOR: Color = Color::srgb(0.85, 0.9, 1.0);
const PREDATOR_COLOR: Color = Color::srgb(0.9, 0.3, 0.2);
const ESCAPING_COLOR: Color = Color::srgb(1.0, 0.85, 0.2);

/// Arena space has its origin at the top-left corner with y pointing down;
/// the world is centered on the arena with y pointing up.
pub fn arena_to_world(position: Vec2, arena: Vec2) -> Vec2 {
    Vec2::new(position.x - arena.x / 2.0, arena.y / 2.0 - position.y)
}

pub fn world_to_arena(position: Vec2, arena: Vec2) -> Vec2 {
    Vec2::new(position.x + arena.x / 2.0, arena.y / 2.0 - position.y)
}

fn arena_size(simulation: &Simulation) -> Vec2 {
    Vec2::new(simulation.0.width(), simulation.0.height())
}

pub fn spawn_boid_meshes(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    simulation: Res<Simulation>,
) {
    let arena = arena_size(&simulation);
    let prey_material = materials.add(ColorMaterial::from_color(PREY_COLOR));
    let predator_material = materials.add(ColorMaterial::from_color(PREDATOR_COLOR));

    for boid in simulation.0.boids() {
        let material = if boid.is_predator() {
            predator_material.clone()
        } else {
            prey_material.clone()
        };
        let at = arena_to_world(boid.position, arena);
        commands.spawn((
            BoidMarker {
                index: boid.index(),
            },
            Mesh2d(meshes.add(Circle::new(boid.size()))),
            MeshMaterial2d(material),
            Transform::from_xyz(at.x, at.y, 1.0),
        ));
    }
}

pub fn sync_boid_meshes(
    simulation: Res<Simulation>,
    mut markers: Query<(&BoidMarker, &mut Transform)>,
) {
    let arena = arena_size(&simulation);
    let boids = simulation.0.boids();
    for (marker, mut transform) in markers.iter_mut() {
        if let Some(boid) = boids.get(marker.index) {
            let at = arena_to_world(boid.position, arena);
            transform.translation.x = at.x;
            transform.translation.y = at.y;
        }
    }
}

/// Heading ticks, arena outline and escaping highlights.
pub fn draw_flock(simulation: Res<Simulation>, mut gizmos: Gizmos) {
    let arena = arena_size(&simulation);
    gizmos.rect_2d(Vec2::ZERO, arena, Color::srgba(1.0, 1.0, 1.0, 0.15));

    for boid in simulation.0.boids() {
        let from = arena_to_world(boid.position, arena);
        let to = arena_to_world(boid.position + boid.velocity * 5.0, arena);
        let color = if boid.is_escaping() {
            ESCAPING_COLOR
        } else if boid.is_predator() {
            PREDATOR_COLOR
        } else {
            PREY_COLOR
        };
        gizmos.line_2d(from, to, color);
    }
}

/// Remaining fraction of the pheromone's peak strength, 0 for a zero peak.
pub fn pheromone_alpha(pheromone: &Pheromone) -> f32 {
    if pheromone.start_strength() > 0.0 {
        (pheromone.current_strength() / pheromone.start_strength()).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Each pheromone is drawn at its sensing radius, fading as it decays.
pub fn draw_pheromones(simulation: Res<Simulation>, mut gizmos: Gizmos) {
    let arena = arena_size(&simulation);
    for pheromone in simulation.0.pheromones() {
        let alpha = pheromone_alpha(pheromone);
        gizmos.circle_2d(
            arena_to_world(pheromone.position(), arena),
            pheromone.current_strength(),
            Color::srgba(1.0, 0.55, 0.1, 0.6 * alpha),
        );
    }
}

pub fn draw_selection_outline(
    simulation: Res<Simulation>,
    selected: Res<SelectedBoid>,
    mut gizmos: Gizmos,
) {
    let Some(boid) = selected
        .index
        .and_then(|index| simulation.0.boids().get(index))
    else {
        return;
    };
    let arena = arena_size(&simulation);
    gizmos.circle_2d(
        arena_to_world(boid.position, arena),
        boid.size() + 4.0,
        Color::srgba(1.0, 1.0, 0.0, 0.8),
    );
    gizmos.circle_2d(
        arena_to_world(boid.position, arena),
        boid.params().sight,
        Color::srgba(1.0, 1.0, 0.0, 0.2),
    );
}
