use crate::boid::Boid;
use crate::config::{BORDER_MARGIN, INITIAL_VELOCITY_RANGE, SimulationConfig};
use crate::error::ConfigError;
use crate::signal::Pheromone;
use bevy::math::Vec2;
use rand::Rng;
use tracing::{debug, info};

/// Population counts for the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldStats {
    pub tick: u64,
    pub boids: usize,
    pub predators: usize,
    pub pheromones: usize,
    pub escaping: usize,
    pub frightened: usize,
}

/// Steering read from the pre-integration snapshot of the flock.
struct Steering {
    separation: Vec2,
    alignment: Vec2,
    cohesion: Vec2,
    predators: Vec2,
}

/// Owns the flock and its pheromones and advances them one tick at a time.
#[derive(Debug, Clone)]
pub struct World {
    width: f32,
    height: f32,
    config: SimulationConfig,
    boids: Vec<Boid>,
    pheromones: Vec<Pheromone>,
    stimulus: Option<Vec2>,
    tick: u64,
}

impl World {
    /// Builds a randomized population of `population` boids plus the
    /// configured predators.
    pub fn new(
        arena_width: f32,
        arena_height: f32,
        population: usize,
        mut config: SimulationConfig,
    ) -> Result<Self, ConfigError> {
        config.population = population;
        Self::from_config(arena_width, arena_height, config)
    }

    pub fn from_config(
        arena_width: f32,
        arena_height: f32,
        config: SimulationConfig,
    ) -> Result<Self, ConfigError> {
        let mut world = Self::empty(arena_width, arena_height, config)?;
        world.populate();
        Ok(world)
    }

    /// Builds a world around an explicit flock. Boids are re-indexed by
    /// their position in `boids`.
    pub fn from_parts(
        arena_width: f32,
        arena_height: f32,
        config: SimulationConfig,
        boids: Vec<Boid>,
        pheromones: Vec<Pheromone>,
    ) -> Result<Self, ConfigError> {
        let mut world = Self::empty(arena_width, arena_height, config)?;
        world.boids = boids;
        for (index, boid) in world.boids.iter_mut().enumerate() {
            boid.index = index;
        }
        world.pheromones = pheromones;
        Ok(world)
    }

    fn empty(
        arena_width: f32,
        arena_height: f32,
        config: SimulationConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let fits = |extent: f32| extent.is_finite() && extent > 2.0 * BORDER_MARGIN;
        if !fits(arena_width) || !fits(arena_height) {
            return Err(ConfigError::ArenaTooSmall {
                width: arena_width,
                height: arena_height,
                margin: BORDER_MARGIN,
            });
        }
        Ok(Self {
            width: arena_width,
            height: arena_height,
            config,
            boids: Vec::new(),
            pheromones: Vec::new(),
            stimulus: None,
            tick: 0,
        })
    }

    fn populate(&mut self) {
        let mut rng = self.config.seeded_rng();
        let total = self.config.population + self.config.predator_count;
        let mut boids = Vec::with_capacity(total);

        for index in 0..total {
            let is_predator = index >= self.config.population;
            let params = if is_predator {
                self.config.predator
            } else {
                self.config.prey
            };
            let position = Vec2::new(
                rng.gen_range(BORDER_MARGIN..self.width - BORDER_MARGIN),
                rng.gen_range(BORDER_MARGIN..self.height - BORDER_MARGIN),
            );
            let velocity = Vec2::new(
                rng.gen_range(-INITIAL_VELOCITY_RANGE..INITIAL_VELOCITY_RANGE),
                rng.gen_range(-INITIAL_VELOCITY_RANGE..INITIAL_VELOCITY_RANGE),
            );
            boids.push(Boid::new(
                index,
                position,
                velocity,
                params,
                &self.config.alarm,
                is_predator,
            ));
        }

        self.boids = boids;
        info!(
            population = self.config.population,
            predators = self.config.predator_count,
            width = self.width,
            height = self.height,
            seed = ?self.config.rng_seed,
            "populated world"
        );
    }

    /// Discards every boid and pheromone and rebuilds the population.
    pub fn reset(&mut self) {
        self.pheromones.clear();
        self.stimulus = None;
        self.tick = 0;
        self.populate();
    }

    /// Sets the stimulus position used by the next ticks; `None` removes it.
    pub fn set_stimulus(&mut self, stimulus: Option<Vec2>) {
        self.stimulus = stimulus;
    }

    pub fn stimulus(&self) -> Option<Vec2> {
        self.stimulus
    }

    /// Advances the simulation by one tick.
    ///
    /// Every force is computed from the flock as it stands after the
    /// self-local phase, before any boid integrates, so the result does not
    /// depend on iteration order. Pheromones released during the tick only
    /// become visible to sensing on the next one.
    pub fn tick(&mut self) {
        let config = &self.config;
        let alarm = &config.alarm;
        let mut released = Vec::new();

        // Self-local phase: each boid reads only itself, the stimulus and
        // last tick's pheromones.
        for boid in self.boids.iter_mut() {
            boid.apply_border_force(self.width, self.height);

            if config.alarm_enabled && !boid.is_predator() {
                boid.sense_alarm(&self.pheromones);
            }
            if let Some(stimulus) = self.stimulus {
                if config.stimulus_repels {
                    boid.repel_stimulus(stimulus);
                }
                if config.stimulus_enabled && boid.sense_stimulus(stimulus) {
                    boid.emit_signal(&mut released, alarm.strong.strength, alarm.strong.lifetime);
                }
            }
            if boid.fear_timer() > 0 {
                boid.emit_signal(&mut released, alarm.weak.strength, alarm.weak.lifetime);
                boid.calm_down();
            }
        }

        let has_predators = config.predator_count > 0;
        let steering: Vec<Steering> = self
            .boids
            .iter()
            .map(|boid| {
                let separation = boid.compute_separation(&self.boids);
                let predators = if has_predators {
                    boid.sense_predators(&self.boids)
                } else {
                    Vec2::ZERO
                };
                if boid.is_escaping() {
                    Steering {
                        separation,
                        alignment: Vec2::ZERO,
                        cohesion: Vec2::ZERO,
                        predators,
                    }
                } else {
                    Steering {
                        separation,
                        alignment: boid.compute_alignment(&self.boids),
                        cohesion: boid.compute_cohesion(&self.boids),
                        predators,
                    }
                }
            })
            .collect();

        for (boid, steer) in self.boids.iter_mut().zip(steering) {
            if steer.predators != Vec2::ZERO {
                boid.emit_signal(&mut released, alarm.strong.strength, alarm.strong.lifetime);
            }
            boid.set_separation(steer.separation);
            if !boid.is_escaping() {
                boid.acceleration =
                    steer.separation + steer.alignment + steer.cohesion + steer.predators;
            }
            boid.integrate();
        }

        if !released.is_empty() {
            debug!(tick = self.tick, released = released.len(), "pheromones released");
        }
        self.pheromones.append(&mut released);

        let before = self.pheromones.len();
        for pheromone in self.pheromones.iter_mut() {
            pheromone.advance();
        }
        self.pheromones.retain(|pheromone| !pheromone.is_expired());
        let expired = before - self.pheromones.len();
        if expired > 0 {
            debug!(tick = self.tick, expired, "pheromones expired");
        }

        self.tick += 1;
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn pheromones(&self) -> &[Pheromone] {
        &self.pheromones
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn stats(&self) -> WorldStats {
        let predators = self.boids.iter().filter(|b| b.is_predator()).count();
        WorldStats {
            tick: self.tick,
            boids: self.boids.len() - predators,
            predators,
            pheromones: self.pheromones.len(),
            escaping: self.boids.iter().filter(|b| b.is_escaping()).count(),
            frightened: self.boids.iter().filter(|b| b.fear_timer() > 0).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> SimulationConfig {
        SimulationConfig {
            rng_seed: Some(seed),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn population_starts_inside_the_margin() {
        let world = World::new(800.0, 600.0, 50, seeded(1)).unwrap();
        assert_eq!(world.boids().len(), 50);
        for (index, boid) in world.boids().iter().enumerate() {
            assert_eq!(boid.index(), index);
            assert!(boid.position.x >= BORDER_MARGIN && boid.position.x < 800.0 - BORDER_MARGIN);
            assert!(boid.position.y >= BORDER_MARGIN && boid.position.y < 600.0 - BORDER_MARGIN);
            assert!(boid.velocity.x.abs() <= INITIAL_VELOCITY_RANGE);
            assert!(boid.velocity.y.abs() <= INITIAL_VELOCITY_RANGE);
        }
    }

    #[test]
    fn predators_are_appended() {
        let mut config = seeded(2);
        config.predator_count = 3;
        let world = World::new(800.0, 600.0, 10, config).unwrap();
        assert_eq!(world.boids().len(), 13);
        assert!(world.boids()[..10].iter().all(|b| !b.is_predator()));
        assert!(world.boids()[10..].iter().all(|b| b.is_predator()));
        let stats = world.stats();
        assert_eq!((stats.boids, stats.predators), (10, 3));
    }

    #[test]
    fn arena_must_exceed_the_margin() {
        let err = World::new(60.0, 600.0, 10, seeded(3)).unwrap_err();
        assert!(matches!(err, ConfigError::ArenaTooSmall { .. }));
    }

    #[test]
    fn invalid_config_never_builds_a_world() {
        let mut config = seeded(4);
        config.prey.min_speed = 10.0;
        assert!(World::new(800.0, 600.0, 10, config).is_err());
    }

    #[test]
    fn reset_with_a_seed_reproduces_the_population() {
        let mut world = World::new(800.0, 600.0, 20, seeded(5)).unwrap();
        let initial = world.boids().to_vec();
        world.set_stimulus(Some(Vec2::new(400.0, 300.0)));
        for _ in 0..30 {
            world.tick();
        }
        world.reset();
        assert_eq!(world.boids(), initial.as_slice());
        assert!(world.pheromones().is_empty());
        assert_eq!(world.tick_count(), 0);
        assert_eq!(world.stimulus(), None);
    }

    #[test]
    fn empty_population_ticks() {
        let mut world = World::new(800.0, 600.0, 0, seeded(6)).unwrap();
        world.tick();
        assert_eq!(world.tick_count(), 1);
        assert_eq!(world.stats(), WorldStats {
            tick: 1,
            ..WorldStats::default()
        });
    }
}
