//! Configuration constants and the validated simulation configuration
use crate::error::ConfigError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

// ============================================================================
// ARENA SETTINGS
// ============================================================================

/// Default arena width in world units
pub const ARENA_WIDTH: f32 = 800.0;

/// Default arena height in world units
pub const ARENA_HEIGHT: f32 = 600.0;

/// Distance from an arena edge at which boids start steering back inside
pub const BORDER_MARGIN: f32 = 35.0;

// ============================================================================
// POPULATION SETTINGS
// ============================================================================

/// Number of ordinary boids created at construction and on reset
pub const INITIAL_POPULATION: usize = 100;

/// Number of predators appended after the ordinary boids
pub const INITIAL_PREDATOR_COUNT: usize = 0;

/// Initial velocity components are drawn from ±INITIAL_VELOCITY_RANGE
pub const INITIAL_VELOCITY_RANGE: f32 = 2.5;

// ============================================================================
// PREY BEHAVIOR
// ============================================================================

/// Velocity nudge applied per tick inside the border margin
pub const PREY_TURN: f32 = 0.225;

/// Personal-space radius (separation trigger distance)
pub const PREY_SPACE: f32 = 7.5;

/// Neighbor-awareness radius (alignment and cohesion trigger distance)
pub const PREY_SIGHT: f32 = 35.0;

/// Separation weight
pub const PREY_AVOIDANCE: f32 = 0.005;

/// Alignment weight
pub const PREY_MATCHING: f32 = 0.05;

/// Cohesion weight
pub const PREY_CENTERING: f32 = 0.0005;

pub const PREY_MIN_SPEED: f32 = 1.5;
pub const PREY_MAX_SPEED: f32 = 4.0;

/// Rendered radius of an ordinary boid
pub const PREY_SIZE: f32 = 1.5;

// ============================================================================
// PREDATOR BEHAVIOR
// ============================================================================

pub const PREDATOR_TURN: f32 = 0.225;
pub const PREDATOR_SPACE: f32 = 10.0;
pub const PREDATOR_SIGHT: f32 = 60.0;
pub const PREDATOR_AVOIDANCE: f32 = 0.002;
pub const PREDATOR_MATCHING: f32 = 0.01;
pub const PREDATOR_CENTERING: f32 = 0.002;
pub const PREDATOR_MIN_SPEED: f32 = 1.0;
pub const PREDATOR_MAX_SPEED: f32 = 3.0;
pub const PREDATOR_SIZE: f32 = 4.0;

/// Weight applied to the push away from a predator within sight
pub const PREDATOR_AVOIDANCE_WEIGHT: f32 = 0.01;

// ============================================================================
// ALARM PHEROMONES
// ============================================================================

/// Peak strength of a pheromone released on direct contact with a threat
pub const STRONG_PHEROMONE_STRENGTH: f32 = 40.0;

/// Lifetime in ticks of a strong pheromone
pub const STRONG_PHEROMONE_LIFETIME: u32 = 120;

/// Peak strength of a pheromone released while frightened
pub const WEAK_PHEROMONE_STRENGTH: f32 = 20.0;

/// Lifetime in ticks of a weak pheromone
pub const WEAK_PHEROMONE_LIFETIME: u32 = 60;

/// Minimum number of ticks between two releases by the same boid
pub const PHEROMONE_RELEASE_INTERVAL: u32 = 10;

/// Ticks a boid keeps releasing weak pheromones after sensing an alarm
pub const FEAR_RELEASE_DURATION: u32 = 30;

// ============================================================================
// ESCAPE & STIMULUS
// ============================================================================

/// Ticks of forced escape steering after sensing an alarm
pub const ESCAPE_DURATION: u32 = 50;

/// Maximum steering acceleration while escaping
pub const ESCAPE_ACCELERATION: f32 = 0.3;

/// Weight of the push away from the stimulus when it repels boids
pub const STIMULUS_REPULSION: f32 = 0.0125;

// ============================================================================
// TIMING
// ============================================================================

/// Reference tick cadence in milliseconds (the driver owns the schedule)
pub const TICK_INTERVAL_MS: f32 = 16.67;

/// Steering and kinematic parameters for one role of boid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoidParams {
    pub turn: f32,
    pub space: f32,
    pub sight: f32,
    pub avoidance: f32,
    pub matching: f32,
    pub centering: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub size: f32,
}

impl BoidParams {
    pub fn prey() -> Self {
        Self {
            turn: PREY_TURN,
            space: PREY_SPACE,
            sight: PREY_SIGHT,
            avoidance: PREY_AVOIDANCE,
            matching: PREY_MATCHING,
            centering: PREY_CENTERING,
            min_speed: PREY_MIN_SPEED,
            max_speed: PREY_MAX_SPEED,
            size: PREY_SIZE,
        }
    }

    pub fn predator() -> Self {
        Self {
            turn: PREDATOR_TURN,
            space: PREDATOR_SPACE,
            sight: PREDATOR_SIGHT,
            avoidance: PREDATOR_AVOIDANCE,
            matching: PREDATOR_MATCHING,
            centering: PREDATOR_CENTERING,
            min_speed: PREDATOR_MIN_SPEED,
            max_speed: PREDATOR_MAX_SPEED,
            size: PREDATOR_SIZE,
        }
    }

    fn validate(&self, role: &str) -> Result<(), ConfigError> {
        let fields = [
            ("turn", self.turn),
            ("space", self.space),
            ("sight", self.sight),
            ("avoidance", self.avoidance),
            ("matching", self.matching),
            ("centering", self.centering),
            ("min_speed", self.min_speed),
            ("max_speed", self.max_speed),
            ("size", self.size),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(role, name, "must be finite and non-negative"));
            }
        }
        if self.min_speed <= 0.0 {
            return Err(invalid(role, "min_speed", "must be positive"));
        }
        if self.min_speed > self.max_speed {
            return Err(invalid(role, "min_speed", "cannot exceed max_speed"));
        }
        Ok(())
    }
}

impl Default for BoidParams {
    fn default() -> Self {
        Self::prey()
    }
}

/// Peak strength and lifetime of one class of pheromone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PheromoneTier {
    pub strength: f32,
    pub lifetime: u32,
}

/// Alarm, fear and escape tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmParams {
    /// Released on contact with the stimulus or a predator.
    pub strong: PheromoneTier,
    /// Released every tick a boid is frightened.
    pub weak: PheromoneTier,
    pub release_interval: u32,
    pub fear_release_duration: u32,
    pub escape_duration: u32,
    pub escape_acceleration: f32,
}

impl Default for AlarmParams {
    fn default() -> Self {
        Self {
            strong: PheromoneTier {
                strength: STRONG_PHEROMONE_STRENGTH,
                lifetime: STRONG_PHEROMONE_LIFETIME,
            },
            weak: PheromoneTier {
                strength: WEAK_PHEROMONE_STRENGTH,
                lifetime: WEAK_PHEROMONE_LIFETIME,
            },
            release_interval: PHEROMONE_RELEASE_INTERVAL,
            fear_release_duration: FEAR_RELEASE_DURATION,
            escape_duration: ESCAPE_DURATION,
            escape_acceleration: ESCAPE_ACCELERATION,
        }
    }
}

impl AlarmParams {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, tier) in [("strong", self.strong), ("weak", self.weak)] {
            if !tier.strength.is_finite() || tier.strength <= 0.0 {
                return Err(invalid("alarm", name, "strength must be positive"));
            }
            if tier.lifetime == 0 {
                return Err(invalid("alarm", name, "lifetime must be non-zero"));
            }
        }
        if self.release_interval == 0 {
            return Err(invalid("alarm", "release_interval", "must be non-zero"));
        }
        if !self.escape_acceleration.is_finite() || self.escape_acceleration < 0.0 {
            return Err(invalid(
                "alarm",
                "escape_acceleration",
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Immutable parameters and feature toggles for one simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ordinary boids created on construction and reset.
    pub population: usize,
    /// Predators appended after the ordinary boids; 0 disables predators.
    pub predator_count: usize,
    /// Boids that come within sight of the stimulus release strong pheromones.
    pub stimulus_enabled: bool,
    /// Boids within sight of the stimulus are pushed away from it.
    pub stimulus_repels: bool,
    /// Boids sense pheromones and enter escape/fear states.
    pub alarm_enabled: bool,
    pub prey: BoidParams,
    /// Fields left out of a partial `predator` object take prey defaults.
    pub predator: BoidParams,
    pub alarm: AlarmParams,
    /// Informational; the driver owns the schedule.
    pub tick_interval_ms: f32,
    /// Seed for reproducible populations; entropy is used when absent.
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            population: INITIAL_POPULATION,
            predator_count: INITIAL_PREDATOR_COUNT,
            stimulus_enabled: true,
            stimulus_repels: false,
            alarm_enabled: true,
            prey: BoidParams::prey(),
            predator: BoidParams::predator(),
            alarm: AlarmParams::default(),
            tick_interval_ms: TICK_INTERVAL_MS,
            rng_seed: None,
        }
    }
}

impl SimulationConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.prey.validate("prey")?;
        self.predator.validate("predator")?;
        self.alarm.validate()?;
        if !self.tick_interval_ms.is_finite() || self.tick_interval_ms <= 0.0 {
            return Err(invalid("simulation", "tick_interval_ms", "must be positive"));
        }
        Ok(())
    }

    /// Returns the configured RNG, seeding from entropy if no seed is set.
    pub(crate) fn seeded_rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn invalid(role: &str, field: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidParameter {
        field: format!("{role}.{field}"),
        reason,
    }
}
