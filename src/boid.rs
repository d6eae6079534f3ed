use crate::config::{
    AlarmParams, BORDER_MARGIN, BoidParams, PREDATOR_AVOIDANCE_WEIGHT, STIMULUS_REPULSION,
};
use crate::signal::Pheromone;
use crate::vector_math::{distance, magnitude, normalize};
use bevy::math::Vec2;

/// A single flocking agent.
///
/// Kinematics are public so the renderer and tests can read and place boids
/// directly; steering parameters and alarm state are fixed at construction
/// and only change through the tick operations below.
#[derive(Debug, Clone, PartialEq)]
pub struct Boid {
    pub(crate) index: usize,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Steering for the current tick, summed from the behavior rules.
    pub acceleration: Vec2,
    params: BoidParams,
    is_predator: bool,
    fear_timer: u32,
    escape_timer: u32,
    escape_direction: Vec2,
    escape_duration: u32,
    escape_acceleration: f32,
    fear_release_duration: u32,
    release_counter: u32,
    release_interval: u32,
    separation: Vec2,
}

impl Boid {
    pub fn new(
        index: usize,
        position: Vec2,
        velocity: Vec2,
        params: BoidParams,
        alarm: &AlarmParams,
        is_predator: bool,
    ) -> Self {
        Self {
            index,
            position,
            velocity,
            acceleration: Vec2::ZERO,
            params,
            is_predator,
            fear_timer: 0,
            escape_timer: 0,
            escape_direction: Vec2::ZERO,
            escape_duration: alarm.escape_duration,
            escape_acceleration: alarm.escape_acceleration,
            fear_release_duration: alarm.fear_release_duration,
            release_counter: 0,
            release_interval: alarm.release_interval,
            separation: Vec2::ZERO,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn params(&self) -> &BoidParams {
        &self.params
    }

    pub fn size(&self) -> f32 {
        self.params.size
    }

    pub fn is_predator(&self) -> bool {
        self.is_predator
    }

    pub fn fear_timer(&self) -> u32 {
        self.fear_timer
    }

    pub fn escape_timer(&self) -> u32 {
        self.escape_timer
    }

    pub fn escape_direction(&self) -> Vec2 {
        self.escape_direction
    }

    pub fn release_counter(&self) -> u32 {
        self.release_counter
    }

    pub fn is_escaping(&self) -> bool {
        self.escape_timer > 0
    }

    /// Nudges velocity inward when within the border margin of an edge.
    /// Position is never clamped.
    pub fn apply_border_force(&mut self, arena_width: f32, arena_height: f32) {
        let turn = self.params.turn;
        if self.position.x < BORDER_MARGIN {
            self.velocity.x += turn;
        } else if self.position.x > arena_width - BORDER_MARGIN {
            self.velocity.x -= turn;
        }
        if self.position.y < BORDER_MARGIN {
            self.velocity.y += turn;
        } else if self.position.y > arena_height - BORDER_MARGIN {
            self.velocity.y -= turn;
        }
    }

    /// Scans pheromones released by other boids. A pheromone is sensed when
    /// its current strength exceeds the distance to it. On any hit the boid
    /// commits to escaping away from the strength-weighted centroid.
    ///
    /// Returns the mean strength of sensed pheromones, or 0 if none.
    pub fn sense_alarm(&mut self, pheromones: &[Pheromone]) -> f32 {
        let mut weighted = Vec2::ZERO;
        let mut total_strength = 0.0;
        let mut sensed = 0usize;

        for pheromone in pheromones {
            if pheromone.owner() == self.index {
                continue;
            }
            let at = pheromone.position();
            let strength = pheromone.current_strength();
            if strength > distance(self.position.x, self.position.y, at.x, at.y) {
                weighted += at * strength;
                total_strength += strength;
                sensed += 1;
            }
        }

        if sensed == 0 {
            return 0.0;
        }

        let centroid = weighted / total_strength;
        let away = self.position - centroid;
        let (x, y) = normalize(away.x, away.y);
        self.escape_direction = Vec2::new(x, y);
        self.escape_timer = self.escape_duration;
        self.fear_timer = self.fear_release_duration;

        total_strength / sensed as f32
    }

    /// Whether the stimulus is within sight.
    pub fn sense_stimulus(&self, stimulus: Vec2) -> bool {
        distance(self.position.x, self.position.y, stimulus.x, stimulus.y) < self.params.sight
    }

    /// Pushes velocity away from a stimulus within sight.
    pub fn repel_stimulus(&mut self, stimulus: Vec2) {
        if self.sense_stimulus(stimulus) {
            self.velocity += (self.position - stimulus) * STIMULUS_REPULSION;
        }
    }

    /// Avoidance away from predators within sight. Always zero for predators.
    pub fn sense_predators(&self, boids: &[Boid]) -> Vec2 {
        if self.is_predator {
            return Vec2::ZERO;
        }
        let mut push = Vec2::ZERO;
        for other in boids {
            if !other.is_predator || other.index == self.index {
                continue;
            }
            if self.distance_to(other) < self.params.sight {
                push += self.position - other.position;
            }
        }
        push * PREDATOR_AVOIDANCE_WEIGHT
    }

    /// Releases a pheromone at the current position unless the release
    /// cooldown is still running. Returns whether one was released.
    pub fn emit_signal(
        &mut self,
        pheromones: &mut Vec<Pheromone>,
        strength: f32,
        lifetime: u32,
    ) -> bool {
        if self.release_counter > 0 {
            return false;
        }
        pheromones.push(Pheromone::new(self.position, strength, lifetime, self.index));
        self.release_counter = self.release_interval;
        true
    }

    /// Counts down one tick of fear.
    pub fn calm_down(&mut self) {
        self.fear_timer = self.fear_timer.saturating_sub(1);
    }

    pub fn compute_separation(&self, boids: &[Boid]) -> Vec2 {
        let mut closeness = Vec2::ZERO;
        for other in self.others(boids) {
            if self.distance_to(other) < self.params.space {
                closeness += self.position - other.position;
            }
        }
        closeness * self.params.avoidance
    }

    pub fn compute_alignment(&self, boids: &[Boid]) -> Vec2 {
        match self.mean_in_sight(boids, |other| other.velocity) {
            Some(average) => (average - self.velocity) * self.params.matching,
            None => Vec2::ZERO,
        }
    }

    pub fn compute_cohesion(&self, boids: &[Boid]) -> Vec2 {
        match self.mean_in_sight(boids, |other| other.position) {
            Some(average) => (average - self.position) * self.params.centering,
            None => Vec2::ZERO,
        }
    }

    /// Caches this tick's separation; it is blended into escape steering.
    pub fn set_separation(&mut self, separation: Vec2) {
        self.separation = separation;
    }

    /// Advances kinematics by one tick.
    pub fn integrate(&mut self) {
        let escaping = self.escape_timer > 0;
        if escaping {
            let desired = self.escape_direction * self.params.max_speed;
            let steer = desired - self.velocity;
            let length = magnitude(steer.x, steer.y);
            let steer = if length > self.escape_acceleration {
                let (x, y) = normalize(steer.x, steer.y);
                Vec2::new(x, y) * self.escape_acceleration
            } else {
                steer
            };
            self.acceleration = steer + self.separation;
            self.escape_timer -= 1;
        }

        self.velocity += self.acceleration;
        self.position += self.velocity;
        self.clamp_speed();

        if !escaping {
            self.acceleration = Vec2::ZERO;
        }
        self.release_counter = self.release_counter.saturating_sub(1);
    }

    fn clamp_speed(&mut self) {
        let speed = magnitude(self.velocity.x, self.velocity.y);
        if speed == 0.0 {
            return;
        }
        let clamped = speed.clamp(self.params.min_speed, self.params.max_speed);
        if clamped != speed {
            self.velocity = self.velocity / speed * clamped;
        }
    }

    fn distance_to(&self, other: &Boid) -> f32 {
        distance(
            self.position.x,
            self.position.y,
            other.position.x,
            other.position.y,
        )
    }

    fn others<'a>(&'a self, boids: &'a [Boid]) -> impl Iterator<Item = &'a Boid> {
        boids.iter().filter(move |other| other.index != self.index)
    }

    fn mean_in_sight(&self, boids: &[Boid], value: impl Fn(&Boid) -> Vec2) -> Option<Vec2> {
        let mut sum = Vec2::ZERO;
        let mut neighbors = 0usize;
        for other in self.others(boids) {
            if self.distance_to(other) < self.params.sight {
                sum += value(other);
                neighbors += 1;
            }
        }
        (neighbors > 0).then(|| sum / neighbors as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    fn boid_at(index: usize, x: f32, y: f32) -> Boid {
        Boid::new(
            index,
            Vec2::new(x, y),
            Vec2::new(2.0, 0.0),
            BoidParams::prey(),
            &AlarmParams::default(),
            false,
        )
    }

    #[test]
    fn separation_pushes_away_from_close_neighbor() {
        let params = BoidParams {
            space: 10.0,
            avoidance: 0.01,
            ..BoidParams::prey()
        };
        let alarm = AlarmParams::default();
        let a = Boid::new(0, Vec2::ZERO, Vec2::X, params, &alarm, false);
        let b = Boid::new(1, Vec2::new(5.0, 0.0), Vec2::X, params, &alarm, false);
        let boids = vec![a.clone(), b];
        assert!(approx(a.compute_separation(&boids), Vec2::new(-0.05, 0.0)));
    }

    #[test]
    fn coincident_boids_count_each_other() {
        let a = boid_at(0, 100.0, 100.0);
        let mut b = boid_at(1, 100.0, 100.0);
        b.velocity = Vec2::new(0.0, 2.0);
        let boids = vec![a.clone(), b];
        let alignment = a.compute_alignment(&boids);
        assert!(approx(
            alignment,
            Vec2::new(-2.0, 2.0) * crate::config::PREY_MATCHING
        ));
    }

    #[test]
    fn rules_ignore_own_index() {
        let a = boid_at(0, 100.0, 100.0);
        let mut twin = a.clone();
        twin.position = Vec2::new(101.0, 100.0);
        let boids = vec![a.clone(), twin];
        assert_eq!(a.compute_separation(&boids), Vec2::ZERO);
        assert_eq!(a.compute_alignment(&boids), Vec2::ZERO);
        assert_eq!(a.compute_cohesion(&boids), Vec2::ZERO);
    }

    #[test]
    fn cohesion_pulls_toward_neighbors() {
        let a = boid_at(0, 100.0, 100.0);
        let b = boid_at(1, 120.0, 100.0);
        let boids = vec![a.clone(), b];
        let expected = Vec2::new(20.0, 0.0) * crate::config::PREY_CENTERING;
        assert!(approx(a.compute_cohesion(&boids), expected));
    }

    #[test]
    fn border_force_steers_inward() {
        let mut boid = boid_at(0, 10.0, 590.0);
        boid.velocity = Vec2::ZERO;
        boid.apply_border_force(800.0, 600.0);
        assert!(approx(
            boid.velocity,
            Vec2::new(crate::config::PREY_TURN, -crate::config::PREY_TURN)
        ));
        assert_eq!(boid.position, Vec2::new(10.0, 590.0));
    }

    #[test]
    fn border_force_is_silent_in_the_interior() {
        let mut boid = boid_at(0, 400.0, 300.0);
        let before = boid.velocity;
        boid.apply_border_force(800.0, 600.0);
        assert_eq!(boid.velocity, before);
    }

    #[test]
    fn emit_respects_cooldown() {
        let mut boid = boid_at(0, 100.0, 100.0);
        let mut pheromones = Vec::new();
        assert!(boid.emit_signal(&mut pheromones, 20.0, 60));
        boid.integrate();
        assert!(!boid.emit_signal(&mut pheromones, 20.0, 60));
        assert_eq!(pheromones.len(), 1);
        assert_eq!(pheromones[0].owner(), 0);
    }

    #[test]
    fn emit_is_allowed_again_after_the_interval() {
        let mut boid = boid_at(0, 100.0, 100.0);
        let mut pheromones = Vec::new();
        boid.emit_signal(&mut pheromones, 20.0, 60);
        for _ in 0..crate::config::PHEROMONE_RELEASE_INTERVAL {
            boid.integrate();
        }
        assert!(boid.emit_signal(&mut pheromones, 20.0, 60));
        assert_eq!(pheromones.len(), 2);
    }

    #[test]
    fn own_pheromones_are_not_sensed() {
        let mut boid = boid_at(0, 100.0, 100.0);
        let pheromones = vec![Pheromone::new(Vec2::new(101.0, 100.0), 20.0, 60, 0)];
        assert_eq!(boid.sense_alarm(&pheromones), 0.0);
        assert!(!boid.is_escaping());
    }

    #[test]
    fn strength_acts_as_sensing_radius() {
        let mut boid = boid_at(0, 100.0, 100.0);
        // Strength 10 at age 0: sensed at distance 9, missed at distance 11.
        let far = vec![Pheromone::new(Vec2::new(111.0, 100.0), 20.0, 60, 1)];
        assert_eq!(boid.sense_alarm(&far), 0.0);
        let near = vec![Pheromone::new(Vec2::new(109.0, 100.0), 20.0, 60, 1)];
        assert!((boid.sense_alarm(&near) - 10.0).abs() < 1e-5);
        assert!(approx(boid.escape_direction(), Vec2::new(-1.0, 0.0)));
        assert_eq!(boid.escape_timer(), crate::config::ESCAPE_DURATION);
        assert_eq!(boid.fear_timer(), crate::config::FEAR_RELEASE_DURATION);
    }

    #[test]
    fn escape_flees_the_weighted_centroid() {
        let mut boid = boid_at(0, 100.0, 100.0);
        let pheromones = vec![
            Pheromone::new(Vec2::new(100.0, 105.0), 40.0, 120, 1),
            Pheromone::new(Vec2::new(100.0, 95.0), 20.0, 60, 2),
        ];
        let level = boid.sense_alarm(&pheromones);
        assert!((level - 15.0).abs() < 1e-5);
        // The stronger source is below (+y), so the boid flees upward.
        assert!(approx(boid.escape_direction(), Vec2::new(0.0, -1.0)));
    }

    #[test]
    fn predators_push_prey_away() {
        let prey = boid_at(0, 100.0, 100.0);
        let predator = Boid::new(
            1,
            Vec2::new(110.0, 100.0),
            Vec2::X,
            BoidParams::predator(),
            &AlarmParams::default(),
            true,
        );
        let boids = vec![prey.clone(), predator.clone()];
        assert!(approx(prey.sense_predators(&boids), Vec2::new(-0.1, 0.0)));
        assert_eq!(predator.sense_predators(&boids), Vec2::ZERO);
    }

    #[test]
    fn integrate_clamps_speed() {
        let mut fast = boid_at(0, 100.0, 100.0);
        fast.velocity = Vec2::new(30.0, 40.0);
        fast.integrate();
        assert!((fast.velocity.length() - crate::config::PREY_MAX_SPEED).abs() < 1e-5);
        assert_eq!(fast.position, Vec2::new(130.0, 140.0));

        let mut slow = boid_at(1, 100.0, 100.0);
        slow.velocity = Vec2::new(0.1, 0.0);
        slow.integrate();
        assert!((slow.velocity.length() - crate::config::PREY_MIN_SPEED).abs() < 1e-5);
    }

    #[test]
    fn zero_velocity_stays_zero() {
        let mut boid = boid_at(0, 100.0, 100.0);
        boid.velocity = Vec2::ZERO;
        boid.integrate();
        assert_eq!(boid.velocity, Vec2::ZERO);
    }

    #[test]
    fn integrate_consumes_acceleration() {
        let mut boid = boid_at(0, 100.0, 100.0);
        boid.acceleration = Vec2::new(0.5, 0.0);
        boid.integrate();
        assert!(approx(boid.velocity, Vec2::new(2.5, 0.0)));
        assert_eq!(boid.acceleration, Vec2::ZERO);
    }

    #[test]
    fn escape_steering_is_capped_and_keeps_separation() {
        let mut boid = boid_at(0, 100.0, 100.0);
        let pheromones = vec![Pheromone::new(Vec2::new(105.0, 100.0), 20.0, 60, 1)];
        boid.sense_alarm(&pheromones);
        boid.set_separation(Vec2::new(0.0, 0.1));
        boid.acceleration = Vec2::new(100.0, 100.0);
        boid.integrate();
        let escape = crate::config::ESCAPE_ACCELERATION;
        assert!(approx(boid.acceleration, Vec2::new(-escape, 0.1)));
        assert_eq!(boid.escape_timer(), crate::config::ESCAPE_DURATION - 1);
    }
}
