use bevy::math::Vec2;

/// A decaying alarm pheromone released by a boid.
///
/// Strength rises linearly from half its peak to the peak over the first half
/// of its lifetime, then falls linearly to zero at the end of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Pheromone {
    position: Vec2,
    start_strength: f32,
    current_strength: f32,
    lifetime: u32,
    age: u32,
    owner: usize,
}

impl Pheromone {
    pub fn new(position: Vec2, start_strength: f32, lifetime: u32, owner: usize) -> Self {
        Self {
            position,
            start_strength,
            current_strength: strength_at(start_strength, lifetime, 0),
            lifetime,
            age: 0,
            owner,
        }
    }

    /// Ages the pheromone by one tick and recomputes its strength.
    pub fn advance(&mut self) {
        self.age = self.age.saturating_add(1);
        self.current_strength = strength_at(self.start_strength, self.lifetime, self.age);
    }

    pub fn is_expired(&self) -> bool {
        self.current_strength <= 0.0
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn start_strength(&self) -> f32 {
        self.start_strength
    }

    /// Current intensity; also the radius within which boids sense it.
    pub fn current_strength(&self) -> f32 {
        self.current_strength
    }

    pub fn lifetime(&self) -> u32 {
        self.lifetime
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    /// Index of the boid that released this pheromone.
    pub fn owner(&self) -> usize {
        self.owner
    }
}

fn strength_at(peak: f32, lifetime: u32, age: u32) -> f32 {
    if lifetime == 0 || age >= lifetime {
        return 0.0;
    }
    let t = age as f32;
    let total = lifetime as f32;
    let half = total / 2.0;
    if t <= half {
        peak * (0.5 + 0.5 * t / half)
    } else {
        peak * (total - t) / half
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn aged(pheromone: &mut Pheromone, ticks: u32) {
        for _ in 0..ticks {
            pheromone.advance();
        }
    }

    #[test]
    fn starts_at_half_strength() {
        let pheromone = Pheromone::new(Vec2::ZERO, 20.0, 60, 0);
        assert!(approx(pheromone.current_strength(), 10.0));
        assert!(!pheromone.is_expired());
    }

    #[test]
    fn rises_to_peak_at_half_life() {
        let mut pheromone = Pheromone::new(Vec2::ZERO, 20.0, 60, 0);
        aged(&mut pheromone, 15);
        assert!(approx(pheromone.current_strength(), 15.0));
        aged(&mut pheromone, 15);
        assert!(approx(pheromone.current_strength(), 20.0));
    }

    #[test]
    fn decays_to_zero_at_end_of_life() {
        let mut pheromone = Pheromone::new(Vec2::ZERO, 20.0, 60, 0);
        aged(&mut pheromone, 45);
        assert!(approx(pheromone.current_strength(), 10.0));
        aged(&mut pheromone, 14);
        assert!(pheromone.current_strength() > 0.0);
        aged(&mut pheromone, 1);
        assert_eq!(pheromone.current_strength(), 0.0);
        assert!(pheromone.is_expired());
    }

    #[test]
    fn stays_at_zero_after_expiry() {
        let mut pheromone = Pheromone::new(Vec2::ZERO, 20.0, 60, 0);
        aged(&mut pheromone, 100);
        assert_eq!(pheromone.current_strength(), 0.0);
        assert_eq!(pheromone.age(), 100);
    }

    #[test]
    fn odd_lifetime_peaks_between_ticks() {
        let mut pheromone = Pheromone::new(Vec2::ZERO, 10.0, 3, 0);
        pheromone.advance();
        let rising = pheromone.current_strength();
        pheromone.advance();
        let falling = pheromone.current_strength();
        assert!(rising > 5.0 && rising < 10.0);
        assert!(falling > 0.0 && falling < 10.0);
        pheromone.advance();
        assert!(pheromone.is_expired());
    }
}
