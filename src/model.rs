//! Agent model: positions, infections and per-tick agent behaviour.

use rand::Rng;

/// Default agent radius (world units).
pub const DEFAULT_RADIUS: f64 = 7.0;

/// Point in world space, with the origin at the world center.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`.
    pub fn dist_2(&self, other: &Position) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }
}

/// Width and height of the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }
}

/// Transmissible condition carried by a single agent.
///
/// Immutable once constructed: re-infection replaces the instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Infection {
    tag: String,
    duration: u32,
}

impl Infection {
    pub fn new(tag: impl Into<String>, duration: u32) -> Self {
        Self {
            tag: tag.into(),
            duration,
        }
    }

    /// Display label (e.g. a color name).
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Number of ticks after which the carrier recovers.
    pub fn duration(&self) -> u32 {
        self.duration
    }
}

/// Template from which every transmitted [`Infection`] is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pathogen {
    pub tag: String,
    /// Inclusive upper bound of the duration draw.
    pub max_duration: u32,
}

impl Pathogen {
    /// Construct a fresh infection with a duration drawn uniformly from `[0, max_duration]`.
    pub fn spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> Infection {
        let duration = rng.random_range(0..=self.max_duration);
        Infection::new(self.tag.clone(), duration)
    }
}

impl Default for Pathogen {
    fn default() -> Self {
        Self {
            tag: "red".to_string(),
            max_duration: 1000,
        }
    }
}

/// Agent of the simulation.
///
/// Wanders towards a random destination and may carry an infection.
/// `ticks_sick` is only meaningful while `infection` is present and is
/// reset whenever the infection is cleared or replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    position: Position,
    destination: Position,
    radius: f64,
    infection: Option<Infection>,
    ticks_sick: u32,
}

impl Agent {
    /// Create a healthy agent at the world origin with a random destination.
    pub fn new<R: Rng + ?Sized>(bounds: &Bounds, radius: f64, rng: &mut R) -> Self {
        let destination = random_destination(bounds, radius, rng);
        Self {
            position: Position::default(),
            destination,
            radius,
            infection: None,
            ticks_sick: 0,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn destination(&self) -> Position {
        self.destination
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn infection(&self) -> Option<&Infection> {
        self.infection.as_ref()
    }

    pub fn ticks_sick(&self) -> u32 {
        self.ticks_sick
    }

    pub fn is_infected(&self) -> bool {
        self.infection.is_some()
    }

    /// Whether the agent is within one radius of its destination.
    pub fn reached_destination(&self) -> bool {
        self.position.dist_2(&self.destination) <= self.radius.powi(2)
    }

    /// Advance `trunc(radius / 2)` towards the destination.
    ///
    /// The bearing follows the "0 = north, clockwise" convention, so the
    /// x displacement is the sine and the y displacement the cosine.
    pub fn move_towards_destination(&mut self) {
        let step = (self.radius / 2.0).trunc();
        let bearing = (self.destination.x - self.position.x)
            .atan2(self.destination.y - self.position.y);
        self.position.x += step * bearing.sin();
        self.position.y += step * bearing.cos();
    }

    /// Count one more tick of sickness and recover once the duration is reached.
    pub fn progress_illness(&mut self) {
        let Some(infection) = &self.infection else {
            return;
        };
        self.ticks_sick += 1;
        if self.ticks_sick >= infection.duration() {
            self.cure();
        }
    }

    /// Replace any current infection and restart the countdown.
    pub fn infect(&mut self, infection: Infection) {
        self.infection = Some(infection);
        self.ticks_sick = 0;
    }

    pub fn cure(&mut self) {
        self.infection = None;
        self.ticks_sick = 0;
    }

    /// Whether the two footprints (diameter `2 * radius`) overlap or touch.
    pub fn collides_with(&self, other: &Agent) -> bool {
        self.position.dist_2(&other.position) <= (2.0 * self.radius).powi(2)
    }

    /// Perform one tick: re-roll the destination if reached, progress illness, then move.
    pub fn update<R: Rng + ?Sized>(&mut self, bounds: &Bounds, rng: &mut R) {
        if self.reached_destination() {
            self.destination = random_destination(bounds, self.radius, rng);
        }
        self.progress_illness();
        self.move_towards_destination();
    }

    #[cfg(test)]
    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    #[cfg(test)]
    pub(crate) fn set_destination(&mut self, destination: Position) {
        self.destination = destination;
    }
}

/// Draw a point at least `radius` inside every edge of the world.
///
/// Worlds narrower than one diameter, and non-finite bounds or radii,
/// collapse the range onto the center line.
pub fn random_destination<R: Rng + ?Sized>(bounds: &Bounds, radius: f64, rng: &mut R) -> Position {
    let max_x = inner_extent(bounds.half_width(), radius);
    let max_y = inner_extent(bounds.half_height(), radius);
    Position::new(
        rng.random_range(-max_x..=max_x),
        rng.random_range(-max_y..=max_y),
    )
}

fn inner_extent(half_extent: f64, radius: f64) -> f64 {
    let extent = half_extent - radius;
    if extent.is_finite() { extent.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn agent_at(x: f64, y: f64) -> Agent {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let mut agent = Agent::new(&Bounds::new(100.0, 100.0), DEFAULT_RADIUS, &mut rng);
        agent.set_position(Position::new(x, y));
        agent
    }

    #[test]
    fn destinations_stay_one_radius_inside() {
        let mut rng = ChaCha12Rng::seed_from_u64(42);
        for bounds in [
            Bounds::new(700.0, 500.0),
            Bounds::new(15.0, 300.0),
            Bounds::new(14.0, 14.0),
        ] {
            for _ in 0..10_000 {
                let dst = random_destination(&bounds, DEFAULT_RADIUS, &mut rng);
                assert!(dst.x >= -bounds.half_width() + DEFAULT_RADIUS);
                assert!(dst.x <= bounds.half_width() - DEFAULT_RADIUS);
                assert!(dst.y >= -bounds.half_height() + DEFAULT_RADIUS);
                assert!(dst.y <= bounds.half_height() - DEFAULT_RADIUS);
            }
        }
    }

    #[test]
    fn degenerate_bounds_give_center_destination() {
        let mut rng = ChaCha12Rng::seed_from_u64(8);
        for (bounds, radius) in [
            (Bounds::new(f64::NAN, f64::NAN), DEFAULT_RADIUS),
            (Bounds::new(f64::INFINITY, f64::NEG_INFINITY), DEFAULT_RADIUS),
            (Bounds::new(100.0, 100.0), f64::NAN),
            (Bounds::new(100.0, 100.0), f64::INFINITY),
            (Bounds::new(4.0, 4.0), DEFAULT_RADIUS),
        ] {
            let dst = random_destination(&bounds, radius, &mut rng);
            assert_eq!(dst, Position::new(0.0, 0.0));
        }

        let dst = random_destination(&Bounds::new(f64::NAN, 100.0), DEFAULT_RADIUS, &mut rng);
        assert_eq!(dst.x, 0.0);
        assert!(dst.y.abs() <= 50.0 - DEFAULT_RADIUS);
    }

    #[test]
    fn new_agent_starts_healthy_at_origin() {
        let agent = agent_at(0.0, 0.0);
        assert_eq!(agent.position(), Position::default());
        assert!(!agent.is_infected());
        assert_eq!(agent.ticks_sick(), 0);
    }

    #[test]
    fn movement_converges_onto_destination() {
        let mut rng = ChaCha12Rng::seed_from_u64(7);
        let bounds = Bounds::new(700.0, 500.0);
        for _ in 0..100 {
            let mut agent = Agent::new(&bounds, DEFAULT_RADIUS, &mut rng);
            agent.set_position(random_destination(&bounds, DEFAULT_RADIUS, &mut rng));

            let mut dist_2 = agent.position().dist_2(&agent.destination());
            let mut n_moves = 0;
            while !agent.reached_destination() {
                agent.move_towards_destination();
                let new_dist_2 = agent.position().dist_2(&agent.destination());
                assert!(new_dist_2 < dist_2, "{new_dist_2} >= {dist_2}");
                dist_2 = new_dist_2;
                n_moves += 1;
                assert!(n_moves < 1000);
            }
        }
    }

    #[test]
    fn move_steps_truncated_half_radius() {
        let mut agent = agent_at(0.0, 0.0);
        agent.set_destination(Position::new(0.0, 100.0));
        agent.move_towards_destination();
        assert!((agent.position().y - 3.0).abs() < 1e-12);
        assert!(agent.position().x.abs() < 1e-12);

        agent.set_destination(Position::new(100.0, 3.0));
        agent.move_towards_destination();
        assert!((agent.position().x - 3.0).abs() < 1e-12);
        assert!((agent.position().y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn zero_duration_cures_on_next_progress() {
        let mut agent = agent_at(0.0, 0.0);
        agent.infect(Infection::new("red", 0));
        assert!(agent.is_infected());
        agent.progress_illness();
        assert!(!agent.is_infected());
        assert_eq!(agent.ticks_sick(), 0);
    }

    #[test]
    fn duration_is_inclusive() {
        let mut agent = agent_at(0.0, 0.0);
        agent.infect(Infection::new("red", 5));
        for tick in 1..5 {
            agent.progress_illness();
            assert!(agent.is_infected());
            assert_eq!(agent.ticks_sick(), tick);
        }
        agent.progress_illness();
        assert!(!agent.is_infected());
    }

    #[test]
    fn reinfection_restarts_countdown() {
        let mut agent = agent_at(0.0, 0.0);
        agent.infect(Infection::new("red", 5));
        agent.progress_illness();
        agent.progress_illness();
        agent.infect(Infection::new("blue", 3));
        assert_eq!(agent.ticks_sick(), 0);
        assert_eq!(agent.infection().map(Infection::tag), Some("blue"));
        for _ in 0..2 {
            agent.progress_illness();
        }
        assert!(agent.is_infected());
        agent.progress_illness();
        assert!(!agent.is_infected());
    }

    #[test]
    fn cure_is_idempotent() {
        let mut agent = agent_at(0.0, 0.0);
        agent.infect(Infection::new("red", 10));
        agent.cure();
        let cured = agent.clone();
        agent.cure();
        assert_eq!(agent, cured);
        agent.progress_illness();
        assert_eq!(agent.ticks_sick(), 0);
    }

    #[test]
    fn collision_is_symmetric() {
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        let bounds = Bounds::new(60.0, 60.0);
        let agents: Vec<_> = (0..50)
            .map(|_| {
                let mut agent = Agent::new(&bounds, DEFAULT_RADIUS, &mut rng);
                agent.set_position(random_destination(&bounds, DEFAULT_RADIUS, &mut rng));
                agent
            })
            .collect();
        for a in &agents {
            for b in &agents {
                assert_eq!(a.collides_with(b), b.collides_with(a));
            }
        }
    }

    #[test]
    fn collision_includes_touching() {
        let a = agent_at(0.0, 0.0);
        assert!(a.collides_with(&agent_at(14.0, 0.0)));
        assert!(!a.collides_with(&agent_at(14.01, 0.0)));
        assert!(a.collides_with(&a));
    }

    #[test]
    fn pathogen_durations_stay_in_range() {
        let mut rng = ChaCha12Rng::seed_from_u64(11);
        let pathogen = Pathogen {
            tag: "green".to_string(),
            max_duration: 4,
        };
        let mut seen = [false; 5];
        for _ in 0..1000 {
            let infection = pathogen.spawn(&mut rng);
            assert_eq!(infection.tag(), "green");
            seen[infection.duration() as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn update_rerolls_reached_destination() {
        let mut rng = ChaCha12Rng::seed_from_u64(5);
        let bounds = Bounds::new(700.0, 500.0);
        let mut agent = agent_at(0.0, 0.0);
        agent.set_destination(Position::new(1.0, 1.0));
        agent.infect(Infection::new("red", 2));
        agent.update(&bounds, &mut rng);
        assert_ne!(agent.destination(), Position::new(1.0, 1.0));
        assert_eq!(agent.ticks_sick(), 1);
        assert!((agent.position().dist_2(&Position::default()) - 9.0).abs() < 1e-9);
    }
}
