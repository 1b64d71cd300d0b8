use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Instant;

const CONFETTI: [char; 6] = ['*', '+', '•', '◆', '✦', '▪'];
const BANNER: &str = "CONGRATS";

/// How long the confetti burst runs, in seconds
pub const CELEBRATION_SECS: f64 = 4.0;
const GRAVITY: f64 = 12.0;
const STEP: f64 = 0.1;

/// One piece of confetti, or one letter of the banner
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
    /// Banner letters fly to a fixed slot and stay
    pub target: Option<(f64, f64)>,
}

impl Particle {
    fn confetti<R: Rng>(x: f64, y: f64, rng: &mut R) -> Self {
        Self {
            x,
            y,
            vel_x: rng.gen_range(-4.0..4.0),
            vel_y: rng.gen_range(-6.0..-2.0),
            symbol: *CONFETTI.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..6),
            age: 0.0,
            max_age: rng.gen_range(2.0..CELEBRATION_SECS),
            target: None,
        }
    }

    fn letter(from: (f64, f64), to: (f64, f64), symbol: char, color_index: usize) -> Self {
        Self {
            x: from.0,
            y: from.1,
            vel_x: to.0 - from.0,
            vel_y: to.1 - from.1,
            symbol,
            color_index,
            age: 0.0,
            max_age: CELEBRATION_SECS,
            target: Some(to),
        }
    }

    pub fn is_letter(&self) -> bool {
        self.target.is_some()
    }

    /// Moves the particle by `dt` seconds. Returns false once it has expired.
    fn update(&mut self, dt: f64) -> bool {
        match self.target {
            Some((tx, ty)) => {
                let dist = ((tx - self.x).powi(2) + (ty - self.y).powi(2)).sqrt();
                if dist > 0.5 {
                    self.x += self.vel_x * dt;
                    self.y += self.vel_y * dt;
                } else {
                    self.x = tx;
                    self.y = ty;
                }
            }
            None => {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                self.vel_y += GRAVITY * dt;
            }
        }
        self.age += dt;
        self.age < self.max_age
    }
}

/// Confetti burst shown on the finished screen
#[derive(Debug)]
pub struct Celebration {
    pub particles: Vec<Particle>,
    started: Instant,
    last_update: f64,
    pub is_active: bool,
    width: f64,
    height: f64,
}

impl Celebration {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            started: Instant::now(),
            last_update: 0.0,
            is_active: false,
            width: 80.0,
            height: 24.0,
        }
    }

    pub fn start(&mut self, width: u16, height: u16) {
        let mut rng = rand::thread_rng();
        self.particles.clear();
        self.started = Instant::now();
        self.last_update = 0.0;
        self.is_active = true;
        self.width = width as f64;
        self.height = height as f64;

        let cx = self.width / 2.0;
        let cy = self.height / 2.0;

        let spacing = 2.0;
        let left = cx - (BANNER.len() as f64 - 1.0) * spacing / 2.0;
        for (i, ch) in BANNER.chars().enumerate() {
            let from = (cx + rng.gen_range(-12.0..12.0), cy + rng.gen_range(-6.0..6.0));
            let to = (left + i as f64 * spacing, cy - 3.0);
            self.particles
                .push(Particle::letter(from, to, ch, i % CONFETTI.len()));
        }

        for _ in 0..40 {
            let x = cx + rng.gen_range(-20.0..20.0);
            let y = cy + rng.gen_range(-4.0..4.0);
            self.particles.push(Particle::confetti(x, y, &mut rng));
        }
        log::debug!("celebration started with {} particles", self.particles.len());
    }

    /// Advances the animation to the current wall time
    pub fn update(&mut self) {
        let elapsed = self.started.elapsed().as_secs_f64();
        self.advance_to(elapsed);
    }

    /// Advances the animation to `elapsed` seconds after start, in fixed steps
    pub fn advance_to(&mut self, elapsed: f64) {
        if !self.is_active {
            return;
        }
        if elapsed >= CELEBRATION_SECS {
            self.is_active = false;
            self.particles.clear();
            return;
        }

        let (width, height) = (self.width, self.height);
        while self.last_update + STEP <= elapsed {
            self.last_update += STEP;
            self.particles.retain_mut(|p| {
                let alive = p.update(STEP);
                let off_screen = !p.is_letter() && (p.y > height + 2.0 || p.x < -2.0 || p.x > width + 2.0);
                alive && !off_screen
            });
        }
    }
}

impl Default for Celebration {
    fn default() -> Self {
        Self::new()
    }
}
