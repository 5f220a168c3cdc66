use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::{Duration, Instant};

const SPARKS: [char; 6] = ['⚡', '✨', '⭐', '💫', '🌟', '🔥'];
const BANNERS: [&str; 4] = ["POWER UP!", "x2 POINTS!", "SLOW TIME!", "ON FIRE!"];

/// Particle for the power-up burst
#[derive(Debug, Clone)]
pub struct BurstParticle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
    pub is_text: bool, // Whether this particle spells out the banner
    pub target_x: f64,
    pub target_y: f64,
}

impl BurstParticle {
    fn spark(x: f64, y: f64, rng: &mut ThreadRng) -> Self {
        Self {
            x,
            y,
            vel_x: rng.gen_range(-4.0..4.0),
            vel_y: rng.gen_range(-4.0..-1.0),
            symbol: *SPARKS.choose(rng).unwrap_or(&'✨'),
            color_index: rng.gen_range(0..7),
            age: 0.0,
            max_age: rng.gen_range(1.0..2.0),
            is_text: false,
            target_x: x,
            target_y: y,
        }
    }

    fn letter(from: (f64, f64), to: (f64, f64), symbol: char, color: usize) -> Self {
        Self {
            x: from.0,
            y: from.1,
            vel_x: (to.0 - from.0) * 1.5,
            vel_y: (to.1 - from.1) * 1.5,
            symbol,
            color_index: color,
            age: 0.0,
            max_age: 2.5,
            is_text: true,
            target_x: to.0,
            target_y: to.1,
        }
    }

    fn update(&mut self, dt: f64) -> bool {
        if self.is_text {
            let dist_to_target =
                ((self.target_x - self.x).powi(2) + (self.target_y - self.y).powi(2)).sqrt();
            if dist_to_target > 1.0 {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                self.vel_x *= 0.9;
                self.vel_y *= 0.9;
            } else {
                self.x = self.target_x;
                self.y = self.target_y;
                self.vel_x = 0.0;
                self.vel_y = 0.0;
            }
        } else {
            self.x += self.vel_x * dt;
            self.y += self.vel_y * dt;
            self.vel_y += 12.0 * dt; // gravity
        }

        self.age += dt;
        self.age < self.max_age
    }
}

/// Short particle burst played when a power-up kicks in
#[derive(Debug)]
pub struct PowerUpBurst {
    pub particles: Vec<BurstParticle>,
    pub started_at: Instant,
    pub duration: Duration,
    pub is_active: bool,
    pub width: f64,
    pub height: f64,
}

impl PowerUpBurst {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            started_at: Instant::now(),
            duration: Duration::from_millis(2500),
            is_active: false,
            width: 80.0,
            height: 24.0,
        }
    }

    pub fn start(&mut self, width: u16, height: u16) {
        let mut rng = rand::thread_rng();

        self.particles.clear();
        self.started_at = Instant::now();
        self.is_active = true;
        self.width = width as f64;
        self.height = height as f64;

        let center = (self.width / 2.0, self.height / 2.0);
        let banner = BANNERS.choose(&mut rng).unwrap_or(&"POWER UP!");
        self.spell(banner, center, &mut rng);

        for _ in 0..20 {
            let x = center.0 + rng.gen_range(-12.0..12.0);
            let y = center.1 + rng.gen_range(-5.0..5.0);
            self.particles.push(BurstParticle::spark(x, y, &mut rng));
        }
    }

    fn spell(&mut self, text: &str, center: (f64, f64), rng: &mut ThreadRng) {
        let spacing = 2.0;
        let text_width = (text.chars().count() as f64 - 1.0) * spacing;
        let left = center.0 - text_width / 2.0;

        for (i, ch) in text.chars().enumerate().filter(|(_, ch)| *ch != ' ') {
            let to = (left + i as f64 * spacing, center.1 - 2.0);
            let from = (
                center.0 + rng.gen_range(-10.0..10.0),
                center.1 + rng.gen_range(-4.0..4.0),
            );
            let color = rng.gen_range(0..7);
            self.particles
                .push(BurstParticle::letter(from, to, ch, color));
        }
    }

    /// Advance one frame; stops the burst once its time is up
    pub fn update(&mut self) {
        if !self.is_active {
            return;
        }

        if self.started_at.elapsed() >= self.duration {
            self.is_active = false;
            self.particles.clear();
            return;
        }

        let dt = 0.1;
        let (width, height) = (self.width, self.height);
        self.particles.retain_mut(|particle| {
            let still_alive = particle.update(dt);
            if particle.is_text {
                return still_alive;
            }
            let margin = 3.0;
            let off_screen = particle.y > height + margin
                || particle.x < -margin
                || particle.x > width + margin;
            still_alive && !off_screen
        });
    }

    pub fn stop(&mut self) {
        self.is_active = false;
        self.particles.clear();
    }
}

impl Default for PowerUpBurst {
    fn default() -> Self {
        Self::new()
    }
}
