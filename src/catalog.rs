use rand::seq::SliceRandom;
use rand::Rng;

/// Largest grid the board will ever show
pub const MAX_GRID_SIZE: usize = 16;

/// Named group of glyphs used as a selection pool for a range of levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Tier {
    Smileys,
    Animals,
    Fruits,
    Vehicles,
    Activities,
    Special,
}

const SMILEYS: [&str; 15] = [
    "😀", "😃", "😄", "😁", "😆", "😅", "😂", "🤣", "😊", "😇", "🙂", "🙃", "😉", "😌", "😍",
];

const ANIMALS: [&str; 15] = [
    "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯", "🦁", "🐮", "🐷", "🐸", "🐵",
];

const FRUITS: [&str; 15] = [
    "🍎", "🍐", "🍊", "🍋", "🍌", "🍉", "🍇", "🍓", "🫐", "🍈", "🍒", "🍑", "🥭", "🍍", "🥥",
];

const VEHICLES: [&str; 15] = [
    "🚗", "🚕", "🚙", "🚌", "🚎", "🏎️", "🚓", "🚑", "🚒", "🚐", "🛻", "🚚", "🚛", "🚜", "🛵",
];

// Repeats are intentional: they are collapsed when a pool is built.
const ACTIVITIES: [&str; 15] = [
    "🎮", "🎯", "🎪", "🎭", "🎨", "🎬", "🎤", "🎧", "🎸", "🎹", "🎺", "🎻", "🎲", "🎯", "🎪",
];

const SPECIAL: [&str; 15] = [
    "🌈", "⭐", "✨", "💫", "🌟", "🔥", "💥", "⚡", "🎇", "🎆", "🏆", "🥇", "🥈", "🥉", "🎖️",
];

impl Tier {
    pub const ALL: [Tier; 6] = [
        Tier::Smileys,
        Tier::Animals,
        Tier::Fruits,
        Tier::Vehicles,
        Tier::Activities,
        Tier::Special,
    ];

    pub fn glyphs(&self) -> &'static [&'static str] {
        match self {
            Tier::Smileys => &SMILEYS,
            Tier::Animals => &ANIMALS,
            Tier::Fruits => &FRUITS,
            Tier::Vehicles => &VEHICLES,
            Tier::Activities => &ACTIVITIES,
            Tier::Special => &SPECIAL,
        }
    }
}

/// Tiers mixed into the pool for a given level
pub fn tiers_for_level(level: u32) -> &'static [Tier] {
    match level {
        0..=3 => &[Tier::Smileys],
        4..=6 => &[Tier::Smileys, Tier::Animals],
        7..=9 => &[Tier::Animals, Tier::Fruits],
        10..=12 => &[Tier::Animals, Tier::Fruits, Tier::Vehicles],
        13..=15 => &[Tier::Fruits, Tier::Vehicles, Tier::Activities],
        _ => &[Tier::Vehicles, Tier::Activities, Tier::Special],
    }
}

/// Union of the level's tiers with repeated glyphs collapsed (first one wins)
pub fn pool_for_level(level: u32) -> Vec<&'static str> {
    let mut pool: Vec<&'static str> = Vec::new();
    for &glyph in tiers_for_level(level).iter().flat_map(|t| t.glyphs()) {
        if !pool.contains(&glyph) {
            pool.push(glyph);
        }
    }
    pool
}

/// Draw `count` distinct glyphs for `level`, in random order.
///
/// When `count` is larger than the level's pool, the whole pool is returned
/// shuffled.
pub fn pick_random_emojis<R: Rng + ?Sized>(rng: &mut R, level: u32, count: usize) -> Vec<String> {
    let pool = pool_for_level(level);
    let count = count.min(pool.len());
    pool.choose_multiple(rng, count)
        .map(|g| g.to_string())
        .collect()
}

/// Uniform choice of the round's target from the grid
pub fn pick_target<R: Rng + ?Sized>(rng: &mut R, emojis: &[String]) -> Option<String> {
    emojis.choose(rng).cloned()
}

/// Display label for the level's tier band
pub fn category_name(level: u32) -> &'static str {
    match level {
        0..=3 => "Smiley",
        4..=6 => "Animals",
        7..=9 => "Fruits",
        10..=12 => "Vehicles",
        13..=15 => "Activities",
        _ => "Special",
    }
}

/// Grid size grows with the level: `min(floor(level * 1.5) + 3, 16)`
pub fn emoji_count_for_level(level: u32) -> usize {
    let grown = (level as usize * 3) / 2 + 3;
    grown.min(MAX_GRID_SIZE)
}
