//! Tap-to-pop relaxation game
//!
//! A fixed number of bubbles float in the play area. Popping one marks it,
//! bumps the pop counter and plays a short tone; once the fade-out delay has
//! passed the bubble is removed and a fresh random one takes its place.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::tone::LazyToneContext;

/// Bubbles on screen at steady state
pub const BUBBLE_COUNT: usize = 10;

/// Time between a pop and the bubble's replacement
pub const POP_DELAY: Duration = Duration::from_millis(400);

/// Bubble fill colours (emerald, teal, green, lime, cyan, purple at 60%)
pub const PALETTE: [&str; 6] = [
    "rgba(52, 211, 153, 0.6)",
    "rgba(45, 212, 191, 0.6)",
    "rgba(74, 222, 128, 0.6)",
    "rgba(163, 230, 53, 0.6)",
    "rgba(34, 211, 238, 0.6)",
    "rgba(216, 180, 254, 0.6)",
];

/// Placement range for bubble centres, in percent of the play area
const POSITION_MIN: f64 = 10.0;
const POSITION_SPAN: f64 = 80.0;

/// Bubble diameter range in pixels
const SIZE_MIN: f64 = 60.0;
const SIZE_SPAN: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bubble {
    pub id: Uuid,
    /// Horizontal position (percent)
    pub x: f64,
    /// Vertical position (percent)
    pub y: f64,
    /// Diameter (px)
    pub size: f64,
    pub color: &'static str,
    pub popped: bool,
}

impl Bubble {
    fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: POSITION_MIN + rng.gen::<f64>() * POSITION_SPAN,
            y: POSITION_MIN + rng.gen::<f64>() * POSITION_SPAN,
            size: SIZE_MIN + rng.gen::<f64>() * SIZE_SPAN,
            color: PALETTE[rng.gen_range(0..PALETTE.len())],
            popped: false,
        }
    }
}

pub struct BubbleGame {
    bubbles: Vec<Bubble>,
    /// Popped bubbles awaiting removal, in pop order
    pending: Vec<(Uuid, Instant)>,
    pop_count: u64,
    rng: StdRng,
    tone: LazyToneContext,
}

impl BubbleGame {
    pub fn new(rng: StdRng, tone: LazyToneContext) -> Self {
        let mut game = Self {
            bubbles: Vec::with_capacity(BUBBLE_COUNT + 1),
            pending: Vec::new(),
            pop_count: 0,
            rng,
            tone,
        };
        for _ in 0..BUBBLE_COUNT {
            let bubble = Bubble::random(&mut game.rng);
            game.bubbles.push(bubble);
        }
        game
    }

    /// Game seeded from OS entropy with silent pops
    pub fn with_entropy() -> Self {
        Self::new(StdRng::from_entropy(), LazyToneContext::silent())
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    /// Bubbles in the play area, including ones still fading out
    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    /// Bubbles that can still be popped
    pub fn visible(&self) -> usize {
        self.bubbles.iter().filter(|b| !b.popped).count()
    }

    pub fn pop_count(&self) -> u64 {
        self.pop_count
    }

    pub fn tone(&self) -> &LazyToneContext {
        &self.tone
    }

    /// When the next popped bubble is due for replacement
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|(_, due)| *due).min()
    }

    /// Pop a bubble. Returns false for unknown or already popped bubbles.
    pub fn pop(&mut self, id: Uuid, now: Instant) -> bool {
        let Some(bubble) = self.bubbles.iter_mut().find(|b| b.id == id && !b.popped) else {
            return false;
        };

        self.tone.play_pop();
        bubble.popped = true;
        self.pop_count += 1;
        self.pending.push((id, now + POP_DELAY));
        true
    }

    /// Replace every popped bubble whose delay has elapsed.
    ///
    /// Returns how many bubbles were replaced.
    pub fn tick(&mut self, now: Instant) -> usize {
        let (due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|(_, at)| *at <= now);
        self.pending = waiting;

        for (id, _) in &due {
            self.bubbles.retain(|b| b.id != *id);
            let fresh = Bubble::random(&mut self.rng);
            self.bubbles.push(fresh);
        }

        if !due.is_empty() {
            tracing::trace!(replaced = due.len(), pops = self.pop_count, "bubbles replaced");
        }
        due.len()
    }
}
