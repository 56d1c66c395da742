//! Dice - d100 pools, success counting and damage formulas
//!
//! The engine's only source of randomness is a [`DiceRoller`]. Production code
//! wraps any `rand::Rng` in [`RngRoller`]; tests and replays script the faces
//! with [`FixedRoller`].

mod formula;
mod success;

pub use formula::{DiceFormula, FormulaError, FormulaRoll, FormulaTerm};
pub use success::{count_successes, CritRange, SuccessTally};

use rand::rngs::ThreadRng;
use rand::Rng;

/// Faces on a pool die
pub const POOL_DIE: u32 = 100;

/// Source of die faces
pub trait DiceRoller {
    /// Roll one die with `sides` faces, returning a value in `[1, sides]`
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Roll a d100 pool of `n` dice; `n` is clamped to at least 1
    fn roll_pool(&mut self, n: u32) -> Vec<u32> {
        (0..n.max(1)).map(|_| self.roll_die(POOL_DIE)).collect()
    }
}

impl<T: DiceRoller + ?Sized> DiceRoller for &mut T {
    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }
}

/// Roller backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RngRoller<R: Rng> {
    rng: R,
}

impl<R: Rng> RngRoller<R> {
    pub fn new(rng: R) -> Self {
        RngRoller { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl RngRoller<ThreadRng> {
    /// Roller using the thread-local generator
    pub fn thread() -> Self {
        RngRoller::new(rand::thread_rng())
    }
}

impl<R: Rng> DiceRoller for RngRoller<R> {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.rng.gen_range(1..=sides.max(1))
    }
}

/// Roller that replays a scripted sequence of faces
///
/// Faces are handed out in order and the sequence wraps around when it runs
/// out. Each face is clamped into the requested die's range.
#[derive(Debug, Clone, Default)]
pub struct FixedRoller {
    faces: Vec<u32>,
    cursor: usize,
}

impl FixedRoller {
    pub fn new(faces: impl Into<Vec<u32>>) -> Self {
        FixedRoller {
            faces: faces.into(),
            cursor: 0,
        }
    }

    /// Number of faces handed out so far
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl DiceRoller for FixedRoller {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if self.faces.is_empty() {
            return 1;
        }
        let face = self.faces[self.cursor % self.faces.len()];
        self.cursor += 1;
        face.clamp(1, sides.max(1))
    }
}
