//! Injectable dice
//!
//! Stochastic rules never reach for a global random source. They take a
//! [`DiceRoller`], so production code can pass a real RNG and tests can
//! replay a fixed sequence.

use rand::Rng;

pub trait DiceRoller {
    /// One die with faces `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Sum of three six-sided dice, `3..=18` with the usual bell curve.
    fn roll_3d6(&mut self) -> i32 {
        (0..3).map(|_| self.roll_die(6) as i32).sum()
    }
}

impl<D: DiceRoller + ?Sized> DiceRoller for &mut D {
    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }

    fn roll_3d6(&mut self) -> i32 {
        (**self).roll_3d6()
    }
}

/// Dice backed by any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RandomDice<R> {
    rng: R,
}

impl<R: Rng> RandomDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomDice<rand::rngs::ThreadRng> {
    /// Dice over the calling thread's RNG.
    pub fn thread_local() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> DiceRoller for RandomDice<R> {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.rng.gen_range(1..=sides.max(1))
    }
}

/// Replays a fixed list of results, cycling when it runs out.
///
/// Each call to [`DiceRoller::roll_3d6`] or [`DiceRoller::roll_die`] consumes
/// one entry as the complete result of that call.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    results: Vec<i32>,
    next: usize,
}

impl ScriptedDice {
    pub fn new(results: impl Into<Vec<i32>>) -> Self {
        Self {
            results: results.into(),
            next: 0,
        }
    }

    fn next_result(&mut self) -> i32 {
        if self.results.is_empty() {
            return 0;
        }
        let value = self.results[self.next % self.results.len()];
        self.next += 1;
        value
    }

    /// How many results have been consumed so far.
    pub fn consumed(&self) -> usize {
        self.next
    }
}

impl DiceRoller for ScriptedDice {
    fn roll_die(&mut self, _sides: u32) -> u32 {
        self.next_result().max(0) as u32
    }

    fn roll_3d6(&mut self) -> i32 {
        self.next_result()
    }
}
