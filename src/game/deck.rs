use super::mode::Mode;
use super::party::PolicyKind;
use crate::error::GameError;
use rand::prelude::SliceRandom;
use rand::Rng;
use std::iter::repeat;

/// The draw pile and discard pile. The front of `deck` is the top of the pile.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PolicyDeck {
    pub(super) deck: Vec<PolicyKind>,
    pub(super) discard: Vec<PolicyKind>,
    /// How many times the discard pile has been shuffled back in.
    pub(super) reshuffles: u32,
}

impl PolicyDeck {
    /// Creates a full, shuffled deck for the given mode and game size.
    pub fn new(mode: Mode, num_players: usize, rng: &mut impl Rng) -> Self {
        let mut deck: Vec<PolicyKind> = mode
            .deck_composition(num_players)
            .into_iter()
            .flat_map(|(kind, count)| repeat(kind).take(count))
            .collect();
        deck.shuffle(rng);
        Self { deck, discard: vec![], reshuffles: 0 }
    }

    /// The number of cards in the draw pile.
    pub fn count(&self) -> usize {
        self.deck.len()
    }

    /// The number of cards in the discard pile.
    pub fn discard_count(&self) -> usize {
        self.discard.len()
    }

    pub fn reshuffles(&self) -> u32 {
        self.reshuffles
    }

    /// Draws the top `n` cards, shuffling the discard pile back in first if the draw pile is short.
    /// Nothing is moved if the two piles together hold fewer than `n` cards.
    pub fn draw(&mut self, n: usize, rng: &mut impl Rng) -> Result<Vec<PolicyKind>, GameError> {
        self.ensure(n, rng)?;
        Ok(self.deck.drain(..n).collect())
    }

    /// Looks at the top `n` cards without removing them, reshuffling under the same rule as [`draw`].
    ///
    /// [`draw`]: PolicyDeck::draw
    pub fn peek(&mut self, n: usize, rng: &mut impl Rng) -> Result<Vec<PolicyKind>, GameError> {
        self.ensure(n, rng)?;
        Ok(self.deck[..n].to_vec())
    }

    /// Places cards on the discard pile.
    pub fn discard(&mut self, cards: impl IntoIterator<Item = PolicyKind>) {
        self.discard.extend(cards);
    }

    fn ensure(&mut self, n: usize, rng: &mut impl Rng) -> Result<(), GameError> {
        if self.deck.len() >= n {
            return Ok(());
        }
        let available = self.deck.len() + self.discard.len();
        if available < n {
            return Err(GameError::InsufficientCards { requested: n, available });
        }
        self.reshuffle(rng);
        Ok(())
    }

    /// Shuffles the discard pile into the draw pile.
    fn reshuffle(&mut self, rng: &mut impl Rng) {
        log::info!(
            "Reshuffling {} discarded policies into a draw pile of {}",
            self.discard.len(),
            self.deck.len()
        );
        self.deck.append(&mut self.discard);
        self.deck.shuffle(rng);
        self.reshuffles += 1;
    }
}
