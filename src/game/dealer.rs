//! The house dealer: draws into players and into its own hand.

use thiserror::Error;

use crate::cards::{Card, Deck};
use crate::game::Player;

/// The dealer keeps drawing while at or below this score.
pub const DEALER_STAND_THRESHOLD: u32 = 16;

/// A draw was requested from an empty deck. Practically unreachable with at
/// most four players against 52 cards, but the round engine treats it as a
/// fatal round condition rather than panicking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("deck exhausted mid-round")]
pub struct DeckExhausted;

#[derive(Clone, Debug, Default)]
pub struct Dealer {
    score: u32,
}

impl Dealer {
    pub fn new() -> Self {
        Dealer { score: 0 }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Draw one card into `player` and return it for broadcasting.
    pub fn deal_to(&self, deck: &mut Deck, player: &mut Player) -> Result<Card, DeckExhausted> {
        let card = deck.draw().ok_or(DeckExhausted)?;
        player.add(card.value());
        Ok(card)
    }

    /// House rules: hit while score <= 16, stand at 17 or more. The dealer
    /// never stops early to dodge a bust.
    pub fn deal_self(&mut self, deck: &mut Deck) -> Result<(), DeckExhausted> {
        while self.score <= DEALER_STAND_THRESHOLD {
            let card = deck.draw().ok_or(DeckExhausted)?;
            self.score += card.value();
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.score = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dealer_always_stands_at_seventeen_or_more() {
        for _ in 0..50 {
            let mut deck = Deck::new();
            let mut dealer = Dealer::new();
            dealer.deal_self(&mut deck).unwrap();
            assert!(dealer.score() >= 17, "dealer stopped at {}", dealer.score());
        }
    }

    #[test]
    fn deal_to_adds_card_value() {
        let mut deck = Deck::new();
        let dealer = Dealer::new();
        let mut player = Player::new("Ann");
        let card = dealer.deal_to(&mut deck, &mut player).unwrap();
        assert_eq!(player.round_score(), card.value());
        assert_eq!(deck.len(), 51);
    }

    #[test]
    fn empty_deck_signals_exhaustion() {
        let mut deck = Deck::new();
        while deck.draw().is_some() {}
        let dealer = Dealer::new();
        let mut player = Player::new("Ann");
        assert_eq!(dealer.deal_to(&mut deck, &mut player), Err(DeckExhausted));
        let mut dealer = Dealer::new();
        assert_eq!(dealer.deal_self(&mut deck), Err(DeckExhausted));
    }

    #[test]
    fn reset_clears_score() {
        let mut deck = Deck::new();
        let mut dealer = Dealer::new();
        dealer.deal_self(&mut deck).unwrap();
        dealer.reset();
        assert_eq!(dealer.score(), 0);
    }
}
