//! Card and deck types for pontoon.

use rand::Rng;

/// Card suits, in the order they are laid into a fresh deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

pub const SUITS: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

impl Suit {
    /// Wire name of the suit.
    pub fn name(self) -> &'static str {
        match self {
            Suit::Clubs => "Clubs",
            Suit::Diamonds => "Diamonds",
            Suit::Hearts => "Hearts",
            Suit::Spades => "Spades",
        }
    }
}

/// Card ranks (0=Ace .. 12=King).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rank {
    Ace = 0,
    Two = 1,
    Three = 2,
    Four = 3,
    Five = 4,
    Six = 5,
    Seven = 6,
    Eight = 7,
    Nine = 8,
    Ten = 9,
    Jack = 10,
    Queen = 11,
    King = 12,
}

pub const RANKS: [Rank; 13] = [
    Rank::Ace,
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
];

impl Rank {
    /// Wire name of the rank.
    pub fn name(self) -> &'static str {
        match self {
            Rank::Ace => "Ace",
            Rank::Two => "Two",
            Rank::Three => "Three",
            Rank::Four => "Four",
            Rank::Five => "Five",
            Rank::Six => "Six",
            Rank::Seven => "Seven",
            Rank::Eight => "Eight",
            Rank::Nine => "Nine",
            Rank::Ten => "Ten",
            Rank::Jack => "Jack",
            Rank::Queen => "Queen",
            Rank::King => "King",
        }
    }
}

/// A single playing card. Immutable once created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Card { suit, rank }
    }

    /// Pontoon value: ace counts 1, court cards cap at 10.
    pub fn value(self) -> u32 {
        let index = self.rank as u32;
        if index >= 10 {
            10
        } else {
            index + 1
        }
    }
}

/// A shrinking pool of cards drawn without replacement, refilled between
/// rounds. Within a round no (suit, rank) pair can come out twice.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// A fresh, full 52-card deck.
    pub fn new() -> Self {
        let mut deck = Deck { cards: Vec::with_capacity(52) };
        deck.fill();
        deck
    }

    fn fill(&mut self) {
        for suit in SUITS {
            for rank in RANKS {
                self.cards.push(Card::new(suit, rank));
            }
        }
    }

    /// Discard whatever is left and rebuild the full set.
    pub fn reset(&mut self) {
        self.cards.clear();
        self.fill();
    }

    /// Remove and return a uniformly random card, or `None` once exhausted.
    pub fn draw(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            return None;
        }
        let index = rand::rng().random_range(0..self.cards.len());
        Some(self.cards.swap_remove(index))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Deck::new()
    }
}
