//! Player bookkeeping: per-round score and cross-round win tally.

/// One seat's scores. The round engine is the only writer of both fields;
/// session tasks never touch them.
#[derive(Clone, Debug)]
pub struct Player {
    name: String,
    round_score: u32,
    win_tally: u32,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Player {
            name: name.into(),
            round_score: 0,
            win_tally: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn round_score(&self) -> u32 {
        self.round_score
    }

    /// Cumulative wins across rounds; only ever increments.
    pub fn win_tally(&self) -> u32 {
        self.win_tally
    }

    /// Add a dealt card's value to this round's score.
    pub fn add(&mut self, value: u32) {
        self.round_score += value;
    }

    pub fn record_win(&mut self) {
        self.win_tally += 1;
    }

    /// Clear the round score; the tally survives.
    pub fn reset_round(&mut self) {
        self.round_score = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_reset_keeps_tally() {
        let mut p = Player::new("Ann");
        p.add(10);
        p.add(9);
        p.record_win();
        assert_eq!(p.round_score(), 19);
        p.reset_round();
        assert_eq!(p.round_score(), 0);
        assert_eq!(p.win_tally(), 1);
    }
}
