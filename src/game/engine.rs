//! The round engine: drives a full deal → ask → dealer-play → resolve cycle
//! per round, for a configured number of rounds.
//!
//! The engine runs on the single driver task and is the only writer of the
//! deck, the dealer and every score field. Session tasks feed it readiness
//! and intents through their own channels; it feeds them state back through
//! coordinator broadcasts, delivered in registry order.

use anyhow::Result;
use tokio::time::sleep;

use crate::cards::Deck;
use crate::config::Pacing;
use crate::game::dealer::DeckExhausted;
use crate::game::{Dealer, Player};
use crate::pretty;
use crate::protocol::{ServerMsg, WinOutcome};
use crate::server::{Coordinator, Intent, Session};

/// A hand above this score is busted.
pub const BUST_LIMIT: u32 = 21;

/// Outcome of one round's resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Dealer busted; every player active this round wins.
    EveryoneWins,
    /// No active player beat the dealer (ties go to the dealer).
    DealerWins,
    /// Two or more players share the best score; nobody wins.
    Draw,
    /// Exactly one best score; the slot index of its owner.
    Winner(usize),
}

pub struct RoundEngine {
    deck: Deck,
    dealer: Dealer,
    players: Vec<Player>,
    /// Which slots were dealt into this round; snapshot of readiness taken
    /// at the initial deal.
    active: Vec<bool>,
    current_round: u32,
    max_rounds: u32,
    pacing: Pacing,
}

impl RoundEngine {
    pub fn new(max_rounds: u32, pacing: Pacing) -> Self {
        RoundEngine {
            deck: Deck::new(),
            dealer: Dealer::new(),
            players: Vec::new(),
            active: Vec::new(),
            current_round: 0,
            max_rounds,
            pacing,
        }
    }

    pub fn has_more_rounds(&self) -> bool {
        self.current_round < self.max_rounds
    }

    /// Deck and dealer back to fresh state between rounds.
    fn reset(&mut self) {
        self.dealer.reset();
        self.deck.reset();
    }

    /// Run the whole game: readiness barrier, then rounds until the
    /// configured count, then the game-over handoff.
    pub async fn run(&mut self, coord: &Coordinator) -> Result<()> {
        pretty::log_game("waiting for all players to ready up");
        coord.wait_all_ready().await;

        let sessions = coord.sessions().await;
        self.players = sessions.iter().map(|s| Player::new(s.name())).collect();
        self.active = vec![false; sessions.len()];
        pretty::log_game(&format!(
            "all {} player(s) ready, starting game",
            sessions.len()
        ));

        sleep(self.pacing.resolve()).await;

        let mut first_round = true;
        while self.has_more_rounds() {
            self.play_round(coord, &sessions, first_round).await?;
            self.reset();
            sleep(self.pacing.round()).await;
            first_round = false;
        }

        coord.broadcast(&ServerMsg::GameOver).await;
        coord.broadcast(&ServerMsg::Quit).await;
        pretty::log_game("game over");
        Ok(())
    }

    async fn play_round(
        &mut self,
        coord: &Coordinator,
        sessions: &[std::sync::Arc<Session>],
        first_round: bool,
    ) -> Result<()> {
        pretty::log_game(&format!(
            "round {} of {}",
            self.current_round + 1,
            self.max_rounds
        ));
        coord.broadcast(&ServerMsg::StartRound).await;
        sleep(self.pacing.resolve()).await;

        if first_round {
            coord
                .broadcast(&ServerMsg::Message("Welcome to Pirates Pontoon".into()))
                .await;
        }

        self.deal_all(coord, sessions).await?;
        self.ask_each(coord, sessions).await?;

        self.dealer.deal_self(&mut self.deck)?;
        sleep(self.pacing.resolve()).await;

        self.resolve(coord).await;
        self.current_round += 1;
        sleep(self.pacing.resolve()).await;

        coord.broadcast(&ServerMsg::EndRound).await;
        sleep(self.pacing.resolve()).await;

        let ready: Vec<bool> = sessions.iter().map(|s| s.is_ready()).collect();
        let scores = high_scores_line(&self.players, &ready);
        coord.broadcast(&ServerMsg::HighScores(scores)).await;
        Ok(())
    }

    /// Deal two cards to every ready slot, broadcasting each draw and a
    /// two-card summary. Also snapshots which slots are active this round.
    async fn deal_all(
        &mut self,
        coord: &Coordinator,
        sessions: &[std::sync::Arc<Session>],
    ) -> Result<(), DeckExhausted> {
        for (i, session) in sessions.iter().enumerate() {
            self.active[i] = session.is_ready();
            if !self.active[i] {
                continue;
            }
            let name = self.players[i].name().to_string();

            let first = self.dealer.deal_to(&mut self.deck, &mut self.players[i])?;
            coord
                .broadcast(&ServerMsg::DealCard {
                    player: name.clone(),
                    card: first,
                })
                .await;
            sleep(self.pacing.deal()).await;

            let second = self.dealer.deal_to(&mut self.deck, &mut self.players[i])?;
            coord
                .broadcast(&ServerMsg::DealCard {
                    player: name.clone(),
                    card: second,
                })
                .await;

            coord.broadcast(&ServerMsg::End).await;
            coord
                .broadcast(&ServerMsg::Message(format!(
                    "{} was dealt two cards: A {} of {} and a {} of {}",
                    name,
                    first.rank.name(),
                    first.suit.name(),
                    second.rank.name(),
                    second.suit.name()
                )))
                .await;
            sleep(self.pacing.summary()).await;
        }
        Ok(())
    }

    /// Run the ask-loop for every active slot in registry order: prompt,
    /// consume one intent, deal or hold, until the player holds or busts.
    /// A slot that goes unready mid-ask resolves as a forced hold.
    async fn ask_each(
        &mut self,
        coord: &Coordinator,
        sessions: &[std::sync::Arc<Session>],
    ) -> Result<(), DeckExhausted> {
        for (i, session) in sessions.iter().enumerate() {
            if !self.active[i] || !session.is_ready() {
                continue;
            }
            let name = self.players[i].name().to_string();
            let mut first_ask = true;

            loop {
                session.clear_intent().await;
                session.send(ServerMsg::Ask.to_string());
                if first_ask {
                    coord
                        .broadcast(&ServerMsg::AskNotice(format!(
                            "{} was asked by the dealer whether to Deal or Hold",
                            name
                        )))
                        .await;
                    first_ask = false;
                }

                match session.next_intent().await {
                    Some(Intent::Deal) => {
                        coord
                            .broadcast(&ServerMsg::AskNotice(format!("{} chose to Deal", name)))
                            .await;
                        let card = self.dealer.deal_to(&mut self.deck, &mut self.players[i])?;
                        coord
                            .broadcast(&ServerMsg::DealCard {
                                player: name.clone(),
                                card,
                            })
                            .await;
                        coord.broadcast(&ServerMsg::End).await;
                        coord
                            .broadcast(&ServerMsg::Message(format!(
                                "{} was dealt a {} of {}",
                                name,
                                card.rank.name(),
                                card.suit.name()
                            )))
                            .await;

                        if self.players[i].round_score() > BUST_LIMIT {
                            coord
                                .broadcast(&ServerMsg::Message(format!("{} was busted!", name)))
                                .await;
                            break;
                        }
                    }
                    Some(Intent::Hold) => {
                        coord
                            .broadcast(&ServerMsg::AskNotice(format!("{} chose to Hold", name)))
                            .await;
                        break;
                    }
                    // Disconnected mid-ask: end the loop without a choice.
                    None => break,
                }
            }
            sleep(self.pacing.resolve()).await;
        }
        Ok(())
    }

    /// Announce the dealer's hand, apply the winner determination and reset
    /// every round score.
    async fn resolve(&mut self, coord: &Coordinator) {
        let dealer_score = self.dealer.score();
        coord.broadcast(&ServerMsg::DealerScore(dealer_score)).await;
        coord
            .broadcast(&ServerMsg::Message(
                "The dealer has been dealt his cards".into(),
            ))
            .await;
        sleep(self.pacing.resolve()).await;

        match resolve_round(dealer_score, &self.players, &self.active) {
            RoundOutcome::EveryoneWins => {
                for (i, player) in self.players.iter_mut().enumerate() {
                    if self.active[i] {
                        player.record_win();
                    }
                }
                coord
                    .broadcast(&ServerMsg::Message(format!(
                        "The dealer had a score of {} and lost this round. Everyone wins",
                        dealer_score
                    )))
                    .await;
                coord.broadcast(&ServerMsg::Win(WinOutcome::All)).await;
            }
            RoundOutcome::DealerWins => {
                coord
                    .broadcast(&ServerMsg::Message("The dealer wins this round".into()))
                    .await;
                coord.broadcast(&ServerMsg::Win(WinOutcome::Dealer)).await;
            }
            RoundOutcome::Draw => {
                coord
                    .broadcast(&ServerMsg::Message("Draw! Nobody wins this round".into()))
                    .await;
            }
            RoundOutcome::Winner(index) => {
                self.players[index].record_win();
                coord
                    .broadcast(&ServerMsg::Message(format!(
                        "{} wins this round",
                        self.players[index].name()
                    )))
                    .await;
                coord
                    .broadcast(&ServerMsg::Win(WinOutcome::Seat(index)))
                    .await;
            }
        }

        for player in &mut self.players {
            player.reset_round();
        }
    }
}

/// Winner determination for one round. Pure so the tie-break and bust rules
/// can be tested without sockets.
pub fn resolve_round(dealer_score: u32, players: &[Player], active: &[bool]) -> RoundOutcome {
    if dealer_score > BUST_LIMIT {
        return RoundOutcome::EveryoneWins;
    }

    // Best active score that beats the dealer without busting. Ties go to
    // the dealer because only strictly better scores qualify.
    let mut best: Option<(usize, u32)> = None;
    for (i, player) in players.iter().enumerate() {
        if !active[i] {
            continue;
        }
        let score = player.round_score();
        if score > dealer_score && score <= BUST_LIMIT && best.map_or(true, |(_, b)| score >= b) {
            best = Some((i, score));
        }
    }

    match best {
        None => RoundOutcome::DealerWins,
        Some((index, max)) => {
            let holders = players
                .iter()
                .enumerate()
                .filter(|(i, p)| active[*i] && p.round_score() == max)
                .count();
            if holders > 1 {
                RoundOutcome::Draw
            } else {
                RoundOutcome::Winner(index)
            }
        }
    }
}

/// `name tally` pairs for ready slots in registry order, single-space
/// separated with no trailing space.
pub fn high_scores_line(players: &[Player], ready: &[bool]) -> String {
    players
        .iter()
        .enumerate()
        .filter(|(i, _)| ready[*i])
        .map(|(_, p)| format!("{} {}", p.name(), p.win_tally()))
        .collect::<Vec<_>>()
        .join(" ")
}
