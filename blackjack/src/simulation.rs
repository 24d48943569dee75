pub mod hand;
pub mod shoe;

use crate::{
    strategy::{DecisionQuery, Strategy},
    CountingSystem, Decision, Error, Rule,
};
use blackjack_edge_macros::allowed_phase;
use strum_macros::EnumIter;

use self::{
    hand::{is_blackjack, Hand, HandValue},
    shoe::Shoe,
};

static FACE_VALUE_TO_BLACKJACK_VALUE: [u8; 13] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 10, 10];

#[derive(Debug, Clone, Copy, PartialEq, EnumIter)]
pub(crate) enum Suit {
    Diamond = 0,
    Club,
    Heart,
    Spade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    PlaceBet,
    DealInitialCards,
    EarlySurrender,
    PlayPlayer,
    DealerPlays,
    Summary,
}

/// Bet spread driven by the true count: 4x at +4, 2x at +2, half at -3.
pub fn bet_multiplier(true_count: Option<f64>) -> f64 {
    match true_count {
        Some(tc) if tc >= 4.0 => 4.0,
        Some(tc) if tc >= 2.0 => 2.0,
        Some(tc) if tc <= -3.0 => 0.5,
        _ => 1.0,
    }
}

/// Signed result of one player group against the dealer, in money.
pub fn settle(player_hand: &Hand, group_index: usize, dealer_cards: &[u8], payout_blackjack: f64) -> f64 {
    let bet = player_hand.get_bet(group_index);
    if player_hand.is_surrendered(group_index) {
        return -bet / 2.0;
    }

    let player_natural = player_hand.is_natural();
    let dealer_natural = is_blackjack(dealer_cards);
    if player_natural {
        return if dealer_natural {
            0.0
        } else {
            bet * (1.0 + payout_blackjack)
        };
    }
    if dealer_natural {
        return -bet;
    }

    let player_total = player_hand.get_value(group_index).total;
    let dealer_total = HandValue::of(dealer_cards).total;
    if player_total > 21 {
        -bet
    } else if dealer_total > 21 {
        bet
    } else if player_total > dealer_total {
        bet
    } else if player_total < dealer_total {
        -bet
    } else {
        0.0
    }
}

/// Plays rounds of one player against the dealer on its own shoe.
///
/// A round walks through the phases in `RoundPhase` order. `play_round` drives
/// a whole round; every step is also callable on its own and fails with
/// `Error::WrongPhase` when called out of order.
pub struct Simulator {
    rule: Rule,
    shoe: Shoe,

    // Round state
    current_round_phase: RoundPhase,
    true_count: Option<f64>,
    dealer_cards: Vec<u8>,
    player_hand: Hand,
}

impl Simulator {
    pub fn new(rule: &Rule, shoe: Shoe) -> Self {
        Self {
            rule: *rule,
            shoe,
            current_round_phase: RoundPhase::PlaceBet,
            true_count: None,
            dealer_cards: Vec::with_capacity(6),
            player_hand: Hand::new(),
        }
    }

    /// Plays a complete round and returns its net result in money.
    /// Can be called at PlaceBet phase.
    pub fn play_round<T: Strategy, U: SimulatorEventHandler>(
        &mut self,
        base_bet: f64,
        strategy: &mut T,
        handler: &mut U,
    ) -> Result<f64, Error> {
        let shuffles = self.current_round_phase == RoundPhase::PlaceBet && self.shoe.needs_reshuffle();
        let bet = self.place_bet(base_bet)?;
        if shuffles {
            handler.on_shuffle(&self.shoe);
        }
        handler.on_bet_money(bet, self.true_count);

        self.deal_initial_cards()?;
        handler.on_deal_cards(self.player_hand.get_cards(0), &self.dealer_cards);

        self.check_early_surrender(strategy)?;
        if self.current_round_phase == RoundPhase::PlayPlayer {
            self.play_player_hands(strategy, handler)?;
            self.dealer_plays()?;
        } else {
            handler.on_round_early_end(&self.player_hand, &self.dealer_cards);
        }

        let net = self.summary()?;
        handler.on_summary_round(&self.player_hand, &self.dealer_cards, net);
        Ok(net)
    }

    /// Can be called at PlaceBet phase.
    /// Starts a new round: reshuffles the shoe if it runs low, reads the true
    /// count and places `base_bet` scaled by the count. Returns the bet placed.
    #[allowed_phase(PlaceBet)]
    pub fn place_bet(&mut self, base_bet: f64) -> Result<f64, Error> {
        if !base_bet.is_finite() || base_bet <= 0.0 {
            return Err(Error::InvalidBet(base_bet));
        }
        self.new_round();

        if self.shoe.needs_reshuffle() {
            self.shoe.shuffle();
        }
        self.true_count = match self.rule.counting_system {
            CountingSystem::HiLo => Some(self.shoe.true_count()),
            CountingSystem::NoCount => None,
        };

        let bet = base_bet * bet_multiplier(self.true_count);
        self.player_hand.set_original_bet(bet);
        self.current_round_phase = RoundPhase::DealInitialCards;
        Ok(bet)
    }

    /// Can be called at DealInitialCards phase.
    /// Deals two cards to the dealer, then two to the player.
    #[allowed_phase(DealInitialCards)]
    pub fn deal_initial_cards(&mut self) -> Result<(), Error> {
        for _ in 0..2 {
            let card = self.shoe.deal_card();
            self.dealer_cards.push(card);
        }
        for _ in 0..2 {
            let card = self.shoe.deal_card();
            self.player_hand.receive_card(0, card);
        }
        self.current_round_phase = RoundPhase::EarlySurrender;
        Ok(())
    }

    /// Can be called at EarlySurrender phase.
    /// Asks the strategy, with hitting not allowed, whether to give up the hand
    /// before anything else happens. Returns true if the player surrendered.
    ///
    /// Surrender wins over naturals on either side. Without a surrender, a
    /// natural on either side ends the round before any play.
    #[allowed_phase(EarlySurrender)]
    pub fn check_early_surrender<T: Strategy>(&mut self, strategy: &mut T) -> Result<bool, Error> {
        let query = self.decision_query(0, false);
        let surrendered = strategy.make_decision(&self.rule, &query) == Decision::Surrender;
        if surrendered {
            self.player_hand.surrender(0);
        }

        let anyone_natural = self.player_hand.is_natural() || is_blackjack(&self.dealer_cards);
        self.current_round_phase = if surrendered || anyone_natural {
            RoundPhase::Summary
        } else {
            RoundPhase::PlayPlayer
        };
        Ok(surrendered)
    }

    /// Can be called at PlayPlayer phase.
    /// Plays every player group to the end, including groups created by
    /// splitting while playing.
    ///
    /// A group that was split is visited again, since it now holds a new
    /// second card and may be played or split once more. Split Aces receive a
    /// single card and stand, unless resplitting Aces is allowed, the group is
    /// a pair again and more hands are still allowed.
    #[allowed_phase(PlayPlayer)]
    pub fn play_player_hands<T: Strategy, U: SimulatorEventHandler>(
        &mut self,
        strategy: &mut T,
        handler: &mut U,
    ) -> Result<(), Error> {
        let mut group_index = 0;
        while group_index < self.player_hand.get_number_of_groups() {
            if self.player_hand.is_split_ace(group_index) {
                let can_resplit = self.rule.allow_resplit_aces && self.player_hand.is_pair(group_index);
                if !can_resplit || self.reached_split_hands_limit() {
                    group_index += 1;
                    continue;
                }
            }

            match self.play_group(group_index, strategy, handler)? {
                Decision::Split => {
                    self.split_group(group_index);
                    handler.on_split(&self.player_hand);
                }
                _ => group_index += 1,
            }
        }

        self.current_round_phase = RoundPhase::DealerPlays;
        Ok(())
    }

    /// Can be called at DealerPlays phase.
    /// Dealer draws to 17, and on soft 17 as well if the rule says so.
    #[allowed_phase(DealerPlays)]
    pub fn dealer_plays(&mut self) -> Result<(), Error> {
        loop {
            let value = HandValue::of(&self.dealer_cards);
            let must_stand = {
                if value.total > 17 {
                    true
                } else if value.total < 17 {
                    false
                } else {
                    !(value.soft && self.rule.dealer_hit_on_soft17)
                }
            };
            if must_stand {
                break;
            }
            let card = self.shoe.deal_card();
            self.dealer_cards.push(card);
        }

        self.current_round_phase = RoundPhase::Summary;
        Ok(())
    }

    /// Can be called at Summary phase.
    /// Settles every group and returns the net result of the round in money:
    /// positive when the player wins.
    #[allowed_phase(Summary)]
    pub fn summary(&mut self) -> Result<f64, Error> {
        let net: f64 = (0..self.player_hand.get_number_of_groups())
            .map(|i| settle(&self.player_hand, i, &self.dealer_cards, self.rule.payout_blackjack))
            .sum();
        self.current_round_phase = RoundPhase::PlaceBet;
        Ok(net)
    }

    pub fn reached_split_hands_limit(&self) -> bool {
        self.player_hand.get_number_of_groups() >= self.rule.max_split_hands as usize
    }

    pub fn get_shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn get_current_round_phase(&self) -> RoundPhase {
        self.current_round_phase
    }

    pub fn get_true_count(&self) -> Option<f64> {
        self.true_count
    }

    pub fn get_player_hand(&self) -> &Hand {
        &self.player_hand
    }

    pub fn get_dealer_cards(&self) -> &[u8] {
        &self.dealer_cards
    }

    fn decision_query(&self, group_index: usize, hit_allowed: bool) -> DecisionQuery<'_> {
        DecisionQuery {
            cards: self.player_hand.get_cards(group_index),
            dealer_up_card: self.dealer_cards[0],
            number_of_hands: self.player_hand.get_number_of_groups(),
            hit_allowed,
            true_count: self.true_count,
        }
    }

    /// Asks the strategy until the group is finished. Returns the last
    /// decision; `Split` is left to the caller.
    fn play_group<T: Strategy, U: SimulatorEventHandler>(
        &mut self,
        group_index: usize,
        strategy: &mut T,
        handler: &mut U,
    ) -> Result<Decision, Error> {
        loop {
            let query = self.decision_query(group_index, true);
            let decision = strategy.make_decision(&self.rule, &query);
            handler.on_make_decision(decision, group_index, query.cards);

            match decision {
                Decision::Stand => return Ok(decision),
                Decision::Hit => {
                    let card = self.shoe.deal_card();
                    self.player_hand.receive_card(group_index, card);
                    if self.player_hand.get_value(group_index).bust() {
                        handler.on_player_bust(group_index);
                        return Ok(decision);
                    }
                }
                Decision::Double => {
                    let card = self.shoe.deal_card();
                    self.player_hand.receive_card(group_index, card);
                    self.player_hand.double_down(group_index);
                    if self.player_hand.get_value(group_index).bust() {
                        handler.on_player_bust(group_index);
                    }
                    return Ok(decision);
                }
                Decision::Surrender => {
                    if self.player_hand.get_number_of_groups() != 1
                        || self.player_hand.get_cards(group_index).len() != 2
                    {
                        return Err(Error::IllegalDecision {
                            decision,
                            reason: "surrender is only allowed as the first decision",
                        });
                    }
                    self.player_hand.surrender(group_index);
                    return Ok(decision);
                }
                Decision::Split => {
                    if !self.player_hand.is_pair(group_index) {
                        return Err(Error::IllegalDecision {
                            decision,
                            reason: "only a two-card pair can be split",
                        });
                    }
                    if self.reached_split_hands_limit() {
                        return Err(Error::IllegalDecision {
                            decision,
                            reason: "maximum number of split hands reached",
                        });
                    }
                    return Ok(decision);
                }
            }
        }
    }

    /// The new group is dealt its second card before the group it came from.
    fn split_group(&mut self, group_index: usize) {
        let new_group_index = self.player_hand.split_group(group_index);
        let card = self.shoe.deal_card();
        self.player_hand.receive_card(new_group_index, card);
        let card = self.shoe.deal_card();
        self.player_hand.receive_card(group_index, card);
    }

    fn new_round(&mut self) {
        self.dealer_cards.clear();
        self.player_hand.clear();
        self.true_count = None;
    }
}

/// Observes a round while it is played. Every method does nothing by default.
pub trait SimulatorEventHandler {
    fn on_shuffle(&mut self, _shoe: &Shoe) {}
    fn on_bet_money(&mut self, _bet: f64, _true_count: Option<f64>) {}
    fn on_deal_cards(&mut self, _player_cards: &[u8], _dealer_cards: &[u8]) {}
    fn on_round_early_end(&mut self, _player_hand: &Hand, _dealer_cards: &[u8]) {}
    fn on_make_decision(&mut self, _decision: Decision, _group_index: usize, _cards: &[u8]) {}
    fn on_split(&mut self, _player_hand: &Hand) {}
    fn on_player_bust(&mut self, _group_index: usize) {}
    fn on_summary_round(&mut self, _player_hand: &Hand, _dealer_cards: &[u8], _net: f64) {}
}

impl SimulatorEventHandler for () {}

/// Writes every round event to the `log` facade at debug and trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler;

impl SimulatorEventHandler for LoggingHandler {
    fn on_shuffle(&mut self, shoe: &Shoe) {
        log::debug!("shuffle {} decks", shoe.number_of_decks());
    }

    fn on_bet_money(&mut self, bet: f64, true_count: Option<f64>) {
        match true_count {
            Some(tc) => log::debug!("bet {} at true count {:.2}", bet, tc),
            None => log::debug!("bet {}", bet),
        }
    }

    fn on_deal_cards(&mut self, player_cards: &[u8], dealer_cards: &[u8]) {
        log::trace!("player cards {:?}, dealer card {}", player_cards, dealer_cards[0]);
    }

    fn on_round_early_end(&mut self, player_hand: &Hand, dealer_cards: &[u8]) {
        if player_hand.is_surrendered(0) {
            log::debug!("surrendered");
        } else if player_hand.is_natural() && is_blackjack(dealer_cards) {
            log::debug!("everyone has blackjack");
        } else if player_hand.is_natural() {
            log::debug!("player has blackjack");
        } else {
            log::debug!("dealer has blackjack");
        }
    }

    fn on_make_decision(&mut self, decision: Decision, group_index: usize, cards: &[u8]) {
        log::trace!("group {} {:?}: {}", group_index, cards, decision);
    }

    fn on_split(&mut self, player_hand: &Hand) {
        log::trace!("split into {} hands", player_hand.get_number_of_groups());
    }

    fn on_player_bust(&mut self, group_index: usize) {
        log::trace!("group {} busted", group_index);
    }

    fn on_summary_round(&mut self, player_hand: &Hand, dealer_cards: &[u8], net: f64) {
        for group_index in 0..player_hand.get_number_of_groups() {
            log::debug!(
                "player cards {:?} bet {}",
                player_hand.get_cards(group_index),
                player_hand.get_bet(group_index)
            );
        }
        log::debug!("dealer cards {:?}, round outcome {}", dealer_cards, net);
    }
}
