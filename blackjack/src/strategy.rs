use crate::{simulation::hand::HandValue, Decision, Rule, StrategyComplexity};

/// What the table shows a strategy before asking for a decision.
#[derive(Debug, Clone, Copy)]
pub struct DecisionQuery<'a> {
    pub cards: &'a [u8],
    pub dealer_up_card: u8,
    /// Number of hands the player holds right now, including split ones.
    pub number_of_hands: usize,
    /// False only for the early surrender check made before any other play.
    /// Only `Surrender` is acted upon for such a query.
    pub hit_allowed: bool,
    /// Live true count of the shoe. `None` when no counting system is used.
    pub true_count: Option<f64>,
}

/// The playing oracle. Whatever it returns is played as long as the table
/// state allows it; see `Simulator::play_player_hands`.
pub trait Strategy {
    fn make_decision(&mut self, rule: &Rule, query: &DecisionQuery) -> Decision;
}

impl<F> Strategy for F
where
    F: FnMut(&Rule, &DecisionQuery) -> Decision,
{
    fn make_decision(&mut self, rule: &Rule, query: &DecisionQuery) -> Decision {
        self(rule, query)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysStand;

impl Strategy for AlwaysStand {
    fn make_decision(&mut self, _: &Rule, _: &DecisionQuery) -> Decision {
        Decision::Stand
    }
}

/// First decision is preferred, second one is played when the first is not
/// available for the current hand.
type Cell = (Decision, Decision);

#[derive(Debug, Clone)]
pub struct BasicStrategy {
    hard_charts: [[Cell; 10]; 14],
    soft_charts: [[Cell; 10]; 9],
    pair_charts: [[Cell; 10]; 10],
}

impl BasicStrategy {
    pub fn new(rule: &Rule) -> BasicStrategy {
        const H: Cell = (Decision::Hit, Decision::Hit);
        const S: Cell = (Decision::Stand, Decision::Stand);
        const P: Cell = (Decision::Split, Decision::Split);
        const DH: Cell = (Decision::Double, Decision::Hit);
        const DS: Cell = (Decision::Double, Decision::Stand);
        const RH: Cell = (Decision::Surrender, Decision::Hit);
        const RS: Cell = (Decision::Surrender, Decision::Stand);
        const RP: Cell = (Decision::Surrender, Decision::Split);

        // Columns are the dealer up card: A, 2, 3, ..., 10.
        let eleven_vs_ace = if rule.dealer_hit_on_soft17 { DH } else { H };
        let hard_charts = [
            [H, H, H, H, H, H, H, H, H, H], // 5
            [H, H, H, H, H, H, H, H, H, H],
            [H, H, H, H, H, H, H, H, H, H],
            [H, H, H, H, H, H, H, H, H, H],
            [H, H, DH, DH, DH, DH, H, H, H, H],
            [H, DH, DH, DH, DH, DH, DH, DH, DH, H],
            [eleven_vs_ace, DH, DH, DH, DH, DH, DH, DH, DH, DH],
            [H, H, H, S, S, S, H, H, H, H],
            [H, S, S, S, S, S, H, H, H, H],
            [H, S, S, S, S, S, H, H, H, H],
            [RH, S, S, S, S, S, H, H, H, RH],
            [RH, S, S, S, S, S, H, H, RH, RH],
            [RS, S, S, S, S, S, S, S, S, S], // 17
            [S, S, S, S, S, S, S, S, S, S],  // 18, 18+
        ];
        let soft_charts = [
            [H, H, H, H, DH, DH, H, H, H, H], // Ace + 2
            [H, H, H, H, DH, DH, H, H, H, H],
            [H, H, H, DH, DH, DH, H, H, H, H],
            [H, H, H, DH, DH, DH, H, H, H, H],
            [H, H, DH, DH, DH, DH, H, H, H, H],
            [H, DS, DS, DS, DS, DS, S, S, H, H],
            [S, S, S, S, S, DS, S, S, S, S],
            [S, S, S, S, S, S, S, S, S, S], // Ace + 9
            [S, S, S, S, S, S, S, S, S, S], // Ace + 10
        ];
        let pair_charts = [
            [P, P, P, P, P, P, P, P, P, P], // Double Ace
            [H, P, P, P, P, P, P, H, H, H], // Double 2
            [H, P, P, P, P, P, P, H, H, H],
            [H, H, H, H, P, P, H, H, H, H],
            [H, DH, DH, DH, DH, DH, DH, DH, DH, H],
            [H, P, P, P, P, P, H, H, H, H],
            [H, P, P, P, P, P, P, H, H, H],
            [RP, P, P, P, P, P, P, P, P, P],
            [S, P, P, P, P, P, S, P, P, S],
            [S, S, S, S, S, S, S, S, S, S], // Double 10
        ];

        BasicStrategy {
            hard_charts,
            soft_charts,
            pair_charts,
        }
    }

    fn lookup(&self, query: &DecisionQuery, can_split: bool) -> Cell {
        let col = (query.dealer_up_card - 1) as usize;
        let value = HandValue::of(query.cards);

        if can_split {
            let row = (query.cards[0] - 1) as usize;
            self.pair_charts[row][col]
        } else if value.soft {
            // Soft 12 only comes from two Aces that cannot be split again.
            let another_card = value.total - 11;
            if another_card < 2 {
                (Decision::Hit, Decision::Hit)
            } else {
                self.soft_charts[(another_card - 2) as usize][col]
            }
        } else {
            let row = {
                if value.total <= 5 {
                    0
                } else if value.total >= 18 {
                    13
                } else {
                    value.total - 5
                }
            } as usize;
            self.hard_charts[row][col]
        }
    }
}

impl Strategy for BasicStrategy {
    fn make_decision(&mut self, rule: &Rule, query: &DecisionQuery) -> Decision {
        let cards = query.cards;
        let first_decision = cards.len() == 2 && query.number_of_hands == 1;
        let can_split = cards.len() == 2
            && cards[0] == cards[1]
            && query.number_of_hands < rule.max_split_hands as usize;
        let can_double = cards.len() == 2
            && rule.strategy_complexity != StrategyComplexity::Simple
            && (query.number_of_hands == 1 || rule.allow_das);
        let can_surrender = first_decision
            && rule.allow_late_surrender
            && rule.strategy_complexity != StrategyComplexity::Simple;

        let cell = self.lookup(query, can_split);
        let decision = match cell.0 {
            Decision::Double if !can_double => cell.1,
            Decision::Surrender if !can_surrender => cell.1,
            _ => cell.0,
        };

        let decision = match (rule.strategy_complexity, query.true_count) {
            (StrategyComplexity::Advanced, Some(true_count)) => {
                index_play(query, decision, true_count, can_split, can_double)
            }
            _ => decision,
        };

        if !query.hit_allowed && decision != Decision::Surrender {
            return Decision::Stand;
        }
        decision
    }
}

/// Hi-Lo index plays layered on top of the charts.
fn index_play(
    query: &DecisionQuery,
    decision: Decision,
    true_count: f64,
    can_split: bool,
    can_double: bool,
) -> Decision {
    if decision == Decision::Surrender {
        return decision;
    }
    let up = query.dealer_up_card;
    let value = HandValue::of(query.cards);

    if can_split && query.cards[0] == 10 {
        if (up == 5 && true_count >= 5.0) || (up == 6 && true_count >= 4.0) {
            return Decision::Split;
        }
        return decision;
    }
    if decision == Decision::Split || value.soft {
        return decision;
    }

    match (value.total, up) {
        (16, 10) if true_count >= 0.0 => Decision::Stand,
        (15, 10) if true_count >= 4.0 => Decision::Stand,
        (12, 3) if true_count >= 2.0 => Decision::Stand,
        (12, 2) if true_count >= 3.0 => Decision::Stand,
        (12, 4) if true_count < 0.0 => Decision::Hit,
        (13, 2) if true_count <= -1.0 => Decision::Hit,
        (11, 1) if can_double && true_count >= 1.0 => Decision::Double,
        (10, 10) | (10, 1) if can_double && true_count >= 4.0 => Decision::Double,
        (9, 2) if can_double && true_count >= 1.0 => Decision::Double,
        (9, 7) if can_double && true_count >= 3.0 => Decision::Double,
        _ => decision,
    }
}
