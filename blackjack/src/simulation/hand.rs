/// Best total of a group of cards and whether an Ace is counted as 11 in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandValue {
    pub total: u8,
    pub soft: bool,
}

impl HandValue {
    /// Evaluates blackjack values (Ace is 1). At most one Ace is promoted to
    /// 11, since promoting a second one always busts.
    pub fn of(cards: &[u8]) -> HandValue {
        let sum: u8 = cards.iter().sum();
        let has_ace = cards.contains(&1);
        if has_ace && sum <= 11 {
            HandValue {
                total: sum + 10,
                soft: true,
            }
        } else {
            HandValue {
                total: sum,
                soft: false,
            }
        }
    }

    pub fn bust(&self) -> bool {
        self.total > 21
    }
}

/// A natural: exactly two cards totalling 21.
pub fn is_blackjack(cards: &[u8]) -> bool {
    cards.len() == 2 && HandValue::of(cards).total == 21
}

/// Represents all the player's cards in a round. May contain more than 1 group
/// of cards because of split.
#[derive(Debug, Clone)]
pub struct Hand {
    groups: Vec<Group>,
}

impl Hand {
    pub fn new() -> Hand {
        Hand {
            groups: vec![Group::new(0.0)],
        }
    }

    /// The given group receives a given card.
    pub fn receive_card(&mut self, group_index: usize, card: u8) {
        self.groups[group_index].cards.push(card);
    }

    /// Moves the last card of the given group into a new group at the end,
    /// carrying the same bet. Both groups are marked as split Aces when the
    /// moved card is an Ace. Returns the index of the new group.
    pub fn split_group(&mut self, group_index: usize) -> usize {
        let group = &mut self.groups[group_index];
        let card = group
            .cards
            .pop()
            .unwrap_or_else(|| panic!("Cannot split an empty group!"));
        let split_ace = card == 1;
        if split_ace {
            group.split_ace = true;
        }

        let mut new_group = Group::new(group.bet);
        new_group.cards.push(card);
        new_group.split_ace = split_ace;
        self.groups.push(new_group);
        self.groups.len() - 1
    }

    /// Doubles down the given group.
    pub fn double_down(&mut self, group_index: usize) {
        self.groups[group_index].bet *= 2.0;
    }

    pub fn surrender(&mut self, group_index: usize) {
        self.groups[group_index].surrendered = true;
    }

    pub fn get_number_of_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn get_bet(&self, group_index: usize) -> f64 {
        self.groups[group_index].bet
    }

    pub fn set_original_bet(&mut self, bet: f64) {
        self.groups[0].bet = bet;
    }

    pub fn get_cards(&self, group_index: usize) -> &[u8] {
        &self.groups[group_index].cards
    }

    pub fn get_value(&self, group_index: usize) -> HandValue {
        HandValue::of(&self.groups[group_index].cards)
    }

    pub fn is_surrendered(&self, group_index: usize) -> bool {
        self.groups[group_index].surrendered
    }

    pub fn is_split_ace(&self, group_index: usize) -> bool {
        self.groups[group_index].split_ace
    }

    /// A two-card group whose cards have the same blackjack value.
    pub fn is_pair(&self, group_index: usize) -> bool {
        let cards = self.get_cards(group_index);
        cards.len() == 2 && cards[0] == cards[1]
    }

    /// Only the single original group can hold a natural.
    pub fn is_natural(&self) -> bool {
        self.groups.len() == 1 && is_blackjack(&self.groups[0].cards)
    }

    /// Clears all the cards in all groups. Remove all the extra groups (i.e., groups
    /// that come from split), leaving only 1 original group, and it is empty.
    pub fn clear(&mut self) {
        self.groups.truncate(1);
        self.groups[0] = Group::new(0.0);
    }
}

impl Default for Hand {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
struct Group {
    cards: Vec<u8>,
    bet: f64,
    surrendered: bool,
    /// Set on both groups created by splitting a pair of Aces.
    split_ace: bool,
}

impl Group {
    fn new(bet: f64) -> Self {
        Self {
            cards: Vec::with_capacity(4),
            bet,
            surrendered: false,
            split_ace: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_soft_and_hard_totals() {
        assert_eq!(
            HandValue::of(&[1, 10]),
            HandValue {
                total: 21,
                soft: true
            }
        );
        assert_eq!(
            HandValue::of(&[1, 1, 9]),
            HandValue {
                total: 21,
                soft: true
            }
        );
        assert_eq!(
            HandValue::of(&[10, 10, 5]),
            HandValue {
                total: 25,
                soft: false
            }
        );
        assert_eq!(
            HandValue::of(&[1, 6, 10]),
            HandValue {
                total: 17,
                soft: false
            }
        );
        assert_eq!(
            HandValue::of(&[1, 1]),
            HandValue {
                total: 12,
                soft: true
            }
        );
        assert!(HandValue::of(&[10, 10, 5]).bust());
        assert!(!HandValue::of(&[10, 10, 1]).bust());
    }

    #[test]
    fn natural_needs_exactly_two_cards() {
        assert!(is_blackjack(&[10, 1]));
        assert!(!is_blackjack(&[7, 7, 7]));
        assert!(!is_blackjack(&[10, 10]));
    }

    #[test]
    fn should_split_successfully() {
        let mut hand = Hand::new();
        hand.set_original_bet(200.0);
        hand.receive_card(0, 8);
        hand.receive_card(0, 8);
        assert!(hand.is_pair(0));
        let new_index = hand.split_group(0);
        assert_eq!(new_index, 1);
        assert_eq!(hand.get_number_of_groups(), 2);
        assert_eq!(hand.get_cards(0), &[8]);
        assert_eq!(hand.get_cards(1), &[8]);
        assert_eq!(hand.get_bet(1), 200.0);
        assert!(!hand.is_split_ace(0));
        assert!(!hand.is_split_ace(1));
    }

    #[test]
    fn splitting_aces_marks_both_groups() {
        let mut hand = Hand::new();
        hand.receive_card(0, 1);
        hand.receive_card(0, 1);
        hand.split_group(0);
        assert!(hand.is_split_ace(0));
        assert!(hand.is_split_ace(1));
    }

    #[test]
    fn natural_only_without_split() {
        let mut hand = Hand::new();
        hand.receive_card(0, 1);
        hand.receive_card(0, 10);
        assert!(hand.is_natural());

        let mut hand = Hand::new();
        hand.receive_card(0, 10);
        hand.receive_card(0, 10);
        hand.split_group(0);
        hand.receive_card(0, 1);
        assert!(!hand.is_natural());

        hand.clear();
        assert_eq!(hand.get_number_of_groups(), 1);
        assert!(hand.get_cards(0).is_empty());
        assert_eq!(hand.get_bet(0), 0.0);
    }

    #[test]
    fn double_and_surrender() {
        let mut hand = Hand::new();
        hand.set_original_bet(50.0);
        hand.double_down(0);
        assert_eq!(hand.get_bet(0), 100.0);
        assert!(!hand.is_surrendered(0));
        hand.surrender(0);
        assert!(hand.is_surrendered(0));
    }
}
