use super::{Suit, FACE_VALUE_TO_BLACKJACK_VALUE};

use strum::IntoEnumIterator;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Represents a shoe in the real world, holding blackjack values only
/// (1 stands for A, 10 stands for 10, J, Q and K).
///
/// The shoe also keeps the Hi-Lo running count of every card dealt since the
/// last shuffle.
#[derive(Debug, Clone)]
pub struct Shoe {
    number_of_decks: u8,
    cards: Vec<u8>,
    current_index: usize,
    running_count: i32,
    rng: StdRng,
}

impl Shoe {
    /// Creates a shuffled shoe whose every shuffle is reproducible from `seed`.
    pub fn with_seed(number_of_decks: u8, seed: u64) -> Shoe {
        let mut shoe = Shoe {
            number_of_decks,
            cards: Vec::with_capacity(number_of_decks as usize * 52),
            current_index: 0,
            running_count: 0,
            rng: StdRng::seed_from_u64(seed),
        };
        shoe.shuffle();
        shoe
    }

    /// Puts every card back, shuffles and resets the running count.
    pub fn shuffle(&mut self) {
        self.cards = ordered_cards(self.number_of_decks);
        self.cards.shuffle(&mut self.rng);
        self.current_index = 0;
        self.running_count = 0;
    }

    /// Puts every card back and shuffles, making sure the given cards are dealt
    /// first and in the given order. Panics if the shoe cannot supply them.
    pub fn shuffle_with_firsts(&mut self, firsts: &[u8]) {
        let mut rest = ordered_cards(self.number_of_decks);
        for blackjack_value in firsts {
            let position = rest
                .iter()
                .position(|card| card == blackjack_value)
                .unwrap_or_else(|| panic!("The shoe has no {} left to preset", blackjack_value));
            rest.swap_remove(position);
        }
        rest.shuffle(&mut self.rng);

        self.cards.clear();
        self.cards.extend_from_slice(firsts);
        self.cards.extend(rest);
        self.current_index = 0;
        self.running_count = 0;
    }

    /// Deals the top card and updates the running count.
    ///
    /// Panics on an empty shoe: the reshuffle threshold keeps every round far
    /// away from the last card.
    pub fn deal_card(&mut self) -> u8 {
        if self.current_index >= self.cards.len() {
            panic!("Dealing from an empty shoe!");
        }
        let card = self.cards[self.current_index];
        self.current_index += 1;
        self.running_count += hi_lo_tag(card);
        card
    }

    /// Checks if too few cards are left to start another round.
    pub fn needs_reshuffle(&self) -> bool {
        let threshold = std::cmp::max(26, 13 * self.number_of_decks as usize);
        self.remaining() < threshold
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.current_index
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }

    /// Running count per deck left in the shoe.
    pub fn true_count(&self) -> f64 {
        self.running_count as f64 / (self.remaining() as f64 / 52.0)
    }

    pub fn number_of_decks(&self) -> u8 {
        self.number_of_decks
    }

    pub fn preview_next_few_cards(&self, number: usize) -> &[u8] {
        let end = std::cmp::min(self.cards.len(), self.current_index + number);
        &self.cards[self.current_index..end]
    }
}

fn ordered_cards(number_of_decks: u8) -> Vec<u8> {
    let mut cards = Vec::with_capacity(number_of_decks as usize * 52);
    for _ in 0..number_of_decks {
        for _suit in Suit::iter() {
            cards.extend_from_slice(&FACE_VALUE_TO_BLACKJACK_VALUE);
        }
    }
    cards
}

fn hi_lo_tag(card: u8) -> i32 {
    match card {
        2..=6 => 1,
        1 | 10 => -1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts_of(cards: &[u8]) -> [usize; 10] {
        let mut counts = [0; 10];
        for card in cards {
            counts[(*card - 1) as usize] += 1;
        }
        counts
    }

    #[test]
    fn single_deck_composition() {
        let shoe = Shoe::with_seed(1, 7);
        assert_eq!(shoe.cards.len(), 52);
        assert_eq!(shoe.remaining(), 52);
        assert_eq!(shoe.running_count(), 0);
        let counts = counts_of(&shoe.cards);
        assert_eq!(counts[0], 4);
        for value in 2..=9 {
            assert_eq!(counts[value - 1], 4);
        }
        assert_eq!(counts[9], 16);
    }

    #[test]
    fn multi_deck_composition() {
        let shoe = Shoe::with_seed(6, 1);
        assert_eq!(shoe.cards.len(), 312);
        let counts = counts_of(&shoe.cards);
        assert_eq!(counts[4], 24);
        assert_eq!(counts[9], 96);
    }

    #[test]
    fn same_seed_same_order() {
        let shoe1 = Shoe::with_seed(2, 42);
        let shoe2 = Shoe::with_seed(2, 42);
        let shoe3 = Shoe::with_seed(2, 43);
        assert_eq!(shoe1.cards, shoe2.cards);
        assert_ne!(shoe1.cards, shoe3.cards);
    }

    #[test]
    fn test_shuffle_with_firsts() {
        let mut shoe = Shoe::with_seed(1, 3);
        let firsts = vec![1, 2, 6, 6, 9];
        shoe.shuffle_with_firsts(&firsts);
        assert_eq!(counts_of(&shoe.cards), counts_of(&ordered_cards(1)));
        assert_eq!(shoe.preview_next_few_cards(5), &firsts[..]);

        let firsts = vec![9, 10, 10, 10, 10, 10];
        shoe.shuffle_with_firsts(&firsts);
        assert_eq!(shoe.cards.len(), 52);
        for blackjack_value in &firsts {
            assert_eq!(shoe.deal_card(), *blackjack_value);
        }
    }

    #[test]
    #[should_panic]
    fn invalid_firsts_should_panic() {
        let mut shoe = Shoe::with_seed(1, 3);
        shoe.shuffle_with_firsts(&[6, 6, 6, 6, 6]);
    }

    #[test]
    fn hi_lo_count_is_tracked() {
        let mut shoe = Shoe::with_seed(1, 5);
        shoe.shuffle_with_firsts(&[2, 3, 4, 5, 6, 7, 8, 9, 1, 10]);
        for _ in 0..5 {
            shoe.deal_card();
        }
        assert_eq!(shoe.running_count(), 5);
        for _ in 0..3 {
            shoe.deal_card();
        }
        assert_eq!(shoe.running_count(), 5);
        shoe.deal_card();
        assert_eq!(shoe.running_count(), 4);
        shoe.deal_card();
        assert_eq!(shoe.running_count(), 3);

        shoe.shuffle();
        assert_eq!(shoe.running_count(), 0);
        assert_eq!(shoe.remaining(), 52);
    }

    #[test]
    fn true_count_divides_by_decks_left() {
        let mut shoe = Shoe::with_seed(2, 5);
        shoe.shuffle_with_firsts(&[2, 3, 4, 5]);
        for _ in 0..4 {
            shoe.deal_card();
        }
        // 4 / (100 / 52)
        assert!((shoe.true_count() - 2.08).abs() < 1e-9);
    }

    #[test]
    fn reshuffle_threshold() {
        let mut shoe = Shoe::with_seed(1, 11);
        for _ in 0..26 {
            assert!(!shoe.needs_reshuffle());
            shoe.deal_card();
        }
        assert_eq!(shoe.remaining(), 26);
        assert!(!shoe.needs_reshuffle());
        shoe.deal_card();
        assert!(shoe.needs_reshuffle());

        // 13 per deck once that exceeds 26.
        let mut shoe = Shoe::with_seed(4, 11);
        while shoe.remaining() > 52 {
            shoe.deal_card();
        }
        assert!(!shoe.needs_reshuffle());
        shoe.deal_card();
        assert!(shoe.needs_reshuffle());
    }

    #[test]
    #[should_panic]
    fn dealing_from_empty_shoe_should_panic() {
        let mut shoe = Shoe::with_seed(1, 0);
        for _ in 0..53 {
            shoe.deal_card();
        }
    }
}
