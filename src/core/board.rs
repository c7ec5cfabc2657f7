//! Board - the per-match entity arena.
//!
//! Owns every card and zone of one match and is the only place card/zone
//! membership changes. A card's "current zone" is an arena key rather than a
//! pointer, so moves can never leave a dangling back-reference: the transfer
//! removes the id from the old sequence, inserts it into the new one, and
//! rewrites the key in one call.

use serde::{Deserialize, Serialize};

use super::card::{Card, CardData};
use super::entity::{CardId, ZoneId};
use super::zone::{Zone, ZoneData};

/// Where a card lands when inserted into a zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// End of the sequence (top).
    #[default]
    Top,
    /// Start of the sequence (bottom).
    Bottom,
    /// Specific position, clamped to the sequence length.
    Index(usize),
}

/// Arena of all cards and zones in one match.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Board {
    cards: Vec<Card>,
    zones: Vec<Zone>,
}

impl Board {
    /// Create an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate a card from its template. Ids are sequential and never
    /// reused within the match.
    pub(crate) fn spawn_card(&mut self, data: &CardData) -> CardId {
        let id = CardId(self.cards.len() as u32);
        self.cards.push(Card::from_data(id, data));
        id
    }

    /// Instantiate a zone from its template.
    pub(crate) fn spawn_zone(&mut self, data: &ZoneData) -> ZoneId {
        let id = ZoneId(self.zones.len() as u32);
        self.zones.push(Zone::from_data(id, data));
        id
    }

    /// Look up a card.
    #[must_use]
    pub fn card(&self, id: CardId) -> &Card {
        &self.cards[id.index()]
    }

    /// Look up a card mutably.
    pub fn card_mut(&mut self, id: CardId) -> &mut Card {
        &mut self.cards[id.index()]
    }

    /// Look up a zone.
    #[must_use]
    pub fn zone(&self, id: ZoneId) -> &Zone {
        &self.zones[id.index()]
    }

    /// All cards in creation order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    /// All zones in registration order.
    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    /// Number of cards in the match.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// Find a zone by its display name.
    #[must_use]
    pub fn zone_by_name(&self, name: &str) -> Option<ZoneId> {
        self.zones.iter().find(|z| z.name() == name).map(Zone::id)
    }

    /// Canonical card enumeration: each zone's contents bottom-to-top with
    /// zones in registration order, then zoneless cards in creation order.
    #[must_use]
    pub fn canonical_cards(&self) -> Vec<CardId> {
        let mut out = Vec::with_capacity(self.cards.len());
        for zone in &self.zones {
            out.extend_from_slice(&zone.cards);
        }
        for card in &self.cards {
            if card.zone().is_none() {
                out.push(card.id());
            }
        }
        out
    }

    /// All zone ids in registration order.
    #[must_use]
    pub fn all_zones(&self) -> Vec<ZoneId> {
        self.zones.iter().map(Zone::id).collect()
    }

    /// A card's position within its current zone (0 = bottom).
    #[must_use]
    pub fn position_in_zone(&self, card: CardId) -> Option<usize> {
        let zone = self.card(card).zone()?;
        self.zone(zone).position_of(card)
    }

    /// Move a card into a zone, removing it from its previous zone first.
    ///
    /// Returns the previous zone, if any. Moving a card to the zone it
    /// already occupies re-seats it at `position`.
    pub fn move_card(&mut self, card: CardId, dest: ZoneId, position: ZonePosition) -> Option<ZoneId> {
        let old_zone = self.cards[card.index()].zone;
        if let Some(old) = old_zone {
            self.zones[old.index()].cards.retain(|c| *c != card);
        }
        let seq = &mut self.zones[dest.index()].cards;
        match position {
            ZonePosition::Top => seq.push(card),
            ZonePosition::Bottom => seq.insert(0, card),
            ZonePosition::Index(i) => {
                let idx = i.min(seq.len());
                seq.insert(idx, card);
            }
        }
        self.cards[card.index()].zone = Some(dest);
        old_zone
    }

    /// Shuffle a zone in place with the given RNG.
    pub fn shuffle_zone(&mut self, zone: ZoneId, rng: &mut super::rng::MatchRng) {
        rng.shuffle(&mut self.zones[zone.index()].cards);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::MatchRng;

    fn board_with(zones: &[&str], cards: usize) -> Board {
        let mut board = Board::new();
        for name in zones {
            board.spawn_zone(&ZoneData::new(*name));
        }
        for i in 0..cards {
            board.spawn_card(&CardData::new(format!("Card {i}")));
        }
        board
    }

    #[test]
    fn test_move_is_exclusive() {
        let mut board = board_with(&["Deck", "Hand"], 1);
        let card = CardId(0);
        let deck = ZoneId(0);
        let hand = ZoneId(1);

        assert_eq!(board.move_card(card, deck, ZonePosition::Top), None);
        assert_eq!(board.card(card).zone(), Some(deck));

        let old = board.move_card(card, hand, ZonePosition::Top);
        assert_eq!(old, Some(deck));
        assert_eq!(board.zone(deck).count(), 0);
        assert_eq!(board.zone(hand).cards(), &[card]);
    }

    #[test]
    fn test_insert_positions() {
        let mut board = board_with(&["Deck"], 3);
        let deck = ZoneId(0);
        board.move_card(CardId(0), deck, ZonePosition::Top);
        board.move_card(CardId(1), deck, ZonePosition::Top);
        board.move_card(CardId(2), deck, ZonePosition::Bottom);
        assert_eq!(board.zone(deck).cards(), &[CardId(2), CardId(0), CardId(1)]);
        assert_eq!(board.position_in_zone(CardId(0)), Some(1));
    }

    #[test]
    fn test_canonical_order() {
        let mut board = board_with(&["Deck", "Hand"], 4);
        board.move_card(CardId(2), ZoneId(1), ZonePosition::Top);
        board.move_card(CardId(0), ZoneId(0), ZonePosition::Top);
        // Deck (zone 0) first, then Hand, then zoneless in creation order.
        assert_eq!(
            board.canonical_cards(),
            vec![CardId(0), CardId(2), CardId(1), CardId(3)]
        );
    }

    #[test]
    fn test_shuffle_preserves_multiset() {
        let mut board = board_with(&["Deck"], 10);
        let deck = ZoneId(0);
        for i in 0..10 {
            board.move_card(CardId(i), deck, ZonePosition::Top);
        }
        let mut rng = MatchRng::new(7);
        board.shuffle_zone(deck, &mut rng);

        let mut after: Vec<_> = board.zone(deck).cards().to_vec();
        after.sort();
        assert_eq!(after, (0..10).map(CardId).collect::<Vec<_>>());
    }
}
