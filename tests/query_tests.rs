//! Query system integration tests.
//!
//! Selection ordering, filter narrowing, RNG determinism, and serde round
//! trips for rule definitions, exercised through the public API.

use proptest::prelude::*;

use cardscript::{
    Board, CardData, CardGetter, CardId, Condition, Effect, Getter, MatchData, MatchRng,
    NumberGetter, Operator, QueryScope, Rule, TriggerKind, Variables, ZoneData, ZoneGetter,
};

fn scoped<T>(board: &Board, f: impl FnOnce(&mut QueryScope) -> T) -> T {
    let vars = Variables::new();
    let mut rng = MatchRng::new(0);
    let mut scope = QueryScope {
        board,
        vars: &vars,
        rng: &mut rng,
    };
    f(&mut scope)
}

fn board_from(data: MatchData) -> Board {
    let context = cardscript::MatchContext::setup(data, 0).unwrap();
    context.board().clone()
}

/// A filterless selection enumerates every card: zone contents bottom-to-top
/// with zones in registration order, then zoneless cards in creation order.
#[test]
fn test_empty_selection_is_canonical() {
    let data = MatchData {
        zones: vec![ZoneData::new("Deck"), ZoneData::new("Hand")],
        cards: vec![
            CardData::new("a").in_zone("Hand"),
            CardData::new("b"),
            CardData::new("c").in_zone("Deck"),
            CardData::new("d").in_zone("Deck"),
        ],
        ..MatchData::default()
    };
    let board = board_from(data);
    let cards = scoped(&board, |scope| CardGetter::all().get_cards(scope)).unwrap();
    // Deck first (c, d), then Hand (a), then zoneless (b).
    assert_eq!(cards, vec![CardId(2), CardId(3), CardId(0), CardId(1)]);
}

#[test]
fn test_tag_and_zone_filters_compose() {
    let data = MatchData {
        zones: vec![ZoneData::new("Deck"), ZoneData::new("Hand")],
        cards: vec![
            CardData::new("red in deck").with_tag("Red").in_zone("Deck"),
            CardData::new("red in hand").with_tag("Red").in_zone("Hand"),
            CardData::new("blue in deck").with_tag("Blue").in_zone("Deck"),
        ],
        ..MatchData::default()
    };
    let board = board_from(data);
    let selection = CardGetter::all()
        .tag("Red")
        .in_zone(ZoneGetter::all().id("z0"));
    let cards = scoped(&board, |scope| selection.get_cards(scope)).unwrap();
    assert_eq!(cards, vec![CardId(0)]);
}

/// Selections nest arbitrarily deep: a card filter can hold a zone
/// selection whose filter holds another card selection.
#[test]
fn test_nested_selections_compose() {
    let data = MatchData {
        zones: vec![ZoneData::new("Deck"), ZoneData::new("Hand")],
        cards: vec![
            CardData::new("marked").with_tag("Marked").in_zone("Deck"),
            CardData::new("neighbor").in_zone("Deck"),
            CardData::new("elsewhere").in_zone("Hand"),
        ],
        ..MatchData::default()
    };
    let board = board_from(data);
    // Everything sharing a zone with the marked card.
    let selection = CardGetter::all()
        .in_zone(ZoneGetter::all().of_card(CardGetter::all().tag("Marked")));
    let cards = scoped(&board, |scope| selection.get_cards(scope)).unwrap();
    assert_eq!(cards, vec![CardId(0), CardId(1)]);
}

/// Id filters compare entities, not raw text: a literal id selects its
/// card, and text that is no id (and no variable) selects nothing.
#[test]
fn test_id_filter_parses_entity_ids() {
    let data = MatchData {
        zones: vec![ZoneData::new("Deck")],
        cards: vec![
            CardData::new("first").in_zone("Deck"),
            CardData::new("second").in_zone("Deck"),
        ],
        ..MatchData::default()
    };
    let board = board_from(data);

    let by_id = scoped(&board, |scope| {
        CardGetter::all().id("c1").get_cards(scope)
    })
    .unwrap();
    assert_eq!(by_id, vec![CardId(1)]);

    let by_junk = scoped(&board, |scope| {
        CardGetter::all().id("not an id").get_cards(scope)
    })
    .unwrap();
    assert!(by_junk.is_empty());
}

#[test]
fn test_rule_serde_round_trip() {
    let rule = Rule::new("Score aces", TriggerKind::OnCardUsed)
        .with_condition(
            Condition::compare(CardGetter::all().id("usedCard"), Operator::Equals, "Ace")
                .and(Condition::compare(
                    NumberGetter::variable("score"),
                    Operator::LessThan,
                    21.0,
                )),
        )
        .with_effect(Effect::SetVariable {
            name: "score".into(),
            value: Getter::Number(NumberGetter::variable("score").plus(1.0)),
        })
        .with_false_effect(Effect::EndTheMatch);

    let json = serde_json::to_string(&rule).unwrap();
    let back: Rule = serde_json::from_str(&json).unwrap();
    assert_eq!(back, rule);
}

fn tagged_board(tags: &[bool]) -> Board {
    let data = MatchData {
        zones: vec![ZoneData::new("Deck")],
        cards: tags
            .iter()
            .enumerate()
            .map(|(i, tagged)| {
                let card = CardData::new(format!("card {i}")).in_zone("Deck");
                if *tagged {
                    card.with_tag("Marked")
                } else {
                    card
                }
            })
            .collect(),
        ..MatchData::default()
    };
    board_from(data)
}

proptest! {
    /// Every filter narrows: the filtered selection is an order-preserving
    /// subsequence of the unfiltered one.
    #[test]
    fn prop_filters_narrow_in_order(tags in proptest::collection::vec(any::<bool>(), 0..32)) {
        let board = tagged_board(&tags);
        let all = scoped(&board, |scope| CardGetter::all().get_cards(scope)).unwrap();
        let marked = scoped(&board, |scope| {
            CardGetter::all().tag("Marked").get_cards(scope)
        })
        .unwrap();

        prop_assert_eq!(marked.len(), tags.iter().filter(|t| **t).count());
        let mut remaining = all.iter();
        for card in &marked {
            prop_assert!(remaining.any(|c| c == card));
        }
    }

    /// Shuffling permutes without loss, and the same seed replays the same
    /// permutation.
    #[test]
    fn prop_shuffle_is_seeded_permutation(count in 1usize..40, seed in any::<u64>()) {
        let deal = |seed: u64| {
            let data = MatchData {
                zones: vec![ZoneData::new("Deck")],
                cards: (0..count)
                    .map(|i| CardData::new(format!("card {i}")).in_zone("Deck"))
                    .collect(),
                ..MatchData::default()
            };
            let mut context = cardscript::MatchContext::setup(data, seed).unwrap();
            context.start().unwrap();
            context
                .execute(&Effect::Shuffle { zones: ZoneGetter::all() })
                .unwrap();
            let deck = context.board().zone_by_name("Deck").unwrap();
            context.board().zone(deck).cards().to_vec()
        };

        let first = deal(seed);
        prop_assert_eq!(&first, &deal(seed));

        let mut sorted = first.clone();
        sorted.sort();
        prop_assert_eq!(sorted, (0..count as u32).map(CardId).collect::<Vec<_>>());
    }

    /// Random getters stay within bounds and replay with the seed.
    #[test]
    fn prop_random_int_bounds(seed in any::<u64>(), min in -100i64..100, span in 1i64..100) {
        let max = min + span;
        let draw = |seed: u64| {
            let board = Board::new();
            let vars = Variables::new();
            let mut rng = MatchRng::new(seed);
            let mut scope = QueryScope { board: &board, vars: &vars, rng: &mut rng };
            NumberGetter::random_int(min as f64, max as f64)
                .get_number(&mut scope)
                .unwrap()
        };
        let value = draw(seed);
        prop_assert!(value >= min as f64 && value < max as f64);
        prop_assert_eq!(value, draw(seed));
    }
}
