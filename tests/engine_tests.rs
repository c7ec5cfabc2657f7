//! Engine integration tests.
//!
//! Full matches driven through the public API: setup from data, rules
//! firing on triggers, effect cascades, and phase/turn progression.

use std::cell::RefCell;
use std::rc::Rc;

use cardscript::{
    reserved, CardData, CardGetter, CardId, Condition, Effect, EngineError, Field, Getter,
    MatchContext, MatchData, MatchEvent, NumberGetter, Operator, Rule, TriggerKind, ZoneData,
    ZoneGetter, FACE_DOWN,
};

fn deck_of(count: usize) -> Vec<CardData> {
    (0..count)
        .map(|i| CardData::new(format!("Card {i}")).in_zone("Deck"))
        .collect()
}

fn record_events(context: &mut MatchContext) -> Rc<RefCell<Vec<MatchEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    context.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

/// Opening deal: a match-started rule moves the top five deck cards to hand.
/// The deck is a face-down zone, but face-down tagging applies on entry, so
/// cards dealt to an open hand stay untagged.
#[test]
fn test_opening_deal() {
    let data = MatchData {
        zones: vec![
            ZoneData::new("Deck").with_tag(FACE_DOWN),
            ZoneData::new("Hand"),
        ],
        cards: deck_of(20),
        rules: vec![Rule::new("Deal opening hand", TriggerKind::OnMatchStarted)
            .with_effect(Effect::MoveCardToZone {
                cards: CardGetter::all()
                    .in_zone(ZoneGetter::all().id("z0"))
                    .top(5),
                zones: ZoneGetter::all().id("z1"),
                to_bottom: false,
                face_down: false,
            })],
        ..MatchData::default()
    };
    let mut context = MatchContext::setup(data, 42).unwrap();
    let events = record_events(&mut context);
    context.start().unwrap();

    let deck = context.board().zone_by_name("Deck").unwrap();
    let hand = context.board().zone_by_name("Hand").unwrap();
    assert_eq!(context.board().zone(deck).count(), 15);
    assert_eq!(context.board().zone(hand).count(), 5);

    // Exactly one left and one entered notification per dealt card.
    let left = events
        .borrow()
        .iter()
        .filter(|e| matches!(e, MatchEvent::CardLeftZone { .. }))
        .count();
    let entered = events
        .borrow()
        .iter()
        .filter(|e| matches!(e, MatchEvent::CardEnteredZone { .. }))
        .count();
    assert_eq!(left, 5);
    assert_eq!(entered, 5);

    // Nothing marked the deal face down.
    assert!(context.board().cards().all(|c| !c.has_tag(FACE_DOWN)));
}

/// A card-used rule scores only when the used card carries the right tag.
#[test]
fn test_used_card_scoring() {
    let data = MatchData {
        zones: vec![ZoneData::new("Deck")],
        cards: vec![
            CardData::new("Ace of Spades").with_tag("Ace").in_zone("Deck"),
            CardData::new("Two of Clubs").in_zone("Deck"),
        ],
        variables: vec![("score".to_string(), "0".to_string())],
        rules: vec![Rule::new("Score aces", TriggerKind::OnCardUsed)
            .with_condition(Condition::compare(
                CardGetter::all().id(reserved::USED_CARD),
                Operator::Equals,
                "Ace",
            ))
            .with_effect(Effect::SetVariable {
                name: "score".into(),
                value: Getter::Number(NumberGetter::variable("score").plus(1.0)),
            })],
        ..MatchData::default()
    };
    let mut context = MatchContext::setup(data, 1).unwrap();
    context.start().unwrap();
    let ace = CardId(0);
    let two = CardId(1);

    context.use_card(ace).unwrap();
    assert_eq!(context.numeric_variable("score"), 1.0);
    assert_eq!(context.string_variable("score"), Some("1"));

    context.use_card(two).unwrap();
    assert_eq!(context.numeric_variable("score"), 1.0);

    context.use_card(ace).unwrap();
    assert_eq!(context.numeric_variable("score"), 2.0);
}

/// Subphase loops cycle without advancing the turn; ending the loop
/// restores the interrupted phase.
#[test]
fn test_subphase_loop() {
    let mut context = MatchContext::setup(MatchData::default(), 1).unwrap();
    context.start().unwrap();
    assert_eq!(context.state().phase, "Main");

    context
        .execute(&Effect::StartSubphaseLoop {
            phases: "Draw,Discard".into(),
        })
        .unwrap();
    assert_eq!(context.state().phase, "Draw");
    assert!(context.state().in_subphase_loop());

    context.execute(&Effect::EndCurrentPhase).unwrap();
    assert_eq!(context.state().phase, "Discard");

    // Wrapping a subphase cycle never touches the turn counter.
    context.execute(&Effect::EndCurrentPhase).unwrap();
    assert_eq!(context.state().phase, "Draw");
    assert_eq!(context.state().turn, 0);

    context.execute(&Effect::EndSubphaseLoop).unwrap();
    assert_eq!(context.state().phase, "Main");
    assert!(!context.state().in_subphase_loop());
    assert_eq!(context.state().turn, 0);
}

/// Moving into a face-down zone tags the card.
#[test]
fn test_face_down_zone_tags_cards() {
    let data = MatchData {
        zones: vec![
            ZoneData::new("Hand"),
            ZoneData::new("Stock").with_tag(FACE_DOWN),
        ],
        cards: vec![CardData::new("Card").in_zone("Hand")],
        ..MatchData::default()
    };
    let mut context = MatchContext::setup(data, 1).unwrap();
    context.start().unwrap();

    context
        .execute(&Effect::MoveCardToZone {
            cards: CardGetter::all(),
            zones: ZoneGetter::all().tag(FACE_DOWN),
            to_bottom: false,
            face_down: false,
        })
        .unwrap();
    assert!(context.board().card(CardId(0)).has_tag(FACE_DOWN));
}

/// A rule whose effect re-raises its own trigger hits the cascade ceiling.
#[test]
fn test_cascade_overflow() {
    let data = MatchData {
        variables: vec![("counter".to_string(), "0".to_string())],
        rules: vec![Rule::new("Count forever", TriggerKind::OnVariableChanged)
            .with_effect(Effect::SetVariable {
                name: "counter".into(),
                value: Getter::Number(NumberGetter::variable("counter").plus(1.0)),
            })],
        cascade_limit: Some(25),
        ..MatchData::default()
    };
    let mut context = MatchContext::setup(data, 1).unwrap();
    context.start().unwrap();

    let result = context.execute(&Effect::SetVariable {
        name: "counter".into(),
        value: Getter::from(1.0),
    });
    assert_eq!(result, Err(EngineError::CascadeOverflow { limit: 25 }));
    assert!(context.is_ended());
}

/// Firing rules announce themselves, and activation rules can react.
#[test]
fn test_rule_activation_feedback() {
    let data = MatchData {
        variables: vec![("lastRule".to_string(), String::new())],
        rules: vec![
            Rule::new("Greet", TriggerKind::OnActionUsed),
            Rule::new("Record activation", TriggerKind::OnRuleActivated).with_effect(
                Effect::SetVariable {
                    name: "lastRule".into(),
                    value: Getter::Text(cardscript::StringGetter::variable(reserved::RULE_NAME)),
                },
            ),
        ],
        ..MatchData::default()
    };
    let mut context = MatchContext::setup(data, 1).unwrap();
    context.start().unwrap();

    context.use_action("greet").unwrap();
    assert_eq!(context.string_variable("lastRule"), Some("Greet"));
    assert_eq!(context.string_variable(reserved::RULE), Some("r0"));
}

/// Ending the match clears the cascade and silences later raises; only
/// observers hear the final notification.
#[test]
fn test_end_the_match_is_terminal() {
    let data = MatchData {
        variables: vec![("after".to_string(), "0".to_string())],
        rules: vec![
            Rule::new("Stop on signal", TriggerKind::OnActionUsed)
                .with_effect(Effect::EndTheMatch),
            // Registered after the stopper; must never run.
            Rule::new("Too late", TriggerKind::OnActionUsed).with_effect(Effect::SetVariable {
                name: "after".into(),
                value: Getter::from(1.0),
            }),
        ],
        ..MatchData::default()
    };
    let mut context = MatchContext::setup(data, 1).unwrap();
    context.start().unwrap();
    let events = record_events(&mut context);

    context.use_action("stop").unwrap();
    assert!(context.is_ended());
    assert_eq!(context.numeric_variable("after"), 0.0);
    assert_eq!(
        events.borrow().as_slice(),
        &[MatchEvent::MatchEnded { match_number: 0 }]
    );

    context.use_action("again").unwrap();
    assert_eq!(events.borrow().len(), 1);
}

/// False-branch effects run when the condition fails.
#[test]
fn test_false_effects() {
    let data = MatchData {
        variables: vec![("hits".to_string(), "0".to_string()), ("misses".to_string(), "0".to_string())],
        rules: vec![Rule::new("Tally", TriggerKind::OnActionUsed)
            .with_condition(Condition::compare(
                cardscript::StringGetter::variable(reserved::ACTION_NAME),
                Operator::Equals,
                "hit",
            ))
            .with_effect(Effect::SetVariable {
                name: "hits".into(),
                value: Getter::Number(NumberGetter::variable("hits").plus(1.0)),
            })
            .with_false_effect(Effect::SetVariable {
                name: "misses".into(),
                value: Getter::Number(NumberGetter::variable("misses").plus(1.0)),
            })],
        ..MatchData::default()
    };
    let mut context = MatchContext::setup(data, 1).unwrap();
    context.start().unwrap();

    context.use_action("hit").unwrap();
    context.use_action("miss").unwrap();
    context.use_action("hit").unwrap();
    assert_eq!(context.numeric_variable("hits"), 2.0);
    assert_eq!(context.numeric_variable("misses"), 1.0);
}

/// Field writes apply only when the field exists and the value kind
/// matches the field's kind; mismatches and absent fields are skipped.
#[test]
fn test_set_card_field_value_kinds() {
    let data = MatchData {
        zones: vec![ZoneData::new("Table")],
        cards: vec![CardData::new("Unit")
            .with_field(Field::number("Power", 2.0))
            .with_field(Field::text("Suit", "Clubs"))
            .in_zone("Table")],
        ..MatchData::default()
    };
    let mut context = MatchContext::setup(data, 1).unwrap();
    context.start().unwrap();
    let unit = CardId(0);

    context
        .execute(&Effect::SetCardFieldValue {
            cards: CardGetter::all(),
            field: "Power".into(),
            value: Getter::from(5.0),
        })
        .unwrap();
    assert_eq!(context.board().card(unit).numeric_field("Power"), 5.0);

    // A number against a text field is a kind mismatch: skipped.
    context
        .execute(&Effect::SetCardFieldValue {
            cards: CardGetter::all(),
            field: "Suit".into(),
            value: Getter::from(5.0),
        })
        .unwrap();
    assert_eq!(context.board().card(unit).text_field("Suit"), Some("Clubs"));

    context
        .execute(&Effect::SetCardFieldValue {
            cards: CardGetter::all(),
            field: "Suit".into(),
            value: Getter::from("Spades"),
        })
        .unwrap();
    assert_eq!(context.board().card(unit).text_field("Suit"), Some("Spades"));

    // Absent fields are never created by a write.
    context
        .execute(&Effect::SetCardFieldValue {
            cards: CardGetter::all(),
            field: "Toughness".into(),
            value: Getter::from(3.0),
        })
        .unwrap();
    assert!(!context.board().card(unit).has_field("Toughness"));
}

/// UseCard and UseZone announce the first entity of their selection.
#[test]
fn test_use_effects_announce_first_of_selection() {
    let data = MatchData {
        zones: vec![
            ZoneData::new("Deck").with_tag("Pile"),
            ZoneData::new("Discard").with_tag("Pile"),
        ],
        cards: vec![
            CardData::new("plain").in_zone("Deck"),
            CardData::new("pick a").with_tag("Pick").in_zone("Deck"),
            CardData::new("pick b").with_tag("Pick").in_zone("Deck"),
        ],
        ..MatchData::default()
    };
    let mut context = MatchContext::setup(data, 1).unwrap();
    context.start().unwrap();
    let events = record_events(&mut context);
    let deck = context.board().zone_by_name("Deck").unwrap();

    context
        .execute(&Effect::UseCard {
            cards: CardGetter::all().tag("Pick"),
        })
        .unwrap();
    assert_eq!(
        events.borrow().as_slice(),
        &[MatchEvent::CardUsed {
            card: CardId(1),
            zone: Some(deck),
        }]
    );
    assert_eq!(context.string_variable(reserved::USED_CARD), Some("c1"));

    events.borrow_mut().clear();
    context
        .execute(&Effect::UseZone {
            zones: ZoneGetter::all().tag("Pile"),
        })
        .unwrap();
    assert_eq!(
        events.borrow().as_slice(),
        &[MatchEvent::ZoneUsed { zone: deck }]
    );
    assert_eq!(context.string_variable(reserved::USED_ZONE), Some("z0"));
}

/// Moving a batch to the bottom keeps the batch's order, below whatever
/// the zone already held.
#[test]
fn test_move_to_bottom_preserves_batch_order() {
    let data = MatchData {
        zones: vec![ZoneData::new("Deck"), ZoneData::new("Hand")],
        cards: vec![
            CardData::new("deck 0").in_zone("Deck"),
            CardData::new("deck 1").in_zone("Deck"),
            CardData::new("deck 2").in_zone("Deck"),
            CardData::new("deck 3").in_zone("Deck"),
            CardData::new("held").in_zone("Hand"),
        ],
        ..MatchData::default()
    };
    let mut context = MatchContext::setup(data, 1).unwrap();
    context.start().unwrap();
    let hand = context.board().zone_by_name("Hand").unwrap();

    context
        .execute(&Effect::MoveCardToZone {
            cards: CardGetter::all()
                .in_zone(ZoneGetter::all().id("z0"))
                .top(2),
            zones: ZoneGetter::all().id("z1"),
            to_bottom: true,
            face_down: false,
        })
        .unwrap();

    // Top two of the deck were c2, c3 (bottom-to-top order); they land at
    // the bottom of the hand in that order, under the held card.
    assert_eq!(
        context.board().zone(hand).cards(),
        &[CardId(2), CardId(3), CardId(4)]
    );
}

/// Variables store strings; the numeric accessor parses them back.
#[test]
fn test_variable_round_trip() {
    let data = MatchData {
        variables: vec![("score".to_string(), "0".to_string())],
        ..MatchData::default()
    };
    let mut context = MatchContext::setup(data, 1).unwrap();
    context.start().unwrap();

    context
        .execute(&Effect::SetVariable {
            name: "score".into(),
            value: Getter::from("5"),
        })
        .unwrap();
    assert_eq!(context.string_variable("score"), Some("5"));
    assert_eq!(context.numeric_variable("score"), 5.0);

    context
        .execute(&Effect::SetVariable {
            name: "score".into(),
            value: Getter::from("not a number"),
        })
        .unwrap();
    assert!(context.numeric_variable("score").is_nan());
}

/// Same data, same seed, same host calls: identical outcomes.
#[test]
fn test_deterministic_replay() {
    let run = || {
        let data = MatchData {
            zones: vec![ZoneData::new("Deck")],
            cards: deck_of(20),
            ..MatchData::default()
        };
        let mut context = MatchContext::setup(data, 99).unwrap();
        context.start().unwrap();
        context
            .execute(&Effect::Shuffle {
                zones: ZoneGetter::all(),
            })
            .unwrap();
        let deck = context.board().zone_by_name("Deck").unwrap();
        context.board().zone(deck).cards().to_vec()
    };
    assert_eq!(run(), run());
}
