//! Match engine: owns all match state and runs the trigger cascade.
//!
//! ## Lifecycle
//!
//! [`MatchContext::setup`] consumes a [`MatchData`], instantiates the board,
//! validates and indexes the rules, and seeds the RNG. [`MatchContext::start`]
//! enters the first phase and raises the match-started trigger. From there
//! the host drives the match through [`use_card`](MatchContext::use_card),
//! [`use_zone`](MatchContext::use_zone),
//! [`use_action`](MatchContext::use_action), and
//! [`execute`](MatchContext::execute).
//!
//! ## Cascade
//!
//! Every state change enqueues a [`MatchEvent`] on a FIFO queue. Events are
//! dispatched one at a time: the event's reserved variables are installed,
//! rules registered for its trigger run in registration order, and
//! subscribed observers are notified last. Effects run during dispatch only
//! enqueue further events, so the cascade is breadth-first and bounded by
//! `cascade_limit`; exceeding it aborts the match with
//! [`EngineError::CascadeOverflow`].
//!
//! ## Determinism
//!
//! Two matches set up with the same data and seed and driven by the same
//! host calls produce identical event sequences. Nothing here consults
//! wall-clock time or any randomness outside [`MatchRng`].

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::core::{
    Board, CardId, FieldValue, MatchData, MatchRng, MatchRngState, MatchState, Variables, ZoneId,
    ZonePosition, reserved, DEFAULT_CASCADE_LIMIT, FACE_DOWN,
};
use crate::error::EngineError;
use crate::query::{Operand, QueryScope};

use super::effect::Effect;
use super::event::{MatchEvent, TriggerKind};
use super::rule::{Rule, RuleId};

/// Host callback invoked after each dispatched event.
pub type Observer = Box<dyn FnMut(&MatchEvent)>;

/// One running match.
pub struct MatchContext {
    board: Board,
    state: MatchState,
    vars: Variables,
    rng: MatchRng,
    match_number: u32,
    phases: Vec<String>,
    rules: Vec<Rule>,
    rules_by_trigger: FxHashMap<TriggerKind, Vec<usize>>,
    queue: VecDeque<MatchEvent>,
    draining: bool,
    cascade_limit: usize,
    observers: Vec<Observer>,
}

impl std::fmt::Debug for MatchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchContext")
            .field("board", &self.board)
            .field("state", &self.state)
            .field("vars", &self.vars)
            .field("rng", &self.rng)
            .field("match_number", &self.match_number)
            .field("phases", &self.phases)
            .field("rules", &self.rules)
            .field("rules_by_trigger", &self.rules_by_trigger)
            .field("queue", &self.queue)
            .field("draining", &self.draining)
            .field("cascade_limit", &self.cascade_limit)
            .field("observers", &format_args!("<{} observers>", self.observers.len()))
            .finish()
    }
}

impl MatchContext {
    /// Build a match from its setup data.
    ///
    /// Spawns zones in registration order and cards in creation order,
    /// places cards declaring a start zone (raising no triggers), validates
    /// every effect, and assigns rule ids. Fails on an unknown start zone
    /// or a misconfigured effect.
    pub fn setup(data: MatchData, seed: u64) -> Result<Self, EngineError> {
        let MatchData {
            match_number,
            cards,
            zones,
            mut rules,
            variables,
            phases,
            cascade_limit,
        } = data;

        let mut board = Board::new();
        for zone in &zones {
            board.spawn_zone(zone);
        }
        for card_data in &cards {
            let card = board.spawn_card(card_data);
            if let Some(zone_name) = &card_data.start_zone {
                let zone = board
                    .zone_by_name(zone_name)
                    .ok_or_else(|| EngineError::UnknownStartZone(zone_name.clone()))?;
                board.move_card(card, zone, ZonePosition::Top);
            }
        }

        let mut rules_by_trigger: FxHashMap<TriggerKind, Vec<usize>> = FxHashMap::default();
        for (index, rule) in rules.iter_mut().enumerate() {
            for effect in rule.true_effects.iter().chain(&rule.false_effects) {
                effect.validate()?;
            }
            rule.id = RuleId(index as u32);
            rules_by_trigger.entry(rule.trigger).or_default().push(index);
        }

        let mut vars = Variables::new();
        for (name, value) in &variables {
            vars.define(name, value);
        }

        let phases = if phases.is_empty() {
            vec!["Main".to_string()]
        } else {
            phases
        };

        Ok(Self {
            board,
            state: MatchState::default(),
            vars,
            rng: MatchRng::new(seed),
            match_number,
            phases,
            rules,
            rules_by_trigger,
            queue: VecDeque::new(),
            draining: false,
            cascade_limit: cascade_limit.unwrap_or(DEFAULT_CASCADE_LIMIT),
            observers: Vec::new(),
        })
    }

    /// Enter the first phase and raise the match-started trigger.
    pub fn start(&mut self) -> Result<(), EngineError> {
        self.state.phase = self.phases[0].clone();
        self.state.turn = 0;
        debug!(match_number = self.match_number, "match starting");
        self.raise(MatchEvent::MatchStarted {
            match_number: self.match_number,
        })
    }

    /// Register an observer called after each dispatched event.
    pub fn subscribe(&mut self, observer: impl FnMut(&MatchEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Announce use of a specific card.
    pub fn use_card(&mut self, card: CardId) -> Result<(), EngineError> {
        let zone = self.board.card(card).zone();
        self.raise(MatchEvent::CardUsed { card, zone })
    }

    /// Announce use of a specific zone.
    pub fn use_zone(&mut self, zone: ZoneId) -> Result<(), EngineError> {
        self.raise(MatchEvent::ZoneUsed { zone })
    }

    /// Announce a named action.
    pub fn use_action(&mut self, name: impl Into<String>) -> Result<(), EngineError> {
        self.raise(MatchEvent::ActionUsed { name: name.into() })
    }

    /// Apply an effect from outside the rule system, then run any cascade
    /// it starts. No-op once the match has ended.
    pub fn execute(&mut self, effect: &Effect) -> Result<(), EngineError> {
        effect.validate()?;
        self.apply(effect)?;
        self.pump()
    }

    /// Current board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Current progression state.
    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// The variable store.
    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.vars
    }

    /// Numeric value of a variable. NaN on miss or parse failure.
    #[must_use]
    pub fn numeric_variable(&self, name: &str) -> f64 {
        self.vars.numeric(name)
    }

    /// String value of a variable. `None` on miss.
    #[must_use]
    pub fn string_variable(&self, name: &str) -> Option<&str> {
        self.vars.get(name)
    }

    /// Whether the match has ended.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.state.is_ended
    }

    /// Host-assigned match number.
    #[must_use]
    pub fn match_number(&self) -> u32 {
        self.match_number
    }

    /// RNG state for replay capture.
    #[must_use]
    pub fn rng_state(&self) -> MatchRngState {
        self.rng.state()
    }

    fn scope(&mut self) -> QueryScope<'_> {
        QueryScope {
            board: &self.board,
            vars: &self.vars,
            rng: &mut self.rng,
        }
    }

    fn raise(&mut self, event: MatchEvent) -> Result<(), EngineError> {
        if self.state.is_ended {
            return Ok(());
        }
        self.queue.push_back(event);
        self.pump()
    }

    /// Run the dispatch loop unless one is already running above us on the
    /// call stack.
    fn pump(&mut self) -> Result<(), EngineError> {
        if self.draining {
            return Ok(());
        }
        self.draining = true;
        let result = self.drain();
        self.draining = false;
        result
    }

    fn drain(&mut self) -> Result<(), EngineError> {
        let mut dispatched = 0usize;
        while let Some(event) = self.queue.pop_front() {
            dispatched += 1;
            if dispatched > self.cascade_limit {
                self.queue.clear();
                self.state.is_ended = true;
                return Err(EngineError::CascadeOverflow {
                    limit: self.cascade_limit,
                });
            }
            self.dispatch(event)?;
        }
        Ok(())
    }

    /// Dispatch one event: install its reserved variables, run the rules
    /// registered for its trigger in registration order, then notify
    /// observers.
    fn dispatch(&mut self, event: MatchEvent) -> Result<(), EngineError> {
        self.install_context(&event);
        let kind = event.kind();
        debug!(?kind, "dispatching");
        if let Some(indices) = self.rules_by_trigger.get(&kind) {
            for index in indices.clone() {
                if self.state.is_ended {
                    break;
                }
                // Rules are immutable after setup; a clone frees the borrow
                // so effects can mutate the engine.
                let rule = self.rules[index].clone();
                let fired = match &rule.condition {
                    Some(condition) => condition.evaluate(&mut self.scope())?,
                    None => true,
                };
                let effects = if fired {
                    &rule.true_effects
                } else {
                    &rule.false_effects
                };
                for effect in effects {
                    if self.state.is_ended {
                        break;
                    }
                    self.apply(effect)?;
                }
                // Activation feedback would recurse forever if rules bound
                // to it announced themselves too.
                if fired && kind != TriggerKind::OnRuleActivated && !self.state.is_ended {
                    self.queue.push_back(MatchEvent::RuleActivated {
                        rule: rule.id,
                        name: rule.name,
                    });
                }
            }
        }
        if !self.state.is_ended {
            self.notify(&event);
        }
        Ok(())
    }

    fn notify(&mut self, event: &MatchEvent) {
        for observer in &mut self.observers {
            observer(event);
        }
    }

    /// Write the reserved variables describing `event` before its rules run.
    fn install_context(&mut self, event: &MatchEvent) {
        match event {
            MatchEvent::MatchStarted { match_number }
            | MatchEvent::MatchEnded { match_number } => {
                self.vars
                    .set_context(reserved::MATCH_NUMBER, match_number.to_string());
            }
            MatchEvent::TurnStarted { turn } | MatchEvent::TurnEnded { turn } => {
                self.vars.set_context(reserved::TURN_NUMBER, turn.to_string());
            }
            MatchEvent::PhaseStarted { phase } | MatchEvent::PhaseEnded { phase } => {
                self.vars.set_context(reserved::PHASE, phase.clone());
            }
            MatchEvent::CardUsed { card, zone } => {
                self.vars.set_context(reserved::USED_CARD, card.to_string());
                self.vars.set_context(
                    reserved::USED_CARD_ZONE,
                    zone.map(|z| z.to_string()).unwrap_or_default(),
                );
            }
            MatchEvent::ZoneUsed { zone } => {
                self.vars.set_context(reserved::USED_ZONE, zone.to_string());
            }
            MatchEvent::CardEnteredZone {
                card,
                new_zone,
                old_zone,
            } => {
                self.vars.set_context(reserved::MOVED_CARD, card.to_string());
                self.vars.set_context(reserved::NEW_ZONE, new_zone.to_string());
                self.vars.set_context(
                    reserved::OLD_ZONE,
                    old_zone.map(|z| z.to_string()).unwrap_or_default(),
                );
            }
            MatchEvent::CardLeftZone { card, old_zone } => {
                self.vars.set_context(reserved::MOVED_CARD, card.to_string());
                self.vars.set_context(reserved::OLD_ZONE, old_zone.to_string());
            }
            MatchEvent::ActionUsed { name } => {
                self.vars.set_context(reserved::ACTION_NAME, name.clone());
            }
            MatchEvent::VariableChanged {
                name,
                old_value,
                new_value,
            } => {
                self.vars.set_context(reserved::VARIABLE, name.clone());
                self.vars.set_context(reserved::OLD_VALUE, old_value.clone());
                self.vars.set_context(reserved::NEW_VALUE, new_value.clone());
            }
            MatchEvent::RuleActivated { rule, name } => {
                self.vars.set_context(reserved::RULE, rule.to_string());
                self.vars.set_context(reserved::RULE_NAME, name.clone());
            }
        }
    }

    /// Apply one effect, enqueueing any events it causes.
    fn apply(&mut self, effect: &Effect) -> Result<(), EngineError> {
        if self.state.is_ended {
            return Ok(());
        }
        debug!(effect = effect.name(), "applying effect");
        match effect {
            Effect::EndCurrentPhase => self.end_current_phase(),
            Effect::EndTheMatch => {
                // Flag first so nothing queued behind us runs; observers
                // still hear the final notification.
                self.state.is_ended = true;
                self.queue.clear();
                let event = MatchEvent::MatchEnded {
                    match_number: self.match_number,
                };
                self.install_context(&event);
                self.notify(&event);
            }
            Effect::EndSubphaseLoop => {
                if !self.state.in_subphase_loop() {
                    warn!("end-subphase-loop outside a subphase loop");
                    return Ok(());
                }
                self.queue.push_back(MatchEvent::PhaseEnded {
                    phase: self.state.phase.clone(),
                });
                self.state.subphases.clear();
                self.state.phase = self.state.original_phase.clone();
                self.queue.push_back(MatchEvent::PhaseStarted {
                    phase: self.state.phase.clone(),
                });
            }
            Effect::UseAction { name } => {
                let Some(name) = name.get_string(&mut self.scope())? else {
                    warn!("use-action effect resolved no action name");
                    return Ok(());
                };
                self.queue.push_back(MatchEvent::ActionUsed { name });
            }
            Effect::StartSubphaseLoop { phases } => {
                let Some(list) = phases.get_string(&mut self.scope())? else {
                    warn!("start-subphase-loop effect resolved no phase list");
                    return Ok(());
                };
                let subphases: Vec<String> = list
                    .split(',')
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect();
                if subphases.is_empty() {
                    warn!(phases = %list, "start-subphase-loop with empty phase list");
                    return Ok(());
                }
                self.state.original_phase = self.state.phase.clone();
                self.state.subphases = subphases;
                self.state.phase = self.state.subphases[0].clone();
                self.queue.push_back(MatchEvent::PhaseStarted {
                    phase: self.state.phase.clone(),
                });
            }
            Effect::Shuffle { zones } => {
                let selected = zones.get_zones(&mut self.scope())?;
                for zone in selected {
                    self.board.shuffle_zone(zone, &mut self.rng);
                }
            }
            Effect::UseCard { cards } => {
                let selected = cards.get_cards(&mut self.scope())?;
                let Some(&card) = selected.first() else {
                    return Ok(());
                };
                let zone = self.board.card(card).zone();
                self.queue.push_back(MatchEvent::CardUsed { card, zone });
            }
            Effect::UseZone { zones } => {
                let selected = zones.get_zones(&mut self.scope())?;
                let Some(&zone) = selected.first() else {
                    return Ok(());
                };
                self.queue.push_back(MatchEvent::ZoneUsed { zone });
            }
            Effect::MoveCardToZone {
                cards,
                zones,
                to_bottom,
                face_down,
            } => {
                let destinations = zones.get_zones(&mut self.scope())?;
                for zone in destinations {
                    // Re-resolve per destination: an earlier move may have
                    // changed what the selection matches.
                    let selected = cards.get_cards(&mut self.scope())?;
                    if selected.is_empty() {
                        continue;
                    }
                    let face_down = *face_down || self.board.zone(zone).has_tag(FACE_DOWN);
                    for (offset, card) in selected.into_iter().enumerate() {
                        if self.board.card(card).zone() == Some(zone) {
                            continue;
                        }
                        if face_down {
                            self.board.card_mut(card).add_tag(FACE_DOWN);
                        }
                        let position = if *to_bottom {
                            ZonePosition::Index(offset)
                        } else {
                            ZonePosition::Top
                        };
                        let old_zone = self.board.move_card(card, zone, position);
                        if let Some(old_zone) = old_zone {
                            self.queue
                                .push_back(MatchEvent::CardLeftZone { card, old_zone });
                        }
                        self.queue.push_back(MatchEvent::CardEnteredZone {
                            card,
                            new_zone: zone,
                            old_zone,
                        });
                    }
                }
            }
            Effect::SetCardFieldValue {
                cards,
                field,
                value,
            } => {
                let selected = cards.get_cards(&mut self.scope())?;
                if selected.is_empty() {
                    return Ok(());
                }
                let Some(field_name) = field.get_string(&mut self.scope())? else {
                    warn!("set-card-field effect resolved no field name");
                    return Ok(());
                };
                for card in selected {
                    if !self.board.card(card).has_field(&field_name) {
                        continue;
                    }
                    // Resolved per card so RNG-backed values vary across the
                    // selection.
                    let operand = value.get(&mut self.scope())?;
                    let is_numeric = self.board.card(card).is_field_numeric(&field_name);
                    match operand {
                        Operand::Number(n) if is_numeric => {
                            self.board
                                .card_mut(card)
                                .set_field(&field_name, FieldValue::Number(n));
                        }
                        Operand::Text(text) if !is_numeric => {
                            self.board
                                .card_mut(card)
                                .set_field(&field_name, FieldValue::Text(text));
                        }
                        other => {
                            warn!(
                                card = %card,
                                field = %field_name,
                                kind = %other.kind(),
                                "field value kind mismatch, skipped"
                            );
                        }
                    }
                }
            }
            Effect::SetVariable { name, value } => {
                let Some(name) = name.get_string(&mut self.scope())? else {
                    warn!("set-variable effect resolved no variable name");
                    return Ok(());
                };
                let new_value = match value.get(&mut self.scope())? {
                    Operand::Number(n) => n.to_string(),
                    Operand::Text(text) => text,
                    other => {
                        warn!(
                            variable = %name,
                            kind = %other.kind(),
                            "variable value kind mismatch, skipped"
                        );
                        return Ok(());
                    }
                };
                let Some(old_value) = self.vars.set_existing(&name, new_value.clone()) else {
                    warn!(variable = %name, "set-variable target was never declared");
                    return Ok(());
                };
                self.queue.push_back(MatchEvent::VariableChanged {
                    name,
                    old_value,
                    new_value,
                });
            }
            Effect::AddTagToCard { cards, tag } => {
                let selected = cards.get_cards(&mut self.scope())?;
                if selected.is_empty() {
                    return Ok(());
                }
                let Some(tag) = tag.get_string(&mut self.scope())? else {
                    warn!("add-tag effect resolved no tag");
                    return Ok(());
                };
                for card in selected {
                    self.board.card_mut(card).add_tag(tag.clone());
                }
            }
            Effect::RemoveTagFromCard { cards, tag } => {
                let selected = cards.get_cards(&mut self.scope())?;
                if selected.is_empty() {
                    return Ok(());
                }
                let Some(tag) = tag.get_string(&mut self.scope())? else {
                    warn!("remove-tag effect resolved no tag");
                    return Ok(());
                };
                for card in selected {
                    self.board.card_mut(card).remove_tag(&tag);
                }
            }
        }
        Ok(())
    }

    /// Close the current phase and open the next, advancing the turn when
    /// the main phase sequence wraps. Subphase wraps cycle without touching
    /// the turn counter.
    fn end_current_phase(&mut self) {
        self.queue.push_back(MatchEvent::PhaseEnded {
            phase: self.state.phase.clone(),
        });
        let in_subphases = self.state.in_subphase_loop();
        let sequence = if in_subphases {
            self.state.subphases.clone()
        } else {
            self.phases.clone()
        };
        let next = sequence
            .iter()
            .position(|p| *p == self.state.phase)
            .map_or(0, |i| i + 1);
        if next >= sequence.len() {
            if !in_subphases {
                self.queue.push_back(MatchEvent::TurnEnded {
                    turn: self.state.turn,
                });
                self.state.turn += 1;
                self.queue.push_back(MatchEvent::TurnStarted {
                    turn: self.state.turn,
                });
            }
            self.state.phase = sequence[0].clone();
        } else {
            self.state.phase = sequence[next].clone();
        }
        self.queue.push_back(MatchEvent::PhaseStarted {
            phase: self.state.phase.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::core::{CardData, ZoneData};

    fn two_zone_data() -> MatchData {
        MatchData {
            zones: vec![ZoneData::new("Deck"), ZoneData::new("Hand")],
            cards: vec![
                CardData::new("Card A").in_zone("Deck"),
                CardData::new("Card B").in_zone("Deck"),
            ],
            ..MatchData::default()
        }
    }

    fn recorded(context: &mut MatchContext) -> Rc<RefCell<Vec<MatchEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        context.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    #[test]
    fn test_setup_places_start_zone_cards() {
        let context = MatchContext::setup(two_zone_data(), 1).unwrap();
        let deck = context.board().zone_by_name("Deck").unwrap();
        assert_eq!(context.board().zone(deck).count(), 2);
    }

    #[test]
    fn test_setup_rejects_unknown_start_zone() {
        let data = MatchData {
            cards: vec![CardData::new("Lost").in_zone("Nowhere")],
            ..MatchData::default()
        };
        assert_eq!(
            MatchContext::setup(data, 1).unwrap_err(),
            EngineError::UnknownStartZone("Nowhere".to_string())
        );
    }

    #[test]
    fn test_start_notifies_observers() {
        let mut context = MatchContext::setup(two_zone_data(), 1).unwrap();
        let events = recorded(&mut context);
        context.start().unwrap();
        assert_eq!(
            events.borrow().as_slice(),
            &[MatchEvent::MatchStarted { match_number: 0 }]
        );
        assert_eq!(context.state().phase, "Main");
        assert_eq!(context.numeric_variable(reserved::MATCH_NUMBER), 0.0);
    }

    #[test]
    fn test_phase_wrap_advances_turn() {
        let data = MatchData {
            phases: vec!["Draw".into(), "Play".into()],
            ..MatchData::default()
        };
        let mut context = MatchContext::setup(data, 1).unwrap();
        context.start().unwrap();
        assert_eq!(context.state().phase, "Draw");

        context.execute(&Effect::EndCurrentPhase).unwrap();
        assert_eq!(context.state().phase, "Play");
        assert_eq!(context.state().turn, 0);

        context.execute(&Effect::EndCurrentPhase).unwrap();
        assert_eq!(context.state().phase, "Draw");
        assert_eq!(context.state().turn, 1);
    }

    #[test]
    fn test_end_the_match_silences_everything() {
        let mut context = MatchContext::setup(two_zone_data(), 1).unwrap();
        context.start().unwrap();
        let events = recorded(&mut context);
        context.execute(&Effect::EndTheMatch).unwrap();
        assert!(context.is_ended());
        assert_eq!(
            events.borrow().as_slice(),
            &[MatchEvent::MatchEnded { match_number: 0 }]
        );

        events.borrow_mut().clear();
        context.execute(&Effect::EndCurrentPhase).unwrap();
        context.use_action("late").unwrap();
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_move_reports_left_then_entered() {
        let mut context = MatchContext::setup(two_zone_data(), 1).unwrap();
        context.start().unwrap();
        let events = recorded(&mut context);
        let deck = context.board().zone_by_name("Deck").unwrap();
        let hand = context.board().zone_by_name("Hand").unwrap();

        context
            .execute(&Effect::MoveCardToZone {
                cards: crate::query::CardGetter::all().id("c0"),
                zones: crate::query::ZoneGetter::all().id("z1"),
                to_bottom: false,
                face_down: false,
            })
            .unwrap();

        assert_eq!(
            events.borrow().as_slice(),
            &[
                MatchEvent::CardLeftZone {
                    card: CardId(0),
                    old_zone: deck,
                },
                MatchEvent::CardEnteredZone {
                    card: CardId(0),
                    new_zone: hand,
                    old_zone: Some(deck),
                },
            ]
        );
        assert_eq!(context.board().zone(deck).count(), 1);
        assert_eq!(context.board().zone(hand).count(), 1);
    }
}
