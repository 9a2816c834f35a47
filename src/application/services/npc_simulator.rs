//! NPC Simulator - Advances every NPC one tick at a time
//!
//! Two independent drivers call into this service: the wander tick moves
//! idle NPCs between points of interest and the consumption tick runs order,
//! drinking and departure countdowns. Each tick reads the current NPC set,
//! builds the complete next set, and the caller swaps it in as a whole.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::aggregates::CafeState;
use crate::domain::entities::{MovementState, Npc, OrderState};
use crate::domain::events::DomainEvent;
use crate::domain::services::next_step;
use crate::domain::value_objects::{NpcId, Position, SimulationRules};

/// The NPC set produced by one tick, plus what happened along the way
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub npcs: Vec<Npc>,
    pub events: Vec<DomainEvent>,
}

/// Service for ticking the NPC state machines
#[derive(Debug, Clone, Default)]
pub struct NpcSimulator {
    rules: SimulationRules,
}

impl NpcSimulator {
    pub fn new(rules: SimulationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &SimulationRules {
        &self.rules
    }

    /// Compute one wander tick from the current state without mutating it.
    ///
    /// Occupancy is the player's cell, every NPC's position at the start of
    /// the tick, and each cell claimed by an NPC that already moved this
    /// tick. A cell vacated this tick stays blocked until the next one.
    pub fn wander_tick<R: Rng + ?Sized>(&self, state: &CafeState, rng: &mut R) -> TickOutcome {
        let grid = state.grid();
        let active = state.active_npc_id();

        let mut occupied: Vec<Position> = Vec::with_capacity(state.npcs().len() + 1);
        occupied.push(state.player().position);
        occupied.extend(state.occupied_cells());

        let mut npcs = Vec::with_capacity(state.npcs().len());
        let mut events = Vec::new();

        for current in state.npcs() {
            let mut npc = current.clone();
            if !Self::can_wander(&npc, active) {
                npcs.push(npc);
                continue;
            }

            match npc.movement {
                MovementState::Idle if npc.idle_timer > 0 => {
                    npc.idle_timer -= 1;
                }
                MovementState::Idle => {
                    if let Some(target) = grid.points_of_interest().choose(rng) {
                        npc.movement = MovementState::Moving { target: *target };
                        events.push(DomainEvent::npc_started_wandering(npc.id.clone(), *target));
                    }
                }
                MovementState::Moving { target } if npc.position == target => {
                    npc.movement = MovementState::Idle;
                    npc.idle_timer = self.rules.idle_reset_ticks;
                    events.push(DomainEvent::npc_arrived(npc.id.clone(), target));
                }
                MovementState::Moving { target } => {
                    let step = next_step(grid, npc.position, target, &occupied);
                    if step != npc.position {
                        occupied.push(step);
                        events.push(DomainEvent::npc_stepped(npc.id.clone(), npc.position, step));
                        npc.position = step;
                    }
                }
            }
            npcs.push(npc);
        }

        TickOutcome { npcs, events }
    }

    /// Compute one consumption tick from the current state without mutating it.
    ///
    /// Leaving NPCs whose countdown runs out are left out of the result.
    pub fn consumption_tick(&self, state: &CafeState) -> TickOutcome {
        let mut npcs = Vec::with_capacity(state.npcs().len());
        let mut events = Vec::new();

        for current in state.npcs() {
            let mut npc = current.clone();
            match &mut npc.order {
                OrderState::Leaving { remaining_ticks } => {
                    *remaining_ticks = remaining_ticks.saturating_sub(1);
                    if *remaining_ticks == 0 {
                        events.push(DomainEvent::npc_departed(npc.id.clone()));
                        continue;
                    }
                }
                OrderState::Consuming {
                    remaining_ticks, ..
                } => {
                    *remaining_ticks = remaining_ticks.saturating_sub(1);
                    if *remaining_ticks == 0 {
                        events.push(DomainEvent::consumption_finished(npc.id.clone()));
                        self.settle(&mut npc, &mut events);
                    }
                }
                OrderState::AwaitingOrder {
                    item_name,
                    waited_ticks,
                } => {
                    if let Some(patience) = self.rules.order_patience_ticks {
                        *waited_ticks = waited_ticks.saturating_add(1);
                        if *waited_ticks >= patience {
                            events.push(DomainEvent::order_abandoned(
                                npc.id.clone(),
                                item_name.clone(),
                            ));
                            self.settle(&mut npc, &mut events);
                        }
                    }
                }
                OrderState::None => {}
            }
            npcs.push(npc);
        }

        TickOutcome { npcs, events }
    }

    /// Run a wander tick and install its result
    pub fn advance_wander<R: Rng + ?Sized>(
        &self,
        state: &mut CafeState,
        rng: &mut R,
    ) -> Vec<DomainEvent> {
        let outcome = self.wander_tick(state, rng);
        state.replace_npcs(outcome.npcs);
        outcome.events
    }

    /// Run a consumption tick and install its result
    pub fn advance_consumption(&self, state: &mut CafeState) -> Vec<DomainEvent> {
        let outcome = self.consumption_tick(state);
        state.replace_npcs(outcome.npcs);
        outcome.events
    }

    fn settle(&self, npc: &mut Npc, events: &mut Vec<DomainEvent>) {
        npc.settle(self.rules.leaving_ticks);
        if npc.is_leaving() {
            events.push(DomainEvent::npc_started_leaving(npc.id.clone()));
        }
    }

    /// Busy NPCs stay where they are: anyone stationary, in conversation,
    /// waiting on an order, drinking or on the way out.
    fn can_wander(npc: &Npc, active: Option<&NpcId>) -> bool {
        !npc.is_stationary
            && active != Some(&npc.id)
            && matches!(npc.order, OrderState::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::domain::entities::{GridWorld, Item, NpcVariant, Player};

    fn open_grid(pois: Vec<Position>) -> Arc<GridWorld> {
        let rows: [&[u8]; 5] = [
            &[0, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0],
        ];
        Arc::new(GridWorld::from_codes(&rows, pois).unwrap())
    }

    fn customer(id: &str, x: i32, y: i32) -> Npc {
        Npc::new(id, id, "Customer", NpcVariant::Traveler, Position::new(x, y))
    }

    fn moving(id: &str, from: (i32, i32), to: (i32, i32)) -> Npc {
        let mut npc = customer(id, from.0, from.1);
        npc.movement = MovementState::Moving {
            target: Position::new(to.0, to.1),
        };
        npc
    }

    fn state_with(npcs: Vec<Npc>, player: (i32, i32)) -> CafeState {
        let pois = vec![Position::new(0, 0), Position::new(4, 4), Position::new(2, 2)];
        CafeState::new(
            open_grid(pois),
            npcs,
            vec![],
            Player::new(Position::new(player.0, player.1)),
        )
        .unwrap()
    }

    fn serving(mut npc: Npc, item: &str, ticks: u32) -> Npc {
        npc.place_order(item).unwrap();
        npc.serve(Item::new(item, "🥛", "test"), ticks).unwrap();
        npc
    }

    #[test]
    fn test_idle_timer_counts_down_then_picks_target() {
        let simulator = NpcSimulator::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = state_with(vec![customer("mia", 1, 1).with_idle_timer(2)], (4, 0));

        simulator.advance_wander(&mut state, &mut rng);
        assert_eq!(state.npcs()[0].idle_timer, 1);
        simulator.advance_wander(&mut state, &mut rng);
        assert_eq!(state.npcs()[0].idle_timer, 0);
        assert!(state.npcs()[0].target().is_none());

        let events = simulator.advance_wander(&mut state, &mut rng);
        let target = state.npcs()[0].target().unwrap();
        assert!(state.grid().points_of_interest().contains(&target));
        assert_eq!(state.npcs()[0].position, Position::new(1, 1));
        assert!(matches!(&events[0], DomainEvent::NpcStartedWandering { .. }));
    }

    #[test]
    fn test_arrival_resets_idle_timer() {
        let simulator = NpcSimulator::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = state_with(vec![moving("ken", (2, 2), (2, 2))], (4, 0));

        simulator.advance_wander(&mut state, &mut rng);
        let ken = &state.npcs()[0];
        assert_eq!(ken.movement, MovementState::Idle);
        assert_eq!(ken.idle_timer, 4);
    }

    #[test]
    fn test_moving_npc_takes_one_greedy_step() {
        let simulator = NpcSimulator::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = state_with(vec![moving("ken", (0, 2), (4, 2))], (4, 0));

        let events = simulator.advance_wander(&mut state, &mut rng);
        assert_eq!(state.npcs()[0].position, Position::new(1, 2));
        assert!(matches!(&events[0], DomainEvent::NpcStepped { .. }));
    }

    #[test]
    fn test_same_tick_claims_block_later_npcs() {
        let simulator = NpcSimulator::default();
        let mut rng = StdRng::seed_from_u64(1);
        // Both want (1, 1); the first in roster order wins it.
        let mut state = state_with(
            vec![moving("a", (0, 1), (2, 1)), moving("b", (1, 0), (1, 2))],
            (4, 4),
        );

        simulator.advance_wander(&mut state, &mut rng);
        assert_eq!(state.npcs()[0].position, Position::new(1, 1));
        assert_eq!(state.npcs()[1].position, Position::new(1, 0));
    }

    #[test]
    fn test_vacated_cell_stays_blocked_for_the_tick() {
        let simulator = NpcSimulator::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = state_with(
            vec![moving("a", (0, 0), (2, 0)), moving("b", (1, 0), (2, 0))],
            (4, 4),
        );

        simulator.advance_wander(&mut state, &mut rng);
        assert_eq!(state.npcs()[0].position, Position::new(0, 0));
        assert_eq!(state.npcs()[1].position, Position::new(2, 0));
    }

    #[test]
    fn test_npc_never_steps_onto_player() {
        let simulator = NpcSimulator::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = state_with(vec![moving("a", (0, 0), (2, 0))], (1, 0));

        simulator.advance_wander(&mut state, &mut rng);
        assert_eq!(state.npcs()[0].position, Position::new(0, 0));
    }

    #[test]
    fn test_busy_npcs_do_not_wander() {
        let simulator = NpcSimulator::default();
        let mut rng = StdRng::seed_from_u64(3);

        let stationary = customer("stationary", 0, 1).stationary();
        let mut waiting = moving("waiting", (1, 3), (4, 3));
        waiting.place_order("Latte").unwrap();
        waiting.movement = MovementState::Moving {
            target: Position::new(4, 3),
        };
        let drinking = serving(moving("drinking", (3, 0), (3, 4)), "Latte", 40);
        let mut leaving = moving("leaving", (0, 4), (4, 4));
        leaving.start_leaving(5);
        let talking = moving("talking", (2, 2), (2, 4));

        let mut state = state_with(vec![stationary, waiting, drinking, leaving, talking], (4, 0));
        state.set_interaction_target(Some(NpcId::from("talking")));
        let before: Vec<Position> = state.npcs().iter().map(|n| n.position).collect();

        for _ in 0..20 {
            let events = simulator.advance_wander(&mut state, &mut rng);
            assert!(events.is_empty());
        }
        let after: Vec<Position> = state.npcs().iter().map(|n| n.position).collect();
        assert_eq!(before, after);
        assert_eq!(state.npcs()[0].movement, MovementState::Idle);
    }

    #[test]
    fn test_cells_stay_unique_under_random_wandering() {
        let simulator = NpcSimulator::default();
        let mut rng = StdRng::seed_from_u64(42);
        let npcs = vec![
            customer("a", 0, 1),
            customer("b", 1, 0),
            customer("c", 3, 3),
            customer("d", 4, 3),
            customer("e", 2, 1).with_idle_timer(1),
        ];
        let mut state = state_with(npcs, (2, 3));

        for _ in 0..300 {
            simulator.advance_wander(&mut state, &mut rng);
            let cells: HashSet<Position> = state.npcs().iter().map(|n| n.position).collect();
            assert_eq!(cells.len(), state.npcs().len());
            assert!(!cells.contains(&state.player().position));
        }
    }

    #[test]
    fn test_consumption_then_leaving_then_removed() {
        let simulator = NpcSimulator::default();
        let mut state = state_with(vec![serving(customer("lily", 1, 1), "Latte", 40)], (4, 4));

        for _ in 0..39 {
            simulator.advance_consumption(&mut state);
        }
        assert!(state.npcs()[0].beverage().is_some());

        let events = simulator.advance_consumption(&mut state);
        assert_eq!(state.npcs()[0].order, OrderState::Leaving { remaining_ticks: 5 });
        assert!(state.npcs()[0].beverage().is_none());
        assert!(events
            .iter()
            .any(|e| matches!(e, DomainEvent::NpcStartedLeaving { .. })));

        for _ in 0..4 {
            simulator.advance_consumption(&mut state);
        }
        assert_eq!(state.npcs().len(), 1);

        let events = simulator.advance_consumption(&mut state);
        assert!(state.npcs().is_empty());
        assert!(matches!(&events[0], DomainEvent::NpcDeparted { .. }));
    }

    #[test]
    fn test_drink_with_no_ticks_left_settles_on_next_tick() {
        let simulator = NpcSimulator::default();
        let lily = serving(customer("lily", 1, 1), "Latte", 0);
        let jack = serving(customer("jack", 3, 3).permanent(), "Espresso", 0);
        let mut state = state_with(vec![lily, jack], (4, 4));

        let events = simulator.advance_consumption(&mut state);
        assert_eq!(state.npcs()[0].order, OrderState::Leaving { remaining_ticks: 5 });
        assert_eq!(state.npcs()[1].order, OrderState::None);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, DomainEvent::ConsumptionFinished { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_permanent_npc_returns_to_none() {
        let simulator = NpcSimulator::default();
        let jack = serving(customer("jack", 1, 1).permanent(), "Espresso", 3);
        let mut state = state_with(vec![jack], (4, 4));

        for _ in 0..3 {
            simulator.advance_consumption(&mut state);
        }
        assert_eq!(state.npcs()[0].order, OrderState::None);

        for _ in 0..50 {
            simulator.advance_consumption(&mut state);
        }
        assert_eq!(state.npcs().len(), 1);
        assert!(!state.npcs()[0].is_leaving());
    }

    #[test]
    fn test_awaiting_order_waits_forever_by_default() {
        let simulator = NpcSimulator::default();
        let mut npc = customer("lily", 1, 1);
        npc.place_order("Latte").unwrap();
        let mut state = state_with(vec![npc], (4, 4));

        for _ in 0..500 {
            simulator.advance_consumption(&mut state);
        }
        assert_eq!(state.npcs()[0].pending_order(), Some("Latte"));
    }

    #[test]
    fn test_order_patience_runs_out() {
        let rules = SimulationRules {
            order_patience_ticks: Some(3),
            ..SimulationRules::default()
        };
        let simulator = NpcSimulator::new(rules);
        let mut visitor = customer("ken", 1, 1);
        visitor.place_order("Croissant").unwrap();
        let mut regular = customer("jack", 3, 3).permanent();
        regular.place_order("Espresso").unwrap();
        let mut state = state_with(vec![visitor, regular], (4, 4));

        simulator.advance_consumption(&mut state);
        simulator.advance_consumption(&mut state);
        assert_eq!(state.awaiting_order_count(), 2);

        let events = simulator.advance_consumption(&mut state);
        assert!(state.npcs()[0].is_leaving());
        assert_eq!(state.npcs()[1].order, OrderState::None);
        let abandoned = events
            .iter()
            .filter(|e| matches!(e, DomainEvent::OrderAbandoned { .. }))
            .count();
        assert_eq!(abandoned, 2);
    }
}
