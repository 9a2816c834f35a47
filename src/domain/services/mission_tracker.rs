//! Mission tracker - Derives mission completion from session events
//!
//! Every function returns the ids of missions that flipped to completed on
//! this call. Missions already completed are left alone, so re-triggering is
//! a no-op.

use crate::domain::entities::{Mission, MissionObjective, Npc};
use crate::domain::value_objects::MissionId;

/// Re-evaluate order-taking missions after an NPC started awaiting an order.
///
/// `awaiting` is the number of NPCs with a pending order right now.
pub fn on_order_taken(missions: &mut [Mission], awaiting: usize) -> Vec<MissionId> {
    complete_where(missions, |mission| match mission.objective {
        MissionObjective::TakeOrders { count } => awaiting >= count,
        _ => false,
    })
}

/// Complete delivery missions after a correct order was served.
pub fn on_order_fulfilled(missions: &mut [Mission]) -> Vec<MissionId> {
    complete_where(missions, |mission| {
        mission.objective == MissionObjective::ServeOrder
    })
}

/// Complete the object mission attached to `npc` when the player said its
/// trigger word (case-insensitive) or the dialogue flagged it as done.
pub fn on_object_visit(
    missions: &mut [Mission],
    npc: &Npc,
    utterance: &str,
    flagged: bool,
) -> Vec<MissionId> {
    let Some(mission_id) = npc.mission_id.as_ref() else {
        return Vec::new();
    };

    let said_trigger = npc
        .mission_trigger
        .as_deref()
        .map(|trigger| !trigger.is_empty() && contains_ignore_case(utterance, trigger))
        .unwrap_or(false);
    if !said_trigger && !flagged {
        return Vec::new();
    }

    complete_where(missions, |mission| {
        &mission.id == mission_id
            && mission.objective == MissionObjective::VisitObject
            && mission
                .required_npc_id
                .as_ref()
                .map_or(true, |required| required == &npc.id)
    })
}

fn complete_where(
    missions: &mut [Mission],
    mut predicate: impl FnMut(&Mission) -> bool,
) -> Vec<MissionId> {
    missions
        .iter_mut()
        .filter(|mission| !mission.is_completed() && predicate(mission))
        .filter_map(|mission| mission.complete().then(|| mission.id.clone()))
        .collect()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NpcVariant;
    use crate::domain::value_objects::Position;

    fn missions() -> Vec<Mission> {
        vec![
            Mission::new("m1", "Morning Rush", "Take 3 orders", MissionObjective::TakeOrders { count: 3 }),
            Mission::new("m2", "Fulfillment Expert", "Serve a drink", MissionObjective::ServeOrder),
            Mission::new("m3", "Clean Environment", "Check the trash", MissionObjective::VisitObject)
                .with_required_npc("trash_bin"),
        ]
    }

    fn trash_bin() -> Npc {
        Npc::new("trash_bin", "Bin", "Object", NpcVariant::Object, Position::new(8, 10))
            .with_mission(MissionId::from("m3"), "trash")
    }

    #[test]
    fn test_order_mission_needs_threshold() {
        let mut missions = missions();
        assert!(on_order_taken(&mut missions, 1).is_empty());
        assert!(on_order_taken(&mut missions, 2).is_empty());
        assert!(!missions[0].is_completed());

        let completed = on_order_taken(&mut missions, 3);
        assert_eq!(completed, vec![MissionId::from("m1")]);
        assert!(missions[0].is_completed());
        assert!(on_order_taken(&mut missions, 4).is_empty());
    }

    #[test]
    fn test_fulfilment_completes_once() {
        let mut missions = missions();
        assert_eq!(on_order_fulfilled(&mut missions), vec![MissionId::from("m2")]);
        assert!(on_order_fulfilled(&mut missions).is_empty());
        assert!(missions[1].is_completed());
    }

    #[test]
    fn test_object_visit_needs_trigger_or_flag() {
        let mut missions = missions();
        let bin = trash_bin();

        assert!(on_object_visit(&mut missions, &bin, "hello there", false).is_empty());
        assert!(!missions[2].is_completed());

        let completed = on_object_visit(&mut missions, &bin, "Is the TRASH emptied?", false);
        assert_eq!(completed, vec![MissionId::from("m3")]);
        assert!(on_object_visit(&mut missions, &bin, "trash", true).is_empty());
    }

    #[test]
    fn test_object_visit_by_flag() {
        let mut missions = missions();
        let completed = on_object_visit(&mut missions, &trash_bin(), "all tidy", true);
        assert_eq!(completed, vec![MissionId::from("m3")]);
    }

    #[test]
    fn test_object_visit_ignores_npcs_without_missions() {
        let mut missions = missions();
        let lily = Npc::new("lily", "Lily", "Student", NpcVariant::Student, Position::new(6, 5));
        assert!(on_object_visit(&mut missions, &lily, "trash", true).is_empty());
        assert!(missions.iter().all(|m| !m.is_completed()));
    }
}
