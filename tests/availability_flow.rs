use std::sync::Arc;

use when_to_pair_lib::pairing::{hill_climb_random_start, matching_greedy, ScoreTable};
use when_to_pair_lib::schedule::{
    Cell, Day, DecodePolicy, GestureState, Highlight, OverlapResult, SelectionGestureController,
    SlotCatalog, SlotSetCodec, WeeklyAvailability, WeeklyPayload,
};

use rand::{rngs::StdRng, SeedableRng};

fn codec() -> SlotSetCodec {
    SlotSetCodec::new(Arc::new(SlotCatalog::standard()), DecodePolicy::Lenient)
}

fn cell(day: Day, slot: usize) -> Cell {
    Cell { day, slot }
}

#[test]
fn painted_week_survives_submission_and_reload() {
    let codec = codec();
    let mut controller = SelectionGestureController::headless(WeeklyAvailability::new(
        codec.shared_catalog(),
    ));

    controller.on_pointer_down(cell(Day::Mon, 0)).unwrap();
    controller.on_pointer_enter(cell(Day::Mon, 1)).unwrap();
    controller.on_pointer_enter(cell(Day::Mon, 2)).unwrap();
    controller.on_pointer_up();
    assert_eq!(controller.state(), GestureState::Idle);

    // Entering cells while idle changes nothing.
    controller.on_pointer_enter(cell(Day::Tue, 5)).unwrap();

    let payload = controller.availability().to_payload(&codec);
    assert_eq!(payload.get(Day::Mon), 0b111);
    assert_eq!(payload.get(Day::Tue), 0);

    let json = serde_json::to_string(&payload).unwrap();
    let reloaded: WeeklyPayload = serde_json::from_str(&json).unwrap();
    let restored = WeeklyAvailability::from_payload(&codec, &reloaded).unwrap();
    assert_eq!(
        restored.selected_labels(Day::Mon),
        vec!["900".to_string(), "930".to_string(), "1000".to_string()]
    );
    assert_eq!(restored.total_free_slots(), 3);
}

#[test]
fn drag_started_on_selected_cell_erases() {
    let codec = codec();
    let mut availability = WeeklyAvailability::new(codec.shared_catalog());
    for index in 0..4 {
        availability.select_index(Day::Wed, index).unwrap();
    }
    let mut controller = SelectionGestureController::headless(availability);

    controller.on_pointer_down(cell(Day::Wed, 1)).unwrap();
    controller.on_pointer_enter(cell(Day::Wed, 2)).unwrap();
    controller.on_pointer_enter(cell(Day::Wed, 7)).unwrap();
    controller.on_pointer_up();

    let availability = controller.into_availability();
    assert!(availability.is_selected_index(Day::Wed, 0));
    assert!(!availability.is_selected_index(Day::Wed, 1));
    assert!(!availability.is_selected_index(Day::Wed, 2));
    assert!(availability.is_selected_index(Day::Wed, 3));
    assert!(!availability.is_selected_index(Day::Wed, 7));
}

#[test]
fn two_students_overlap_on_monday() {
    let codec = codec();
    let mut a = WeeklyAvailability::new(codec.shared_catalog());
    let mut b = WeeklyAvailability::new(codec.shared_catalog());
    a.select_named("Mon", "900").unwrap();
    a.select_named("Mon", "930").unwrap();
    b.select_named("Mon", "930").unwrap();
    b.select_named("Mon", "1000").unwrap();

    let result = OverlapResult::compute(a.to_payload(&codec), b.to_payload(&codec));
    assert_eq!(result.both.get(Day::Mon), 0b010);
    assert_eq!(result.either.get(Day::Mon), 0b111);
    assert_eq!(result.highlight(Day::Mon, 0), Highlight::OnlyA);
    assert_eq!(result.highlight(Day::Mon, 1), Highlight::Both);
    assert_eq!(result.highlight(Day::Mon, 2), Highlight::OnlyB);

    let shared = result.shared_labels(&codec).unwrap();
    assert_eq!(shared[&Day::Mon], vec!["930".to_string()]);
    assert!(shared[&Day::Fri].is_empty());
    assert_eq!(result.score(), 0);
}

#[test]
fn random_roster_pairs_everyone() {
    let codec = codec();
    let mut rng = StdRng::seed_from_u64(11);
    let payloads: Vec<WeeklyPayload> = (0..9)
        .map(|_| WeeklyAvailability::random(codec.shared_catalog(), &mut rng).to_payload(&codec))
        .collect();
    let table = ScoreTable::build(&payloads);

    let greedy = matching_greedy(&table);
    assert_eq!(greedy.pairs().len(), 4);
    assert_eq!(greedy.unpaired().len(), 1);

    let climbed = hill_climb_random_start(&table, &mut rng);
    assert_eq!(climbed.pairs().len(), 4);
    assert_eq!(climbed.unpaired().len(), 1);
    for (i, j) in climbed.pairs() {
        assert_eq!(climbed.partner_of(i), Some(j));
        assert_eq!(climbed.partner_of(j), Some(i));
    }
}
