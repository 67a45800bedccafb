/// Property-based tests for bracket generation and advancement using proptest
///
/// Brackets of random size and format are played to completion with random
/// results, and the finished graph is checked for a single champion and
/// consistent eliminations.
use bracket_engine::{
    BracketEngine, BracketFormat, BracketState, EngineConfig, Entrant, EntrantId,
    GrandFinalPolicy, MatchReport, Segment,
};
use proptest::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::{BTreeMap, BTreeSet};

fn roster(n: usize) -> Vec<Entrant> {
    (1..=n as EntrantId)
        .map(|id| Entrant::new(id, format!("Player {id}"), format!("P{id}")))
        .collect()
}

fn format_strategy() -> impl Strategy<Value = BracketFormat> {
    prop_oneof![
        Just(BracketFormat::SingleElimination),
        Just(BracketFormat::DoubleElimination),
    ]
}

fn policy_strategy() -> impl Strategy<Value = GrandFinalPolicy> {
    prop_oneof![
        Just(GrandFinalPolicy::Reset),
        Just(GrandFinalPolicy::SingleMatch),
    ]
}

fn generate(
    n: usize,
    format: BracketFormat,
    policy: GrandFinalPolicy,
    seed: u64,
) -> BracketState {
    let engine = BracketEngine::new(EngineConfig {
        grand_final: policy,
        ..EngineConfig::default()
    });
    engine
        .generate(roster(n), format, &mut StdRng::seed_from_u64(seed))
        .expect("valid roster")
}

// Report random results until nothing is left to play
fn play_out(state: &mut BracketState, rng: &mut StdRng) -> usize {
    let mut played = 0;
    while let Some(&id) = state.ready_matches().first() {
        let winner = usize::from(rng.random_bool(0.5));
        state
            .advance(id, MatchReport::Winner(winner))
            .expect("ready match accepts a result");
        played += 1;
        assert!(played <= state.len(), "more results than matches");
    }
    played
}

fn losses(state: &BracketState) -> BTreeMap<EntrantId, usize> {
    let mut losses = BTreeMap::new();
    for m in state.matches() {
        if let Some(loser) = m.loser() {
            *losses.entry(loser.id).or_insert(0) += 1;
        }
    }
    losses
}

proptest! {
    #[test]
    fn test_play_out_crowns_one_champion(
        n in 2usize..=40,
        format in format_strategy(),
        policy in policy_strategy(),
        seed in any::<u64>(),
    ) {
        let mut state = generate(n, format, policy, seed);
        let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);
        play_out(&mut state, &mut rng);

        prop_assert!(state.is_complete());
        let champion = state.champion().map(|e| e.id).expect("champion");
        let losses = losses(&state);

        match format {
            BracketFormat::SingleElimination => {
                prop_assert_eq!(losses.len(), n - 1);
                prop_assert!(losses.values().all(|&count| count == 1));
                prop_assert!(!losses.contains_key(&champion));
            }
            BracketFormat::DoubleElimination => {
                prop_assert_eq!(losses.len() + usize::from(!losses.contains_key(&champion)), n);
                prop_assert!(losses.values().all(|&count| count <= 2));
                prop_assert!(losses.get(&champion).copied().unwrap_or(0) <= 1);
            }
        }
    }

    #[test]
    fn test_no_entrant_meets_itself(
        n in 2usize..=40,
        format in format_strategy(),
        seed in any::<u64>(),
    ) {
        let mut state = generate(n, format, GrandFinalPolicy::Reset, seed);
        let mut rng = StdRng::seed_from_u64(seed);
        play_out(&mut state, &mut rng);

        for m in state.matches() {
            let [first, second] = m.slots();
            if let (Some(a), Some(b)) = (first.entrant(), second.entrant()) {
                prop_assert_ne!(a.id, b.id, "match {}", m.id());
            }
        }
    }

    #[test]
    fn test_grand_final_holds_both_segment_champions(
        n in 2usize..=40,
        policy in policy_strategy(),
        seed in any::<u64>(),
    ) {
        let mut state = generate(n, BracketFormat::DoubleElimination, policy, seed);
        let mut rng = StdRng::seed_from_u64(seed.rotate_left(7));
        play_out(&mut state, &mut rng);

        let grand_final = state.grand_final().expect("grand final");
        let finalists: BTreeSet<EntrantId> = grand_final
            .slots()
            .iter()
            .filter_map(|slot| slot.entrant().map(|e| e.id))
            .collect();

        // feeders of the grand final, winners final first
        let feeders: Vec<_> = state
            .matches()
            .filter(|m| m.next_match() == Some(grand_final.id()))
            .collect();
        let winners_final = feeders
            .iter()
            .find(|m| m.segment() == Segment::Winners)
            .expect("winners final");
        let winners_champion = winners_final.winner().map(|e| e.id).expect("decided");
        let losers_champion = match feeders.iter().find(|m| m.segment() == Segment::Losers) {
            Some(losers_final) => losers_final.winner().map(|e| e.id),
            None => winners_final.loser().map(|e| e.id),
        }
        .expect("decided");

        prop_assert_eq!(finalists, BTreeSet::from([winners_champion, losers_champion]));
    }

    #[test]
    fn test_snapshot_round_trip(
        n in 2usize..=40,
        format in format_strategy(),
        policy in policy_strategy(),
        seed in any::<u64>(),
        results in 0usize..80,
    ) {
        let mut state = generate(n, format, policy, seed);
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..results {
            let Some(&id) = state.ready_matches().first() else {
                break;
            };
            let winner = usize::from(rng.random_bool(0.5));
            state.advance(id, MatchReport::Winner(winner)).expect("advance");
        }

        let restored = BracketState::from_snapshot(state.to_snapshot()).expect("restore");
        prop_assert_eq!(restored.champion(), state.champion());
        prop_assert_eq!(&restored, &state);

        let native = serde_json::to_string(&state).expect("serialize");
        let restored: BracketState = serde_json::from_str(&native).expect("deserialize");
        prop_assert_eq!(restored, state);
    }

    #[test]
    fn test_bye_count_matches_plan(n in 2usize..=200) {
        let state = generate(n, BracketFormat::SingleElimination, GrandFinalPolicy::Reset, 0);
        let size = n.next_power_of_two();
        prop_assert_eq!(state.len(), size - 1);

        let byes = state
            .matches()
            .filter(|m| m.is_bye())
            .count();
        prop_assert_eq!(byes, size - n);
    }
}
