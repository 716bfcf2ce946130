use flappy_stage::model::PipePair;
use flappy_stage::rng::{Entropy, Scripted};
use flappy_stage::stage::{Stage, StageEvent};
use flappy_stage::world::{GROUP_PIPE_SPACING, MAX_TOP_HEIGHT, MIN_TOP_HEIGHT};
use std::collections::{BTreeMap, HashSet};

/// A stage holding one static pipe that leaves the screen on the next tick.
fn stage_with_exiting_pipe() -> Stage {
    let mut stage = Stage::new(5.0);
    stage.create_pipe_pair(-100.0, 0, &mut Scripted::quiet());
    stage
}

#[test]
fn score_25_ascending_animated_staircase() {
    let mut stage = stage_with_exiting_pipe();
    // group roll, size 3, animated, ascending, first top offset 50
    let mut rng = Scripted::new([0.1, 0.6, 0.1, 0.1, 0.0]);

    let events = stage.advance(25, &mut rng);

    assert_eq!(
        events,
        vec![
            StageEvent::GroupSpawned {
                group: 0,
                size: 3,
                ascending: true,
                animated: true,
            },
            StageEvent::PipePassed { total: 1 },
        ]
    );
    let pipes = stage.pipes();
    assert_eq!(pipes.len(), 3);

    let group = pipes[0].group_id();
    assert!(group.is_some());
    assert!(pipes.iter().all(|p| p.group_id() == group));
    assert_eq!(pipes.iter().filter(|p| p.is_group_leader()).count(), 1);

    let xs: Vec<f64> = pipes.iter().map(|p| p.x).collect();
    assert_eq!(xs, vec![1100.0, 1100.0 + GROUP_PIPE_SPACING, 1100.0 + 2.0 * GROUP_PIPE_SPACING]);
    let bottoms: Vec<f64> = pipes.iter().map(PipePair::gap_bottom).collect();
    assert_eq!(bottoms, vec![330.0, 350.0, 370.0]);
}

#[test]
fn degenerate_staircase_falls_back_to_single_pipe() {
    let mut stage = stage_with_exiting_pipe();
    // group roll, size 2, static, ascending, first top pinned at the limit
    let mut rng = Scripted::new([0.1, 0.0, 0.9, 0.1, 0.999]);

    let events = stage.advance(25, &mut rng);

    assert_eq!(events, vec![StageEvent::PipePassed { total: 1 }]);
    assert_eq!(stage.pipes().len(), 1);
    assert!(stage.pipes()[0].group.is_none());
}

#[test]
fn low_scores_never_roll_for_groups() {
    let mut stage = stage_with_exiting_pipe();
    let mut rng = Scripted::new([0.0; 8]);
    let events = stage.advance(14, &mut rng);
    assert_eq!(events, vec![StageEvent::PipePassed { total: 1 }]);
    assert!(stage.pipes()[0].group.is_none());
}

#[test]
fn long_run_keeps_every_invariant() {
    let mut stage = Stage::new(5.0);
    let mut rng = Entropy::new(Some(0x5eed));
    stage.populate(4, 4, &mut rng);

    let mut score = 0;
    let mut phases = HashSet::new();
    let mut batches = 0;
    let mut gates = 0;

    for _ in 0..5_000 {
        for event in stage.advance(score, &mut rng) {
            match event {
                StageEvent::PipePassed { .. } => score += 1,
                StageEvent::HazardsSpawned { phase, count } => {
                    assert_eq!(count, phase.min(9));
                    assert!(phases.insert(phase), "phase {phase} spawned twice");
                    batches += 1;
                }
                StageEvent::GateSpawned { .. } => gates += 1,
                StageEvent::GroupSpawned { size, .. } => assert!(size >= 2),
            }
        }

        let mut groups: BTreeMap<u32, Vec<&PipePair>> = BTreeMap::new();
        for pair in stage.pipes() {
            assert!(pair.current_top >= MIN_TOP_HEIGHT && pair.current_top <= MAX_TOP_HEIGHT);
            if let Some(id) = pair.group_id() {
                groups.entry(id).or_default().push(pair);
            }
        }
        for members in groups.values() {
            assert!(members.len() >= 2);
            assert_eq!(members.iter().filter(|p| p.is_group_leader()).count(), 1);
            if members.iter().all(|p| !p.is_animated()) {
                let mut sorted = members.clone();
                sorted.sort_by_key(|p| p.group_index());
                let steps: Vec<f64> = sorted
                    .windows(2)
                    .map(|w| w[1].gap_bottom() - w[0].gap_bottom())
                    .collect();
                assert!(steps.iter().all(|s| s.abs() == 20.0 || s.abs() == 50.0));
                assert!(steps.windows(2).all(|w| w[0] == w[1]));
            }
        }
    }

    assert!(score > 100, "only {score} pipes passed");
    assert!(batches > 0);
    assert_eq!(gates, batches / 2);
}
