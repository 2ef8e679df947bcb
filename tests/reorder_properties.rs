//! Exhaustive checks of the reorder invariants: every (dragged, target,
//! position) triple over a few hand-built forests.

use bujo::model::{DropPosition, MoveRequest, TaskNode};
use bujo::ops::forest::{collect_ids, count_nodes, find_location, find_task, for_each_task, subtree_contains};
use bujo::ops::reorder::{ReorderError, reorder};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

const POSITIONS: [DropPosition; 3] = [DropPosition::Before, DropPosition::After, DropPosition::Inside];

fn task(id: u64, children: Vec<TaskNode>) -> TaskNode {
    let mut t = TaskNode::new(id, format!("task {}", id)).with_children(children);
    t.due_date = Some(format!("2020-01-{:02}", id));
    t.labels = vec![id * 10];
    t.extra
        .insert("ownerColor".into(), serde_json::Value::String(format!("#{:06}", id)));
    t
}

fn forests() -> Vec<Vec<TaskNode>> {
    vec![
        // [A[B, C], D]
        vec![task(1, vec![task(2, vec![]), task(3, vec![])]), task(4, vec![])],
        // A[B[C[D]]] chain
        vec![task(1, vec![task(2, vec![task(3, vec![task(4, vec![])])])])],
        // wide and nested
        vec![
            task(1, vec![]),
            task(2, vec![task(5, vec![task(7, vec![])]), task(6, vec![])]),
            task(3, vec![]),
            task(4, vec![task(8, vec![])]),
        ],
    ]
}

fn id_set(tasks: &[TaskNode]) -> BTreeSet<u64> {
    collect_ids(tasks).into_iter().collect()
}

/// Payload of one task, with children stripped
fn payload(t: &TaskNode) -> TaskNode {
    TaskNode {
        sub_tasks: Vec::new(),
        ..t.clone()
    }
}

#[test]
fn conservation_and_placement_for_every_move() {
    for forest in forests() {
        let ids = collect_ids(&forest);
        for &dragged in &ids {
            for &target in &ids {
                for position in POSITIONS {
                    let mv = MoveRequest::new(dragged, target, position);
                    let dragged_node = find_task(&forest, dragged).unwrap();

                    if subtree_contains(dragged_node, target) {
                        let err = reorder(&forest, &mv).unwrap_err();
                        assert!(
                            matches!(err, ReorderError::InvalidMove { .. }),
                            "{:?} should be rejected",
                            mv
                        );
                        continue;
                    }

                    let out = reorder(&forest, &mv).unwrap();
                    assert_eq!(count_nodes(&out), count_nodes(&forest), "{:?}", mv);
                    assert_eq!(id_set(&out), id_set(&forest), "{:?}", mv);

                    // Moved subtree is intact
                    assert_eq!(find_task(&out, dragged).unwrap(), dragged_node, "{:?}", mv);

                    // Every payload survives untouched
                    for_each_task(&forest, &mut |orig| {
                        let now = find_task(&out, orig.id).unwrap();
                        assert_eq!(payload(now), payload(orig), "{:?}", mv);
                    });

                    // Landed where asked
                    let target_loc = find_location(&out, target).unwrap();
                    let dragged_loc = find_location(&out, dragged).unwrap();
                    match position {
                        DropPosition::Before => {
                            assert_eq!(dragged_loc.parent_id, target_loc.parent_id);
                            assert_eq!(dragged_loc.sibling_index + 1, target_loc.sibling_index);
                        }
                        DropPosition::After => {
                            assert_eq!(dragged_loc.parent_id, target_loc.parent_id);
                            assert_eq!(dragged_loc.sibling_index, target_loc.sibling_index + 1);
                        }
                        DropPosition::Inside => {
                            let target_node = find_task(&out, target).unwrap();
                            assert_eq!(dragged_loc.parent_id, Some(target));
                            assert_eq!(dragged_loc.sibling_index + 1, target_node.sub_tasks.len());
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn other_siblings_keep_relative_order() {
    let forest = forests().remove(2);
    let out = reorder(&forest, &MoveRequest::new(2, 4, DropPosition::Inside)).unwrap();
    let top: Vec<u64> = out.iter().map(|t| t.id).collect();
    assert_eq!(top, vec![1, 3, 4]);
    let under_4: Vec<u64> = out[2].sub_tasks.iter().map(|t| t.id).collect();
    assert_eq!(under_4, vec![8, 2]);
}

#[test]
fn dropping_next_to_itself_is_identity() {
    for forest in forests() {
        let mut moves = Vec::new();
        for_each_task(&forest, &mut |t| {
            // Each child is already the last child of its parent, or sits
            // right before its next sibling.
            if let Some(last) = t.sub_tasks.last() {
                moves.push(MoveRequest::new(last.id, t.id, DropPosition::Inside));
            }
            for pair in t.sub_tasks.windows(2) {
                moves.push(MoveRequest::new(pair[0].id, pair[1].id, DropPosition::Before));
                moves.push(MoveRequest::new(pair[1].id, pair[0].id, DropPosition::After));
            }
        });
        for pair in forest.windows(2) {
            moves.push(MoveRequest::new(pair[0].id, pair[1].id, DropPosition::Before));
            moves.push(MoveRequest::new(pair[1].id, pair[0].id, DropPosition::After));
        }
        assert!(!moves.is_empty());
        for mv in moves {
            assert_eq!(reorder(&forest, &mv).unwrap(), forest, "{:?}", mv);
        }
    }
}

#[test]
fn failures_leave_input_alone() {
    let forest = forests().remove(0);
    let snapshot = forest.clone();
    assert!(reorder(&forest, &MoveRequest::new(1, 3, DropPosition::After)).is_err());
    assert!(reorder(&forest, &MoveRequest::new(9, 3, DropPosition::After)).is_err());
    assert!(reorder(&forest, &MoveRequest::new(3, 9, DropPosition::After)).is_err());
    assert_eq!(forest, snapshot);
}

#[test]
fn json_forest_survives_move() {
    let json = r#"[
        {"id": 10, "name": "Groceries", "status": "READY", "reminderSetting": {"date": "2020-05-01"},
         "subTasks": [{"id": 11, "name": "Milk", "subTasks": []}]},
        {"id": 12, "name": "Laundry", "assignees": ["sam"], "subTasks": []}
    ]"#;
    let forest: Vec<TaskNode> = serde_json::from_str(json).unwrap();
    let out = reorder(&forest, &MoveRequest::new(12, 11, DropPosition::Before)).unwrap();

    let value = serde_json::to_value(&out).unwrap();
    assert_eq!(value[0]["reminderSetting"]["date"], "2020-05-01");
    assert_eq!(value[0]["subTasks"][0]["name"], "Laundry");
    assert_eq!(value[0]["subTasks"][0]["assignees"][0], "sam");
    assert_eq!(value[0]["subTasks"][1]["name"], "Milk");
    assert_eq!(value.as_array().unwrap().len(), 1);
}
