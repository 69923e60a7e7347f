//! Seed collection used by the demo server and the offline client.

use crate::task::{OwnerRef, Task, TaskId};

const SEED: [(&str, bool, u64); 6] = [
    ("Do something nice for someone you care about", false, 152),
    ("Memorize a poem", true, 13),
    ("Watch a classic movie", true, 68),
    ("Watch a documentary", false, 84),
    ("Invest in cryptocurrency", false, 163),
    ("Contribute code or a monetary donation to an open-source project", false, 69),
];

/// Returns the seed collection with ids `1..=n` in server order.
#[must_use]
pub fn demo_tasks() -> Vec<Task> {
    SEED.iter()
        .zip(1u64..)
        .map(|(&(description, completed, owner), id)| Task {
            id: TaskId::new(id),
            description: description.to_string(),
            completed,
            owner: OwnerRef::new(owner),
        })
        .collect()
}
