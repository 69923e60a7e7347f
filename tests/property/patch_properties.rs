//! Property tests for task patches and wire decoding.
//!
//! Uses proptest to verify:
//! 1. Applying a patch never changes `id` or `owner`.
//! 2. Applying the same patch twice equals applying it once.
//! 3. Fields absent from a patch are preserved.
//! 4. Arbitrary bytes never panic the wire decoders.

use proptest::prelude::*;
use taskboard_proto::task::{OwnerRef, Task, TaskId, TaskPatch};
use taskboard_proto::wire::{self, TodoList};

fn arb_task() -> impl Strategy<Value = Task> {
    (any::<u64>(), "[^\x00]{1,64}", any::<bool>(), any::<u64>()).prop_map(
        |(id, description, completed, owner)| Task {
            id: TaskId::new(id),
            description,
            completed,
            owner: OwnerRef::new(owner),
        },
    )
}

fn arb_patch() -> impl Strategy<Value = TaskPatch> {
    (
        proptest::option::of("[^\x00]{1,64}"),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(description, completed)| TaskPatch {
            description,
            completed,
        })
}

proptest! {
    #[test]
    fn apply_keeps_identity(task in arb_task(), patch in arb_patch()) {
        let mut patched = task.clone();
        patched.apply(&patch);
        prop_assert_eq!(patched.id, task.id);
        prop_assert_eq!(patched.owner, task.owner);
    }

    #[test]
    fn apply_is_idempotent(task in arb_task(), patch in arb_patch()) {
        let mut once = task;
        once.apply(&patch);
        let mut twice = once.clone();
        twice.apply(&patch);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn absent_fields_preserved(task in arb_task(), patch in arb_patch()) {
        let mut patched = task.clone();
        patched.apply(&patch);
        if patch.description.is_none() {
            prop_assert_eq!(&patched.description, &task.description);
        }
        if patch.completed.is_none() {
            prop_assert_eq!(patched.completed, task.completed);
        }
    }

    #[test]
    fn decoders_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = wire::decode::<TodoList>(&bytes);
        let _ = wire::decode::<Task>(&bytes);
        let _ = wire::decode_update_ack(&bytes);
    }
}
