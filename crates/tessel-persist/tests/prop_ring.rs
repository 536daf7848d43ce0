use std::collections::VecDeque;

use proptest::prelude::*;
use tessel_persist::{QueueEntry, WriteQueue};

#[derive(Clone, Debug)]
enum Step {
    Push(i32),
    Pop,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![3 => any::<i32>().prop_map(Step::Push), 1 => Just(Step::Pop)]
}

proptest! {
    // interleaved pushes and pops behave like a VecDeque, across any number of grows
    #[test]
    fn queue_is_fifo_across_growth(cap in 2usize..8, steps in prop::collection::vec(step(), 0..300)) {
        let mut q = WriteQueue::with_capacity(cap);
        let mut model = VecDeque::new();
        for s in steps {
            match s {
                Step::Push(k) => {
                    q.push_key(k, -k, k);
                    model.push_back(QueueEntry::Key { p: k, q: -k, key: k });
                }
                Step::Pop => prop_assert_eq!(q.pop(), model.pop_front()),
            }
            prop_assert_eq!(q.len(), model.len());
            prop_assert!(q.len() < q.capacity());
            prop_assert_eq!(q.capacity() % cap, 0);
        }
        while let Some(e) = model.pop_front() {
            prop_assert_eq!(q.pop(), Some(e));
        }
        prop_assert!(q.is_empty());
    }
}
