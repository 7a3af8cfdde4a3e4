//! A priority queue that stores arbitrary data sorted by time
//!
//! Defines a `Queue<T>` that is intended to store a queue of items of type
//! `T`, sorted by `f64` time and then by [`ExecutionPhase`], called 'plans'.
//! Plans can only be added and retrieved: once submitted, a plan always
//! reaches the front of the queue. Code that no longer wants a plan to have
//! an effect must check the relevant state when the plan is executed.
//! Adding and retrieving a plan are both *O*(log(*n*)).
//!
//! This queue is used by `Context` to store future actions that will be
//! dispatched at a given point in time.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// The order in which plans scheduled for the same time are executed.
///
/// All `Normal` plans for a given time run before any `Last` plans for that
/// time. Within a phase plans run in the order in which they were added.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExecutionPhase {
    #[default]
    Normal,
    Last,
}

/// A priority queue that stores arbitrary data sorted by time
///
/// Items of type `T` are stored in order by `f64` time and called `Plan<T>`.
/// When plans are created they are sequentially assigned an id. If two plans
/// are scheduled for the same time then the plan in the earlier
/// [`ExecutionPhase`] is placed earlier. If two plans have the same time and
/// phase then the plan that is scheduled first (i.e., that has the lowest id)
/// is placed earlier.
pub struct Queue<T> {
    queue: BinaryHeap<Entry<T>>,
    plan_counter: u64,
}

impl<T> Queue<T> {
    /// Create a new empty `Queue<T>`
    #[must_use]
    pub fn new() -> Queue<T> {
        Queue {
            queue: BinaryHeap::new(),
            plan_counter: 0,
        }
    }

    /// Add a plan to the queue at the specified time
    ///
    /// The caller is responsible for the validity of `time`; `Context`
    /// rejects NaN, infinite, and past times before they reach the queue.
    pub fn add_plan(&mut self, time: f64, data: T, phase: ExecutionPhase) {
        let id = self.plan_counter;
        self.queue.push(Entry {
            time,
            phase,
            id,
            data,
        });
        self.plan_counter += 1;
    }

    /// Retrieve the earliest plan in the queue
    ///
    /// Returns the next plan if it exists or else `None` if the queue is empty
    pub fn get_next_plan(&mut self) -> Option<Plan<T>> {
        self.queue.pop().map(|entry| Plan {
            time: entry.time,
            data: entry.data,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Discards every remaining plan
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A time, phase, and id used to order plans in the `Queue<T>`, along with
/// the plan's payload
struct Entry<T> {
    time: f64,
    phase: ExecutionPhase,
    id: u64,
    data: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Entry objects are ordered in increasing order by time, phase, and then
/// plan id. `BinaryHeap` is a max-heap, so every comparison is reversed.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.phase.cmp(&other.phase))
            .then_with(|| self.id.cmp(&other.id))
            .reverse()
    }
}

/// A plan that holds data of type `T` intended to be used at the specified time
pub struct Plan<T> {
    pub time: f64,
    pub data: T,
}
