use crate::global_variables::MAX_LANE_CAPACITY;
use crate::simulation_engine::vehicles::{Direction, LaneSide, Vehicle};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Bounded FIFO of vehicles for one (direction, side) pair. Insertion order
/// is arrival order is release order.
#[derive(Debug)]
pub struct LaneQueue {
    vehicles: VecDeque<Vehicle>,
    capacity: usize,
}

impl LaneQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            vehicles: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Appends at the tail. If the queue would exceed its capacity the oldest
    /// vehicle is evicted and returned so the caller can settle its
    /// accounting; the overflow itself is not fatal.
    pub fn push(&mut self, vehicle: Vehicle) -> Option<Vehicle> {
        self.vehicles.push_back(vehicle);
        if self.vehicles.len() > self.capacity {
            self.vehicles.pop_front()
        } else {
            None
        }
    }

    pub fn pop_front(&mut self) -> Option<Vehicle> {
        self.vehicles.pop_front()
    }

    /// Inspects the earliest vehicle without disturbing the order. Used by
    /// the light controller to test for an emergency vehicle at the head.
    pub fn peek_front(&self) -> Option<&Vehicle> {
        self.vehicles.front()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }
}

/// All eight lane queues of the intersection, each behind its own lock so
/// operations on different lanes never contend.
#[derive(Debug)]
pub struct LaneGrid {
    queues: [[Mutex<LaneQueue>; 2]; 4],
}

impl LaneGrid {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LANE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queues: std::array::from_fn(|_| {
                std::array::from_fn(|_| Mutex::new(LaneQueue::new(capacity)))
            }),
        }
    }

    pub fn lane(&self, direction: Direction, side: LaneSide) -> MutexGuard<'_, LaneQueue> {
        self.queues[direction.index()][side.index()]
            .lock()
            .unwrap()
    }

    /// True if any queue head in the given direction is an emergency vehicle.
    pub fn has_emergency_at_head(&self, direction: Direction) -> bool {
        LaneSide::ALL.iter().any(|&side| {
            self.lane(direction, side)
                .peek_front()
                .map_or(false, Vehicle::is_emergency)
        })
    }

    pub fn total_queued(&self) -> usize {
        let mut total = 0;
        for direction in Direction::ALL {
            for side in LaneSide::ALL {
                total += self.lane(direction, side).len();
            }
        }
        total
    }
}

impl Default for LaneGrid {
    fn default() -> Self {
        Self::new()
    }
}
