use crate::global_variables::{EMERGENCY_GREEN_SECS, GREEN_LIGHT_SECS, YELLOW_LIGHT_SECS};
use crate::shared_data::wait_or_shutdown;
use crate::simulation_engine::lanes::LaneGrid;
use crate::simulation_engine::vehicles::Direction;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tokio::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightState {
    Red,
    Yellow,
    Green,
}

/// How the current green was chosen: normal rotation, or preemption for an
/// emergency vehicle waiting at the named approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleMode {
    Rotating,
    Preempted(Direction),
}

#[derive(Debug)]
struct LightBoard {
    lights: [LightState; 4],
    emergency_priority: [bool; 4],
    /// The direction most recently granted green; rotation advances from here.
    cursor: Direction,
    mode: CycleMode,
}

/// The single source of truth for which direction may move. One writer (the
/// cycle loop), any number of readers; all go through the board lock.
#[derive(Debug)]
pub struct TrafficLightController {
    board: Mutex<LightBoard>,
}

impl TrafficLightController {
    pub fn new() -> Self {
        Self {
            board: Mutex::new(LightBoard {
                lights: [LightState::Red; 4],
                emergency_priority: [false; 4],
                // First uncontested cycle grants North.
                cursor: Direction::West,
                mode: CycleMode::Rotating,
            }),
        }
    }

    /// Picks the next green direction and applies it: an emergency vehicle
    /// at any queue head preempts the rotation, otherwise the cursor
    /// advances round-robin. The chosen direction goes green, every other
    /// direction red, and stale emergency flags clear. Returns the granted
    /// direction and whether it was preempted.
    pub fn begin_cycle(&self, lanes: &LaneGrid) -> (Direction, bool) {
        let emergency = Direction::ALL
            .iter()
            .copied()
            .find(|&dir| lanes.has_emergency_at_head(dir));

        let mut board = self.board.lock().unwrap();
        let (granted, mode) = match emergency {
            Some(dir) => (dir, CycleMode::Preempted(dir)),
            None => (board.cursor.next(), CycleMode::Rotating),
        };
        board.cursor = granted;
        board.mode = mode;
        for dir in Direction::ALL {
            let idx = dir.index();
            board.lights[idx] = if dir == granted {
                LightState::Green
            } else {
                LightState::Red
            };
            board.emergency_priority[idx] = matches!(mode, CycleMode::Preempted(d) if d == dir);
        }
        drop(board);

        let preempted = matches!(mode, CycleMode::Preempted(_));
        if preempted {
            info!("emergency preemption: green granted to {:?}", granted);
        } else {
            debug!("rotation: green granted to {:?}", granted);
        }
        (granted, preempted)
    }

    /// Demotes the current green to yellow. The yellow phase always runs to
    /// completion; preemption is only evaluated at the next cycle decision.
    pub fn begin_yellow(&self) {
        let mut board = self.board.lock().unwrap();
        let idx = board.cursor.index();
        if board.lights[idx] == LightState::Green {
            board.lights[idx] = LightState::Yellow;
        }
    }

    /// Closes the cycle: the held direction goes red and its emergency
    /// priority clears.
    pub fn end_cycle(&self) {
        let mut board = self.board.lock().unwrap();
        let idx = board.cursor.index();
        board.lights[idx] = LightState::Red;
        board.emergency_priority[idx] = false;
    }

    pub fn is_green(&self, direction: Direction) -> bool {
        self.board.lock().unwrap().lights[direction.index()] == LightState::Green
    }

    pub fn current_green(&self) -> Option<Direction> {
        let board = self.board.lock().unwrap();
        Direction::ALL
            .iter()
            .copied()
            .find(|&dir| board.lights[dir.index()] == LightState::Green)
    }

    pub fn light_states(&self) -> [LightState; 4] {
        self.board.lock().unwrap().lights
    }

    pub fn emergency_flags(&self) -> [bool; 4] {
        self.board.lock().unwrap().emergency_priority
    }

    /// Drives green -> yellow -> red cycles until shutdown is observed. The
    /// flag is checked only at sleep boundaries; no lock is held across a
    /// suspension point.
    pub async fn run(self: Arc<Self>, lanes: Arc<LaneGrid>, shutdown: Arc<AtomicBool>) {
        loop {
            let (_, preempted) = self.begin_cycle(&lanes);
            let hold = if preempted {
                EMERGENCY_GREEN_SECS
            } else {
                GREEN_LIGHT_SECS
            };
            if !wait_or_shutdown(Duration::from_secs(hold), &shutdown).await {
                break;
            }
            self.begin_yellow();
            if !wait_or_shutdown(Duration::from_secs(YELLOW_LIGHT_SECS), &shutdown).await {
                break;
            }
            self.end_cycle();
        }
        debug!("traffic light controller stopped");
    }
}

impl Default for TrafficLightController {
    fn default() -> Self {
        Self::new()
    }
}
