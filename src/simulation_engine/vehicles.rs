use crate::global_variables::{LANE_WIDTH, SPEED_LIMIT, VEHICLE_SIZE, WINDOW_HEIGHT, WINDOW_WIDTH};
use serde::{Deserialize, Serialize};

/// The four approaches of the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::East => 2,
            Direction::West => 3,
        }
    }

    /// Round-robin successor used by the light rotation.
    pub fn next(self) -> Direction {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

/// Each approach carries an incoming and an outgoing channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaneSide {
    Incoming,
    Outgoing,
}

impl LaneSide {
    pub const ALL: [LaneSide; 2] = [LaneSide::Incoming, LaneSide::Outgoing];

    pub fn index(self) -> usize {
        match self {
            LaneSide::Incoming => 0,
            LaneSide::Outgoing => 1,
        }
    }
}

/// Different classes of vehicles in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleKind {
    Regular,
    Heavy,
    Emergency,
}

/// A vehicle traveling through the intersection. Plain value type: owned by
/// exactly one lane queue at a time, identified everywhere else by `id`.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: u64,
    pub kind: VehicleKind,
    pub direction: Direction,
    pub side: LaneSide,
    /// Speed in pixels per tick, assigned at creation from the class band.
    pub speed: f64,
    pub x: f64,
    pub y: f64,
    /// Set at most once; emergency vehicles are never cited.
    pub challan_issued: bool,
    /// Sticky breakdown condition, rolled at creation.
    pub breakdown: bool,
    /// Whether the breakdown event has already been emitted.
    pub breakdown_reported: bool,
}

impl Vehicle {
    pub fn new(
        id: u64,
        kind: VehicleKind,
        direction: Direction,
        side: LaneSide,
        speed: f64,
        breakdown: bool,
    ) -> Self {
        let (x, y) = spawn_position(direction, side);
        Self {
            id,
            kind,
            direction,
            side,
            speed,
            x,
            y,
            challan_issued: false,
            breakdown,
            breakdown_reported: false,
        }
    }

    /// Registration-plate style display form of the numeric id.
    pub fn plate(&self) -> String {
        format!("VEH{:04}", self.id)
    }

    pub fn is_emergency(&self) -> bool {
        self.kind == VehicleKind::Emergency
    }

    pub fn is_speeding(&self) -> bool {
        self.speed > SPEED_LIMIT
    }

    /// Moves one tick's worth of distance along the approach's travel axis.
    pub fn advance(&mut self) {
        match self.direction {
            Direction::North => self.y += self.speed,
            Direction::South => self.y -= self.speed,
            Direction::East => self.x -= self.speed,
            Direction::West => self.x += self.speed,
        }
    }

    /// Whether the vehicle is still inside the visible bounds for its
    /// approach. Once this turns false the vehicle has exited.
    pub fn in_bounds(&self) -> bool {
        match self.direction {
            Direction::North => self.y < WINDOW_HEIGHT / 2.0 + LANE_WIDTH,
            Direction::South => self.y > WINDOW_HEIGHT / 2.0 - LANE_WIDTH,
            Direction::East => self.x > WINDOW_WIDTH / 2.0 - LANE_WIDTH,
            Direction::West => self.x < WINDOW_WIDTH / 2.0 + LANE_WIDTH,
        }
    }
}

/// Entry coordinates per approach and channel. Incoming vehicles start at the
/// window edge, outgoing ones just past the middle of the junction.
fn spawn_position(direction: Direction, side: LaneSide) -> (f64, f64) {
    let offset = side.index() as f64 * LANE_WIDTH / 2.0;
    match (direction, side) {
        (Direction::North, LaneSide::Incoming) => (WINDOW_WIDTH / 2.0 + offset, -VEHICLE_SIZE),
        (Direction::North, LaneSide::Outgoing) => (
            WINDOW_WIDTH / 2.0 + offset,
            WINDOW_HEIGHT / 2.0 + LANE_WIDTH / 2.0,
        ),
        (Direction::South, LaneSide::Incoming) => (WINDOW_WIDTH / 2.0 - offset, WINDOW_HEIGHT),
        (Direction::South, LaneSide::Outgoing) => (
            WINDOW_WIDTH / 2.0 - offset,
            WINDOW_HEIGHT / 2.0 - LANE_WIDTH / 2.0,
        ),
        (Direction::East, LaneSide::Incoming) => (WINDOW_WIDTH, WINDOW_HEIGHT / 2.0 + offset),
        (Direction::East, LaneSide::Outgoing) => (
            WINDOW_WIDTH / 2.0 - LANE_WIDTH / 2.0,
            WINDOW_HEIGHT / 2.0 + offset,
        ),
        (Direction::West, LaneSide::Incoming) => (-VEHICLE_SIZE, WINDOW_HEIGHT / 2.0 - offset),
        (Direction::West, LaneSide::Outgoing) => (
            WINDOW_WIDTH / 2.0 + LANE_WIDTH / 2.0,
            WINDOW_HEIGHT / 2.0 - offset,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_visits_all_directions_in_order() {
        let mut dir = Direction::North;
        let mut seen = vec![dir];
        for _ in 0..3 {
            dir = dir.next();
            seen.push(dir);
        }
        assert_eq!(
            seen,
            vec![
                Direction::North,
                Direction::South,
                Direction::East,
                Direction::West
            ]
        );
        assert_eq!(dir.next(), Direction::North);
    }

    #[test]
    fn advance_follows_travel_axis() {
        let mut north = Vehicle::new(1, VehicleKind::Regular, Direction::North, LaneSide::Incoming, 5.0, false);
        let y0 = north.y;
        north.advance();
        assert_eq!(north.y, y0 + 5.0);

        let mut east = Vehicle::new(2, VehicleKind::Regular, Direction::East, LaneSide::Incoming, 5.0, false);
        let x0 = east.x;
        east.advance();
        assert_eq!(east.x, x0 - 5.0);
    }

    #[test]
    fn vehicle_exits_past_its_direction_bound() {
        let mut v = Vehicle::new(3, VehicleKind::Regular, Direction::North, LaneSide::Incoming, 12.0, false);
        assert!(v.in_bounds());
        v.y = WINDOW_HEIGHT / 2.0 + LANE_WIDTH - 1.0;
        assert!(v.in_bounds());
        v.advance();
        assert!(!v.in_bounds());
    }

    #[test]
    fn speeding_is_strictly_above_the_limit() {
        let at_limit = Vehicle::new(4, VehicleKind::Regular, Direction::West, LaneSide::Incoming, SPEED_LIMIT, false);
        assert!(!at_limit.is_speeding());
        let over = Vehicle::new(5, VehicleKind::Regular, Direction::West, LaneSide::Incoming, SPEED_LIMIT + 0.5, false);
        assert!(over.is_speeding());
    }
}
