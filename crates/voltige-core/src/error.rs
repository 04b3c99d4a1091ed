//! Precondition errors raised at the session boundary.
//!
//! Infeasible missions are not errors; they surface as `feasible == false`
//! on the profile and as an aborted simulation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MissionError {
    #[error("mission needs at least 2 waypoints (home + 1), got {0}")]
    TooFewWaypoints(usize),

    #[error("the home waypoint cannot be modified or deleted")]
    HomeImmutable,

    #[error("waypoint {0} does not exist")]
    UnknownWaypoint(usize),

    #[error("first waypoint must be the home waypoint")]
    MissingHome,

    #[error("waypoint at position {position} has index {index}; indices must be contiguous from 0")]
    NonContiguousIndex { position: usize, index: usize },

    #[error("only waypoint 0 may have the home role (found at {0})")]
    MisplacedHome(usize),

    #[error("simulation already started; reset before starting again")]
    AlreadyStarted,

    #[error("invalid time of day {0:?}, expected HH:MM")]
    InvalidTimeOfDay(String),
}
