// League data model: positions, teams, pick ownership, provider snapshots.

pub mod picks;
pub mod position;
pub mod snapshot;
pub mod team;
