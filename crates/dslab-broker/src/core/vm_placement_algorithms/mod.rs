//! Standard VM placement algorithms.

pub mod best_fit;
pub mod first_fit;
pub mod rank_based;
pub mod round_robin;
pub mod worst_fit;
