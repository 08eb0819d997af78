//! Standard job binding algorithms.

pub mod clustered_load_balance;
pub mod clustering;
pub mod cost_minimizing_clustered;
pub mod first_come_first_served;
pub mod greedy_load_balance;
pub mod length_sorted;
pub mod length_sorted_round_robin;
pub mod random;
pub mod random_clustered;
pub mod round_robin;
pub mod saturation_fill;
