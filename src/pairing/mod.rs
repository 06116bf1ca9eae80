pub mod matching;
pub mod table;

pub use matching::{
    hill_climb_random_start, improve, local_optimum, matching_exhaustive, matching_greedy,
    matching_two_greedy, random_pairing, two_greedy_matchings, Matching, MatchingScore,
    MAX_EXHAUSTIVE_ROSTER,
};
pub use table::ScoreTable;
