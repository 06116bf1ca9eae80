use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "when-to-pair")]
#[command(version = "0.1.0")]
#[command(about = "Weekly availability overlap and pair matching for a course roster", long_about = None)]
pub struct Cli {
    /// Roster store
    #[arg(long, default_value = "when_to_pair.sqlite3")]
    pub db: PathBuf,

    /// Grid settings file
    #[arg(long, default_value = "settings.json")]
    pub settings: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List courses that have saved schedules
    Courses,

    /// Save a student's week, given as `{"Sun":0,"Mon":5,...}`
    Save {
        course: String,
        email: String,
        name: String,
        payload: String,
    },

    /// Show one student's week as a grid
    Show { course: String, email: String },

    /// Pairwise overlap scores for a course
    Table { course: String },

    /// Pair up a course
    Pair {
        course: String,

        #[arg(short, long, value_enum, default_value_t = Strategy::Greedy)]
        strategy: Strategy,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },

    /// Overlay two students' weeks
    Overlap {
        course: String,
        a: String,
        b: String,
    },

    /// Random roster, scores and matchings; no store needed
    Demo {
        #[arg(short = 'n', long, default_value_t = 10)]
        students: usize,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    Greedy,
    /// Best of the matchings that always take one of the two best pairs left
    TwoGreedy,
    HillClimb,
    /// Every matching; small rosters only
    Exhaustive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_accepts_every_strategy() {
        for (flag, expected) in [
            ("greedy", Strategy::Greedy),
            ("two-greedy", Strategy::TwoGreedy),
            ("hill-climb", Strategy::HillClimb),
            ("exhaustive", Strategy::Exhaustive),
        ] {
            let cli = Cli::try_parse_from(["when-to-pair", "pair", "cs101", "--strategy", flag])
                .unwrap();
            match cli.command {
                Commands::Pair { strategy, .. } => assert_eq!(strategy, expected),
                _ => panic!("expected the pair command"),
            }
        }
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        assert!(
            Cli::try_parse_from(["when-to-pair", "pair", "cs101", "-s", "optimal"]).is_err()
        );
    }
}
