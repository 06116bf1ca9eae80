use crate::schedule::{scoring::overlap_score, WeeklyPayload};

/// Symmetric pairwise overlap scores for a roster, computed once up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreTable {
    scores: Vec<Vec<u32>>,
}

impl ScoreTable {
    pub fn build(schedules: &[WeeklyPayload]) -> Self {
        let n = schedules.len();
        let mut scores = vec![vec![0; n]; n];
        for i in 0..n {
            for j in i..n {
                let score = overlap_score(&schedules[i], &schedules[j]);
                scores[i][j] = score;
                scores[j][i] = score;
            }
        }
        Self { scores }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> u32 {
        self.scores[i][j]
    }

    /// Best partner for `member` among `candidates`, first one on ties.
    pub fn best_partner(&self, member: usize, candidates: &[usize]) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for &other in candidates {
            if other == member {
                continue;
            }
            let score = self.get(member, other);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((other, score));
            }
        }
        best.map(|(other, _)| other)
    }
}
