use anyhow::{bail, Result};
use rand::{seq::SliceRandom, Rng};
use serde::Serialize;

use crate::log_info;

use super::table::ScoreTable;

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingScore {
    /// Sum of pair scores with the weakest pair counted twice.
    pub total: u32,
    pub lowest: Option<u32>,
    pub lowest_pair: Option<(usize, usize)>,
}

/// A set of disjoint pairs over roster indexes `0..n`. With an odd roster
/// someone is always left over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matching {
    partner: Vec<Option<usize>>,
}

impl Matching {
    pub fn new(n: usize) -> Self {
        Self {
            partner: vec![None; n],
        }
    }

    pub fn len(&self) -> usize {
        self.partner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partner.is_empty()
    }

    pub fn partner_of(&self, member: usize) -> Option<usize> {
        self.partner.get(member).copied().flatten()
    }

    pub fn add_pair(&mut self, a: usize, b: usize) -> Result<()> {
        let n = self.partner.len();
        if a >= n || b >= n {
            bail!("pair ({a}, {b}) outside roster of {n}");
        }
        if a == b {
            bail!("cannot pair {a} with itself");
        }
        if self.partner[a].is_some() || self.partner[b].is_some() {
            bail!("{a} or {b} is already paired");
        }
        self.partner[a] = Some(b);
        self.partner[b] = Some(a);
        Ok(())
    }

    pub fn remove_pair(&mut self, a: usize, b: usize) -> Result<()> {
        if self.partner_of(a) != Some(b) {
            bail!("{a} and {b} are not paired");
        }
        self.partner[a] = None;
        self.partner[b] = None;
        Ok(())
    }

    /// Pairs as `(i, j)` with `i < j`, ordered by `i`.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.partner
            .iter()
            .enumerate()
            .filter_map(|(i, partner)| match partner {
                Some(j) if i < *j => Some((i, *j)),
                _ => None,
            })
            .collect()
    }

    pub fn unpaired(&self) -> Vec<usize> {
        self.partner
            .iter()
            .enumerate()
            .filter(|(_, partner)| partner.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn score(&self, table: &ScoreTable) -> MatchingScore {
        let mut total = 0;
        let mut lowest: Option<(u32, (usize, usize))> = None;
        for (i, j) in self.pairs() {
            let score = table.get(i, j);
            total += score;
            if lowest.map_or(true, |(low, _)| score < low) {
                lowest = Some((score, (i, j)));
            }
        }
        if let Some((low, _)) = lowest {
            total += low;
        }
        MatchingScore {
            total,
            lowest: lowest.map(|(low, _)| low),
            lowest_pair: lowest.map(|(_, pair)| pair),
        }
    }

    /// Sum of pair scores; what local search maximises.
    pub fn pair_sum(&self, table: &ScoreTable) -> u32 {
        self.pairs().iter().map(|&(i, j)| table.get(i, j)).sum()
    }
}

/// Pair the first unpaired member with its best unpaired partner, repeatedly.
pub fn matching_greedy(table: &ScoreTable) -> Matching {
    let mut matching = Matching::new(table.len());
    loop {
        let unpaired = matching.unpaired();
        let Some((&member, rest)) = unpaired.split_first() else {
            break;
        };
        let Some(other) = table.best_partner(member, rest) else {
            break;
        };
        // both come from the unpaired list, so this cannot fail
        let _ = matching.add_pair(member, other);
    }
    matching
}

pub fn random_pairing<R: Rng>(n: usize, rng: &mut R) -> Matching {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    let mut matching = Matching::new(n);
    for chunk in order.chunks_exact(2) {
        let _ = matching.add_pair(chunk[0], chunk[1]);
    }
    matching
}

/// Try re-pairing every two pairs `(a,b),(c,d)` as `(a,c),(b,d)` or
/// `(a,d),(b,c)`. Returns the first strict improvement of the pair sum.
pub fn improve(matching: &Matching, table: &ScoreTable) -> Option<Matching> {
    let pairs = matching.pairs();
    for (x, &(a, b)) in pairs.iter().enumerate() {
        for &(c, d) in &pairs[x + 1..] {
            let current = table.get(a, b) + table.get(c, d);
            let crossed = table.get(a, c) + table.get(b, d);
            let swapped = table.get(a, d) + table.get(b, c);
            if current >= crossed && current >= swapped {
                continue;
            }

            let mut improved = matching.clone();
            let (first, second) = if crossed > swapped {
                ((a, c), (b, d))
            } else {
                ((a, d), (b, c))
            };
            if repair(&mut improved, [(a, b), (c, d)], [first, second]).is_ok() {
                return Some(improved);
            }
        }
    }
    None
}

fn repair(
    matching: &mut Matching,
    old: [(usize, usize); 2],
    new: [(usize, usize); 2],
) -> Result<()> {
    for (a, b) in old {
        matching.remove_pair(a, b)?;
    }
    for (a, b) in new {
        matching.add_pair(a, b)?;
    }
    Ok(())
}

/// Apply [`improve`] until nothing changes.
pub fn local_optimum(mut matching: Matching, table: &ScoreTable) -> Matching {
    let start = matching.pair_sum(table);
    let mut rounds = 0;
    while let Some(better) = improve(&matching, table) {
        matching = better;
        rounds += 1;
    }
    log_info!(
        "Local search finished after {} swaps; pair sum {} -> {}",
        rounds,
        start,
        matching.pair_sum(table)
    );
    matching
}

pub fn hill_climb_random_start<R: Rng>(table: &ScoreTable, rng: &mut R) -> Matching {
    local_optimum(random_pairing(table.len(), rng), table)
}

/// Largest roster [`matching_exhaustive`] accepts; 16 members already
/// means about two million matchings.
pub const MAX_EXHAUSTIVE_ROSTER: usize = 16;

/// Best matching by [`Matching::score`] over every possible matching. With an
/// odd roster each member takes a turn sitting out.
pub fn matching_exhaustive(table: &ScoreTable) -> Result<Matching> {
    let n = table.len();
    if n > MAX_EXHAUSTIVE_ROSTER {
        bail!("exhaustive matching supports at most {MAX_EXHAUSTIVE_ROSTER} members, got {n}");
    }
    let members: Vec<usize> = (0..n).collect();
    let mut current = Matching::new(n);
    let mut best: Option<(u32, Matching)> = None;
    let mut visited = 0usize;

    enumerate_matchings(&mut current, &members, &mut |candidate: &Matching| {
        visited += 1;
        keep_best(&mut best, candidate, table);
    });
    log_info!("Exhaustive search scored {} matchings", visited);

    Ok(best.map(|(_, matching)| matching).unwrap_or(current))
}

fn enumerate_matchings(
    current: &mut Matching,
    remaining: &[usize],
    visit: &mut dyn FnMut(&Matching),
) {
    match remaining.len() {
        0 | 1 => visit(current),
        n if n % 2 == 1 => {
            for skip in 0..n {
                let rest: Vec<usize> = remaining
                    .iter()
                    .enumerate()
                    .filter(|&(x, _)| x != skip)
                    .map(|(_, &member)| member)
                    .collect();
                enumerate_matchings(current, &rest, visit);
            }
        }
        _ => {
            let first = remaining[0];
            for &other in &remaining[1..] {
                let rest: Vec<usize> = remaining[1..]
                    .iter()
                    .copied()
                    .filter(|&member| member != other)
                    .collect();
                if current.add_pair(first, other).is_ok() {
                    enumerate_matchings(current, &rest, visit);
                    let _ = current.remove_pair(first, other);
                }
            }
        }
    }
}

/// Matchings built by taking, at every step, one of the two best-scoring
/// pairs among the members still unpaired. An even roster of `n` yields
/// `2^(n/2 - 1)` of them.
pub fn two_greedy_matchings(table: &ScoreTable) -> Vec<Matching> {
    let members: Vec<usize> = (0..table.len()).collect();
    let mut found = Vec::new();
    let mut collect = |candidate: &Matching| found.push(candidate.clone());
    enumerate_two_greedy(table, Matching::new(table.len()), &members, &mut collect);
    found
}

/// Best of [`two_greedy_matchings`] by [`Matching::score`].
pub fn matching_two_greedy(table: &ScoreTable) -> Matching {
    let members: Vec<usize> = (0..table.len()).collect();
    let mut best: Option<(u32, Matching)> = None;
    let mut visited = 0usize;

    let mut score_candidate = |candidate: &Matching| {
        visited += 1;
        keep_best(&mut best, candidate, table);
    };
    enumerate_two_greedy(table, Matching::new(table.len()), &members, &mut score_candidate);
    log_info!("Two-greedy search scored {} matchings", visited);

    best.map(|(_, matching)| matching)
        .unwrap_or_else(|| Matching::new(table.len()))
}

fn enumerate_two_greedy(
    table: &ScoreTable,
    partial: Matching,
    remaining: &[usize],
    visit: &mut dyn FnMut(&Matching),
) {
    if remaining.len() < 2 {
        visit(&partial);
        return;
    }

    let mut candidates = Vec::new();
    for (x, &a) in remaining.iter().enumerate() {
        for &b in &remaining[x + 1..] {
            candidates.push((a, b, table.get(a, b)));
        }
    }
    // stable, so equal scores keep roster order
    candidates.sort_by(|p, q| q.2.cmp(&p.2));

    for &(a, b, _) in candidates.iter().take(2) {
        let mut next = partial.clone();
        if next.add_pair(a, b).is_err() {
            continue;
        }
        let rest: Vec<usize> = remaining
            .iter()
            .copied()
            .filter(|&member| member != a && member != b)
            .collect();
        enumerate_two_greedy(table, next, &rest, visit);
    }
}

/// First matching wins ties.
fn keep_best(best: &mut Option<(u32, Matching)>, candidate: &Matching, table: &ScoreTable) {
    let total = candidate.score(table).total;
    if best.as_ref().map_or(true, |(score, _)| total > *score) {
        *best = Some((total, candidate.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{Day, WeeklyPayload};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_roster(n: usize, rng: &mut StdRng) -> ScoreTable {
        let payloads: Vec<WeeklyPayload> = (0..n)
            .map(|_| {
                let mut payload = WeeklyPayload::default();
                for day in Day::ALL {
                    payload.set(day, rng.gen_range(0..1u64 << 30));
                }
                payload
            })
            .collect();
        ScoreTable::build(&payloads)
    }

    fn monday(bits: u64) -> WeeklyPayload {
        let mut payload = WeeklyPayload::default();
        payload.set(Day::Mon, bits);
        payload
    }

    /// Members 0/2 share mornings, 1/3 share evenings.
    fn roster() -> ScoreTable {
        ScoreTable::build(&[
            monday(0b0000_1111),
            monday(0b1111_0000),
            monday(0b0000_1111),
            monday(0b1111_0000),
        ])
    }

    #[test]
    fn add_and_remove_pairs() {
        let mut matching = Matching::new(3);
        matching.add_pair(0, 2).unwrap();
        assert!(matching.add_pair(2, 1).is_err());
        assert!(matching.add_pair(1, 1).is_err());
        assert!(matching.add_pair(1, 3).is_err());
        assert_eq!(matching.pairs(), vec![(0, 2)]);
        assert_eq!(matching.unpaired(), vec![1]);
        assert!(matching.remove_pair(0, 1).is_err());
        matching.remove_pair(2, 0).unwrap();
        assert_eq!(matching.unpaired(), vec![0, 1, 2]);
    }

    #[test]
    fn greedy_finds_obvious_pairs() {
        let table = roster();
        let matching = matching_greedy(&table);
        assert_eq!(matching.pairs(), vec![(0, 2), (1, 3)]);
        let score = matching.score(&table);
        assert_eq!(score.total, 3 + 3 + 3);
        assert_eq!(score.lowest, Some(3));
    }

    #[test]
    fn odd_roster_leaves_one_unpaired() {
        let table = ScoreTable::build(&[monday(1), monday(1), monday(1)]);
        let matching = matching_greedy(&table);
        assert_eq!(matching.pairs().len(), 1);
        assert_eq!(matching.unpaired().len(), 1);
    }

    #[test]
    fn improve_fixes_a_bad_pairing() {
        let table = roster();
        let mut bad = Matching::new(4);
        bad.add_pair(0, 1).unwrap();
        bad.add_pair(2, 3).unwrap();
        assert_eq!(bad.score(&table).total, 0);

        let better = improve(&bad, &table).unwrap();
        assert!(better.pair_sum(&table) > bad.pair_sum(&table));
        assert_eq!(better.pairs(), vec![(0, 2), (1, 3)]);
        assert!(improve(&better, &table).is_none());
    }

    #[test]
    fn hill_climbing_reaches_the_optimum_here() {
        let table = roster();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10 {
            let matching = hill_climb_random_start(&table, &mut rng);
            assert_eq!(matching.score(&table).total, 9);
        }
    }

    #[test]
    fn random_pairing_pairs_everyone_possible() {
        let mut rng = StdRng::seed_from_u64(3);
        let matching = random_pairing(7, &mut rng);
        assert_eq!(matching.pairs().len(), 3);
        assert_eq!(matching.unpaired().len(), 1);
    }

    #[test]
    fn exhaustive_is_never_beaten() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..5 {
            let table = random_roster(8, &mut rng);
            let best = matching_exhaustive(&table).unwrap().score(&table).total;
            assert!(best >= matching_greedy(&table).score(&table).total);
            assert!(best >= matching_two_greedy(&table).score(&table).total);
            let climbed = hill_climb_random_start(&table, &mut rng);
            assert!(best >= climbed.score(&table).total);
        }
    }

    #[test]
    fn exhaustive_finds_the_obvious_pairs() {
        let table = roster();
        let matching = matching_exhaustive(&table).unwrap();
        assert_eq!(matching.pairs(), vec![(0, 2), (1, 3)]);
    }

    #[test]
    fn exhaustive_with_odd_roster_sits_one_out() {
        let mut rng = StdRng::seed_from_u64(9);
        let table = random_roster(7, &mut rng);
        let matching = matching_exhaustive(&table).unwrap();
        assert_eq!(matching.pairs().len(), 3);
        assert_eq!(matching.unpaired().len(), 1);
        assert!(matching.score(&table).total >= matching_greedy(&table).score(&table).total);
    }

    #[test]
    fn exhaustive_refuses_large_rosters() {
        let table = ScoreTable::build(&vec![WeeklyPayload::default(); MAX_EXHAUSTIVE_ROSTER + 1]);
        assert!(matching_exhaustive(&table).is_err());
    }

    #[test]
    fn two_greedy_branches_twice_per_pair() {
        let mut rng = StdRng::seed_from_u64(21);
        for (n, expected) in [(2, 1), (4, 2), (6, 4), (10, 16)] {
            let table = random_roster(n, &mut rng);
            let candidates = two_greedy_matchings(&table);
            assert_eq!(candidates.len(), expected, "roster of {n}");
            assert!(candidates.iter().all(|m| m.unpaired().is_empty()));
        }
    }

    #[test]
    fn two_greedy_picks_its_best_candidate() {
        let mut rng = StdRng::seed_from_u64(13);
        let table = random_roster(10, &mut rng);
        let chosen = matching_two_greedy(&table).score(&table).total;
        let best = two_greedy_matchings(&table)
            .iter()
            .map(|m| m.score(&table).total)
            .max()
            .unwrap();
        assert_eq!(chosen, best);
        assert_eq!(matching_two_greedy(&roster()).pairs(), vec![(0, 2), (1, 3)]);
    }

    #[test]
    fn empty_roster_scores_zero() {
        let table = ScoreTable::build(&[]);
        let matching = matching_greedy(&table);
        assert!(matching.pairs().is_empty());
        assert_eq!(matching.score(&table).lowest, None);
        assert_eq!(matching.score(&table).total, 0);
    }
}
