//! Prime implicants and covering charts.

use crate::*;

use bit_set::BitSet;
use itertools::Itertools;
use log::{debug, trace};
use std::collections::BTreeMap;

/// Compute all prime implicants of a function given by its minterms, using the Quine-McCluskey tables.
///
/// Each minterm starts as an implicant fixing all positions. At each pass, the implicants are
/// grouped by their number of positive literals and all pairs from adjacent groups differing
/// on a single position are merged. Any implicant which was not merged during a pass is prime.
///
/// The primes are returned in a stable order: larger implicants first.
pub fn prime_implicants(minterms: &[usize], width: usize) -> Vec<Implicant> {
    let mut current: Vec<Implicant> = minterms
        .iter()
        .map(|m| Implicant::minterm(*m, width))
        .sorted()
        .dedup()
        .collect();
    let mut primes = vec![];
    let mut pass = 0;

    while !current.is_empty() {
        pass += 1;
        let groups: BTreeMap<usize, Vec<usize>> = current
            .iter()
            .enumerate()
            .map(|(idx, i)| (i.ones(), idx))
            .into_group_map()
            .into_iter()
            .collect();

        let mut merged = BitSet::with_capacity(current.len());
        let mut next = vec![];
        for (ones, group) in &groups {
            let upper = match groups.get(&(ones + 1)) {
                Some(upper) => upper,
                None => continue,
            };
            for (i, j) in group.iter().cartesian_product(upper) {
                if let Some(m) = current[*i].merge(&current[*j]) {
                    merged.insert(*i);
                    merged.insert(*j);
                    next.push(m);
                }
            }
        }

        for (idx, implicant) in current.iter().enumerate() {
            if !merged.contains(idx) {
                trace!("prime implicant {} found in pass {}", implicant, pass);
                primes.push(*implicant);
            }
        }
        current = next.into_iter().sorted().dedup().collect();
    }

    primes.sort_by_key(|p| (p.literal_count(), *p));
    debug!("{} prime implicants for {} minterms", primes.len(), minterms.len());
    primes
}

/// Covering chart: which prime implicants cover each minterm.
#[derive(Clone, Debug)]
pub struct PrimeChart {
    primes: Vec<Implicant>,
    minterms: Vec<usize>,
    coverage: BTreeMap<usize, Vec<usize>>,
}

impl PrimeChart {
    pub fn new(primes: Vec<Implicant>, minterms: &[usize]) -> Self {
        let minterms: Vec<usize> = minterms.iter().copied().sorted().dedup().collect();
        let coverage = minterms
            .iter()
            .map(|m| {
                let covering = primes
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.covers(*m))
                    .map(|(idx, _)| idx)
                    .collect();
                (*m, covering)
            })
            .collect();
        Self {
            primes,
            minterms,
            coverage,
        }
    }

    /// Build the chart of all prime implicants of a function
    pub fn from_minterms(minterms: &[usize], width: usize) -> Self {
        Self::new(prime_implicants(minterms, width), minterms)
    }

    pub fn primes(&self) -> &[Implicant] {
        &self.primes
    }

    pub fn minterms(&self) -> &[usize] {
        &self.minterms
    }

    /// The indices of the primes covering each minterm.
    ///
    /// This is the product of sums which defines the exact covering problem: a selection of primes
    /// is a cover if it contains at least one element of each list.
    pub fn petrick_terms(&self) -> Vec<(usize, Vec<usize>)> {
        self.coverage
            .iter()
            .map(|(m, covering)| (*m, covering.clone()))
            .collect()
    }

    /// The primes which are the only ones to cover some minterm, in increasing order
    pub fn essentials(&self) -> Vec<usize> {
        self.coverage
            .values()
            .filter(|covering| covering.len() == 1)
            .map(|covering| covering[0])
            .sorted()
            .dedup()
            .collect()
    }

    fn uncovered_after(&self, selected: &[usize]) -> BitSet {
        self.minterms
            .iter()
            .filter(|m| !selected.iter().any(|s| self.primes[*s].covers(**m)))
            .copied()
            .collect()
    }

    /// Select the essential primes, then repeatedly the prime covering the largest number of
    /// remaining minterms (the first one on ties) until all minterms are covered.
    ///
    /// This is a greedy approximation of the minimal cover.
    pub fn greedy_cover(&self) -> Vec<usize> {
        let mut selected = self.essentials();
        let mut uncovered = self.uncovered_after(&selected);
        debug!(
            "{} essential primes, {} minterms left to cover",
            selected.len(),
            uncovered.len()
        );

        while !uncovered.is_empty() {
            let mut best = None;
            let mut best_count = 0;
            for (idx, p) in self.primes.iter().enumerate() {
                let count = uncovered.iter().filter(|m| p.covers(*m)).count();
                if count > best_count {
                    best = Some(idx);
                    best_count = count;
                }
            }
            let chosen = match best {
                Some(chosen) => chosen,
                None => break,
            };
            trace!("greedy selection of {} covering {} minterms", self.primes[chosen], best_count);
            selected.push(chosen);
            let p = self.primes[chosen];
            uncovered = uncovered.iter().filter(|m| !p.covers(*m)).collect();
        }
        selected
    }

    /// Resolve the Petrick product of sums with a greedy heuristic.
    ///
    /// Single-prime sums are satisfied first. Then the prime appearing in the largest number of
    /// unsatisfied sums is selected (the first one on ties) until all sums are satisfied.
    pub fn petrick_cover(&self) -> Vec<usize> {
        let mut sums: Vec<Vec<usize>> = self
            .petrick_terms()
            .into_iter()
            .map(|(_, covering)| covering)
            .collect();
        let mut selected: Vec<usize> = vec![];

        for sum in sums.iter().filter(|s| s.len() == 1) {
            if !selected.contains(&sum[0]) {
                selected.push(sum[0]);
            }
        }
        sums.retain(|s| !s.iter().any(|p| selected.contains(p)));

        while !sums.is_empty() {
            let mut frequencies = vec![0usize; self.primes.len()];
            for p in sums.iter().flatten() {
                frequencies[*p] += 1;
            }
            let mut best = None;
            let mut best_count = 0;
            for (idx, count) in frequencies.iter().enumerate() {
                if *count > best_count {
                    best = Some(idx);
                    best_count = *count;
                }
            }
            let chosen = match best {
                Some(chosen) => chosen,
                None => break,
            };
            selected.push(chosen);
            sums.retain(|s| !s.contains(&chosen));
        }
        selected.sort_unstable();
        selected
    }

    /// Get the implicants for a list of prime indices
    pub fn select(&self, indices: &[usize]) -> Vec<Implicant> {
        indices.iter().map(|idx| self.primes[*idx]).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::primes::*;

    use test_log::test;

    fn names(implicants: &[Implicant]) -> Vec<String> {
        implicants.iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn primes_of_small_functions() {
        // AB + AB'
        assert_eq!(names(&prime_implicants(&[2, 3], 2)), ["1-"]);

        // A + B
        assert_eq!(names(&prime_implicants(&[1, 2, 3], 2)), ["-1", "1-"]);

        // classic example: m(0,1,2,5,6,7) has six primes and two minimal covers
        let primes = prime_implicants(&[0, 1, 2, 5, 6, 7], 3);
        assert_eq!(primes.len(), 6);
        assert!(primes.iter().all(|p| p.literal_count() == 2));
    }

    #[test]
    fn essentials_and_cover() {
        // A'B' + AC: 000, 001, 101, 111
        let chart = PrimeChart::from_minterms(&[0, 1, 5, 7], 3);
        assert_eq!(names(chart.primes()), ["00-", "-01", "1-1"]);
        let essentials = chart.essentials();
        assert_eq!(names(&chart.select(&essentials)), ["00-", "1-1"]);
        let cover = chart.greedy_cover();
        assert_eq!(cover, essentials);
        assert_eq!(chart.petrick_cover(), essentials);
    }

    #[test]
    fn cyclic_chart() {
        let minterms = [0, 1, 2, 5, 6, 7];
        let chart = PrimeChart::from_minterms(&minterms, 3);
        assert!(chart.essentials().is_empty());
        for cover in [chart.greedy_cover(), chart.petrick_cover()] {
            let selected = chart.select(&cover);
            for m in minterms {
                assert!(selected.iter().any(|p| p.covers(m)));
            }
            assert!(cover.len() <= 4);
        }
        let terms = chart.petrick_terms();
        assert_eq!(terms.len(), 6);
        assert!(terms.iter().all(|(_, covering)| covering.len() == 2));
    }
}
