use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::models::{ClothingRecord, Gender, Style};

/// Source of the random choice among interchangeable matches
#[cfg_attr(test, mockall::automock)]
pub trait RandomSource: Send {
    /// Returns an index in `0..len`; callers never pass `len == 0`
    fn pick(&mut self, len: usize) -> usize;
}

/// Thread-local generator, used when no seed is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible generator for a fixed seed
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// A single recommendation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
    pub gender: Gender,
    pub style: Style,
    pub temperature: i32,
}

/// The record chosen for a query, with the size of the survivor set it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation<'a> {
    pub record: &'a ClothingRecord,
    pub candidates: usize,
}

/// Matches queries against a loaded catalog
pub struct Recommender<'a> {
    catalog: &'a [ClothingRecord],
}

impl<'a> Recommender<'a> {
    pub fn new(catalog: &'a [ClothingRecord]) -> Self {
        Self { catalog }
    }

    /// Survivor set: records with the query's gender and style whose band contains its temperature
    pub fn candidates(&self, query: &Query) -> Vec<&'a ClothingRecord> {
        self.catalog
            .iter()
            .filter(|r| r.gender == query.gender && r.style == query.style)
            .filter(|r| r.band().contains(query.temperature))
            .collect()
    }

    /// Picks one survivor uniformly at random, `None` when nothing qualifies
    pub fn recommend(
        &self,
        query: &Query,
        rng: &mut dyn RandomSource,
    ) -> Option<Recommendation<'a>> {
        let survivors = self.candidates(query);
        if survivors.is_empty() {
            return None;
        }

        let idx = rng.pick(survivors.len()).min(survivors.len() - 1);
        Some(Recommendation {
            record: survivors[idx],
            candidates: survivors.len(),
        })
    }
}
