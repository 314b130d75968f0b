//! Inclusive price bounds in USD.
//!
//! A record without a price never satisfies a bound: "under $15" should not
//! surface games whose price we don't know.

use crate::traits::Filter;
use anyhow::{bail, Result};
use data_loader::GameRecord;

pub struct PriceRangeFilter {
    min_price: Option<f64>,
    max_price: Option<f64>,
}

impl PriceRangeFilter {
    pub fn new(min_price: Option<f64>, max_price: Option<f64>) -> Self {
        Self {
            min_price,
            max_price,
        }
    }

    fn in_range(&self, price: f64) -> bool {
        self.min_price.is_none_or(|min| price >= min)
            && self.max_price.is_none_or(|max| price <= max)
    }
}

impl Filter for PriceRangeFilter {
    fn name(&self) -> &str {
        "PriceRangeFilter"
    }

    fn apply<'a>(&self, games: Vec<&'a GameRecord>) -> Result<Vec<&'a GameRecord>> {
        for bound in [self.min_price, self.max_price].into_iter().flatten() {
            if !bound.is_finite() {
                bail!("price bound must be a finite number, got {}", bound);
            }
        }
        if self.min_price.is_none() && self.max_price.is_none() {
            return Ok(games);
        }

        Ok(games
            .into_iter()
            .filter(|game| game.price().is_some_and(|price| self.in_range(price)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(id: &str, cents: Option<u64>) -> GameRecord {
        let mut game = GameRecord::new(id, id);
        game.price_cents = cents;
        game
    }

    #[test]
    fn test_max_price_is_inclusive() {
        let games = vec![priced("a", Some(1538)), priced("b", Some(1539)), priced("c", None)];
        let filter = PriceRangeFilter::new(None, Some(15.38));

        let filtered = filter.apply(games.iter().collect()).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "a");
    }

    #[test]
    fn test_min_and_max() {
        let games = vec![priced("free", Some(0)), priced("mid", Some(999)), priced("big", Some(5999))];
        let filter = PriceRangeFilter::new(Some(5.0), Some(20.0));

        let filtered = filter.apply(games.iter().collect()).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "mid");
    }

    #[test]
    fn test_unbounded_keeps_unpriced_records() {
        let games = vec![priced("a", None)];
        let filter = PriceRangeFilter::new(None, None);
        assert_eq!(filter.apply(games.iter().collect()).unwrap().len(), 1);
    }

    #[test]
    fn test_rejects_nan_bound() {
        let games = vec![priced("a", Some(100))];
        let filter = PriceRangeFilter::new(None, Some(f64::NAN));
        assert!(filter.apply(games.iter().collect()).is_err());
    }
}
