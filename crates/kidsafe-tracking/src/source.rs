//! Where position samples come from.
//!
//! A feed asks its source for the next coordinate on every tick. Returning
//! `None` ends the feed.

use std::collections::VecDeque;

use kidsafe_core::geo::Coordinate;
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Produces the next position of one subject.
pub trait PositionSource: Send {
  /// `last` is the subject's last known coordinate, if any.
  fn next_position(&mut self, last: Option<Coordinate>) -> Option<Coordinate>;
}

impl<F> PositionSource for F
where
  F: FnMut(Option<Coordinate>) -> Option<Coordinate> + Send,
{
  fn next_position(&mut self, last: Option<Coordinate>) -> Option<Coordinate> { self(last) }
}

// ─── Simulated walk ──────────────────────────────────────────────────────────

/// A random walk: each step moves up to half of `step_degrees` along each
/// axis from the last known position, or from `origin` when there is none.
#[derive(Debug, Clone)]
pub struct SimulatedWalk {
  rng:          StdRng,
  origin:       Coordinate,
  step_degrees: f64,
}

impl SimulatedWalk {
  pub fn new(origin: Coordinate, step_degrees: f64) -> Self {
    Self {
      rng: StdRng::from_entropy(),
      origin,
      step_degrees,
    }
  }

  /// A reproducible walk.
  pub fn seeded(origin: Coordinate, step_degrees: f64, seed: u64) -> Self {
    Self {
      rng: StdRng::seed_from_u64(seed),
      origin,
      step_degrees,
    }
  }

  fn jitter(&mut self) -> f64 { self.rng.gen_range(-0.5..0.5) * self.step_degrees }
}

impl PositionSource for SimulatedWalk {
  fn next_position(&mut self, last: Option<Coordinate>) -> Option<Coordinate> {
    let from = last.unwrap_or(self.origin);
    let (d_lat, d_lng) = (self.jitter(), self.jitter());
    Some(from.offset(d_lat, d_lng))
  }
}

// ─── Fixture replay ──────────────────────────────────────────────────────────

/// Replays a fixed sequence, then ends the feed.
#[derive(Debug, Clone)]
pub struct FixtureReplay<T> {
  items: VecDeque<T>,
}

impl<T> FixtureReplay<T> {
  pub fn new(items: impl IntoIterator<Item = T>) -> Self {
    Self {
      items: items.into_iter().collect(),
    }
  }

  pub fn remaining(&self) -> usize { self.items.len() }

  pub(crate) fn next_item(&mut self) -> Option<T> { self.items.pop_front() }
}

impl PositionSource for FixtureReplay<Coordinate> {
  fn next_position(&mut self, _last: Option<Coordinate>) -> Option<Coordinate> { self.next_item() }
}

#[cfg(test)]
mod tests {
  use kidsafe_core::geo;

  use super::*;

  const HOME: Coordinate = Coordinate::new(40.7128, -74.0060);

  #[test]
  fn walk_starts_at_origin_and_stays_within_step() {
    let mut walk = SimulatedWalk::seeded(HOME, 0.001, 7);
    let mut last = None;
    for _ in 0..50 {
      let next = walk.next_position(last).unwrap();
      let from = last.unwrap_or(HOME);
      assert!((next.latitude - from.latitude).abs() <= 0.0005);
      assert!((next.longitude - from.longitude).abs() <= 0.0005);
      last = Some(next);
    }
  }

  #[test]
  fn seeded_walks_are_reproducible() {
    let mut a = SimulatedWalk::seeded(HOME, 0.001, 42);
    let mut b = SimulatedWalk::seeded(HOME, 0.001, 42);
    for _ in 0..10 {
      assert_eq!(a.next_position(None), b.next_position(None));
    }
  }

  #[test]
  fn first_step_is_near_origin() {
    let mut walk = SimulatedWalk::new(HOME, 0.001);
    let first = walk.next_position(None).unwrap();
    // Half a step on both axes is well under 100 m at this latitude.
    assert!(geo::distance(first, HOME) < 100.0);
  }

  #[test]
  fn fixture_replays_in_order_then_ends() {
    let away = Coordinate::new(40.76, -73.98);
    let mut replay = FixtureReplay::new([HOME, away]);
    assert_eq!(replay.next_position(None), Some(HOME));
    assert_eq!(replay.next_position(Some(HOME)), Some(away));
    assert_eq!(replay.next_position(Some(away)), None);
    assert_eq!(replay.remaining(), 0);
  }

  #[test]
  fn closures_are_sources() {
    let mut calls = 0;
    let mut source = move |_last: Option<Coordinate>| {
      calls += 1;
      (calls <= 2).then_some(HOME)
    };
    assert!(source.next_position(None).is_some());
    assert!(source.next_position(None).is_some());
    assert!(source.next_position(None).is_none());
  }
}
