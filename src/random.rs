//! Random sampling helpers for the gallery grid.

use crate::error::{Error, Result};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::HashSet;

/// `count` distinct integers in `[min, max)`, in the order they were drawn.
pub fn pick_unique(count: u32, max: u32, min: u32) -> Result<Vec<u32>> {
    pick_unique_with(&mut rand::rng(), count, max, min)
}

/// Rejection sampling: draw uniformly until `count` distinct values are collected.
pub fn pick_unique_with<R: Rng + ?Sized>(
    rng: &mut R,
    count: u32,
    max: u32,
    min: u32,
) -> Result<Vec<u32>> {
    if max < min || count > max - min {
        return Err(Error::InvalidArgument(format!(
            "cannot pick {count} unique numbers from [{min}, {max})"
        )));
    }

    let mut seen = HashSet::with_capacity(count as usize);
    let mut picked = Vec::with_capacity(count as usize);
    while picked.len() < count as usize {
        let candidate = rng.random_range(min..max);
        if seen.insert(candidate) {
            picked.push(candidate);
        }
    }
    Ok(picked)
}

/// Shuffled copy of `items` (Fisher–Yates).
pub fn shuffle<T: Clone>(items: &[T]) -> Vec<T> {
    shuffle_with(&mut rand::rng(), items)
}

pub fn shuffle_with<T: Clone, R: Rng + ?Sized>(rng: &mut R, items: &[T]) -> Vec<T> {
    let mut shuffled = items.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

pub fn random_element<T>(items: &[T]) -> Option<&T> {
    random_element_with(&mut rand::rng(), items)
}

pub fn random_element_with<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}
