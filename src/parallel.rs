//! Data-parallel loops over cells, nodes and faces.
//!
//! Every pass is expressed as one of:
//!
//! - [`for_each_indexed`]: each element writes only its own output slot
//! - [`map_collect`] / [`try_map_collect`]: each element produces one value
//! - [`reduce_min`] / [`reduce_sum`]: order-free reductions
//!
//! The output slice (or the collected vector) is the whole write-set of a
//! pass; closures only get shared references to everything else, so two
//! loop bodies can never write the same element. With the `parallel`
//! feature the loops run on rayon's pool, otherwise sequentially. Each
//! call returns only after every element is done.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Run `f(i, &mut out[i])` for every element of `out`.
#[cfg(feature = "parallel")]
pub fn for_each_indexed<T, F>(out: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    out.par_iter_mut().enumerate().for_each(|(i, slot)| f(i, slot));
}

/// Run `f(i, &mut out[i])` for every element of `out`.
#[cfg(not(feature = "parallel"))]
pub fn for_each_indexed<T, F>(out: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    out.iter_mut().enumerate().for_each(|(i, slot)| f(i, slot));
}

/// Collect `f(i)` for `i` in `0..n`.
#[cfg(feature = "parallel")]
pub fn map_collect<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    (0..n).into_par_iter().map(f).collect()
}

/// Collect `f(i)` for `i` in `0..n`.
#[cfg(not(feature = "parallel"))]
pub fn map_collect<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    (0..n).map(f).collect()
}

/// Collect `f(i)`, stopping at the first error.
#[cfg(feature = "parallel")]
pub fn try_map_collect<T, E, F>(n: usize, f: F) -> Result<Vec<T>, E>
where
    T: Send,
    E: Send,
    F: Fn(usize) -> Result<T, E> + Sync + Send,
{
    (0..n).into_par_iter().map(f).collect()
}

/// Collect `f(i)`, stopping at the first error.
#[cfg(not(feature = "parallel"))]
pub fn try_map_collect<T, E, F>(n: usize, f: F) -> Result<Vec<T>, E>
where
    T: Send,
    E: Send,
    F: Fn(usize) -> Result<T, E> + Sync + Send,
{
    (0..n).map(f).collect()
}

/// Minimum of `f(i)` over `0..n`; `+∞` when empty.
#[cfg(feature = "parallel")]
pub fn reduce_min<F>(n: usize, f: F) -> f64
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    (0..n).into_par_iter().map(f).reduce(|| f64::INFINITY, f64::min)
}

/// Minimum of `f(i)` over `0..n`; `+∞` when empty.
#[cfg(not(feature = "parallel"))]
pub fn reduce_min<F>(n: usize, f: F) -> f64
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    (0..n).map(f).fold(f64::INFINITY, f64::min)
}

/// Sum of `f(i)` over `0..n`.
#[cfg(feature = "parallel")]
pub fn reduce_sum<F>(n: usize, f: F) -> f64
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    (0..n).into_par_iter().map(f).sum()
}

/// Sum of `f(i)` over `0..n`.
#[cfg(not(feature = "parallel"))]
pub fn reduce_sum<F>(n: usize, f: F) -> f64
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    (0..n).map(f).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_each_writes_own_slot() {
        let mut out = vec![0usize; 100];
        for_each_indexed(&mut out, |i, slot| *slot = 2 * i);
        assert!(out.iter().enumerate().all(|(i, v)| *v == 2 * i));
    }

    #[test]
    fn test_reductions() {
        assert_eq!(reduce_sum(4, |i| i as f64), 6.0);
        assert_eq!(reduce_min(4, |i| 10.0 - i as f64), 7.0);
        assert_eq!(reduce_min(0, |_| 0.0), f64::INFINITY);
    }

    #[test]
    fn test_try_map_collect_stops_on_error() {
        let ok: Result<Vec<usize>, String> = try_map_collect(3, Ok);
        assert_eq!(ok.unwrap(), vec![0, 1, 2]);
        let err: Result<Vec<usize>, String> =
            try_map_collect(5, |i| if i == 3 { Err(format!("bad {i}")) } else { Ok(i) });
        assert_eq!(err.unwrap_err(), "bad 3");
    }

    #[test]
    fn test_map_collect_preserves_order() {
        assert_eq!(map_collect(4, |i| i * i), vec![0, 1, 4, 9]);
    }
}
