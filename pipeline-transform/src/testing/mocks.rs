//! Failing callbacks for error-propagation tests.

use futures::future::{self, Ready};

/// Returns a `try_map` function that fails on items matching `predicate`.
pub fn fail_on<T, P>(mut predicate: P) -> impl FnMut(T) -> Ready<anyhow::Result<T>> + Send
where
    P: FnMut(&T) -> bool + Send,
{
    move |item| {
        future::ready(if predicate(&item) {
            Err(anyhow::anyhow!("Boom!"))
        } else {
            Ok(item)
        })
    }
}

/// Returns a `try_reduce` reducer summing items until one matches `predicate`.
pub fn fail_reducer_on<P>(
    mut predicate: P,
) -> impl FnMut(i64, i64, usize) -> Ready<anyhow::Result<i64>> + Send
where
    P: FnMut(i64) -> bool + Send,
{
    move |acc, item, _| {
        future::ready(if predicate(item) {
            Err(anyhow::anyhow!("reducer failed at {item}"))
        } else {
            Ok(acc + item)
        })
    }
}
