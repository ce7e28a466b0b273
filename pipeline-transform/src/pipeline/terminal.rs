//! Terminal consumers.
//!
//! Each consumer takes the pipeline by value, drives the pass, and returns
//! a single value. Short-circuiting consumers (`find`, `some`, `every`,
//! `includes`) return as soon as the answer is known; the pipeline and its
//! upstream are dropped at that point and nothing further is pulled.

use super::engine::Pipeline;
use crate::errors::{PipelineError, Result};
use futures::TryStreamExt;
use std::fmt::Display;
use std::future::Future;

impl<'a, T: Send + 'a> Pipeline<'a, T> {
    /// Collects every item, in order.
    pub async fn to_vec(self) -> Result<Vec<T>> {
        self.try_collect().await
    }

    /// Folds items left to right; the reducer receives a zero-based index.
    pub async fn reduce<U, F>(self, mut reducer: F, initial: U) -> Result<U>
    where
        F: FnMut(U, T, usize) -> U,
    {
        let mut pass = self;
        let mut accumulator = initial;
        let mut index = 0;
        while let Some(item) = pass.try_next().await? {
            accumulator = reducer(accumulator, item, index);
            index += 1;
        }
        Ok(accumulator)
    }

    /// Like [`reduce`](Self::reduce) with a suspending reducer.
    pub async fn reduce_async<U, F, Fut>(self, mut reducer: F, initial: U) -> Result<U>
    where
        F: FnMut(U, T, usize) -> Fut,
        Fut: Future<Output = U>,
    {
        let mut pass = self;
        let mut accumulator = initial;
        let mut index = 0;
        while let Some(item) = pass.try_next().await? {
            accumulator = reducer(accumulator, item, index).await;
            index += 1;
        }
        Ok(accumulator)
    }

    /// Like [`reduce`](Self::reduce) with a suspending, fallible reducer.
    pub async fn try_reduce<U, E, F, Fut>(self, mut reducer: F, initial: U) -> Result<U>
    where
        E: Into<anyhow::Error>,
        F: FnMut(U, T, usize) -> Fut,
        Fut: Future<Output = std::result::Result<U, E>>,
    {
        let mut pass = self;
        let mut accumulator = initial;
        let mut index = 0;
        while let Some(item) = pass.try_next().await? {
            accumulator = reducer(accumulator, item, index)
                .await
                .map_err(|e| PipelineError::stage("reduce", e))?;
            index += 1;
        }
        Ok(accumulator)
    }

    /// Returns the first item matching `predicate`.
    pub async fn find<F>(self, mut predicate: F) -> Result<Option<T>>
    where
        F: FnMut(&T) -> bool,
    {
        let mut pass = self;
        while let Some(item) = pass.try_next().await? {
            if predicate(&item) {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    /// Returns the first item matching a suspending predicate.
    pub async fn find_async<F, Fut>(self, mut predicate: F) -> Result<Option<T>>
    where
        F: FnMut(&T) -> Fut,
        Fut: Future<Output = bool>,
    {
        let mut pass = self;
        while let Some(item) = pass.try_next().await? {
            if predicate(&item).await {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    /// Returns the first `Some` produced by `func`.
    ///
    /// The narrowing form of `find`.
    pub async fn find_map<U, F>(self, mut func: F) -> Result<Option<U>>
    where
        F: FnMut(T) -> Option<U>,
    {
        let mut pass = self;
        while let Some(item) = pass.try_next().await? {
            if let Some(found) = func(item) {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Returns true if any item matches. False for an empty pipeline.
    pub async fn some<F>(self, predicate: F) -> Result<bool>
    where
        F: FnMut(&T) -> bool,
    {
        Ok(self.find(predicate).await?.is_some())
    }

    /// Returns true if any item matches a suspending predicate.
    pub async fn some_async<F, Fut>(self, predicate: F) -> Result<bool>
    where
        F: FnMut(&T) -> Fut,
        Fut: Future<Output = bool>,
    {
        Ok(self.find_async(predicate).await?.is_some())
    }

    /// Returns true if every item matches. True for an empty pipeline.
    pub async fn every<F>(self, mut predicate: F) -> Result<bool>
    where
        F: FnMut(&T) -> bool,
    {
        Ok(self.find(|item| !predicate(item)).await?.is_none())
    }

    /// Returns true if every item matches a suspending predicate.
    pub async fn every_async<F, Fut>(self, mut predicate: F) -> Result<bool>
    where
        F: FnMut(&T) -> Fut,
        Fut: Future<Output = bool>,
    {
        let mut pass = self;
        while let Some(item) = pass.try_next().await? {
            if !predicate(&item).await {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Returns true if an item equal to `value` is produced.
    pub async fn includes(self, value: &T) -> Result<bool>
    where
        T: PartialEq,
    {
        self.some(|item| item == value).await
    }

    /// Collects every item and joins their `Display` forms with `separator`.
    pub async fn join(self, separator: &str) -> Result<String>
    where
        T: Display,
    {
        self.join_with(separator, ToString::to_string).await
    }

    /// Joins with the configured separator (`","` unless overridden).
    pub async fn join_default(self) -> Result<String>
    where
        T: Display,
    {
        let separator = self.config().join_separator.clone();
        self.join(&separator).await
    }

    /// Collects every item and joins the strings produced by `render`.
    pub async fn join_with<F>(self, separator: &str, render: F) -> Result<String>
    where
        F: FnMut(&T) -> String,
    {
        let items = self.to_vec().await?;
        Ok(items.iter().map(render).collect::<Vec<_>>().join(separator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::testing::Counter;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_reduce_passes_index() {
        let indexes = Pipeline::from_iterable(vec!["a", "b", "c"])
            .reduce(
                |mut acc: Vec<usize>, _, index| {
                    acc.push(index);
                    acc
                },
                Vec::new(),
            )
            .await
            .unwrap();

        assert_eq!(indexes, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_reduce_variants() {
        let sum = Pipeline::from_iterable(1..=5).reduce(|a, b, _| a + b, 0).await.unwrap();
        let sum_async = Pipeline::from_iterable(1..=5)
            .reduce_async(|a, b, _| async move { a + b }, 0)
            .await
            .unwrap();
        let empty = Pipeline::from_iterable(Vec::<i32>::new())
            .reduce(|a, b, _| a + b, 0)
            .await
            .unwrap();

        assert_eq!(sum, 15);
        assert_eq!(sum_async, 15);
        assert_eq!(empty, 0);
    }

    #[tokio::test]
    async fn test_try_reduce_failure() {
        let err = Pipeline::from_iterable(1..=5)
            .try_reduce(
                |a, b, _| async move {
                    if b == 3 {
                        anyhow::bail!("three");
                    }
                    Ok(a + b)
                },
                0,
            )
            .await
            .unwrap_err();

        assert_eq!(err.operation(), Some("reduce"));
    }

    #[tokio::test]
    async fn test_find_short_circuits() {
        let pulled = Counter::new();
        let probe = pulled.clone();
        let found = Pipeline::from_iterable(1..=100)
            .for_each(move |_| probe.tick())
            .find(|x| *x > 2)
            .await
            .unwrap();

        assert_eq!(found, Some(3));
        assert_eq!(pulled.get(), 3);
    }

    #[tokio::test]
    async fn test_find_variants() {
        assert_eq!(Pipeline::from_iterable(1..=5).find(|x| *x > 10).await.unwrap(), None);
        assert_eq!(
            Pipeline::from_iterable(1..=5)
                .find_async(|x| {
                    let x = *x;
                    async move { x > 3 }
                })
                .await
                .unwrap(),
            Some(4)
        );
        assert_eq!(
            Pipeline::from_iterable(vec!["a", "7", "8"])
                .find_map(|s| s.parse::<u8>().ok())
                .await
                .unwrap(),
            Some(7)
        );
    }

    #[tokio::test]
    async fn test_some_and_every() {
        assert!(Pipeline::from_iterable(1..=5).some(|x| *x > 3).await.unwrap());
        assert!(!Pipeline::from_iterable(1..=5).some(|x| *x > 100).await.unwrap());
        assert!(Pipeline::from_iterable(1..=5).every(|x| *x > 0).await.unwrap());
        assert!(!Pipeline::from_iterable(1..=5).every(|x| *x > 10).await.unwrap());
        assert!(Pipeline::from_iterable(1..=5)
            .some_async(|x| {
                let x = *x;
                async move { x > 3 }
            })
            .await
            .unwrap());
        assert!(Pipeline::from_iterable(1..=5)
            .every_async(|x| {
                let x = *x;
                async move { x > 0 }
            })
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_empty_defaults() {
        let empty = || Pipeline::from_iterable(Vec::<i32>::new());

        assert!(empty().every(|_| false).await.unwrap());
        assert!(!empty().some(|_| true).await.unwrap());
        assert!(!empty().includes(&1).await.unwrap());
        assert_eq!(empty().find(|_| true).await.unwrap(), None);
        assert_eq!(empty().join(",").await.unwrap(), "");
        assert!(empty().to_vec().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_every_short_circuits() {
        let pulled = Counter::new();
        let probe = pulled.clone();
        let all_small = Pipeline::from_iterable(0u64..)
            .for_each(move |_| probe.tick())
            .every(|x| *x < 4)
            .await
            .unwrap();

        assert!(!all_small);
        assert_eq!(pulled.get(), 5);
    }

    #[tokio::test]
    async fn test_includes() {
        assert!(Pipeline::from_iterable(1..=5).includes(&2).await.unwrap());
        assert!(!Pipeline::from_iterable(1..=5).includes(&100).await.unwrap());
    }

    #[tokio::test]
    async fn test_join_forms() {
        assert_eq!(Pipeline::from_iterable(1..=5).join("-").await.unwrap(), "1-2-3-4-5");
        assert_eq!(Pipeline::from_iterable(1..=5).join(" - ").await.unwrap(), "1 - 2 - 3 - 4 - 5");
        assert_eq!(Pipeline::from_iterable(1..=5).join_default().await.unwrap(), "1,2,3,4,5");
        assert_eq!(
            Pipeline::from_iterable(1..=3)
                .with_config(PipelineConfig::new().with_join_separator("|"))
                .join_default()
                .await
                .unwrap(),
            "1|2|3"
        );
    }

    #[tokio::test]
    async fn test_join_with_renderer() {
        #[derive(Debug)]
        struct Record {
            id: u32,
        }

        let records = vec![Record { id: 1 }, Record { id: 2 }, Record { id: 3 }];
        let joined = Pipeline::from_iterable(records)
            .join_with(",", |r| format!("#{}", r.id))
            .await
            .unwrap();

        assert_eq!(joined, "#1,#2,#3");
    }
}
