//! First-success evaluation of ordered fallback strategies.
//!
//! Several places in the engine try a list of alternatives in a fixed
//! order and take the first that works (atomic submission methods, gas
//! price sources). This combinator replaces nested error handling with a
//! flat strategy list and keeps every failure for diagnostics.

use std::fmt;

use futures_util::future::BoxFuture;

/// A successful strategy outcome, labeled with the strategy that won.
#[derive(Debug)]
pub struct FirstSuccess<T> {
    /// Value produced by the winning strategy.
    pub value: T,
    /// Label of the winning strategy.
    pub strategy: &'static str,
}

/// Every strategy failed. Holds each label with its failure text, in
/// evaluation order.
#[derive(Debug)]
pub struct ExhaustedStrategies {
    /// (strategy label, failure description) pairs.
    pub failures: Vec<(&'static str, String)>,
}

impl fmt::Display for ExhaustedStrategies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "all strategies failed: ")?;
        for (i, (label, reason)) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{label}: {reason}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ExhaustedStrategies {}

/// Evaluates labeled strategies in order, returning the first success.
/// Failures are logged at debug level and aggregated if all are exhausted.
pub async fn first_success<'a, T, E: fmt::Display>(
    what: &str,
    strategies: Vec<(&'static str, BoxFuture<'a, Result<T, E>>)>,
) -> Result<FirstSuccess<T>, ExhaustedStrategies> {
    let mut failures = Vec::with_capacity(strategies.len());

    for (label, fut) in strategies {
        match fut.await {
            Ok(value) => {
                tracing::debug!(what, strategy = label, "Strategy succeeded");
                return Ok(FirstSuccess { value, strategy: label });
            }
            Err(e) => {
                tracing::debug!(what, strategy = label, error = %e, "Strategy failed");
                failures.push((label, e.to_string()));
            }
        }
    }

    Err(ExhaustedStrategies { failures })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready<T: Send + 'static>(value: Result<T, String>) -> BoxFuture<'static, Result<T, String>> {
        Box::pin(async move { value })
    }

    #[tokio::test]
    async fn test_returns_first_winner() {
        let result = first_success(
            "test",
            vec![
                ("a", ready::<u32>(Err("nope".into()))),
                ("b", ready(Ok(7))),
                ("c", ready(Ok(9))),
            ],
        )
        .await
        .unwrap();

        assert_eq!(result.value, 7);
        assert_eq!(result.strategy, "b");
    }

    #[tokio::test]
    async fn test_aggregates_all_failures() {
        let err = first_success::<u32, String>(
            "test",
            vec![
                ("a", ready(Err("first".into()))),
                ("b", ready(Err("second".into()))),
            ],
        )
        .await
        .unwrap_err();

        assert_eq!(err.failures.len(), 2);
        assert_eq!(err.failures[0], ("a", "first".to_string()));
        let text = err.to_string();
        assert!(text.contains("a: first") && text.contains("b: second"));
    }

    #[tokio::test]
    async fn test_empty_strategy_list_is_exhausted() {
        let err = first_success::<u32, String>("test", vec![]).await.unwrap_err();
        assert!(err.failures.is_empty());
    }
}
