use anyhow::{anyhow, Result};
use std::future::Future;
use tracing::{error, info};

/// Run `attempt` until it succeeds or `max_attempts` runs have failed.
/// Attempts are numbered from 1 and follow each other without backoff.
pub async fn run_with_retries<T, F, Fut>(max_attempts: u32, mut attempt: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;

    for n in 1..=max_attempts {
        match attempt(n).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                error!("An error occurred during data collection: {:#}", e);
                if n < max_attempts {
                    info!("Retrying... ({}/{})", n, max_attempts);
                }
                last_error = Some(e);
            }
        }
    }

    error!("Maximum retries reached. Exiting.");
    Err(match last_error {
        Some(e) => e.context(format!("Gave up after {max_attempts} attempts")),
        None => anyhow!("No attempts were made"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::cell::Cell;

    #[tokio::test]
    async fn first_success_stops_retrying() {
        let calls = Cell::new(0);

        let result = run_with_retries(3, |_| {
            calls.set(calls.get() + 1);
            async { Ok::<_, anyhow::Error>("done") }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn recovers_on_a_later_attempt() {
        let result = run_with_retries(3, |n| async move {
            if n < 3 {
                bail!("attempt {n} failed");
            }
            Ok(n)
        })
        .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn exhausting_the_budget_fails() {
        let calls = Cell::new(0);

        let result: Result<()> = run_with_retries(3, |n| {
            calls.set(calls.get() + 1);
            async move { bail!("attempt {n} failed") }
        })
        .await;

        assert_eq!(calls.get(), 3);
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Gave up after 3 attempts"));
        assert!(message.contains("attempt 3 failed"));
    }

    #[tokio::test]
    async fn zero_budget_makes_no_attempt() {
        let result: Result<()> = run_with_retries(0, |_| async { Ok(()) }).await;
        assert!(result.is_err());
    }
}
