//! Poller implementation - runs poll cycles until shut down.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::CycleError;
use crate::homework::{self, ReviewItem};
use crate::notify::Notifier;
use crate::poller::state::LoopState;
use crate::practicum::StatusSource;

/// What a single cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A status change was delivered; carries the message text
    Notified(String),
    /// Nothing new since the last delivered message
    NoChange,
    /// The cycle failed; `announced` is false when the failure repeated the previous one
    Failed { error: String, announced: bool },
}

/// Configuration for the Poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Pause between the end of one cycle and the start of the next
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600),
        }
    }
}

impl From<&Config> for PollerConfig {
    fn from(config: &Config) -> Self {
        Self {
            interval: config.poll.interval(),
        }
    }
}

/// Poller drives the fetch/validate/detect/notify cycle.
///
/// Each cycle:
/// 1. Fetches statuses since the resume marker minus one interval
/// 2. Validates the response shape
/// 3. Compares the newest homework with the last one announced
/// 4. On change: composes and sends the message, then remembers the homework
/// 5. On any error: announces it once, suppressing identical repeats
pub struct Poller<S, N>
where
    S: StatusSource,
    N: Notifier,
{
    source: Arc<S>,
    notifier: Arc<N>,
    config: PollerConfig,
    state: LoopState,
}

impl<S, N> Poller<S, N>
where
    S: StatusSource,
    N: Notifier,
{
    /// Create a poller anchored at the current time.
    pub fn new(source: Arc<S>, notifier: Arc<N>, config: PollerConfig) -> Self {
        Self::with_state(source, notifier, config, LoopState::new(chrono::Utc::now().timestamp()))
    }

    /// Create a poller with explicit starting state.
    pub fn with_state(source: Arc<S>, notifier: Arc<N>, config: PollerConfig, state: LoopState) -> Self {
        Self {
            source,
            notifier,
            config,
            state,
        }
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    /// Run cycles until `shutdown` resolves.
    ///
    /// Shutdown is honoured mid-cycle and mid-sleep; no message is sent on exit.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        log::info!("Poller started, interval {}s", self.config.interval.as_secs());

        loop {
            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => None,
                outcome = self.run_cycle() => Some(outcome),
            };
            let Some(outcome) = outcome else {
                break;
            };
            log::debug!("Cycle {} finished: {:?}", self.state.cycle_count, outcome);

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        log::info!("Poller stopped after {} cycle(s)", self.state.cycle_count);
    }

    /// Run one cycle. Never fails: errors are folded into the outcome.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.state.tick();
        match self.poll_once().await {
            Ok(outcome) => {
                self.state.clear_error();
                outcome
            }
            Err(err) => self.report(err).await,
        }
    }

    async fn poll_once(&mut self) -> Result<CycleOutcome, CycleError> {
        let since = self.state.query_since(self.config.interval.as_secs());
        let raw = self.source.fetch(Some(since)).await?;
        let items = homework::validate(&raw)?;
        let marker = homework::resume_marker(&raw);

        let candidate = items.first();
        if !homework::should_notify(candidate, self.state.last_notified.as_ref()) {
            log::info!("No status change");
            self.state.advance(marker);
            return Ok(CycleOutcome::NoChange);
        }

        // should_notify only returns true for a present candidate
        let Some(item) = candidate.cloned() else {
            return Ok(CycleOutcome::NoChange);
        };
        let text = self.deliver(&item).await?;

        self.state.mark_notified(item);
        self.state.advance(marker);
        Ok(CycleOutcome::Notified(text))
    }

    async fn deliver(&self, item: &ReviewItem) -> Result<String, CycleError> {
        let text = homework::describe(item).inspect_err(|e| log::error!("{}", e))?;
        self.notifier.send(&text).await?;
        Ok(text)
    }

    async fn report(&mut self, err: CycleError) -> CycleOutcome {
        let summary = err.to_string();
        log::error!("Cycle failed ({}): {}", err.category(), summary);

        if !self.state.record_error(&summary) {
            log::info!("Same failure as last cycle, not announcing again");
            return CycleOutcome::Failed {
                error: summary,
                announced: false,
            };
        }

        if let Err(e) = self.notifier.send(&homework::failure_message(&summary)).await {
            log::error!("Could not announce failure: {}", e);
        }

        CycleOutcome::Failed {
            error: summary,
            announced: true,
        }
    }
}
