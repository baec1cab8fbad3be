//! Latest-request-wins recomputation for interactive clients
//!
//! Every submitted parameter set gets a generation number. A single worker
//! task always computes the newest request it has seen and publishes a result
//! only if no newer request arrived while it was busy, so a slow computation
//! never overwrites the view of a more recent one.

use std::sync::Arc;

use cycloscope_core::{analyze, Analysis, AnalysisConfig, Signal};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Debug)]
struct LiveJob {
    generation: u64,
    samples: Vec<f64>,
    sample_rate: f64,
    config: AnalysisConfig,
}

impl LiveJob {
    fn run(&self) -> LiveOutcome {
        let result = Signal::new(&self.samples, self.sample_rate)
            .and_then(|signal| analyze(&signal, &self.config));
        match result {
            Ok(analysis) => LiveOutcome::Ready {
                analysis: Box::new(analysis),
            },
            Err(e) => LiveOutcome::Failed {
                error: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LiveOutcome {
    Ready { analysis: Box<Analysis> },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveResult {
    pub generation: u64,
    #[serde(flatten)]
    pub outcome: LiveOutcome,
}

/// Handle to the recompute worker; cheap to clone
#[derive(Clone)]
pub struct LiveAnalysis {
    requests: Arc<watch::Sender<Option<Arc<LiveJob>>>>,
    results: watch::Receiver<Option<Arc<LiveResult>>>,
}

impl LiveAnalysis {
    /// Start the worker on the current tokio runtime
    pub fn spawn() -> Self {
        let (request_tx, request_rx) = watch::channel(None);
        let (result_tx, result_rx) = watch::channel(None);
        tokio::spawn(run_worker(request_rx, result_tx));
        Self {
            requests: Arc::new(request_tx),
            results: result_rx,
        }
    }

    /// Queue a recomputation, replacing any request not yet picked up
    ///
    /// Returns the generation assigned to this request.
    pub fn submit(&self, samples: Vec<f64>, sample_rate: f64, config: AnalysisConfig) -> u64 {
        let mut generation = 0;
        // Assigned under the channel lock: generations increase in send order
        self.requests.send_modify(|slot| {
            generation = slot.as_ref().map_or(1, |job| job.generation + 1);
            *slot = Some(Arc::new(LiveJob {
                generation,
                samples,
                sample_rate,
                config,
            }));
        });
        debug!(generation, "live request submitted");
        generation
    }

    /// Most recently published result, if any
    pub fn latest(&self) -> Option<Arc<LiveResult>> {
        self.results.borrow().clone()
    }

    /// Wait until a result at least as new as `generation` is published
    ///
    /// Returns `None` if the worker has stopped.
    pub async fn wait_for(&self, generation: u64) -> Option<Arc<LiveResult>> {
        let mut results = self.results.clone();
        let published = results
            .wait_for(|r| r.as_ref().is_some_and(|r| r.generation >= generation))
            .await
            .ok()?;
        published.clone()
    }
}

async fn run_worker(
    mut requests: watch::Receiver<Option<Arc<LiveJob>>>,
    results: watch::Sender<Option<Arc<LiveResult>>>,
) {
    while requests.changed().await.is_ok() {
        let Some(job) = requests.borrow_and_update().clone() else {
            continue;
        };
        debug!(generation = job.generation, "recomputing");

        let computing = Arc::clone(&job);
        let outcome = match tokio::task::spawn_blocking(move || computing.run()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(generation = job.generation, "recompute task failed: {}", e);
                LiveOutcome::Failed {
                    error: format!("recompute task failed: {}", e),
                }
            }
        };

        if requests.has_changed().unwrap_or(false) {
            debug!(generation = job.generation, "dropping superseded result");
            continue;
        }

        results.send_replace(Some(Arc::new(LiveResult {
            generation: job.generation,
            outcome,
        })));
    }
    debug!("live worker stopped");
}
