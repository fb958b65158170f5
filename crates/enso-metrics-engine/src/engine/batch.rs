//! Parallel computation of many requests.

use enso_metrics_core::{MetricResult, MetricsResult};
use rayon::prelude::*;
use tracing::info;

use super::{ComputeRequest, MetricEngine};

impl MetricEngine {
    /// Compute every request in parallel.
    ///
    /// Results come back in request order; one failing metric does not stop
    /// the others.
    pub fn compute_batch(&self, requests: &[ComputeRequest]) -> Vec<MetricsResult<MetricResult>> {
        let run = || -> Vec<MetricsResult<MetricResult>> {
            requests.par_iter().map(|request| self.compute(request)).collect()
        };
        let results = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(
            requests = requests.len(),
            succeeded = requests.len() - failed,
            failed,
            "Batch computed"
        );
        results
    }

    /// Compute every member of `collection` with the inputs of `template`.
    ///
    /// Returns `(metric id, outcome)` pairs in declaration order. Fails only
    /// when the collection itself is unknown.
    pub fn compute_collection(
        &self,
        collection: &str,
        template: &ComputeRequest,
    ) -> MetricsResult<Vec<(String, MetricsResult<MetricResult>)>> {
        let ids: Vec<String> = self
            .registry
            .list_metrics(collection)?
            .into_iter()
            .map(String::from)
            .collect();
        let requests: Vec<ComputeRequest> = ids
            .iter()
            .map(|id| template.for_metric(collection, id))
            .collect();
        let results = self.compute_batch(&requests);
        Ok(ids.into_iter().zip(results).collect())
    }
}
