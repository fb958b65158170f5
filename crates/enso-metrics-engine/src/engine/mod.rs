//! MetricEngine: computes one metric of one collection for one model.
//!
//! A call walks the same pipeline for every metric:
//!
//! 1. resolve the metric in its collection and find its registered algorithm
//! 2. pick a region and a reference dataset per variable
//! 3. read every primitive term, convert units, combine composites
//! 4. restrict to the collection's period and check the sample count
//! 5. run the algorithm on each side (or jointly, for comparisons)
//! 6. normalize the model statistic by the reference statistic
//!
//! The engine holds no per-call state, so one instance can serve many
//! threads at once.

mod batch;
mod request;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use enso_metrics_core::collection::{InterpolationMethod, RegridSides};
use enso_metrics_core::config::{BatchConfig, EngineConfig};
use enso_metrics_core::traits::{FieldReader, GridConformer, ProfileAxis, StatisticsKernels};
use enso_metrics_core::types::{
    signed_sum, FieldValues, GridAxes, GriddedField, NonlinearityBreakdown, SideSummary, TimeAxis,
    TimeWindow,
};
use enso_metrics_core::{
    CollaboratorError, EntityKind, FieldHandle, MetricRegistry, MetricResult, MetricSpec,
    MetricsConfig, MetricsError, MetricsResult, ObservationDataset, Region, ResolvedMetric,
    TimeSeries,
};
use tracing::{debug, info};

pub use request::{ComputeRequest, ModelInput, ObservationInput};

use crate::alignment::{align_pair, require_steps, restrict};
use crate::functions::{
    self, compare_profiles, regression_statistic, self_statistic, CompareOptions, FunctionRegistry,
    MetricAlgorithm, MetricFunction, RegressionRoles, RegridPlan, SelfStatistic, SideStatistic,
};
use crate::kernels::DefaultKernels;
use crate::normalize;
use crate::regrid::{parse_target_grid, AxisRegridder};
use crate::units::normalize_units;

/// Which half of the comparison a dataset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Model,
    Observations,
}

impl Side {
    fn label(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Observations => "observations",
        }
    }
}

/// Everything resolved for one call before any data is read.
struct CallPlan<'a> {
    request: &'a ComputeRequest,
    resolved: ResolvedMetric<'a>,
    function: &'a MetricFunction,
    regions: BTreeMap<&'a str, &'a Region>,
    datasets: BTreeMap<&'a str, &'a ObservationDataset>,
    min_steps: usize,
}

impl<'a> CallPlan<'a> {
    fn spec(&self) -> &'a MetricSpec {
        self.resolved.spec
    }

    fn metric(&self) -> &'a str {
        &self.resolved.spec.id
    }

    fn period(&self, side: Side) -> &'a TimeWindow {
        match side {
            Side::Model => &self.resolved.common().modeled_period,
            Side::Observations => &self.resolved.common().observed_period,
        }
    }

    fn region(&self, variable: &str) -> MetricsResult<&'a Region> {
        self.regions
            .get(variable)
            .copied()
            .ok_or_else(|| self.unused(variable))
    }

    fn dataset(&self, variable: &str) -> MetricsResult<&'a ObservationDataset> {
        self.datasets
            .get(variable)
            .copied()
            .ok_or_else(|| self.unused(variable))
    }

    fn unused(&self, variable: &str) -> MetricsError {
        MetricsError::configuration(
            EntityKind::Variable,
            variable,
            format!("not used by metric '{}'", self.metric()),
        )
    }

    /// Reference identity: datasets in variable order, repeats dropped.
    fn observation_identity(&self) -> String {
        let mut ids: Vec<&str> = Vec::new();
        for variable in self.spec().variable_ids() {
            if let Some(dataset) = self.datasets.get(variable) {
                if !ids.contains(&dataset.id.as_str()) {
                    ids.push(&dataset.id);
                }
            }
        }
        ids.join("+")
    }
}

/// Metric computation engine.
///
/// Built around a shared [`MetricRegistry`] and a [`FieldReader`]; the
/// statistics kernels and the regridder default to [`DefaultKernels`] and
/// [`AxisRegridder`] and can be swapped.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use chrono::NaiveDate;
/// use enso_metrics_core::stubs::InMemoryFieldReader;
/// use enso_metrics_core::{MetricRegistry, TimeSeries};
/// use enso_metrics_engine::{ComputeRequest, MetricEngine};
///
/// let start = NaiveDate::from_ymd_opt(1980, 1, 1).unwrap();
/// let wave: Vec<f64> = (0..480).map(|i| 300.0 + (i as f64 * 0.37).sin()).collect();
/// let doubled: Vec<f64> = wave.iter().map(|v| 300.0 + 2.0 * (v - 300.0)).collect();
///
/// let reader = InMemoryFieldReader::new()
///     .with_series("model.nc", "ts", TimeSeries::monthly(start, doubled, "K"))
///     .with_series("hadisst.nc", "sst", TimeSeries::monthly(start, wave, "K"));
///
/// let registry = Arc::new(MetricRegistry::builtin().unwrap());
/// let engine = MetricEngine::new(registry, Arc::new(reader));
///
/// let request = ComputeRequest::new("ENSO_perf", "EnsoAmpl", "synthetic")
///     .with_model_handle("sst", "model.nc")
///     .with_observation("sst", "HadISST")
///     .with_observation_handle("HadISST", "hadisst.nc");
///
/// let result = engine.compute(&request).unwrap();
/// assert_eq!(result.units, "C");
/// ```
pub struct MetricEngine {
    registry: Arc<MetricRegistry>,
    config: EngineConfig,
    functions: FunctionRegistry,
    reader: Arc<dyn FieldReader>,
    kernels: Arc<dyn StatisticsKernels>,
    regridder: Arc<dyn GridConformer>,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl fmt::Debug for MetricEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricEngine")
            .field("config", &self.config)
            .field("functions", &self.functions.len())
            .field("dedicated_pool", &self.pool.is_some())
            .finish_non_exhaustive()
    }
}

impl MetricEngine {
    /// Engine with the default [`EngineConfig`].
    pub fn new(registry: Arc<MetricRegistry>, reader: Arc<dyn FieldReader>) -> Self {
        Self::build(registry, reader, EngineConfig::default())
    }

    /// Engine with an explicit configuration, validated first.
    pub fn try_new(
        registry: Arc<MetricRegistry>,
        reader: Arc<dyn FieldReader>,
        config: EngineConfig,
    ) -> MetricsResult<Self> {
        config
            .validate()
            .map_err(|reason| MetricsError::configuration(EntityKind::Setting, "engine", reason))?;
        Ok(Self::build(registry, reader, config))
    }

    /// Engine configured from a full [`MetricsConfig`], including its batch
    /// thread pool.
    pub fn from_config(
        registry: Arc<MetricRegistry>,
        reader: Arc<dyn FieldReader>,
        config: &MetricsConfig,
    ) -> MetricsResult<Self> {
        config.validate()?;
        Self::try_new(registry, reader, config.engine.clone())?.with_batch_config(&config.batch)
    }

    fn build(registry: Arc<MetricRegistry>, reader: Arc<dyn FieldReader>, config: EngineConfig) -> Self {
        Self {
            registry,
            config,
            functions: FunctionRegistry::builtin(),
            reader,
            kernels: Arc::new(DefaultKernels::new()),
            regridder: Arc::new(AxisRegridder::new()),
            pool: None,
        }
    }

    pub fn with_kernels(mut self, kernels: Arc<dyn StatisticsKernels>) -> Self {
        self.kernels = kernels;
        self
    }

    pub fn with_regridder(mut self, regridder: Arc<dyn GridConformer>) -> Self {
        self.regridder = regridder;
        self
    }

    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    /// Use a dedicated pool of `worker_threads` for batches; 0 keeps the
    /// global rayon pool.
    pub fn with_batch_config(mut self, batch: &BatchConfig) -> MetricsResult<Self> {
        batch
            .validate()
            .map_err(|reason| MetricsError::configuration(EntityKind::Setting, "batch", reason))?;
        self.pool = match batch.worker_threads {
            0 => None,
            threads => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("enso-metrics-{}", i))
                    .build()
                    .map_err(|e| {
                        MetricsError::configuration(EntityKind::Setting, "batch.worker_threads", e.to_string())
                    })?;
                Some(Arc::new(pool))
            }
        };
        Ok(self)
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Members of `collection` without a registered computation.
    pub fn unregistered_metrics(&self, collection: &str) -> MetricsResult<Vec<&str>> {
        Ok(self
            .registry
            .list_metrics(collection)?
            .into_iter()
            .filter(|id| !self.functions.contains(id))
            .collect())
    }

    /// Compute one metric.
    ///
    /// # Errors
    ///
    /// - [`MetricsError::Configuration`] for unknown ids, datasets outside the
    ///   acceptable list, missing handles or metrics without a computation
    /// - [`MetricsError::DataAlignment`] when periods do not overlap or too
    ///   few samples remain
    /// - [`MetricsError::Numeric`] when a reference statistic is zero
    /// - [`MetricsError::Upstream`] when the reader or a kernel fails
    pub fn compute(&self, request: &ComputeRequest) -> MetricsResult<MetricResult> {
        let started = Instant::now();
        let plan = self.plan(request)?;
        debug!(
            collection = %plan.resolved.collection.id,
            metric = %plan.metric(),
            model = %request.model.name,
            category = %plan.function.category(),
            event_normalization = ?plan.resolved.event_normalization(),
            "Computing metric"
        );

        let result = match &plan.function.algorithm {
            MetricAlgorithm::SelfStatistic(stat) => {
                let model = self.self_side(&plan, Side::Model, *stat)?;
                let obs = self.self_side(&plan, Side::Observations, *stat)?;
                self.normalized_result(&plan, model, obs)?
            }
            MetricAlgorithm::Regression(roles) => {
                let model = self.regression_side(&plan, Side::Model, roles)?;
                let obs = self.regression_side(&plan, Side::Observations, roles)?;
                self.normalized_result(&plan, model, obs)?
            }
            MetricAlgorithm::ProfileRmse(axis) => self.compare(&plan, *axis)?,
        };

        info!(
            metric = %result.metric_id,
            model = %request.model.name,
            value = result.metric,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Metric computed"
        );
        Ok(result)
    }

    fn plan<'a>(&'a self, request: &'a ComputeRequest) -> MetricsResult<CallPlan<'a>> {
        let resolved = self.registry.resolve(&request.collection, &request.metric)?;
        let spec = resolved.spec;
        let function = self.functions.get(&spec.id).ok_or_else(|| {
            MetricsError::configuration(
                EntityKind::Metric,
                &spec.id,
                "no computation is registered for this metric",
            )
        })?;

        let needed = function.category().arity();
        if spec.arity() != needed {
            return Err(MetricsError::configuration(
                EntityKind::Metric,
                &spec.id,
                format!("declares {} variables, its computation needs {}", spec.arity(), needed),
            ));
        }
        for variable in function.algorithm.required_variables() {
            if spec.requirement(variable).is_none() {
                return Err(MetricsError::configuration(
                    EntityKind::Metric,
                    &spec.id,
                    format!("computation needs variable '{}' which the metric does not declare", variable),
                ));
            }
        }

        for key in request.region_overrides.keys().chain(request.observations.datasets.keys()) {
            if spec.requirement(key).is_none() {
                debug!(metric = %spec.id, variable = %key, "Ignoring selection for unused variable");
            }
        }

        let mut regions = BTreeMap::new();
        let mut datasets = BTreeMap::new();
        for req in &spec.variables {
            let variable = req.variable.as_str();
            let region = self
                .registry
                .resolve_region(spec, variable, &request.region_overrides)?;
            let requested = request.observations.datasets.get(variable).map(String::as_str);
            let dataset = self.registry.select_observation(
                spec,
                variable,
                requested,
                self.config.observation_policy,
            )?;
            regions.insert(variable, region);
            datasets.insert(variable, dataset);
        }

        Ok(CallPlan {
            request,
            resolved,
            function,
            regions,
            datasets,
            min_steps: resolved.common().min_time_steps.max(self.config.min_time_steps),
        })
    }

    /// Handle for one primitive term of `variable` on `side`.
    fn handle<'a>(
        &self,
        plan: &CallPlan<'a>,
        side: Side,
        variable: &str,
        native: &str,
    ) -> MetricsResult<&'a FieldHandle> {
        let found = match side {
            Side::Model => plan.request.model_handle(variable, native),
            Side::Observations => {
                let dataset = plan.dataset(variable)?;
                plan.request.observation_handle(&dataset.id, native)
            }
        };
        found.ok_or_else(|| {
            MetricsError::configuration(
                EntityKind::FieldHandle,
                native,
                format!(
                    "no {} handle for variable '{}' of {}",
                    side.label(),
                    variable,
                    plan.metric()
                ),
            )
        })
    }

    /// Read, convert and combine every primitive term of `variable`.
    fn read_variable<T, F>(
        &self,
        plan: &CallPlan<'_>,
        side: Side,
        variable: &str,
        read: F,
    ) -> MetricsResult<T>
    where
        T: FieldValues + Clone,
        F: Fn(&dyn FieldReader, &FieldHandle, &str, &Region) -> Result<T, CollaboratorError>,
    {
        let metric = plan.metric();
        let region = plan.region(variable)?;
        let kind = self.registry.variables().lookup(variable)?.kind;
        let terms = match side {
            Side::Model => self.registry.variables().expand(variable)?,
            Side::Observations => plan.dataset(variable)?.expand(variable)?,
        };

        let mut parts = Vec::with_capacity(terms.len());
        for term in &terms {
            let handle = self.handle(plan, side, variable, &term.name)?;
            debug!(
                metric,
                side = side.label(),
                variable,
                field = %term.name,
                handle = %handle,
                region = %region.id,
                "Reading field"
            );
            let mut data = read(self.reader.as_ref(), handle, &term.name, region)
                .map_err(|e| MetricsError::upstream(metric, variable, e))?;
            normalize_units(&mut data, kind);
            parts.push((data, term.sign));
        }

        let combined = signed_sum(&parts).map_err(|reason| {
            MetricsError::alignment(metric, format!("cannot combine terms of '{}': {}", variable, reason))
        })?;
        let expected = plan.resolved.common().frequency;
        if combined.frequency() != expected {
            return Err(MetricsError::alignment(
                metric,
                format!(
                    "{} data for '{}' is sampled {:?}, the collection expects {:?}",
                    side.label(),
                    variable,
                    combined.frequency(),
                    expected
                ),
            ));
        }
        Ok(restrict(&combined, plan.period(side)))
    }

    fn read_series(&self, plan: &CallPlan<'_>, side: Side, variable: &str) -> MetricsResult<TimeSeries> {
        self.read_variable(plan, side, variable, |reader, handle, field, region| {
            reader.read_series(handle, field, region)
        })
    }

    fn read_field(&self, plan: &CallPlan<'_>, side: Side, variable: &str) -> MetricsResult<GriddedField> {
        self.read_variable(plan, side, variable, |reader, handle, field, region| {
            reader.read_field(handle, field, region)
        })
    }

    fn self_side(&self, plan: &CallPlan<'_>, side: Side, stat: SelfStatistic) -> MetricsResult<SideStatistic> {
        let metric = plan.metric();
        let variable = plan.spec().variables[0].variable.as_str();
        let series = self.read_series(plan, side, variable)?;
        require_steps(metric, &format!("{} {}", side.label(), variable), &series, plan.min_steps)?;

        let detrending = plan.resolved.common().detrending;
        let anomalies = functions::preprocess(self.kernels.as_ref(), &series, detrending)
            .map_err(|e| MetricsError::upstream(metric, variable, e))?;
        let stat = self_statistic(self.kernels.as_ref(), stat, &anomalies, metric, variable)?;
        debug!(metric, side = side.label(), value = stat.value, error = stat.error, "Side statistic");
        Ok(stat)
    }

    fn regression_side(
        &self,
        plan: &CallPlan<'_>,
        side: Side,
        roles: &RegressionRoles,
    ) -> MetricsResult<SideStatistic> {
        let metric = plan.metric();
        let x = self.read_series(plan, side, &roles.independent)?;
        let y = self.read_series(plan, side, &roles.dependent)?;
        let (x, y) = align_pair(metric, &x, &y)?;
        require_steps(metric, &format!("{} {}/{}", side.label(), roles.independent, roles.dependent), &x, plan.min_steps)?;

        let detrending = plan.resolved.common().detrending;
        let x = functions::preprocess(self.kernels.as_ref(), &x, detrending)
            .map_err(|e| MetricsError::upstream(metric, roles.independent.as_str(), e))?;
        let y = functions::preprocess(self.kernels.as_ref(), &y, detrending)
            .map_err(|e| MetricsError::upstream(metric, roles.dependent.as_str(), e))?;
        let stat = regression_statistic(self.kernels.as_ref(), roles, &x, &y)
            .map_err(|e| MetricsError::upstream(metric, roles.dependent.as_str(), e))?;
        debug!(
            metric,
            side = side.label(),
            slope = stat.value,
            error = stat.error,
            nonlinearity = ?stat.nonlinearity,
            "Side regression"
        );
        Ok(stat)
    }

    fn regrid_plan(&self, plan: &CallPlan<'_>, variable: &str) -> MetricsResult<RegridPlan> {
        let Some(regridding) = &plan.spec().regridding else {
            return Ok(RegridPlan::ModelOntoObservations(InterpolationMethod::Linear));
        };
        Ok(match regridding.sides {
            RegridSides::Model => RegridPlan::ModelOntoObservations(regridding.method),
            RegridSides::Observations => RegridPlan::ObservationsOntoModel(regridding.method),
            RegridSides::Both => {
                let (dlat, dlon) = parse_target_grid(&regridding.target_grid).ok_or_else(|| {
                    MetricsError::configuration(
                        EntityKind::Metric,
                        plan.metric(),
                        format!("unsupported target grid '{}'", regridding.target_grid),
                    )
                })?;
                let target = GridAxes::uniform(plan.region(variable)?, dlat, dlon);
                if target.cells() == 0 {
                    return Err(MetricsError::configuration(
                        EntityKind::Metric,
                        plan.metric(),
                        format!("target grid '{}' has no cells over the region", regridding.target_grid),
                    ));
                }
                RegridPlan::Both {
                    target,
                    method: regridding.method,
                }
            }
        })
    }

    fn compare(
        &self,
        plan: &CallPlan<'_>,
        axis: ProfileAxis,
    ) -> MetricsResult<MetricResult> {
        let metric = plan.metric();
        let variable = plan.spec().variables[0].variable.as_str();

        let model = self.read_field(plan, Side::Model, variable)?;
        require_steps(metric, &format!("model {}", variable), &model, plan.min_steps)?;
        let obs = self.read_field(plan, Side::Observations, variable)?;
        require_steps(metric, &format!("observations {}", variable), &obs, plan.min_steps)?;

        let regrid = self.regrid_plan(plan, variable)?;
        let options = CompareOptions {
            axis,
            area_weighted: self.config.area_weighted,
            centered: self.config.centered_rmse,
        };
        let value = compare_profiles(
            self.kernels.as_ref(),
            self.regridder.as_ref(),
            &model,
            &obs,
            &regrid,
            options,
        )
        .map_err(|e| MetricsError::upstream(metric, variable, e))?;
        if !value.is_finite() {
            return Err(MetricsError::numeric(metric, format!("non-finite RMSE {}", value)));
        }

        Ok(self.assemble(
            plan,
            value,
            None,
            SideSummary {
                identity: plan.request.model.name.clone(),
                value: None,
                value_error: None,
                years: model.years(),
            },
            SideSummary {
                identity: plan.observation_identity(),
                value: None,
                value_error: None,
                years: obs.years(),
            },
            None,
        ))
    }

    fn normalized_result(
        &self,
        plan: &CallPlan<'_>,
        model: SideStatistic,
        obs: SideStatistic,
    ) -> MetricsResult<MetricResult> {
        let metric = plan.metric();
        let computation = plan.spec().metric_computation;
        let primary = normalize::ratio(metric, model.value, model.error, obs.value, obs.error)?;
        let primary = normalize::apply_computation(primary, computation);
        let nonlinearity = normalize::nonlinearity(
            metric,
            &model,
            &obs,
            self.config.nonlinearity_ratio,
            computation,
        )?;

        Ok(self.assemble(
            plan,
            primary.metric,
            Some(primary.error),
            SideSummary {
                identity: plan.request.model.name.clone(),
                value: Some(model.value),
                value_error: Some(model.error),
                years: model.years,
            },
            SideSummary {
                identity: plan.observation_identity(),
                value: Some(obs.value),
                value_error: Some(obs.error),
                years: obs.years,
            },
            nonlinearity,
        ))
    }

    fn assemble(
        &self,
        plan: &CallPlan<'_>,
        metric: f64,
        metric_error: Option<f64>,
        model: SideSummary,
        observations: SideSummary,
        nonlinearity: Option<NonlinearityBreakdown>,
    ) -> MetricResult {
        let spec = plan.spec();
        let common = plan.resolved.common();
        let variables = spec.variable_ids();
        let regions: BTreeMap<String, String> = plan
            .regions
            .iter()
            .map(|(v, r)| (v.to_string(), r.id.clone()))
            .collect();
        let datasets: BTreeMap<String, String> = plan
            .datasets
            .iter()
            .map(|(v, d)| (v.to_string(), d.id.clone()))
            .collect();

        let units = match &plan.function.units {
            Some(units) => units.clone(),
            None => variables
                .first()
                .and_then(|v| self.registry.variables().get(v))
                .map(|v| v.kind.canonical_units().to_string())
                .unwrap_or_default(),
        };
        let comment = format!(
            "{} over {} against {} over {}, detrending {:?}, reduced as {:?}",
            model.identity,
            common.modeled_period,
            observations.identity,
            common.observed_period,
            common.detrending,
            spec.metric_computation,
        );

        MetricResult {
            metric_id: spec.id.clone(),
            long_name: plan.function.long_name.clone(),
            collection: plan.resolved.collection.id.clone(),
            category: plan.function.category(),
            metric,
            metric_error,
            units,
            method: plan.function.describe(&variables, &regions),
            reference: plan.function.reference.clone(),
            comment,
            model,
            observations,
            datasets,
            regions,
            nonlinearity,
        }
    }
}
