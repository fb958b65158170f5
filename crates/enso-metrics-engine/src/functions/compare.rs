//! Joint model/reference comparison of time-mean fields.

use enso_metrics_core::collection::InterpolationMethod;
use enso_metrics_core::traits::{GridConformer, KernelResult, ProfileAxis, StatisticsKernels};
use enso_metrics_core::types::{Grid2D, GridAxes, GriddedField};
use enso_metrics_core::CollaboratorError;
use tracing::debug;

/// How the two time-mean maps are brought onto one grid.
#[derive(Debug, Clone, PartialEq)]
pub enum RegridPlan {
    ModelOntoObservations(InterpolationMethod),
    ObservationsOntoModel(InterpolationMethod),
    Both {
        target: GridAxes,
        method: InterpolationMethod,
    },
}

/// Options shared by every profile comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareOptions {
    pub axis: ProfileAxis,
    pub area_weighted: bool,
    pub centered: bool,
}

fn conform(
    regridder: &dyn GridConformer,
    grid: Grid2D,
    target: &GridAxes,
    method: InterpolationMethod,
) -> KernelResult<Grid2D> {
    if &grid.axes == target {
        Ok(grid)
    } else {
        regridder.regrid(&grid, target, method)
    }
}

/// RMSE between the model and reference time-mean profiles along
/// `options.axis`.
pub fn compare_profiles(
    kernels: &dyn StatisticsKernels,
    regridder: &dyn GridConformer,
    model: &GriddedField,
    observations: &GriddedField,
    plan: &RegridPlan,
    options: CompareOptions,
) -> KernelResult<f64> {
    let model_mean = kernels.time_mean(model)?;
    let obs_mean = kernels.time_mean(observations)?;

    let (model_mean, obs_mean) = match plan {
        RegridPlan::ModelOntoObservations(method) => {
            let target = obs_mean.axes.clone();
            (conform(regridder, model_mean, &target, *method)?, obs_mean)
        }
        RegridPlan::ObservationsOntoModel(method) => {
            let target = model_mean.axes.clone();
            (model_mean, conform(regridder, obs_mean, &target, *method)?)
        }
        RegridPlan::Both { target, method } => (
            conform(regridder, model_mean, target, *method)?,
            conform(regridder, obs_mean, target, *method)?,
        ),
    };
    debug!(
        cells = model_mean.axes.cells(),
        axis = ?options.axis,
        "Time means conformed"
    );

    let model_profile = kernels.profile(&model_mean, options.axis, options.area_weighted)?;
    let obs_profile = kernels.profile(&obs_mean, options.axis, options.area_weighted)?;
    if model_profile.coords != obs_profile.coords {
        return Err(CollaboratorError::shape(
            "compare",
            format!(
                "{} model vs {} reference profile points after regridding",
                model_profile.coords.len(),
                obs_profile.coords.len()
            ),
        ));
    }

    kernels.rmse(
        &model_profile.values,
        &obs_profile.values,
        Some(&obs_profile.weights),
        options.centered,
    )
}
