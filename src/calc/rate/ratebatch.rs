use std::sync::Arc;

use tracing::{
    debug,
    info
};

use crate::calc::calcconfig::CalcConfig;
use crate::calc::calcerror::CalcError;
use crate::calc::executor::CalcExecutor;
use crate::calc::rate::eqrate::EqRate;
use crate::model::hazardmodel::HazardModel;
use crate::model::site::Site;

/// Sites submitted to the executor at a time.
pub const BATCH_SIZE: usize = 10;

/// Computes [`EqRate`] for every site, `batch_size` sites at a time, handing
/// each result to `sink` in site order.
///
/// Each site is one executor task and bins its sources on that task. A batch
/// is complete before any of its results reach `sink`, so at most one batch
/// of results is held in memory. Returns the number of sites processed;
/// stops at the first failing site or sink call.
pub fn rate_batch<F>(
    model: &Arc<HazardModel>,
    config: &Arc<CalcConfig>,
    sites: &[Site],
    executor: &CalcExecutor,
    batch_size: usize,
    mut sink: F
) -> Result<usize, CalcError>
where
    F: FnMut(EqRate) -> Result<(), CalcError>
{
    let batch_size = batch_size.max(1);
    info!(sites = sites.len(), batch_size, threads = executor.threads(), "rate batch started");

    let mut processed = 0;
    for (batch, chunk) in sites.chunks(batch_size).enumerate() {
        let rates = executor.try_map(chunk, |site| EqRate::create(model, config, site))?;
        for rate in rates {
            sink(rate)?;
            processed += 1;
        }
        debug!(batch, processed, "rate batch written");
    }

    info!(processed, "rate batch finished");
    Ok(processed)
}
