pub mod data;
pub mod filter;
pub mod param;
pub mod summary;

use data::{load_or_generate, Dataset};
use filter::{apply_filters, FilterCriteria};
use log::debug;
use param::Param;
use std::error::Error;
use summary::DashboardSnapshot;

/// One user session: the dataset is loaded (or generated) exactly once
/// when the session opens and cached for the session's lifetime. Every
/// interaction recomputes its views from this handle; nothing invalidates
/// or refreshes the cache.
pub struct Session {
    dataset: Dataset,
}

impl Session {
    pub fn open(param: &Param) -> Result<Session, Box<dyn Error>> {
        let dataset = load_or_generate(&param.data)?;
        debug!("Session dataset:\n{}", dataset);
        Ok(Session { dataset })
    }

    /// Wrap an already-built dataset, bypassing the load step.
    pub fn from_dataset(dataset: Dataset) -> Session {
        Session { dataset }
    }

    /// The full-population view: every loaded record, no filter applied.
    pub fn population(&self) -> &Dataset {
        &self.dataset
    }

    /// The interactively filtered view for the given criteria.
    pub fn filtered(&self, criteria: &FilterCriteria) -> Dataset {
        apply_filters(&self.dataset, criteria)
    }

    /// Recompute every dashboard table for one filter interaction. A
    /// single synchronous pass; an empty filtered view produces empty
    /// tables, not an error.
    pub fn snapshot(&self, criteria: &FilterCriteria) -> DashboardSnapshot {
        let filtered = self.filtered(criteria);
        DashboardSnapshot::compute(self.population(), &filtered)
    }
}

/// Convenience entry point: open a session and snapshot it with the
/// criteria configured in the parameter file.
pub fn run(param: &Param) -> Result<DashboardSnapshot, Box<dyn Error>> {
    let session = Session::open(param)?;
    let criteria = param.filters.to_criteria()?;
    Ok(session.snapshot(&criteria))
}
