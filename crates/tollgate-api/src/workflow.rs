//! Ordered multi-step downstream workflows.
//!
//! A [`Workflow`] runs named steps one at a time. Each step starts only after
//! the previous one succeeded, and the first failure ends the run. Steps that
//! already completed stay completed: nothing is compensated or rolled back,
//! and the failure records which steps went through so it can be logged.

use std::future::Future;
use tollgate_core::{Error, Result};
use tracing::{debug, error};

use crate::view::View;

#[derive(Debug)]
pub struct Workflow {
    name: &'static str,
    completed: Vec<&'static str>,
}

/// The step a workflow stopped at.
#[derive(Debug)]
pub struct StepFailure {
    pub workflow: &'static str,
    pub step: &'static str,
    /// Steps that succeeded before the failure. Their effects remain.
    pub completed: Vec<&'static str>,
    pub error: Error,
}

impl Workflow {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            completed: Vec::new(),
        }
    }

    /// Run one step to completion.
    pub async fn step<T, F>(
        &mut self,
        step: &'static str,
        action: F,
    ) -> std::result::Result<T, StepFailure>
    where
        F: Future<Output = Result<T>>,
    {
        debug!(workflow = self.name, step, "Running step");

        match action.await {
            Ok(value) => {
                self.completed.push(step);
                Ok(value)
            }
            Err(e) => {
                error!(
                    workflow = self.name,
                    step,
                    completed = ?self.completed,
                    error = %e,
                    "Workflow step failed; completed steps are left in place"
                );
                Err(StepFailure {
                    workflow: self.name,
                    step,
                    completed: self.completed.clone(),
                    error: e,
                })
            }
        }
    }

    pub fn completed(&self) -> &[&'static str] {
        &self.completed
    }
}

impl StepFailure {
    /// The internal-error view for this failure, with the step's status.
    pub fn into_view(self) -> View {
        View::error(&self.error).with("step", self.step)
    }
}
