// src/notify.rs

//! Plan lifecycle hooks.
//!
//! Messaging integrations (chat, mail) implement [`PlanObserver`]; the
//! built-in [`LogObserver`] just logs.

use std::fmt::Debug;

use tracing::{error, info};

use crate::errors::PlanError;

pub trait PlanObserver: Debug {
    fn plan_started(&self, command: &str);
    fn plan_succeeded(&self, command: &str);
    fn plan_failed(&self, command: &str, err: &PlanError);
}

#[derive(Debug, Clone, Default)]
pub struct LogObserver;

impl PlanObserver for LogObserver {
    fn plan_started(&self, command: &str) {
        info!(command, "plan started");
    }

    fn plan_succeeded(&self, command: &str) {
        info!(command, "plan succeeded");
    }

    fn plan_failed(&self, command: &str, err: &PlanError) {
        error!(command, kind = ?err.kind(), "plan failed: {err}");
    }
}
