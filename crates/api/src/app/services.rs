use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use carestock_core::{DomainError, DomainResult};
use carestock_infra::{
    ActionSink, ConnectionStrategy, DataLoad, DemoRowSource, ExportError, InMemoryActionSink,
    JsonLinesActionSink, RowSource, SinkError, demo_alert_subjects, load_rows,
};
use carestock_inventory::{
    ActionReceipt, AlertRuleSet, AlertSubject, BandedForecaster, DerivedRow, ImpactAssumptions,
    InventoryRow, MetricsEngine, RecordActionRequest, SessionState,
};

use crate::config::AppConfig;

/// Where the working rows came from, as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataOrigin {
    Live { source: String },
    Fallback { reason: String },
}

impl DataOrigin {
    fn of(load: &DataLoad) -> Self {
        match load {
            DataLoad::Live { source, .. } => DataOrigin::Live { source: source.clone() },
            DataLoad::Fallback { reason, .. } => DataOrigin::Fallback { reason: reason.clone() },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, DataOrigin::Fallback { .. })
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("application state lock poisoned: {0}")]
    Poisoned(&'static str),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Everything the handlers share: the single session, the engine and the
/// collaborators around it.
pub struct AppServices {
    engine: MetricsEngine<BandedForecaster>,
    session: Mutex<SessionState>,
    alert_rules: RwLock<AlertRuleSet>,
    sink: Arc<dyn ActionSink>,
    origin: DataOrigin,
    impact: ImpactAssumptions,
}

impl AppServices {
    pub fn new(
        engine: MetricsEngine<BandedForecaster>,
        session: SessionState,
        alert_rules: AlertRuleSet,
        sink: Arc<dyn ActionSink>,
        origin: DataOrigin,
    ) -> Self {
        Self {
            engine,
            session: Mutex::new(session),
            alert_rules: RwLock::new(alert_rules),
            sink,
            origin,
            impact: ImpactAssumptions::default(),
        }
    }

    pub fn origin(&self) -> &DataOrigin {
        &self.origin
    }

    pub fn impact_assumptions(&self) -> &ImpactAssumptions {
        &self.impact
    }

    pub fn sink(&self) -> &dyn ActionSink {
        self.sink.as_ref()
    }

    pub fn session(&self) -> Result<MutexGuard<'_, SessionState>, ServiceError> {
        self.session.lock().map_err(|_| ServiceError::Poisoned("session"))
    }

    pub fn alert_rules(&self) -> Result<AlertRuleSet, ServiceError> {
        self.alert_rules
            .read()
            .map(|rules| rules.clone())
            .map_err(|_| ServiceError::Poisoned("alert rules"))
    }

    /// Validate `update` against a copy of the current rules and install the
    /// copy only if every step succeeds.
    pub fn update_alert_rules<U>(&self, update: U) -> Result<AlertRuleSet, ServiceError>
    where
        U: FnOnce(&mut AlertRuleSet) -> DomainResult<()>,
    {
        let mut current = self
            .alert_rules
            .write()
            .map_err(|_| ServiceError::Poisoned("alert rules"))?;
        let mut next = current.clone();
        update(&mut next)?;
        *current = next.clone();
        Ok(next)
    }

    pub fn derive(&self, row: &InventoryRow) -> DerivedRow {
        self.engine.derive(row)
    }

    /// The current snapshot with all derived fields.
    pub fn derived_rows(&self) -> Result<Vec<DerivedRow>, ServiceError> {
        let session = self.session()?;
        Ok(self.engine.derive_all(session.rows()))
    }

    /// Alert inputs for the current snapshot. Demo sessions also get the
    /// sample items that carry max-stock and expiry data.
    pub fn alert_subjects(&self, today: NaiveDate) -> Result<Vec<AlertSubject>, ServiceError> {
        let mut subjects: Vec<AlertSubject> = self
            .derived_rows()?
            .iter()
            .map(AlertSubject::from_derived)
            .collect();
        if self.origin.is_fallback() {
            subjects.extend(demo_alert_subjects(today));
        }
        Ok(subjects)
    }

    /// Apply an action and mirror the log entry to the sink.
    ///
    /// The session log is authoritative; a sink failure is logged and does
    /// not undo the action.
    pub fn record_action(
        &self,
        request: RecordActionRequest,
    ) -> Result<ActionReceipt, ServiceError> {
        let receipt = self.session()?.record_action(request, Utc::now())?;

        if let Err(e) = self.sink.append(&receipt.entry) {
            tracing::warn!(
                error = %e,
                action_id = %receipt.entry.id,
                "failed to mirror action to sink"
            );
        }
        Ok(receipt)
    }
}

/// Wire services from configuration. `session_source` is an already-open
/// source supplied by an embedding host; it takes precedence over the
/// configured file.
pub fn build_services(
    config: &AppConfig,
    session_source: Option<Arc<dyn RowSource>>,
) -> DomainResult<AppServices> {
    let engine = MetricsEngine::new(BandedForecaster::new(config.forecast)?, config.optimization)?;
    let alert_rules = AlertRuleSet::new(config.alert_rule)?;

    let load = load_rows(&ConnectionStrategy::standard(session_source, config.data_path.clone()));
    let mut origin = DataOrigin::of(&load);
    let session = match SessionState::with_rows(load.into_rows()) {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "loaded rows rejected; using demo data");
            origin = DataOrigin::Fallback {
                reason: format!("loaded rows rejected: {e}"),
            };
            SessionState::with_rows(DemoRowSource::new().rows())?
        }
    };

    let sink = action_sink(config.action_log_path.clone());

    tracing::info!(
        origin = ?origin,
        rows = session.rows().len(),
        horizon_days = config.forecast.horizon_days,
        "services ready"
    );

    Ok(AppServices::new(engine, session, alert_rules, sink, origin))
}

fn action_sink(path: Option<PathBuf>) -> Arc<dyn ActionSink> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "mirroring actions to JSON-lines file");
            Arc::new(JsonLinesActionSink::new(path))
        }
        None => Arc::new(InMemoryActionSink::new()),
    }
}


#[cfg(test)]
mod tests {
    use carestock_infra::InMemoryRowSource;
    use carestock_inventory::{AlertRule, ItemRule, StockStatus};

    use super::test_support::{BrokenSink, icu_oxygen, oxygen_delivery, services_with_sink};
    use super::*;

    fn source() -> Arc<dyn RowSource> {
        Arc::new(InMemoryRowSource::new(vec![icu_oxygen()]))
    }

    #[test]
    fn session_source_is_live() {
        let services = build_services(&AppConfig::default(), Some(source())).unwrap();
        assert_eq!(
            services.origin(),
            &DataOrigin::Live {
                source: "active-session".to_string()
            }
        );
        assert_eq!(services.derived_rows().unwrap().len(), 1);
    }

    #[test]
    fn without_sources_demo_data_is_labeled() {
        let services = build_services(&AppConfig::default(), None).unwrap();
        assert!(services.origin().is_fallback());
        assert!(!services.derived_rows().unwrap().is_empty());
    }

    #[test]
    fn recorded_action_reaches_the_sink() {
        let services = build_services(&AppConfig::default(), Some(source())).unwrap();
        let receipt = services.record_action(oxygen_delivery(5.0)).unwrap();

        assert_eq!(receipt.row.closing_stock, 15.0);
        assert_eq!(services.sink().recent(10).unwrap(), vec![receipt.entry]);
    }

    #[test]
    fn failed_sink_append_keeps_the_action() {
        let services = services_with_sink(Arc::new(BrokenSink));

        let receipt = services.record_action(oxygen_delivery(5.0)).unwrap();
        assert_eq!(receipt.row.closing_stock, 15.0);
        assert_eq!(receipt.row.stock_status, StockStatus::Critical);

        let session = services.session().unwrap();
        assert_eq!(session.rows()[0].closing_stock, 15.0);
        assert_eq!(session.action_log().entries(), &[receipt.entry]);
    }

    #[test]
    fn rejected_rule_update_keeps_previous_rules() {
        let services = build_services(&AppConfig::default(), None).unwrap();
        let result = services.update_alert_rules(|rules| {
            rules.set_default(AlertRule {
                low_pct: 30.0,
                ..AlertRule::default()
            })?;
            rules.replace_overrides(vec![ItemRule {
                item: String::new(),
                rule: AlertRule::default(),
            }])
        });

        assert!(matches!(result, Err(ServiceError::Domain(DomainError::Validation(_)))));
        assert_eq!(services.alert_rules().unwrap().default_rule().low_pct, 20.0);
    }
}
