use std::sync::Arc;
use std::time::Duration;

use roundcast::application::{Orchestrator, OrchestratorSettings, Pipeline, PipelineOptions};
use roundcast::domain::{FeatureAssembler, FeatureSchema, TimePolicy};
use roundcast::port::{LiveSource, Scorer};
use roundcast::testkit::config::instant_backoff;
use roundcast::testkit::scorer::FixedScorer;

pub fn pipeline(scorer: Option<Arc<dyn Scorer>>) -> Arc<Pipeline> {
    Arc::new(Pipeline::new(
        PipelineOptions::default(),
        FeatureAssembler::new(FeatureSchema::default(), TimePolicy::Utc),
        scorer,
    ))
}

pub fn banker_scorer() -> Option<Arc<dyn Scorer>> {
    Some(Arc::new(FixedScorer::banker()))
}

pub fn fast_settings() -> OrchestratorSettings {
    OrchestratorSettings {
        backoff: instant_backoff(),
        timeout: Duration::from_secs(1),
        ..OrchestratorSettings::default()
    }
}

pub fn orchestrator(source: Arc<dyn LiveSource>, pipeline: Arc<Pipeline>) -> Orchestrator {
    Orchestrator::new(pipeline, source, fast_settings())
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
