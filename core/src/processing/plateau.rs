use crate::interface::{Alert, AlertDetail};
use crate::prelude::{
    DetectorConfig, ProcessingStage, StageError, StageInput, StageMetadata, StageOutput,
    StageResult,
};
use crate::processing::baseline::BaselineEstimator;
use crate::processing::classify::SignalClassifier;
use crate::processing::gate::AcceptanceGate;
use crate::processing::persistence::PersistenceTracker;
use crate::processing::region::RegionExtractor;
use crate::telemetry::log::LogManager;

struct Pipeline {
    extractor: RegionExtractor,
    gate: AcceptanceGate,
    tracker: PersistenceTracker,
}

/// Averaged-frame detector: baseline, hot regions, shape gate, persistence.
pub struct PlateauDetector {
    pipeline: Option<Pipeline>,
    logger: LogManager,
}

impl PlateauDetector {
    pub fn new() -> Self {
        Self {
            pipeline: None,
            logger: LogManager::new(),
        }
    }

    pub fn with_config(config: &DetectorConfig) -> StageResult<Self> {
        let mut detector = Self::new();
        detector.initialize(config)?;
        Ok(detector)
    }
}

impl Default for PlateauDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for PlateauDetector {
    fn initialize(&mut self, config: &DetectorConfig) -> StageResult<()> {
        config
            .validate()
            .map_err(|err| StageError::InvalidInput(err.to_string()))?;
        self.pipeline = Some(Pipeline {
            extractor: RegionExtractor::new(
                BaselineEstimator::from_config(config),
                config.hot_delta_db,
            ),
            gate: AcceptanceGate::from_config(config),
            tracker: PersistenceTracker::new(config.persist_hits, config.persist_window),
        });
        Ok(())
    }

    fn execute(&mut self, input: StageInput<'_>) -> StageResult<StageOutput> {
        let pipeline = self
            .pipeline
            .as_mut()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        if input.frequencies_hz.len() != input.power_db.len() {
            return Err(StageError::InvalidInput(format!(
                "{} frequencies for {} power bins",
                input.frequencies_hz.len(),
                input.power_db.len()
            )));
        }

        let candidates = pipeline
            .extractor
            .extract(input.frequencies_hz, input.power_db);
        let candidate_count = candidates.len();
        let accepted = pipeline.gate.filter(candidates);
        let persistent = pipeline.tracker.evaluate(input.key, &accepted);

        let alerts: Vec<Alert> = persistent
            .iter()
            .map(|region| {
                Alert::new(
                    input.timestamp,
                    SignalClassifier::classify(region.center_mhz, region.width_mhz),
                    AlertDetail::Plateau {
                        center_mhz: region.center_mhz,
                        width_mhz: region.width_mhz,
                        mean_excess_db: region.mean_excess_db,
                        peak_excess_db: region.peak_excess_db,
                    },
                )
            })
            .collect();

        if !accepted.is_empty() {
            self.logger.detail(&format!(
                "{} @ {:.3} MHz: {} candidates, {} accepted, {} persistent",
                input.key.band,
                input.key.center_hz as f64 / 1e6,
                candidate_count,
                accepted.len(),
                alerts.len()
            ));
        }

        let metadata = StageMetadata {
            candidate_count,
            accepted_count: accepted.len(),
            notes: accepted
                .iter()
                .map(|r| format!("{:.3}-{:.3} MHz", r.low_mhz, r.high_mhz))
                .collect(),
        };

        Ok(StageOutput { alerts, metadata })
    }

    fn cleanup(&mut self) {
        if let Some(pipeline) = self.pipeline.as_mut() {
            pipeline.tracker.reset();
        }
        self.pipeline = None;
    }
}
