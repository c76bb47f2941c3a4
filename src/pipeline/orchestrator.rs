//! Drives every municipality of a registry from raw station records to a projected trend.

use crate::aggregation::annual_aggregator::aggregate_with_stats;
use crate::aggregation::source_combiner::{combine_with, PerSourceSummaries};
use crate::cleaning::record_cleaner::clean_all;
use crate::config::pipeline_config::PipelineConfig;
use crate::config::station_registry::{Municipality, StationRegistry};
use crate::error::PrecipTrendError;
use crate::pipeline::report::{
    MunicipalityOutcome, MunicipalityReport, PipelineReport, SkipReason, SourceIssue,
    SourceReport, SourceStatus,
};
use crate::pipeline::stage::PipelineStage;
use crate::storage::StationStore;
use crate::trend::error::FitError;
use crate::trend::trend_model::TrendModel;
use crate::types::raw_measurement::RawMeasurement;
use crate::types::year_range::YearRange;
use bon::bon;
use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use log::{debug, info, warn};
use tokio::time::timeout;

/// Runs the clean → aggregate → combine → fit → project pipeline over a
/// [`StationRegistry`], reading station records from a [`StationStore`].
///
/// Municipalities are independent: a station that times out or fails is
/// recorded in the diagnostics and left out, and a municipality without enough
/// data is reported as skipped. Only an unreachable store fails the run.
///
/// # Examples
///
/// ```rust
/// # use precip_trend::{InMemoryStore, PipelineConfig, PrecipTrendError, RawMeasurement, StationRegistry, TrendPipeline};
/// # async fn run() -> Result<(), PrecipTrendError> {
/// let store = InMemoryStore::new()
///     .with_station("22036_ARROYO_SECO", vec![RawMeasurement::new("01/01/2021", "3.2")]);
///
/// let pipeline = TrendPipeline::builder()
///     .store(store)
///     .registry(StationRegistry::new().with_municipality("Arroyo Seco", ["22036_ARROYO_SECO"])?)
///     .config(PipelineConfig::short_window())
///     .build()?;
///
/// let report = pipeline.run().await?;
/// for outcome in report.iter() {
///     println!("{}: {:?}", outcome.municipality(), outcome.stage());
/// }
/// # Ok(())
/// # }
/// ```
pub struct TrendPipeline<S: StationStore> {
    store: S,
    registry: StationRegistry,
    config: PipelineConfig,
}

#[bon]
impl<S: StationStore> TrendPipeline<S> {
    /// Creates a pipeline owning `store`.
    ///
    /// # Arguments
    ///
    /// * `.store(S)`: **Required.** Where station records are read from.
    /// * `.registry(StationRegistry)`: Optional. Municipalities to process. Defaults to [`StationRegistry::queretaro`].
    /// * `.config(PipelineConfig)`: Optional. Run parameters. Defaults to [`PipelineConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns [`PrecipTrendError::Config`] if the configuration does not validate.
    #[builder]
    pub fn new(
        store: S,
        registry: Option<StationRegistry>,
        config: Option<PipelineConfig>,
    ) -> Result<Self, PrecipTrendError> {
        let config = config.unwrap_or_default();
        config.validate()?;
        Ok(Self {
            store,
            registry: registry.unwrap_or_else(StationRegistry::queretaro),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &StationRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs every municipality and collects the outcomes in registry order.
    ///
    /// # Errors
    ///
    /// Returns [`PrecipTrendError::StorageConnection`] or
    /// [`PrecipTrendError::StorageConnectionTimeout`] if the store cannot be
    /// reached before the run starts. Nothing that happens to a single station or
    /// municipality is an error here; see [`MunicipalityOutcome`].
    pub async fn run(&self) -> Result<PipelineReport, PrecipTrendError> {
        self.probe().await?;

        let window = self.config.resolved_window();
        info!(
            "Processing {} municipalities (min_samples {}, window {}, horizon {})",
            self.registry.len(),
            self.config.min_samples,
            window.map_or_else(|| "all years".to_string(), |w| w.to_string()),
            self.config.horizon
        );

        let outcomes: Vec<MunicipalityOutcome> = stream::iter(self.registry.iter())
            .map(|municipality| self.run_municipality(municipality, window))
            .buffered(self.config.max_concurrent_municipalities)
            .collect()
            .await;

        let report = PipelineReport { outcomes };
        info!(
            "Finished: {} municipalities with a trend, {} skipped",
            report.done().count(),
            report.skipped_count()
        );
        Ok(report)
    }

    async fn probe(&self) -> Result<(), PrecipTrendError> {
        match timeout(self.config.connect_timeout, self.store.ping()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(PrecipTrendError::StorageConnection(e)),
            Err(_) => Err(PrecipTrendError::StorageConnectionTimeout(
                self.config.connect_timeout,
            )),
        }
    }

    async fn fetch_source(
        &self,
        station: &str,
        window: Option<YearRange>,
    ) -> Result<Vec<RawMeasurement>, SourceIssue> {
        match timeout(self.config.fetch_timeout, self.store.fetch(station, window)).await {
            Ok(Ok(records)) => Ok(records),
            Ok(Err(e)) => Err(SourceIssue::Retrieval(e)),
            Err(_) => Err(SourceIssue::Timeout(self.config.fetch_timeout)),
        }
    }

    async fn run_municipality(
        &self,
        municipality: &Municipality,
        window: Option<YearRange>,
    ) -> MunicipalityOutcome {
        let name = municipality.name.as_str();
        let skip = |stage: PipelineStage, reason: SkipReason, sources: Vec<SourceReport>| {
            debug_assert!(stage.can_skip());
            info!("{}: skipped while {} ({})", name, stage, reason);
            MunicipalityOutcome::Skipped {
                municipality: name.to_string(),
                stage,
                reason,
                sources,
            }
        };

        let mut stage = PipelineStage::Pending;
        debug!("{}: {}", name, stage);
        advance(name, &mut stage);
        let fetches = municipality
            .stations
            .iter()
            .map(|station| async move { (station, self.fetch_source(station, window).await) });
        let fetched = join_all(fetches).await;

        let mut sources = Vec::with_capacity(fetched.len());
        let mut with_data = Vec::new();
        for (station, result) in fetched {
            match result {
                Ok(records) if records.is_empty() => {
                    warn!("{}: station {} returned no records", name, station);
                    sources.push(SourceReport {
                        station: station.clone(),
                        status: SourceStatus::NoData,
                    });
                }
                Ok(records) => with_data.push((station, records)),
                Err(issue) => {
                    warn!("{}: station {} excluded, {}", name, station, issue);
                    sources.push(SourceReport {
                        station: station.clone(),
                        status: SourceStatus::Unavailable(issue),
                    });
                }
            }
        }
        if with_data.is_empty() {
            return skip(stage, SkipReason::EmptyMunicipality, sources);
        }

        advance(name, &mut stage);
        let mut per_source = PerSourceSummaries::new();
        for (station, records) in with_data {
            let (clean, cleaning) = clean_all(records);
            let aggregation = aggregate_with_stats(clean, self.config.min_samples, window);
            debug!(
                "{}: station {} kept {} of {} records, {} qualifying years, {} sparse years",
                name,
                station,
                cleaning.accepted,
                cleaning.total(),
                aggregation.summaries.len(),
                aggregation.sparse_years.len()
            );
            per_source.insert(station.clone(), aggregation.summaries.clone());
            sources.push(SourceReport {
                station: station.clone(),
                status: SourceStatus::Used {
                    cleaning,
                    summaries: aggregation.summaries,
                    sparse_years: aggregation.sparse_years,
                    outside_window: aggregation.outside_window,
                },
            });
        }

        sources.sort_by_key(|source| {
            municipality
                .stations
                .iter()
                .position(|id| *id == source.station)
        });

        advance(name, &mut stage);
        let series = combine_with(per_source, self.config.weighting);
        if series.is_empty() {
            return skip(stage, SkipReason::EmptyMunicipality, sources);
        }

        advance(name, &mut stage);
        let trend = match TrendModel::fit(&series) {
            Ok(trend) => trend,
            Err(FitError::InsufficientData { actual, .. }) => {
                return skip(
                    stage,
                    SkipReason::InsufficientDataForFit { years: actual },
                    sources,
                )
            }
        };
        let projection = series
            .last_year()
            .map(|last| trend.project(self.config.horizon.years_after(last).years()))
            .unwrap_or_default();

        advance(name, &mut stage);
        debug_assert!(stage.is_terminal());
        info!("{}: {} over {} years", name, trend, series.len());
        MunicipalityOutcome::Done(MunicipalityReport {
            municipality: name.to_string(),
            series,
            trend,
            projection,
            sources,
        })
    }
}

/// Moves `stage` to the next one on the success path and logs the transition.
fn advance(municipality: &str, stage: &mut PipelineStage) {
    if let Some(next) = stage.next() {
        *stage = next;
        debug!("{}: {}", municipality, next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ConfigError;
    use crate::storage::error::StoreError;
    use crate::storage::in_memory::InMemoryStore;
    use crate::trend::horizon::ProjectionHorizon;
    use crate::types::year_range::YearWindow;
    use async_trait::async_trait;
    use std::time::Duration;

    /// `count` daily records of January `year`, all with `value`.
    fn year_of(year: i32, count: u32, value: &str) -> Vec<RawMeasurement> {
        (1..=count)
            .map(|i| {
                let day = (i - 1) % 28 + 1;
                let month = (i - 1) / 28 + 1;
                RawMeasurement::new(format!("{:02}/{:02}/{}", day, month, year), value)
            })
            .collect()
    }

    fn config() -> PipelineConfig {
        PipelineConfig::builder()
            .min_samples(30)
            .horizon(ProjectionHorizon::Years(4))
            .build()
    }

    fn pipeline<S: StationStore>(
        store: S,
        registry: StationRegistry,
        config: PipelineConfig,
    ) -> Result<TrendPipeline<S>, PrecipTrendError> {
        TrendPipeline::builder()
            .store(store)
            .registry(registry)
            .config(config)
            .build()
    }

    #[tokio::test]
    async fn test_identical_sources_give_exact_trend() -> Result<(), PrecipTrendError> {
        let records: Vec<RawMeasurement> = [(2020, "400"), (2021, "420"), (2022, "440")]
            .into_iter()
            .flat_map(|(year, value)| year_of(year, 30, value))
            .collect();
        let stations = ["22005", "22021", "22035"];
        let store = stations
            .iter()
            .fold(InMemoryStore::new(), |store, id| {
                store.with_station(*id, records.clone())
            });
        let registry = StationRegistry::new().with_municipality("Cadereyta", stations)?;

        let report = pipeline(store, registry, config())?.run().await?;
        let cadereyta = report.get("Cadereyta").and_then(|o| o.as_done()).unwrap();

        for (year, mean) in [(2020, 400.0), (2021, 420.0), (2022, 440.0)] {
            let combined = cadereyta.series.get(year).unwrap();
            assert_eq!(combined.mean, mean);
            assert_eq!(combined.sample_count, 90);
        }
        assert!((cadereyta.trend.slope() - 20.0).abs() < 1e-9);
        assert!((cadereyta.trend.fit_quality() - 1.0).abs() < 1e-12);
        assert_eq!(
            cadereyta.projection.years.iter().map(|p| p.year).collect::<Vec<_>>(),
            vec![2023, 2024, 2025, 2026]
        );
        assert!((cadereyta.projection.get(2026).unwrap() - 520.0).abs() < 1e-6);
        assert!(cadereyta.sources.iter().all(SourceReport::contributed));
        Ok(())
    }

    #[tokio::test]
    async fn test_sparse_year_is_left_out() -> Result<(), PrecipTrendError> {
        let mut records = year_of(2020, 30, "100");
        records.extend(year_of(2021, 10, "200"));
        records.extend(year_of(2022, 30, "300"));
        let store = InMemoryStore::new().with_station("22028", records);
        let registry = StationRegistry::new().with_municipality("San Juan del Río", ["22028"])?;

        let report = pipeline(store, registry, config())?.run().await?;
        let outcome = report.get("San Juan del Río").unwrap();
        let done = outcome.as_done().unwrap();

        assert_eq!(done.series.len(), 2);
        assert!(done.series.get(2021).is_none());
        assert_eq!(
            outcome.sources()[0].sparse_years(),
            &[crate::aggregation::annual_aggregator::SparseYear {
                year: 2021,
                sample_count: 10
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_sentinel_and_unit_suffix_values() -> Result<(), PrecipTrendError> {
        let store = InMemoryStore::new().with_station(
            "22036",
            vec![
                RawMeasurement::new("01/07/2021", "NULO"),
                RawMeasurement::new("02/07/2021", "85.3mm"),
            ],
        );
        let registry = StationRegistry::new().with_municipality("Arroyo Seco", ["22036"])?;
        let config = PipelineConfig::builder().min_samples(1).build();

        let report = pipeline(store, registry, config)?.run().await?;
        let outcome = report.get("Arroyo Seco").unwrap();

        let cleaning = outcome.sources()[0].cleaning().unwrap();
        assert_eq!(cleaning.accepted, 1);
        assert_eq!(cleaning.missing_value, 1);
        match outcome {
            MunicipalityOutcome::Skipped { stage, reason, .. } => {
                assert_eq!(*stage, PipelineStage::Fitting);
                assert_eq!(*reason, SkipReason::InsufficientDataForFit { years: 1 });
            }
            MunicipalityOutcome::Done(_) => panic!("a single year cannot be fitted"),
        }
        match &outcome.sources()[0].status {
            SourceStatus::Used { summaries, .. } => {
                assert_eq!(summaries.len(), 1);
                assert!((summaries[0].mean - 85.3).abs() < 1e-12);
            }
            other => panic!("unexpected status {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_source_without_records_skips_municipality() -> Result<(), PrecipTrendError> {
        let store = InMemoryStore::new().with_station("22036", Vec::new());
        let registry = StationRegistry::new().with_municipality("Arroyo Seco", ["22036"])?;

        let report = pipeline(store, registry, config())?.run().await?;
        let outcome = report.get("Arroyo Seco").unwrap();

        assert_eq!(outcome.skip_reason(), Some(SkipReason::EmptyMunicipality));
        assert!(matches!(
            outcome,
            MunicipalityOutcome::Skipped {
                stage: PipelineStage::FetchingSources,
                ..
            }
        ));
        assert!(matches!(outcome.sources()[0].status, SourceStatus::NoData));
        Ok(())
    }

    #[tokio::test]
    async fn test_only_sparse_data_skips_while_combining() -> Result<(), PrecipTrendError> {
        let store = InMemoryStore::new().with_station("22036", year_of(2021, 5, "1.0"));
        let registry = StationRegistry::new().with_municipality("Arroyo Seco", ["22036"])?;

        let report = pipeline(store, registry, config())?.run().await?;
        assert!(matches!(
            report.get("Arroyo Seco").unwrap(),
            MunicipalityOutcome::Skipped {
                stage: PipelineStage::Combining,
                reason: SkipReason::EmptyMunicipality,
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_failing_source_is_excluded() -> Result<(), PrecipTrendError> {
        let mut records = year_of(2020, 30, "10");
        records.extend(year_of(2021, 30, "12"));
        let store = InMemoryStore::new()
            .with_station("22027", records)
            .with_unavailable_station("22041");
        let registry = StationRegistry::new()
            .with_municipality("Querétaro", ["22027", "22041", "22045"])?;

        let report = pipeline(store, registry, config())?.run().await?;
        let outcome = report.get("Querétaro").unwrap();
        let done = outcome.as_done().unwrap();
        assert_eq!(done.series.len(), 2);

        let issues: Vec<&str> = outcome
            .sources()
            .iter()
            .filter(|s| s.issue().is_some())
            .map(|s| s.station.as_str())
            .collect();
        assert_eq!(issues, vec!["22041", "22045"]);
        assert_eq!(outcome.sources()[0].station, "22027");
        assert!(matches!(
            outcome.sources()[2].issue(),
            Some(SourceIssue::Retrieval(StoreError::UnknownStation(_)))
        ));
        Ok(())
    }

    /// A store whose fetches (and optionally pings) never finish in time.
    struct SlowStore {
        slow_ping: bool,
    }

    #[async_trait]
    impl StationStore for SlowStore {
        async fn ping(&self) -> Result<(), StoreError> {
            if self.slow_ping {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(())
        }

        async fn fetch(
            &self,
            _station: &str,
            _window_hint: Option<YearRange>,
        ) -> Result<Vec<RawMeasurement>, StoreError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_slow_source_times_out() -> Result<(), PrecipTrendError> {
        let config = PipelineConfig::builder()
            .fetch_timeout(Duration::from_millis(50))
            .build();
        let registry = StationRegistry::new().with_municipality("Cadereyta", ["22005"])?;

        let report = pipeline(SlowStore { slow_ping: false }, registry, config)?
            .run()
            .await?;
        let outcome = report.get("Cadereyta").unwrap();
        assert_eq!(outcome.skip_reason(), Some(SkipReason::EmptyMunicipality));
        assert!(matches!(
            outcome.sources()[0].issue(),
            Some(SourceIssue::Timeout(limit)) if *limit == Duration::from_millis(50)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_store_fails_the_run() -> Result<(), PrecipTrendError> {
        let offline = pipeline(
            InMemoryStore::new().offline(),
            StationRegistry::queretaro(),
            config(),
        )?;
        assert!(matches!(
            offline.run().await,
            Err(PrecipTrendError::StorageConnection(_))
        ));

        let config = PipelineConfig::builder()
            .connect_timeout(Duration::from_millis(50))
            .build();
        let hanging = pipeline(
            SlowStore { slow_ping: true },
            StationRegistry::queretaro(),
            config,
        )?;
        assert!(matches!(
            hanging.run().await,
            Err(PrecipTrendError::StorageConnectionTimeout(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_outcomes_follow_registry_order() -> Result<(), PrecipTrendError> {
        let mut store = InMemoryStore::new();
        let mut registry = StationRegistry::new();
        let names = ["Querétaro", "San Juan del Río", "Cadereyta", "Arroyo Seco", "Tequisquiapan"];
        for (i, name) in names.iter().enumerate() {
            let station = format!("2200{}", i);
            let mut records = year_of(2020, 30, "5");
            records.extend(year_of(2021, 30, "6"));
            store.insert(station.clone(), records);
            registry = registry.with_municipality(*name, [station])?;
        }
        let config = PipelineConfig::builder()
            .max_concurrent_municipalities(2)
            .build();

        let report = pipeline(store, registry, config)?.run().await?;
        let order: Vec<&str> = report.iter().map(|o| o.municipality()).collect();
        assert_eq!(order, names.to_vec());
        assert_eq!(report.done().count(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_skipped_municipalities_do_not_block_others() -> Result<(), PrecipTrendError> {
        let mut two_years = year_of(2020, 30, "10");
        two_years.extend(year_of(2021, 30, "14"));
        let store = InMemoryStore::new()
            .with_unavailable_station("22036")
            .with_unavailable_station("22037")
            .with_station("22005", two_years)
            .with_station("22028", year_of(2021, 30, "9"));
        let registry = StationRegistry::new()
            .with_municipality("Arroyo Seco", ["22036", "22037"])?
            .with_municipality("Cadereyta", ["22005"])?
            .with_municipality("San Juan del Río", ["22028"])?;
        let config = PipelineConfig::builder()
            .min_samples(30)
            .max_concurrent_municipalities(2)
            .build();

        let report = pipeline(store, registry, config)?.run().await?;
        assert_eq!(report.len(), 3);
        let order: Vec<&str> = report.iter().map(|o| o.municipality()).collect();
        assert_eq!(order, vec!["Arroyo Seco", "Cadereyta", "San Juan del Río"]);

        let arroyo = &report.outcomes[0];
        assert!(matches!(
            arroyo,
            MunicipalityOutcome::Skipped {
                stage: PipelineStage::FetchingSources,
                reason: SkipReason::EmptyMunicipality,
                ..
            }
        ));
        assert!(arroyo.sources().iter().all(|s| s.issue().is_some()));

        let cadereyta = report.outcomes[1].as_done().unwrap();
        assert!((cadereyta.trend.slope() - 4.0).abs() < 1e-9);

        assert!(matches!(
            &report.outcomes[2],
            MunicipalityOutcome::Skipped {
                stage: PipelineStage::Fitting,
                reason: SkipReason::InsufficientDataForFit { years: 1 },
                ..
            }
        ));
        assert_eq!(report.done().count(), 1);
        assert_eq!(report.skipped_count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_year_window_restricts_the_series() -> Result<(), PrecipTrendError> {
        let records: Vec<RawMeasurement> = (2015..=2024)
            .flat_map(|year| year_of(year, 30, "7"))
            .collect();
        let store = InMemoryStore::new().with_station("22005", records);
        let registry = StationRegistry::new().with_municipality("Cadereyta", ["22005"])?;
        let config = PipelineConfig::builder()
            .min_samples(30)
            .year_window(YearWindow::Trailing(5))
            .reference_year(2023)
            .horizon(ProjectionHorizon::ThroughYear(2028))
            .build();

        let report = pipeline(store, registry, config)?.run().await?;
        let done = report.get("Cadereyta").and_then(|o| o.as_done()).unwrap();
        assert_eq!(done.series.first_year(), Some(2018));
        assert_eq!(done.series.last_year(), Some(2023));
        assert_eq!(done.projection.len(), 5);
        assert_eq!(done.trend.slope(), 0.0);
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PipelineConfig::builder()
            .max_concurrent_municipalities(0)
            .build();
        let result = pipeline(InMemoryStore::new(), StationRegistry::new(), config);
        assert!(matches!(
            result,
            Err(PrecipTrendError::Config(ConfigError::NotPositive(_)))
        ));
    }
}
