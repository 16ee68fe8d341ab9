use crate::domain::model::Dashboard;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone)]
pub struct RunReport {
    pub dashboard: Dashboard,
    /// Locations of the written export files.
    pub artifacts: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The source answered with no rows; nothing was rendered or exported.
    NoData { source: String },
    Completed(Box<RunReport>),
}

pub struct DashboardEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> DashboardEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// One full pass. A failed fetch stops the run before any derived data
    /// exists.
    pub async fn run(&self) -> Result<RunOutcome> {
        let table = self.pipeline.extract().await?;

        if table.is_empty() {
            let source = self.pipeline.describe_source();
            tracing::info!("ℹ️ No booking data in {}", source);
            return Ok(RunOutcome::NoData { source });
        }

        let dashboard = self.pipeline.transform(table).await?;
        let artifacts = self.pipeline.load(&dashboard).await?;

        for artifact in &artifacts {
            tracing::info!("📁 Export saved to: {}", artifact);
        }

        Ok(RunOutcome::Completed(Box::new(RunReport {
            dashboard,
            artifacts,
        })))
    }

    /// Runs on a fixed interval until Ctrl-C or `max_runs` passes, handing
    /// each outcome to `on_run`. Returns the number of runs made.
    ///
    /// Runs never overlap; ticks missed during a slow run are skipped.
    pub async fn watch<F>(&self, interval: Duration, max_runs: Option<usize>, on_run: F) -> usize
    where
        F: FnMut(Result<RunOutcome>),
    {
        self.watch_until(interval, max_runs, shutdown_signal(), on_run)
            .await
    }

    /// Like [`watch`](Self::watch), stopping once `shutdown` resolves.
    ///
    /// A shutdown that arrives mid-run lets that run finish and report, then
    /// the loop ends.
    pub async fn watch_until<F, S>(
        &self,
        interval: Duration,
        max_runs: Option<usize>,
        shutdown: S,
        mut on_run: F,
    ) -> usize
    where
        F: FnMut(Result<RunOutcome>),
        S: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);
        let mut interrupted = false;
        let mut runs = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut shutdown => {
                    tracing::info!("🛑 Interrupted, stopping refresh loop");
                    break;
                }
            }

            let run = self.run();
            tokio::pin!(run);
            let outcome = loop {
                tokio::select! {
                    outcome = &mut run => break outcome,
                    _ = &mut shutdown, if !interrupted => {
                        interrupted = true;
                        tracing::info!("🛑 Interrupted, finishing the current run");
                    }
                }
            };

            if let Err(e) = &outcome {
                tracing::error!("❌ Refresh failed: {} (next attempt in {:?})", e, interval);
            }
            on_run(outcome);
            runs += 1;

            if interrupted || max_runs.is_some_and(|max| runs >= max) {
                break;
            }
        }

        runs
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("⚠️ Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{GroupAggregate, GroupFilter, Table};
    use crate::utils::error::DashboardError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records which stages ran.
    struct StubPipeline {
        table: Option<Table>,
        delay: Duration,
        transforms: AtomicUsize,
        loads: AtomicUsize,
    }

    impl StubPipeline {
        fn new(table: Option<Table>) -> Self {
            Self {
                table,
                delay: Duration::ZERO,
                transforms: AtomicUsize::new(0),
                loads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Pipeline for StubPipeline {
        fn describe_source(&self) -> String {
            "stub".to_string()
        }

        async fn extract(&self) -> Result<Table> {
            tokio::time::sleep(self.delay).await;
            self.table
                .clone()
                .ok_or_else(|| DashboardError::source_access("stub", "HTTP 401"))
        }

        async fn transform(&self, table: Table) -> Result<Dashboard> {
            self.transforms.fetch_add(1, Ordering::SeqCst);
            let view = crate::core::classify::classify(table, &Default::default());
            Ok(Dashboard {
                title: "stub".to_string(),
                source: "stub".to_string(),
                group_field: "Hostel".to_string(),
                grouping_available: false,
                summary: crate::core::aggregate::summarize(&view),
                groups: GroupAggregate::new(),
                selection: GroupFilter::All,
                filter_options: vec![],
                view,
                refreshed_at: chrono::Utc::now(),
            })
        }

        async fn load(&self, _dashboard: &Dashboard) -> Result<Vec<String>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["out.xlsx".to_string()])
        }
    }

    fn one_row() -> Table {
        Table::from_rows(vec!["Status".into()], vec![vec!["Booked".into()]])
    }

    #[tokio::test]
    async fn test_run_completes() {
        let engine = DashboardEngine::new(StubPipeline::new(Some(one_row())));

        match engine.run().await.unwrap() {
            RunOutcome::Completed(report) => {
                assert_eq!(report.dashboard.summary.booked_rooms, 1);
                assert_eq!(report.artifacts, vec!["out.xlsx"]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_table_stops_before_transform() {
        let engine = DashboardEngine::new(StubPipeline::new(Some(Table::new(vec!["Hostel".into()]))));

        let outcome = engine.run().await.unwrap();

        assert!(matches!(outcome, RunOutcome::NoData { ref source } if source == "stub"));
        assert_eq!(engine.pipeline().transforms.load(Ordering::SeqCst), 0);
        assert_eq!(engine.pipeline().loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_source_failure_is_fatal_for_the_run() {
        let engine = DashboardEngine::new(StubPipeline::new(None));

        let result = engine.run().await;

        assert!(matches!(result, Err(DashboardError::SourceAccessError { .. })));
        assert_eq!(engine.pipeline().transforms.load(Ordering::SeqCst), 0);
        assert_eq!(engine.pipeline().loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_watch_stops_after_max_runs() {
        let engine = DashboardEngine::new(StubPipeline::new(Some(one_row())));
        let mut completed = 0;

        let runs = engine
            .watch(Duration::from_millis(10), Some(3), |outcome| {
                if let Ok(RunOutcome::Completed(_)) = outcome {
                    completed += 1;
                }
            })
            .await;

        assert_eq!(runs, 3);
        assert_eq!(completed, 3);
        assert_eq!(engine.pipeline().loads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_watch_keeps_going_after_failed_run() {
        let engine = DashboardEngine::new(StubPipeline::new(None));
        let mut failures = 0;

        let runs = engine
            .watch(Duration::from_millis(10), Some(2), |outcome| {
                if outcome.is_err() {
                    failures += 1;
                }
            })
            .await;

        assert_eq!(runs, 2);
        assert_eq!(failures, 2);
    }

    #[tokio::test]
    async fn test_shutdown_during_run_finishes_it_then_stops() {
        let mut pipeline = StubPipeline::new(Some(one_row()));
        pipeline.delay = Duration::from_millis(300);
        let engine = DashboardEngine::new(pipeline);
        let mut completed = 0;

        let shutdown = tokio::time::sleep(Duration::from_millis(100));
        let runs = tokio::time::timeout(
            Duration::from_secs(3),
            engine.watch_until(Duration::from_secs(1), Some(10), shutdown, |outcome| {
                if let Ok(RunOutcome::Completed(_)) = outcome {
                    completed += 1;
                }
            }),
        )
        .await
        .expect("watch loop kept running after shutdown");

        assert_eq!(runs, 1);
        assert_eq!(completed, 1);
        assert_eq!(engine.pipeline().loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shutdown_between_runs_stops_without_running() {
        let engine = DashboardEngine::new(StubPipeline::new(Some(one_row())));

        let runs = engine
            .watch_until(
                Duration::from_millis(10),
                Some(10),
                std::future::ready(()),
                |_| {},
            )
            .await;

        assert!(runs <= 1);
        assert!(engine.pipeline().loads.load(Ordering::SeqCst) <= 1);
    }
}
