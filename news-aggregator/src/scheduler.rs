use crate::pipeline::IngestionPipeline;
use chrono::{DateTime, Duration as ChronoDuration, Local, LocalResult, NaiveTime, TimeZone};
use tracing::{error, info, warn};

/// Next instant strictly after `now` whose wall-clock time is `at`.
///
/// Days where `at` does not exist (a DST gap) are skipped; an ambiguous time
/// resolves to its earlier instant.
pub fn next_run_after<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut date = now.date_naive();

    loop {
        let candidate = match tz.from_local_datetime(&date.and_time(at)) {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => None,
        };

        if let Some(dt) = candidate {
            if dt > *now {
                return dt;
            }
        }

        date = match date.succ_opt() {
            Some(next) => next,
            None => return now.clone() + ChronoDuration::days(1),
        };
    }
}

/// Run the pipeline every day at `at` local time until Ctrl-C.
///
/// A failed run is logged and the loop waits for the next day.
pub async fn run_daily(pipeline: &IngestionPipeline, at: NaiveTime) {
    info!("Scheduler started; daily run at {}", at.format("%H:%M"));

    loop {
        let now = Local::now();
        let next = next_run_after(&now, at);
        let wait = (next - now).to_std().unwrap_or_default();
        info!("Next run at {} (in {}s)", next.format("%Y-%m-%d %H:%M:%S %Z"), wait.as_secs());

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested; stopping scheduler");
                return;
            }
        }

        match pipeline.run_once().await {
            Ok(report) => info!(
                "Scheduled run done: {} inserted, {} duplicates, {} sources failed",
                report.articles_inserted, report.duplicates_skipped, report.sources_failed
            ),
            Err(e) if e.is_fatal() => error!("Scheduled run aborted: {}", e),
            Err(e) => warn!("Scheduled run failed: {}", e),
        }
    }
}
