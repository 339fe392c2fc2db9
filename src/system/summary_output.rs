use harload::loadtest::{LoadTestReport, RunOutcome, WorkerStop};

pub(crate) fn summary_lines(report: &LoadTestReport) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("Summary:".to_owned());
    lines.push(format!("outcome: {}", outcome_label(report.outcome)));
    lines.push(format!("elapsed_ms: {}", report.elapsed.as_millis()));
    lines.push(format!("workers: {}", report.workers.len()));
    lines.push(format!(
        "passes: {}",
        report
            .workers
            .iter()
            .fold(0u64, |acc, worker| acc.saturating_add(worker.passes))
    ));
    lines.push(format!("requests: {}", report.total_requests()));
    lines.push(format!(
        "transport_failures: {}",
        report.total_transport_failures()
    ));
    lines.push(format!(
        "metrics: {}",
        if report.recording { "recorded" } else { "off" }
    ));
    for worker in &report.workers {
        if let WorkerStop::Aborted(reason) = &worker.stop {
            lines.push(format!("worker {} aborted: {}", worker.worker_id, reason));
        }
    }
    lines
}

const fn outcome_label(outcome: RunOutcome) -> &'static str {
    match outcome {
        RunOutcome::Completed => "completed",
        RunOutcome::TimedOut => "timed out",
        RunOutcome::Interrupted => "interrupted",
    }
}
