//! Run statistics for the console summary

use crate::harvest::RunReport;
use crate::records::BatchDataset;
use crate::state::EntityState;
use std::time::Duration;

/// Harvest statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStatistics {
    pub total_entities: usize,
    pub succeeded: usize,
    pub partial: usize,
    pub skipped: usize,
    pub failed: usize,
    pub unprocessed: usize,
    pub interrupted: bool,
    pub elapsed: Duration,

    pub users: usize,
    pub primary_records: usize,
    pub secondary_records: usize,

    /// Entities that did not fully succeed, with reasons
    pub problems: Vec<(String, EntityState, String)>,
}

impl RunStatistics {
    pub fn from_run(report: &RunReport, dataset: &BatchDataset) -> Self {
        let problems = report
            .outcomes
            .iter()
            .filter_map(|o| {
                o.reason
                    .as_ref()
                    .map(|reason| (o.entity.clone(), o.state, reason.clone()))
            })
            .collect();

        Self {
            total_entities: report.total_entities,
            succeeded: report.succeeded(),
            partial: report.partial(),
            skipped: report.skipped(),
            failed: report.failed(),
            unprocessed: report.unprocessed(),
            interrupted: report.interrupted,
            elapsed: report.elapsed,
            users: dataset.users().len(),
            primary_records: dataset.primary().len(),
            secondary_records: dataset.secondary().len(),
            problems,
        }
    }

    /// Percentage of entities that produced records
    pub fn success_rate(&self) -> f64 {
        if self.total_entities == 0 {
            return 0.0;
        }
        (self.succeeded as f64 / self.total_entities as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Harvest Summary ===\n");

    println!("Entities:");
    println!("  Total: {}", stats.total_entities);
    println!(
        "  Succeeded: {} ({} with partial content)",
        stats.succeeded, stats.partial
    );
    println!("  Skipped: {}", stats.skipped);
    println!("  Failed: {}", stats.failed);
    if stats.interrupted {
        println!("  Not reached (interrupted): {}", stats.unprocessed);
    }
    println!();

    println!("Records:");
    println!("  users: {}", stats.users);
    println!("  tweets: {}", stats.primary_records);
    println!("  highlight_tweets: {}", stats.secondary_records);
    println!();

    if !stats.problems.is_empty() {
        println!("Problems ({}):", stats.problems.len());
        for (entity, state, reason) in &stats.problems {
            println!("  - {} [{}]: {}", entity, state, reason);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} entities) in {:.1}s",
        stats.success_rate(),
        stats.succeeded,
        stats.total_entities,
        stats.elapsed.as_secs_f64()
    );
}
