use super::model::ConversionJob;

/// Folds per-rendition percentages into the single number a polling
/// client sees.
pub struct ProgressAggregator;

impl ProgressAggregator {
    /// Arithmetic mean across all requested renditions.
    pub fn overall(job: &ConversionJob) -> f64 {
        if job.progress.is_empty() {
            return 0.0;
        }
        let sum: u32 = job.progress.values().map(|p| u32::from(*p)).sum();
        f64::from(sum) / job.progress.len() as f64
    }

    /// Only the status decides whether a job is done. A 100 percent
    /// average on a job still in `Processing` is not done yet.
    pub fn is_done(job: &ConversionJob) -> bool {
        job.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::conversion::model::JobStatus;
    use crate::modules::conversion::quality::Quality;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn job(qualities: &[Quality]) -> ConversionJob {
        ConversionJob::new(Uuid::new_v4(), PathBuf::from("/in.mp4"), qualities.to_vec())
    }

    #[test]
    fn overall_is_the_arithmetic_mean() {
        let mut job = job(&[Quality::Q240, Quality::Q480, Quality::Q720]);
        job.progress.insert(Quality::Q240, 100);
        job.progress.insert(Quality::Q480, 50);
        job.progress.insert(Quality::Q720, 0);

        assert_eq!(ProgressAggregator::overall(&job), 50.0);
    }

    #[test]
    fn overall_handles_uneven_splits() {
        let mut job = job(&[Quality::Q240, Quality::Q480]);
        job.progress.insert(Quality::Q240, 100);
        job.progress.insert(Quality::Q480, 33);

        assert_eq!(ProgressAggregator::overall(&job), 66.5);
    }

    #[test]
    fn full_progress_does_not_mean_done() {
        let mut job = job(&[Quality::Q240]);
        job.progress.insert(Quality::Q240, 100);
        job.status = JobStatus::Processing;

        assert_eq!(ProgressAggregator::overall(&job), 100.0);
        assert!(!ProgressAggregator::is_done(&job));

        job.status = JobStatus::Completed;
        assert!(ProgressAggregator::is_done(&job));
    }

    #[test]
    fn every_terminal_state_counts_as_done() {
        for status in [JobStatus::Completed, JobStatus::Failed, JobStatus::Cancelled] {
            let mut job = job(&[Quality::Q240]);
            job.status = status;
            assert!(ProgressAggregator::is_done(&job));
        }
    }
}
