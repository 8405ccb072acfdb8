use std::future::Future;

use futures::future::join_all;
use indicatif::ProgressBar;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CliResult;
use crate::types::bulk::{BulkReport, DeployOutcome};
use crate::types::neuron::NeuronDescriptor;

/// Registers `descriptors` in consecutive batches of `width`.
///
/// Every request in a batch is in flight at once and the whole batch settles
/// before the next one starts. A failed registration is recorded against its
/// descriptor and never stops its siblings or later batches. Results come
/// back in input order, one per descriptor.
pub async fn deploy_in_batches<F, Fut>(
    descriptors: Vec<NeuronDescriptor>,
    width: usize,
    progress: &ProgressBar,
    deploy: F,
) -> BulkReport
where
    F: Fn(NeuronDescriptor) -> Fut,
    Fut: Future<Output = CliResult<Value>>,
{
    let width = width.max(1);
    let total_batches = descriptors.len().div_ceil(width);
    let mut report = BulkReport {
        results: Vec::with_capacity(descriptors.len()),
        batch_sizes: Vec::with_capacity(total_batches),
    };

    for (index, batch) in descriptors.chunks(width).enumerate() {
        debug!(
            batch = index + 1,
            of = total_batches,
            size = batch.len(),
            "deploying batch"
        );
        progress.set_message(format!("batch {}/{}", index + 1, total_batches));

        let pending = batch.iter().map(|descriptor| {
            let request = deploy(descriptor.clone());
            async move { (descriptor, request.await) }
        });

        for (descriptor, result) in join_all(pending).await {
            let outcome = match result {
                Ok(neuron) => DeployOutcome::succeeded(descriptor.clone(), neuron),
                Err(err) => {
                    warn!(neuron = %descriptor.neuron_id, error = %err, "deployment failed");
                    DeployOutcome::failed(descriptor.clone(), &err)
                }
            };
            report.results.push(outcome);
            progress.inc(1);
        }
        report.batch_sizes.push(batch.len());
    }

    progress.finish_and_clear();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use crate::types::neuron::NeuronDefinition;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn descriptors(count: usize) -> Vec<NeuronDescriptor> {
        (0..count)
            .map(|i| NeuronDefinition::new(format!("neuron {}", i), "finance").resolve())
            .collect()
    }

    #[tokio::test]
    async fn twelve_with_width_five_runs_three_batches() {
        let report = deploy_in_batches(descriptors(12), 5, &ProgressBar::hidden(), |d| async move {
            Ok::<_, CliError>(json!({ "neuronId": d.neuron_id }))
        })
        .await;

        assert_eq!(report.batch_sizes, vec![5, 5, 2]);
        assert_eq!(report.results.len(), 12);
        assert_eq!(report.succeeded(), 12);
        for (i, outcome) in report.results.iter().enumerate() {
            assert_eq!(outcome.config.name, format!("neuron {}", i));
            assert_eq!(
                outcome.neuron.as_ref().unwrap()["neuronId"],
                json!(outcome.config.neuron_id)
            );
        }
    }

    #[tokio::test]
    async fn batch_count_is_ceiling_of_len_over_width() {
        for (n, w) in [(1, 5), (5, 5), (6, 5), (7, 1), (3, 10), (0, 4)] {
            let report =
                deploy_in_batches(descriptors(n), w, &ProgressBar::hidden(), |_| async {
                    Ok::<_, CliError>(Value::Null)
                })
                .await;
            assert_eq!(report.batch_sizes.len(), n.div_ceil(w), "n={} w={}", n, w);
            assert_eq!(report.results.len(), n);
            assert!(report.batch_sizes.iter().all(|size| *size <= w));
        }
    }

    #[tokio::test]
    async fn unbounded_width_runs_everything_in_one_batch() {
        let report = deploy_in_batches(descriptors(2), usize::MAX, &ProgressBar::hidden(), |_| async {
            Ok::<_, CliError>(Value::Null)
        })
        .await;
        assert_eq!(report.batch_sizes, vec![2]);
        assert_eq!(report.succeeded(), 2);
    }

    #[tokio::test]
    async fn failures_are_isolated_and_order_preserved() {
        let completed = Arc::new(AtomicUsize::new(0));
        let counter = completed.clone();

        let report = deploy_in_batches(descriptors(7), 3, &ProgressBar::hidden(), move |d| {
            let counter = counter.clone();
            async move {
                // Make later siblings finish first to prove ordering is by input.
                let index: u64 = d.name.trim_start_matches("neuron ").parse().unwrap();
                let delay = 5 * (7 - index);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                counter.fetch_add(1, Ordering::SeqCst);
                if d.name == "neuron 1" || d.name == "neuron 6" {
                    Err(CliError::http(500, "registration rejected"))
                } else {
                    Ok(json!({ "ok": true }))
                }
            }
        })
        .await;

        assert_eq!(completed.load(Ordering::SeqCst), 7);
        assert_eq!(report.batch_sizes, vec![3, 3, 1]);
        assert_eq!(report.succeeded(), 5);
        assert_eq!(report.failed(), 2);

        let names: Vec<_> = report.results.iter().map(|r| r.config.name.as_str()).collect();
        assert_eq!(
            names,
            (0..7).map(|i| format!("neuron {}", i)).collect::<Vec<_>>()
        );

        let failed: Vec<_> = report.failures().map(|f| f.config.name.clone()).collect();
        assert_eq!(failed, vec!["neuron 1", "neuron 6"]);
        assert_eq!(
            report.results[1].error.as_deref(),
            Some("HTTP error 500: registration rejected")
        );
    }

    #[tokio::test]
    async fn batches_do_not_overlap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peaks = Arc::new(Mutex::new(Vec::new()));
        let (flight, seen) = (in_flight.clone(), peaks.clone());

        let report = deploy_in_batches(descriptors(9), 4, &ProgressBar::hidden(), move |_| {
            let flight = flight.clone();
            let seen = seen.clone();
            async move {
                let now = flight.fetch_add(1, Ordering::SeqCst) + 1;
                seen.lock().unwrap().push(now);
                tokio::time::sleep(Duration::from_millis(10)).await;
                flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, CliError>(Value::Null)
            }
        })
        .await;

        assert_eq!(report.batch_sizes, vec![4, 4, 1]);
        let peak = peaks.lock().unwrap().iter().copied().max().unwrap();
        assert_eq!(peak, 4);
    }
}
