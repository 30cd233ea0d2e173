// Runs a scan off the async runtime and streams its progress
use crate::discovery::DetectionAggregator;
use crate::error::ScanError;
use crate::models::{Category, ScanReport};
use crate::volumes::VolumeEnumerator;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug)]
pub enum ScanEvent {
    Started { categories: Vec<Category> },
    CategoryDone { category: Category, found: usize },
    Completed(ScanReport),
    Failed(ScanError),
}

/// A scan running on a dedicated blocking worker. There is no way to
/// cancel it; it runs until the report is ready or it fails.
pub struct ScanTask {
    events: mpsc::UnboundedReceiver<ScanEvent>,
    handle: JoinHandle<()>,
}

impl ScanTask {
    pub fn spawn<V>(aggregator: DetectionAggregator<V>, categories: Vec<Category>) -> Self
    where
        V: VolumeEnumerator + Send + 'static,
    {
        let (tx, events) = mpsc::unbounded_channel();

        let handle = tokio::task::spawn_blocking(move || {
            let _ = tx.send(ScanEvent::Started {
                categories: categories.clone(),
            });

            let result = aggregator.scan_all(&categories, |category, found| {
                let _ = tx.send(ScanEvent::CategoryDone { category, found });
            });

            let event = match result {
                Ok(report) => ScanEvent::Completed(report),
                Err(e) => ScanEvent::Failed(e),
            };
            if tx.send(event).is_err() {
                debug!("Scan finished after the receiver was dropped");
            }
        });

        Self { events, handle }
    }

    /// Wait for the report, passing every event to `on_event` on the way
    pub async fn finish(mut self, mut on_event: impl FnMut(&ScanEvent)) -> Result<ScanReport, ScanError> {
        while let Some(event) = self.events.recv().await {
            on_event(&event);
            match event {
                ScanEvent::Completed(report) => return Ok(report),
                ScanEvent::Failed(e) => return Err(e),
                _ => {}
            }
        }

        match self.handle.await {
            Err(e) => Err(ScanError::Worker(e.to_string())),
            Ok(()) => Err(ScanError::Worker("scan ended without a report".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuditConfig;
    use crate::volumes::FixedVolumes;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_events_end_with_report() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("Program Files/WireGuard")).unwrap();

        let aggregator = DetectionAggregator::new(
            FixedVolumes(vec![tmp.path().to_path_buf()]),
            AuditConfig::default(),
        );
        let task = ScanTask::spawn(aggregator, vec![Category::Vpn, Category::Remote]);

        let mut done = Vec::new();
        let mut started = false;
        let report = task
            .finish(|event| match event {
                ScanEvent::Started { categories } => {
                    started = true;
                    assert_eq!(categories.len(), 2);
                }
                ScanEvent::CategoryDone { category, found } => done.push((*category, *found)),
                _ => {}
            })
            .await
            .unwrap();

        assert!(started);
        assert_eq!(done, vec![(Category::Vpn, 1), (Category::Remote, 0)]);
        assert_eq!(report.categories[0].category, Category::Vpn);
        assert_eq!(report.categories[0].detections[0].name, "WireGuard");
    }

    #[tokio::test]
    async fn test_failure_is_surfaced() {
        let aggregator = DetectionAggregator::new(
            FixedVolumes(vec![PathBuf::from("/no/such/volume")]),
            AuditConfig::default(),
        );
        let result = ScanTask::spawn(aggregator, vec![Category::Chat])
            .finish(|_| {})
            .await;
        assert!(matches!(result, Err(ScanError::NoVolumes)));
    }
}
