use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct Metrics {
    scans: AtomicU64,
    scan_errors: AtomicU64,
    logs_scanned: AtomicU64,
    detections: AtomicU64,
    alerts_suppressed: AtomicU64,
    rollback_requests: AtomicU64,
    reversals_planned: AtomicU64,
    commands_queued: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub scans: u64,
    pub scan_errors: u64,
    pub logs_scanned: u64,
    pub detections: u64,
    pub alerts_suppressed: u64,
    pub rollback_requests: u64,
    pub reversals_planned: u64,
    pub commands_queued: u64,
}

impl Metrics {
    pub fn record_scan(&self, log_count: usize, detection_count: usize, suppressed: usize) {
        self.scans.fetch_add(1, Ordering::Relaxed);
        self.logs_scanned
            .fetch_add(log_count as u64, Ordering::Relaxed);
        self.detections
            .fetch_add(detection_count as u64, Ordering::Relaxed);
        self.alerts_suppressed
            .fetch_add(suppressed as u64, Ordering::Relaxed);
    }

    pub fn record_scan_error(&self) {
        self.scan_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rollback_request(&self) {
        self.rollback_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reversals(&self, planned: usize, queued: usize) {
        self.reversals_planned
            .fetch_add(planned as u64, Ordering::Relaxed);
        self.commands_queued
            .fetch_add(queued as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            scans: self.scans.load(Ordering::Relaxed),
            scan_errors: self.scan_errors.load(Ordering::Relaxed),
            logs_scanned: self.logs_scanned.load(Ordering::Relaxed),
            detections: self.detections.load(Ordering::Relaxed),
            alerts_suppressed: self.alerts_suppressed.load(Ordering::Relaxed),
            rollback_requests: self.rollback_requests.load(Ordering::Relaxed),
            reversals_planned: self.reversals_planned.load(Ordering::Relaxed),
            commands_queued: self.commands_queued.load(Ordering::Relaxed),
        }
    }
}
