use common::{DisplayBase, StatusReporterBase, StatusSnapshot};
use log::{error, info, warn};
use parser::StatusReport;

/// Prints the status screen to the log.
#[derive(Default)]
pub struct LogDisplay;

impl DisplayBase for LogDisplay {
    fn draw_status(&mut self, ready: bool, version: &str) {
        let status = if ready { "ready" } else { "not initialized" };
        info!("[DISPLAY] v{} {}", version, status);
    }

    fn alert(&mut self, message: &str) {
        warn!("[DISPLAY] {}", message);
    }
}

/// Logs the JSON body the status endpoint would receive.
#[derive(Default)]
pub struct LogReporter;

impl StatusReporterBase for LogReporter {
    fn report(&mut self, snapshot: StatusSnapshot) {
        let report = StatusReport {
            status: snapshot.initialized,
        };
        match report.to_json() {
            Ok(body) => info!("[STATUS] {}", body),
            Err(e) => error!("[STATUS] cannot encode status: {}", e),
        }
    }
}
