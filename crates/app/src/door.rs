//! Door agent
//!
//! Simulates students arriving at a door and reports each batch to the
//! classroom server. The door stays shut while a class is in session.

use std::time::Duration;

use classroom_core::DoorReport;
use classroom_net::{ClassroomClient, Result};
use rand::Rng;
use tracing::{info, warn};

use crate::config::DoorConfig;

pub struct DoorAgent<R> {
    config: DoorConfig,
    report: DoorReport,
    rng: R,
}

impl<R: Rng> DoorAgent<R> {
    pub fn new(config: DoorConfig, rng: R) -> Self {
        let report = DoorReport::new(config.door_id, 0, config.description.clone());
        info!(
            door_id = report.door_id,
            description = %report.description,
            "Door initialized"
        );
        Self {
            config,
            report,
            rng,
        }
    }

    /// Most recent report sent to the server
    pub fn last_report(&self) -> &DoorReport {
        &self.report
    }

    /// One iteration of the door loop. Returns how long to wait before the
    /// next one.
    pub async fn step(&mut self, client: &mut ClassroomClient) -> Result<Duration> {
        if client.is_session_active().await? {
            info!(door_id = self.report.door_id, "Door is closed, class in session");
            self.report.is_closed = true;
            self.report.is_opened = false;
            return Ok(Duration::from_millis(self.config.closed_pause_ms));
        }

        let arriving = self
            .rng
            .gen_range(self.config.min_delta..=self.config.max_delta);
        self.report.amount_of_students = arriving;
        self.report.is_closed = false;
        self.report.is_opened = true;

        client.report_students(&self.report).await?;
        info!(
            door_id = self.report.door_id,
            delta = arriving,
            "Reported students to the server"
        );

        let pause = self
            .rng
            .gen_range(self.config.min_pause_ms..=self.config.max_pause_ms);
        Ok(Duration::from_millis(pause))
    }

    /// Run forever, reconnecting after any transport error
    pub async fn run(mut self, retry_pause: Duration) {
        loop {
            match ClassroomClient::connect(self.config.server).await {
                Ok(mut client) => loop {
                    match self.step(&mut client).await {
                        Ok(pause) => tokio::time::sleep(pause).await,
                        Err(e) => {
                            warn!(
                                door_id = self.last_report().door_id,
                                error = %e,
                                "Door lost the server, will reconnect"
                            );
                            break;
                        }
                    }
                },
                Err(e) => {
                    warn!(addr = %self.config.server, error = %e, "Failed to connect");
                }
            }
            tokio::time::sleep(retry_pause).await;
        }
    }
}
