//! Teacher agent
//!
//! Registers once, then repeatedly checks the classroom and casts random
//! votes to start or end the class.

use std::time::Duration;

use classroom_core::Teacher;
use classroom_net::{ClassroomClient, Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::config::TeacherConfig;

pub struct TeacherAgent<R> {
    config: TeacherConfig,
    teacher: Teacher,
    rng: R,
}

impl<R: Rng> TeacherAgent<R> {
    /// Create an agent. Without an explicit name one is drawn from the
    /// configured list.
    pub fn new(config: TeacherConfig, name: Option<String>, mut rng: R) -> Self {
        let name = name
            .or_else(|| config.names.choose(&mut rng).cloned())
            .unwrap_or_else(|| "Teacher".to_string());
        Self {
            config,
            teacher: Teacher::new(name),
            rng,
        }
    }

    /// Current teacher record (ID and last votes)
    pub fn teacher(&self) -> &Teacher {
        &self.teacher
    }

    async fn deliberate(&mut self) -> bool {
        tokio::time::sleep(Duration::from_millis(self.config.vote_delay_ms)).await;
        self.rng.gen_bool(self.config.yes_probability)
    }

    /// A rejected ID means the server no longer knows us, typically after a
    /// restart; drop it so the next cycle registers again.
    ///
    /// Only IDs above the restarted server's issued count are caught. An old
    /// ID that the new server has already handed to another teacher is
    /// accepted, and this agent's votes land under that teacher's entry. The
    /// protocol carries no server epoch to tell the two apart.
    fn forget_stale_id(&mut self, result: Result<bool>) -> Result<bool> {
        match result {
            Err(Error::Coordinator(classroom_core::Error::UnknownTeacher(id))) => {
                warn!(teacher_id = id, "Server does not know this teacher, re-registering");
                self.teacher.teacher_id = 0;
                Ok(false)
            }
            other => other,
        }
    }

    /// One iteration of the teacher loop. Returns how long to wait before
    /// the next one.
    pub async fn step(&mut self, client: &mut ClassroomClient) -> Result<Duration> {
        if !self.teacher.is_registered() {
            self.teacher.teacher_id = client.issue_unique_id().await?;
            info!(
                teacher_id = self.teacher.teacher_id,
                name = %self.teacher.name,
                "Teacher registered"
            );
        }

        if !client.is_session_active().await? && client.can_start_voting().await? {
            self.teacher.has_voted_to_start = self.deliberate().await;
            let result = client.vote_to_start(&self.teacher).await;
            let started = self.forget_stale_id(result)?;
            if !self.teacher.is_registered() {
                return Ok(Duration::ZERO);
            }
            info!(
                teacher_id = self.teacher.teacher_id,
                vote = self.teacher.has_voted_to_start,
                started = started,
                "Sent start vote"
            );
        }

        if client.is_session_active().await? {
            self.teacher.has_voted_to_end = self.deliberate().await;
            let result = client.vote_to_end(&self.teacher).await;
            let ended = self.forget_stale_id(result)?;
            if !self.teacher.is_registered() {
                return Ok(Duration::ZERO);
            }
            info!(
                teacher_id = self.teacher.teacher_id,
                vote = self.teacher.has_voted_to_end,
                ended = ended,
                "Sent end vote"
            );
        }

        Ok(Duration::from_millis(self.config.cycle_pause_ms))
    }

    /// Run forever, reconnecting after any transport error. The teacher
    /// keeps its ID across reconnects.
    pub async fn run(mut self, retry_pause: Duration) {
        loop {
            match ClassroomClient::connect(self.config.server).await {
                Ok(mut client) => loop {
                    match self.step(&mut client).await {
                        Ok(pause) => tokio::time::sleep(pause).await,
                        Err(e) => {
                            warn!(
                                teacher_id = self.teacher().teacher_id,
                                error = %e,
                                "Teacher lost the server, will reconnect"
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

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use super::*;
    use classroom_core::{ClassroomCoordinator, DoorReport};
    use classroom_net::Server;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    async fn start_server() -> Server {
        let coordinator = Arc::new(ClassroomCoordinator::new(3));
        Server::start(SocketAddr::from(([127, 0, 0, 1], 0)), coordinator)
            .await
            .unwrap()
    }

    fn eager_config(server: SocketAddr) -> TeacherConfig {
        TeacherConfig {
            server,
            vote_delay_ms: 0,
            yes_probability: 1.0,
            cycle_pause_ms: 5,
            ..TeacherConfig::default()
        }
    }

    #[tokio::test]
    async fn test_name_drawn_from_config() {
        let config = TeacherConfig {
            names: vec!["Mia".to_string()],
            ..TeacherConfig::default()
        };
        let agent = TeacherAgent::new(config, None, StdRng::seed_from_u64(3));
        assert_eq!(agent.teacher().name, "Mia");
        assert!(!agent.teacher().is_registered());
    }

    #[tokio::test]
    async fn test_waits_for_students() {
        let server = start_server().await;
        let mut client = ClassroomClient::connect(server.addr()).await.unwrap();
        let mut agent = TeacherAgent::new(
            eager_config(server.addr()),
            Some("Ivy".into()),
            StdRng::seed_from_u64(3),
        );

        let pause = agent.step(&mut client).await.unwrap();
        assert_eq!(pause, Duration::from_millis(5));
        assert_eq!(agent.teacher().teacher_id, 1);
        assert_eq!(server.coordinator().snapshot().start_votes, 0);

        server.shutdown();
    }

    #[tokio::test]
    async fn test_two_teachers_run_a_session() {
        let server = start_server().await;
        let coordinator = server.coordinator().clone();
        coordinator.report_students(&DoorReport::new(1, 5, "main"));

        let mut client_a = ClassroomClient::connect(server.addr()).await.unwrap();
        let mut client_b = ClassroomClient::connect(server.addr()).await.unwrap();
        let mut a = TeacherAgent::new(
            eager_config(server.addr()),
            Some("Alice".into()),
            StdRng::seed_from_u64(1),
        );
        let mut b = TeacherAgent::new(
            eager_config(server.addr()),
            Some("Bob".into()),
            StdRng::seed_from_u64(2),
        );

        // Alice alone: one vote is never a majority
        a.step(&mut client_a).await.unwrap();
        assert!(!coordinator.is_session_active());

        // Bob completes the start round, then casts the first end vote
        b.step(&mut client_b).await.unwrap();
        assert!(coordinator.is_session_active());
        assert_eq!(coordinator.snapshot().end_votes, 1);

        // Alice completes the end round
        a.step(&mut client_a).await.unwrap();
        let snapshot = coordinator.snapshot();
        assert!(!snapshot.session_active);
        assert_eq!(snapshot.end_votes, 0);
        assert_eq!(snapshot.issued_ids, 2);

        server.shutdown();
    }

    #[tokio::test]
    async fn test_stale_id_triggers_reregistration() {
        let server = start_server().await;
        server
            .coordinator()
            .report_students(&DoorReport::new(1, 5, "main"));

        let mut client = ClassroomClient::connect(server.addr()).await.unwrap();
        let mut agent = TeacherAgent::new(
            eager_config(server.addr()),
            Some("Grace".into()),
            StdRng::seed_from_u64(4),
        );
        agent.teacher.teacher_id = 9;

        let pause = agent.step(&mut client).await.unwrap();
        assert_eq!(pause, Duration::ZERO);
        assert!(!agent.teacher().is_registered());

        agent.step(&mut client).await.unwrap();
        assert_eq!(agent.teacher().teacher_id, 1);
        assert_eq!(server.coordinator().snapshot().start_votes, 1);

        server.shutdown();
    }
}
