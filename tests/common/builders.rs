//! Builders for events, workers and jobs relative to a fixed clock.

#![allow(dead_code)]

use brigade_metrics::models::{Job, JobStatus, ObjectMeta, Worker, WorkerStatus};
use brigade_metrics::{Event, JobPhase, WorkerPhase};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Reference instant used as "now" throughout the integration tests
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn secs_ago(secs: i64) -> DateTime<Utc> {
    test_now() - Duration::seconds(secs)
}

pub struct EventBuilder {
    id: String,
    project_id: String,
    phase: WorkerPhase,
    started: Option<DateTime<Utc>>,
    jobs: Vec<Job>,
}

impl EventBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            project_id: "hello-world".to_string(),
            phase: WorkerPhase::Pending,
            started: None,
            jobs: Vec::new(),
        }
    }

    /// A Running worker started `secs` before [`test_now`]
    pub fn running(id: &str, secs: i64) -> Self {
        Self::new(id).phase(WorkerPhase::Running).started(secs)
    }

    pub fn project(mut self, project_id: &str) -> Self {
        self.project_id = project_id.to_string();
        self
    }

    pub fn phase(mut self, phase: WorkerPhase) -> Self {
        self.phase = phase;
        self
    }

    pub fn started(mut self, secs: i64) -> Self {
        self.started = Some(secs_ago(secs));
        self
    }

    pub fn job(mut self, name: &str, phase: JobPhase, started_secs: Option<i64>) -> Self {
        self.jobs.push(Job {
            name: name.to_string(),
            status: JobStatus {
                phase,
                started: started_secs.map(secs_ago),
                ended: None,
            },
        });
        self
    }

    pub fn build(self) -> Event {
        Event {
            metadata: ObjectMeta {
                id: self.id,
                created: None,
            },
            project_id: self.project_id,
            worker: Worker {
                status: WorkerStatus {
                    phase: self.phase,
                    started: self.started,
                    ended: None,
                },
                jobs: self.jobs,
            },
        }
    }
}

/// Three workers: Running for 10s with one Running job, Pending, Succeeded
pub fn three_worker_scenario() -> Vec<Event> {
    vec![
        EventBuilder::running("w-running", 10)
            .job("build", JobPhase::Running, Some(10))
            .build(),
        EventBuilder::new("w-pending").build(),
        EventBuilder::new("w-done")
            .phase(WorkerPhase::Succeeded)
            .started(120)
            .job("build", JobPhase::Succeeded, Some(120))
            .build(),
    ]
}
