use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::phase::{JobPhase, WorkerPhase};

/// Object metadata shared by every Brigade resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

/// A triggering occurrence, handled by exactly one worker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(rename = "projectID", default)]
    pub project_id: String,
    #[serde(default)]
    pub worker: Worker,
}

impl Event {
    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn worker_phase(&self) -> WorkerPhase {
        self.worker.status.phase
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    #[serde(default)]
    pub status: WorkerStatus,
    #[serde(default, deserialize_with = "jobs_or_empty")]
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStatus {
    #[serde(default)]
    pub phase: WorkerPhase,
    /// Absent while Pending or Starting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended: Option<DateTime<Utc>>,
}

/// A unit of work inside a worker. Names are unique per worker only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    #[serde(default)]
    pub status: JobStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub phase: JobPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended: Option<DateTime<Utc>>,
}

fn jobs_or_empty<'de, D>(deserializer: D) -> Result<Vec<Job>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Job>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_running_event() {
        let json = r#"{
            "metadata": {"id": "evt-1", "created": "2024-03-01T10:00:00Z"},
            "projectID": "hello-world",
            "source": "brigade.sh/cli",
            "type": "exec",
            "worker": {
                "spec": {"container": {"image": "brigadecore/brigade2-worker"}},
                "status": {"phase": "RUNNING", "started": "2024-03-01T10:00:05Z"},
                "jobs": [
                    {"name": "build", "status": {"phase": "RUNNING", "started": "2024-03-01T10:00:10Z"}},
                    {"name": "test", "status": {"phase": "PENDING"}}
                ]
            }
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.id(), "evt-1");
        assert_eq!(event.project_id, "hello-world");
        assert_eq!(event.worker_phase(), WorkerPhase::Running);
        assert!(event.worker.status.started.is_some());
        assert_eq!(event.worker.jobs.len(), 2);
        assert_eq!(event.worker.jobs[1].status.phase, JobPhase::Pending);
        assert!(event.worker.jobs[1].status.started.is_none());
    }

    #[test]
    fn test_deserialize_pending_event_without_jobs() {
        let json = r#"{
            "metadata": {"id": "evt-2"},
            "projectID": "p",
            "worker": {"status": {"phase": "PENDING"}, "jobs": null}
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.worker_phase(), WorkerPhase::Pending);
        assert!(event.worker.status.started.is_none());
        assert!(event.worker.jobs.is_empty());
    }
}
