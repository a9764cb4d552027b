//! Proptest strategies for event snapshots.

#![allow(dead_code)]

use brigade_metrics::{Event, JobPhase, WorkerPhase};
use proptest::prelude::*;

use super::builders::EventBuilder;

pub fn worker_phase_strategy() -> impl Strategy<Value = WorkerPhase> {
    proptest::sample::select(WorkerPhase::ALL.to_vec())
}

pub fn job_phase_strategy() -> impl Strategy<Value = JobPhase> {
    proptest::sample::select(JobPhase::ALL.to_vec())
}

fn job_strategy() -> impl Strategy<Value = (JobPhase, Option<i64>)> {
    (job_phase_strategy(), proptest::option::of(0i64..3600))
}

fn event_strategy(index: usize) -> impl Strategy<Value = Event> {
    (
        worker_phase_strategy(),
        proptest::option::weighted(0.9, 0i64..86_400),
        0usize..4,
        proptest::collection::vec(job_strategy(), 0..4),
    )
        .prop_map(move |(phase, started, project, jobs)| {
            let mut builder = EventBuilder::new(&format!("evt-{index}"))
                .project(&format!("project-{project}"))
                .phase(phase);
            if let Some(secs) = started {
                builder = builder.started(secs);
            }
            for (n, (job_phase, job_started)) in jobs.into_iter().enumerate() {
                builder = builder.job(&format!("job-{n}"), job_phase, job_started);
            }
            builder.build()
        })
}

/// Snapshots of up to `max` events with unique IDs
pub fn events_strategy(max: usize) -> impl Strategy<Value = Vec<Event>> {
    (0..=max).prop_flat_map(|len| (0..len).map(event_strategy).collect::<Vec<_>>())
}
