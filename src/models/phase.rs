use serde::{Deserialize, Serialize};
use std::fmt;

/// Generates a lifecycle phase enum with the Brigade wire representation.
///
/// Unrecognized wire values deserialize to `Unknown` so that a new upstream
/// phase never fails a whole listing.
macro_rules! lifecycle_phase {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            /// Accepted but not yet scheduled
            Pending,
            /// Scheduled, container(s) starting
            Starting,
            /// Executing
            Running,
            /// Completed successfully
            Succeeded,
            /// Completed with a failure
            Failed,
            /// Stopped by an operator while running
            Aborted,
            /// Stopped by an operator before running
            Canceled,
            /// Exceeded its configured timeout
            TimedOut,
            /// The substrate could not schedule it
            SchedulingFailed,
            /// State could not be determined
            Unknown,
        }

        impl $name {
            /// Every phase, in a stable order
            pub const ALL: [Self; 10] = [
                Self::Pending,
                Self::Starting,
                Self::Running,
                Self::Succeeded,
                Self::Failed,
                Self::Aborted,
                Self::Canceled,
                Self::TimedOut,
                Self::SchedulingFailed,
                Self::Unknown,
            ];

            /// Name of the label dimension this phase is published under
            pub const LABEL: &'static str = $label;

            /// Wire and label representation
            pub fn as_str(&self) -> &'static str {
                match self {
                    Self::Pending => "PENDING",
                    Self::Starting => "STARTING",
                    Self::Running => "RUNNING",
                    Self::Succeeded => "SUCCEEDED",
                    Self::Failed => "FAILED",
                    Self::Aborted => "ABORTED",
                    Self::Canceled => "CANCELED",
                    Self::TimedOut => "TIMED_OUT",
                    Self::SchedulingFailed => "SCHEDULING_FAILED",
                    Self::Unknown => "UNKNOWN",
                }
            }

            /// Check if this is a terminal phase (no further transitions)
            pub fn is_terminal(&self) -> bool {
                matches!(
                    self,
                    Self::Succeeded
                        | Self::Failed
                        | Self::Aborted
                        | Self::Canceled
                        | Self::TimedOut
                        | Self::SchedulingFailed
                )
            }

            /// Check if a start timestamp is expected for this phase
            pub fn has_started(&self) -> bool {
                matches!(self, Self::Running) || self.is_terminal()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::Unknown
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .into_iter()
                    .find(|phase| phase.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| format!("Invalid {}: {s}", stringify!($name)))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                value.parse().unwrap_or(Self::Unknown)
            }
        }

        impl From<$name> for String {
            fn from(phase: $name) -> Self {
                phase.as_str().to_string()
            }
        }
    };
}

lifecycle_phase!(
    /// Lifecycle phase of a worker, the execution context of one event
    WorkerPhase,
    "workerPhase"
);

lifecycle_phase!(
    /// Lifecycle phase of a single job inside a worker
    JobPhase,
    "jobPhase"
);
