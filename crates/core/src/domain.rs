//! Text-coded domain enums.
//!
//! Each enum is stored as a `TEXT` column guarded by a CHECK constraint and
//! travels over the wire as its snake_case code. The human label is used in
//! CSV exports and generated reports.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($code:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The stored / serialized code.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $code ),+
                }
            }

            /// Human-readable label.
            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            /// Parse a stored code. Returns `None` for unknown codes.
            pub fn parse(code: &str) -> Option<Self> {
                match code {
                    $( $code => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// Parse a human label (case-insensitive), as found in imported CSV files.
            pub fn from_label(label: &str) -> Option<Self> {
                let label = label.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label().eq_ignore_ascii_case(label))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s).ok_or_else(|| {
                    CoreError::Validation(format!(
                        "Invalid {}: '{s}'",
                        stringify!($name)
                    ))
                })
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

define_text_enum! {
    /// Project lifecycle status.
    ProjectStatus {
        OnTrack => ("on_track", "On Track"),
        AtRisk => ("at_risk", "At Risk"),
        Delayed => ("delayed", "Delayed"),
        Completed => ("completed", "Completed"),
        Cancelled => ("cancelled", "Cancelled"),
    }
}

define_text_enum! {
    /// Project priority, also reused as risk and issue severity.
    Priority {
        Low => ("low", "Low"),
        Medium => ("medium", "Medium"),
        High => ("high", "High"),
        Critical => ("critical", "Critical"),
    }
}

/// Risk and issue severity share the priority scale.
pub type Severity = Priority;

define_text_enum! {
    RiskCategory {
        Schedule => ("schedule", "Schedule"),
        Budget => ("budget", "Budget"),
        Resource => ("resource", "Resource"),
        Technical => ("technical", "Technical"),
        Scope => ("scope", "Scope"),
        External => ("external", "External"),
        Quality => ("quality", "Quality"),
    }
}

define_text_enum! {
    RiskStatus {
        Open => ("open", "Open"),
        Mitigating => ("mitigating", "Mitigating"),
        Closed => ("closed", "Closed"),
    }
}

define_text_enum! {
    TaskStatus {
        NotStarted => ("not_started", "Not Started"),
        InProgress => ("in_progress", "In Progress"),
        Completed => ("completed", "Completed"),
        Blocked => ("blocked", "Blocked"),
        Cancelled => ("cancelled", "Cancelled"),
    }
}

define_text_enum! {
    ResourceRole {
        Developer => ("developer", "Developer"),
        Qa => ("qa", "QA Engineer"),
        Designer => ("designer", "Designer"),
        Analyst => ("analyst", "Business Analyst"),
        Architect => ("architect", "Architect"),
        Manager => ("manager", "Project Manager"),
        Other => ("other", "Other"),
    }
}

define_text_enum! {
    MilestoneStatus {
        Pending => ("pending", "Pending"),
        Achieved => ("achieved", "Achieved"),
        Missed => ("missed", "Missed"),
        AtRisk => ("at_risk", "At Risk"),
    }
}

define_text_enum! {
    IssueStatus {
        Open => ("open", "Open"),
        InProgress => ("in_progress", "In Progress"),
        Resolved => ("resolved", "Resolved"),
        Closed => ("closed", "Closed"),
    }
}

define_text_enum! {
    IssueCategory {
        Technical => ("technical", "Technical"),
        Process => ("process", "Process"),
        People => ("people", "People"),
        Communication => ("communication", "Communication"),
        Scope => ("scope", "Scope"),
        Quality => ("quality", "Quality"),
        Other => ("other", "Other"),
    }
}

define_text_enum! {
    /// Kind of user action recorded in the activity log.
    ActivityAction {
        Login => ("login", "Login"),
        Logout => ("logout", "Logout"),
        Create => ("create", "Create"),
        Update => ("update", "Update"),
        Delete => ("delete", "Delete"),
        View => ("view", "View"),
        Export => ("export", "Export"),
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::OnTrack
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl ProjectStatus {
    /// Only completed projects drop out of the "active" portfolio; cancelled
    /// ones still count and still appear in health rankings.
    pub fn is_active(self) -> bool {
        !matches!(self, ProjectStatus::Completed)
    }
}

impl TaskStatus {
    /// Terminal tasks are never overdue and have no days left.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }

    /// Statuses that count toward the health-score overdue penalty.
    pub fn is_pending(self) -> bool {
        matches!(self, TaskStatus::NotStarted | TaskStatus::InProgress)
    }
}

impl RiskStatus {
    /// Open and mitigating risks are still live.
    pub fn is_live(self) -> bool {
        !matches!(self, RiskStatus::Closed)
    }
}

impl IssueStatus {
    pub fn is_resolved(self) -> bool {
        matches!(self, IssueStatus::Resolved | IssueStatus::Closed)
    }
}
