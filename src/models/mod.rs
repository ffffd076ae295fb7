//! Data models for the rearrangement engine

pub mod effective;
pub mod enums;
pub mod faculty;
pub mod leave;
pub mod rearrangement;
pub mod timetable;

// Re-export commonly used types
pub use effective::{EffectiveSchedule, EffectiveSlot, ScheduleScope, SlotStatus};
pub use enums::{DayOfWeek, Decision, LeaveKind, LeaveStatus, RequestStatus, SubjectType};
pub use faculty::{AvailabilityCandidate, Faculty};
pub use leave::LeaveRecord;
pub use rearrangement::{RearrangementQuery, RearrangementRequest, TransitionOutcome};
pub use timetable::{ClassKey, PeriodGrid, WeeklyScheduleEntry};
