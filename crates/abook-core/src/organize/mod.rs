//! Copy, move or link units to their target paths

mod cleanup;
mod copy;
mod link;
mod move_op;
mod operator;
mod organizer;
mod plan;
mod result;

pub use cleanup::remove_empty_dirs;
pub use copy::CopyOperator;
pub use link::{same_volume, HardLinkOperator, SymbolicLinkOperator};
pub use move_op::{MoveOperator, RenameFn};
pub use operator::{is_cross_device, operator_for, FileOperator};
pub use organizer::{FileOrganizer, OrganizeProgress, OrganizeProgressCallback};
pub use plan::{OrganizationPlan, PlanState};
pub use result::{OrganizationResult, UnitOutcome};
