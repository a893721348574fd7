//! View controllers for the admin console. Each controller owns one
//! screen's state on top of the shared package store and converts every
//! backend failure into its single user-visible error surface.

pub mod forms;
pub mod packages;

pub use forms::PackageForm;
pub use packages::{LoadState, LoadTicket, Notice, PackageAdminView, TransitionTicket, NOTICE_TTL};
