pub mod reservations;

pub use reservations::{AssignmentReport, Collaborators, ReservationService};
