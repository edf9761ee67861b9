pub mod advice;
pub mod catalog;
pub mod identity;
pub mod schedule;
