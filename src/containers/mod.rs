pub mod basic;
pub mod catalog;
pub mod members;
