pub mod assignments;
pub mod finance;
pub mod jobs;
pub mod materials;
pub mod steps;
