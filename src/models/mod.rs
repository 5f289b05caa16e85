pub mod absence;
pub mod commitment;
pub mod organisation;
pub mod person;
pub mod project;
pub mod report;
pub mod snapshot;
pub mod team;
