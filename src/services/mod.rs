pub mod absence_service;
pub mod availability_engine;
pub mod commitment_limit;
pub mod commitment_resolver;
pub mod commitment_service;
pub mod directory_service;
pub mod employment_timeline;
pub mod report_service;
pub mod scope_resolver;
pub mod snapshot_index;
pub mod telemetry;
