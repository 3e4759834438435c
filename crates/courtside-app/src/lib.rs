// Library root: the collaborators around courtside-core (config, data
// sources, caching, report rendering) and the dashboard that ties them
// together for the binary and tests.

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod report;
pub mod source;
