//! Column names of the source tables and of the derived features.

pub const RACE_ID: &str = "raceId";
pub const DRIVER_ID: &str = "driverId";
pub const STATUS_ID: &str = "statusId";
pub const POSITION: &str = "position";
pub const POSITION_ORDER: &str = "positionOrder";
pub const STOP: &str = "stop";
pub const LAP: &str = "lap";
pub const LAPS: &str = "laps";
pub const MILLISECONDS: &str = "milliseconds";
pub const YEAR: &str = "year";

pub const TOTAL_LAPS: &str = "total_laps";
pub const TOTAL_STOPS: &str = "total_stops";
pub const LAP_PROP: &str = "lap_prop";
pub const ABS_DEVIATION: &str = "abs_deviation";
pub const ABS_DEVIATION_MEAN: &str = "abs_deviation_mean";
pub const STOP_COUNT: &str = "stop_count";
pub const LAP_TIME_STD: &str = "lap_time_STD";
