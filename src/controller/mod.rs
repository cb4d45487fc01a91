pub mod manager;
pub mod models;

pub use manager::ServoController;
pub use models::{ConnectOutcome, PositionOutcome, Status, VibrationWindow};
