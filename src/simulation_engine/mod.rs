pub mod arrivals;
pub mod lanes;
pub mod simulation;
pub mod stepper;
pub mod vehicles;
