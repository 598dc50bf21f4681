pub mod resource_controller;
pub mod traffic_light_controller;
