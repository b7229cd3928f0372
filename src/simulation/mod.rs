//! Simulation module - the timestep loop and its window

pub mod engine;
pub mod window;

pub use engine::{Simulation, SimulationState};
pub use window::Window;
