pub mod confidence;
pub mod daylight;
pub mod engine;
pub mod error;
pub mod models;
pub mod noise;
pub mod seasonal;
pub mod weather;

pub use confidence::*;
pub use engine::*;
pub use error::*;
pub use models::*;
pub use noise::*;
pub use seasonal::*;
pub use weather::*;
