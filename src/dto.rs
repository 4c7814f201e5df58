pub mod relay;
pub mod settings;
pub mod web;

pub use relay::*;
pub use settings::*;
pub use web::*;
