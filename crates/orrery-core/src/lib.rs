pub mod animation;
pub mod app;
pub mod audio;
pub mod config;
pub mod constants;
pub mod debounce;
pub mod error;
pub mod input;
pub mod mapping;
pub mod observers;
pub mod orbit;
pub mod planets;
pub mod scene;
pub mod state;

pub use animation::*;
pub use app::*;
pub use audio::*;
pub use config::*;
pub use debounce::*;
pub use error::*;
pub use input::*;
pub use mapping::*;
pub use observers::*;
pub use orbit::*;
pub use planets::*;
pub use scene::*;
pub use state::*;
