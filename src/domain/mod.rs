pub mod component;
pub mod curve;
pub mod rates;
pub mod readings;
pub mod schedule;
pub mod time;
pub mod types;

pub use component::*;
pub use curve::*;
pub use rates::*;
pub use readings::*;
pub use schedule::*;
pub use time::*;
pub use types::*;
