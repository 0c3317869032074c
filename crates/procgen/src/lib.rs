//! Procedural terrain: seeded noise, the multi-octave height field, the animated
//! coefficient schedule, and the tiled patch meshes built from them.

pub mod error;
pub mod height;
pub mod noise_source;
pub mod patch;
pub mod schedule;
pub mod terrain;
pub mod textures;
pub mod tile;

pub use error::*;
pub use height::*;
pub use noise_source::*;
pub use patch::*;
pub use schedule::*;
pub use terrain::*;
pub use textures::*;
pub use tile::*;
