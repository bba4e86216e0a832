//! Real-time 2D raycasting: an emitter casts a fan of rays against static line
//! obstacles, and each ray is drawn up to its nearest hit.

pub mod config;
pub mod emitter;
pub mod ray;
pub mod renderer;
pub mod visibility;
pub mod world;
