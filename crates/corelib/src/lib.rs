//! Core types: math re-exports, Camera, viewer parameters.

use thiserror::Error;

pub use glam::{Mat3, Mat4, Vec3, Vec4, vec3};

pub mod camera;
pub mod params;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
