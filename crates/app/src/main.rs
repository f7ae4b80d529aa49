//! Entry point for MeshView.
//! Loads a mesh and pixel map, positions the camera and reports what a
//! render loop would draw.

mod viewer;

use std::path::{Path, PathBuf};

use anyhow::Result;
use corelib::{
    camera::{Axis, CameraPreset},
    params::ViewerParams,
};

use crate::viewer::Viewer;

fn arg_value(prefix: &str) -> Option<String> {
    std::env::args()
        .filter_map(|arg| arg.strip_prefix(prefix).map(str::to_owned))
        .last()
}

fn parse_f32_arg(prefix: &str) -> Option<f32> {
    let raw = arg_value(prefix)?;
    match raw.parse::<f32>() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring {}{}: not a number", prefix, raw);
            None
        }
    }
}

fn parse_camera_arg() -> Option<CameraPreset> {
    // --camera=default|angled|top-down
    let name = arg_value("--camera=")?;
    let preset = CameraPreset::from_name(&name);
    if preset.is_none() {
        log::warn!("Unknown camera preset '{}', keeping configured camera.", name);
    }
    preset
}

fn parse_size_args() -> (u32, u32) {
    let mut w: Option<u32> = None;
    let mut h: Option<u32> = None;

    for arg in std::env::args() {
        if let Some(v) = arg.strip_prefix("--size=") {
            if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                    w = Some(pw);
                    h = Some(ph);
                }
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            if let Ok(pw) = v.parse::<u32>() {
                w = Some(pw);
            }
        } else if let Some(v) = arg.strip_prefix("--height=") {
            if let Ok(ph) = v.parse::<u32>() {
                h = Some(ph);
            }
        }
    }

    let ww = w.unwrap_or(1280).max(1);
    let hh = h.unwrap_or(720).max(1);
    (ww, hh)
}

fn parse_params() -> ViewerParams {
    let mut params = ViewerParams {
        resolution: parse_size_args(),
        ..ViewerParams::default()
    };
    if let Some(fov) = parse_f32_arg("--fov=") {
        params.camera.fov_deg = fov;
    }
    if let Some(near) = parse_f32_arg("--near=") {
        params.camera.near = near;
    }
    if let Some(far) = parse_f32_arg("--far=") {
        params.camera.far = far;
    }
    params
}

/// `--texture=` wins; otherwise a `.ppm` next to the model is used if present.
fn texture_path(model: &Path) -> Option<PathBuf> {
    if let Some(path) = arg_value("--texture=") {
        return Some(PathBuf::from(path));
    }
    let sibling = model.with_extension("ppm");
    sibling.exists().then_some(sibling)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let params = parse_params();
    log::info!(
        "Starting MeshView. viewport={}x{}, fov={}, near={}, far={}",
        params.resolution.0,
        params.resolution.1,
        params.camera.fov_deg,
        params.camera.near,
        params.camera.far
    );

    let mut viewer = Viewer::new(params)?;
    if let Some(preset) = parse_camera_arg() {
        viewer.apply_preset(preset);
    }
    // --pitch= / --yaw= / --roll= in degrees, applied after any preset.
    let angle_args = [
        ("--pitch=", Axis::Right),
        ("--yaw=", Axis::Up),
        ("--roll=", Axis::Forward),
    ];
    for (prefix, axis) in angle_args {
        if let Some(degrees) = parse_f32_arg(prefix) {
            viewer.camera_mut().set_angle_degrees(axis, degrees);
        }
    }

    if let Some(model) = arg_value("--model=") {
        let model = PathBuf::from(model);
        let texture = texture_path(&model);
        viewer.load_model_files(&model, texture.as_deref())?;
    }
    if !viewer.is_loaded() {
        log::warn!("No --model=PATH given; nothing to show.");
    }

    if let Some(mesh) = viewer.mesh() {
        log::info!(
            "Buffers: {} positions, {} normals, {} texcoords, {} indices ({} bytes total)",
            mesh.positions.len(),
            mesh.normals.len(),
            mesh.texcoords.len(),
            mesh.indices.len(),
            mesh.position_bytes().len()
                + mesh.normal_bytes().len()
                + mesh.texcoord_bytes().len()
                + mesh.index_bytes().len()
        );
    }

    let params = viewer.params();
    log::info!(
        "Camera: eye={}, rotation(deg)={}, fov={:.1}, aspect={:.3}",
        params.camera.position,
        params.camera.rotation_deg,
        params.camera.fov_deg,
        params.camera.aspect
    );
    log::debug!("View transform: {:?}", viewer.camera().view());

    if let Some(out) = arg_value("--dump-texture=") {
        viewer.texture().save_png(&out)?;
    }

    log::info!("Done. Vertex count: {}", viewer.vertex_count());
    Ok(())
}
