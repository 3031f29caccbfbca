//! Subcommand implementations.

use std::path::{Path, PathBuf};

use glow_common::{GlowError, PhysicalSize, Result};
use glow_config::{DataSet, LayerConfig, ReloadManager};
use glow_renderer::glow_camera::overlay_rect;
use glow_renderer::host::TargetDescriptor;
use glow_renderer::{BlurStage, Compositor, GaussianBlur, GlowMaterial, GpuContext, ShaderPass, WgpuCompositor};
use tracing::info;

use crate::planner::{FramePlan, LeakReport, Planner};

/// Written by `glow init`: one default layer.
pub fn starter_dataset() -> DataSet {
    DataSet {
        layers: vec![LayerConfig::default()],
        ..DataSet::default()
    }
}

pub fn check(path: &Path) -> Result<()> {
    let ds = glow_config::load(path)?;
    info!(
        layers = ds.layers.len(),
        enabled = ds.enabled_count(),
        "{} is valid",
        path.display()
    );
    println!("{}", glow_config::dataset_to_json(&ds));
    Ok(())
}

pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(GlowError::Other(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    glow_config::save_to_path(&starter_dataset(), path)?;
    info!("wrote starter config to {}", path.display());
    Ok(())
}

pub fn plan(path: &Path, screen: PhysicalSize, frames: usize) -> Result<()> {
    let ds = glow_config::load(path)?;
    let mut planner = Planner::new(screen, ds);
    print_plans(&planner.run(frames));
    report(planner.finish())
}

/// Plan once, then again after every valid edit of `path` until ctrl-c.
pub async fn plan_watch(path: PathBuf, screen: PhysicalSize, frames: usize) -> Result<()> {
    let (initial, mut config_rx) = ReloadManager::start(path).await;
    let mut planner = Planner::new(screen, initial);
    print_plans(&planner.run(frames));

    loop {
        tokio::select! {
            changed = config_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let ds = config_rx.borrow_and_update().clone();
                info!(layers = ds.layers.len(), "config reloaded; re-planning");
                planner.reload(ds);
                print_plans(&planner.run(frames));
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }
    report(planner.finish())
}

fn print_plans(plans: &[FramePlan]) {
    for plan in plans {
        print!("{plan}");
    }
}

fn report(leaks: LeakReport) -> Result<()> {
    if leaks.is_clean() {
        info!("pipeline released every resource");
        Ok(())
    } else {
        Err(GlowError::Other(format!("pipeline leaked resources: {leaks:?}")))
    }
}

/// Run one layer's passes on a headless GPU and wait for completion.
pub fn probe(size: PhysicalSize) -> Result<()> {
    let context = pollster::block_on(GpuContext::headless())?;
    println!(
        "adapter: {} ({:?}, {:?})",
        context.adapter_info.name, context.adapter_info.device_type, context.adapter_info.backend
    );

    let mut gpu = WgpuCompositor::new(context);
    let mut blur = GaussianBlur::new();
    let mut material = GlowMaterial::new();
    let layer = LayerConfig::default();

    let capture = gpu.create_target(&TargetDescriptor::color("Probe capture", size));
    let threshold = gpu.create_target(&TargetDescriptor::color("Probe threshold", size));
    let blurred = gpu.create_target(&TargetDescriptor::color("Probe blurred", size));
    let destination = gpu.create_target(&TargetDescriptor::color("Probe destination", size));

    gpu.clear(capture, glow_common::Color::from_rgba(255, 160, 32, 255));
    gpu.clear(destination, glow_common::Color::TRANSPARENT);
    material.apply_layer(&layer);
    gpu.blit_pass(capture, threshold, &material, ShaderPass::Threshold);
    blur.render(&mut gpu, threshold, blurred, &layer.blur);
    gpu.blit_pass(blurred, destination, &material, ShaderPass::Additive);
    gpu.draw_inset(
        capture,
        destination,
        overlay_rect(size, 0.4),
        &material,
        ShaderPass::Overlay,
    );
    gpu.submit();
    gpu.wait_idle();

    blur.dispose(&mut gpu);
    for id in [capture, threshold, blurred, destination] {
        gpu.destroy_target(id);
    }
    println!("rendered one {size} glow frame");
    Ok(())
}
