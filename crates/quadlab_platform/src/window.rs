use std::sync::Arc;

use thiserror::Error;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

#[derive(Debug, Error)]
#[error("could not create a window: {0}")]
pub struct WindowError(#[from] winit::error::OsError);

pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "quadlab".to_string(),
            width: 1600,
            height: 900,
        }
    }
}

pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Arc<Window>, WindowError> {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

    let window = event_loop.create_window(attrs)?;
    log::info!(
        "Window created: {}x{} ({})",
        config.width,
        config.height,
        config.title
    );
    Ok(Arc::new(window))
}
