//! Display sizing for video inside a container.

use serde::{Deserialize, Serialize};

/// Pixel size the render target should take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

/// Fit content of `content_width x content_height` into the container while
/// keeping its aspect ratio.
///
/// Returns `None` if any dimension is zero. The result fills the container
/// exactly on at least one axis; the other axis is truncated.
///
/// ```
/// use core_playback::layout::{calc_display_size, DisplaySize};
///
/// assert_eq!(
///     calc_display_size(1920, 1080, 640, 480),
///     Some(DisplaySize { width: 1440, height: 1080 })
/// );
/// ```
pub fn calc_display_size(
    container_width: u32,
    container_height: u32,
    content_width: u32,
    content_height: u32,
) -> Option<DisplaySize> {
    if container_width == 0 || container_height == 0 || content_width == 0 || content_height == 0
    {
        return None;
    }

    // Single precision on purpose: results must match hosts that lay out in f32.
    let container_ratio = container_width as f32 / container_height as f32;
    let ratio = content_width as f32 / content_height as f32;

    let size = if ratio == container_ratio {
        DisplaySize {
            width: container_width,
            height: container_height,
        }
    } else if container_ratio > ratio {
        DisplaySize {
            width: (container_height as f32 * ratio) as u32,
            height: container_height,
        }
    } else {
        DisplaySize {
            width: container_width,
            height: (container_width as f32 / ratio) as u32,
        }
    };

    Some(size)
}
