use winit::dpi::PhysicalSize;

use super::{SurfaceEncoding, SurfaceErrorAction};

/// First reported format matching `encoding`, else the first reported format.
pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    encoding: SurfaceEncoding,
) -> Option<wgpu::TextureFormat> {
    let fallback = caps.formats.first().copied()?;
    let wanted = encoding == SurfaceEncoding::Srgb;
    Some(
        caps.formats
            .iter()
            .copied()
            .find(|f| f.is_srgb() == wanted)
            .unwrap_or(fallback),
    )
}

/// `Fifo` is guaranteed by every backend, so it is the fallback.
pub(crate) fn choose_present_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: wgpu::PresentMode,
) -> wgpu::PresentMode {
    let auto = matches!(
        requested,
        wgpu::PresentMode::AutoVsync | wgpu::PresentMode::AutoNoVsync
    );
    if auto || caps.present_modes.contains(&requested) {
        requested
    } else {
        log::warn!("present mode {requested:?} unsupported; using Fifo");
        wgpu::PresentMode::Fifo
    }
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Records `new_size` and reconfigures the surface when it is drawable.
///
/// Returns `false` for a 0x0 (minimized) size; the surface keeps its previous
/// configuration until a drawable size arrives.
pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) -> bool {
    *size = new_size;
    if new_size.width == 0 || new_size.height == 0 {
        return false;
    }
    config.width = new_size.width;
    config.height = new_size.height;
    surface.configure(device, config);
    true
}

/// What a failed frame acquisition calls for.
///
/// `lost_streak` is true when the previous acquisition also failed with `Lost`
/// and the surface was already reconfigured for it. A second `Lost` in a row
/// means reconfiguring does not bring the surface back.
pub(crate) fn surface_error_action(
    err: &wgpu::SurfaceError,
    lost_streak: bool,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::Lost if !lost_streak => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

/// Maps a frame-acquisition failure to what the renderer should do, and
/// reconfigures the surface when that is the answer.
///
/// `Outdated` and a first `Lost` get one reconfigure with the current size and
/// the frame is dropped. `lost_streak` is updated so a repeated `Lost` turns
/// fatal instead of reconfiguring forever.
pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    lost_streak: &mut bool,
    err: &wgpu::SurfaceError,
) -> SurfaceErrorAction {
    let action = surface_error_action(err, *lost_streak);
    *lost_streak = matches!(err, wgpu::SurfaceError::Lost);
    if action == SurfaceErrorAction::Reconfigured && size.width > 0 && size.height > 0 {
        surface.configure(device, config);
    }
    action
}

#[cfg(test)]
mod tests {
    use wgpu::SurfaceError;

    use super::*;

    // ── surface errors ────────────────────────────────────────────────────

    #[test]
    fn first_lost_reconfigures() {
        assert_eq!(
            surface_error_action(&SurfaceError::Lost, false),
            SurfaceErrorAction::Reconfigured
        );
    }

    #[test]
    fn lost_again_after_reconfigure_is_fatal() {
        assert_eq!(surface_error_action(&SurfaceError::Lost, true), SurfaceErrorAction::Fatal);
    }

    #[test]
    fn out_of_memory_is_always_fatal() {
        for streak in [false, true] {
            assert_eq!(
                surface_error_action(&SurfaceError::OutOfMemory, streak),
                SurfaceErrorAction::Fatal
            );
        }
    }

    #[test]
    fn outdated_and_transient_errors_never_stop_rendering() {
        for streak in [false, true] {
            assert_eq!(
                surface_error_action(&SurfaceError::Outdated, streak),
                SurfaceErrorAction::Reconfigured
            );
            assert_eq!(
                surface_error_action(&SurfaceError::Timeout, streak),
                SurfaceErrorAction::SkipFrame
            );
            assert_eq!(
                surface_error_action(&SurfaceError::Other, streak),
                SurfaceErrorAction::SkipFrame
            );
        }
    }
}
