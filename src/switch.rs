use core::fmt;

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    find_max_refresh_rate, DisplayConfigProvider, DisplayMode, ModeFields, ProviderError,
    RefreshRate, Resolution,
};

/// The two resolutions toggled between when no explicit target is requested.
pub const PRESETS: [Resolution; 2] = [Resolution::new(2560, 1440), Resolution::new(1680, 1050)];

/// Error type for switching display modes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwitchError {
    #[error("This tool can only run on Windows")]
    UnsupportedPlatform,
    #[error("Unable to read current display settings: {0}")]
    Query(String),
    #[error("Display change failed with code {0}")]
    Apply(i32),
}

impl From<ProviderError> for SwitchError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Query(reason) => SwitchError::Query(reason),
            ProviderError::Apply(code) => SwitchError::Apply(code),
        }
    }
}

pub type SwitchResult<T = ()> = std::result::Result<T, SwitchError>;

/// What the user asked for on the command line
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct TargetRequest {
    pub resolution: Option<Resolution>,
    pub refresh_rate: Option<RefreshRate>,
}

/// Picks the resolution to switch to.
///
/// An explicit request is returned as is; otherwise the current resolution toggles between the
/// presets, falling back to the first one.
pub fn determine_target(current: &DisplayMode, requested: Option<Resolution>) -> Resolution {
    if let Some(resolution) = requested {
        return resolution;
    }

    // From the second preset, or from anything else, go to the first one.
    if current.resolution == PRESETS[0] {
        PRESETS[1]
    } else {
        PRESETS[0]
    }
}

/// Builds the descriptor to apply, starting from a copy of the current mode.
///
/// Without an explicit refresh rate the highest one supported for `resolution` is used. If no
/// nonzero rate can be determined the refresh field stays unmarked and the OS picks its default.
pub fn build_target_mode<P: DisplayConfigProvider + ?Sized>(
    provider: &P,
    resolution: Resolution,
    refresh_rate: Option<RefreshRate>,
) -> SwitchResult<DisplayMode> {
    let base = provider.current_mode()?;
    debug!("Building {} from {}", resolution, base);

    let mut target = base;
    target.resolution = resolution;
    target.fields = ModeFields::BITS_PER_PEL | ModeFields::PELS_WIDTH | ModeFields::PELS_HEIGHT;

    let refresh_rate = match refresh_rate {
        Some(rate) => Some(rate),
        None => find_max_refresh_rate(provider, resolution),
    };
    if let Some(rate) = refresh_rate.filter(|rate| rate.is_set()) {
        target.fields |= ModeFields::DISPLAY_FREQUENCY;
        target.refresh_rate = rate;
    }

    Ok(target)
}

/// Hands `mode` to the OS. There is no retry; the first rejection is final.
pub fn apply_mode<P: DisplayConfigProvider + ?Sized>(provider: &P, mode: &DisplayMode) -> SwitchResult {
    match provider.apply(mode) {
        Ok(()) => {
            info!("Applied {}", mode);
            Ok(())
        }
        Err(err) => {
            warn!("Display change to {} rejected: {}", mode.resolution, err);
            Err(err.into())
        }
    }
}

/// The mode a switch resolved to, and whether it was actually applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    pub mode: DisplayMode,
    pub applied: bool,
}

impl fmt::Display for SwitchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.applied {
            "Switched to"
        } else {
            "Would switch to"
        };
        match self.mode.applied_refresh_rate() {
            Some(rate) => write!(f, "{} {} at {} Hz", verb, self.mode.resolution, rate),
            None => write!(f, "{} {} at default Hz", verb, self.mode.resolution),
        }
    }
}

/// Reads the current mode, picks a target, builds it and applies it unless `dry_run` is set.
pub fn switch_mode<P: DisplayConfigProvider + ?Sized>(
    provider: &P,
    request: TargetRequest,
    dry_run: bool,
) -> SwitchResult<SwitchOutcome> {
    let current = provider.current_mode()?;
    info!("Current mode: {}", current);

    let resolution = determine_target(&current, request.resolution);
    info!("Target resolution: {}", resolution);

    let mode = build_target_mode(provider, resolution, request.refresh_rate)?;
    if dry_run {
        info!("Dry run, not applying {}", mode);
        return Ok(SwitchOutcome {
            mode,
            applied: false,
        });
    }

    apply_mode(provider, &mode)?;
    Ok(SwitchOutcome {
        mode,
        applied: true,
    })
}

/// Returns the provider for the primary display of the running OS.
#[cfg(windows)]
pub fn platform_provider() -> SwitchResult<Box<dyn DisplayConfigProvider>> {
    Ok(Box::new(crate::Win32Provider::primary()))
}

/// Returns the provider for the primary display of the running OS.
#[cfg(not(windows))]
pub fn platform_provider() -> SwitchResult<Box<dyn DisplayConfigProvider>> {
    Err(SwitchError::UnsupportedPlatform)
}
