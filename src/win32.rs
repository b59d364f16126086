//! Binds [`DisplayConfigProvider`] to `EnumDisplaySettingsW` and `ChangeDisplaySettingsExW`.

use log::{debug, warn};
use winsafe::{co, GmidxEnum, DEVMODE, POINT};

use crate::{
    BitDepth, DisplayConfigProvider, DisplayMode, FixedOutput, ModeFields, Orientation, Position,
    ProviderError, ProviderResult, RefreshRate, Resolution,
};

/// Provider for a display attached to the Windows desktop
#[derive(Debug, Default, Clone)]
pub struct Win32Provider {
    /// `None` addresses the primary display.
    device_name: Option<String>,
}

impl Win32Provider {
    /// Provider for the primary display
    pub fn primary() -> Self {
        Self::default()
    }

    fn enum_settings(&self, mode: GmidxEnum) -> winsafe::SysResult<DEVMODE> {
        let mut devmode = DEVMODE::default();
        winsafe::EnumDisplaySettings(self.device_name.as_deref(), mode, &mut devmode)?;
        Ok(devmode)
    }
}

impl DisplayConfigProvider for Win32Provider {
    fn current_mode(&self) -> ProviderResult<DisplayMode> {
        let devmode = self
            .enum_settings(GmidxEnum::Enum(co::ENUM_SETTINGS::CURRENT))
            .map_err(|err| ProviderError::Query(err.to_string()))?;
        Ok(devmode.to_display_mode())
    }

    fn mode_at(&self, index: u32) -> Option<DisplayMode> {
        match self.enum_settings(GmidxEnum::Gmidx(index)) {
            Ok(devmode) => Some(devmode.to_display_mode()),
            Err(err) => {
                debug!("No display mode at index {}: {}", index, err);
                None
            }
        }
    }

    fn apply(&self, mode: &DisplayMode) -> ProviderResult {
        let mut devmode = DEVMODE::default();
        devmode.write_display_mode(mode);

        let flags = co::CDS::UPDATEREGISTRY | co::CDS::FULLSCREEN;
        let result =
            winsafe::ChangeDisplaySettingsEx(self.device_name.as_deref(), Some(&mut devmode), flags);
        // winsafe reports RESTART as Ok too, only SUCCESSFUL counts here
        match result {
            Ok(co::DISP_CHANGE::SUCCESSFUL) => Ok(()),
            Ok(code) | Err(code) => Err(ProviderError::Apply(i32::from(code))),
        }
    }
}

/// Conversions between [`DisplayMode`] and `winsafe::DEVMODE`
trait DevModeExt {
    fn to_display_mode(&self) -> DisplayMode;
    fn write_display_mode(&mut self, mode: &DisplayMode);
}

impl DevModeExt for DEVMODE {
    fn to_display_mode(&self) -> DisplayMode {
        let orientation = Orientation::from_winsafe(self.dmDisplayOrientation()).unwrap_or_else(|| {
            warn!("Unknown orientation {}, assuming default", self.dmDisplayOrientation());
            Orientation::default()
        });
        let fixed_output =
            FixedOutput::from_winsafe(self.dmDisplayFixedOutput()).unwrap_or_else(|| {
                warn!("Unknown fixed output {}, assuming default", self.dmDisplayFixedOutput());
                FixedOutput::default()
            });
        let position = self.dmPosition();

        DisplayMode {
            device_name: self.dmDeviceName(),
            position: Position::new(position.x, position.y),
            orientation,
            fixed_output,
            resolution: Resolution::new(self.dmPelsWidth, self.dmPelsHeight),
            bit_depth: BitDepth(self.dmBitsPerPel),
            refresh_rate: RefreshRate(self.dmDisplayFrequency),
            fields: ModeFields::empty(),
        }
    }

    fn write_display_mode(&mut self, mode: &DisplayMode) {
        // Carried over unmarked, the OS ignores these
        self.set_dmPosition(POINT {
            x: mode.position.x,
            y: mode.position.y,
        });
        self.set_dmDisplayOrientation(mode.orientation.to_winsafe());
        self.set_dmDisplayFixedOutput(mode.fixed_output.to_winsafe());

        self.dmPelsWidth = mode.resolution.width;
        self.dmPelsHeight = mode.resolution.height;
        self.dmBitsPerPel = mode.bit_depth.0;
        self.dmDisplayFrequency = mode.refresh_rate.0;

        if mode.fields.contains(ModeFields::BITS_PER_PEL) {
            self.dmFields |= co::DM::BITSPERPEL;
        }
        if mode.fields.contains(ModeFields::PELS_WIDTH) {
            self.dmFields |= co::DM::PELSWIDTH;
        }
        if mode.fields.contains(ModeFields::PELS_HEIGHT) {
            self.dmFields |= co::DM::PELSHEIGHT;
        }
        if mode.fields.contains(ModeFields::DISPLAY_FREQUENCY) {
            self.dmFields |= co::DM::DISPLAYFREQUENCY;
        }
    }
}
