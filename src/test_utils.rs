use std::cell::RefCell;

use crate::{
    BitDepth, DisplayConfigProvider, DisplayMode, ProviderError, ProviderResult, RefreshRate,
    Resolution,
};

pub(crate) fn mode(width: u32, height: u32, refresh_rate: u32) -> DisplayMode {
    DisplayMode::new(
        Resolution::new(width, height),
        BitDepth(32),
        RefreshRate(refresh_rate),
    )
}

/// In-memory provider that records what it was asked to do.
pub(crate) struct FakeProvider {
    current: RefCell<Option<DisplayMode>>,
    modes: Vec<DisplayMode>,
    apply_code: i32,
    queried: RefCell<Vec<u32>>,
    applied: RefCell<Vec<DisplayMode>>,
}

impl FakeProvider {
    pub(crate) fn new(current: DisplayMode, modes: Vec<DisplayMode>) -> Self {
        Self {
            current: RefCell::new(Some(current)),
            modes,
            apply_code: 0,
            queried: RefCell::new(Vec::new()),
            applied: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn unreadable(modes: Vec<DisplayMode>) -> Self {
        let provider = Self::new(mode(0, 0, 0), modes);
        *provider.current.borrow_mut() = None;
        provider
    }

    pub(crate) fn rejecting(mut self, code: i32) -> Self {
        self.apply_code = code;
        self
    }

    pub(crate) fn queried_indices(&self) -> Vec<u32> {
        self.queried.borrow().clone()
    }

    pub(crate) fn applied(&self) -> Vec<DisplayMode> {
        self.applied.borrow().clone()
    }
}

impl DisplayConfigProvider for FakeProvider {
    fn current_mode(&self) -> ProviderResult<DisplayMode> {
        self.current
            .borrow()
            .clone()
            .ok_or_else(|| ProviderError::Query("no display".to_string()))
    }

    fn mode_at(&self, index: u32) -> Option<DisplayMode> {
        self.queried.borrow_mut().push(index);
        self.modes.get(index as usize).cloned()
    }

    fn apply(&self, mode: &DisplayMode) -> ProviderResult {
        if self.apply_code != 0 {
            return Err(ProviderError::Apply(self.apply_code));
        }
        self.applied.borrow_mut().push(mode.clone());
        if let Some(current) = self.current.borrow_mut().as_mut() {
            current.resolution = mode.resolution;
            if let Some(rate) = mode.applied_refresh_rate() {
                current.refresh_rate = rate;
            }
        }
        Ok(())
    }
}
