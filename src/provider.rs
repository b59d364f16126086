use log::debug;
use thiserror::Error;

use crate::{DisplayMode, ModeSummary, RefreshRate, Resolution};

/// Error type for display configuration providers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Unable to read current display settings: {0}")]
    Query(String),
    #[error("Display change failed with code {0}")]
    Apply(i32),
}

pub type ProviderResult<T = ()> = std::result::Result<T, ProviderError>;

/// Access to the display configuration of the primary display.
pub trait DisplayConfigProvider {
    /// Reads the mode the display is currently using.
    fn current_mode(&self) -> ProviderResult<DisplayMode>;

    /// Reads the supported mode at `index`, or `None` past the last one.
    fn mode_at(&self, index: u32) -> Option<DisplayMode>;

    /// Persistently switches the display to `mode`, honoring only its present fields.
    fn apply(&self, mode: &DisplayMode) -> ProviderResult;
}

/// Lazily walks the modes a provider supports, starting at index 0.
///
/// Every step queries the provider again; create a new iterator to start over.
pub struct ModeIter<'a, P: ?Sized> {
    provider: &'a P,
    index: u32,
    done: bool,
}

impl<'a, P: DisplayConfigProvider + ?Sized> Iterator for ModeIter<'a, P> {
    type Item = DisplayMode;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.provider.mode_at(self.index) {
            Some(mode) => {
                debug!("Mode {}: {}", self.index, mode.summary());
                self.index += 1;
                Some(mode)
            }
            None => {
                debug!("Enumerated {} modes", self.index);
                self.done = true;
                None
            }
        }
    }
}

/// Returns an iterator over every mode the provider reports.
pub fn enumerate_modes<P: DisplayConfigProvider + ?Sized>(provider: &P) -> ModeIter<'_, P> {
    ModeIter {
        provider,
        index: 0,
        done: false,
    }
}

/// Finds the highest nonzero refresh rate reported for exactly `resolution`.
pub fn find_max_refresh_rate<P: DisplayConfigProvider + ?Sized>(
    provider: &P,
    resolution: Resolution,
) -> Option<RefreshRate> {
    let max = enumerate_modes(provider)
        .filter(|mode| mode.resolution == resolution)
        .map(|mode| mode.refresh_rate)
        .filter(|rate| rate.is_set())
        .max();
    debug!("Maximum refresh rate for {}: {:?}", resolution, max);
    max
}

/// Lists the distinct supported modes in the order the provider reports them.
pub fn supported_modes<P: DisplayConfigProvider + ?Sized>(provider: &P) -> Vec<ModeSummary> {
    let mut modes: Vec<ModeSummary> = Vec::new();
    for summary in enumerate_modes(provider).map(|mode| mode.summary()) {
        if !modes.contains(&summary) {
            modes.push(summary);
        }
    }
    modes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mode, FakeProvider};

    fn sample_provider() -> FakeProvider {
        FakeProvider::new(
            mode(2560, 1440, 60),
            vec![
                mode(1920, 1080, 60),
                mode(1920, 1080, 75),
                mode(1920, 1080, 0),
                mode(1280, 720, 60),
            ],
        )
    }

    #[test]
    fn enumeration_stops_after_last_mode() {
        let provider = sample_provider();
        let mut modes = enumerate_modes(&provider);
        assert_eq!(modes.by_ref().count(), 4);
        assert_eq!(modes.next(), None);
        assert_eq!(provider.queried_indices(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn enumeration_is_restartable() {
        let provider = sample_provider();
        let first: Vec<_> = enumerate_modes(&provider).collect();
        let second: Vec<_> = enumerate_modes(&provider).collect();
        assert_eq!(first, second);
        assert_eq!(provider.queried_indices().len(), 10);
    }

    #[test]
    fn max_refresh_rate_for_matching_resolution() {
        let provider = sample_provider();
        assert_eq!(
            find_max_refresh_rate(&provider, Resolution::new(1920, 1080)),
            Some(RefreshRate(75))
        );
        assert_eq!(
            find_max_refresh_rate(&provider, Resolution::new(1280, 720)),
            Some(RefreshRate(60))
        );
    }

    #[test]
    fn max_refresh_rate_without_match() {
        let provider = sample_provider();
        assert_eq!(
            find_max_refresh_rate(&provider, Resolution::new(800, 600)),
            None
        );
    }

    #[test]
    fn zero_refresh_rates_are_ignored() {
        let provider = FakeProvider::new(mode(1024, 768, 60), vec![mode(1024, 768, 0)]);
        assert_eq!(
            find_max_refresh_rate(&provider, Resolution::new(1024, 768)),
            None
        );
    }

    #[test]
    fn supported_modes_are_deduplicated_in_order() {
        let provider = FakeProvider::new(
            mode(1920, 1080, 60),
            vec![
                mode(1920, 1080, 60),
                mode(1280, 720, 60),
                mode(1920, 1080, 60),
            ],
        );
        let modes = supported_modes(&provider);
        assert_eq!(
            modes,
            vec![mode(1920, 1080, 60).summary(), mode(1280, 720, 60).summary()]
        );
    }
}
