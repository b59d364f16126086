//! Toggle or set the resolution and refresh rate of the primary display.
//!
//! The OS side sits behind [`DisplayConfigProvider`]; on Windows it is backed by the `winuser.h`
//! display settings calls, elsewhere [`platform_provider`] refuses to run.

mod provider;
mod switch;
mod types;
#[cfg(windows)]
mod win32;

#[cfg(test)]
pub(crate) mod test_utils;

pub use provider::*;
pub use switch::*;
pub use types::*;
#[cfg(windows)]
pub use win32::*;
