//! Per-binding driver state

/// State kept for one bound amplifier.
///
/// Holds at most one enable line. The line handle is released when the
/// binding is torn down; its level is left as the driver last set it.
pub struct PowerEnableState<L> {
    enable_gpio: Option<L>,
}

impl<L> PowerEnableState<L> {
    /// State with no line acquired yet.
    pub const fn new() -> Self {
        Self { enable_gpio: None }
    }

    /// The acquired enable line, if any.
    pub fn enable_gpio(&self) -> Option<&L> {
        self.enable_gpio.as_ref()
    }

    /// Store the acquired enable line.
    pub(crate) fn set_enable_gpio(&mut self, line: L) -> &mut L {
        self.enable_gpio.insert(line)
    }
}

impl<L> Default for PowerEnableState<L> {
    fn default() -> Self {
        Self::new()
    }
}
