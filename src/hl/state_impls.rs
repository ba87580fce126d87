/// Indicates that the `Si4703` instance is not powered up yet
///
/// After creating the `Si4703` instance with [`Si4703::new`], it will be in
/// this state. Only the identification registers are meaningful until
/// [`Si4703::power_on`] has run.
///
/// [`Si4703::new`]: super::Si4703::new
/// [`Si4703::power_on`]: super::Si4703::power_on
#[derive(Debug, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Uninitialized;

/// Indicates that the `Si4703` instance is powered up and can tune
#[derive(Debug, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ready;

/// Indicates that the `Si4703` instance is powered down
///
/// The register contents survive, call [`Si4703::wake_up`] to get back to
/// [`Ready`].
///
/// [`Si4703::wake_up`]: super::Si4703::wake_up
#[derive(Debug, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sleeping;
