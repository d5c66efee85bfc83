use crate::{
    config::{Properties, params},
    error::{Error, Result},
    generator::Mutex,
    holder::IntegralDataTypeHolder,
    value::IdentifierValue,
};

/// Block-dispensing state of the legacy hi/lo algorithm.
///
/// `lo` starts at `max_lo + 1` so the first call fetches a hi value. A
/// fetched hi of exactly 0 starts the block at `lo = 1`, so 0 is never
/// dispensed; every other block spans `[hi * (max_lo + 1), hi * (max_lo + 1)
/// + max_lo]`.
#[derive(Debug)]
pub(crate) struct HiLoState {
    max_lo: i64,
    lo: i64,
    hi: Option<IntegralDataTypeHolder>,
}

impl HiLoState {
    pub(crate) fn new(max_lo: i64) -> Self {
        Self {
            max_lo,
            lo: max_lo + 1,
            hi: None,
        }
    }

    pub(crate) fn next(
        &mut self,
        fetch_hi: impl FnOnce() -> Result<IntegralDataTypeHolder>,
    ) -> Result<IdentifierValue> {
        if self.lo > self.max_lo {
            let hi_value = fetch_hi()?;
            self.lo = if hi_value.eq(0)? { 1 } else { 0 };
            let mut hi = hi_value.copy();
            hi.multiply_by(self.max_lo + 1)?;
            #[cfg(feature = "tracing")]
            tracing::debug!("new hi value: {}", hi_value);
            self.hi = Some(hi);
        }
        let mut value = self
            .hi
            .as_ref()
            .ok_or_else(|| Error::generation("hi/lo block was not initialized"))?
            .copy();
        value.add(self.lo)?;
        self.lo += 1;
        value.make_value()
    }
}

/// A [`HiLoState`] behind the generator's lock.
///
/// Dispensing and refresh both happen under the lock, so a hi value is
/// fetched by at most one thread at a time per generator instance.
pub(crate) struct LockedHiLo {
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<HiLoState>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<HiLoState>,
}

impl LockedHiLo {
    pub(crate) fn new(max_lo: i64) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(HiLoState::new(max_lo))),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(HiLoState::new(max_lo)),
        }
    }

    pub(crate) fn next(
        &self,
        fetch_hi: impl FnOnce() -> Result<IntegralDataTypeHolder>,
    ) -> Result<IdentifierValue> {
        self.state.lock().next(fetch_hi)
    }
}

/// Reads `max_lo`, which must leave room for a block of `max_lo + 1`.
///
/// # Errors
///
/// Fails for a non-integer value or for `i64::MAX`.
pub(crate) fn max_lo(params: &Properties, default: i64) -> Result<i64> {
    let max_lo = params.get_int(params::MAX_LO, default)?;
    if max_lo.checked_add(1).is_none() {
        return Err(Error::mapping(format!(
            "[{}] must be less than {}, was {max_lo}",
            params::MAX_LO,
            i64::MAX
        )));
    }
    Ok(max_lo)
}

/// Fetches until the source yields a value of at least 1.
///
/// Used when `max_lo < 1` disables local dispensing.
pub(crate) fn fetch_positive(
    mut fetch: impl FnMut() -> Result<IntegralDataTypeHolder>,
) -> Result<IdentifierValue> {
    loop {
        let value = fetch()?;
        if !value.lt(1)? {
            return value.make_value();
        }
    }
}
