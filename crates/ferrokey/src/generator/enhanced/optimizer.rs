use core::{fmt, str::FromStr};

use crate::{
    error::{Error, Result},
    generator::{Mutex, helper},
    holder::IntegralDataTypeHolder,
    value::{IdentifierType, IdentifierValue},
};

/// Source of raw values for an [`Optimizer`], typically one table or
/// sequence round-trip per call.
pub type ValueSource<'a> = dyn FnMut() -> Result<IntegralDataTypeHolder> + 'a;

/// How an [`Optimizer`] turns source values into identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OptimizerKind {
    /// Every identifier is a source value.
    None,
    /// Each source value selects a bucket of `increment_size` identifiers.
    HiLo,
    /// Each source value is the upper bound of a pool.
    Pooled,
    /// Each source value is the lower bound of a pool.
    PooledLo,
}

impl OptimizerKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::HiLo => "hilo",
            Self::Pooled => "pooled",
            Self::PooledLo => "pooled-lo",
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OptimizerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "none" => Ok(Self::None),
            "hilo" => Ok(Self::HiLo),
            "pooled" => Ok(Self::Pooled),
            "pooled-lo" => Ok(Self::PooledLo),
            other => Err(Error::mapping(format!(
                "unknown optimizer strategy [{other}]"
            ))),
        }
    }
}

#[derive(Debug, Default)]
struct OptimizerState {
    last_source_value: Option<IntegralDataTypeHolder>,
    upper_limit: Option<IntegralDataTypeHolder>,
    value: Option<IntegralDataTypeHolder>,
}

/// Dispenses identifiers from a [`ValueSource`], calling it as rarely as
/// the strategy allows.
///
/// All state is behind one lock that is held across source calls, so at
/// most one refresh runs per optimizer at a time.
#[derive(Debug)]
pub struct Optimizer {
    kind: OptimizerKind,
    identifier_type: IdentifierType,
    increment_size: i64,
    initial_value: i64,
    state: Mutex<OptimizerState>,
}

impl Optimizer {
    /// Builds an optimizer; `initial_value` is `-1` when not configured.
    ///
    /// # Errors
    ///
    /// Fails for non-integral identifier types and for bucketing strategies
    /// with an increment size below 1.
    pub fn new(
        kind: OptimizerKind,
        identifier_type: IdentifierType,
        increment_size: i64,
        initial_value: i64,
    ) -> Result<Self> {
        helper::holder_for(identifier_type)?;
        if kind != OptimizerKind::None && increment_size < 1 {
            return Err(Error::mapping(format!(
                "increment size cannot be less than 1, was {increment_size}"
            )));
        }
        Ok(Self {
            kind,
            identifier_type,
            increment_size,
            initial_value,
            state: Mutex::new(OptimizerState::default()),
        })
    }

    pub fn kind(&self) -> OptimizerKind {
        self.kind
    }

    pub fn identifier_type(&self) -> IdentifierType {
        self.identifier_type
    }

    /// The number of values handed out per source read.
    pub fn increment_size(&self) -> i64 {
        self.increment_size
    }

    /// Whether the source must advance by `increment_size` per call rather
    /// than by one.
    pub fn applies_increment_size_to_source_values(&self) -> bool {
        matches!(self.kind, OptimizerKind::Pooled | OptimizerKind::PooledLo)
    }

    /// The most recent value read from the source.
    pub fn last_source_value(&self) -> Option<IntegralDataTypeHolder> {
        self.state.lock().last_source_value.clone()
    }

    /// Produces the next identifier.
    ///
    /// # Errors
    ///
    /// Propagates source errors and holder arithmetic failures.
    pub fn generate(&self, source: &mut ValueSource<'_>) -> Result<IdentifierValue> {
        let mut state = self.state.lock();
        match self.kind {
            OptimizerKind::None => Self::none(&mut state, source),
            OptimizerKind::HiLo => self.hilo(&mut state, source),
            OptimizerKind::Pooled => self.pooled(&mut state, source),
            OptimizerKind::PooledLo => self.pooled_lo(&mut state, source),
        }
    }

    fn none(state: &mut OptimizerState, source: &mut ValueSource<'_>) -> Result<IdentifierValue> {
        let mut value = source()?;
        while value.lt(1)? {
            value = source()?;
        }
        let id = value.make_value()?;
        state.last_source_value = Some(value);
        Ok(id)
    }

    fn hilo(
        &self,
        state: &mut OptimizerState,
        source: &mut ValueSource<'_>,
    ) -> Result<IdentifierValue> {
        if state.last_source_value.is_none() {
            let mut source_value = source()?;
            while source_value.lt(1)? {
                source_value = source()?;
            }
            let upper_limit = self.bucket_upper_limit(&source_value)?;
            let mut value = upper_limit.copy();
            value.subtract(self.increment_size)?;
            state.value = Some(value);
            state.upper_limit = Some(upper_limit);
            state.last_source_value = Some(source_value);
        } else if !held(&state.upper_limit)?.gt_holder(held(&state.value)?)? {
            let source_value = source()?;
            state.upper_limit = Some(self.bucket_upper_limit(&source_value)?);
            state.last_source_value = Some(source_value);
        }
        held_mut(&mut state.value)?.make_value_then_increment()
    }

    /// One past the bucket selected by `source_value`.
    fn bucket_upper_limit(
        &self,
        source_value: &IntegralDataTypeHolder,
    ) -> Result<IntegralDataTypeHolder> {
        let mut upper_limit = source_value.copy();
        upper_limit.multiply_by(self.increment_size)?.increment()?;
        Ok(upper_limit)
    }

    fn pooled(
        &self,
        state: &mut OptimizerState,
        source: &mut ValueSource<'_>,
    ) -> Result<IdentifierValue> {
        if state.upper_limit.is_none() {
            let mut value = source()?;
            #[cfg(feature = "tracing")]
            {
                if value.lt(1)? {
                    tracing::debug!(
                        "pooled optimizer source reported [{}] as the initial value; use of 1 or greater highly recommended",
                        value
                    );
                }
            }
            let hi = if (self.initial_value == -1 && value.lt(self.increment_size)?)
                || value.eq(self.initial_value)?
            {
                // the first read returned the initial value; the pool ends
                // at the next one
                source()?
            } else {
                let hi = value.copy();
                value = hi.copy();
                value.subtract(self.increment_size - 1)?;
                hi
            };
            state.value = Some(value);
            state.last_source_value = Some(hi.copy());
            state.upper_limit = Some(hi);
        } else if held(&state.value)?.gt_holder(held(&state.upper_limit)?)? {
            let hi = source()?;
            let mut value = hi.copy();
            value.subtract(self.increment_size - 1)?;
            state.value = Some(value);
            state.last_source_value = Some(hi.copy());
            state.upper_limit = Some(hi);
        }
        held_mut(&mut state.value)?.make_value_then_increment()
    }

    fn pooled_lo(
        &self,
        state: &mut OptimizerState,
        source: &mut ValueSource<'_>,
    ) -> Result<IdentifierValue> {
        let exhausted = match (&state.value, &state.upper_limit) {
            (Some(value), Some(upper_limit)) => !value.lt_holder(upper_limit)?,
            _ => true,
        };
        if state.last_source_value.is_none() || exhausted {
            let source_value = source()?;
            let mut upper_limit = source_value.copy();
            upper_limit.add(self.increment_size)?;
            let mut value = source_value.copy();
            while value.lt(1)? {
                value.increment()?;
            }
            state.value = Some(value);
            state.upper_limit = Some(upper_limit);
            state.last_source_value = Some(source_value);
        }
        held_mut(&mut state.value)?.make_value_then_increment()
    }
}

fn held(slot: &Option<IntegralDataTypeHolder>) -> Result<&IntegralDataTypeHolder> {
    slot.as_ref()
        .ok_or_else(|| Error::generation("optimizer state was not initialized"))
}

fn held_mut(slot: &mut Option<IntegralDataTypeHolder>) -> Result<&mut IntegralDataTypeHolder> {
    slot.as_mut()
        .ok_or_else(|| Error::generation("optimizer state was not initialized"))
}
