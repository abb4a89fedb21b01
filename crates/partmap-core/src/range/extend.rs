//! Fixed-step extension planning for range directories.
//!
//! When a value falls outside the directory span, new ranges are appended
//! after the last `max` (or prepended before the first `min`) in `step`
//! sized increments until one of them covers the value. The planner only
//! computes bounds; creating the partitions is up to the materializer.

use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError, PartitionError},
    range::RangeSnapshot,
    value::{OrderFamily, Timestamp, Value, ValueType},
};
use time::Date;

///
/// CONSTANTS
///

const MICROS_PER_DAY: i64 = 86_400_000_000;
const UNIX_EPOCH_JULIAN_DAY: i64 = 2_440_588;

/// Plan the `(min, max)` bounds needed to cover `value`, ordered outward
/// from the directory edge.
///
/// Returns an empty plan when `value` already lies inside the directory
/// span. `step` is a positive amount in the key's own unit: the key type
/// for integers and floats, days for dates, microseconds for timestamps.
pub fn plan_step_ranges(
    snapshot: &RangeSnapshot,
    value: &Value,
    step: &Value,
    limit: usize,
) -> Result<Vec<(Value, Value)>, InternalError> {
    let key = snapshot.value_type();
    if value.value_type().order_family() != key.order_family() {
        return Err(InternalError::partition(
            ErrorOrigin::Creator,
            PartitionError::TypeMismatch {
                left: value.value_type(),
                right: key,
            },
        ));
    }

    let lo = snapshot.min_bound().map_err(|_| {
        InternalError::creator_invalid(format!(
            "{}: cannot extend an empty directory",
            snapshot.relation()
        ))
    })?;
    let hi = snapshot.max_bound()?;

    match key.order_family() {
        OrderFamily::Integer => {
            let ordinal = |v: &Value| v.as_i64().ok_or_else(|| bound_type_error(key, v));
            let step = integer_step(key, step)?;
            let plan = plan_ordinal(ordinal(lo)?, ordinal(hi)?, ordinal(value)?, step, limit)?;
            plan.into_iter()
                .map(|(min, max)| Ok((integer_value(key, min)?, integer_value(key, max)?)))
                .collect()
        }
        OrderFamily::DateTime if key == ValueType::Date => {
            let day = |v: &Value| {
                v.datetime_micros()
                    .map(|micros| micros.div_euclid(MICROS_PER_DAY) + UNIX_EPOCH_JULIAN_DAY)
                    .ok_or_else(|| bound_type_error(key, v))
            };
            let step = integer_step(key, step)?;
            let plan = plan_ordinal(day(lo)?, day(hi)?, day(value)?, step, limit)?;
            plan.into_iter()
                .map(|(min, max)| Ok((date_value(min)?, date_value(max)?)))
                .collect()
        }
        OrderFamily::DateTime => {
            let micros = |v: &Value| v.datetime_micros().ok_or_else(|| bound_type_error(key, v));
            let step = integer_step(key, step)?;
            let plan = plan_ordinal(micros(lo)?, micros(hi)?, micros(value)?, step, limit)?;
            Ok(plan
                .into_iter()
                .map(|(min, max)| {
                    (
                        Value::Timestamp(Timestamp::from_micros(min)),
                        Value::Timestamp(Timestamp::from_micros(max)),
                    )
                })
                .collect())
        }
        OrderFamily::Float => {
            let float = |v: &Value| v.as_f64().ok_or_else(|| bound_type_error(key, v));
            let step = step
                .as_f64()
                .ok_or_else(|| step_type_error(key, step))?;
            let bounds = (float(lo)?, float(hi)?);
            let plan = plan_float(bounds, float(value)?, step, key_precision(key), limit)?;
            Ok(plan
                .into_iter()
                .map(|(min, max)| (float_value(key, min), float_value(key, max)))
                .collect())
        }
        OrderFamily::Text | OrderFamily::Bool => Err(InternalError::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Creator,
            format!("step extension is not defined for {key} keys"),
        )),
    }
}

fn plan_ordinal(
    lo: i64,
    hi: i64,
    value: i64,
    step: i64,
    limit: usize,
) -> Result<Vec<(i64, i64)>, InternalError> {
    if step <= 0 {
        return Err(non_positive_step());
    }

    let (distance, append) = if value >= hi {
        (i128::from(value) - i128::from(hi), true)
    } else if value < lo {
        (i128::from(lo) - i128::from(value) - 1, false)
    } else {
        return Ok(Vec::new());
    };
    let needed = distance / i128::from(step) + 1;
    check_limit(needed, limit)?;

    let mut plan = Vec::new();
    let mut edge = if append { hi } else { lo };
    loop {
        let next = if append {
            edge.checked_add(step)
        } else {
            edge.checked_sub(step)
        }
        .ok_or_else(|| InternalError::creator_invalid("step extension overflows the key domain"))?;

        if append {
            plan.push((edge, next));
            if value < next {
                return Ok(plan);
            }
        } else {
            plan.push((next, edge));
            if value >= next {
                return Ok(plan);
            }
        }
        edge = next;
    }
}

// Bounds are rounded to the key's precision before the coverage check, so
// the planned ranges cover `value` once stored.
#[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn plan_float(
    (lo, hi): (f64, f64),
    value: f64,
    step: f64,
    round: fn(f64) -> f64,
    limit: usize,
) -> Result<Vec<(f64, f64)>, InternalError> {
    if step.is_nan() || step <= 0.0 {
        return Err(non_positive_step());
    }
    if !value.is_finite() || !step.is_finite() {
        return Err(InternalError::creator_invalid(
            "step extension needs a finite value and step",
        ));
    }

    let (distance, append) = if value >= hi {
        (value - hi, true)
    } else if value < lo {
        (lo - value, false)
    } else {
        return Ok(Vec::new());
    };
    let needed = (distance / step).floor() + 1.0;
    if needed > limit as f64 {
        return Err(limit_exceeded(needed as i128, limit));
    }

    let mut plan = Vec::new();
    let mut edge = if append { hi } else { lo };
    while plan.len() < limit {
        let next = round(if append { edge + step } else { edge - step });
        let moved = if append { next > edge } else { next < edge };
        if !next.is_finite() || !moved {
            return Err(InternalError::creator_invalid(format!(
                "step {step} cannot move the bound {edge} at the key's precision"
            )));
        }

        if append {
            plan.push((edge, next));
            if value < next {
                return Ok(plan);
            }
        } else {
            plan.push((next, edge));
            if value >= next {
                return Ok(plan);
            }
        }
        edge = next;
    }

    let past_limit = i128::try_from(limit).map_or(i128::MAX, |limit| limit + 1);
    Err(limit_exceeded((needed as i128).max(past_limit), limit))
}

#[expect(clippy::cast_possible_truncation)]
fn key_precision(key: ValueType) -> fn(f64) -> f64 {
    match key {
        ValueType::Float32 => |raw| f64::from(raw as f32),
        _ => |raw| raw,
    }
}

fn check_limit(needed: i128, limit: usize) -> Result<(), InternalError> {
    match usize::try_from(needed) {
        Ok(needed) if needed <= limit => Ok(()),
        _ => Err(limit_exceeded(needed, limit)),
    }
}

fn integer_step(key: ValueType, step: &Value) -> Result<i64, InternalError> {
    step.as_i64().ok_or_else(|| step_type_error(key, step))
}

fn integer_value(key: ValueType, raw: i64) -> Result<Value, InternalError> {
    let out_of_range = || InternalError::creator_invalid(format!("bound {raw} does not fit {key}"));

    Ok(match key {
        ValueType::Int16 => Value::Int16(i16::try_from(raw).map_err(|_| out_of_range())?),
        ValueType::Int32 => Value::Int32(i32::try_from(raw).map_err(|_| out_of_range())?),
        _ => Value::Int64(raw),
    })
}

fn date_value(julian_day: i64) -> Result<Value, InternalError> {
    i32::try_from(julian_day)
        .ok()
        .and_then(|day| Date::from_julian_day(day).ok())
        .map(Value::Date)
        .ok_or_else(|| InternalError::creator_invalid(format!("julian day {julian_day} is not a valid date")))
}

#[expect(clippy::cast_possible_truncation)]
fn float_value(key: ValueType, raw: f64) -> Value {
    match key {
        ValueType::Float32 => Value::Float32(raw as f32),
        _ => Value::Float64(raw),
    }
}

fn bound_type_error(key: ValueType, value: &Value) -> InternalError {
    InternalError::partition(
        ErrorOrigin::Creator,
        PartitionError::TypeMismatch {
            left: value.value_type(),
            right: key,
        },
    )
}

fn step_type_error(key: ValueType, step: &Value) -> InternalError {
    InternalError::creator_invalid(format!(
        "step of type {} cannot extend {key} keys",
        step.value_type()
    ))
}

fn non_positive_step() -> InternalError {
    InternalError::creator_invalid("step must be positive")
}

fn limit_exceeded(needed: i128, limit: usize) -> InternalError {
    InternalError::creator_invalid(format!(
        "covering the value needs {needed} new partitions, limit is {limit}"
    ))
}
