//! Conversions shared by the generator strategies.

use crate::{
    error::{Error, Result},
    holder::IntegralDataTypeHolder,
    jdbc::{Row, SqlValue},
    value::{IdentifierType, IdentifierValue},
};

/// Extracts `row[column]` as `ty`.
///
/// # Errors
///
/// Fails for types other than long, integer, short and string, for missing
/// or `NULL` columns, and for integral values outside the target range.
pub fn get(row: &Row, column: usize, ty: IdentifierType) -> Result<IdentifierValue> {
    let cell = row
        .get(column)
        .ok_or_else(|| Error::generation(format!("result set has no column at index {column}")))?;
    if cell.is_null() {
        return Err(Error::generation("the database returned a null identifier"));
    }
    match ty {
        IdentifierType::Long | IdentifierType::Integer | IdentifierType::Short => {
            match (cell.as_i128(), cell.as_big_int()) {
                (Some(raw), _) => narrow(raw, ty),
                (None, Some(_)) => Err(Error::generation(format!(
                    "identifier value {cell} is out of range for {ty}"
                ))),
                (None, None) => Err(Error::generation(format!(
                    "could not read an integral identifier from {cell}"
                ))),
            }
        }
        IdentifierType::String => Ok(IdentifierValue::String(match cell {
            SqlValue::Text(s) => s.clone(),
            other => other.to_string(),
        })),
        IdentifierType::BigInteger | IdentifierType::BigDecimal => Err(Error::generation(
            "this id generator generates long, integer, short or string",
        )),
    }
}

/// Boxes a raw counter value as `ty`.
///
/// # Errors
///
/// Fails for types other than long, integer and short, and for values
/// outside the target range.
pub fn create_number(value: i64, ty: IdentifierType) -> Result<IdentifierValue> {
    match ty {
        IdentifierType::Long | IdentifierType::Integer | IdentifierType::Short => {
            narrow(i128::from(value), ty)
        }
        _ => Err(Error::generation(
            "this id generator generates long, integer, short",
        )),
    }
}

/// Reads the natively generated identity from the first row of `rows`.
///
/// # Errors
///
/// Fails when `rows` is empty or the value cannot be converted.
pub fn get_generated_identity(rows: &[Row], ty: IdentifierType) -> Result<IdentifierValue> {
    let row = rows.first().ok_or_else(|| {
        Error::generation("the database returned no natively generated identity value")
    })?;
    let id = match ty {
        IdentifierType::BigInteger | IdentifierType::BigDecimal => {
            let mut holder = holder_for(ty)?;
            holder.initialize_from_row(row, 0, 0)?;
            holder.make_value()?
        }
        _ => get(row, 0, ty)?,
    };
    #[cfg(feature = "tracing")]
    tracing::debug!("natively generated identity: {}", id);
    Ok(id)
}

/// An uninitialized integral holder for `ty`.
///
/// # Errors
///
/// Fails when `ty` is not integral.
pub fn holder_for(ty: IdentifierType) -> Result<IntegralDataTypeHolder> {
    IntegralDataTypeHolder::new(ty)
}

/// Qualifies an unqualified object name with the optional catalog and
/// schema; names already containing a `.` are returned as given.
pub fn qualify(catalog: Option<&str>, schema: Option<&str>, name: &str) -> String {
    if name.contains('.') {
        return name.to_owned();
    }
    let mut qualified = String::new();
    for part in [catalog, schema].into_iter().flatten() {
        qualified.push_str(part);
        qualified.push('.');
    }
    qualified.push_str(name);
    qualified
}

fn narrow(raw: i128, ty: IdentifierType) -> Result<IdentifierValue> {
    let in_range = ty
        .bounds()
        .is_some_and(|(min, max)| (min..=max).contains(&raw));
    if !in_range {
        return Err(Error::generation(format!(
            "identifier value {raw} is out of range for {ty}"
        )));
    }
    // bounds checked above
    Ok(match ty {
        IdentifierType::Short => IdentifierValue::Short(raw as i16),
        IdentifierType::Integer => IdentifierValue::Integer(raw as i32),
        _ => IdentifierValue::Long(raw as i64),
    })
}
