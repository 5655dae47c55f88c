#![forbid(clippy::unwrap_used, unsafe_code)]
#![allow(clippy::needless_return)]

pub mod geo;
pub mod olc;

use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::{FromSqlError, Value, ValueRef};
use rusqlite::{Connection, Error};

use crate::geo::LatLng;
use crate::olc::OlcError;

#[inline]
fn err_mapper(err: OlcError) -> Error {
  return Error::UserFunctionError(err.into());
}

#[inline]
fn real_or_null(ctx: &Context, i: usize) -> Result<Option<f64>, FromSqlError> {
  return match ctx.get_raw(i) {
    ValueRef::Null => Ok(None),
    ValueRef::Real(f) => Ok(Some(f)),
    _ => Err(FromSqlError::InvalidType),
  };
}

fn olc_distance(ctx: &Context) -> Result<Value, Error> {
  let (Some(a), Some(b)) = (
    ctx.get_raw(0).as_str_or_null()?,
    ctx.get_raw(1).as_str_or_null()?,
  ) else {
    return Ok(Value::Null);
  };

  let l = olc::decode(a).map_err(err_mapper)?.center();
  let r = olc::decode(b).map_err(err_mapper)?.center();
  return Ok(Value::Integer(geo::distance_meters(&l, &r)));
}

fn geo_distance(ctx: &Context) -> Result<Value, Error> {
  let (Some(lat1), Some(lng1), Some(lat2), Some(lng2)) = (
    real_or_null(ctx, 0)?,
    real_or_null(ctx, 1)?,
    real_or_null(ctx, 2)?,
    real_or_null(ctx, 3)?,
  ) else {
    return Ok(Value::Null);
  };

  let l = LatLng { lat: lat1, lng: lng1 };
  let r = LatLng { lat: lat2, lng: lng2 };
  return Ok(Value::Integer(geo::distance_meters(&l, &r)));
}

fn olc_geo_distance(ctx: &Context) -> Result<Value, Error> {
  let (Some(code), Some(lat), Some(lng)) = (
    ctx.get_raw(0).as_str_or_null()?,
    real_or_null(ctx, 1)?,
    real_or_null(ctx, 2)?,
  ) else {
    return Ok(Value::Null);
  };

  let l = olc::decode(code).map_err(err_mapper)?.center();
  return Ok(Value::Integer(geo::distance_meters(&l, &LatLng { lat, lng })));
}

fn olc_is_valid(ctx: &Context) -> Result<bool, Error> {
  return match ctx.get_raw(0).as_str_or_null() {
    Ok(Some(text)) => Ok(olc::is_full(text)),
    // Consider NULL a valid code.
    Ok(None) => Ok(true),
    Err(_) => Ok(false),
  };
}

pub fn register(conn: &Connection) -> Result<(), Error> {
  let default_flags: FunctionFlags =
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC | FunctionFlags::SQLITE_INNOCUOUS;

  conn.create_scalar_function("olc_distance", 2, default_flags, olc_distance)?;
  conn.create_scalar_function("geo_distance", 4, default_flags, geo_distance)?;
  conn.create_scalar_function("olc_geo_distance", 3, default_flags, olc_geo_distance)?;

  conn.create_scalar_function("olc_is_valid", 1, default_flags, olc_is_valid)?;

  conn.create_scalar_function("LiteOLC_Version", 0, default_flags, |_ctx| {
    let version_info = rustc_tools_util::get_version_info!();
    return Ok(version_info.to_string());
  })?;

  return Ok(());
}
