//! Smoke harness around the LiteOLC distance functions.
//!
//! The extension is modelled as a trait so the harness runs against the
//! built-in registration, a compiled module loaded from disk, or a stub in
//! tests. Native module loading is the only unsafe surface and is isolated
//! here, gated behind an explicit connection-construction opt-in.

use std::path::PathBuf;

use rusqlite::{Connection, LoadExtensionGuard};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum HarnessError {
  #[error("failed to open database: {0}")]
  Open(#[source] rusqlite::Error),
  #[error("failed to register built-in functions: {0}")]
  Register(#[source] rusqlite::Error),
  #[error("extension loading is not enabled on this connection")]
  LoadingDisabled,
  #[error("failed to load extension from {}: {source}", .path.display())]
  ExtensionLoad {
    path: PathBuf,
    #[source]
    source: rusqlite::Error,
  },
  #[error("query {sql:?} failed: {source}")]
  Query {
    sql: String,
    #[source]
    source: rusqlite::Error,
  },
  #[error("failed to close database: {0}")]
  Close(#[source] rusqlite::Error),
}

/// Connection construction options. Loading native modules is a
/// security-sensitive capability and stays off unless asked for here.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptions {
  pub allow_extension_loading: bool,
}

/// A transient in-memory database plus the options it was opened with.
pub struct Session {
  conn: Connection,
  options: ConnectionOptions,
}

impl Session {
  pub fn open_in_memory(options: ConnectionOptions) -> Result<Self, HarnessError> {
    debug!("opening in-memory database");
    let conn = Connection::open_in_memory().map_err(HarnessError::Open)?;
    return Ok(Self { conn, options });
  }

  pub fn install(&self, extension: &dyn DistanceExtension) -> Result<(), HarnessError> {
    return extension.install(self);
  }

  pub fn connection(&self) -> &Connection {
    return &self.conn;
  }

  pub fn allows_extension_loading(&self) -> bool {
    return self.options.allow_extension_loading;
  }

  fn query_meters(&self, sql: &str) -> Result<i64, HarnessError> {
    debug!(sql, "executing");
    return self
      .conn
      .query_one(sql, (), |row| row.get(0))
      .map_err(|source| HarnessError::Query {
        sql: sql.to_owned(),
        source,
      });
  }

  pub fn close(self) -> Result<(), HarnessError> {
    return self.conn.close().map_err(|(_, err)| HarnessError::Close(err));
  }
}

/// The three distance functions, seen as an installable unit.
pub trait DistanceExtension {
  fn install(&self, session: &Session) -> Result<(), HarnessError>;
}

/// The functions compiled into this binary.
pub struct BuiltinExtension;

impl DistanceExtension for BuiltinExtension {
  fn install(&self, session: &Session) -> Result<(), HarnessError> {
    debug!("registering built-in distance functions");
    return liteolc::register(session.connection()).map_err(HarnessError::Register);
  }
}

/// A compiled extension module loaded from disk.
pub struct DynamicExtension {
  path: PathBuf,
}

impl DynamicExtension {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    return Self { path: path.into() };
  }
}

impl DistanceExtension for DynamicExtension {
  fn install(&self, session: &Session) -> Result<(), HarnessError> {
    if !session.allows_extension_loading() {
      return Err(HarnessError::LoadingDisabled);
    }
    debug!(path = %self.path.display(), "loading extension");

    let conn = session.connection();
    let map = |source: rusqlite::Error| HarnessError::ExtensionLoad {
      path: self.path.clone(),
      source,
    };
    // SAFETY: loading native code is gated behind the explicit
    // `allow_extension_loading` opt-in, and the guard re-disables loading
    // before any further SQL runs on this connection.
    #[allow(unsafe_code)]
    unsafe {
      let _guard = LoadExtensionGuard::new(conn).map_err(map)?;
      conn.load_extension(&self.path, None::<&str>).map_err(map)?;
    }
    return Ok(());
  }
}

const OLC_DISTANCE_SQL: &str = "SELECT olc_distance('9G7VPFJP+MX', '9G7VPFJQ+J2')";
const GEO_DISTANCE_SQL: &str = "SELECT geo_distance(44.9555555, -0.6912071, 46.2027364, 5.2294019)";
const OLC_GEO_DISTANCE_SQL: &str = "SELECT olc_geo_distance('9G7VPFJP+MX', 46.2027364, 5.2294019)";

#[derive(Debug, PartialEq, Eq)]
pub struct SmokeReport {
  pub olc_distance: i64,
  pub geo_distance: i64,
  pub olc_geo_distance: i64,
}

/// Runs the three reference queries and collects their scalar results.
pub fn run_smoke(session: &Session) -> Result<SmokeReport, HarnessError> {
  return Ok(SmokeReport {
    olc_distance: session.query_meters(OLC_DISTANCE_SQL)?,
    geo_distance: session.query_meters(GEO_DISTANCE_SQL)?,
    olc_geo_distance: session.query_meters(OLC_GEO_DISTANCE_SQL)?,
  });
}

#[cfg(test)]
mod tests {
  use super::*;

  use rusqlite::functions::FunctionFlags;

  fn open(allow_extension_loading: bool) -> Session {
    return Session::open_in_memory(ConnectionOptions { allow_extension_loading }).unwrap();
  }

  struct StubExtension;

  impl DistanceExtension for StubExtension {
    fn install(&self, session: &Session) -> Result<(), HarnessError> {
      for (name, arity, canned) in [
        ("olc_distance", 2, 1_i64),
        ("geo_distance", 4, 2),
        ("olc_geo_distance", 3, 3),
      ] {
        session
          .connection()
          .create_scalar_function(name, arity, FunctionFlags::SQLITE_UTF8, move |_ctx| Ok(canned))
          .map_err(HarnessError::Register)?;
      }
      return Ok(());
    }
  }

  #[test]
  fn test_smoke_against_stub() {
    let session = open(false);
    session.install(&StubExtension).unwrap();

    let report = run_smoke(&session).unwrap();
    assert_eq!(
      SmokeReport {
        olc_distance: 1,
        geo_distance: 2,
        olc_geo_distance: 3,
      },
      report
    );
  }

  #[test]
  fn test_smoke_against_builtin() {
    let session = open(false);
    session.install(&BuiltinExtension).unwrap();

    let report = run_smoke(&session).unwrap();
    assert_eq!(
      SmokeReport {
        olc_distance: 15,
        geo_distance: 481019,
        olc_geo_distance: 2467728,
      },
      report
    );

    session.close().unwrap();
  }

  #[test]
  fn test_queries_without_extension_fail_as_query_errors() {
    let session = open(false);

    let err = run_smoke(&session).unwrap_err();
    assert!(matches!(err, HarnessError::Query { .. }), "{err}");
  }

  #[test]
  fn test_missing_extension_path_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_extension.so");

    let session = open(true);
    let err = session.install(&DynamicExtension::new(&path)).unwrap_err();
    assert!(matches!(err, HarnessError::ExtensionLoad { .. }), "{err}");
  }

  #[test]
  fn test_loading_requires_opt_in() {
    let session = open(false);

    let err = session
      .install(&DynamicExtension::new("./liteolc.so"))
      .unwrap_err();
    assert!(matches!(err, HarnessError::LoadingDisabled), "{err}");
  }
}
