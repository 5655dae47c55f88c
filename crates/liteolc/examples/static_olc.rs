use rusqlite::Connection;

fn main() {
  let conn = Connection::open_in_memory().unwrap();

  liteolc::register(&conn).unwrap();

  let version: String = conn
    .query_one("SELECT LiteOLC_Version()", (), |row| row.get(0))
    .unwrap();

  println!("{version}");

  let meters: i64 = conn
    .query_one("SELECT olc_distance('9G7VPFJP+MX', '9G7VPFJQ+J2')", (), |row| {
      row.get(0)
    })
    .unwrap();

  println!("{meters} meters");
}
