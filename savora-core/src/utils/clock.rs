/// Current UTC wall-clock time as the naive timestamp type stored in Postgres.
///
/// All deadline math in this crate runs on `PrimitiveDateTime` in UTC; the
/// database columns are `timestamp without time zone`.
pub fn now_utc() -> time::PrimitiveDateTime {
    let now = time::OffsetDateTime::now_utc();
    time::PrimitiveDateTime::new(now.date(), now.time())
}
