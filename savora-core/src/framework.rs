use sqlx::PgPool;

/// Handle for processing entity query messages against the shared pool.
///
/// Entity modules define message structs and implement
/// `kanau::processor::Processor<Msg>` for this type; multi-step writes that
/// must commit atomically are expressed as `_tx` associated functions on the
/// entity instead, taking an open [`sqlx::Transaction`].
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
