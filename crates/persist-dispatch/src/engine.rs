//! The dispatch & retry engine itself: parse, route, serialise under the
//! process-wide "deadlock lock", retry with jitter, spill to dead-letter.

use crate::backoff::jittered_delay;
use persist_common::envelope::Envelope;
use persist_common::error::PersistError;
use persist_deadletter::DeadLetterSink;
use persist_reconcile::EntityStore;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct Dispatcher {
    pool: PgPool,
    store: EntityStore,
    deadletter: Arc<DeadLetterSink>,
    /// The process-wide mutex serialising every parser invocation against
    /// the DB ("deadlock lock" in spec.md §4.E step 4).
    deadlock_lock: Mutex<()>,
    max_retries: u32,
    delay_secs: f64,
}

impl Dispatcher {
    pub fn new(
        pool: PgPool,
        store: EntityStore,
        deadletter: Arc<DeadLetterSink>,
        max_retries: u32,
        delay_secs: f64,
    ) -> Self {
        Self {
            pool,
            store,
            deadletter,
            deadlock_lock: Mutex::new(()),
            max_retries,
            delay_secs,
        }
    }

    /// Processes one raw line from the wire. Never panics and never
    /// propagates an error — every outcome (malformed, unknown kind,
    /// parser failure exhausting retries) is handled and logged here, per
    /// spec.md §4.E / §7.
    pub async fn dispatch_line(&self, line: &str) {
        let envelope = match Envelope::parse(line) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(line, %err, "envelope malformed, discarding");
                return;
            }
        };

        let msg_id = envelope.msg_id();
        let mut attempt = 0u32;

        loop {
            let outcome = {
                let _permit = self.deadlock_lock.lock().await;
                self.try_once(&envelope).await
            };

            match outcome {
                Ok(()) => return,
                Err(PersistError::UnknownKind { class_id, variant_id }) => {
                    tracing::warn!(msg_id, class_id, variant_id, "unknown message kind, discarding");
                    return;
                }
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.max_retries {
                        tracing::error!(msg_id, %err, attempt, "max retries reached, writing to dead-letter sink");
                        if let Err(io_err) = self
                            .deadletter
                            .record(&msg_id, envelope.class_id, envelope.variant_id, &err.to_string())
                            .await
                        {
                            tracing::error!(msg_id, %io_err, "failed to write dead-letter entry");
                        }
                        return;
                    }

                    tracing::warn!(msg_id, %err, attempt, "parser failed, retrying after back-off");
                    let delay = jittered_delay(self.delay_secs, &mut rand::thread_rng());
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn try_once(&self, envelope: &Envelope) -> persist_common::error::Result<()> {
        let mut tx = self.pool.begin().await?;
        persist_reconcile::parsers::dispatch(&self.store, &mut tx, envelope).await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // `Dispatcher` is exercised end-to-end against a live Postgres instance
    // in `tests/` (gated on `DATABASE_URL`, `#[ignore]`d by default per
    // SPEC_FULL.md §8); the retry/backoff arithmetic itself is covered in
    // `backoff.rs`.
}
