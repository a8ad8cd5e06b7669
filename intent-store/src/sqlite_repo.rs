use std::path::Path;

use intent_model::{ChunkRecord, SimilarityCandidate};
use rusqlite::{params, Connection, Row, TransactionBehavior};

use crate::{ChunkFilter, StoreError};

/// SQLite-backed primary store for chunk records.
pub struct SqliteRepo {
    conn: Connection,
}

impl SqliteRepo {
    /// Open an in-memory repository and initialize schema.
    pub fn new() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.init()?;
        Ok(repo)
    }

    /// Open a file-backed repository at `path` and initialize schema if absent.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.init()?;
        Ok(repo)
    }

    fn init(&self) -> Result<(), StoreError> {
        // Pragmas for durability and concurrency
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "synchronous", "FULL")?;
        self.conn.pragma_update(None, "foreign_keys", "ON")?;

        // The *_key columns hold the lowercased comparison keys; display
        // columns keep the caller's casing.
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                rowid INTEGER PRIMARY KEY,
                id TEXT NOT NULL,
                document_name TEXT NOT NULL,
                document_key TEXT NOT NULL,
                topic TEXT NOT NULL,
                channel TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                text TEXT NOT NULL,
                intent TEXT NOT NULL,
                intent_key TEXT NOT NULL,
                sub_intent TEXT,
                is_transactional INTEGER NOT NULL,
                is_repeat INTEGER NOT NULL,
                embedding BLOB NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_chunks_id ON chunks(id);
            CREATE INDEX IF NOT EXISTS idx_chunks_topic_channel ON chunks(topic, channel);
            CREATE INDEX IF NOT EXISTS idx_chunks_intent_key ON chunks(intent_key);
            "#,
        )?;
        Ok(())
    }

    /// Insert records in a single transaction; existing ids are replaced.
    /// Callers batch their inserts, so one call never exceeds one batch.
    pub fn insert_chunks(&mut self, chunks: &[ChunkRecord]) -> Result<(), StoreError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO chunks (
                    id, document_name, document_key, topic, channel, chunk_index,
                    text, intent, intent_key, sub_intent,
                    is_transactional, is_repeat, embedding
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                ON CONFLICT(id) DO UPDATE SET
                    document_name=excluded.document_name,
                    document_key=excluded.document_key,
                    topic=excluded.topic,
                    channel=excluded.channel,
                    chunk_index=excluded.chunk_index,
                    text=excluded.text,
                    intent=excluded.intent,
                    intent_key=excluded.intent_key,
                    sub_intent=excluded.sub_intent,
                    is_transactional=excluded.is_transactional,
                    is_repeat=excluded.is_repeat,
                    embedding=excluded.embedding
                ;
                "#,
            )?;

            for rec in chunks {
                let blob: &[u8] = bytemuck::cast_slice(&rec.embedding[..]);
                stmt.execute(params![
                    rec.id,
                    rec.document_name,
                    normalize_key(&rec.document_name),
                    normalize_key(&rec.topic),
                    normalize_key(&rec.channel),
                    rec.chunk_index as i64,
                    rec.text,
                    rec.intent,
                    normalize_key(&rec.intent),
                    rec.sub_intent,
                    rec.is_transactional as i64,
                    rec.is_repeat as i64,
                    blob,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Delete every chunk matching `filter` and return the count.
    ///
    /// An empty filter is a no-op rather than a full wipe.
    pub fn delete_where(&mut self, filter: &ChunkFilter) -> Result<usize, StoreError> {
        if filter.is_empty() {
            return Ok(0);
        }
        let (where_sql, params) = build_where(filter);
        let sql = format!("DELETE FROM chunks {where_sql}");
        let tx = self.conn.transaction()?;
        let n = tx.execute(&sql, rusqlite::params_from_iter(params))?;
        tx.commit()?;
        Ok(n)
    }

    /// Fetch full records matching `filter`, in document and chunk order.
    pub fn query(&self, filter: &ChunkFilter) -> Result<Vec<ChunkRecord>, StoreError> {
        let (where_sql, params) = build_where(filter);
        let sql = format!(
            "SELECT id, document_name, topic, channel, chunk_index, text, intent, \
             sub_intent, is_transactional, is_repeat, embedding \
             FROM chunks {where_sql} ORDER BY document_key, chunk_index"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params), record_from_row)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// First chunk stored under `(intent, sub_intent)` within `filter`'s
    /// scope, or `None`. No similarity computation happens on this path.
    pub fn lookup_exact(
        &self,
        intent: &str,
        sub_intent: Option<&str>,
        filter: &ChunkFilter,
    ) -> Result<Option<ChunkRecord>, StoreError> {
        let mut scoped = filter.clone();
        scoped.intent = Some(intent.to_string());
        scoped.sub_intent = sub_intent.map(str::to_string);
        Ok(self.query(&scoped)?.into_iter().next())
    }

    /// Retrieval-side view of the chunks matching `filter`.
    pub fn candidates(&self, filter: &ChunkFilter) -> Result<Vec<SimilarityCandidate>, StoreError> {
        let (where_sql, params) = build_where(filter);
        let sql = format!(
            "SELECT text, document_name, embedding \
             FROM chunks {where_sql} ORDER BY document_key, chunk_index"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params), |row| {
            let blob: Vec<u8> = row.get(2)?;
            Ok(SimilarityCandidate {
                text: row.get(0)?,
                document_name: row.get(1)?,
                embedding: decode_embedding(&blob),
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Build the conjunctive WHERE clause. Values are always bound; only the
/// fixed column list below ever reaches the SQL text.
fn build_where(filter: &ChunkFilter) -> (String, Vec<rusqlite::types::Value>) {
    let mut sql = String::from("WHERE 1=1");
    let mut params: Vec<rusqlite::types::Value> = Vec::new();

    let mut push = |clause: &str, value: &str| {
        sql.push_str(clause);
        params.push(normalize_key(value).into());
    };
    if let Some(v) = &filter.document_name {
        push(" AND document_key = ?", v);
    }
    if let Some(v) = &filter.topic {
        push(" AND topic = ?", v);
    }
    if let Some(v) = &filter.channel {
        push(" AND channel = ?", v);
    }
    if let Some(v) = &filter.intent {
        push(" AND intent_key = ?", v);
    }
    if let Some(v) = &filter.sub_intent {
        push(" AND sub_intent = ?", v);
    }

    (sql, params)
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ChunkRecord> {
    let chunk_index: i64 = row.get(4)?;
    let is_transactional: i64 = row.get(8)?;
    let is_repeat: i64 = row.get(9)?;
    let blob: Vec<u8> = row.get(10)?;
    Ok(ChunkRecord {
        id: row.get(0)?,
        document_name: row.get(1)?,
        topic: row.get(2)?,
        channel: row.get(3)?,
        chunk_index: chunk_index as u32,
        text: row.get(5)?,
        intent: row.get(6)?,
        sub_intent: row.get(7)?,
        is_transactional: is_transactional != 0,
        is_repeat: is_repeat != 0,
        embedding: decode_embedding(&blob),
    })
}

// Alignment-safe decode of the little-endian f32 blob.
fn decode_embedding(blob: &[u8]) -> Vec<f32> {
    bytemuck::pod_collect_to_vec::<u8, f32>(blob)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, intent: &str, sub: Option<&str>, index: u32) -> ChunkRecord {
        ChunkRecord {
            id: id.to_string(),
            document_name: "guia.pdf".to_string(),
            topic: "pensiones".to_string(),
            channel: "web".to_string(),
            chunk_index: index,
            text: format!("texto {index}"),
            intent: intent.to_string(),
            sub_intent: sub.map(str::to_string),
            is_transactional: false,
            is_repeat: false,
            embedding: vec![0.25, -0.5, index as f32],
        }
    }

    #[test]
    fn insert_then_query_round_trips_records() {
        let mut repo = SqliteRepo::new().expect("open");
        let records = vec![
            record("a_0", "Afiliacion", Some("requisitos"), 0),
            record("a_1", "Pagos", None, 1),
        ];
        repo.insert_chunks(&records).expect("insert");

        let got = repo.query(&ChunkFilter::default()).expect("query");
        assert_eq!(got, records);
    }

    #[test]
    fn reinserting_an_id_replaces_the_row() {
        let mut repo = SqliteRepo::new().expect("open");
        repo.insert_chunks(&[record("a_0", "Afiliacion", None, 0)])
            .expect("insert");

        let mut updated = record("a_0", "Afiliacion", None, 0);
        updated.text = "texto nuevo".to_string();
        repo.insert_chunks(&[updated.clone()]).expect("reinsert");

        let got = repo.query(&ChunkFilter::default()).expect("query");
        assert_eq!(got, vec![updated]);
    }

    #[test]
    fn filters_compare_case_insensitively() {
        let mut repo = SqliteRepo::new().expect("open");
        repo.insert_chunks(&[record("a_0", "Afiliacion", None, 0)])
            .expect("insert");

        let filter = ChunkFilter {
            document_name: Some("GUIA.PDF".to_string()),
            topic: Some("Pensiones".to_string()),
            intent: Some("AFILIACION".to_string()),
            ..ChunkFilter::default()
        };
        assert_eq!(repo.query(&filter).expect("query").len(), 1);
    }

    #[test]
    fn delete_where_scopes_to_the_filter_and_rejects_empty() {
        let mut repo = SqliteRepo::new().expect("open");
        let mut other = record("b_0", "Pagos", None, 0);
        other.document_name = "otra.pdf".to_string();
        repo.insert_chunks(&[record("a_0", "Afiliacion", None, 0), other])
            .expect("insert");

        assert_eq!(repo.delete_where(&ChunkFilter::default()).expect("noop"), 0);
        assert_eq!(repo.count().expect("count"), 2);

        let scope = ChunkFilter::for_document("guia.pdf", "pensiones", "web");
        assert_eq!(repo.delete_where(&scope).expect("delete"), 1);

        let left = repo.query(&ChunkFilter::default()).expect("query");
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].document_name, "otra.pdf");
    }

    #[test]
    fn lookup_exact_returns_first_match_or_none() {
        let mut repo = SqliteRepo::new().expect("open");
        repo.insert_chunks(&[
            record("a_0", "Afiliacion", Some("requisitos"), 0),
            record("a_1", "Afiliacion", Some("requisitos"), 1),
        ])
        .expect("insert");

        let hit = repo
            .lookup_exact("afiliacion", Some("requisitos"), &ChunkFilter::default())
            .expect("lookup")
            .expect("present");
        assert_eq!(hit.chunk_index, 0);

        let miss = repo
            .lookup_exact("afiliacion", Some("montos"), &ChunkFilter::default())
            .expect("lookup");
        assert!(miss.is_none());
    }

    #[test]
    fn candidates_carry_text_document_and_embedding() {
        let mut repo = SqliteRepo::new().expect("open");
        let rec = record("a_0", "Afiliacion", None, 0);
        repo.insert_chunks(&[rec.clone()]).expect("insert");

        let candidates = repo.candidates(&ChunkFilter::default()).expect("candidates");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, rec.text);
        assert_eq!(candidates[0].document_name, rec.document_name);
        assert_eq!(candidates[0].embedding, rec.embedding);
    }
}
