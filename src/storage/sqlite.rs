//! SQLite-backed store for vocabulary, learner progress and profiles.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC text
//! (`2026-01-31T08:00:00.000000Z`) so lexical order matches time order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use super::error::{Result, StoreError};
use super::traits::{ProfileStore, ProgressStore, VocabularyStore};
use crate::srs::{
    LearnerId, LearnerProfile, LearnerWordState, DEFAULT_DAILY_NEW_WORDS,
    DEFAULT_DAILY_REVIEW_LIMIT,
};
use crate::vocab::{DifficultyLevel, NewWord, Word, WordId};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS words (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        original TEXT NOT NULL,
        translation TEXT NOT NULL,
        transcription TEXT,
        example_sentence TEXT,
        difficulty_level TEXT NOT NULL DEFAULT 'medium',
        date_added TEXT NOT NULL
    );

    -- One scheduling record per (learner, word)
    CREATE TABLE IF NOT EXISTS learner_words (
        learner_id INTEGER NOT NULL,
        word_id INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
        repetition INTEGER NOT NULL DEFAULT 0,
        interval_days INTEGER NOT NULL DEFAULT 0,
        ease_factor REAL NOT NULL DEFAULT 2.5,
        next_review TEXT NOT NULL,
        correct_answers INTEGER NOT NULL DEFAULT 0,
        wrong_answers INTEGER NOT NULL DEFAULT 0,
        last_reviewed TEXT,
        PRIMARY KEY (learner_id, word_id)
    );

    CREATE TABLE IF NOT EXISTS profiles (
        learner_id INTEGER PRIMARY KEY,
        daily_review_limit INTEGER NOT NULL,
        daily_new_words INTEGER NOT NULL,
        total_reviews INTEGER NOT NULL DEFAULT 0,
        total_words_learned INTEGER NOT NULL DEFAULT 0,
        streak_days INTEGER NOT NULL DEFAULT 0,
        last_review_date TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_learner_words_due ON learner_words(learner_id, next_review);
"#;

const STATE_COLUMNS: &str = "learner_id, word_id, repetition, interval_days, ease_factor, \
     next_review, correct_answers, wrong_answers, last_reviewed";

const WORD_COLUMNS: &str =
    "id, original, translation, transcription, example_sentence, difficulty_level, date_added";

const PROFILE_COLUMNS: &str = "learner_id, daily_review_limit, daily_new_words, total_reviews, \
     total_words_learned, streak_days, last_review_date";

pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
    default_review_limit: u32,
    default_new_words: u32,
}

impl SqliteStore {
    /// Open (or create) a database file at the given path
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&db_path)?;
        log::info!("Opened progress database at {:?}", db_path);
        Self::from_connection(conn, Some(db_path))
    }

    /// Private database that lives as long as the store
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, None)
    }

    fn from_connection(conn: Connection, db_path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            default_review_limit: DEFAULT_DAILY_REVIEW_LIMIT,
            default_new_words: DEFAULT_DAILY_NEW_WORDS,
        })
    }

    /// Limits used when a profile is created on first access
    pub fn with_profile_defaults(mut self, daily_review_limit: u32, daily_new_words: u32) -> Self {
        self.default_review_limit = daily_review_limit;
        self.default_new_words = daily_new_words;
        self
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn insert_default_profile(&self, conn: &Connection, learner: LearnerId) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO profiles (learner_id, daily_review_limit, daily_new_words) VALUES (?1, ?2, ?3)",
            params![learner, self.default_review_limit, self.default_new_words],
        )?;
        Ok(())
    }
}

fn encode_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_ts(value: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

fn ts_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    decode_ts(&raw).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn optional_ts_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|value| {
        decode_ts(&value)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn row_to_state(row: &Row<'_>) -> rusqlite::Result<LearnerWordState> {
    Ok(LearnerWordState {
        learner_id: row.get(0)?,
        word_id: row.get(1)?,
        repetition: row.get(2)?,
        interval: row.get(3)?,
        ease_factor: row.get(4)?,
        next_review: ts_column(row, 5)?,
        correct_answers: row.get(6)?,
        wrong_answers: row.get(7)?,
        last_reviewed: optional_ts_column(row, 8)?,
    })
}

fn row_to_word(row: &Row<'_>) -> rusqlite::Result<Word> {
    let difficulty: String = row.get(5)?;
    Ok(Word {
        id: row.get(0)?,
        original: row.get(1)?,
        translation: row.get(2)?,
        transcription: row.get(3)?,
        example_sentence: row.get(4)?,
        difficulty_level: DifficultyLevel::parse(&difficulty).unwrap_or_default(),
        date_added: ts_column(row, 6)?,
    })
}

fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<LearnerProfile> {
    let total_reviews: i64 = row.get(3)?;
    let last_review_date: Option<String> = row.get(6)?;
    let last_review_date = last_review_date
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))
        })
        .transpose()?;

    Ok(LearnerProfile {
        learner_id: row.get(0)?,
        daily_review_limit: row.get(1)?,
        daily_new_words: row.get(2)?,
        total_reviews: total_reviews.max(0) as u64,
        total_words_learned: row.get(4)?,
        streak_days: row.get(5)?,
        last_review_date,
    })
}

fn select_state(conn: &Connection, learner: LearnerId, word: WordId) -> Result<Option<LearnerWordState>> {
    let sql = format!(
        "SELECT {} FROM learner_words WHERE learner_id = ?1 AND word_id = ?2",
        STATE_COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![learner, word], row_to_state)
        .optional()?)
}

fn write_state(conn: &Connection, state: &LearnerWordState) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE learner_words SET repetition = ?3, interval_days = ?4, ease_factor = ?5, \
         next_review = ?6, correct_answers = ?7, wrong_answers = ?8, last_reviewed = ?9 \
         WHERE learner_id = ?1 AND word_id = ?2",
        params![
            state.learner_id,
            state.word_id,
            state.repetition,
            state.interval,
            state.ease_factor,
            encode_ts(&state.next_review),
            state.correct_answers,
            state.wrong_answers,
            state.last_reviewed.as_ref().map(encode_ts),
        ],
    )?;
    Ok(changed)
}

fn select_profile(conn: &Connection, learner: LearnerId) -> Result<LearnerProfile> {
    let sql = format!("SELECT {} FROM profiles WHERE learner_id = ?1", PROFILE_COLUMNS);
    Ok(conn.query_row(&sql, params![learner], row_to_profile)?)
}

fn write_profile(conn: &Connection, profile: &LearnerProfile) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO profiles (learner_id, daily_review_limit, daily_new_words, \
         total_reviews, total_words_learned, streak_days, last_review_date) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            profile.learner_id,
            profile.daily_review_limit,
            profile.daily_new_words,
            profile.total_reviews as i64,
            profile.total_words_learned,
            profile.streak_days,
            profile.last_review_date.map(|d| d.format("%Y-%m-%d").to_string()),
        ],
    )?;
    Ok(())
}

impl VocabularyStore for SqliteStore {
    fn all_words(&self) -> Result<Vec<Word>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM words ORDER BY id", WORD_COLUMNS))?;
        let words = stmt
            .query_map([], row_to_word)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(words)
    }

    fn words_excluding(&self, excluded: &[WordId]) -> Result<Vec<Word>> {
        let excluded: HashSet<WordId> = excluded.iter().copied().collect();
        let mut words = self.all_words()?;
        words.retain(|w| !excluded.contains(&w.id));
        Ok(words)
    }

    fn get_word(&self, id: WordId) -> Result<Option<Word>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM words WHERE id = ?1", WORD_COLUMNS);
        Ok(conn.query_row(&sql, params![id], row_to_word).optional()?)
    }

    fn add_word(&self, word: NewWord) -> Result<Word> {
        let conn = self.conn()?;
        let word = word.into_word(0, Utc::now());
        conn.execute(
            "INSERT INTO words (original, translation, transcription, example_sentence, difficulty_level, date_added) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                word.original,
                word.translation,
                word.transcription,
                word.example_sentence,
                word.difficulty_level.as_str(),
                encode_ts(&word.date_added),
            ],
        )?;
        let id = conn.last_insert_rowid();
        log::debug!("Added word {} ({})", id, word.original);
        Ok(Word { id, ..word })
    }
}

impl ProgressStore for SqliteStore {
    fn get(&self, learner: LearnerId, word: WordId) -> Result<Option<LearnerWordState>> {
        let conn = self.conn()?;
        select_state(&conn, learner, word)
    }

    fn create(
        &self,
        learner: LearnerId,
        word: WordId,
        next_review: DateTime<Utc>,
    ) -> Result<LearnerWordState> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO learner_words (learner_id, word_id, next_review) VALUES (?1, ?2, ?3)",
            params![learner, word, encode_ts(&next_review)],
        )?;
        if inserted == 0 {
            log::debug!("Progress for learner {} on word {} already exists", learner, word);
        }

        let state = select_state(&tx, learner, word)?
            .ok_or(StoreError::ProgressNotFound { learner, word })?;
        tx.commit()?;
        Ok(state)
    }

    fn update(&self, state: &LearnerWordState) -> Result<()> {
        let conn = self.conn()?;
        if write_state(&conn, state)? == 0 {
            return Err(StoreError::ProgressNotFound {
                learner: state.learner_id,
                word: state.word_id,
            });
        }
        Ok(())
    }

    fn update_with(
        &self,
        learner: LearnerId,
        word: WordId,
        apply: &mut dyn FnMut(&LearnerWordState) -> LearnerWordState,
    ) -> Result<LearnerWordState> {
        let mut conn = self.conn()?;
        // IMMEDIATE takes the write lock up front so other connections to the
        // same file cannot interleave between the read and the write.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = select_state(&tx, learner, word)?
            .ok_or(StoreError::ProgressNotFound { learner, word })?;
        let next = apply(&current);
        write_state(&tx, &next)?;

        tx.commit()?;
        Ok(next)
    }

    fn due_before(&self, learner: LearnerId, timestamp: DateTime<Utc>) -> Result<Vec<LearnerWordState>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM learner_words WHERE learner_id = ?1 AND next_review <= ?2 \
             ORDER BY next_review ASC, word_id ASC",
            STATE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let states = stmt
            .query_map(params![learner, encode_ts(&timestamp)], row_to_state)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(states)
    }

    fn all_for(&self, learner: LearnerId) -> Result<Vec<LearnerWordState>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM learner_words WHERE learner_id = ?1 ORDER BY word_id",
            STATE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let states = stmt
            .query_map(params![learner], row_to_state)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(states)
    }
}

impl ProfileStore for SqliteStore {
    fn get_or_create(&self, learner: LearnerId) -> Result<LearnerProfile> {
        let conn = self.conn()?;
        self.insert_default_profile(&conn, learner)?;
        select_profile(&conn, learner)
    }

    fn save(&self, profile: &LearnerProfile) -> Result<()> {
        let conn = self.conn()?;
        write_profile(&conn, profile)
    }

    fn update_profile_with(
        &self,
        learner: LearnerId,
        apply: &mut dyn FnMut(&mut LearnerProfile),
    ) -> Result<LearnerProfile> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        self.insert_default_profile(&tx, learner)?;
        let mut profile = select_profile(&tx, learner)?;
        apply(&mut profile);
        write_profile(&tx, &profile)?;

        tx.commit()?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::open(temp_dir.path().join("lexis.db")).unwrap();
        (store, temp_dir)
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_timestamp_encoding_is_sortable() {
        let early = encode_ts(&at(9));
        let late = encode_ts(&(at(9) + Duration::days(400)));
        assert!(early < late);
        assert_eq!(early.len(), late.len());
        assert_eq!(decode_ts(&early).unwrap(), at(9));
    }

    #[test]
    fn test_add_and_get_word() {
        let (store, _temp) = create_test_store();
        let mut new_word = NewWord::new("apple", "яблоко");
        new_word.transcription = Some("ˈæp.əl".to_string());
        new_word.difficulty_level = DifficultyLevel::Easy;

        let word = store.add_word(new_word).unwrap();
        let loaded = store.get_word(word.id).unwrap().unwrap();
        assert_eq!(loaded.original, "apple");
        assert_eq!(loaded.transcription.as_deref(), Some("ˈæp.əl"));
        assert_eq!(loaded.difficulty_level, DifficultyLevel::Easy);
        assert!(store.get_word(word.id + 100).unwrap().is_none());
    }

    #[test]
    fn test_state_round_trip_and_due_order() {
        let (store, _temp) = create_test_store();
        let a = store.add_word(NewWord::new("a", "а")).unwrap();
        let b = store.add_word(NewWord::new("b", "б")).unwrap();
        let c = store.add_word(NewWord::new("c", "в")).unwrap();

        store.create(1, a.id, at(10)).unwrap();
        store.create(1, b.id, at(8)).unwrap();
        store.create(1, c.id, at(12)).unwrap();

        let due = store.due_before(1, at(11)).unwrap();
        assert_eq!(due.iter().map(|s| s.word_id).collect::<Vec<_>>(), vec![b.id, a.id]);

        let updated = store
            .update_with(1, a.id, &mut |s| {
                let mut next = s.clone();
                next.repetition = 2;
                next.ease_factor = 2.36;
                next.last_reviewed = Some(at(11));
                next
            })
            .unwrap();
        assert_eq!(store.get(1, a.id).unwrap().unwrap(), updated);
    }

    #[test]
    fn test_create_never_duplicates() {
        let (store, _temp) = create_test_store();
        let word = store.add_word(NewWord::new("tree", "дерево")).unwrap();

        store.create(3, word.id, at(9)).unwrap();
        let again = store.create(3, word.id, at(15)).unwrap();
        assert_eq!(again.next_review, at(9));
        assert_eq!(store.all_for(3).unwrap().len(), 1);
    }

    #[test]
    fn test_update_missing_record() {
        let (store, _temp) = create_test_store();
        let state = LearnerWordState::new(1, 42, at(9));
        assert!(matches!(
            store.update(&state),
            Err(StoreError::ProgressNotFound { learner: 1, word: 42 })
        ));
    }

    #[test]
    fn test_profile_persistence() {
        let (store, _temp) = create_test_store();
        let profile = store.get_or_create(9).unwrap();
        assert_eq!(profile.daily_review_limit, DEFAULT_DAILY_REVIEW_LIMIT);

        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        store
            .update_profile_with(9, &mut |p| {
                p.total_reviews += 5;
                p.register_review_day(day);
            })
            .unwrap();

        let loaded = store.get_or_create(9).unwrap();
        assert_eq!(loaded.total_reviews, 5);
        assert_eq!(loaded.streak_days, 1);
        assert_eq!(loaded.last_review_date, Some(day));
    }

    #[test]
    fn test_saved_profile_replaces_stored_one() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.db_path().is_none());

        let mut profile = store.get_or_create(2).unwrap();
        profile.daily_review_limit = 30;
        profile.total_words_learned = 7;
        profile.last_review_date = NaiveDate::from_ymd_opt(2026, 2, 27);
        store.save(&profile).unwrap();

        assert_eq!(store.get_or_create(2).unwrap(), profile);
    }

    #[test]
    fn test_corrupt_timestamp_is_a_sqlite_error() {
        let (store, _temp) = create_test_store();
        let word = store.add_word(NewWord::new("moon", "луна")).unwrap();
        store.create(1, word.id, at(9)).unwrap();
        store
            .conn()
            .unwrap()
            .execute(
                "UPDATE learner_words SET next_review = 'yesterday' WHERE learner_id = 1",
                [],
            )
            .unwrap();

        assert!(matches!(
            store.get(1, word.id),
            Err(StoreError::Sqlite(rusqlite::Error::FromSqlConversionFailure(..)))
        ));
    }

    #[test]
    fn test_reopen_keeps_data() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("lexis.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            let word = store.add_word(NewWord::new("sun", "солнце")).unwrap();
            store.create(1, word.id, at(9)).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.db_path(), Some(path.as_path()));
        assert_eq!(store.all_words().unwrap().len(), 1);
        assert_eq!(store.all_for(1).unwrap().len(), 1);
    }
}
