//! Shared test harness for integration tests.
//!
//! Provides scripted [`Extractor`] and [`Enricher`] doubles that record how
//! they were called, plus [`TestHarness`] which wires them into a
//! [`CollectionManager`].

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use vidiform::collection::{CollectionManager, ManagerOptions};
use vidiform::metadata::Enricher;
use vidiform::probe::Extractor;
use vidiform_common::{ExtractError, FileHandle, LookupError, MetadataRecord, PartialMetadata};

// ---------------------------------------------------------------------------
// Extractor double
// ---------------------------------------------------------------------------

/// Extractor that derives a record from the file name.
///
/// Files listed with [`ScriptedExtractor::fail_on`] fail; per-file delays let
/// tests finish extractions out of input order.
#[derive(Default)]
pub struct ScriptedExtractor {
    failing: Mutex<HashSet<String>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(self, name: &str) -> Self {
        self.failing.lock().insert(name.to_string());
        self
    }

    pub fn delay(self, name: &str, delay: Duration) -> Self {
        self.delays.lock().insert(name.to_string(), delay);
        self
    }

    /// Names passed to `extract`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// Record produced for `name`: title is the stem, technical fields are fixed.
pub fn extracted_record(name: &str) -> MetadataRecord {
    let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);
    let mut record = MetadataRecord::new(stem);
    record.duration = "00:01:00".to_string();
    record.resolution = "1280x720".to_string();
    record.frame_rate = "30".to_string();
    record.codec = Some("H.264".to_string());
    record
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn extract(&self, handle: &FileHandle) -> Result<MetadataRecord, ExtractError> {
        self.calls.lock().push(handle.name.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.lock().get(&handle.name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.lock().contains(&handle.name) {
            return Err(ExtractError::tool_failed("scripted", "cannot read container"));
        }
        Ok(extracted_record(&handle.name))
    }
}

// ---------------------------------------------------------------------------
// Enricher double
// ---------------------------------------------------------------------------

/// What a [`ScriptedEnricher`] answers.
#[derive(Clone)]
pub enum Answer {
    Found(PartialMetadata),
    NotFound,
    Fail,
    /// Never answers.
    Hang,
}

pub struct ScriptedEnricher {
    answer: Mutex<Answer>,
    queries: Mutex<Vec<String>>,
    started: Arc<Notify>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedEnricher {
    pub fn new(answer: Answer) -> Self {
        Self {
            answer: Mutex::new(answer),
            queries: Mutex::new(Vec::new()),
            started: Arc::new(Notify::new()),
            gate: None,
        }
    }

    /// Hold every lookup until `gate` is notified.
    pub fn gated(answer: Answer, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(answer)
        }
    }

    pub fn set_answer(&self, answer: Answer) {
        *self.answer.lock() = answer;
    }

    /// Titles passed to `lookup`, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }

    /// Notified whenever a lookup starts.
    pub fn started(&self) -> Arc<Notify> {
        self.started.clone()
    }
}

#[async_trait]
impl Enricher for ScriptedEnricher {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn lookup(&self, title: &str) -> Result<Option<PartialMetadata>, LookupError> {
        self.queries.lock().push(title.to_string());
        self.started.notify_one();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let answer = self.answer.lock().clone();
        match answer {
            Answer::Found(partial) => Ok(Some(partial)),
            Answer::NotFound => Ok(None),
            Answer::Fail => Err(LookupError::Status { status: 503 }),
            Answer::Hang => {
                std::future::pending::<()>().await;
                Ok(None)
            }
        }
    }
}

pub fn partial(title: &str, year: i32, genre: &str, description: &str) -> PartialMetadata {
    PartialMetadata {
        title: Some(title.to_string()),
        year: Some(year),
        genre: Some(genre.to_string()),
        description: Some(description.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct TestHarness {
    pub manager: Arc<CollectionManager>,
    pub extractor: Arc<ScriptedExtractor>,
    pub enricher: Arc<ScriptedEnricher>,
}

impl TestHarness {
    /// Default extractor and an enricher that finds nothing.
    pub fn new() -> Self {
        Self::with(ScriptedExtractor::new(), ScriptedEnricher::new(Answer::NotFound))
    }

    pub fn with(extractor: ScriptedExtractor, enricher: ScriptedEnricher) -> Self {
        Self::with_options(extractor, enricher, ManagerOptions::default())
    }

    pub fn with_options(
        extractor: ScriptedExtractor,
        enricher: ScriptedEnricher,
        options: ManagerOptions,
    ) -> Self {
        let extractor = Arc::new(extractor);
        let enricher = Arc::new(enricher);
        let manager = Arc::new(CollectionManager::with_options(
            extractor.clone(),
            enricher.clone(),
            options,
        ));
        Self {
            manager,
            extractor,
            enricher,
        }
    }

    /// Import files with the given names and 1 KiB of content each.
    pub async fn import(&self, names: &[&str]) {
        self.manager
            .import_files(handles(names))
            .await
            .expect("import should succeed");
    }

    pub fn names(&self) -> Vec<String> {
        self.manager.entries().into_iter().map(|e| e.name).collect()
    }

    pub fn selected_name(&self) -> Option<String> {
        self.manager.selected().map(|e| e.name)
    }
}

pub fn handles(names: &[&str]) -> Vec<FileHandle> {
    names
        .iter()
        .map(|name| FileHandle::new(*name, vec![0u8; 1024]))
        .collect()
}
