//! Pure flat-file connection to a WordNet distribution.
//!
//! This is the file access engine: it owns the preloaded prefix index and
//! the lazily-populated term cache, and answers the three primitive queries
//! by seeking directly into the index/data files. Lookups never scan a
//! whole file: `homographs` seeks to the prefix-indexed offset and reads
//! only while lines still carry the query prefix, and a synset id embeds
//! the byte offset of its own record.

use crate::data::{self, PrefixIndex};
use crate::error::{Result, WndbError};
use crate::models::{
    EvocationRecord, HomographRecord, PartOfSpeech, RawEvocation, SynsetRecord, split_synset_id,
};
use crate::parse;
use crate::{Connector, WordnetConnection};
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct PureConnection {
    wordnet_path: PathBuf,
    data_path: PathBuf,
    prefix_index: PrefixIndex,
    evocations: Option<HashMap<String, RawEvocation>>,
    /// Term cache: normalized lemma → assembled homograph record. Populated
    /// opportunistically while scanning prefix runs; entries are never
    /// evicted for the lifetime of the connection.
    cache: Mutex<HashMap<String, HomographRecord>>,
    connected: AtomicBool,
}

impl PureConnection {
    /// Opens the connection: locates the wordnet files, loads the prefix
    /// index and, when installed, the evocation dump. All-or-nothing — any
    /// failure here leaves nothing half-open.
    pub fn open(wordnet_path: Option<&Path>, data_path: &Path) -> Result<Self> {
        let wordnet_path = data::locate_wordnet(wordnet_path).ok_or_else(|| {
            WndbError::BadDataset(
                "failed to locate the wordnet database; ensure it is installed, and if it \
                 resides at a custom path pass that path when opening the connection"
                    .to_string(),
            )
        })?;

        let prefix_path = data_path.join(data::PREFIX_INDEX_FILENAME);
        let prefix_index = PrefixIndex::load(&prefix_path).map_err(|e| {
            WndbError::BadDataset(format!(
                "failed to load the prefix index from {:?}: {}",
                prefix_path, e
            ))
        })?;

        let evocation_path = data_path.join(data::EVOCATIONS_FILENAME);
        let evocations = data::load_evocations(&evocation_path).map_err(|e| {
            WndbError::BadDataset(format!(
                "failed to load the evocation dump from {:?}: {}",
                evocation_path, e
            ))
        })?;

        info!("Opened pure wordnet connection at {:?}", wordnet_path);
        Ok(PureConnection {
            wordnet_path,
            data_path: data_path.to_path_buf(),
            prefix_index,
            evocations,
            cache: Mutex::new(HashMap::new()),
            connected: AtomicBool::new(true),
        })
    }

    pub fn wordnet_path(&self) -> &Path {
        &self.wordnet_path
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(WndbError::NoConnection)
        }
    }

    fn lock_cache(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, HomographRecord>>> {
        self.cache
            .lock()
            .map_err(|_| WndbError::Internal("term cache mutex poisoned".to_string()))
    }

    /// Scans one index file's prefix run, merging every encountered line
    /// into the cache (neighbors included) and stopping early once the
    /// exact term has been recorded for this part of speech. Lines whose
    /// prefix no longer matches, or end-of-file, bound the scan.
    fn scan_index(
        &self,
        pos: PartOfSpeech,
        prefix: &str,
        term: &str,
        cache: &mut HashMap<String, HomographRecord>,
    ) -> Result<()> {
        let Some(offset) = self.prefix_index.offset(pos, prefix) else {
            return Ok(());
        };

        let path = self.wordnet_path.join(pos.index_file());
        let file = File::open(&path)?;
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(offset))?;
        debug!("Scanning {:?} from offset {} for {:?}", path, offset, term);

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            if !line.starts_with(prefix) {
                break;
            }
            let entry = parse::decode_index_line(line.trim_end())?;
            let lemma = entry.lemma.clone();
            let record = cache
                .entry(lemma.clone())
                .or_insert_with(|| HomographRecord::new(lemma.clone()));
            parse::merge_index_entry(record, entry);
            if lemma == term {
                break;
            }
        }
        Ok(())
    }
}

impl WordnetConnection for PureConnection {
    fn connector(&self) -> Connector {
        Connector::Pure
    }

    fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Reopens a closed connection. The dataset is immutable, so the
    /// prefix index and evocation dump loaded at construction stay valid;
    /// only the presence of the wordnet files is re-verified.
    fn reopen(&self) -> Result<()> {
        if self.connected() {
            return Ok(());
        }
        if !self
            .wordnet_path
            .join(PartOfSpeech::Noun.data_file())
            .is_file()
        {
            return Err(WndbError::BadDataset(format!(
                "the wordnet files are no longer present at {:?}",
                self.wordnet_path
            )));
        }
        self.connected.store(true, Ordering::SeqCst);
        info!("Reopened pure wordnet connection at {:?}", self.wordnet_path);
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "pure mode using wordnet files found at {}",
            self.wordnet_path.display()
        )
    }

    fn homographs(&self, term: &str) -> Result<Option<HomographRecord>> {
        self.ensure_connected()?;

        let term = parse::normalize_term(term);
        let prefix: String = term.chars().take(2).collect();
        if prefix.is_empty() {
            return Ok(None);
        }

        let mut cache = self.lock_cache()?;
        if let Some(record) = cache.get(&term) {
            debug!("Term cache hit for {:?}", term);
            return Ok(Some(record.clone()));
        }

        // Every part of speech whose prefix table knows this prefix gets a
        // bounded scan; a part of speech without the prefix is skipped
        // entirely, never scanned from offset zero.
        for pos in PartOfSpeech::ALL {
            self.scan_index(pos, &prefix, &term, &mut cache)?;
        }

        Ok(cache.get(&term).cloned())
    }

    fn synset(&self, synset_id: &str) -> Result<Option<SynsetRecord>> {
        self.ensure_connected()?;

        let (pos, offset) = split_synset_id(synset_id)?;
        let path = self.wordnet_path.join(pos.data_file());
        let file = File::open(&path)?;
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(offset))?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            debug!("Seek past end of {:?} for synset {}", path, synset_id);
            return Ok(None);
        }
        let record = parse::decode_synset_line(line.trim_end(), synset_id, offset)?;
        Ok(Some(record))
    }

    fn evocations(&self, synset_id: &str) -> Result<Option<EvocationRecord>> {
        self.ensure_connected()?;

        let Some(map) = &self.evocations else {
            return Ok(None);
        };
        match map.get(&format!("{}s", synset_id)) {
            Some(raw) => Ok(Some(parse::decode_evocation(raw)?)),
            None => Ok(None),
        }
    }
}
