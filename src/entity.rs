//! Navigable entity model over decoded records.
//!
//! These types hold no file handles: they wrap immutable records plus a
//! back-reference to the connection, so navigating an edge (a sense list, a
//! relation destination, an evocation destination) triggers a fresh
//! primitive query. Derived views are computed once and memoized.

use crate::error::{Result, WndbError};
use crate::models::{
    EvocationRecord, HomographRecord, LexicalCategory, PartOfSpeech, RelationKind, RelationToken,
    SynsetRecord, SynsetType, SynsetWord, lexical_category,
};
use crate::WordnetConnection;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Resolves a synset id through the connection, treating absence as an
/// error: ids handed out by prior decodes must resolve in a well-formed
/// dataset.
pub(crate) fn resolve_synset(
    connection: &Arc<dyn WordnetConnection>,
    synset_id: &str,
) -> Result<Synset> {
    match connection.synset(synset_id)? {
        Some(record) => Ok(Synset::new(record, Arc::clone(connection))),
        None => Err(WndbError::SynsetNotFound(synset_id.to_string())),
    }
}

// --- Homographs ---

/// All senses of one lemma, across parts of speech.
#[derive(Clone, Debug)]
pub struct Homographs {
    record: HomographRecord,
    connection: Arc<dyn WordnetConnection>,
    lemma: OnceLock<String>,
    available_pos: OnceLock<Vec<PartOfSpeech>>,
}

impl Homographs {
    pub(crate) fn new(record: HomographRecord, connection: Arc<dyn WordnetConnection>) -> Self {
        Homographs {
            record,
            connection,
            lemma: OnceLock::new(),
            available_pos: OnceLock::new(),
        }
    }

    /// Display form of the lemma, underscores rendered as spaces.
    pub fn lemma(&self) -> &str {
        self.lemma.get_or_init(|| self.record.lemma.replace('_', " "))
    }

    /// Canonical lowercased, underscore-joined lemma.
    pub fn canonical_lemma(&self) -> &str {
        &self.record.lemma
    }

    /// Parts of speech this lemma has senses under, derived from the
    /// leading letter of each stored synset id.
    pub fn available_pos(&self) -> &[PartOfSpeech] {
        self.available_pos.get_or_init(|| {
            let mut seen = Vec::new();
            for id in self.record.synset_ids(None) {
                if let Some(pos) = id.chars().next().and_then(PartOfSpeech::from_id_letter) {
                    if !seen.contains(&pos) {
                        seen.push(pos);
                    }
                }
            }
            seen
        })
    }

    /// Corpus-tagged sense counts per part of speech.
    pub fn tagsense_counts(&self) -> Vec<(PartOfSpeech, u32)> {
        self.record
            .senses
            .iter()
            .map(|s| (s.part_of_speech, s.tagsense_count))
            .collect()
    }

    pub fn tagsense_count(&self, pos: PartOfSpeech) -> u32 {
        self.record
            .senses
            .iter()
            .find(|s| s.part_of_speech == pos)
            .map(|s| s.tagsense_count)
            .unwrap_or(0)
    }

    pub fn size(&self, pos: Option<PartOfSpeech>) -> usize {
        self.record.synset_ids(pos).len()
    }

    pub fn synset_ids(&self, pos: Option<PartOfSpeech>) -> Vec<&str> {
        self.record.synset_ids(pos)
    }

    /// Resolves the sense clusters through the connection, one direct-offset
    /// query per sense.
    pub fn synsets(&self, pos: Option<PartOfSpeech>) -> Result<Vec<Synset>> {
        self.record
            .synset_ids(pos)
            .into_iter()
            .map(|id| resolve_synset(&self.connection, id))
            .collect()
    }

    pub fn record(&self) -> &HomographRecord {
        &self.record
    }
}

impl fmt::Display for Homographs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pos: Vec<String> = self.available_pos().iter().map(|p| p.to_string()).collect();
        write!(f, "{}, {}", self.lemma(), pos.join("/"))
    }
}

// --- Synset ---

/// One sense cluster: a set of synonymous words with a gloss and typed
/// relations to other clusters.
#[derive(Clone, Debug)]
pub struct Synset {
    record: Arc<SynsetRecord>,
    connection: Arc<dyn WordnetConnection>,
    relations: OnceLock<Vec<Relation>>,
}

impl Synset {
    pub(crate) fn new(record: SynsetRecord, connection: Arc<dyn WordnetConnection>) -> Self {
        Synset {
            record: Arc::new(record),
            connection,
            relations: OnceLock::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.record.synset_id
    }

    pub fn synset_type(&self) -> SynsetType {
        self.record.synset_type
    }

    pub fn part_of_speech(&self) -> PartOfSpeech {
        self.record.synset_type.part_of_speech()
    }

    /// Display forms of the member words.
    pub fn words(&self) -> Vec<String> {
        self.record.words.iter().map(SynsetWord::display).collect()
    }

    /// Member words in their canonical stored form, with lexical ids.
    pub fn words_with_lexical_ids(&self) -> &[SynsetWord] {
        &self.record.words
    }

    pub fn size(&self) -> usize {
        self.record.words.len()
    }

    pub fn lexical_filenum(&self) -> u8 {
        self.record.lexical_filenum
    }

    /// The lexicographer category; the filenum was bounds-checked at decode
    /// time, so this is only `None` for a hand-built record.
    pub fn lexical_category(&self) -> Option<&'static LexicalCategory> {
        lexical_category(self.record.lexical_filenum)
    }

    pub fn gloss(&self) -> &str {
        &self.record.gloss
    }

    /// The relations this cluster participates in, optionally filtered by
    /// kind. The full list is built once and memoized; filters are applied
    /// to the memoized list.
    pub fn relations(&self, filter: Option<RelationKind>) -> Vec<Relation> {
        let all = self.relations.get_or_init(|| {
            self.record
                .relations
                .iter()
                .map(|token| {
                    Relation::new(
                        token.clone(),
                        Arc::clone(&self.record),
                        Arc::clone(&self.connection),
                    )
                })
                .collect()
        });
        all.iter()
            .filter(|relation| filter.is_none_or(|kind| relation.kind() == kind))
            .cloned()
            .collect()
    }

    /// Evocation strengths recorded for this cluster, when the auxiliary
    /// dataset is installed.
    pub fn evocations(&self) -> Result<Option<Evocations>> {
        match self.connection.evocations(self.id())? {
            Some(record) => Ok(Some(Evocations::new(
                record,
                self.id().to_string(),
                Arc::clone(&self.connection),
            ))),
            None => Ok(None),
        }
    }

    pub fn record(&self) -> &SynsetRecord {
        &self.record
    }

    fn type_label(&self) -> &'static str {
        match self.record.synset_type {
            SynsetType::Noun => "Noun",
            SynsetType::Verb => "Verb",
            SynsetType::Adjective => "Adjective",
            SynsetType::AdjectiveSatellite => "Adjective satellite",
            SynsetType::Adverb => "Adverb",
        }
    }
}

impl fmt::Display for Synset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<String> = self
            .words()
            .into_iter()
            .map(|word| format!("\"{}\"", word))
            .collect();
        write!(
            f,
            "{} including word(s): {} meaning: {}",
            self.type_label(),
            words.join(", "),
            self.gloss()
        )
    }
}

// --- Relation ---

/// A typed, directed edge from a source cluster, optionally anchored to
/// specific words on both ends. The destination cluster is resolved lazily
/// on first access, so walking a record's relation list never expands the
/// graph by itself.
#[derive(Clone, Debug)]
pub struct Relation {
    token: RelationToken,
    source: Arc<SynsetRecord>,
    connection: Arc<dyn WordnetConnection>,
    destination: OnceLock<Synset>,
}

impl Relation {
    fn new(
        token: RelationToken,
        source: Arc<SynsetRecord>,
        connection: Arc<dyn WordnetConnection>,
    ) -> Self {
        Relation {
            token,
            source,
            connection,
            destination: OnceLock::new(),
        }
    }

    pub fn kind(&self) -> RelationKind {
        self.token.kind
    }

    /// Semantic relations link whole clusters; lexical relations are
    /// anchored to one word on each side.
    pub fn is_semantic(&self) -> bool {
        self.token.is_semantic()
    }

    pub fn source_id(&self) -> &str {
        &self.source.synset_id
    }

    pub fn target_id(&self) -> &str {
        &self.token.target
    }

    /// The anchored source word (display form) of a lexical relation. The
    /// anchor was bounds-checked against the source cluster at decode time.
    pub fn source_word(&self) -> Option<String> {
        self.token
            .anchor
            .and_then(|anchor| self.source.words.get(anchor.source - 1))
            .map(SynsetWord::display)
    }

    /// Resolves the destination cluster, one direct-offset query on first
    /// access, memoized afterwards.
    pub fn destination(&self) -> Result<Synset> {
        if let Some(destination) = self.destination.get() {
            return Ok(destination.clone());
        }
        let destination = resolve_synset(&self.connection, &self.token.target)?;
        Ok(self.destination.get_or_init(|| destination).clone())
    }

    /// The anchored destination word of a lexical relation. This resolves
    /// the destination cluster; an anchor outside that cluster's word list
    /// is a decode error, never a silent `None`.
    pub fn destination_word(&self) -> Result<Option<String>> {
        let Some(anchor) = self.token.anchor else {
            return Ok(None);
        };
        let destination = self.destination()?;
        match destination.record.words.get(anchor.target - 1) {
            Some(word) => Ok(Some(word.display())),
            None => Err(WndbError::decode(format!(
                "relation into {} anchors word {} but the cluster has {} words",
                self.token.target,
                anchor.target,
                destination.record.words.len()
            ))),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind().name().replace('_', " ");
        if self.is_semantic() {
            write!(
                f,
                "Semantic {} relation between {} and {}",
                kind,
                self.source_id(),
                self.target_id()
            )
        } else {
            write!(
                f,
                "Lexical {} relation between {}'s word \"{}\" and {}",
                kind,
                self.source_id(),
                self.source_word().unwrap_or_default(),
                self.target_id()
            )
        }
    }
}

// --- Evocations ---

/// One entry of an evocation list: a destination cluster with its mean and
/// median association strengths.
#[derive(Debug, Clone, PartialEq)]
pub struct EvocationEdge {
    pub target_id: String,
    pub mean: f64,
    pub median: f64,
}

/// The evocations recorded for one source cluster: parallel lists of
/// destinations and strength scores.
#[derive(Clone)]
pub struct Evocations {
    record: EvocationRecord,
    source_id: String,
    connection: Arc<dyn WordnetConnection>,
}

impl Evocations {
    pub(crate) fn new(
        record: EvocationRecord,
        source_id: String,
        connection: Arc<dyn WordnetConnection>,
    ) -> Self {
        Evocations {
            record,
            source_id,
            connection,
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn len(&self) -> usize {
        self.record.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<EvocationEdge> {
        Some(EvocationEdge {
            target_id: self.record.targets.get(index)?.clone(),
            mean: *self.record.means.get(index)?,
            median: *self.record.medians.get(index)?,
        })
    }

    pub fn first(&self) -> Option<EvocationEdge> {
        self.get(0)
    }

    pub fn last(&self) -> Option<EvocationEdge> {
        self.len().checked_sub(1).and_then(|index| self.get(index))
    }

    /// Destination ids, optionally filtered by the id's leading letter.
    pub fn target_ids(&self, pos: Option<PartOfSpeech>) -> Vec<&str> {
        self.record
            .targets
            .iter()
            .filter(|id| match pos {
                None => true,
                Some(p) => id.chars().next().and_then(PartOfSpeech::from_id_letter) == Some(p),
            })
            .map(String::as_str)
            .collect()
    }

    /// Resolves the destination clusters through the connection.
    pub fn destinations(&self, pos: Option<PartOfSpeech>) -> Result<Vec<Synset>> {
        self.target_ids(pos)
            .into_iter()
            .map(|id| resolve_synset(&self.connection, id))
            .collect()
    }

    pub fn record(&self) -> &EvocationRecord {
        &self.record
    }
}

impl fmt::Display for Evocations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} evocations from {}", self.len(), self.source_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::Fixture;
    use crate::pure::PureConnection;

    fn connect(fixture: &Fixture) -> Arc<dyn WordnetConnection> {
        Arc::new(PureConnection::open(Some(fixture.dict_path()), fixture.data_path()).unwrap())
    }

    fn find(connection: &Arc<dyn WordnetConnection>, term: &str) -> Homographs {
        let record = connection
            .homographs(term)
            .unwrap()
            .unwrap_or_else(|| panic!("{:?} should resolve", term));
        Homographs::new(record, Arc::clone(connection))
    }

    #[test]
    fn homographs_expose_lemma_and_parts_of_speech() {
        let fixture = Fixture::standard();
        let connection = connect(&fixture);
        let homographs = find(&connection, "bat");

        assert_eq!(homographs.lemma(), "bat");
        assert_eq!(
            homographs.available_pos(),
            &[PartOfSpeech::Noun, PartOfSpeech::Verb]
        );
        assert_eq!(homographs.size(None), 3);
        assert_eq!(homographs.size(Some(PartOfSpeech::Verb)), 1);
        assert!(homographs.tagsense_count(PartOfSpeech::Noun) > 0);
        assert_eq!(homographs.to_string(), "bat, noun/verb");
    }

    #[test]
    fn multi_word_lemmas_render_with_spaces() {
        let fixture = Fixture::standard();
        let connection = connect(&fixture);
        let homographs = find(&connection, "squash racquet");

        assert_eq!(homographs.lemma(), "squash racquet");
        assert_eq!(homographs.canonical_lemma(), "squash_racquet");
    }

    #[test]
    fn synsets_expose_words_category_and_gloss() {
        let fixture = Fixture::standard();
        let connection = connect(&fixture);
        let homographs = find(&connection, "bat");

        let senses = homographs.synsets(Some(PartOfSpeech::Noun)).unwrap();
        assert_eq!(senses.len(), 2);

        let animal = &senses[0];
        assert_eq!(animal.id(), fixture.synset_id(0));
        assert_eq!(animal.synset_type(), SynsetType::Noun);
        assert_eq!(animal.words(), vec!["bat", "chiropteran"]);
        assert_eq!(animal.size(), 2);
        assert_eq!(animal.lexical_category().unwrap().name, "noun.animal");
        assert!(animal.gloss().contains("mammal"));
        assert!(animal.to_string().starts_with("Noun including word(s):"));
    }

    #[test]
    fn relations_filter_by_kind() {
        let fixture = Fixture::standard();
        let connection = connect(&fixture);
        let homographs = find(&connection, "bat");

        let senses = homographs.synsets(Some(PartOfSpeech::Noun)).unwrap();
        let animal = &senses[0];
        assert_eq!(animal.relations(None).len(), 2);

        let hyponyms = animal.relations(Some(RelationKind::Hyponym));
        assert_eq!(hyponyms.len(), 1);
        assert_eq!(hyponyms[0].target_id(), fixture.synset_id(3));
        assert!(animal.relations(Some(RelationKind::Antonym)).is_empty());

        // Filters also reach kinds parsed from names or raw symbols.
        let parsed: RelationKind = "~".parse().unwrap();
        assert_eq!(animal.relations(Some(parsed)).len(), 1);
    }

    #[test]
    fn semantic_relations_resolve_their_destination_lazily() {
        let fixture = Fixture::standard();
        let connection = connect(&fixture);
        let homographs = find(&connection, "bat");

        let senses = homographs.synsets(Some(PartOfSpeech::Noun)).unwrap();
        let animal = &senses[0];
        let hypernyms = animal.relations(Some(RelationKind::Hypernym));
        let hypernym = &hypernyms[0];
        assert!(hypernym.is_semantic());
        assert_eq!(hypernym.source_word(), None);
        assert_eq!(hypernym.destination_word().unwrap(), None);

        let destination = hypernym.destination().unwrap();
        assert_eq!(destination.id(), fixture.synset_id(2));
        assert_eq!(destination.words()[1], "placental mammal");

        // Memoized: a second resolution returns the same cluster.
        assert_eq!(hypernym.destination().unwrap().id(), destination.id());
    }

    #[test]
    fn lexical_relations_expose_anchored_words() {
        let fixture = Fixture::standard();
        let connection = connect(&fixture);
        let homographs = find(&connection, "bat");

        let senses = homographs.synsets(Some(PartOfSpeech::Noun)).unwrap();
        let club = &senses[1];
        let related_forms = club.relations(Some(RelationKind::DerivationallyRelatedForm));
        let related = &related_forms[0];
        assert!(!related.is_semantic());
        assert_eq!(related.source_word().as_deref(), Some("bat"));
        assert_eq!(related.destination_word().unwrap().as_deref(), Some("bat"));
        assert_eq!(related.destination().unwrap().id(), fixture.synset_id(4));
    }

    #[test]
    fn destination_anchors_outside_the_cluster_are_decode_errors() {
        use crate::fixture::{IndexSpec, SynsetSpec};

        // The lexical relation anchors destination word 3, but the target
        // cluster only has one word.
        let specs: &[SynsetSpec] = &[
            SynsetSpec {
                pos: PartOfSpeech::Noun,
                lex_filenum: 4,
                type_letter: "n",
                words: &[("dispatch", 0)],
                relations: &[("+", 1, 'n', "0103")],
                gloss: "anchored beyond the destination word list",
            },
            SynsetSpec {
                pos: PartOfSpeech::Noun,
                lex_filenum: 4,
                type_letter: "n",
                words: &[("delivery", 0)],
                relations: &[],
                gloss: "a single-word cluster",
            },
        ];
        let indexes: &[IndexSpec] = &[IndexSpec {
            lemma: "dispatch",
            pos: PartOfSpeech::Noun,
            tagsense_count: 0,
            ptr_symbols: &["+"],
            synsets: &[0],
        }];
        let fixture = Fixture::build(specs, indexes);
        let connection = connect(&fixture);
        let homographs = find(&connection, "dispatch");

        let senses = homographs.synsets(None).unwrap();
        let relations = senses[0].relations(None);
        // The destination cluster itself resolves; only the word anchor is
        // out of range.
        assert_eq!(
            relations[0].destination().unwrap().id(),
            fixture.synset_id(1)
        );
        let err = relations[0].destination_word().unwrap_err();
        assert!(matches!(err, WndbError::Decode(_)), "got {:?}", err);
    }

    #[test]
    fn every_relation_destination_of_a_decoded_synset_resolves() {
        let fixture = Fixture::standard();
        let connection = connect(&fixture);
        let homographs = find(&connection, "bat");

        for synset in homographs.synsets(None).unwrap() {
            for relation in synset.relations(None) {
                let destination = relation.destination().unwrap();
                assert_eq!(destination.id(), relation.target_id());
            }
        }
    }

    #[test]
    fn evocations_navigate_to_destinations() {
        let fixture = Fixture::standard();
        let source = fixture.synset_id(0);
        fixture.write_evocations(&[(
            source.clone(),
            vec![
                (fixture.synset_id(2), 0.5, 0.25),
                (fixture.synset_id(4), 1.5, 1.0),
            ],
        )]);
        let connection = connect(&fixture);
        let homographs = find(&connection, "bat");

        let senses = homographs.synsets(Some(PartOfSpeech::Noun)).unwrap();
        let animal = &senses[0];
        let evocations = animal.evocations().unwrap().expect("evocations installed");
        assert_eq!(evocations.len(), 2);

        let first = evocations.first().unwrap();
        assert_eq!(first.target_id, fixture.synset_id(2));
        assert_eq!(first.mean, 0.5);
        assert_eq!(first.median, 0.25);
        assert_eq!(evocations.last().unwrap().target_id, fixture.synset_id(4));

        let nouns = evocations.destinations(Some(PartOfSpeech::Noun)).unwrap();
        assert_eq!(nouns.len(), 1);
        assert_eq!(nouns[0].id(), fixture.synset_id(2));
        assert_eq!(
            evocations.target_ids(Some(PartOfSpeech::Verb)),
            vec![fixture.synset_id(4)]
        );

        // The club sense carries no evocations.
        let club = &senses[1];
        assert!(club.evocations().unwrap().is_none());
    }
}
