use serde::{Deserialize, Serialize};

use crate::error::{Result, WndbError};

/// Synset id probed by the evocations capability query. This id is stable
/// across WordNet 3.0 distributions and is known to carry evocation data
/// whenever the evocation dump is installed.
pub const EVOCATION_PROBE_ID: &str = "n08112402";

// --- Part of speech ---

/// The four parts of speech backed by their own index/data file pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 4] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::Adjective,
        PartOfSpeech::Adverb,
    ];

    /// The single-letter tag used as the leading character of a synset id.
    pub fn id_letter(self) -> char {
        match self {
            PartOfSpeech::Noun => 'n',
            PartOfSpeech::Verb => 'v',
            PartOfSpeech::Adjective => 'a',
            PartOfSpeech::Adverb => 'r',
        }
    }

    /// Maps the leading letter of a synset id back to a part of speech.
    /// Adjective satellite ids (`s`) resolve through the adjective files.
    pub fn from_id_letter(letter: char) -> Option<PartOfSpeech> {
        match letter {
            'n' => Some(PartOfSpeech::Noun),
            'v' => Some(PartOfSpeech::Verb),
            'a' | 's' => Some(PartOfSpeech::Adjective),
            'r' => Some(PartOfSpeech::Adverb),
            _ => None,
        }
    }

    /// File-name suffix used by the WordNet distribution ("noun", "verb", ...).
    pub fn file_suffix(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adj",
            PartOfSpeech::Adverb => "adv",
        }
    }

    pub fn index_file(self) -> String {
        format!("index.{}", self.file_suffix())
    }

    pub fn data_file(self) -> String {
        format!("data.{}", self.file_suffix())
    }
}

impl std::fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PartOfSpeech::Noun => "noun",
                PartOfSpeech::Verb => "verb",
                PartOfSpeech::Adjective => "adjective",
                PartOfSpeech::Adverb => "adverb",
            }
        )
    }
}

impl std::str::FromStr for PartOfSpeech {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "n" | "noun" => Ok(PartOfSpeech::Noun),
            "v" | "verb" => Ok(PartOfSpeech::Verb),
            "a" | "adj" | "adjective" => Ok(PartOfSpeech::Adjective),
            "r" | "adv" | "adverb" => Ok(PartOfSpeech::Adverb),
            _ => Err(format!("Invalid part of speech: {}", s)),
        }
    }
}

/// The synset type letter carried by a data record. Unlike [`PartOfSpeech`]
/// this distinguishes head adjectives from satellites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynsetType {
    Noun,
    Verb,
    Adjective,
    AdjectiveSatellite,
    Adverb,
}

impl SynsetType {
    pub fn from_letter(letter: &str) -> Option<SynsetType> {
        match letter {
            "n" => Some(SynsetType::Noun),
            "v" => Some(SynsetType::Verb),
            "a" => Some(SynsetType::Adjective),
            "s" => Some(SynsetType::AdjectiveSatellite),
            "r" => Some(SynsetType::Adverb),
            _ => None,
        }
    }

    pub fn part_of_speech(self) -> PartOfSpeech {
        match self {
            SynsetType::Noun => PartOfSpeech::Noun,
            SynsetType::Verb => PartOfSpeech::Verb,
            SynsetType::Adjective | SynsetType::AdjectiveSatellite => PartOfSpeech::Adjective,
            SynsetType::Adverb => PartOfSpeech::Adverb,
        }
    }
}

impl std::fmt::Display for SynsetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SynsetType::Noun => "noun",
                SynsetType::Verb => "verb",
                SynsetType::Adjective => "adjective",
                SynsetType::AdjectiveSatellite => "adjective satellite",
                SynsetType::Adverb => "adverb",
            }
        )
    }
}

// --- Relation kinds ---

/// Typed relation ("pointer") kinds between synsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    Antonym,
    Hypernym,
    InstanceHypernym,
    Hyponym,
    InstanceHyponym,
    MemberHolonym,
    SubstanceHolonym,
    PartHolonym,
    MemberMeronym,
    SubstanceMeronym,
    PartMeronym,
    Attribute,
    DerivationallyRelatedForm,
    DomainOfSynsetTopic,
    MemberOfThisDomainTopic,
    DomainOfSynsetRegion,
    MemberOfThisDomainRegion,
    DomainOfSynsetUsage,
    MemberOfThisDomainUsage,
    Entailment,
    Cause,
    SeeAlso,
    VerbGroup,
    SimilarTo,
    ParticipleOfVerb,
    Pertainym,
}

/// Pointer symbol ↔ relation kind, exactly as encoded in the data files.
const SYMBOL_TABLE: [(&str, RelationKind); 26] = [
    ("!", RelationKind::Antonym),
    ("@", RelationKind::Hypernym),
    ("@i", RelationKind::InstanceHypernym),
    ("~", RelationKind::Hyponym),
    ("~i", RelationKind::InstanceHyponym),
    ("#m", RelationKind::MemberHolonym),
    ("#s", RelationKind::SubstanceHolonym),
    ("#p", RelationKind::PartHolonym),
    ("%m", RelationKind::MemberMeronym),
    ("%s", RelationKind::SubstanceMeronym),
    ("%p", RelationKind::PartMeronym),
    ("=", RelationKind::Attribute),
    ("+", RelationKind::DerivationallyRelatedForm),
    (";c", RelationKind::DomainOfSynsetTopic),
    ("-c", RelationKind::MemberOfThisDomainTopic),
    (";r", RelationKind::DomainOfSynsetRegion),
    ("-r", RelationKind::MemberOfThisDomainRegion),
    (";u", RelationKind::DomainOfSynsetUsage),
    ("-u", RelationKind::MemberOfThisDomainUsage),
    ("*", RelationKind::Entailment),
    (">", RelationKind::Cause),
    ("^", RelationKind::SeeAlso),
    ("$", RelationKind::VerbGroup),
    ("&", RelationKind::SimilarTo),
    ("<", RelationKind::ParticipleOfVerb),
    ("\\", RelationKind::Pertainym),
];

impl RelationKind {
    pub fn from_symbol(symbol: &str) -> Option<RelationKind> {
        SYMBOL_TABLE
            .iter()
            .find(|(sym, _)| *sym == symbol)
            .map(|(_, kind)| *kind)
    }

    /// The raw pointer symbol this kind is encoded as.
    pub fn symbol(self) -> &'static str {
        SYMBOL_TABLE
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(sym, _)| *sym)
            .unwrap_or("")
    }

    /// Stable snake_case name, usable for lookups via [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            RelationKind::Antonym => "antonym",
            RelationKind::Hypernym => "hypernym",
            RelationKind::InstanceHypernym => "instance_hypernym",
            RelationKind::Hyponym => "hyponym",
            RelationKind::InstanceHyponym => "instance_hyponym",
            RelationKind::MemberHolonym => "member_holonym",
            RelationKind::SubstanceHolonym => "substance_holonym",
            RelationKind::PartHolonym => "part_holonym",
            RelationKind::MemberMeronym => "member_meronym",
            RelationKind::SubstanceMeronym => "substance_meronym",
            RelationKind::PartMeronym => "part_meronym",
            RelationKind::Attribute => "attribute",
            RelationKind::DerivationallyRelatedForm => "derivationally_related_form",
            RelationKind::DomainOfSynsetTopic => "domain_of_synset_topic",
            RelationKind::MemberOfThisDomainTopic => "member_of_this_domain_topic",
            RelationKind::DomainOfSynsetRegion => "domain_of_synset_region",
            RelationKind::MemberOfThisDomainRegion => "member_of_this_domain_region",
            RelationKind::DomainOfSynsetUsage => "domain_of_synset_usage",
            RelationKind::MemberOfThisDomainUsage => "member_of_this_domain_usage",
            RelationKind::Entailment => "entailment",
            RelationKind::Cause => "cause",
            RelationKind::SeeAlso => "see_also",
            RelationKind::VerbGroup => "verb_group",
            RelationKind::SimilarTo => "similar_to",
            RelationKind::ParticipleOfVerb => "participle_of_verb",
            RelationKind::Pertainym => "pertainym",
        }
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for RelationKind {
    type Err = String;

    /// Accepts either the snake_case name or the raw pointer symbol.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(kind) = RelationKind::from_symbol(s) {
            return Ok(kind);
        }
        SYMBOL_TABLE
            .iter()
            .map(|(_, kind)| *kind)
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("Invalid relation kind: {}", s))
    }
}

// --- Lexical categories ---

/// One row of the fixed lexicographer-file table indexed by `lex_filenum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalCategory {
    pub name: &'static str,
    pub description: &'static str,
}

pub const LEXICAL_CATEGORIES: [LexicalCategory; 45] = [
    LexicalCategory { name: "adj.all", description: "all adjective clusters" },
    LexicalCategory { name: "adj.pert", description: "relational adjectives (pertainyms)" },
    LexicalCategory { name: "adv.all", description: "all adverbs" },
    LexicalCategory { name: "noun.Tops", description: "unique beginner for nouns" },
    LexicalCategory { name: "noun.act", description: "nouns denoting acts or actions" },
    LexicalCategory { name: "noun.animal", description: "nouns denoting animals" },
    LexicalCategory { name: "noun.artifact", description: "nouns denoting man-made objects" },
    LexicalCategory { name: "noun.attribute", description: "nouns denoting attributes of people and objects" },
    LexicalCategory { name: "noun.body", description: "nouns denoting body parts" },
    LexicalCategory { name: "noun.cognition", description: "nouns denoting cognitive processes and contents" },
    LexicalCategory { name: "noun.communication", description: "nouns denoting communicative processes and contents" },
    LexicalCategory { name: "noun.event", description: "nouns denoting natural events" },
    LexicalCategory { name: "noun.feeling", description: "nouns denoting feelings and emotions" },
    LexicalCategory { name: "noun.food", description: "nouns denoting foods and drinks" },
    LexicalCategory { name: "noun.group", description: "nouns denoting groupings of people or objects" },
    LexicalCategory { name: "noun.location", description: "nouns denoting spatial position" },
    LexicalCategory { name: "noun.motive", description: "nouns denoting goals" },
    LexicalCategory { name: "noun.object", description: "nouns denoting natural objects (not man-made)" },
    LexicalCategory { name: "noun.person", description: "nouns denoting people" },
    LexicalCategory { name: "noun.phenomenon", description: "nouns denoting natural phenomena" },
    LexicalCategory { name: "noun.plant", description: "nouns denoting plants" },
    LexicalCategory { name: "noun.possession", description: "nouns denoting possession and transfer of possession" },
    LexicalCategory { name: "noun.process", description: "nouns denoting natural processes" },
    LexicalCategory { name: "noun.quantity", description: "nouns denoting quantities and units of measure" },
    LexicalCategory { name: "noun.relation", description: "nouns denoting relations between people or things or ideas" },
    LexicalCategory { name: "noun.shape", description: "nouns denoting two and three dimensional shapes" },
    LexicalCategory { name: "noun.state", description: "nouns denoting stable states of affairs" },
    LexicalCategory { name: "noun.substance", description: "nouns denoting substances" },
    LexicalCategory { name: "noun.time", description: "nouns denoting time and temporal relations" },
    LexicalCategory { name: "verb.body", description: "verbs of grooming, dressing and bodily care" },
    LexicalCategory { name: "verb.change", description: "verbs of size, temperature change, intensifying, etc." },
    LexicalCategory { name: "verb.cognition", description: "verbs of thinking, judging, analyzing, doubting" },
    LexicalCategory { name: "verb.communication", description: "verbs of telling, asking, ordering, singing" },
    LexicalCategory { name: "verb.competition", description: "verbs of fighting, athletic activities" },
    LexicalCategory { name: "verb.consumption", description: "verbs of eating and drinking" },
    LexicalCategory { name: "verb.contact", description: "verbs of touching, hitting, tying, digging" },
    LexicalCategory { name: "verb.creation", description: "verbs of sewing, baking, painting, performing" },
    LexicalCategory { name: "verb.emotion", description: "verbs of feeling" },
    LexicalCategory { name: "verb.motion", description: "verbs of walking, flying, swimming" },
    LexicalCategory { name: "verb.perception", description: "verbs of seeing, hearing, feeling" },
    LexicalCategory { name: "verb.possession", description: "verbs of buying, selling, owning" },
    LexicalCategory { name: "verb.social", description: "verbs of political and social activities and events" },
    LexicalCategory { name: "verb.stative", description: "verbs of being, having, spatial relations" },
    LexicalCategory { name: "verb.weather", description: "verbs of raining, snowing, thawing, thundering" },
    LexicalCategory { name: "adj.ppl", description: "participial adjectives" },
];

pub fn lexical_category(filenum: u8) -> Option<&'static LexicalCategory> {
    LEXICAL_CATEGORIES.get(filenum as usize)
}

// --- Synset ids ---

/// Splits a synset id ("n05566097") into its part of speech and the byte
/// offset of the record in the matching data file. The numeric part of the
/// id is literally that offset; ids are never renumbered.
pub fn split_synset_id(id: &str) -> Result<(PartOfSpeech, u64)> {
    let mut chars = id.chars();
    let letter = chars
        .next()
        .ok_or_else(|| WndbError::InvalidArgument("empty synset id".to_string()))?;
    let pos = PartOfSpeech::from_id_letter(letter)
        .ok_or_else(|| WndbError::InvalidArgument(format!("bad synset id: {}", id)))?;
    let offset = chars
        .as_str()
        .parse::<u64>()
        .map_err(|_| WndbError::InvalidArgument(format!("bad synset id: {}", id)))?;
    Ok((pos, offset))
}

// --- Records ---

/// One lemma with its per-part-of-speech sense lists, as assembled from the
/// index files (or fetched whole from the key-value backend).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomographRecord {
    /// Canonical lowercased, underscore-joined lemma.
    pub lemma: String,
    pub senses: Vec<PosHomograph>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosHomograph {
    pub part_of_speech: PartOfSpeech,
    pub tagsense_count: u32,
    /// Full synset ids (pos letter + zero-padded data-file offset), in
    /// index-file order.
    pub synset_ids: Vec<String>,
}

impl HomographRecord {
    pub fn new(lemma: String) -> Self {
        HomographRecord {
            lemma,
            senses: Vec::new(),
        }
    }

    pub fn has_pos(&self, pos: PartOfSpeech) -> bool {
        self.senses.iter().any(|s| s.part_of_speech == pos)
    }

    /// Sense-cluster ids, optionally restricted to one part of speech.
    pub fn synset_ids(&self, pos: Option<PartOfSpeech>) -> Vec<&str> {
        self.senses
            .iter()
            .filter(|s| pos.is_none_or(|p| s.part_of_speech == p))
            .flat_map(|s| s.synset_ids.iter().map(String::as_str))
            .collect()
    }
}

/// One decoded index-file line: a lemma's senses for a single part of
/// speech, before merging into a [`HomographRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub lemma: String,
    pub part_of_speech: PartOfSpeech,
    pub tagsense_count: u32,
    pub synset_ids: Vec<String>,
}

/// One decoded data-file record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynsetRecord {
    pub synset_id: String,
    pub lexical_filenum: u8,
    pub synset_type: SynsetType,
    pub words: Vec<SynsetWord>,
    pub relations: Vec<RelationToken>,
    pub gloss: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynsetWord {
    /// Canonical stored form; multi-word collocations keep their underscores.
    pub form: String,
    pub lexical_id: u8,
}

impl SynsetWord {
    /// Display form with underscores rendered as spaces.
    pub fn display(&self) -> String {
        self.form.replace('_', " ")
    }
}

/// A decoded relation pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationToken {
    pub kind: RelationKind,
    /// Full destination synset id (pos letter + zero-padded offset).
    pub target: String,
    /// `None` for semantic (synset-to-synset) relations; word anchors for
    /// lexical relations.
    pub anchor: Option<WordAnchor>,
}

/// 1-based word positions a lexical relation is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordAnchor {
    pub source: usize,
    pub target: usize,
}

impl RelationToken {
    pub fn is_semantic(&self) -> bool {
        self.anchor.is_none()
    }
}

/// The stored shape of one evocation entry: three pipe-joined parallel
/// lists, exactly as the installation tooling dumps them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvocation {
    pub relations: String,
    pub means: String,
    pub medians: String,
}

/// A decoded evocation entry: parallel destination ids and strength scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvocationRecord {
    pub targets: Vec<String>,
    pub means: Vec<f64>,
    pub medians: Vec<f64>,
}

impl EvocationRecord {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn symbol_table_round_trips() {
        for (symbol, kind) in SYMBOL_TABLE {
            assert_eq!(RelationKind::from_symbol(symbol), Some(kind));
            assert_eq!(kind.symbol(), symbol);
        }
    }

    #[test]
    fn relation_kind_parses_names_and_symbols() {
        assert_eq!(RelationKind::from_str("hyponym"), Ok(RelationKind::Hyponym));
        assert_eq!(RelationKind::from_str("~"), Ok(RelationKind::Hyponym));
        assert_eq!(RelationKind::from_str("@i"), Ok(RelationKind::InstanceHypernym));
        assert_eq!(
            RelationKind::from_str("member_holonym"),
            Ok(RelationKind::MemberHolonym)
        );
        assert!(RelationKind::from_str("nonsense").is_err());
    }

    #[test]
    fn lexical_category_table_is_bounded() {
        assert_eq!(lexical_category(0).unwrap().name, "adj.all");
        assert_eq!(lexical_category(18).unwrap().name, "noun.person");
        assert_eq!(lexical_category(44).unwrap().name, "adj.ppl");
        assert!(lexical_category(45).is_none());
    }

    #[test]
    fn synset_id_splits_into_pos_and_offset() {
        let (pos, offset) = split_synset_id("n05566097").unwrap();
        assert_eq!(pos, PartOfSpeech::Noun);
        assert_eq!(offset, 5566097);

        // Satellite ids resolve through the adjective data file.
        let (pos, _) = split_synset_id("s00001740").unwrap();
        assert_eq!(pos, PartOfSpeech::Adjective);

        assert!(split_synset_id("x123").is_err());
        assert!(split_synset_id("n12x4").is_err());
        assert!(split_synset_id("").is_err());
    }

    #[test]
    fn homograph_record_filters_ids_by_pos() {
        let record = HomographRecord {
            lemma: "bat".to_string(),
            senses: vec![
                PosHomograph {
                    part_of_speech: PartOfSpeech::Noun,
                    tagsense_count: 5,
                    synset_ids: vec!["n01".to_string(), "n02".to_string()],
                },
                PosHomograph {
                    part_of_speech: PartOfSpeech::Verb,
                    tagsense_count: 2,
                    synset_ids: vec!["v03".to_string()],
                },
            ],
        };
        assert_eq!(record.synset_ids(None).len(), 3);
        assert_eq!(record.synset_ids(Some(PartOfSpeech::Verb)), vec!["v03"]);
        assert!(record.synset_ids(Some(PartOfSpeech::Adverb)).is_empty());
    }
}
