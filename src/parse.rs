//! Pure decoders for the flat-file record grammars.
//!
//! Nothing in this module performs I/O: every function takes one raw line
//! (or one stored value) and either produces a structured record or a
//! [`WndbError::Decode`] describing how the line violates the grammar.

use crate::error::{Result, WndbError};
use crate::models::{
    EvocationRecord, HomographRecord, IndexEntry, PartOfSpeech, PosHomograph, RawEvocation,
    RelationKind, RelationToken, SynsetRecord, SynsetType, SynsetWord, WordAnchor,
    lexical_category,
};

/// Canonicalizes a lookup term: case-folded, spaces joined with underscores.
pub fn normalize_term(term: &str) -> String {
    term.replace(' ', "_").to_lowercase()
}

/// Decodes one index-file line:
///
/// `lemma pos synset_cnt p_cnt [ptr_symbol...] sense_cnt tagsense_cnt synset_offset...`
///
/// The pointer-symbol region has a variable length and is skipped using its
/// own declared count (`p_cnt`); the tail must carry exactly `synset_cnt`
/// offsets.
pub fn decode_index_line(line: &str) -> Result<IndexEntry> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 6 {
        return Err(WndbError::decode(format!(
            "index line has too few fields: {:?}",
            line
        )));
    }

    let lemma = tokens[0].to_string();
    let pos_token = tokens[1];
    let pos = single_letter(pos_token)
        .and_then(PartOfSpeech::from_id_letter)
        .ok_or_else(|| {
            WndbError::decode(format!("bad part of speech {:?} for lemma {:?}", pos_token, lemma))
        })?;

    let synset_count = parse_decimal(tokens[2], "synset count", &lemma)?;
    let pointer_count = parse_decimal(tokens[3], "pointer count", &lemma)?;

    // Skip the pointer symbols, then sense_cnt and tagsense_cnt precede the
    // offset list.
    let tail_start = 4 + pointer_count;
    if tokens.len() < tail_start + 2 {
        return Err(WndbError::decode(format!(
            "index line for {:?} truncated inside the pointer-symbol region",
            lemma
        )));
    }
    let tagsense_count = parse_decimal(tokens[tail_start + 1], "tagsense count", &lemma)? as u32;

    let offsets = &tokens[tail_start + 2..];
    if offsets.len() != synset_count {
        return Err(WndbError::decode(format!(
            "index line for {:?} declares {} synsets but lists {} offsets",
            lemma,
            synset_count,
            offsets.len()
        )));
    }

    let mut synset_ids = Vec::with_capacity(offsets.len());
    for offset in offsets {
        if offset.parse::<u64>().is_err() {
            return Err(WndbError::decode(format!(
                "bad synset offset {:?} for lemma {:?}",
                offset, lemma
            )));
        }
        synset_ids.push(format!("{}{}", pos.id_letter(), offset));
    }

    Ok(IndexEntry {
        lemma,
        part_of_speech: pos,
        tagsense_count,
        synset_ids,
    })
}

/// Decodes one data-file line into a synset record:
///
/// `offset lex_filenum ss_type w_cnt (word lex_id)* p_cnt (ptr)* [frames] | gloss`
///
/// `w_cnt` and the lexical ids are hexadecimal; `p_cnt` is decimal; the
/// offset echoed at the head of the line must match the seek target, which
/// guards against ids pointing into the middle of a record. Verb frame data
/// after the pointers is ignored.
pub fn decode_synset_line(line: &str, synset_id: &str, expected_offset: u64) -> Result<SynsetRecord> {
    let (data, gloss) = line.split_once(" | ").ok_or_else(|| {
        WndbError::decode(format!("synset record {} is missing its gloss separator", synset_id))
    })?;

    let tokens: Vec<&str> = data.split_whitespace().collect();
    let mut cursor = Cursor::new(&tokens, synset_id);

    let offset_echo = cursor.next("offset")?;
    match offset_echo.parse::<u64>() {
        Ok(offset) if offset == expected_offset => {}
        _ => {
            return Err(WndbError::decode(format!(
                "synset record {} echoes offset {:?}, expected {}",
                synset_id, offset_echo, expected_offset
            )));
        }
    }

    let filenum_token = cursor.next("lexical filenum")?;
    let lexical_filenum: u8 = filenum_token.parse().map_err(|_| {
        WndbError::decode(format!(
            "bad lexical filenum {:?} in synset {}",
            filenum_token, synset_id
        ))
    })?;
    if lexical_category(lexical_filenum).is_none() {
        return Err(WndbError::decode(format!(
            "lexical filenum {} out of range in synset {}",
            lexical_filenum, synset_id
        )));
    }

    let type_token = cursor.next("synset type")?;
    let synset_type = SynsetType::from_letter(type_token).ok_or_else(|| {
        WndbError::decode(format!("bad synset type {:?} in synset {}", type_token, synset_id))
    })?;

    let word_count_token = cursor.next("word count")?;
    let word_count = usize::from_str_radix(word_count_token, 16).map_err(|_| {
        WndbError::decode(format!(
            "bad hex word count {:?} in synset {}",
            word_count_token, synset_id
        ))
    })?;
    if word_count == 0 {
        return Err(WndbError::decode(format!("synset {} has no words", synset_id)));
    }

    let mut words = Vec::with_capacity(word_count);
    for _ in 0..word_count {
        let form = cursor.next("word")?.to_string();
        let lex_id_token = cursor.next("lexical id")?;
        let lexical_id = u8::from_str_radix(lex_id_token, 16).map_err(|_| {
            WndbError::decode(format!(
                "bad hex lexical id {:?} in synset {}",
                lex_id_token, synset_id
            ))
        })?;
        words.push(SynsetWord { form, lexical_id });
    }

    let relation_count_token = cursor.next("relation count")?;
    let relation_count: usize = relation_count_token.parse().map_err(|_| {
        WndbError::decode(format!(
            "bad relation count {:?} in synset {}",
            relation_count_token, synset_id
        ))
    })?;

    let mut relations = Vec::with_capacity(relation_count);
    for _ in 0..relation_count {
        let symbol = cursor.next("relation symbol")?;
        let target_offset = cursor.next("relation offset")?;
        let target_pos = cursor.next("relation part of speech")?;
        let source_dest = cursor.next("relation source/dest")?;
        relations.push(decode_relation_token(
            symbol,
            target_offset,
            target_pos,
            source_dest,
            word_count,
            synset_id,
        )?);
    }

    // Any remaining tokens are verb frame data, which this reader ignores.

    Ok(SynsetRecord {
        synset_id: synset_id.to_string(),
        lexical_filenum,
        synset_type,
        words,
        relations,
        gloss: gloss.trim().to_string(),
    })
}

/// Decodes one 4-field relation pointer. `source_dest` packs two 2-hex-digit
/// 1-based word indices; `0000` marks a semantic (synset-level) relation.
/// The source index is validated against the owning synset's word count; the
/// destination index can only be checked once the destination is resolved.
pub fn decode_relation_token(
    symbol: &str,
    target_offset: &str,
    target_pos: &str,
    source_dest: &str,
    source_word_count: usize,
    synset_id: &str,
) -> Result<RelationToken> {
    let kind = RelationKind::from_symbol(symbol).ok_or_else(|| {
        WndbError::decode(format!(
            "unknown pointer symbol {:?} in synset {}",
            symbol, synset_id
        ))
    })?;

    if target_offset.parse::<u64>().is_err() {
        return Err(WndbError::decode(format!(
            "bad relation offset {:?} in synset {}",
            target_offset, synset_id
        )));
    }
    let pos_letter = single_letter(target_pos).filter(|c| "nvasr".contains(*c)).ok_or_else(|| {
        WndbError::decode(format!(
            "bad relation part of speech {:?} in synset {}",
            target_pos, synset_id
        ))
    })?;
    let target = format!("{}{}", pos_letter, target_offset);

    if source_dest.len() != 4 || !source_dest.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WndbError::decode(format!(
            "bad source/dest field {:?} in synset {}",
            source_dest, synset_id
        )));
    }

    let bad_anchor = || {
        WndbError::decode(format!(
            "bad source/dest field {:?} in synset {}",
            source_dest, synset_id
        ))
    };
    let anchor = if source_dest == "0000" {
        None
    } else {
        let source = usize::from_str_radix(&source_dest[..2], 16).map_err(|_| bad_anchor())?;
        let dest = usize::from_str_radix(&source_dest[2..], 16).map_err(|_| bad_anchor())?;
        if source == 0 || dest == 0 {
            return Err(WndbError::decode(format!(
                "lexical relation in synset {} uses a zero word index ({})",
                synset_id, source_dest
            )));
        }
        if source > source_word_count {
            return Err(WndbError::decode(format!(
                "lexical relation in synset {} anchors source word {} but the synset has {} words",
                synset_id, source, source_word_count
            )));
        }
        Some(WordAnchor {
            source,
            target: dest,
        })
    };

    Ok(RelationToken {
        kind,
        target,
        anchor,
    })
}

/// Decodes a stored evocation entry: three pipe-delimited parallel lists
/// that must have equal lengths.
pub fn decode_evocation(raw: &RawEvocation) -> Result<EvocationRecord> {
    let targets: Vec<String> = raw.relations.split('|').map(str::to_string).collect();
    let means = parse_score_list(&raw.means, "means")?;
    let medians = parse_score_list(&raw.medians, "medians")?;

    if targets.len() != means.len() || targets.len() != medians.len() {
        return Err(WndbError::decode(format!(
            "evocation lists disagree in length: {} relations, {} means, {} medians",
            targets.len(),
            means.len(),
            medians.len()
        )));
    }

    Ok(EvocationRecord {
        targets,
        means,
        medians,
    })
}

fn parse_score_list(list: &str, what: &str) -> Result<Vec<f64>> {
    list.split('|')
        .map(|score| {
            score.parse::<f64>().map_err(|_| {
                WndbError::decode(format!("bad {} score {:?} in evocation entry", what, score))
            })
        })
        .collect()
}

/// Merges a decoded index entry into a homograph record, composing the full
/// synset ids. A part of speech already present is left untouched, so
/// re-scanning a prefix run never duplicates entries.
pub fn merge_index_entry(record: &mut HomographRecord, entry: IndexEntry) {
    if record.has_pos(entry.part_of_speech) {
        return;
    }
    record.senses.push(PosHomograph {
        part_of_speech: entry.part_of_speech,
        tagsense_count: entry.tagsense_count,
        synset_ids: entry.synset_ids,
    });
}

fn single_letter(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn parse_decimal(token: &str, what: &str, lemma: &str) -> Result<usize> {
    token.parse::<usize>().map_err(|_| {
        WndbError::decode(format!("bad {} {:?} for lemma {:?}", what, token, lemma))
    })
}

/// Token cursor that reports which field was missing when a line ends early.
struct Cursor<'a> {
    tokens: &'a [&'a str],
    position: usize,
    synset_id: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [&'a str], synset_id: &'a str) -> Self {
        Cursor {
            tokens,
            position: 0,
            synset_id,
        }
    }

    fn next(&mut self, what: &str) -> Result<&'a str> {
        let token = self.tokens.get(self.position).copied().ok_or_else(|| {
            WndbError::decode(format!(
                "synset record {} ends before its {} field",
                self.synset_id, what
            ))
        })?;
        self.position += 1;
        Ok(token)
    }
}
