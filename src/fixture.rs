//! Miniature, format-exact dataset fixtures for tests.
//!
//! Renders real index/data files (with self-consistent byte offsets), the
//! prefix-index dump and, on demand, an evocation dump into a temporary
//! directory. Offset fields are fixed-width, so line lengths are stable and
//! offsets can be computed in one dry-run pass before the final render.

use crate::data::{self, PrefixIndex};
use crate::models::{PartOfSpeech, RawEvocation};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Specification of one data-file record. Relation targets are indices
/// into the spec list; the builder substitutes the rendered offsets.
pub(crate) struct SynsetSpec {
    pub pos: PartOfSpeech,
    pub lex_filenum: u8,
    pub type_letter: &'static str,
    pub words: &'static [(&'static str, u8)],
    /// (pointer symbol, target spec index, target id letter, source/dest hex)
    pub relations: &'static [(&'static str, usize, char, &'static str)],
    pub gloss: &'static str,
}

/// Specification of one index-file line. Synsets are spec indices.
pub(crate) struct IndexSpec {
    pub lemma: &'static str,
    pub pos: PartOfSpeech,
    pub tagsense_count: u32,
    pub ptr_symbols: &'static [&'static str],
    pub synsets: &'static [usize],
}

pub(crate) struct Fixture {
    _dir: TempDir,
    dict: PathBuf,
    data: PathBuf,
    synset_ids: Vec<String>,
}

impl Fixture {
    pub fn build(specs: &[SynsetSpec], indexes: &[IndexSpec]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let dict = dir.path().join("dict");
        let data = dir.path().join("data");
        fs::create_dir_all(&dict).unwrap();
        fs::create_dir_all(&data).unwrap();

        // Dry-run pass: line lengths do not depend on the offset values, so
        // rendering with zeroed offsets yields the real layout.
        let zeroed = vec![0u64; specs.len()];
        let mut offsets = vec![0u64; specs.len()];
        for pos in PartOfSpeech::ALL {
            let mut cursor = 0u64;
            for (i, spec) in specs.iter().enumerate().filter(|(_, s)| s.pos == pos) {
                offsets[i] = cursor;
                cursor += render_data_line(spec, 0, &zeroed).len() as u64 + 1;
            }
        }

        // Final render. All four data files exist in an installed dataset,
        // even when a fixture leaves some of them empty.
        for pos in PartOfSpeech::ALL {
            let mut content = String::new();
            for (i, spec) in specs.iter().enumerate().filter(|(_, s)| s.pos == pos) {
                content.push_str(&render_data_line(spec, offsets[i], &offsets));
                content.push('\n');
            }
            fs::write(dict.join(pos.data_file()), content).unwrap();
        }

        // Index files are sorted by lemma; the prefix table records the
        // first line offset per (pos, prefix).
        let mut prefix_index = PrefixIndex::default();
        for pos in PartOfSpeech::ALL {
            let mut entries: Vec<&IndexSpec> =
                indexes.iter().filter(|e| e.pos == pos).collect();
            entries.sort_by_key(|e| e.lemma);
            let mut content = String::new();
            for entry in entries {
                let prefix: String = entry.lemma.chars().take(2).collect();
                prefix_index.insert(pos, &prefix, content.len() as u64);
                content.push_str(&render_index_line(entry, &offsets));
                content.push('\n');
            }
            fs::write(dict.join(pos.index_file()), content).unwrap();
        }
        prefix_index
            .save(&data.join(data::PREFIX_INDEX_FILENAME))
            .unwrap();

        let synset_ids = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| format!("{}{:08}", spec.pos.id_letter(), offsets[i]))
            .collect();

        Fixture {
            _dir: dir,
            dict,
            data,
            synset_ids,
        }
    }

    /// A small dataset exercising every query path: the "bat" homographs
    /// (two noun senses, one verb sense), semantic and lexical relations,
    /// a multi-word lemma, and a same-prefix neighbor.
    pub fn standard() -> Fixture {
        let specs: &[SynsetSpec] = &[
            SynsetSpec {
                pos: PartOfSpeech::Noun,
                lex_filenum: 5,
                type_letter: "n",
                words: &[("bat", 0), ("chiropteran", 0)],
                relations: &[("@", 2, 'n', "0000"), ("~", 3, 'n', "0000")],
                gloss: "nocturnal mouselike mammal with forelimbs modified to form membranous wings",
            },
            SynsetSpec {
                pos: PartOfSpeech::Noun,
                lex_filenum: 6,
                type_letter: "n",
                words: &[("bat", 0)],
                relations: &[("+", 4, 'v', "0101")],
                gloss: "a club used for hitting a ball in various games",
            },
            SynsetSpec {
                pos: PartOfSpeech::Noun,
                lex_filenum: 5,
                type_letter: "n",
                words: &[("placental", 0), ("placental_mammal", 0)],
                relations: &[("~", 0, 'n', "0000")],
                gloss: "mammals having a placenta; all mammals except monotremes and marsupials",
            },
            SynsetSpec {
                pos: PartOfSpeech::Noun,
                lex_filenum: 5,
                type_letter: "n",
                words: &[("fruit_bat", 0)],
                relations: &[("@", 0, 'n', "0000")],
                gloss: "large tropical bat that feeds on fruit",
            },
            SynsetSpec {
                pos: PartOfSpeech::Verb,
                lex_filenum: 35,
                type_letter: "v",
                words: &[("bat", 0)],
                relations: &[("+", 1, 'n', "0101")],
                gloss: "strike with, or as if with a baseball bat",
            },
            SynsetSpec {
                pos: PartOfSpeech::Noun,
                lex_filenum: 6,
                type_letter: "n",
                words: &[("squash_racquet", 0), ("squash_racket", 0), ("bat", 1)],
                relations: &[],
                gloss: "a small racket with a long handle used for playing squash",
            },
            SynsetSpec {
                pos: PartOfSpeech::Noun,
                lex_filenum: 14,
                type_letter: "n",
                words: &[("batch", 0), ("clutch", 1)],
                relations: &[],
                gloss: "a collection of things or persons to be handled together",
            },
        ];
        let indexes: &[IndexSpec] = &[
            IndexSpec {
                lemma: "bat",
                pos: PartOfSpeech::Noun,
                tagsense_count: 5,
                ptr_symbols: &["@", "~", "+"],
                synsets: &[0, 1],
            },
            IndexSpec {
                lemma: "bat",
                pos: PartOfSpeech::Verb,
                tagsense_count: 2,
                ptr_symbols: &["+"],
                synsets: &[4],
            },
            IndexSpec {
                lemma: "batch",
                pos: PartOfSpeech::Noun,
                tagsense_count: 1,
                ptr_symbols: &[],
                synsets: &[6],
            },
            IndexSpec {
                lemma: "chiropteran",
                pos: PartOfSpeech::Noun,
                tagsense_count: 0,
                ptr_symbols: &["@"],
                synsets: &[0],
            },
            IndexSpec {
                lemma: "fruit_bat",
                pos: PartOfSpeech::Noun,
                tagsense_count: 0,
                ptr_symbols: &["@"],
                synsets: &[3],
            },
            IndexSpec {
                lemma: "placental",
                pos: PartOfSpeech::Noun,
                tagsense_count: 0,
                ptr_symbols: &["~"],
                synsets: &[2],
            },
            IndexSpec {
                lemma: "placental_mammal",
                pos: PartOfSpeech::Noun,
                tagsense_count: 0,
                ptr_symbols: &["~"],
                synsets: &[2],
            },
            IndexSpec {
                lemma: "squash_racquet",
                pos: PartOfSpeech::Noun,
                tagsense_count: 0,
                ptr_symbols: &[],
                synsets: &[5],
            },
        ];
        Fixture::build(specs, indexes)
    }

    pub fn dict_path(&self) -> &Path {
        &self.dict
    }

    pub fn data_path(&self) -> &Path {
        &self.data
    }

    /// The full id (pos letter + zero-padded offset) of the spec at `index`.
    pub fn synset_id(&self, index: usize) -> String {
        self.synset_ids[index].clone()
    }

    /// Writes an evocation dump: `(source id, [(target id, mean, median)])`
    /// per entry, stored pipe-joined under the id + "s" key.
    pub fn write_evocations(&self, entries: &[(String, Vec<(String, f64, f64)>)]) {
        let mut map = HashMap::new();
        for (source, targets) in entries {
            let join = |f: &dyn Fn(&(String, f64, f64)) -> String| {
                targets.iter().map(|t| f(t)).collect::<Vec<_>>().join("|")
            };
            map.insert(
                format!("{}s", source),
                RawEvocation {
                    relations: join(&|t| t.0.clone()),
                    means: join(&|t| t.1.to_string()),
                    medians: join(&|t| t.2.to_string()),
                },
            );
        }
        let file = File::create(self.data.join(data::EVOCATIONS_FILENAME)).unwrap();
        bincode::serialize_into(BufWriter::new(file), &map).unwrap();
    }
}

fn render_data_line(spec: &SynsetSpec, own_offset: u64, offsets: &[u64]) -> String {
    let mut line = format!(
        "{:08} {:02} {} {:02x}",
        own_offset,
        spec.lex_filenum,
        spec.type_letter,
        spec.words.len()
    );
    for (form, lex_id) in spec.words {
        line.push_str(&format!(" {} {:x}", form, lex_id));
    }
    line.push_str(&format!(" {:03}", spec.relations.len()));
    for (symbol, target, pos_letter, source_dest) in spec.relations {
        line.push_str(&format!(
            " {} {:08} {} {}",
            symbol, offsets[*target], pos_letter, source_dest
        ));
    }
    line.push_str(" | ");
    line.push_str(spec.gloss);
    line
}

fn render_index_line(entry: &IndexSpec, offsets: &[u64]) -> String {
    let mut line = format!(
        "{} {} {} {}",
        entry.lemma,
        entry.pos.id_letter(),
        entry.synsets.len(),
        entry.ptr_symbols.len()
    );
    for symbol in entry.ptr_symbols {
        line.push_str(&format!(" {}", symbol));
    }
    line.push_str(&format!(" {} {}", entry.synsets.len(), entry.tagsense_count));
    for target in entry.synsets {
        line.push_str(&format!(" {:08}", offsets[*target]));
    }
    line
}
