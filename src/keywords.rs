use rust_stemmers::Stemmer;
use serde::Serialize;
use std::collections::HashMap;

use crate::language::StemmerLanguage;

/// A term and its normalized importance score. Output order is ranking
/// order.
#[derive(Debug, Clone, Serialize)]
pub struct Keyword {
    pub term: String,
    pub weight: f64,
}

/// Frequency-based keyword extraction over stemmed terms. Words are
/// lowercased, stop words and short tokens dropped, and the remaining stems
/// weighted by frequency normalized against the most frequent stem. Only
/// terms at or above the salience threshold are returned, most salient
/// first. The surfaced term is the first form seen for its stem.
pub struct KeywordExtractor {
    salience_threshold: f64,
}

impl KeywordExtractor {
    pub fn new(salience_threshold: f64) -> Self {
        Self { salience_threshold }
    }

    pub fn extract(&self, text: &str, profile: StemmerLanguage) -> Vec<Keyword> {
        let stemmer = Stemmer::create(profile.algorithm());
        let stop = stop_words(profile);

        // stem -> (first surface form, occurrences)
        let mut counts: HashMap<String, (String, u64)> = HashMap::new();
        for raw in text.split(|c: char| !c.is_alphanumeric()) {
            let word = raw.to_lowercase();
            if word.chars().count() < 3 || stop.contains(&word.as_str()) {
                continue;
            }

            let stem = stemmer.stem(&word).to_string();
            let entry = counts.entry(stem).or_insert_with(|| (word.clone(), 0));
            entry.1 += 1;
        }

        let max = counts.values().map(|(_, count)| *count).max().unwrap_or(0);
        if max == 0 {
            return Vec::new();
        }

        let mut keywords: Vec<Keyword> = counts
            .into_values()
            .map(|(term, count)| Keyword {
                term,
                weight: count as f64 / max as f64,
            })
            .filter(|k| k.weight >= self.salience_threshold)
            .collect();

        keywords.sort_by(|a, b| b.weight.total_cmp(&a.weight).then_with(|| a.term.cmp(&b.term)));
        keywords
    }
}

fn stop_words(profile: StemmerLanguage) -> &'static [&'static str] {
    match profile {
        StemmerLanguage::English => &[
            "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her",
            "was", "one", "our", "out", "has", "him", "his", "how", "its", "she", "too", "use",
            "that", "with", "have", "this", "will", "your", "from", "they", "been", "were",
            "them", "than", "then", "there", "their", "what", "when", "which", "would", "about",
            "into", "more", "some", "could", "these", "other", "after", "over", "such", "only",
        ],
        StemmerLanguage::French => &[
            "les", "des", "une", "est", "dans", "pour", "que", "qui", "sur", "avec", "pas",
            "par", "plus", "mais", "comme", "tout", "nous", "vous", "ils", "elles", "son",
            "ses", "leur", "aux", "ces", "cette", "ont", "sont", "être", "avoir", "fait",
            "aussi", "bien", "encore", "sans", "sous", "entre", "après", "avant", "depuis",
            "pendant", "était", "cela",
        ],
    }
}
