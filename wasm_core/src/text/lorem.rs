//! Lorem ipsum placeholder text built by shuffling a fixed word bank.
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

const CLASSIC_OPENING: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit";
const MAX_COUNT: u32 = 1000;

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in",
    "reprehenderit", "voluptate", "velit", "esse", "cillum", "eu", "fugiat", "nulla",
    "pariatur", "excepteur", "sint", "occaecat", "cupidatat", "non", "proident", "sunt",
    "culpa", "qui", "officia", "deserunt", "mollit", "anim", "id", "est", "laborum",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoremUnit {
    Words,
    Sentences,
    #[default]
    Paragraphs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoremOptions {
    pub unit: LoremUnit,
    pub count: u32,
    pub start_with_lorem: bool,
    /// Fixed seed for reproducible output; random when absent.
    pub seed: Option<u64>,
}

impl Default for LoremOptions {
    fn default() -> Self {
        Self {
            unit: LoremUnit::Paragraphs,
            count: 3,
            start_with_lorem: true,
            seed: None,
        }
    }
}

fn word(rng: &mut StdRng) -> &'static str {
    WORDS.choose(rng).copied().unwrap_or("lorem")
}

pub fn generate_lorem(options: &LoremOptions) -> Result<String> {
    if options.count == 0 {
        return Err(ToolError::invalid("count must be at least 1"));
    }
    if options.count > MAX_COUNT {
        return Err(ToolError::invalid(format!("count cannot exceed {MAX_COUNT}")));
    }
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let count = options.count as usize;

    let text = match options.unit {
        LoremUnit::Words => {
            let mut words: Vec<&str> = Vec::with_capacity(count);
            if options.start_with_lorem {
                words.extend(
                    CLASSIC_OPENING
                        .split_whitespace()
                        .map(|w| w.trim_end_matches(','))
                        .take(count),
                );
            }
            while words.len() < count {
                words.push(word(&mut rng));
            }
            words.join(" ")
        }
        LoremUnit::Sentences => sentences(&mut rng, count, options.start_with_lorem).join(" "),
        LoremUnit::Paragraphs => (0..count)
            .map(|idx| {
                let n = rng.random_range(4..=7);
                sentences(&mut rng, n, options.start_with_lorem && idx == 0).join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
    };
    Ok(text)
}

fn sentences(rng: &mut StdRng, count: usize, classic_first: bool) -> Vec<String> {
    (0..count)
        .map(|idx| {
            if idx == 0 && classic_first {
                format!("{CLASSIC_OPENING}.")
            } else {
                sentence(rng)
            }
        })
        .collect()
}

fn sentence(rng: &mut StdRng) -> String {
    let len = rng.random_range(8..=15);
    let mut words: Vec<&str> = (0..len).map(|_| word(rng)).collect();
    // Avoid the same word twice in a row.
    for idx in 1..words.len() {
        while words[idx] == words[idx - 1] {
            words[idx] = word(rng);
        }
    }
    let mut text = words.join(" ");
    if let Some(first) = text.get(0..1) {
        let upper = first.to_ascii_uppercase();
        text.replace_range(0..1, &upper);
    }
    text.push('.');
    text
}
