//! Search-style commands: `search`, `context`, and `suggest`.
//!
//! All three print ranked [`SearchResult`]s in the same layout. Relevance
//! is on the engine's 0–100 scale.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use context_index_core::{ContextEngine, DateRange, SearchOptions, SearchResult, Store};

/// Longest excerpt printed per result, in characters.
const EXCERPT_CHARS: usize = 160;

/// CLI-level search filters, before defaults are applied.
#[derive(Debug, Default, Clone)]
pub struct SearchArgs {
    pub source: Option<String>,
    pub content_type: Option<String>,
    pub limit: Option<usize>,
    pub threshold: Option<f64>,
    /// `YYYY-MM-DD`, inclusive.
    pub since: Option<String>,
    /// `YYYY-MM-DD`, inclusive.
    pub until: Option<String>,
    /// Print the score breakdown under each result.
    pub explain: bool,
}

impl SearchArgs {
    /// Merge these filters over the engine's configured defaults.
    pub fn to_options(&self, defaults: SearchOptions) -> Result<SearchOptions> {
        let mut options = defaults;
        if let Some(ref source) = self.source {
            options = options.source(source.clone());
        }
        if let Some(ref content_type) = self.content_type {
            options = options.content_type(content_type.clone());
        }
        if let Some(limit) = self.limit {
            if limit == 0 {
                bail!("--limit must be >= 1");
            }
            options = options.limit(limit);
        }
        if let Some(threshold) = self.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                bail!("--threshold must be in [0.0, 1.0]");
            }
            options = options.threshold(threshold);
        }

        let start = self.since.as_deref().map(start_of_day).transpose()?;
        let end = self.until.as_deref().map(end_of_day).transpose()?;
        if start.is_some() || end.is_some() {
            options = options.date_range(DateRange { start, end });
        }
        Ok(options)
    }
}

pub async fn run_search<S: Store>(
    engine: &mut ContextEngine<S>,
    query: &str,
    args: &SearchArgs,
) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }
    let options = args.to_options(engine.default_options())?;
    let results = engine.search(query, &options).await;
    print_results(&results, args.explain);
    Ok(())
}

pub async fn run_context<S: Store>(
    engine: &mut ContextEngine<S>,
    query: &str,
    consumer: &str,
) -> Result<()> {
    let results = engine.active_context(query, consumer).await;
    print_results(&results, false);
    Ok(())
}

pub fn run_suggest<S: Store>(
    engine: &ContextEngine<S>,
    current_source: &str,
    terms: &[String],
) -> Result<()> {
    let results = engine.smart_suggestions(current_source, terms);
    print_results(&results, false);
    Ok(())
}

/// Print results; `explain` adds the score breakdown line.
pub fn print_results(results: &[SearchResult], explain: bool) {
    if results.is_empty() {
        println!("No results.");
        return;
    }

    for (i, result) in results.iter().enumerate() {
        println!(
            "{}. [{:.2}] {} / {}",
            i + 1,
            result.relevance,
            result.source,
            result.content_type
        );
        println!("    indexed: {}", result.indexed_at.format("%Y-%m-%d %H:%M"));
        if !result.keywords.is_empty() {
            println!("    keywords: {}", result.keywords.join(", "));
        }
        println!("    excerpt: \"{}\"", excerpt(&result.content));
        if explain {
            let e = &result.explain;
            println!(
                "    score: similarity {:.3} x recency {:.2} x interaction {:.3} x keywords {:.2}",
                e.similarity, e.recency, e.interaction, e.keyword_boost
            );
        }
        println!("    id: {}", result.id);
        println!();
    }
}

fn excerpt(content: &str) -> String {
    let flat = content.replace('\n', " ");
    let flat = flat.trim();
    if flat.chars().count() <= EXCERPT_CHARS {
        return flat.to_string();
    }
    let cut: String = flat.chars().take(EXCERPT_CHARS).collect();
    format!("{}…", cut.trim_end())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

fn start_of_day(s: &str) -> Result<DateTime<Utc>> {
    let date = parse_date(s)?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .with_context(|| format!("Invalid date '{}'", s))
}

fn end_of_day(s: &str) -> Result<DateTime<Utc>> {
    let date = parse_date(s)?;
    date.and_hms_milli_opt(23, 59, 59, 999)
        .map(|dt| dt.and_utc())
        .with_context(|| format!("Invalid date '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_override_defaults() {
        let args = SearchArgs {
            source: Some("notes".to_string()),
            limit: Some(3),
            ..SearchArgs::default()
        };
        let options = args.to_options(SearchOptions::default()).unwrap();
        assert_eq!(options.source.as_deref(), Some("notes"));
        assert_eq!(options.limit, 3);
        assert_eq!(options.threshold, 0.3);
        assert!(options.date_range.is_none());
    }

    #[test]
    fn test_date_bounds_are_inclusive_days() {
        let args = SearchArgs {
            since: Some("2024-03-01".to_string()),
            until: Some("2024-03-02".to_string()),
            ..SearchArgs::default()
        };
        let range = args
            .to_options(SearchOptions::default())
            .unwrap()
            .date_range
            .unwrap();
        assert_eq!(range.start.unwrap().to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert!(range.contains(end_of_day("2024-03-02").unwrap()));
        assert!(!range.contains(start_of_day("2024-03-03").unwrap()));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let bad_date = SearchArgs {
            since: Some("03/01/2024".to_string()),
            ..SearchArgs::default()
        };
        assert!(bad_date.to_options(SearchOptions::default()).is_err());

        let bad_threshold = SearchArgs {
            threshold: Some(2.0),
            ..SearchArgs::default()
        };
        assert!(bad_threshold.to_options(SearchOptions::default()).is_err());
    }

    #[test]
    fn test_excerpt_truncates_on_chars() {
        let long = "é".repeat(400);
        let e = excerpt(&long);
        assert_eq!(e.chars().count(), EXCERPT_CHARS + 1);
        assert_eq!(excerpt("a\nb"), "a b");
    }
}
