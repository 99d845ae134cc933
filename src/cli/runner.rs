//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, FetchArgs};
use crate::config::{load_walk_file, KeysetConfig, SourceConfig, WalkConfig, WalkFile};
use crate::error::{Error, Result};
use crate::http::HttpSource;
use crate::stream::AsyncPager;
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch(args) => self.fetch(args).await,
            Commands::Validate => self.validate(),
        }
    }

    /// Walk the source, printing records as JSON lines
    async fn fetch(&self, args: &FetchArgs) -> Result<()> {
        let file = self.walk_file(args)?;
        let max_records = args.max_records.unwrap_or(usize::MAX);

        let source = HttpSource::new(file.source.clone())?;
        let mut pager = AsyncPager::new(file.walk.batch_size, source)?
            .with_times_limit(file.walk.times_limit_or_default());

        info!(
            url = %file.source.url,
            batch_size = file.walk.batch_size,
            keyset = file.source.keyset.is_some(),
            "starting walk"
        );
        let start = Instant::now();
        let mut walk = pager.walk();
        let mut printed = 0usize;

        'walk: while let Some(batch) = walk.next_batch().await {
            for record in batch? {
                if printed >= max_records {
                    break 'walk;
                }
                println!("{}", serde_json::to_string(&record)?);
                printed += 1;
            }
        }

        let stats = walk.stats();
        let termination = stats
            .termination
            .map_or_else(|| "record limit".to_string(), |t| t.to_string());
        info!(
            batches = stats.batches,
            records = printed,
            termination = %termination,
            "walk complete"
        );
        if self.cli.verbose {
            eprintln!(
                "Fetched {} records in {} batches ({}), {:.2}s",
                printed,
                stats.batches,
                termination,
                start.elapsed().as_secs_f64()
            );
        }
        Ok(())
    }

    /// Validate the walk file
    fn validate(&self) -> Result<()> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("validate requires --config <walk.yaml>"))?;
        let file = load_walk_file(path)?;

        println!("Walk file '{}' is valid", path.display());
        println!("  Source: {}", file.source.url);
        println!("  Batch size: {}", file.walk.batch_size);
        println!("  Times limit: {}", file.walk.times_limit_or_default());
        match &file.source.keyset {
            Some(keyset) => println!(
                "  Paging: keyset ({} = last {})",
                keyset.after_param, keyset.key_field
            ),
            None => println!("  Paging: page number ({})", file.source.page_param),
        }
        Ok(())
    }

    /// Walk file from `--config`, overridden by command-line options
    fn walk_file(&self, args: &FetchArgs) -> Result<WalkFile> {
        let base = match &self.cli.config {
            Some(path) => Some(load_walk_file(path)?),
            None => None,
        };
        let file = merge_args(base, args)?;
        file.validate()?;
        Ok(file)
    }
}

/// Apply command-line overrides on top of an optional walk file
fn merge_args(base: Option<WalkFile>, args: &FetchArgs) -> Result<WalkFile> {
    let mut file = match (base, &args.url) {
        (Some(mut file), url) => {
            if let Some(url) = url {
                file.source.url.clone_from(url);
            }
            file
        }
        (None, Some(url)) => WalkFile {
            walk: WalkConfig::default(),
            source: SourceConfig::new(url.clone()),
        },
        (None, None) => return Err(Error::config("fetch requires --url or --config")),
    };

    if let Some(batch_size) = args.batch_size {
        file.walk.batch_size = batch_size;
    }
    if let Some(times_limit) = args.times_limit {
        file.walk.times_limit = Some(times_limit);
    }

    let source = &mut file.source;
    if let Some(param) = &args.page_param {
        source.page_param.clone_from(param);
    }
    if let Some(param) = &args.limit_param {
        source.limit_param.clone_from(param);
    }
    if let Some(param) = &args.offset_param {
        source.offset_param = Some(param.clone());
    }
    if let Some(path) = &args.records_path {
        source.records_path.clone_from(path);
    }
    if let Some(path) = &args.total_path {
        source.total_path = Some(path.clone());
    }
    if let (Some(after_param), Some(key_field)) = (&args.after_param, &args.key_field) {
        source.keyset = Some(KeysetConfig {
            after_param: after_param.clone(),
            key_field: key_field.clone(),
        });
    }
    for header in &args.headers {
        let (name, value) = parse_header(header)?;
        source.headers.insert(name, value);
    }
    Ok(file)
}

/// Parse `Name: value`
fn parse_header(header: &str) -> Result<(String, String)> {
    let (name, value) = header
        .split_once(':')
        .ok_or_else(|| Error::invalid_value("header", format!("'{header}' is not 'Name: value'")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid_value("header", format!("'{header}' has no name")));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Authorization: Bearer abc").unwrap(),
            ("Authorization".to_string(), "Bearer abc".to_string())
        );
        assert_eq!(
            parse_header("X-Url:https://a.io").unwrap(),
            ("X-Url".to_string(), "https://a.io".to_string())
        );
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn test_merge_args_without_file() {
        let args = FetchArgs {
            url: Some("https://api.example.com/users".to_string()),
            batch_size: Some(50),
            records_path: Some("data".to_string()),
            after_param: Some("after".to_string()),
            key_field: Some("id".to_string()),
            headers: vec!["X-Token: t".to_string()],
            ..FetchArgs::default()
        };
        let file = merge_args(None, &args).unwrap();

        assert_eq!(file.walk.batch_size, 50);
        assert_eq!(file.walk.times_limit, None);
        assert_eq!(file.source.records_path, "data");
        assert_eq!(file.source.keyset.unwrap().key_field, "id");
        assert_eq!(file.source.headers.get("X-Token").map(String::as_str), Some("t"));
    }

    #[test]
    fn test_merge_args_overrides_file() {
        let base = WalkFile {
            walk: WalkConfig {
                batch_size: 10,
                times_limit: Some(3),
            },
            source: SourceConfig::new("https://a.io/items"),
        };
        let args = FetchArgs {
            times_limit: Some(9),
            page_param: Some("p".to_string()),
            ..FetchArgs::default()
        };
        let file = merge_args(Some(base), &args).unwrap();

        assert_eq!(file.walk.batch_size, 10);
        assert_eq!(file.walk.times_limit, Some(9));
        assert_eq!(file.source.url, "https://a.io/items");
        assert_eq!(file.source.page_param, "p");
    }

    #[test]
    fn test_merge_args_requires_source() {
        let err = merge_args(None, &FetchArgs::default()).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
