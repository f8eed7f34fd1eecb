//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use ghfetch_core::{DEFAULT_BATCH_CONCURRENCY, RepoTarget};
use ghfetch_core::api::{
    DEFAULT_API_BASE_URL, DEFAULT_MAX_PAGES, DEFAULT_PAGE, DEFAULT_PER_PAGE, MAX_PER_PAGE,
};

/// Query the GitHub REST API and save the results as JSON.
///
/// Rate limiting is handled transparently: when the quota runs out the
/// request waits until the reset time and is sent again.
#[derive(Parser, Debug)]
#[command(name = "ghfetch")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write DEBUG logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Directory result files are written to
    #[arg(short, long, default_value = ".", global = true)]
    pub output_dir: PathBuf,

    /// Print results without saving them
    #[arg(long, global = true)]
    pub no_save: bool,

    /// API root URL
    #[arg(long, default_value = DEFAULT_API_BASE_URL, global = true)]
    pub api_url: String,

    /// Connect timeout in seconds (1-300)
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=300), global = true)]
    pub connect_timeout: u64,

    /// Whole-request timeout in seconds (1-600)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=600), global = true)]
    pub read_timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// Available operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search public repositories
    Search(SearchArgs),
    /// List one page of a repository's commits
    Commits(CommitsArgs),
    /// Collect commits across pages (one or more repositories)
    AllCommits(AllCommitsArgs),
    /// Get a file or directory listing
    Contents(ContentsArgs),
}

/// Page selection shared by single-page commands.
#[derive(ClapArgs, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Items per page (1-100)
    #[arg(long, default_value_t = DEFAULT_PER_PAGE, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PER_PAGE)))]
    pub per_page: u32,

    /// Page number (1-indexed)
    #[arg(long, default_value_t = DEFAULT_PAGE, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
}

#[derive(ClapArgs, Debug)]
pub struct SearchArgs {
    /// Search query, e.g. "data science"
    pub query: String,

    #[command(flatten)]
    pub pages: PageArgs,
}

#[derive(ClapArgs, Debug)]
pub struct CommitsArgs {
    /// Repository as owner/repo
    pub repository: RepoTarget,

    #[command(flatten)]
    pub pages: PageArgs,
}

#[derive(ClapArgs, Debug)]
pub struct AllCommitsArgs {
    /// Repositories as owner/repo
    #[arg(required = true)]
    pub repositories: Vec<RepoTarget>,

    /// Maximum pages of 100 commits per repository
    #[arg(short = 'm', long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: u32,

    /// Repositories collected at the same time (1-32)
    #[arg(short = 'c', long, default_value_t = DEFAULT_BATCH_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub concurrency: u8,
}

#[derive(ClapArgs, Debug)]
pub struct ContentsArgs {
    /// Repository as owner/repo
    pub repository: RepoTarget,

    /// Path inside the repository (empty for the root)
    #[arg(default_value = "")]
    pub path: String,

    /// Extra query parameter as key=value (repeatable), e.g. ref=main
    #[arg(long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_search_default_args_parses_successfully() {
        let args = Args::try_parse_from(["ghfetch", "search", "data science"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(!args.no_save);
        assert_eq!(args.output_dir, PathBuf::from("."));
        assert_eq!(args.api_url, "https://api.github.com");
        assert_eq!(args.connect_timeout, 10);
        assert_eq!(args.read_timeout, 30);
        match args.command {
            Command::Search(search) => {
                assert_eq!(search.query, "data science");
                assert_eq!(search.pages.per_page, 5);
                assert_eq!(search.pages.page, 1);
            }
            other => panic!("Expected search, got: {other:?}"),
        }
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["ghfetch", "-v", "search", "q"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["ghfetch", "search", "q", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["ghfetch", "--quiet", "search", "q"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let result = Args::try_parse_from(["ghfetch", "--help"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::DisplayHelp
        );
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let result = Args::try_parse_from(["ghfetch", "--version"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::DisplayVersion
        );
    }

    #[test]
    fn test_cli_missing_subcommand_returns_error() {
        let result = Args::try_parse_from(["ghfetch"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = Args::try_parse_from(["ghfetch", "--invalid-flag", "search", "q"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::UnknownArgument
        );
    }

    // ==================== Page Tests ====================

    #[test]
    fn test_cli_per_page_range() {
        let args =
            Args::try_parse_from(["ghfetch", "search", "q", "--per-page", "100"]).unwrap();
        assert!(matches!(args.command, Command::Search(s) if s.pages.per_page == 100));

        let result = Args::try_parse_from(["ghfetch", "search", "q", "--per-page", "101"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_cli_page_zero_rejected() {
        let result = Args::try_parse_from(["ghfetch", "search", "q", "--page", "0"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    // ==================== Repository Tests ====================

    #[test]
    fn test_cli_commits_parses_repository() {
        let args = Args::try_parse_from(["ghfetch", "commits", "octocat/Spoon-Knife"]).unwrap();
        match args.command {
            Command::Commits(commits) => {
                assert_eq!(commits.repository, RepoTarget::new("octocat", "Spoon-Knife"));
            }
            other => panic!("Expected commits, got: {other:?}"),
        }
    }

    #[test]
    fn test_cli_commits_rejects_bad_repository() {
        let result = Args::try_parse_from(["ghfetch", "commits", "octocat"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_cli_all_commits_defaults() {
        let args = Args::try_parse_from(["ghfetch", "all-commits", "a/b", "c/d"]).unwrap();
        match args.command {
            Command::AllCommits(all) => {
                assert_eq!(all.repositories.len(), 2);
                assert_eq!(all.max_pages, 2);
                assert_eq!(all.concurrency, 4);
            }
            other => panic!("Expected all-commits, got: {other:?}"),
        }
    }

    #[test]
    fn test_cli_all_commits_requires_repository() {
        assert!(Args::try_parse_from(["ghfetch", "all-commits"]).is_err());
    }

    #[test]
    fn test_cli_contents_params() {
        let args = Args::try_parse_from([
            "ghfetch",
            "contents",
            "samambea/cssBasics",
            "projWeb/css",
            "--param",
            "ref=main",
        ])
        .unwrap();
        match args.command {
            Command::Contents(contents) => {
                assert_eq!(contents.path, "projWeb/css");
                assert_eq!(
                    contents.params,
                    vec![("ref".to_string(), "main".to_string())]
                );
            }
            other => panic!("Expected contents, got: {other:?}"),
        }
    }

    #[test]
    fn test_cli_contents_path_defaults_to_root() {
        let args = Args::try_parse_from(["ghfetch", "contents", "o/r"]).unwrap();
        assert!(matches!(args.command, Command::Contents(c) if c.path.is_empty()));
    }

    #[test]
    fn test_parse_key_value_rejects_missing_equals() {
        assert!(parse_key_value("ref").is_err());
        assert!(parse_key_value("=main").is_err());
        assert_eq!(
            parse_key_value("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
    }
}
