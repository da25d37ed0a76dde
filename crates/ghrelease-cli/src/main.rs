//! ghrelease - release notes and GitHub releases from the command line
//!
//! ## Commands
//!
//! - `notes`: Generate release notes from commits since the last tag
//! - `release create`: Create a release, optionally with assets
//! - `release get`: Show one release or all of them
//! - `release update`: Change a release and its assets
//! - `release delete`: Delete a release

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};

use ghrelease_core::{
    AssetChanges, CancellationToken, ConfigSource, GitHubRepository, GitRepository,
    LocalRepository, NewRelease, NotesRequest, OutputMode, Release, ReleaseApi, ReleaseChanges,
    ReleaseError, ReleaseNotesFormat, ReleaseNotesService, ReleaseSelector, Releaser,
};
use ghrelease_github::{GitHubClient, GitHubConfig, DEFAULT_API_URL, DEFAULT_UPLOADS_URL};

#[derive(Parser)]
#[command(name = "ghrelease")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Release notes from git history and GitHub issues", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create release notes from the issues closed since the last tag
    Notes(NotesArgs),

    /// Manage GitHub releases
    Release {
        #[command(subcommand)]
        action: ReleaseAction,
    },
}

#[derive(Subcommand)]
enum ReleaseAction {
    /// Create a GitHub release
    Create(CreateArgs),

    /// Get GitHub releases
    Get(GetArgs),

    /// Update a GitHub release
    Update(UpdateArgs),

    /// Delete a GitHub release
    Delete(DeleteArgs),
}

/// Connection to the GitHub API.
#[derive(Args, Clone)]
struct GitHubArgs {
    /// GitHub token used to call the API
    #[arg(short = 't', long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Base URL for release asset uploads
    #[arg(long, env = "GITHUB_UPLOADS_URL", default_value = DEFAULT_UPLOADS_URL)]
    uploads_url: String,
}

impl GitHubArgs {
    fn config(&self) -> Result<GitHubConfig> {
        let token = self
            .github_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .context("A GitHub token is required: pass --github-token or set GITHUB_TOKEN")?;
        let mut config = GitHubConfig::new(token);
        config.api_url = self.api_url.clone();
        config.uploads_url = self.uploads_url.clone();
        Ok(config)
    }
}

#[derive(Args)]
struct NotesArgs {
    /// Local git repository to read history from
    #[arg(short = 'r', long, default_value = ".")]
    repository_dir: PathBuf,

    /// Header written above the release notes
    #[arg(long)]
    header: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = FormatArg::Markdown)]
    format: FormatArg,

    /// Write to this file instead of stdout
    #[arg(short = 'o', long)]
    output_file: Option<PathBuf>,

    /// How to combine with an existing output file
    #[arg(short = 'm', long, value_enum, default_value_t = OutputModeArg::Overwrite)]
    output_mode: OutputModeArg,

    /// Only tags matching this regular expression start the commit range
    #[arg(short = 'g', long)]
    git_tag_regex: Option<String>,

    /// Configuration file (.json, .jsonc, .yml or .yaml)
    #[arg(short = 'c', long)]
    configuration_file: Option<PathBuf>,

    /// Always recompute instead of reusing cached notes
    #[arg(long)]
    no_cache: bool,

    #[command(flatten)]
    github: GitHubArgs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Markdown,
    PlainText,
}

impl From<FormatArg> for ReleaseNotesFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => ReleaseNotesFormat::Markdown,
            FormatArg::PlainText => ReleaseNotesFormat::PlainText,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputModeArg {
    Overwrite,
    Append,
    Prepend,
}

impl From<OutputModeArg> for OutputMode {
    fn from(arg: OutputModeArg) -> Self {
        match arg {
            OutputModeArg::Overwrite => OutputMode::Overwrite,
            OutputModeArg::Append => OutputMode::Append,
            OutputModeArg::Prepend => OutputMode::Prepend,
        }
    }
}

/// Which GitHub repository a release command talks to.
#[derive(Args)]
struct RepositoryArgs {
    /// Repository owner (requires --repo)
    #[arg(long, requires = "repo")]
    owner: Option<String>,

    /// Repository name (requires --owner)
    #[arg(long, requires = "owner")]
    repo: Option<String>,

    /// Local clone whose GitHub remote names the repository
    #[arg(short = 'r', long, default_value = ".")]
    repository_dir: PathBuf,

    #[command(flatten)]
    github: GitHubArgs,
}

impl RepositoryArgs {
    fn repository(&self) -> Result<GitHubRepository> {
        if let (Some(owner), Some(name)) = (&self.owner, &self.repo) {
            return Ok(GitHubRepository::new(owner.as_str(), name.as_str())?);
        }
        let local = GitRepository::open(&self.repository_dir).with_context(|| {
            format!(
                "Failed to open git repository at {}",
                self.repository_dir.display()
            )
        })?;
        let remotes = local.remotes().context("Failed to read git remotes")?;
        Ok(GitHubRepository::find_by_remotes(&remotes)?)
    }

    fn releaser(&self) -> Result<Releaser<GitHubClient>> {
        let repository = self.repository()?;
        let client = GitHubClient::new(repository, self.github.config()?)
            .context("Failed to set up the GitHub client")?;
        Ok(Releaser::new(client))
    }
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SelectorArgs {
    /// Release id
    #[arg(long)]
    id: Option<u64>,

    /// Release tag name
    #[arg(long)]
    tag: Option<String>,
}

impl SelectorArgs {
    fn selector(&self) -> Result<ReleaseSelector> {
        match (self.id, &self.tag) {
            (Some(id), None) => Ok(ReleaseSelector::Id(id)),
            (None, Some(tag)) if !tag.trim().is_empty() => Ok(ReleaseSelector::Tag(tag.clone())),
            (None, Some(_)) => bail!("Tag name must not be empty"),
            _ => bail!("Pass exactly one of --id or --tag"),
        }
    }
}

#[derive(Args)]
struct CreateArgs {
    /// Tag name of the release
    #[arg(long)]
    tag: String,

    /// Name of the release
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Commitish the tag points at when it does not exist yet
    #[arg(long)]
    target: Option<String>,

    /// File holding the release body, usually markdown
    #[arg(long)]
    body: Option<PathBuf>,

    /// Mark the release as a pre-release
    #[arg(long)]
    prerelease: bool,

    /// Keep the release as a draft; publish with `--draft false`
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    draft: bool,

    /// Files to attach
    #[arg(long, num_args = 1..)]
    assets: Vec<PathBuf>,

    #[command(flatten)]
    repository: RepositoryArgs,
}

impl CreateArgs {
    fn new_release(&self) -> Result<NewRelease> {
        let mut new = NewRelease::new(self.tag.clone());
        new.name = self.name.clone().unwrap_or_default();
        new.target_commitish = self.target.clone().unwrap_or_default();
        new.body = read_body(self.body.as_deref())?.unwrap_or_default();
        new.prerelease = self.prerelease;
        new.draft = self.draft;
        new.assets = self.assets.clone();
        Ok(new)
    }
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct GetSelectorArgs {
    /// Release id
    #[arg(long)]
    id: Option<u64>,

    /// Release tag name
    #[arg(long)]
    tag: Option<String>,

    /// List every release
    #[arg(long)]
    all: bool,
}

#[derive(Args)]
struct GetArgs {
    #[command(flatten)]
    which: GetSelectorArgs,

    #[command(flatten)]
    repository: RepositoryArgs,
}

#[derive(Args)]
struct UpdateArgs {
    #[command(flatten)]
    selector: SelectorArgs,

    /// New name of the release
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// New tag name of the release
    #[arg(long)]
    new_tag: Option<String>,

    /// New target commitish
    #[arg(long)]
    target: Option<String>,

    /// File holding the new release body
    #[arg(long)]
    body: Option<PathBuf>,

    /// Whether the release is a pre-release
    #[arg(long)]
    prerelease: Option<bool>,

    /// Whether the release is a draft
    #[arg(long)]
    draft: Option<bool>,

    /// Files to attach
    #[arg(long, num_args = 1..)]
    assets: Vec<PathBuf>,

    /// Delete every existing asset first
    #[arg(long)]
    clear_assets: bool,

    /// Replace existing assets that have the same name
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    overwrite_assets: bool,

    #[command(flatten)]
    repository: RepositoryArgs,
}

impl UpdateArgs {
    fn changes(&self) -> Result<(ReleaseChanges, AssetChanges)> {
        let changes = ReleaseChanges {
            name: self.name.clone(),
            tag_name: self.new_tag.clone(),
            target_commitish: self.target.clone(),
            body: read_body(self.body.as_deref())?,
            draft: self.draft,
            prerelease: self.prerelease,
        };
        let assets = AssetChanges {
            add: self.assets.clone(),
            clear_existing: self.clear_assets,
            overwrite_existing: self.overwrite_assets,
        };
        Ok((changes, assets))
    }
}

#[derive(Args)]
struct DeleteArgs {
    #[command(flatten)]
    selector: SelectorArgs,

    #[command(flatten)]
    repository: RepositoryArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    ghrelease_core::init_tracing(cli.json, level);

    let cancel = cancel_on_ctrl_c();
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Notes(args) => cmd_notes(&args, &cancel, &mut stdout).await,
        Commands::Release { action } => match action {
            ReleaseAction::Create(args) => {
                let releaser = args.repository.releaser()?;
                cmd_release_create(&releaser, &args, &cancel, &mut stdout).await
            }
            ReleaseAction::Get(args) => {
                let releaser = args.repository.releaser()?;
                cmd_release_get(&releaser, &args.which, &mut stdout).await
            }
            ReleaseAction::Update(args) => {
                let releaser = args.repository.releaser()?;
                cmd_release_update(&releaser, &args, &cancel, &mut stdout).await
            }
            ReleaseAction::Delete(args) => {
                let releaser = args.repository.releaser()?;
                cmd_release_delete(&releaser, &args.selector, &mut stdout).await
            }
        },
    }
}

/// Token cancelled on the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            on_signal.cancel();
        }
    });
    cancel
}

/// Body text from `path`, if given.
fn read_body(path: Option<&Path>) -> Result<Option<String>> {
    path.map(|p| {
        std::fs::read_to_string(p)
            .with_context(|| format!("The body file '{}' could not be read", p.display()))
    })
    .transpose()
}

fn notes_request(args: &NotesArgs) -> Result<NotesRequest> {
    let mut request = NotesRequest::new(&args.repository_dir);
    request.no_cache = args.no_cache;
    if let Some(pattern) = &args.git_tag_regex {
        request.tag_pattern = Some(
            Regex::new(pattern).with_context(|| format!("Invalid tag regex '{}'", pattern))?,
        );
    }
    if let Some(file) = &args.configuration_file {
        request.config = ConfigSource::File(file.clone());
    }
    Ok(request)
}

/// Generate release notes and write them to stdout or a file
async fn cmd_notes(
    args: &NotesArgs,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> Result<()> {
    let request = notes_request(args)?;
    let config = args.github.config()?;
    let service = ReleaseNotesService::new(move |repository: &GitHubRepository| {
        GitHubClient::new(repository.clone(), config.clone()).map_err(ReleaseError::from)
    });

    let notes = service
        .notes(&request, cancel)
        .await
        .context("Failed to create release notes")?;

    let mode = match &args.output_file {
        Some(_) => OutputMode::from(args.output_mode),
        None => OutputMode::Overwrite,
    };
    let formatter = ReleaseNotesFormat::from(args.format).formatter(mode)?;
    let formatted = formatter.format(args.header.as_deref(), &notes);

    match &args.output_file {
        Some(path) => {
            formatted
                .write_to_file(path, mode, cancel)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), %mode, "release notes written");
            writeln!(out, "Release notes written to {}", path.display())?;
        }
        None => writeln!(out, "{}", formatted)?,
    }
    Ok(())
}

/// Create a release and upload its assets
async fn cmd_release_create<A: ReleaseApi>(
    releaser: &Releaser<A>,
    args: &CreateArgs,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> Result<()> {
    let new = args.new_release()?;
    let release = releaser
        .create(&new, cancel)
        .await
        .with_context(|| format!("Failed to create release for tag '{}'", new.tag_name))?;
    writeln!(
        out,
        "New GitHub release (ID: {}) created: {}",
        release.id, release.html_url
    )?;
    Ok(())
}

/// Print one release, or every release with `--all`
async fn cmd_release_get<A: ReleaseApi>(
    releaser: &Releaser<A>,
    which: &GetSelectorArgs,
    out: &mut impl Write,
) -> Result<()> {
    if which.all {
        let releases = releaser.list().await.context("Failed to list releases")?;
        if releases.is_empty() {
            writeln!(out, "(no releases)")?;
        }
        for release in &releases {
            dump_release(release, out)?;
            writeln!(out)?;
        }
        return Ok(());
    }

    let selector = match (which.id, &which.tag) {
        (Some(id), _) => ReleaseSelector::Id(id),
        (None, Some(tag)) => ReleaseSelector::Tag(tag.clone()),
        (None, None) => bail!("Pass one of --id, --tag or --all"),
    };
    let release = releaser.get(&selector).await?;
    dump_release(&release, out)
}

/// Update a release and its assets
async fn cmd_release_update<A: ReleaseApi>(
    releaser: &Releaser<A>,
    args: &UpdateArgs,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> Result<()> {
    let selector = args.selector.selector()?;
    let (changes, assets) = args.changes()?;
    let release = releaser
        .update(&selector, &changes, &assets, cancel)
        .await
        .with_context(|| format!("Failed to update release with {}", selector))?;
    writeln!(
        out,
        "GitHub release (ID: {}) updated: {}",
        release.id, release.html_url
    )?;
    Ok(())
}

/// Delete a release
async fn cmd_release_delete<A: ReleaseApi>(
    releaser: &Releaser<A>,
    selector: &SelectorArgs,
    out: &mut impl Write,
) -> Result<()> {
    let selector = selector.selector()?;
    releaser.delete(&selector).await?;
    match selector {
        ReleaseSelector::Id(id) => writeln!(out, "Release with ID '{}' deleted", id)?,
        ReleaseSelector::Tag(tag) => writeln!(out, "Release with tag name '{}' deleted", tag)?,
    }
    Ok(())
}

const INDENT: &str = "    ";

fn dump_release(release: &Release, out: &mut impl Write) -> Result<()> {
    writeln!(out, "[Release #{}]", release.id)?;
    writeln!(out, "{INDENT}Name: {}", release.name)?;
    writeln!(out, "{INDENT}TagName: {}", release.tag_name)?;
    writeln!(out, "{INDENT}TargetCommitish: {}", release.target_commitish)?;
    writeln!(out, "{INDENT}IsPrerelease: {}", release.prerelease)?;
    writeln!(out, "{INDENT}IsDraft: {}", release.draft)?;
    writeln!(out, "{INDENT}HtmlUrl: {}", release.html_url)?;
    writeln!(out, "{INDENT}CreatedAt: {}", release.created_at.to_rfc3339())?;
    match release.published_at {
        Some(at) => writeln!(out, "{INDENT}PublishedAt: {}", at.to_rfc3339())?,
        None => writeln!(out, "{INDENT}PublishedAt: null")?,
    }

    if release.assets.is_empty() {
        writeln!(out, "{INDENT}Assets: (none)")?;
    } else {
        writeln!(out, "{INDENT}Assets:")?;
        for asset in &release.assets {
            writeln!(out, "{INDENT}{INDENT}- [Asset #{}]", asset.id)?;
            writeln!(out, "{INDENT}{INDENT}{INDENT}Name: {}", asset.name)?;
        }
    }

    if release.body.is_empty() {
        writeln!(out, "{INDENT}Body: (empty)")?;
    } else {
        writeln!(out, "{INDENT}Body:")?;
        writeln!(out, "{}", release.body)?;
    }
    Ok(())
}
