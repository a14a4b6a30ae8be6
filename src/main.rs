use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use hunk_select::diff::{DiffHunk, HunkHeader};
use hunk_select::groups::groups_of;
use hunk_select::parse::parse_file_refs;
use hunk_select::synth::hunk_headers;
use hunk_select::{
    Diff, HeaderMode, HunkLocks, HunkSelect, HunkSelectError, InputError, LineId, format_diff, read_locks,
};

#[derive(Parser)]
#[command(name = "hunk-select")]
#[command(version, about = "Line-level selection in unified diffs")]
#[command(after_help = r#"EXAMPLES:
    # Headers for removed line 4 and added lines 6-7 of a single hunk
    hunk-select headers change.diff:-4,6..7 --mode discard

    # Patch specs for a selection over a whole `git diff`
    git diff > work.diff
    hunk-select spec work.diff src/lib.rs:-10,12 --whole Cargo.toml"#)]
struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG also works
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a hunk header line and print it in canonical form
    Header {
        /// e.g. "@@ -1,3 +1,2 @@"
        text: String,
    },
    /// Synthesize hunk headers for selected lines of a single-hunk diff file
    Headers {
        /// Hunk file and line references (e.g., "change.diff:-4,6..7")
        hunk_ref: String,
        #[arg(long, value_enum, default_value_t = HeaderMode::Commit)]
        mode: HeaderMode,
    },
    /// Print the line groups selected lines fall into, after the hunk's header
    Groups {
        /// Hunk file and line references (e.g., "change.diff:-4,6..7")
        hunk_ref: String,
    },
    /// List every selectable line of a diff with the reference that selects it
    Show {
        /// Diff file, or - for stdin
        diff: PathBuf,
    },
    /// Build a selection and print the resulting patch specs as JSON
    Spec {
        /// Diff file, or - for stdin
        diff: PathBuf,
        /// Line references, applied in order as toggles (e.g., "src/lib.rs:10..15,-20")
        refs: Vec<String>,
        /// Select a whole file
        #[arg(long = "whole", value_name = "PATH")]
        whole: Vec<String>,
        #[arg(long, value_enum, default_value_t = HeaderMode::Commit)]
        mode: HeaderMode,
        /// Only allow files selectable for this stack
        #[arg(long)]
        stack: Option<String>,
        /// Hunk dependency data as JSON
        #[arg(long, requires = "stack")]
        locks: Option<PathBuf>,
    },
    /// List the files of a diff that may be selected for a stack
    Selectable {
        /// Diff file, or - for stdin
        diff: PathBuf,
        #[arg(long)]
        stack: String,
        /// Hunk dependency data as JSON
        #[arg(long)]
        locks: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions { shell: Shell },
    /// Generate a man page
    Man,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Header { text } => println!("{}", HunkHeader::parse(Some(&text))),
        Commands::Headers { hunk_ref, mode } => {
            let (hunk, lines) = read_hunk_ref(&hunk_ref)?;
            for header in hunk_headers(&hunk, &lines, mode) {
                println!("{header}");
            }
        }
        Commands::Groups { hunk_ref } => {
            let (hunk, lines) = read_hunk_ref(&hunk_ref)?;
            let (groups, overall) = groups_of(&hunk, &lines);
            println!("{overall}");
            for group in groups {
                println!("{group}");
            }
        }
        Commands::Show { diff } => {
            println!("{}", format_diff(&Diff::parse(&read_input(&diff)?)));
        }
        Commands::Spec {
            diff,
            refs,
            whole,
            mode,
            stack,
            locks,
        } => {
            let text = read_input(&diff)?;
            let mut select = match stack {
                Some(stack) => HunkSelect::for_stack(&text, load_locks(locks.as_deref())?, stack),
                None => HunkSelect::new(&text),
            };
            for path in &whole {
                select.toggle_file(path)?;
            }
            for file_ref in &refs {
                select.toggle_refs(file_ref)?;
            }
            let json = serde_json::to_string_pretty(&select.patch_specs(mode)).map_err(|e| {
                InputError::EncodeFailed {
                    message: e.to_string(),
                }
            })?;
            println!("{json}");
        }
        Commands::Selectable { diff, stack, locks } => {
            let diff = Diff::parse(&read_input(&diff)?);
            let locks = load_locks(locks.as_deref())?;
            for file in locks.selectable_files(&diff.files, &stack) {
                println!("{}", file.path);
            }
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "hunk-select", &mut io::stdout());
        }
        Commands::Man => {
            clap_mangen::Man::new(Cli::command()).render(&mut io::stdout())?;
        }
    }

    Ok(())
}

/// Read a file, or stdin when `path` is `-`.
fn read_input(path: &Path) -> Result<String, InputError> {
    let read = if path == Path::new("-") {
        io::read_to_string(io::stdin())
    } else {
        std::fs::read_to_string(path)
    };
    read.map_err(|e| InputError::ReadFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn load_locks(path: Option<&Path>) -> Result<HunkLocks, InputError> {
    match path {
        Some(path) => read_locks(&read_input(path)?),
        None => Ok(HunkLocks::default()),
    }
}

/// Resolve `FILE:REFS` against the first hunk of FILE.
fn read_hunk_ref(hunk_ref: &str) -> Result<(DiffHunk, Vec<LineId>), HunkSelectError> {
    let refs = parse_file_refs(hunk_ref)?;
    let hunk = first_hunk(&read_input(Path::new(&refs.file))?);
    let lines = refs.select(&hunk.change_ids());
    if lines.is_empty() {
        return Err(HunkSelectError::NoMatchingLines { file: refs.file });
    }
    Ok((hunk, lines))
}

/// The first hunk of `text`, skipping any file header lines before it.
///
/// Text without a `@@` line is taken as a bare hunk body.
fn first_hunk(text: &str) -> DiffHunk {
    if !text.lines().any(|line| line.starts_with("@@")) {
        return DiffHunk::parse(text);
    }

    let mut lines = text.lines().skip_while(|line| !line.starts_with("@@"));
    let header = HunkHeader::parse(lines.next());
    let body: String = lines
        .take_while(|line| !line.starts_with("@@"))
        .map(|line| format!("{line}\n"))
        .collect();
    DiffHunk::new(header, body)
}
