use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};

use sprite_cleanup::{
    default_output_path, CleanupConfig, CleanupEngine, Connectivity, ProcessOptions, ProcessResult,
};

#[derive(Clone, Copy, ValueEnum)]
enum ConnectivityArg {
    Four,
    Eight,
}

impl From<ConnectivityArg> for Connectivity {
    fn from(arg: ConnectivityArg) -> Self {
        match arg {
            ConnectivityArg::Four => Connectivity::Four,
            ConnectivityArg::Eight => Connectivity::Eight,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "sprite-cleanup",
    about = "Strip checkerboard backgrounds, watermark text, and stray fragments from sprites",
    version,
    after_help = "Simple usage: sprite-cleanup <image>  (writes {name}_cleaned.png)\n\n\
                  Directory batches need -o <dir> or --in-place."
)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Input image file or directory
    input: String,

    /// Output file or directory (default: {name}_cleaned.png)
    #[arg(short, long, conflicts_with = "in_place")]
    output: Option<String>,

    /// Overwrite the input file(s) instead of writing copies
    #[arg(long)]
    in_place: bool,

    /// Flood-fill adjacency (default: four, or the preset's choice)
    #[arg(long, value_enum)]
    connectivity: Option<ConnectivityArg>,

    /// Require opposite-tone neighbors before removing a checkerboard pixel
    #[arg(long)]
    strict_checker: bool,

    /// White-subject mode: clear everything outside the drawn outline
    #[arg(long, conflicts_with = "strict_checker")]
    white_subject: bool,

    /// Skip the corner badge removal pass
    #[arg(long)]
    no_badges: bool,

    /// Skip the stray small-component removal pass
    #[arg(long)]
    no_stray: bool,

    /// Skip the bottom-band watermark text pass
    #[arg(long)]
    no_text: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let mut config = if cli.white_subject {
        CleanupConfig::white_subject()
    } else if cli.strict_checker {
        CleanupConfig::strict_checker()
    } else {
        CleanupConfig::default()
    };
    // Presets pick a connectivity; an explicit flag wins.
    if let Some(connectivity) = cli.connectivity {
        config.fill_connectivity = connectivity.into();
    }

    let opts = ProcessOptions {
        remove_badges: !cli.no_badges,
        remove_stray: !cli.no_stray,
        remove_text: !cli.no_text,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let engine = CleanupEngine::new(config);

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    let batch = input_path.is_dir();
    let results = if batch {
        let output_dir = match (&cli.output, cli.in_place) {
            (Some(o), _) => Some(PathBuf::from(o)),
            (None, true) => None,
            (None, false) => {
                eprintln!("Error: Directory input needs -o <dir> or --in-place");
                process::exit(1);
            }
        };
        engine.process_directory(input_path, output_dir.as_deref(), &opts)
    } else {
        let output_path = if cli.in_place {
            input_path.to_path_buf()
        } else {
            cli.output
                .as_ref()
                .map_or_else(|| default_output_path(input_path), PathBuf::from)
        };
        vec![engine.process_file(input_path, &output_path, &opts)]
    };

    let mut success_count = 0u32;
    let mut skip_count = 0u32;
    let mut fail_count = 0u32;
    let mut removed_total = 0usize;

    for r in &results {
        print_result(r, &opts);
        removed_total += r.removed;
        if r.skipped {
            skip_count += 1;
        } else if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !opts.quiet {
        eprintln!();
        eprint!("[Summary] Cleaned: {success_count}");
        if skip_count > 0 {
            eprint!(", Skipped: {skip_count}");
        }
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(
            " (Total: {}, {removed_total} pixels removed)",
            results.len()
        );
    }

    // Batch runs report failures per file and still exit 0; only the
    // single-image mode escalates.
    if !batch && fail_count > 0 {
        process::exit(1);
    }
}

fn print_result(result: &ProcessResult, opts: &ProcessOptions) {
    if opts.quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.skipped {
        if !opts.quiet {
            eprintln!("[SKIP] {filename}: {}", result.message);
        }
    } else if result.success {
        if !opts.quiet {
            eprintln!("[OK] {filename}: {} pixels removed", result.removed);
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }

    if opts.verbose && result.success && !result.skipped {
        eprintln!("  -> {}", result.message);
    }
}
