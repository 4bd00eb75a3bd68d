use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use sprite_cleanup::generate::{
    load_manifest, BatchOptions, GenerationClient, GenerationOptions, GenerationOutcome, Provider,
    SpriteSpec,
};
use sprite_cleanup::CleanupEngine;

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Openai,
    Gemini,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Openai => Provider::OpenAi,
            ProviderArg::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "sprite-gen",
    about = "Generate pixel-art sprites via a text-to-image API",
    version,
    after_help = "The API key is read from OPENAI_API_KEY or GEMINI_API_KEY depending on\n\
                  --provider. Manifest format: [{\"name\": \"fire-egg\", \"prompt\": \"...\"}, ...]"
)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Prompts to generate (named sprite-1, sprite-2, ... in order)
    prompts: Vec<String>,

    /// JSON manifest of {name, prompt} entries
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Output directory for the generated sprites
    #[arg(short, long, default_value = "sprites")]
    out_dir: PathBuf,

    /// Generation API to call
    #[arg(short, long, value_enum, default_value = "gemini")]
    provider: ProviderArg,

    /// Style prefix prepended to every prompt (empty to disable)
    #[arg(long)]
    base_style: Option<String>,

    /// Image size requested from the OpenAI endpoint
    #[arg(long, default_value = "1024x1024")]
    size: String,

    /// Regenerate sprites whose output file already exists
    #[arg(short, long)]
    force: bool,

    /// Dispatch all requests in parallel instead of sequentially
    #[arg(long)]
    parallel: bool,

    /// Pause between sequential requests, in milliseconds
    #[arg(long, default_value = "1000")]
    delay_ms: u64,

    /// Run the cleanup pipeline on each generated sprite
    #[arg(long)]
    clean: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let specs = match gather_specs(&cli) {
        Ok(specs) => specs,
        Err(message) => {
            eprintln!("Error: {message}");
            process::exit(1);
        }
    };
    if specs.is_empty() {
        eprintln!("Error: Nothing to generate; pass prompts or --manifest");
        process::exit(1);
    }

    let client = match GenerationClient::from_env(cli.provider.into()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let mut opts = GenerationOptions {
        size: cli.size,
        ..GenerationOptions::default()
    };
    if let Some(style) = cli.base_style {
        opts.base_style = style;
    }

    let batch = BatchOptions {
        out_dir: cli.out_dir,
        force: cli.force,
        parallel: cli.parallel,
        delay: Duration::from_millis(cli.delay_ms),
    };

    let cleanup = cli.clean.then(CleanupEngine::default);

    if !cli.quiet {
        eprintln!(
            "Generating {} sprite(s) into {}",
            specs.len(),
            batch.out_dir.display()
        );
    }

    let outcomes = client.generate_batch(&specs, &opts, &batch, cleanup.as_ref());

    let mut success_count = 0u32;
    let mut skip_count = 0u32;
    let mut fail_count = 0u32;

    for outcome in &outcomes {
        print_outcome(outcome, cli.quiet);
        if outcome.skipped {
            skip_count += 1;
        } else if outcome.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if !cli.quiet {
        eprintln!();
        eprint!("[Summary] Generated: {success_count}");
        if skip_count > 0 {
            eprint!(", Skipped: {skip_count}");
        }
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", outcomes.len());
    }
}

fn gather_specs(cli: &Cli) -> Result<Vec<SpriteSpec>, String> {
    let mut specs = Vec::new();

    if let Some(manifest) = &cli.manifest {
        specs = load_manifest(manifest)
            .map_err(|e| format!("Failed to read manifest {}: {e}", manifest.display()))?;
    }

    specs.extend(cli.prompts.iter().enumerate().map(|(i, prompt)| SpriteSpec {
        name: format!("sprite-{}", i + 1),
        prompt: prompt.clone(),
    }));

    Ok(specs)
}

fn print_outcome(outcome: &GenerationOutcome, quiet: bool) {
    if outcome.skipped {
        if !quiet {
            eprintln!("[SKIP] {}: {}", outcome.name, outcome.message);
        }
    } else if outcome.success {
        if !quiet {
            eprintln!("[OK] {} -> {}", outcome.name, outcome.path.display());
            if outcome.message != "Generated" {
                eprintln!("  -> {}", outcome.message);
            }
        }
    } else {
        eprintln!("[FAIL] {}: {}", outcome.name, outcome.message);
    }
}
